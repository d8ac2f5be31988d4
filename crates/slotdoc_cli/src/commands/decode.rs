//! Decode command implementation.

use super::{read_text, CliResult};
use slotdoc_codec::base91;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Runs the decode command.
///
/// Characters outside the base-91 alphabet (including the trailing
/// newline `encode` prints) are skipped.
pub fn run(input: Option<&Path>, output: Option<&Path>) -> CliResult<()> {
    let text = read_text(input)?;
    let bytes = base91::decode(&text);
    debug!(chars = text.len(), bytes = bytes.len(), "decoded");

    match output {
        Some(path) => std::fs::write(path, &bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn decodes_encoded_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.b91");
        let output = dir.path().join("out.bin");
        std::fs::write(&input, format!("{}\n", base91::encode(b"\x00\x01slot\xff"))).unwrap();

        run(Some(input.as_path()), Some(output.as_path())).unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"\x00\x01slot\xff");
    }
}
