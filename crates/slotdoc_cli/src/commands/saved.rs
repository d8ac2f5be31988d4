//! Saved document library commands.

use super::{open_local, read_text, CliError, CliResult};
use slotdoc_core::DocumentLibrary;
use std::path::Path;

fn library(dir: &Path) -> CliResult<DocumentLibrary> {
    Ok(DocumentLibrary::new(open_local(dir)?))
}

/// Lists saved document names.
pub fn list(dir: &Path) -> CliResult<()> {
    let names = library(dir)?.names();
    if names.is_empty() {
        println!("No saved documents");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

/// Saves the document in `input` under `name`.
pub fn save(dir: &Path, name: &str, input: &Path) -> CliResult<()> {
    let document = library(dir)?.save(name, &read_text(Some(input))?)?;
    println!(
        "Saved {name:?} ({} entries, fingerprint {})",
        document.entries(),
        document.fingerprint()
    );
    Ok(())
}

/// Prints the document saved under `name`.
pub fn show(dir: &Path, name: &str) -> CliResult<()> {
    let document = library(dir)?
        .get(name)
        .ok_or_else(|| CliError::UnknownSaved(name.to_string()))?;
    println!("{document}");
    Ok(())
}

/// Deletes the document saved under `name`.
pub fn delete(dir: &Path, name: &str) -> CliResult<()> {
    if !library(dir)?.delete(name)? {
        return Err(CliError::UnknownSaved(name.to_string()));
    }
    println!("Deleted {name:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_delete() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("doc.json");
        std::fs::write(&input, r#"[{"id":"imp"}]"#).unwrap();

        save(dir.path(), "Mine", &input).unwrap();
        assert_eq!(library(dir.path()).unwrap().names(), vec!["Mine"]);
        show(dir.path(), "Mine").unwrap();

        delete(dir.path(), "Mine").unwrap();
        assert!(matches!(
            delete(dir.path(), "Mine"),
            Err(CliError::UnknownSaved(_))
        ));
    }
}
