//! Publish command implementation.

use super::{open_local, open_session, read_text, CliError, CliResult};
use slotdoc_core::{DocumentLibrary, PublishReport, SecondaryStatus, Selection, TransportConfig};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where the published document comes from.
#[derive(Debug)]
pub enum Source {
    /// A document file published under a name.
    Custom {
        /// Display name.
        name: String,
        /// Document file, or `-` for stdin.
        input: PathBuf,
    },
    /// A built-in document, by name.
    Builtin(String),
    /// A document from the saved library.
    Saved(String),
}

/// Resolves `source` into a selection.
pub fn selection(dir: &Path, source: Source) -> CliResult<Selection> {
    Ok(match source {
        Source::Custom { name, input } => Selection::custom(name, read_text(Some(input.as_path()))?),
        Source::Builtin(name) => Selection::builtin(name),
        Source::Saved(name) => {
            let library = DocumentLibrary::new(open_local(dir)?);
            let document = library
                .get(&name)
                .ok_or_else(|| CliError::UnknownSaved(name.clone()))?;
            Selection::custom(name, document)
        }
    })
}

/// Runs the publish command.
pub async fn run(dir: &Path, config: TransportConfig, source: Source) -> CliResult<()> {
    let session = open_session(dir, config)?;
    let report = session.publish(selection(dir, source)?).await?;
    print_report(&report, session.config().slot_budget);
    Ok(())
}

fn print_report(report: &PublishReport, budget: usize) {
    println!("Published {}", report.record.selected);
    if let Some(name) = &report.record.custom_name {
        println!("  Name:        {name}");
    }
    println!("  Version:     {}", report.version);
    if let Some(fingerprint) = &report.fingerprint {
        println!("  Fingerprint: {fingerprint}");
    }
    println!("  Segments:    {}", report.segments);
    println!("  Primary:     {} / {budget} bytes", report.primary_bytes);
    if let Some(bytes) = report.secondary_bytes {
        println!("  Secondary:   {bytes} / {budget} bytes");
    }

    match &report.secondary {
        SecondaryStatus::NotNeeded => {}
        SecondaryStatus::Written => println!("  Second segment written"),
        SecondaryStatus::Failed { slot, reason } => {
            warn!(slot = %slot, "document is incomplete until the second segment is written");
            println!("  WARNING: second segment not written to {slot}: {reason}");
        }
    }
}
