//! Load command implementation.

use super::{open_session, CliError, CliResult};
use serde::Serialize;
use slotdoc_core::{LoadOrigin, LoadedConfig, TransportConfig};
use std::path::Path;

/// JSON view of a loaded configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutput<'a> {
    /// `store` or `local`.
    pub origin: &'static str,
    /// Why the local copy was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<&'a str>,
    /// Selected document name.
    pub selected: &'a str,
    /// Custom document name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<&'a str>,
    /// Version stamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Whether the document matches the recorded fingerprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint_matches: Option<bool>,
    /// Document text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<&'a str>,
}

impl<'a> From<&'a LoadedConfig> for LoadOutput<'a> {
    fn from(loaded: &'a LoadedConfig) -> Self {
        let (origin, fallback_reason) = match &loaded.origin {
            LoadOrigin::Store => ("store", None),
            LoadOrigin::LocalFallback { reason } => ("local", Some(reason.as_str())),
        };
        Self {
            origin,
            fallback_reason,
            selected: &loaded.record.selected,
            custom_name: loaded.record.custom_name.as_deref(),
            version: loaded.record.version,
            fingerprint_matches: loaded.fingerprint_matches(),
            document: loaded.document.as_deref(),
        }
    }
}

/// Runs the load command.
pub async fn run(
    dir: &Path,
    config: TransportConfig,
    output: Option<&Path>,
    format: &str,
) -> CliResult<()> {
    let session = open_session(dir, config)?;
    let loaded = session
        .load()
        .await?
        .ok_or_else(|| CliError::NothingPublished(dir.display().to_string()))?;

    if let Some(path) = output {
        std::fs::write(path, loaded.document.as_deref().unwrap_or_default())?;
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&LoadOutput::from(&loaded))?),
        _ => print_text_output(&loaded, output.is_none()),
    }
    Ok(())
}

fn print_text_output(loaded: &LoadedConfig, show_document: bool) {
    if let LoadOrigin::LocalFallback { reason } = &loaded.origin {
        eprintln!("Using local copy: {reason}");
    }
    if !loaded.record.is_custom() {
        println!("Built-in selection: {}", loaded.record.selected);
        return;
    }
    match &loaded.document {
        Some(document) if show_document => println!("{document}"),
        Some(_) => {}
        None => eprintln!("Custom document could not be recovered"),
    }
    if loaded.fingerprint_matches() == Some(false) {
        eprintln!("Warning: document does not match the recorded fingerprint");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotdoc_core::{Selection, StorageRecord};

    #[tokio::test]
    async fn nothing_published() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), TransportConfig::default(), None, "text")
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::NothingPublished(_)));
    }

    #[tokio::test]
    async fn writes_document_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(dir.path(), TransportConfig::default()).unwrap();
        session
            .publish(Selection::custom("Mine", r#"[{"id":"imp"}]"#))
            .await
            .unwrap();

        let out = dir.path().join("out.json");
        run(dir.path(), TransportConfig::default(), Some(out.as_path()), "json")
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "[\n  {\n    \"id\": \"imp\"\n  }\n]"
        );
    }

    #[test]
    fn json_view_of_fallback() {
        let loaded = LoadedConfig {
            record: StorageRecord::builtin("sects.json", 3),
            document: None,
            origin: LoadOrigin::LocalFallback {
                reason: "offline".into(),
            },
        };
        let json = serde_json::to_value(LoadOutput::from(&loaded)).unwrap();
        assert_eq!(json["origin"], "local");
        assert_eq!(json["fallbackReason"], "offline");
        assert_eq!(json["selected"], "sects.json");
        assert!(json.get("document").is_none());
    }
}
