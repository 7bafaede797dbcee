//! JSON document reader and report writer.

use crate::node::ConfigNode;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read a configuration document from a JSON file
///
/// **Public** - entry point for every command
///
/// # Arguments
/// * `input_path` - Path to JSON file
///
/// # Returns
/// Parsed document with key order preserved
///
/// # Errors
/// * `OutputError::ReadFailed` - File cannot be opened
/// * `OutputError::ParseFailed` - Contents are not valid JSON
pub fn read_document(input_path: impl AsRef<Path>) -> Result<ConfigNode, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading document from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::ReadFailed)?;
    let value: serde_json::Value =
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::ParseFailed)?;
    let document = ConfigNode::from(value);

    debug!(
        "Document loaded: {} at top level",
        document.type_name()
    );

    Ok(document)
}

/// Write any report to a pretty-printed JSON file
///
/// # Arguments
/// * `report` - Report to serialize
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
///
/// # Example
/// ```ignore
/// let report = generate_report(&left, &right, &options, labels);
/// write_report(&report, "reports/drift.json")?;
/// ```
pub fn write_report<T: Serialize>(
    report: &T,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    super::validate_path(output_path)?;
    super::ensure_parent(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, report).map_err(OutputError::SerializationFailed)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_read_document_keeps_key_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"zeta": 1, "alpha": {"b": 2, "a": 3}}"#).unwrap();

        let document = read_document(&path).unwrap();
        let keys: Vec<&str> = document
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_read_document_errors() {
        let dir = tempdir().unwrap();

        let missing = read_document(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(OutputError::ReadFailed(_))));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(read_document(&bad), Err(OutputError::ParseFailed(_))));
    }

    #[test]
    fn test_write_report_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("report.json");

        write_report(&serde_json::json!({"status": "SYNCED"}), &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"status": "SYNCED"}));
    }

    #[test]
    fn test_write_report_rejects_directory() {
        let dir = tempdir().unwrap();
        let result = write_report(&serde_json::json!({}), dir.path());
        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }
}
