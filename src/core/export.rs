// LogScope - core/export.rs
//
// CSV and JSON export of filtered log records.
// Core layer: writes to any Write trait object.

use crate::core::model::LogRecord;
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(ExportFormat::Csv),
            Some("json") => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

fn check_size(count: usize) -> Result<(), ExportError> {
    if count > constants::MAX_EXPORT_RECORDS {
        return Err(ExportError::TooManyRecords {
            count,
            max: constants::MAX_EXPORT_RECORDS,
        });
    }
    Ok(())
}

/// Export filtered records to CSV format.
///
/// Writes: timestamp, process, category, message
pub fn export_csv<W: Write>(
    records: &[&LogRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(records.len())?;
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["timestamp", "process", "category", "message"])
        .map_err(csv_err)?;

    let mut count = 0;
    for record in records {
        csv_writer
            .write_record([
                record.timestamp_text().as_str(),
                &record.process,
                record.category.key(),
                &record.message,
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export filtered records to JSON format (array of objects).
pub fn export_json<W: Write>(
    records: &[&LogRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(records.len())?;
    serde_json::to_writer_pretty(writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}

/// Create `path` and export records in the format implied by its extension.
pub fn export_to_file(records: &[&LogRecord], path: &Path) -> Result<usize, ExportError> {
    let format = ExportFormat::from_path(path)?;
    let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = std::io::BufWriter::new(file);

    let count = match format {
        ExportFormat::Csv => export_csv(records, &mut writer, path)?,
        ExportFormat::Json => export_json(records, &mut writer, path)?,
    };
    // Errors from the final buffered write only surface here.
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %path.display(), records = count, format = ?format, "Export complete");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Category;
    use chrono::NaiveDate;

    fn make_record(message: &str) -> LogRecord {
        LogRecord {
            timestamp: NaiveDate::from_ymd_opt(2000, 3, 4)
                .unwrap()
                .and_hms_opt(5, 6, 7)
                .unwrap(),
            process: "sshd[22]".to_string(),
            message: message.to_string(),
            category: Category::Error,
        }
    }

    #[test]
    fn test_csv_export() {
        let records = [make_record("auth failure, user=root"), make_record("second")];
        let view: Vec<_> = records.iter().collect();
        let mut buf = Vec::new();
        let count = export_csv(&view, &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("timestamp,process,category,message"));
        assert_eq!(
            lines.next(),
            Some(r#"Mar 04 05:06:07,sshd[22],error,"auth failure, user=root""#)
        );
    }

    #[test]
    fn test_json_export() {
        let records = [make_record("Test message")];
        let view: Vec<_> = records.iter().collect();
        let mut buf = Vec::new();
        let count = export_json(&view, &mut buf, Path::new("out.json")).unwrap();
        assert_eq!(count, 1);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["message"], "Test message");
        assert_eq!(value[0]["timestamp"], "Mar 04 05:06:07");
        assert_eq!(value[0]["category"], "error");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("a/b.CSV")).unwrap(),
            ExportFormat::Csv
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("x.json")).unwrap(),
            ExportFormat::Json
        );
        assert!(matches!(
            ExportFormat::from_path(Path::new("x.txt")),
            Err(ExportError::UnsupportedFormat { .. })
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_export_to_full_device_fails_for_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let record = make_record("disk full");
        for name in ["out.json", "out.csv"] {
            let path = dir.path().join(name);
            std::os::unix::fs::symlink("/dev/full", &path).unwrap();
            assert!(
                matches!(
                    export_to_file(&[&record], &path),
                    Err(ExportError::Io { .. } | ExportError::Csv { .. } | ExportError::Json { .. })
                ),
                "{name} export should report the write failure"
            );
        }
    }
}
