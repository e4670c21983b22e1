use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::EnumError;
use crate::record::DiscoveredRecord;

/// Receives the final (or interrupted) result log.
pub trait ResultSink {
    /// Persists `records` in discovery order and returns the files written.
    fn persist(&self, records: &[DiscoveredRecord]) -> Result<Vec<PathBuf>, EnumError>;
}

/// Newline-delimited subdomain list plus a JSON export.
#[derive(Debug, Clone)]
pub struct FileSink {
    pub text_path: PathBuf,
    pub json_path: PathBuf,
}

impl FileSink {
    pub fn new(text_path: impl Into<PathBuf>, json_path: impl Into<PathBuf>) -> Self {
        Self {
            text_path: text_path.into(),
            json_path: json_path.into(),
        }
    }

    fn write_text(&self, records: &[DiscoveredRecord]) -> Result<(), EnumError> {
        write_file(&self.text_path, |writer| {
            for record in records {
                writeln!(writer, "{}", record.subdomain)?;
            }
            Ok(())
        })
    }

    fn write_json(&self, records: &[DiscoveredRecord]) -> Result<(), EnumError> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut ser)?;

        write_file(&self.json_path, |writer| writer.write_all(&buf))
    }
}

fn write_file<F>(path: &Path, body: F) -> Result<(), EnumError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let output_error = |source| EnumError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    body(&mut writer).map_err(output_error)?;
    writer.flush().map_err(output_error)
}

impl ResultSink for FileSink {
    fn persist(&self, records: &[DiscoveredRecord]) -> Result<Vec<PathBuf>, EnumError> {
        self.write_text(records)?;
        self.write_json(records)?;
        Ok(vec![self.text_path.clone(), self.json_path.clone()])
    }
}
