use csv::WriterBuilder;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::models::{Row, VariableSet};

/// Append-only CSV output, one open/close cycle per chunk.
pub struct CsvSink {
    columns: Vec<String>,
}

impl CsvSink {
    pub fn new(variables: &VariableSet) -> Self {
        Self {
            columns: variables.columns().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Write one chunk's rows.
    ///
    /// The first chunk recreates `destination` and writes the header; later
    /// chunks append without it. The chunk is encoded in memory and handed to
    /// the file in a single write.
    pub fn write(&self, rows: &[Row], destination: &Path, is_first_chunk: bool) -> Result<usize> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::with_capacity(rows.len() * 64));

        if is_first_chunk {
            writer.write_record(&self.columns)?;
        }
        for row in rows {
            writer.write_record(row.record())?;
        }
        let buffer = writer.into_inner().map_err(|e| e.into_error())?;

        if is_first_chunk {
            if let Some(parent) = destination.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(is_first_chunk)
            .append(!is_first_chunk)
            .open(destination)?;
        file.write_all(&buffer)?;
        file.flush()?;

        debug!(
            rows = rows.len(),
            bytes = buffer.len(),
            header = is_first_chunk,
            path = %destination.display(),
            "chunk written"
        );

        Ok(rows.len())
    }
}
