//! CSV export of the filtered and sorted row set.

use crate::column::Column;
use crate::row::{CellValue, Row};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPORT_NAME: &str = "export";

/// A serialized export, ready to hand to a download or write to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl CsvExport {
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.data).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write into `dir` under `file_name` and return the full path.
    pub fn save_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.data)?;
        log::info!("exported {} bytes to {}", self.data.len(), path.display());
        Ok(path)
    }
}

/// `"{title}.csv"`, or `"export.csv"` for a blank title.
pub fn export_file_name(title: Option<&str>) -> String {
    let stem = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_EXPORT_NAME)
        .replace(['/', '\\'], "_");
    format!("{}.csv", stem)
}

/// Header row plus one record per index in `order`. Every field is quoted.
///
/// Never fails: a writer error is logged and an empty buffer returned.
pub fn to_csv(rows: &[Row], order: &[usize], columns: &[Column]) -> Vec<u8> {
    match write_csv(rows, order, columns) {
        Ok(data) => data,
        Err(e) => {
            log::error!("csv export failed: {}", e);
            Vec::new()
        }
    }
}

fn write_csv(rows: &[Row], order: &[usize], columns: &[Column]) -> csv::Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);

    wtr.write_record(columns.iter().map(Column::header))?;

    for row in order.iter().filter_map(|&idx| rows.get(idx)) {
        wtr.write_record(
            columns
                .iter()
                .map(|column| CellValue::of(row, column.accessor()).export_text()),
        )?;
    }

    wtr.into_inner().map_err(|e| e.into_error().into())
}
