// File I/O: table loading and result export

pub mod csv;
pub mod error;
pub mod headers;
pub mod query;
pub mod xlsx;

use std::path::Path;

use rostermatch_recon::Table;

pub use error::LoadError;
pub use query::{missing_ids_table, read_query_file};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text, delimiter sniffed.
    Csv,
    Tsv,
    Excel,
}

impl FileFormat {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Excel),
            _ => Err(LoadError::UnsupportedFormat(ext)),
        }
    }
}

/// Load a table from a CSV/TSV/text or Excel file.
///
/// `sheet` selects an Excel worksheet and is ignored for delimited files.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    let table = match FileFormat::from_path(path)? {
        FileFormat::Csv => crate::csv::import(path)?,
        FileFormat::Tsv => crate::csv::import_tsv(path)?,
        FileFormat::Excel => crate::xlsx::import(path, sheet)?,
    };
    log::info!("loaded {}: {} row(s)", path.display(), table.len());
    Ok(table)
}

/// Export a table; `.csv`/`.tsv` write delimited text, `.xlsx` a workbook.
pub fn export(table: &Table, path: &Path, sheet_name: &str) -> Result<(), LoadError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => crate::csv::export(table, path),
        "tsv" | "tab" => crate::csv::export_tsv(table, path),
        "xlsx" => crate::xlsx::export(table, path, sheet_name),
        _ => Err(LoadError::UnsupportedFormat(ext)),
    }?;
    log::info!("wrote {} ({} row(s))", path.display(), table.len());
    Ok(())
}
