use std::fmt;

use rostermatch_recon::ReconError;

#[derive(Debug)]
pub enum LoadError {
    /// File could not be read or written.
    Io { path: String, message: String },
    /// Extension we don't know how to read or write.
    UnsupportedFormat(String),
    /// Malformed CSV content.
    Csv(String),
    /// Workbook could not be opened or read.
    Excel(String),
    /// Requested worksheet is not in the workbook.
    SheetNotFound { sheet: String, available: Vec<String> },
    /// No header row.
    EmptyFile(String),
    /// Loaded data doesn't form a valid table or query list.
    Table(ReconError),
    /// Writing an export file failed.
    Export(String),
}

impl LoadError {
    pub(crate) fn io(path: &std::path::Path, err: impl fmt::Display) -> Self {
        Self::Io { path: path.display().to_string(), message: err.to_string() }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{path}: {message}"),
            Self::UnsupportedFormat(ext) if ext.is_empty() => {
                write!(f, "unsupported file format: no extension (expected .csv, .tsv, .txt, .xlsx, .xls, .xlsm, .xlsb or .ods)")
            }
            Self::UnsupportedFormat(ext) => {
                write!(f, "unsupported file format: .{ext} (expected .csv, .tsv, .txt, .xlsx, .xls, .xlsm, .xlsb or .ods)")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Excel(msg) => write!(f, "Excel error: {msg}"),
            Self::SheetNotFound { sheet, available } => {
                write!(f, "sheet '{sheet}' not found (available: {})", available.join(", "))
            }
            Self::EmptyFile(path) => write!(f, "{path}: no header row"),
            Self::Table(err) => write!(f, "{err}"),
            Self::Export(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReconError> for LoadError {
    fn from(err: ReconError) -> Self {
        Self::Table(err)
    }
}
