use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// A referenced column does not exist in the named table.
    Schema { table: String, column: String },
    /// A table was built with the same column name twice.
    DuplicateColumn { table: String, column: String },
    /// A row's width doesn't match the table header.
    RowWidth { table: String, row: usize, expected: usize, found: usize },
    /// Column selections of different lengths, or an empty selection.
    Arity { main: usize, search: usize },
    /// No usable entries in the query list.
    EmptyQuery,
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (missing section, bad suffixes, etc.).
    ConfigValidation(String),
}

impl ReconError {
    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema { table: table.into(), column: column.into() }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema { table, column } => {
                write!(f, "{table} table: missing column '{column}'")
            }
            Self::DuplicateColumn { table, column } => {
                write!(f, "{table} table: duplicate column '{column}'")
            }
            Self::RowWidth { table, row, expected, found } => write!(
                f,
                "{table} table: row {row} has {found} value(s), header has {expected}"
            ),
            Self::Arity { main, search } if *main == 0 && *search == 0 => {
                write!(f, "at least one column must be selected")
            }
            Self::Arity { main, search } => write!(
                f,
                "column selection mismatch: {main} main column(s) vs {search} search column(s)"
            ),
            Self::EmptyQuery => write!(f, "query list has no non-empty entries"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
