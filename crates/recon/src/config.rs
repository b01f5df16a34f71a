use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{ColumnPair, ColumnSelection, JoinSuffixes};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// One reconciliation job, usually read from a `.rmatch.toml` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    pub name: String,
    pub mode: ReconMode,
    pub main: SourceConfig,
    #[serde(default)]
    pub search: Option<SourceConfig>,
    #[serde(default)]
    pub columns: Vec<ColumnPair>,
    #[serde(default)]
    pub query: Option<QueryConfig>,
    #[serde(default)]
    pub suffixes: JoinSuffixes,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconMode {
    /// File-to-file join on paired columns.
    Tables,
    /// Pasted ID list against one or more columns.
    Ids,
}

impl std::fmt::Display for ReconMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tables => write!(f, "tables"),
            Self::Ids => write!(f, "ids"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Path, relative to the config file.
    pub file: String,
    /// Worksheet name for Excel inputs. First sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    pub columns: Vec<String>,
    /// Inline pasted IDs (comma or newline separated).
    #[serde(default)]
    pub ids: Option<String>,
    /// Text file of IDs, relative to the config file.
    #[serde(default)]
    pub file: Option<String>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub matched: Option<String>,
    #[serde(default)]
    pub missing: Option<String>,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

pub const DEFAULT_SHEET_NAME: &str = "Matched";
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.into()
}

fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            matched: None,
            missing: None,
            sheet_name: default_sheet_name(),
            preview_rows: default_preview_rows(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }
        if self.main.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation("main.file must not be empty".into()));
        }

        match self.mode {
            ReconMode::Tables => {
                let search = self.search.as_ref().ok_or_else(|| {
                    ReconError::ConfigValidation("mode \"tables\" requires a [search] section".into())
                })?;
                if search.file.trim().is_empty() {
                    return Err(ReconError::ConfigValidation("search.file must not be empty".into()));
                }
                if self.columns.is_empty() {
                    return Err(ReconError::ConfigValidation(
                        "mode \"tables\" requires at least one [[columns]] pair".into(),
                    ));
                }
                if self.query.is_some() {
                    return Err(ReconError::ConfigValidation(
                        "[query] is only valid with mode \"ids\"".into(),
                    ));
                }
                if self.suffixes.main.is_empty() || self.suffixes.search.is_empty() {
                    return Err(ReconError::ConfigValidation("suffixes must not be empty".into()));
                }
                if self.suffixes.main == self.suffixes.search {
                    return Err(ReconError::ConfigValidation(format!(
                        "main and search suffixes are both '{}'",
                        self.suffixes.main
                    )));
                }
            }
            ReconMode::Ids => {
                let query = self.query.as_ref().ok_or_else(|| {
                    ReconError::ConfigValidation("mode \"ids\" requires a [query] section".into())
                })?;
                if query.columns.is_empty() {
                    return Err(ReconError::ConfigValidation(
                        "query.columns must name at least one column".into(),
                    ));
                }
                if query.ids.is_none() && query.file.is_none() {
                    return Err(ReconError::ConfigValidation(
                        "query needs `ids` or `file`".into(),
                    ));
                }
                if query.ids.is_some() && query.file.is_some() {
                    return Err(ReconError::ConfigValidation(
                        "query takes `ids` or `file`, not both".into(),
                    ));
                }
                if self.search.is_some() || !self.columns.is_empty() {
                    return Err(ReconError::ConfigValidation(
                        "[search] and [[columns]] are only valid with mode \"tables\"".into(),
                    ));
                }
            }
        }

        if self.output.preview_rows == 0 {
            return Err(ReconError::ConfigValidation(
                "output.preview_rows must be at least 1 (omit [output] for the default)".into(),
            ));
        }

        Ok(())
    }

    /// Column pairs for table mode.
    pub fn selection(&self) -> Result<ColumnSelection, ReconError> {
        ColumnSelection::new(self.columns.clone())
    }

    /// Candidate columns for ids mode.
    pub fn query_columns(&self) -> &[String] {
        self.query.as_ref().map(|q| q.columns.as_slice()).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TABLES: &str = r#"
name = "Spring intake"
mode = "tables"

[main]
file = "roster.xlsx"
sheet = "Students"

[search]
file = "found.csv"

[[columns]]
main = "Student ID"
search = "sid"

[[columns]]
main = "Last Name"
search = "surname"
"#;

    const VALID_IDS: &str = r#"
name = "Pasted IDs"
mode = "ids"

[main]
file = "roster.csv"

[query]
columns = ["Student ID", "Email"]
ids = "12345, 67890"

[output]
matched = "filtered_students.xlsx"
sheet_name = "Filtered_Students"
preview_rows = 20
"#;

    #[test]
    fn parse_valid_tables() {
        let config = ReconConfig::from_toml(VALID_TABLES).unwrap();
        assert_eq!(config.name, "Spring intake");
        assert_eq!(config.mode, ReconMode::Tables);
        assert_eq!(config.main.sheet.as_deref(), Some("Students"));
        let sel = config.selection().unwrap();
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.pairs()[1], ColumnPair::new("Last Name", "surname"));
        assert_eq!(config.suffixes, JoinSuffixes::default());
        assert_eq!(config.output.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(config.output.preview_rows, DEFAULT_PREVIEW_ROWS);
    }

    #[test]
    fn parse_valid_ids() {
        let config = ReconConfig::from_toml(VALID_IDS).unwrap();
        assert_eq!(config.mode, ReconMode::Ids);
        assert_eq!(config.query_columns(), &["Student ID", "Email"]);
        assert_eq!(config.output.matched.as_deref(), Some("filtered_students.xlsx"));
        assert_eq!(config.output.sheet_name, "Filtered_Students");
        assert_eq!(config.output.preview_rows, 20);
    }

    #[test]
    fn parse_custom_suffixes() {
        let input = format!("{VALID_TABLES}\n[suffixes]\nmain = \"_x\"\nsearch = \"_y\"\n");
        let config = ReconConfig::from_toml(&input).unwrap();
        assert_eq!(config.suffixes.main, "_x");
        assert_eq!(config.suffixes.search, "_y");
    }

    #[test]
    fn reject_identical_suffixes() {
        let input = format!("{VALID_TABLES}\n[suffixes]\nmain = \"_x\"\nsearch = \"_x\"\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("both '_x'"));
    }

    #[test]
    fn reject_tables_without_columns() {
        let input = r#"
name = "Bad"
mode = "tables"
[main]
file = "a.csv"
[search]
file = "b.csv"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("[[columns]]"));
    }

    #[test]
    fn reject_tables_without_search() {
        let input = r#"
name = "Bad"
mode = "tables"
[main]
file = "a.csv"
[[columns]]
main = "id"
search = "id"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("[search]"));
    }

    #[test]
    fn reject_ids_without_source() {
        let input = r#"
name = "Bad"
mode = "ids"
[main]
file = "a.csv"
[query]
columns = ["id"]
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("`ids` or `file`"));
    }

    #[test]
    fn reject_ids_with_both_sources() {
        let input = VALID_IDS.replace("ids = \"12345, 67890\"", "ids = \"1\"\nfile = \"ids.txt\"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn reject_ids_with_empty_columns() {
        let input = r#"
name = "Bad"
mode = "ids"
[main]
file = "a.csv"
[query]
columns = []
ids = "1"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn reject_unknown_mode() {
        let input = VALID_TABLES.replace("mode = \"tables\"", "mode = \"fuzzy\"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_unknown_field() {
        let input = format!("{VALID_IDS}\nthreshold = 3\n");
        // lands inside [output], which denies unknown fields
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_zero_preview() {
        let input = VALID_IDS.replace("preview_rows = 20", "preview_rows = 0");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("preview_rows"));
    }
}
