use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ReconMode;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A cell value in the type it was loaded with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    Empty,
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Display form: the original text, numbers without a trailing `.0`, and an
/// empty string for missing cells.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Empty => Ok(()),
        }
    }
}

/// Integers stored as floats print without decimals.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Ordered columns plus rows of values aligned with them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table, rejecting duplicate column names and ragged rows.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, ReconError> {
        let name = name.into();

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ReconError::DuplicateColumn {
                    table: name,
                    column: column.clone(),
                });
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ReconError::RowWidth {
                    table: name,
                    row: i,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }

        Ok(Self { name, columns, rows })
    }

    /// Result tables are assembled from already validated parts.
    pub(crate) fn from_parts(name: &str, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { name: name.to_string(), columns, rows }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Index of `column`, or a schema error naming the table's role.
    pub fn require_column(&self, role: &str, column: &str) -> Result<usize, ReconError> {
        self.column_index(column)
            .ok_or_else(|| ReconError::schema(role, column))
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row { columns: &self.columns, values })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row { columns: &self.columns, values })
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub(crate) fn raw_rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub main: String,
    pub search: String,
}

impl ColumnPair {
    pub fn new(main: impl Into<String>, search: impl Into<String>) -> Self {
        Self { main: main.into(), search: search.into() }
    }
}

/// Positionally paired main/search columns. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    pairs: Vec<ColumnPair>,
}

impl ColumnSelection {
    pub fn new(pairs: Vec<ColumnPair>) -> Result<Self, ReconError> {
        if pairs.is_empty() {
            return Err(ReconError::Arity { main: 0, search: 0 });
        }
        Ok(Self { pairs })
    }

    /// Pair two parallel column lists by position.
    pub fn from_lists<M, S>(main: &[M], search: &[S]) -> Result<Self, ReconError>
    where
        M: AsRef<str>,
        S: AsRef<str>,
    {
        if main.len() != search.len() || main.is_empty() {
            return Err(ReconError::Arity {
                main: main.len(),
                search: search.len(),
            });
        }
        let pairs = main
            .iter()
            .zip(search)
            .map(|(m, s)| ColumnPair::new(m.as_ref(), s.as_ref()))
            .collect();
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[ColumnPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Pasted identifiers. Every entry is non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryList {
    entries: Vec<String>,
}

impl QueryList {
    /// Keep the entries that are non-empty after trimming, trimmed.
    pub fn new<I, S>(entries: I) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        if entries.is_empty() {
            return Err(ReconError::EmptyQuery);
        }
        Ok(Self { entries })
    }

    /// Split pasted text on commas and line breaks.
    pub fn parse(text: &str) -> Result<Self, ReconError> {
        Self::new(text.split(|c: char| c == ',' || c == '\n' || c == '\r'))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Suffixes applied to column names present in both joined tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSuffixes {
    #[serde(default = "default_main_suffix")]
    pub main: String,
    #[serde(default = "default_search_suffix")]
    pub search: String,
}

fn default_main_suffix() -> String {
    "_main".into()
}

fn default_search_suffix() -> String {
    "_search".into()
}

impl Default for JoinSuffixes {
    fn default() -> Self {
        Self {
            main: default_main_suffix(),
            search: default_search_suffix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Pre-loaded data for one reconciliation run.
#[derive(Debug, Clone)]
pub enum ReconInput {
    Tables { main: Table, search: Table },
    Ids { main: Table, query: QueryList },
}

impl ReconInput {
    pub fn mode(&self) -> ReconMode {
        match self {
            Self::Tables { .. } => ReconMode::Tables,
            Self::Ids { .. } => ReconMode::Ids,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableMatchSummary {
    pub main_rows: usize,
    pub search_rows: usize,
    pub matched_rows: usize,
    pub search_rows_matched: usize,
    pub missing: usize,
    /// Search keys that joined with more than one main row.
    pub multi_match_keys: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableMatch {
    pub matched: Table,
    pub missing: Table,
    pub summary: TableMatchSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryMatchSummary {
    pub main_rows: usize,
    pub query_entries: usize,
    pub filtered_rows: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryMatch {
    pub filtered: Table,
    /// Normalized query entries with no match, in query order, duplicates kept.
    pub missing: Vec<String>,
    pub summary: QueryMatchSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReconOutcome {
    Tables(TableMatch),
    Ids(QueryMatch),
}

impl ReconOutcome {
    /// The result rows: joined rows for tables, filtered rows for ids.
    pub fn found(&self) -> &Table {
        match self {
            Self::Tables(m) => &m.matched,
            Self::Ids(m) => &m.filtered,
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            Self::Tables(m) => m.summary.missing,
            Self::Ids(m) => m.summary.missing,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub job_name: String,
    pub mode: ReconMode,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub outcome: ReconOutcome,
}

impl ReconResult {
    pub fn summary_line(&self) -> String {
        match &self.outcome {
            ReconOutcome::Tables(m) => {
                let s = &m.summary;
                format!(
                    "{}: {} of {} search row(s) matched, {} joined row(s), {} missing",
                    self.meta.job_name, s.search_rows_matched, s.search_rows, s.matched_rows, s.missing,
                )
            }
            ReconOutcome::Ids(m) => {
                let s = &m.summary;
                format!(
                    "{}: {} matching record(s) for {} ID(s), {} ID(s) not found",
                    self.meta.job_name, s.filtered_rows, s.query_entries, s.missing,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn table_rejects_duplicate_columns() {
        let err = Table::new("main", cols(&["id", "id"]), vec![]).unwrap_err();
        assert_eq!(
            err,
            ReconError::DuplicateColumn { table: "main".into(), column: "id".into() }
        );
    }

    #[test]
    fn table_rejects_ragged_rows() {
        let err = Table::new(
            "main",
            cols(&["id", "name"]),
            vec![vec!["1".into(), "x".into()], vec!["2".into()]],
        )
        .unwrap_err();
        assert!(matches!(err, ReconError::RowWidth { row: 1, expected: 2, found: 1, .. }));
    }

    #[test]
    fn row_lookup_by_column() {
        let t = Table::new("main", cols(&["id", "name"]), vec![vec![Value::Int(7), "x".into()]]).unwrap();
        let row = t.row(0).unwrap();
        assert_eq!(row.get("id"), Some(&Value::Int(7)));
        assert_eq!(row.get("nope"), None);
        assert_eq!(t.require_column("main", "name").unwrap(), 1);
        assert_eq!(
            t.require_column("main", "email").unwrap_err(),
            ReconError::schema("main", "email")
        );
    }

    #[test]
    fn value_display_drops_trailing_zero() {
        assert_eq!(Value::Number(12345.0).to_string(), "12345");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Empty.to_string(), "");
    }

    #[test]
    fn selection_from_lists_checks_arity() {
        let err = ColumnSelection::from_lists(&["a", "b"], &["x"]).unwrap_err();
        assert_eq!(err, ReconError::Arity { main: 2, search: 1 });

        let empty: [&str; 0] = [];
        let err = ColumnSelection::from_lists(&empty, &empty).unwrap_err();
        assert_eq!(err, ReconError::Arity { main: 0, search: 0 });

        let sel = ColumnSelection::from_lists(&["a", "b"], &["x", "y"]).unwrap();
        assert_eq!(sel.pairs()[1], ColumnPair::new("b", "y"));
        assert!(ColumnSelection::new(vec![]).is_err());
    }

    #[test]
    fn query_parse_splits_commas_and_newlines() {
        let q = QueryList::parse("12345, 67890\n11223\r\n\n ,  ").unwrap();
        assert_eq!(q.entries(), &["12345", "67890", "11223"]);
    }

    #[test]
    fn query_rejects_blank_input() {
        assert_eq!(QueryList::parse("  \n , ").unwrap_err(), ReconError::EmptyQuery);
        assert_eq!(QueryList::new(Vec::<String>::new()).unwrap_err(), ReconError::EmptyQuery);
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Text("a".into()),
            Value::Int(1),
            Value::Bool(true),
            Value::Empty,
        ])
        .unwrap();
        assert_eq!(json, r#"["a",1,true,null]"#);
    }
}
