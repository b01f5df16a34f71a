// Query list files and missing-ID export

use std::path::Path;

use rostermatch_recon::{QueryList, Table, Value};

use crate::csv::read_file_as_utf8;
use crate::error::LoadError;

/// Column name used when exporting unmatched IDs.
pub const MISSING_ID_COLUMN: &str = "missing_id";

/// Read pasted IDs from a text file (comma or newline separated).
pub fn read_query_file(path: &Path) -> Result<QueryList, LoadError> {
    let content = read_file_as_utf8(path)?;
    Ok(QueryList::parse(&content)?)
}

/// One-column table of unmatched IDs, for export.
pub fn missing_ids_table(missing: &[String]) -> Result<Table, LoadError> {
    let rows = missing.iter().map(|id| vec![Value::Text(id.clone())]).collect();
    Ok(Table::new("missing", vec![MISSING_ID_COLUMN.to_string()], rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostermatch_recon::ReconError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_ids_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        fs::write(&path, "12345, 67890\n\n11223\r\n").unwrap();
        let q = read_query_file(&path).unwrap();
        assert_eq!(q.entries(), &["12345", "67890", "11223"]);
    }

    #[test]
    fn blank_ids_file_is_empty_query() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        fs::write(&path, " \n,\n").unwrap();
        let err = read_query_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Table(ReconError::EmptyQuery)));
    }

    #[test]
    fn missing_table_keeps_order_and_duplicates() {
        let t = missing_ids_table(&["z".into(), "z".into(), "q".into()]).unwrap();
        assert_eq!(t.columns(), &[MISSING_ID_COLUMN]);
        let ids: Vec<String> = t.rows().map(|r| r.values()[0].to_string()).collect();
        assert_eq!(ids, vec!["z", "z", "q"]);
    }
}
