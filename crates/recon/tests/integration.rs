use rostermatch_recon::{
    run, ColumnSelection, QueryList, ReconConfig, ReconError, ReconInput, ReconMode, ReconOutcome,
    ReconResult, Table, Value,
};

fn roster() -> Table {
    Table::new(
        "roster.xlsx",
        vec!["Student ID".into(), "Name".into(), "Email".into()],
        vec![
            vec![Value::Number(12345.0), "Ann".into(), "ann@school.edu".into()],
            vec![Value::Number(67890.0), "Ben".into(), "BEN@School.edu".into()],
            vec![Value::Number(11223.0), "Cy".into(), Value::Empty],
            vec![Value::Empty, "Dee".into(), "dee@school.edu".into()],
            vec![Value::Number(12345.0), "Ann (dup)".into(), Value::Empty],
        ],
    )
    .unwrap()
}

fn found() -> Table {
    Table::new(
        "found.csv",
        vec!["sid".into(), "Name".into()],
        vec![
            vec![" 12345 ".into(), "ann".into()],
            vec!["67890".into(), "Benjamin".into()],
            vec!["55555".into(), "Eve".into()],
            vec![Value::Empty, "Nobody".into()],
        ],
    )
    .unwrap()
}

fn tables_job(extra: &str) -> ReconConfig {
    ReconConfig::from_toml(&format!(
        r#"
name = "Spring intake"
mode = "tables"

[main]
file = "roster.xlsx"

[search]
file = "found.csv"

[[columns]]
main = "Student ID"
search = "sid"
{extra}
"#
    ))
    .unwrap()
}

fn ids_job(ids: &str, columns: &str) -> ReconConfig {
    ReconConfig::from_toml(&format!(
        r#"
name = "Pasted IDs"
mode = "ids"

[main]
file = "roster.xlsx"

[query]
columns = {columns}
ids = "{ids}"
"#
    ))
    .unwrap()
}

fn run_tables(config: &ReconConfig) -> ReconResult {
    let input = ReconInput::Tables { main: roster(), search: found() };
    run(config, &input).unwrap()
}

fn run_ids(config: &ReconConfig) -> ReconResult {
    let query = QueryList::parse(config.query.as_ref().unwrap().ids.as_deref().unwrap()).unwrap();
    let input = ReconInput::Ids { main: roster(), query };
    run(config, &input).unwrap()
}

// -------------------------------------------------------------------------
// Table mode
// -------------------------------------------------------------------------

#[test]
fn tables_join_with_duplicates_and_missing() {
    let result = run_tables(&tables_job(""));
    let ReconOutcome::Tables(m) = &result.outcome else { panic!("expected tables outcome") };

    // 12345 appears twice in main: one search row, two joined rows
    assert_eq!(m.summary.matched_rows, 3);
    assert_eq!(m.summary.search_rows_matched, 2);
    assert_eq!(m.summary.missing, 2);
    assert_eq!(m.summary.multi_match_keys, 1);

    assert_eq!(
        m.matched.columns(),
        &["Student ID", "Name_main", "Email", "sid", "Name_search"]
    );
    let names: Vec<String> = m
        .matched
        .rows()
        .map(|r| r.get("Name_main").unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Ann", "Ben", "Ann (dup)"]);

    let missing: Vec<String> = m.missing.rows().map(|r| r.get("Name").unwrap().to_string()).collect();
    assert_eq!(missing, vec!["Eve", "Nobody"]);
    assert_eq!(m.missing.columns(), found().columns());
}

#[test]
fn tables_custom_suffixes() {
    let result = run_tables(&tables_job("[suffixes]\nmain = \"_roster\"\nsearch = \"_found\"\n"));
    assert!(result.outcome.found().columns().contains(&"Name_roster".to_string()));
    assert!(result.outcome.found().columns().contains(&"Name_found".to_string()));
}

#[test]
fn tables_two_key_columns_must_both_match() {
    let config = tables_job("[[columns]]\nmain = \"Name\"\nsearch = \"Name\"\n");
    let result = run_tables(&config);
    // only Ann/ann agrees on both id and name
    assert_eq!(result.outcome.found().len(), 1);
    assert_eq!(result.outcome.missing_count(), 3);
}

#[test]
fn tables_summary_line() {
    let result = run_tables(&tables_job(""));
    assert_eq!(result.meta.mode, ReconMode::Tables);
    assert_eq!(result.meta.engine_version, env!("CARGO_PKG_VERSION"));
    assert_eq!(
        result.summary_line(),
        "Spring intake: 2 of 4 search row(s) matched, 3 joined row(s), 2 missing"
    );
}

#[test]
fn tables_unknown_column_is_schema_error() {
    let config = tables_job("[[columns]]\nmain = \"Phone\"\nsearch = \"Name\"\n");
    let input = ReconInput::Tables { main: roster(), search: found() };
    let err = run(&config, &input).unwrap_err();
    assert_eq!(err, ReconError::schema("main", "Phone"));
}

#[test]
fn selection_arity_is_checked() {
    let err = ColumnSelection::from_lists(&["a", "b"], &["x"]).unwrap_err();
    assert_eq!(err, ReconError::Arity { main: 2, search: 1 });
}

// -------------------------------------------------------------------------
// Ids mode
// -------------------------------------------------------------------------

#[test]
fn ids_or_across_columns() {
    let result = run_ids(&ids_job("12345, ben@school.edu, 424242", r#"["Student ID", "Email"]"#));
    let ReconOutcome::Ids(m) = &result.outcome else { panic!("expected ids outcome") };

    let names: Vec<String> = m.filtered.rows().map(|r| r.get("Name").unwrap().to_string()).collect();
    assert_eq!(names, vec!["Ann", "Ben", "Ann (dup)"]);
    assert_eq!(m.missing, vec!["424242"]);
    assert_eq!(
        result.summary_line(),
        "Pasted IDs: 3 matching record(s) for 3 ID(s), 1 ID(s) not found"
    );
}

#[test]
fn ids_missing_keeps_duplicates_in_order() {
    let result = run_ids(&ids_job("ZZ, 67890, zz , yy", r#"["Student ID"]"#));
    let ReconOutcome::Ids(m) = &result.outcome else { panic!("expected ids outcome") };
    assert_eq!(m.missing, vec!["zz", "zz", "yy"]);
    assert_eq!(m.filtered.len(), 1);
}

#[test]
fn ids_nan_text_does_not_match_empty_cells() {
    let result = run_ids(&ids_job("nan", r#"["Email"]"#));
    assert!(result.outcome.found().is_empty());
    assert_eq!(result.outcome.missing_count(), 1);
}

#[test]
fn mode_mismatch_is_rejected() {
    let config = tables_job("");
    let input = ReconInput::Ids { main: roster(), query: QueryList::parse("1").unwrap() };
    let err = run(&config, &input).unwrap_err();
    assert!(matches!(err, ReconError::ConfigValidation(_)));
}

#[test]
fn result_serializes_with_mode_tag() {
    let result = run_ids(&ids_job("12345", r#"["Student ID"]"#));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["meta"]["mode"], "ids");
    assert_eq!(json["outcome"]["mode"], "ids");
    assert_eq!(json["outcome"]["summary"]["filtered_rows"], 2);
    assert_eq!(json["outcome"]["filtered"]["rows"][0][0], 12345.0);
}
