use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::{match_query_list, match_tables_with};
use crate::model::{ReconInput, ReconMeta, ReconOutcome, ReconResult};

/// Run one reconciliation job over pre-loaded input.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    if config.mode != input.mode() {
        return Err(ReconError::ConfigValidation(format!(
            "config mode is \"{}\" but input is for \"{}\"",
            config.mode,
            input.mode()
        )));
    }

    let outcome = match input {
        ReconInput::Tables { main, search } => {
            let selection = config.selection()?;
            ReconOutcome::Tables(match_tables_with(main, search, &selection, &config.suffixes)?)
        }
        ReconInput::Ids { main, query } => {
            ReconOutcome::Ids(match_query_list(main, config.query_columns(), query)?)
        }
    };

    log::info!("job '{}' ({}) finished", config.name, config.mode);

    Ok(ReconResult {
        meta: ReconMeta {
            job_name: config.name.clone(),
            mode: config.mode,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QueryList, Table, Value};

    fn roster() -> Table {
        Table::new(
            "roster.csv",
            vec!["Student ID".into(), "Email".into(), "Name".into()],
            vec![
                vec![Value::Int(12345), "ann@school.edu".into(), "Ann".into()],
                vec![Value::Int(67890), "BEN@school.edu ".into(), "Ben".into()],
                vec![Value::Int(11223), Value::Empty, "Cy".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn run_ids_job() {
        let config = ReconConfig::from_toml(
            r#"
name = "Paste"
mode = "ids"
[main]
file = "roster.csv"
[query]
columns = ["Student ID", "Email"]
ids = "unused"
"#,
        )
        .unwrap();
        let input = ReconInput::Ids {
            main: roster(),
            query: QueryList::parse("12345\nben@school.edu, 99999").unwrap(),
        };

        let result = run(&config, &input).unwrap();
        assert_eq!(result.meta.mode, crate::config::ReconMode::Ids);
        assert_eq!(result.meta.engine_version, env!("CARGO_PKG_VERSION"));
        let ReconOutcome::Ids(m) = &result.outcome else { panic!("expected ids outcome") };
        assert_eq!(m.filtered.len(), 2);
        assert_eq!(m.missing, vec!["99999"]);
        assert!(result.summary_line().contains("1 ID(s) not found"));
    }

    #[test]
    fn run_tables_job() {
        let config = ReconConfig::from_toml(
            r#"
name = "Join"
mode = "tables"
[main]
file = "roster.csv"
[search]
file = "found.csv"
[[columns]]
main = "Student ID"
search = "Student ID"
[suffixes]
main = "_roster"
search = "_found"
"#,
        )
        .unwrap();
        let search = Table::new(
            "found.csv",
            vec!["Student ID".into()],
            vec![vec!["12345".into()], vec!["00000".into()]],
        )
        .unwrap();
        let input = ReconInput::Tables { main: roster(), search };

        let result = run(&config, &input).unwrap();
        let ReconOutcome::Tables(m) = &result.outcome else { panic!("expected tables outcome") };
        assert_eq!(m.matched.len(), 1);
        assert_eq!(m.matched.columns()[0], "Student ID_roster");
        assert_eq!(m.missing.len(), 1);
        assert_eq!(result.outcome.missing_count(), 1);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"]["mode"], "tables");
        assert_eq!(json["outcome"]["summary"]["missing"], 1);
    }

    #[test]
    fn run_rejects_mode_mismatch() {
        let config = ReconConfig::from_toml(
            r#"
name = "Paste"
mode = "ids"
[main]
file = "roster.csv"
[query]
columns = ["Email"]
ids = "x"
"#,
        )
        .unwrap();
        let input = ReconInput::Tables { main: roster(), search: roster() };
        let err = run(&config, &input).unwrap_err();
        assert!(err.to_string().contains("config mode is \"ids\""));
    }
}
