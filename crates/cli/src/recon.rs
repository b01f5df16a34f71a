//! `rmatch tables`, `ids`, `run` and `validate`.

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Args;

use rostermatch_io::{export, load_table, missing_ids_table, read_query_file, LoadError};
use rostermatch_recon::config::{OutputConfig, QueryConfig, SourceConfig};
use rostermatch_recon::matcher::MAIN_ROLE;
use rostermatch_recon::{
    ColumnPair, ColumnSelection, JoinSuffixes, QueryList, ReconConfig, ReconError, ReconInput,
    ReconMode, ReconOutcome, ReconResult, Table,
};

use crate::preview;
use crate::CliError;

/// Sheet name for the missing-entries workbook.
const MISSING_SHEET_NAME: &str = "Missing";

#[derive(Args)]
pub struct TablesArgs {
    /// Main file (.csv, .tsv, .txt, .xlsx, .xls, .ods)
    pub main: PathBuf,

    /// Search file, matched against the main file
    pub search: PathBuf,

    /// Key pair as MAIN_COL=SEARCH_COL (repeatable; all pairs must match)
    #[arg(long = "on", value_name = "MAIN=SEARCH")]
    pub on: Vec<String>,

    /// Main key column (repeatable, paired in order with --search-col)
    #[arg(long = "main-col", value_name = "COL")]
    pub main_cols: Vec<String>,

    /// Search key column (repeatable, paired in order with --main-col)
    #[arg(long = "search-col", value_name = "COL")]
    pub search_cols: Vec<String>,

    /// Worksheet of the main workbook (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Worksheet of the search workbook (default: first sheet)
    #[arg(long)]
    pub search_sheet: Option<String>,

    /// Suffix for main columns whose names clash with search columns
    #[arg(long, default_value = "_main")]
    pub main_suffix: String,

    /// Suffix for search columns whose names clash with main columns
    #[arg(long, default_value = "_search")]
    pub search_suffix: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct IdsArgs {
    /// Main file (.csv, .tsv, .txt, .xlsx, .xls, .ods)
    pub main: PathBuf,

    /// Column to search (repeatable; a row matches if any column matches)
    #[arg(long = "column", short = 'c', value_name = "COL")]
    pub columns: Vec<String>,

    /// IDs separated by commas or newlines
    #[arg(long, conflicts_with = "ids_file")]
    pub ids: Option<String>,

    /// Text file of IDs separated by commas or newlines
    #[arg(long)]
    pub ids_file: Option<PathBuf>,

    /// Worksheet of the main workbook (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Write found rows to a .csv, .tsv or .xlsx file
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Write missing rows (tables) or IDs (ids) to a .csv, .tsv or .xlsx file
    #[arg(long, value_name = "PATH")]
    pub missing_out: Option<PathBuf>,

    /// Worksheet name for .xlsx output [default: Matched]
    #[arg(long)]
    pub sheet_name: Option<String>,

    /// Rows to preview on stdout, 0 to disable [default: 10]
    #[arg(long, value_name = "N")]
    pub preview: Option<usize>,

    /// Print the full result as JSON instead of the preview
    #[arg(long)]
    pub json: bool,
}

/// Where results go, after merging flags over the job's `[output]`.
struct OutputPlan {
    matched: Option<PathBuf>,
    missing: Option<PathBuf>,
    sheet_name: String,
    preview: usize,
    json: bool,
}

impl OutputArgs {
    /// Job-file paths are relative to `base_dir`; flag paths are used as given.
    fn plan(&self, job: &OutputConfig, base_dir: &Path) -> OutputPlan {
        OutputPlan {
            matched: self.out.clone().or_else(|| job.matched.as_ref().map(|p| base_dir.join(p))),
            missing: self
                .missing_out
                .clone()
                .or_else(|| job.missing.as_ref().map(|p| base_dir.join(p))),
            sheet_name: self.sheet_name.clone().unwrap_or_else(|| job.sheet_name.clone()),
            preview: self.preview.unwrap_or(job.preview_rows),
            json: self.json,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn cmd_tables(args: TablesArgs, quiet: bool) -> Result<(), CliError> {
    let columns = column_pairs(&args.on, &args.main_cols, &args.search_cols)?;
    if args.main_suffix.is_empty() || args.search_suffix.is_empty() {
        return Err(CliError::usage("--main-suffix and --search-suffix must not be empty"));
    }
    if args.main_suffix == args.search_suffix {
        return Err(CliError::usage(format!(
            "--main-suffix and --search-suffix are both '{}'",
            args.main_suffix
        )));
    }

    let main = load_table(&args.main, args.sheet.as_deref())?;
    let search = load_table(&args.search, args.search_sheet.as_deref())?;

    let config = ReconConfig {
        name: format!("{} vs {}", main.name(), search.name()),
        mode: ReconMode::Tables,
        main: source(&args.main, args.sheet.clone()),
        search: Some(source(&args.search, args.search_sheet.clone())),
        columns,
        query: None,
        suffixes: JoinSuffixes { main: args.main_suffix, search: args.search_suffix },
        output: OutputConfig::default(),
    };

    let input = ReconInput::Tables { main, search };
    let result = rostermatch_recon::run(&config, &input).map_err(|e| with_column_hint(e, &input))?;
    report(&result, &args.output.plan(&config.output, Path::new(".")), quiet)
}

pub fn cmd_ids(args: IdsArgs, quiet: bool) -> Result<(), CliError> {
    let query = match (&args.ids, &args.ids_file) {
        (Some(text), _) => QueryList::parse(text)?,
        (None, Some(path)) => read_query_file(path)?,
        (None, None) => read_stdin_query()?,
    };
    log::debug!("{} ID(s) to look up", query.len());

    let main = load_table(&args.main, args.sheet.as_deref())?;

    let config = ReconConfig {
        name: main.name().to_string(),
        mode: ReconMode::Ids,
        main: source(&args.main, args.sheet.clone()),
        search: None,
        columns: Vec::new(),
        query: Some(QueryConfig {
            columns: args.columns,
            ids: args.ids,
            file: args.ids_file.as_ref().map(|p| p.display().to_string()),
        }),
        suffixes: JoinSuffixes::default(),
        output: OutputConfig::default(),
    };

    let input = ReconInput::Ids { main, query };
    let result = rostermatch_recon::run(&config, &input).map_err(|e| with_column_hint(e, &input))?;
    report(&result, &args.output.plan(&config.output, Path::new(".")), quiet)
}

pub fn cmd_run(config_path: PathBuf, output: OutputArgs, quiet: bool) -> Result<(), CliError> {
    let config = read_config(&config_path)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let main = load_table(&base_dir.join(&config.main.file), config.main.sheet.as_deref())?;

    let input = match config.mode {
        ReconMode::Tables => {
            let search_source = config.search.as_ref().ok_or_else(|| {
                ReconError::ConfigValidation("mode \"tables\" requires a [search] section".into())
            })?;
            let search =
                load_table(&base_dir.join(&search_source.file), search_source.sheet.as_deref())?;
            ReconInput::Tables { main, search }
        }
        ReconMode::Ids => {
            let query_source = config.query.as_ref().ok_or_else(|| {
                ReconError::ConfigValidation("mode \"ids\" requires a [query] section".into())
            })?;
            let query = match (&query_source.ids, &query_source.file) {
                (Some(text), _) => QueryList::parse(text)?,
                (None, Some(file)) => read_query_file(&base_dir.join(file))?,
                (None, None) => {
                    return Err(ReconError::ConfigValidation("query needs `ids` or `file`".into()).into())
                }
            };
            ReconInput::Ids { main, query }
        }
    };

    let result = rostermatch_recon::run(&config, &input).map_err(|e| with_column_hint(e, &input))?;
    report(&result, &output.plan(&config.output, base_dir), quiet)
}

pub fn cmd_validate(config_path: PathBuf, quiet: bool) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    if quiet {
        return Ok(());
    }
    match config.mode {
        ReconMode::Tables => eprintln!(
            "valid: tables job '{}' with {} key pair(s)",
            config.name,
            config.columns.len(),
        ),
        ReconMode::Ids => eprintln!(
            "valid: ids job '{}' searching {} column(s)",
            config.name,
            config.query_columns().len(),
        ),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::from(LoadError::Io { path: path.display().to_string(), message: e.to_string() })
    })?;
    Ok(ReconConfig::from_toml(&text)?)
}

fn source(path: &Path, sheet: Option<String>) -> SourceConfig {
    SourceConfig { file: path.display().to_string(), sheet }
}

/// Key pairs from either `--on` or the paired `--main-col`/`--search-col` lists.
fn column_pairs(
    on: &[String],
    main_cols: &[String],
    search_cols: &[String],
) -> Result<Vec<ColumnPair>, CliError> {
    if !on.is_empty() && (!main_cols.is_empty() || !search_cols.is_empty()) {
        return Err(CliError::usage("use either --on or --main-col/--search-col, not both"));
    }
    if on.is_empty() {
        let selection = ColumnSelection::from_lists(main_cols, search_cols)?;
        return Ok(selection.pairs().to_vec());
    }
    on.iter().map(|value| parse_on(value)).collect()
}

fn parse_on(value: &str) -> Result<ColumnPair, CliError> {
    match value.split_once('=') {
        Some((main, search)) if !main.trim().is_empty() && !search.trim().is_empty() => {
            Ok(ColumnPair::new(main.trim(), search.trim()))
        }
        _ => Err(CliError::usage(format!("invalid --on value '{value}'"))
            .with_hint("expected MAIN_COL=SEARCH_COL, e.g. --on 'Student ID=sid'")),
    }
}

fn read_stdin_query() -> Result<QueryList, CliError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(CliError::usage("no IDs given")
            .with_hint("pass --ids, --ids-file, or pipe IDs on stdin"));
    }
    let mut text = String::new();
    stdin
        .lock()
        .read_to_string(&mut text)
        .map_err(|e| CliError::general(format!("cannot read stdin: {e}")))?;
    Ok(QueryList::parse(&text)?)
}

/// Schema errors get a hint listing the columns the table does have.
fn with_column_hint(err: ReconError, input: &ReconInput) -> CliError {
    let table = match (&err, input) {
        (ReconError::Schema { table, .. }, ReconInput::Tables { main, search }) => {
            Some(if table == MAIN_ROLE { main } else { search })
        }
        (ReconError::Schema { .. }, ReconInput::Ids { main, .. }) => Some(main),
        _ => None,
    };
    let cli_err = CliError::from(err);
    match table {
        Some(t) => cli_err.with_hint(format!("{} has columns: {}", t.name(), t.columns().join(", "))),
        None => cli_err,
    }
}

fn report(result: &ReconResult, plan: &OutputPlan, quiet: bool) -> Result<(), CliError> {
    if let Some(path) = &plan.matched {
        export(result.outcome.found(), path, &plan.sheet_name)?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if let Some(path) = &plan.missing {
        let ids_table: Table;
        let missing = match &result.outcome {
            ReconOutcome::Tables(m) => &m.missing,
            ReconOutcome::Ids(m) => {
                ids_table = missing_ids_table(&m.missing)?;
                &ids_table
            }
        };
        export(missing, path, MISSING_SHEET_NAME)?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if plan.json {
        let json = serde_json::to_string_pretty(result)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else if plan.preview > 0 {
        let found = result.outcome.found();
        if found.is_empty() {
            if !quiet {
                eprintln!("no matching records found");
            }
        } else {
            print!("{}", preview::render(found, plan.preview));
        }
    }

    if !quiet {
        if let ReconOutcome::Ids(m) = &result.outcome {
            if !m.missing.is_empty() {
                eprintln!("not found: {}", m.missing.join(", "));
            }
        }
        eprintln!("{}", result.summary_line());
    }

    Ok(())
}
