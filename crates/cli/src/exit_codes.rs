//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `rmatch` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (missing entries are a result, not an error) |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments)                          |
//! | 3    | Selected column not found in a table                 |
//! | 4    | Column selection arity mismatch or empty selection   |
//! | 5    | Query list has no usable entries                     |
//! | 6    | Invalid job config                                   |
//! | 7    | Input file could not be loaded                       |
//! | 8    | Output file could not be written                     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Update the table above
//! 3. Wire it into `CliError` construction

use rostermatch_io::LoadError;
use rostermatch_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// A selected column is missing from the main or search table.
pub const EXIT_SCHEMA: u8 = 3;

/// Main and search column lists differ in length, or nothing was selected.
pub const EXIT_ARITY: u8 = 4;

/// No non-empty IDs after trimming.
pub const EXIT_EMPTY_QUERY: u8 = 5;

/// Job config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 6;

/// Input file unreadable, unsupported, or malformed.
pub const EXIT_LOAD: u8 = 7;

/// Export failed.
pub const EXIT_EXPORT: u8 = 8;

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Schema { .. } => EXIT_SCHEMA,
        ReconError::Arity { .. } => EXIT_ARITY,
        ReconError::EmptyQuery => EXIT_EMPTY_QUERY,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::DuplicateColumn { .. } | ReconError::RowWidth { .. } => EXIT_LOAD,
    }
}

pub fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::Table(inner) => recon_exit_code(inner),
        LoadError::Export(_) => EXIT_EXPORT,
        _ => EXIT_LOAD,
    }
}
