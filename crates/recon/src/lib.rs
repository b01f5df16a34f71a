//! `rostermatch-recon`: record reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns matched and
//! missing entries. No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;

pub use config::{ReconConfig, ReconMode};
pub use engine::run;
pub use error::ReconError;
pub use matcher::{match_query_list, match_tables, match_tables_with};
pub use model::{
    ColumnPair, ColumnSelection, JoinSuffixes, QueryList, QueryMatch, ReconInput, ReconOutcome,
    ReconResult, Table, TableMatch, Value,
};
pub use normalize::{normalize, normalize_key};
