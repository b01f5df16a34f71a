use std::collections::{HashMap, HashSet};

use crate::error::ReconError;
use crate::model::{
    ColumnSelection, JoinSuffixes, QueryList, QueryMatch, QueryMatchSummary, Table, TableMatch,
    TableMatchSummary, Value,
};
use crate::normalize::{normalize_key, normalize_str};

pub const MAIN_ROLE: &str = "main";
pub const SEARCH_ROLE: &str = "search";

/// Normalized key tuple of one row, `None` if any component is missing.
type RowKey = Option<Vec<String>>;

fn row_keys(table: &Table, indices: &[usize]) -> Vec<RowKey> {
    table
        .raw_rows()
        .iter()
        .map(|row| indices.iter().map(|&i| normalize_key(&row[i])).collect())
        .collect()
}

/// Join `main` and `search` on the selected column pairs, default suffixes.
pub fn match_tables(
    main: &Table,
    search: &Table,
    selection: &ColumnSelection,
) -> Result<TableMatch, ReconError> {
    match_tables_with(main, search, selection, &JoinSuffixes::default())
}

/// Inner join on the normalized key tuple.
///
/// Duplicate keys produce the full cross-product. `missing` holds the search
/// rows whose key has no counterpart in `main`, so every search row is either
/// joined or missing, never both.
pub fn match_tables_with(
    main: &Table,
    search: &Table,
    selection: &ColumnSelection,
    suffixes: &JoinSuffixes,
) -> Result<TableMatch, ReconError> {
    if selection.is_empty() {
        return Err(ReconError::Arity { main: 0, search: 0 });
    }

    let mut main_idx = Vec::with_capacity(selection.len());
    let mut search_idx = Vec::with_capacity(selection.len());
    for pair in selection.pairs() {
        main_idx.push(main.require_column(MAIN_ROLE, &pair.main)?);
        search_idx.push(search.require_column(SEARCH_ROLE, &pair.search)?);
    }

    let main_keys = row_keys(main, &main_idx);
    let search_keys = row_keys(search, &search_idx);

    let mut search_by_key: HashMap<&[String], Vec<usize>> = HashMap::new();
    for (i, key) in search_keys.iter().enumerate() {
        if let Some(key) = key {
            search_by_key.entry(key.as_slice()).or_default().push(i);
        }
    }

    let mut main_hits: HashMap<&[String], usize> = HashMap::new();
    let mut matched_rows = Vec::new();
    for (mi, key) in main_keys.iter().enumerate() {
        let Some(key) = key else { continue };
        let Some(search_rows) = search_by_key.get(key.as_slice()) else { continue };

        *main_hits.entry(key.as_slice()).or_insert(0) += 1;
        for &si in search_rows {
            let mut joined: Vec<Value> = main.raw_rows()[mi].clone();
            joined.extend(search.raw_rows()[si].iter().cloned());
            matched_rows.push(joined);
        }
    }

    let mut missing_rows = Vec::new();
    let mut search_rows_matched = 0;
    for (si, key) in search_keys.iter().enumerate() {
        let found = key
            .as_ref()
            .is_some_and(|k| main_hits.contains_key(k.as_slice()));
        if found {
            search_rows_matched += 1;
        } else {
            missing_rows.push(search.raw_rows()[si].clone());
        }
    }

    let multi_match_keys = main_hits.values().filter(|&&n| n > 1).count();

    let summary = TableMatchSummary {
        main_rows: main.len(),
        search_rows: search.len(),
        matched_rows: matched_rows.len(),
        search_rows_matched,
        missing: missing_rows.len(),
        multi_match_keys,
    };
    log::debug!("table match on {} column pair(s): {:?}", selection.len(), summary);

    let columns = joined_columns(main.columns(), search.columns(), suffixes);
    Ok(TableMatch {
        matched: Table::from_parts("matched", columns, matched_rows),
        missing: Table::from_parts("missing", search.columns().to_vec(), missing_rows),
        summary,
    })
}

/// Column names of a joined table: main columns, then search columns.
///
/// A name present in both tables gets the main suffix on the main side and
/// the search suffix on the search side. A suffixed name that still clashes
/// gets `_2`, `_3`, ... appended.
pub fn joined_columns(main: &[String], search: &[String], suffixes: &JoinSuffixes) -> Vec<String> {
    let main_set: HashSet<&str> = main.iter().map(String::as_str).collect();
    let search_set: HashSet<&str> = search.iter().map(String::as_str).collect();

    let candidates = main
        .iter()
        .map(|c| {
            if search_set.contains(c.as_str()) {
                format!("{c}{}", suffixes.main)
            } else {
                c.clone()
            }
        })
        .chain(search.iter().map(|c| {
            if main_set.contains(c.as_str()) {
                format!("{c}{}", suffixes.search)
            } else {
                c.clone()
            }
        }));

    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(main.len() + search.len());
    for name in candidates {
        let mut unique = name.clone();
        let mut n = 2;
        while used.contains(&unique) {
            unique = format!("{name}_{n}");
            n += 1;
        }
        used.insert(unique.clone());
        out.push(unique);
    }
    out
}

/// Rows of `main` where any candidate column equals any query entry.
///
/// `missing` lists the normalized entries found in no candidate column of
/// any row, in query order. Repeated entries are repeated in `missing`.
pub fn match_query_list<S: AsRef<str>>(
    main: &Table,
    columns: &[S],
    query: &QueryList,
) -> Result<QueryMatch, ReconError> {
    if columns.is_empty() {
        return Err(ReconError::Arity { main: 0, search: 0 });
    }
    if query.is_empty() {
        return Err(ReconError::EmptyQuery);
    }

    let indices = columns
        .iter()
        .map(|c| main.require_column(MAIN_ROLE, c.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let wanted: Vec<String> = query.entries().iter().map(|e| normalize_str(e)).collect();
    let wanted_set: HashSet<&str> = wanted.iter().map(String::as_str).collect();

    let mut present: HashSet<String> = HashSet::new();
    let mut filtered_rows = Vec::new();
    for row in main.raw_rows() {
        let mut selected = false;
        for &i in &indices {
            if let Some(key) = normalize_key(&row[i]) {
                selected |= wanted_set.contains(key.as_str());
                present.insert(key);
            }
        }
        if selected {
            filtered_rows.push(row.clone());
        }
    }

    let missing: Vec<String> = wanted
        .iter()
        .filter(|q| !present.contains(q.as_str()))
        .cloned()
        .collect();

    let summary = QueryMatchSummary {
        main_rows: main.len(),
        query_entries: query.len(),
        filtered_rows: filtered_rows.len(),
        missing: missing.len(),
    };
    log::debug!("query match over {} column(s): {:?}", indices.len(), summary);

    Ok(QueryMatch {
        filtered: Table::from_parts("filtered", main.columns().to_vec(), filtered_rows),
        missing,
        summary,
    })
}
