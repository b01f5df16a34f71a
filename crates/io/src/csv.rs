// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use rostermatch_recon::{Table, Value};

use crate::error::LoadError;
use crate::headers::clean_headers;

/// Import a delimited file, sniffing the delimiter.
pub fn import(path: &Path) -> Result<Table, LoadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&table_name(path), &content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<Table, LoadError> {
    import_with_delimiter(path, b'\t')
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, LoadError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&table_name(path), &content, delimiter)
}

pub(crate) fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Higher field count breaks ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let mut file = std::fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| LoadError::io(path, e))?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            // Excel-exported CSVs are often Windows-1252
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

/// Parse delimited text. The first record is the header; empty cells load
/// as `Value::Empty`, everything else as text.
pub fn import_from_string(name: &str, content: &str, delimiter: u8) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|e| LoadError::Csv(e.to_string()))?,
        None => return Err(LoadError::EmptyFile(name.to_string())),
    };
    let columns = clean_headers(header.iter());
    let width = columns.len();

    let mut rows = Vec::new();
    for (i, result) in records.enumerate() {
        let record = result.map_err(|e| LoadError::Csv(e.to_string()))?;
        if record.len() != width {
            // line 1 is the header
            log::warn!(
                "{name}: line {} has {} field(s), header has {width}; padding/truncating",
                i + 2,
                record.len()
            );
        }

        let mut row: Vec<Value> = record
            .iter()
            .take(width)
            .map(|field| if field.is_empty() { Value::Empty } else { Value::Text(field.to_string()) })
            .collect();
        row.resize(width, Value::Empty);
        rows.push(row);
    }

    Ok(Table::new(name, columns, rows)?)
}

pub fn export(table: &Table, path: &Path) -> Result<(), LoadError> {
    export_with_delimiter(table, path, b',')
}

pub fn export_tsv(table: &Table, path: &Path) -> Result<(), LoadError> {
    export_with_delimiter(table, path, b'\t')
}

fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), LoadError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| LoadError::Export(format!("{}: {e}", path.display())))?;

    writer
        .write_record(table.columns())
        .map_err(|e| LoadError::Export(e.to_string()))?;

    for row in table.rows() {
        let record: Vec<String> = row.values().iter().map(|v| v.to_string()).collect();
        writer.write_record(&record).map_err(|e| LoadError::Export(e.to_string()))?;
    }

    writer.flush().map_err(|e| LoadError::io(path, e))?;
    Ok(())
}
