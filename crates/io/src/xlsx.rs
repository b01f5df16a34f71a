// Excel import (xlsx, xlsm, xls, xlsb, ods) and xlsx export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use rostermatch_recon::{Table, Value};

use crate::csv::table_name;
use crate::error::LoadError;
use crate::headers::clean_headers;

/// Excel's worksheet name limit.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Import one worksheet: the named one, or the first.
///
/// The first row of the used range is the header.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| LoadError::Excel(format!("failed to open {}: {e}", path.display())))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound {
                sheet: wanted.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::Excel("workbook contains no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Excel(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows_iter = range.rows();
    let header = rows_iter
        .next()
        .ok_or_else(|| LoadError::EmptyFile(format!("{} [{sheet_name}]", table_name(path))))?;
    let columns = clean_headers(header.iter().map(|cell| cell_value(cell).to_string()));
    let width = columns.len();

    let mut rows = Vec::new();
    for row in rows_iter {
        let mut values: Vec<Value> = row.iter().take(width).map(cell_value).collect();
        values.resize(width, Value::Empty);
        // calamine's dense range includes fully blank rows
        if values.iter().all(Value::is_empty) {
            continue;
        }
        rows.push(values);
    }

    log::debug!(
        "{} [{sheet_name}]: {} column(s), {} row(s)",
        path.display(),
        width,
        rows.len()
    );

    Ok(Table::new(table_name(path), columns, rows)?)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) if s.is_empty() => Value::Empty,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(n) => Value::Int(*n),
        Data::Float(n) => Value::Number(*n),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => Value::Number(dt.as_f64()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
                Value::Text(ndt.format("%Y-%m-%d").to_string())
            }
            Some(ndt) => Value::Text(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Value::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(_) => Value::Empty,
    }
}

/// Write `table` as a single-sheet workbook with a bold header row.
pub fn export(table: &Table, path: &Path, sheet_name: &str) -> Result<(), LoadError> {
    let mut workbook = XlsxWorkbook::new();

    let name: String = sheet_name.chars().take(MAX_SHEET_NAME_LEN).collect();
    let worksheet = workbook
        .add_worksheet()
        .set_name(&name)
        .map_err(|e| LoadError::Export(format!("failed to create sheet '{name}': {e}")))?;

    let header_format = Format::new().set_bold();
    for (col, column) in table.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, column, &header_format)
            .map_err(|e| LoadError::Export(e.to_string()))?;
    }

    for (r, row) in table.rows().enumerate() {
        let row_idx = (r + 1) as u32;
        for (c, value) in row.values().iter().enumerate() {
            let col = c as u16;
            let written = match value {
                Value::Text(s) => worksheet.write_string(row_idx, col, s).map(|_| ()),
                Value::Number(n) => worksheet.write_number(row_idx, col, *n).map(|_| ()),
                Value::Int(n) => worksheet.write_number(row_idx, col, *n as f64).map(|_| ()),
                Value::Bool(b) => worksheet.write_boolean(row_idx, col, *b).map(|_| ()),
                Value::Empty => Ok(()),
            };
            written.map_err(|e| LoadError::Export(e.to_string()))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| LoadError::Export(format!("{}: {e}", path.display())))?;
    Ok(())
}
