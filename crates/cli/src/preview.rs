// Plain-text preview of the first rows of a result table

use rostermatch_recon::Table;
use unicode_width::UnicodeWidthStr;

const MAX_CELL_WIDTH: usize = 32;

fn clip(s: &str) -> String {
    if s.width() <= MAX_CELL_WIDTH {
        return s.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > MAX_CELL_WIDTH - 1 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(fill))
}

/// Render the first `limit` rows as aligned columns.
pub fn render(table: &Table, limit: usize) -> String {
    let head = table.head(limit);
    let header: Vec<String> = head.columns().iter().map(|c| clip(c)).collect();
    let cells: Vec<Vec<String>> = head
        .rows()
        .map(|r| r.values().iter().map(|v| clip(&v.to_string())).collect())
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(h.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |row: &[String]| -> String {
        row.iter()
            .zip(&widths)
            .map(|(cell, &w)| pad(cell, w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&header));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&line(&rule));
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row));
        out.push('\n');
    }

    let hidden = table.len().saturating_sub(limit);
    if hidden > 0 {
        out.push_str(&format!("... {hidden} more row(s)\n"));
    }
    out
}
