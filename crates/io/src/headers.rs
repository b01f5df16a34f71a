// Header cleanup shared by the CSV and Excel readers

use std::collections::HashSet;

/// Trim header names, name blank ones `column_<n>` (1-based), and
/// disambiguate repeats as `name.1`, `name.2`, ...
pub fn clean_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for (i, name) in raw.into_iter().enumerate() {
        let trimmed = name.as_ref().trim();
        let base = if trimmed.is_empty() {
            log::warn!("blank header in column {}, using column_{}", i + 1, i + 1);
            format!("column_{}", i + 1)
        } else {
            trimmed.to_string()
        };

        let mut unique = base.clone();
        let mut n = 1;
        while used.contains(&unique) {
            unique = format!("{base}.{n}");
            n += 1;
        }
        used.insert(unique.clone());
        out.push(unique);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_names() {
        assert_eq!(clean_headers([" Student ID ", "Email\t"]), vec!["Student ID", "Email"]);
    }

    #[test]
    fn names_blank_headers() {
        assert_eq!(clean_headers(["id", "  ", ""]), vec!["id", "column_2", "column_3"]);
    }

    #[test]
    fn disambiguates_duplicates() {
        assert_eq!(
            clean_headers(["id", "id ", "id", "id.1"]),
            vec!["id", "id.1", "id.2", "id.1.1"]
        );
    }
}
