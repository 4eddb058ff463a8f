//! Box-drawn text tables

use std::fmt;

/// A table with a fixed header row and any number of data rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty, extra cells are dropped
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .map(|c| single_line(&c.into()))
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Column widths in characters
    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        out.push_str(&border(&widths, '┌', '┬', '┐'));
        out.push_str(&line(&self.headers, &widths));
        out.push_str(&border(&widths, '├', '┼', '┤'));
        for row in &self.rows {
            out.push_str(&line(row, &widths));
        }
        out.push_str(&border(&widths, '└', '┴', '┘'));

        out
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}\n", left, segments.join(&mid.to_string()), right)
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| {
            let pad = w - cell.chars().count();
            format!(" {}{} ", cell, " ".repeat(pad))
        })
        .collect();
    format!("│{}│\n", padded.join("│"))
}

/// Fold line breaks so one record stays on one line
fn single_line(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layout() {
        let mut table = Table::new(["ID", "Name"]);
        table.add_row(["1", "Ivanov"]);
        table.add_row(["10", "Li"]);

        let expected = "\
┌────┬────────┐
│ ID │ Name   │
├────┼────────┤
│ 1  │ Ivanov │
│ 10 │ Li     │
└────┴────────┘
";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_width_counts_characters_not_bytes() {
        let mut table = Table::new(["Сотрудник"]);
        table.add_row(["Иванов"]);
        let rendered = table.render();
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_rows_are_normalized() {
        let mut table = Table::new(["A", "B", "C"]);
        table.add_row(["multi\nline"]);
        assert_eq!(table.rows()[0], vec!["multi line".to_string(), String::new(), String::new()]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_table_renders_header_only() {
        let table = Table::new(["Text"]);
        assert!(table.is_empty());
        assert_eq!(table.render().lines().count(), 4);
    }
}
