//! CSV export of the fact listing
//!
//! One header line, then one record per fact. Fields containing a comma,
//! quote or line break are quoted with inner quotes doubled.

use chrono::NaiveDate;
use std::path::Path;

use super::{FactRow, DATE_FORMAT};
use crate::error::{LedgerError, Result};
use crate::types::Rating;

/// Literal header row of the export file
pub const CSV_HEADER: [&str; 5] = ["ID", "Текст Факта", "Дата Добавления", "Оценка Факта", "Сотрудник"];

/// Serialize rows, header first
pub fn to_csv_string(rows: &[FactRow]) -> String {
    let mut out = String::new();
    push_record(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));

    for row in rows {
        push_record(&mut out, [
            row.id.to_string(),
            row.text.clone(),
            row.date.format(DATE_FORMAT).to_string(),
            row.rating.label().to_string(),
            row.employee.clone(),
        ]);
    }

    out
}

/// Write the export file, replacing any previous one. Returns the record count.
pub async fn write_facts_csv<P: AsRef<Path>>(path: P, rows: &[FactRow]) -> Result<usize> {
    tokio::fs::write(path.as_ref(), to_csv_string(rows)).await?;
    tracing::info!(count = rows.len(), "Exported facts to {}", path.as_ref().display());
    Ok(rows.len())
}

/// Read an export file back into rows
pub async fn read_facts_csv<P: AsRef<Path>>(path: P) -> Result<Vec<FactRow>> {
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;
    parse_facts_csv(&contents)
}

/// Parse export text back into rows; the header must match exactly
pub fn parse_facts_csv(input: &str) -> Result<Vec<FactRow>> {
    let mut records = parse_records(input)?.into_iter();

    match records.next() {
        Some(header) if header == CSV_HEADER => {}
        Some(header) => return Err(LedgerError::Csv(format!("unexpected header {:?}", header))),
        None => return Err(LedgerError::Csv("missing header".to_string())),
    }

    records
        .enumerate()
        .map(|(i, record)| row_from_record(i + 2, record))
        .collect()
}

fn row_from_record(line: usize, record: Vec<String>) -> Result<FactRow> {
    let [id, text, date, rating, employee]: [String; 5] = record
        .try_into()
        .map_err(|r: Vec<String>| LedgerError::Csv(format!("record {}: expected 5 fields, got {}", line, r.len())))?;

    let id = id
        .parse::<i64>()
        .map_err(|_| LedgerError::Csv(format!("record {}: bad id '{}'", line, id)))?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|_| LedgerError::Csv(format!("record {}: bad date '{}'", line, date)))?;
    let rating = Rating::from_label(&rating)
        .ok_or_else(|| LedgerError::Csv(format!("record {}: bad rating '{}'", line, rating)))?;

    Ok(FactRow { id, text, date, rating, employee })
}

fn push_record<I: IntoIterator<Item = String>>(out: &mut String, fields: I) {
    let escaped: Vec<String> = fields.into_iter().map(|f| escape_field(&f)).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) || field.starts_with(' ') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split CSV text into records of raw fields
fn parse_records(input: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                quoted = false;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(LedgerError::Csv("unterminated quoted field".to_string()));
    }
    if quoted || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, text: &str, rating: Rating, employee: &str) -> FactRow {
        FactRow {
            id,
            text: text.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            rating,
            employee: employee.to_string(),
        }
    }

    #[test]
    fn test_header_and_plain_record() {
        let out = to_csv_string(&[row(7, "Closed ticket", Rating::Positive, "Ivanov")]);
        assert_eq!(
            out,
            "ID,Текст Факта,Дата Добавления,Оценка Факта,Сотрудник\n\
             7,Closed ticket,2024-03-05,положительная,Ivanov\n"
        );
    }

    #[test]
    fn test_quoting() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_field(" lead"), "\" lead\"");
    }

    #[test]
    fn test_awkward_text_survives_parse() {
        let rows = vec![
            row(1, "late, again", Rating::Negative, "Ivanov"),
            row(2, "said \"thanks\"\nto the team", Rating::Positive, "Petrova, A."),
            row(3, "", Rating::Neutral, "Sidorov"),
        ];
        let parsed = parse_facts_csv(&to_csv_string(&rows)).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = "ID,Текст Факта,Дата Добавления,Оценка Факта,Сотрудник\r\n1,x,2024-03-05,нейтральная,A\r\n";
        let parsed = parse_facts_csv(input).unwrap();
        assert_eq!(parsed, vec![row(1, "x", Rating::Neutral, "A")]);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(parse_facts_csv(""), Err(LedgerError::Csv(_))));
        assert!(matches!(parse_facts_csv("a,b\n"), Err(LedgerError::Csv(_))));

        let header = CSV_HEADER.join(",");
        assert!(parse_facts_csv(&format!("{}\n1,x,2024-03-05\n", header)).is_err());
        assert!(parse_facts_csv(&format!("{}\nx,x,2024-03-05,нейтральная,A\n", header)).is_err());
        assert!(parse_facts_csv(&format!("{}\n1,\"open,2024-03-05,нейтральная,A\n", header)).is_err());
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.csv");
        std::fs::write(&path, "stale content that is much longer than the export\n".repeat(10)).unwrap();

        let rows = vec![row(1, "x", Rating::Positive, "A")];
        assert_eq!(write_facts_csv(&path, &rows).await.unwrap(), 1);
        assert_eq!(read_facts_csv(&path).await.unwrap(), rows);
    }
}
