//! Reports rendered for the terminal and the CSV export
//!
//! Every fact listing goes through [`FactRow`], so the on-screen table and
//! the exported file carry the same tuples in the same order.

pub mod chart;
pub mod csv;
pub mod table;

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::collections::BTreeMap;

pub use chart::plot;
pub use csv::{read_facts_csv, write_facts_csv, CSV_HEADER};
pub use table::Table;

use crate::rating::Direction;
use crate::types::{Employee, Fact, FactWithEmployee, Rating};

/// Date layout shared by tables and the export
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One fact as shown in listings: id, text, date, rating, employee name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRow {
    pub id: i64,
    pub text: String,
    pub date: NaiveDate,
    pub rating: Rating,
    pub employee: String,
}

impl From<&FactWithEmployee> for FactRow {
    fn from(row: &FactWithEmployee) -> Self {
        Self {
            id: row.fact.id,
            text: row.fact.text.clone(),
            date: display_date(&row.fact.date_added),
            rating: row.fact.rating,
            employee: row.employee.full_name.clone(),
        }
    }
}

/// Calendar date of a timestamp in the local time zone
pub fn display_date(ts: &DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Table of all facts with their employee
pub fn facts_table(rows: &[FactRow]) -> Table {
    let mut table = Table::new(["ID", "Text", "Date Added", "Rating", "Employee"]);
    for row in rows {
        table.add_row([
            row.id.to_string(),
            row.text.clone(),
            row.date.format(DATE_FORMAT).to_string(),
            row.rating.to_string(),
            row.employee.clone(),
        ]);
    }
    table
}

/// Table of one employee's facts, without the employee column
pub fn recent_facts_table(facts: &[Fact]) -> Table {
    let mut table = Table::new(["Text", "Date Added", "Rating"]);
    for fact in facts {
        table.add_row([
            fact.text.clone(),
            display_date(&fact.date_added).format(DATE_FORMAT).to_string(),
            fact.rating.to_string(),
        ]);
    }
    table
}

pub fn employees_table(employees: &[Employee]) -> Table {
    let mut table = Table::new(["ID", "Full Name", "Position"]);
    for e in employees {
        table.add_row([e.id.to_string(), e.full_name.clone(), e.position.clone()]);
    }
    table
}

/// One line per employee name with its total
pub fn ratings_report(totals: &BTreeMap<String, i64>) -> String {
    totals
        .iter()
        .map(|(name, total)| format!("Employee {}: rating = {}\n", name, total))
        .collect()
}

/// Heading plus `name: total` lines for a top-N ranking
pub fn top_report(direction: Direction, limit: usize, ranked: &[(String, i64)]) -> String {
    let mut out = format!("Top {} employees by {} rating:\n", limit, direction.caption());
    for (name, total) in ranked {
        out.push_str(&format!("{}: {}\n", name, total));
    }
    out
}

/// Picker label for a fact offered for deletion
pub fn fact_choice_label(fact: &Fact) -> String {
    format!(
        "{} · {} · {}",
        display_date(&fact.date_added).format(DATE_FORMAT),
        fact.rating,
        fact.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> FactWithEmployee {
        FactWithEmployee {
            fact: Fact {
                id: 3,
                text: "Mentored a new hire".to_string(),
                date_added: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
                rating: Rating::Positive,
                employee_id: 1,
            },
            employee: Employee { id: 1, full_name: "Ivanov".into(), position: "Engineer".into() },
        }
    }

    #[test]
    fn test_fact_row_from_join() {
        let row = FactRow::from(&sample());
        assert_eq!(row.id, 3);
        assert_eq!(row.employee, "Ivanov");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_facts_table_columns() {
        let table = facts_table(&[FactRow::from(&sample())]);
        assert_eq!(
            table.rows()[0],
            vec!["3", "Mentored a new hire", "2024-03-05", "positive", "Ivanov"]
        );
    }

    #[test]
    fn test_recent_facts_table_has_three_columns() {
        let table = recent_facts_table(&[sample().fact]);
        assert_eq!(table.rows()[0], vec!["Mentored a new hire", "2024-03-05", "positive"]);
    }

    #[test]
    fn test_ratings_and_top_reports() {
        let mut totals = BTreeMap::new();
        totals.insert("Petrova".to_string(), -2);
        totals.insert("Ivanov".to_string(), 1);
        assert_eq!(
            ratings_report(&totals),
            "Employee Ivanov: rating = 1\nEmployee Petrova: rating = -2\n"
        );

        let top = top_report(Direction::Highest, 3, &[("Ivanov".to_string(), 1)]);
        assert_eq!(top, "Top 3 employees by positive rating:\nIvanov: 1\n");
    }

    #[test]
    fn test_fact_choice_label() {
        assert_eq!(fact_choice_label(&sample().fact), "2024-03-05 · positive · Mentored a new hire");
    }
}
