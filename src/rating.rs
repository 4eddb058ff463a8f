//! Rating engine
//!
//! Pure computations turning rated facts into numbers: per-employee totals,
//! the cumulative history plotted as a trend, and the top-N ranking.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::store::FactStore;
use crate::types::{Fact, Rating};

/// Which end of the ranking a top-N report shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Highest totals first
    Highest,
    /// Lowest totals first
    Lowest,
}

impl Direction {
    /// SQL ordering keyword for the total column
    pub fn sql_order(&self) -> &'static str {
        match self {
            Direction::Highest => "DESC",
            Direction::Lowest => "ASC",
        }
    }

    /// Caption for the report heading
    pub fn caption(&self) -> &'static str {
        match self {
            Direction::Highest => "positive",
            Direction::Lowest => "negative",
        }
    }
}

/// Delta for a raw stored label; anything but the exact persisted labels counts as neutral
pub fn rating_to_delta(label: &str) -> i64 {
    Rating::from_label(label).map_or(0, |r| r.delta())
}

/// Sum of deltas per employee name.
///
/// Keyed by display name: two employees sharing a name share one total.
pub fn aggregate_by_employee<I, N, L>(rows: I) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = (N, L)>,
    N: Into<String>,
    L: AsRef<str>,
{
    let mut totals = BTreeMap::new();
    for (name, label) in rows {
        *totals.entry(name.into()).or_insert(0) += rating_to_delta(label.as_ref());
    }
    totals
}

/// Prefix sums of rating deltas over facts already sorted by date
pub fn running_history(facts: &[Fact]) -> Vec<f64> {
    facts
        .iter()
        .scan(0i64, |total, fact| {
            *total += fact.rating.delta();
            Some(*total as f64)
        })
        .collect()
}

/// Totals from the store for every employee
pub async fn employee_totals(store: &FactStore) -> Result<BTreeMap<String, i64>> {
    let rows = store.list_rating_labels_with_employee_name().await?;
    Ok(aggregate_by_employee(rows))
}

/// Top `limit` employees by total rating from the chosen end of the ranking
pub async fn top_employees(
    store: &FactStore,
    direction: Direction,
    limit: usize,
) -> Result<Vec<(String, i64)>> {
    store.top_employees_by_rating(direction, limit).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn fact(id: i64, rating: Rating) -> Fact {
        Fact {
            id,
            text: format!("fact {}", id),
            date_added: Utc.with_ymd_and_hms(2024, 1, id as u32, 0, 0, 0).unwrap(),
            rating,
            employee_id: 1,
        }
    }

    #[test]
    fn test_rating_to_delta() {
        assert_eq!(rating_to_delta("положительная"), 1);
        assert_eq!(rating_to_delta("отрицательная"), -1);
        assert_eq!(rating_to_delta("нейтральная"), 0);
        assert_eq!(rating_to_delta(""), 0);
        assert_eq!(rating_to_delta("outstanding"), 0);
        assert_eq!(rating_to_delta("Положительная"), 0);
        assert_eq!(rating_to_delta("positive"), 0);
        assert_eq!(rating_to_delta("отрицательная "), 0);
    }

    #[test]
    fn test_aggregate_sums_per_name() {
        let rows = vec![
            ("Ivanov", "положительная"),
            ("Petrova", "отрицательная"),
            ("Ivanov", "отрицательная"),
            ("Ivanov", "положительная"),
            ("Sidorov", "нейтральная"),
        ];
        let totals = aggregate_by_employee(rows);

        assert_eq!(totals.get("Ivanov"), Some(&1));
        assert_eq!(totals.get("Petrova"), Some(&-1));
        assert_eq!(totals.get("Sidorov"), Some(&0));
        assert_eq!(totals.len(), 3);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let mut rows = vec![
            ("A".to_string(), "положительная".to_string()),
            ("B".to_string(), "отрицательная".to_string()),
            ("A".to_string(), "положительная".to_string()),
            ("B".to_string(), "junk".to_string()),
            ("A".to_string(), "отрицательная".to_string()),
        ];
        let forward = aggregate_by_employee(rows.clone());
        rows.reverse();
        let backward = aggregate_by_employee(rows.clone());
        rows.rotate_left(2);
        let rotated = aggregate_by_employee(rows);

        assert_eq!(forward, backward);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn test_running_history_example() {
        let facts = vec![
            fact(1, Rating::Positive),
            fact(2, Rating::Negative),
            fact(3, Rating::Positive),
        ];
        assert_eq!(running_history(&facts), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_running_history_empty() {
        assert!(running_history(&[]).is_empty());
    }

    #[test]
    fn test_running_history_prefix_property() {
        let ratings = [
            Rating::Negative, Rating::Negative, Rating::Neutral, Rating::Positive,
            Rating::Negative, Rating::Positive, Rating::Positive, Rating::Neutral,
        ];
        let facts: Vec<Fact> = ratings.iter().enumerate()
            .map(|(i, r)| fact(i as i64 + 1, *r))
            .collect();

        let history = running_history(&facts);
        assert_eq!(history.len(), facts.len());
        for i in 0..facts.len() {
            let expected: i64 = facts[..=i].iter().map(|f| f.rating.delta()).sum();
            assert_eq!(history[i], expected as f64);
        }
    }
}
