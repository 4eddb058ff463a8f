//! Shared record types
//!
//! Plain data rows for the two persisted entities and the rating scale
//! attached to every fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person facts are recorded about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub full_name: String,
    pub position: String,
}

impl Employee {
    /// Label used by pickers: `Full Name (Position)`
    pub fn picker_label(&self) -> String {
        format!("{} ({})", self.full_name, self.position)
    }
}

/// A timestamped, rated observation about one employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: i64,
    pub text: String,
    pub date_added: DateTime<Utc>,
    pub rating: Rating,
    pub employee_id: i64,
}

/// One row of the fact/employee inner join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactWithEmployee {
    pub fact: Fact,
    pub employee: Employee,
}

/// Qualitative rating of a fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Neutral,
    Positive,
    Negative,
}

impl Rating {
    /// All ratings in the order the rating prompt offers them
    pub const ALL: [Rating; 3] = [Rating::Neutral, Rating::Positive, Rating::Negative];

    /// Label persisted in the `factrating` column.
    ///
    /// These are the labels existing `system.db` files already contain.
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Neutral => "нейтральная",
            Rating::Positive => "положительная",
            Rating::Negative => "отрицательная",
        }
    }

    /// Parse a persisted label. Only the exact labels written by [`Rating::label`]
    /// are recognized, the same match the ranking SQL applies.
    pub fn from_label(s: &str) -> Option<Self> {
        Rating::ALL.into_iter().find(|r| r.label() == s)
    }

    /// Signed contribution of this rating to an employee's total
    pub fn delta(&self) -> i64 {
        match self {
            Rating::Positive => 1,
            Rating::Negative => -1,
            Rating::Neutral => 0,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Neutral => write!(f, "neutral"),
            Rating::Positive => write!(f, "positive"),
            Rating::Negative => write!(f, "negative"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for rating in Rating::ALL {
            assert_eq!(Rating::from_label(rating.label()), Some(rating));
        }
    }

    #[test]
    fn test_from_label_matches_persisted_labels_exactly() {
        assert_eq!(Rating::from_label("Положительная"), None);
        assert_eq!(Rating::from_label(" отрицательная"), None);
        assert_eq!(Rating::from_label("positive"), None);
        assert_eq!(Rating::from_label("great"), None);
    }

    #[test]
    fn test_picker_label() {
        let e = Employee { id: 1, full_name: "Ivanov".into(), position: "Engineer".into() };
        assert_eq!(e.picker_label(), "Ivanov (Engineer)");
    }
}
