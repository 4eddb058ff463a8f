//! SQLite-based persistent storage for employees and facts

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::rating::Direction;
use crate::types::{Employee, Fact, FactWithEmployee, Rating};

/// Columns selected for a fact, in `fact_from_row` order
const FACT_COLUMNS: &str = "f.id, f.text, f.dateadded, f.factrating, f.employeeid";

/// GLOB matching exactly what `format_timestamp` writes
const CANONICAL_TIMESTAMP_GLOB: &str =
    "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]T[0-9][0-9]:[0-9][0-9]:[0-9][0-9].[0-9][0-9][0-9][0-9][0-9][0-9]Z";

/// SQLite-backed store for the `employee` and `fact` tables
#[derive(Clone)]
pub struct FactStore {
    conn: Arc<Mutex<Connection>>,
}

impl FactStore {
    /// Open (or create) the database file at the given path
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let conn = Connection::open(&path)?;
        Self::init_schema(&conn)?;
        Self::normalize_timestamps(&conn)?;
        debug!("Opened fact store at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create both tables if they do not exist yet.
    ///
    /// The foreign key is declared only; SQLite leaves it unenforced unless
    /// `PRAGMA foreign_keys` is switched on, and bulk deletes rely on that.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS employee (
                "id" integer NOT NULL PRIMARY KEY AUTOINCREMENT,
                "fullname" TEXT,
                "position" TEXT
            );

            CREATE TABLE IF NOT EXISTS fact (
                "id" integer NOT NULL PRIMARY KEY AUTOINCREMENT,
                "text" TEXT,
                "dateadded" DATETIME,
                "factrating" TEXT,
                "employeeid" INTEGER,
                FOREIGN KEY (employeeid) REFERENCES employee (id)
            );

            CREATE INDEX IF NOT EXISTS idx_fact_employee_date ON fact(employeeid, dateadded);
        "#)?;

        Ok(())
    }

    /// Rewrite `dateadded` values stored in any other accepted layout into the
    /// canonical one. Date ordering and the recent-window cutoff compare the
    /// column as text, which only orders correctly once every row is UTC `Z`.
    ///
    /// Returns the number of rows rewritten. Unparseable values are left alone.
    fn normalize_timestamps(conn: &Connection) -> Result<usize> {
        let stale = {
            let mut stmt = conn.prepare(
                "SELECT id, dateadded FROM fact
                 WHERE typeof(dateadded) = 'text' AND dateadded NOT GLOB ?1"
            )?;
            let rows = stmt
                .query_map(params![CANONICAL_TIMESTAMP_GLOB], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };
        if stale.is_empty() {
            return Ok(0);
        }

        let tx = conn.unchecked_transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare("UPDATE fact SET dateadded = ?1 WHERE id = ?2")?;
            for (id, raw) in &stale {
                match parse_timestamp(raw) {
                    Some(ts) => updated += stmt.execute(params![format_timestamp(&ts), id])?,
                    None => warn!(id, raw = %raw, "Unrecognized fact timestamp left as stored"),
                }
            }
        }
        tx.commit()?;

        info!(updated, "Normalized fact timestamps");
        Ok(updated)
    }

    /// Insert a new employee and return it with its generated id
    pub async fn create_employee(&self, full_name: &str, position: &str) -> Result<Employee> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO employee (fullname, position) VALUES (?1, ?2)",
            params![full_name, position],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, "Inserted employee");

        Ok(Employee {
            id,
            full_name: full_name.to_string(),
            position: position.to_string(),
        })
    }

    /// All employees in insertion order
    pub async fn list_employees(&self) -> Result<Vec<Employee>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare_cached(
            "SELECT id, fullname, position FROM employee ORDER BY id"
        )?;
        let employees = stmt
            .query_map([], |row| employee_from_row(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(count = employees.len(), "Listed employees");
        Ok(employees)
    }

    /// Insert a fact stamped with `now`.
    ///
    /// The employee id is not checked; callers pick it from `list_employees`.
    pub async fn create_fact(
        &self,
        text: &str,
        rating: Rating,
        employee_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Fact> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO fact (text, dateadded, factrating, employeeid) VALUES (?1, ?2, ?3, ?4)",
            params![text, format_timestamp(&now), rating.label(), employee_id],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, employee_id, %rating, "Inserted fact");

        Ok(Fact {
            id,
            text: text.to_string(),
            date_added: now,
            rating,
            employee_id,
        })
    }

    /// Every fact joined to its owning employee, in fact id order
    pub async fn list_facts_with_employee(&self) -> Result<Vec<FactWithEmployee>> {
        let conn = self.conn.lock().await;

        let sql = format!(
            "SELECT {FACT_COLUMNS}, e.id, e.fullname, e.position
             FROM fact f
             JOIN employee e ON f.employeeid = e.id
             ORDER BY f.id"
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(FactWithEmployee {
                    fact: fact_from_row(row, 0)?,
                    employee: employee_from_row(row, 5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(count = rows.len(), "Listed facts with employees");
        Ok(rows)
    }

    /// Facts for one employee added at or after `since`, oldest first
    pub async fn list_recent_facts_for_employee(
        &self,
        employee_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Fact>> {
        let conn = self.conn.lock().await;

        let sql = format!(
            "SELECT {FACT_COLUMNS} FROM fact f
             WHERE f.employeeid = ?1 AND f.dateadded >= ?2
             ORDER BY f.dateadded, f.id"
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let facts = stmt
            .query_map(params![employee_id, format_timestamp(&since)], |row| fact_from_row(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(employee_id, count = facts.len(), "Listed recent facts");
        Ok(facts)
    }

    /// The `n` most recent facts for one employee, newest first
    pub async fn list_last_n_facts_for_employee(&self, employee_id: i64, n: usize) -> Result<Vec<Fact>> {
        let conn = self.conn.lock().await;

        let sql = format!(
            "SELECT {FACT_COLUMNS} FROM fact f
             WHERE f.employeeid = ?1
             ORDER BY f.dateadded DESC, f.id DESC
             LIMIT ?2"
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let facts = stmt
            .query_map(params![employee_id, n as i64], |row| fact_from_row(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(employee_id, count = facts.len(), "Listed last facts");
        Ok(facts)
    }

    /// All facts for one employee, oldest first (input for the trend chart)
    pub async fn list_facts_for_employee_chronological(&self, employee_id: i64) -> Result<Vec<Fact>> {
        let conn = self.conn.lock().await;

        let sql = format!(
            "SELECT {FACT_COLUMNS} FROM fact f
             WHERE f.employeeid = ?1
             ORDER BY f.dateadded, f.id"
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let facts = stmt
            .query_map(params![employee_id], |row| fact_from_row(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(facts)
    }

    /// `(employee full name, raw rating label)` for every joined fact
    pub async fn list_rating_labels_with_employee_name(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare_cached(
            "SELECT e.fullname, f.factrating
             FROM fact f
             JOIN employee e ON f.employeeid = e.id
             ORDER BY f.id"
        )?;
        let rows = stmt
            .query_map([], |row| {
                let name: Option<String> = row.get(0)?;
                let label: Option<String> = row.get(1)?;
                Ok((name.unwrap_or_default(), label.unwrap_or_default()))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Delete one fact; returns false when no row had that id
    pub async fn delete_fact(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().await;

        let deleted = conn.execute("DELETE FROM fact WHERE id = ?1", params![id])?;
        debug!(id, deleted, "Deleted fact");
        Ok(deleted > 0)
    }

    /// Delete every fact; returns the number of rows removed
    pub async fn delete_all_facts(&self) -> Result<usize> {
        let conn = self.conn.lock().await;

        let deleted = conn.execute("DELETE FROM fact", [])?;
        debug!(deleted, "Deleted all facts");
        Ok(deleted)
    }

    /// Delete every employee; facts are left for the caller to clear
    pub async fn delete_all_employees(&self) -> Result<usize> {
        let conn = self.conn.lock().await;

        let deleted = conn.execute("DELETE FROM employee", [])?;
        debug!(deleted, "Deleted all employees");
        Ok(deleted)
    }

    /// Employees ranked by total rating.
    ///
    /// Employees without facts take part with a total of 0. Equal totals keep
    /// employee id order.
    pub async fn top_employees_by_rating(
        &self,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<(String, i64)>> {
        let conn = self.conn.lock().await;

        let sql = format!(
            "SELECT e.fullname,
                    COALESCE(SUM(CASE f.factrating WHEN ?1 THEN 1 WHEN ?2 THEN -1 ELSE 0 END), 0) AS total_rating
             FROM employee e
             LEFT JOIN fact f ON e.id = f.employeeid
             GROUP BY e.id
             ORDER BY total_rating {}, e.id
             LIMIT ?3",
            direction.sql_order()
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(
                params![Rating::Positive.label(), Rating::Negative.label(), limit as i64],
                |row| {
                    let name: Option<String> = row.get(0)?;
                    let total: i64 = row.get(1)?;
                    Ok((name.unwrap_or_default(), total))
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(?direction, count = rows.len(), "Ranked employees");
        Ok(rows)
    }

    /// Row counts as `(employees, facts)`
    pub async fn counts(&self) -> Result<(usize, usize)> {
        let conn = self.conn.lock().await;

        let employees: i64 = conn.query_row("SELECT COUNT(*) FROM employee", [], |row| row.get(0))?;
        let facts: i64 = conn.query_row("SELECT COUNT(*) FROM fact", [], |row| row.get(0))?;

        Ok((employees as usize, facts as usize))
    }
}

/// Fixed-width UTC RFC 3339, so text order equals time order
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 and the `2006-01-02 15:04:05.999999999-07:00` layout
/// found in databases written by earlier tools.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z"))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

fn employee_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Employee> {
    let full_name: Option<String> = row.get(offset + 1)?;
    let position: Option<String> = row.get(offset + 2)?;

    Ok(Employee {
        id: row.get(offset)?,
        full_name: full_name.unwrap_or_default(),
        position: position.unwrap_or_default(),
    })
}

fn fact_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Fact> {
    let id: i64 = row.get(offset)?;
    let text: Option<String> = row.get(offset + 1)?;
    let date_str: String = row.get(offset + 2)?;
    let label: Option<String> = row.get(offset + 3)?;
    let employee_id: Option<i64> = row.get(offset + 4)?;

    let date_added = parse_timestamp(&date_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            offset + 2,
            Type::Text,
            format!("unrecognized timestamp '{}' in fact {}", date_str, id).into(),
        )
    })?;

    let label = label.unwrap_or_default();
    let rating = Rating::from_label(&label).unwrap_or_else(|| {
        warn!(id, label = %label, "Unrecognized fact rating, treating as neutral");
        Rating::Neutral
    });

    Ok(Fact {
        id,
        text: text.unwrap_or_default(),
        date_added,
        rating,
        employee_id: employee_id.unwrap_or_default(),
    })
}
