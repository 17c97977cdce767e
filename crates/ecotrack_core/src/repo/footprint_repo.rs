//! Footprint repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Keep the `(user_id, day)` rollups and the append-only event log.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Increments are a single `INSERT .. ON CONFLICT DO UPDATE` keyed on the
//!   unique `(user_id, day)` pair; no read-then-write in Rust.
//! - `record_event` writes the event row and the increment in one
//!   `IMMEDIATE` transaction, so a failure leaves neither behind.
//! - Read paths reject invalid persisted state instead of masking it. An
//!   increment that would overflow a daily total to infinity fails the same
//!   check on the `RETURNING` row and rolls back.

use crate::db::DbError;
use crate::model::category::Category;
use crate::model::event::{validate_impact, CarbonEvent, CarbonEventValidationError};
use crate::model::footprint::{CategoryTotals, DailyFootprint};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const FOOTPRINT_COLUMNS: &str = "user_id, day, transport, food, energy, shopping, other, total";

const UPSERT_INCREMENT_SQL: &str = "INSERT INTO daily_footprints (
        user_id,
        day,
        transport,
        food,
        energy,
        shopping,
        other
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT (user_id, day) DO UPDATE SET
        transport = transport + excluded.transport,
        food = food + excluded.food,
        energy = energy + excluded.energy,
        shopping = shopping + excluded.shopping,
        other = other + excluded.other,
        updated_at = (strftime('%s', 'now') * 1000)
    RETURNING user_id, day, transport, food, energy, shopping, other, total;";

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    day,
    category,
    subcategory,
    description,
    amount,
    carbon_impact
FROM carbon_events";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for footprint persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CarbonEventValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted footprint data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<CarbonEventValidationError> for RepoError {
    fn from(value: CarbonEventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter and pagination options for event history.
#[derive(Debug, Clone, PartialEq)]
pub struct CarbonEventListQuery {
    pub user_id: String,
    pub category: Option<Category>,
    /// Inclusive lower bound on the event day.
    pub since: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl CarbonEventListQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            category: None,
            since: None,
            limit: None,
            offset: 0,
        }
    }
}

/// Datastore contract used by the aggregation service.
pub trait FootprintRepository {
    /// Rows for one user with `start <= day <= end`, ascending by day.
    fn find_footprints_by_user_and_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<DailyFootprint>>;
    /// Atomically adds `delta` to one category of the `(user_id, day)` row,
    /// creating the row on first use.
    fn upsert_footprint_increment(
        &self,
        user_id: &str,
        day: NaiveDate,
        category: Category,
        delta: f64,
    ) -> RepoResult<DailyFootprint>;
    /// Appends the event and applies its increment in one transaction.
    fn record_event(&mut self, event: &CarbonEvent) -> RepoResult<DailyFootprint>;
    /// Event history, newest day first.
    fn list_events(&self, query: &CarbonEventListQuery) -> RepoResult<Vec<CarbonEvent>>;
    /// Number of events matching the query filters (pagination ignored).
    fn count_events(&self, query: &CarbonEventListQuery) -> RepoResult<u64>;
}

/// SQLite-backed footprint repository.
pub struct SqliteFootprintRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteFootprintRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl FootprintRepository for SqliteFootprintRepository<'_> {
    fn find_footprints_by_user_and_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<DailyFootprint>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FOOTPRINT_COLUMNS}
             FROM daily_footprints
             WHERE user_id = ?1
               AND day >= ?2
               AND day <= ?3
             ORDER BY day ASC;"
        ))?;

        let mut rows = stmt.query(params![user_id, start, end])?;
        let mut footprints = Vec::new();
        while let Some(row) = rows.next()? {
            footprints.push(parse_footprint_row(row)?);
        }

        Ok(footprints)
    }

    fn upsert_footprint_increment(
        &self,
        user_id: &str,
        day: NaiveDate,
        category: Category,
        delta: f64,
    ) -> RepoResult<DailyFootprint> {
        validate_impact(delta)?;
        upsert_increment(self.conn, user_id, day, category, delta)
    }

    fn record_event(&mut self, event: &CarbonEvent) -> RepoResult<DailyFootprint> {
        event.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO carbon_events (
                id,
                user_id,
                day,
                category,
                subcategory,
                description,
                amount,
                carbon_impact
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                event.id.to_string(),
                event.user_id.as_str(),
                event.day,
                event.category.as_str(),
                event.subcategory.as_deref(),
                event.description.as_deref(),
                event.amount,
                event.carbon_impact,
            ],
        )?;
        let footprint = upsert_increment(
            &tx,
            event.user_id.as_str(),
            event.day,
            event.category,
            event.carbon_impact,
        )?;
        tx.commit()?;

        Ok(footprint)
    }

    fn list_events(&self, query: &CarbonEventListQuery) -> RepoResult<Vec<CarbonEvent>> {
        let (filter_sql, mut bind_values) = event_filter(query);
        let mut sql = format!("{EVENT_SELECT_SQL} {filter_sql}");
        sql.push_str(" ORDER BY day DESC, created_at DESC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }

    fn count_events(&self, query: &CarbonEventListQuery) -> RepoResult<u64> {
        let (filter_sql, bind_values) = event_filter(query);
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM carbon_events {filter_sql}"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative event count `{count}`")))
    }
}

fn upsert_increment(
    conn: &Connection,
    user_id: &str,
    day: NaiveDate,
    category: Category,
    delta: f64,
) -> RepoResult<DailyFootprint> {
    let increment = CategoryTotals::single(category, delta);
    let mut stmt = conn.prepare_cached(UPSERT_INCREMENT_SQL)?;
    let mut rows = stmt.query(params![
        user_id,
        day,
        increment.transport,
        increment.food,
        increment.energy,
        increment.shopping,
        increment.other,
    ])?;

    let row = rows
        .next()?
        .ok_or_else(|| RepoError::InvalidData("footprint upsert returned no row".to_string()))?;
    parse_footprint_row(row)
}

fn event_filter(query: &CarbonEventListQuery) -> (String, Vec<Value>) {
    let mut sql = String::from("WHERE user_id = ?");
    let mut bind_values = vec![Value::Text(query.user_id.clone())];

    if let Some(category) = query.category {
        sql.push_str(" AND category = ?");
        bind_values.push(Value::Text(category.as_str().to_string()));
    }

    if let Some(since) = query.since {
        sql.push_str(" AND day >= ?");
        bind_values.push(Value::Text(since.format("%Y-%m-%d").to_string()));
    }

    (sql, bind_values)
}

fn parse_footprint_row(row: &Row<'_>) -> RepoResult<DailyFootprint> {
    let by_category = CategoryTotals {
        transport: row.get("transport")?,
        food: row.get("food")?,
        energy: row.get("energy")?,
        shopping: row.get("shopping")?,
        other: row.get("other")?,
    };
    if let Some((category, value)) = by_category
        .iter()
        .find(|(_, value)| !value.is_finite() || *value < 0.0)
    {
        return Err(RepoError::InvalidData(format!(
            "{category} total `{value}` in daily_footprints is not a finite non-negative number"
        )));
    }
    let total: f64 = row.get("total")?;
    if !total.is_finite() {
        return Err(RepoError::InvalidData(format!(
            "total `{total}` in daily_footprints is not finite"
        )));
    }

    Ok(DailyFootprint {
        user_id: row.get("user_id")?,
        day: row.get("day")?,
        by_category,
        total,
    })
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<CarbonEvent> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in carbon_events.id"))
    })?;

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in carbon_events.category"
        ))
    })?;

    let event = CarbonEvent {
        id,
        user_id: row.get("user_id")?,
        day: row.get("day")?,
        category,
        carbon_impact: row.get("carbon_impact")?,
        amount: row.get("amount")?,
        subcategory: row.get("subcategory")?,
        description: row.get("description")?,
    };
    event.validate()?;
    Ok(event)
}
