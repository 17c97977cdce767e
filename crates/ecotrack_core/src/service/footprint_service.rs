//! Carbon aggregation use-case service.
//!
//! # Responsibility
//! - Validate incoming events and fold them into daily rollups.
//! - Derive period summaries, trends, chart series and recommendations.
//!
//! # Invariants
//! - Nothing is written for an event that fails validation.
//! - Trend is `Stable` with change `0` whenever the previous period is empty.
//! - Recommendations always come from the dominant current-period category.
//! - Storage errors are propagated unchanged; there are no retries.

use crate::carbon::level::CarbonLevel;
use crate::model::event::{CarbonEvent, CarbonEventInput, CarbonEventValidationError};
use crate::model::footprint::{CategoryTotals, ChartPoint, DailyFootprint, PeriodSummary, Trend};
use crate::period::{InvalidPeriodError, PeriodWindow};
use crate::receipt::analyzer::ReceiptAnalysis;
use crate::repo::footprint_repo::{CarbonEventListQuery, FootprintRepository, RepoError};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Percentage change beyond which a trend counts as up or down.
pub const TREND_BAND_PERCENT: f64 = 5.0;

const EVENTS_DEFAULT_LIMIT: u32 = 50;
const EVENTS_LIMIT_MAX: u32 = 200;

pub type FootprintServiceResult<T> = Result<T, FootprintServiceError>;

/// Service error for aggregation use-cases.
#[derive(Debug)]
pub enum FootprintServiceError {
    InvalidCategory(String),
    InvalidImpact(f64),
    InvalidAmount(f64),
    MissingUserId,
    InvalidPeriod(InvalidPeriodError),
    /// Persistence-layer failure, passed through untouched.
    Repo(RepoError),
}

impl Display for FootprintServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCategory(value) => write!(
                f,
                "{}",
                CarbonEventValidationError::InvalidCategory(value.clone())
            ),
            Self::InvalidImpact(value) => {
                write!(f, "{}", CarbonEventValidationError::InvalidImpact(*value))
            }
            Self::InvalidAmount(value) => {
                write!(f, "{}", CarbonEventValidationError::InvalidAmount(*value))
            }
            Self::MissingUserId => write!(f, "{}", CarbonEventValidationError::MissingUserId),
            Self::InvalidPeriod(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FootprintServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPeriod(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CarbonEventValidationError> for FootprintServiceError {
    fn from(value: CarbonEventValidationError) -> Self {
        match value {
            CarbonEventValidationError::InvalidCategory(category) => Self::InvalidCategory(category),
            CarbonEventValidationError::InvalidImpact(impact) => Self::InvalidImpact(impact),
            CarbonEventValidationError::InvalidAmount(amount) => Self::InvalidAmount(amount),
            CarbonEventValidationError::MissingUserId => Self::MissingUserId,
        }
    }
}

impl From<RepoError> for FootprintServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => err.into(),
            other => Self::Repo(other),
        }
    }
}

impl From<InvalidPeriodError> for FootprintServiceError {
    fn from(value: InvalidPeriodError) -> Self {
        Self::InvalidPeriod(value)
    }
}

/// One page of event history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPage {
    pub items: Vec<CarbonEvent>,
    /// Matching events across all pages.
    pub total: u64,
    pub has_more: bool,
}

/// Use-case service over a footprint repository.
pub struct FootprintService<R: FootprintRepository> {
    repo: R,
}

impl<R: FootprintRepository> FootprintService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates one event and adds it to its `(user, day)` rollup.
    ///
    /// # Errors
    /// - `InvalidCategory`, `InvalidImpact`, `MissingUserId` before any write.
    /// - `Repo` when the store fails; the transaction is rolled back.
    pub fn record_event(&mut self, input: &CarbonEventInput) -> FootprintServiceResult<DailyFootprint> {
        let event = match CarbonEvent::from_input(input) {
            Ok(event) => event,
            Err(err) => {
                info!(
                    "event=footprint_record module=service status=rejected reason={}",
                    validation_reason(&err)
                );
                return Err(err.into());
            }
        };

        let started_at = Instant::now();
        match self.repo.record_event(&event) {
            Ok(footprint) => {
                info!(
                    "event=footprint_record module=service status=ok category={} day={} duration_ms={}",
                    event.category,
                    event.day,
                    started_at.elapsed().as_millis()
                );
                Ok(footprint)
            }
            Err(err) => {
                error!(
                    "event=footprint_record module=service status=error category={} day={} duration_ms={} error={}",
                    event.category,
                    event.day,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Records the single purchase event a receipt analysis stands for.
    pub fn record_receipt(
        &mut self,
        user_id: &str,
        occurred_at: NaiveDateTime,
        analysis: &ReceiptAnalysis,
    ) -> FootprintServiceResult<DailyFootprint> {
        self.record_event(&analysis.to_event_input(user_id, occurred_at))
    }

    /// Compares the `current` window against `previous` for one user.
    ///
    /// # Errors
    /// - `MissingUserId` for a blank user id.
    /// - `Repo` when either fetch fails.
    pub fn summarize(
        &self,
        user_id: &str,
        current: PeriodWindow,
        previous: PeriodWindow,
    ) -> FootprintServiceResult<PeriodSummary> {
        let user_id = require_user(user_id)?;
        let current_rows = self.fetch(user_id, current)?;
        let previous_rows = self.fetch(user_id, previous)?;

        let by_category = rollup(&current_rows);
        let current_total = sum_totals(&current_rows);
        let previous_total = sum_totals(&previous_rows);
        let (trend, change_percentage) = classify_trend(current_total, previous_total);
        let top_category = by_category.dominant();

        debug!(
            "event=footprint_summarize module=service status=ok current_days={} previous_days={} trend={} top_category={}",
            current_rows.len(),
            previous_rows.len(),
            trend.as_str(),
            top_category
        );

        Ok(PeriodSummary {
            current_total,
            previous_total,
            trend,
            change_percentage,
            by_category,
            top_category,
            recommendations: top_category
                .recommendations()
                .iter()
                .map(|tip| (*tip).to_string())
                .collect(),
            level: CarbonLevel::classify(current_total),
        })
    }

    /// Same as [`FootprintService::summarize`] with raw day bounds.
    pub fn summarize_between(
        &self,
        user_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
        previous_start: NaiveDate,
        previous_end: NaiveDate,
    ) -> FootprintServiceResult<PeriodSummary> {
        let current = PeriodWindow::new(period_start, period_end)?;
        let previous = PeriodWindow::new(previous_start, previous_end)?;
        self.summarize(user_id, current, previous)
    }

    /// One point per stored day in `window`, ascending by date.
    pub fn chart_series(
        &self,
        user_id: &str,
        window: PeriodWindow,
    ) -> FootprintServiceResult<Vec<ChartPoint>> {
        let user_id = require_user(user_id)?;
        let rows = self.fetch(user_id, window)?;
        Ok(rows.iter().map(ChartPoint::from).collect())
    }

    /// Event history page. Limit defaults to 50 and is clamped to 200.
    pub fn list_events(&self, query: &CarbonEventListQuery) -> FootprintServiceResult<EventPage> {
        require_user(&query.user_id)?;
        let mut query = query.clone();
        query.limit = Some(normalize_events_limit(query.limit));

        let items = self.repo.list_events(&query)?;
        let total = self.repo.count_events(&query)?;
        let seen = u64::from(query.offset) + items.len() as u64;
        Ok(EventPage {
            has_more: seen < total,
            items,
            total,
        })
    }

    fn fetch(&self, user_id: &str, window: PeriodWindow) -> FootprintServiceResult<Vec<DailyFootprint>> {
        let rows = self
            .repo
            .find_footprints_by_user_and_range(user_id, window.start(), window.end())?;
        Ok(rows)
    }
}

/// Per-category sums across rows.
pub fn rollup(rows: &[DailyFootprint]) -> CategoryTotals {
    rows.iter().fold(CategoryTotals::default(), |mut acc, row| {
        acc.merge(&row.by_category);
        acc
    })
}

fn sum_totals(rows: &[DailyFootprint]) -> f64 {
    rows.iter().map(|row| row.total).sum()
}

/// Trend and absolute percentage change from `previous` to `current`.
pub fn classify_trend(current: f64, previous: f64) -> (Trend, f64) {
    if previous <= 0.0 {
        return (Trend::Stable, 0.0);
    }

    let change = (current - previous) / previous * 100.0;
    let trend = if change > TREND_BAND_PERCENT {
        Trend::Up
    } else if change < -TREND_BAND_PERCENT {
        Trend::Down
    } else {
        Trend::Stable
    };
    (trend, change.abs())
}

/// Normalizes an event page size.
pub fn normalize_events_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => EVENTS_DEFAULT_LIMIT,
        Some(value) => value.min(EVENTS_LIMIT_MAX),
    }
}

fn require_user(user_id: &str) -> FootprintServiceResult<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(FootprintServiceError::MissingUserId);
    }
    Ok(trimmed)
}

fn validation_reason(err: &CarbonEventValidationError) -> &'static str {
    match err {
        CarbonEventValidationError::InvalidCategory(_) => "invalid_category",
        CarbonEventValidationError::InvalidImpact(_) => "invalid_impact",
        CarbonEventValidationError::InvalidAmount(_) => "invalid_amount",
        CarbonEventValidationError::MissingUserId => "missing_user_id",
    }
}
