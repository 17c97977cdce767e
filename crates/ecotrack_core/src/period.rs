//! Report windows and the named presets callers derive them from.
//!
//! # Invariants
//! - A `PeriodWindow` always satisfies `start <= end`; both bounds inclusive.
//! - Presets resolve to windows ending on the supplied `today`.

use chrono::{Datelike, Days, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static PRESET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,4})\s*(day|days|month|months|year|years)$").expect("valid preset regex")
});

/// Preset used when a caller supplies none or an unrecognized one.
pub const DEFAULT_PRESET: PeriodPreset = PeriodPreset::Months(6);

/// Rejected window bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPeriodError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Display for InvalidPeriodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid period: start {} is after end {}",
            self.start, self.end
        )
    }
}

impl Error for InvalidPeriodError {}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl PeriodWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidPeriodError> {
        if start > end {
            return Err(InvalidPeriodError { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both bounds.
    pub fn len_days(&self) -> u64 {
        // start <= end, so the difference is never negative.
        (self.end - self.start).num_days().unsigned_abs() + 1
    }

    /// Window of the same length ending the day before `start`.
    ///
    /// Returns `None` when that would fall before the earliest representable date.
    pub fn preceding(&self) -> Option<Self> {
        let end = self.start.checked_sub_days(Days::new(1))?;
        let start = end.checked_sub_days(Days::new(self.len_days() - 1))?;
        Some(Self { start, end })
    }
}

/// Named lookback such as `7days` or `6months`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodPreset {
    Days(u32),
    Months(u32),
}

impl PeriodPreset {
    /// Parses `N days|months|years` in any of the spellings the dashboards use
    /// (`7days`, `30days`, `3months`, `6months`, `1year`). Years become months.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let captures = PRESET_RE.captures(&normalized)?;
        let count: u32 = captures[1].parse().ok()?;
        if count == 0 {
            return None;
        }
        match &captures[2] {
            "day" | "days" => Some(Self::Days(count)),
            "month" | "months" => Some(Self::Months(count)),
            _ => count.checked_mul(12).map(Self::Months),
        }
    }

    /// Like [`PeriodPreset::parse`], falling back to [`DEFAULT_PRESET`].
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(DEFAULT_PRESET)
    }

    /// Window ending on `today` and reaching back by the preset length.
    pub fn resolve(self, today: NaiveDate) -> PeriodWindow {
        let start = match self {
            Self::Days(days) => today.checked_sub_days(Days::new(u64::from(days))),
            Self::Months(months) => today.checked_sub_months(Months::new(months)),
        };
        PeriodWindow {
            start: start.unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }
}

impl Display for PeriodPreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Days(days) => write!(f, "{days}days"),
            Self::Months(months) if months % 12 == 0 => write!(f, "{}year", months / 12),
            Self::Months(months) => write!(f, "{months}months"),
        }
    }
}

/// Full calendar month containing `day`.
pub fn month_window(day: NaiveDate) -> PeriodWindow {
    let start = day.with_day(1).unwrap_or(day);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    PeriodWindow { start, end }
}

/// `(current month, previous month)` around `today`, as the dashboard compares them.
pub fn calendar_month_comparison(today: NaiveDate) -> (PeriodWindow, PeriodWindow) {
    let current = month_window(today);
    let previous = current
        .start
        .pred_opt()
        .map(month_window)
        .unwrap_or(current);
    (current, previous)
}

#[cfg(test)]
mod tests {
    use super::{
        calendar_month_comparison, month_window, PeriodPreset, PeriodWindow, DEFAULT_PRESET,
    };
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_rejects_reversed_bounds() {
        let err = PeriodWindow::new(day(2025, 2, 2), day(2025, 2, 1)).unwrap_err();
        assert_eq!(err.start, day(2025, 2, 2));
        assert!(PeriodWindow::new(day(2025, 2, 1), day(2025, 2, 1)).is_ok());
    }

    #[test]
    fn preceding_window_has_same_length() {
        let window = PeriodWindow::new(day(2025, 3, 1), day(2025, 3, 10)).unwrap();
        let previous = window.preceding().unwrap();
        assert_eq!(previous.start(), day(2025, 2, 19));
        assert_eq!(previous.end(), day(2025, 2, 28));
        assert_eq!(previous.len_days(), window.len_days());
    }

    #[test]
    fn presets_parse_dashboard_spellings() {
        assert_eq!(PeriodPreset::parse("7days"), Some(PeriodPreset::Days(7)));
        assert_eq!(PeriodPreset::parse("30days"), Some(PeriodPreset::Days(30)));
        assert_eq!(PeriodPreset::parse("3months"), Some(PeriodPreset::Months(3)));
        assert_eq!(PeriodPreset::parse(" 1Year "), Some(PeriodPreset::Months(12)));
        assert_eq!(PeriodPreset::parse("0days"), None);
        assert_eq!(PeriodPreset::parse("fortnight"), None);
        assert_eq!(PeriodPreset::parse_or_default(Some("bogus")), DEFAULT_PRESET);
        assert_eq!(PeriodPreset::parse_or_default(None), PeriodPreset::Months(6));
    }

    #[test]
    fn presets_resolve_against_today() {
        let today = day(2025, 8, 31);
        let week = PeriodPreset::Days(7).resolve(today);
        assert_eq!(week.start(), day(2025, 8, 24));
        assert_eq!(week.end(), today);

        // Month arithmetic clamps to the last valid day.
        let half_year = PeriodPreset::Months(6).resolve(today);
        assert_eq!(half_year.start(), day(2025, 2, 28));
    }

    #[test]
    fn preset_display_round_trips_through_parse() {
        for preset in [
            PeriodPreset::Days(7),
            PeriodPreset::Months(3),
            PeriodPreset::Months(12),
        ] {
            assert_eq!(PeriodPreset::parse(&preset.to_string()), Some(preset));
        }
    }

    #[test]
    fn month_comparison_spans_whole_months() {
        let (current, previous) = calendar_month_comparison(day(2024, 3, 15));
        assert_eq!(current, month_window(day(2024, 3, 1)));
        assert_eq!(current.end(), day(2024, 3, 31));
        assert_eq!(previous.start(), day(2024, 2, 1));
        assert_eq!(previous.end(), day(2024, 2, 29));
    }
}
