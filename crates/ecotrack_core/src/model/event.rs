//! Carbon event model.
//!
//! # Responsibility
//! - Carry one carbon-generating activity from capture to the daily rollup.
//! - Turn raw upstream input into a validated, day-truncated event.
//!
//! # Invariants
//! - `carbon_impact` is finite and non-negative.
//! - `amount`, when present, is finite.
//! - `user_id` is never blank.
//! - Events are immutable after creation; only their daily bucket changes.

use crate::model::category::Category;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CarbonEventId = Uuid;

/// Validation failures for incoming carbon events.
#[derive(Debug, Clone, PartialEq)]
pub enum CarbonEventValidationError {
    /// Category text is not one of the five known keys.
    InvalidCategory(String),
    /// Impact is negative or not a finite number.
    InvalidImpact(f64),
    /// Amount is present but NaN or infinite.
    InvalidAmount(f64),
    MissingUserId,
}

impl Display for CarbonEventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCategory(value) => write!(
                f,
                "invalid category `{value}`; expected transport|food|energy|shopping|other"
            ),
            Self::InvalidImpact(value) => {
                write!(f, "invalid carbon impact {value}; must be a non-negative number")
            }
            Self::InvalidAmount(value) => {
                write!(f, "invalid amount {value}; must be a finite number")
            }
            Self::MissingUserId => write!(f, "user id cannot be empty"),
        }
    }
}

impl Error for CarbonEventValidationError {}

/// Raw event as handed over by a capture flow (receipt scan, journey form,
/// purchase form). Nothing here is trusted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonEventInput {
    pub user_id: String,
    /// Time of day is discarded when the event is bucketed.
    pub occurred_at: NaiveDateTime,
    pub category: String,
    pub carbon_impact: f64,
    /// Currency value, informational only.
    pub amount: Option<f64>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
}

impl CarbonEventInput {
    pub fn new(
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
        category: impl Into<String>,
        carbon_impact: f64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            occurred_at,
            category: category.into(),
            carbon_impact,
            amount: None,
            subcategory: None,
            description: None,
        }
    }

    /// Same as [`CarbonEventInput::new`] for callers that only know the day.
    pub fn on_day(
        user_id: impl Into<String>,
        day: NaiveDate,
        category: impl Into<String>,
        carbon_impact: f64,
    ) -> Self {
        Self::new(user_id, day.and_time(chrono::NaiveTime::MIN), category, carbon_impact)
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Validated carbon event, bucketed to its calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonEvent {
    pub id: CarbonEventId,
    pub user_id: String,
    pub day: NaiveDate,
    pub category: Category,
    pub carbon_impact: f64,
    pub amount: Option<f64>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
}

impl CarbonEvent {
    /// Validates raw input and assigns a fresh event id.
    ///
    /// Category is checked before impact, so input that is wrong in both
    /// ways reports `InvalidCategory`.
    pub fn from_input(input: &CarbonEventInput) -> Result<Self, CarbonEventValidationError> {
        let category = Category::parse(&input.category)
            .ok_or_else(|| CarbonEventValidationError::InvalidCategory(input.category.clone()))?;

        let event = Self {
            id: Uuid::new_v4(),
            user_id: input.user_id.trim().to_string(),
            day: input.occurred_at.date(),
            category,
            carbon_impact: input.carbon_impact,
            amount: input.amount,
            subcategory: normalize_optional_text(input.subcategory.as_deref()),
            description: normalize_optional_text(input.description.as_deref()),
        };
        event.validate()?;
        Ok(event)
    }

    /// Checks invariants that the type system cannot express.
    pub fn validate(&self) -> Result<(), CarbonEventValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(CarbonEventValidationError::MissingUserId);
        }
        validate_impact(self.carbon_impact)?;
        match self.amount {
            Some(amount) if !amount.is_finite() => {
                Err(CarbonEventValidationError::InvalidAmount(amount))
            }
            _ => Ok(()),
        }
    }
}

/// Rejects negative, NaN and infinite impacts.
pub fn validate_impact(value: f64) -> Result<(), CarbonEventValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CarbonEventValidationError::InvalidImpact(value))
    }
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{CarbonEvent, CarbonEventInput, CarbonEventValidationError};
    use crate::model::category::Category;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 45, 0)
            .unwrap()
    }

    #[test]
    fn from_input_truncates_to_day_and_parses_category() {
        let input = CarbonEventInput::new("user-1", at(14, 23), " Food ", 2.5)
            .with_amount(12.0)
            .with_subcategory("dairy")
            .with_description("   ");
        let event = CarbonEvent::from_input(&input).unwrap();

        assert_eq!(event.day, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(event.category, Category::Food);
        assert_eq!(event.amount, Some(12.0));
        assert_eq!(event.subcategory.as_deref(), Some("dairy"));
        assert_eq!(event.description, None);
    }

    #[test]
    fn from_input_rejects_unknown_category() {
        let input = CarbonEventInput::new("user-1", at(1, 8), "invalid", 1.0);
        assert_eq!(
            CarbonEvent::from_input(&input).unwrap_err(),
            CarbonEventValidationError::InvalidCategory("invalid".to_string())
        );
    }

    #[test]
    fn from_input_rejects_negative_and_non_finite_impact() {
        let negative = CarbonEventInput::new("user-1", at(1, 8), "food", -1.0);
        assert!(matches!(
            CarbonEvent::from_input(&negative),
            Err(CarbonEventValidationError::InvalidImpact(value)) if value == -1.0
        ));

        let nan = CarbonEventInput::new("user-1", at(1, 8), "food", f64::NAN);
        assert!(matches!(
            CarbonEvent::from_input(&nan),
            Err(CarbonEventValidationError::InvalidImpact(_))
        ));
    }

    #[test]
    fn from_input_rejects_blank_user() {
        let input = CarbonEventInput::new("  ", at(1, 8), "energy", 1.0);
        assert_eq!(
            CarbonEvent::from_input(&input).unwrap_err(),
            CarbonEventValidationError::MissingUserId
        );
    }

    #[test]
    fn from_input_rejects_non_finite_amount() {
        let input =
            CarbonEventInput::new("user-1", at(1, 8), "shopping", 1.0).with_amount(f64::INFINITY);
        assert_eq!(
            CarbonEvent::from_input(&input).unwrap_err(),
            CarbonEventValidationError::InvalidAmount(f64::INFINITY)
        );
    }

    #[test]
    fn zero_impact_is_valid() {
        let input = CarbonEventInput::new("user-1", at(2, 9), "transport", 0.0);
        assert!(CarbonEvent::from_input(&input).is_ok());
    }
}
