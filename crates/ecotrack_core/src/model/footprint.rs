//! Daily rollups and derived period views.

use crate::carbon::level::CarbonLevel;
use crate::model::category::Category;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-category kilogram totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub transport: f64,
    pub food: f64,
    pub energy: f64,
    pub shopping: f64,
    pub other: f64,
}

impl CategoryTotals {
    /// Totals with `value` in one category and zero elsewhere.
    pub fn single(category: Category, value: f64) -> Self {
        let mut totals = Self::default();
        totals.add(category, value);
        totals
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Transport => self.transport,
            Category::Food => self.food,
            Category::Energy => self.energy,
            Category::Shopping => self.shopping,
            Category::Other => self.other,
        }
    }

    pub fn add(&mut self, category: Category, value: f64) {
        let slot = match category {
            Category::Transport => &mut self.transport,
            Category::Food => &mut self.food,
            Category::Energy => &mut self.energy,
            Category::Shopping => &mut self.shopping,
            Category::Other => &mut self.other,
        };
        *slot += value;
    }

    /// Adds every category of `other` into `self`.
    pub fn merge(&mut self, other: &CategoryTotals) {
        for category in Category::ALL {
            self.add(category, other.get(category));
        }
    }

    /// Sum in fixed category order. Matches the store's generated `total`.
    pub fn sum(&self) -> f64 {
        self.transport + self.food + self.energy + self.shopping + self.other
    }

    /// `(category, value)` pairs in fixed enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// Category with the largest value; ties go to the earliest category.
    ///
    /// All-zero totals therefore yield `Transport`.
    pub fn dominant(&self) -> Category {
        let mut best = Category::ALL[0];
        let mut best_value = self.get(best);
        for (category, value) in self.iter().skip(1) {
            if value > best_value {
                best = category;
                best_value = value;
            }
        }
        best
    }
}

/// One `(user_id, day)` rollup row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFootprint {
    pub user_id: String,
    pub day: NaiveDate,
    pub by_category: CategoryTotals,
    /// Always `by_category.sum()`.
    pub total: f64,
}

/// Direction of change between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }
}

/// Current-vs-previous comparison. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub current_total: f64,
    pub previous_total: f64,
    pub trend: Trend,
    /// Absolute percentage change; `0` when the previous period is empty.
    pub change_percentage: f64,
    pub by_category: CategoryTotals,
    /// Category the recommendations were picked for.
    pub top_category: Category,
    pub recommendations: Vec<String>,
    pub level: CarbonLevel,
}

/// One chart sample per stored day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    /// Short display label such as `Mar 07`.
    pub label: String,
    pub total: f64,
    pub by_category: CategoryTotals,
}

impl From<&DailyFootprint> for ChartPoint {
    fn from(value: &DailyFootprint) -> Self {
        Self {
            date: value.day,
            label: value.day.format("%b %d").to_string(),
            total: value.total,
            by_category: value.by_category,
        }
    }
}
