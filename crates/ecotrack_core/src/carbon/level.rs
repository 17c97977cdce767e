//! Coarse classification and formatting of carbon totals.

use serde::{Deserialize, Serialize};

/// Qualitative band for a period total in kg CO₂e.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarbonLevel {
    Excellent,
    Good,
    Average,
    High,
}

impl CarbonLevel {
    /// `< 50` excellent, `< 100` good, `< 200` average, otherwise high.
    pub fn classify(total_kg: f64) -> Self {
        if total_kg < 50.0 {
            Self::Excellent
        } else if total_kg < 100.0 {
            Self::Good
        } else if total_kg < 200.0 {
            Self::Average
        } else {
            Self::High
        }
    }

    /// One-line message shown next to a period total.
    pub fn description(self) -> &'static str {
        match self {
            Self::Excellent => "Your carbon footprint is very low!",
            Self::Good => "You're doing well, keep it up!",
            Self::Average => "There's room for improvement",
            Self::High => "Consider reducing your carbon footprint",
        }
    }
}

/// Formats a value for display: grams below 1 kg, one decimal kg otherwise.
pub fn format_carbon_value(value_kg: f64) -> String {
    if value_kg < 1.0 {
        format!("{}g CO₂", (value_kg * 1000.0).round())
    } else {
        format!("{value_kg:.1}kg CO₂")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_carbon_value, CarbonLevel};

    #[test]
    fn classify_uses_half_open_bands() {
        assert_eq!(CarbonLevel::classify(0.0), CarbonLevel::Excellent);
        assert_eq!(CarbonLevel::classify(49.99), CarbonLevel::Excellent);
        assert_eq!(CarbonLevel::classify(50.0), CarbonLevel::Good);
        assert_eq!(CarbonLevel::classify(199.9), CarbonLevel::Average);
        assert_eq!(CarbonLevel::classify(200.0), CarbonLevel::High);
    }

    #[test]
    fn description_tracks_level() {
        assert_eq!(
            CarbonLevel::classify(10.0).description(),
            "Your carbon footprint is very low!"
        );
        assert_eq!(
            CarbonLevel::High.description(),
            "Consider reducing your carbon footprint"
        );
    }

    #[test]
    fn format_switches_units_at_one_kilogram() {
        assert_eq!(format_carbon_value(0.8), "800g CO₂");
        assert_eq!(format_carbon_value(12.34), "12.3kg CO₂");
        assert_eq!(format_carbon_value(1.0), "1.0kg CO₂");
    }
}
