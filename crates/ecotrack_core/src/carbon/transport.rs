//! Journey modes and their per-kilometre factors.

use crate::model::category::Category;
use crate::model::event::CarbonEventInput;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    Car,
    ElectricCar,
    Bus,
    Train,
    Bike,
    Walk,
    Plane,
}

impl TransportMode {
    pub const ALL: [TransportMode; 7] = [
        TransportMode::Car,
        TransportMode::ElectricCar,
        TransportMode::Bus,
        TransportMode::Train,
        TransportMode::Bike,
        TransportMode::Walk,
        TransportMode::Plane,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::ElectricCar => "electric-car",
            Self::Bus => "bus",
            Self::Train => "train",
            Self::Bike => "bike",
            Self::Walk => "walk",
            Self::Plane => "plane",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Car => "Car (Gasoline)",
            Self::ElectricCar => "Electric Car",
            Self::Bus => "Bus",
            Self::Train => "Train/Metro",
            Self::Bike => "Bicycle",
            Self::Walk => "Walking",
            Self::Plane => "Airplane",
        }
    }

    /// kg CO₂e per kilometre.
    pub fn kg_per_km(self) -> f64 {
        match self {
            Self::Car => 0.21,
            Self::ElectricCar => 0.05,
            Self::Bus => 0.08,
            Self::Train => 0.04,
            Self::Bike | Self::Walk => 0.0,
            Self::Plane => 0.25,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.id() == normalized.as_str())
    }
}

/// Impact of one journey. Negative or non-finite distances count as zero.
pub fn journey_impact(mode: TransportMode, distance_km: f64) -> f64 {
    if !distance_km.is_finite() || distance_km <= 0.0 {
        return 0.0;
    }
    distance_km * mode.kg_per_km()
}

/// Builds the transport event for a journey, with the mode as subcategory.
pub fn journey_event(
    user_id: impl Into<String>,
    occurred_at: NaiveDateTime,
    mode: TransportMode,
    distance_km: f64,
    from: &str,
    to: &str,
) -> CarbonEventInput {
    CarbonEventInput::new(
        user_id,
        occurred_at,
        Category::Transport.as_str(),
        journey_impact(mode, distance_km),
    )
    .with_subcategory(mode.id())
    .with_description(format!(
        "{}: {} → {} ({}km)",
        mode.display_name(),
        from.trim(),
        to.trim(),
        distance_km
    ))
}
