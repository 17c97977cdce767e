//! Core domain logic for EcoTrack carbon accounting.
//! This crate is the single source of truth for footprint invariants.

pub mod carbon;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod period;
pub mod receipt;
pub mod repo;
pub mod service;

pub use carbon::level::{format_carbon_value, CarbonLevel};
pub use carbon::transport::{journey_event, journey_impact, TransportMode};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::category::Category;
pub use model::event::{CarbonEvent, CarbonEventId, CarbonEventInput, CarbonEventValidationError};
pub use model::footprint::{CategoryTotals, ChartPoint, DailyFootprint, PeriodSummary, Trend};
pub use period::{calendar_month_comparison, InvalidPeriodError, PeriodPreset, PeriodWindow};
pub use receipt::analyzer::{
    AnalyzerError, MockReceiptAnalyzer, ReceiptAnalysis, ReceiptAnalyzer, ReceiptImage,
    ReceiptItem,
};
pub use receipt::registry::{AnalyzerRegistry, AnalyzerRegistryError};
pub use repo::footprint_repo::{
    CarbonEventListQuery, FootprintRepository, RepoError, RepoResult, SqliteFootprintRepository,
};
pub use service::footprint_service::{
    EventPage, FootprintService, FootprintServiceError, FootprintServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
