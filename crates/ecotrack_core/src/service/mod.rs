//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into aggregation use-cases.
//! - Keep CLI and other front ends decoupled from storage details.

pub mod footprint_service;
