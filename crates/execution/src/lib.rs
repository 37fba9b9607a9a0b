//! Rebalance engine.
//!
//! This crate ties the forecast and the chain together:
//! - Secret and engine configuration
//! - Error taxonomy for a run
//! - Position lifecycle state machine and progress events
//! - Position lifecycle manager and the rebalance orchestrator
//! - Output artifacts and the text report

/// Prelude module for convenient imports.
pub mod prelude;

/// Output artifacts.
pub mod artifacts;
/// Secret and engine configuration.
pub mod config;
/// Run-level errors.
pub mod error;
/// Position lifecycle tracking.
pub mod lifecycle;
/// Plain-text report.
pub mod report;
/// Strategy execution.
pub mod strategy;
