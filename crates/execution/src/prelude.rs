//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use vol_lp_execution::prelude::*;
//! ```

// Artifacts
pub use crate::artifacts::{ArtifactError, ArtifactWriter, ErrorArtifact};

// Configuration
pub use crate::config::{ChainSettings, EngineConfig, SecretConfig};

// Errors
pub use crate::error::RebalanceError;

// Lifecycle
pub use crate::lifecycle::{
    InvalidTransition, LifecycleEvent, LifecycleState, LifecycleTracker, Stage,
};

// Strategy
pub use crate::strategy::{
    ChainConnector, ChainSummary, ClosedPosition, PositionLifecycleManager, Rebalancer,
    RunOutcome, UniswapConnector,
};
