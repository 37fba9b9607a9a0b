//! Per-invocation position lifecycle state machine.
//!
//! ```text
//! IDLE -> CLOSING -> COLLECTING -> (APPROVING)* -> MINTING -> DONE
//! ```
//!
//! `FAILED` is absorbing and reachable from every non-terminal state.
//! `COLLECTING -> CLOSING` allows several positions to be closed in turn and
//! `COLLECTING -> DONE` covers exits that mint nothing.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    #[default]
    Idle,
    Closing,
    Collecting,
    Approving,
    Minting,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid lifecycle transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: LifecycleState,
    pub to: LifecycleState,
}

impl LifecycleState {
    /// `DONE` and `FAILED` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn can_transition_to(&self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Idle, Closing) => true,
            (Closing, Collecting) => true,
            (Collecting, Closing | Approving | Minting | Done) => true,
            (Approving, Approving | Minting) => true,
            (Minting, Done) => true,
            _ => false,
        }
    }

    /// Returns `next` when the move is legal.
    pub fn advance(self, next: LifecycleState) -> Result<LifecycleState, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Closing => "CLOSING",
            Self::Collecting => "COLLECTING",
            Self::Approving => "APPROVING",
            Self::Minting => "MINTING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
