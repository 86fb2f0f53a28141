//! Error types for the placement core
//!
//! Transient conditions (indicator not present, no panel for a monitor) are
//! reported as diagnostics, not errors. These variants are the invariant
//! violations and host failures.

use thiserror::Error;

use crate::placement::BoxSlot;

/// Result type for placement operations
pub type Result<T> = std::result::Result<T, PlacementError>;

/// Failure reported by the host shell
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("host failure on monitor {monitor}: {reason}")]
pub struct HostError {
    pub monitor: u32,
    pub reason: String,
}

impl HostError {
    pub fn new(monitor: u32, reason: impl Into<String>) -> Self {
        Self {
            monitor,
            reason: reason.into(),
        }
    }
}

/// Placement invariant violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// The indicator already has a transfer record for another monitor
    #[error("indicator '{iname}' is already transferred to monitor {existing}, refusing monitor {requested}")]
    DuplicateTransfer {
        iname: String,
        existing: u32,
        requested: u32,
    },

    /// A panel was about to be destroyed while host indicators were still inside it
    #[error("panel for monitor {monitor} still holds indicators: {}", indicators.join(", "))]
    DanglingIndicator {
        monitor: u32,
        indicators: Vec<String>,
    },

    /// The ledger and the actual box contents disagree
    #[error("indicator '{iname}' is not in the {slot} box of monitor {monitor}")]
    InconsistentState {
        iname: String,
        slot: BoxSlot,
        monitor: u32,
    },

    /// The host could not construct scene resources for a panel
    #[error("panel construction failed: {0}")]
    PanelConstruction(#[from] HostError),
}
