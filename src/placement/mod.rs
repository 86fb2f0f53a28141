//! Indicator placement core
//!
//! - **panel**: panels, boxes, indicators and menu managers
//! - **ledger**: record of active transfers
//! - **registry**: live secondary panels
//! - **session**: which indicators may be transferred
//! - **engine**: reconciliation of desired placement against the ledger

pub mod engine;
pub mod ledger;
pub mod panel;
pub mod registry;
pub mod session;

pub use engine::{DesiredConfiguration, Diagnostic, Move, ReconcileReport, TransferEngine};
pub use ledger::{IndicatorLedger, TransferRecord};
pub use panel::{BoxSlot, Indicator, MenuId, MenuManager, Origin, Panel, PanelBox, PanelItem, PanelOptions, ReplicaRole};
pub use registry::PanelRegistry;
pub use session::{SessionFilter, compute_available};
