//! Ledger of active indicator transfers

use tracing::debug;

use crate::error::{PlacementError, Result};
use crate::placement::BoxSlot;

/// Indicator `iname` came from `origin_box` of the primary panel and now
/// lives on the panel of `monitor_index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub iname: String,
    pub origin_box: BoxSlot,
    pub monitor_index: u32,
}

/// Active transfers in insertion order, at most one per indicator
#[derive(Debug, Default)]
pub struct IndicatorLedger {
    records: Vec<TransferRecord>,
}

impl IndicatorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transfer
    ///
    /// Overwrites an existing record for the same monitor in place; refuses
    /// one that targets a different monitor.
    pub fn record_transfer(&mut self, iname: &str, origin_box: BoxSlot, monitor_index: u32) -> Result<()> {
        if let Some(existing) = self.records.iter_mut().find(|r| r.iname == iname) {
            if existing.monitor_index != monitor_index {
                return Err(PlacementError::DuplicateTransfer {
                    iname: iname.to_string(),
                    existing: existing.monitor_index,
                    requested: monitor_index,
                });
            }
            existing.origin_box = origin_box;
            return Ok(());
        }
        debug!(iname = %iname, origin_box = %origin_box, monitor = monitor_index, "Recording transfer");
        self.records.push(TransferRecord {
            iname: iname.to_string(),
            origin_box,
            monitor_index,
        });
        Ok(())
    }

    pub fn lookup(&self, iname: &str) -> Option<&TransferRecord> {
        self.records.iter().find(|r| r.iname == iname)
    }

    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    pub fn records_for_monitor(&self, monitor_index: u32) -> Vec<TransferRecord> {
        self.records
            .iter()
            .filter(|r| r.monitor_index == monitor_index)
            .cloned()
            .collect()
    }

    /// No-op if absent
    pub fn remove(&mut self, iname: &str) {
        self.records.retain(|r| r.iname != iname);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
