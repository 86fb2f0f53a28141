//! Reconciliation of the desired indicator placement against the ledger
//!
//! A pass first reverts every transfer that is no longer wanted (or whose
//! target changed), then applies the transfers that are not yet satisfied.
//! Menus are always removed from the old manager before they are added to
//! the new one.

use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

use crate::constants::slots;
use crate::error::PlacementError;
use crate::placement::{BoxSlot, IndicatorLedger, Panel, PanelItem, PanelRegistry, TransferRecord};

/// Indicator name → target monitor index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredConfiguration(BTreeMap<String, u32>);

impl DesiredConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self, iname: &str) -> Option<u32> {
        self.0.get(iname).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, u32> {
        &self.0
    }
}

impl From<BTreeMap<String, u32>> for DesiredConfiguration {
    fn from(map: BTreeMap<String, u32>) -> Self {
        Self(map)
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for DesiredConfiguration {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One widget move performed by a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub iname: String,
    pub slot: BoxSlot,
    /// Monitor of the secondary panel involved
    pub monitor_index: u32,
}

/// Non-fatal per-entry outcome of a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Not registered on the primary panel
    IndicatorUnavailable { iname: String, monitor_index: u32 },
    /// No live panel for the target monitor
    PanelMissing { iname: String, monitor_index: u32 },
    /// Registered on the primary panel but not in any of its boxes
    IndicatorElsewhere { iname: String, monitor_index: u32 },
    /// Returned from a secondary panel after the host unregistered it
    OrphanDropped { iname: String },
    /// Ledger entry dropped or transfer refused
    Violation(PlacementError),
}

/// What a pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub reverted: Vec<Move>,
    pub applied: Vec<Move>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReconcileReport {
    pub fn widget_moves(&self) -> usize {
        self.reverted.len() + self.applied.len()
    }

    pub fn is_noop(&self) -> bool {
        self.widget_moves() == 0
    }

    pub fn merge(&mut self, other: ReconcileReport) {
        self.reverted.extend(other.reverted);
        self.applied.extend(other.applied);
        self.diagnostics.extend(other.diagnostics);
    }

    fn diagnose(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Violation(e) => error!(error = %e, "Placement invariant violated, entry dropped"),
            Diagnostic::OrphanDropped { iname } => {
                warn!(iname = %iname, "Indicator no longer registered on primary panel, dropped")
            }
            Diagnostic::IndicatorUnavailable { iname, monitor_index } => {
                warn!(iname = %iname, monitor = monitor_index, "Indicator not found on primary panel, skipping")
            }
            Diagnostic::PanelMissing { iname, monitor_index } => {
                warn!(iname = %iname, monitor = monitor_index, "No panel for target monitor, skipping")
            }
            Diagnostic::IndicatorElsewhere { iname, monitor_index } => {
                warn!(iname = %iname, monitor = monitor_index, "Indicator is not in a primary panel box, skipping")
            }
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Applies indicator transfers and keeps the ledger
#[derive(Debug, Default)]
pub struct TransferEngine {
    ledger: IndicatorLedger,
}

impl TransferEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &IndicatorLedger {
        &self.ledger
    }

    /// Bring placement in line with `desired`
    pub fn reconcile(
        &mut self,
        desired: &DesiredConfiguration,
        primary: &mut Panel,
        registry: &mut PanelRegistry,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        self.drop_orphans(primary, registry, &mut report);

        let to_revert: Vec<TransferRecord> = self
            .ledger
            .records()
            .iter()
            .filter(|r| desired.target(&r.iname) != Some(r.monitor_index))
            .cloned()
            .collect();
        for record in &to_revert {
            self.revert(record, primary, registry, &mut report);
        }

        for (iname, monitor_index) in desired.iter() {
            let satisfied = self
                .ledger
                .lookup(iname)
                .is_some_and(|r| r.monitor_index == monitor_index);
            if satisfied {
                debug!(iname = %iname, monitor = monitor_index, "Transfer already in place");
                continue;
            }
            self.apply(iname, monitor_index, primary, registry, &mut report);
        }

        report
    }

    /// Return every indicator living on `monitor_index` to the primary panel
    pub fn revert_monitor(
        &mut self,
        monitor_index: u32,
        primary: &mut Panel,
        registry: &mut PanelRegistry,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for record in self.ledger.records_for_monitor(monitor_index) {
            self.revert(&record, primary, registry, &mut report);
        }
        report
    }

    /// Return every transferred indicator to the primary panel
    pub fn revert_all(&mut self, primary: &mut Panel, registry: &mut PanelRegistry) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for record in self.ledger.records().to_vec() {
            self.revert(&record, primary, registry, &mut report);
        }
        report
    }

    /// Drop transferred widgets the primary panel no longer takes back
    fn drop_orphans(&mut self, primary: &Panel, registry: &mut PanelRegistry, report: &mut ReconcileReport) {
        let orphans: Vec<TransferRecord> = self
            .ledger
            .records()
            .iter()
            .filter(|r| superseded(primary, &r.iname))
            .cloned()
            .collect();
        for record in orphans {
            let iname = record.iname.as_str();
            self.ledger.remove(iname);
            let dropped = registry.find_panel_mut(record.monitor_index).and_then(|panel| {
                let indicator = panel.panel_box_mut(record.origin_box).remove_host(iname)?;
                if let Some(menu) = indicator.menu() {
                    panel.menu_manager_mut().remove_menu(menu);
                }
                Some(indicator)
            });
            if dropped.is_some() {
                debug!(iname = %iname, monitor = record.monitor_index, "Removed orphan from secondary panel");
                report.diagnose(Diagnostic::OrphanDropped {
                    iname: iname.to_string(),
                });
            } else {
                report.diagnose(Diagnostic::Violation(PlacementError::InconsistentState {
                    iname: iname.to_string(),
                    slot: record.origin_box,
                    monitor: record.monitor_index,
                }));
            }
        }
    }

    fn revert(
        &mut self,
        record: &TransferRecord,
        primary: &mut Panel,
        registry: &mut PanelRegistry,
        report: &mut ReconcileReport,
    ) {
        let iname = record.iname.as_str();
        let slot = record.origin_box;
        let inconsistent = || {
            Diagnostic::Violation(PlacementError::InconsistentState {
                iname: iname.to_string(),
                slot,
                monitor: record.monitor_index,
            })
        };

        let Some(panel) = registry.find_panel_mut(record.monitor_index) else {
            self.ledger.remove(iname);
            report.diagnose(inconsistent());
            return;
        };
        let Some(menu) = panel.panel_box(slot).host_indicator(iname).map(|i| i.menu().cloned()) else {
            self.ledger.remove(iname);
            report.diagnose(inconsistent());
            return;
        };

        if let Some(menu) = menu.as_ref() {
            panel.menu_manager_mut().remove_menu(menu);
        }
        let Some(mut indicator) = panel.panel_box_mut(slot).remove_host(iname) else {
            self.ledger.remove(iname);
            report.diagnose(inconsistent());
            return;
        };
        self.ledger.remove(iname);

        if superseded(primary, iname) {
            report.diagnose(Diagnostic::OrphanDropped {
                iname: iname.to_string(),
            });
            return;
        }

        let index = match slot {
            BoxSlot::Left => slots::LEFT_BOX_RESTORE_INDEX,
            _ => slots::DEFAULT_RESTORE_INDEX,
        };
        indicator.show_fully();
        let at = primary.panel_box_mut(slot).insert(index, indicator);
        if let Some(menu) = menu {
            if !primary.menu_manager_mut().add_menu(menu.clone()) {
                warn!(iname = %iname, menu = %menu, "Menu was already registered with primary panel");
            }
        }
        info!(
            iname = %iname,
            monitor = record.monitor_index,
            slot = %slot,
            index = at,
            "Returned indicator to primary panel"
        );
        report.reverted.push(Move {
            iname: iname.to_string(),
            slot,
            monitor_index: record.monitor_index,
        });
    }

    fn apply(
        &mut self,
        iname: &str,
        monitor_index: u32,
        primary: &mut Panel,
        registry: &mut PanelRegistry,
        report: &mut ReconcileReport,
    ) {
        if !primary.has_status(iname) {
            report.diagnose(Diagnostic::IndicatorUnavailable {
                iname: iname.to_string(),
                monitor_index,
            });
            return;
        }
        let Some(panel) = registry.find_panel_mut(monitor_index) else {
            report.diagnose(Diagnostic::PanelMissing {
                iname: iname.to_string(),
                monitor_index,
            });
            return;
        };
        let Some((slot, _)) = primary.locate(iname) else {
            report.diagnose(Diagnostic::IndicatorElsewhere {
                iname: iname.to_string(),
                monitor_index,
            });
            return;
        };

        if let Err(e) = self.ledger.record_transfer(iname, slot, monitor_index) {
            report.diagnose(Diagnostic::Violation(e));
            return;
        }

        let menu = primary.indicator(iname).and_then(|i| i.menu().cloned());
        if let Some(menu) = menu.as_ref() {
            primary.menu_manager_mut().remove_menu(menu);
        }
        let Some(mut indicator) = primary.panel_box_mut(slot).remove(iname) else {
            self.ledger.remove(iname);
            report.diagnose(Diagnostic::Violation(PlacementError::InconsistentState {
                iname: iname.to_string(),
                slot,
                monitor: monitor_index,
            }));
            return;
        };

        indicator.show_fully();
        panel.panel_box_mut(slot).push(indicator);
        if let Some(menu) = menu {
            if !panel.menu_manager_mut().add_menu(menu.clone()) {
                warn!(iname = %iname, menu = %menu, monitor = monitor_index, "Menu was already registered with target panel");
            }
        }
        info!(iname = %iname, slot = %slot, monitor = monitor_index, "Transferred indicator");
        report.applied.push(Move {
            iname: iname.to_string(),
            slot,
            monitor_index,
        });
    }
}

/// `iname` was unregistered, or a new widget now holds the name on the primary panel
fn superseded(primary: &Panel, iname: &str) -> bool {
    !primary.has_status(iname) || primary.locate(iname).is_some()
}
