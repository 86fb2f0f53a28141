//! Live secondary panels, one per non-primary monitor

use std::collections::BTreeMap;
use tracing::{error, info};

use crate::error::{PlacementError, Result};
use crate::host::{Monitor, ShellHost};
use crate::placement::{Panel, PanelOptions};

/// Owns every secondary panel; other components look panels up by monitor index
#[derive(Debug, Default)]
pub struct PanelRegistry {
    panels: BTreeMap<u32, Panel>,
    options: PanelOptions,
}

impl PanelRegistry {
    pub fn new(options: PanelOptions) -> Self {
        Self {
            panels: BTreeMap::new(),
            options,
        }
    }

    /// Return the panel for `monitor`, constructing it if needed
    pub fn ensure_panel(&mut self, monitor: &Monitor, host: &mut dyn ShellHost) -> Result<&mut Panel> {
        if !self.panels.contains_key(&monitor.index) {
            host.construct_panel(monitor)?;
            info!(monitor = monitor.index, width = monitor.geometry.width, "Created secondary panel");
        }
        let options = self.options;
        let panel = self
            .panels
            .entry(monitor.index)
            .or_insert_with(|| Panel::secondary(monitor, &options));
        if panel.geometry() != monitor.geometry {
            panel.set_geometry(monitor.geometry);
        }
        Ok(panel)
    }

    pub fn find_panel(&self, monitor_index: u32) -> Option<&Panel> {
        self.panels.get(&monitor_index)
    }

    pub fn find_panel_mut(&mut self, monitor_index: u32) -> Option<&mut Panel> {
        self.panels.get_mut(&monitor_index)
    }

    pub fn monitor_indices(&self) -> Vec<u32> {
        self.panels.keys().copied().collect()
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    pub fn panels_mut(&mut self) -> impl Iterator<Item = &mut Panel> {
        self.panels.values_mut()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn options(&self) -> PanelOptions {
        self.options
    }

    /// Apply replica-role settings to every live panel
    pub fn apply_options(&mut self, options: PanelOptions) {
        if options == self.options {
            return;
        }
        self.options = options;
        for panel in self.panels.values_mut() {
            panel.apply_options(&options);
        }
    }

    /// Destroy one panel
    ///
    /// Refuses while host indicators are still parented under it; the caller
    /// must transfer them back first. Absent panels are a no-op.
    pub fn destroy_panel(&mut self, monitor_index: u32, host: &mut dyn ShellHost) -> Result<()> {
        let Some(panel) = self.panels.get_mut(&monitor_index) else {
            return Ok(());
        };
        let foreign = panel.foreign_indicators();
        if !foreign.is_empty() {
            let err = PlacementError::DanglingIndicator {
                monitor: monitor_index,
                indicators: foreign,
            };
            error!(error = %err, "Refusing to destroy panel");
            return Err(err);
        }
        panel.hide_replicas();
        self.panels.remove(&monitor_index);
        host.release_panel(monitor_index);
        info!(monitor = monitor_index, "Destroyed secondary panel");
        Ok(())
    }

    /// Destroy every panel; returns the first refusal after trying them all
    pub fn destroy_all_panels(&mut self, host: &mut dyn ShellHost) -> Result<()> {
        let mut first_err = None;
        for monitor_index in self.monitor_indices() {
            if let Err(e) = self.destroy_panel(monitor_index, host) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
