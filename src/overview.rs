//! Overview thumbnails slider, one thumbnails box per monitor
//!
//! While any box is shown the host must lay workspaces out on every monitor,
//! so the slider clears `workspaces-only-on-primary` when it shows and sets
//! it again when switched off.

use tracing::{info, warn};

use crate::config::SliderPosition;
use crate::host::{Monitor, ShellHost};

#[derive(Debug, Default)]
pub struct ThumbnailsSlider {
    /// Monitors with a live thumbnails box; `None` while hidden
    shown: Option<Vec<u32>>,
    /// Monitor layout the boxes were requested for
    layout: Vec<u32>,
    position: Option<SliderPosition>,
}

impl ThumbnailsSlider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_shown(&self) -> bool {
        self.shown.is_some()
    }

    /// Position the boxes were built with, if shown
    pub fn position(&self) -> Option<SliderPosition> {
        self.position
    }

    pub fn monitors(&self) -> &[u32] {
        self.shown.as_deref().unwrap_or(&[])
    }

    /// (Re)build a thumbnails box on every monitor
    ///
    /// `SliderPosition::None` hides the slider instead. A monitor whose box
    /// fails to build is logged and skipped.
    pub fn show(&mut self, position: SliderPosition, host: &mut dyn ShellHost) {
        if position == SliderPosition::None {
            self.hide(host);
            return;
        }
        if host.workspaces_only_on_primary() {
            host.set_workspaces_only_on_primary(false);
        }
        if self.shown.is_some() {
            self.hide(host);
        }

        let monitors = host.monitors();
        let mut built = Vec::new();
        for monitor in &monitors {
            if build(monitor, position, host) {
                built.push(monitor.index);
            }
        }
        info!(monitors = built.len(), position = ?position, "Thumbnails slider shown");
        self.layout = monitors.iter().map(|m| m.index).collect();
        self.shown = Some(built);
        self.position = Some(position);
    }

    /// Rebuild if the position or the monitor layout changed, otherwise
    /// retry only the boxes that failed to build
    pub fn sync(&mut self, position: SliderPosition, host: &mut dyn ShellHost) {
        let wanted = position != SliderPosition::None;
        if !wanted {
            if self.is_shown() {
                self.hide(host);
            }
            return;
        }
        let monitors = host.monitors();
        let layout: Vec<u32> = monitors.iter().map(|m| m.index).collect();
        if self.position != Some(position) || layout != self.layout {
            self.show(position, host);
            return;
        }
        let Some(shown) = self.shown.as_mut() else {
            self.show(position, host);
            return;
        };
        let missing: Vec<&Monitor> = monitors.iter().filter(|m| !shown.contains(&m.index)).collect();
        for monitor in missing {
            if build(monitor, position, host) {
                shown.push(monitor.index);
            }
        }
    }

    pub fn hide(&mut self, host: &mut dyn ShellHost) {
        let Some(monitors) = self.shown.take() else {
            return;
        };
        for monitor_index in monitors {
            host.destroy_overview(monitor_index);
        }
        self.layout.clear();
        self.position = None;
        info!("Thumbnails slider hidden");
    }

    /// Hide and give the host back its single-monitor workspace layout
    pub fn switch_off(&mut self, host: &mut dyn ShellHost) {
        self.hide(host);
        if !host.workspaces_only_on_primary() {
            host.set_workspaces_only_on_primary(true);
        }
    }
}

fn build(monitor: &Monitor, position: SliderPosition, host: &mut dyn ShellHost) -> bool {
    match host.create_overview(monitor, position) {
        Ok(()) => true,
        Err(e) => {
            warn!(monitor = monitor.index, error = %e, "Failed to create thumbnails box");
            false
        }
    }
}
