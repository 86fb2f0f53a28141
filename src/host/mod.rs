//! Host shell boundary
//!
//! Everything the placement core consumes from the desktop shell goes through
//! `ShellHost`: monitor enumeration, the primary panel, the session allow-list,
//! signal subscriptions, timeouts and overview construction. `SimShell` is an
//! in-memory implementation used by the CLI replay and the tests.

pub mod sim;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_menu::{WindowType, WorkspaceSnapshot};
use crate::config::{SettingsKey, SliderPosition};
use crate::error::HostError;
use crate::geometry::Rect;
use crate::placement::Panel;

pub use sim::SimShell;

/// A physical monitor as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    pub index: u32,
    #[serde(default)]
    pub is_primary: bool,
    pub geometry: Rect,
}

impl Monitor {
    pub fn new(index: u32, is_primary: bool, geometry: Rect) -> Self {
        Self {
            index,
            is_primary,
            geometry,
        }
    }
}

/// Host signals the coordinator can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    MonitorsChanged,
    SessionModeUpdated,
    ExtensionStateChanged,
    SettingsChanged(SettingsKey),
    WindowEnteredMonitor,
    WindowLeftMonitor,
}

/// Handle returned by `ShellHost::connect`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(pub u64);

/// Handle returned by `ShellHost::schedule_timeout`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutId(pub u64);

/// An emitted host signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "event")]
pub enum HostEvent {
    MonitorsChanged,
    SessionModeUpdated,
    ExtensionStateChanged { uuid: String },
    SettingsChanged { key: SettingsKey },
    WindowEnteredMonitor { monitor: u32, window_type: WindowType },
    WindowLeftMonitor { monitor: u32, window_type: WindowType },
}

impl HostEvent {
    pub fn signal(&self) -> Signal {
        match self {
            HostEvent::MonitorsChanged => Signal::MonitorsChanged,
            HostEvent::SessionModeUpdated => Signal::SessionModeUpdated,
            HostEvent::ExtensionStateChanged { .. } => Signal::ExtensionStateChanged,
            HostEvent::SettingsChanged { key } => Signal::SettingsChanged(*key),
            HostEvent::WindowEnteredMonitor { .. } => Signal::WindowEnteredMonitor,
            HostEvent::WindowLeftMonitor { .. } => Signal::WindowLeftMonitor,
        }
    }
}

/// The desktop shell as seen by the placement core
pub trait ShellHost {
    /// All monitors in host order
    fn monitors(&self) -> Vec<Monitor>;

    fn primary_monitor_index(&self) -> u32;

    /// Every monitor except the primary one
    fn secondary_monitors(&self) -> Vec<Monitor> {
        let primary = self.primary_monitor_index();
        self.monitors().into_iter().filter(|m| m.index != primary).collect()
    }

    /// The host's own top bar
    fn primary_panel(&self) -> &Panel;

    fn primary_panel_mut(&mut self) -> &mut Panel;

    /// Indicator names intrinsic to the current session mode
    fn session_indicators(&self) -> Vec<String>;

    /// Create scene resources for a secondary panel
    fn construct_panel(&mut self, monitor: &Monitor) -> Result<(), HostError>;

    /// Release scene resources of a secondary panel
    fn release_panel(&mut self, monitor_index: u32);

    fn connect(&mut self, signal: Signal) -> SignalId;

    fn disconnect(&mut self, id: SignalId);

    fn schedule_timeout(&mut self, delay: Duration) -> TimeoutId;

    fn cancel_timeout(&mut self, id: TimeoutId);

    /// Signals the host emitted since the last call (e.g. while a pass was applying moves)
    fn take_emitted(&mut self) -> Vec<HostEvent>;

    /// Build the thumbnails box for one monitor
    fn create_overview(&mut self, monitor: &Monitor, position: SliderPosition) -> Result<(), HostError>;

    fn destroy_overview(&mut self, monitor_index: u32);

    fn workspaces_only_on_primary(&self) -> bool;

    fn set_workspaces_only_on_primary(&mut self, value: bool);

    /// Current windows, used by app-menu replicas
    fn window_snapshot(&self) -> WorkspaceSnapshot;
}
