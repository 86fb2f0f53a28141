//! In-memory shell
//!
//! Holds monitors, the primary panel and the session allow-list, records
//! every panel/overview/signal/timeout call, and queues the signals a real
//! shell would emit when its state changes.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_menu::WorkspaceSnapshot;
use crate::config::SliderPosition;
use crate::error::HostError;
use crate::geometry::Rect;
use crate::host::{HostEvent, Monitor, ShellHost, Signal, SignalId, TimeoutId};
use crate::placement::{BoxSlot, Indicator, Panel};

fn default_monitor() -> Rect {
    Rect::new(0, 0, 1920, 1080)
}

fn layout(rects: &[Rect]) -> Vec<Monitor> {
    rects
        .iter()
        .enumerate()
        .map(|(i, r)| Monitor::new(i as u32, i == 0, *r))
        .collect()
}

#[derive(Debug, Default)]
pub struct SimShellBuilder {
    monitors: Vec<Rect>,
    indicators: Vec<(Indicator, BoxSlot)>,
    session_indicators: Vec<String>,
    snapshot: WorkspaceSnapshot,
}

impl SimShellBuilder {
    /// Add a monitor; the first one is index 0 and primary
    pub fn monitor(mut self, geometry: Rect) -> Self {
        self.monitors.push(geometry);
        self
    }

    /// Register an indicator on the primary panel, appended to `slot`
    pub fn indicator(mut self, indicator: Indicator, slot: BoxSlot) -> Self {
        self.indicators.push((indicator, slot));
        self
    }

    pub fn session_indicators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.session_indicators = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn snapshot(mut self, snapshot: WorkspaceSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn build(self) -> SimShell {
        let rects = if self.monitors.is_empty() {
            vec![default_monitor()]
        } else {
            self.monitors
        };
        let monitors = layout(&rects);
        let mut primary_panel = Panel::primary(&monitors[0]);
        for (indicator, slot) in self.indicators {
            let position = primary_panel.panel_box(slot).len();
            let name = indicator.name.clone();
            if !primary_panel.add_to_status_area(indicator, slot, position) {
                warn!(iname = %name, "Duplicate indicator in shell setup, ignored");
            }
        }
        SimShell {
            monitors,
            primary_panel,
            session_indicators: self.session_indicators,
            constructed: Vec::new(),
            released: Vec::new(),
            failing_panels: BTreeSet::new(),
            racing_layouts: VecDeque::new(),
            next_id: 1,
            signals: BTreeMap::new(),
            timeouts: BTreeMap::new(),
            cancelled: Vec::new(),
            emitted: Vec::new(),
            overviews: BTreeMap::new(),
            overview_builds: Vec::new(),
            failing_overviews: BTreeSet::new(),
            workspaces_only_on_primary: true,
            snapshot: self.snapshot,
        }
    }
}

#[derive(Debug)]
pub struct SimShell {
    monitors: Vec<Monitor>,
    primary_panel: Panel,
    session_indicators: Vec<String>,
    constructed: Vec<u32>,
    released: Vec<u32>,
    failing_panels: BTreeSet<u32>,
    /// Layouts switched to by successive panel constructions
    racing_layouts: VecDeque<Vec<Rect>>,
    next_id: u64,
    signals: BTreeMap<u64, Signal>,
    timeouts: BTreeMap<u64, Duration>,
    cancelled: Vec<TimeoutId>,
    emitted: Vec<HostEvent>,
    overviews: BTreeMap<u32, SliderPosition>,
    overview_builds: Vec<u32>,
    failing_overviews: BTreeSet<u32>,
    workspaces_only_on_primary: bool,
    snapshot: WorkspaceSnapshot,
}

impl SimShell {
    pub fn builder() -> SimShellBuilder {
        SimShellBuilder::default()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue a signal as if the shell had emitted it
    pub fn emit(&mut self, event: HostEvent) {
        debug!(event = ?event, "Shell emitted signal");
        self.emitted.push(event);
    }

    /// Replace the monitor layout; the first rect becomes the primary monitor
    pub fn set_monitors(&mut self, rects: &[Rect]) {
        if rects.is_empty() {
            warn!("Ignoring empty monitor layout");
            return;
        }
        self.monitors = layout(rects);
        self.primary_panel.set_geometry(rects[0]);
        self.emit(HostEvent::MonitorsChanged);
    }

    /// Register a new indicator on the primary panel (an extension loaded)
    pub fn add_indicator(&mut self, indicator: Indicator, slot: BoxSlot, position: usize) -> bool {
        let name = indicator.name.clone();
        let added = self.primary_panel.add_to_status_area(indicator, slot, position);
        if added {
            self.emit(HostEvent::ExtensionStateChanged { uuid: name });
        }
        added
    }

    /// Unregister an indicator from the primary panel (its extension unloaded)
    ///
    /// A transferred indicator stays parented on its secondary panel.
    pub fn remove_indicator(&mut self, name: &str) -> bool {
        if !self.primary_panel.has_status(name) {
            return false;
        }
        self.primary_panel.remove_from_status_area(name);
        self.emit(HostEvent::ExtensionStateChanged { uuid: name.to_string() });
        true
    }

    /// Switch session mode
    pub fn set_session_indicators(&mut self, names: Vec<String>) {
        self.session_indicators = names;
        self.emit(HostEvent::SessionModeUpdated);
    }

    pub fn set_window_snapshot(&mut self, snapshot: WorkspaceSnapshot) {
        self.snapshot = snapshot;
    }

    pub fn fail_panel_construction(&mut self, monitor_index: u32) {
        self.failing_panels.insert(monitor_index);
    }

    pub fn allow_panel_construction(&mut self, monitor_index: u32) {
        self.failing_panels.remove(&monitor_index);
    }

    /// Switch to `rects` when the next panel is constructed, as a hotplug
    /// landing in the middle of a pass would
    ///
    /// Calls queue up: each successful construction applies one layout.
    pub fn change_layout_during_construction(&mut self, rects: Vec<Rect>) {
        self.racing_layouts.push_back(rects);
    }

    pub fn fail_overview(&mut self, monitor_index: u32) {
        self.failing_overviews.insert(monitor_index);
    }

    pub fn allow_overview(&mut self, monitor_index: u32) {
        self.failing_overviews.remove(&monitor_index);
    }

    /// Monitors that had a thumbnails box created, in call order
    pub fn overview_builds(&self) -> Vec<u32> {
        self.overview_builds.clone()
    }

    /// Monitors that had a panel constructed, in call order
    pub fn constructed_panels(&self) -> Vec<u32> {
        self.constructed.clone()
    }

    /// Monitors that had a panel released, in call order
    pub fn released_panels(&self) -> Vec<u32> {
        self.released.clone()
    }

    pub fn connected_signals(&self) -> Vec<Signal> {
        self.signals.values().copied().collect()
    }

    pub fn pending_timeouts(&self) -> Vec<TimeoutId> {
        self.timeouts.keys().map(|id| TimeoutId(*id)).collect()
    }

    pub fn cancelled_timeouts(&self) -> Vec<TimeoutId> {
        self.cancelled.clone()
    }

    /// Remove every pending timeout and return them, as if their delay elapsed
    pub fn fire_timeouts(&mut self) -> Vec<TimeoutId> {
        let fired = self.pending_timeouts();
        self.timeouts.clear();
        fired
    }

    /// Monitors with a live thumbnails box, and its slider position
    pub fn overviews(&self) -> &BTreeMap<u32, SliderPosition> {
        &self.overviews
    }
}

impl ShellHost for SimShell {
    fn monitors(&self) -> Vec<Monitor> {
        self.monitors.clone()
    }

    fn primary_monitor_index(&self) -> u32 {
        self.monitors
            .iter()
            .find(|m| m.is_primary)
            .map(|m| m.index)
            .unwrap_or(0)
    }

    fn primary_panel(&self) -> &Panel {
        &self.primary_panel
    }

    fn primary_panel_mut(&mut self) -> &mut Panel {
        &mut self.primary_panel
    }

    fn session_indicators(&self) -> Vec<String> {
        self.session_indicators.clone()
    }

    fn construct_panel(&mut self, monitor: &Monitor) -> Result<(), HostError> {
        if self.failing_panels.contains(&monitor.index) {
            return Err(HostError::new(monitor.index, "panel actor could not be created"));
        }
        self.constructed.push(monitor.index);
        if let Some(rects) = self.racing_layouts.pop_front() {
            self.set_monitors(&rects);
        }
        Ok(())
    }

    fn release_panel(&mut self, monitor_index: u32) {
        self.released.push(monitor_index);
    }

    fn connect(&mut self, signal: Signal) -> SignalId {
        let id = self.next_id();
        self.signals.insert(id, signal);
        SignalId(id)
    }

    fn disconnect(&mut self, id: SignalId) {
        if self.signals.remove(&id.0).is_none() {
            warn!(id = id.0, "Disconnecting unknown signal handler");
        }
    }

    fn schedule_timeout(&mut self, delay: Duration) -> TimeoutId {
        let id = self.next_id();
        self.timeouts.insert(id, delay);
        TimeoutId(id)
    }

    fn cancel_timeout(&mut self, id: TimeoutId) {
        if self.timeouts.remove(&id.0).is_some() {
            self.cancelled.push(id);
        }
    }

    fn take_emitted(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.emitted)
    }

    fn create_overview(&mut self, monitor: &Monitor, position: SliderPosition) -> Result<(), HostError> {
        if self.failing_overviews.contains(&monitor.index) {
            return Err(HostError::new(monitor.index, "thumbnails box could not be created"));
        }
        self.overviews.insert(monitor.index, position);
        self.overview_builds.push(monitor.index);
        Ok(())
    }

    fn destroy_overview(&mut self, monitor_index: u32) {
        self.overviews.remove(&monitor_index);
    }

    fn workspaces_only_on_primary(&self) -> bool {
        self.workspaces_only_on_primary
    }

    fn set_workspaces_only_on_primary(&mut self, value: bool) {
        self.workspaces_only_on_primary = value;
    }

    fn window_snapshot(&self) -> WorkspaceSnapshot {
        self.snapshot.clone()
    }
}
