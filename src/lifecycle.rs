//! Activation, deactivation and host event handling
//!
//! The coordinator owns the registry, the transfer engine and the session
//! filter. Every pass runs the same steps in the same order:
//! panel layout sync, replica options, own indicator, thumbnails slider,
//! available indicators, reconciliation. Host and config are borrowed per
//! call, so nothing outlives a deactivation except the coordinator itself.

use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigStore, Settings, SettingsKey};
use crate::constants::{indicator, lifecycle};
use crate::host::{HostEvent, ShellHost, Signal, SignalId, TimeoutId};
use crate::overview::ThumbnailsSlider;
use crate::placement::{
    BoxSlot, DesiredConfiguration, Indicator, PanelRegistry, ReconcileReport, SessionFilter, TransferEngine,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Disabled,
    Enabling,
    Enabled,
    Disabling,
}

/// Settings keys whose change re-drives a pass
///
/// `available-indicators` is written by the pass itself and is left out.
const PASS_KEYS: [SettingsKey; 8] = [
    SettingsKey::ShowIndicator,
    SettingsKey::ShowPanel,
    SettingsKey::ShowTopPanel,
    SettingsKey::ShowActivities,
    SettingsKey::ShowAppMenu,
    SettingsKey::ShowDateTime,
    SettingsKey::ThumbnailsSliderPosition,
    SettingsKey::TransferIndicators,
];

/// Every host signal connection, released together
#[derive(Debug, Default)]
pub struct Subscriptions {
    handles: Vec<(SignalId, Signal)>,
}

impl Subscriptions {
    pub fn connect(&mut self, host: &mut dyn ShellHost, signal: Signal) {
        let id = host.connect(signal);
        self.handles.push((id, signal));
    }

    pub fn is_connected(&self, signal: Signal) -> bool {
        self.handles.iter().any(|(_, s)| *s == signal)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Disconnect everything
    pub fn dispose(&mut self, host: &mut dyn ShellHost) {
        for (id, _) in self.handles.drain(..) {
            host.disconnect(id);
        }
    }
}

#[derive(Debug)]
pub struct LifecycleCoordinator {
    state: LifecycleState,
    registry: PanelRegistry,
    engine: TransferEngine,
    session: SessionFilter,
    slider: ThumbnailsSlider,
    subscriptions: Subscriptions,
    deferred: Option<TimeoutId>,
    own_indicator: bool,
    passes: u64,
    last_report: ReconcileReport,
}

impl Default for LifecycleCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Disabled,
            registry: PanelRegistry::default(),
            engine: TransferEngine::new(),
            session: SessionFilter::new(),
            slider: ThumbnailsSlider::new(),
            subscriptions: Subscriptions::default(),
            deferred: None,
            own_indicator: false,
            passes: 0,
            last_report: ReconcileReport::default(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    pub fn slider(&self) -> &ThumbnailsSlider {
        &self.slider
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Number of passes run since construction
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Report of the most recent pass
    pub fn last_report(&self) -> &ReconcileReport {
        &self.last_report
    }

    pub fn deferred_pass(&self) -> Option<TimeoutId> {
        self.deferred
    }

    pub fn enable(&mut self, host: &mut dyn ShellHost, config: &mut dyn ConfigStore) {
        if self.state != LifecycleState::Disabled {
            info!(state = ?self.state, "Already active, deactivating before re-enabling");
            self.disable(host, config);
        }
        self.state = LifecycleState::Enabling;
        info!(monitors = host.monitors().len(), "Enabling");

        let settings = config.settings().clone();
        self.sync_own_indicator(host, &settings);
        self.slider.show(settings.thumbnails_slider_position, host);
        self.run_pass(host, config);

        for signal in [
            Signal::MonitorsChanged,
            Signal::SessionModeUpdated,
            Signal::ExtensionStateChanged,
            Signal::WindowEnteredMonitor,
            Signal::WindowLeftMonitor,
        ] {
            self.subscriptions.connect(host, signal);
        }
        for key in PASS_KEYS {
            self.subscriptions.connect(host, Signal::SettingsChanged(key));
        }
        // TODO: replace with a host "layout settled" signal once one exists
        self.deferred = Some(host.schedule_timeout(lifecycle::DEFERRED_REVALIDATION));

        self.state = LifecycleState::Enabled;
        info!(
            panels = self.registry.len(),
            transfers = self.engine.ledger().len(),
            "Enabled"
        );
    }

    pub fn disable(&mut self, host: &mut dyn ShellHost, config: &mut dyn ConfigStore) {
        if self.state == LifecycleState::Disabled {
            debug!("Already disabled");
            return;
        }
        self.state = LifecycleState::Disabling;
        info!("Disabling");

        if let Some(id) = self.deferred.take() {
            host.cancel_timeout(id);
        }

        let report = self.engine.revert_all(host.primary_panel_mut(), &mut self.registry);
        debug!(reverted = report.reverted.len(), "Returned transferred indicators");
        self.subscriptions.dispose(host);

        if let Err(e) = self.registry.destroy_all_panels(host) {
            error!(error = %e, "Secondary panel left alive after deactivation");
        }

        self.session.reset();
        if let Err(e) = config.set_available_indicators(Vec::new()) {
            warn!(error = %e, "Failed to clear available indicators");
        }

        self.hide_own_indicator(host);
        self.slider.switch_off(host);

        self.last_report = report;
        self.state = LifecycleState::Disabled;
        info!("Disabled");
    }

    /// React to one host signal
    pub fn handle_event(&mut self, event: &HostEvent, host: &mut dyn ShellHost, config: &mut dyn ConfigStore) {
        self.handle_events(std::slice::from_ref(event), host, config);
    }

    /// React to a batch of host signals; at most one pass runs for the batch
    ///
    /// Returns whether a pass ran.
    pub fn handle_events(
        &mut self,
        events: &[HostEvent],
        host: &mut dyn ShellHost,
        config: &mut dyn ConfigStore,
    ) -> bool {
        if self.state != LifecycleState::Enabled {
            debug!(state = ?self.state, count = events.len(), "Ignoring signals while not enabled");
            return false;
        }
        let wants_pass = self.absorb(events, host);
        if wants_pass {
            self.run_pass(host, config);
        }
        wants_pass
    }

    /// Handle whatever the host emitted since the last call
    pub fn pump(&mut self, host: &mut dyn ShellHost, config: &mut dyn ConfigStore) -> bool {
        let events = host.take_emitted();
        if events.is_empty() {
            return false;
        }
        self.handle_events(&events, host, config)
    }

    /// A host timeout fired
    pub fn on_timeout(&mut self, id: TimeoutId, host: &mut dyn ShellHost, config: &mut dyn ConfigStore) {
        if self.deferred != Some(id) {
            debug!(id = id.0, "Ignoring unknown timeout");
            return;
        }
        self.deferred = None;
        if self.state == LifecycleState::Enabled {
            debug!("Running deferred revalidation pass");
            self.run_pass(host, config);
        }
    }

    /// Window signals are handled here; returns whether any signal wants a pass
    fn absorb(&mut self, events: &[HostEvent], host: &mut dyn ShellHost) -> bool {
        let mut wants_pass = false;
        for event in events {
            let signal = event.signal();
            if !self.subscriptions.is_connected(signal) {
                debug!(event = ?event, "No subscription for signal");
                continue;
            }
            match event {
                HostEvent::WindowEnteredMonitor { monitor, window_type }
                | HostEvent::WindowLeftMonitor { monitor, window_type } => {
                    if window_type.triggers_sync() {
                        self.sync_app_menu(*monitor, host);
                    }
                }
                _ => wants_pass = true,
            }
        }
        wants_pass
    }

    fn sync_app_menu(&mut self, monitor_index: u32, host: &mut dyn ShellHost) {
        let Some(panel) = self.registry.find_panel_mut(monitor_index) else {
            return;
        };
        let snapshot = host.window_snapshot();
        if panel.sync_app_menu(&snapshot) {
            debug!(monitor = monitor_index, "App menu retargeted");
        }
    }

    /// One pass, then one follow-up for each batch of signals emitted meanwhile
    fn run_pass(&mut self, host: &mut dyn ShellHost, config: &mut dyn ConfigStore) {
        self.pass(host, config);

        for _ in 0..lifecycle::MAX_FOLLOW_UP_PASSES {
            let emitted = host.take_emitted();
            if emitted.is_empty() || !self.absorb(&emitted, host) {
                return;
            }
            debug!(count = emitted.len(), "Signals emitted during pass, running follow-up");
            self.pass(host, config);
        }
        warn!(
            limit = lifecycle::MAX_FOLLOW_UP_PASSES,
            "Host kept emitting during follow-up passes, deferring to the next signal"
        );
    }

    fn pass(&mut self, host: &mut dyn ShellHost, config: &mut dyn ConfigStore) {
        self.passes += 1;
        let settings = config.settings().clone();
        let mut report = self.sync_layout(host, &settings);

        self.registry.apply_options(settings.panel_options());
        let snapshot = host.window_snapshot();
        for panel in self.registry.panels_mut() {
            panel.sync_app_menu(&snapshot);
        }
        self.sync_own_indicator(host, &settings);
        self.slider.sync(settings.thumbnails_slider_position, host);

        let allow_list = SessionFilter::allow_list(&host.session_indicators());
        let changed = self
            .session
            .update(
                host.primary_panel().status_names(),
                allow_list.iter().map(String::as_str),
            )
            .map(|set| set.iter().cloned().collect::<Vec<_>>());
        if let Some(available) = changed {
            if let Err(e) = config.set_available_indicators(available) {
                warn!(error = %e, "Failed to publish available indicators");
            }
        }

        let desired = transferable(&config.desired_configuration(), &allow_list);
        report.merge(
            self.engine
                .reconcile(&desired, host.primary_panel_mut(), &mut self.registry),
        );

        debug!(
            pass = self.passes,
            reverted = report.reverted.len(),
            applied = report.applied.len(),
            diagnostics = report.diagnostics.len(),
            "Pass complete"
        );
        self.last_report = report;
    }

    /// Create panels for new secondary monitors, tear down vanished ones
    fn sync_layout(&mut self, host: &mut dyn ShellHost, settings: &Settings) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let wanted = if settings.panels_enabled() {
            host.secondary_monitors()
        } else {
            Vec::new()
        };
        let wanted_indices: BTreeSet<u32> = wanted.iter().map(|m| m.index).collect();

        for monitor_index in self.registry.monitor_indices() {
            if wanted_indices.contains(&monitor_index) {
                continue;
            }
            report.merge(
                self.engine
                    .revert_monitor(monitor_index, host.primary_panel_mut(), &mut self.registry),
            );
            // a refusal is logged by the registry and the panel stays
            let _ = self.registry.destroy_panel(monitor_index, host);
        }

        for monitor in &wanted {
            if let Err(e) = self.registry.ensure_panel(monitor, host) {
                warn!(monitor = monitor.index, error = %e, "Secondary panel unavailable, retrying on next pass");
            }
        }
        report
    }

    fn sync_own_indicator(&mut self, host: &mut dyn ShellHost, settings: &Settings) {
        if !settings.show_indicator {
            self.hide_own_indicator(host);
            return;
        }
        if self.own_indicator {
            return;
        }
        let own = Indicator::with_menu(indicator::OWN_INDICATOR);
        if host.primary_panel_mut().add_to_status_area(own, BoxSlot::Right, 0) {
            self.own_indicator = true;
            debug!("Own indicator shown");
        } else {
            warn!(iname = indicator::OWN_INDICATOR, "Status area name already taken");
        }
    }

    fn hide_own_indicator(&mut self, host: &mut dyn ShellHost) {
        if !self.own_indicator {
            return;
        }
        host.primary_panel_mut()
            .remove_from_status_area(indicator::OWN_INDICATOR);
        self.own_indicator = false;
        debug!("Own indicator hidden");
    }
}

/// Drop entries naming session chrome; those never leave the primary panel
fn transferable(desired: &DesiredConfiguration, allow_list: &[String]) -> DesiredConfiguration {
    desired
        .iter()
        .filter(|(iname, monitor_index)| {
            let chrome = allow_list.iter().any(|a| a == iname);
            if chrome {
                debug!(iname = %iname, monitor = monitor_index, "Session indicator is not transferable");
            }
            !chrome
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, SettingsStore, SliderPosition};
    use crate::geometry::Rect;
    use crate::host::SimShell;
    use crate::placement::{Diagnostic, Origin, TransferRecord};

    fn shell() -> SimShell {
        SimShell::builder()
            .monitor(Rect::new(0, 0, 1920, 1080))
            .monitor(Rect::new(1920, 0, 1920, 1080))
            .monitor(Rect::new(3840, 0, 1920, 1080))
            .indicator(Indicator::with_menu("activities"), BoxSlot::Left)
            .indicator(Indicator::with_menu("dateMenu"), BoxSlot::Center)
            .indicator(Indicator::with_menu("clockMenu"), BoxSlot::Right)
            .indicator(Indicator::with_menu("volume"), BoxSlot::Right)
            .session_indicators(["activities", "dateMenu"])
            .build()
    }

    fn store_with(transfers: &[(&str, u32)]) -> SettingsStore {
        let mut settings = Settings::default();
        for (iname, monitor) in transfers {
            settings.transfer_indicators.insert(iname.to_string(), *monitor);
        }
        SettingsStore::in_memory(settings)
    }

    fn host_count(host: &SimShell, coordinator: &LifecycleCoordinator, iname: &str) -> usize {
        std::iter::once(host.primary_panel())
            .chain(coordinator.registry().panels())
            .flat_map(|p| p.indicators())
            .filter(|i| i.name == iname && i.origin == Origin::Host)
            .count()
    }

    #[test]
    fn test_enable_builds_panels_and_applies_transfers() {
        let mut host = shell();
        let mut config = store_with(&[("clockMenu", 1)]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);

        assert_eq!(coordinator.state(), LifecycleState::Enabled);
        assert_eq!(coordinator.registry().monitor_indices(), vec![1, 2]);
        assert!(
            coordinator
                .registry()
                .find_panel(1)
                .unwrap()
                .panel_box(BoxSlot::Right)
                .contains("clockMenu")
        );
        assert_eq!(host_count(&host, &coordinator, "clockMenu"), 1);
        assert_eq!(coordinator.passes(), 1);
        assert!(coordinator.deferred_pass().is_some());
        assert!(coordinator.slider().is_shown());
        assert!(host.primary_panel().has_status(indicator::OWN_INDICATOR));
        assert_eq!(
            config.settings().available_indicators,
            vec!["clockMenu".to_string(), "volume".to_string()]
        );
    }

    #[test]
    fn test_disable_reverts_before_destroying_panels() {
        let mut host = shell();
        let mut config = store_with(&[("clockMenu", 1)]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        coordinator.disable(&mut host, &mut config);

        assert_eq!(coordinator.state(), LifecycleState::Disabled);
        assert!(coordinator.engine().ledger().is_empty());
        assert!(coordinator.registry().is_empty());
        assert_eq!(host.released_panels(), vec![1, 2]);
        assert_eq!(host.primary_panel().locate("clockMenu"), Some((BoxSlot::Right, 0)));
        assert!(host.connected_signals().is_empty());
        assert!(coordinator.subscriptions().is_empty());
        assert!(host.pending_timeouts().is_empty());
        assert_eq!(host.cancelled_timeouts().len(), 1);
        assert!(config.settings().available_indicators.is_empty());
        assert!(!host.primary_panel().has_status(indicator::OWN_INDICATOR));
        assert!(host.workspaces_only_on_primary());
        assert!(host.overviews().is_empty());
    }

    #[test]
    fn test_re_enable_runs_deactivation_first() {
        let mut host = shell();
        let mut config = store_with(&[("clockMenu", 2)]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        let subscribed = host.connected_signals().len();
        coordinator.enable(&mut host, &mut config);

        assert_eq!(host.connected_signals().len(), subscribed);
        assert_eq!(host.released_panels(), vec![1, 2]);
        assert_eq!(host.constructed_panels(), vec![1, 2, 1, 2]);
        assert_eq!(host.pending_timeouts().len(), 1);
        assert_eq!(host_count(&host, &coordinator, "clockMenu"), 1);
        assert_eq!(
            coordinator.engine().ledger().records(),
            &[TransferRecord {
                iname: "clockMenu".to_string(),
                origin_box: BoxSlot::Right,
                monitor_index: 2,
            }]
        );
    }

    #[test]
    fn test_batched_signals_coalesce_into_one_pass() {
        let mut host = shell();
        let mut config = store_with(&[]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        let before = coordinator.passes();

        host.emit(HostEvent::SessionModeUpdated);
        host.emit(HostEvent::ExtensionStateChanged {
            uuid: "weather@example".to_string(),
        });
        config.set_transfer("volume", 1).unwrap();
        for key in config.take_changes() {
            host.emit(HostEvent::SettingsChanged { key });
        }
        assert!(coordinator.pump(&mut host, &mut config));

        assert_eq!(coordinator.passes(), before + 1);
        assert_eq!(coordinator.last_report().applied.len(), 1);
        assert!(!coordinator.pump(&mut host, &mut config));
    }

    #[test]
    fn test_own_writes_do_not_trigger_passes() {
        let mut host = shell();
        let mut config = store_with(&[]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        let before = coordinator.passes();

        for key in config.take_changes() {
            host.emit(HostEvent::SettingsChanged { key });
        }
        assert!(!coordinator.pump(&mut host, &mut config));
        assert_eq!(coordinator.passes(), before);
    }

    #[test]
    fn test_deferred_pass_runs_once_and_not_after_disable() {
        let mut host = shell();
        let mut config = store_with(&[]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);

        let fired = host.fire_timeouts();
        assert_eq!(fired.len(), 1);
        coordinator.on_timeout(fired[0], &mut host, &mut config);
        assert_eq!(coordinator.passes(), 2);
        coordinator.on_timeout(fired[0], &mut host, &mut config);
        assert_eq!(coordinator.passes(), 2);

        coordinator.disable(&mut host, &mut config);
        coordinator.enable(&mut host, &mut config);
        let pending = host.pending_timeouts();
        coordinator.disable(&mut host, &mut config);
        coordinator.on_timeout(pending[0], &mut host, &mut config);
        assert_eq!(coordinator.passes(), 3);
    }

    #[test]
    fn test_monitor_removal_returns_its_indicators() {
        let mut host = shell();
        let mut config = store_with(&[("clockMenu", 2), ("volume", 1)]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);

        host.set_monitors(&[Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1080)]);
        assert!(coordinator.pump(&mut host, &mut config));

        assert_eq!(coordinator.registry().monitor_indices(), vec![1]);
        assert_eq!(host.primary_panel().locate("clockMenu"), Some((BoxSlot::Right, 0)));
        assert!(coordinator.engine().ledger().lookup("clockMenu").is_none());
        assert!(
            coordinator
                .last_report()
                .diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::PanelMissing { iname, .. } if iname == "clockMenu"))
        );
        assert_eq!(coordinator.engine().ledger().lookup("volume").unwrap().monitor_index, 1);
        assert_eq!(host_count(&host, &coordinator, "volume"), 1);
    }

    #[test]
    fn test_hiding_top_panel_returns_everything() {
        let mut host = shell();
        let mut config = store_with(&[("clockMenu", 1)]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);

        config.update(SettingsKey::ShowTopPanel, |s| s.show_top_panel = false).unwrap();
        coordinator.handle_event(
            &HostEvent::SettingsChanged {
                key: SettingsKey::ShowTopPanel,
            },
            &mut host,
            &mut config,
        );
        assert!(coordinator.registry().is_empty());
        assert!(coordinator.engine().ledger().is_empty());
        assert!(host.primary_panel().panel_box(BoxSlot::Right).contains("clockMenu"));
    }

    #[test]
    fn test_session_chrome_is_never_transferred() {
        let mut host = shell();
        let mut config = store_with(&[("dateMenu", 1), (indicator::OWN_INDICATOR, 2)]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);

        assert!(coordinator.engine().ledger().is_empty());
        assert_eq!(host.primary_panel().locate("dateMenu"), Some((BoxSlot::Center, 0)));
    }

    #[test]
    fn test_window_signal_syncs_app_menu_without_pass() {
        use crate::app_menu::{WindowInfo, WindowType, WorkspaceSnapshot};

        let mut host = shell();
        let mut config = store_with(&[]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        let before = coordinator.passes();

        host.set_window_snapshot(WorkspaceSnapshot {
            active_workspace: 0,
            focused_app: Some("editor".to_string()),
            starting_apps: vec![],
            windows: vec![WindowInfo {
                id: 9,
                app: "editor".to_string(),
                monitor: 2,
                workspace: 0,
                has_focus: true,
                window_type: WindowType::Normal,
            }],
        });
        let ran = coordinator.handle_events(
            &[HostEvent::WindowEnteredMonitor {
                monitor: 2,
                window_type: WindowType::Normal,
            }],
            &mut host,
            &mut config,
        );
        assert!(!ran);
        assert_eq!(coordinator.passes(), before);
        let panel = coordinator.registry().find_panel(2).unwrap();
        assert_eq!(panel.indicator("appMenu").unwrap().label.as_deref(), Some("editor"));
    }

    #[test]
    fn test_signals_ignored_while_disabled() {
        let mut host = shell();
        let mut config = store_with(&[("clockMenu", 1)]);
        let mut coordinator = LifecycleCoordinator::new();
        assert!(!coordinator.handle_events(&[HostEvent::MonitorsChanged], &mut host, &mut config));
        assert_eq!(coordinator.passes(), 0);
        assert!(coordinator.registry().is_empty());
    }

    #[test]
    fn test_reloaded_indicator_is_transferred_once() {
        let mut host = shell();
        host.add_indicator(Indicator::with_menu("vpn"), BoxSlot::Right, 0);
        let mut config = store_with(&[("vpn", 1)]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        assert_eq!(host_count(&host, &coordinator, "vpn"), 1);

        host.remove_indicator("vpn");
        assert!(coordinator.pump(&mut host, &mut config));
        assert_eq!(host_count(&host, &coordinator, "vpn"), 0);
        assert!(coordinator.engine().ledger().is_empty());

        host.add_indicator(Indicator::with_menu("vpn"), BoxSlot::Right, 0);
        assert!(coordinator.pump(&mut host, &mut config));
        assert_eq!(host_count(&host, &coordinator, "vpn"), 1);
        assert_eq!(coordinator.engine().ledger().lookup("vpn").unwrap().monitor_index, 1);

        coordinator.disable(&mut host, &mut config);
        assert_eq!(host.primary_panel().panel_box(BoxSlot::Right).names().iter().filter(|n| **n == "vpn").count(), 1);
    }

    #[test]
    fn test_reload_within_one_batch_keeps_single_widget() {
        let mut host = shell();
        host.add_indicator(Indicator::with_menu("vpn"), BoxSlot::Right, 0);
        let mut config = store_with(&[("vpn", 2)]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);

        host.remove_indicator("vpn");
        host.add_indicator(Indicator::with_menu("vpn"), BoxSlot::Right, 0);
        assert!(coordinator.pump(&mut host, &mut config));
        assert_eq!(host_count(&host, &coordinator, "vpn"), 1);
        assert!(
            coordinator
                .last_report()
                .diagnostics
                .contains(&Diagnostic::OrphanDropped { iname: "vpn".to_string() })
        );

        coordinator.disable(&mut host, &mut config);
        assert_eq!(host_count(&host, &coordinator, "vpn"), 1);
        assert!(host.primary_panel().panel_box(BoxSlot::Right).contains("vpn"));
    }

    #[test]
    fn test_signal_during_pass_runs_one_follow_up() {
        let mut host = shell();
        let mut config = store_with(&[]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        let before = coordinator.passes();

        let four: Vec<Rect> = (0..4).map(|i| Rect::new(1920 * i, 0, 1920, 1080)).collect();
        let five: Vec<Rect> = (0..5).map(|i| Rect::new(1920 * i, 0, 1920, 1080)).collect();
        host.change_layout_during_construction(five);
        host.set_monitors(&four);
        assert!(coordinator.pump(&mut host, &mut config));

        assert_eq!(coordinator.passes(), before + 2);
        assert_eq!(coordinator.registry().monitor_indices(), vec![1, 2, 3, 4]);
        assert!(host.take_emitted().is_empty());
    }

    #[test]
    fn test_signal_during_follow_up_is_not_lost() {
        let mut host = shell();
        let mut config = store_with(&[]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        let before = coordinator.passes();

        let layout = |n: i32| -> Vec<Rect> { (0..n).map(|i| Rect::new(1920 * i, 0, 1920, 1080)).collect() };
        host.change_layout_during_construction(layout(5));
        host.change_layout_during_construction(layout(6));
        host.set_monitors(&layout(4));
        assert!(coordinator.pump(&mut host, &mut config));

        assert_eq!(coordinator.passes(), before + 3);
        assert_eq!(coordinator.registry().monitor_indices(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_taken_own_indicator_name_is_left_alone() {
        let mut host = shell();
        host.add_indicator(Indicator::new(indicator::OWN_INDICATOR), BoxSlot::Left, 0);
        let mut config = store_with(&[]);
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        assert_eq!(host.primary_panel().locate(indicator::OWN_INDICATOR), Some((BoxSlot::Left, 0)));

        config.update(SettingsKey::ShowIndicator, |s| s.show_indicator = false).unwrap();
        for key in config.take_changes() {
            host.emit(HostEvent::SettingsChanged { key });
        }
        coordinator.pump(&mut host, &mut config);
        coordinator.disable(&mut host, &mut config);
        assert!(host.primary_panel().has_status(indicator::OWN_INDICATOR));
    }

    #[test]
    fn test_slider_position_none_switches_thumbnails_off() {
        let mut host = shell();
        let mut config = store_with(&[]);
        config
            .update(SettingsKey::ThumbnailsSliderPosition, |s| {
                s.thumbnails_slider_position = SliderPosition::None
            })
            .unwrap();
        let mut coordinator = LifecycleCoordinator::new();
        coordinator.enable(&mut host, &mut config);
        assert!(!coordinator.slider().is_shown());
        assert!(host.overviews().is_empty());
    }
}
