//! Scenario replay against the in-memory shell
//!
//! A scenario file describes the monitors, the primary panel and the session
//! mode, then a list of steps (enable, settings writes, monitor changes,
//! host signals, fired timeouts, disable). Settings writes are forwarded to
//! the coordinator as settings-changed signals, the same way a settings
//! backend would notify.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::app_menu::WorkspaceSnapshot;
use crate::config::{ConfigStore, Settings, SettingsKey, SettingsStore};
use crate::geometry::Rect;
use crate::host::{HostEvent, ShellHost, SimShell};
use crate::lifecycle::LifecycleCoordinator;
use crate::placement::{BoxSlot, Indicator, Panel, SessionFilter, compute_available};

/// An indicator on the primary panel: a bare name has a menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorSpec {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        menu: bool,
    },
}

impl IndicatorSpec {
    fn build(&self) -> Indicator {
        match self {
            IndicatorSpec::Name(name) => Indicator::with_menu(name.as_str()),
            IndicatorSpec::Full { name, menu: true } => Indicator::with_menu(name.as_str()),
            IndicatorSpec::Full { name, menu: false } => Indicator::new(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSpec {
    #[serde(default)]
    pub left: Vec<IndicatorSpec>,
    #[serde(default)]
    pub center: Vec<IndicatorSpec>,
    #[serde(default)]
    pub right: Vec<IndicatorSpec>,
}

impl PanelSpec {
    fn slots(&self) -> [(BoxSlot, &[IndicatorSpec]); 3] {
        [
            (BoxSlot::Left, self.left.as_slice()),
            (BoxSlot::Center, self.center.as_slice()),
            (BoxSlot::Right, self.right.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "step")]
pub enum Step {
    Enable,
    Disable,
    /// Write one settings key
    Set { key: SettingsKey, value: serde_json::Value },
    SetMonitors { monitors: Vec<Rect> },
    SetSessionIndicators { names: Vec<String> },
    AddIndicator {
        indicator: IndicatorSpec,
        slot: BoxSlot,
        #[serde(default)]
        position: usize,
    },
    RemoveIndicator { name: String },
    SetWindows { snapshot: WorkspaceSnapshot },
    /// Deliver a host signal straight to the coordinator
    Event { event: HostEvent },
    /// Make the shell refuse panel construction on a monitor
    FailPanel { monitor: u32 },
    AllowPanel { monitor: u32 },
    /// Switch to `monitors` when the shell next constructs a panel
    LayoutDuringPass { monitors: Vec<Rect> },
    /// Make the shell refuse the thumbnails box on a monitor
    FailOverview { monitor: u32 },
    AllowOverview { monitor: u32 },
    /// Let every pending host timeout fire
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scenario {
    pub monitors: Vec<Rect>,
    #[serde(default)]
    pub session_indicators: Vec<String>,
    #[serde(default)]
    pub panel: PanelSpec,
    #[serde(default)]
    pub windows: WorkspaceSnapshot,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read scenario from {:?}", path))?;
        let scenario: Scenario = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse scenario JSON from {:?}", path))?;
        check_layout(&scenario.monitors).with_context(|| format!("Invalid monitor layout in {:?}", path))?;
        info!(
            path = %path.display(),
            monitors = scenario.monitors.len(),
            steps = scenario.steps.len(),
            "Loaded scenario"
        );
        Ok(scenario)
    }

    pub fn shell(&self) -> SimShell {
        let mut builder = SimShell::builder()
            .session_indicators(self.session_indicators.iter().cloned())
            .snapshot(self.windows.clone());
        for rect in &self.monitors {
            builder = builder.monitor(*rect);
        }
        for (slot, specs) in self.panel.slots() {
            for spec in specs {
                builder = builder.indicator(spec.build(), slot);
            }
        }
        builder.build()
    }

    /// Transferable indicators of the initial primary panel
    pub fn available(&self) -> BTreeSet<String> {
        let host = self.shell();
        let allow_list = SessionFilter::allow_list(&host.session_indicators());
        compute_available(
            host.primary_panel().status_names(),
            allow_list.iter().map(String::as_str),
        )
    }

    pub fn replay(&self) -> Result<Replay> {
        let mut replay = Replay {
            host: self.shell(),
            config: SettingsStore::in_memory(self.settings.clone()),
            coordinator: LifecycleCoordinator::new(),
        };
        for (n, step) in self.steps.iter().enumerate() {
            debug!(step = n, kind = ?step, "Replaying step");
            replay
                .apply(step)
                .with_context(|| format!("Step {} failed", n + 1))?;
        }
        Ok(replay)
    }
}

/// State after a replay
#[derive(Debug)]
pub struct Replay {
    pub host: SimShell,
    pub config: SettingsStore,
    pub coordinator: LifecycleCoordinator,
}

impl Replay {
    fn apply(&mut self, step: &Step) -> Result<()> {
        let Replay {
            host,
            config,
            coordinator,
        } = self;
        match step {
            Step::Enable => coordinator.enable(host, config),
            Step::Disable => coordinator.disable(host, config),
            Step::Set { key, value } => config.set_value(*key, value.clone())?,
            Step::SetMonitors { monitors } => {
                check_layout(monitors)?;
                host.set_monitors(monitors);
            }
            Step::SetSessionIndicators { names } => host.set_session_indicators(names.clone()),
            Step::AddIndicator {
                indicator,
                slot,
                position,
            } => {
                host.add_indicator(indicator.build(), *slot, *position);
            }
            Step::RemoveIndicator { name } => {
                host.remove_indicator(name);
            }
            Step::SetWindows { snapshot } => host.set_window_snapshot(snapshot.clone()),
            Step::Event { event } => coordinator.handle_event(event, host, config),
            Step::FailPanel { monitor } => host.fail_panel_construction(*monitor),
            Step::AllowPanel { monitor } => host.allow_panel_construction(*monitor),
            Step::LayoutDuringPass { monitors } => {
                check_layout(monitors)?;
                host.change_layout_during_construction(monitors.clone());
            }
            Step::FailOverview { monitor } => host.fail_overview(*monitor),
            Step::AllowOverview { monitor } => host.allow_overview(*monitor),
            Step::Timeout => {
                for id in host.fire_timeouts() {
                    coordinator.on_timeout(id, host, config);
                }
            }
        }

        for key in config.take_changes() {
            host.emit(HostEvent::SettingsChanged { key });
        }
        coordinator.pump(host, config);
        Ok(())
    }

    /// Human-readable layout of every panel, the ledger and pass count
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_panel(&mut out, self.host.primary_panel());
        for panel in self.coordinator.registry().panels() {
            render_panel(&mut out, panel);
        }

        let ledger = self.coordinator.engine().ledger();
        if ledger.is_empty() {
            out.push_str("transfers: none\n");
        } else {
            out.push_str("transfers:\n");
            for r in ledger.records() {
                let _ = writeln!(out, "  {} -> monitor {} ({})", r.iname, r.monitor_index, r.origin_box);
            }
        }

        let available = &self.config.settings().available_indicators;
        let _ = writeln!(out, "available: [{}]", available.join(", "));
        let _ = writeln!(
            out,
            "host: constructed {:?}, released {:?}, overviews built {:?}, signals {}, cancelled timeouts {}",
            self.host.constructed_panels(),
            self.host.released_panels(),
            self.host.overview_builds(),
            self.host.connected_signals().len(),
            self.host.cancelled_timeouts().len()
        );
        let _ = writeln!(
            out,
            "state: {:?}, passes: {}, deferred pass pending: {}",
            self.coordinator.state(),
            self.coordinator.passes(),
            self.coordinator.deferred_pass().is_some()
        );
        out
    }
}

/// At least one monitor, no two overlapping
fn check_layout(monitors: &[Rect]) -> Result<()> {
    if monitors.is_empty() {
        bail!("Layout has no monitors");
    }
    for (i, a) in monitors.iter().enumerate() {
        for (j, b) in monitors.iter().enumerate().skip(i + 1) {
            if a.overlaps(b) {
                bail!("Monitors {} and {} overlap", i, j);
            }
        }
    }
    Ok(())
}

fn render_panel(out: &mut String, panel: &Panel) {
    let kind = if panel.is_primary() { "primary" } else { "secondary" };
    let _ = write!(
        out,
        "monitor {} ({}, {}px):",
        panel.monitor_index(),
        kind,
        panel.preferred_width()
    );
    for slot in BoxSlot::ALL {
        let names: Vec<String> = panel
            .panel_box(slot)
            .iter()
            .map(|i| match (&i.label, i.visible) {
                (_, false) => format!("{} (hidden)", i.name),
                (Some(label), true) => format!("{} [{}]", i.name, label),
                (None, true) => i.name.clone(),
            })
            .collect();
        let _ = write!(out, " {}: [{}]", slot, names.join(", "));
    }
    out.push('\n');
}
