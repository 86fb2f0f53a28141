//! Application tracking for the `appMenu` replica of a secondary panel
//!
//! Each secondary panel shows the application that owns the most relevant
//! window on *its* monitor, not the globally focused one.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowType {
    Normal,
    Dialog,
    ModalDialog,
    SplashScreen,
    Desktop,
    Dock,
    Utility,
    Other,
}

impl WindowType {
    /// Window types whose arrival or departure re-syncs the app menu
    pub fn triggers_sync(self) -> bool {
        matches!(
            self,
            WindowType::Normal | WindowType::Dialog | WindowType::ModalDialog | WindowType::SplashScreen
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: u64,
    pub app: String,
    pub monitor: u32,
    pub workspace: u32,
    #[serde(default)]
    pub has_focus: bool,
    #[serde(default = "default_window_type")]
    pub window_type: WindowType,
}

fn default_window_type() -> WindowType {
    WindowType::Normal
}

/// An application that is launching and has no window yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingApp {
    pub app: String,
    pub workspace: u32,
}

/// Windows of the session, `windows` in tab-list (most recently used) order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub active_workspace: u32,
    #[serde(default)]
    pub focused_app: Option<String>,
    #[serde(default)]
    pub starting_apps: Vec<StartingApp>,
    #[serde(default)]
    pub windows: Vec<WindowInfo>,
}

impl WorkspaceSnapshot {
    fn app_on_workspace(&self, app: &str, workspace: u32) -> bool {
        self.windows.iter().any(|w| w.app == app && w.workspace == workspace)
    }
}

/// Per-monitor app-menu state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMenuTracker {
    monitor_index: u32,
    last_focused: Option<u64>,
    target_app: Option<String>,
    /// App whose focused window is on another monitor while it also has a window here
    watched_group: Option<String>,
}

impl AppMenuTracker {
    pub fn new(monitor_index: u32) -> Self {
        Self {
            monitor_index,
            last_focused: None,
            target_app: None,
            watched_group: None,
        }
    }

    pub fn target_app(&self) -> Option<&str> {
        self.target_app.as_deref()
    }

    pub fn watched_group(&self) -> Option<&str> {
        self.watched_group.as_deref()
    }

    /// Pick the app to show for this monitor
    pub fn find_target_app(&mut self, snapshot: &WorkspaceSnapshot) -> Option<String> {
        self.watched_group = None;
        let workspace = snapshot.active_workspace;

        if let Some(focused) = snapshot.focused_app.as_deref() {
            if snapshot.app_on_workspace(focused, workspace) {
                let mut group_window = false;
                let mut group_focus = false;
                for win in snapshot
                    .windows
                    .iter()
                    .filter(|w| w.app == focused && w.workspace == workspace)
                {
                    if win.monitor == self.monitor_index {
                        if win.has_focus {
                            self.last_focused = Some(win.id);
                            return Some(focused.to_string());
                        }
                        group_window = true;
                    } else if win.has_focus {
                        group_focus = true;
                    }
                    if group_focus && group_window {
                        if self.target_app.as_deref() != Some(focused) {
                            self.watched_group = Some(focused.to_string());
                        }
                        break;
                    }
                }
            }
        }

        if let Some(starting) = snapshot.starting_apps.iter().find(|s| s.workspace == workspace) {
            return Some(starting.app.clone());
        }

        if let Some(last) = self.last_focused {
            if let Some(win) = snapshot.windows.iter().find(|w| w.id == last) {
                if win.workspace == workspace && win.monitor == self.monitor_index {
                    return Some(win.app.clone());
                }
            }
        }

        let here = snapshot
            .windows
            .iter()
            .find(|w| w.workspace == workspace && w.monitor == self.monitor_index)?;
        self.last_focused = Some(here.id);
        Some(here.app.clone())
    }

    /// Recompute the target; returns true when it changed
    pub fn sync(&mut self, snapshot: &WorkspaceSnapshot) -> bool {
        let target = self.find_target_app(snapshot);
        if target == self.target_app {
            return false;
        }
        debug!(monitor = self.monitor_index, app = ?target, "App menu target changed");
        self.target_app = target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn win(id: u64, app: &str, monitor: u32, workspace: u32, has_focus: bool) -> WindowInfo {
        WindowInfo {
            id,
            app: app.to_string(),
            monitor,
            workspace,
            has_focus,
            window_type: WindowType::Normal,
        }
    }

    #[test]
    fn test_focused_window_on_this_monitor_wins() {
        let snap = WorkspaceSnapshot {
            active_workspace: 0,
            focused_app: Some("firefox".to_string()),
            starting_apps: vec![],
            windows: vec![win(1, "terminal", 1, 0, false), win(2, "firefox", 1, 0, true)],
        };
        let mut tracker = AppMenuTracker::new(1);
        assert_eq!(tracker.find_target_app(&snap), Some("firefox".to_string()));
    }

    #[test]
    fn test_focus_elsewhere_falls_back_to_mru_window_here() {
        let snap = WorkspaceSnapshot {
            active_workspace: 0,
            focused_app: Some("firefox".to_string()),
            starting_apps: vec![],
            windows: vec![win(2, "firefox", 0, 0, true), win(5, "editor", 1, 0, false)],
        };
        let mut tracker = AppMenuTracker::new(1);
        assert_eq!(tracker.find_target_app(&snap), Some("editor".to_string()));
        assert!(tracker.watched_group().is_none());
    }

    #[test]
    fn test_group_split_across_monitors_is_watched() {
        let snap = WorkspaceSnapshot {
            active_workspace: 0,
            focused_app: Some("firefox".to_string()),
            starting_apps: vec![],
            windows: vec![win(3, "firefox", 1, 0, false), win(2, "firefox", 0, 0, true)],
        };
        let mut tracker = AppMenuTracker::new(1);
        assert_eq!(tracker.find_target_app(&snap), Some("firefox".to_string()));
        assert_eq!(tracker.watched_group(), Some("firefox"));
    }

    #[test]
    fn test_starting_app_beats_last_focused() {
        let mut tracker = AppMenuTracker::new(1);
        let first = WorkspaceSnapshot {
            active_workspace: 0,
            focused_app: None,
            starting_apps: vec![],
            windows: vec![win(7, "editor", 1, 0, false)],
        };
        assert!(tracker.sync(&first));
        assert_eq!(tracker.target_app(), Some("editor"));

        let launching = WorkspaceSnapshot {
            starting_apps: vec![StartingApp {
                app: "gimp".to_string(),
                workspace: 0,
            }],
            ..first.clone()
        };
        assert!(tracker.sync(&launching));
        assert_eq!(tracker.target_app(), Some("gimp"));
        assert!(tracker.sync(&first));
        assert!(!tracker.sync(&first));
    }

    #[test]
    fn test_other_workspace_windows_ignored() {
        let snap = WorkspaceSnapshot {
            active_workspace: 1,
            focused_app: None,
            starting_apps: vec![],
            windows: vec![win(1, "editor", 1, 0, false)],
        };
        let mut tracker = AppMenuTracker::new(1);
        assert_eq!(tracker.find_target_app(&snap), None);
        assert!(!tracker.sync(&snap));
    }

    #[test]
    fn test_sync_relevant_window_types() {
        assert!(WindowType::ModalDialog.triggers_sync());
        assert!(WindowType::SplashScreen.triggers_sync());
        assert!(!WindowType::Dock.triggers_sync());
        assert!(!WindowType::Desktop.triggers_sync());
    }
}
