//! Panel model: three ordered boxes of indicators, a status area and a menu
//! manager per monitor.
//!
//! An `Indicator` value lives in exactly one `PanelBox`. Moving it between
//! panels is a Rust move out of one box and into another, so an indicator can
//! never be parented twice.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::app_menu::{AppMenuTracker, WorkspaceSnapshot};
use crate::constants::{indicator, visibility};
use crate::geometry::Rect;
use crate::host::Monitor;

/// One of the three panel boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxSlot {
    Left,
    Center,
    Right,
}

impl BoxSlot {
    pub const ALL: [BoxSlot; 3] = [BoxSlot::Left, BoxSlot::Center, BoxSlot::Right];

    fn idx(self) -> usize {
        match self {
            BoxSlot::Left => 0,
            BoxSlot::Center => 1,
            BoxSlot::Right => 2,
        }
    }
}

impl fmt::Display for BoxSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoxSlot::Left => "left",
            BoxSlot::Center => "center",
            BoxSlot::Right => "right",
        };
        f.write_str(name)
    }
}

/// Identity of a popup menu
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MenuId(pub String);

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roles a secondary panel builds its own implementation for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplicaRole {
    Activities,
    AppMenu,
    DateMenu,
}

impl ReplicaRole {
    pub fn name(self) -> &'static str {
        match self {
            ReplicaRole::Activities => indicator::ACTIVITIES,
            ReplicaRole::AppMenu => indicator::APP_MENU,
            ReplicaRole::DateMenu => indicator::DATE_MENU,
        }
    }
}

/// Who constructed an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Owned by the host shell, may be transferred
    Host,
    /// Built by a secondary panel for itself
    Replica(ReplicaRole),
}

/// Capabilities the placement core needs from a panel item
pub trait PanelItem {
    fn name(&self) -> &str;
    fn menu(&self) -> Option<&MenuId>;
    fn set_visible(&mut self, visible: bool);
    /// Visible and fully opaque
    fn show_fully(&mut self);
}

/// A named status-area widget
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub name: String,
    pub menu: Option<MenuId>,
    pub visible: bool,
    pub opacity: u8,
    pub label: Option<String>,
    pub origin: Origin,
}

impl Indicator {
    /// Host indicator without a menu
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            menu: None,
            visible: true,
            opacity: visibility::FULL_OPACITY,
            label: None,
            origin: Origin::Host,
        }
    }

    /// Host indicator whose menu id is its own name
    pub fn with_menu(name: impl Into<String>) -> Self {
        let name = name.into();
        let menu = Some(MenuId(name.clone()));
        Self {
            menu,
            ..Self::new(name)
        }
    }

    fn replica(role: ReplicaRole, monitor_index: u32) -> Self {
        Self {
            menu: Some(MenuId(format!("{}@{}", role.name(), monitor_index))),
            origin: Origin::Replica(role),
            ..Self::new(role.name())
        }
    }
}

impl PanelItem for Indicator {
    fn name(&self) -> &str {
        &self.name
    }

    fn menu(&self) -> Option<&MenuId> {
        self.menu.as_ref()
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn show_fully(&mut self) {
        self.opacity = visibility::FULL_OPACITY;
        self.visible = true;
    }
}

/// Ordered children of one panel box
#[derive(Debug, Clone, Default)]
pub struct PanelBox {
    children: Vec<Indicator>,
}

impl PanelBox {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|i| i.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.children.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indicator> {
        self.children.iter()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Indicator> {
        self.children.iter_mut().find(|i| i.name == name)
    }

    /// Detach a child
    pub fn remove(&mut self, name: &str) -> Option<Indicator> {
        let idx = self.position(name)?;
        Some(self.children.remove(idx))
    }

    /// The host-owned child named `name`, skipping replicas with the same name
    pub fn host_indicator(&self, name: &str) -> Option<&Indicator> {
        self.children
            .iter()
            .find(|i| i.name == name && i.origin == Origin::Host)
    }

    /// Detach the host-owned child named `name`
    pub fn remove_host(&mut self, name: &str) -> Option<Indicator> {
        let idx = self
            .children
            .iter()
            .position(|i| i.name == name && i.origin == Origin::Host)?;
        Some(self.children.remove(idx))
    }

    /// Insert at `index`, clamped to the end of the box
    pub fn insert(&mut self, index: usize, indicator: Indicator) -> usize {
        let index = index.min(self.children.len());
        self.children.insert(index, indicator);
        index
    }

    /// Append at the end
    pub fn push(&mut self, indicator: Indicator) -> usize {
        self.children.push(indicator);
        self.children.len() - 1
    }
}

/// Popup menus registered with one panel
#[derive(Debug, Clone, Default)]
pub struct MenuManager {
    menus: BTreeSet<MenuId>,
}

impl MenuManager {
    /// Returns false if the menu was already registered
    pub fn add_menu(&mut self, menu: MenuId) -> bool {
        self.menus.insert(menu)
    }

    /// Returns false if the menu was not registered
    pub fn remove_menu(&mut self, menu: &MenuId) -> bool {
        self.menus.remove(menu)
    }

    pub fn contains(&self, menu: &MenuId) -> bool {
        self.menus.contains(menu)
    }

    pub fn menus(&self) -> impl Iterator<Item = &MenuId> {
        self.menus.iter()
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }
}

/// Which replica roles a secondary panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelOptions {
    pub show_activities: bool,
    pub show_app_menu: bool,
    pub show_date_time: bool,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            show_activities: true,
            show_app_menu: true,
            show_date_time: true,
        }
    }
}

/// One top bar on one monitor
#[derive(Debug, Clone)]
pub struct Panel {
    monitor_index: u32,
    is_primary: bool,
    geometry: Rect,
    boxes: [PanelBox; 3],
    status_area: BTreeSet<String>,
    menu_manager: MenuManager,
    app_menu: Option<AppMenuTracker>,
}

impl Panel {
    /// The host's own top bar
    pub fn primary(monitor: &Monitor) -> Self {
        Self::empty(monitor, true)
    }

    /// A replica panel for a secondary monitor, with its own replica roles
    pub fn secondary(monitor: &Monitor, options: &PanelOptions) -> Self {
        let mut panel = Self::empty(monitor, false);

        let mut activities = Indicator::replica(ReplicaRole::Activities, monitor.index);
        activities.set_visible(options.show_activities);
        panel.add_to_status_area(activities, BoxSlot::Left, 0);

        let mut date_menu = Indicator::replica(ReplicaRole::DateMenu, monitor.index);
        date_menu.set_visible(options.show_date_time);
        panel.add_to_status_area(date_menu, BoxSlot::Center, 0);

        if options.show_app_menu {
            panel.add_app_menu();
        }
        panel
    }

    fn empty(monitor: &Monitor, is_primary: bool) -> Self {
        Self {
            monitor_index: monitor.index,
            is_primary,
            geometry: monitor.geometry,
            boxes: Default::default(),
            status_area: BTreeSet::new(),
            menu_manager: MenuManager::default(),
            app_menu: None,
        }
    }

    pub fn monitor_index(&self) -> u32 {
        self.monitor_index
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn set_geometry(&mut self, geometry: Rect) {
        self.geometry = geometry;
    }

    /// A panel spans the full width of its monitor
    pub fn preferred_width(&self) -> u32 {
        self.geometry.width
    }

    pub fn panel_box(&self, slot: BoxSlot) -> &PanelBox {
        &self.boxes[slot.idx()]
    }

    pub fn panel_box_mut(&mut self, slot: BoxSlot) -> &mut PanelBox {
        &mut self.boxes[slot.idx()]
    }

    pub fn menu_manager(&self) -> &MenuManager {
        &self.menu_manager
    }

    pub fn menu_manager_mut(&mut self) -> &mut MenuManager {
        &mut self.menu_manager
    }

    /// Register an indicator with this panel and place it in `slot`
    ///
    /// Returns false (and drops nothing) if the name is already registered.
    pub fn add_to_status_area(&mut self, indicator: Indicator, slot: BoxSlot, position: usize) -> bool {
        if self.status_area.contains(&indicator.name) {
            return false;
        }
        self.status_area.insert(indicator.name.clone());
        if let Some(menu) = indicator.menu.clone() {
            self.menu_manager.add_menu(menu);
        }
        self.panel_box_mut(slot).insert(position, indicator);
        true
    }

    /// Unregister an indicator and detach it if it is still in one of our boxes
    pub fn remove_from_status_area(&mut self, name: &str) -> Option<Indicator> {
        if !self.status_area.remove(name) {
            return None;
        }
        let (slot, _) = self.locate(name)?;
        let indicator = self.panel_box_mut(slot).remove(name)?;
        if let Some(menu) = indicator.menu.as_ref() {
            self.menu_manager.remove_menu(menu);
        }
        Some(indicator)
    }

    pub fn has_status(&self, name: &str) -> bool {
        self.status_area.contains(name)
    }

    pub fn status_names(&self) -> impl Iterator<Item = &str> {
        self.status_area.iter().map(String::as_str)
    }

    /// Which box holds `name`, and where
    pub fn locate(&self, name: &str) -> Option<(BoxSlot, usize)> {
        BoxSlot::ALL
            .into_iter()
            .find_map(|slot| self.panel_box(slot).position(name).map(|pos| (slot, pos)))
    }

    pub fn indicator(&self, name: &str) -> Option<&Indicator> {
        self.boxes.iter().flat_map(PanelBox::iter).find(|i| i.name == name)
    }

    pub fn indicator_mut(&mut self, name: &str) -> Option<&mut Indicator> {
        self.boxes.iter_mut().find_map(|b| b.get_mut(name))
    }

    /// Every indicator in box order (left, center, right)
    pub fn indicators(&self) -> impl Iterator<Item = &Indicator> {
        self.boxes.iter().flat_map(PanelBox::iter)
    }

    /// Host indicators currently parented under this panel
    pub fn foreign_indicators(&self) -> Vec<String> {
        self.indicators()
            .filter(|i| i.origin == Origin::Host)
            .map(|i| i.name.clone())
            .collect()
    }

    /// Toggle replica roles on a secondary panel
    pub fn apply_options(&mut self, options: &PanelOptions) {
        if self.is_primary {
            return;
        }
        if let Some(activities) = self.indicator_mut(indicator::ACTIVITIES) {
            activities.set_visible(options.show_activities);
        }
        if let Some(date_menu) = self.indicator_mut(indicator::DATE_MENU) {
            date_menu.set_visible(options.show_date_time);
        }
        match (options.show_app_menu, self.has_status(indicator::APP_MENU)) {
            (true, false) => self.add_app_menu(),
            (false, true) => {
                self.remove_from_status_area(indicator::APP_MENU);
                self.app_menu = None;
            }
            _ => {}
        }
    }

    fn add_app_menu(&mut self) {
        let app_menu = Indicator::replica(ReplicaRole::AppMenu, self.monitor_index);
        // appended after everything already in the left box
        let position = self.panel_box(BoxSlot::Left).len() + 1;
        self.add_to_status_area(app_menu, BoxSlot::Left, position);
        self.app_menu = Some(AppMenuTracker::new(self.monitor_index));
    }

    /// Re-target the `appMenu` replica; returns true when its label changed
    pub fn sync_app_menu(&mut self, snapshot: &WorkspaceSnapshot) -> bool {
        let Some(tracker) = self.app_menu.as_mut() else {
            return false;
        };
        if !tracker.sync(snapshot) {
            return false;
        }
        let label = tracker.target_app().map(str::to_string);
        let replica = self
            .boxes
            .iter_mut()
            .flat_map(|b| b.children.iter_mut())
            .find(|i| i.origin == Origin::Replica(ReplicaRole::AppMenu));
        match replica {
            Some(app_menu) => {
                app_menu.label = label;
                true
            }
            None => false,
        }
    }

    /// Hide every replica role (the panel is being torn down or hidden)
    pub fn hide_replicas(&mut self) {
        for b in self.boxes.iter_mut() {
            for i in b.children.iter_mut() {
                if matches!(i.origin, Origin::Replica(_)) {
                    i.set_visible(false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(index: u32) -> Monitor {
        Monitor::new(index, index == 0, Rect::new(1920 * index as i32, 0, 1920, 1080))
    }

    #[test]
    fn test_secondary_panel_has_replicas() {
        let panel = Panel::secondary(&monitor(1), &PanelOptions::default());
        assert!(!panel.is_primary());
        assert_eq!(panel.panel_box(BoxSlot::Left).names(), vec!["activities", "appMenu"]);
        assert_eq!(panel.panel_box(BoxSlot::Center).names(), vec!["dateMenu"]);
        assert!(panel.panel_box(BoxSlot::Right).is_empty());
        assert_eq!(panel.menu_manager().len(), 3);
        assert!(panel.menu_manager().contains(&MenuId("dateMenu@1".to_string())));
        assert!(panel.foreign_indicators().is_empty());
        assert_eq!(panel.preferred_width(), 1920);
    }

    #[test]
    fn test_options_toggle_replicas() {
        let mut panel = Panel::secondary(&monitor(2), &PanelOptions::default());
        panel.apply_options(&PanelOptions {
            show_activities: false,
            show_app_menu: false,
            show_date_time: true,
        });
        assert!(!panel.indicator("activities").unwrap().visible);
        assert!(panel.indicator("dateMenu").unwrap().visible);
        assert!(panel.indicator("appMenu").is_none());
        assert!(!panel.menu_manager().contains(&MenuId("appMenu@2".to_string())));
        assert!(!panel.has_status("appMenu"));

        panel.apply_options(&PanelOptions::default());
        assert!(panel.indicator("activities").unwrap().visible);
        assert_eq!(panel.locate("appMenu"), Some((BoxSlot::Left, 1)));
        assert!(panel.has_status("appMenu"));
    }

    #[test]
    fn test_app_menu_label_follows_tracker() {
        use crate::app_menu::{WindowInfo, WindowType};

        let mut panel = Panel::secondary(&monitor(1), &PanelOptions::default());
        let snapshot = WorkspaceSnapshot {
            active_workspace: 0,
            focused_app: None,
            starting_apps: vec![],
            windows: vec![WindowInfo {
                id: 4,
                app: "editor".to_string(),
                monitor: 1,
                workspace: 0,
                has_focus: false,
                window_type: WindowType::Normal,
            }],
        };
        assert!(panel.sync_app_menu(&snapshot));
        assert_eq!(panel.indicator("appMenu").unwrap().label.as_deref(), Some("editor"));
        assert!(!panel.sync_app_menu(&snapshot));

        let mut primary = Panel::primary(&monitor(0));
        assert!(!primary.sync_app_menu(&snapshot));
    }

    #[test]
    fn test_status_area_rejects_duplicate_names() {
        let mut panel = Panel::primary(&monitor(0));
        assert!(panel.add_to_status_area(Indicator::with_menu("volume"), BoxSlot::Right, 0));
        assert!(!panel.add_to_status_area(Indicator::new("volume"), BoxSlot::Left, 0));
        assert_eq!(panel.panel_box(BoxSlot::Right).len(), 1);
        assert!(panel.panel_box(BoxSlot::Left).is_empty());
    }

    #[test]
    fn test_remove_from_status_area_unregisters_menu() {
        let mut panel = Panel::primary(&monitor(0));
        panel.add_to_status_area(Indicator::with_menu("vpn"), BoxSlot::Right, 0);
        let removed = panel.remove_from_status_area("vpn").unwrap();
        assert_eq!(removed.name, "vpn");
        assert!(!panel.has_status("vpn"));
        assert_eq!(panel.menu_manager().len(), 0);
        assert!(panel.remove_from_status_area("vpn").is_none());
    }

    #[test]
    fn test_box_insert_clamps() {
        let mut b = PanelBox::default();
        assert_eq!(b.insert(5, Indicator::new("a")), 0);
        assert_eq!(b.insert(1, Indicator::new("b")), 1);
        assert_eq!(b.insert(0, Indicator::new("c")), 0);
        assert_eq!(b.names(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_show_fully_restores_opacity() {
        let mut i = Indicator::new("clock");
        i.opacity = 0;
        i.set_visible(false);
        i.show_fully();
        assert!(i.visible);
        assert_eq!(i.opacity, 255);
    }
}
