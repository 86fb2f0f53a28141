//! Settings schema
//!
//! Keys mirror the extension's settings schema (kebab-case) so a settings
//! file can be edited by hand or by the preferences tool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::placement::PanelOptions;

/// Settings keys, used for change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingsKey {
    ShowIndicator,
    ShowPanel,
    ShowTopPanel,
    ShowActivities,
    ShowAppMenu,
    ShowDateTime,
    ThumbnailsSliderPosition,
    AvailableIndicators,
    TransferIndicators,
}

impl SettingsKey {
    pub const ALL: [SettingsKey; 9] = [
        SettingsKey::ShowIndicator,
        SettingsKey::ShowPanel,
        SettingsKey::ShowTopPanel,
        SettingsKey::ShowActivities,
        SettingsKey::ShowAppMenu,
        SettingsKey::ShowDateTime,
        SettingsKey::ThumbnailsSliderPosition,
        SettingsKey::AvailableIndicators,
        SettingsKey::TransferIndicators,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingsKey::ShowIndicator => "show-indicator",
            SettingsKey::ShowPanel => "show-panel",
            SettingsKey::ShowTopPanel => "show-top-panel",
            SettingsKey::ShowActivities => "show-activities",
            SettingsKey::ShowAppMenu => "show-app-menu",
            SettingsKey::ShowDateTime => "show-date-time",
            SettingsKey::ThumbnailsSliderPosition => "thumbnails-slider-position",
            SettingsKey::AvailableIndicators => "available-indicators",
            SettingsKey::TransferIndicators => "transfer-indicators",
        }
    }
}

impl fmt::Display for SettingsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the overview thumbnails slider sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliderPosition {
    None,
    Left,
    #[default]
    Right,
    Auto,
}

/// Everything the extension reads from its settings store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub show_indicator: bool,
    #[serde(default = "default_true")]
    pub show_panel: bool,
    #[serde(default = "default_true")]
    pub show_top_panel: bool,
    #[serde(default = "default_true")]
    pub show_activities: bool,
    #[serde(default = "default_true")]
    pub show_app_menu: bool,
    #[serde(default = "default_true")]
    pub show_date_time: bool,
    #[serde(default)]
    pub thumbnails_slider_position: SliderPosition,
    /// Written by the coordinator, read by the preferences picker
    #[serde(default)]
    pub available_indicators: Vec<String>,
    /// Indicator name → target monitor index
    #[serde(default)]
    pub transfer_indicators: BTreeMap<String, u32>,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_indicator: true,
            show_panel: true,
            show_top_panel: true,
            show_activities: true,
            show_app_menu: true,
            show_date_time: true,
            thumbnails_slider_position: SliderPosition::default(),
            available_indicators: Vec::new(),
            transfer_indicators: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Replica roles shown on secondary panels
    pub fn panel_options(&self) -> PanelOptions {
        PanelOptions {
            show_activities: self.show_activities,
            show_app_menu: self.show_app_menu,
            show_date_time: self.show_date_time,
        }
    }

    /// Whether secondary panels should exist at all
    pub fn panels_enabled(&self) -> bool {
        self.show_panel && self.show_top_panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.thumbnails_slider_position, SliderPosition::Right);
        assert!(settings.panels_enabled());
    }

    #[test]
    fn test_schema_keys() {
        let json = r#"{
            "show-top-panel": false,
            "show-app-menu": false,
            "thumbnails-slider-position": "none",
            "transfer-indicators": {"clockMenu": 1}
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(!settings.panels_enabled());
        assert!(!settings.panel_options().show_app_menu);
        assert_eq!(settings.thumbnails_slider_position, SliderPosition::None);
        assert_eq!(settings.transfer_indicators.get("clockMenu"), Some(&1));
    }

    #[test]
    fn test_key_names_match_serialized_fields() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        let object = value.as_object().unwrap();
        for key in SettingsKey::ALL {
            assert!(object.contains_key(key.as_str()), "missing {key}");
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }
}
