//! Configuration management
//!
//! - **settings**: the settings schema (show toggles, slider position, transfers)
//! - **store**: `ConfigStore` and its JSON-file implementation

pub mod settings;
pub mod store;

pub use settings::{Settings, SettingsKey, SliderPosition};
pub use store::{ConfigStore, SettingsStore};
