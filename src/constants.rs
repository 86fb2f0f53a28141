//! Application-wide constants
//!
//! Names, slots and paths shared by the placement core, the configuration
//! layer and the CLI.

/// Indicator names with special meaning to the panels
pub mod indicator {
    /// Status-area name of the extension's own indicator on the primary panel
    pub const OWN_INDICATOR: &str = "MultiMonitorsAddOn";

    /// Replica role: overview toggle button
    pub const ACTIVITIES: &str = "activities";

    /// Replica role: focused application menu
    pub const APP_MENU: &str = "appMenu";

    /// Replica role: clock and calendar menu
    pub const DATE_MENU: &str = "dateMenu";
}

/// Box insertion slots used when returning an indicator to the primary panel
pub mod slots {
    /// The left box keeps its first child (activities) in place
    pub const LEFT_BOX_RESTORE_INDEX: usize = 1;

    /// Center and right boxes take returned indicators at the front
    pub const DEFAULT_RESTORE_INDEX: usize = 0;
}

/// Visibility constants
pub mod visibility {
    /// Fully opaque indicator container
    pub const FULL_OPACITY: u8 = 255;
}

/// Lifecycle timing
pub mod lifecycle {
    use std::time::Duration;

    /// Delay before the revalidation pass scheduled after activation
    pub const DEFERRED_REVALIDATION: Duration = Duration::from_millis(1000);

    /// Follow-up passes one batch may run while the host keeps emitting
    pub const MAX_FOLLOW_UP_PASSES: usize = 8;
}

/// Configuration file locations
pub mod config {
    /// Directory under the user config dir
    pub const APP_DIR: &str = "mmpanel";

    /// Settings file name
    pub const FILENAME: &str = "settings.json";
}
