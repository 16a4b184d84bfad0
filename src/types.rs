//! Closed enums shared across the catalog, settings, and cleanup scheduler.
//!
//! Everything that would otherwise be matched as a string lives here as a
//! proper enum with strum-derived parsing and display.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Catalog grouping shown as section headers in the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum Category {
    #[strum(serialize = "Display & Interface")]
    DisplayInterface,
    #[strum(serialize = "Camera & Streaming")]
    CameraStreaming,
    #[strum(serialize = "Macros & Configuration")]
    MacrosConfiguration,
    #[strum(serialize = "Calibration & Tuning")]
    CalibrationTuning,
    #[strum(serialize = "System Services")]
    SystemServices,
}

/// How a component is installed once it is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ApplyKind {
    /// Run `<scripts_dir>/<slug>.sh`
    #[default]
    Script,
    /// Register the backup-pruning timer with the service supervisor
    ScheduledCleanup,
}

/// How often the backup cleanup job fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CleanupInterval {
    Hourly,
    #[default]
    Daily,
    Weekly,
}

impl CleanupInterval {
    /// Value for the systemd timer's `OnCalendar=` key
    pub fn on_calendar(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_category_display_matches_headers() {
        assert_eq!(Category::DisplayInterface.to_string(), "Display & Interface");
        assert_eq!(Category::SystemServices.to_string(), "System Services");
        assert_eq!(Category::iter().count(), 5);
    }

    #[test]
    fn test_cleanup_interval_parse() {
        assert_eq!("weekly".parse::<CleanupInterval>(), Ok(CleanupInterval::Weekly));
        assert!("fortnightly".parse::<CleanupInterval>().is_err());
        assert_eq!(CleanupInterval::default().on_calendar(), "daily");
    }

    #[test]
    fn test_cleanup_interval_serde_is_lowercase() {
        let json = serde_json::to_string(&CleanupInterval::Hourly).unwrap();
        assert_eq!(json, "\"hourly\"");
    }
}
