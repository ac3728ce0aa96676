//! Engine configuration.

use crate::registry::DEFAULT_MAX_PLACEMENT_ATTEMPTS;
use crate::viewport::ViewportConfig;
use serde::{Deserialize, Serialize};

/// Tunables for a [`Dashboard`](crate::Dashboard).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use dashgrid_core::DashboardConfig;
///
/// let config = DashboardConfig::from_json(r#"{ "viewport": { "mobile_max_width": 1024 } }"#).unwrap();
/// assert_eq!(config.viewport.mobile_max_width, 1024);
/// assert_eq!(config.viewport.desktop.grid_size, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub viewport: ViewportConfig,
    /// Candidate positions tried before auto-placement gives up.
    pub max_placement_attempts: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            max_placement_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

impl DashboardConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{DEFAULT_MOBILE_MAX_WIDTH, ViewportProfile};

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_roundtrip_custom_profile() {
        let mut config = DashboardConfig::default();
        config.viewport.mobile.min_width_cells = 4;
        config.max_placement_attempts = 12;
        let parsed = DashboardConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_profile_keeps_class_defaults() {
        let config = DashboardConfig::from_json(r#"{ "viewport": { "mobile": { "grid_size": 5 } } }"#).unwrap();
        let mobile = config.viewport.mobile;
        assert_eq!(mobile.grid_size, 5);
        assert_eq!(mobile.min_width_cells, ViewportProfile::mobile().min_width_cells);
        assert_eq!(mobile.origin, ViewportProfile::mobile().origin);
        assert_eq!(config.viewport.desktop, ViewportProfile::desktop());
        assert_eq!(config.viewport.mobile_max_width, DEFAULT_MOBILE_MAX_WIDTH);
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(DashboardConfig::from_json(r#"{ "max_placement_attempts": "many" }"#).is_err());
    }
}
