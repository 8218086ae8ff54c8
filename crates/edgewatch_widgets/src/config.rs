//! Typed widget configuration
//!
//! Every observed attribute has a typed field here and, for numeric fields, a
//! validated setter. String parsing lives in [`crate::attributes`]; this module
//! only deals with values that already have a type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default commit distance of the pull gesture, in pixels
pub const DEFAULT_REFRESH_THRESHOLD: f32 = 60.0;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must not be negative (got {value})")]
    NegativeThreshold { field: &'static str, value: f32 },

    #[error("{field} must be a finite number")]
    NonFiniteThreshold { field: &'static str },

    #[error("refresh-threshold must be greater than zero (got {0})")]
    NonPositiveRefreshThreshold(f32),

    #[error("Failed to parse widget config: {0}")]
    Parse(String),

    #[error("Failed to serialize widget config: {0}")]
    Serialize(String),
}

/// Widget configuration (`edgewatch.toml` / element attributes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WidgetConfig {
    /// Bottom sentinel offset from the true bottom edge
    pub on_end_reached_threshold: f32,
    /// Top sentinel offset from the true top edge
    pub on_start_reached_threshold: f32,
    /// Gates `end-reached`
    pub has_next_page: bool,
    /// Gates `start-reached`
    pub has_previous_page: bool,
    /// Activates the pull gesture on touch devices
    pub enable_refresh: bool,
    /// Commit distance of the pull gesture
    pub refresh_threshold: f32,
    /// Host-driven refresh flag
    pub is_refreshing: bool,
    /// Observe the top sentinel (upward paging)
    pub watch_top_edge: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            on_end_reached_threshold: 0.0,
            on_start_reached_threshold: 0.0,
            has_next_page: true,
            has_previous_page: true,
            enable_refresh: false,
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            is_refreshing: false,
            watch_top_edge: false,
        }
    }
}

fn check_edge_threshold(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteThreshold { field });
    }
    if value < 0.0 {
        return Err(ConfigError::NegativeThreshold { field, value });
    }
    Ok(value)
}

fn check_refresh_threshold(value: f32) -> Result<f32, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteThreshold {
            field: "refresh-threshold",
        });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositiveRefreshThreshold(value));
    }
    Ok(value)
}

impl WidgetConfig {
    /// Config with pull-to-refresh enabled
    pub fn with_refresh() -> Self {
        Self {
            enable_refresh: true,
            ..Default::default()
        }
    }

    /// Config that also observes the top edge
    pub fn bidirectional() -> Self {
        Self {
            watch_top_edge: true,
            ..Default::default()
        }
    }

    pub fn set_on_end_reached_threshold(&mut self, value: f32) -> Result<(), ConfigError> {
        self.on_end_reached_threshold = check_edge_threshold("on-end-reached-threshold", value)?;
        Ok(())
    }

    /// Also switches on top-edge observation
    pub fn set_on_start_reached_threshold(&mut self, value: f32) -> Result<(), ConfigError> {
        self.on_start_reached_threshold =
            check_edge_threshold("on-start-reached-threshold", value)?;
        self.watch_top_edge = true;
        Ok(())
    }

    pub fn set_refresh_threshold(&mut self, value: f32) -> Result<(), ConfigError> {
        self.refresh_threshold = check_refresh_threshold(value)?;
        Ok(())
    }

    /// Check every numeric field
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_edge_threshold("on-end-reached-threshold", self.on_end_reached_threshold)?;
        check_edge_threshold("on-start-reached-threshold", self.on_start_reached_threshold)?;
        check_refresh_threshold(self.refresh_threshold)?;
        Ok(())
    }

    /// Replace invalid numeric fields with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if let Err(e) = check_edge_threshold("on-end-reached-threshold", self.on_end_reached_threshold)
        {
            tracing::debug!("{}, using default", e);
            self.on_end_reached_threshold = defaults.on_end_reached_threshold;
        }
        if let Err(e) =
            check_edge_threshold("on-start-reached-threshold", self.on_start_reached_threshold)
        {
            tracing::debug!("{}, using default", e);
            self.on_start_reached_threshold = defaults.on_start_reached_threshold;
        }
        if let Err(e) = check_refresh_threshold(self.refresh_threshold) {
            tracing::debug!("{}, using default", e);
            self.refresh_threshold = defaults.refresh_threshold;
        }
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: WidgetConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_attribute_table() {
        let config = WidgetConfig::default();
        assert_eq!(config.on_end_reached_threshold, 0.0);
        assert_eq!(config.on_start_reached_threshold, 0.0);
        assert!(config.has_next_page);
        assert!(config.has_previous_page);
        assert!(!config.enable_refresh);
        assert_eq!(config.refresh_threshold, 60.0);
        assert!(!config.is_refreshing);
        assert!(!config.watch_top_edge);
    }

    #[test]
    fn test_setters_reject_invalid_values() {
        let mut config = WidgetConfig::default();

        config.set_on_end_reached_threshold(120.0).unwrap();
        assert_eq!(config.on_end_reached_threshold, 120.0);

        assert!(matches!(
            config.set_on_end_reached_threshold(-1.0),
            Err(ConfigError::NegativeThreshold { .. })
        ));
        assert!(matches!(
            config.set_on_end_reached_threshold(f32::NAN),
            Err(ConfigError::NonFiniteThreshold { .. })
        ));
        // Rejected values leave the field alone
        assert_eq!(config.on_end_reached_threshold, 120.0);

        assert_eq!(
            config.set_refresh_threshold(0.0),
            Err(ConfigError::NonPositiveRefreshThreshold(0.0))
        );
        assert_eq!(config.refresh_threshold, 60.0);
    }

    #[test]
    fn test_start_threshold_enables_top_edge() {
        let mut config = WidgetConfig::default();
        config.set_on_start_reached_threshold(40.0).unwrap();
        assert!(config.watch_top_edge);
        assert_eq!(config.on_start_reached_threshold, 40.0);
    }

    #[test]
    fn test_sanitized_falls_back_per_field() {
        let config = WidgetConfig {
            on_end_reached_threshold: -3.0,
            on_start_reached_threshold: 25.0,
            refresh_threshold: f32::INFINITY,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.on_end_reached_threshold, 0.0);
        assert_eq!(config.on_start_reached_threshold, 25.0);
        assert_eq!(config.refresh_threshold, DEFAULT_REFRESH_THRESHOLD);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_document_uses_defaults() {
        let config = WidgetConfig::from_toml_str(
            r#"
            enable-refresh = true
            refresh-threshold = 80.0
            has-next-page = false
            "#,
        )
        .unwrap();

        assert!(config.enable_refresh);
        assert_eq!(config.refresh_threshold, 80.0);
        assert!(!config.has_next_page);
        assert!(config.has_previous_page);
        assert_eq!(config.on_end_reached_threshold, 0.0);
    }

    #[test]
    fn test_toml_rejects_invalid_values() {
        let err = WidgetConfig::from_toml_str("on-end-reached-threshold = -5.0").unwrap_err();
        assert!(matches!(err, ConfigError::NegativeThreshold { .. }));

        let err = WidgetConfig::from_toml_str("refresh-threshold = \"sixty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_serialization_round_trip() {
        let config = WidgetConfig {
            on_end_reached_threshold: 200.0,
            enable_refresh: true,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("on-end-reached-threshold = 200.0"));
        assert_eq!(WidgetConfig::from_toml_str(&text).unwrap(), config);
    }
}
