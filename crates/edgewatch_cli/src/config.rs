//! Widget configuration file handling

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use edgewatch_widgets::WidgetConfig;

/// Default config file name looked up next to a scenario
pub const CONFIG_FILE: &str = "edgewatch.toml";

/// Read and validate a widget config file
pub fn load_widget_config(path: &Path) -> Result<WidgetConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    WidgetConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// `edgewatch.toml` in the scenario's directory, if present
pub fn discover_config(scenario: &Path) -> Result<Option<WidgetConfig>> {
    let Some(dir) = scenario.parent() else {
        return Ok(None);
    };
    let candidate = dir.join(CONFIG_FILE);
    if !candidate.is_file() {
        return Ok(None);
    }
    tracing::debug!("using {}", candidate.display());
    load_widget_config(&candidate).map(Some)
}
