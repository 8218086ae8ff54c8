//! Scenario definition for headless widget runs.

use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use thiserror::Error;

use edgewatch_core::event_type_from_name;
use edgewatch_widgets::{ConfigError, WidgetConfig};

use crate::sim_host::{DocumentSpec, Role};

const PHASE_NAMES: [&str; 4] = ["idle", "pulling", "refreshing", "settling_back"];
const FOOTER_NAMES: [&str; 2] = ["loading", "no-data"];

/// Problems found in a scenario before it runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("step {index}: unknown event '{name}'")]
    UnknownEvent { index: usize, name: String },

    #[error("step {index}: unknown refresh phase '{name}'")]
    UnknownPhase { index: usize, name: String },

    #[error("step {index}: unknown footer slot '{name}'")]
    UnknownFooter { index: usize, name: String },

    #[error("step {index}: tolerance must be a non-negative number")]
    InvalidTolerance { index: usize },

    #[error("document heights must be finite and non-negative")]
    InvalidDocument,

    #[error("invalid widget config: {0}")]
    Config(#[from] ConfigError),
}

/// Layout, widget configuration and a sequence of steps.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub document: DocumentSpec,
    /// Widget configuration; overridden by a config file on the command line
    #[serde(default)]
    pub config: Option<WidgetConfig>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Check names and numbers the JSON schema cannot
    pub fn validate(&self) -> std::result::Result<(), ScenarioError> {
        let doc = &self.document;
        let heights = [doc.viewport_height, doc.content_height, doc.initial_scroll_top];
        if heights.iter().any(|h| !h.is_finite() || *h < 0.0) {
            return Err(ScenarioError::InvalidDocument);
        }
        if let Some(config) = &self.config {
            config.validate()?;
        }

        for (index, step) in self.steps.iter().enumerate() {
            match step {
                ScenarioStep::AssertEventCount { event, .. } => {
                    if event_type_from_name(event).is_none() {
                        return Err(ScenarioError::UnknownEvent {
                            index,
                            name: event.clone(),
                        });
                    }
                }
                ScenarioStep::AssertPhase { phase } => {
                    if !PHASE_NAMES.contains(&phase.as_str()) {
                        return Err(ScenarioError::UnknownPhase {
                            index,
                            name: phase.clone(),
                        });
                    }
                }
                ScenarioStep::AssertFooter { slot } => {
                    if !FOOTER_NAMES.contains(&slot.as_str()) {
                        return Err(ScenarioError::UnknownFooter {
                            index,
                            name: slot.clone(),
                        });
                    }
                }
                ScenarioStep::AssertAffordance { tolerance, .. }
                | ScenarioStep::AssertScrollTop { tolerance, .. } => {
                    if tolerance.is_some_and(|t| !t.is_finite() || t < 0.0) {
                        return Err(ScenarioError::InvalidTolerance { index });
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Scenario steps: page actions, time, and assertions.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// `value` absent removes the attribute
    SetAttribute {
        name: String,
        #[serde(default)]
        value: Option<String>,
    },
    ScrollTo {
        top: f32,
    },
    /// CSS keyword, unknown keywords compute to `visible`
    SetOverflow {
        element: Role,
        overflow: String,
    },
    ResizeParent,
    SetContentHeight {
        height: f32,
    },
    TouchStart {
        y: f32,
    },
    TouchMove {
        y: f32,
    },
    TouchEnd,
    TouchCancel,
    ScrollToTop,
    ScrollToTopAndRefresh,
    Disconnect,
    Reconnect,
    Tick {
        frames: u32,
    },
    Wait {
        ms: u64,
    },
    AssertEventCount {
        event: String,
        count: usize,
    },
    AssertAffordance {
        height: f32,
        #[serde(default)]
        tolerance: Option<f32>,
    },
    AssertPhase {
        phase: String,
    },
    /// `value` absent asserts the attribute is not set
    AssertAttribute {
        name: String,
        #[serde(default)]
        value: Option<String>,
    },
    AssertScrollTop {
        top: f32,
        #[serde(default)]
        tolerance: Option<f32>,
    },
    AssertFooter {
        slot: String,
    },
}

impl ScenarioStep {
    /// Snake-case tag, used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            ScenarioStep::SetAttribute { .. } => "set_attribute",
            ScenarioStep::ScrollTo { .. } => "scroll_to",
            ScenarioStep::SetOverflow { .. } => "set_overflow",
            ScenarioStep::ResizeParent => "resize_parent",
            ScenarioStep::SetContentHeight { .. } => "set_content_height",
            ScenarioStep::TouchStart { .. } => "touch_start",
            ScenarioStep::TouchMove { .. } => "touch_move",
            ScenarioStep::TouchEnd => "touch_end",
            ScenarioStep::TouchCancel => "touch_cancel",
            ScenarioStep::ScrollToTop => "scroll_to_top",
            ScenarioStep::ScrollToTopAndRefresh => "scroll_to_top_and_refresh",
            ScenarioStep::Disconnect => "disconnect",
            ScenarioStep::Reconnect => "reconnect",
            ScenarioStep::Tick { .. } => "tick",
            ScenarioStep::Wait { .. } => "wait",
            ScenarioStep::AssertEventCount { .. } => "assert_event_count",
            ScenarioStep::AssertAffordance { .. } => "assert_affordance",
            ScenarioStep::AssertPhase { .. } => "assert_phase",
            ScenarioStep::AssertAttribute { .. } => "assert_attribute",
            ScenarioStep::AssertScrollTop { .. } => "assert_scroll_top",
            ScenarioStep::AssertFooter { .. } => "assert_footer",
        }
    }
}
