//! Assertion helpers for scenario steps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Widget-observable state used for scenario assertions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetSnapshot {
    /// Emitted notifications by name
    pub events: BTreeMap<String, usize>,
    pub affordance_height: f32,
    pub phase: String,
    /// Host-visible attributes on the widget element
    pub attributes: BTreeMap<String, String>,
    pub scroll_top: f32,
    pub footer: String,
}

/// Tolerance used when a height or position assertion does not give one
pub const DEFAULT_TOLERANCE: f32 = 0.5;

/// Assertion result with structured failure details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionResult {
    Passed,
    Failed { code: String, message: String },
}

pub fn evaluate_event_count(
    event: &str,
    expected: usize,
    snapshot: &WidgetSnapshot,
) -> AssertionResult {
    let actual = snapshot.events.get(event).copied().unwrap_or(0);
    if actual == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::Failed {
            code: "event_count_mismatch".to_string(),
            message: format!("{event}: expected {expected} events, got {actual}"),
        }
    }
}

pub fn evaluate_affordance(
    expected: f32,
    tolerance: Option<f32>,
    snapshot: &WidgetSnapshot,
) -> AssertionResult {
    let tolerance = tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let actual = snapshot.affordance_height;
    if (actual - expected).abs() <= tolerance {
        AssertionResult::Passed
    } else {
        AssertionResult::Failed {
            code: "affordance_mismatch".to_string(),
            message: format!("affordance height: expected {expected}±{tolerance}, got {actual}"),
        }
    }
}

pub fn evaluate_phase(expected: &str, snapshot: &WidgetSnapshot) -> AssertionResult {
    if snapshot.phase == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::Failed {
            code: "phase_mismatch".to_string(),
            message: format!("refresh phase: expected '{expected}', got '{}'", snapshot.phase),
        }
    }
}

/// `expected = None` asserts the attribute is absent
pub fn evaluate_attribute(
    name: &str,
    expected: Option<&str>,
    snapshot: &WidgetSnapshot,
) -> AssertionResult {
    let actual = snapshot.attributes.get(name).map(String::as_str);
    if actual == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::Failed {
            code: "attribute_mismatch".to_string(),
            message: format!("{name}: expected {expected:?}, got {actual:?}"),
        }
    }
}

pub fn evaluate_scroll_top(
    expected: f32,
    tolerance: Option<f32>,
    snapshot: &WidgetSnapshot,
) -> AssertionResult {
    let tolerance = tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let actual = snapshot.scroll_top;
    if (actual - expected).abs() <= tolerance {
        AssertionResult::Passed
    } else {
        AssertionResult::Failed {
            code: "scroll_top_mismatch".to_string(),
            message: format!("scroll top: expected {expected}±{tolerance}, got {actual}"),
        }
    }
}

pub fn evaluate_footer(expected: &str, snapshot: &WidgetSnapshot) -> AssertionResult {
    if snapshot.footer == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::Failed {
            code: "footer_mismatch".to_string(),
            message: format!("footer slot: expected '{expected}', got '{}'", snapshot.footer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> WidgetSnapshot {
        WidgetSnapshot {
            events: BTreeMap::from([("refresh".to_string(), 1)]),
            affordance_height: 60.0,
            phase: "refreshing".to_string(),
            attributes: BTreeMap::from([("is-refreshing".to_string(), "true".to_string())]),
            scroll_top: 0.0,
            footer: "loading".to_string(),
        }
    }

    #[test]
    fn test_event_count() {
        let snap = snapshot();
        assert_eq!(evaluate_event_count("refresh", 1, &snap), AssertionResult::Passed);
        assert_eq!(evaluate_event_count("end-reached", 0, &snap), AssertionResult::Passed);
        assert!(matches!(
            evaluate_event_count("refresh", 2, &snap),
            AssertionResult::Failed { .. }
        ));
    }

    #[test]
    fn test_affordance_tolerance() {
        let snap = snapshot();
        assert_eq!(evaluate_affordance(60.4, None, &snap), AssertionResult::Passed);
        assert!(matches!(
            evaluate_affordance(62.0, Some(1.0), &snap),
            AssertionResult::Failed { .. }
        ));
    }

    #[test]
    fn test_attribute_presence() {
        let snap = snapshot();
        assert_eq!(
            evaluate_attribute("is-refreshing", Some("true"), &snap),
            AssertionResult::Passed
        );
        assert_eq!(evaluate_attribute("has-next-page", None, &snap), AssertionResult::Passed);
        let AssertionResult::Failed { code, .. } =
            evaluate_attribute("is-refreshing", None, &snap)
        else {
            panic!("expected failure");
        };
        assert_eq!(code, "attribute_mismatch");
    }
}
