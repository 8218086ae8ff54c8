//! Container scrolled to 500, returned to the top, then pulled.

use edgewatch_core::event_types;
use edgewatch_harness::{init_test_logging, ContainerKind, DocumentSpec, Harness, Role};
use edgewatch_platform::{ElementTree, ScrollRoot};
use edgewatch_widgets::{RefreshPhase, WidgetConfig};

fn container_at_500() -> Harness {
    init_test_logging();
    let document = DocumentSpec {
        container: ContainerKind::Element,
        initial_scroll_top: 500.0,
        ..Default::default()
    };
    let config = WidgetConfig {
        on_end_reached_threshold: 0.0,
        enable_refresh: true,
        refresh_threshold: 60.0,
        ..Default::default()
    };
    let mut harness = Harness::new(&document, config);

    let container = ScrollRoot::Element(harness.host().element(Role::Parent));
    assert_eq!(harness.list().scroll_root(), container);
    assert_eq!(harness.host().scroll_top(container), 500.0);

    harness.scroll_to(0.0);
    assert_eq!(harness.host().scroll_top(container), 0.0);
    harness
}

fn last_progress(harness: &Harness) -> f32 {
    harness
        .events()
        .iter()
        .rev()
        .find_map(|event| event.pull_progress())
        .map(|p| p.progress)
        .unwrap_or(0.0)
}

#[test]
fn drag_of_one_hundred_damps_below_the_threshold() {
    let mut harness = container_at_500();
    harness.touch_start(200.0);
    harness.touch_move(300.0);

    let height = harness.list().affordance().height_px;
    assert!((height - 50.12).abs() < 0.01, "height {height}");
    assert!(height < 120.0);
    assert!((last_progress(&harness) - 0.835).abs() < 0.001);

    harness.touch_end();
    assert_eq!(harness.list().refresh_phase(), RefreshPhase::Idle);
    assert_eq!(harness.event_count(event_types::REFRESH), 0);
}

#[test]
fn drag_past_the_threshold_commits_a_refresh() {
    let mut harness = container_at_500();
    harness.touch_start(200.0);
    harness.touch_move(330.0);

    let height = harness.list().affordance().height_px;
    assert!((height - 130f32.powf(0.85)).abs() < 0.001);
    assert!(height >= 60.0 && height < 120.0);
    assert_eq!(last_progress(&harness), 1.0);

    harness.touch_end();
    assert!(harness.list().config().is_refreshing);
    assert_eq!(harness.host().attribute("is-refreshing"), Some("true"));
    assert_eq!(harness.event_count(event_types::REFRESH), 1);
    assert_eq!(harness.list().affordance().height_px, 60.0);

    // Host finishes
    harness.set_attribute("is-refreshing", Some("false"));
    harness.wait(320.0);
    assert_eq!(harness.list().refresh_phase(), RefreshPhase::Idle);
    assert_eq!(harness.list().affordance().height_px, 0.0);
    assert_eq!(harness.event_count(event_types::REFRESH), 1);
}
