//! Scenario runner driving an [`InfiniteScrollList`](edgewatch_widgets::InfiniteScrollList)
//! over the simulated host.

use anyhow::{bail, Result};

use edgewatch_platform::OverflowY;
use edgewatch_widgets::WidgetConfig;

use crate::assert::{
    evaluate_affordance, evaluate_attribute, evaluate_event_count, evaluate_footer,
    evaluate_phase, evaluate_scroll_top, AssertionResult,
};
use crate::harness::Harness;
use crate::report::ScenarioReport;
use crate::runtime::RunConfig;
use crate::scenario::{Scenario, ScenarioStep};

/// Final outcome of a scenario run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Passed { report: ScenarioReport },
    Failed { report: ScenarioReport },
}

impl RunOutcome {
    pub fn report(&self) -> &ScenarioReport {
        match self {
            RunOutcome::Passed { report } => report,
            RunOutcome::Failed { report } => report,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Execute scenario JSON with the default run configuration.
pub fn run_scenario(input: &str) -> Result<RunOutcome> {
    let scenario = Scenario::from_json(input)?;
    run_loaded_scenario(&scenario, None, RunConfig::default())
}

/// Execute a pre-loaded scenario. `config_override` replaces the scenario's
/// own widget configuration.
pub fn run_loaded_scenario(
    scenario: &Scenario,
    config_override: Option<WidgetConfig>,
    run_cfg: RunConfig,
) -> Result<RunOutcome> {
    run_cfg.validate()?;
    scenario.validate()?;

    let config = config_override
        .or_else(|| scenario.config.clone())
        .unwrap_or_default();
    let mut harness = Harness::new(&scenario.document, config).with_tick_ms(run_cfg.tick_ms as f64);
    tracing::debug!("running scenario with {} steps", scenario.steps.len());

    for (step_index, step) in scenario.steps.iter().enumerate() {
        tracing::trace!("step {}: {}", step_index, step.kind());
        let verdict = match step {
            ScenarioStep::SetAttribute { name, value } => {
                harness.set_attribute(name, value.as_deref());
                None
            }
            ScenarioStep::ScrollTo { top } => {
                harness.scroll_to(*top);
                None
            }
            ScenarioStep::SetOverflow { element, overflow } => {
                let overflow = overflow.parse::<OverflowY>().unwrap_or_default();
                harness.set_overflow(*element, overflow);
                None
            }
            ScenarioStep::ResizeParent => {
                harness.resize_parent();
                None
            }
            ScenarioStep::SetContentHeight { height } => {
                harness.set_content_height(*height);
                None
            }
            ScenarioStep::TouchStart { y } => {
                harness.touch_start(*y);
                None
            }
            ScenarioStep::TouchMove { y } => {
                harness.touch_move(*y);
                None
            }
            ScenarioStep::TouchEnd => {
                harness.touch_end();
                None
            }
            ScenarioStep::TouchCancel => {
                harness.touch_cancel();
                None
            }
            ScenarioStep::ScrollToTop => {
                harness.scroll_to_top();
                None
            }
            ScenarioStep::ScrollToTopAndRefresh => {
                harness.scroll_to_top_and_refresh();
                None
            }
            ScenarioStep::Disconnect => {
                harness.disconnect();
                None
            }
            ScenarioStep::Reconnect => {
                harness.reconnect();
                None
            }
            ScenarioStep::Tick { frames } => {
                run_frames(&mut harness, *frames, run_cfg)?;
                None
            }
            ScenarioStep::Wait { ms } => {
                run_frames(&mut harness, run_cfg.wait_frames(*ms), run_cfg)?;
                None
            }
            ScenarioStep::AssertEventCount { event, count } => Some(evaluate_event_count(
                event,
                *count,
                &harness.snapshot(),
            )),
            ScenarioStep::AssertAffordance { height, tolerance } => Some(evaluate_affordance(
                *height,
                *tolerance,
                &harness.snapshot(),
            )),
            ScenarioStep::AssertPhase { phase } => {
                Some(evaluate_phase(phase, &harness.snapshot()))
            }
            ScenarioStep::AssertAttribute { name, value } => Some(evaluate_attribute(
                name,
                value.as_deref(),
                &harness.snapshot(),
            )),
            ScenarioStep::AssertScrollTop { top, tolerance } => Some(evaluate_scroll_top(
                *top,
                *tolerance,
                &harness.snapshot(),
            )),
            ScenarioStep::AssertFooter { slot } => {
                Some(evaluate_footer(slot, &harness.snapshot()))
            }
        };

        if let Some(AssertionResult::Failed { message, .. }) = verdict {
            tracing::debug!("step {} failed: {}", step_index, message);
            let report = ScenarioReport::failed(
                step.kind(),
                step_index,
                message,
                harness.elapsed_frames(),
                harness.now_ms(),
                harness.event_counts(),
            );
            return Ok(RunOutcome::Failed { report });
        }
    }

    Ok(RunOutcome::Passed {
        report: ScenarioReport::passed(
            harness.elapsed_frames(),
            harness.now_ms(),
            harness.event_counts(),
        ),
    })
}

fn run_frames(harness: &mut Harness, frames: u32, run_cfg: RunConfig) -> Result<()> {
    if frames > run_cfg.max_frames_per_step {
        bail!(
            "step asks for {} frames, budget is {}",
            frames,
            run_cfg.max_frames_per_step
        );
    }
    harness.run_frames(frames);
    Ok(())
}
