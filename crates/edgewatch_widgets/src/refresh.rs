//! Pull-to-refresh gesture controller
//!
//! Converts raw touch deltas into a damped affordance height and decides
//! commit versus cancel at release. The same commit path serves the natural
//! gesture and the programmatic `scroll_to_top_and_refresh`.
//!
//! ```text
//!            pointer down (at top)
//!   Idle ─────────────────────────▶ Pulling
//!    ▲  ◀── release < threshold ───┘   │
//!    │                                 │ release ≥ threshold
//!    │ settled                         ▼
//! SettlingBack ◀── host clears ──── Refreshing ◀── programmatic commit
//! ```

use edgewatch_core::{PullProgress, StateTransitions};
use edgewatch_platform::{AffordanceStyle, Surface, TRANSITION_MS};

/// Damping exponent applied to the raw drag distance
pub const PULL_DAMPING_EXPONENT: f32 = 0.85;

/// Affordance height cap as a multiple of the commit threshold
pub const MAX_PULL_FACTOR: f32 = 2.0;

/// Events driving [`RefreshPhase`]
pub mod refresh_events {
    pub const POINTER_DOWN: u32 = 1;
    pub const RELEASE_COMMIT: u32 = 2;
    pub const RELEASE_CANCEL: u32 = 3;
    pub const POINTER_CANCEL: u32 = 4;
    pub const PROGRAMMATIC_COMMIT: u32 = 5;
    /// Host cleared `is-refreshing`
    pub const REFRESH_DONE: u32 = 6;
    /// Collapse transition finished
    pub const SETTLED: u32 = 7;
    /// Refresh disabled mid-gesture
    pub const DISABLE: u32 = 8;
    /// Host set `is-refreshing` itself
    pub const HOST_REFRESHING: u32 = 9;
}

/// Refresh state, exactly one per widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefreshPhase {
    #[default]
    Idle,
    /// Finger down at the top, affordance tracking the drag
    Pulling,
    /// Committed; waits for the host to clear `is-refreshing`
    Refreshing,
    /// Affordance collapsing after the host finished
    SettlingBack,
}

impl RefreshPhase {
    pub fn is_refreshing(&self) -> bool {
        matches!(self, RefreshPhase::Refreshing)
    }

    pub fn is_pulling(&self) -> bool {
        matches!(self, RefreshPhase::Pulling)
    }

    /// Lowercase name used in scenario files and logs
    pub fn name(&self) -> &'static str {
        match self {
            RefreshPhase::Idle => "idle",
            RefreshPhase::Pulling => "pulling",
            RefreshPhase::Refreshing => "refreshing",
            RefreshPhase::SettlingBack => "settling_back",
        }
    }
}

impl StateTransitions for RefreshPhase {
    fn on_event(&self, event: u32) -> Option<Self> {
        use refresh_events::*;
        use RefreshPhase::*;
        match (self, event) {
            (Idle | SettlingBack, POINTER_DOWN) => Some(Pulling),
            (Pulling, RELEASE_COMMIT) => Some(Refreshing),
            (Pulling, RELEASE_CANCEL | POINTER_CANCEL | DISABLE) => Some(Idle),
            (Idle | Pulling | SettlingBack, PROGRAMMATIC_COMMIT | HOST_REFRESHING) => {
                Some(Refreshing)
            }
            (Refreshing, REFRESH_DONE) => Some(SettlingBack),
            (SettlingBack, SETTLED) => Some(Idle),
            _ => None,
        }
    }
}

/// Touch state between pointer-down and pointer-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub start_y: f32,
    pub pulling: bool,
    /// Last damped distance applied to the affordance
    pub distance: f32,
}

/// `min(delta^0.85, 2 × threshold)` for downward drags, 0 otherwise
pub fn damped_pull_distance(delta: f32, threshold: f32) -> f32 {
    if delta <= 0.0 {
        return 0.0;
    }
    delta
        .powf(PULL_DAMPING_EXPONENT)
        .min(threshold * MAX_PULL_FACTOR)
}

/// Result of a pointer move
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveOutcome {
    pub prevent_default: bool,
    /// Payload for `refresh-pulling` when the affordance moved
    pub progress: Option<PullProgress>,
}

/// Result of a pointer release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Not pulling; spurious release
    Ignored,
    Committed,
    Cancelled,
}

pub struct GestureRefreshController {
    phase: RefreshPhase,
    session: Option<GestureSession>,
    threshold: f32,
    enabled: bool,
    affordance: AffordanceStyle,
    settle_deadline: Option<f64>,
}

impl GestureRefreshController {
    pub fn new(threshold: f32, enabled: bool) -> Self {
        Self {
            phase: RefreshPhase::Idle,
            session: None,
            threshold,
            enabled,
            affordance: AffordanceStyle::COLLAPSED,
            settle_deadline: None,
        }
    }

    fn set_affordance<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        height_px: f32,
        transition_enabled: bool,
    ) {
        self.affordance = AffordanceStyle {
            height_px,
            transition_enabled,
        };
        surface.apply_affordance(self.affordance);
    }

    /// Start a pull if refresh is enabled, nothing is refreshing and the
    /// scroll root sits at the top. Returns true if a session started.
    pub fn pointer_down<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        scroll_top: f32,
        page_y: f32,
    ) -> bool {
        if !self.enabled || !self.phase.can_send(refresh_events::POINTER_DOWN) {
            return false;
        }
        if scroll_top > 0.0 {
            return false;
        }

        self.session = Some(GestureSession {
            start_y: page_y,
            pulling: true,
            distance: 0.0,
        });
        self.settle_deadline = None;
        self.phase.apply(refresh_events::POINTER_DOWN);
        let height = self.affordance.height_px;
        self.set_affordance(surface, height, false);
        tracing::trace!("pull started at y={}", page_y);
        true
    }

    /// Track a drag. Only downward movement grows the affordance.
    pub fn pointer_move<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        page_y: f32,
        cancelable: bool,
    ) -> MoveOutcome {
        if !self.phase.is_pulling() {
            return MoveOutcome::default();
        }
        let Some(start_y) = self.session.map(|s| s.start_y) else {
            return MoveOutcome::default();
        };

        let delta = page_y - start_y;
        if delta <= 0.0 {
            return MoveOutcome::default();
        }

        let distance = damped_pull_distance(delta, self.threshold);
        if let Some(session) = self.session.as_mut() {
            session.distance = distance;
        }
        self.set_affordance(surface, distance, false);
        tracing::trace!("pull delta={:.1} damped={:.1}", delta, distance);

        MoveOutcome {
            prevent_default: cancelable,
            progress: Some(PullProgress::new(distance, self.threshold)),
        }
    }

    /// Release: commit at or past the threshold, otherwise snap back.
    pub fn pointer_up<S: Surface + ?Sized>(&mut self, surface: &mut S) -> ReleaseOutcome {
        if !self.phase.is_pulling() {
            return ReleaseOutcome::Ignored;
        }
        let distance = self.session.take().map_or(0.0, |s| s.distance);

        if distance >= self.threshold {
            let threshold = self.threshold;
            self.set_affordance(surface, threshold, true);
            self.phase.apply(refresh_events::RELEASE_COMMIT);
            tracing::debug!("pull committed at {:.1}px", distance);
            ReleaseOutcome::Committed
        } else {
            self.set_affordance(surface, 0.0, true);
            self.phase.apply(refresh_events::RELEASE_CANCEL);
            tracing::trace!("pull cancelled at {:.1}px", distance);
            ReleaseOutcome::Cancelled
        }
    }

    /// Touch cancelled by the platform: snap back without committing
    pub fn pointer_cancel<S: Surface + ?Sized>(&mut self, surface: &mut S) -> ReleaseOutcome {
        if !self.phase.is_pulling() {
            return ReleaseOutcome::Ignored;
        }
        self.session = None;
        self.set_affordance(surface, 0.0, true);
        self.phase.apply(refresh_events::POINTER_CANCEL);
        ReleaseOutcome::Cancelled
    }

    /// Shared commit path used by programmatic refresh. Returns false if
    /// already refreshing.
    pub fn commit<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if !self.phase.can_send(refresh_events::PROGRAMMATIC_COMMIT) {
            return false;
        }
        self.session = None;
        self.settle_deadline = None;
        let threshold = self.threshold;
        self.set_affordance(surface, threshold, true);
        self.phase.apply(refresh_events::PROGRAMMATIC_COMMIT);
        true
    }

    /// Host set `is-refreshing` without a commit
    pub fn mark_refreshing<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if !self.phase.can_send(refresh_events::HOST_REFRESHING) {
            return;
        }
        if self.session.take().is_some() {
            let threshold = self.threshold;
            self.set_affordance(surface, threshold, true);
        }
        self.settle_deadline = None;
        self.phase.apply(refresh_events::HOST_REFRESHING);
    }

    /// Host cleared `is-refreshing`: collapse the affordance
    pub fn finish_refreshing<S: Surface + ?Sized>(&mut self, surface: &mut S, now_ms: f64) -> bool {
        if !self.phase.apply(refresh_events::REFRESH_DONE) {
            return false;
        }
        self.set_affordance(surface, 0.0, true);
        self.settle_deadline = Some(now_ms + TRANSITION_MS);
        true
    }

    /// Frame tick; finishes the collapse transition
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(deadline) = self.settle_deadline {
            if now_ms >= deadline {
                self.settle_deadline = None;
                self.phase.apply(refresh_events::SETTLED);
            }
        }
    }

    /// Enable or disable the gesture. Disabling mid-pull collapses the
    /// affordance; a committed refresh stays until the host clears it.
    pub fn set_enabled<S: Surface + ?Sized>(&mut self, surface: &mut S, enabled: bool) {
        self.enabled = enabled;
        if !enabled && self.phase.is_pulling() {
            self.session = None;
            self.set_affordance(surface, 0.0, true);
            self.phase.apply(refresh_events::DISABLE);
        }
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn affordance(&self) -> AffordanceStyle {
        self.affordance
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgewatch_platform::Edge;

    #[derive(Default)]
    struct Recorder {
        styles: Vec<AffordanceStyle>,
    }

    impl Surface for Recorder {
        fn place_sentinel(&mut self, _edge: Edge, _offset_px: f32) {}

        fn apply_affordance(&mut self, style: AffordanceStyle) {
            self.styles.push(style);
        }

        fn reflect_attribute(&mut self, _name: &str, _value: Option<&str>) {}
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_damping_formula() {
        assert_eq!(damped_pull_distance(0.0, 60.0), 0.0);
        assert_eq!(damped_pull_distance(-20.0, 60.0), 0.0);
        assert!(approx(damped_pull_distance(100.0, 60.0), 100f32.powf(0.85)));
        assert!(approx(damped_pull_distance(100.0, 60.0), 50.12));
        // Capped at twice the threshold
        assert_eq!(damped_pull_distance(10_000.0, 60.0), 120.0);
        assert_eq!(damped_pull_distance(10_000.0, 20.0), 40.0);
    }

    #[test]
    fn test_phase_transitions() {
        use refresh_events::*;
        let mut phase = RefreshPhase::Idle;
        assert!(phase.apply(POINTER_DOWN));
        assert_eq!(phase, RefreshPhase::Pulling);
        assert!(phase.apply(RELEASE_COMMIT));
        assert_eq!(phase, RefreshPhase::Refreshing);
        // Nothing but the host leaves Refreshing
        assert!(!phase.apply(POINTER_DOWN));
        assert!(!phase.apply(PROGRAMMATIC_COMMIT));
        assert!(!phase.apply(SETTLED));
        assert!(phase.apply(REFRESH_DONE));
        assert_eq!(phase, RefreshPhase::SettlingBack);
        assert!(phase.apply(SETTLED));
        assert_eq!(phase, RefreshPhase::Idle);
    }

    #[test]
    fn test_pull_requires_top_and_enabled() {
        let mut surface = Recorder::default();
        let mut controller = GestureRefreshController::new(60.0, false);
        assert!(!controller.pointer_down(&mut surface, 0.0, 10.0));

        controller.set_enabled(&mut surface, true);
        assert!(!controller.pointer_down(&mut surface, 12.0, 10.0));
        assert!(controller.pointer_down(&mut surface, 0.0, 10.0));
        assert_eq!(controller.phase(), RefreshPhase::Pulling);
        assert!(!controller.affordance().transition_enabled);
    }

    #[test]
    fn test_upward_drag_is_noop() {
        let mut surface = Recorder::default();
        let mut controller = GestureRefreshController::new(60.0, true);
        controller.pointer_down(&mut surface, 0.0, 200.0);
        let applied = surface.styles.len();

        let outcome = controller.pointer_move(&mut surface, 150.0, true);
        assert_eq!(outcome, MoveOutcome::default());
        assert_eq!(surface.styles.len(), applied);
        assert_eq!(controller.affordance().height_px, 0.0);
    }

    #[test]
    fn test_release_below_threshold_snaps_back() {
        let mut surface = Recorder::default();
        let mut controller = GestureRefreshController::new(60.0, true);
        controller.pointer_down(&mut surface, 0.0, 0.0);

        let outcome = controller.pointer_move(&mut surface, 50.0, true);
        assert!(outcome.prevent_default);
        let progress = outcome.progress.unwrap();
        assert!(progress.progress < 1.0);

        assert_eq!(controller.pointer_up(&mut surface), ReleaseOutcome::Cancelled);
        assert_eq!(controller.phase(), RefreshPhase::Idle);
        assert_eq!(controller.affordance(), AffordanceStyle::COLLAPSED);
        assert!(controller.session().is_none());
    }

    #[test]
    fn test_release_at_threshold_commits() {
        let mut surface = Recorder::default();
        let mut controller = GestureRefreshController::new(60.0, true);
        controller.pointer_down(&mut surface, 0.0, 0.0);
        let outcome = controller.pointer_move(&mut surface, 200.0, false);
        assert!(!outcome.prevent_default);

        assert_eq!(controller.pointer_up(&mut surface), ReleaseOutcome::Committed);
        assert_eq!(controller.phase(), RefreshPhase::Refreshing);
        assert_eq!(controller.affordance().height_px, 60.0);
        assert!(controller.affordance().transition_enabled);

        // Spurious second release
        assert_eq!(controller.pointer_up(&mut surface), ReleaseOutcome::Ignored);
    }

    #[test]
    fn test_finish_then_settle() {
        let mut surface = Recorder::default();
        let mut controller = GestureRefreshController::new(60.0, true);
        assert!(controller.commit(&mut surface));
        assert!(!controller.commit(&mut surface));

        assert!(controller.finish_refreshing(&mut surface, 1_000.0));
        assert_eq!(controller.phase(), RefreshPhase::SettlingBack);
        assert_eq!(controller.affordance().height_px, 0.0);

        controller.tick(1_200.0);
        assert_eq!(controller.phase(), RefreshPhase::SettlingBack);
        controller.tick(1_300.0);
        assert_eq!(controller.phase(), RefreshPhase::Idle);
    }

    #[test]
    fn test_disable_mid_pull_collapses() {
        let mut surface = Recorder::default();
        let mut controller = GestureRefreshController::new(60.0, true);
        controller.pointer_down(&mut surface, 0.0, 0.0);
        controller.pointer_move(&mut surface, 40.0, true);

        controller.set_enabled(&mut surface, false);
        assert_eq!(controller.phase(), RefreshPhase::Idle);
        assert_eq!(controller.affordance(), AffordanceStyle::COLLAPSED);
        assert_eq!(controller.pointer_up(&mut surface), ReleaseOutcome::Ignored);
    }

    #[test]
    fn test_disable_keeps_committed_refresh() {
        let mut surface = Recorder::default();
        let mut controller = GestureRefreshController::new(60.0, true);
        controller.commit(&mut surface);
        controller.set_enabled(&mut surface, false);
        assert_eq!(controller.phase(), RefreshPhase::Refreshing);
        assert_eq!(controller.affordance().height_px, 60.0);
    }

    #[test]
    fn test_pointer_cancel_never_commits() {
        let mut surface = Recorder::default();
        let mut controller = GestureRefreshController::new(60.0, true);
        controller.pointer_down(&mut surface, 0.0, 0.0);
        controller.pointer_move(&mut surface, 500.0, true);

        assert_eq!(controller.pointer_cancel(&mut surface), ReleaseOutcome::Cancelled);
        assert_eq!(controller.phase(), RefreshPhase::Idle);
        assert_eq!(controller.affordance().height_px, 0.0);
    }
}
