//! Edgewatch Harness
//!
//! Headless host and scenario tooling for the edgewatch widgets:
//!
//! - [`SimHost`]: deterministic element tree, scroll positions, observers,
//!   touch listeners and smooth scrolling
//! - [`Harness`]: drives an `InfiniteScrollList` over a `SimHost`
//! - JSON scenarios, a runner, assertion helpers and a machine-readable report

pub mod assert;
pub mod harness;
pub mod report;
pub mod runner;
pub mod runtime;
pub mod scenario;
pub mod sim_host;

pub use assert::{AssertionResult, WidgetSnapshot};
pub use harness::{Harness, DEFAULT_TICK_MS};
pub use report::{ReportStatus, ScenarioReport};
pub use runner::{run_loaded_scenario, run_scenario, RunOutcome};
pub use runtime::RunConfig;
pub use scenario::{Scenario, ScenarioError, ScenarioStep};
pub use sim_host::{AttributeEcho, ContainerKind, DocumentSpec, Role, SimHost, SMOOTH_SCROLL_MS};

/// Install a test-friendly `tracing` subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
