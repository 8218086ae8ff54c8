//! Report output model for scenario runs.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Component, Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Report status for a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// Machine-readable result of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    pub elapsed_frames: u64,
    pub elapsed_ms: f64,
    /// Notifications emitted during the run, by name
    pub events: BTreeMap<String, usize>,
}

impl ScenarioReport {
    pub fn passed(elapsed_frames: u64, elapsed_ms: f64, events: BTreeMap<String, usize>) -> Self {
        Self {
            status: ReportStatus::Passed,
            failed_step_index: None,
            assertion: None,
            message: None,
            elapsed_frames,
            elapsed_ms,
            events,
        }
    }

    pub fn failed(
        assertion: &str,
        failed_step_index: usize,
        message: String,
        elapsed_frames: u64,
        elapsed_ms: f64,
        events: BTreeMap<String, usize>,
    ) -> Self {
        Self {
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            assertion: Some(assertion.to_string()),
            message: Some(message),
            elapsed_frames,
            elapsed_ms,
            events,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == ReportStatus::Passed
    }

    /// Pretty JSON, newline terminated
    pub fn to_json(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(self).context("Failed to serialise scenario report")?;
        json.push('\n');
        Ok(json)
    }

    /// Write the report below the working directory, creating parent
    /// directories. Paths that leave the working directory are refused.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        ensure!(
            stays_below_cwd(path),
            "report path {} leaves the working directory",
            path.display()
        );
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.to_json()?.as_bytes())?;
        Ok(())
    }
}

/// Only plain and `.` components: no root, drive prefix or `..`
fn stays_below_cwd(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
