//! Frame timing for scenario runs.

use anyhow::{bail, Result};

/// Configuration for deterministic scenario execution.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// Logical milliseconds between frames.
    pub tick_ms: u64,
    /// Frame budget for a single `tick` or `wait` step.
    pub max_frames_per_step: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            max_frames_per_step: 10_000,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            bail!("tick_ms must be > 0");
        }
        if self.max_frames_per_step == 0 {
            bail!("max_frames_per_step must be > 0");
        }
        Ok(())
    }

    /// Frames needed to cover `wait_ms`, rounded up.
    pub fn wait_frames(&self, wait_ms: u64) -> u32 {
        if wait_ms == 0 {
            return 0;
        }
        let tick = self.tick_ms.max(1);
        let frames = wait_ms.saturating_add(tick.saturating_sub(1)) / tick;
        frames.min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_frames_round_up() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.wait_frames(0), 0);
        assert_eq!(cfg.wait_frames(1), 1);
        assert_eq!(cfg.wait_frames(16), 1);
        assert_eq!(cfg.wait_frames(17), 2);
        assert_eq!(cfg.wait_frames(300), 19);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let cfg = RunConfig {
            tick_ms: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
