//! Engine settings chosen at construction time.

use serde::{Deserialize, Serialize};

/// Which cells an evolution step evaluates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityMode {
    /// Every evolvable cell, every step.
    #[default]
    All,
    /// Only cells that changed in the previous step, or have a neighbor that did.
    Changed,
}

/// Construction settings, deserializable with every field optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 1 evolves sequentially; more partitions the grid across that many workers.
    pub workers: usize,
    pub activity: ActivityMode,
    /// Mark every cell for redraw before the first step.
    pub draw_first_state: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            activity: ActivityMode::All,
            draw_first_state: true,
        }
    }
}

impl EngineConfig {
    /// Defaults with the given worker count.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }
}
