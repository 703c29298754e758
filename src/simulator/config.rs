//! Simulation configuration.

/// Configuration for a pipeline simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Scenarios generated and played per difficulty.
    pub runs_per_difficulty: u32,

    /// Random seed for reproducibility (None = random).
    pub seed: Option<u64>,

    /// Attempt cap handed to the validated-generation loop.
    pub max_generation_attempts: u32,

    /// Tiles available to the crude exploration loop.
    pub board_tiles: usize,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per-run detail).
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            runs_per_difficulty: 200,
            seed: None,
            max_generation_attempts: 5,
            board_tiles: 36,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Quick config for smoke-testing catalog changes.
    pub fn smoke_test() -> Self {
        Self {
            runs_per_difficulty: 25,
            seed: Some(12345),
            ..Default::default()
        }
    }
}
