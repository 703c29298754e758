//! Simulation report aggregation.

use serde::Serialize;

/// Stats from one generated-and-played scenario.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub difficulty: String,
    pub victory_type: String,
    /// Whether validated generation produced a scenario at all.
    pub generated: bool,
    pub confidence: i32,
    pub attempts: u32,
    /// Whether the accepted scenario needed an auto-fix pass.
    pub repaired: bool,
    /// Whether the exploration loop cleared every item/tile objective
    /// before doom ran out.
    pub objectives_cleared: bool,
    pub rounds_used: u32,
    pub items_collected: u32,
    pub forced_spawns: u32,
}

/// Per-difficulty aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct DifficultyReport {
    pub difficulty: String,
    pub runs: u32,
    pub generation_rate: f64,
    pub avg_confidence: f64,
    pub avg_attempts: f64,
    pub repaired_rate: f64,
    pub completion_rate: f64,
    pub avg_rounds: f64,
    pub forced_spawn_rate: f64,
}

/// Aggregated results across all difficulties.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub total_runs: u32,
    pub per_difficulty: Vec<DifficultyReport>,
    pub runs: Vec<RunStats>,
}

impl SimReport {
    pub fn from_runs(runs: Vec<RunStats>) -> Self {
        let mut per_difficulty = Vec::new();
        for difficulty in ["Normal", "Hard", "Nightmare"] {
            let group: Vec<&RunStats> =
                runs.iter().filter(|r| r.difficulty == difficulty).collect();
            if group.is_empty() {
                continue;
            }
            let n = group.len() as f64;
            let rate = |pred: &dyn Fn(&&RunStats) -> bool| {
                group.iter().filter(|r| pred(r)).count() as f64 / n * 100.0
            };
            per_difficulty.push(DifficultyReport {
                difficulty: difficulty.to_string(),
                runs: group.len() as u32,
                generation_rate: rate(&|r| r.generated),
                avg_confidence: group.iter().map(|r| r.confidence as f64).sum::<f64>() / n,
                avg_attempts: group.iter().map(|r| r.attempts as f64).sum::<f64>() / n,
                repaired_rate: rate(&|r| r.repaired),
                completion_rate: rate(&|r| r.objectives_cleared),
                avg_rounds: group.iter().map(|r| r.rounds_used as f64).sum::<f64>() / n,
                forced_spawn_rate: rate(&|r| r.forced_spawns > 0),
            });
        }
        Self {
            total_runs: runs.len() as u32,
            per_difficulty,
            runs,
        }
    }

    /// Plain-text summary table.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Total runs: {}\n\n", self.total_runs));
        out.push_str(
            "Difficulty  Runs  Gen%   Conf   Att   Fix%   Clear%  Rounds  Forced%\n",
        );
        for report in &self.per_difficulty {
            out.push_str(&format!(
                "{:<11} {:<5} {:<6.1} {:<6.1} {:<5.2} {:<6.1} {:<7.1} {:<7.1} {:<6.1}\n",
                report.difficulty,
                report.runs,
                report.generation_rate,
                report.avg_confidence,
                report.avg_attempts,
                report.repaired_rate,
                report.completion_rate,
                report.avg_rounds,
                report.forced_spawn_rate,
            ));
        }
        out
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
