//! Targeted scenario repair and the bounded generate-validate-repair loop.
//!
//! Repairs are independent and composable; each one patches exactly the
//! shortfall a validator error would name. The input scenario is never
//! mutated — callers get a corrected copy plus a changelog.

use tracing::{debug, info, warn};

use crate::core::balance::{
    ValidationTuning, AUTOFIX_DOOM_SAFETY_MARGIN, AUTOFIX_SURVIVAL_MARGIN,
    DEFAULT_MAX_GENERATION_ATTEMPTS, DOOM_EVENT_BOSS_FRACTION, DOOM_EVENT_MID_FRACTION,
    FALLBACK_BOSS_TYPE,
};
use crate::scenario::types::{DoomEvent, DoomEventType, ObjectiveType, Scenario, VictoryType};
use crate::scenario::validation::{
    estimate_min_rounds, is_scenario_basically_winnable, validate_with_tuning, ValidationResult,
};

/// A repaired scenario plus the list of repairs applied.
#[derive(Debug, Clone)]
pub struct ScenarioFix {
    pub scenario: Scenario,
    pub changes: Vec<String>,
}

/// A scenario that survived validation, with its verdict and the number of
/// generation attempts it took.
#[derive(Debug, Clone)]
pub struct ValidatedScenario {
    pub scenario: Scenario,
    pub validation: ValidationResult,
    pub attempts: u32,
}

/// Repairs a scenario with the default tuning table.
pub fn auto_fix_scenario(scenario: &Scenario) -> ScenarioFix {
    auto_fix_with_tuning(scenario, &ValidationTuning::default())
}

/// Repairs a scenario against an explicit tuning table.
pub fn auto_fix_with_tuning(scenario: &Scenario, tuning: &ValidationTuning) -> ScenarioFix {
    let mut fixed = scenario.clone();
    let mut changes = Vec::new();

    // Survival shortfall: the doom track must outlast the survival target.
    if fixed.victory_type == VictoryType::Survival {
        if let Some(rounds) = fixed.survival_rounds_required() {
            let needed = rounds as i32 + AUTOFIX_SURVIVAL_MARGIN;
            if fixed.start_doom < needed {
                changes.push(format!(
                    "Raised starting doom from {} to {} to outlast the {}-round survival target.",
                    fixed.start_doom, needed, rounds
                ));
                fixed.start_doom = needed;
            }
        }
    }

    // Doom budget shortfall: raise the budget until the effective rounds
    // cover the estimate plus a safety margin.
    let estimate = estimate_min_rounds(&fixed, tuning);
    let efficiency = tuning.efficiency(fixed.difficulty);
    let needed_budget = estimate + AUTOFIX_DOOM_SAFETY_MARGIN;
    // Epsilon keeps float noise from demanding one doom more than the math does.
    let needed_doom = ((needed_budget / efficiency) - 1e-9).ceil() as i32;
    let needed_doom = needed_doom.max(tuning.min_viable_doom);
    if fixed.start_doom < needed_doom {
        changes.push(format!(
            "Raised starting doom from {} to {} to cover {:.1} estimated rounds.",
            fixed.start_doom, needed_doom, estimate
        ));
        fixed.start_doom = needed_doom;
    }

    // Missing boss entrance for assassination/kill-boss objectives.
    if fixed.requires_boss() && !fixed.has_boss_spawn() {
        let boss_type = fixed
            .objectives
            .iter()
            .find(|o| o.objective_type == ObjectiveType::KillBoss)
            .and_then(|o| o.target_id.clone())
            .unwrap_or_else(|| FALLBACK_BOSS_TYPE.to_string());
        let threshold =
            ((fixed.start_doom as f64 * DOOM_EVENT_BOSS_FRACTION).round() as i32).max(1);
        fixed.doom_events.push(DoomEvent {
            threshold,
            event_type: DoomEventType::SpawnBoss,
            target_id: boss_type.clone(),
            amount: 1,
            message: "The architect of this horror shows itself at last.".to_string(),
            triggered: false,
        });
        changes.push(format!(
            "Added a boss entrance ({}) at doom {}.",
            boss_type, threshold
        ));
    }

    // Kill objectives must have enough bodies to kill.
    let kills_needed: u32 = fixed
        .objectives
        .iter()
        .filter(|o| o.objective_type == ObjectiveType::KillEnemy)
        .filter_map(|o| o.target_amount)
        .sum();
    if kills_needed > 0 {
        let capacity: u32 = fixed
            .doom_events
            .iter()
            .filter(|e| e.event_type == DoomEventType::SpawnEnemy)
            .map(|e| e.amount)
            .sum();
        if capacity < kills_needed {
            let shortfall = kills_needed - capacity;
            let mid_threshold =
                ((fixed.start_doom as f64 * DOOM_EVENT_MID_FRACTION).round() as i32).max(1);
            match fixed
                .doom_events
                .iter_mut()
                .filter(|e| e.event_type == DoomEventType::SpawnEnemy)
                .last()
            {
                Some(event) => event.amount += shortfall,
                None => fixed.doom_events.push(DoomEvent {
                    threshold: mid_threshold,
                    event_type: DoomEventType::SpawnEnemy,
                    target_id: "cultist".to_string(),
                    amount: shortfall,
                    message: "Cultists pour in to defend their work.".to_string(),
                    triggered: false,
                }),
            }
            changes.push(format!(
                "Raised enemy spawns by {} to cover {} required kills.",
                shortfall, kills_needed
            ));
        }
    }

    // Appends may have broken the ordering invariant.
    fixed
        .doom_events
        .sort_by(|a, b| b.threshold.cmp(&a.threshold));

    if !changes.is_empty() {
        info!(scenario = %scenario.id, repairs = changes.len(), "auto-fixed scenario");
    }
    ScenarioFix {
        scenario: fixed,
        changes,
    }
}

/// Generates scenarios until one validates, with the default attempt cap
/// and tuning. Returns `None` once attempts are exhausted; callers must
/// fall back to a hand-authored scenario rather than use an unverified one.
pub fn generate_validated_scenario<F>(generator: F) -> Option<ValidatedScenario>
where
    F: FnMut() -> Scenario,
{
    generate_validated_with_attempts(generator, DEFAULT_MAX_GENERATION_ATTEMPTS)
}

/// Same loop with an explicit hard attempt cap. The cap bounds iteration
/// count, not wall-clock time: the loop runs synchronously in the caller.
pub fn generate_validated_with_attempts<F>(
    mut generator: F,
    max_attempts: u32,
) -> Option<ValidatedScenario>
where
    F: FnMut() -> Scenario,
{
    let tuning = ValidationTuning::default();
    for attempt in 1..=max_attempts {
        let scenario = generator();

        // Cheap pre-filter first; the full analysis only runs on plausible
        // candidates or on repaired copies.
        if is_scenario_basically_winnable(&scenario) {
            let validation = validate_with_tuning(&scenario, &tuning);
            if validation.is_winnable {
                return Some(ValidatedScenario {
                    scenario,
                    validation,
                    attempts: attempt,
                });
            }
        }

        let fix = auto_fix_with_tuning(&scenario, &tuning);
        let validation = validate_with_tuning(&fix.scenario, &tuning);
        if validation.is_winnable {
            debug!(attempt, repairs = fix.changes.len(), "accepted repaired scenario");
            return Some(ValidatedScenario {
                scenario: fix.scenario,
                validation,
                attempts: attempt,
            });
        }
        debug!(attempt, "discarded unwinnable scenario");
    }
    warn!(max_attempts, "scenario generation exhausted its attempt budget");
    None
}
