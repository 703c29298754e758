//! Winnability analysis for generated scenarios.
//!
//! Deterministic and side-effect-free: a scenario goes in, a
//! [`ValidationResult`] comes out. Nothing here rolls dice or mutates the
//! scenario. Errors mean the scenario cannot be won as generated; warnings
//! only cost confidence.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::balance::ValidationTuning;
use crate::scenario::types::{
    DoomEventType, ObjectiveType, Scenario, VictoryType,
};

/// How bad an issue is. Any error forces `is_winnable = false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Machine-readable issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    NoVictoryConditions,
    InvalidVictoryObjectiveRef,
    InvalidRevealReference,
    UnrevealedRequiredObjective,
    DoomTooLow,
    DoomTight,
    SurvivalDoomMismatch,
    HighEnemyPressure,
    MissingBossSpawn,
    InsufficientEnemySpawns,
}

/// One finding from the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
}

/// Derived metrics, exposed for diagnostics and the UI layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub estimated_min_rounds: f64,
    pub effective_doom_budget: f64,
    pub total_enemies_from_events: u32,
    pub has_boss_spawn: bool,
    pub required_kills: u32,
    pub survival_rounds_required: u32,
}

/// The validator's verdict on a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_winnable: bool,
    /// 0-100. Errors and warnings each take a fixed bite.
    pub confidence: i32,
    pub issues: Vec<ValidationIssue>,
    pub analysis: ScenarioAnalysis,
}

impl ValidationResult {
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

/// Validates a scenario with the default tuning table.
pub fn validate_scenario_winnability(scenario: &Scenario) -> ValidationResult {
    validate_with_tuning(scenario, &ValidationTuning::default())
}

/// Validates a scenario against an explicit tuning table.
pub fn validate_with_tuning(scenario: &Scenario, tuning: &ValidationTuning) -> ValidationResult {
    let mut issues: Vec<ValidationIssue> = Vec::new();

    check_victory_path(scenario, &mut issues);
    check_objective_chains(scenario, &mut issues);

    let estimated_min_rounds = estimate_min_rounds(scenario, tuning);
    let effective_doom_budget = scenario.start_doom as f64 * tuning.efficiency(scenario.difficulty);
    if scenario.start_doom < tuning.min_viable_doom {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            code: IssueCode::DoomTooLow,
            message: format!(
                "Starting doom {} is below the minimum viable budget of {}.",
                scenario.start_doom, tuning.min_viable_doom
            ),
        });
    } else {
        check_doom_budget(estimated_min_rounds, effective_doom_budget, tuning, &mut issues);
    }

    let survival_rounds_required = scenario.survival_rounds_required().unwrap_or(0);
    check_survival(scenario, survival_rounds_required, tuning, &mut issues);
    check_enemy_spawns(scenario, &mut issues);

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count() as i32;
    let warnings = issues.len() as i32 - errors;
    let confidence =
        (100 - errors * tuning.error_penalty - warnings * tuning.warning_penalty).clamp(0, 100);
    let is_winnable = errors == 0;

    let analysis = ScenarioAnalysis {
        estimated_min_rounds,
        effective_doom_budget,
        total_enemies_from_events: total_spawn_amount(scenario),
        has_boss_spawn: scenario.has_boss_spawn(),
        required_kills: required_kills(scenario),
        survival_rounds_required,
    };

    debug!(
        scenario = %scenario.id,
        is_winnable,
        confidence,
        issues = issues.len(),
        "validated scenario"
    );

    ValidationResult {
        is_winnable,
        confidence,
        issues,
        analysis,
    }
}

/// Cheap pre-filter used by the validated-generation loop before paying
/// for the full analysis.
pub fn is_scenario_basically_winnable(scenario: &Scenario) -> bool {
    let tuning = ValidationTuning::default();
    if scenario.victory_conditions.is_empty() {
        return false;
    }
    if scenario.start_doom < tuning.min_viable_doom {
        return false;
    }
    if scenario.victory_type == VictoryType::Survival {
        if let Some(rounds) = scenario.survival_rounds_required() {
            if rounds as i32 >= scenario.start_doom {
                return false;
            }
        }
    }
    if scenario.requires_boss() && !scenario.has_boss_spawn() {
        return false;
    }
    true
}

/// Human-readable one-liner for a validation result.
pub fn validation_summary(result: &ValidationResult) -> String {
    use crate::core::balance::{CONFIDENCE_CHALLENGING, CONFIDENCE_COMFORTABLE};
    if !result.is_winnable || result.confidence < CONFIDENCE_CHALLENGING {
        format!(
            "Scenario is NOT winnable as generated: {} blocking issue(s).",
            result.error_count()
        )
    } else if result.confidence >= CONFIDENCE_COMFORTABLE {
        format!(
            "Scenario validated: winnable with a comfortable margin ({}% confidence).",
            result.confidence
        )
    } else {
        format!(
            "Scenario validated: winnable but challenging ({}% confidence).",
            result.confidence
        )
    }
}

fn check_victory_path(scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
    if scenario.victory_conditions.is_empty() {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            code: IssueCode::NoVictoryConditions,
            message: "Scenario has no victory conditions; it cannot be won.".to_string(),
        });
        return;
    }
    for condition in &scenario.victory_conditions {
        for id in &condition.required_objectives {
            if scenario.objective(id).is_none() {
                issues.push(ValidationIssue {
                    severity: Severity::Error,
                    code: IssueCode::InvalidVictoryObjectiveRef,
                    message: format!(
                        "Victory condition references missing objective '{}'.",
                        id
                    ),
                });
            }
        }
    }
}

fn check_objective_chains(scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
    for objective in &scenario.objectives {
        if !objective.is_hidden {
            continue;
        }
        match &objective.revealed_by {
            Some(parent) => {
                if scenario.objective(parent).is_none() {
                    issues.push(ValidationIssue {
                        severity: Severity::Error,
                        code: IssueCode::InvalidRevealReference,
                        message: format!(
                            "Objective '{}' is revealed by missing objective '{}'.",
                            objective.id, parent
                        ),
                    });
                }
            }
            None => {
                if !objective.is_optional {
                    issues.push(ValidationIssue {
                        severity: Severity::Error,
                        code: IssueCode::UnrevealedRequiredObjective,
                        message: format!(
                            "Required objective '{}' is hidden with no reveal trigger.",
                            objective.id
                        ),
                    });
                }
            }
        }
    }
}

pub(crate) fn estimate_min_rounds(scenario: &Scenario, tuning: &ValidationTuning) -> f64 {
    scenario
        .required_objectives()
        .map(|o| {
            let cost = tuning.round_cost(o.objective_type);
            cost.base + cost.per_unit * o.units() as f64
        })
        .sum()
}

fn check_doom_budget(
    estimated_min_rounds: f64,
    effective_doom_budget: f64,
    tuning: &ValidationTuning,
    issues: &mut Vec<ValidationIssue>,
) {
    let margin = effective_doom_budget - estimated_min_rounds;
    if margin < 0.0 {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            code: IssueCode::DoomTooLow,
            message: format!(
                "Doom budget {:.1} cannot cover the estimated {:.1} rounds of required work.",
                effective_doom_budget, estimated_min_rounds
            ),
        });
    } else if margin < tuning.tight_margin {
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            code: IssueCode::DoomTight,
            message: format!(
                "Doom budget {:.1} leaves only {:.1} rounds of slack.",
                effective_doom_budget, margin
            ),
        });
    }
}

fn check_survival(
    scenario: &Scenario,
    survival_rounds: u32,
    tuning: &ValidationTuning,
    issues: &mut Vec<ValidationIssue>,
) {
    if scenario.victory_type != VictoryType::Survival || survival_rounds == 0 {
        return;
    }
    if survival_rounds as i32 >= scenario.start_doom {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            code: IssueCode::SurvivalDoomMismatch,
            message: format!(
                "Doom reaches zero after {} rounds but survival requires {}.",
                scenario.start_doom, survival_rounds
            ),
        });
        return;
    }
    // Enemy pressure inside the survival window: events whose thresholds
    // fall between the start and the survival target.
    let window_floor = scenario.start_doom - survival_rounds as i32;
    let pressure: u32 = scenario
        .doom_events
        .iter()
        .filter(|e| e.threshold >= window_floor)
        .filter(|e| {
            matches!(
                e.event_type,
                DoomEventType::SpawnEnemy | DoomEventType::SpawnBoss
            )
        })
        .map(|e| e.amount)
        .sum();
    if pressure > tuning.survival_pressure_tolerance {
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            code: IssueCode::HighEnemyPressure,
            message: format!(
                "{} enemies spawn inside the {}-round survival window.",
                pressure, survival_rounds
            ),
        });
    }
}

fn check_enemy_spawns(scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
    if scenario.requires_boss() && !scenario.has_boss_spawn() {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            code: IssueCode::MissingBossSpawn,
            message: "A boss must die for victory, but no doom event ever spawns one."
                .to_string(),
        });
    }

    let kills_needed = required_kills(scenario);
    if kills_needed > 0 {
        let capacity = enemy_spawn_capacity(scenario);
        if capacity < kills_needed {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                code: IssueCode::InsufficientEnemySpawns,
                message: format!(
                    "Kill objectives need {} enemies but doom events only spawn {}.",
                    kills_needed, capacity
                ),
            });
        }
    }
}

fn required_kills(scenario: &Scenario) -> u32 {
    scenario
        .objectives
        .iter()
        .filter(|o| o.objective_type == ObjectiveType::KillEnemy)
        .filter_map(|o| o.target_amount)
        .sum()
}

fn enemy_spawn_capacity(scenario: &Scenario) -> u32 {
    scenario
        .doom_events
        .iter()
        .filter(|e| e.event_type == DoomEventType::SpawnEnemy)
        .map(|e| e.amount)
        .sum()
}

fn total_spawn_amount(scenario: &Scenario) -> u32 {
    scenario
        .doom_events
        .iter()
        .filter(|e| {
            matches!(
                e.event_type,
                DoomEventType::SpawnEnemy | DoomEventType::SpawnBoss
            )
        })
        .map(|e| e.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::types::{
        Briefing, DefeatCondition, DefeatKind, Difficulty, DoomEvent, ScenarioObjective, Theme,
        TileSet, VictoryCondition,
    };

    fn objective(id: &str, objective_type: ObjectiveType) -> ScenarioObjective {
        ScenarioObjective {
            id: id.to_string(),
            description: format!("Objective {}", id),
            short_description: id.to_string(),
            objective_type,
            target_id: None,
            target_amount: None,
            current_amount: 0,
            is_optional: false,
            is_hidden: false,
            revealed_by: None,
            completed: false,
        }
    }

    fn spawn_event(threshold: i32, amount: u32) -> DoomEvent {
        DoomEvent {
            threshold,
            event_type: DoomEventType::SpawnEnemy,
            target_id: "ghoul".to_string(),
            amount,
            message: "Ghouls claw their way in.".to_string(),
            triggered: false,
        }
    }

    fn base_scenario() -> Scenario {
        let find = objective("obj-1", ObjectiveType::FindItem);
        Scenario {
            id: "test-scenario".to_string(),
            title: "Shadows over Ashfield".to_string(),
            briefing: Briefing {
                description: "The letters stopped coming.".to_string(),
                goal: "Find the key and get out.".to_string(),
                doom_prophecy: "The dark keeps its own ledger.".to_string(),
            },
            difficulty: Difficulty::Normal,
            theme: Theme::Mansion,
            tile_set: TileSet::Indoor,
            start_location: "Blackwood Manor".to_string(),
            victory_type: VictoryType::Escape,
            start_doom: 10,
            doom_on_death: 2,
            doom_on_survivor_rescue: 2,
            objectives: vec![find],
            victory_conditions: vec![VictoryCondition {
                condition_type: VictoryType::Escape,
                description: "Escape".to_string(),
                required_objectives: vec!["obj-1".to_string()],
            }],
            defeat_conditions: vec![DefeatCondition {
                kind: DefeatKind::DoomExhausted,
                description: "The doom track reaches zero.".to_string(),
                linked_objectives: Vec::new(),
            }],
            doom_events: vec![spawn_event(7, 2), spawn_event(4, 2)],
        }
    }

    #[test]
    fn test_healthy_scenario_is_winnable() {
        let result = validate_scenario_winnability(&base_scenario());
        assert!(result.is_winnable);
        assert!(result.issues.is_empty());
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn test_no_victory_conditions_is_fatal() {
        let mut scenario = base_scenario();
        scenario.victory_conditions.clear();
        let result = validate_scenario_winnability(&scenario);
        assert!(!result.is_winnable);
        assert!(result.has_issue(IssueCode::NoVictoryConditions));
    }

    #[test]
    fn test_dangling_victory_ref_is_fatal() {
        let mut scenario = base_scenario();
        scenario.victory_conditions[0]
            .required_objectives
            .push("obj-99".to_string());
        let result = validate_scenario_winnability(&scenario);
        assert!(!result.is_winnable);
        assert!(result.has_issue(IssueCode::InvalidVictoryObjectiveRef));
    }

    #[test]
    fn test_invalid_reveal_reference_is_fatal() {
        let mut scenario = base_scenario();
        scenario.objectives[0].is_hidden = true;
        scenario.objectives[0].revealed_by = Some("obj-404".to_string());
        let result = validate_scenario_winnability(&scenario);
        assert!(!result.is_winnable);
        assert!(result.has_issue(IssueCode::InvalidRevealReference));
    }

    #[test]
    fn test_unrevealed_required_objective_is_fatal() {
        let mut scenario = base_scenario();
        scenario.objectives[0].is_hidden = true;
        scenario.objectives[0].revealed_by = None;
        let result = validate_scenario_winnability(&scenario);
        assert!(!result.is_winnable);
        assert!(result.has_issue(IssueCode::UnrevealedRequiredObjective));

        // Optional hidden objectives without a trigger are tolerated.
        scenario.objectives[0].is_optional = true;
        scenario.victory_conditions[0].required_objectives.clear();
        let result = validate_scenario_winnability(&scenario);
        assert!(!result.has_issue(IssueCode::UnrevealedRequiredObjective));
    }

    #[test]
    fn test_start_doom_two_is_never_winnable() {
        let mut scenario = base_scenario();
        scenario.start_doom = 2;
        let result = validate_scenario_winnability(&scenario);
        assert!(!result.is_winnable);
        assert!(result.has_issue(IssueCode::DoomTooLow));
        assert!(!is_scenario_basically_winnable(&scenario));
    }

    #[test]
    fn test_doom_tight_is_a_warning_not_an_error() {
        let mut scenario = base_scenario();
        // FindItem costs 2 rounds; doom 3 leaves a one-round margin.
        scenario.start_doom = 3;
        let result = validate_scenario_winnability(&scenario);
        assert!(result.is_winnable);
        assert!(result.has_issue(IssueCode::DoomTight));
        assert!(result.confidence < 100);
    }

    #[test]
    fn test_survival_doom_mismatch() {
        let mut scenario = base_scenario();
        scenario.victory_type = VictoryType::Survival;
        let mut survive = objective("obj-2", ObjectiveType::Survive);
        survive.target_amount = Some(15);
        scenario.objectives = vec![survive];
        scenario.victory_conditions[0].required_objectives = vec!["obj-2".to_string()];
        scenario.start_doom = 10;

        let result = validate_scenario_winnability(&scenario);
        assert!(!result.is_winnable);
        assert!(result.has_issue(IssueCode::SurvivalDoomMismatch));

        // Doom 12 against an 8-round target clears the mismatch.
        scenario.start_doom = 12;
        scenario.objectives[0].target_amount = Some(8);
        let result = validate_scenario_winnability(&scenario);
        assert!(!result.has_issue(IssueCode::SurvivalDoomMismatch));
        assert_eq!(result.analysis.survival_rounds_required, 8);
    }

    #[test]
    fn test_high_enemy_pressure_is_nonfatal() {
        let mut scenario = base_scenario();
        scenario.victory_type = VictoryType::Survival;
        let mut survive = objective("obj-2", ObjectiveType::Survive);
        survive.target_amount = Some(8);
        scenario.objectives = vec![survive];
        scenario.victory_conditions[0].required_objectives = vec!["obj-2".to_string()];
        scenario.start_doom = 12;
        scenario.doom_events = vec![spawn_event(11, 6), spawn_event(8, 6)];

        let result = validate_scenario_winnability(&scenario);
        assert!(result.is_winnable);
        assert!(result.has_issue(IssueCode::HighEnemyPressure));
    }

    #[test]
    fn test_missing_boss_spawn_is_fatal_until_added() {
        let mut scenario = base_scenario();
        scenario.victory_type = VictoryType::Assassination;
        let mut kill = objective("obj-2", ObjectiveType::KillBoss);
        kill.target_id = Some("high_priest".to_string());
        scenario.objectives.push(kill);
        scenario.victory_conditions[0].required_objectives = vec!["obj-2".to_string()];

        let result = validate_scenario_winnability(&scenario);
        assert!(!result.is_winnable);
        assert!(result.has_issue(IssueCode::MissingBossSpawn));
        assert!(!is_scenario_basically_winnable(&scenario));

        scenario.doom_events.push(DoomEvent {
            threshold: 2,
            event_type: DoomEventType::SpawnBoss,
            target_id: "high_priest".to_string(),
            amount: 1,
            message: "It arrives.".to_string(),
            triggered: false,
        });
        let result = validate_scenario_winnability(&scenario);
        assert!(!result.has_issue(IssueCode::MissingBossSpawn));
        assert!(result.analysis.has_boss_spawn);
    }

    #[test]
    fn test_insufficient_enemy_spawns() {
        let mut scenario = base_scenario();
        let mut purge = objective("obj-2", ObjectiveType::KillEnemy);
        purge.target_amount = Some(10);
        scenario.objectives.push(purge);
        scenario.doom_events = vec![spawn_event(7, 3)];
        scenario.start_doom = 20;

        let result = validate_scenario_winnability(&scenario);
        assert!(!result.is_winnable);
        assert!(result.has_issue(IssueCode::InsufficientEnemySpawns));
        assert_eq!(result.analysis.required_kills, 10);

        scenario.doom_events = vec![spawn_event(7, 5), spawn_event(4, 5)];
        let result = validate_scenario_winnability(&scenario);
        assert!(!result.has_issue(IssueCode::InsufficientEnemySpawns));
        assert_eq!(result.analysis.total_enemies_from_events, 10);
    }

    #[test]
    fn test_basic_winnability_prefilter_branches() {
        let scenario = base_scenario();
        assert!(is_scenario_basically_winnable(&scenario));

        let mut no_victory = scenario.clone();
        no_victory.victory_conditions.clear();
        assert!(!is_scenario_basically_winnable(&no_victory));

        let mut doomed = scenario.clone();
        doomed.start_doom = 2;
        assert!(!is_scenario_basically_winnable(&doomed));

        let mut survival = scenario.clone();
        survival.victory_type = VictoryType::Survival;
        let mut survive = objective("obj-2", ObjectiveType::Survive);
        survive.target_amount = Some(12);
        survival.objectives.push(survive);
        survival.start_doom = 10;
        assert!(!is_scenario_basically_winnable(&survival));
        survival.start_doom = 13;
        assert!(is_scenario_basically_winnable(&survival));
    }

    #[test]
    fn test_summary_bands() {
        let result = validate_scenario_winnability(&base_scenario());
        assert!(validation_summary(&result).contains("comfortable"));

        let mut tight = base_scenario();
        tight.start_doom = 3;
        let result = validate_scenario_winnability(&tight);
        assert!(validation_summary(&result).contains("challenging"));

        let mut broken = base_scenario();
        broken.victory_conditions.clear();
        let result = validate_scenario_winnability(&broken);
        assert!(validation_summary(&result).contains("NOT winnable"));
        assert!(validation_summary(&result).contains('1'));
    }
}
