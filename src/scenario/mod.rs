//! Scenario model, generation, validation, and repair.

pub mod autofix;
pub mod generation;
pub mod types;
pub mod validation;

pub use autofix::{
    auto_fix_scenario, generate_validated_scenario, generate_validated_with_attempts, ScenarioFix,
    ValidatedScenario,
};
pub use generation::{generate_random_scenario, generate_scenario_pool};
pub use types::{
    due_doom_events, Briefing, DefeatCondition, DefeatKind, Difficulty, DoomEvent, DoomEventType,
    Scenario, ScenarioObjective, Theme, TileSet, VictoryCondition, VictoryType,
};
pub use validation::{
    is_scenario_basically_winnable, validate_scenario_winnability, validation_summary, IssueCode,
    ScenarioAnalysis, Severity, ValidationIssue, ValidationResult,
};
