//! Shared balance constants for the mission pipeline.
//!
//! All tunable numbers live here. The validator and the spawn runtime read
//! them through [`ValidationTuning`] and [`SpawnTuning`] so balance changes
//! never touch algorithm code.

#![allow(dead_code)]

use crate::board::types::TileCategory;
use crate::scenario::types::{Difficulty, ObjectiveType};
use crate::spawns::types::QuestItemType;

// =============================================================================
// DOOM BUDGET - How difficulty converts doom into usable rounds
// =============================================================================

/// Fraction of the doom budget that converts into useful progress on Normal.
pub const DOOM_EFFICIENCY_NORMAL: f64 = 1.0;

/// Hard: tougher checks and stronger enemies cost more time per objective.
pub const DOOM_EFFICIENCY_HARD: f64 = 0.85;

/// Nightmare: the least forgiving conversion rate.
pub const DOOM_EFFICIENCY_NIGHTMARE: f64 = 0.7;

/// Margin (in rounds) under which a feasible doom budget is still flagged tight.
pub const DOOM_TIGHT_MARGIN: f64 = 2.0;

/// Scenarios below this doom budget are rejected outright by the pre-filter.
pub const MIN_VIABLE_DOOM: i32 = 3;

/// Doom lost when an investigator dies, per difficulty.
pub const DOOM_ON_DEATH_NORMAL: i32 = 2;
pub const DOOM_ON_DEATH_HARD: i32 = 3;
pub const DOOM_ON_DEATH_NIGHTMARE: i32 = 4;

/// Doom restored when a survivor is rescued, per difficulty.
pub const DOOM_ON_RESCUE_NORMAL: i32 = 2;
pub const DOOM_ON_RESCUE_HARD: i32 = 1;
pub const DOOM_ON_RESCUE_NIGHTMARE: i32 = 1;

/// Total enemy spawns tolerated inside a survival window before the
/// validator flags the scenario as high pressure.
pub const SURVIVAL_PRESSURE_TOLERANCE: u32 = 8;

// =============================================================================
// ROUND COST MODEL - Estimated rounds to clear each objective type
// =============================================================================

/// Cost of an objective in rounds: `base + per_unit * target_amount`.
#[derive(Debug, Clone, Copy)]
pub struct RoundCost {
    pub base: f64,
    pub per_unit: f64,
}

pub const COST_FIND_ITEM: RoundCost = RoundCost { base: 2.0, per_unit: 0.0 };
pub const COST_COLLECT: RoundCost = RoundCost { base: 1.0, per_unit: 1.5 };
pub const COST_FIND_TILE: RoundCost = RoundCost { base: 2.0, per_unit: 0.0 };
pub const COST_ESCAPE: RoundCost = RoundCost { base: 2.0, per_unit: 0.0 };
pub const COST_KILL_ENEMY: RoundCost = RoundCost { base: 1.0, per_unit: 1.0 };
pub const COST_KILL_BOSS: RoundCost = RoundCost { base: 3.0, per_unit: 0.0 };
pub const COST_SURVIVE: RoundCost = RoundCost { base: 0.0, per_unit: 1.0 };
pub const COST_EXPLORE: RoundCost = RoundCost { base: 1.0, per_unit: 0.5 };
pub const COST_INTERACT: RoundCost = RoundCost { base: 1.0, per_unit: 0.0 };
pub const COST_RITUAL: RoundCost = RoundCost { base: 2.0, per_unit: 1.0 };
pub const COST_PROTECT: RoundCost = RoundCost { base: 1.0, per_unit: 0.0 };
pub const COST_ESCORT: RoundCost = RoundCost { base: 3.0, per_unit: 0.0 };

// =============================================================================
// CONFIDENCE SCORE
// =============================================================================

/// Confidence penalty per error-severity issue.
pub const CONFIDENCE_ERROR_PENALTY: i32 = 30;

/// Confidence penalty per warning-severity issue.
pub const CONFIDENCE_WARNING_PENALTY: i32 = 15;

/// Confidence at or above this reads as comfortably winnable.
pub const CONFIDENCE_COMFORTABLE: i32 = 90;

/// Confidence at or above this (but below comfortable) reads as challenging.
pub const CONFIDENCE_CHALLENGING: i32 = 60;

// =============================================================================
// GENERATION
// =============================================================================

/// Attempt cap for the validated-generation retry loop.
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 5;

/// Safety margin (rounds) added on top of a repaired doom budget.
pub const AUTOFIX_DOOM_SAFETY_MARGIN: f64 = 2.0;

/// Extra doom granted beyond the survival target when repairing a mismatch.
pub const AUTOFIX_SURVIVAL_MARGIN: i32 = 3;

/// Chance of attaching one bonus objective, per difficulty.
pub const BONUS_OBJECTIVE_CHANCE_NORMAL: f64 = 0.5;
pub const BONUS_OBJECTIVE_CHANCE_HARD: f64 = 0.6;
pub const BONUS_OBJECTIVE_CHANCE_NIGHTMARE: f64 = 0.7;

/// Doom event thresholds as fractions of the starting doom budget.
pub const DOOM_EVENT_OMEN_FRACTION: f64 = 0.9;
pub const DOOM_EVENT_EARLY_FRACTION: f64 = 0.75;
pub const DOOM_EVENT_MID_FRACTION: f64 = 0.5;
pub const DOOM_EVENT_LATE_FRACTION: f64 = 0.25;
pub const DOOM_EVENT_BOSS_FRACTION: f64 = 0.15;

/// Boss type used when a confrontation has no resolvable boss.
pub const FALLBACK_BOSS_TYPE: &str = "ancient_horror";

// =============================================================================
// QUEST ITEM SPAWN MODEL
// =============================================================================

/// Rough number of searchable tiles a party explores in one scenario.
/// Drives the early/normal/behind-schedule tier selection.
pub const EXPECTED_TILES_PER_SCENARIO: u32 = 30;

/// Tiles explored below this fraction of the expected count count as early game.
pub const SPAWN_EARLY_GAME_FRACTION: f64 = 0.25;

/// Past this fraction with required items still unspawned, the party is
/// behind schedule and the base chance jumps.
pub const SPAWN_BEHIND_SCHEDULE_FRACTION: f64 = 0.6;

pub const SPAWN_BASE_CHANCE_EARLY: f64 = 0.15;
pub const SPAWN_BASE_CHANCE_NORMAL: f64 = 0.30;
pub const SPAWN_BASE_CHANCE_BEHIND: f64 = 0.50;

/// Hard ceiling on any rolled spawn chance.
pub const SPAWN_MAX_CHANCE: f64 = 0.9;

/// Missions requiring at least this many pickups count as collection missions.
pub const COLLECTION_MISSION_THRESHOLD: u32 = 5;

/// Base-chance boost applied on collection missions.
pub const COLLECTION_CHANCE_BONUS: f64 = 0.15;

/// Consecutive eligible misses before a spawn is forced, per difficulty.
pub const PITY_THRESHOLD_NORMAL: u32 = 4;
pub const PITY_THRESHOLD_HARD: u32 = 5;
pub const PITY_THRESHOLD_NIGHTMARE: u32 = 6;

/// Shortened pity window on collection missions.
pub const PITY_THRESHOLD_COLLECTION: u32 = 3;

/// Pity thresholds are clamped to this range whatever the adjustments say.
pub const PITY_THRESHOLD_MIN: u32 = 2;
pub const PITY_THRESHOLD_MAX: u32 = 10;

/// Room-name keywords that attract quest item spawns (free-text display
/// names, so substring matching is the right tool here).
pub const ROOM_NAME_SPAWN_BONUS: [(&str, f64); 9] = [
    ("ritual", 0.25),
    ("altar", 0.25),
    ("study", 0.20),
    ("library", 0.20),
    ("cellar", 0.15),
    ("crypt", 0.15),
    ("laborator", 0.15),
    ("chapel", 0.10),
    ("attic", 0.10),
];

// =============================================================================
// GUARANTEED SPAWN ESCALATION
// =============================================================================

/// Doom at or below this fraction of the start budget forces every
/// remaining required item out immediately.
pub const GUARANTEED_CRITICAL_FRACTION: f64 = 0.2;

/// Absolute floor for the critical doom line.
pub const GUARANTEED_CRITICAL_FLOOR: i32 = 3;

/// Doom fraction for the warning line (above critical).
pub const GUARANTEED_WARNING_FRACTION: f64 = 0.4;

/// Absolute floor for the warning doom line.
pub const GUARANTEED_WARNING_FLOOR: i32 = 5;

/// Exploration ratio that must also hold before the warning line forces a spawn.
pub const GUARANTEED_WARNING_EXPLORATION_RATIO: f64 = 0.6;

// =============================================================================
// INJECTABLE TABLES
// =============================================================================

/// Tunables consumed by the winnability validator and the auto-fixer.
#[derive(Debug, Clone)]
pub struct ValidationTuning {
    pub efficiency_normal: f64,
    pub efficiency_hard: f64,
    pub efficiency_nightmare: f64,
    pub tight_margin: f64,
    pub min_viable_doom: i32,
    pub survival_pressure_tolerance: u32,
    pub error_penalty: i32,
    pub warning_penalty: i32,
}

impl Default for ValidationTuning {
    fn default() -> Self {
        Self {
            efficiency_normal: DOOM_EFFICIENCY_NORMAL,
            efficiency_hard: DOOM_EFFICIENCY_HARD,
            efficiency_nightmare: DOOM_EFFICIENCY_NIGHTMARE,
            tight_margin: DOOM_TIGHT_MARGIN,
            min_viable_doom: MIN_VIABLE_DOOM,
            survival_pressure_tolerance: SURVIVAL_PRESSURE_TOLERANCE,
            error_penalty: CONFIDENCE_ERROR_PENALTY,
            warning_penalty: CONFIDENCE_WARNING_PENALTY,
        }
    }
}

impl ValidationTuning {
    /// Doom-to-progress conversion factor for a difficulty.
    pub fn efficiency(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Normal => self.efficiency_normal,
            Difficulty::Hard => self.efficiency_hard,
            Difficulty::Nightmare => self.efficiency_nightmare,
        }
    }

    /// Round-cost entry for an objective type.
    pub fn round_cost(&self, objective_type: ObjectiveType) -> RoundCost {
        match objective_type {
            ObjectiveType::FindItem => COST_FIND_ITEM,
            ObjectiveType::Collect => COST_COLLECT,
            ObjectiveType::FindTile => COST_FIND_TILE,
            ObjectiveType::Escape => COST_ESCAPE,
            ObjectiveType::KillEnemy => COST_KILL_ENEMY,
            ObjectiveType::KillBoss => COST_KILL_BOSS,
            ObjectiveType::Survive => COST_SURVIVE,
            ObjectiveType::Explore => COST_EXPLORE,
            ObjectiveType::Interact => COST_INTERACT,
            ObjectiveType::Ritual => COST_RITUAL,
            ObjectiveType::Protect => COST_PROTECT,
            ObjectiveType::Escort => COST_ESCORT,
        }
    }
}

/// Tunables consumed by the objective spawn runtime.
#[derive(Debug, Clone)]
pub struct SpawnTuning {
    pub expected_tiles: u32,
    pub early_game_fraction: f64,
    pub behind_schedule_fraction: f64,
    pub base_chance_early: f64,
    pub base_chance_normal: f64,
    pub base_chance_behind: f64,
    pub max_chance: f64,
    pub collection_threshold: u32,
    pub collection_chance_bonus: f64,
    pub pity_normal: u32,
    pub pity_hard: u32,
    pub pity_nightmare: u32,
    pub pity_collection: u32,
    pub critical_doom_fraction: f64,
    pub critical_doom_floor: i32,
    pub warning_doom_fraction: f64,
    pub warning_doom_floor: i32,
    pub warning_exploration_ratio: f64,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            expected_tiles: EXPECTED_TILES_PER_SCENARIO,
            early_game_fraction: SPAWN_EARLY_GAME_FRACTION,
            behind_schedule_fraction: SPAWN_BEHIND_SCHEDULE_FRACTION,
            base_chance_early: SPAWN_BASE_CHANCE_EARLY,
            base_chance_normal: SPAWN_BASE_CHANCE_NORMAL,
            base_chance_behind: SPAWN_BASE_CHANCE_BEHIND,
            max_chance: SPAWN_MAX_CHANCE,
            collection_threshold: COLLECTION_MISSION_THRESHOLD,
            collection_chance_bonus: COLLECTION_CHANCE_BONUS,
            pity_normal: PITY_THRESHOLD_NORMAL,
            pity_hard: PITY_THRESHOLD_HARD,
            pity_nightmare: PITY_THRESHOLD_NIGHTMARE,
            pity_collection: PITY_THRESHOLD_COLLECTION,
            critical_doom_fraction: GUARANTEED_CRITICAL_FRACTION,
            critical_doom_floor: GUARANTEED_CRITICAL_FLOOR,
            warning_doom_fraction: GUARANTEED_WARNING_FRACTION,
            warning_doom_floor: GUARANTEED_WARNING_FLOOR,
            warning_exploration_ratio: GUARANTEED_WARNING_EXPLORATION_RATIO,
        }
    }
}

impl SpawnTuning {
    /// Pity threshold for a scenario, clamped to the allowed window.
    pub fn pity_threshold(&self, difficulty: Difficulty, is_collection_mission: bool) -> u32 {
        let base = if is_collection_mission {
            self.pity_collection
        } else {
            match difficulty {
                Difficulty::Normal => self.pity_normal,
                Difficulty::Hard => self.pity_hard,
                Difficulty::Nightmare => self.pity_nightmare,
            }
        };
        base.clamp(PITY_THRESHOLD_MIN, PITY_THRESHOLD_MAX)
    }

    /// Doom value at or below which escalation goes critical.
    pub fn critical_doom(&self, start_doom: i32) -> i32 {
        ((start_doom as f64 * self.critical_doom_fraction).round() as i32)
            .max(self.critical_doom_floor)
    }

    /// Doom value at or below which escalation warns.
    pub fn warning_doom(&self, start_doom: i32) -> i32 {
        ((start_doom as f64 * self.warning_doom_fraction).round() as i32)
            .max(self.warning_doom_floor)
    }
}

/// Spawn-chance bonus for a free-text room name.
pub fn room_name_spawn_bonus(room_name: &str) -> f64 {
    let lower = room_name.to_lowercase();
    ROOM_NAME_SPAWN_BONUS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, bonus)| *bonus)
        .fold(0.0, f64::max)
}

/// Affinity between a quest item type and a tile category.
///
/// Keys are enumerated categories; the default arm keeps the function total.
pub fn item_tile_affinity(item_type: QuestItemType, category: TileCategory) -> f64 {
    use QuestItemType::*;
    use TileCategory::*;
    match (item_type, category) {
        (Key, Study) | (Key, Bedroom) | (Key, Foyer) => 0.20,
        (Clue, Study) | (Clue, Library) => 0.25,
        (Clue, Bedroom) | (Clue, Attic) => 0.10,
        (Collectible, Library) | (Collectible, Attic) | (Collectible, Cellar) => 0.15,
        (Artifact, Crypt) | (Artifact, Chapel) | (Artifact, RitualChamber) => 0.25,
        (Component, Cellar) | (Component, Crypt) | (Component, RitualChamber) => 0.20,
        (Component, Kitchen) => 0.10,
        _ => 0.0,
    }
}
