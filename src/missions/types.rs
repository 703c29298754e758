//! Mission catalog data structures.

use crate::board::types::TileCategory;
use crate::scenario::types::{
    Atmosphere, DefeatKind, Difficulty, ObjectiveType, TileSet, VictoryType,
};

/// One value per difficulty.
#[derive(Debug, Clone, Copy)]
pub struct PerDifficulty<T: Copy> {
    pub normal: T,
    pub hard: T,
    pub nightmare: T,
}

impl<T: Copy> PerDifficulty<T> {
    pub const fn of(normal: T, hard: T, nightmare: T) -> Self {
        Self {
            normal,
            hard,
            nightmare,
        }
    }

    pub fn pick(&self, difficulty: Difficulty) -> T {
        match difficulty {
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
            Difficulty::Nightmare => self.nightmare,
        }
    }
}

/// What an objective template's target resolves to at generation time.
/// Tagged variants, not free strings: the generator decides the concrete id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    None,
    /// A boss drawn from the boss pool.
    Boss,
    ExitTile,
    AltarTile,
    ConfrontationTile,
    NpcTile,
    KeyItem,
    ClueItem,
    ComponentItem,
    Collectible,
}

/// Objective blueprint inside a mission template. `description` may carry
/// `{target}` and `{amount}` slots filled at generation time.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveTemplate {
    pub key: &'static str,
    pub objective_type: ObjectiveType,
    pub description: &'static str,
    pub short_description: &'static str,
    pub target: TargetSpec,
    pub amount: Option<PerDifficulty<u32>>,
    pub is_optional: bool,
    pub is_hidden: bool,
    /// Key of the template whose concrete objective reveals this one.
    pub revealed_by: Option<&'static str>,
}

/// Which objectives the mission's victory condition demands.
#[derive(Debug, Clone, Copy)]
pub struct VictoryTemplate {
    pub description: &'static str,
    pub required: &'static [&'static str],
}

/// Blueprint for a whole mission.
#[derive(Debug, Clone)]
pub struct MissionTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub victory_type: VictoryType,
    pub tile_set: TileSet,
    pub base_doom: PerDifficulty<i32>,
    /// Missions below this difficulty never offer this template.
    pub min_difficulty: Option<Difficulty>,
    pub objectives: Vec<ObjectiveTemplate>,
    pub victory: VictoryTemplate,
    pub extra_defeats: &'static [DefeatKind],
}

impl MissionTemplate {
    pub fn allows(&self, difficulty: Difficulty) -> bool {
        self.min_difficulty.map_or(true, |min| difficulty >= min)
    }
}

/// Start location candidate, tagged for lookup.
#[derive(Debug, Clone, Copy)]
pub struct LocationDef {
    pub name: &'static str,
    pub tile_set: TileSet,
    pub atmosphere: Atmosphere,
    pub category: TileCategory,
}

/// Boss pool entry.
#[derive(Debug, Clone, Copy)]
pub struct BossDefinition {
    pub boss_type: &'static str,
    pub name: &'static str,
    pub spawn_message: &'static str,
    pub min_difficulty: Difficulty,
}

/// Enemy pool entry: who spawns and how many at once.
#[derive(Debug, Clone, Copy)]
pub struct EnemySpawn {
    pub enemy_id: &'static str,
    pub count: u32,
}

/// Which floor a theme prefers for its set pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorPreference {
    Ground,
    Upper,
    Below,
    Any,
}

/// Tile preferences for a theme, consumed by the board generator.
#[derive(Debug, Clone, Copy)]
pub struct TilePreferences {
    pub preferred_names: &'static [&'static str],
    pub avoided_names: &'static [&'static str],
    pub preferred_categories: &'static [TileCategory],
    pub floor_preference: FloorPreference,
}
