//! Quest item / quest tile records and the spawn runtime's state.
//!
//! Everything here is plain serializable data so a saved game restores
//! pity counters and spawn/reveal flags exactly.

use serde::{Deserialize, Serialize};

use crate::scenario::types::{ObjectiveType, Scenario};

/// What kind of thing an objective-linked item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestItemType {
    Key,
    Clue,
    Collectible,
    Artifact,
    Component,
}

/// An objective-linked item that must materialize into the world before
/// its objective can be completed.
///
/// State machine: unspawned -> spawned(on tile) -> collected, monotonic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestItem {
    pub id: String,
    pub objective_id: String,
    pub scenario_id: String,
    pub item_type: QuestItemType,
    pub name: String,
    pub description: String,
    pub spawned: bool,
    pub spawned_on_tile_id: Option<String>,
    pub collected: bool,
}

/// What function a quest tile serves once it materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestTileType {
    Exit,
    Altar,
    FinalConfrontation,
    NpcLocation,
}

/// An objective-linked location.
///
/// State machine: unrevealed -> revealed -> spawned/materialized, monotonic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestTile {
    pub id: String,
    pub objective_id: String,
    pub tile_type: QuestTileType,
    pub name: String,
    pub spawned: bool,
    pub revealed: bool,
    /// Display text for how this tile becomes known.
    pub reveal_condition: Option<String>,
    /// Objective whose completion reveals this tile.
    pub reveal_objective_id: Option<String>,
    /// Only for `FinalConfrontation`: who appears there.
    pub boss_type: Option<String>,
}

/// The spawn runtime's whole mutable state. Created once per scenario
/// start, replaced (never shared-mutated) on every event, discarded at
/// scenario end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveSpawnState {
    pub scenario_id: String,
    pub quest_items: Vec<QuestItem>,
    pub quest_tiles: Vec<QuestTile>,
    pub tiles_explored: u32,
    pub items_collected: u32,
    /// Pity counter: consecutive eligible tiles without a spawn.
    pub tiles_since_last_spawn: u32,
}

impl ObjectiveSpawnState {
    /// Quest items not yet placed, in priority order: items of required
    /// objectives first, then optional, each group in insertion order.
    /// Insertion order is the deterministic tie-break.
    pub fn unspawned_items<'a>(&'a self, scenario: &'a Scenario) -> Vec<&'a QuestItem> {
        let is_required = |item: &QuestItem| {
            scenario
                .objective(&item.objective_id)
                .map(|o| !o.is_optional)
                .unwrap_or(false)
        };
        let mut items: Vec<&QuestItem> =
            self.quest_items.iter().filter(|i| !i.spawned).collect();
        items.sort_by_key(|i| !is_required(i));
        items
    }

    /// Unspawned items whose objective is required.
    pub fn unspawned_required_items<'a>(&'a self, scenario: &'a Scenario) -> Vec<&'a QuestItem> {
        self.quest_items
            .iter()
            .filter(|i| !i.spawned)
            .filter(|i| {
                scenario
                    .objective(&i.objective_id)
                    .map(|o| !o.is_optional)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Total pickups demanded by required item-driven objectives. Drives
    /// the collection-mission spawn boosts.
    pub fn required_pickup_count(&self, scenario: &Scenario) -> u32 {
        scenario
            .required_objectives()
            .filter(|o| o.objective_type.is_item_driven())
            .map(|o| o.target())
            .sum()
    }
}

/// Urgency of the guaranteed-spawn escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnUrgency {
    None,
    Warning,
    Critical,
}

/// Verdict of [`crate::spawns::logic::check_guaranteed_spawns`].
#[derive(Debug, Clone)]
pub struct GuaranteedSpawns {
    pub urgency: SpawnUrgency,
    /// Items that must be force-placed now, in priority order.
    pub items: Vec<QuestItem>,
}

/// Result of an exploration event.
#[derive(Debug, Clone)]
pub struct TileExploredOutcome {
    pub state: ObjectiveSpawnState,
    /// Item that materialized on the explored tile, if any.
    pub spawned_item: Option<QuestItem>,
    /// Quest tiles whose reveal condition was newly satisfied.
    pub revealed_tiles: Vec<QuestTile>,
}

/// Result of a standalone reveal re-check.
#[derive(Debug, Clone)]
pub struct RevealCheck {
    pub state: ObjectiveSpawnState,
    /// Quest tiles whose reveal condition was newly satisfied.
    pub revealed_tiles: Vec<QuestTile>,
}

/// What happened when a revealed quest tile tried to materialize.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestTileOutcome {
    /// The tile's function was written onto an explored board tile.
    Placed { tile_id: String },
    /// A final confrontation signals a boss spawn instead of an object.
    BossSpawn { boss_type: String },
    /// No eligible tile right now; retry on the next exploration event.
    Deferred,
}

/// Result of a quest-tile materialization attempt.
#[derive(Debug, Clone)]
pub struct QuestTilePlacement {
    pub state: ObjectiveSpawnState,
    pub outcome: QuestTileOutcome,
}

/// Result of collecting a quest item.
#[derive(Debug, Clone)]
pub struct CollectOutcome {
    pub state: ObjectiveSpawnState,
    /// Copy of the linked objective with progress applied; the host folds
    /// it back into its scenario record.
    pub updated_objective: Option<crate::scenario::types::ScenarioObjective>,
    pub objective_completed: bool,
}

/// Read model for UI and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnStatus {
    pub total_items: usize,
    pub spawned_items: usize,
    pub collected_items: usize,
    pub total_quest_tiles: usize,
    pub revealed_quest_tiles: usize,
    pub spawned_quest_tiles: usize,
    pub tiles_explored: u32,
    pub tiles_since_last_spawn: u32,
    /// Names of required items/tiles not yet in the world; these block victory.
    pub missing_required: Vec<String>,
}

/// Per-objective progress line for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveProgress {
    pub objective_id: String,
    pub short_description: String,
    pub current: u32,
    pub target: u32,
    pub completed: bool,
    pub is_optional: bool,
    pub is_hidden: bool,
}

impl ObjectiveProgress {
    /// "1/2"-style label.
    pub fn label(&self) -> String {
        format!("{}/{}", self.current, self.target)
    }
}

/// Objective types completed the moment their single quest item is collected.
pub(crate) fn completes_on_single_pickup(objective_type: ObjectiveType) -> bool {
    objective_type == ObjectiveType::FindItem
}
