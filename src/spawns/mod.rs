//! Objective spawn runtime: quest item/tile materialization during play.

pub mod logic;
pub mod types;

pub use logic::{
    check_guaranteed_spawns, check_quest_tile_reveals, collect_quest_item, find_best_spawn_tile,
    get_objective_progress, get_spawn_status, initialize_objective_spawns, mark_item_spawned,
    on_tile_explored, should_spawn_quest_item, spawn_revealed_quest_tile_immediately,
};
pub use types::{
    CollectOutcome, GuaranteedSpawns, ObjectiveProgress, ObjectiveSpawnState, QuestItem,
    QuestItemType, QuestTile, QuestTileOutcome, QuestTilePlacement, QuestTileType, RevealCheck,
    SpawnStatus, SpawnUrgency, TileExploredOutcome,
};
