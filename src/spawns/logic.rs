//! The objective spawn runtime.
//!
//! Event-driven and state-returning: every operation takes the current
//! [`ObjectiveSpawnState`] and produces a new one. The host game loop is
//! the only serializer and the only writer of the doom counter; this
//! module just reads doom where escalation needs it.

use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info};

use crate::board::types::{Tile, TileCategory, TileObject, TileObjectKind};
use crate::core::balance::{
    item_tile_affinity, room_name_spawn_bonus, SpawnTuning, FALLBACK_BOSS_TYPE,
};
use crate::scenario::types::{DoomEventType, ObjectiveType, Scenario, ScenarioObjective};
use crate::spawns::types::{
    completes_on_single_pickup, CollectOutcome, GuaranteedSpawns, ObjectiveProgress,
    ObjectiveSpawnState, QuestItem, QuestItemType, QuestTile, QuestTileOutcome,
    QuestTilePlacement, QuestTileType, RevealCheck, SpawnStatus, SpawnUrgency,
    TileExploredOutcome,
};

/// Builds the initial spawn state for a validated scenario: one quest item
/// per find-item objective, `target_amount` items per collect objective,
/// and one quest tile per tile-driven objective.
pub fn initialize_objective_spawns(scenario: &Scenario) -> ObjectiveSpawnState {
    let mut quest_items = Vec::new();
    let mut quest_tiles = Vec::new();

    for objective in &scenario.objectives {
        match objective.objective_type {
            ObjectiveType::FindItem => {
                quest_items.push(make_quest_item(scenario, objective, 0, 1));
            }
            ObjectiveType::Collect => {
                let total = objective.target();
                for index in 0..total {
                    quest_items.push(make_quest_item(scenario, objective, index, total));
                }
            }
            t if t.is_tile_driven() => {
                quest_tiles.push(make_quest_tile(scenario, objective));
            }
            _ => {}
        }
    }

    ObjectiveSpawnState {
        scenario_id: scenario.id.clone(),
        quest_items,
        quest_tiles,
        tiles_explored: 0,
        items_collected: 0,
        tiles_since_last_spawn: 0,
    }
}

fn make_quest_item(
    scenario: &Scenario,
    objective: &ScenarioObjective,
    index: u32,
    total: u32,
) -> QuestItem {
    let base_name = objective
        .target_id
        .as_deref()
        .map(item_display_name)
        .unwrap_or_else(|| "Unmarked Relic".to_string());
    let name = if total > 1 {
        format!("{} ({}/{})", base_name, index + 1, total)
    } else {
        base_name
    };
    QuestItem {
        id: format!("qitem-{}-{}", objective.id, index + 1),
        objective_id: objective.id.clone(),
        scenario_id: scenario.id.clone(),
        item_type: quest_item_type_for(objective),
        name,
        description: objective.description.clone(),
        spawned: false,
        spawned_on_tile_id: None,
        collected: false,
    }
}

fn make_quest_tile(scenario: &Scenario, objective: &ScenarioObjective) -> QuestTile {
    let target_id = objective.target_id.as_deref().unwrap_or("");
    let tile_type = quest_tile_type_for(target_id);
    let boss_type = if tile_type == QuestTileType::FinalConfrontation {
        Some(resolve_boss_type(scenario))
    } else {
        None
    };
    let reveal_condition = objective.revealed_by.as_ref().and_then(|parent| {
        scenario
            .objective(parent)
            .map(|o| format!("Revealed when \"{}\" is complete", o.short_description))
    });
    QuestTile {
        id: format!("qtile-{}", objective.id),
        objective_id: objective.id.clone(),
        tile_type,
        name: quest_tile_display(tile_type).to_string(),
        spawned: false,
        revealed: !objective.is_hidden,
        reveal_condition,
        reveal_objective_id: objective.revealed_by.clone(),
        boss_type,
    }
}

/// Item type from the generator's target-id vocabulary. The prefix table
/// covers every id the generator emits; the objective type is the fallback
/// for free-text ids.
pub fn quest_item_type_for(objective: &ScenarioObjective) -> QuestItemType {
    let target = objective.target_id.as_deref().unwrap_or("");
    match target.split('_').next().unwrap_or("") {
        "key" => QuestItemType::Key,
        "clue" => QuestItemType::Clue,
        "component" => QuestItemType::Component,
        "collectible" => QuestItemType::Collectible,
        "artifact" => QuestItemType::Artifact,
        _ => match objective.objective_type {
            ObjectiveType::Collect => QuestItemType::Collectible,
            _ => QuestItemType::Clue,
        },
    }
}

/// Quest tile type from a target id. Known ids first, substring matching
/// only as a fallback for free-text ids, npc-location as the default.
pub fn quest_tile_type_for(target_id: &str) -> QuestTileType {
    match target_id {
        "exit" => QuestTileType::Exit,
        "ritual_altar" => QuestTileType::Altar,
        "final_confrontation" => QuestTileType::FinalConfrontation,
        id if id.starts_with("npc") => QuestTileType::NpcLocation,
        id if id.contains("exit") => QuestTileType::Exit,
        id if id.contains("ritual") || id.contains("altar") => QuestTileType::Altar,
        id if id.contains("final_confrontation") => QuestTileType::FinalConfrontation,
        _ => QuestTileType::NpcLocation,
    }
}

fn quest_tile_display(tile_type: QuestTileType) -> &'static str {
    match tile_type {
        QuestTileType::Exit => "The Way Out",
        QuestTileType::Altar => "Ritual Altar",
        QuestTileType::FinalConfrontation => "Inner Sanctum",
        QuestTileType::NpcLocation => "Survivor's Refuge",
    }
}

fn resolve_boss_type(scenario: &Scenario) -> String {
    scenario
        .objectives
        .iter()
        .find(|o| o.objective_type == ObjectiveType::KillBoss)
        .and_then(|o| o.target_id.clone())
        .or_else(|| {
            scenario
                .doom_events
                .iter()
                .find(|e| e.event_type == DoomEventType::SpawnBoss)
                .map(|e| e.target_id.clone())
        })
        .unwrap_or_else(|| FALLBACK_BOSS_TYPE.to_string())
}

fn item_display_name(target_id: &str) -> String {
    let stripped = target_id
        .split_once('_')
        .map(|(_, rest)| rest)
        .unwrap_or(target_id);
    stripped
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Handles one "tile explored" event: counts the tile, maybe spawns a
/// quest item on it, and re-checks quest-tile reveal conditions against
/// the completed objectives.
pub fn on_tile_explored(
    state: &ObjectiveSpawnState,
    tile: &Tile,
    scenario: &Scenario,
    completed_objective_ids: &[String],
    tuning: &SpawnTuning,
    rng: &mut impl Rng,
) -> TileExploredOutcome {
    let mut next = state.clone();
    next.tiles_explored += 1;
    let mut spawned_item = None;

    let candidate_id = next
        .unspawned_items(scenario)
        .first()
        .map(|item| item.id.clone());
    if tile.is_spawn_candidate() {
        if let Some(item_id) = candidate_id {
            let is_collection =
                next.required_pickup_count(scenario) >= tuning.collection_threshold;
            let pity = tuning.pity_threshold(scenario.difficulty, is_collection);
            let forced = next.tiles_since_last_spawn >= pity;
            if forced || should_spawn_quest_item(&next, tile, scenario, tuning, rng) {
                next = mark_item_spawned(&next, &item_id, &tile.id);
                spawned_item = next.quest_items.iter().find(|i| i.id == item_id).cloned();
                if forced {
                    debug!(item = %item_id, tile = %tile.id, "pity timer forced a spawn");
                }
            } else {
                next.tiles_since_last_spawn += 1;
            }
        }
    }

    let reveal = check_quest_tile_reveals(&next, completed_objective_ids);

    TileExploredOutcome {
        state: reveal.state,
        spawned_item,
        revealed_tiles: reveal.revealed_tiles,
    }
}

/// Re-checks every unrevealed quest tile against the completed objectives.
/// Exploration events run this automatically; hosts must also run it after
/// an objective completes outside exploration (an item pickup, a combat
/// kill), since the triggering completion may arrive when no further tile
/// will ever be explored.
pub fn check_quest_tile_reveals(
    state: &ObjectiveSpawnState,
    completed_objective_ids: &[String],
) -> RevealCheck {
    let mut next = state.clone();
    let mut revealed_tiles = Vec::new();
    for quest_tile in next.quest_tiles.iter_mut() {
        if quest_tile.revealed {
            continue;
        }
        if let Some(trigger) = &quest_tile.reveal_objective_id {
            if completed_objective_ids.iter().any(|id| id == trigger) {
                quest_tile.revealed = true;
                revealed_tiles.push(quest_tile.clone());
            }
        }
    }
    RevealCheck {
        state: next,
        revealed_tiles,
    }
}

/// Probability roll for spawning the next quest item on this tile.
pub fn should_spawn_quest_item(
    state: &ObjectiveSpawnState,
    tile: &Tile,
    scenario: &Scenario,
    tuning: &SpawnTuning,
    rng: &mut impl Rng,
) -> bool {
    if !tile.is_spawn_candidate() {
        return false;
    }
    let candidates = state.unspawned_items(scenario);
    let Some(next_item) = candidates.first() else {
        return false;
    };
    let chance = spawn_chance(state, tile, next_item.item_type, scenario, tuning);
    rng.gen::<f64>() < chance
}

/// The spawn chance itself: a tiered base plus room-name and item/room
/// affinity bonuses, capped.
pub(crate) fn spawn_chance(
    state: &ObjectiveSpawnState,
    tile: &Tile,
    item_type: QuestItemType,
    scenario: &Scenario,
    tuning: &SpawnTuning,
) -> f64 {
    let expected = tuning.expected_tiles.max(1) as f64;
    let explored = state.tiles_explored as f64;

    let mut base = if explored < tuning.early_game_fraction * expected {
        tuning.base_chance_early
    } else if explored > tuning.behind_schedule_fraction * expected
        && !state.unspawned_required_items(scenario).is_empty()
    {
        tuning.base_chance_behind
    } else {
        tuning.base_chance_normal
    };

    if state.required_pickup_count(scenario) >= tuning.collection_threshold {
        base += tuning.collection_chance_bonus;
    }

    let bonus = room_name_spawn_bonus(&tile.name) + item_tile_affinity(item_type, tile.category);
    (base + bonus).min(tuning.max_chance)
}

/// Global backstop over the shared doom budget, independent of the
/// per-tile probability model. The probabilistic model alone cannot
/// guarantee termination before doom reaches zero; this can.
pub fn check_guaranteed_spawns(
    state: &ObjectiveSpawnState,
    scenario: &Scenario,
    doom: i32,
    tuning: &SpawnTuning,
) -> GuaranteedSpawns {
    let remaining: Vec<QuestItem> = state
        .unspawned_required_items(scenario)
        .into_iter()
        .cloned()
        .collect();
    if remaining.is_empty() {
        return GuaranteedSpawns {
            urgency: SpawnUrgency::None,
            items: Vec::new(),
        };
    }

    if doom <= tuning.critical_doom(scenario.start_doom) {
        info!(
            doom,
            remaining = remaining.len(),
            "critical doom: force-spawning all remaining required items"
        );
        return GuaranteedSpawns {
            urgency: SpawnUrgency::Critical,
            items: remaining,
        };
    }

    let exploration_ratio = state.tiles_explored as f64 / tuning.expected_tiles.max(1) as f64;
    if doom <= tuning.warning_doom(scenario.start_doom)
        && exploration_ratio >= tuning.warning_exploration_ratio
    {
        let next = remaining.into_iter().next().map(|i| vec![i]).unwrap_or_default();
        return GuaranteedSpawns {
            urgency: SpawnUrgency::Warning,
            items: next,
        };
    }

    GuaranteedSpawns {
        urgency: SpawnUrgency::None,
        items: Vec::new(),
    }
}

/// Marks an item as spawned on a tile and resets the pity counter.
/// Already-spawned items are left alone.
pub fn mark_item_spawned(
    state: &ObjectiveSpawnState,
    item_id: &str,
    tile_id: &str,
) -> ObjectiveSpawnState {
    let mut next = state.clone();
    if let Some(item) = next
        .quest_items
        .iter_mut()
        .find(|i| i.id == item_id && !i.spawned)
    {
        item.spawned = true;
        item.spawned_on_tile_id = Some(tile_id.to_string());
        next.tiles_since_last_spawn = 0;
    }
    next
}

/// Picks the best placement tile for an item: explored, searchable,
/// unoccupied, not already used this pass; scored by affinity with a
/// deterministic tie-break on tile id. `None` means defer to the next
/// exploration event.
pub fn find_best_spawn_tile<'a>(
    item: &QuestItem,
    tiles: &'a [Tile],
    used_tile_ids: &HashSet<String>,
) -> Option<&'a Tile> {
    let mut best: Option<(&Tile, f64)> = None;
    for tile in tiles
        .iter()
        .filter(|t| t.is_spawn_candidate() && !used_tile_ids.contains(&t.id))
    {
        let score =
            item_tile_affinity(item.item_type, tile.category) + room_name_spawn_bonus(&tile.name);
        let better = match best {
            None => true,
            Some((best_tile, best_score)) => {
                score > best_score + f64::EPSILON
                    || ((score - best_score).abs() <= f64::EPSILON && tile.id < best_tile.id)
            }
        };
        if better {
            best = Some((tile, score));
        }
    }
    best.map(|(tile, _)| tile)
}

/// Materializes a freshly revealed quest tile onto the best already-
/// explored board tile, immediately. Waiting for a future exploration
/// event would deadlock parties that never explore again after finding
/// the triggering key.
///
/// Final confrontations signal a boss spawn instead of placing an object.
pub fn spawn_revealed_quest_tile_immediately(
    state: &ObjectiveSpawnState,
    quest_tile_id: &str,
    tiles: &mut [Tile],
) -> QuestTilePlacement {
    let mut next = state.clone();
    let Some(index) = next.quest_tiles.iter().position(|q| q.id == quest_tile_id) else {
        return QuestTilePlacement {
            state: next,
            outcome: QuestTileOutcome::Deferred,
        };
    };

    if next.quest_tiles[index].tile_type == QuestTileType::FinalConfrontation {
        let boss_type = next.quest_tiles[index]
            .boss_type
            .clone()
            .unwrap_or_else(|| FALLBACK_BOSS_TYPE.to_string());
        next.quest_tiles[index].revealed = true;
        next.quest_tiles[index].spawned = true;
        info!(quest_tile = %quest_tile_id, boss = %boss_type, "confrontation signals boss spawn");
        return QuestTilePlacement {
            state: next,
            outcome: QuestTileOutcome::BossSpawn { boss_type },
        };
    }

    let tile_type = next.quest_tiles[index].tile_type;
    let mut best: Option<(usize, f64)> = None;
    for (tile_index, tile) in tiles.iter().enumerate() {
        if !tile.explored || tile.object.is_some() || tile.category == TileCategory::Corridor {
            continue;
        }
        let score = quest_tile_site_score(tile_type, tile);
        let better = match best {
            None => true,
            Some((best_index, best_score)) => {
                score > best_score + f64::EPSILON
                    || ((score - best_score).abs() <= f64::EPSILON
                        && tile.id < tiles[best_index].id)
            }
        };
        if better {
            best = Some((tile_index, score));
        }
    }

    match best {
        Some((tile_index, _)) => {
            let kind = match tile_type {
                QuestTileType::Exit => TileObjectKind::Exit,
                QuestTileType::Altar => TileObjectKind::Altar,
                _ => TileObjectKind::Npc,
            };
            tiles[tile_index].object = Some(TileObject {
                kind,
                name: next.quest_tiles[index].name.clone(),
            });
            next.quest_tiles[index].spawned = true;
            debug!(
                quest_tile = %quest_tile_id,
                tile = %tiles[tile_index].id,
                "quest tile materialized"
            );
            QuestTilePlacement {
                state: next,
                outcome: QuestTileOutcome::Placed {
                    tile_id: tiles[tile_index].id.clone(),
                },
            }
        }
        None => QuestTilePlacement {
            state: next,
            outcome: QuestTileOutcome::Deferred,
        },
    }
}

/// Site affinity for a quest tile: exits favor shallow entrance-like
/// rooms, altars favor deep crypt-like rooms.
fn quest_tile_site_score(tile_type: QuestTileType, tile: &Tile) -> f64 {
    let lower = tile.name.to_lowercase();
    let name_hit = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));
    match tile_type {
        QuestTileType::Exit => {
            let mut score = 0.0;
            if matches!(tile.category, TileCategory::Foyer | TileCategory::Gate) {
                score += 0.5;
            }
            if name_hit(&["foyer", "entrance", "hall", "door", "gate"]) {
                score += 0.25;
            }
            if tile.floor == 0 {
                score += 0.3;
            } else {
                score -= 0.1 * tile.floor.abs() as f64;
            }
            score
        }
        QuestTileType::Altar => {
            let mut score = 0.0;
            if matches!(
                tile.category,
                TileCategory::Crypt
                    | TileCategory::Chapel
                    | TileCategory::RitualChamber
                    | TileCategory::Cellar
            ) {
                score += 0.5;
            }
            if name_hit(&["crypt", "altar", "tomb", "cellar", "chancel"]) {
                score += 0.25;
            }
            if tile.floor < 0 {
                score += 0.2;
            }
            score
        }
        QuestTileType::NpcLocation | QuestTileType::FinalConfrontation => {
            let mut score = 0.0;
            if matches!(
                tile.category,
                TileCategory::Study | TileCategory::Library | TileCategory::Bedroom
            ) {
                score += 0.3;
            }
            score
        }
    }
}

/// Applies a quest item pickup. Idempotent: collecting an already-
/// collected item changes nothing.
pub fn collect_quest_item(
    state: &ObjectiveSpawnState,
    item_id: &str,
    scenario: &Scenario,
) -> CollectOutcome {
    let mut next = state.clone();
    let Some(index) = next.quest_items.iter().position(|i| i.id == item_id) else {
        return CollectOutcome {
            state: next,
            updated_objective: None,
            objective_completed: false,
        };
    };
    if next.quest_items[index].collected {
        return CollectOutcome {
            state: next,
            updated_objective: None,
            objective_completed: false,
        };
    }

    next.quest_items[index].collected = true;
    next.items_collected += 1;
    let objective_id = next.quest_items[index].objective_id.clone();
    let collected_for_objective = next
        .quest_items
        .iter()
        .filter(|i| i.objective_id == objective_id && i.collected)
        .count() as u32;

    let updated_objective = scenario.objective(&objective_id).map(|objective| {
        let mut updated = objective.clone();
        if completes_on_single_pickup(updated.objective_type) {
            updated.current_amount = updated.target();
            updated.completed = true;
        } else {
            updated.current_amount = collected_for_objective.min(updated.target());
            updated.completed = updated.current_amount >= updated.target();
        }
        updated
    });
    let objective_completed = updated_objective
        .as_ref()
        .map(|o| o.completed)
        .unwrap_or(false);

    debug!(
        item = %item_id,
        objective = %objective_id,
        progress = collected_for_objective,
        objective_completed,
        "quest item collected"
    );

    CollectOutcome {
        state: next,
        updated_objective,
        objective_completed,
    }
}

/// Read-only spawn status for diagnostics and the UI.
pub fn get_spawn_status(state: &ObjectiveSpawnState, scenario: &Scenario) -> SpawnStatus {
    let mut missing_required: Vec<String> = state
        .unspawned_required_items(scenario)
        .iter()
        .map(|i| i.name.clone())
        .collect();
    for quest_tile in &state.quest_tiles {
        let required = scenario
            .objective(&quest_tile.objective_id)
            .map(|o| !o.is_optional)
            .unwrap_or(false);
        if required && !quest_tile.spawned {
            missing_required.push(quest_tile.name.clone());
        }
    }

    SpawnStatus {
        total_items: state.quest_items.len(),
        spawned_items: state.quest_items.iter().filter(|i| i.spawned).count(),
        collected_items: state.quest_items.iter().filter(|i| i.collected).count(),
        total_quest_tiles: state.quest_tiles.len(),
        revealed_quest_tiles: state.quest_tiles.iter().filter(|t| t.revealed).count(),
        spawned_quest_tiles: state.quest_tiles.iter().filter(|t| t.spawned).count(),
        tiles_explored: state.tiles_explored,
        tiles_since_last_spawn: state.tiles_since_last_spawn,
        missing_required,
    }
}

/// Read-only per-objective progress. Item-driven objectives report the
/// runtime's own collection counts; everything else reports the host-
/// maintained counter on the objective.
pub fn get_objective_progress(
    scenario: &Scenario,
    state: &ObjectiveSpawnState,
) -> Vec<ObjectiveProgress> {
    scenario
        .objectives
        .iter()
        .map(|objective| {
            let target = objective.target();
            let current = if objective.objective_type.is_item_driven() {
                state
                    .quest_items
                    .iter()
                    .filter(|i| i.objective_id == objective.id && i.collected)
                    .count() as u32
            } else {
                objective.current_amount
            };
            let current = current.min(target);
            ObjectiveProgress {
                objective_id: objective.id.clone(),
                short_description: objective.short_description.clone(),
                current,
                target,
                completed: objective.completed || current >= target,
                is_optional: objective.is_optional,
                is_hidden: objective.is_hidden,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::types::{
        Briefing, DefeatCondition, DefeatKind, Difficulty, Theme, TileSet, VictoryCondition,
        VictoryType,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

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

    fn scenario_with(
        objectives: Vec<ScenarioObjective>,
        victory_type: VictoryType,
    ) -> Scenario {
        let required: Vec<String> = objectives
            .iter()
            .filter(|o| !o.is_optional)
            .map(|o| o.id.clone())
            .collect();
        Scenario {
            id: "spawn-test".to_string(),
            title: "Shadows over Ashfield".to_string(),
            briefing: Briefing {
                description: "The letters stopped coming.".to_string(),
                goal: "See it through.".to_string(),
                doom_prophecy: "The dark keeps its own ledger.".to_string(),
            },
            difficulty: Difficulty::Normal,
            theme: Theme::Mansion,
            tile_set: TileSet::Indoor,
            start_location: "Blackwood Manor".to_string(),
            victory_type,
            start_doom: 10,
            doom_on_death: 2,
            doom_on_survivor_rescue: 2,
            objectives,
            victory_conditions: vec![VictoryCondition {
                condition_type: victory_type,
                description: "Win".to_string(),
                required_objectives: required,
            }],
            defeat_conditions: vec![DefeatCondition {
                kind: DefeatKind::DoomExhausted,
                description: "The doom track reaches zero.".to_string(),
                linked_objectives: Vec::new(),
            }],
            doom_events: Vec::new(),
        }
    }

    fn escape_scenario() -> Scenario {
        let mut key = objective("obj-1", ObjectiveType::FindItem);
        key.target_id = Some("key_tarnished_silver_key".to_string());
        let mut way_out = objective("obj-2", ObjectiveType::Escape);
        way_out.target_id = Some("exit".to_string());
        way_out.is_hidden = true;
        way_out.revealed_by = Some("obj-1".to_string());
        scenario_with(vec![key, way_out], VictoryType::Escape)
    }

    fn collect_scenario(amount: u32) -> Scenario {
        let mut relics = objective("obj-1", ObjectiveType::Collect);
        relics.target_id = Some("collectible_votive_idol".to_string());
        relics.target_amount = Some(amount);
        scenario_with(vec![relics], VictoryType::Collection)
    }

    fn explored_tile(id: &str, category: TileCategory, name: &str) -> Tile {
        let mut tile = Tile::new(id, category, name);
        tile.explored = true;
        tile
    }

    #[test]
    fn test_initialize_escape_scenario() {
        let scenario = escape_scenario();
        let state = initialize_objective_spawns(&scenario);

        assert_eq!(state.quest_items.len(), 1);
        assert_eq!(state.quest_items[0].item_type, QuestItemType::Key);
        assert_eq!(state.quest_items[0].name, "Tarnished Silver Key");
        assert!(!state.quest_items[0].spawned);

        assert_eq!(state.quest_tiles.len(), 1);
        let exit = &state.quest_tiles[0];
        assert_eq!(exit.tile_type, QuestTileType::Exit);
        assert!(!exit.revealed);
        assert_eq!(exit.reveal_objective_id.as_deref(), Some("obj-1"));
        assert_eq!(state.tiles_explored, 0);
        assert_eq!(state.tiles_since_last_spawn, 0);
    }

    #[test]
    fn test_initialize_collect_scenario_makes_one_item_per_pickup() {
        let scenario = collect_scenario(3);
        let state = initialize_objective_spawns(&scenario);
        assert_eq!(state.quest_items.len(), 3);
        assert!(state
            .quest_items
            .iter()
            .all(|i| i.objective_id == "obj-1"));
        assert!(state.quest_items[0].name.contains("(1/3)"));
        assert!(state.quest_items[2].name.contains("(3/3)"));
    }

    #[test]
    fn test_quest_tile_type_lookup() {
        assert_eq!(quest_tile_type_for("exit"), QuestTileType::Exit);
        assert_eq!(quest_tile_type_for("ritual_altar"), QuestTileType::Altar);
        assert_eq!(
            quest_tile_type_for("final_confrontation"),
            QuestTileType::FinalConfrontation
        );
        assert_eq!(quest_tile_type_for("npc_witness"), QuestTileType::NpcLocation);
        // Free-text fallback, then the default.
        assert_eq!(quest_tile_type_for("old_exit_hatch"), QuestTileType::Exit);
        assert_eq!(quest_tile_type_for("sunken_altar_stone"), QuestTileType::Altar);
        assert_eq!(quest_tile_type_for("somewhere_odd"), QuestTileType::NpcLocation);
    }

    #[test]
    fn test_pity_timer_forces_a_spawn() {
        let scenario = escape_scenario();
        let tuning = SpawnTuning::default();
        let mut state = initialize_objective_spawns(&scenario);
        state.tiles_since_last_spawn = tuning.pity_threshold(scenario.difficulty, false);

        // Zero the probability model: only the pity timer can fire.
        let dead_roll = SpawnTuning {
            base_chance_early: 0.0,
            base_chance_normal: 0.0,
            base_chance_behind: 0.0,
            max_chance: 0.0,
            ..tuning
        };
        let tile = explored_tile("t1", TileCategory::Garden, "Walled Garden");
        let mut rng = create_test_rng();
        let outcome = on_tile_explored(&state, &tile, &scenario, &[], &dead_roll, &mut rng);

        let spawned = outcome.spawned_item.expect("pity must force the spawn");
        assert_eq!(spawned.spawned_on_tile_id.as_deref(), Some("t1"));
        assert_eq!(outcome.state.tiles_since_last_spawn, 0);
        assert_eq!(outcome.state.tiles_explored, 1);
    }

    #[test]
    fn test_corridors_do_not_spawn_or_advance_pity() {
        let scenario = escape_scenario();
        let mut state = initialize_objective_spawns(&scenario);
        state.tiles_since_last_spawn = 99;

        let corridor = explored_tile("t1", TileCategory::Corridor, "East Corridor");
        let mut rng = create_test_rng();
        let outcome = on_tile_explored(
            &state,
            &corridor,
            &scenario,
            &[],
            &SpawnTuning::default(),
            &mut rng,
        );
        assert!(outcome.spawned_item.is_none());
        assert_eq!(outcome.state.tiles_since_last_spawn, 99);
        assert_eq!(outcome.state.tiles_explored, 1);
    }

    #[test]
    fn test_failed_roll_advances_the_pity_counter() {
        let scenario = escape_scenario();
        let state = initialize_objective_spawns(&scenario);
        let dead_roll = SpawnTuning {
            base_chance_early: 0.0,
            base_chance_normal: 0.0,
            base_chance_behind: 0.0,
            max_chance: 0.0,
            ..SpawnTuning::default()
        };
        let tile = explored_tile("t1", TileCategory::Garden, "Walled Garden");
        let mut rng = create_test_rng();
        let outcome = on_tile_explored(&state, &tile, &scenario, &[], &dead_roll, &mut rng);
        assert!(outcome.spawned_item.is_none());
        assert_eq!(outcome.state.tiles_since_last_spawn, 1);
    }

    #[test]
    fn test_fully_spawned_state_stops_counting_misses() {
        let scenario = escape_scenario();
        let state = initialize_objective_spawns(&scenario);
        let state = mark_item_spawned(&state, &state.quest_items[0].id.clone(), "t0");

        let tile = explored_tile("t1", TileCategory::Garden, "Walled Garden");
        let mut rng = create_test_rng();
        let outcome = on_tile_explored(
            &state,
            &tile,
            &scenario,
            &[],
            &SpawnTuning::default(),
            &mut rng,
        );
        assert!(outcome.spawned_item.is_none());
        assert_eq!(outcome.state.tiles_since_last_spawn, 0);
    }

    #[test]
    fn test_reveal_check_fires_on_completed_objective() {
        let scenario = escape_scenario();
        let state = initialize_objective_spawns(&scenario);
        let tile = explored_tile("t1", TileCategory::Study, "Private Study");
        let mut rng = create_test_rng();

        let outcome = on_tile_explored(
            &state,
            &tile,
            &scenario,
            &["obj-1".to_string()],
            &SpawnTuning::default(),
            &mut rng,
        );
        assert_eq!(outcome.revealed_tiles.len(), 1);
        assert_eq!(outcome.revealed_tiles[0].tile_type, QuestTileType::Exit);
        assert!(outcome.state.quest_tiles[0].revealed);

        // Already revealed: the next event reports nothing new.
        let again = on_tile_explored(
            &outcome.state,
            &tile,
            &scenario,
            &["obj-1".to_string()],
            &SpawnTuning::default(),
            &mut rng,
        );
        assert!(again.revealed_tiles.is_empty());
    }

    #[test]
    fn test_guaranteed_spawns_critical_forces_everything() {
        let scenario = collect_scenario(3);
        let tuning = SpawnTuning::default();
        let state = initialize_objective_spawns(&scenario);

        let check = check_guaranteed_spawns(&state, &scenario, 2, &tuning);
        assert_eq!(check.urgency, SpawnUrgency::Critical);
        assert_eq!(check.items.len(), 3);

        // At the threshold itself, still critical.
        let check = check_guaranteed_spawns(
            &state,
            &scenario,
            tuning.critical_doom(scenario.start_doom),
            &tuning,
        );
        assert_eq!(check.urgency, SpawnUrgency::Critical);
        assert!(!check.items.is_empty());
    }

    #[test]
    fn test_guaranteed_spawns_warning_needs_exploration_ratio() {
        let scenario = collect_scenario(3);
        let tuning = SpawnTuning::default();
        let mut state = initialize_objective_spawns(&scenario);

        // Barely explored: warning line alone does not trigger.
        state.tiles_explored = 2;
        let check = check_guaranteed_spawns(&state, &scenario, 5, &tuning);
        assert_eq!(check.urgency, SpawnUrgency::None);

        // Well explored: the warning forces the next item only.
        state.tiles_explored = 20;
        let check = check_guaranteed_spawns(&state, &scenario, 5, &tuning);
        assert_eq!(check.urgency, SpawnUrgency::Warning);
        assert_eq!(check.items.len(), 1);
    }

    #[test]
    fn test_guaranteed_spawns_quiet_when_nothing_remains() {
        let scenario = escape_scenario();
        let state = initialize_objective_spawns(&scenario);
        let state = mark_item_spawned(&state, &state.quest_items[0].id.clone(), "t0");
        let check = check_guaranteed_spawns(&state, &scenario, 1, &SpawnTuning::default());
        assert_eq!(check.urgency, SpawnUrgency::None);
        assert!(check.items.is_empty());
    }

    #[test]
    fn test_find_best_spawn_tile_prefers_affinity_then_id() {
        let scenario = escape_scenario();
        let state = initialize_objective_spawns(&scenario);
        let mut clue = state.quest_items[0].clone();
        clue.item_type = QuestItemType::Clue;

        let tiles = vec![
            explored_tile("t-garden", TileCategory::Garden, "Walled Garden"),
            explored_tile("t-study", TileCategory::Study, "Private Study"),
        ];
        let best = find_best_spawn_tile(&clue, &tiles, &HashSet::new()).unwrap();
        assert_eq!(best.id, "t-study");

        // Equal scores break ties on the lexicographically smaller id.
        let tiles = vec![
            explored_tile("t-b", TileCategory::Garden, "South Lawn"),
            explored_tile("t-a", TileCategory::Garden, "North Lawn"),
        ];
        let best = find_best_spawn_tile(&clue, &tiles, &HashSet::new()).unwrap();
        assert_eq!(best.id, "t-a");

        // Used tiles are skipped; nothing eligible means defer.
        let used: HashSet<String> = ["t-a".to_string(), "t-b".to_string()].into();
        assert!(find_best_spawn_tile(&clue, &tiles, &used).is_none());
    }

    #[test]
    fn test_altar_materializes_on_crypt_like_tile() {
        let mut ritual = objective("obj-1", ObjectiveType::FindTile);
        ritual.target_id = Some("ritual_altar".to_string());
        let scenario = scenario_with(vec![ritual], VictoryType::Ritual);
        let state = initialize_objective_spawns(&scenario);

        let mut tiles = vec![
            explored_tile("t-kitchen", TileCategory::Kitchen, "Scullery"),
            explored_tile("t-crypt", TileCategory::Crypt, "Flooded Crypt"),
        ];
        let placement =
            spawn_revealed_quest_tile_immediately(&state, "qtile-obj-1", &mut tiles);

        assert_eq!(
            placement.outcome,
            QuestTileOutcome::Placed {
                tile_id: "t-crypt".to_string()
            }
        );
        assert!(placement.state.quest_tiles[0].spawned);
        let object = tiles[1].object.as_ref().unwrap();
        assert_eq!(object.kind, TileObjectKind::Altar);
    }

    #[test]
    fn test_exit_materializes_near_the_entrance() {
        let scenario = escape_scenario();
        let state = initialize_objective_spawns(&scenario);

        let mut attic = explored_tile("t-attic", TileCategory::Bedroom, "Servant's Attic");
        attic.floor = 2;
        let mut tiles = vec![
            attic,
            explored_tile("t-foyer", TileCategory::Foyer, "Grand Foyer"),
        ];
        let placement =
            spawn_revealed_quest_tile_immediately(&state, "qtile-obj-2", &mut tiles);
        assert_eq!(
            placement.outcome,
            QuestTileOutcome::Placed {
                tile_id: "t-foyer".to_string()
            }
        );
    }

    #[test]
    fn test_final_confrontation_signals_boss_spawn() {
        let mut clue = objective("obj-1", ObjectiveType::FindItem);
        clue.target_id = Some("clue_cipher_page".to_string());
        let mut lair = objective("obj-2", ObjectiveType::FindTile);
        lair.target_id = Some("final_confrontation".to_string());
        lair.is_hidden = true;
        lair.revealed_by = Some("obj-1".to_string());
        let mut strike = objective("obj-3", ObjectiveType::KillBoss);
        strike.target_id = Some("pale_surgeon".to_string());
        let scenario = scenario_with(vec![clue, lair, strike], VictoryType::Assassination);
        let state = initialize_objective_spawns(&scenario);

        let mut tiles = vec![explored_tile("t1", TileCategory::Study, "Private Study")];
        let placement =
            spawn_revealed_quest_tile_immediately(&state, "qtile-obj-2", &mut tiles);
        assert_eq!(
            placement.outcome,
            QuestTileOutcome::BossSpawn {
                boss_type: "pale_surgeon".to_string()
            }
        );
        // No tile mutation for a confrontation.
        assert!(tiles[0].object.is_none());
    }

    #[test]
    fn test_materialization_defers_without_explored_tiles() {
        let mut ritual = objective("obj-1", ObjectiveType::FindTile);
        ritual.target_id = Some("ritual_altar".to_string());
        let scenario = scenario_with(vec![ritual], VictoryType::Ritual);
        let state = initialize_objective_spawns(&scenario);

        let mut tiles = vec![Tile::new("t1", TileCategory::Crypt, "Flooded Crypt")];
        let placement =
            spawn_revealed_quest_tile_immediately(&state, "qtile-obj-1", &mut tiles);
        assert_eq!(placement.outcome, QuestTileOutcome::Deferred);
        assert!(!placement.state.quest_tiles[0].spawned);
    }

    #[test]
    fn test_collect_is_idempotent() {
        let scenario = escape_scenario();
        let state = initialize_objective_spawns(&scenario);
        let item_id = state.quest_items[0].id.clone();
        let state = mark_item_spawned(&state, &item_id, "t1");

        let first = collect_quest_item(&state, &item_id, &scenario);
        assert_eq!(first.state.items_collected, 1);
        assert!(first.objective_completed);

        let second = collect_quest_item(&first.state, &item_id, &scenario);
        assert_eq!(second.state.items_collected, 1);
        assert!(!second.objective_completed);
        assert!(second.updated_objective.is_none());
    }

    #[test]
    fn test_collect_objective_progress_reaches_target() {
        let scenario = collect_scenario(2);
        let state = initialize_objective_spawns(&scenario);
        let first_id = state.quest_items[0].id.clone();
        let second_id = state.quest_items[1].id.clone();

        let after_first = collect_quest_item(&state, &first_id, &scenario);
        assert!(!after_first.objective_completed);
        let updated = after_first.updated_objective.unwrap();
        assert_eq!(updated.current_amount, 1);
        assert!(!updated.completed);

        let progress = get_objective_progress(&scenario, &after_first.state);
        assert_eq!(progress[0].label(), "1/2");
        assert!(!progress[0].completed);

        let after_second = collect_quest_item(&after_first.state, &second_id, &scenario);
        assert!(after_second.objective_completed);
        let updated = after_second.updated_objective.unwrap();
        assert_eq!(updated.current_amount, 2);
        assert!(updated.completed);
    }

    #[test]
    fn test_collection_missions_roll_hotter_and_pity_sooner() {
        let tuning = SpawnTuning::default();
        let big = collect_scenario(5);
        let small = collect_scenario(2);
        let big_state = initialize_objective_spawns(&big);
        let small_state = initialize_objective_spawns(&small);
        let tile = explored_tile("t1", TileCategory::Garden, "Walled Garden");

        let big_chance = spawn_chance(
            &big_state,
            &tile,
            QuestItemType::Collectible,
            &big,
            &tuning,
        );
        let small_chance = spawn_chance(
            &small_state,
            &tile,
            QuestItemType::Collectible,
            &small,
            &tuning,
        );
        assert!(big_chance > small_chance);

        assert!(
            tuning.pity_threshold(Difficulty::Normal, true)
                < tuning.pity_threshold(Difficulty::Normal, false)
        );
    }

    #[test]
    fn test_behind_schedule_tier_raises_the_base_chance() {
        let scenario = escape_scenario();
        let tuning = SpawnTuning::default();
        let mut state = initialize_objective_spawns(&scenario);
        let tile = explored_tile("t1", TileCategory::Garden, "Walled Garden");

        state.tiles_explored = 2;
        let early = spawn_chance(&state, &tile, QuestItemType::Key, &scenario, &tuning);
        state.tiles_explored = 10;
        let normal = spawn_chance(&state, &tile, QuestItemType::Key, &scenario, &tuning);
        state.tiles_explored = 25;
        let behind = spawn_chance(&state, &tile, QuestItemType::Key, &scenario, &tuning);

        assert!(early < normal);
        assert!(normal < behind);
    }

    #[test]
    fn test_spawn_status_names_missing_required_blockers() {
        let scenario = escape_scenario();
        let state = initialize_objective_spawns(&scenario);
        let status = get_spawn_status(&state, &scenario);

        assert_eq!(status.total_items, 1);
        assert_eq!(status.spawned_items, 0);
        assert!(status
            .missing_required
            .contains(&"Tarnished Silver Key".to_string()));
        assert!(status.missing_required.contains(&"The Way Out".to_string()));

        let state = mark_item_spawned(&state, &state.quest_items[0].id.clone(), "t1");
        let status = get_spawn_status(&state, &scenario);
        assert!(!status
            .missing_required
            .contains(&"Tarnished Silver Key".to_string()));
    }

    #[test]
    fn test_required_items_spawn_before_optional() {
        let mut required = objective("obj-1", ObjectiveType::FindItem);
        required.target_id = Some("key_tarnished_silver_key".to_string());
        let mut bonus = objective("obj-2", ObjectiveType::Collect);
        bonus.target_id = Some("clue_torn_letter".to_string());
        bonus.target_amount = Some(2);
        bonus.is_optional = true;
        // Optional items sit first in insertion order; priority must still
        // put the required key ahead of them.
        let scenario = scenario_with(vec![bonus, required], VictoryType::Escape);
        let state = initialize_objective_spawns(&scenario);

        let queue = state.unspawned_items(&scenario);
        assert_eq!(queue[0].item_type, QuestItemType::Key);
    }
}
