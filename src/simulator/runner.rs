//! Simulation runner: generate, validate, repair, then play a crude
//! exploration loop against the spawn runtime.
//!
//! The loop stands in for the host game: it explores one tile per round,
//! decrements doom, scoops up spawned items, and applies the guaranteed-
//! spawn escalation, so catalog changes show up as completion-rate shifts.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::config::SimConfig;
use super::report::{RunStats, SimReport};
use crate::board::types::{Tile, TileCategory};
use crate::core::balance::{SpawnTuning, ValidationTuning};
use crate::scenario::autofix::auto_fix_with_tuning;
use crate::scenario::generation::generate_random_scenario;
use crate::scenario::types::{Difficulty, Scenario};
use crate::scenario::validation::{is_scenario_basically_winnable, validate_with_tuning};
use crate::spawns::logic::{
    check_guaranteed_spawns, check_quest_tile_reveals, collect_quest_item, find_best_spawn_tile,
    initialize_objective_spawns, mark_item_spawned, on_tile_explored,
    spawn_revealed_quest_tile_immediately,
};
use crate::spawns::types::{ObjectiveSpawnState, QuestTileOutcome, SpawnUrgency};

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig) -> SimReport {
    let mut all_runs = Vec::new();

    for difficulty in Difficulty::ALL {
        for run_index in 0..config.runs_per_difficulty {
            let mut rng = match config.seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(
                    seed.wrapping_add(run_index as u64)
                        .wrapping_add((difficulty as u64) << 32),
                ),
                None => ChaCha8Rng::from_entropy(),
            };
            let stats = simulate_single_run(config, difficulty, &mut rng);
            if config.verbosity >= 2 {
                println!(
                    "{} run {}/{}: {} conf {} attempts {} cleared {} forced {}",
                    difficulty.label(),
                    run_index + 1,
                    config.runs_per_difficulty,
                    stats.victory_type,
                    stats.confidence,
                    stats.attempts,
                    stats.objectives_cleared,
                    stats.forced_spawns,
                );
            }
            all_runs.push(stats);
        }
    }

    SimReport::from_runs(all_runs)
}

fn simulate_single_run(
    config: &SimConfig,
    difficulty: Difficulty,
    rng: &mut ChaCha8Rng,
) -> RunStats {
    let tuning = ValidationTuning::default();

    // The validated-generation loop, unrolled so repairs stay visible.
    let mut accepted: Option<(Scenario, i32, bool)> = None;
    let mut attempts = 0;
    for attempt in 1..=config.max_generation_attempts {
        attempts = attempt;
        let scenario = generate_random_scenario(difficulty, rng);
        if is_scenario_basically_winnable(&scenario) {
            let validation = validate_with_tuning(&scenario, &tuning);
            if validation.is_winnable {
                accepted = Some((scenario, validation.confidence, false));
                break;
            }
        }
        let fix = auto_fix_with_tuning(&scenario, &tuning);
        let validation = validate_with_tuning(&fix.scenario, &tuning);
        if validation.is_winnable {
            accepted = Some((fix.scenario, validation.confidence, true));
            break;
        }
    }

    let Some((scenario, confidence, repaired)) = accepted else {
        return RunStats {
            difficulty: difficulty.label().to_string(),
            victory_type: "-".to_string(),
            generated: false,
            confidence: 0,
            attempts,
            repaired: false,
            objectives_cleared: false,
            rounds_used: 0,
            items_collected: 0,
            forced_spawns: 0,
        };
    };

    let play = play_out(&scenario, config.board_tiles, rng);
    RunStats {
        difficulty: difficulty.label().to_string(),
        victory_type: format!("{:?}", scenario.victory_type),
        generated: true,
        confidence,
        attempts,
        repaired,
        objectives_cleared: play.cleared,
        rounds_used: play.rounds,
        items_collected: play.items,
        forced_spawns: play.forced,
    }
}

struct PlayOutcome {
    cleared: bool,
    rounds: u32,
    items: u32,
    forced: u32,
}

fn play_out(scenario: &Scenario, board_tiles: usize, rng: &mut ChaCha8Rng) -> PlayOutcome {
    let tuning = SpawnTuning::default();
    let mut tiles = build_board(board_tiles);
    let mut state = initialize_objective_spawns(scenario);
    let mut completed: Vec<String> = Vec::new();
    let mut pending_tiles: Vec<String> = state
        .quest_tiles
        .iter()
        .filter(|q| q.revealed && !q.spawned)
        .map(|q| q.id.clone())
        .collect();
    let mut forced = 0u32;
    let mut doom = scenario.start_doom;
    let mut explore_index = 0usize;
    let mut rounds = 0u32;

    while doom > 0 && !pipeline_objectives_cleared(scenario, &state) {
        doom -= 1;
        rounds += 1;

        if explore_index < tiles.len() {
            tiles[explore_index].explored = true;
            let tile = tiles[explore_index].clone();
            explore_index += 1;

            let outcome = on_tile_explored(&state, &tile, scenario, &completed, &tuning, rng);
            state = outcome.state;
            if let Some(item) = outcome.spawned_item {
                apply_collection(&mut state, &mut completed, &item.id, scenario);
            }
            for revealed in outcome.revealed_tiles {
                pending_tiles.push(revealed.id);
            }
        }

        // Revealed quest tiles materialize immediately; a deferred one is
        // retried next round.
        let mut still_pending = Vec::new();
        for quest_tile_id in pending_tiles.drain(..) {
            let placement =
                spawn_revealed_quest_tile_immediately(&state, &quest_tile_id, &mut tiles);
            let objective_id = placement
                .state
                .quest_tiles
                .iter()
                .find(|q| q.id == quest_tile_id)
                .map(|q| q.objective_id.clone());
            state = placement.state;
            match placement.outcome {
                QuestTileOutcome::Deferred => still_pending.push(quest_tile_id),
                _ => {
                    if let Some(id) = objective_id {
                        completed.push(id);
                    }
                }
            }
        }
        pending_tiles = still_pending;

        // The global backstop: force out whatever doom says must be out.
        let check = check_guaranteed_spawns(&state, scenario, doom, &tuning);
        if check.urgency != SpawnUrgency::None {
            let mut used: HashSet<String> = HashSet::new();
            for item in check.items {
                if let Some(tile) = find_best_spawn_tile(&item, &tiles, &used) {
                    let tile_id = tile.id.clone();
                    used.insert(tile_id.clone());
                    state = mark_item_spawned(&state, &item.id, &tile_id);
                    forced += 1;
                    apply_collection(&mut state, &mut completed, &item.id, scenario);
                }
            }
        }

        // Pickups this round may have satisfied a reveal condition even
        // with no exploration left.
        let reveal = check_quest_tile_reveals(&state, &completed);
        state = reveal.state;
        for revealed in reveal.revealed_tiles {
            pending_tiles.push(revealed.id);
        }
    }

    PlayOutcome {
        cleared: pipeline_objectives_cleared(scenario, &state),
        rounds,
        items: state.items_collected,
        forced,
    }
}

fn apply_collection(
    state: &mut ObjectiveSpawnState,
    completed: &mut Vec<String>,
    item_id: &str,
    scenario: &Scenario,
) {
    let outcome = collect_quest_item(state, item_id, scenario);
    *state = outcome.state;
    if outcome.objective_completed {
        if let Some(objective) = outcome.updated_objective {
            completed.push(objective.id);
        }
    }
}

/// Whether every required objective the spawn pipeline owns is satisfied.
/// Combat- and time-driven objectives are the host's business, not the
/// pipeline's, so they don't gate this.
fn pipeline_objectives_cleared(scenario: &Scenario, state: &ObjectiveSpawnState) -> bool {
    scenario.required_objectives().all(|objective| {
        if objective.objective_type.is_item_driven() {
            state
                .quest_items
                .iter()
                .filter(|i| i.objective_id == objective.id)
                .all(|i| i.collected)
        } else if objective.objective_type.is_tile_driven() {
            state
                .quest_tiles
                .iter()
                .filter(|q| q.objective_id == objective.id)
                .all(|q| q.spawned)
        } else {
            true
        }
    })
}

fn build_board(count: usize) -> Vec<Tile> {
    let categories = [
        TileCategory::Foyer,
        TileCategory::Corridor,
        TileCategory::Study,
        TileCategory::Library,
        TileCategory::Cellar,
        TileCategory::Crypt,
        TileCategory::Chapel,
        TileCategory::Bedroom,
        TileCategory::Kitchen,
        TileCategory::Attic,
        TileCategory::Garden,
        TileCategory::Gate,
    ];
    (0..count)
        .map(|index| {
            let category = categories[index % categories.len()];
            let mut tile = Tile::new(
                format!("t{:02}", index),
                category,
                format!("{} {}", category_name(category), index + 1),
            );
            tile.floor = match category {
                TileCategory::Cellar | TileCategory::Crypt => -1,
                TileCategory::Attic => 1,
                _ => 0,
            };
            tile
        })
        .collect()
}

fn category_name(category: TileCategory) -> &'static str {
    match category {
        TileCategory::Foyer => "Foyer",
        TileCategory::Corridor => "Corridor",
        TileCategory::Study => "Study",
        TileCategory::Library => "Library",
        TileCategory::Cellar => "Cellar",
        TileCategory::Crypt => "Crypt",
        TileCategory::Chapel => "Chapel",
        TileCategory::RitualChamber => "Ritual Chamber",
        TileCategory::Bedroom => "Bedroom",
        TileCategory::Kitchen => "Kitchen",
        TileCategory::Attic => "Attic",
        TileCategory::Garden => "Garden",
        TileCategory::Gate => "Gate",
        TileCategory::Shore => "Shore",
        TileCategory::Woods => "Woods",
        TileCategory::Generic => "Room",
    }
}
