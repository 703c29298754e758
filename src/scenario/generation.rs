//! Scenario assembly from mission templates.
//!
//! Generation is template-driven: a mission template fixes the structure,
//! the dice fix theme, names, and thresholds. Everything returned here is
//! plain data; winnability is proven separately by the validator.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use crate::core::balance::{
    BONUS_OBJECTIVE_CHANCE_HARD, BONUS_OBJECTIVE_CHANCE_NIGHTMARE, BONUS_OBJECTIVE_CHANCE_NORMAL,
    DOOM_EVENT_BOSS_FRACTION, DOOM_EVENT_EARLY_FRACTION, DOOM_EVENT_LATE_FRACTION,
    DOOM_EVENT_MID_FRACTION, DOOM_EVENT_OMEN_FRACTION, DOOM_ON_DEATH_HARD, DOOM_ON_DEATH_NIGHTMARE,
    DOOM_ON_DEATH_NORMAL, DOOM_ON_RESCUE_HARD, DOOM_ON_RESCUE_NIGHTMARE, DOOM_ON_RESCUE_NORMAL,
    FALLBACK_BOSS_TYPE,
};
use crate::missions::data::{
    atmosphere_doom_adjustment, bonus_objective_templates, bosses_for, enemy_pool_for_atmosphere,
    enemy_pool_for_difficulty, enemy_pool_for_mission, locations_for, mission_templates_for,
    place_names, BRIEFING_OPENINGS, CLUE_ITEM_NAMES, COLLECTIBLE_NOUNS, COMPONENT_NAMES,
    DOOM_PROPHECIES, KEY_ITEM_NAMES, MYSTERY_NOUNS, TITLE_TEMPLATES,
};
use crate::missions::types::{
    BossDefinition, EnemySpawn, MissionTemplate, ObjectiveTemplate, TargetSpec,
};
use crate::scenario::types::{
    Atmosphere, Briefing, DefeatCondition, DefeatKind, Difficulty, DoomEvent, DoomEventType,
    Scenario, ScenarioObjective, Theme, TileSet, VictoryCondition,
};

/// Generates one complete scenario for a difficulty.
pub fn generate_random_scenario(difficulty: Difficulty, rng: &mut impl Rng) -> Scenario {
    let templates = mission_templates_for(difficulty);
    let template = match templates.choose(rng) {
        Some(t) => t.clone(),
        // Catalog data guarantees a non-empty pool; this arm is unreachable
        // with shipped data but keeps the function total.
        None => crate::missions::data::all_mission_templates().swap_remove(0),
    };
    generate_from_template(&template, difficulty, rng)
}

/// Generates `n` scenarios, tracking used mission ids to bias the pool
/// toward victory-type diversity. Best effort, not a hard guarantee.
pub fn generate_scenario_pool(
    difficulty: Difficulty,
    n: usize,
    rng: &mut impl Rng,
) -> Vec<Scenario> {
    let mut used: HashSet<&'static str> = HashSet::new();
    let mut pool = Vec::with_capacity(n);

    for _ in 0..n {
        let templates = mission_templates_for(difficulty);
        let unused: Vec<MissionTemplate> = templates
            .iter()
            .filter(|t| !used.contains(t.id))
            .cloned()
            .collect();
        let candidates = if unused.is_empty() {
            used.clear();
            templates
        } else {
            unused
        };
        let template = match candidates.choose(rng) {
            Some(t) => t.clone(),
            None => continue,
        };
        used.insert(template.id);
        pool.push(generate_from_template(&template, difficulty, rng));
    }
    pool
}

/// Expands a specific template into a concrete scenario.
pub fn generate_from_template(
    template: &MissionTemplate,
    difficulty: Difficulty,
    rng: &mut impl Rng,
) -> Scenario {
    let theme = choose_theme(template.tile_set, rng);
    let atmosphere = theme.atmosphere();
    let tile_set = if template.tile_set == TileSet::Mixed {
        theme.tile_set()
    } else {
        template.tile_set
    };
    let start_location = choose_start_location(tile_set, atmosphere, rng);
    let start_doom = template.base_doom.pick(difficulty) + atmosphere_doom_adjustment(atmosphere);

    // A boss is drawn once so the kill objective, the confrontation tile,
    // and the spawn event all agree on who it is.
    let boss = if template
        .objectives
        .iter()
        .any(|o| matches!(o.target, TargetSpec::Boss | TargetSpec::ConfrontationTile))
    {
        bosses_for(difficulty).choose(rng).copied()
    } else {
        None
    };

    let mut key_to_id: HashMap<&'static str, String> = HashMap::new();
    for (index, objective) in template.objectives.iter().enumerate() {
        key_to_id.insert(objective.key, format!("obj-{}", index + 1));
    }

    let mut objectives: Vec<ScenarioObjective> = template
        .objectives
        .iter()
        .map(|ot| expand_objective(ot, &key_to_id, difficulty, boss.as_ref(), rng))
        .collect();

    if rng.gen::<f64>() < bonus_objective_chance(difficulty) {
        let bonuses = bonus_objective_templates();
        if let Some(bonus) = bonuses.choose(rng) {
            let id = format!("obj-{}", objectives.len() + 1);
            let mut keyed = key_to_id.clone();
            keyed.insert(bonus.key, id);
            objectives.push(expand_objective(bonus, &keyed, difficulty, boss.as_ref(), rng));
        }
    }

    let victory_conditions = vec![VictoryCondition {
        condition_type: template.victory_type,
        description: template.victory.description.to_string(),
        required_objectives: template
            .victory
            .required
            .iter()
            .filter_map(|key| key_to_id.get(key).cloned())
            .collect(),
    }];

    let defeat_conditions = build_defeat_conditions(template);
    let doom_events = build_doom_events(template, difficulty, atmosphere, start_doom, boss.as_ref(), rng);

    let title = synthesize_title(theme, rng);
    let briefing = synthesize_briefing(template, theme, rng);

    let scenario = Scenario {
        id: Uuid::new_v4().to_string(),
        title,
        briefing,
        difficulty,
        theme,
        tile_set,
        start_location,
        victory_type: template.victory_type,
        start_doom,
        doom_on_death: doom_on_death(difficulty),
        doom_on_survivor_rescue: doom_on_survivor_rescue(difficulty),
        objectives,
        victory_conditions,
        defeat_conditions,
        doom_events,
    };

    debug!(
        mission = template.id,
        scenario = %scenario.id,
        theme = ?theme,
        start_doom,
        "generated scenario"
    );
    scenario
}

fn choose_theme(tile_set: TileSet, rng: &mut impl Rng) -> Theme {
    let themes = crate::missions::data::themes_for(tile_set);
    themes.choose(rng).copied().unwrap_or(Theme::Mansion)
}

fn choose_start_location(tile_set: TileSet, atmosphere: Atmosphere, rng: &mut impl Rng) -> String {
    let locations = locations_for(tile_set, atmosphere);
    locations
        .choose(rng)
        .map(|l| l.name.to_string())
        .unwrap_or_else(|| "Blackwood Manor".to_string())
}

fn bonus_objective_chance(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Normal => BONUS_OBJECTIVE_CHANCE_NORMAL,
        Difficulty::Hard => BONUS_OBJECTIVE_CHANCE_HARD,
        Difficulty::Nightmare => BONUS_OBJECTIVE_CHANCE_NIGHTMARE,
    }
}

fn doom_on_death(difficulty: Difficulty) -> i32 {
    match difficulty {
        Difficulty::Normal => DOOM_ON_DEATH_NORMAL,
        Difficulty::Hard => DOOM_ON_DEATH_HARD,
        Difficulty::Nightmare => DOOM_ON_DEATH_NIGHTMARE,
    }
}

fn doom_on_survivor_rescue(difficulty: Difficulty) -> i32 {
    match difficulty {
        Difficulty::Normal => DOOM_ON_RESCUE_NORMAL,
        Difficulty::Hard => DOOM_ON_RESCUE_HARD,
        Difficulty::Nightmare => DOOM_ON_RESCUE_NIGHTMARE,
    }
}

fn expand_objective(
    template: &ObjectiveTemplate,
    key_to_id: &HashMap<&'static str, String>,
    difficulty: Difficulty,
    boss: Option<&BossDefinition>,
    rng: &mut impl Rng,
) -> ScenarioObjective {
    let amount = template.amount.map(|a| a.pick(difficulty));
    let (target_id, target_display) = resolve_target(template.target, boss, rng);

    ScenarioObjective {
        id: key_to_id
            .get(template.key)
            .cloned()
            .unwrap_or_else(|| format!("obj-{}", template.key)),
        description: fill_slots(template.description, &target_display, amount),
        short_description: fill_slots(template.short_description, &target_display, amount),
        objective_type: template.objective_type,
        target_id,
        target_amount: amount,
        current_amount: 0,
        is_optional: template.is_optional,
        is_hidden: template.is_hidden,
        revealed_by: template
            .revealed_by
            .and_then(|key| key_to_id.get(key).cloned()),
        completed: false,
    }
}

/// Resolves a target spec into a concrete target id and a display name.
fn resolve_target(
    spec: TargetSpec,
    boss: Option<&BossDefinition>,
    rng: &mut impl Rng,
) -> (Option<String>, String) {
    match spec {
        TargetSpec::None => (None, String::new()),
        TargetSpec::Boss => match boss {
            Some(b) => (Some(b.boss_type.to_string()), b.name.to_string()),
            None => (Some(FALLBACK_BOSS_TYPE.to_string()), "the horror".to_string()),
        },
        TargetSpec::ExitTile => (Some("exit".to_string()), "the way out".to_string()),
        TargetSpec::AltarTile => (
            Some("ritual_altar".to_string()),
            "the ritual altar".to_string(),
        ),
        TargetSpec::ConfrontationTile => (
            Some("final_confrontation".to_string()),
            "the inner sanctum".to_string(),
        ),
        TargetSpec::NpcTile => (Some("npc_witness".to_string()), "the witness".to_string()),
        TargetSpec::KeyItem => named_item("key", &KEY_ITEM_NAMES, rng),
        TargetSpec::ClueItem => named_item("clue", &CLUE_ITEM_NAMES, rng),
        TargetSpec::ComponentItem => named_item("component", &COMPONENT_NAMES, rng),
        TargetSpec::Collectible => named_item("collectible", &COLLECTIBLE_NOUNS, rng),
    }
}

fn named_item(prefix: &str, bank: &[&str], rng: &mut impl Rng) -> (Option<String>, String) {
    let name = bank.choose(rng).copied().unwrap_or("Unmarked Relic");
    (Some(format!("{}_{}", prefix, slug(name))), name.to_string())
}

fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn fill_slots(text: &str, target_display: &str, amount: Option<u32>) -> String {
    let mut out = text.replace("{target}", target_display);
    if let Some(amount) = amount {
        out = out.replace("{amount}", &amount.to_string());
    }
    out
}

fn build_defeat_conditions(template: &MissionTemplate) -> Vec<DefeatCondition> {
    let mut conditions = vec![
        DefeatCondition {
            kind: DefeatKind::AllInvestigatorsDead,
            description: "Every investigator is dead or lost to madness.".to_string(),
            linked_objectives: Vec::new(),
        },
        DefeatCondition {
            kind: DefeatKind::DoomExhausted,
            description: "The doom track reaches zero.".to_string(),
            linked_objectives: Vec::new(),
        },
    ];
    for kind in template.extra_defeats {
        conditions.push(DefeatCondition {
            kind: *kind,
            description: defeat_description(*kind).to_string(),
            linked_objectives: Vec::new(),
        });
    }
    conditions
}

fn defeat_description(kind: DefeatKind) -> &'static str {
    match kind {
        DefeatKind::AllInvestigatorsDead => "Every investigator is dead or lost to madness.",
        DefeatKind::DoomExhausted => "The doom track reaches zero.",
        DefeatKind::ProtectedTargetDied => "The one you swore to protect is dead.",
        DefeatKind::BossEscaped => "Your quarry slips away to finish the rite elsewhere.",
    }
}

/// Builds the doom event track: an omen, then early/mid/late enemy waves
/// merged from the three pools, plus a boss entrance when the mission
/// demands one. Thresholds are strictly decreasing; the list is returned
/// sorted by threshold descending.
fn build_doom_events(
    template: &MissionTemplate,
    difficulty: Difficulty,
    atmosphere: Atmosphere,
    start_doom: i32,
    boss: Option<&BossDefinition>,
    rng: &mut impl Rng,
) -> Vec<DoomEvent> {
    let at = |fraction: f64| ((start_doom as f64 * fraction).round() as i32).max(1);

    let mut merged: Vec<EnemySpawn> = enemy_pool_for_difficulty(difficulty);
    merged.extend(enemy_pool_for_mission(template.id));
    merged.extend(enemy_pool_for_atmosphere(atmosphere));

    // Deal merged pool entries across the three waves in order; each wave
    // spawns its heaviest entry's enemy at the combined count.
    let mut waves: [Vec<EnemySpawn>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for (index, entry) in merged.into_iter().enumerate() {
        waves[index % 3].push(entry);
    }

    let mut events = Vec::new();
    let prophecy = DOOM_PROPHECIES.choose(rng).copied().unwrap_or("");
    events.push(DoomEvent {
        threshold: at(DOOM_EVENT_OMEN_FRACTION),
        event_type: DoomEventType::Omen,
        target_id: String::new(),
        amount: 0,
        message: prophecy.to_string(),
        triggered: false,
    });

    let wave_fractions = [
        DOOM_EVENT_EARLY_FRACTION,
        DOOM_EVENT_MID_FRACTION,
        DOOM_EVENT_LATE_FRACTION,
    ];
    for (wave, fraction) in waves.iter().zip(wave_fractions) {
        if wave.is_empty() {
            continue;
        }
        let total: u32 = wave.iter().map(|e| e.count).sum();
        let lead = wave
            .iter()
            .max_by_key(|e| e.count)
            .map(|e| e.enemy_id)
            .unwrap_or("cultist");
        events.push(DoomEvent {
            threshold: at(fraction),
            event_type: DoomEventType::SpawnEnemy,
            target_id: lead.to_string(),
            amount: total,
            message: format!("{} claw their way in from the dark.", enemy_display(lead)),
            triggered: false,
        });
    }

    let needs_boss = template.victory_type == crate::scenario::types::VictoryType::Assassination
        || template
            .objectives
            .iter()
            .any(|o| o.objective_type == crate::scenario::types::ObjectiveType::KillBoss);
    if needs_boss {
        let (boss_type, message) = match boss {
            Some(b) => (b.boss_type.to_string(), b.spawn_message.to_string()),
            None => (
                FALLBACK_BOSS_TYPE.to_string(),
                "Something vast notices you.".to_string(),
            ),
        };
        events.push(DoomEvent {
            threshold: at(DOOM_EVENT_BOSS_FRACTION),
            event_type: DoomEventType::SpawnBoss,
            target_id: boss_type,
            amount: 1,
            message,
            triggered: false,
        });
    }

    enforce_descending(&mut events);
    events
}

/// Sorts events by threshold descending and nudges duplicates apart so the
/// track stays strictly decreasing (floored at 1).
fn enforce_descending(events: &mut Vec<DoomEvent>) {
    events.sort_by(|a, b| b.threshold.cmp(&a.threshold));
    for i in 1..events.len() {
        if events[i].threshold >= events[i - 1].threshold {
            events[i].threshold = (events[i - 1].threshold - 1).max(1);
        }
    }
}

fn enemy_display(enemy_id: &str) -> &'static str {
    match enemy_id {
        "cultist" => "Cultists",
        "cult_guard" => "Cult guards",
        "ghoul" => "Ghouls",
        "deep_one" => "Deep ones",
        "nightgaunt" => "Nightgaunts",
        "bound_shade" => "Bound shades",
        _ => "Horrors",
    }
}

fn synthesize_title(theme: Theme, rng: &mut impl Rng) -> String {
    let pattern = TITLE_TEMPLATES.choose(rng).copied().unwrap_or("{mystery}");
    let mystery = MYSTERY_NOUNS.choose(rng).copied().unwrap_or("Whispers");
    let place = place_names(theme).choose(rng).copied().unwrap_or("the manor");
    pattern
        .replace("{mystery}", mystery)
        .replace("{place}", place)
}

fn synthesize_briefing(template: &MissionTemplate, theme: Theme, rng: &mut impl Rng) -> Briefing {
    let opening = BRIEFING_OPENINGS.choose(rng).copied().unwrap_or("");
    let place = place_names(theme).choose(rng).copied().unwrap_or("the manor");
    let prophecy = DOOM_PROPHECIES.choose(rng).copied().unwrap_or("");
    Briefing {
        description: format!("{} The Society's charge takes you to {}.", opening, place),
        goal: template.victory.description.to_string(),
        doom_prophecy: prophecy.to_string(),
    }
}
