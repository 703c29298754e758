//! The mission catalog: templates, pools, and narrative text banks.
//!
//! Pure data plus total lookup functions. Every lookup has a defined
//! fallback; nothing here rolls dice or mutates anything.

#![allow(dead_code)]

use super::types::{
    BossDefinition, EnemySpawn, FloorPreference, LocationDef, MissionTemplate, ObjectiveTemplate,
    PerDifficulty, TargetSpec, TilePreferences, VictoryTemplate,
};
use crate::board::types::TileCategory;
use crate::scenario::types::{
    Atmosphere, DefeatKind, Difficulty, ObjectiveType, Theme, TileSet, VictoryType,
};

// =============================================================================
// NARRATIVE TEXT BANKS
// =============================================================================

/// Antagonist and victim names for title/briefing synthesis.
pub const TARGET_NAMES: [&str; 8] = [
    "Ezra Whateley",
    "Mother Hirsch",
    "Doctor Valen",
    "Silas Crane",
    "Abigail Marsh",
    "The Gray Deacon",
    "Cornelius Ash",
    "Sister Vesper",
];

/// Abstract dreads slotted into `{mystery}` title templates.
pub const MYSTERY_NOUNS: [&str; 8] = [
    "Whispers",
    "Hunger",
    "Silence",
    "Reckoning",
    "Harvest",
    "Drowning",
    "Vigil",
    "Unraveling",
];

/// Title patterns. `{mystery}` and `{place}` are substituted at generation.
pub const TITLE_TEMPLATES: [&str; 6] = [
    "The {mystery} of {place}",
    "Shadows over {place}",
    "The {mystery} Below",
    "What Waits at {place}",
    "A {mystery} Unending",
    "The Last Light of {place}",
];

pub const BRIEFING_OPENINGS: [&str; 5] = [
    "The letters stopped coming three weeks ago.",
    "No one in town will speak of what happened there.",
    "The survivors' accounts agree on only one thing: the lights went out all at once.",
    "You were warned not to come, which is precisely why you did.",
    "The church bells rang at midnight, though the tower has no bell.",
];

pub const DOOM_PROPHECIES: [&str; 5] = [
    "When the last candle gutters, the door opens from the other side.",
    "The stars wheel toward an alignment that will not wait for you.",
    "Every hour you linger, the veil wears thinner.",
    "It is already awake. It is merely deciding.",
    "The dark keeps its own ledger, and the ledger is nearly balanced.",
];

/// Vocabulary for collection objectives.
pub const COLLECTIBLE_NOUNS: [&str; 5] = [
    "Wax Effigy",
    "Bone Charm",
    "Leaden Seal",
    "Votive Idol",
    "Graven Tablet",
];

pub const KEY_ITEM_NAMES: [&str; 4] = [
    "Tarnished Silver Key",
    "Warden's Iron Key",
    "Sexton's Ring of Keys",
    "Scrimshaw Key",
];

pub const CLUE_ITEM_NAMES: [&str; 5] = [
    "Bloodstained Journal",
    "Torn Letter",
    "Cipher Page",
    "Marked Survey Map",
    "Confession Fragment",
];

pub const COMPONENT_NAMES: [&str; 5] = [
    "Black Candle",
    "Grave Dust",
    "Silver Chalice",
    "Binding Cord",
    "Salt of the Old Sea",
];

/// Place names per theme, for titles and start locations' flavor.
pub fn place_names(theme: Theme) -> &'static [&'static str] {
    match theme {
        Theme::Mansion => &["Blackwood Manor", "Carrow House", "Hollyhock Hall"],
        Theme::Asylum => &["Danforth Asylum", "Saint Jude's Sanatorium"],
        Theme::Chapel => &["the Veiled Chapel", "Whitmore Parish"],
        Theme::Village => &["Ashfield", "Harlow's Crossing"],
        Theme::Forest => &["the Witchwood", "Marrow Fen"],
        Theme::Crypt => &["the Hollow Crypt", "the Ossuary of Wren"],
        Theme::Harbor => &["Innsport Quay", "the Drowned Market"],
        Theme::Lighthouse => &["Gull Point Light", "the Lantern Rock"],
    }
}

// =============================================================================
// MISSION TEMPLATES
// =============================================================================

/// All mission templates. At least one per victory type.
pub fn all_mission_templates() -> Vec<MissionTemplate> {
    vec![
        MissionTemplate {
            id: "last_door",
            name: "The Last Door",
            victory_type: VictoryType::Escape,
            tile_set: TileSet::Indoor,
            base_doom: PerDifficulty::of(10, 10, 10),
            min_difficulty: None,
            objectives: vec![
                ObjectiveTemplate {
                    key: "key",
                    objective_type: ObjectiveType::FindItem,
                    description: "Find the {target} before the house seals itself",
                    short_description: "Find the {target}",
                    target: TargetSpec::KeyItem,
                    amount: None,
                    is_optional: false,
                    is_hidden: false,
                    revealed_by: None,
                },
                ObjectiveTemplate {
                    key: "way_out",
                    objective_type: ObjectiveType::Escape,
                    description: "Unlock the way out and get everyone through it",
                    short_description: "Escape",
                    target: TargetSpec::ExitTile,
                    amount: None,
                    is_optional: false,
                    is_hidden: true,
                    revealed_by: Some("key"),
                },
            ],
            victory: VictoryTemplate {
                description: "Escape with every surviving investigator",
                required: &["key", "way_out"],
            },
            extra_defeats: &[],
        },
        MissionTemplate {
            id: "silence_the_priest",
            name: "Silence the Priest",
            victory_type: VictoryType::Assassination,
            tile_set: TileSet::Indoor,
            base_doom: PerDifficulty::of(10, 12, 14),
            min_difficulty: None,
            objectives: vec![
                ObjectiveTemplate {
                    key: "whispers",
                    objective_type: ObjectiveType::FindItem,
                    description: "Uncover proof of where {target} holds the rite",
                    short_description: "Find the {target}",
                    target: TargetSpec::ClueItem,
                    amount: None,
                    is_optional: false,
                    is_hidden: false,
                    revealed_by: None,
                },
                ObjectiveTemplate {
                    key: "lair",
                    objective_type: ObjectiveType::FindTile,
                    description: "Locate the inner sanctum",
                    short_description: "Find the sanctum",
                    target: TargetSpec::ConfrontationTile,
                    amount: None,
                    is_optional: false,
                    is_hidden: true,
                    revealed_by: Some("whispers"),
                },
                ObjectiveTemplate {
                    key: "strike",
                    objective_type: ObjectiveType::KillBoss,
                    description: "Put an end to {target}",
                    short_description: "Kill {target}",
                    target: TargetSpec::Boss,
                    amount: None,
                    is_optional: false,
                    is_hidden: true,
                    revealed_by: Some("lair"),
                },
            ],
            victory: VictoryTemplate {
                description: "Destroy the one who leads the rite",
                required: &["whispers", "lair", "strike"],
            },
            extra_defeats: &[DefeatKind::BossEscaped],
        },
        MissionTemplate {
            id: "the_long_night",
            name: "The Long Night",
            victory_type: VictoryType::Survival,
            tile_set: TileSet::Mixed,
            base_doom: PerDifficulty::of(12, 15, 20),
            min_difficulty: None,
            objectives: vec![ObjectiveTemplate {
                key: "hold_out",
                objective_type: ObjectiveType::Survive,
                description: "Hold out for {amount} rounds until dawn",
                short_description: "Survive {amount} rounds",
                target: TargetSpec::None,
                amount: Some(PerDifficulty::of(8, 10, 12)),
                is_optional: false,
                is_hidden: false,
                revealed_by: None,
            }],
            victory: VictoryTemplate {
                description: "Live to see the sun rise",
                required: &["hold_out"],
            },
            extra_defeats: &[],
        },
        MissionTemplate {
            id: "gathering_shadows",
            name: "Gathering Shadows",
            victory_type: VictoryType::Collection,
            tile_set: TileSet::Indoor,
            base_doom: PerDifficulty::of(12, 15, 20),
            min_difficulty: None,
            objectives: vec![
                ObjectiveTemplate {
                    key: "relics",
                    objective_type: ObjectiveType::Collect,
                    description: "Gather {amount} of the scattered {target}s",
                    short_description: "Collect {amount} {target}s",
                    target: TargetSpec::Collectible,
                    amount: Some(PerDifficulty::of(5, 6, 7)),
                    is_optional: false,
                    is_hidden: false,
                    revealed_by: None,
                },
                ObjectiveTemplate {
                    key: "sweep",
                    objective_type: ObjectiveType::Explore,
                    description: "Sweep {amount} rooms for anything the cult left behind",
                    short_description: "Explore {amount} rooms",
                    target: TargetSpec::None,
                    amount: Some(PerDifficulty::of(8, 8, 10)),
                    is_optional: true,
                    is_hidden: false,
                    revealed_by: None,
                },
            ],
            victory: VictoryTemplate {
                description: "Recover every token before they are used against you",
                required: &["relics"],
            },
            extra_defeats: &[],
        },
        MissionTemplate {
            id: "rite_of_binding",
            name: "The Rite of Binding",
            victory_type: VictoryType::Ritual,
            tile_set: TileSet::Indoor,
            base_doom: PerDifficulty::of(13, 14, 19),
            min_difficulty: Some(Difficulty::Hard),
            objectives: vec![
                ObjectiveTemplate {
                    key: "components",
                    objective_type: ObjectiveType::Collect,
                    description: "Assemble {amount} components of the binding rite",
                    short_description: "Collect {amount} components",
                    target: TargetSpec::ComponentItem,
                    amount: Some(PerDifficulty::of(3, 3, 4)),
                    is_optional: false,
                    is_hidden: false,
                    revealed_by: None,
                },
                ObjectiveTemplate {
                    key: "altar",
                    objective_type: ObjectiveType::FindTile,
                    description: "Find the altar where the rite must be spoken",
                    short_description: "Find the altar",
                    target: TargetSpec::AltarTile,
                    amount: None,
                    is_optional: false,
                    is_hidden: true,
                    revealed_by: Some("components"),
                },
                ObjectiveTemplate {
                    key: "rite",
                    objective_type: ObjectiveType::Ritual,
                    description: "Perform the binding before the veil gives way",
                    short_description: "Perform the rite",
                    target: TargetSpec::None,
                    amount: None,
                    is_optional: false,
                    is_hidden: true,
                    revealed_by: Some("altar"),
                },
            ],
            victory: VictoryTemplate {
                description: "Bind what is stirring beneath the floor",
                required: &["components", "altar", "rite"],
            },
            extra_defeats: &[],
        },
        MissionTemplate {
            id: "whispers_in_the_fog",
            name: "Whispers in the Fog",
            victory_type: VictoryType::Investigation,
            tile_set: TileSet::Mixed,
            base_doom: PerDifficulty::of(12, 13, 18),
            min_difficulty: None,
            objectives: vec![
                ObjectiveTemplate {
                    key: "testimonies",
                    objective_type: ObjectiveType::Collect,
                    description: "Piece together {amount} accounts of the disappearances",
                    short_description: "Collect {amount} accounts",
                    target: TargetSpec::ClueItem,
                    amount: Some(PerDifficulty::of(3, 4, 5)),
                    is_optional: false,
                    is_hidden: false,
                    revealed_by: None,
                },
                ObjectiveTemplate {
                    key: "witness",
                    objective_type: ObjectiveType::FindTile,
                    description: "Find the last witness before the fog takes them",
                    short_description: "Find the witness",
                    target: TargetSpec::NpcTile,
                    amount: None,
                    is_optional: false,
                    is_hidden: false,
                    revealed_by: None,
                },
                ObjectiveTemplate {
                    key: "survey",
                    objective_type: ObjectiveType::Explore,
                    description: "Map {amount} tiles of the afflicted quarter",
                    short_description: "Explore {amount} tiles",
                    target: TargetSpec::None,
                    amount: Some(PerDifficulty::of(8, 10, 12)),
                    is_optional: true,
                    is_hidden: false,
                    revealed_by: None,
                },
            ],
            victory: VictoryTemplate {
                description: "Learn what walks in the fog, and name it",
                required: &["testimonies", "witness"],
            },
            extra_defeats: &[],
        },
    ]
}

/// Templates a difficulty may draw from. Never empty: every difficulty has
/// at least the unrestricted templates.
pub fn mission_templates_for(difficulty: Difficulty) -> Vec<MissionTemplate> {
    all_mission_templates()
        .into_iter()
        .filter(|t| t.allows(difficulty))
        .collect()
}

/// Bonus objectives optionally attached by the generator. Always optional.
pub fn bonus_objective_templates() -> Vec<ObjectiveTemplate> {
    vec![
        ObjectiveTemplate {
            key: "bonus_records",
            objective_type: ObjectiveType::Collect,
            description: "Recover {amount} forgotten records for the Society archive",
            short_description: "Recover {amount} records",
            target: TargetSpec::ClueItem,
            amount: Some(PerDifficulty::of(2, 2, 2)),
            is_optional: true,
            is_hidden: false,
            revealed_by: None,
        },
        ObjectiveTemplate {
            key: "bonus_grounds",
            objective_type: ObjectiveType::Explore,
            description: "Chart {amount} tiles of the grounds",
            short_description: "Explore {amount} tiles",
            target: TargetSpec::None,
            amount: Some(PerDifficulty::of(8, 8, 8)),
            is_optional: true,
            is_hidden: false,
            revealed_by: None,
        },
        ObjectiveTemplate {
            key: "bonus_survivor",
            objective_type: ObjectiveType::Interact,
            description: "Lead a stranded survivor back to the entrance",
            short_description: "Rescue the survivor",
            target: TargetSpec::NpcTile,
            amount: None,
            is_optional: true,
            is_hidden: false,
            revealed_by: None,
        },
    ]
}

// =============================================================================
// ENEMY AND BOSS POOLS
// =============================================================================

pub fn enemy_pool_for_difficulty(difficulty: Difficulty) -> Vec<EnemySpawn> {
    match difficulty {
        Difficulty::Normal => vec![
            EnemySpawn { enemy_id: "cultist", count: 2 },
            EnemySpawn { enemy_id: "ghoul", count: 1 },
        ],
        Difficulty::Hard => vec![
            EnemySpawn { enemy_id: "cultist", count: 2 },
            EnemySpawn { enemy_id: "ghoul", count: 2 },
            EnemySpawn { enemy_id: "deep_one", count: 1 },
        ],
        Difficulty::Nightmare => vec![
            EnemySpawn { enemy_id: "ghoul", count: 2 },
            EnemySpawn { enemy_id: "deep_one", count: 2 },
            EnemySpawn { enemy_id: "nightgaunt", count: 1 },
        ],
    }
}

/// Mission-specific reinforcements. Unknown ids get an empty pool.
pub fn enemy_pool_for_mission(mission_id: &str) -> Vec<EnemySpawn> {
    match mission_id {
        "silence_the_priest" => vec![EnemySpawn { enemy_id: "cult_guard", count: 1 }],
        "the_long_night" => vec![EnemySpawn { enemy_id: "ghoul", count: 1 }],
        "rite_of_binding" => vec![EnemySpawn { enemy_id: "bound_shade", count: 1 }],
        _ => Vec::new(),
    }
}

pub fn enemy_pool_for_atmosphere(atmosphere: Atmosphere) -> Vec<EnemySpawn> {
    match atmosphere {
        Atmosphere::Occult => vec![EnemySpawn { enemy_id: "cultist", count: 1 }],
        Atmosphere::Decay => vec![EnemySpawn { enemy_id: "ghoul", count: 1 }],
        Atmosphere::Madness => vec![EnemySpawn { enemy_id: "nightgaunt", count: 1 }],
        Atmosphere::Cosmic => vec![EnemySpawn { enemy_id: "deep_one", count: 1 }],
    }
}

pub fn boss_pool() -> Vec<BossDefinition> {
    vec![
        BossDefinition {
            boss_type: "high_priest",
            name: "The High Priest",
            spawn_message: "The High Priest steps out of the incense smoke, smiling like an old friend.",
            min_difficulty: Difficulty::Normal,
        },
        BossDefinition {
            boss_type: "shambling_mass",
            name: "The Shambling Mass",
            spawn_message: "The floorboards burst, and what comes up was several people once.",
            min_difficulty: Difficulty::Normal,
        },
        BossDefinition {
            boss_type: "pale_surgeon",
            name: "The Pale Surgeon",
            spawn_message: "A figure in a stained apron unrolls its instruments without hurry.",
            min_difficulty: Difficulty::Hard,
        },
        BossDefinition {
            boss_type: "widow_of_the_deep",
            name: "The Widow of the Deep",
            spawn_message: "Salt water sheets from the ceiling. She has come up to meet you.",
            min_difficulty: Difficulty::Hard,
        },
        BossDefinition {
            boss_type: "hunting_horror",
            name: "The Hunting Horror",
            spawn_message: "The dark between the rafters uncoils and takes wing.",
            min_difficulty: Difficulty::Nightmare,
        },
        BossDefinition {
            boss_type: "herald_of_the_void",
            name: "The Herald of the Void",
            spawn_message: "The candles bend toward a shape that is not entirely here yet.",
            min_difficulty: Difficulty::Nightmare,
        },
    ]
}

/// Bosses available at a difficulty. Never empty: Normal-tier bosses
/// remain in the pool at every difficulty.
pub fn bosses_for(difficulty: Difficulty) -> Vec<BossDefinition> {
    boss_pool()
        .into_iter()
        .filter(|b| b.min_difficulty <= difficulty)
        .collect()
}

// =============================================================================
// LOCATIONS
// =============================================================================

pub fn all_locations() -> Vec<LocationDef> {
    vec![
        LocationDef { name: "Blackwood Manor", tile_set: TileSet::Indoor, atmosphere: Atmosphere::Madness, category: TileCategory::Foyer },
        LocationDef { name: "Danforth Asylum", tile_set: TileSet::Indoor, atmosphere: Atmosphere::Madness, category: TileCategory::Foyer },
        LocationDef { name: "Chapel of the Veiled", tile_set: TileSet::Indoor, atmosphere: Atmosphere::Occult, category: TileCategory::Chapel },
        LocationDef { name: "The Hollow Crypt", tile_set: TileSet::Indoor, atmosphere: Atmosphere::Occult, category: TileCategory::Crypt },
        LocationDef { name: "Ashfield Village", tile_set: TileSet::Mixed, atmosphere: Atmosphere::Decay, category: TileCategory::Gate },
        LocationDef { name: "The Witchwood", tile_set: TileSet::Outdoor, atmosphere: Atmosphere::Decay, category: TileCategory::Woods },
        LocationDef { name: "Marrow Fen", tile_set: TileSet::Outdoor, atmosphere: Atmosphere::Decay, category: TileCategory::Woods },
        LocationDef { name: "Innsport Quay", tile_set: TileSet::Mixed, atmosphere: Atmosphere::Cosmic, category: TileCategory::Shore },
        LocationDef { name: "Gull Point Light", tile_set: TileSet::Mixed, atmosphere: Atmosphere::Cosmic, category: TileCategory::Gate },
    ]
}

/// Start locations matching a tile set and atmosphere. Falls back to
/// tile-set-only matches, then to the whole list; never empty.
pub fn locations_for(tile_set: TileSet, atmosphere: Atmosphere) -> Vec<LocationDef> {
    let fits = |loc: &LocationDef| {
        loc.tile_set == tile_set || loc.tile_set == TileSet::Mixed || tile_set == TileSet::Mixed
    };
    let exact: Vec<LocationDef> = all_locations()
        .into_iter()
        .filter(|l| fits(l) && l.atmosphere == atmosphere)
        .collect();
    if !exact.is_empty() {
        return exact;
    }
    let by_set: Vec<LocationDef> = all_locations().into_iter().filter(fits).collect();
    if !by_set.is_empty() {
        return by_set;
    }
    all_locations()
}

/// Themes compatible with a mission's tile set.
pub fn themes_for(tile_set: TileSet) -> Vec<Theme> {
    Theme::ALL
        .into_iter()
        .filter(|t| {
            tile_set == TileSet::Mixed
                || t.tile_set() == tile_set
                || t.tile_set() == TileSet::Mixed
        })
        .collect()
}

// =============================================================================
// THEME TILE PREFERENCES
// =============================================================================

/// Preferences for themes without a bespoke entry.
pub const DEFAULT_TILE_PREFERENCES: TilePreferences = TilePreferences {
    preferred_names: &[],
    avoided_names: &[],
    preferred_categories: &[TileCategory::Generic],
    floor_preference: FloorPreference::Any,
};

/// Tile preferences per theme. Total: themes without a bespoke entry get
/// [`DEFAULT_TILE_PREFERENCES`].
pub fn tile_preferences(theme: Theme) -> TilePreferences {
    match theme {
        Theme::Mansion => TilePreferences {
            preferred_names: &["Study", "Library", "Cellar"],
            avoided_names: &["Garden"],
            preferred_categories: &[
                TileCategory::Study,
                TileCategory::Library,
                TileCategory::Cellar,
            ],
            floor_preference: FloorPreference::Ground,
        },
        Theme::Chapel | Theme::Crypt => TilePreferences {
            preferred_names: &["Chancel", "Ossuary", "Reliquary"],
            avoided_names: &["Kitchen"],
            preferred_categories: &[
                TileCategory::Chapel,
                TileCategory::Crypt,
                TileCategory::RitualChamber,
            ],
            floor_preference: FloorPreference::Below,
        },
        Theme::Forest => TilePreferences {
            preferred_names: &["Clearing", "Hollow"],
            avoided_names: &["Foyer"],
            preferred_categories: &[TileCategory::Woods, TileCategory::Garden],
            floor_preference: FloorPreference::Ground,
        },
        Theme::Harbor | Theme::Lighthouse => TilePreferences {
            preferred_names: &["Quay", "Boathouse"],
            avoided_names: &["Crypt"],
            preferred_categories: &[TileCategory::Shore, TileCategory::Gate],
            floor_preference: FloorPreference::Ground,
        },
        _ => DEFAULT_TILE_PREFERENCES,
    }
}

/// Flat doom adjustment a theme's atmosphere applies to the template base.
/// Only ever zero or positive so it can never push a template under budget.
pub fn atmosphere_doom_adjustment(atmosphere: Atmosphere) -> i32 {
    match atmosphere {
        Atmosphere::Cosmic => 1,
        _ => 0,
    }
}
