//! Scenario data structures.
//!
//! A [`Scenario`] is assembled by the generator, proven by the validator,
//! and immutable narrative/structural data afterwards; during play only
//! objective progress and doom-event `triggered` flags change.

use serde::{Deserialize, Serialize};

/// Scenario difficulty. Ordering matters: templates may declare a minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Normal,
    Hard,
    Nightmare,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Normal, Difficulty::Hard, Difficulty::Nightmare];

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Nightmare => "Nightmare",
        }
    }
}

/// How a scenario is won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VictoryType {
    Escape,
    Assassination,
    Survival,
    Collection,
    Ritual,
    Investigation,
}

/// What a single objective asks of the investigators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveType {
    FindItem,
    Collect,
    FindTile,
    Escape,
    KillEnemy,
    KillBoss,
    Survive,
    Explore,
    Interact,
    Ritual,
    Protect,
    Escort,
}

impl ObjectiveType {
    /// Objective types completed by picking up quest items.
    pub fn is_item_driven(&self) -> bool {
        matches!(self, ObjectiveType::FindItem | ObjectiveType::Collect)
    }

    /// Objective types completed by reaching or using a quest tile.
    pub fn is_tile_driven(&self) -> bool {
        matches!(self, ObjectiveType::FindTile | ObjectiveType::Escape)
    }
}

/// Which half of the board a scenario plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileSet {
    Indoor,
    Outdoor,
    Mixed,
}

/// Mood bucket a theme belongs to; drives enemy pools and doom adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Atmosphere {
    Occult,
    Decay,
    Madness,
    Cosmic,
}

/// Scenario setting. Each theme carries an atmosphere and a tile set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    Mansion,
    Asylum,
    Chapel,
    Village,
    Forest,
    Crypt,
    Harbor,
    Lighthouse,
}

impl Theme {
    pub const ALL: [Theme; 8] = [
        Theme::Mansion,
        Theme::Asylum,
        Theme::Chapel,
        Theme::Village,
        Theme::Forest,
        Theme::Crypt,
        Theme::Harbor,
        Theme::Lighthouse,
    ];

    pub fn atmosphere(&self) -> Atmosphere {
        match self {
            Theme::Mansion | Theme::Asylum => Atmosphere::Madness,
            Theme::Chapel | Theme::Crypt => Atmosphere::Occult,
            Theme::Village | Theme::Forest => Atmosphere::Decay,
            Theme::Harbor | Theme::Lighthouse => Atmosphere::Cosmic,
        }
    }

    pub fn tile_set(&self) -> TileSet {
        match self {
            Theme::Mansion | Theme::Asylum | Theme::Chapel | Theme::Crypt => TileSet::Indoor,
            Theme::Forest => TileSet::Outdoor,
            Theme::Village | Theme::Harbor | Theme::Lighthouse => TileSet::Mixed,
        }
    }
}

/// One concrete objective inside a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioObjective {
    pub id: String,
    pub description: String,
    pub short_description: String,
    pub objective_type: ObjectiveType,
    pub target_id: Option<String>,
    pub target_amount: Option<u32>,
    pub current_amount: u32,
    pub is_optional: bool,
    pub is_hidden: bool,
    /// Id of the objective whose completion reveals this one.
    pub revealed_by: Option<String>,
    pub completed: bool,
}

impl ScenarioObjective {
    /// Target amount with missing treated as one unit of work.
    pub fn target(&self) -> u32 {
        self.target_amount.unwrap_or(1).max(1)
    }

    /// Units beyond the base cost for round estimation (absent = zero).
    pub fn units(&self) -> u32 {
        self.target_amount.unwrap_or(0)
    }
}

/// What a doom event does when its threshold is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoomEventType {
    SpawnEnemy,
    SpawnBoss,
    /// Message-only event; atmosphere, no spawns.
    Omen,
}

/// Threshold-keyed event fired once as doom descends past its value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoomEvent {
    pub threshold: i32,
    pub event_type: DoomEventType,
    pub target_id: String,
    pub amount: u32,
    pub message: String,
    pub triggered: bool,
}

/// Victory condition: a victory type plus the objectives that must complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VictoryCondition {
    pub condition_type: VictoryType,
    pub description: String,
    pub required_objectives: Vec<String>,
}

/// Ways a scenario is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefeatKind {
    AllInvestigatorsDead,
    DoomExhausted,
    ProtectedTargetDied,
    BossEscaped,
}

/// Defeat condition: a kind plus any objectives it is linked to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefeatCondition {
    pub kind: DefeatKind,
    pub description: String,
    pub linked_objectives: Vec<String>,
}

/// Narrative text exposed verbatim to the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub description: String,
    pub goal: String,
    pub doom_prophecy: String,
}

/// A complete, concrete scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub briefing: Briefing,
    pub difficulty: Difficulty,
    pub theme: Theme,
    pub tile_set: TileSet,
    pub start_location: String,
    pub victory_type: VictoryType,
    pub start_doom: i32,
    pub doom_on_death: i32,
    pub doom_on_survivor_rescue: i32,
    pub objectives: Vec<ScenarioObjective>,
    pub victory_conditions: Vec<VictoryCondition>,
    pub defeat_conditions: Vec<DefeatCondition>,
    /// Invariant: sorted by threshold descending.
    pub doom_events: Vec<DoomEvent>,
}

impl Scenario {
    /// Look up an objective by id.
    pub fn objective(&self, id: &str) -> Option<&ScenarioObjective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// Non-optional objectives.
    pub fn required_objectives(&self) -> impl Iterator<Item = &ScenarioObjective> {
        self.objectives.iter().filter(|o| !o.is_optional)
    }

    /// Highest survival round target among `survive` objectives, if any.
    pub fn survival_rounds_required(&self) -> Option<u32> {
        self.objectives
            .iter()
            .filter(|o| o.objective_type == ObjectiveType::Survive)
            .map(|o| o.target())
            .max()
    }

    /// Whether any objective demands a boss kill.
    pub fn requires_boss(&self) -> bool {
        self.victory_type == VictoryType::Assassination
            || self
                .objectives
                .iter()
                .any(|o| o.objective_type == ObjectiveType::KillBoss)
    }

    /// Whether at least one `spawn_boss` doom event exists.
    pub fn has_boss_spawn(&self) -> bool {
        self.doom_events
            .iter()
            .any(|e| e.event_type == DoomEventType::SpawnBoss)
    }
}

/// Fires every not-yet-triggered event whose threshold doom has reached,
/// marking each as triggered. Each event fires exactly once; the returned
/// list keeps the descending threshold order.
pub fn due_doom_events(events: &mut [DoomEvent], doom: i32) -> Vec<DoomEvent> {
    let mut fired = Vec::new();
    for event in events.iter_mut() {
        if !event.triggered && doom <= event.threshold {
            event.triggered = true;
            fired.push(event.clone());
        }
    }
    fired
}
