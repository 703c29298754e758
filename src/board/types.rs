//! Tile records consumed from the board subsystem.
//!
//! The board owns these during play; the spawn runtime only reads them,
//! except for the single quest-tile materialization write on [`Tile::object`].

use serde::{Deserialize, Serialize};

/// Axial hex coordinate, as the board subsystem reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

/// Coarse room category assigned by the board generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileCategory {
    Foyer,
    Corridor,
    Study,
    Library,
    Cellar,
    Crypt,
    Chapel,
    RitualChamber,
    Bedroom,
    Kitchen,
    Attic,
    Garden,
    Gate,
    Shore,
    Woods,
    Generic,
}

/// Function a tile takes on when a quest tile materializes onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileObjectKind {
    Exit,
    Altar,
    Npc,
}

/// Object placed on a tile by quest-tile materialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileObject {
    pub kind: TileObjectKind,
    pub name: String,
}

/// One explorable tile as reported by the board subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: String,
    pub coord: AxialCoord,
    pub category: TileCategory,
    /// Free-text display name ("Flooded Cellar"), used only for affinity scoring.
    pub name: String,
    /// Floor index; 0 is ground level, positive is up, negative is below.
    pub floor: i32,
    pub explored: bool,
    pub searchable: bool,
    pub items: Vec<String>,
    pub object: Option<TileObject>,
}

impl Tile {
    pub fn new(id: impl Into<String>, category: TileCategory, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            coord: AxialCoord { q: 0, r: 0 },
            category,
            name: name.into(),
            floor: 0,
            explored: false,
            searchable: true,
            items: Vec::new(),
            object: None,
        }
    }

    /// Whether a quest item may spawn here: explored, searchable, not a
    /// corridor, and not already carrying a quest object.
    pub fn is_spawn_candidate(&self) -> bool {
        self.explored
            && self.searchable
            && self.category != TileCategory::Corridor
            && self.object.is_none()
    }
}
