//! Interface types shared with the board/tile subsystem.

pub mod types;

pub use types::{AxialCoord, Tile, TileCategory, TileObject, TileObjectKind};
