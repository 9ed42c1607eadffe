//! The circular tile board.
//!
//! The default layout is deterministic: position 0 is Start, everything
//! else follows a repeating 8-tile pattern. Trap and portal tiles are not
//! part of the default pattern; they exist as factories for custom
//! layouts and for the event/bot logic that reasons about them.

use serde::{Deserialize, Serialize};

/// What a tile does when landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileKind {
    Start,
    Normal,
    Monster,
    Treasure,
    Trap,
    Portal,
    Event,
    Shop,
}

impl TileKind {
    pub fn name(self) -> &'static str {
        match self {
            TileKind::Start => "Start",
            TileKind::Normal => "Normal",
            TileKind::Monster => "Monster",
            TileKind::Treasure => "Treasure",
            TileKind::Trap => "Trap",
            TileKind::Portal => "Portal",
            TileKind::Event => "Event",
            TileKind::Shop => "Shop",
        }
    }
}

/// One position on the board. Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub position: i32,
    pub kind: TileKind,
    pub monster_level: i32,
    pub treasure_amount: i32,
    pub trap_damage: i32,
}

impl Tile {
    fn bare(position: i32, kind: TileKind) -> Self {
        Self {
            position,
            kind,
            monster_level: 0,
            treasure_amount: 0,
            trap_damage: 0,
        }
    }

    pub fn start(position: i32) -> Self {
        Self::bare(position, TileKind::Start)
    }

    pub fn normal(position: i32) -> Self {
        Self::bare(position, TileKind::Normal)
    }

    /// Monsters get tougher deeper into the board.
    pub fn monster(position: i32) -> Self {
        Self {
            monster_level: position / 6 + 1,
            ..Self::bare(position, TileKind::Monster)
        }
    }

    pub fn treasure(position: i32) -> Self {
        Self {
            treasure_amount: 10 + position / 3 * 5,
            ..Self::bare(position, TileKind::Treasure)
        }
    }

    pub fn trap(position: i32) -> Self {
        Self {
            trap_damage: 5 + position / 8 * 3,
            ..Self::bare(position, TileKind::Trap)
        }
    }

    pub fn portal(position: i32) -> Self {
        Self::bare(position, TileKind::Portal)
    }

    pub fn event(position: i32) -> Self {
        Self::bare(position, TileKind::Event)
    }

    pub fn shop(position: i32) -> Self {
        Self::bare(position, TileKind::Shop)
    }
}

/// A fixed-size circular sequence of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    size: i32,
    tiles: Vec<Tile>,
}

impl Board {
    /// Builds the default layout: Start at 0, then a repeating pattern
    /// keyed on `position % 8` with Shop reserved for the final tile.
    pub fn new(size: i32) -> Self {
        assert!(size > 0, "board size must be positive");
        let tiles = (0..size)
            .map(|position| {
                if position == 0 {
                    return Tile::start(position);
                }
                match position % 8 {
                    1 | 5 => Tile::monster(position),
                    3 => Tile::treasure(position),
                    6 => Tile::event(position),
                    7 if position == size - 1 => Tile::shop(position),
                    _ => Tile::normal(position),
                }
            })
            .collect();
        Self { size, tiles }
    }

    /// Builds a custom layout from explicit tiles (traps and portals are
    /// never produced by the default pattern).
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        assert!(!tiles.is_empty(), "board needs at least one tile");
        Self {
            size: tiles.len() as i32,
            tiles,
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    /// Wrap-around lookup. Holds for every integer position, negative
    /// and overflowing included.
    pub fn tile(&self, position: i32) -> &Tile {
        let index = position.rem_euclid(self.size);
        &self.tiles[index as usize]
    }
}
