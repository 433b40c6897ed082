use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Fixed turn priority. Every tie between equally good exits is broken by
    /// the position of the direction in this list.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn is_perpendicular(self, other: Direction) -> bool {
        (self.is_horizontal() && other.is_vertical())
            || (self.is_vertical() && other.is_horizontal())
    }

    pub fn priority(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|dir| *dir == self)
            .unwrap_or(Self::PRIORITY.len())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub row: i32,
    pub col: i32,
}

impl TilePos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dc, dr) = dir.vector();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    pub fn euclidean(self, other: TilePos) -> f32 {
        let dr = (self.row - other.row) as f32;
        let dc = (self.col - other.col) as f32;
        (dr * dr + dc * dc).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Wall,
    Empty,
    Pellet,
    PowerPellet,
    GhostDoor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PelletKind {
    Normal,
    Power,
}

impl PelletKind {
    pub fn points(self) -> u32 {
        match self {
            PelletKind::Normal => crate::constants::PELLET_POINTS,
            PelletKind::Power => crate::constants::POWER_PELLET_POINTS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Ghost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
    Eaten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostId {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostId {
    pub const ALL: [GhostId; 4] = [GhostId::Blinky, GhostId::Pinky, GhostId::Inky, GhostId::Clyde];

    pub fn index(self) -> usize {
        match self {
            GhostId::Blinky => 0,
            GhostId::Pinky => 1,
            GhostId::Inky => 2,
            GhostId::Clyde => 3,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub tile: TilePos,
    pub dir: Direction,
    #[serde(rename = "queuedDir")]
    pub queued_dir: Direction,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: GhostId,
    pub x: f32,
    pub y: f32,
    pub tile: TilePos,
    pub dir: Direction,
    pub mode: GhostMode,
    #[serde(rename = "targetTile")]
    pub target_tile: Option<TilePos>,
    pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PelletEaten {
        row: i32,
        col: i32,
        kind: PelletKind,
        points: u32,
    },
    FrightenedStarted {
        duration: f32,
    },
    GhostEaten {
        ghost: GhostId,
        points: u32,
    },
    PlayerCaught {
        ghost: GhostId,
    },
    PelletsCleared,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub level: u32,
    #[serde(rename = "elapsedSec")]
    pub elapsed_sec: f32,
    #[serde(rename = "pelletsRemaining")]
    pub pellets_remaining: usize,
    pub mode: GhostMode,
    #[serde(rename = "phaseIndex")]
    pub phase_index: usize,
    #[serde(rename = "frightenedRemaining")]
    pub frightened_remaining: f32,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<RuntimeEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::PRIORITY {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
        assert_eq!(Direction::None.opposite(), Direction::None);
    }

    #[test]
    fn perpendicular_requires_both_axes_set() {
        assert!(Direction::Up.is_perpendicular(Direction::Left));
        assert!(Direction::Right.is_perpendicular(Direction::Down));
        assert!(!Direction::Up.is_perpendicular(Direction::Down));
        assert!(!Direction::Left.is_perpendicular(Direction::Left));
        assert!(!Direction::None.is_perpendicular(Direction::Up));
    }

    #[test]
    fn priority_order_is_up_left_down_right() {
        assert_eq!(Direction::Up.priority(), 0);
        assert_eq!(Direction::Left.priority(), 1);
        assert_eq!(Direction::Down.priority(), 2);
        assert_eq!(Direction::Right.priority(), 3);
        assert_eq!(Direction::None.priority(), 4);
    }

    #[test]
    fn offset_follows_screen_axes() {
        let origin = TilePos::new(5, 5);
        assert_eq!(origin.offset(Direction::Up), TilePos::new(4, 5));
        assert_eq!(origin.offset(Direction::Left), TilePos::new(5, 4));
        assert_eq!(origin.offset(Direction::None), origin);
    }
}
