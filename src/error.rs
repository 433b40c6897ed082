use thiserror::Error;

use crate::types::TilePos;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("maze layout is empty")]
    EmptyLayout,

    #[error("maze row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("maze layout has no '{0}' spawn marker")]
    MissingSpawn(char),

    #[error("pellet at ({}, {}) is unreachable from the player spawn", .0.row, .0.col)]
    UnreachablePellet(TilePos),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid maze: {0}")]
    Maze(#[from] MazeError),
}
