use crate::types::{GhostId, GhostMode};

pub const MAX_TICK_DT: f32 = 0.1;

pub const TILE_SIZE: f32 = 16.0;

pub const PELLET_POINTS: u32 = 10;
pub const POWER_PELLET_POINTS: u32 = 50;
pub const GHOST_EATEN_BASE_POINTS: u32 = 200;
pub const FRIGHTENED_CHAIN_MAX: u32 = 3;

pub const BFS_NODE_LIMIT: usize = 20_000;

pub const PINKY_LOOKAHEAD_TILES: i32 = 4;
pub const INKY_LOOKAHEAD_TILES: i32 = 2;
pub const CLYDE_SHY_DISTANCE: f32 = 8.0;

pub const CENTER_EPSILON: f32 = 1e-3;
pub const DEFAULT_CORNER_TOLERANCE: f32 = 4.0;

pub const SUB_STEP_MAX_PX: f32 = 2.0;
pub const SUB_STEP_TILE_FRACTION: f32 = 0.2;

pub const ENTITY_RADIUS_FACTOR: f32 = 0.4;

// Speeds in tiles per second; multiplied by the tile size when a level is built.
pub const PLAYER_BASE_SPEED: f32 = 7.5;
pub const GHOST_BASE_SPEED: f32 = 7.0;
pub const GHOST_FRIGHTENED_SPEED: f32 = 4.0;
pub const GHOST_EATEN_SPEED: f32 = 14.0;

pub const LIFE_LOST_DELAY_SEC: f32 = 1.5;
pub const LEVEL_TRANSITION_DELAY_SEC: f32 = 2.0;

pub fn ghost_speed_factor(id: GhostId) -> f32 {
    match id {
        GhostId::Blinky => 1.0,
        GhostId::Pinky => 0.95,
        GhostId::Inky => 0.9,
        GhostId::Clyde => 0.85,
    }
}

pub fn ghost_color(id: GhostId) -> &'static str {
    match id {
        GhostId::Blinky => "#ff0000",
        GhostId::Pinky => "#ffb8ff",
        GhostId::Inky => "#00ffff",
        GhostId::Clyde => "#ffb852",
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PhaseTableEntry {
    pub level_min: u32,
    pub phases: &'static [(GhostMode, f32)],
}

pub const PHASE_TABLE: [PhaseTableEntry; 3] = [
    PhaseTableEntry {
        level_min: 1,
        phases: &[
            (GhostMode::Scatter, 7.0),
            (GhostMode::Chase, 20.0),
            (GhostMode::Scatter, 7.0),
            (GhostMode::Chase, 20.0),
            (GhostMode::Scatter, 5.0),
            (GhostMode::Chase, 20.0),
            (GhostMode::Scatter, 5.0),
            (GhostMode::Chase, f32::INFINITY),
        ],
    },
    PhaseTableEntry {
        level_min: 2,
        phases: &[
            (GhostMode::Scatter, 7.0),
            (GhostMode::Chase, 20.0),
            (GhostMode::Scatter, 7.0),
            (GhostMode::Chase, 20.0),
            (GhostMode::Scatter, 5.0),
            (GhostMode::Chase, 1033.0),
            (GhostMode::Scatter, 1.0 / 60.0),
            (GhostMode::Chase, f32::INFINITY),
        ],
    },
    PhaseTableEntry {
        level_min: 5,
        phases: &[
            (GhostMode::Scatter, 5.0),
            (GhostMode::Chase, 20.0),
            (GhostMode::Scatter, 5.0),
            (GhostMode::Chase, 20.0),
            (GhostMode::Scatter, 5.0),
            (GhostMode::Chase, 1037.0),
            (GhostMode::Scatter, 1.0 / 60.0),
            (GhostMode::Chase, f32::INFINITY),
        ],
    },
];

pub fn get_phase_table(level: u32) -> &'static [(GhostMode, f32)] {
    PHASE_TABLE
        .iter()
        .filter(|entry| entry.level_min <= level)
        .max_by_key(|entry| entry.level_min)
        .unwrap_or(&PHASE_TABLE[0])
        .phases
}

pub fn get_level_speed_multiplier(level: u32) -> (f32, f32) {
    if level <= 1 {
        return (0.8, 0.75);
    }
    if level <= 4 {
        return (0.9, 0.85);
    }
    if level <= 20 {
        return (1.0, 0.95);
    }
    (0.9, 0.95)
}

pub fn get_frightened_duration(level: u32) -> f32 {
    match level {
        0 | 1 => 6.0,
        2 => 5.0,
        3 => 4.0,
        4 => 3.0,
        5 => 2.0,
        6 => 5.0,
        7 | 8 => 2.0,
        9 => 1.0,
        10 => 5.0,
        11 => 2.0,
        12 | 13 => 1.0,
        14 => 3.0,
        15 | 16 => 1.0,
        17 => 0.0,
        18 => 1.0,
        _ => 0.0,
    }
}

pub const DEFAULT_LAYOUT: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##    B     ##.######",
    "######.## ###--### ##.######",
    "######.## #      # ##.######",
    "      .   # IKC  #   .      ",
    "######.## #      # ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_table_picks_highest_level_min_not_above_level() {
        assert_eq!(get_phase_table(1)[5].1, 20.0);
        assert_eq!(get_phase_table(3)[5].1, 1033.0);
        assert_eq!(get_phase_table(99)[0].1, 5.0);
        assert_eq!(get_phase_table(0)[0].1, 7.0);
    }

    #[test]
    fn every_phase_table_ends_with_permanent_chase() {
        for entry in PHASE_TABLE {
            let (mode, duration) = entry.phases[entry.phases.len() - 1];
            assert_eq!(mode, GhostMode::Chase);
            assert!(duration.is_infinite());
        }
    }

    #[test]
    fn default_layout_is_rectangular() {
        let width = DEFAULT_LAYOUT[0].len();
        assert!(DEFAULT_LAYOUT.iter().all(|row| row.len() == width));
    }
}
