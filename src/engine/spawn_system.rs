use tracing::debug;

use super::utils::default_scatter_corners;
use super::*;
use crate::ghost::GhostPlacement;
use crate::targeting::snap_to_walkable;

const PLAYER_START_DIRECTION: Direction = Direction::Left;

pub(super) struct LevelParts {
    pub config: LevelConfig,
    pub map: TileMap,
    pub nav: NavGraph,
    pub scheduler: PhaseScheduler,
    pub player: Player,
    pub ghosts: Vec<Ghost>,
}

pub(super) fn build_level(
    file: &ConfigFile,
    options: &GameEngineOptions,
    level: u32,
) -> Result<LevelParts, MazeError> {
    let config = options
        .config_override
        .clone()
        .unwrap_or_else(|| file.level_config(level))
        .sanitized();
    let map = TileMap::parse(&file.layout(), config.tile_size)?;
    let nav = NavGraph::new(&map);
    let scheduler = match &options.phases_override {
        Some(phases) => PhaseScheduler::with_phases(phases.clone()),
        None => PhaseScheduler::new(level),
    };

    let player = Player::new(
        &map,
        map.spawns().player,
        PLAYER_START_DIRECTION,
        config.entity_radius,
    );
    let placements = ghost_placements(&map, &config);
    let ghosts = GhostId::ALL
        .iter()
        .map(|id| {
            Ghost::new(
                &map,
                *id,
                placements[id.index()],
                scheduler.mode(),
                config.entity_radius,
            )
        })
        .collect();

    debug!(
        level,
        rows = map.rows(),
        cols = map.cols(),
        pellets = map.remaining_pellets(),
        intersections = nav.intersections().len(),
        "level built"
    );

    Ok(LevelParts {
        config,
        map,
        nav,
        scheduler,
        player,
        ghosts,
    })
}

pub(super) fn ghost_placements(map: &TileMap, config: &LevelConfig) -> [GhostPlacement; 4] {
    let scatter = match config.scatter_targets {
        Some(targets) => targets.map(|raw| snap_to_walkable(map, raw)),
        None => default_scatter_corners(map),
    };
    let home_tile = config
        .home_tile
        .map(|raw| snap_to_walkable(map, raw))
        .unwrap_or_else(|| map.spawns().ghost(GhostId::Pinky));

    GhostId::ALL.map(|id| GhostPlacement {
        spawn_tile: map.spawns().ghost(id),
        scatter_target: scatter[id.index()],
        home_tile,
    })
}

impl GameEngine {
    pub(super) fn respawn_entities(&mut self) {
        self.player.reset_to_spawn(&self.map);
        let mode = self.scheduler.mode();
        for ghost in &mut self.ghosts {
            ghost.reset_to_spawn(&self.map, mode);
        }
    }
}
