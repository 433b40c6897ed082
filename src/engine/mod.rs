use tracing::debug;

use crate::config::{ConfigFile, LevelConfig};
use crate::error::MazeError;
use crate::ghost::{Ghost, GhostFrame};
use crate::nav_graph::NavGraph;
use crate::phase::PhaseScheduler;
use crate::player::Player;
use crate::rng::Rng;
use crate::targeting::TargetContext;
use crate::tile_map::TileMap;
use crate::types::{Direction, GhostId, GhostMode, PelletKind, RuntimeEvent, Snapshot};

mod collision_system;
mod spawn_system;
mod utils;

use self::spawn_system::{build_level, LevelParts};
use self::utils::sanitize_dt;

#[derive(Clone, Debug, Default)]
pub struct GameEngineOptions {
    pub config_override: Option<LevelConfig>,
    pub phases_override: Option<Vec<(GhostMode, f32)>>,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    level: u32,
    file: ConfigFile,
    options: GameEngineOptions,
    config: LevelConfig,
    map: TileMap,
    nav: NavGraph,
    scheduler: PhaseScheduler,
    player: Player,
    ghosts: Vec<Ghost>,
    rng: Rng,
    events: Vec<RuntimeEvent>,

    pending_mode_change: bool,
    player_caught: bool,
    level_cleared: bool,
    tick_counter: u64,
    elapsed_sec: f32,
}

impl GameEngine {
    pub fn new<S: AsRef<str>>(
        layout: &[S],
        level: u32,
        seed: u32,
        options: GameEngineOptions,
    ) -> Result<Self, MazeError> {
        let file = ConfigFile {
            maze: Some(layout.iter().map(|row| row.as_ref().to_string()).collect()),
            levels: Vec::new(),
        };
        Self::with_config(file, level, seed, options)
    }

    pub fn with_config(
        file: ConfigFile,
        level: u32,
        seed: u32,
        options: GameEngineOptions,
    ) -> Result<Self, MazeError> {
        let LevelParts {
            config,
            map,
            nav,
            scheduler,
            player,
            ghosts,
        } = build_level(&file, &options, level)?;
        Ok(Self {
            level,
            file,
            options,
            config,
            map,
            nav,
            scheduler,
            player,
            ghosts,
            rng: Rng::new(seed),
            events: Vec::new(),
            pending_mode_change: false,
            player_caught: false,
            level_cleared: false,
            tick_counter: 0,
            elapsed_sec: 0.0,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn nav(&self) -> &NavGraph {
        &self.nav
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.scheduler
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost(&self, id: GhostId) -> Option<&Ghost> {
        self.ghosts.iter().find(|ghost| ghost.id == id)
    }

    pub fn is_player_caught(&self) -> bool {
        self.player_caught
    }

    pub fn is_level_cleared(&self) -> bool {
        self.level_cleared
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    /// Advances the level by one tick: scheduler, player, ghosts in fixed
    /// order, then pellets and collisions against post-move positions.
    /// Does nothing while a caught player or a cleared maze is pending.
    pub fn step(&mut self, dt: f32, input: Option<Direction>) {
        if self.player_caught || self.level_cleared {
            return;
        }
        let dt = sanitize_dt(dt);
        self.tick_counter += 1;
        self.elapsed_sec += dt;

        let phase = self.scheduler.update(dt);
        let pending = std::mem::take(&mut self.pending_mode_change);
        let mode_changed = phase.changed || pending;

        self.player.update(&self.map, dt, input, &self.config);
        self.update_ghosts(dt, phase.mode, mode_changed);
        self.consume_pellet();
        self.resolve_collisions();
    }

    pub fn reset_after_life_lost(&mut self) {
        self.scheduler.reset_after_life_lost();
        self.respawn_entities();
        self.pending_mode_change = false;
        self.player_caught = false;
        debug!(level = self.level, tick = self.tick_counter, "entities reset after life lost");
    }

    pub fn load_level(&mut self, level: u32) -> Result<(), MazeError> {
        let LevelParts {
            config,
            map,
            nav,
            scheduler,
            player,
            ghosts,
        } = build_level(&self.file, &self.options, level)?;
        self.level = level;
        self.config = config;
        self.map = map;
        self.nav = nav;
        self.scheduler = scheduler;
        self.player = player;
        self.ghosts = ghosts;
        self.pending_mode_change = false;
        self.player_caught = false;
        self.level_cleared = false;
        Ok(())
    }

    pub fn reset_dynamic_tiles(&mut self) {
        self.map.reset_dynamic_tiles();
        self.level_cleared = self.map.remaining_pellets() == 0;
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            level: self.level,
            elapsed_sec: self.elapsed_sec,
            pellets_remaining: self.map.remaining_pellets(),
            mode: self.scheduler.mode(),
            phase_index: self.scheduler.phase_index(),
            frightened_remaining: self.scheduler.frightened_remaining(),
            player: self.player.view(),
            ghosts: self.ghosts.iter().map(Ghost::view).collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    fn update_ghosts(&mut self, dt: f32, global_mode: GhostMode, mode_changed: bool) {
        let player_tile = self.player.tile();
        let player_dir = self.player.direction();
        for idx in 0..self.ghosts.len() {
            let blinky_tile = self
                .ghost(GhostId::Blinky)
                .map(Ghost::tile)
                .unwrap_or(player_tile);
            let frame = GhostFrame {
                dt,
                global_mode,
                mode_changed,
                targets: TargetContext {
                    player_tile,
                    player_dir,
                    blinky_tile,
                },
            };
            self.ghosts[idx].update(&self.map, &self.nav, &self.config, &frame, &mut self.rng);
        }
    }
}
