use tracing::{debug, trace};

use crate::config::LevelConfig;
use crate::constants::{ghost_color, ghost_speed_factor, CENTER_EPSILON};
use crate::movement::{
    can_enter_tile, distance_to_next_center, is_at_tile_center, move_entity_on_grid, Body,
};
use crate::nav_graph::{ExitQuery, NavGraph};
use crate::pathfinding::bfs_distance;
use crate::targeting::{chase_target, TargetContext};
use crate::tile_map::TileMap;
use crate::types::{Direction, EntityKind, GhostId, GhostMode, GhostView, TilePos};

const MAX_SEGMENTS: usize = 16;

#[derive(Clone, Copy, Debug)]
pub struct GhostFrame {
    pub dt: f32,
    pub global_mode: GhostMode,
    pub mode_changed: bool,
    pub targets: TargetContext,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostPlacement {
    pub spawn_tile: TilePos,
    pub scatter_target: TilePos,
    pub home_tile: TilePos,
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub id: GhostId,
    pub body: Body,
    mode: GhostMode,
    target_tile: Option<TilePos>,
    allow_reverse: bool,
    placement: GhostPlacement,
    speed_factor: f32,
    color: &'static str,
    last_decision_tile: Option<TilePos>,
}

impl Ghost {
    pub fn new(
        map: &TileMap,
        id: GhostId,
        placement: GhostPlacement,
        mode: GhostMode,
        radius: f32,
    ) -> Self {
        Self {
            id,
            body: Body::at_tile(map, placement.spawn_tile, radius),
            mode,
            target_tile: None,
            allow_reverse: true,
            placement,
            speed_factor: ghost_speed_factor(id),
            color: ghost_color(id),
            last_decision_tile: None,
        }
    }

    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    pub fn tile(&self) -> TilePos {
        self.body.tile
    }

    pub fn direction(&self) -> Direction {
        self.body.direction
    }

    pub fn target_tile(&self) -> Option<TilePos> {
        self.target_tile
    }

    pub fn allows_reverse(&self) -> bool {
        self.allow_reverse
    }

    pub fn placement(&self) -> &GhostPlacement {
        &self.placement
    }

    pub fn reset_to_spawn(&mut self, map: &TileMap, mode: GhostMode) {
        let radius = self.body.radius;
        self.body = Body::at_tile(map, self.placement.spawn_tile, radius);
        self.mode = mode;
        self.target_tile = None;
        self.allow_reverse = true;
        self.last_decision_tile = None;
    }

    pub fn set_mode(&mut self, mode: GhostMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.allow_reverse = true;
        self.body.direction = self.body.direction.opposite();
        self.last_decision_tile = None;
        if mode == GhostMode::Frightened {
            self.target_tile = None;
        }
    }

    pub fn mark_eaten(&mut self) {
        self.mode = GhostMode::Eaten;
        self.allow_reverse = true;
        self.target_tile = Some(self.placement.home_tile);
        self.last_decision_tile = None;
    }

    pub fn speed(&self, config: &LevelConfig) -> f32 {
        match self.mode {
            GhostMode::Eaten => config.eaten_speed,
            GhostMode::Frightened => config.frightened_speed,
            GhostMode::Scatter | GhostMode::Chase => config.ghost_speed * self.speed_factor,
        }
    }

    pub fn update<R: rand::Rng + ?Sized>(
        &mut self,
        map: &TileMap,
        nav: &NavGraph,
        config: &LevelConfig,
        frame: &GhostFrame,
        rng: &mut R,
    ) {
        if self.mode != GhostMode::Eaten {
            if frame.mode_changed {
                self.allow_reverse = true;
            }
            if frame.global_mode != self.mode {
                self.set_mode(frame.global_mode);
            }
        }

        let dt = if frame.dt.is_finite() && frame.dt > 0.0 {
            frame.dt
        } else {
            0.0
        };
        let mut remaining = self.speed(config) * dt;

        for _ in 0..MAX_SEGMENTS {
            if is_at_tile_center(map, &self.body)
                && (self.last_decision_tile != Some(self.body.tile) || self.blocked_ahead(map))
            {
                self.on_tile_center(map, nav, frame, rng);
            }
            let dir = self.body.direction;
            if dir == Direction::None || remaining <= CENTER_EPSILON {
                break;
            }

            let to_center = distance_to_next_center(map, &self.body, dir);
            let step = remaining.min(to_center);
            let moved = move_entity_on_grid(map, &mut self.body, EntityKind::Ghost, dir, step);
            remaining -= step;
            if step >= to_center - CENTER_EPSILON {
                map.align_to_tile_center(&mut self.body);
            } else if moved + CENTER_EPSILON < step {
                map.align_to_tile_center(&mut self.body);
                self.last_decision_tile = None;
                break;
            }
        }
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            id: self.id,
            x: self.body.x,
            y: self.body.y,
            tile: self.body.tile,
            dir: self.body.direction,
            mode: self.mode,
            target_tile: self.target_tile,
            color: self.color,
        }
    }

    fn on_tile_center<R: rand::Rng + ?Sized>(
        &mut self,
        map: &TileMap,
        nav: &NavGraph,
        frame: &GhostFrame,
        rng: &mut R,
    ) {
        let tile = self.body.tile;
        if self.mode == GhostMode::Eaten && tile == self.placement.home_tile {
            self.mode = match frame.global_mode {
                GhostMode::Frightened | GhostMode::Eaten => GhostMode::Scatter,
                mode => mode,
            };
            self.allow_reverse = true;
            debug!(ghost = ?self.id, mode = ?self.mode, "ghost revived at home");
        }

        self.target_tile = self.current_target(map, &frame.targets);
        let exits = nav.available_directions(
            map,
            tile,
            self.body.direction,
            ExitQuery {
                kind: EntityKind::Ghost,
                allow_reverse: self.allow_reverse || self.mode == GhostMode::Eaten,
            },
        );

        let choice = if exits.is_empty() {
            Direction::None
        } else if self.mode == GhostMode::Frightened {
            exits[rng.random_range(0..exits.len())]
        } else {
            match self.target_tile {
                Some(target) => choose_toward_direction(map, tile, &exits, target),
                None => exits[0],
            }
        };
        trace!(ghost = ?self.id, ?tile, ?choice, target = ?self.target_tile, "ghost decision");

        self.body.direction = choice;
        self.allow_reverse = false;
        self.last_decision_tile = Some(tile);
    }

    fn current_target(&self, map: &TileMap, targets: &TargetContext) -> Option<TilePos> {
        match self.mode {
            GhostMode::Scatter => Some(self.placement.scatter_target),
            GhostMode::Chase => Some(chase_target(
                map,
                self.id,
                self.body.tile,
                self.placement.scatter_target,
                targets,
            )),
            GhostMode::Eaten => Some(self.placement.home_tile),
            GhostMode::Frightened => None,
        }
    }

    fn blocked_ahead(&self, map: &TileMap) -> bool {
        let dir = self.body.direction;
        if dir == Direction::None {
            return true;
        }
        let next = map.step(self.body.tile, dir);
        !can_enter_tile(map, next.row, next.col, EntityKind::Ghost)
    }
}

/// Exit whose neighbour tile is closest to `target` by ghost BFS distance.
/// Exact ties go to the earlier direction in the fixed priority order, no
/// matter how `exits` is ordered.
pub fn choose_toward_direction(
    map: &TileMap,
    tile: TilePos,
    exits: &[Direction],
    target: TilePos,
) -> Direction {
    exits
        .iter()
        .map(|dir| {
            let next = map.step(tile, *dir);
            (*dir, bfs_distance(map, next, target, EntityKind::Ghost))
        })
        .min_by_key(|(dir, dist)| (*dist, dir.priority()))
        .map(|(dir, _)| dir)
        .unwrap_or(Direction::None)
}
