use crate::config::LevelConfig;
use crate::constants::CENTER_EPSILON;
use crate::movement::{
    can_enter_tile, distance_to_next_center, is_at_tile_center, lane_offset, move_entity_on_grid,
    snap_to_lane, Body,
};
use crate::tile_map::TileMap;
use crate::types::{Direction, EntityKind, PlayerView, TilePos};

const MAX_SEGMENTS: usize = 16;

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    queued: Direction,
    spawn: TilePos,
    start_dir: Direction,
}

impl Player {
    pub fn new(map: &TileMap, spawn: TilePos, start_dir: Direction, radius: f32) -> Self {
        let mut body = Body::at_tile(map, spawn, radius);
        body.direction = start_dir;
        Self {
            body,
            queued: start_dir,
            spawn,
            start_dir,
        }
    }

    pub fn tile(&self) -> TilePos {
        self.body.tile
    }

    pub fn direction(&self) -> Direction {
        self.body.direction
    }

    pub fn queued_direction(&self) -> Direction {
        self.queued
    }

    pub fn reset_to_spawn(&mut self, map: &TileMap) {
        let radius = self.body.radius;
        self.body = Body::at_tile(map, self.spawn, radius);
        self.body.direction = self.start_dir;
        self.queued = self.start_dir;
    }

    pub fn queue(&mut self, dir: Direction) {
        if dir != Direction::None {
            self.queued = dir;
        }
    }

    pub fn update(
        &mut self,
        map: &TileMap,
        dt: f32,
        input: Option<Direction>,
        config: &LevelConfig,
    ) {
        if let Some(dir) = input {
            self.queue(dir);
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let mut remaining = config.player_speed * dt;

        self.try_turn(map, config.corner_tolerance);
        for _ in 0..MAX_SEGMENTS {
            let dir = self.body.direction;
            if dir == Direction::None {
                break;
            }
            if is_at_tile_center(map, &self.body) {
                if self.try_turn(map, config.corner_tolerance) {
                    continue;
                }
                if self.blocked_ahead(map) {
                    self.body.direction = Direction::None;
                    break;
                }
            }
            if remaining <= CENTER_EPSILON {
                break;
            }

            let to_center = distance_to_next_center(map, &self.body, dir);
            let step = remaining.min(to_center);
            let moved = move_entity_on_grid(map, &mut self.body, EntityKind::Player, dir, step);
            remaining -= step;
            if step >= to_center - CENTER_EPSILON {
                map.align_to_tile_center(&mut self.body);
            } else if moved + CENTER_EPSILON < step {
                break;
            }
        }
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            x: self.body.x,
            y: self.body.y,
            tile: self.body.tile,
            dir: self.body.direction,
            queued_dir: self.queued,
        }
    }

    fn try_turn(&mut self, map: &TileMap, corner_tolerance: f32) -> bool {
        let current = self.body.direction;
        let wanted = self.queued;
        if wanted == Direction::None || wanted == current {
            return false;
        }
        if current != Direction::None && wanted == current.opposite() {
            self.body.direction = wanted;
            return true;
        }

        let at_center = is_at_tile_center(map, &self.body);
        let cutting_corner = current.is_perpendicular(wanted)
            && lane_offset(map, &self.body, wanted).abs() <= corner_tolerance;
        let near_center_tolerance = corner_tolerance.max(CENTER_EPSILON);
        let stopped_near_center = current == Direction::None
            && map.is_near_tile_center(self.body.x, self.body.y, near_center_tolerance);
        if !(at_center || cutting_corner || stopped_near_center) {
            return false;
        }

        let next = map.step(self.body.tile, wanted);
        if !can_enter_tile(map, next.row, next.col, EntityKind::Player) {
            return false;
        }
        snap_to_lane(map, &mut self.body, wanted);
        self.body.direction = wanted;
        true
    }

    fn blocked_ahead(&self, map: &TileMap) -> bool {
        let next = map.step(self.body.tile, self.body.direction);
        !can_enter_tile(map, next.row, next.col, EntityKind::Player)
    }
}
