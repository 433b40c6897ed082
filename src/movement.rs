use crate::constants::{CENTER_EPSILON, SUB_STEP_MAX_PX, SUB_STEP_TILE_FRACTION};
use crate::tile_map::TileMap;
use crate::types::{Direction, EntityKind, TilePos};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub tile: TilePos,
    pub direction: Direction,
    pub radius: f32,
}

impl Body {
    pub fn at_tile(map: &TileMap, tile: TilePos, radius: f32) -> Self {
        let (x, y) = map.tile_to_world(tile.row, tile.col);
        Self {
            x,
            y,
            tile,
            direction: Direction::None,
            radius,
        }
    }

    pub fn distance_to(&self, other: &Body) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

pub fn can_enter_tile(map: &TileMap, row: i32, col: i32, kind: EntityKind) -> bool {
    map.is_walkable(row, col, kind)
}

/// Advances `body` along `direction` by up to `distance` pixels in small
/// sub-steps. Stops at the first sub-step that would land in a tile the
/// entity cannot enter, keeping the progress made so far. Returns the
/// distance actually moved.
pub fn move_entity_on_grid(
    map: &TileMap,
    body: &mut Body,
    kind: EntityKind,
    direction: Direction,
    distance: f32,
) -> f32 {
    if direction == Direction::None || !distance.is_finite() || distance <= 0.0 {
        return 0.0;
    }
    let step_cap = SUB_STEP_MAX_PX.min(SUB_STEP_TILE_FRACTION * map.tile_size());
    let (dx, dy) = direction.vector();
    let width = map.pixel_width();
    let mut moved = 0.0f32;

    while distance - moved > 1e-6 {
        let step = (distance - moved).min(step_cap);
        let mut nx = body.x + dx as f32 * step;
        let ny = body.y + dy as f32 * step;

        if dx != 0 && map.is_tunnel_row(map.world_to_tile(nx, ny).row) {
            if nx < 0.0 {
                nx += width;
            } else if nx >= width {
                nx -= width;
            }
        }

        let raw = map.world_to_tile(nx, ny);
        let tile = TilePos::new(raw.row, map.wrap_column(raw.row, raw.col));
        if !can_enter_tile(map, tile.row, tile.col, kind) {
            break;
        }
        body.x = nx;
        body.y = ny;
        body.tile = tile;
        moved += step;
    }
    moved
}

pub fn is_at_tile_center(map: &TileMap, body: &Body) -> bool {
    let (cx, cy) = map.tile_to_world(body.tile.row, body.tile.col);
    (body.x - cx).abs() <= CENTER_EPSILON && (body.y - cy).abs() <= CENTER_EPSILON
}

pub fn distance_to_next_center(map: &TileMap, body: &Body, direction: Direction) -> f32 {
    let (cx, cy) = map.tile_to_world(body.tile.row, body.tile.col);
    let ahead = match direction {
        Direction::Right => cx - body.x,
        Direction::Left => body.x - cx,
        Direction::Down => cy - body.y,
        Direction::Up => body.y - cy,
        Direction::None => return 0.0,
    };
    if ahead > CENTER_EPSILON {
        ahead
    } else {
        ahead + map.tile_size()
    }
}

pub fn lane_offset(map: &TileMap, body: &Body, direction: Direction) -> f32 {
    let (cx, cy) = map.tile_to_world(body.tile.row, body.tile.col);
    if direction.is_vertical() {
        body.x - cx
    } else if direction.is_horizontal() {
        body.y - cy
    } else {
        0.0
    }
}

pub fn snap_to_lane(map: &TileMap, body: &mut Body, direction: Direction) {
    let (cx, cy) = map.tile_to_world(body.tile.row, body.tile.col);
    if direction.is_vertical() {
        body.x = cx;
    } else if direction.is_horizontal() {
        body.y = cy;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::constants::{DEFAULT_LAYOUT, TILE_SIZE};
    use crate::types::TileKind;

    fn default_map() -> TileMap {
        TileMap::parse(&DEFAULT_LAYOUT, TILE_SIZE).expect("default layout parses")
    }

    #[test]
    fn stops_at_wall_boundary_without_overshooting() {
        let map = default_map();
        // Row 1 runs from col 1 to col 12 before a wall at col 13.
        let mut body = Body::at_tile(&map, TilePos::new(1, 11), 6.0);
        let moved =
            move_entity_on_grid(&map, &mut body, EntityKind::Player, Direction::Right, 100.0);
        assert!(moved < 100.0);
        assert_eq!(body.tile, TilePos::new(1, 12));
        assert!(body.x < 13.0 * TILE_SIZE);
        assert!(body.x >= 13.0 * TILE_SIZE - SUB_STEP_MAX_PX);
    }

    #[test]
    fn partial_progress_is_kept() {
        let map = default_map();
        let mut body = Body::at_tile(&map, TilePos::new(1, 12), 6.0);
        let start_x = body.x;
        let moved =
            move_entity_on_grid(&map, &mut body, EntityKind::Player, Direction::Right, 20.0);
        assert!(moved > 0.0 && moved < 8.0);
        assert!((body.x - start_x - moved).abs() < 1e-3);
    }

    #[test]
    fn moves_across_tunnel_edge() {
        let map = default_map();
        let mut body = Body::at_tile(&map, TilePos::new(14, 0), 6.0);
        let moved =
            move_entity_on_grid(&map, &mut body, EntityKind::Player, Direction::Left, TILE_SIZE);
        assert!((moved - TILE_SIZE).abs() < 1e-3);
        assert_eq!(body.tile, TilePos::new(14, map.cols() - 1));
        assert!(body.x > 0.0 && body.x < map.pixel_width());
    }

    #[test]
    fn players_are_blocked_by_ghost_doors() {
        let map = default_map();
        let mut body = Body::at_tile(&map, TilePos::new(11, 13), 6.0);
        move_entity_on_grid(&map, &mut body, EntityKind::Player, Direction::Down, TILE_SIZE);
        assert_eq!(body.tile, TilePos::new(11, 13));

        let mut ghost = Body::at_tile(&map, TilePos::new(11, 13), 6.0);
        move_entity_on_grid(&map, &mut ghost, EntityKind::Ghost, Direction::Down, TILE_SIZE);
        assert_eq!(ghost.tile, TilePos::new(12, 13));
    }

    #[test]
    fn zero_or_invalid_distance_does_not_move() {
        let map = default_map();
        let mut body = Body::at_tile(&map, TilePos::new(5, 5), 6.0);
        let before = body;
        let player = EntityKind::Player;
        assert_eq!(move_entity_on_grid(&map, &mut body, player, Direction::Right, 0.0), 0.0);
        assert_eq!(move_entity_on_grid(&map, &mut body, player, Direction::Right, f32::NAN), 0.0);
        assert_eq!(move_entity_on_grid(&map, &mut body, player, Direction::None, 5.0), 0.0);
        assert_eq!(body, before);
    }

    #[test]
    fn next_center_distance_depends_on_side_of_center() {
        let map = default_map();
        let mut body = Body::at_tile(&map, TilePos::new(5, 5), 6.0);
        assert_eq!(distance_to_next_center(&map, &body, Direction::Right), TILE_SIZE);
        body.x -= 3.0;
        assert!((distance_to_next_center(&map, &body, Direction::Right) - 3.0).abs() < 1e-4);
        let behind = distance_to_next_center(&map, &body, Direction::Left);
        assert!((behind - (TILE_SIZE - 3.0)).abs() < 1e-4);
        assert!((lane_offset(&map, &body, Direction::Up) + 3.0).abs() < 1e-4);
        snap_to_lane(&map, &mut body, Direction::Up);
        assert!(is_at_tile_center(&map, &body));
    }

    proptest! {
        #[test]
        fn movement_never_enters_walls(
            steps in proptest::collection::vec((0usize..4, 0.0f32..40.0), 1..60)
        ) {
            let map = default_map();
            let mut body = Body::at_tile(&map, map.spawns().player, 6.0);
            for (dir_idx, distance) in steps {
                let dir = Direction::PRIORITY[dir_idx];
                move_entity_on_grid(&map, &mut body, EntityKind::Player, dir, distance);
                prop_assert_ne!(map.tile(body.tile.row, body.tile.col), Some(TileKind::Wall));
                prop_assert_ne!(map.tile(body.tile.row, body.tile.col), Some(TileKind::GhostDoor));
                prop_assert!(map.in_bounds(body.tile.row, body.tile.col));
            }
        }
    }
}
