use crate::constants::MAX_TICK_DT;
use crate::movement::Body;
use crate::targeting::snap_to_walkable;
use crate::tile_map::TileMap;
use crate::types::TilePos;

pub(super) fn sanitize_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(MAX_TICK_DT)
}

pub(super) fn default_scatter_corners(map: &TileMap) -> [TilePos; 4] {
    let rows = map.rows();
    let cols = map.cols();
    [
        TilePos::new(-3, cols - 3),
        TilePos::new(-3, 2),
        TilePos::new(rows, cols - 1),
        TilePos::new(rows, 0),
    ]
    .map(|raw| snap_to_walkable(map, raw))
}

pub(super) fn bodies_touch(a: &Body, b: &Body) -> bool {
    a.tile == b.tile || a.distance_to(b) < a.radius + b.radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_LAYOUT, TILE_SIZE};

    #[test]
    fn dt_is_clamped_into_tick_range() {
        assert_eq!(sanitize_dt(-1.0), 0.0);
        assert_eq!(sanitize_dt(f32::NAN), 0.0);
        assert_eq!(sanitize_dt(f32::INFINITY), 0.0);
        assert_eq!(sanitize_dt(0.016), 0.016);
        assert_eq!(sanitize_dt(3.0), MAX_TICK_DT);
    }

    #[test]
    fn corners_snap_into_the_maze() {
        let map = TileMap::parse(&DEFAULT_LAYOUT, TILE_SIZE).expect("default layout parses");
        let corners = default_scatter_corners(&map);
        assert_eq!(corners[0], TilePos::new(1, 25));
        assert_eq!(corners[1], TilePos::new(1, 2));
        assert_eq!(corners[2], TilePos::new(29, 26));
        assert_eq!(corners[3], TilePos::new(29, 1));
    }
}
