use crate::movement::can_enter_tile;
use crate::tile_map::TileMap;
use crate::types::{Direction, EntityKind, TilePos};

#[derive(Clone, Copy, Debug)]
pub struct ExitQuery {
    pub kind: EntityKind,
    pub allow_reverse: bool,
}

#[derive(Clone, Debug)]
pub struct NavGraph {
    intersections: Vec<TilePos>,
}

impl NavGraph {
    pub fn new(map: &TileMap) -> Self {
        let mut intersections = Vec::new();
        for row in 0..map.rows() {
            for col in 0..map.cols() {
                let tile = TilePos::new(row, col);
                if is_intersection(map, tile) {
                    intersections.push(tile);
                }
            }
        }
        Self { intersections }
    }

    pub fn intersections(&self) -> &[TilePos] {
        &self.intersections
    }

    pub fn available_directions(
        &self,
        map: &TileMap,
        tile: TilePos,
        current: Direction,
        query: ExitQuery,
    ) -> Vec<Direction> {
        available_directions(map, tile, current, query)
    }
}

/// Legal exits from `tile` in priority order. The reverse of `current` is
/// left out unless `allow_reverse`; a dead end still yields the reverse.
pub fn available_directions(
    map: &TileMap,
    tile: TilePos,
    current: Direction,
    query: ExitQuery,
) -> Vec<Direction> {
    let options = collect_exits(map, tile, current, query.kind, query.allow_reverse);
    if options.is_empty() && !query.allow_reverse {
        return collect_exits(map, tile, current, query.kind, true);
    }
    options
}

pub fn is_intersection(map: &TileMap, tile: TilePos) -> bool {
    if !map.is_walkable(tile.row, tile.col, EntityKind::Ghost) {
        return false;
    }
    collect_exits(map, tile, Direction::None, EntityKind::Ghost, true).len() >= 3
}

fn collect_exits(
    map: &TileMap,
    tile: TilePos,
    current: Direction,
    kind: EntityKind,
    allow_reverse: bool,
) -> Vec<Direction> {
    let reverse = current.opposite();
    Direction::PRIORITY
        .into_iter()
        .filter(|dir| allow_reverse || reverse == Direction::None || *dir != reverse)
        .filter(|dir| {
            let next = map.step(tile, *dir);
            can_enter_tile(map, next.row, next.col, kind)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_LAYOUT, TILE_SIZE};

    fn default_map() -> TileMap {
        TileMap::parse(&DEFAULT_LAYOUT, TILE_SIZE).expect("default layout parses")
    }

    const PLAYER: ExitQuery = ExitQuery {
        kind: EntityKind::Player,
        allow_reverse: false,
    };

    #[test]
    fn exits_follow_priority_order_and_skip_reverse() {
        let map = default_map();
        // (5, 6) is a four-way crossing.
        let tile = TilePos::new(5, 6);
        let all = available_directions(
            &map,
            tile,
            Direction::Right,
            ExitQuery {
                allow_reverse: true,
                ..PLAYER
            },
        );
        assert_eq!(
            all,
            vec![Direction::Up, Direction::Left, Direction::Down, Direction::Right]
        );
        let forward = available_directions(&map, tile, Direction::Right, PLAYER);
        assert_eq!(forward, vec![Direction::Up, Direction::Down, Direction::Right]);
    }

    #[test]
    fn dead_end_falls_back_to_reverse() {
        let layout = ["#######", "#P...B#", "#KIC###", "#######"];
        let map = TileMap::parse(&layout, TILE_SIZE).expect("layout parses");
        let exits = available_directions(&map, TilePos::new(1, 5), Direction::Right, PLAYER);
        assert_eq!(exits, vec![Direction::Left]);
    }

    #[test]
    fn door_is_an_exit_only_for_ghosts() {
        let map = default_map();
        let above_door = TilePos::new(11, 13);
        let player = available_directions(&map, above_door, Direction::Left, PLAYER);
        assert!(!player.contains(&Direction::Down));
        let ghost = available_directions(
            &map,
            above_door,
            Direction::Left,
            ExitQuery {
                kind: EntityKind::Ghost,
                allow_reverse: false,
            },
        );
        assert!(ghost.contains(&Direction::Down));
    }

    #[test]
    fn tunnel_edge_offers_wraparound_exit() {
        let map = default_map();
        let exits = available_directions(&map, TilePos::new(14, 0), Direction::Left, PLAYER);
        assert_eq!(exits, vec![Direction::Left]);
    }

    #[test]
    fn intersections_have_three_or_more_exits() {
        let map = default_map();
        let graph = NavGraph::new(&map);
        assert!(!graph.intersections().is_empty());
        assert!(graph.intersections().contains(&TilePos::new(5, 6)));
        assert!(!graph.intersections().contains(&TilePos::new(1, 2)));
        for tile in graph.intersections() {
            assert!(is_intersection(&map, *tile));
        }
    }
}
