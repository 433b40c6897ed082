use std::collections::{HashSet, VecDeque};

use crate::constants::BFS_NODE_LIMIT;
use crate::movement::can_enter_tile;
use crate::tile_map::TileMap;
use crate::types::{Direction, EntityKind, TilePos};

/// Distance reported when the target cannot be reached. Compares greater than
/// every real distance.
pub const UNREACHABLE: u32 = u32::MAX;

pub fn bfs_distance(map: &TileMap, start: TilePos, target: TilePos, kind: EntityKind) -> u32 {
    bfs_distance_bounded(map, start, target, kind, BFS_NODE_LIMIT)
}

pub fn bfs_distance_bounded(
    map: &TileMap,
    start: TilePos,
    target: TilePos,
    kind: EntityKind,
    node_limit: usize,
) -> u32 {
    if start == target {
        return 0;
    }
    if !can_enter_tile(map, start.row, start.col, kind)
        || !can_enter_tile(map, target.row, target.col, kind)
    {
        return UNREACHABLE;
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back((start, 0u32));
    let mut explored = 0usize;

    while let Some((tile, dist)) = queue.pop_front() {
        explored += 1;
        if explored > node_limit {
            return UNREACHABLE;
        }
        for dir in Direction::PRIORITY {
            let next = map.step(tile, dir);
            if !can_enter_tile(map, next.row, next.col, kind) {
                continue;
            }
            if next == target {
                return dist + 1;
            }
            if visited.insert(next) {
                queue.push_back((next, dist + 1));
            }
        }
    }
    UNREACHABLE
}
