use std::collections::{HashSet, VecDeque};

use crate::constants::{CLYDE_SHY_DISTANCE, INKY_LOOKAHEAD_TILES, PINKY_LOOKAHEAD_TILES};
use crate::tile_map::TileMap;
use crate::types::{Direction, EntityKind, GhostId, TilePos};

#[derive(Clone, Copy, Debug)]
pub struct TargetContext {
    pub player_tile: TilePos,
    pub player_dir: Direction,
    pub blinky_tile: TilePos,
}

pub fn chase_target(
    map: &TileMap,
    id: GhostId,
    own_tile: TilePos,
    scatter_target: TilePos,
    ctx: &TargetContext,
) -> TilePos {
    let raw = match id {
        GhostId::Blinky => ctx.player_tile,
        GhostId::Pinky => {
            project_ahead(map, ctx.player_tile, ctx.player_dir, PINKY_LOOKAHEAD_TILES)
        }
        GhostId::Inky => {
            let ahead = project_ahead(map, ctx.player_tile, ctx.player_dir, INKY_LOOKAHEAD_TILES);
            TilePos::new(
                ctx.blinky_tile.row + 2 * (ahead.row - ctx.blinky_tile.row),
                ctx.blinky_tile.col + 2 * (ahead.col - ctx.blinky_tile.col),
            )
        }
        GhostId::Clyde => {
            if own_tile.euclidean(ctx.player_tile) > CLYDE_SHY_DISTANCE {
                ctx.player_tile
            } else {
                scatter_target
            }
        }
    };
    snap_to_walkable(map, raw)
}

pub fn project_ahead(map: &TileMap, from: TilePos, dir: Direction, tiles: i32) -> TilePos {
    let mut current = from;
    for _ in 0..tiles {
        let next = map.step(current, dir);
        if !map.in_bounds(next.row, next.col) {
            break;
        }
        current = next;
    }
    current
}

pub fn snap_to_walkable(map: &TileMap, raw: TilePos) -> TilePos {
    let start = TilePos::new(
        raw.row.clamp(0, map.rows() - 1),
        raw.col.clamp(0, map.cols() - 1),
    );
    if map.is_walkable(start.row, start.col, EntityKind::Ghost) {
        return start;
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);
    while let Some(tile) = queue.pop_front() {
        for dir in Direction::PRIORITY {
            let next = tile.offset(dir);
            if !map.in_bounds(next.row, next.col) || !visited.insert(next) {
                continue;
            }
            if map.is_walkable(next.row, next.col, EntityKind::Ghost) {
                return next;
            }
            queue.push_back(next);
        }
    }
    start
}
