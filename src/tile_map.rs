use std::collections::{HashSet, VecDeque};

use crate::constants::TILE_SIZE;
use crate::error::MazeError;
use crate::movement::Body;
use crate::types::{Direction, EntityKind, GhostId, PelletKind, TileKind, TilePos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnPoints {
    pub player: TilePos,
    pub ghosts: [TilePos; 4],
}

impl SpawnPoints {
    pub fn ghost(&self, id: GhostId) -> TilePos {
        self.ghosts[id.index()]
    }
}

#[derive(Clone, Debug)]
pub struct TileMap {
    rows: i32,
    cols: i32,
    tile_size: f32,
    tiles: Vec<TileKind>,
    original: Vec<TileKind>,
    tunnel_rows: Vec<bool>,
    remaining_pellets: usize,
    spawns: SpawnPoints,
}

impl TileMap {
    pub fn parse<S: AsRef<str>>(layout: &[S], tile_size: f32) -> Result<Self, MazeError> {
        let Some(first) = layout.first() else {
            return Err(MazeError::EmptyLayout);
        };
        let cols = first.as_ref().chars().count();
        if cols == 0 {
            return Err(MazeError::EmptyLayout);
        }

        let mut tiles = Vec::with_capacity(cols * layout.len());
        let mut player = None;
        let mut ghosts: [Option<TilePos>; 4] = [None; 4];

        for (row, line) in layout.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != cols {
                return Err(MazeError::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let pos = TilePos::new(row as i32, col as i32);
                let kind = match symbol {
                    '#' => TileKind::Wall,
                    ' ' => TileKind::Empty,
                    '.' => TileKind::Pellet,
                    'o' => TileKind::PowerPellet,
                    '-' => TileKind::GhostDoor,
                    'P' => {
                        player = Some(pos);
                        TileKind::Empty
                    }
                    'B' | 'K' | 'I' | 'C' => {
                        let id = match symbol {
                            'B' => GhostId::Blinky,
                            'K' => GhostId::Pinky,
                            'I' => GhostId::Inky,
                            _ => GhostId::Clyde,
                        };
                        ghosts[id.index()] = Some(pos);
                        TileKind::Empty
                    }
                    _ => TileKind::Wall,
                };
                tiles.push(kind);
            }
        }

        let player = player.ok_or(MazeError::MissingSpawn('P'))?;
        let mut ghost_spawns = [TilePos::new(0, 0); 4];
        for (idx, marker) in ['B', 'K', 'I', 'C'].into_iter().enumerate() {
            ghost_spawns[idx] = ghosts[idx].ok_or(MazeError::MissingSpawn(marker))?;
        }

        let rows = layout.len() as i32;
        let cols = cols as i32;
        let tunnel_rows = (0..rows)
            .map(|row| {
                let left = tiles[(row * cols) as usize];
                let right = tiles[(row * cols + cols - 1) as usize];
                is_open(left) && is_open(right)
            })
            .collect();
        let remaining_pellets = count_pellets(&tiles);
        let tile_size = if tile_size.is_finite() && tile_size > 0.0 {
            tile_size
        } else {
            TILE_SIZE
        };

        Ok(Self {
            rows,
            cols,
            tile_size,
            original: tiles.clone(),
            tiles,
            tunnel_rows,
            remaining_pellets,
            spawns: SpawnPoints {
                player,
                ghosts: ghost_spawns,
            },
        })
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn pixel_width(&self) -> f32 {
        self.cols as f32 * self.tile_size
    }

    pub fn spawns(&self) -> &SpawnPoints {
        &self.spawns
    }

    pub fn remaining_pellets(&self) -> usize {
        self.remaining_pellets
    }

    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && row < self.rows && col < self.cols
    }

    pub fn tile(&self, row: i32, col: i32) -> Option<TileKind> {
        if !self.in_bounds(row, col) {
            return None;
        }
        self.tiles.get(self.index(row, col)).copied()
    }

    pub fn original_tile(&self, row: i32, col: i32) -> Option<TileKind> {
        if !self.in_bounds(row, col) {
            return None;
        }
        self.original.get(self.index(row, col)).copied()
    }

    pub fn is_tunnel_row(&self, row: i32) -> bool {
        row >= 0 && self.tunnel_rows.get(row as usize).copied().unwrap_or(false)
    }

    pub fn is_walkable(&self, row: i32, col: i32, kind: EntityKind) -> bool {
        if row < 0 || row >= self.rows {
            return false;
        }
        if col < 0 || col >= self.cols {
            return self.is_tunnel_row(row);
        }
        match self.tiles[self.index(row, col)] {
            TileKind::Wall => false,
            TileKind::GhostDoor => kind == EntityKind::Ghost,
            TileKind::Empty | TileKind::Pellet | TileKind::PowerPellet => true,
        }
    }

    pub fn wrap_column(&self, row: i32, col: i32) -> i32 {
        if self.is_tunnel_row(row) {
            col.rem_euclid(self.cols)
        } else {
            col
        }
    }

    pub fn step(&self, tile: TilePos, dir: Direction) -> TilePos {
        let next = tile.offset(dir);
        TilePos::new(next.row, self.wrap_column(next.row, next.col))
    }

    pub fn eat_pellet(&mut self, row: i32, col: i32) -> Option<PelletKind> {
        if !self.in_bounds(row, col) {
            return None;
        }
        let idx = self.index(row, col);
        let kind = match self.tiles[idx] {
            TileKind::Pellet => PelletKind::Normal,
            TileKind::PowerPellet => PelletKind::Power,
            _ => return None,
        };
        self.tiles[idx] = TileKind::Empty;
        self.remaining_pellets = self.remaining_pellets.saturating_sub(1);
        Some(kind)
    }

    pub fn reset_dynamic_tiles(&mut self) {
        self.tiles.clone_from(&self.original);
        self.remaining_pellets = count_pellets(&self.tiles);
    }

    pub fn world_to_tile(&self, x: f32, y: f32) -> TilePos {
        TilePos::new(
            (y / self.tile_size).floor() as i32,
            (x / self.tile_size).floor() as i32,
        )
    }

    pub fn world_to_clamped_tile(&self, x: f32, y: f32) -> TilePos {
        let tile = self.world_to_tile(x, y);
        TilePos::new(
            tile.row.clamp(0, self.rows - 1),
            tile.col.clamp(0, self.cols - 1),
        )
    }

    pub fn tile_to_world(&self, row: i32, col: i32) -> (f32, f32) {
        (
            col as f32 * self.tile_size + self.tile_size / 2.0,
            row as f32 * self.tile_size + self.tile_size / 2.0,
        )
    }

    pub fn is_near_tile_center(&self, x: f32, y: f32, tolerance: f32) -> bool {
        let tile = self.world_to_tile(x, y);
        let (cx, cy) = self.tile_to_world(tile.row, tile.col);
        (x - cx).abs() <= tolerance && (y - cy).abs() <= tolerance
    }

    pub fn align_to_tile_center(&self, body: &mut Body) {
        let (x, y) = self.tile_to_world(body.tile.row, body.tile.col);
        body.x = x;
        body.y = y;
    }

    pub fn reachable_tiles(&self, start: TilePos, kind: EntityKind) -> HashSet<TilePos> {
        let mut out = HashSet::new();
        if !self.in_bounds(start.row, start.col) || !self.is_walkable(start.row, start.col, kind) {
            return out;
        }
        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);

        while let Some(tile) = queue.pop_front() {
            for dir in Direction::PRIORITY {
                let next = self.step(tile, dir);
                if !self.in_bounds(next.row, next.col)
                    || !self.is_walkable(next.row, next.col, kind)
                {
                    continue;
                }
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        out
    }

    pub fn validate_pellet_reachability(&self) -> Result<(), MazeError> {
        let reachable = self.reachable_tiles(self.spawns.player, EntityKind::Player);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let is_pellet = matches!(
                    self.original_tile(row, col),
                    Some(TileKind::Pellet | TileKind::PowerPellet)
                );
                let pos = TilePos::new(row, col);
                if is_pellet && !reachable.contains(&pos) {
                    return Err(MazeError::UnreachablePellet(pos));
                }
            }
        }
        Ok(())
    }

    fn index(&self, row: i32, col: i32) -> usize {
        (row * self.cols + col) as usize
    }
}

fn is_open(kind: TileKind) -> bool {
    !matches!(kind, TileKind::Wall | TileKind::GhostDoor)
}

fn count_pellets(tiles: &[TileKind]) -> usize {
    tiles
        .iter()
        .filter(|kind| matches!(kind, TileKind::Pellet | TileKind::PowerPellet))
        .count()
}
