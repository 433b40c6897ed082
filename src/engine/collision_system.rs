use tracing::debug;

use super::utils::bodies_touch;
use super::*;

impl GameEngine {
    pub(super) fn consume_pellet(&mut self) {
        let tile = self.player.tile();
        let Some(kind) = self.map.eat_pellet(tile.row, tile.col) else {
            return;
        };
        self.events.push(RuntimeEvent::PelletEaten {
            row: tile.row,
            col: tile.col,
            kind,
            points: kind.points(),
        });

        if kind == PelletKind::Power {
            self.start_frightened();
        }

        if self.map.remaining_pellets() == 0 && !self.level_cleared {
            self.level_cleared = true;
            self.events.push(RuntimeEvent::PelletsCleared);
            debug!(level = self.level, tick = self.tick_counter, "all pellets cleared");
        }
    }

    fn start_frightened(&mut self) {
        let duration = self.config.frightened_duration;
        if duration <= 0.0 {
            return;
        }
        if self.scheduler.enter_frightened(duration) {
            self.pending_mode_change = true;
            for ghost in &mut self.ghosts {
                if ghost.mode() != GhostMode::Eaten {
                    ghost.set_mode(GhostMode::Frightened);
                }
            }
        }
        self.events
            .push(RuntimeEvent::FrightenedStarted { duration });
    }

    pub(super) fn resolve_collisions(&mut self) {
        for ghost in &mut self.ghosts {
            if !bodies_touch(&ghost.body, &self.player.body) {
                continue;
            }
            match ghost.mode() {
                GhostMode::Frightened => {
                    let points = self.scheduler.register_ghost_eaten();
                    ghost.mark_eaten();
                    debug!(ghost = ?ghost.id, points, "ghost eaten");
                    self.events.push(RuntimeEvent::GhostEaten {
                        ghost: ghost.id,
                        points,
                    });
                }
                GhostMode::Scatter | GhostMode::Chase => {
                    self.player_caught = true;
                    debug!(ghost = ?ghost.id, tick = self.tick_counter, "player caught");
                    self.events
                        .push(RuntimeEvent::PlayerCaught { ghost: ghost.id });
                    return;
                }
                GhostMode::Eaten => {}
            }
        }
    }
}
