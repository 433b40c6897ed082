use tracing::debug;

use crate::constants::{get_phase_table, FRIGHTENED_CHAIN_MAX, GHOST_EATEN_BASE_POINTS};
use crate::types::GhostMode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseUpdate {
    pub mode: GhostMode,
    pub changed: bool,
    pub phase_index: usize,
}

#[derive(Clone, Debug)]
pub struct PhaseScheduler {
    phases: Vec<(GhostMode, f32)>,
    phase_index: usize,
    phase_elapsed: f32,
    frightened_timer: f32,
    frightened_chain: u32,
}

impl PhaseScheduler {
    pub fn new(level: u32) -> Self {
        Self::with_phases(get_phase_table(level).to_vec())
    }

    pub fn with_phases(mut phases: Vec<(GhostMode, f32)>) -> Self {
        for phase in &mut phases {
            if phase.1.is_nan() || phase.1 < 0.0 {
                phase.1 = 0.0;
            }
        }
        match phases.last_mut() {
            Some(last) => last.1 = f32::INFINITY,
            None => phases.push((GhostMode::Chase, f32::INFINITY)),
        }
        Self {
            phases,
            phase_index: 0,
            phase_elapsed: 0.0,
            frightened_timer: 0.0,
            frightened_chain: 0,
        }
    }

    pub fn reset(&mut self, level: u32) {
        *self = Self::new(level);
    }

    pub fn reset_after_life_lost(&mut self) {
        self.phase_index = 0;
        self.phase_elapsed = 0.0;
        self.frightened_timer = 0.0;
        self.frightened_chain = 0;
    }

    pub fn mode(&self) -> GhostMode {
        if self.frightened_timer > 0.0 {
            GhostMode::Frightened
        } else {
            self.phase_mode()
        }
    }

    pub fn phase_mode(&self) -> GhostMode {
        self.phases[self.phase_index].0
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn frightened_remaining(&self) -> f32 {
        self.frightened_timer
    }

    pub fn frightened_chain(&self) -> u32 {
        self.frightened_chain
    }

    pub fn enter_frightened(&mut self, duration: f32) -> bool {
        if !duration.is_finite() || duration <= 0.0 {
            return false;
        }
        let before = self.mode();
        self.frightened_timer = duration;
        self.frightened_chain = 0;
        let changed = before != self.mode();
        if changed {
            debug!(duration, "frightened mode started");
        }
        changed
    }

    pub fn update(&mut self, dt: f32) -> PhaseUpdate {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let before = self.mode();

        if self.frightened_timer > 0.0 {
            self.frightened_timer = (self.frightened_timer - dt).max(0.0);
            if self.frightened_timer == 0.0 {
                self.frightened_chain = 0;
            }
        } else {
            self.advance_phases(dt);
        }

        let mode = self.mode();
        let changed = mode != before;
        if changed {
            debug!(?before, ?mode, phase_index = self.phase_index, "ghost mode changed");
        }
        PhaseUpdate {
            mode,
            changed,
            phase_index: self.phase_index,
        }
    }

    pub fn register_ghost_eaten(&mut self) -> u32 {
        let chain = self.frightened_chain.min(FRIGHTENED_CHAIN_MAX);
        let points = GHOST_EATEN_BASE_POINTS * 2u32.pow(chain);
        self.frightened_chain = (self.frightened_chain + 1).min(FRIGHTENED_CHAIN_MAX);
        points
    }

    fn advance_phases(&mut self, dt: f32) {
        let duration = self.phases[self.phase_index].1;
        if !duration.is_finite() {
            return;
        }
        self.phase_elapsed += dt;
        while self.phase_index + 1 < self.phases.len()
            && self.phase_elapsed > self.phases[self.phase_index].1
        {
            self.phase_elapsed -= self.phases[self.phase_index].1;
            self.phase_index += 1;
        }
    }
}
