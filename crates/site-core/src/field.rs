//! The particle field: owns the particle population, the wrap rectangle, the
//! pointer position, and the formation state machine.

use crate::config::ParticleConfig;
use crate::constants::*;
use crate::formation::{ease_out_cubic, nearest_neighbors, FormationPhase, FormationState};
use crate::particle::{step_free, step_pulse, FormationSlot, Particle};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct ParticleField {
    pub config: ParticleConfig,
    pub particles: Vec<Particle>,
    /// Wrap rectangle; grows with the viewport, never shrinks.
    pub wrap: Vec2,
    pub pointer: Vec2,
    pub formation: FormationState,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(config: ParticleConfig, width: f32, height: f32, seed: u64) -> Self {
        let wrap = Vec2::new(width, height);
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = (0..config.count)
            .map(|_| Particle::spawn(&mut rng, &config, wrap))
            .collect();
        Self {
            config,
            particles,
            wrap,
            pointer: Vec2::from(OFFSCREEN_POINTER),
            formation: FormationState::default(),
            rng,
        }
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
    }

    pub fn clear_pointer(&mut self) {
        self.pointer = Vec2::from(OFFSCREEN_POINTER);
    }

    /// Viewport change: cancels any formation, then grows the wrap rectangle
    /// and tops up the population to keep density roughly constant, capped at
    /// 4x the configured count.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.cancel_formation();

        if self.wrap.x <= 0.0 || self.wrap.y <= 0.0 {
            self.wrap = Vec2::new(width, height);
            return;
        }
        if width <= self.wrap.x && height <= self.wrap.y {
            return;
        }

        let old_area = self.wrap.x * self.wrap.y;
        self.wrap.x = self.wrap.x.max(width);
        self.wrap.y = self.wrap.y.max(height);
        let new_area = self.wrap.x * self.wrap.y;

        let max_particles = self.config.count * MAX_PARTICLE_FACTOR;
        let extra = (self.particles.len() as f32 * (new_area / old_area - 1.0)).round() as usize;
        let to_spawn = extra.min(max_particles.saturating_sub(self.particles.len()));
        for _ in 0..to_spawn {
            let p = Particle::spawn(&mut self.rng, &self.config, self.wrap);
            self.particles.push(p);
        }
    }

    /// Start a formation towards the given absolute target points. The first
    /// `targets.len()` particles become members. Returns false (and stays
    /// idle) when the target set is too small or outnumbers the population.
    pub fn begin_formation(&mut self, targets: &[Vec2], now_ms: f64) -> bool {
        if targets.len() < MIN_FORMATION_POINTS || targets.len() > self.particles.len() {
            return false;
        }

        log::debug!("formation: gathering {} particles", targets.len());
        let neighbors = nearest_neighbors(targets);
        for (i, target) in targets.iter().enumerate() {
            let p = &mut self.particles[i];
            p.formation = Some(FormationSlot {
                origin: p.pos,
                target: *target,
                release: None,
                neighbors: neighbors[i],
            });
        }
        self.formation = FormationState {
            phase: FormationPhase::Gathering,
            started_at: now_ms,
            member_count: targets.len(),
        };
        true
    }

    pub fn cancel_formation(&mut self) {
        if !self.formation.active() {
            return;
        }
        log::debug!("formation: ended in {:?}", self.formation.phase);
        self.formation = FormationState::default();
        for p in &mut self.particles {
            p.formation = None;
        }
    }

    /// One simulation step at timestamp `now_ms`.
    pub fn step(&mut self, now_ms: f64) {
        self.advance_formation(now_ms);

        let Self {
            config,
            particles,
            wrap,
            pointer,
            formation,
            ..
        } = self;
        let elapsed = now_ms - formation.started_at;

        for p in particles.iter_mut() {
            step_pulse(p, config);

            if let Some(slot) = p.formation {
                match formation.phase {
                    FormationPhase::Gathering => {
                        let t = ease_out_cubic((elapsed / GATHER_MS).min(1.0) as f32);
                        p.pos = slot.origin.lerp(slot.target, t);
                        continue;
                    }
                    FormationPhase::Holding => {
                        let jitter = Vec2::new(
                            (p.pulse_phase * 1.3).sin(),
                            (p.pulse_phase * 0.9).cos(),
                        ) * HOLD_JITTER;
                        p.pos = slot.target + jitter;
                        continue;
                    }
                    FormationPhase::Releasing => {
                        if let Some(release) = slot.release {
                            let t = ease_out_cubic((elapsed / RELEASE_MS).min(1.0) as f32);
                            p.pos = release.lerp(slot.origin, t);
                        }
                        continue;
                    }
                    FormationPhase::Idle => {}
                }
            }

            step_free(p, *pointer, *wrap, config);
        }
    }

    fn advance_formation(&mut self, now_ms: f64) {
        let elapsed = now_ms - self.formation.started_at;
        match self.formation.phase {
            FormationPhase::Gathering if elapsed >= GATHER_MS => {
                self.formation.phase = FormationPhase::Holding;
                self.formation.started_at = now_ms;
            }
            FormationPhase::Holding if elapsed >= HOLD_MS => {
                self.formation.phase = FormationPhase::Releasing;
                self.formation.started_at = now_ms;
                for p in &mut self.particles {
                    let pos = p.pos;
                    if let Some(slot) = &mut p.formation {
                        slot.release = Some(pos);
                    }
                }
            }
            FormationPhase::Releasing if elapsed >= RELEASE_MS => {
                self.cancel_formation();
            }
            _ => {}
        }
    }
}
