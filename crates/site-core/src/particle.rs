//! A single drifting particle and its per-frame physics.

use crate::config::{ParticleConfig, Rgb};
use crate::constants::*;
use glam::Vec2;
use rand::Rng;

/// Formation bookkeeping attached to a particle only while it participates in
/// a text formation. Cleared (set back to `None`) whenever the formation ends
/// or is cancelled.
#[derive(Clone, Copy, Debug)]
pub struct FormationSlot {
    /// Position the particle drifted at when the formation started.
    pub origin: Vec2,
    /// Assigned sample point of the text mask, in absolute coordinates.
    pub target: Vec2,
    /// Position recorded when the release phase began.
    pub release: Option<Vec2>,
    /// Indices of the 3 nearest formation members by target distance.
    pub neighbors: [usize; MESH_NEIGHBORS],
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub base_radius: f32,
    pub color: Rgb,
    pub opacity: f32,
    pub pulse_phase: f32,
    pub formation: Option<FormationSlot>,
}

impl Particle {
    pub fn spawn(rng: &mut impl Rng, config: &ParticleConfig, wrap: Vec2) -> Self {
        let color = if rng.gen::<f32>() < ALT_COLOR_CHANCE {
            config.color_alt
        } else {
            config.color
        };
        let radius = config.min_radius + rng.gen::<f32>() * (config.max_radius - config.min_radius);
        Self {
            pos: Vec2::new(rng.gen::<f32>() * wrap.x, rng.gen::<f32>() * wrap.y),
            vel: Vec2::new(
                (rng.gen::<f32>() - 0.5) * config.max_speed,
                (rng.gen::<f32>() - 0.5) * config.max_speed,
            ),
            radius,
            base_radius: radius,
            color,
            opacity: 0.2 + rng.gen::<f32>() * 0.5,
            pulse_phase: rng.gen::<f32>() * std::f32::consts::TAU,
            formation: None,
        }
    }
}

/// Advance the oscillation phase and derive radius/opacity from the pulse.
pub fn step_pulse(p: &mut Particle, config: &ParticleConfig) {
    p.pulse_phase = (p.pulse_phase + config.pulse_speed) % std::f32::consts::TAU;
    let pulse = p.pulse_phase.sin();
    p.radius = p.base_radius + pulse * PULSE_RADIUS_AMPLITUDE;
    p.opacity = BASE_OPACITY + pulse * PULSE_OPACITY_AMPLITUDE;
}

/// Free-drift physics: pointer repulsion, integration, damping, boundary wrap.
pub fn step_free(p: &mut Particle, pointer: Vec2, wrap: Vec2, config: &ParticleConfig) {
    let away = p.pos - pointer;
    let dist = away.length();
    if dist < config.pointer_radius && dist > 0.0 {
        let force = (1.0 - dist / config.pointer_radius) * config.pointer_force;
        p.vel += away / dist * force;
    }

    p.pos += p.vel;
    p.vel *= VELOCITY_DAMPING;

    if p.pos.x < -WRAP_MARGIN {
        p.pos.x = wrap.x + WRAP_MARGIN;
    }
    if p.pos.x > wrap.x + WRAP_MARGIN {
        p.pos.x = -WRAP_MARGIN;
    }
    if p.pos.y < -WRAP_MARGIN {
        p.pos.y = wrap.y + WRAP_MARGIN;
    }
    if p.pos.y > wrap.y + WRAP_MARGIN {
        p.pos.y = -WRAP_MARGIN;
    }
}
