// Particle field physics: wrap invariant, pointer repulsion, damping, resize.

use glam::Vec2;
use site_core::{ParticleConfig, ParticleField, MAX_PARTICLE_FACTOR, WRAP_MARGIN};

fn make_field(count: usize) -> ParticleField {
    let config = ParticleConfig {
        count,
        ..ParticleConfig::default()
    };
    ParticleField::new(config, 800.0, 600.0, 42)
}

fn assert_in_bounds(field: &ParticleField, frame: usize) {
    for (i, p) in field.particles.iter().enumerate() {
        assert!(
            p.pos.x >= -WRAP_MARGIN && p.pos.x <= field.wrap.x + WRAP_MARGIN,
            "particle {i} x={} out of bounds at frame {frame}",
            p.pos.x
        );
        assert!(
            p.pos.y >= -WRAP_MARGIN && p.pos.y <= field.wrap.y + WRAP_MARGIN,
            "particle {i} y={} out of bounds at frame {frame}",
            p.pos.y
        );
    }
}

#[test]
fn positions_stay_inside_the_wrap_rectangle() {
    for count in [0usize, 1, 5, 120] {
        let mut field = make_field(count);
        assert_in_bounds(&field, 0);
        for frame in 1..400 {
            // Wander the pointer around to exercise the repulsion path too.
            let t = frame as f32;
            field.set_pointer((t * 13.0) % 800.0, (t * 7.0) % 600.0);
            field.step(frame as f64 * 16.0);
            assert_in_bounds(&field, frame);
        }
    }
}

#[test]
fn spawn_respects_configured_radius_and_palette() {
    let field = make_field(200);
    let cfg = &field.config;
    let mut alt_seen = false;
    for p in &field.particles {
        assert!(p.base_radius >= cfg.min_radius && p.base_radius <= cfg.max_radius);
        assert!(p.color == cfg.color || p.color == cfg.color_alt);
        alt_seen |= p.color == cfg.color_alt;
    }
    assert!(alt_seen, "with 200 particles the alt palette should appear");
}

#[test]
fn pointer_repulsion_pushes_particles_away() {
    let mut field = make_field(1);
    field.particles[0].pos = Vec2::new(400.0, 300.0);
    field.particles[0].vel = Vec2::ZERO;
    field.set_pointer(410.0, 300.0); // 10px to the right, well within range

    field.step(16.0);

    let vel = field.particles[0].vel;
    assert!(vel.x < 0.0, "particle should accelerate away from the pointer");
    assert!(vel.y.abs() < 1e-6, "force is radial, no sideways component");
}

#[test]
fn pointer_outside_range_leaves_velocity_damped_only() {
    let mut field = make_field(1);
    field.particles[0].pos = Vec2::new(400.0, 300.0);
    field.particles[0].vel = Vec2::new(1.0, 0.0);
    field.clear_pointer();

    field.step(16.0);

    let vel = field.particles[0].vel;
    assert!(
        (vel.x - 0.998).abs() < 1e-6,
        "expected damping only, got vx={}",
        vel.x
    );
}

#[test]
fn particles_wrap_across_the_margin() {
    let mut field = make_field(1);
    field.particles[0].pos = Vec2::new(field.wrap.x + WRAP_MARGIN - 0.5, 300.0);
    field.particles[0].vel = Vec2::new(1.0, 0.0);
    field.clear_pointer();

    field.step(16.0);

    assert_eq!(
        field.particles[0].pos.x, -WRAP_MARGIN,
        "exiting right should re-enter at the left margin"
    );
}

#[test]
fn pulse_keeps_radius_within_the_bounded_swing() {
    let mut field = make_field(50);
    for frame in 0..300 {
        field.step(frame as f64 * 16.0);
        for p in &field.particles {
            assert!((p.radius - p.base_radius).abs() <= 0.5 + 1e-5);
            assert!(p.opacity >= 0.15 - 1e-5 && p.opacity <= 0.45 + 1e-5);
        }
    }
}

#[test]
fn resize_grows_wrap_and_tops_up_density() {
    let mut field = make_field(100);
    assert_eq!(field.particles.len(), 100);

    // Doubling the area roughly doubles the population.
    field.resize(1600.0, 600.0);
    assert_eq!(field.wrap, Vec2::new(1600.0, 600.0));
    assert_eq!(field.particles.len(), 200);

    // Same size again: no change.
    field.resize(1600.0, 600.0);
    assert_eq!(field.particles.len(), 200);

    // Shrinking never shrinks the wrap rectangle or the population.
    field.resize(100.0, 100.0);
    assert_eq!(field.wrap, Vec2::new(1600.0, 600.0));
    assert_eq!(field.particles.len(), 200);
}

#[test]
fn population_is_capped_at_four_times_the_configured_count() {
    let mut field = make_field(100);
    field.resize(16000.0, 6000.0); // 200x the original area
    assert_eq!(field.particles.len(), 100 * MAX_PARTICLE_FACTOR);
    // And the cap holds across further growth.
    field.resize(32000.0, 6000.0);
    assert_eq!(field.particles.len(), 100 * MAX_PARTICLE_FACTOR);
}

#[test]
fn zero_count_field_survives_stepping_and_resizing() {
    let mut field = make_field(0);
    field.step(16.0);
    field.resize(2000.0, 2000.0);
    field.step(32.0);
    assert!(field.particles.is_empty());
}
