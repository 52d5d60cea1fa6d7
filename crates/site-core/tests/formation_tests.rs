// Formation choreography: mask sampling, point selection, phase machine.

use glam::Vec2;
use site_core::{
    ease_out_cubic, mask_points, nearest_neighbors, plan_formation, FormationPhase,
    ParticleConfig, ParticleField, GATHER_MS, HOLD_MS, MAX_FORMATION_PARTICLES,
    MIN_FORMATION_POINTS, RELEASE_MS,
};

fn make_field() -> ParticleField {
    ParticleField::new(ParticleConfig::default(), 1200.0, 800.0, 7)
}

fn line_targets(n: usize) -> Vec<Vec2> {
    (0..n)
        .map(|i| Vec2::new(100.0 + i as f32 * 12.0, 200.0))
        .collect()
}

// --- mask sampling ---

fn solid_rgba(width: usize, height: usize, alpha: u8) -> Vec<u8> {
    let mut data = vec![255u8; width * height * 4];
    for px in 0..width * height {
        data[px * 4 + 3] = alpha;
    }
    data
}

#[test]
fn mask_sampling_keeps_opaque_pixels_on_the_stride_grid() {
    let data = solid_rgba(10, 10, 255);
    let points = mask_points(&data, 10, 10, 3);
    // x and y in {0, 3, 6, 9}
    assert_eq!(points.len(), 16);
    assert_eq!(points[0], Vec2::new(-5.0, -5.0), "points are centered");
}

#[test]
fn mask_sampling_threshold_is_strict() {
    let faint = solid_rgba(10, 10, 128);
    assert!(mask_points(&faint, 10, 10, 3).is_empty());
    let barely = solid_rgba(10, 10, 129);
    assert_eq!(mask_points(&barely, 10, 10, 3).len(), 16);
}

#[test]
fn mask_sampling_tolerates_truncated_data() {
    let data = vec![255u8; 8]; // far less than 10x10x4
    let points = mask_points(&data, 10, 10, 3);
    assert!(points.len() <= 1, "missing bytes read as transparent");
}

// --- selection ---

#[test]
fn plan_selects_evenly_and_respects_caps() {
    let points: Vec<Vec2> = (0..200).map(|i| Vec2::new(i as f32, 0.0)).collect();
    let selected = plan_formation(&points, 120).expect("enough points");
    // min(84 = 70% of 120, 85, 200)
    assert_eq!(selected.len(), 84);
    // Strided selection: consecutive picks are 2 apart.
    assert_eq!(selected[1].x - selected[0].x, 2.0);

    let many: Vec<Vec2> = (0..1000).map(|i| Vec2::new(i as f32, 0.0)).collect();
    let capped = plan_formation(&many, 10_000).expect("enough points");
    assert_eq!(capped.len(), MAX_FORMATION_PARTICLES);
}

#[test]
fn plan_aborts_when_selection_is_too_sparse() {
    let few: Vec<Vec2> = (0..MIN_FORMATION_POINTS - 1)
        .map(|i| Vec2::new(i as f32, 0.0))
        .collect();
    assert!(plan_formation(&few, 1000).is_none());

    // Plenty of points, but a tiny population caps the target below 25.
    let points: Vec<Vec2> = (0..200).map(|i| Vec2::new(i as f32, 0.0)).collect();
    assert!(plan_formation(&points, 10).is_none());
    assert!(plan_formation(&points, 0).is_none());
}

// --- neighbors ---

#[test]
fn nearest_neighbors_on_a_line_pick_adjacent_indices() {
    let targets = line_targets(30);
    let neighbors = nearest_neighbors(&targets);
    assert_eq!(neighbors[0], [1, 2, 3]);
    assert_eq!(neighbors[29], [28, 27, 26]);
    let mid = neighbors[5];
    assert!(mid.contains(&4) && mid.contains(&6));
    assert!(!mid.contains(&5), "a member is never its own neighbor");
}

// --- easing ---

#[test]
fn ease_out_cubic_is_monotonic_from_zero_to_one() {
    assert_eq!(ease_out_cubic(0.0), 0.0);
    assert!((ease_out_cubic(1.0) - 1.0).abs() < 1e-6);
    let mut prev = 0.0;
    for i in 1..=100 {
        let v = ease_out_cubic(i as f32 / 100.0);
        assert!(v >= prev, "easing regressed at t={i}/100");
        prev = v;
    }
}

// --- phase machine ---

#[test]
fn formation_runs_the_phases_strictly_in_order() {
    let mut field = make_field();
    let targets = line_targets(30);
    assert!(field.begin_formation(&targets, 1000.0));
    assert_eq!(field.formation.phase, FormationPhase::Gathering);
    assert_eq!(field.formation.member_count, 30);

    let mut phases = vec![field.formation.phase];
    let mut now = 1000.0;
    while now < 9000.0 {
        now += 100.0;
        field.step(now);
        if *phases.last().unwrap() != field.formation.phase {
            phases.push(field.formation.phase);
        }
    }
    assert_eq!(
        phases,
        vec![
            FormationPhase::Gathering,
            FormationPhase::Holding,
            FormationPhase::Releasing,
            FormationPhase::Idle,
        ]
    );
}

#[test]
fn gathering_moves_members_along_the_origin_target_segment() {
    let mut field = make_field();
    let targets = line_targets(30);
    assert!(field.begin_formation(&targets, 0.0));

    field.step(GATHER_MS / 2.0);
    for i in 0..30 {
        let p = &field.particles[i];
        let slot = p.formation.expect("member slot");
        let span = slot.target - slot.origin;
        let progress = p.pos - slot.origin;
        if span.length() < 1.0 {
            continue; // spawned on top of its target, nothing to check
        }
        let sine = span.normalize().perp_dot(progress.normalize()).abs();
        assert!(sine < 1e-3, "member {i} left the origin-target segment");
        let t = progress.length() / span.length();
        assert!((0.0..=1.0 + 1e-3).contains(&t), "member {i} overshot: t={t}");
    }
}

#[test]
fn holding_jitters_tightly_around_the_target() {
    let mut field = make_field();
    let targets = line_targets(30);
    assert!(field.begin_formation(&targets, 0.0));

    field.step(GATHER_MS); // transition into holding
    assert_eq!(field.formation.phase, FormationPhase::Holding);
    for i in 0..30 {
        let p = &field.particles[i];
        let slot = p.formation.expect("member slot");
        assert!(
            p.pos.distance(slot.target) <= 2.2,
            "member {i} drifted {} from its target while holding",
            p.pos.distance(slot.target)
        );
    }
}

#[test]
fn releasing_records_a_release_point_and_eases_home() {
    let mut field = make_field();
    let targets = line_targets(30);
    assert!(field.begin_formation(&targets, 0.0));

    field.step(GATHER_MS);
    field.step(GATHER_MS + HOLD_MS);
    assert_eq!(field.formation.phase, FormationPhase::Releasing);
    for i in 0..30 {
        let slot = field.particles[i].formation.expect("member slot");
        assert!(slot.release.is_some(), "member {i} has no release point");
    }

    // Near the end of the release, members are back near their origins.
    field.step(GATHER_MS + HOLD_MS + RELEASE_MS - 1.0);
    for i in 0..30 {
        let p = &field.particles[i];
        let slot = p.formation.expect("member slot");
        assert!(
            p.pos.distance(slot.origin) < 1.0,
            "member {i} is still {} from home",
            p.pos.distance(slot.origin)
        );
    }
}

#[test]
fn formation_end_clears_every_member_field() {
    let mut field = make_field();
    assert!(field.begin_formation(&line_targets(30), 0.0));

    field.step(GATHER_MS);
    field.step(GATHER_MS + HOLD_MS);
    field.step(GATHER_MS + HOLD_MS + RELEASE_MS);

    assert_eq!(field.formation.phase, FormationPhase::Idle);
    assert_eq!(field.formation.member_count, 0);
    assert!(field.particles.iter().all(|p| p.formation.is_none()));
}

#[test]
fn resize_cancels_a_formation_in_any_phase() {
    for settle_ms in [500.0, GATHER_MS + 100.0, GATHER_MS + HOLD_MS + 100.0] {
        let mut field = make_field();
        assert!(field.begin_formation(&line_targets(30), 0.0));
        let mut now = 0.0;
        while now < settle_ms {
            now += 100.0;
            field.step(now);
        }
        assert_ne!(field.formation.phase, FormationPhase::Idle);

        field.resize(1400.0, 900.0);
        assert_eq!(field.formation.phase, FormationPhase::Idle);
        assert_eq!(field.formation.member_count, 0);
        assert!(field.particles.iter().all(|p| p.formation.is_none()));
    }
}

#[test]
fn undersized_or_oversized_target_sets_are_rejected() {
    let mut field = make_field();
    assert!(!field.begin_formation(&line_targets(10), 0.0));
    assert_eq!(field.formation.phase, FormationPhase::Idle);

    let too_many = line_targets(field.particles.len() + 1);
    assert!(!field.begin_formation(&too_many, 0.0));
    assert_eq!(field.formation.phase, FormationPhase::Idle);
}
