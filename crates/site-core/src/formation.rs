//! Text-formation choreography: phase machine, mask sampling, point selection.
//!
//! The formation arranges a subset of particles into a text silhouette once
//! per page view. All transitions are time-driven; any resize cancels the
//! whole thing immediately.

use crate::constants::*;
use glam::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormationPhase {
    #[default]
    Idle,
    Gathering,
    Holding,
    Releasing,
}

#[derive(Clone, Debug, Default)]
pub struct FormationState {
    pub phase: FormationPhase,
    /// Timestamp (ms) when the current phase began.
    pub started_at: f64,
    /// Number of participating particles; they occupy indices `0..member_count`.
    pub member_count: usize,
}

impl FormationState {
    pub fn active(&self) -> bool {
        self.phase != FormationPhase::Idle
    }

    /// True while dedicated mesh lines are drawn instead of pair connections.
    pub fn meshed(&self) -> bool {
        matches!(self.phase, FormationPhase::Gathering | FormationPhase::Holding)
    }
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Sample a rasterised text mask: keep every `step`-th pixel whose alpha
/// exceeds the threshold, centered on the mask box. `rgba` is the usual
/// 4-bytes-per-pixel image data.
pub fn mask_points(rgba: &[u8], width: usize, height: usize, step: usize) -> Vec<Vec2> {
    let step = step.max(1);
    let mut points = Vec::new();
    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            let alpha = rgba.get((y * width + x) * 4 + 3).copied().unwrap_or(0);
            if alpha > MASK_ALPHA_THRESHOLD {
                points.push(Vec2::new(
                    x as f32 - width as f32 / 2.0,
                    y as f32 - height as f32 / 2.0,
                ));
            }
        }
    }
    points
}

/// Pick an evenly-strided subset of mask points for the formation, capped at
/// 70% of the particle population and 85 overall. Returns `None` when the
/// selection is too sparse to read as text.
pub fn plan_formation(points: &[Vec2], particle_count: usize) -> Option<Vec<Vec2>> {
    let target = ((particle_count as f32 * FORMATION_SHARE) as usize)
        .min(MAX_FORMATION_PARTICLES)
        .min(points.len());
    if target == 0 {
        return None;
    }

    let stride = (points.len() / target).max(1);
    let mut selected = Vec::with_capacity(target);
    let mut i = 0;
    while i < points.len() && selected.len() < target {
        selected.push(points[i]);
        i += stride;
    }

    (selected.len() >= MIN_FORMATION_POINTS).then_some(selected)
}

/// For every target, the indices of its 3 nearest other targets. Used for the
/// mesh lines drawn between formation members.
pub fn nearest_neighbors(targets: &[Vec2]) -> Vec<[usize; MESH_NEIGHBORS]> {
    debug_assert!(targets.len() > MESH_NEIGHBORS);
    targets
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let mut by_dist: Vec<(usize, f32)> = targets
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, b)| (j, a.distance_squared(*b)))
                .collect();
            by_dist.sort_by(|x, y| x.1.total_cmp(&y.1));
            [by_dist[0].0, by_dist[1].0, by_dist[2].0]
        })
        .collect()
}
