// Shared tuning constants for the particle field and formation choreography.

// Physics
pub const VELOCITY_DAMPING: f32 = 0.998; // per-frame velocity decay
pub const WRAP_MARGIN: f32 = 10.0; // particles wrap once this far out of bounds
pub const MAX_PARTICLE_FACTOR: usize = 4; // hard cap relative to configured count

// Visuals
pub const ALT_COLOR_CHANCE: f32 = 0.15; // probability of the secondary palette entry
pub const PULSE_RADIUS_AMPLITUDE: f32 = 0.5; // radius swing around the base radius
pub const BASE_OPACITY: f32 = 0.3;
pub const PULSE_OPACITY_AMPLITUDE: f32 = 0.15;
pub const MIN_DRAW_RADIUS: f32 = 0.5; // floor applied when rasterising circles
pub const MESH_LINE_OPACITY: f32 = 0.25; // formation mesh line opacity factor

// Pointer
pub const OFFSCREEN_POINTER: [f32; 2] = [-1000.0, -1000.0];

// Formation timing (milliseconds)
pub const GATHER_MS: f64 = 2000.0;
pub const HOLD_MS: f64 = 1500.0;
pub const RELEASE_MS: f64 = 3000.0;

// Formation geometry
pub const HOLD_JITTER: f32 = 1.5; // Lissajous amplitude while holding
pub const MIN_FORMATION_POINTS: usize = 25; // fewer selected points aborts the formation
pub const MAX_FORMATION_PARTICLES: usize = 85;
pub const FORMATION_SHARE: f32 = 0.7; // at most this share of particles participates
pub const MESH_NEIGHBORS: usize = 3;
pub const MASK_ALPHA_THRESHOLD: u8 = 128; // text mask pixels must exceed this alpha
pub const MIN_FORMATION_VIEWPORT: f32 = 768.0; // viewport width gate (CSS px)
pub const FORMATION_FONT_SCALE: f32 = 0.08; // font size as a share of viewport width
pub const FORMATION_FONT_MAX: f32 = 130.0;
pub const FORMATION_DELAY_MS: i32 = 500; // pause after fonts settle before gathering
pub const FORMATION_ANCHOR_GAP: f32 = 60.0; // gap right of the title on wide viewports
pub const FORMATION_FALLBACK_ANCHOR: [f32; 2] = [0.72, 0.28]; // viewport fractions
