//! Platform-free logic for the site frontend.
//!
//! Everything here is plain Rust over explicit state so it compiles and tests
//! on the host. The web crate owns the DOM, the canvas, and the event wiring
//! and calls into this crate every frame / every navigation.

pub mod config;
pub mod constants;
pub mod field;
pub mod formation;
pub mod nav;
pub mod particle;

pub use config::*;
pub use constants::*;
pub use field::*;
pub use formation::*;
pub use particle::*;
