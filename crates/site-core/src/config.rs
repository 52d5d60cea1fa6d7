//! Particle tuning read from data-attributes on the host canvas element.
//!
//! Every value falls back to its default when the attribute is missing or
//! malformed; configuration parsing never fails.

use std::str::FromStr;
use thiserror::Error;

/// RGB color triple with 0-255 channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected \"r,g,b\" with 0-255 channels")]
pub struct ParseRgbError;

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<u8>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Ok(Rgb { r, g, b }),
            _ => Err(ParseRgbError),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParticleConfig {
    pub count: usize,
    pub max_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub connection_distance: f32,
    pub connection_opacity: f32,
    pub pointer_radius: f32,
    pub pointer_force: f32,
    pub pulse_speed: f32,
    pub color: Rgb,
    pub color_alt: Rgb,
    pub formation_text: String,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 120,
            max_speed: 0.3,
            min_radius: 1.0,
            max_radius: 2.5,
            connection_distance: 140.0,
            connection_opacity: 0.08,
            pointer_radius: 180.0,
            pointer_force: 0.015,
            pulse_speed: 0.008,
            color: Rgb { r: 79, g: 209, b: 197 },
            color_alt: Rgb { r: 128, g: 90, b: 213 },
            formation_text: String::new(),
        }
    }
}

impl ParticleConfig {
    /// Build a config from an attribute lookup (the canvas dataset on the web
    /// side, a plain map in tests). Keys use the dataset camelCase convention.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            count: parse_usize(lookup("count"), d.count),
            max_speed: parse_f32(lookup("speed"), d.max_speed),
            min_radius: parse_f32(lookup("sizeMin"), d.min_radius),
            max_radius: parse_f32(lookup("sizeMax"), d.max_radius),
            connection_distance: parse_f32(lookup("connectDistance"), d.connection_distance),
            connection_opacity: parse_f32(lookup("connectOpacity"), d.connection_opacity),
            pointer_radius: parse_f32(lookup("pushRange"), d.pointer_radius),
            pointer_force: parse_f32(lookup("pushForce"), d.pointer_force),
            pulse_speed: parse_f32(lookup("pulseSpeed"), d.pulse_speed),
            color: parse_rgb(lookup("color"), d.color),
            color_alt: parse_rgb(lookup("colorAlt"), d.color_alt),
            formation_text: lookup("formation").unwrap_or_default(),
        }
    }
}

pub fn parse_f32(raw: Option<String>, fallback: f32) -> f32 {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(fallback)
}

pub fn parse_usize(raw: Option<String>, fallback: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(fallback)
}

pub fn parse_rgb(raw: Option<String>, fallback: Rgb) -> Rgb {
    raw.and_then(|s| s.parse::<Rgb>().ok()).unwrap_or(fallback)
}
