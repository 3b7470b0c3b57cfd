//! Normal draws over a shared uniform source.
//!
//! Box-Muller over two uniform draws. Each call consumes exactly two values
//! from the generator, which keeps the consumption order easy to document.

use std::f64::consts::PI;

use rand::{Rng, RngCore};

/// Draw from N(0, 1).
pub fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    // Lower bound keeps ln() finite.
    let u1: f64 = rng.random_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.random_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Draw from N(`mean`, `std_dev`).
pub fn normal(rng: &mut dyn RngCore, mean: f64, std_dev: f64) -> f64 {
    standard_normal(rng).mul_add(std_dev, mean)
}

/// Clip into `[0, 1]`; NaN maps to 0.
pub fn unit_clip(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
