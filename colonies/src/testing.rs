//! Synthetic position generators for tests.

#![allow(dead_code)]

use glam::DVec2;
use rand::Rng;

pub use common::log_setup::init_test_tracing as init_tracing;

/// `n` points uniformly distributed in `[0, extent)²`.
pub fn uniform_points<R: Rng>(rng: &mut R, n: usize, extent: f64) -> Vec<DVec2> {
    (0..n)
        .map(|_| DVec2::new(rng.random_range(0.0..extent), rng.random_range(0.0..extent)))
        .collect()
}

/// Isotropic Gaussian blobs, `per_blob` points each, emitted blob by blob.
pub fn gaussian_blobs<R: Rng>(
    rng: &mut R,
    centers: &[DVec2],
    per_blob: usize,
    sigma: f64,
) -> Vec<DVec2> {
    let mut points = Vec::with_capacity(centers.len() * per_blob);
    for &center in centers {
        for _ in 0..per_blob {
            points.push(center + standard_normal_pair(rng) * sigma);
        }
    }
    points
}

/// Two independent standard normal samples (Box-Muller).
fn standard_normal_pair<R: Rng>(rng: &mut R) -> DVec2 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random_range(0.0..1.0);
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = std::f64::consts::TAU * u2;
    DVec2::new(r * theta.cos(), r * theta.sin())
}
