//! Point sampling inside planar regions.
//!
//! This module defines the [`PointSampling`] trait used by placement to propose
//! candidate agent positions, and the uniform helper shared by samplers and
//! parameter distributions.
use glam::DVec2;
use rand::RngCore;

pub mod polygon;

pub use polygon::PolygonSampler;

/// Trait for drawing independent candidate points.
pub trait PointSampling {
    /// Draw one point. Each draw is independent of every previous draw.
    fn draw(&self, rng: &mut dyn RngCore) -> DVec2;

    /// Draw `n` independent points.
    fn draw_many(&self, n: usize, rng: &mut dyn RngCore) -> Vec<DVec2> {
        (0..n).map(|_| self.draw(rng)).collect()
    }
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f64 {
    // 53 random mantissa bits.
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}
