//! Uniform point sampling over a polygon by bounding-box rejection.
use geo::{BoundingRect, Contains, Polygon};
use glam::DVec2;
use rand::RngCore;

use crate::error::{Error, Result};
use crate::geometry::{from_coord, to_point, validate_polygon};
use crate::sampling::{rand01, PointSampling};

/// Draws points uniformly distributed over the interior of a polygon.
///
/// A candidate is drawn uniformly from the bounding box and accepted only if it
/// falls inside the polygon (points inside holes are rejected). The acceptance
/// rate equals the ratio of polygon area to bounding-box area.
#[derive(Debug, Clone)]
pub struct PolygonSampler {
    polygon: Polygon<f64>,
    min: DVec2,
    extent: DVec2,
}

impl PolygonSampler {
    /// Create a sampler over `polygon`.
    ///
    /// Fails with [`Error::InvalidGeometry`] for polygons without interior area,
    /// which would otherwise make [`PointSampling::draw`] retry forever.
    pub fn new(polygon: Polygon<f64>) -> Result<Self> {
        validate_polygon(&polygon)?;
        let rect = polygon
            .bounding_rect()
            .ok_or_else(|| Error::InvalidGeometry("polygon has no bounding box".into()))?;
        let min = from_coord(rect.min());
        let extent = DVec2::new(rect.width(), rect.height());
        Ok(Self {
            polygon,
            min,
            extent,
        })
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Bounded variant of [`PointSampling::draw`]: gives up after `max_attempts` rejections.
    pub fn try_draw(&self, rng: &mut dyn RngCore, max_attempts: usize) -> Option<DVec2> {
        (0..max_attempts).find_map(|_| {
            let p = self.box_point(rng);
            self.polygon.contains(&to_point(p)).then_some(p)
        })
    }

    #[inline]
    fn box_point(&self, rng: &mut dyn RngCore) -> DVec2 {
        let u = rand01(rng);
        let v = rand01(rng);
        self.min + DVec2::new(u * self.extent.x, v * self.extent.y)
    }
}

impl PointSampling for PolygonSampler {
    fn draw(&self, rng: &mut dyn RngCore) -> DVec2 {
        loop {
            let p = self.box_point(rng);
            if self.polygon.contains(&to_point(p)) {
                return p;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::geometry::polygon_from_vertices;

    fn unit_square() -> Polygon<f64> {
        polygon_from_vertices(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    #[test]
    fn draws_stay_inside_unit_square() {
        let sampler = PolygonSampler::new(unit_square()).expect("valid square");
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let p = sampler.draw(&mut rng);
            assert!((0.0..=1.0).contains(&p.x), "x out of range: {}", p.x);
            assert!((0.0..=1.0).contains(&p.y), "y out of range: {}", p.y);
        }
    }

    #[test]
    fn draws_avoid_holes() {
        let outer = LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let hole = LineString::from(vec![(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]);
        let sampler = PolygonSampler::new(Polygon::new(outer, vec![hole])).expect("valid ring");
        let mut rng = StdRng::seed_from_u64(5);
        for p in sampler.draw_many(2_000, &mut rng) {
            let in_hole = p.x > 1.0 && p.x < 3.0 && p.y > 1.0 && p.y < 3.0;
            assert!(!in_hole, "sample {p:?} fell inside the hole");
        }
    }

    #[test]
    fn draws_cover_a_triangle_uniformly() {
        let triangle = polygon_from_vertices(&[(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]);
        let sampler = PolygonSampler::new(triangle).expect("valid triangle");
        let mut rng = StdRng::seed_from_u64(9);
        let points = sampler.draw_many(8_000, &mut rng);
        assert!(points.iter().all(|p| p.x + p.y <= 2.0));

        // The sub-triangle x + y < 1 holds a quarter of the area.
        let near = points.iter().filter(|p| p.x + p.y < 1.0).count() as f64;
        let share = near / points.len() as f64;
        assert!((share - 0.25).abs() < 0.03, "share {share}");
    }

    #[test]
    fn zero_area_polygon_fails_fast() {
        let flat = polygon_from_vertices(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert!(matches!(
            PolygonSampler::new(flat),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn try_draw_respects_attempt_budget() {
        let sampler = PolygonSampler::new(unit_square()).expect("valid square");
        let mut rng = StdRng::seed_from_u64(3);
        assert!(sampler.try_draw(&mut rng, 0).is_none());
        assert!(sampler.try_draw(&mut rng, 16).is_some());
    }

    #[test]
    fn determinism_for_same_seed() {
        let sampler = PolygonSampler::new(unit_square()).expect("valid square");
        let mut rng_a = StdRng::seed_from_u64(123);
        let mut rng_b = StdRng::seed_from_u64(123);
        assert_eq!(
            sampler.draw_many(32, &mut rng_a),
            sampler.draw_many(32, &mut rng_b)
        );
    }
}
