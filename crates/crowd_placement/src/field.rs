//! The field: domain, obstacles, targets and the occupied region derived from them.
use geo::{BooleanOps, Contains, Intersects, MultiPolygon, Polygon};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{validate_polygon, validate_region};

/// Owner of the domain polygon and the obstacle and target unions.
///
/// The occupied region (obstacles ∪ targets) is recomputed after every mutation,
/// so queries never see a stale view.
#[derive(Debug, Clone)]
pub struct Field {
    domain: Option<Polygon<f64>>,
    obstacles: MultiPolygon<f64>,
    targets: MultiPolygon<f64>,
    occupied: MultiPolygon<f64>,
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl Field {
    /// Create a field without domain, obstacles or targets.
    pub fn new() -> Self {
        Self {
            domain: None,
            obstacles: MultiPolygon::new(Vec::new()),
            targets: MultiPolygon::new(Vec::new()),
            occupied: MultiPolygon::new(Vec::new()),
        }
    }

    /// Create a field bounded by `domain`.
    pub fn with_domain(domain: Polygon<f64>) -> Result<Self> {
        let mut field = Self::new();
        field.set_domain(domain)?;
        Ok(field)
    }

    /// Set the bounding region. May only be called once.
    pub fn set_domain(&mut self, domain: Polygon<f64>) -> Result<()> {
        if self.domain.is_some() {
            return Err(Error::DomainAlreadySet);
        }
        validate_polygon(&domain)?;
        self.domain = Some(domain);
        Ok(())
    }

    pub fn domain(&self) -> Option<&Polygon<f64>> {
        self.domain.as_ref()
    }

    pub fn obstacles(&self) -> &MultiPolygon<f64> {
        &self.obstacles
    }

    pub fn targets(&self) -> &MultiPolygon<f64> {
        &self.targets
    }

    pub fn occupied(&self) -> &MultiPolygon<f64> {
        &self.occupied
    }

    pub fn add_obstacle(&mut self, obstacle: impl Into<MultiPolygon<f64>>) -> Result<()> {
        let obstacle = obstacle.into();
        validate_region(&obstacle)?;
        self.obstacles = self.obstacles.union(&obstacle);
        self.refresh_occupied();
        debug!(parts = self.obstacles.0.len(), "Obstacle added.");
        Ok(())
    }

    pub fn remove_obstacle(&mut self, obstacle: impl Into<MultiPolygon<f64>>) -> Result<()> {
        let obstacle = obstacle.into();
        validate_region(&obstacle)?;
        self.obstacles = self.obstacles.difference(&obstacle);
        self.refresh_occupied();
        debug!(parts = self.obstacles.0.len(), "Obstacle removed.");
        Ok(())
    }

    pub fn add_target(&mut self, target: impl Into<MultiPolygon<f64>>) -> Result<()> {
        let target = target.into();
        validate_region(&target)?;
        self.targets = self.targets.union(&target);
        self.refresh_occupied();
        debug!(parts = self.targets.0.len(), "Target added.");
        Ok(())
    }

    pub fn remove_target(&mut self, target: impl Into<MultiPolygon<f64>>) -> Result<()> {
        let target = target.into();
        validate_region(&target)?;
        self.targets = self.targets.difference(&target);
        self.refresh_occupied();
        debug!(parts = self.targets.0.len(), "Target removed.");
        Ok(())
    }

    /// True if `geometry` intersects the occupied region. Touching the boundary counts.
    pub fn intersects_occupied<G>(&self, geometry: &G) -> bool
    where
        MultiPolygon<f64>: Intersects<G>,
    {
        self.occupied.intersects(geometry)
    }

    /// True if `surface` lies entirely within the domain.
    pub fn domain_contains(&self, surface: &Polygon<f64>) -> Result<bool> {
        let domain = self.domain.as_ref().ok_or(Error::MissingDomain)?;
        Ok(domain.contains(surface))
    }

    fn refresh_occupied(&mut self) {
        self.occupied = self.obstacles.union(&self.targets);
    }
}

#[cfg(test)]
mod tests {
    use geo::Area;
    use glam::DVec2;

    use super::*;
    use crate::geometry::{circle_polygon, polygon_from_vertices, rectangle, to_point};

    fn square(min: f64, max: f64) -> Polygon<f64> {
        rectangle(DVec2::splat(min), DVec2::splat(max))
    }

    #[test]
    fn domain_can_only_be_set_once() {
        let mut field = Field::with_domain(square(0.0, 10.0)).unwrap();
        assert!(matches!(
            field.set_domain(square(0.0, 5.0)),
            Err(Error::DomainAlreadySet)
        ));
    }

    #[test]
    fn occupied_is_union_of_obstacles_and_targets() {
        let mut field = Field::with_domain(square(0.0, 10.0)).unwrap();
        field.add_obstacle(square(1.0, 2.0)).unwrap();
        field.add_target(square(5.0, 6.0)).unwrap();

        assert!(field.intersects_occupied(&to_point(DVec2::new(1.5, 1.5))));
        assert!(field.intersects_occupied(&to_point(DVec2::new(5.5, 5.5))));
        assert!(!field.intersects_occupied(&to_point(DVec2::new(3.5, 3.5))));
        assert!((field.occupied().unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn adding_a_contained_obstacle_is_a_no_op() {
        let mut field = Field::new();
        field.add_obstacle(square(0.0, 4.0)).unwrap();
        let before = field.obstacles().unsigned_area();
        field.add_obstacle(square(1.0, 2.0)).unwrap();
        assert!((field.obstacles().unsigned_area() - before).abs() < 1e-9);
    }

    #[test]
    fn removing_an_obstacle_keeps_overlapping_target() {
        let mut field = Field::new();
        field.add_obstacle(square(0.0, 2.0)).unwrap();
        field.add_target(square(1.0, 3.0)).unwrap();
        field.remove_obstacle(square(0.0, 2.0)).unwrap();

        assert!(field.obstacles().0.is_empty() || field.obstacles().unsigned_area() < 1e-9);
        // The target part that overlapped the removed obstacle is still occupied.
        assert!(field.intersects_occupied(&to_point(DVec2::new(1.5, 1.5))));
        assert!(!field.intersects_occupied(&to_point(DVec2::new(0.5, 0.5))));
    }

    #[test]
    fn touching_the_occupied_region_counts() {
        let mut field = Field::new();
        field.add_obstacle(square(0.0, 1.0)).unwrap();
        let neighbour = square(1.0, 2.0);
        assert!(field.intersects_occupied(&neighbour));
    }

    #[test]
    fn disk_obstacle_blocks_nearby_bodies() {
        let mut field = Field::with_domain(square(0.0, 10.0)).unwrap();
        field
            .add_obstacle(circle_polygon(DVec2::new(5.0, 5.0), 2.0, 32))
            .unwrap();
        let near = circle_polygon(DVec2::new(7.2, 5.0), 0.3, 32);
        let far = circle_polygon(DVec2::new(8.0, 5.0), 0.3, 32);
        assert!(field.intersects_occupied(&near));
        assert!(!field.intersects_occupied(&far));
    }

    #[test]
    fn invalid_obstacle_is_rejected_without_mutation() {
        let mut field = Field::new();
        field.add_obstacle(square(0.0, 1.0)).unwrap();
        let bowtie = polygon_from_vertices(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        assert!(matches!(
            field.add_obstacle(bowtie),
            Err(Error::InvalidGeometry(_))
        ));
        assert!((field.occupied().unsigned_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn domain_containment_requires_a_domain() {
        let field = Field::new();
        assert!(matches!(
            field.domain_contains(&square(0.0, 1.0)),
            Err(Error::MissingDomain)
        ));

        let field = Field::with_domain(square(0.0, 10.0)).unwrap();
        assert!(field.domain_contains(&square(2.0, 3.0)).unwrap());
        assert!(!field.domain_contains(&square(8.0, 12.0)).unwrap());
    }
}
