//! Polygon validation and conversions between `glam` vectors and `geo` geometry.
use std::f64::consts::PI;

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BoundingRect, Coord, Line, LineString, MultiPolygon, Point, Polygon};
use glam::DVec2;

use crate::error::{Error, Result};

/// Smallest vertex count accepted for polygonal disk approximations.
pub const MIN_CIRCLE_SEGMENTS: usize = 8;

#[inline]
pub fn to_coord(p: DVec2) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

#[inline]
pub fn to_point(p: DVec2) -> Point<f64> {
    Point::new(p.x, p.y)
}

#[inline]
pub fn from_coord(c: Coord<f64>) -> DVec2 {
    DVec2::new(c.x, c.y)
}

/// Build a polygon from an ordered list of exterior vertices. The ring is closed automatically.
pub fn polygon_from_vertices(vertices: &[(f64, f64)]) -> Polygon<f64> {
    Polygon::new(LineString::from(vertices.to_vec()), Vec::new())
}

/// Axis-aligned rectangle polygon spanning `min..max`.
pub fn rectangle(min: DVec2, max: DVec2) -> Polygon<f64> {
    polygon_from_vertices(&[(min.x, min.y), (max.x, min.y), (max.x, max.y), (min.x, max.y)])
}

/// Regular polygon with `segments` vertices that circumscribes the disk at `center`.
///
/// Every point of the disk lies inside the returned polygon, so a polygon that does
/// not intersect some region guarantees the disk does not either.
pub fn circle_polygon(center: DVec2, radius: f64, segments: usize) -> Polygon<f64> {
    let n = segments.max(3);
    let outer = radius / (PI / n as f64).cos();
    let step = 2.0 * PI / n as f64;
    let ring: Vec<Coord<f64>> = (0..n)
        .map(|k| to_coord(center + DVec2::from_angle(k as f64 * step) * outer))
        .collect();
    Polygon::new(LineString::new(ring), Vec::new())
}

/// Check that a polygon is usable as a region or sampling surface.
///
/// Rejects non-finite coordinates, rings with fewer than three distinct vertices,
/// self-intersecting rings and polygons without interior area.
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<()> {
    validate_ring(polygon.exterior(), "exterior")?;
    for (i, hole) in polygon.interiors().iter().enumerate() {
        validate_ring(hole, &format!("interior ring {i}"))?;
    }

    let area = polygon.unsigned_area();
    let bbox_area = polygon
        .bounding_rect()
        .map(|r| r.width() * r.height())
        .unwrap_or(0.0);
    if !area.is_finite() || area <= f64::EPSILON * bbox_area.max(f64::MIN_POSITIVE) {
        return Err(Error::InvalidGeometry("polygon has zero area".into()));
    }
    Ok(())
}

/// Validate every polygon of a region. An empty region is valid.
pub fn validate_region(region: &MultiPolygon<f64>) -> Result<()> {
    region.0.iter().try_for_each(validate_polygon)
}

fn validate_ring(ring: &LineString<f64>, name: &str) -> Result<()> {
    if ring.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(Error::InvalidGeometry(format!(
            "{name} has non-finite coordinates"
        )));
    }

    let segments: Vec<Line<f64>> = ring.lines().filter(|l| l.start != l.end).collect();
    if segments.len() < 3 {
        return Err(Error::InvalidGeometry(format!(
            "{name} needs at least three distinct vertices"
        )));
    }

    let n = segments.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(segments[i], segments[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => {
                    return Err(Error::InvalidGeometry(format!(
                        "{name} is self-intersecting (segments {i} and {j})"
                    )));
                }
            }
        }
    }
    Ok(())
}
