//! Agent body shapes and the fixed-capacity agent store.
//!
//! Agents come in two body variants: a single disk ([`BodyVariant::Circular`]) or a
//! torso disk flanked by two shoulder disks ([`BodyVariant::ThreeCircle`]). Realized
//! shapes are described by [`Body`]; shoulder positions are always derived from the
//! torso center, orientation and shape ratios, never stored.
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use geo::MultiPolygon;
use glam::DVec2;

use crate::error::{Error, Result};
use crate::geometry::circle_polygon;
use crate::overlap::{circle_overlap, three_circle_overlap};

pub mod store;

pub use store::{AgentRecord, AgentStore};

/// Body shape used by every agent of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BodyVariant {
    Circular,
    ThreeCircle,
}

impl BodyVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyVariant::Circular => "circular",
            BodyVariant::ThreeCircle => "three_circle",
        }
    }
}

impl fmt::Display for BodyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "circular" => Ok(BodyVariant::Circular),
            "three_circle" => Ok(BodyVariant::ThreeCircle),
            other => Err(Error::InvalidConfig(format!(
                "unknown agent model '{other}' (expected 'circular' or 'three_circle')"
            ))),
        }
    }
}

/// Ratios of the three-circle body relative to the total body radius.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeRatios {
    /// Torso radius over body radius.
    pub torso: f64,
    /// Shoulder radius over body radius.
    pub shoulder: f64,
    /// Torso-to-shoulder center distance over body radius.
    pub torso_shoulder: f64,
}

impl ShapeRatios {
    pub fn new(torso: f64, shoulder: f64, torso_shoulder: f64) -> Self {
        Self {
            torso,
            shoulder,
            torso_shoulder,
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("torso", self.torso),
            ("shoulder", self.shoulder),
            ("torso_shoulder", self.torso_shoulder),
        ] {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(Error::Precondition(format!(
                    "{name} ratio must be in (0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ShapeRatios {
    fn default() -> Self {
        Self::new(0.5882, 0.3725, 0.6275)
    }
}

/// A disk in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Realized geometry of one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body {
    Circular(Circle),
    /// Torso, left shoulder, right shoulder.
    ThreeCircle([Circle; 3]),
}

impl Body {
    /// Build the body of the given variant from its defining parameters.
    pub fn new(
        variant: BodyVariant,
        center: DVec2,
        orientation: f64,
        radius: f64,
        ratios: ShapeRatios,
    ) -> Self {
        match variant {
            BodyVariant::Circular => Body::Circular(Circle::new(center, radius)),
            BodyVariant::ThreeCircle => {
                Body::ThreeCircle(three_circle_parts(center, orientation, radius, ratios))
            }
        }
    }

    pub fn variant(&self) -> BodyVariant {
        match self {
            Body::Circular(_) => BodyVariant::Circular,
            Body::ThreeCircle(_) => BodyVariant::ThreeCircle,
        }
    }

    pub fn circles(&self) -> &[Circle] {
        match self {
            Body::Circular(c) => std::slice::from_ref(c),
            Body::ThreeCircle(parts) => parts,
        }
    }

    /// Overlap test between two bodies using the strict circle rule.
    pub fn overlaps(&self, other: &Body) -> bool {
        match (self, other) {
            (Body::Circular(a), Body::Circular(b)) => {
                circle_overlap(a.center, a.radius, b.center, b.radius)
            }
            (Body::ThreeCircle(a), Body::ThreeCircle(b)) => three_circle_overlap(a, b),
            _ => self.circles().iter().any(|a| {
                other
                    .circles()
                    .iter()
                    .any(|b| circle_overlap(a.center, a.radius, b.center, b.radius))
            }),
        }
    }

    /// Polygonal approximation circumscribing every disk of the body.
    pub fn to_multi_polygon(&self, segments: usize) -> MultiPolygon<f64> {
        MultiPolygon::new(
            self.circles()
                .iter()
                .map(|c| circle_polygon(c.center, c.radius, segments))
                .collect(),
        )
    }
}

/// Derive torso and shoulder disks of a three-circle body.
///
/// The shoulders sit on the axis perpendicular to `orientation`, at distance
/// `ratios.torso_shoulder * radius` on either side of the torso center.
pub fn three_circle_parts(
    center: DVec2,
    orientation: f64,
    radius: f64,
    ratios: ShapeRatios,
) -> [Circle; 3] {
    let offset = DVec2::from_angle(orientation).perp() * (ratios.torso_shoulder * radius);
    let r_torso = ratios.torso * radius;
    let r_shoulder = ratios.shoulder * radius;
    [
        Circle::new(center, r_torso),
        Circle::new(center - offset, r_shoulder),
        Circle::new(center + offset, r_shoulder),
    ]
}

/// Per-agent values committed by [`AgentStore::add`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentParams {
    pub position: DVec2,
    /// Facing angle in radians; only shapes three-circle bodies.
    pub orientation: f64,
    pub mass: f64,
    /// Total body radius.
    pub radius: f64,
    pub ratios: ShapeRatios,
    pub inertia_rot: f64,
    pub max_velocity: f64,
    pub max_angular_velocity: f64,
}

impl AgentParams {
    /// Parameters for an average adult body at `position` with the given radius.
    pub fn new(position: DVec2, radius: f64) -> Self {
        Self {
            position,
            orientation: 0.0,
            mass: 73.5,
            radius,
            ratios: ShapeRatios::default(),
            inertia_rot: 4.0 * PI,
            max_velocity: 1.25,
            max_angular_velocity: 4.0 * PI,
        }
    }

    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_ratios(mut self, ratios: ShapeRatios) -> Self {
        self.ratios = ratios;
        self
    }

    /// Realized geometry of these parameters for the given variant.
    pub fn body(&self, variant: BodyVariant) -> Body {
        Body::new(
            variant,
            self.position,
            self.orientation,
            self.radius,
            self.ratios,
        )
    }

    pub(crate) fn validate(&self, variant: BodyVariant) -> Result<()> {
        if !self.position.is_finite() {
            return Err(Error::Precondition(format!(
                "position must be finite, got {}",
                self.position
            )));
        }
        if !self.orientation.is_finite() {
            return Err(Error::Precondition("orientation must be finite".into()));
        }
        for (name, value) in [
            ("radius", self.radius),
            ("mass", self.mass),
            ("inertia_rot", self.inertia_rot),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Precondition(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("max_velocity", self.max_velocity),
            ("max_angular_velocity", self.max_angular_velocity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Precondition(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if variant == BodyVariant::ThreeCircle {
            self.ratios.validate()?;
        }
        Ok(())
    }
}
