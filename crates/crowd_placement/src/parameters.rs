//! Distributions of agent body parameters, keyed by body type.
//!
//! Placement asks a [`ParameterSource`] for the [`BodyDistribution`] of a body type
//! label once per call, then draws one [`BodyParameters`] per candidate.
use std::collections::HashMap;
use std::f64::consts::PI;

use glam::DVec2;
use rand::RngCore;
use rand_distr::{Distribution, Normal};

use crate::agent::{AgentParams, BodyVariant, ShapeRatios};
use crate::error::{Error, Result};
use crate::sampling::rand01;

const TRUNCATION_ATTEMPTS: usize = 64;

/// A distribution over a single scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scalar {
    Constant(f64),
    Uniform {
        low: f64,
        high: f64,
    },
    /// Normal distribution restricted to `mean ± bound * std_dev`.
    TruncatedNormal {
        mean: f64,
        std_dev: f64,
        bound: f64,
    },
}

impl Scalar {
    pub fn truncated_normal(mean: f64, std_dev: f64) -> Self {
        Scalar::TruncatedNormal {
            mean,
            std_dev,
            bound: 3.0,
        }
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        match *self {
            Scalar::Constant(v) => v,
            Scalar::Uniform { low, high } => low + rand01(rng) * (high - low),
            Scalar::TruncatedNormal {
                mean,
                std_dev,
                bound,
            } => {
                // Unreachable after `BodyDistribution::validate`.
                let Ok(normal) = Normal::new(mean, std_dev) else {
                    return mean;
                };
                let lo = mean - bound * std_dev;
                let hi = mean + bound * std_dev;
                for _ in 0..TRUNCATION_ATTEMPTS {
                    let x = normal.sample(rng);
                    if (lo..=hi).contains(&x) {
                        return x;
                    }
                }
                normal.sample(rng).clamp(lo, hi)
            }
        }
    }

    /// Closed interval every sample falls in.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            Scalar::Constant(v) => (v, v),
            Scalar::Uniform { low, high } => (low.min(high), low.max(high)),
            Scalar::TruncatedNormal {
                mean,
                std_dev,
                bound,
            } => (mean - bound * std_dev, mean + bound * std_dev),
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        let finite = match *self {
            Scalar::Constant(v) => v.is_finite(),
            Scalar::Uniform { low, high } => low.is_finite() && high.is_finite() && low <= high,
            Scalar::TruncatedNormal {
                mean,
                std_dev,
                bound,
            } => mean.is_finite() && std_dev.is_finite() && std_dev >= 0.0 && bound >= 0.0,
        };
        if finite {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!(
                "distribution for {name} is malformed: {self:?}"
            )))
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Constant(value)
    }
}

/// One draw of body parameters for a candidate agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyParameters {
    pub mass: f64,
    pub radius: f64,
    pub ratios: ShapeRatios,
    pub inertia_rot: f64,
    pub max_velocity: f64,
    pub max_angular_velocity: f64,
    pub orientation: f64,
}

impl BodyParameters {
    /// Attach a position to produce agent parameters ready for commit.
    pub fn at(&self, position: DVec2) -> AgentParams {
        AgentParams {
            position,
            orientation: self.orientation,
            mass: self.mass,
            radius: self.radius,
            ratios: self.ratios,
            inertia_rot: self.inertia_rot,
            max_velocity: self.max_velocity,
            max_angular_velocity: self.max_angular_velocity,
        }
    }
}

/// Distributions for every drawn body parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyDistribution {
    pub mass: Scalar,
    pub radius: Scalar,
    pub ratio_torso: Scalar,
    pub ratio_shoulder: Scalar,
    pub ratio_torso_shoulder: Scalar,
    pub inertia_rot: Scalar,
    pub max_velocity: Scalar,
    pub max_angular_velocity: Scalar,
    pub orientation: Scalar,
}

impl BodyDistribution {
    /// Human body with the given torso ratios and normally distributed size, speed and mass.
    pub fn human(
        ratios: ShapeRatios,
        radius: (f64, f64),
        velocity: (f64, f64),
        mass: (f64, f64),
    ) -> Self {
        Self {
            mass: Scalar::truncated_normal(mass.0, mass.1),
            radius: Scalar::truncated_normal(radius.0, radius.1),
            ratio_torso: Scalar::Constant(ratios.torso),
            ratio_shoulder: Scalar::Constant(ratios.shoulder),
            ratio_torso_shoulder: Scalar::Constant(ratios.torso_shoulder),
            inertia_rot: Scalar::Constant(4.0 * PI),
            max_velocity: Scalar::truncated_normal(velocity.0, velocity.1),
            max_angular_velocity: Scalar::Constant(4.0 * PI),
            orientation: Scalar::Constant(0.0),
        }
    }

    /// Every parameter constant; handy for deterministic layouts.
    pub fn fixed(radius: f64) -> Self {
        Self {
            radius: Scalar::Constant(radius),
            mass: Scalar::Constant(73.5),
            max_velocity: Scalar::Constant(1.25),
            ..Self::human(
                ShapeRatios::default(),
                (radius, 0.0),
                (1.25, 0.0),
                (73.5, 0.0),
            )
        }
    }

    pub fn with_radius(mut self, radius: impl Into<Scalar>) -> Self {
        self.radius = radius.into();
        self
    }

    pub fn with_orientation(mut self, orientation: impl Into<Scalar>) -> Self {
        self.orientation = orientation.into();
        self
    }

    pub fn with_ratios(mut self, ratios: ShapeRatios) -> Self {
        self.ratio_torso = Scalar::Constant(ratios.torso);
        self.ratio_shoulder = Scalar::Constant(ratios.shoulder);
        self.ratio_torso_shoulder = Scalar::Constant(ratios.torso_shoulder);
        self
    }

    pub fn draw(&self, rng: &mut dyn RngCore) -> BodyParameters {
        BodyParameters {
            mass: self.mass.sample(rng),
            radius: self.radius.sample(rng),
            ratios: ShapeRatios::new(
                self.ratio_torso.sample(rng),
                self.ratio_shoulder.sample(rng),
                self.ratio_torso_shoulder.sample(rng),
            ),
            inertia_rot: self.inertia_rot.sample(rng),
            max_velocity: self.max_velocity.sample(rng),
            max_angular_velocity: self.max_angular_velocity.sample(rng),
            orientation: self.orientation.sample(rng),
        }
    }

    /// Check that every distribution is well formed.
    pub fn validate(&self) -> Result<()> {
        self.mass.validate("mass")?;
        self.radius.validate("radius")?;
        self.ratio_torso.validate("ratio_torso")?;
        self.ratio_shoulder.validate("ratio_shoulder")?;
        self.ratio_torso_shoulder.validate("ratio_torso_shoulder")?;
        self.inertia_rot.validate("inertia_rot")?;
        self.max_velocity.validate("max_velocity")?;
        self.max_angular_velocity.validate("max_angular_velocity")?;
        self.orientation.validate("orientation")?;
        Ok(())
    }

    /// Check that every value this distribution can draw is accepted by an
    /// agent store of `variant`.
    ///
    /// Sizes, mass and inertia must stay strictly positive, velocity bounds
    /// non-negative, and for three-circle bodies every shape ratio in (0, 1].
    pub fn check_support(&self, variant: BodyVariant) -> Result<()> {
        for (name, scalar) in [
            ("radius", &self.radius),
            ("mass", &self.mass),
            ("inertia_rot", &self.inertia_rot),
        ] {
            let (lo, hi) = scalar.support();
            if lo <= 0.0 {
                return Err(Error::Precondition(format!(
                    "{name} must be positive, support is [{lo}, {hi}]"
                )));
            }
        }
        for (name, scalar) in [
            ("max_velocity", &self.max_velocity),
            ("max_angular_velocity", &self.max_angular_velocity),
        ] {
            let (lo, hi) = scalar.support();
            if lo < 0.0 {
                return Err(Error::Precondition(format!(
                    "{name} must be non-negative, support is [{lo}, {hi}]"
                )));
            }
        }
        if variant == BodyVariant::ThreeCircle {
            for (name, scalar) in [
                ("ratio_torso", &self.ratio_torso),
                ("ratio_shoulder", &self.ratio_shoulder),
                ("ratio_torso_shoulder", &self.ratio_torso_shoulder),
            ] {
                let (lo, hi) = scalar.support();
                if lo <= 0.0 || hi > 1.0 {
                    return Err(Error::Precondition(format!(
                        "{name} must lie in (0, 1] for three-circle bodies, support is [{lo}, {hi}]"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Supplies body distributions for body type labels.
pub trait ParameterSource {
    fn distribution(&self, body_type: &str) -> Result<&BodyDistribution>;
}

/// A single distribution serves every label.
impl ParameterSource for BodyDistribution {
    fn distribution(&self, _body_type: &str) -> Result<&BodyDistribution> {
        Ok(self)
    }
}

/// Named body types.
#[derive(Debug, Clone)]
pub struct BodyTypeTable {
    types: HashMap<String, BodyDistribution>,
}

impl BodyTypeTable {
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, distribution: BodyDistribution) {
        self.types.insert(name.into(), distribution);
    }

    pub fn with(mut self, name: impl Into<String>, distribution: BodyDistribution) -> Self {
        self.insert(name, distribution);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Default for BodyTypeTable {
    /// Built-in human body types: `adult`, `male`, `female`, `child`, `elderly`.
    fn default() -> Self {
        let entries = [
            // name, (rt, rs, rts), radius (mean, dev), velocity (mean, dev), mass (mean, dev)
            ("adult", (0.5882, 0.3725, 0.6275), (0.255, 0.035), (1.25, 0.30), (73.5, 8.0)),
            ("male", (0.5926, 0.3704, 0.6296), (0.270, 0.020), (1.35, 0.20), (80.0, 8.0)),
            ("female", (0.5833, 0.3750, 0.6250), (0.240, 0.020), (1.15, 0.20), (67.0, 6.7)),
            ("child", (0.5714, 0.3333, 0.6667), (0.210, 0.015), (0.90, 0.30), (57.0, 5.7)),
            ("elderly", (0.6000, 0.3600, 0.6400), (0.250, 0.020), (0.80, 0.20), (70.0, 7.0)),
        ];
        let mut table = Self::empty();
        for (name, (rt, rs, rts), radius, velocity, mass) in entries {
            table.insert(
                name,
                BodyDistribution::human(ShapeRatios::new(rt, rs, rts), radius, velocity, mass),
            );
        }
        table
    }
}

impl ParameterSource for BodyTypeTable {
    fn distribution(&self, body_type: &str) -> Result<&BodyDistribution> {
        self.types
            .get(body_type)
            .ok_or_else(|| Error::UnknownBodyType {
                name: body_type.to_owned(),
            })
    }
}
