//! Placement of agents into a field by bounded rejection sampling.
//!
//! [`Configuration`] owns the [`Field`] and the [`AgentStore`] and drives the
//! placement loop: draw a position from the sampling surface, draw body parameters
//! for the requested body type, reject the candidate if it overlaps an active agent
//! or the occupied region, otherwise commit it. The loop is bounded by a trial
//! budget of `iteration_limit * count`, and every position draw by a fixed number
//! of sampler attempts, so dense or sliver surfaces end with a partial count
//! instead of spinning forever.
use geo::{MultiPolygon, Polygon};
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::agent::{AgentStore, BodyVariant};
use crate::error::{Error, Result};
use crate::field::Field;
use crate::geometry::MIN_CIRCLE_SEGMENTS;
use crate::overlap::overlaps_any_active;
use crate::parameters::{BodyTypeTable, ParameterSource};
use crate::sampling::PolygonSampler;

pub mod events;

use events::{EventSink, PlacementEvent, PlacementEventKind, RejectionReason};

/// Default multiplier on the requested count that bounds placement trials.
pub const DEFAULT_ITERATION_LIMIT: usize = 100;

/// Default number of bounding-box draws the sampler may spend on one trial.
pub const DEFAULT_SAMPLER_ATTEMPTS: usize = 1_000;

/// Tunables for placement.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementConfig {
    /// Trial budget multiplier used by [`Configuration::add_agents_in_domain`] and [`Configuration::fill`].
    pub iteration_limit: usize,
    /// Vertex count of the polygon approximating each disk in occupied-region checks.
    pub circle_segments: usize,
    /// Reject sampling surfaces that are not inside the domain.
    pub require_surface_in_domain: bool,
    /// Bounding-box draws per trial before the trial counts as a sampler miss.
    pub sampler_attempts: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            circle_segments: 32,
            require_surface_in_domain: true,
            sampler_attempts: DEFAULT_SAMPLER_ATTEMPTS,
        }
    }
}

impl PlacementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default iteration limit.
    pub fn with_iteration_limit(mut self, iteration_limit: usize) -> Self {
        self.iteration_limit = iteration_limit;
        self
    }

    /// Sets the disk approximation vertex count.
    pub fn with_circle_segments(mut self, circle_segments: usize) -> Self {
        self.circle_segments = circle_segments;
        self
    }

    /// Enables or disables the surface-in-domain check.
    pub fn with_require_surface_in_domain(mut self, require: bool) -> Self {
        self.require_surface_in_domain = require;
        self
    }

    /// Sets the per-trial sampler attempt budget.
    pub fn with_sampler_attempts(mut self, sampler_attempts: usize) -> Self {
        self.sampler_attempts = sampler_attempts;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.iteration_limit == 0 {
            return Err(Error::InvalidConfig("iteration_limit must be > 0".into()));
        }
        if self.circle_segments < MIN_CIRCLE_SEGMENTS {
            return Err(Error::InvalidConfig(format!(
                "circle_segments must be >= {MIN_CIRCLE_SEGMENTS}"
            )));
        }
        if self.sampler_attempts == 0 {
            return Err(Error::InvalidConfig("sampler_attempts must be > 0".into()));
        }
        Ok(())
    }
}

/// Outcome of one placement call.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementReport {
    /// Number of agents asked for.
    pub requested: usize,
    /// Number of agents committed; never more than `requested`.
    pub placed: usize,
    /// Candidates drawn, including the committed ones.
    pub trials: usize,
    /// Candidates rejected for overlapping an active agent.
    pub rejected_overlap: usize,
    /// Candidates rejected for intersecting an obstacle or target.
    pub rejected_occupied: usize,
    /// Trials in which the sampler found no point inside the surface.
    pub sampler_misses: usize,
    /// Whether the store ran out of capacity.
    pub capacity_exhausted: bool,
}

impl PlacementReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Default::default()
        }
    }

    /// True if every requested agent was placed.
    pub fn is_complete(&self) -> bool {
        self.placed == self.requested
    }
}

/// Simulation setup: a field, an agent store and a parameter source.
///
/// 1. Set up the field: domain, obstacles and targets.
/// 2. Fix the agent capacity and body variant.
/// 3. Place agents into surfaces contained in the domain.
pub struct Configuration<P: ParameterSource = BodyTypeTable> {
    field: Field,
    agents: AgentStore,
    parameters: P,
    config: PlacementConfig,
}

impl Configuration<BodyTypeTable> {
    /// Create a configuration using the built-in body type table.
    pub fn new(
        domain: Polygon<f64>,
        agent_max_num: usize,
        agent_model: BodyVariant,
    ) -> Result<Self> {
        Self::with_parameters(domain, agent_max_num, agent_model, BodyTypeTable::default())
    }
}

impl<P: ParameterSource> Configuration<P> {
    /// Create a configuration drawing body parameters from `parameters`.
    pub fn with_parameters(
        domain: Polygon<f64>,
        agent_max_num: usize,
        agent_model: BodyVariant,
        parameters: P,
    ) -> Result<Self> {
        let field = Field::with_domain(domain)?;
        let agents = AgentStore::new(agent_max_num, agent_model)?;
        Ok(Self {
            field,
            agents,
            parameters,
            config: PlacementConfig::default(),
        })
    }

    /// Replace the placement configuration.
    pub fn with_config(mut self, config: PlacementConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn parameters(&self) -> &P {
        &self.parameters
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn add_obstacle(&mut self, obstacle: impl Into<MultiPolygon<f64>>) -> Result<()> {
        self.field.add_obstacle(obstacle)
    }

    pub fn remove_obstacle(&mut self, obstacle: impl Into<MultiPolygon<f64>>) -> Result<()> {
        self.field.remove_obstacle(obstacle)
    }

    pub fn add_target(&mut self, target: impl Into<MultiPolygon<f64>>) -> Result<()> {
        self.field.add_target(target)
    }

    pub fn remove_target(&mut self, target: impl Into<MultiPolygon<f64>>) -> Result<()> {
        self.field.remove_target(target)
    }

    /// Place up to `count` agents of `body_type` into `surface` and return how many were placed.
    ///
    /// Running out of room or capacity is not an error; compare the result with
    /// `count`. Malformed inputs fail before any sampling.
    ///
    /// At most `iteration_limit * count` trials are made. Every trial draws one
    /// candidate and ends in a commit, a rejection or a sampler miss.
    pub fn add_agents<R: RngCore>(
        &mut self,
        count: usize,
        surface: &Polygon<f64>,
        body_type: &str,
        iteration_limit: usize,
        rng: &mut R,
    ) -> Result<usize> {
        self.place(count, surface, body_type, iteration_limit, rng)
            .map(|report| report.placed)
    }

    /// Like [`Configuration::add_agents`], sampling from the whole domain with the configured iteration limit.
    pub fn add_agents_in_domain<R: RngCore>(
        &mut self,
        count: usize,
        body_type: &str,
        rng: &mut R,
    ) -> Result<usize> {
        let domain = self.field.domain().cloned().ok_or(Error::MissingDomain)?;
        let limit = self.config.iteration_limit;
        self.add_agents(count, &domain, body_type, limit, rng)
    }

    /// Place as many agents as the remaining capacity allows.
    pub fn fill<R: RngCore>(
        &mut self,
        surface: &Polygon<f64>,
        body_type: &str,
        rng: &mut R,
    ) -> Result<PlacementReport> {
        let count = self.agents.remaining();
        let limit = self.config.iteration_limit;
        self.place(count, surface, body_type, limit, rng)
    }

    /// Run placement and return the full report.
    pub fn place<R: RngCore>(
        &mut self,
        count: usize,
        surface: &Polygon<f64>,
        body_type: &str,
        iteration_limit: usize,
        rng: &mut R,
    ) -> Result<PlacementReport> {
        self.place_with_events(count, surface, body_type, iteration_limit, rng, &mut ())
    }

    pub fn place_with_events<R: RngCore>(
        &mut self,
        count: usize,
        surface: &Polygon<f64>,
        body_type: &str,
        iteration_limit: usize,
        rng: &mut R,
        sink: &mut dyn EventSink,
    ) -> Result<PlacementReport> {
        if iteration_limit == 0 {
            return Err(Error::InvalidConfig("iteration_limit must be > 0".into()));
        }
        let sampler = PolygonSampler::new(surface.clone())?;
        if self.config.require_surface_in_domain
            && self.field.domain().is_some()
            && !self.field.domain_contains(surface)?
        {
            return Err(Error::SurfaceOutsideDomain);
        }
        let distribution = self.parameters.distribution(body_type)?;
        distribution.validate()?;
        distribution.check_support(self.agents.variant())?;

        let mut report = PlacementReport::new(count);
        if count == 0 {
            return Ok(report);
        }
        let max_trials = iteration_limit.saturating_mul(count);

        info!(
            "Placing {} '{}' agents ({}); trial budget {}.",
            count,
            body_type,
            self.agents.variant(),
            max_trials
        );
        if sink.wants(PlacementEventKind::PlacementStarted) {
            sink.send(PlacementEvent::PlacementStarted {
                requested: count,
                body_type: body_type.to_owned(),
                max_trials,
                config: self.config.clone(),
            });
        }

        if self.agents.is_full() {
            debug!(
                "Agent store is full ({} agents); nothing to place.",
                self.agents.capacity()
            );
            report.capacity_exhausted = true;
            if sink.wants(PlacementEventKind::CapacityExhausted) {
                sink.send(PlacementEvent::CapacityExhausted {
                    capacity: self.agents.capacity(),
                });
            }
        }

        while !report.capacity_exhausted && report.placed < count && report.trials < max_trials {
            let Some(position) = sampler.try_draw(rng, self.config.sampler_attempts) else {
                report.sampler_misses += 1;
                report.trials += 1;
                continue;
            };
            let params = distribution.draw(rng).at(position);
            let candidate = params.body(self.agents.variant());

            let rejection = if overlaps_any_active(&candidate, &self.agents) {
                Some(RejectionReason::AgentOverlap)
            } else if self
                .field
                .intersects_occupied(&candidate.to_multi_polygon(self.config.circle_segments))
            {
                Some(RejectionReason::Occupied)
            } else {
                None
            };

            if let Some(reason) = rejection {
                match reason {
                    RejectionReason::AgentOverlap => report.rejected_overlap += 1,
                    RejectionReason::Occupied => report.rejected_occupied += 1,
                }
                report.trials += 1;
                if sink.wants(PlacementEventKind::CandidateRejected) {
                    sink.send(PlacementEvent::CandidateRejected { position, reason });
                }
                continue;
            }

            if !self.agents.add(params)? {
                warn!(
                    "Agent store filled up after placing {} of {} agents.",
                    report.placed, count
                );
                report.capacity_exhausted = true;
                if sink.wants(PlacementEventKind::CapacityExhausted) {
                    sink.send(PlacementEvent::CapacityExhausted {
                        capacity: self.agents.capacity(),
                    });
                }
                break;
            }

            report.placed += 1;
            report.trials += 1;
            if sink.wants(PlacementEventKind::AgentPlaced) {
                sink.send(PlacementEvent::AgentPlaced {
                    slot: self.agents.len() - 1,
                    position,
                });
            }
        }

        if report.is_complete() {
            info!(
                "Placed {} agents in {} trials.",
                report.placed, report.trials
            );
        } else {
            warn!(
                "Placed only {} of {} '{}' agents in {} trials.",
                report.placed, count, body_type, report.trials
            );
        }
        if sink.wants(PlacementEventKind::PlacementFinished) {
            sink.send(PlacementEvent::PlacementFinished {
                report: report.clone(),
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::agent::{Body, ShapeRatios};
    use crate::geometry::polygon_from_vertices;
    use crate::parameters::{BodyDistribution, Scalar};
    use crate::geometry::{circle_polygon, rectangle};
    use crate::placement::events::VecSink;

    fn square(min: f64, max: f64) -> Polygon<f64> {
        rectangle(DVec2::splat(min), DVec2::splat(max))
    }

    fn circular(capacity: usize) -> Configuration<BodyDistribution> {
        Configuration::with_parameters(
            square(0.0, 10.0),
            capacity,
            BodyVariant::Circular,
            BodyDistribution::fixed(0.3),
        )
        .expect("valid configuration")
    }

    fn assert_pairwise_disjoint(store: &AgentStore) {
        let bodies: Vec<Body> = store.active_geometries().collect();
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                assert!(!bodies[i].overlaps(&bodies[j]), "agents {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn places_all_requested_agents_in_open_domain() {
        let mut cfg = circular(5);
        let mut rng = StdRng::seed_from_u64(1);
        let placed = cfg
            .add_agents(5, &square(0.0, 10.0), "adult", 100, &mut rng)
            .unwrap();
        assert_eq!(placed, 5);

        let positions = cfg.agents().active_positions();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                assert!(positions[i].distance(positions[j]) >= 0.6);
            }
        }
    }

    #[test]
    fn full_store_places_nothing() {
        let mut cfg = circular(5);
        let mut rng = StdRng::seed_from_u64(2);
        let domain = square(0.0, 10.0);
        cfg.add_agents(5, &domain, "adult", 100, &mut rng).unwrap();
        let before = cfg.agents().active_positions().to_vec();

        let report = cfg.place(1, &domain, "adult", 100, &mut rng).unwrap();
        assert_eq!(report.placed, 0);
        assert!(report.capacity_exhausted);
        assert_eq!(cfg.agents().len(), 5);
        assert_eq!(cfg.agents().active_positions(), before.as_slice());
    }

    #[test]
    fn agents_avoid_disk_obstacle() {
        let mut cfg = circular(60);
        let center = DVec2::new(5.0, 5.0);
        cfg.add_obstacle(circle_polygon(center, 2.0, 32)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let report = cfg
            .place(60, &square(0.0, 10.0), "adult", 100, &mut rng)
            .unwrap();
        assert!(report.placed > 0);

        for body in cfg.agents().active_geometries() {
            let polygon = body.to_multi_polygon(cfg.config().circle_segments);
            assert!(!cfg.field().intersects_occupied(&polygon));
            for c in body.circles() {
                assert!(c.center.distance(center) >= 2.0 + c.radius - 1e-9);
            }
        }
        assert_pairwise_disjoint(cfg.agents());
    }

    #[test]
    fn trial_budget_bounds_dense_surfaces() {
        let mut cfg = circular(100);
        let mut rng = StdRng::seed_from_u64(4);
        let tiny = square(4.0, 5.0);

        let report = cfg.place(50, &tiny, "adult", 1, &mut rng).unwrap();
        assert!(report.placed < 50);
        assert!(report.trials <= 50, "trials {}", report.trials);
        assert_eq!(
            report.trials,
            report.placed + report.rejected_overlap + report.rejected_occupied + report.sampler_misses
        );
        assert_pairwise_disjoint(cfg.agents());
    }

    #[test]
    fn sliver_surface_ends_within_budget() {
        let mut cfg = circular(5)
            .with_config(PlacementConfig::new().with_require_surface_in_domain(false))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(14);
        let sliver = polygon_from_vertices(&[(0.0, 0.0), (10.0, 10.0), (10.0, 10.0 + 1e-9)]);

        let report = cfg.place(1, &sliver, "adult", 1, &mut rng).unwrap();
        assert_eq!(report.trials, 1);
        assert_eq!(report.sampler_misses, 1);
        assert_eq!(report.placed, 0);
        assert!(cfg.agents().is_empty());
    }

    #[test]
    fn slow_elderly_agents_fill_a_large_room() {
        let domain = square(0.0, 60.0);
        let mut cfg = Configuration::new(domain.clone(), 2000, BodyVariant::Circular).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let placed = cfg.add_agents(1000, &domain, "elderly", 100, &mut rng).unwrap();
        assert_eq!(placed, 1000);
        for slot in 0..placed {
            let record = cfg.agents().record(slot).unwrap();
            assert!(record.params.max_velocity >= 0.0);
        }
    }

    #[test]
    fn negative_speed_distribution_fails_before_sampling() {
        let dist = BodyDistribution {
            max_velocity: Scalar::truncated_normal(0.8, 0.3),
            ..BodyDistribution::fixed(0.3)
        };
        let mut cfg =
            Configuration::with_parameters(square(0.0, 10.0), 5, BodyVariant::Circular, dist)
                .unwrap();
        let mut rng = StdRng::seed_from_u64(15);
        let mut sink = VecSink::new();
        assert!(matches!(
            cfg.place_with_events(3, &square(0.0, 10.0), "adult", 10, &mut rng, &mut sink),
            Err(Error::Precondition(_))
        ));
        assert!(cfg.agents().is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn three_circle_agents_respect_both_invariants() {
        let dist = BodyDistribution::fixed(0.27)
            .with_ratios(ShapeRatios::new(0.5852, 0.3838, 0.6))
            .with_orientation(Scalar::Uniform {
                low: -std::f64::consts::PI,
                high: std::f64::consts::PI,
            });
        let mut cfg = Configuration::with_parameters(
            square(0.0, 8.0),
            80,
            BodyVariant::ThreeCircle,
            dist,
        )
        .unwrap();
        cfg.add_target(square(0.0, 1.0)).unwrap();
        cfg.add_obstacle(rectangle(DVec2::new(3.0, 3.0), DVec2::new(5.0, 5.0)))
            .unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        let report = cfg.fill(&square(0.0, 8.0), "adult", &mut rng).unwrap();
        assert!(report.placed > 0);
        assert!(report.placed <= 80);

        assert_pairwise_disjoint(cfg.agents());
        for body in cfg.agents().active_geometries() {
            assert!(matches!(body, Body::ThreeCircle(_)));
            assert!(!cfg.field().intersects_occupied(&body.to_multi_polygon(32)));
        }
    }

    #[test]
    fn builtin_body_types_place_agents() {
        let mut cfg = Configuration::new(square(0.0, 10.0), 20, BodyVariant::ThreeCircle).unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        let placed = cfg.add_agents_in_domain(20, "adult", &mut rng).unwrap();
        assert_eq!(placed, 20);
        assert_pairwise_disjoint(cfg.agents());
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let run = |seed| {
            let mut cfg = circular(30);
            let mut rng = StdRng::seed_from_u64(seed);
            cfg.add_agents(30, &square(0.0, 10.0), "adult", 100, &mut rng)
                .unwrap();
            cfg.agents().active_positions().to_vec()
        };
        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }

    #[test]
    fn malformed_inputs_fail_before_sampling() {
        let mut cfg = Configuration::new(square(0.0, 10.0), 5, BodyVariant::Circular).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let domain = square(0.0, 10.0);

        assert!(matches!(
            cfg.add_agents(1, &domain, "adult", 0, &mut rng),
            Err(Error::InvalidConfig(_))
        ));
        let flat = rectangle(DVec2::new(1.0, 1.0), DVec2::new(1.0, 5.0));
        assert!(matches!(
            cfg.add_agents(1, &flat, "adult", 10, &mut rng),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(matches!(
            cfg.add_agents(1, &square(8.0, 12.0), "adult", 10, &mut rng),
            Err(Error::SurfaceOutsideDomain)
        ));
        assert!(matches!(
            cfg.add_agents(1, &domain, "giant", 10, &mut rng),
            Err(Error::UnknownBodyType { .. })
        ));
        assert!(cfg.agents().is_empty());
    }

    #[test]
    fn surface_check_can_be_disabled() {
        let mut cfg = circular(3)
            .with_config(PlacementConfig::new().with_require_surface_in_domain(false))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(10);
        let placed = cfg
            .add_agents(3, &square(8.0, 12.0), "adult", 10, &mut rng)
            .unwrap();
        assert_eq!(placed, 3);
    }

    #[test]
    fn invalid_ratios_are_a_precondition_error_for_three_circle() {
        let dist = BodyDistribution::fixed(0.3).with_ratios(ShapeRatios::new(1.2, 0.3, 0.6));
        let mut cfg =
            Configuration::with_parameters(square(0.0, 10.0), 5, BodyVariant::ThreeCircle, dist)
                .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        assert!(matches!(
            cfg.add_agents(1, &square(0.0, 10.0), "adult", 10, &mut rng),
            Err(Error::Precondition(_))
        ));
        assert!(cfg.agents().is_empty());
    }

    #[test]
    fn zero_count_is_a_no_op() {
        let mut cfg = circular(3);
        let mut rng = StdRng::seed_from_u64(12);
        let report = cfg.place(0, &square(0.0, 10.0), "adult", 10, &mut rng).unwrap();
        assert_eq!(report, PlacementReport::new(0));
    }

    #[test]
    fn events_follow_the_placement() {
        let mut cfg = circular(4);
        let mut rng = StdRng::seed_from_u64(13);
        let mut sink = VecSink::without_rejections();
        let report = cfg
            .place_with_events(6, &square(0.0, 10.0), "adult", 100, &mut rng, &mut sink)
            .unwrap();
        assert_eq!(report.placed, 4);
        assert!(report.capacity_exhausted);

        let events = sink.into_inner();
        assert!(matches!(
            events.first(),
            Some(PlacementEvent::PlacementStarted { requested: 6, .. })
        ));
        let slots: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                PlacementEvent::AgentPlaced { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(slots, vec![0, 1, 2, 3]);
        assert!(events
            .iter()
            .any(|e| matches!(e, PlacementEvent::CapacityExhausted { capacity: 4 })));
        assert!(matches!(
            events.last(),
            Some(PlacementEvent::PlacementFinished { report: r }) if r.placed == 4
        ));
    }

    #[test]
    fn config_validation_rejects_coarse_circles() {
        assert!(PlacementConfig::new().validate().is_ok());
        assert!(PlacementConfig::new()
            .with_circle_segments(4)
            .validate()
            .is_err());
        assert!(PlacementConfig::new()
            .with_iteration_limit(0)
            .validate()
            .is_err());
        assert!(PlacementConfig::new()
            .with_sampler_attempts(0)
            .validate()
            .is_err());
    }
}
