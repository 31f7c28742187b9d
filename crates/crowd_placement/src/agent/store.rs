//! Fixed-capacity, column-oriented storage of agent state.
use glam::DVec2;

use crate::agent::{three_circle_parts, AgentParams, Body, BodyVariant, Circle, ShapeRatios};
use crate::error::{Error, Result};

/// One agent row copied out of an [`AgentStore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentRecord {
    pub slot: usize,
    pub params: AgentParams,
    pub active: bool,
}

/// Preallocated struct-of-arrays arena of agents sharing one body variant.
///
/// Slots `0..len()` hold active agents, in commit order. Agents are only ever
/// appended; a slot index stays valid for the lifetime of the store.
#[derive(Debug, Clone)]
pub struct AgentStore {
    variant: BodyVariant,
    capacity: usize,
    len: usize,

    position: Vec<DVec2>,
    orientation: Vec<f64>,
    mass: Vec<f64>,
    radius: Vec<f64>,
    ratio_torso: Vec<f64>,
    ratio_shoulder: Vec<f64>,
    ratio_torso_shoulder: Vec<f64>,
    inertia_rot: Vec<f64>,
    max_velocity: Vec<f64>,
    max_angular_velocity: Vec<f64>,
    active: Vec<bool>,
}

impl AgentStore {
    /// Create an empty store holding at most `capacity` agents of `variant`.
    pub fn new(capacity: usize, variant: BodyVariant) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfig("agent capacity must be > 0".into()));
        }
        Ok(Self {
            variant,
            capacity,
            len: 0,
            position: vec![DVec2::ZERO; capacity],
            orientation: vec![0.0; capacity],
            mass: vec![0.0; capacity],
            radius: vec![0.0; capacity],
            ratio_torso: vec![0.0; capacity],
            ratio_shoulder: vec![0.0; capacity],
            ratio_torso_shoulder: vec![0.0; capacity],
            inertia_rot: vec![0.0; capacity],
            max_velocity: vec![0.0; capacity],
            max_angular_velocity: vec![0.0; capacity],
            active: vec![false; capacity],
        })
    }

    /// Append one agent.
    ///
    /// Returns `Ok(false)` without touching the store when it is full, and an
    /// [`Error::Precondition`] without touching the store when `params` are not
    /// usable for this store's body variant. On `Ok(true)` the whole row has been
    /// written and the agent is active.
    pub fn add(&mut self, params: AgentParams) -> Result<bool> {
        if self.is_full() {
            return Ok(false);
        }
        params.validate(self.variant)?;

        let i = self.len;
        self.position[i] = params.position;
        self.orientation[i] = params.orientation;
        self.mass[i] = params.mass;
        self.radius[i] = params.radius;
        self.ratio_torso[i] = params.ratios.torso;
        self.ratio_shoulder[i] = params.ratios.shoulder;
        self.ratio_torso_shoulder[i] = params.ratios.torso_shoulder;
        self.inertia_rot[i] = params.inertia_rot;
        self.max_velocity[i] = params.max_velocity;
        self.max_angular_velocity[i] = params.max_angular_velocity;
        self.active[i] = true;
        self.len += 1;
        Ok(true)
    }

    pub fn variant(&self) -> BodyVariant {
        self.variant
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active agents.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Free slots left.
    pub fn remaining(&self) -> usize {
        self.capacity - self.len
    }

    pub fn active_positions(&self) -> &[DVec2] {
        &self.position[..self.len]
    }

    pub fn active_orientations(&self) -> &[f64] {
        &self.orientation[..self.len]
    }

    /// Total body radius of each active agent.
    pub fn active_radii(&self) -> &[f64] {
        &self.radius[..self.len]
    }

    pub fn active_masses(&self) -> &[f64] {
        &self.mass[..self.len]
    }

    pub fn active_ratios(&self) -> impl ExactSizeIterator<Item = ShapeRatios> + '_ {
        (0..self.len).map(|i| self.ratios(i))
    }

    /// Realized geometry of each active agent, in slot order.
    pub fn active_geometries(&self) -> impl ExactSizeIterator<Item = Body> + '_ {
        (0..self.len).map(|i| self.body_unchecked(i))
    }

    /// Realized geometry of the agent in `slot`, if active.
    pub fn geometry(&self, slot: usize) -> Option<Body> {
        (slot < self.len).then(|| self.body_unchecked(slot))
    }

    /// Copy out the row in `slot`. Inactive slots within capacity report `active: false`.
    pub fn record(&self, slot: usize) -> Option<AgentRecord> {
        if slot >= self.capacity {
            return None;
        }
        Some(AgentRecord {
            slot,
            params: AgentParams {
                position: self.position[slot],
                orientation: self.orientation[slot],
                mass: self.mass[slot],
                radius: self.radius[slot],
                ratios: self.ratios(slot),
                inertia_rot: self.inertia_rot[slot],
                max_velocity: self.max_velocity[slot],
                max_angular_velocity: self.max_angular_velocity[slot],
            },
            active: self.active[slot],
        })
    }

    #[inline]
    fn ratios(&self, i: usize) -> ShapeRatios {
        ShapeRatios::new(
            self.ratio_torso[i],
            self.ratio_shoulder[i],
            self.ratio_torso_shoulder[i],
        )
    }

    #[inline]
    fn body_unchecked(&self, i: usize) -> Body {
        Body::new(
            self.variant,
            self.position[i],
            self.orientation[i],
            self.radius[i],
            self.ratios(i),
        )
    }

    #[inline]
    pub(crate) fn three_circle_unchecked(&self, i: usize) -> [Circle; 3] {
        three_circle_parts(
            self.position[i],
            self.orientation[i],
            self.radius[i],
            self.ratios(i),
        )
    }
}
