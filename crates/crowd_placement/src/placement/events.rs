//! Event types and sinks for observing placement runs.
//!
//! This module defines [`PlacementEvent`] and a set of sinks to emit, collect or
//! forward events while running [`crate::placement::Configuration::place_with_events`].
use glam::DVec2;

use crate::placement::{PlacementConfig, PlacementReport};

/// Why a candidate position was not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The candidate body overlaps an active agent.
    AgentOverlap,
    /// The candidate body intersects an obstacle or target.
    Occupied,
}

/// Describes events emitted during placement.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PlacementEvent {
    /// Emitted once input validation passed and sampling is about to begin.
    PlacementStarted {
        /// Number of agents requested.
        requested: usize,
        /// Body type label handed to the parameter source.
        body_type: String,
        /// Upper bound on the trial counter.
        max_trials: usize,
        /// Configuration in effect.
        config: PlacementConfig,
    },

    /// Emitted for each rejected candidate.
    CandidateRejected {
        /// Candidate torso position.
        position: DVec2,
        reason: RejectionReason,
    },

    /// Emitted when an agent is committed to the store.
    AgentPlaced { slot: usize, position: DVec2 },

    /// Emitted when the store refused an agent because it is full.
    CapacityExhausted { capacity: usize },

    /// Emitted when placement ends.
    PlacementFinished { report: PlacementReport },
}

impl PlacementEvent {
    pub fn kind(&self) -> PlacementEventKind {
        match self {
            PlacementEvent::PlacementStarted { .. } => PlacementEventKind::PlacementStarted,
            PlacementEvent::CandidateRejected { .. } => PlacementEventKind::CandidateRejected,
            PlacementEvent::AgentPlaced { .. } => PlacementEventKind::AgentPlaced,
            PlacementEvent::CapacityExhausted { .. } => PlacementEventKind::CapacityExhausted,
            PlacementEvent::PlacementFinished { .. } => PlacementEventKind::PlacementFinished,
        }
    }
}

/// Discriminant of [`PlacementEvent`], used by sinks to opt out of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementEventKind {
    PlacementStarted,
    CandidateRejected,
    AgentPlaced,
    CapacityExhausted,
    PlacementFinished,
}

/// A generic event sink that accepts [`PlacementEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PlacementEvent);

    /// Whether events of `kind` should be built and sent at all.
    fn wants(&self, _kind: PlacementEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PlacementEvent) {}

    #[inline]
    fn wants(&self, _kind: PlacementEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally skipping rejections.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PlacementEvent>,
    skip_rejections: bool,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector that ignores [`PlacementEvent::CandidateRejected`], which can be numerous.
    pub fn without_rejections() -> Self {
        Self {
            events: Vec::new(),
            skip_rejections: true,
        }
    }

    pub fn into_inner(self) -> Vec<PlacementEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PlacementEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        self.events.push(event);
    }

    fn wants(&self, kind: PlacementEventKind) -> bool {
        !(self.skip_rejections && kind == PlacementEventKind::CandidateRejected)
    }
}
