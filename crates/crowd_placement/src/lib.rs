#![forbid(unsafe_code)]
//! crowd_placement: Non-overlapping placement of pedestrian agents in planar domains.
//!
//! Modules:
//! - field: domain polygon, obstacle and target unions, occupied region
//! - agent: circular and three-circle bodies, fixed-capacity agent store
//! - overlap: circle and three-circle overlap predicates
//! - sampling: uniform point sampling inside polygons
//! - parameters: body parameter distributions keyed by body type
//! - placement: rejection-sampling placement with a bounded trial budget, events
//!
//! For examples, see the `crowd_placement_examples` crate.
pub mod agent;
pub mod error;
pub mod field;
pub mod geometry;
pub mod overlap;
pub mod parameters;
pub mod placement;
pub mod sampling;

/// Convenient re-exports for common types. Import with `use crowd_placement::prelude::*;`.
pub mod prelude {
    pub use crate::agent::{
        three_circle_parts, AgentParams, AgentRecord, AgentStore, Body, BodyVariant, Circle,
        ShapeRatios,
    };
    pub use crate::error::{Error, Result};
    pub use crate::field::Field;
    pub use crate::geometry::{circle_polygon, polygon_from_vertices, rectangle};
    pub use crate::overlap::{circle_overlap, overlaps_any_active, three_circle_overlap};
    pub use crate::parameters::{
        BodyDistribution, BodyParameters, BodyTypeTable, ParameterSource, Scalar,
    };
    pub use crate::placement::events::{
        EventSink, FnSink, PlacementEvent, PlacementEventKind, RejectionReason, VecSink,
    };
    pub use crate::placement::{
        Configuration, PlacementConfig, PlacementReport, DEFAULT_ITERATION_LIMIT,
    };
    pub use crate::sampling::{PointSampling, PolygonSampler};
}
