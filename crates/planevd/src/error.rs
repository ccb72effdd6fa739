//! Error taxonomy for diagram construction.
//!
//! Three categories, kept distinct for callers: bad input (rejected before any effect),
//! numeric failure (precision escalation exhausted), and topology defects (a construction
//! bug). All three leave the diagram exactly as it was before the failed call.

use crate::diagram::CheckReport;
use crate::graph::EdgeId;
use crate::site::SiteId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VdError {
    #[error("input rejected: {0}")]
    Input(#[from] InputError),
    #[error("numeric failure: {0}")]
    Numeric(#[from] NumericError),
    #[error("topology defect: {0}")]
    Topology(#[from] TopologyError),
}

impl VdError {
    pub fn is_input(&self) -> bool {
        matches!(self, VdError::Input(_))
    }
    pub fn is_numeric(&self) -> bool {
        matches!(self, VdError::Numeric(_))
    }
    pub fn is_topology(&self) -> bool {
        matches!(self, VdError::Topology(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
    #[error("coordinates must be finite")]
    NonFinite,
    #[error("point ({x}, {y}) lies outside the far radius {far}")]
    OutsideFarRadius { x: f64, y: f64, far: f64 },
    #[error("point ({x}, {y}) duplicates an existing point site")]
    DuplicatePoint { x: f64, y: f64 },
    #[error("point ({x}, {y}) lies on an existing line site")]
    PointOnSegment { x: f64, y: f64 },
    #[error("unknown site {0}")]
    UnknownSite(SiteId),
    #[error("site {0} is not a point site")]
    NotAPointSite(SiteId),
    #[error("line site endpoints coincide")]
    SameEndpoints,
    #[error("line site {a}-{b} already exists")]
    DuplicateSegment { a: SiteId, b: SiteId },
    #[error("line site {a}-{b} intersects an existing line site")]
    SegmentsIntersect { a: SiteId, b: SiteId },
    #[error("line site is collinear with an existing line site at endpoint {0}")]
    CollinearAtEndpoint(SiteId),
    #[error("line site would leave no free angular gap at endpoint {0}")]
    EndpointEnclosed(SiteId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error("degenerate solver configuration")]
    Degenerate,
    #[error("no vertex position found on edge {edge}")]
    NoSolution { edge: EdgeId },
    #[error("no seed vertex found for the new site")]
    NoSeed,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("face cycle could not be closed: {reason}")]
    OpenFaceCycle { reason: String },
    #[error("no ENDPOINT vertex was created at site {0}")]
    EndpointMissing(SiteId),
    #[error("new edge joins vertices on opposite sides of the line site")]
    SideMismatch,
    #[error("null face at site {0} has an unexpected delete set")]
    NullVertexState(SiteId),
    #[error("unexpected delete-set boundary on a face: {reason}")]
    FaceBoundary { reason: String },
    #[error("topology check failed: {0}")]
    CheckFailed(CheckReport),
}

pub type Result<T> = std::result::Result<T, VdError>;
