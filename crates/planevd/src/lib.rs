//! Incremental generalized Voronoi diagrams of point and segment sites in the plane.
//!
//! Overview
//! - [`diagram::VoronoiDiagram`] owns a half-edge graph and inserts sites one at a time,
//!   keeping the diagram valid after every call. Points come first; segments join two
//!   existing point sites.
//! - Vertex positions come from closed-form three-site solvers ([`solver`]) run in `f64`
//!   and re-run in double-double precision ([`numeric::Dd`]) when no root survives.
//! - A read-only query surface (vertices, edges, faces, edge evaluation, per-face offsets)
//!   serves offsetting and rendering callers.
//!
//! Errors
//! - Every fallible call returns [`error::Result`]. A failed insertion leaves the diagram
//!   exactly as it was.

pub mod cfg;
pub mod diagram;
pub mod error;
pub mod graph;
pub mod grid;
pub mod numeric;
pub mod offset;
pub mod point;
pub mod sample;
pub mod site;
pub mod solver;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::VdCfg;
pub use diagram::VoronoiDiagram;
pub use error::{Result, VdError};
pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::VdCfg;
    pub use crate::diagram::{
        CheckReport, EdgeType, EdgeView, FaceView, Segment, VertexStatus, VertexType, VertexView,
        VoronoiDiagram,
    };
    pub use crate::error::{InputError, NumericError, Result, TopologyError, VdError};
    pub use crate::graph::{EdgeId, FaceId, VertexId};
    pub use crate::offset::{face_offset, FaceOffset};
    pub use crate::point::{Point, PointExt};
    pub use crate::site::{Ofs, Site, SiteId};
    pub use nalgebra::Vector2 as Vec2;
}
