//! Vertex, edge and face records stored in the diagram's half-edge graph.

use super::edge::Bisector;
use crate::graph::{FaceId, HalfEdgeGraph};
use crate::point::Point;
use crate::site::SiteId;

/// Permanent topological role of a vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexType {
    /// One of the three vertices of the bounding triangle.
    Outer,
    Normal,
    /// Location of a point site; carries no edges.
    PointSite,
    /// End of a line site on a null face.
    EndPoint,
    /// Start of a separator on a null face.
    SepPoint,
    /// Minimum-clearance point of a point-point or point-line bisector.
    Apex,
    /// Auxiliary vertex that keeps a face cycle simple during a line insertion.
    Split,
}

impl VertexType {
    pub fn expected_degree(self) -> usize {
        match self {
            VertexType::Outer => 4,
            VertexType::Normal => 6,
            VertexType::PointSite => 0,
            VertexType::EndPoint => 6,
            VertexType::SepPoint => 6,
            VertexType::Apex => 4,
            VertexType::Split => 4,
        }
    }
}

/// Per-insertion classification of a vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VertexStatus {
    #[default]
    Undecided,
    In,
    Out,
    New,
}

#[derive(Clone, Debug)]
pub struct VertexData {
    pub position: Point,
    pub kind: VertexType,
    /// Clearance: distance to the nearest site.
    pub dist: f64,
    /// Pseudo-angle of null-face vertices, measured around their endpoint.
    pub alfa: Option<f64>,
    /// For POINTSITE vertices: the site and its face.
    pub site: Option<SiteId>,
    pub face: Option<FaceId>,
    /// For POINTSITE vertices that are segment endpoints: the null face around them.
    pub null_face: Option<FaceId>,
}

impl VertexData {
    pub fn new(position: Point, kind: VertexType, dist: f64) -> Self {
        Self {
            position,
            kind,
            dist,
            alfa: None,
            site: None,
            face: None,
            null_face: None,
        }
    }

    /// Vertex on a null face, sitting at a segment endpoint with direction `alfa`.
    pub fn null(position: Point, kind: VertexType, alfa: f64) -> Self {
        Self {
            alfa: Some(alfa),
            ..Self::new(position, kind, 0.0)
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.alfa.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeType {
    /// Point-point bisector.
    Line,
    /// Bisector of two non-parallel line sites.
    LineLine,
    /// Bisector of two parallel line sites.
    ParaLineLine,
    /// Boundary of the bounding triangle; has no twin.
    OutEdge,
    /// Point-line bisector.
    Parabola,
    /// Point-arc and line-arc bisectors; reserved for curved sites.
    Ellipse,
    Hyperbola,
    /// Perpendicular from a segment endpoint, between the endpoint's face and the segment's.
    Separator,
    /// Zero-length edge on a null face.
    NullEdge,
    /// The segment itself, between its two faces.
    LineSite,
}

#[derive(Clone, Copy, Debug)]
pub struct EdgeData {
    pub kind: EdgeType,
    pub geom: Bisector,
}

impl EdgeData {
    pub fn new(kind: EdgeType, geom: Bisector) -> Self {
        Self { kind, geom }
    }

    pub fn straight(kind: EdgeType) -> Self {
        Self::new(kind, Bisector::Straight)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FaceData {
    pub site: SiteId,
    /// Null faces surround segment endpoints and have zero area.
    pub null: bool,
}

pub type VdGraph = HalfEdgeGraph<VertexData, EdgeData, FaceData>;
