//! Status codes for path queries

/// Outcome of a graph path query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A corridor was found
    Success,
    /// Start and end lie in the same polygon; the corridor is empty
    SamePolygon,
    /// The start point is not on the mesh
    StartOffMesh,
    /// The end point is not on the mesh
    EndOffMesh,
    /// No corridor connects the start and end polygons
    Unreachable,
    /// The search gave up after expanding the configured number of nodes
    SearchLimitReached,
}

impl Status {
    /// Checks if the status is a failure
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Checks if the status is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success | Status::SamePolygon)
    }

    /// Converts status to a result
    pub fn to_result<T>(self, value: T) -> std::result::Result<T, Status> {
        if self.is_success() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::error::Error for Status {}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Success => write!(f, "Success"),
            Status::SamePolygon => write!(f, "Start and end share a polygon"),
            Status::StartOffMesh => write!(f, "Start point is off the mesh"),
            Status::EndOffMesh => write!(f, "End point is off the mesh"),
            Status::Unreachable => write!(f, "End is unreachable"),
            Status::SearchLimitReached => write!(f, "Search node limit reached"),
        }
    }
}
