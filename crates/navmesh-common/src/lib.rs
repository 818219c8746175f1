//! Common utilities and data structures shared by the polygon navigation crates

mod geometry;

pub use geometry::*;

/// Represents a 3D position (Y is height)
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid navigation mesh data: {0}")]
    InvalidMesh(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse mesh data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for navigation mesh operations
pub type Result<T> = std::result::Result<T, Error>;
