use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("Boundary file '{0}' does not exist")]
    MissingSource(PathBuf),

    #[error("Failed to read boundary file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse boundary file '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Boundary file '{path}' has unsupported type '{found}', expected Topology or FeatureCollection")]
    UnsupportedType { path: PathBuf, found: String },

    #[error("Topology has no object named '{name}', available: {available:?}")]
    UnknownObject { name: String, available: Vec<String> },

    #[error("Topology holds several objects {available:?}, a boundary object name is required")]
    AmbiguousObject { available: Vec<String> },

    #[error("Arc index {index} is out of range for a topology with {count} arcs")]
    ArcOutOfRange { index: i64, count: usize },

    #[error("Arc {arc} contains a position with fewer than two coordinates")]
    MalformedPosition { arc: usize },

    #[error("Point geometry has fewer than two coordinates")]
    MalformedPoint,

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
