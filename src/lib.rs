mod boundary;
mod cache;
mod cascade;
mod dashboard;
mod error;
mod map_layer;
mod observations;
mod types;
mod utils;

pub use dashboard::*;
pub use error::{DashboardError, Severity};

pub use cache::FrameCache;
pub use map_layer::{JoinReport, MapLayer};

pub use boundary::boundary_loader::{normalize_feature_keys, BoundaryLoader};
pub use boundary::topology::{TopoGeometry, TopoObject, Topology, Transform};

pub use observations::dataset_loader::DatasetLoader;
pub use observations::observation_table::ObservationTable;
pub use observations::partition::{discover_partitions, Partition};
pub use observations::value_column::resolve_value_column;

pub use cascade::aggregator::aggregate;
pub use cascade::filter_cascade::{CascadeOutcome, CascadeStage, FilterCascade, Selection};

pub use types::admin_level::AdminLevel;
pub use types::join_key::{
    canonical_name, normalize_property_keys, DIMENSION_COLUMNS, JOIN_KEY, REQUIRED_DIMENSIONS,
};
pub use types::parameter::{ParseParameterError, Parameter};

pub use boundary::error::BoundaryError;
pub use cascade::error::CascadeError;
pub use observations::error::ObservationError;
