use crate::boundary::error::BoundaryError;
use crate::cascade::error::CascadeError;
use crate::observations::error::ObservationError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Observation(#[from] ObservationError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Cascade(#[from] CascadeError),

    #[error("Failed to join aggregated values with boundary features")]
    Join(#[source] PolarsError),
}

/// How a failed render should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing to show for this selection (an empty date, an empty level, or a choice
    /// that is no longer offered); a different selection may succeed.
    Warning,
    /// Missing or malformed source data; no selection can succeed until it is fixed.
    Fatal,
}

impl DashboardError {
    pub fn severity(&self) -> Severity {
        match self {
            DashboardError::Cascade(CascadeError::NoDataForDate(_))
            | DashboardError::Cascade(CascadeError::NoCandidates { .. })
            | DashboardError::Cascade(CascadeError::UnknownSelection { .. })
            | DashboardError::Observation(ObservationError::NoData(_)) => Severity::Warning,
            _ => Severity::Fatal,
        }
    }
}
