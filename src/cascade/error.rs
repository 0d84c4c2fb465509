use crate::types::admin_level::AdminLevel;
use chrono::NaiveDate;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("No data for {0}")]
    NoDataForDate(NaiveDate),

    #[error("No {level} available for the current selection")]
    NoCandidates { level: AdminLevel },

    #[error("'{value}' is not an available {level}, options: {options:?}")]
    UnknownSelection {
        level: AdminLevel,
        value: String,
        options: Vec<String>,
    },

    #[error("{0} is the finest administrative level")]
    NoLowerLevel(AdminLevel),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
