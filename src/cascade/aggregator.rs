use crate::cascade::error::CascadeError;
use crate::types::join_key::JOIN_KEY;
use polars::prelude::*;

/// Collapses a date-level frame to one mean value per tehsil.
///
/// The result has two columns, [`JOIN_KEY`] and `value_column` (now `Float64`), with
/// exactly one row per distinct non-null tehsil, sorted by tehsil.
pub fn aggregate(date_frame: &DataFrame, value_column: &str) -> Result<DataFrame, CascadeError> {
    Ok(date_frame
        .clone()
        .lazy()
        .filter(col(JOIN_KEY).is_not_null())
        .group_by([col(JOIN_KEY)])
        .agg([col(value_column).cast(DataType::Float64).mean()])
        .sort([JOIN_KEY], SortMultipleOptions::default())
        .collect()?)
}
