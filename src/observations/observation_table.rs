//! Contains the `ObservationTable` wrapper around a merged, validated observation frame.

use crate::observations::error::ObservationError;
use crate::observations::value_column::resolve_from_names;
use crate::types::join_key::{COL_DATE, COL_DISTRICT, COL_STATE, COL_TEHSIL, REQUIRED_DIMENSIONS};
use crate::utils::date_from_epoch_days;
use chrono::NaiveDate;
use polars::prelude::*;

/// The unified observation table of one parameter.
///
/// Construction checks the required dimension columns, resolves the single value
/// column, and normalizes the column types the cascade relies on:
///
/// * `date` becomes a polars `Date` (datetimes lose their time of day, strings are
///   parsed as `%Y-%m-%d`),
/// * `state`, `district` and `tehsil` become `String`.
///
/// The table is never mutated afterwards; every filter produces a new frame.
#[derive(Clone, Debug)]
pub struct ObservationTable {
    /// The normalized observation rows.
    pub frame: DataFrame,
    value_column: String,
}

impl ObservationTable {
    /// Validates and normalizes a merged frame.
    ///
    /// # Errors
    ///
    /// * [`ObservationError::MissingDimension`] if `date`, `state`, `district` or `tehsil` is absent.
    /// * [`ObservationError::NoValueColumn`] / [`ObservationError::AmbiguousValueColumn`] if
    ///   the frame does not have exactly one non-dimension column.
    /// * [`ObservationError::UnsupportedDateType`] if `date` is neither a date, a datetime nor a string.
    pub fn try_new(frame: DataFrame) -> Result<Self, ObservationError> {
        let present: Vec<String> = frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        if let Some(missing) = REQUIRED_DIMENSIONS
            .iter()
            .find(|required| !present.iter().any(|name| name == *required))
        {
            return Err(ObservationError::MissingDimension {
                column: missing.to_string(),
                present,
            });
        }

        let value_column = resolve_from_names(&present)?;
        let date_expr = normalized_date_expr(frame.column(COL_DATE)?.dtype())?;

        let frame = frame
            .lazy()
            .with_columns([
                date_expr.alias(COL_DATE),
                col(COL_STATE).cast(DataType::String),
                col(COL_DISTRICT).cast(DataType::String),
                col(COL_TEHSIL).cast(DataType::String),
            ])
            .collect()?;

        Ok(Self {
            frame,
            value_column,
        })
    }

    /// Name of the measurement column, e.g. `tmax` or `rain_mm`.
    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Earliest and latest observation date, or `None` when the table has no dated rows.
    pub fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, ObservationError> {
        let days = self.frame.column(COL_DATE)?.cast(&DataType::Int32)?;
        let days = days.i32()?;
        Ok(match (days.min(), days.max()) {
            (Some(min), Some(max)) => date_from_epoch_days(min).zip(date_from_epoch_days(max)),
            _ => None,
        })
    }
}

fn normalized_date_expr(dtype: &DataType) -> Result<Expr, ObservationError> {
    match dtype {
        DataType::Date => Ok(col(COL_DATE)),
        DataType::Datetime(_, _) => Ok(col(COL_DATE).cast(DataType::Date)),
        DataType::String => Ok(col(COL_DATE).str().to_date(StrptimeOptions {
            format: Some("%Y-%m-%d".into()),
            ..Default::default()
        })),
        other => Err(ObservationError::UnsupportedDateType(other.to_string())),
    }
}
