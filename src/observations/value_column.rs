use crate::observations::error::ObservationError;
use crate::types::join_key::DIMENSION_COLUMNS;
use polars::prelude::DataFrame;

/// Finds the single measurement column of an observation frame.
///
/// The value column is whatever remains after removing the dimension columns
/// (`date`, `lon`, `lat`, `state`, `district`, `tehsil`). Exactly one must remain:
/// no survivor is [`ObservationError::NoValueColumn`], and several survivors are
/// [`ObservationError::AmbiguousValueColumn`] rather than an arbitrary pick.
pub fn resolve_value_column(frame: &DataFrame) -> Result<String, ObservationError> {
    let present: Vec<String> = frame
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    resolve_from_names(&present)
}

pub(crate) fn resolve_from_names(present: &[String]) -> Result<String, ObservationError> {
    let mut candidates: Vec<String> = present
        .iter()
        .filter(|name| !DIMENSION_COLUMNS.contains(&name.as_str()))
        .cloned()
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(ObservationError::NoValueColumn {
            present: present.to_vec(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(ObservationError::AmbiguousValueColumn { candidates }),
    }
}
