//! Pairs the per-tehsil aggregate with the boundary collection for choropleth rendering.

use crate::types::join_key::JOIN_KEY;
use geojson::{Feature, FeatureCollection};
use polars::prelude::{DataFrame, PolarsResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Outcome of matching aggregated rows against boundary features on [`JOIN_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinReport {
    /// Rows whose tehsil matched at least one feature.
    pub matched_rows: usize,
    /// Tehsils present in the data but absent from the boundary, sorted.
    pub unmatched_rows: Vec<String>,
    /// Tehsil keys of features that received no value, sorted.
    pub unmatched_features: Vec<String>,
    /// Features that carry no usable tehsil property at all.
    pub features_without_key: usize,
}

impl JoinReport {
    pub fn is_complete(&self) -> bool {
        self.unmatched_rows.is_empty()
            && self.unmatched_features.is_empty()
            && self.features_without_key == 0
    }
}

/// Everything a choropleth renderer needs: one value per tehsil, the boundary
/// features, and the property both are keyed by.
#[derive(Debug, Clone)]
pub struct MapLayer {
    /// Columns [`JOIN_KEY`] and the value column, one row per tehsil.
    pub aggregated: DataFrame,
    pub boundary: Arc<FeatureCollection>,
    value_column: String,
}

impl MapLayer {
    pub fn new(aggregated: DataFrame, boundary: Arc<FeatureCollection>, value_column: &str) -> Self {
        Self {
            aggregated,
            boundary,
            value_column: value_column.to_string(),
        }
    }

    /// Column of `aggregated` and property of `boundary` features to join on.
    pub fn join_key(&self) -> &'static str {
        JOIN_KEY
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// Mean value per tehsil.
    pub fn values_by_key(&self) -> PolarsResult<BTreeMap<String, Option<f64>>> {
        let keys = self.aggregated.column(JOIN_KEY)?.str()?;
        let values = self.aggregated.column(&self.value_column)?.f64()?;
        Ok(keys
            .into_iter()
            .zip(values)
            .filter_map(|(key, value)| key.map(|k| (k.to_string(), value)))
            .collect())
    }

    /// Counts rows and features that fail to join. Keys are compared byte for byte.
    pub fn join_report(&self) -> PolarsResult<JoinReport> {
        let values = self.values_by_key()?;

        let mut feature_keys = BTreeSet::new();
        let mut features_without_key = 0;
        for feature in &self.boundary.features {
            match feature_key(feature) {
                Some(key) => {
                    feature_keys.insert(key);
                }
                None => features_without_key += 1,
            }
        }

        let matched_rows = values
            .keys()
            .filter(|key| feature_keys.contains(*key))
            .count();
        let unmatched_rows = values
            .keys()
            .filter(|key| !feature_keys.contains(*key))
            .cloned()
            .collect();
        let unmatched_features = feature_keys
            .into_iter()
            .filter(|key| !values.contains_key(key))
            .collect();

        Ok(JoinReport {
            matched_rows,
            unmatched_rows,
            unmatched_features,
            features_without_key,
        })
    }

    /// A copy of the boundary with each matched feature's value stored under the
    /// value column name, for renderers that cannot join by themselves.
    pub fn joined_features(&self) -> PolarsResult<FeatureCollection> {
        let values = self.values_by_key()?;
        let mut collection = (*self.boundary).clone();
        for feature in &mut collection.features {
            let Some(value) = feature_key(feature).and_then(|key| values.get(&key).copied())
            else {
                continue;
            };
            feature.set_property(self.value_column.clone(), value);
        }
        Ok(collection)
    }
}

fn feature_key(feature: &Feature) -> Option<String> {
    match feature.property(JOIN_KEY)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
