//! The casing contract shared by the observation loader and the boundary loader.
//!
//! Column names of every partition and property keys of every boundary feature are
//! lowercased at ingestion time, so a table column such as `Tehsil` and a feature
//! property such as `TEHSIL` both end up as [`JOIN_KEY`]. Only *names* are normalized;
//! the administrative-unit values themselves are left exactly as stored.

use geojson::JsonObject;
use std::collections::HashSet;

/// Column (and feature property) that links aggregated rows to boundary features.
pub const JOIN_KEY: &str = "tehsil";

pub const COL_DATE: &str = "date";
pub const COL_LON: &str = "lon";
pub const COL_LAT: &str = "lat";
pub const COL_STATE: &str = "state";
pub const COL_DISTRICT: &str = "district";
pub const COL_TEHSIL: &str = JOIN_KEY;

/// Every column that is not a measurement.
pub const DIMENSION_COLUMNS: [&str; 6] = [
    COL_DATE,
    COL_LON,
    COL_LAT,
    COL_STATE,
    COL_DISTRICT,
    COL_TEHSIL,
];

/// Dimensions that must be present for the cascade to work. `lon`/`lat` are optional.
pub const REQUIRED_DIMENSIONS: [&str; 4] = [COL_DATE, COL_STATE, COL_DISTRICT, COL_TEHSIL];

/// Canonical form of a column name or property key.
///
/// # Examples
///
/// ```
/// use tehsil_weather::canonical_name;
///
/// assert_eq!(canonical_name(" Tehsil "), "tehsil");
/// assert_eq!(canonical_name("RAIN_mm"), "rain_mm");
/// ```
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Returns the canonical column names, or the first canonical name that two
/// source columns collapse into.
pub(crate) fn canonical_column_names<'a, I>(names: I) -> Result<Vec<String>, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut canonical = Vec::new();
    for name in names {
        let normalized = canonical_name(name);
        if !seen.insert(normalized.clone()) {
            return Err(normalized);
        }
        canonical.push(normalized);
    }
    Ok(canonical)
}

/// Lowercases the keys of a feature's property map, leaving values untouched.
///
/// When several keys collapse into the same canonical key, a key that is already
/// canonical wins; otherwise the first key in sorted order wins. Applying this twice
/// yields the same map as applying it once.
pub fn normalize_property_keys(properties: JsonObject) -> JsonObject {
    let mut entries: Vec<(String, serde_json::Value)> = properties.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut normalized = JsonObject::new();
    let (canonical, others): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|(key, _)| canonical_name(key) == *key);

    for (key, value) in canonical.into_iter().chain(others) {
        normalized.entry(canonical_name(&key)).or_insert(value);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_property_keys_lowercased_values_untouched() {
        let props = object(json!({ "TEHSIL": "Hajipur", "District": "Vaishali" }));
        let normalized = normalize_property_keys(props);

        assert_eq!(normalized.get("tehsil"), Some(&json!("Hajipur")));
        assert_eq!(normalized.get("district"), Some(&json!("Vaishali")));
        assert_eq!(normalized.len(), 2);
    }

    #[test]
    fn test_property_key_collision_prefers_canonical_key() {
        let props = object(json!({ "TEHSIL": "upper", "tehsil": "lower", "Tehsil": "title" }));
        let normalized = normalize_property_keys(props);

        assert_eq!(normalized.get("tehsil"), Some(&json!("lower")));
        assert_eq!(normalized.len(), 1);
    }

    #[test]
    fn test_property_key_collision_without_canonical_key_is_sorted() {
        let props = object(json!({ "Tehsil": "title", "TEHSIL": "upper" }));
        let normalized = normalize_property_keys(props);

        // "TEHSIL" sorts before "Tehsil".
        assert_eq!(normalized.get("tehsil"), Some(&json!("upper")));
    }

    #[test]
    fn test_property_normalization_is_idempotent() {
        let props = object(json!({ "TEHSIL": "A", "State_Name": "B", "dist": 3 }));
        let once = normalize_property_keys(props);
        let twice = normalize_property_keys(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonical_column_names_detects_collision() {
        assert_eq!(
            canonical_column_names(["Date", "STATE", "rain_mm"]),
            Ok(vec![
                "date".to_string(),
                "state".to_string(),
                "rain_mm".to_string()
            ])
        );
        assert_eq!(
            canonical_column_names(["Date", "date"]),
            Err("date".to_string())
        );
    }
}
