use crate::boundary::error::BoundaryError;
use crate::boundary::topology::Topology;
use crate::types::join_key::normalize_property_keys;
use geojson::FeatureCollection;
use log::info;
use std::path::{Path, PathBuf};
use tokio::task;

/// Reads the tehsil boundary file and turns it into a feature collection whose
/// property keys follow the shared lowercase convention.
#[derive(Debug, Clone)]
pub struct BoundaryLoader {
    path: PathBuf,
    object: Option<String>,
}

impl BoundaryLoader {
    /// `object` names the topology object to convert; `None` requires the topology
    /// to contain a single object.
    pub fn new(path: &Path, object: Option<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            object,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the boundary on a blocking task.
    ///
    /// Accepts a TopoJSON `Topology` (decoded into standalone polygons) or a GeoJSON
    /// `FeatureCollection` (used as is). Either way every feature's property keys are
    /// lowercased; property values are left untouched.
    pub async fn load_boundary(&self) -> Result<FeatureCollection, BoundaryError> {
        let loader = self.clone();
        task::spawn_blocking(move || loader.load_blocking()).await?
    }

    fn load_blocking(&self) -> Result<FeatureCollection, BoundaryError> {
        if !self.path.is_file() {
            return Err(BoundaryError::MissingSource(self.path.clone()));
        }
        let bytes =
            std::fs::read(&self.path).map_err(|e| BoundaryError::Read(self.path.clone(), e))?;
        let document: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| BoundaryError::Parse(self.path.clone(), e))?;

        let kind = document
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();

        let collection = match kind.as_str() {
            "Topology" => {
                let topology: Topology = serde_json::from_value(document)
                    .map_err(|e| BoundaryError::Parse(self.path.clone(), e))?;
                topology.to_feature_collection(self.object.as_deref())?
            }
            "FeatureCollection" => serde_json::from_value(document)
                .map_err(|e| BoundaryError::Parse(self.path.clone(), e))?,
            _ => {
                return Err(BoundaryError::UnsupportedType {
                    path: self.path.clone(),
                    found: kind,
                })
            }
        };

        let collection = normalize_feature_keys(collection);
        info!(
            "Loaded {} boundary features from {:?}",
            collection.features.len(),
            self.path
        );
        Ok(collection)
    }
}

/// Lowercases the property keys of every feature. Idempotent.
pub fn normalize_feature_keys(mut collection: FeatureCollection) -> FeatureCollection {
    for feature in &mut collection.features {
        if let Some(properties) = feature.properties.take() {
            feature.properties = Some(normalize_property_keys(properties));
        }
    }
    collection
}
