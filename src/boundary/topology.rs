//! Decodes TopoJSON topologies into standalone GeoJSON features.
//!
//! A topology stores every shared boundary once, as an arc, and describes each polygon
//! as a list of arc indices. Decoding resolves those indices back into coordinate rings
//! so each feature carries its own complete geometry.

use crate::boundary::error::BoundaryError;
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Position, Value};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Quantization transform: `position = quantized * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        )
    }
}

/// A named geometry object of a topology.
///
/// Objects with `"type": null` carry properties without a shape; their `geometry` is `None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "JsonObject")]
pub struct TopoObject {
    pub geometry: Option<TopoGeometry>,
    pub id: Option<serde_json::Value>,
    pub properties: Option<JsonObject>,
}

impl TryFrom<JsonObject> for TopoObject {
    type Error = serde_json::Error;

    fn try_from(mut object: JsonObject) -> Result<Self, Self::Error> {
        let id = object.remove("id").filter(|id| !id.is_null());
        let properties = match object.remove("properties") {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(serde_json::from_value(value)?),
        };
        let shapeless = matches!(object.get("type"), Some(serde_json::Value::Null));
        let geometry = if shapeless {
            None
        } else {
            Some(serde_json::from_value(serde_json::Value::Object(object))?)
        };
        Ok(Self {
            geometry,
            id,
            properties,
        })
    }
}

/// Geometry of a topology object. Line and polygon coordinates are arc indices;
/// a negative index `i` refers to arc `!i` traversed in reverse.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TopoGeometry {
    GeometryCollection { geometries: Vec<TopoObject> },
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    LineString { arcs: Vec<i64> },
    MultiLineString { arcs: Vec<Vec<i64>> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: BTreeMap<String, TopoObject>,
}

impl Topology {
    /// Names of the top-level objects, sorted.
    pub fn object_names(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }

    /// Converts one named object into a feature collection. When `object` is `None`
    /// the topology must contain exactly one object.
    ///
    /// Geometry collections are flattened so every leaf geometry becomes one feature.
    pub fn to_feature_collection(
        &self,
        object: Option<&str>,
    ) -> Result<FeatureCollection, BoundaryError> {
        let root = match object {
            Some(name) => self
                .objects
                .get(name)
                .ok_or_else(|| BoundaryError::UnknownObject {
                    name: name.to_string(),
                    available: self.object_names(),
                })?,
            None => {
                let mut objects = self.objects.values();
                match (objects.next(), objects.next()) {
                    (Some(only), None) => only,
                    _ => {
                        return Err(BoundaryError::AmbiguousObject {
                            available: self.object_names(),
                        })
                    }
                }
            }
        };

        let mut features = Vec::new();
        self.collect_features(root, &mut features)?;
        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }

    fn collect_features(
        &self,
        object: &TopoObject,
        features: &mut Vec<Feature>,
    ) -> Result<(), BoundaryError> {
        let value = match &object.geometry {
            Some(TopoGeometry::GeometryCollection { geometries }) => {
                for child in geometries {
                    self.collect_features(child, features)?;
                }
                return Ok(());
            }
            Some(TopoGeometry::Point { coordinates }) => {
                Some(Value::Point(self.point(coordinates)?))
            }
            Some(TopoGeometry::MultiPoint { coordinates }) => Some(Value::MultiPoint(
                coordinates
                    .iter()
                    .map(|c| self.point(c))
                    .collect::<Result<_, _>>()?,
            )),
            Some(TopoGeometry::LineString { arcs }) => Some(Value::LineString(self.line(arcs)?)),
            Some(TopoGeometry::MultiLineString { arcs }) => Some(Value::MultiLineString(
                arcs.iter()
                    .map(|line| self.line(line))
                    .collect::<Result<_, _>>()?,
            )),
            Some(TopoGeometry::Polygon { arcs }) => Some(Value::Polygon(self.polygon(arcs)?)),
            Some(TopoGeometry::MultiPolygon { arcs }) => Some(Value::MultiPolygon(
                arcs.iter()
                    .map(|polygon| self.polygon(polygon))
                    .collect::<Result<_, _>>()?,
            )),
            None => None,
        };

        features.push(Feature {
            bbox: None,
            geometry: value.map(Geometry::new),
            id: object.id.as_ref().and_then(feature_id),
            properties: object.properties.clone(),
            foreign_members: None,
        });
        Ok(())
    }

    /// Absolute coordinates of one arc, reversed for negative indices.
    fn arc(&self, index: i64) -> Result<Vec<Position>, BoundaryError> {
        let (arc_index, reversed) = if index < 0 {
            ((!index) as usize, true)
        } else {
            (index as usize, false)
        };
        let arc = self
            .arcs
            .get(arc_index)
            .ok_or(BoundaryError::ArcOutOfRange {
                index,
                count: self.arcs.len(),
            })?;

        let mut points = Vec::with_capacity(arc.len());
        let (mut x, mut y) = (0.0, 0.0);
        for position in arc {
            let [px, py, rest @ ..] = position.as_slice() else {
                return Err(BoundaryError::MalformedPosition { arc: arc_index });
            };
            let (ax, ay) = match &self.transform {
                // Quantized arcs are delta-encoded.
                Some(transform) => {
                    x += px;
                    y += py;
                    transform.apply(x, y)
                }
                None => (*px, *py),
            };
            let mut point = vec![ax, ay];
            point.extend_from_slice(rest);
            points.push(point);
        }

        if reversed {
            points.reverse();
        }
        Ok(points)
    }

    /// Joins consecutive arcs, dropping the point each arc shares with its predecessor.
    fn line(&self, arcs: &[i64]) -> Result<Vec<Position>, BoundaryError> {
        let mut line: Vec<Position> = Vec::new();
        for &index in arcs {
            let points = self.arc(index)?;
            let skip = usize::from(!line.is_empty());
            line.extend(points.into_iter().skip(skip));
        }
        Ok(line)
    }

    fn ring(&self, arcs: &[i64]) -> Result<Vec<Position>, BoundaryError> {
        let mut ring = self.line(arcs)?;
        // Degenerate rings are padded to the four positions a GeoJSON ring requires.
        if let Some(first) = ring.first().cloned() {
            while ring.len() < 4 {
                ring.push(first.clone());
            }
        }
        Ok(ring)
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<Position>>, BoundaryError> {
        rings.iter().map(|ring| self.ring(ring)).collect()
    }

    /// Point positions are quantized but not delta-encoded.
    fn point(&self, coordinates: &[f64]) -> Result<Position, BoundaryError> {
        let [px, py, rest @ ..] = coordinates else {
            return Err(BoundaryError::MalformedPoint);
        };
        let (x, y) = match &self.transform {
            Some(transform) => transform.apply(*px, *py),
            None => (*px, *py),
        };
        let mut point = vec![x, y];
        point.extend_from_slice(rest);
        Ok(point)
    }
}

fn feature_id(id: &serde_json::Value) -> Option<Id> {
    match id {
        serde_json::Value::String(s) => Some(Id::String(s.clone())),
        serde_json::Value::Number(n) => Some(Id::Number(n.clone())),
        _ => None,
    }
}
