//! Vector features and GeoJSON serialization

use crate::error::{Error, Result};
use geo_types::{Geometry, LineString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    fn to_json(&self) -> Value {
        match self {
            AttributeValue::Null => Value::Null,
            AttributeValue::Bool(b) => json!(b),
            AttributeValue::Int(i) => json!(i),
            AttributeValue::Float(f) => json!(f),
            AttributeValue::String(s) => json!(s),
        }
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    fn to_json(&self) -> Result<Value> {
        let geometry = match &self.geometry {
            Some(g) => geometry_to_json(g)?,
            None => Value::Null,
        };

        let properties: serde_json::Map<String, Value> = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();

        let mut feature = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": properties,
        });
        if let Some(id) = &self.id {
            feature["id"] = json!(id);
        }
        Ok(feature)
    }
}

fn ring_to_json(ring: &LineString<f64>) -> Value {
    let coords: Vec<Value> = ring.coords().map(|c| json!([c.x, c.y])).collect();
    Value::Array(coords)
}

fn geometry_to_json(geometry: &Geometry<f64>) -> Result<Value> {
    match geometry {
        Geometry::LineString(ls) => Ok(json!({
            "type": "LineString",
            "coordinates": ring_to_json(ls),
        })),
        Geometry::Polygon(poly) => {
            let mut rings = vec![ring_to_json(poly.exterior())];
            rings.extend(poly.interiors().iter().map(ring_to_json));
            Ok(json!({
                "type": "Polygon",
                "coordinates": rings,
            }))
        }
        _ => Err(Error::Other(
            "only LineString and Polygon geometries export to GeoJSON".to_string(),
        )),
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Serialize the collection as a GeoJSON document
    pub fn to_geojson(&self) -> Result<String> {
        let features: Result<Vec<Value>> = self.features.iter().map(|f| f.to_json()).collect();
        let doc = json!({
            "type": "FeatureCollection",
            "features": features?,
        });
        serde_json::to_string_pretty(&doc).map_err(|e| Error::Other(e.to_string()))
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
