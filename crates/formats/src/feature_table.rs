use std::path::Path;

use serde_json::{Map, Value};

/// Coordinate pair in the source data's units (degrees for plain GeoJSON).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

/// One geographic record: attributes plus geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub attributes: Map<String, Value>,
    pub geometry: Geometry,
}

impl Feature {
    pub fn attribute(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// Attribute as a number. Numeric strings are accepted; null, missing and
    /// non-finite values are not.
    pub fn numeric(&self, field: &str) -> Option<f64> {
        let v = match self.attributes.get(field)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        v.is_finite().then_some(v)
    }
}

/// In-memory attribute table for a feature layer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FeatureTable {
    pub features: Vec<Feature>,
}

#[derive(Debug)]
pub enum FeatureTableError {
    Io(String),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for FeatureTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureTableError::Io(msg) => write!(f, "feature table read failed: {msg}"),
            FeatureTableError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            FeatureTableError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for FeatureTableError {}

impl FeatureTable {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FeatureTableError> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path)
            .map_err(|e| FeatureTableError::Io(format!("{}: {e}", path.display())))?;
        Self::from_geojson_str(&payload)
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, FeatureTableError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| FeatureTableError::InvalidFeature {
                index: 0,
                reason: format!("JSON parse error: {e}"),
            })?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, FeatureTableError> {
        let obj = value
            .as_object()
            .ok_or(FeatureTableError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(FeatureTableError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(FeatureTableError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(FeatureTableError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let invalid = |reason: String| FeatureTableError::InvalidFeature { index, reason };

            let feat_obj = feat_val
                .as_object()
                .ok_or_else(|| invalid("feature must be an object".to_string()))?;

            match feat_obj.get("type").and_then(|v| v.as_str()) {
                Some("Feature") => {}
                Some(other) => return Err(invalid(format!("unexpected feature type: {other}"))),
                None => return Err(invalid("feature missing type".to_string())),
            }

            let id = match feat_obj.get("id") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };

            let attributes = feat_obj
                .get("properties")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();

            let geometry_val = feat_obj
                .get("geometry")
                .ok_or_else(|| invalid("feature missing geometry".to_string()))?;
            let geometry = parse_geometry(geometry_val).map_err(invalid)?;

            features.push(Feature {
                id,
                attributes,
                geometry,
            });
        }

        Ok(Self { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    /// True when at least one feature carries the attribute (even if null).
    pub fn has_field(&self, field: &str) -> bool {
        self.features
            .iter()
            .any(|f| f.attributes.contains_key(field))
    }

    /// Numeric values of `field`, skipping features where it is not a number.
    pub fn values<'a>(&'a self, field: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.features.iter().filter_map(move |f| f.numeric(field))
    }
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_position(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_positions(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_positions(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_rings(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_rings(coords)?)),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                out.push(parse_rings(poly)?);
            }
            Ok(Geometry::MultiPolygon(out))
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_position(coords: &Value) -> Result<Position, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [x, y]".to_string());
    }
    let x = arr[0].as_f64().ok_or("x must be a number".to_string())?;
    let y = arr[1].as_f64().ok_or("y must be a number".to_string())?;
    Ok(Position::new(x, y))
}

fn parse_positions(coords: &Value) -> Result<Vec<Position>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(parse_position).collect()
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<Position>>, String> {
    let rings = coords
        .as_array()
        .ok_or("coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_positions).collect()
}
