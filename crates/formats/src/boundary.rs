//! Boundary payload normalization.
//!
//! The address backend has shipped boundaries in three shapes over time. All
//! of them normalize to a single polygon [`BoundaryFeature`]; anything that
//! cannot be read is logged and dropped rather than surfaced as an error.

use scene::parcel::{Polygon, Properties};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::geojson::{parse_polygon_coordinates, parse_polygon_geometry, polygon_feature_value};
use crate::wkt::parse_wkt_polygon;

/// Boundary as received from the backend or cached on an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundaryPayload {
    /// `{wkt, properties}`
    Wkt {
        wkt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<Properties>,
    },
    /// `{type: "Feature", geometry, properties}`, already canonical.
    Feature {
        #[serde(rename = "type", default = "feature_kind")]
        kind: String,
        geometry: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<Properties>,
    },
    /// `{type, coordinates, properties}`, a bare geometry.
    Geometry {
        #[serde(rename = "type")]
        kind: String,
        coordinates: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<Properties>,
    },
}

fn feature_kind() -> String {
    "Feature".to_string()
}

impl BoundaryPayload {
    pub fn wkt(wkt: impl Into<String>, properties: Properties) -> Self {
        BoundaryPayload::Wkt {
            wkt: wkt.into(),
            properties: Some(properties),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            BoundaryPayload::Wkt { .. } => "wkt",
            BoundaryPayload::Feature { .. } => "feature",
            BoundaryPayload::Geometry { .. } => "geometry",
        }
    }
}

/// A normalized polygon boundary with its passthrough properties.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub geometry: Polygon,
    pub properties: Properties,
}

impl BoundaryFeature {
    pub fn new(geometry: Polygon, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    pub fn to_geojson_value(&self) -> Value {
        polygon_feature_value(&self.geometry, &self.properties, None)
    }

    /// Re-wrap as a canonical Feature payload, e.g. to cache on an address.
    pub fn to_payload(&self) -> BoundaryPayload {
        let geometry = crate::geojson::polygon_geometry_value(&self.geometry);
        BoundaryPayload::Feature {
            kind: feature_kind(),
            geometry,
            properties: Some(self.properties.clone()),
        }
    }
}

pub fn normalize_boundary(payload: &BoundaryPayload) -> Option<BoundaryFeature> {
    let (parsed, properties) = match payload {
        BoundaryPayload::Wkt { wkt, properties } => (
            parse_wkt_polygon(wkt).map_err(|e| e.to_string()),
            properties,
        ),
        BoundaryPayload::Feature {
            geometry,
            properties,
            ..
        } => (parse_polygon_geometry(geometry), properties),
        BoundaryPayload::Geometry {
            kind,
            coordinates,
            properties,
        } => (parse_polygon_coordinates(kind, coordinates), properties),
    };

    let geometry = match parsed {
        Ok(g) => g,
        Err(reason) => {
            warn!(shape = payload.shape(), "dropping unreadable boundary: {reason}");
            return None;
        }
    };
    if geometry.is_empty() {
        warn!(shape = payload.shape(), "dropping boundary with empty outer ring");
        return None;
    }

    Some(BoundaryFeature::new(
        geometry,
        properties.clone().unwrap_or_default(),
    ))
}

/// Normalize an untyped JSON payload. `null` and unrecognized shapes yield `None`.
pub fn normalize_boundary_value(value: &Value) -> Option<BoundaryFeature> {
    if value.is_null() {
        return None;
    }
    match BoundaryPayload::deserialize(value) {
        Ok(payload) => normalize_boundary(&payload),
        Err(e) => {
            warn!("dropping boundary of unrecognized shape: {e}");
            None
        }
    }
}
