//! Wire types for the parcel backend.
//!
//! Shapes follow the REST services the engine talks to:
//! - `GET /addresses/{id}/boundary` → [`BoundaryResponse`]
//! - `GET /parcels/nearby` → [`NearbyParcelsResponse`]
//! - `GET /addresses/validate` → [`ValidatedAddress`]
//! - project addresses → [`Address`], new ones posted as [`NewAddress`]
//!
//! Geometry-bearing fields stay as raw JSON here; they are normalized by
//! `formats::boundary`, which never fails the whole response.

use formats::boundary::{BoundaryFeature, normalize_boundary_value};
use foundation::ids::AddressId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An address in the current project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(default)]
    pub full_address: String,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Cached boundary in any accepted payload shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<Value>,
}

impl Address {
    pub fn new(id: AddressId, full_address: impl Into<String>) -> Self {
        Self {
            id,
            full_address: full_address.into(),
            street: None,
            city: None,
            state: None,
            zip_code: None,
            latitude: None,
            longitude: None,
            boundary: None,
        }
    }

    /// Optimistically inserted and not yet confirmed by the backend.
    pub fn is_pending(&self) -> bool {
        self.id.is_pending()
    }

    pub fn has_cached_boundary(&self) -> bool {
        self.boundary.as_ref().is_some_and(|b| !b.is_null())
    }

    pub fn cached_boundary(&self) -> Option<BoundaryFeature> {
        normalize_boundary_value(self.boundary.as_ref()?)
    }

    /// Trimmed, case-folded full address used for duplicate detection.
    pub fn match_key(&self) -> String {
        address_match_key(&self.full_address)
    }
}

pub fn address_match_key(full_address: &str) -> String {
    full_address.trim().to_lowercase()
}

/// Payload for adding an address to the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub full_address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Clicked parcel wrapped as a canonical Feature.
    pub boundary: Value,
}

impl NewAddress {
    /// Local stand-in shown until the backend confirms the add.
    pub fn to_pending_address(&self, id: AddressId) -> Address {
        Address {
            id,
            full_address: self.full_address.clone(),
            street: Some(self.street.clone()),
            city: Some(self.city.clone()),
            state: Some(self.state.clone()),
            zip_code: Some(self.zip_code.clone()),
            latitude: self.latitude,
            longitude: self.longitude,
            boundary: Some(self.boundary.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryResponse {
    /// One of the boundary payload shapes, or null.
    #[serde(default)]
    pub boundary: Value,
    #[serde(default)]
    pub surrounding_parcels: Vec<RawParcel>,
}

/// A parcel as returned by the backend: a Feature (or bare geometry / WKT
/// record) whose properties carry address fields and `is_main_parcel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawParcel(pub Value);

impl RawParcel {
    /// Server-side flag marking this parcel as one of the project's own addresses.
    pub fn is_main_parcel(&self) -> bool {
        let flag = self
            .0
            .get("properties")
            .and_then(|p| p.get("is_main_parcel"))
            .or_else(|| self.0.get("is_main_parcel"));
        matches!(flag, Some(Value::Bool(true)))
    }

    pub fn normalize(&self) -> Option<BoundaryFeature> {
        normalize_boundary_value(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearbyParcelsResponse {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub features: Vec<RawParcel>,
}

/// Result of the geocode/validate service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatedAddress {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::{Address, BoundaryResponse, NearbyParcelsResponse, ValidatedAddress};
    use foundation::ids::AddressId;
    use serde_json::json;

    #[test]
    fn address_cached_boundary_detection() {
        let mut a: Address = serde_json::from_value(json!({
            "id": 12,
            "full_address": "  1 Main St, Trenton, NJ 08608 ",
            "boundary": null
        }))
        .expect("parse");
        assert_eq!(a.id, AddressId::new("12"));
        assert!(!a.has_cached_boundary());
        assert_eq!(a.match_key(), "1 main st, trenton, nj 08608");

        a.boundary = Some(json!({"wkt": "POLYGON ((0 0, 1 0, 1 1, 0 0))"}));
        assert!(a.has_cached_boundary());
        assert!(a.cached_boundary().is_some());

        a.boundary = Some(json!({"wkt": "nonsense"}));
        assert!(a.has_cached_boundary());
        assert!(a.cached_boundary().is_none());
    }

    #[test]
    fn boundary_response_tolerates_missing_fields() {
        let r: BoundaryResponse = serde_json::from_value(json!({})).expect("parse");
        assert!(r.boundary.is_null());
        assert!(r.surrounding_parcels.is_empty());
    }

    #[test]
    fn main_parcel_flag_is_read_from_properties_or_top_level() {
        let r: NearbyParcelsResponse = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null, "properties": {"is_main_parcel": true}},
                {"type": "Feature", "geometry": null, "properties": {"is_main_parcel": false}},
                {"wkt": "POLYGON ((0 0, 1 0, 1 1, 0 0))", "is_main_parcel": true},
                {"type": "Feature", "geometry": null, "properties": {}}
            ]
        }))
        .expect("parse");
        let flags: Vec<bool> = r.features.iter().map(|f| f.is_main_parcel()).collect();
        assert_eq!(flags, vec![true, false, true, false]);
        assert!(r.features[2].normalize().is_some());
        assert!(r.features[0].normalize().is_none());
    }

    #[test]
    fn validated_address_defaults() {
        let v: ValidatedAddress =
            serde_json::from_value(json!({"valid": true, "city": "Trenton"})).expect("parse");
        assert!(v.valid);
        assert_eq!(v.city.as_deref(), Some("Trenton"));
        assert!(v.zip_code.is_none());
    }
}
