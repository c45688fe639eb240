//! In-memory [`ParcelSource`] backed by a JSON fixture.
//!
//! Used for offline runs of the CLI and as the fake backend in tests. Every
//! call is recorded so callers can assert on network traffic.

use std::collections::{BTreeMap, BTreeSet};

use foundation::bounds::GeoBbox;
use foundation::ids::AddressId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::protocol::{BoundaryResponse, NearbyParcelsResponse, RawParcel, ValidatedAddress};
use crate::source::{BoxFuture, ParcelSource, SourceError};

/// Canned backend responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFixture {
    /// Boundary responses keyed by address id.
    #[serde(default)]
    pub boundaries: BTreeMap<AddressId, BoundaryResponse>,
    /// Pool of parcels served by nearby queries, filtered by bbox.
    #[serde(default)]
    pub nearby: Vec<RawParcel>,
    /// Validation results keyed by exact query string.
    #[serde(default)]
    pub validations: BTreeMap<String, ValidatedAddress>,
}

/// Every request a [`MemorySource`] has served, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceCalls {
    pub boundary: Vec<AddressId>,
    pub nearby: Vec<GeoBbox>,
    pub validate: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemorySource {
    fixture: SourceFixture,
    failing_boundaries: BTreeSet<AddressId>,
    fail_nearby: bool,
    calls: Mutex<SourceCalls>,
}

impl MemorySource {
    pub fn new(fixture: SourceFixture) -> Self {
        Self {
            fixture,
            ..Self::default()
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, SourceError> {
        let fixture: SourceFixture = serde_json::from_str(payload)
            .map_err(|e| SourceError::with_source("invalid source fixture", e))?;
        Ok(Self::new(fixture))
    }

    /// Make boundary lookups for `id` fail.
    pub fn with_failing_boundary(mut self, id: AddressId) -> Self {
        self.failing_boundaries.insert(id);
        self
    }

    /// Make every nearby-parcels query fail.
    pub fn with_failing_nearby(mut self) -> Self {
        self.fail_nearby = true;
        self
    }

    pub fn calls(&self) -> SourceCalls {
        self.calls.lock().clone()
    }

    fn nearby_in(&self, bbox: GeoBbox, limit: usize) -> Vec<RawParcel> {
        self.fixture
            .nearby
            .iter()
            .filter(|p| match p.normalize().and_then(|f| f.geometry.first_vertex()) {
                Some(v) => {
                    v.lon_deg >= bbox.min_lon
                        && v.lon_deg <= bbox.max_lon
                        && v.lat_deg >= bbox.min_lat
                        && v.lat_deg <= bbox.max_lat
                }
                // Unreadable parcels are served as-is; the consumer decides.
                None => true,
            })
            .take(limit)
            .cloned()
            .collect()
    }
}

impl ParcelSource for MemorySource {
    fn get_boundary(
        &self,
        address_id: &AddressId,
    ) -> BoxFuture<'_, Result<BoundaryResponse, SourceError>> {
        let id = address_id.clone();
        Box::pin(async move {
            self.calls.lock().boundary.push(id.clone());
            if self.failing_boundaries.contains(&id) {
                return Err(SourceError::new(format!("boundary lookup failed for {id}")));
            }
            self.fixture
                .boundaries
                .get(&id)
                .cloned()
                .ok_or_else(|| SourceError::new(format!("no boundary for address {id}")))
        })
    }

    fn get_nearby_parcels(
        &self,
        bbox: GeoBbox,
        limit: usize,
    ) -> BoxFuture<'_, Result<NearbyParcelsResponse, SourceError>> {
        Box::pin(async move {
            self.calls.lock().nearby.push(bbox);
            if self.fail_nearby {
                return Err(SourceError::new("nearby parcels unavailable"));
            }
            Ok(NearbyParcelsResponse {
                kind: Some("FeatureCollection".to_string()),
                features: self.nearby_in(bbox, limit),
            })
        })
    }

    fn validate_address(
        &self,
        query: &str,
    ) -> BoxFuture<'_, Result<ValidatedAddress, SourceError>> {
        let query = query.to_string();
        Box::pin(async move {
            self.calls.lock().validate.push(query.clone());
            Ok(self
                .fixture
                .validations
                .get(&query)
                .cloned()
                .unwrap_or_default())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MemorySource;
    use crate::source::ParcelSource;
    use foundation::bounds::GeoBbox;
    use foundation::ids::AddressId;

    const FIXTURE: &str = r#"{
        "boundaries": {
            "a1": {"boundary": {"wkt": "POLYGON ((0 0, 1 0, 1 1, 0 0))"}, "surrounding_parcels": []}
        },
        "nearby": [
            {"wkt": "POLYGON ((-74.5 40.5, -74.4 40.5, -74.4 40.6, -74.5 40.5))"},
            {"wkt": "POLYGON ((10 10, 11 10, 11 11, 10 10))"}
        ],
        "validations": {
            "-74.5,40.5": {"valid": true, "street": "1 Main St"}
        }
    }"#;

    #[tokio::test]
    async fn serves_fixture_and_records_calls() {
        let source = MemorySource::from_json_str(FIXTURE).expect("fixture");

        let b = source.get_boundary(&AddressId::new("a1")).await.expect("boundary");
        assert!(!b.boundary.is_null());
        assert!(source.get_boundary(&AddressId::new("zz")).await.is_err());

        let bbox = GeoBbox::new(-75.0, 40.0, -74.0, 41.0);
        let nearby = source.get_nearby_parcels(bbox, 200).await.expect("nearby");
        assert_eq!(nearby.features.len(), 1);

        let v = source.validate_address("-74.5,40.5").await.expect("validate");
        assert_eq!(v.street.as_deref(), Some("1 Main St"));
        let unknown = source.validate_address("nowhere").await.expect("validate");
        assert!(!unknown.valid);

        let calls = source.calls();
        assert_eq!(calls.boundary.len(), 2);
        assert_eq!(calls.nearby, vec![bbox]);
        assert_eq!(calls.validate, vec!["-74.5,40.5", "nowhere"]);
    }

    #[tokio::test]
    async fn injected_failures() {
        let source = MemorySource::from_json_str(FIXTURE)
            .expect("fixture")
            .with_failing_boundary(AddressId::new("a1"))
            .with_failing_nearby();
        assert!(source.get_boundary(&AddressId::new("a1")).await.is_err());
        assert!(
            source
                .get_nearby_parcels(GeoBbox::new(0.0, 0.0, 1.0, 1.0), 10)
                .await
                .is_err()
        );
    }
}
