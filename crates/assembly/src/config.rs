use serde::{Deserialize, Serialize};
use streaming::cache::ViewportCacheConfig;

/// Tunables for a parcel assembly session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Below this zoom the viewport never fetches nearby parcels.
    pub min_zoom: f64,

    /// Slack (degrees) when testing a viewport against the last fetched bbox.
    pub bbox_tolerance_deg: f64,

    /// Feature cap for one nearby-parcels request.
    pub nearby_limit: usize,

    /// Quiet period after the last viewport change before it counts as settled.
    pub debounce_ms: u64,

    /// Boundary lookups in flight during a main rebuild. `1` is sequential.
    pub boundary_fetch_concurrency: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            min_zoom: 15.0,
            bbox_tolerance_deg: 0.0005,
            nearby_limit: 200,
            debounce_ms: 500,
            boundary_fetch_concurrency: 1,
        }
    }
}

impl AssemblyConfig {
    pub fn viewport_cache(&self) -> ViewportCacheConfig {
        ViewportCacheConfig {
            min_zoom: self.min_zoom,
            tolerance_deg: self.bbox_tolerance_deg,
            limit: self.nearby_limit,
        }
    }
}
