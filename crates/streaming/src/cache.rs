use std::collections::{BTreeMap, BTreeSet};

use foundation::bounds::GeoBbox;
use scene::fingerprint::Fingerprint;
use scene::parcel::ParcelFeature;
use tracing::debug;

use crate::protocol::RawParcel;
use crate::request::{RequestId, ViewportRequest};

/// Current map viewport as reported by the host.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub bbox: GeoBbox,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(bbox: GeoBbox, zoom: f64) -> Self {
        Self { bbox, zoom }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportCacheConfig {
    /// Below this zoom no nearby parcels are fetched.
    pub min_zoom: f64,
    /// Slack allowed when testing a viewport against the last fetched bbox.
    pub tolerance_deg: f64,
    /// Feature cap passed to the nearby-parcels endpoint.
    pub limit: usize,
}

impl Default for ViewportCacheConfig {
    fn default() -> Self {
        Self {
            min_zoom: 15.0,
            tolerance_deg: 0.0005,
            limit: 200,
        }
    }
}

/// What a settled viewport requires.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewportPlan {
    BelowMinZoom,
    /// The viewport lies within the last fetched bbox.
    CacheHit,
    Fetch(ViewportRequest),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inserted: usize,
    pub skipped_main: usize,
    pub skipped_known: usize,
    /// Unreadable, fingerprint-less or server-flagged main parcels.
    pub dropped: usize,
}

/// Bbox-containment cache over nearby-parcel fetches, plus the accumulator
/// of every viewport parcel seen this session.
///
/// Notes:
/// - `last_fetched_bbox` is replaced, never unioned, on each successful fetch.
/// - `accumulated` only grows; entries outside the current viewport are kept.
/// - [`ViewportCache::apply`] is a fingerprint-keyed insert-if-absent, so
///   fetches may complete in any order, or twice, with the same result.
#[derive(Debug)]
pub struct ViewportCache {
    config: ViewportCacheConfig,
    next_request: u64,
    last_fetched_bbox: Option<GeoBbox>,
    accumulated: BTreeMap<Fingerprint, ParcelFeature>,
}

impl ViewportCache {
    pub fn new(config: ViewportCacheConfig) -> Self {
        Self {
            config,
            next_request: 1,
            last_fetched_bbox: None,
            accumulated: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ViewportCacheConfig {
        &self.config
    }

    pub fn last_fetched_bbox(&self) -> Option<GeoBbox> {
        self.last_fetched_bbox
    }

    pub fn len(&self) -> usize {
        self.accumulated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulated.is_empty()
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.accumulated.contains_key(fp)
    }

    /// Accumulated viewport parcels in fingerprint order.
    pub fn snapshot(&self) -> Vec<ParcelFeature> {
        self.accumulated.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &ParcelFeature)> + '_ {
        self.accumulated.iter()
    }

    /// Decide whether a settled viewport needs a fetch.
    pub fn plan(&mut self, view: &Viewport) -> ViewportPlan {
        if view.zoom < self.config.min_zoom {
            return ViewportPlan::BelowMinZoom;
        }
        if let Some(last) = self.last_fetched_bbox
            && last.contains_with_tolerance(&view.bbox, self.config.tolerance_deg)
        {
            debug!(bbox = %view.bbox, last = %last, "viewport cache hit");
            return ViewportPlan::CacheHit;
        }

        let id = RequestId(self.next_request);
        self.next_request += 1;
        ViewportPlan::Fetch(ViewportRequest {
            id,
            bbox: view.bbox,
            limit: self.config.limit,
        })
    }

    /// Merge a successful fetch for `req` into the accumulator.
    pub fn apply(
        &mut self,
        req: &ViewportRequest,
        parcels: &[RawParcel],
        main: &BTreeSet<Fingerprint>,
    ) -> MergeSummary {
        self.last_fetched_bbox = Some(req.bbox);

        let mut summary = MergeSummary::default();
        for raw in parcels {
            if raw.is_main_parcel() {
                summary.dropped += 1;
                continue;
            }
            let Some(boundary) = raw.normalize() else {
                summary.dropped += 1;
                continue;
            };
            let feature = ParcelFeature::viewport(boundary.geometry, boundary.properties);
            let Some(fp) = feature.fingerprint() else {
                summary.dropped += 1;
                continue;
            };
            if main.contains(&fp) {
                summary.skipped_main += 1;
                continue;
            }
            if self.accumulated.contains_key(&fp) {
                summary.skipped_known += 1;
                continue;
            }
            self.accumulated.insert(fp, feature);
            summary.inserted += 1;
        }

        debug!(
            request = req.id.0,
            bbox = %req.bbox,
            inserted = summary.inserted,
            total = self.accumulated.len(),
            "merged viewport parcels"
        );
        summary
    }

    /// Forget everything, as on view teardown.
    pub fn reset(&mut self) {
        self.last_fetched_bbox = None;
        self.accumulated.clear();
    }
}

impl Default for ViewportCache {
    fn default() -> Self {
        Self::new(ViewportCacheConfig::default())
    }
}
