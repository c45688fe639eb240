use foundation::bounds::GeoBbox;

/// Identifies a viewport fetch so its completion can be logged and applied
/// independently of other fetches that may still be in flight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// A planned nearby-parcels fetch for one settled viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportRequest {
    pub id: RequestId,
    pub bbox: GeoBbox,
    pub limit: usize,
}
