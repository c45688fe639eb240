use foundation::ids::RenderId;

use crate::parcel::ParcelFeature;

/// The two render layers the engine feeds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParcelLayer {
    Main,
    Surrounding,
}

impl ParcelLayer {
    /// Source name the map host uses to address feature-state.
    pub fn source_name(&self) -> &'static str {
        match self {
            ParcelLayer::Main => "main-parcels",
            ParcelLayer::Surrounding => "surrounding-parcels",
        }
    }
}

/// A rendered parcel under the pointer, as reported by the host's hit-test.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelHit {
    pub layer: ParcelLayer,
    pub render_id: RenderId,
    pub feature: ParcelFeature,
}

/// Topmost feature under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum MapHit {
    Parcel(ParcelHit),
    /// Basemap or any other non-interactive layer.
    Other,
}

impl MapHit {
    pub fn parcel(&self) -> Option<&ParcelHit> {
        match self {
            MapHit::Parcel(hit) => Some(hit),
            MapHit::Other => None,
        }
    }
}
