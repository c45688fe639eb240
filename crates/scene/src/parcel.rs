use foundation::ids::AddressId;
use serde_json::{Map, Value};

use crate::fingerprint::Fingerprint;

/// Arbitrary passthrough display attributes (owner, zoning, land use, ...).
pub type Properties = Map<String, Value>;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Polygon rings, outer ring first. Treated as opaque: never reordered or simplified.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub rings: Vec<Vec<GeoPoint>>,
}

impl Polygon {
    pub fn new(rings: Vec<Vec<GeoPoint>>) -> Self {
        Self { rings }
    }

    pub fn outer(&self) -> Option<&[GeoPoint]> {
        self.rings.first().map(|r| r.as_slice())
    }

    pub fn first_vertex(&self) -> Option<GeoPoint> {
        self.outer().and_then(|r| r.first()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.first_vertex().is_none()
    }
}

/// Address fields carried by a non-main parcel, read from its properties.
///
/// Upstream datasets disagree on key names, so several aliases are accepted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParcelAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ParcelAddress {
    pub fn from_properties(props: &Properties) -> Self {
        Self {
            street: text_field(props, &["address", "street", "street_address"]),
            city: text_field(props, &["city"]),
            state: text_field(props, &["state"]),
            zip_code: text_field(props, &["zip", "zip_code", "zipcode"]),
            latitude: number_field(props, &["lat", "latitude"]),
            longitude: number_field(props, &["lon", "lng", "longitude"]),
        }
    }

    /// True when street, city, state and zip are all present.
    pub fn is_complete(&self) -> bool {
        self.street.is_some()
            && self.city.is_some()
            && self.state.is_some()
            && self.zip_code.is_some()
    }

    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        Some((self.longitude?, self.latitude?))
    }

    /// `"<street>, <city>, <state> <zip>"`, or `None` if any part is missing.
    pub fn full_address(&self) -> Option<String> {
        let street = self.street.as_deref()?;
        let city = self.city.as_deref()?;
        let state = self.state.as_deref()?;
        let zip = self.zip_code.as_deref()?;
        Some(format!("{street}, {city}, {state} {zip}"))
    }
}

fn text_field(props: &Properties, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match props.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn number_field(props: &Properties, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match props.get(*k) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Which source a parcel came from, with the data each role needs downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum ParcelRole {
    /// Boundary of an address already in the assembly.
    Main { address_id: AddressId },
    /// Neighbour returned alongside an address boundary lookup.
    Surrounding(ParcelAddress),
    /// Neighbour returned by a viewport-scoped nearby-parcels query.
    Viewport(ParcelAddress),
}

impl ParcelRole {
    pub fn is_main(&self) -> bool {
        matches!(self, ParcelRole::Main { .. })
    }

    pub fn address_id(&self) -> Option<&AddressId> {
        match self {
            ParcelRole::Main { address_id } => Some(address_id),
            _ => None,
        }
    }

    pub fn parcel_address(&self) -> Option<&ParcelAddress> {
        match self {
            ParcelRole::Main { .. } => None,
            ParcelRole::Surrounding(a) | ParcelRole::Viewport(a) => Some(a),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ParcelRole::Main { .. } => "main",
            ParcelRole::Surrounding(_) => "surrounding",
            ParcelRole::Viewport(_) => "viewport",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParcelFeature {
    pub geometry: Polygon,
    pub role: ParcelRole,
    pub properties: Properties,
}

impl ParcelFeature {
    pub fn main(address_id: AddressId, geometry: Polygon, properties: Properties) -> Self {
        Self {
            geometry,
            role: ParcelRole::Main { address_id },
            properties,
        }
    }

    pub fn surrounding(geometry: Polygon, properties: Properties) -> Self {
        let address = ParcelAddress::from_properties(&properties);
        Self {
            geometry,
            role: ParcelRole::Surrounding(address),
            properties,
        }
    }

    pub fn viewport(geometry: Polygon, properties: Properties) -> Self {
        let address = ParcelAddress::from_properties(&properties);
        Self {
            geometry,
            role: ParcelRole::Viewport(address),
            properties,
        }
    }

    pub fn fingerprint(&self) -> Option<Fingerprint> {
        Fingerprint::of_polygon(&self.geometry)
    }
}
