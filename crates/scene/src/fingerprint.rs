//! Approximate spatial identity for parcels.
//!
//! None of the upstream datasets share a parcel key, so two polygons are the
//! same parcel when their first outer-ring vertices quantize to the same grid
//! cell at [`FINGERPRINT_DECIMALS`] digits. Adjacent parcels can in principle
//! collide; that approximation is accepted until upstream provides real ids.

use foundation::precision::{FINGERPRINT_DECIMALS, format_quantized, quantize};

use crate::parcel::{GeoPoint, ParcelFeature, Polygon};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint {
    lon_q: i64,
    lat_q: i64,
}

impl Fingerprint {
    pub fn of_point(p: GeoPoint) -> Option<Self> {
        Some(Self {
            lon_q: quantize(p.lon_deg, FINGERPRINT_DECIMALS)?,
            lat_q: quantize(p.lat_deg, FINGERPRINT_DECIMALS)?,
        })
    }

    /// `None` when the polygon has no vertex (or a non-finite one).
    pub fn of_polygon(poly: &Polygon) -> Option<Self> {
        Self::of_point(poly.first_vertex()?)
    }
}

/// Fingerprint of a parcel feature. Features without one never match anything.
pub fn fingerprint(feature: &ParcelFeature) -> Option<Fingerprint> {
    feature.fingerprint()
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{}",
            format_quantized(self.lon_q, FINGERPRINT_DECIMALS),
            format_quantized(self.lat_q, FINGERPRINT_DECIMALS)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Fingerprint, fingerprint};
    use crate::parcel::{GeoPoint, ParcelFeature, Polygon, Properties};

    fn square_at(lon: f64, lat: f64) -> Polygon {
        Polygon::new(vec![vec![
            GeoPoint::new(lon, lat),
            GeoPoint::new(lon + 0.001, lat),
            GeoPoint::new(lon + 0.001, lat + 0.001),
            GeoPoint::new(lon, lat),
        ]])
    }

    #[test]
    fn sub_epsilon_difference_collides() {
        let a = Fingerprint::of_polygon(&square_at(-74.1234561, 40.6543211));
        let b = Fingerprint::of_polygon(&square_at(-74.1234564, 40.6543214));
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn sixth_decimal_boundary_separates() {
        let a = Fingerprint::of_polygon(&square_at(-74.123456, 40.654321));
        let b = Fingerprint::of_polygon(&square_at(-74.123466, 40.654321));
        let c = Fingerprint::of_polygon(&square_at(-74.123456, 40.654331));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn only_the_first_vertex_matters() {
        let mut other = square_at(-74.5, 40.5);
        other.rings[0][2] = GeoPoint::new(0.0, 0.0);
        assert_eq!(
            Fingerprint::of_polygon(&other),
            Fingerprint::of_polygon(&square_at(-74.5, 40.5))
        );
    }

    #[test]
    fn displays_as_fixed_six_decimals() {
        let fp = Fingerprint::of_polygon(&square_at(-74.5, 40.0)).expect("fingerprint");
        assert_eq!(fp.to_string(), "-74.500000,40.000000");
    }

    #[test]
    fn missing_vertex_has_no_fingerprint() {
        let f = ParcelFeature::surrounding(Polygon::default(), Properties::new());
        assert_eq!(fingerprint(&f), None);
        assert_eq!(Fingerprint::of_point(GeoPoint::new(f64::NAN, 1.0)), None);
    }
}
