use std::collections::BTreeSet;

use scene::parcel::ParcelFeature;
use serde_json::{Value, json};
use streaming::protocol::{Address, RawParcel};
use tracing::debug;

/// Normalize boundary-lookup neighbours into `Surrounding` features.
///
/// Unreadable candidates are dropped, and of several candidates sharing a
/// fingerprint only the first is kept.
pub fn build_surrounding(candidates: &[RawParcel]) -> Vec<ParcelFeature> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(candidates.len());
    for raw in candidates {
        let Some(boundary) = raw.normalize() else {
            continue;
        };
        let feature = ParcelFeature::surrounding(boundary.geometry, boundary.properties);
        let Some(fp) = feature.fingerprint() else {
            continue;
        };
        if seen.insert(fp) {
            out.push(feature);
        }
    }
    if out.len() < candidates.len() {
        debug!(
            kept = out.len(),
            total = candidates.len(),
            "dropped unreadable or duplicate surrounding candidates"
        );
    }
    out
}

/// Turn a main parcel whose address left the assembly back into a neighbour.
///
/// Address fields from `address` fill whatever the boundary properties lack,
/// so the parcel can be clicked to add it again.
pub fn demote_main(feature: ParcelFeature, address: Option<&Address>) -> ParcelFeature {
    let mut properties = feature.properties;
    properties.remove("is_main_parcel");
    if let Some(a) = address {
        let text = [
            ("address", &a.street),
            ("city", &a.city),
            ("state", &a.state),
            ("zip_code", &a.zip_code),
        ];
        for (key, value) in text {
            if let Some(v) = value {
                properties
                    .entry(key)
                    .or_insert_with(|| Value::String(v.clone()));
            }
        }
        for (key, value) in [("lat", a.latitude), ("lon", a.longitude)] {
            if let Some(v) = value {
                properties.entry(key).or_insert_with(|| json!(v));
            }
        }
    }
    ParcelFeature::surrounding(feature.geometry, properties)
}

#[cfg(test)]
mod tests {
    use super::{build_surrounding, demote_main};
    use foundation::ids::AddressId;
    use pretty_assertions::assert_eq;
    use scene::parcel::{ParcelFeature, ParcelRole};
    use serde_json::json;
    use streaming::protocol::{Address, RawParcel};

    fn raw(lon: f64, lat: f64, street: &str) -> RawParcel {
        RawParcel(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[lon, lat], [lon + 0.001, lat], [lon + 0.001, lat + 0.001], [lon, lat]]]
            },
            "properties": {
                "address": street,
                "city": "Trenton",
                "state": "NJ",
                "zip": "08608",
                "land_use": "residential"
            }
        }))
    }

    #[test]
    fn keeps_passthrough_properties_and_address_fields() {
        let out = build_surrounding(&[raw(-74.0, 40.0, "1 A St")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].properties.get("land_use"), Some(&json!("residential")));
        let ParcelRole::Surrounding(address) = &out[0].role else {
            panic!("expected surrounding role");
        };
        assert_eq!(
            address.full_address().as_deref(),
            Some("1 A St, Trenton, NJ 08608")
        );
    }

    #[test]
    fn first_candidate_wins_on_fingerprint_collision() {
        let out = build_surrounding(&[
            raw(-74.0, 40.0, "first"),
            raw(-74.0000001, 40.0000001, "second"),
            RawParcel(json!({"wkt": "garbage"})),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].properties.get("address"), Some(&json!("first")));
    }

    #[test]
    fn demoted_main_parcel_is_clickable_again() {
        let pool = build_surrounding(&[raw(-74.0, 40.0, "ignored")]);
        let properties = json!({"owner": "Acme", "address": "1 Kept Rd", "is_main_parcel": true})
            .as_object()
            .cloned()
            .unwrap_or_default();
        let main = ParcelFeature::main(AddressId::new("1"), pool[0].geometry.clone(), properties);

        let mut address = Address::new(AddressId::new("1"), "1 Kept Rd, Ewing, NJ 08618");
        address.street = Some("1 Other Rd".to_string());
        address.city = Some("Ewing".to_string());
        address.state = Some("NJ".to_string());
        address.zip_code = Some("08618".to_string());

        let demoted = demote_main(main, Some(&address));
        assert_eq!(demoted.fingerprint(), pool[0].fingerprint());
        assert_eq!(demoted.properties.get("owner"), Some(&json!("Acme")));
        assert_eq!(demoted.properties.get("is_main_parcel"), None);
        let ParcelRole::Surrounding(parcel) = &demoted.role else {
            panic!("expected surrounding role");
        };
        assert_eq!(
            parcel.full_address().as_deref(),
            Some("1 Kept Rd, Ewing, NJ 08618")
        );
    }
}
