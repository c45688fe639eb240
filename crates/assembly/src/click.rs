//! Turning a click on a parcel into an add or remove request.

use formats::boundary::BoundaryFeature;
use foundation::ids::AddressId;
use scene::hit::MapHit;
use scene::parcel::{ParcelAddress, ParcelFeature, ParcelRole};
use streaming::protocol::{NewAddress, ValidatedAddress};
use streaming::source::{ParcelSource, SourceError};
use tracing::{debug, warn};

use crate::address::AddressList;

#[derive(Debug, Clone, PartialEq)]
pub enum ClickAction {
    Remove(AddressId),
    Add(NewAddress),
    /// Nothing actionable under the pointer.
    Ignore,
}

#[derive(Debug)]
pub enum ClickError {
    /// The parcel lacks street, city, state or zip even after geocoding.
    IncompleteParcelData,
    DuplicateAddress { full_address: String },
    /// The address host rejected an add or remove.
    Host(SourceError),
}

impl std::fmt::Display for ClickError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClickError::IncompleteParcelData => {
                write!(f, "parcel is missing address information")
            }
            ClickError::DuplicateAddress { full_address } => {
                write!(f, "{full_address} is already in the project")
            }
            ClickError::Host(e) => write!(f, "address update failed: {e}"),
        }
    }
}

impl std::error::Error for ClickError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClickError::Host(e) => Some(e),
            _ => None,
        }
    }
}

/// Decide what a click on `hit` should do.
///
/// Main parcels are removed, except those whose add is still awaiting
/// confirmation. Surrounding and viewport parcels are added once
/// their address is complete; a single reverse geocode by `"lon,lat"` fills
/// missing fields when the parcel carries coordinates.
pub async fn classify_click(
    hit: Option<&MapHit>,
    addresses: &AddressList,
    source: &dyn ParcelSource,
) -> Result<ClickAction, ClickError> {
    let Some(parcel) = hit.and_then(MapHit::parcel) else {
        return Ok(ClickAction::Ignore);
    };

    let feature = &parcel.feature;
    let address = match &feature.role {
        ParcelRole::Main { address_id } if address_id.is_pending() => {
            debug!(address = %address_id, "add still in flight, click ignored");
            return Ok(ClickAction::Ignore);
        }
        ParcelRole::Main { address_id } => return Ok(ClickAction::Remove(address_id.clone())),
        ParcelRole::Surrounding(a) | ParcelRole::Viewport(a) => a,
    };

    let mut address = address.clone();
    if !address.is_complete()
        && let Some((lon, lat)) = address.lon_lat()
    {
        let query = format!("{lon},{lat}");
        match source.validate_address(&query).await {
            Ok(validated) => backfill(&mut address, validated),
            Err(e) => warn!(%query, "reverse geocode failed: {e}"),
        }
    }

    let Some(full_address) = address.full_address() else {
        return Err(ClickError::IncompleteParcelData);
    };
    if addresses.contains_full_address(&full_address) {
        return Err(ClickError::DuplicateAddress { full_address });
    }

    debug!(%full_address, "clicked parcel becomes a new address");
    Ok(ClickAction::Add(new_address(feature, address, full_address)))
}

/// Fill only the fields the parcel did not carry.
fn backfill(address: &mut ParcelAddress, v: ValidatedAddress) {
    address.street = address.street.take().or(v.street);
    address.city = address.city.take().or(v.city);
    address.state = address.state.take().or(v.state);
    address.zip_code = address.zip_code.take().or(v.zip_code);
    address.latitude = address.latitude.or(v.latitude);
    address.longitude = address.longitude.or(v.longitude);
}

fn new_address(
    feature: &ParcelFeature,
    address: ParcelAddress,
    full_address: String,
) -> NewAddress {
    let boundary = BoundaryFeature::new(feature.geometry.clone(), feature.properties.clone())
        .to_geojson_value();
    NewAddress {
        street: address.street.unwrap_or_default(),
        city: address.city.unwrap_or_default(),
        state: address.state.unwrap_or_default(),
        zip_code: address.zip_code.unwrap_or_default(),
        full_address,
        latitude: address.latitude,
        longitude: address.longitude,
        boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::{ClickAction, ClickError, classify_click};
    use crate::address::AddressList;
    use foundation::ids::{AddressId, RenderId};
    use pretty_assertions::assert_eq;
    use scene::hit::{MapHit, ParcelHit, ParcelLayer};
    use scene::parcel::{GeoPoint, ParcelFeature, Polygon, Properties};
    use serde_json::{Value, json};
    use streaming::memory::{MemorySource, SourceFixture};
    use streaming::protocol::{Address, ValidatedAddress};

    fn polygon() -> Polygon {
        Polygon::new(vec![vec![
            GeoPoint::new(-74.76, 40.22),
            GeoPoint::new(-74.759, 40.22),
            GeoPoint::new(-74.759, 40.221),
            GeoPoint::new(-74.76, 40.22),
        ]])
    }

    fn props(v: Value) -> Properties {
        v.as_object().cloned().unwrap_or_default()
    }

    fn surrounding_hit(p: Properties) -> MapHit {
        MapHit::Parcel(ParcelHit {
            layer: ParcelLayer::Surrounding,
            render_id: RenderId(0),
            feature: ParcelFeature::surrounding(polygon(), p),
        })
    }

    fn geocoder() -> MemorySource {
        let mut fixture = SourceFixture::default();
        fixture.validations.insert(
            "-74.76,40.22".to_string(),
            ValidatedAddress {
                valid: true,
                street: Some("9 Elm St".to_string()),
                city: Some("Ewing".to_string()),
                state: Some("NJ".to_string()),
                zip_code: Some("08618".to_string()),
                ..ValidatedAddress::default()
            },
        );
        MemorySource::new(fixture)
    }

    #[tokio::test]
    async fn main_parcel_click_removes() {
        let hit = MapHit::Parcel(ParcelHit {
            layer: ParcelLayer::Main,
            render_id: RenderId(3),
            feature: ParcelFeature::main(AddressId::new("a9"), polygon(), Properties::new()),
        });
        let source = MemorySource::default();
        let action = classify_click(Some(&hit), &AddressList::default(), &source)
            .await
            .expect("classify");
        assert_eq!(action, ClickAction::Remove(AddressId::new("a9")));
    }

    #[tokio::test]
    async fn unconfirmed_main_parcel_click_is_ignored() {
        let hit = MapHit::Parcel(ParcelHit {
            layer: ParcelLayer::Main,
            render_id: RenderId(1),
            feature: ParcelFeature::main(AddressId::pending(1), polygon(), Properties::new()),
        });
        let action = classify_click(Some(&hit), &AddressList::default(), &MemorySource::default())
            .await
            .expect("classify");
        assert_eq!(action, ClickAction::Ignore);
    }

    #[tokio::test]
    async fn complete_parcel_adds_without_geocoding() {
        let hit = surrounding_hit(props(json!({
            "address": "1 Oak Ave",
            "city": "Trenton",
            "state": "NJ",
            "zip": "08608",
            "zoning": "R-1"
        })));
        let source = geocoder();
        let action = classify_click(Some(&hit), &AddressList::default(), &source)
            .await
            .expect("classify");

        let ClickAction::Add(new) = action else {
            panic!("expected add");
        };
        assert_eq!(new.full_address, "1 Oak Ave, Trenton, NJ 08608");
        assert_eq!(new.boundary["type"], json!("Feature"));
        assert_eq!(new.boundary["geometry"]["type"], json!("Polygon"));
        assert_eq!(new.boundary["properties"]["zoning"], json!("R-1"));
        assert!(source.calls().validate.is_empty());
    }

    #[tokio::test]
    async fn missing_fields_are_backfilled_from_coordinates() {
        let hit = surrounding_hit(props(json!({
            "city": "Ewing Twp",
            "lat": 40.22,
            "lon": -74.76
        })));
        let source = geocoder();
        let action = classify_click(Some(&hit), &AddressList::default(), &source)
            .await
            .expect("classify");

        let ClickAction::Add(new) = action else {
            panic!("expected add");
        };
        assert_eq!(new.full_address, "9 Elm St, Ewing Twp, NJ 08618");
        assert_eq!(source.calls().validate, vec!["-74.76,40.22".to_string()]);
    }

    #[tokio::test]
    async fn incomplete_without_coordinates_is_rejected() {
        let hit = surrounding_hit(props(json!({"address": "1 Oak Ave"})));
        let source = geocoder();
        let err = classify_click(Some(&hit), &AddressList::default(), &source)
            .await
            .expect_err("incomplete");
        assert!(matches!(err, ClickError::IncompleteParcelData));
        assert!(source.calls().validate.is_empty());
    }

    #[tokio::test]
    async fn duplicate_address_is_rejected() {
        let hit = surrounding_hit(props(json!({
            "address": "1 Oak Ave",
            "city": "Trenton",
            "state": "NJ",
            "zip": "08608"
        })));
        let existing = AddressList::new(vec![Address::new(
            AddressId::new("1"),
            "1 oak ave, trenton, nj 08608 ",
        )]);
        let err = classify_click(Some(&hit), &existing, &MemorySource::default())
            .await
            .expect_err("duplicate");
        assert!(matches!(err, ClickError::DuplicateAddress { .. }));
    }

    #[tokio::test]
    async fn non_parcel_hits_are_ignored() {
        let source = MemorySource::default();
        let list = AddressList::default();
        assert_eq!(
            classify_click(Some(&MapHit::Other), &list, &source)
                .await
                .expect("classify"),
            ClickAction::Ignore
        );
        assert_eq!(
            classify_click(None, &list, &source).await.expect("classify"),
            ClickAction::Ignore
        );
    }
}
