use std::collections::BTreeSet;

use scene::fingerprint::Fingerprint;
use scene::hit::ParcelLayer;
use scene::parcel::ParcelFeature;

use crate::collection::RenderCollection;

/// Build the render-ready surrounding collection.
///
/// Boundary-lookup neighbours come first, then accumulated viewport parcels
/// not already present. Nothing whose fingerprint is a main parcel survives.
/// Render ids are assigned afresh.
pub fn merge_surrounding<'a>(
    main: &BTreeSet<Fingerprint>,
    surrounding: &[ParcelFeature],
    viewport: impl IntoIterator<Item = &'a ParcelFeature>,
) -> RenderCollection {
    let mut seen: BTreeSet<Fingerprint> = BTreeSet::new();
    let mut out = Vec::with_capacity(surrounding.len());

    for feature in surrounding {
        match feature.fingerprint() {
            Some(fp) if main.contains(&fp) => continue,
            Some(fp) => {
                seen.insert(fp);
            }
            None => {}
        }
        out.push(feature.clone());
    }

    for feature in viewport {
        let Some(fp) = feature.fingerprint() else {
            continue;
        };
        if main.contains(&fp) || !seen.insert(fp) {
            continue;
        }
        out.push(feature.clone());
    }

    RenderCollection::from_features(ParcelLayer::Surrounding, out)
}

#[cfg(test)]
mod tests {
    use super::merge_surrounding;
    use pretty_assertions::assert_eq;
    use scene::parcel::{GeoPoint, ParcelFeature, Polygon, Properties};
    use std::collections::BTreeSet;

    fn at(lon: f64, lat: f64) -> Polygon {
        Polygon::new(vec![vec![
            GeoPoint::new(lon, lat),
            GeoPoint::new(lon + 0.001, lat),
            GeoPoint::new(lon, lat + 0.001),
            GeoPoint::new(lon, lat),
        ]])
    }

    #[test]
    fn surrounding_first_then_new_viewport_parcels() {
        let surrounding = vec![
            ParcelFeature::surrounding(at(1.0, 1.0), Properties::new()),
            ParcelFeature::surrounding(at(2.0, 2.0), Properties::new()),
        ];
        let viewport = [
            ParcelFeature::viewport(at(2.0, 2.0), Properties::new()),
            ParcelFeature::viewport(at(3.0, 3.0), Properties::new()),
        ];
        let main: BTreeSet<_> = [ParcelFeature::surrounding(at(1.0, 1.0), Properties::new())]
            .iter()
            .filter_map(|f| f.fingerprint())
            .collect();

        let merged = merge_surrounding(&main, &surrounding, viewport.iter());
        let tags: Vec<(u32, &str)> = merged
            .iter()
            .map(|p| (p.render_id.index(), p.feature.role.tag()))
            .collect();
        assert_eq!(tags, vec![(0, "surrounding"), (1, "viewport")]);
        assert!(merged.fingerprints().is_disjoint(&main));
    }

    #[test]
    fn empty_inputs_give_an_empty_collection() {
        let none = std::iter::empty::<&ParcelFeature>();
        let merged = merge_surrounding(&BTreeSet::new(), &[], none);
        assert!(merged.is_empty());
    }
}
