use std::collections::BTreeSet;

use formats::geojson::{feature_collection_value, polygon_feature_value};
use foundation::ids::RenderId;
use scene::fingerprint::Fingerprint;
use scene::hit::{MapHit, ParcelHit, ParcelLayer};
use scene::parcel::{ParcelFeature, ParcelRole};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedParcel {
    pub render_id: RenderId,
    pub feature: ParcelFeature,
}

/// Render-ready parcels for one map source.
///
/// Render ids are `0..len` in order and are reassigned from scratch every time
/// the collection is rebuilt; they must not be held across rebuilds.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCollection {
    layer: ParcelLayer,
    parcels: Vec<RenderedParcel>,
}

impl RenderCollection {
    pub fn empty(layer: ParcelLayer) -> Self {
        Self {
            layer,
            parcels: Vec::new(),
        }
    }

    pub fn from_features(
        layer: ParcelLayer,
        features: impl IntoIterator<Item = ParcelFeature>,
    ) -> Self {
        let parcels = features
            .into_iter()
            .enumerate()
            .map(|(i, feature)| RenderedParcel {
                render_id: RenderId(i as u32),
                feature,
            })
            .collect();
        Self { layer, parcels }
    }

    pub fn layer(&self) -> ParcelLayer {
        self.layer
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn get(&self, id: RenderId) -> Option<&RenderedParcel> {
        self.parcels.get(id.index() as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedParcel> + '_ {
        self.parcels.iter()
    }

    pub fn features(&self) -> impl Iterator<Item = &ParcelFeature> + '_ {
        self.parcels.iter().map(|p| &p.feature)
    }

    /// What the host's hit-test would report for `id` on this layer.
    pub fn hit(&self, id: RenderId) -> Option<MapHit> {
        let parcel = self.get(id)?;
        Some(MapHit::Parcel(ParcelHit {
            layer: self.layer,
            render_id: parcel.render_id,
            feature: parcel.feature.clone(),
        }))
    }

    pub fn fingerprints(&self) -> BTreeSet<Fingerprint> {
        self.features().filter_map(ParcelFeature::fingerprint).collect()
    }

    /// GeoJSON FeatureCollection with the render id as feature `id` and the
    /// role written back into properties for styling.
    pub fn to_geojson_value(&self) -> Value {
        let features = self
            .parcels
            .iter()
            .map(|p| {
                let mut props = p.feature.properties.clone();
                let role = &p.feature.role;
                props.insert("role".to_string(), role.tag().into());
                props.insert("is_main_parcel".to_string(), role.is_main().into());
                props.insert("is_surrounding".to_string(), (!role.is_main()).into());
                if let ParcelRole::Main { address_id } = role {
                    props.insert("address_id".to_string(), address_id.as_str().into());
                }
                polygon_feature_value(&p.feature.geometry, &props, Some(p.render_id.index()))
            })
            .collect();
        feature_collection_value(features)
    }
}
