//! Seams to the embedding application.

use foundation::ids::AddressId;
use layers::collection::RenderCollection;
use scene::hit::ParcelLayer;
use scene::hover::HoverSink;
use streaming::cache::Viewport;
use streaming::protocol::{Address, NewAddress};
use streaming::source::{BoxFuture, SourceError};

/// The interactive map: viewport, render sources, feature-state and cursor.
pub trait MapHost: HoverSink {
    fn viewport(&self) -> Viewport;

    /// Replace the data of the collection's render source.
    fn set_parcels(&mut self, collection: &RenderCollection);

    /// Spinner overlay for a layer.
    fn set_loading(&mut self, _layer: ParcelLayer, _loading: bool) {}
}

/// Owner of the project's address list.
pub trait AddressHost: Send + Sync {
    /// Persist a new address; resolves to the confirmed record.
    fn request_add_address(
        &self,
        address: NewAddress,
    ) -> BoxFuture<'_, Result<Address, SourceError>>;

    fn request_remove_address(&self, address_id: &AddressId)
    -> BoxFuture<'_, Result<(), SourceError>>;
}
