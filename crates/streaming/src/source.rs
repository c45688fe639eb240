//! Parcel data source abstraction.
//!
//! The engine never talks to the network directly; it goes through
//! [`ParcelSource`]. The HTTP implementation lives with the CLI, and tests use
//! in-memory fakes.

use std::future::Future;
use std::pin::Pin;

use foundation::bounds::GeoBbox;
use foundation::ids::AddressId;

use crate::protocol::{BoundaryResponse, NearbyParcelsResponse, ValidatedAddress};

/// A boundary, nearby-parcel or geocode request that did not produce data,
/// or an address add/remove the project host refused.
///
/// `message` is what ends up in user alerts; `source` keeps the transport or
/// decoding error behind it, if any.
#[derive(Debug)]
pub struct SourceError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backend services the engine consumes.
///
/// No method retries or times out; callers treat every error as soft.
pub trait ParcelSource: Send + Sync {
    /// Boundary of one address plus the parcels around it.
    fn get_boundary(&self, address_id: &AddressId)
    -> BoxFuture<'_, Result<BoundaryResponse, SourceError>>;

    /// Parcels intersecting `bbox`, at most `limit` of them.
    fn get_nearby_parcels(
        &self,
        bbox: GeoBbox,
        limit: usize,
    ) -> BoxFuture<'_, Result<NearbyParcelsResponse, SourceError>>;

    /// Geocode/validate a free-form query (an address, or `"lon,lat"`).
    fn validate_address(&self, query: &str)
    -> BoxFuture<'_, Result<ValidatedAddress, SourceError>>;
}
