//! [`ParcelSource`] over the parcel backend's REST API.

use foundation::bounds::GeoBbox;
use foundation::ids::AddressId;
use reqwest::Url;
use serde::de::DeserializeOwned;
use streaming::protocol::{BoundaryResponse, NearbyParcelsResponse, ValidatedAddress};
use streaming::source::{BoxFuture, ParcelSource, SourceError};
use tracing::debug;

pub struct HttpParcelSource {
    base: Url,
    client: reqwest::Client,
}

impl HttpParcelSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| SourceError::with_source("invalid API base url", e))?;
        if base.cannot_be_a_base() {
            return Err(SourceError::new(format!("API url {base_url} cannot be a base")));
        }
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::with_source("HTTP request failed", e))?;

        if !resp.status().is_success() {
            return Err(SourceError::new(format!("HTTP error: {}", resp.status())));
        }

        resp.json::<T>()
            .await
            .map_err(|e| SourceError::with_source("Failed to decode response", e))
    }
}

impl ParcelSource for HttpParcelSource {
    fn get_boundary(
        &self,
        address_id: &AddressId,
    ) -> BoxFuture<'_, Result<BoundaryResponse, SourceError>> {
        let url = self.endpoint(&["addresses", address_id.as_str(), "boundary"]);
        Box::pin(async move { self.get_json(url, &[]).await })
    }

    fn get_nearby_parcels(
        &self,
        bbox: GeoBbox,
        limit: usize,
    ) -> BoxFuture<'_, Result<NearbyParcelsResponse, SourceError>> {
        let url = self.endpoint(&["parcels", "nearby"]);
        let query = [
            ("bbox", bbox.to_query_string()),
            ("limit", limit.to_string()),
        ];
        Box::pin(async move { self.get_json(url, &query).await })
    }

    fn validate_address(
        &self,
        query: &str,
    ) -> BoxFuture<'_, Result<ValidatedAddress, SourceError>> {
        let url = self.endpoint(&["addresses", "validate"]);
        let query = [("q", query.to_string())];
        Box::pin(async move { self.get_json(url, &query).await })
    }
}
