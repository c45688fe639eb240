//! Main parcels: one polygon per address in the assembly.
//!
//! Two paths:
//! - fast: every address already carries a boundary, nothing is fetched and no
//!   surrounding candidates are produced;
//! - slow: confirmed addresses are looked up through [`ParcelSource`], which
//!   also returns the neighbours used as surrounding candidates.

use std::collections::BTreeSet;

use formats::boundary::{BoundaryFeature, normalize_boundary_value};
use foundation::ids::AddressId;
use futures_util::{StreamExt, TryStreamExt, stream};
use scene::fingerprint::Fingerprint;
use scene::parcel::ParcelFeature;
use streaming::protocol::{Address, BoundaryResponse, RawParcel};
use streaming::source::{ParcelSource, SourceError};
use tracing::{debug, warn};

#[derive(Debug)]
pub enum MainBuildError {
    Fetch {
        address_id: AddressId,
        source: SourceError,
    },
}

impl std::fmt::Display for MainBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainBuildError::Fetch { address_id, source } => {
                write!(f, "boundary fetch for address {address_id} failed: {source}")
            }
        }
    }
}

impl std::error::Error for MainBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MainBuildError::Fetch { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MainBuild {
    pub main: Vec<ParcelFeature>,
    /// `None` when the fast path ran and the previous pool should be kept.
    pub surrounding_candidates: Option<Vec<RawParcel>>,
}

pub fn all_cached(addresses: &[Address]) -> bool {
    addresses.iter().all(Address::has_cached_boundary)
}

/// Fast path. `None` if any address lacks a cached boundary.
///
/// A cached boundary that cannot be read drops that address from the output.
pub fn build_main_cached(addresses: &[Address]) -> Option<Vec<ParcelFeature>> {
    if !all_cached(addresses) {
        return None;
    }
    Some(
        addresses
            .iter()
            .filter_map(|a| main_feature(a, a.cached_boundary()))
            .collect(),
    )
}

/// Build main parcels, fetching boundaries when the fast path does not apply.
///
/// At most `concurrency` lookups are in flight (`1` fetches one address at a
/// time). Results are consumed in address order whatever order they arrive
/// in. The first failing lookup for an address without a usable cached
/// boundary aborts the whole build.
pub async fn build_main(
    addresses: &[Address],
    source: &dyn ParcelSource,
    concurrency: usize,
) -> Result<MainBuild, MainBuildError> {
    if let Some(main) = build_main_cached(addresses) {
        debug!(count = main.len(), "main parcels from cached boundaries");
        return Ok(MainBuild {
            main,
            surrounding_candidates: None,
        });
    }

    let responses: Vec<Option<BoundaryResponse>> = stream::iter(addresses)
        .map(|address| lookup(address, source))
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let mut main = Vec::with_capacity(addresses.len());
    let mut candidates = Vec::new();
    for (address, response) in addresses.iter().zip(responses) {
        let Some(response) = response else {
            main.extend(main_feature(address, address.cached_boundary()));
            continue;
        };

        let boundary =
            normalize_boundary_value(&response.boundary).or_else(|| address.cached_boundary());
        main.extend(main_feature(address, boundary));
        candidates.extend(
            response
                .surrounding_parcels
                .into_iter()
                .filter(|p| !p.is_main_parcel()),
        );
    }

    debug!(
        main = main.len(),
        candidates = candidates.len(),
        "main parcels from boundary lookups"
    );
    Ok(MainBuild {
        main,
        surrounding_candidates: Some(candidates),
    })
}

/// `None` for pending addresses, which are never sent to the backend, and
/// for failed lookups of addresses whose cached boundary is usable.
async fn lookup(
    address: &Address,
    source: &dyn ParcelSource,
) -> Result<Option<BoundaryResponse>, MainBuildError> {
    if address.is_pending() {
        return Ok(None);
    }
    match source.get_boundary(&address.id).await {
        Ok(response) => Ok(Some(response)),
        Err(e) if address.cached_boundary().is_some() => {
            warn!(address = %address.id, "boundary lookup failed, using cached boundary: {e}");
            Ok(None)
        }
        Err(e) => {
            warn!(address = %address.id, "boundary lookup failed: {e}");
            Err(MainBuildError::Fetch {
                address_id: address.id.clone(),
                source: e,
            })
        }
    }
}

fn main_feature(address: &Address, boundary: Option<BoundaryFeature>) -> Option<ParcelFeature> {
    let Some(boundary) = boundary else {
        debug!(address = %address.id, "address has no usable boundary");
        return None;
    };
    Some(ParcelFeature::main(
        address.id.clone(),
        boundary.geometry,
        boundary.properties,
    ))
}

pub fn main_fingerprints(main: &[ParcelFeature]) -> BTreeSet<Fingerprint> {
    main.iter().filter_map(ParcelFeature::fingerprint).collect()
}
