//! A parcel assembly session bound to one map view.
//!
//! Owns every piece of derived state: main and surrounding collections, the
//! viewport cache, the debouncer, hover, and the notice outbox. Dropping the
//! session is the view teardown; a new one starts with an empty cache.

use std::collections::BTreeSet;
use std::sync::Arc;

use formats::boundary::normalize_boundary_value;
use foundation::ids::AddressId;
use foundation::time::Millis;
use layers::collection::RenderCollection;
use layers::main_parcels::{MainBuildError, build_main, main_fingerprints};
use layers::merge::merge_surrounding;
use layers::surrounding::{build_surrounding, demote_main};
use runtime::debounce::Debouncer;
use runtime::event_bus::{Notice, NoticeBus};
use scene::fingerprint::Fingerprint;
use scene::hit::{MapHit, ParcelLayer};
use scene::hover::HoverController;
use scene::parcel::{ParcelFeature, ParcelRole};
use streaming::cache::{MergeSummary, ViewportCache, ViewportPlan};
use streaming::protocol::{Address, NearbyParcelsResponse, NewAddress};
use streaming::request::ViewportRequest;
use streaming::source::{ParcelSource, SourceError};
use tracing::{debug, info, warn};

use crate::address::AddressList;
use crate::click::{ClickAction, ClickError, classify_click};
use crate::config::AssemblyConfig;
use crate::host::{AddressHost, MapHost};

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Ignored,
    Removed(AddressId),
    Added(Address),
}

pub struct ParcelAssembly {
    config: AssemblyConfig,
    source: Arc<dyn ParcelSource>,
    parent: Arc<dyn AddressHost>,
    addresses: AddressList,
    main_features: Vec<ParcelFeature>,
    main_fps: BTreeSet<Fingerprint>,
    main: RenderCollection,
    /// Boundary-lookup neighbours plus parcels released from main. Never
    /// pruned by main fingerprints; the merge hides those.
    surrounding_pool: Vec<ParcelFeature>,
    surrounding: RenderCollection,
    viewport: ViewportCache,
    debouncer: Debouncer,
    hover: HoverController,
    notices: NoticeBus,
    main_loading: bool,
    viewport_loading: bool,
}

impl ParcelAssembly {
    pub fn new(
        config: AssemblyConfig,
        source: Arc<dyn ParcelSource>,
        parent: Arc<dyn AddressHost>,
    ) -> Self {
        Self {
            viewport: ViewportCache::new(config.viewport_cache()),
            debouncer: Debouncer::new(config.debounce_ms),
            config,
            source,
            parent,
            addresses: AddressList::default(),
            main_features: Vec::new(),
            main_fps: BTreeSet::new(),
            main: RenderCollection::empty(ParcelLayer::Main),
            surrounding_pool: Vec::new(),
            surrounding: RenderCollection::empty(ParcelLayer::Surrounding),
            hover: HoverController::new(),
            notices: NoticeBus::new(),
            main_loading: false,
            viewport_loading: false,
        }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn addresses(&self) -> &[Address] {
        self.addresses.as_slice()
    }

    pub fn main(&self) -> &RenderCollection {
        &self.main
    }

    pub fn surrounding(&self) -> &RenderCollection {
        &self.surrounding
    }

    pub fn viewport_cache(&self) -> &ViewportCache {
        &self.viewport
    }

    pub fn hover(&self) -> &HoverController {
        &self.hover
    }

    pub fn main_loading(&self) -> bool {
        self.main_loading
    }

    pub fn viewport_loading(&self) -> bool {
        self.viewport_loading
    }

    pub fn notices(&self) -> &[Notice] {
        self.notices.notices()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Adopt a new address list from the parent and rebuild main parcels.
    pub async fn set_addresses(
        &mut self,
        addresses: Vec<Address>,
        host: &mut dyn MapHost,
    ) -> Result<(), MainBuildError> {
        self.addresses.replace(addresses);
        self.rebuild(host).await
    }

    /// Rebuild main parcels from the current address list.
    ///
    /// On a failed lookup the previous collections stay as they were.
    pub async fn rebuild(&mut self, host: &mut dyn MapHost) -> Result<(), MainBuildError> {
        self.set_main_loading(host, true);
        let result = build_main(
            self.addresses.as_slice(),
            self.source.as_ref(),
            self.config.boundary_fetch_concurrency,
        )
        .await;
        self.set_main_loading(host, false);

        let build = match result {
            Ok(build) => build,
            Err(e) => {
                warn!("keeping previous parcels: {e}");
                return Err(e);
            }
        };
        let previous = std::mem::replace(&mut self.main_features, build.main);
        if let Some(candidates) = build.surrounding_candidates {
            let mut pool = build_surrounding(&candidates);
            let fresh: BTreeSet<Fingerprint> =
                pool.iter().filter_map(ParcelFeature::fingerprint).collect();
            pool.extend(
                std::mem::take(&mut self.surrounding_pool)
                    .into_iter()
                    .filter(|f| f.fingerprint().is_some_and(|fp| !fresh.contains(&fp))),
            );
            self.surrounding_pool = pool;
        }

        let current = main_fingerprints(&self.main_features);
        let released = previous
            .into_iter()
            .filter(|f| f.fingerprint().is_some_and(|fp| !current.contains(&fp)))
            .collect();
        self.release_main(released, None);
        self.publish(host);
        Ok(())
    }

    /// Record a viewport change; returns the debounce generation.
    pub fn viewport_changed(&mut self, now: Millis) -> u64 {
        self.debouncer.trigger(now)
    }

    /// When the pending viewport change settles, if one is pending.
    pub fn viewport_deadline(&self) -> Option<Millis> {
        self.debouncer.deadline()
    }

    /// Settle the viewport if the debounce period has elapsed at `now`.
    pub async fn poll_viewport(
        &mut self,
        now: Millis,
        host: &mut dyn MapHost,
    ) -> Option<MergeSummary> {
        if !self.debouncer.poll(now) {
            return None;
        }
        self.settle_viewport(host).await
    }

    pub fn plan_viewport(&mut self, host: &dyn MapHost) -> ViewportPlan {
        self.viewport.plan(&host.viewport())
    }

    /// Plan, fetch and merge for the host's current viewport.
    pub async fn settle_viewport(&mut self, host: &mut dyn MapHost) -> Option<MergeSummary> {
        let req = match self.plan_viewport(host) {
            ViewportPlan::Fetch(req) => req,
            ViewportPlan::BelowMinZoom | ViewportPlan::CacheHit => return None,
        };

        self.set_viewport_loading(host, true);
        let result = self.source.get_nearby_parcels(req.bbox, req.limit).await;
        self.set_viewport_loading(host, false);
        self.apply_viewport(&req, result, host)
    }

    /// Merge the outcome of a nearby-parcels fetch planned earlier.
    ///
    /// Fetches may be applied in any order.
    pub fn apply_viewport(
        &mut self,
        req: &ViewportRequest,
        result: Result<NearbyParcelsResponse, SourceError>,
        host: &mut dyn MapHost,
    ) -> Option<MergeSummary> {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(request = req.id.0, bbox = %req.bbox, "nearby parcels fetch failed: {e}");
                return None;
            }
        };
        let summary = self
            .viewport
            .apply(req, &response.features, &self.main_fps);
        if summary.inserted > 0 {
            self.refresh_surrounding(host);
        }
        Some(summary)
    }

    pub fn pointer_move(&mut self, hit: Option<&MapHit>, host: &mut dyn MapHost) {
        self.hover.pointer_move(hit, host);
    }

    pub fn pointer_leave(&mut self, host: &mut dyn MapHost) {
        self.hover.pointer_leave(host);
    }

    /// Handle a click: remove a main parcel's address, or add a neighbour's.
    ///
    /// Rejections are also raised as alerts on the notice bus.
    pub async fn click(
        &mut self,
        hit: Option<&MapHit>,
        host: &mut dyn MapHost,
    ) -> Result<ClickOutcome, ClickError> {
        let action = match classify_click(hit, &self.addresses, self.source.as_ref()).await {
            Ok(action) => action,
            Err(e) => {
                self.alert(&e);
                return Err(e);
            }
        };

        match action {
            ClickAction::Ignore => Ok(ClickOutcome::Ignored),
            ClickAction::Remove(address_id) => {
                self.remove_address(&address_id, host).await?;
                Ok(ClickOutcome::Removed(address_id))
            }
            ClickAction::Add(address) => {
                let pending = self.begin_add(&address, host);
                let result = self.parent.request_add_address(address).await;
                self.finish_add(&pending, result, host).map(ClickOutcome::Added)
            }
        }
    }

    pub async fn remove_address(
        &mut self,
        address_id: &AddressId,
        host: &mut dyn MapHost,
    ) -> Result<(), ClickError> {
        if let Err(e) = self.parent.request_remove_address(address_id).await {
            let e = ClickError::Host(e);
            self.alert(&e);
            return Err(e);
        }
        let address = self.addresses.get(address_id).cloned();
        self.addresses.remove(address_id);
        let (released, kept) = std::mem::take(&mut self.main_features)
            .into_iter()
            .partition(|f| f.role.address_id() == Some(address_id));
        self.main_features = kept;
        self.release_main(released, address.as_ref());
        info!(address = %address_id, "address removed");
        self.publish(host);
        Ok(())
    }

    /// Insert `address` optimistically and show its parcel as main.
    ///
    /// Returns the pending id to hand to [`ParcelAssembly::finish_add`].
    pub fn begin_add(&mut self, address: &NewAddress, host: &mut dyn MapHost) -> AddressId {
        let pending = self.addresses.insert_pending(address);
        if let Some(boundary) = normalize_boundary_value(&address.boundary) {
            self.main_features.push(ParcelFeature::main(
                pending.clone(),
                boundary.geometry,
                boundary.properties,
            ));
        }
        debug!(address = %pending, "optimistic add");
        self.publish(host);
        pending
    }

    /// Resolve an optimistic add: swap in the confirmed record, or roll back.
    pub fn finish_add(
        &mut self,
        pending: &AddressId,
        result: Result<Address, SourceError>,
        host: &mut dyn MapHost,
    ) -> Result<Address, ClickError> {
        match result {
            Ok(confirmed) => {
                self.addresses.confirm(pending, confirmed.clone());
                for feature in &mut self.main_features {
                    if feature.role.address_id() == Some(pending) {
                        feature.role = ParcelRole::Main {
                            address_id: confirmed.id.clone(),
                        };
                    }
                }
                info!(pending = %pending, address = %confirmed.id, "address added");
                self.publish(host);
                Ok(confirmed)
            }
            Err(e) => {
                self.addresses.remove(pending);
                self.main_features
                    .retain(|f| f.role.address_id() != Some(pending));
                self.publish(host);
                let e = ClickError::Host(e);
                self.alert(&e);
                Err(e)
            }
        }
    }

    /// Offer parcels that stopped being main as neighbours again, unless a
    /// neighbour or viewport record for them already exists.
    fn release_main(&mut self, released: Vec<ParcelFeature>, address: Option<&Address>) {
        for feature in released {
            let Some(fp) = feature.fingerprint() else {
                continue;
            };
            let known = self.viewport.contains(&fp)
                || self
                    .surrounding_pool
                    .iter()
                    .any(|f| f.fingerprint() == Some(fp));
            if !known {
                debug!(?fp, "former main parcel offered as neighbour");
                self.surrounding_pool.push(demote_main(feature, address));
            }
        }
    }

    /// Push fresh main and surrounding collections to the host. Render ids of
    /// both layers change, so any hover on them is dropped first.
    fn publish(&mut self, host: &mut dyn MapHost) {
        self.main_fps = main_fingerprints(&self.main_features);
        self.main =
            RenderCollection::from_features(ParcelLayer::Main, self.main_features.iter().cloned());
        self.hover.invalidate_layer(ParcelLayer::Main, host);
        host.set_parcels(&self.main);
        self.refresh_surrounding(host);
    }

    fn refresh_surrounding(&mut self, host: &mut dyn MapHost) {
        self.surrounding = merge_surrounding(
            &self.main_fps,
            &self.surrounding_pool,
            self.viewport.iter().map(|(_, f)| f),
        );
        self.hover.invalidate_layer(ParcelLayer::Surrounding, host);
        host.set_parcels(&self.surrounding);
    }

    fn set_main_loading(&mut self, host: &mut dyn MapHost, loading: bool) {
        self.main_loading = loading;
        host.set_loading(ParcelLayer::Main, loading);
    }

    fn set_viewport_loading(&mut self, host: &mut dyn MapHost, loading: bool) {
        self.viewport_loading = loading;
        host.set_loading(ParcelLayer::Surrounding, loading);
    }

    fn alert(&mut self, e: &ClickError) {
        let kind = match e {
            ClickError::IncompleteParcelData => "incomplete_parcel",
            ClickError::DuplicateAddress { .. } => "duplicate_address",
            ClickError::Host(_) => "address_update_failed",
        };
        self.notices.alert(kind, e.to_string());
    }
}
