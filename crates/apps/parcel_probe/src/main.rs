use std::env;
use std::sync::Arc;
use std::time::Instant;

use assembly::config::AssemblyConfig;
use assembly::host::{AddressHost, MapHost};
use assembly::session::ParcelAssembly;
use clap::{Parser, Subcommand};
use foundation::bounds::GeoBbox;
use foundation::ids::AddressId;
use foundation::time::Millis;
use layers::collection::RenderCollection;
use scene::hit::ParcelLayer;
use scene::hover::{Cursor, HoverSink, HoverTarget};
use serde_json::{Value, json};
use streaming::cache::Viewport;
use streaming::memory::MemorySource;
use streaming::protocol::{Address, NewAddress};
use streaming::source::{BoxFuture, ParcelSource, SourceError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod http_source;

use http_source::HttpParcelSource;

#[derive(Parser, Debug)]
#[command(author, version, about = "Probe the parcel assembly engine against a backend")]
struct Args {
    /// Parcel API base URL (default: $PARCEL_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Serve requests from a JSON fixture instead of the network
    #[arg(long)]
    fixture: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build main and surrounding parcels for a set of addresses
    Assemble {
        /// Address id; repeat for several addresses
        #[arg(long = "address", required = true)]
        addresses: Vec<String>,
    },

    /// Settle one viewport and print the parcels it accumulates
    Nearby {
        /// Bounding box: minLon,minLat,maxLon,maxLat
        #[arg(long)]
        bbox: String,

        #[arg(long, default_value_t = 16.0)]
        zoom: f64,
    },

    /// Geocode/validate a free-form address or "lon,lat"
    Validate { query: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = config_from_env();
    let source: Arc<dyn ParcelSource> = match &args.fixture {
        Some(path) => {
            let payload = tokio::fs::read_to_string(path).await?;
            info!(%path, "serving parcels from fixture");
            Arc::new(MemorySource::from_json_str(&payload)?)
        }
        None => {
            let api_url = args.api_url.clone().unwrap_or_else(|| {
                env::var("PARCEL_API_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string())
            });
            Arc::new(HttpParcelSource::new(&api_url)?)
        }
    };

    match args.command {
        Command::Assemble { addresses } => assemble(config, source, addresses).await?,
        Command::Nearby { bbox, zoom } => nearby(config, source, &bbox, zoom).await?,
        Command::Validate { query } => {
            let v = source.validate_address(&query).await?;
            println!("{}", serde_json::to_string_pretty(&v)?);
        }
    }

    Ok(())
}

async fn assemble(
    config: AssemblyConfig,
    source: Arc<dyn ParcelSource>,
    ids: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addresses = ids
        .into_iter()
        .map(|id| Address::new(AddressId::new(id), String::new()))
        .collect();

    let mut map = ProbeMap::new(Viewport::new(GeoBbox::new(0.0, 0.0, 0.0, 0.0), 0.0));
    let mut session = ParcelAssembly::new(config, source, Arc::new(ReadOnlyAddresses));
    session.set_addresses(addresses, &mut map).await?;

    info!(
        main = session.main().len(),
        surrounding = session.surrounding().len(),
        "assembled"
    );
    print_collections(&map)
}

async fn nearby(
    config: AssemblyConfig,
    source: Arc<dyn ParcelSource>,
    bbox: &str,
    zoom: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let bbox = parse_bbox(bbox)?;
    let mut map = ProbeMap::new(Viewport::new(bbox, zoom));
    let mut session = ParcelAssembly::new(config, source, Arc::new(ReadOnlyAddresses));

    let start = Instant::now();
    let elapsed = || Millis(start.elapsed().as_millis() as u64);
    session.viewport_changed(elapsed());
    while let Some(deadline) = session.viewport_deadline() {
        let wait = deadline.saturating_since(elapsed());
        tokio::time::sleep(std::time::Duration::from_millis(wait)).await;
        if let Some(summary) = session.poll_viewport(elapsed(), &mut map).await {
            info!(
                inserted = summary.inserted,
                dropped = summary.dropped,
                "viewport settled"
            );
        }
    }
    if session.viewport_cache().last_fetched_bbox().is_none() {
        warn!(zoom, min_zoom = session.config().min_zoom, "no parcels fetched");
    }

    print_collections(&map)
}

fn print_collections(map: &ProbeMap) -> Result<(), Box<dyn std::error::Error>> {
    let out = json!({
        "main": map.main,
        "surrounding": map.surrounding,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Records what the engine would render.
struct ProbeMap {
    view: Viewport,
    main: Value,
    surrounding: Value,
}

impl ProbeMap {
    fn new(view: Viewport) -> Self {
        let empty = RenderCollection::empty(ParcelLayer::Main).to_geojson_value();
        Self {
            view,
            main: empty.clone(),
            surrounding: empty,
        }
    }
}

impl HoverSink for ProbeMap {
    fn set_hovered(&mut self, _target: HoverTarget, _hovered: bool) {}

    fn set_cursor(&mut self, _cursor: Cursor) {}
}

impl MapHost for ProbeMap {
    fn viewport(&self) -> Viewport {
        self.view
    }

    fn set_parcels(&mut self, collection: &RenderCollection) {
        let value = collection.to_geojson_value();
        match collection.layer() {
            ParcelLayer::Main => self.main = value,
            ParcelLayer::Surrounding => self.surrounding = value,
        }
    }
}

/// The probe never edits a project.
struct ReadOnlyAddresses;

impl AddressHost for ReadOnlyAddresses {
    fn request_add_address(
        &self,
        _address: NewAddress,
    ) -> BoxFuture<'_, Result<Address, SourceError>> {
        Box::pin(async { Err(SourceError::new("parcel_probe is read-only")) })
    }

    fn request_remove_address(
        &self,
        _address_id: &AddressId,
    ) -> BoxFuture<'_, Result<(), SourceError>> {
        Box::pin(async { Err(SourceError::new("parcel_probe is read-only")) })
    }
}

fn config_from_env() -> AssemblyConfig {
    let defaults = AssemblyConfig::default();
    AssemblyConfig {
        min_zoom: env_var_f64("PARCEL_MIN_ZOOM", defaults.min_zoom),
        nearby_limit: env_var_usize("PARCEL_NEARBY_LIMIT", defaults.nearby_limit),
        debounce_ms: env_var_u64("PARCEL_DEBOUNCE_MS", defaults.debounce_ms),
        boundary_fetch_concurrency: env_var_usize(
            "PARCEL_FETCH_CONCURRENCY",
            defaults.boundary_fetch_concurrency,
        ),
        ..defaults
    }
}

fn env_var_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bbox(bbox: &str) -> Result<GeoBbox, Box<dyn std::error::Error>> {
    let parts: Vec<_> = bbox.split(',').collect();
    if parts.len() != 4 {
        return Err("bbox must be minLon,minLat,maxLon,maxLat".into());
    }
    let min_lon: f64 = parts[0].trim().parse()?;
    let min_lat: f64 = parts[1].trim().parse()?;
    let max_lon: f64 = parts[2].trim().parse()?;
    let max_lat: f64 = parts[3].trim().parse()?;
    let bbox = GeoBbox::new(min_lon, min_lat, max_lon, max_lat);
    if !bbox.is_valid() {
        return Err(format!("bbox {bbox} is empty or inverted").into());
    }
    Ok(bbox)
}
