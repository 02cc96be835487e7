//! CLI entry point for the geocode_mapper tool.
//!
//! Provides subcommands for looking up a single address, geocoding an
//! address table one request at a time, and batch geocoding the whole table
//! through the Census geocoder, emitting a GeoJSON/JavaScript file pair for
//! a static map page.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use geocode_mapper::{
    features::{FeatureCollection, build_features},
    infra::census::{CensusBatchClient, parse_batch_response},
    infra::google::GoogleClient,
    infra::photon::PhotonClient,
    output::{write_geojson, write_js},
    records::{AddressRecord, GeocodeResult, filter_matched, load_records},
    services::geocoder::{Geocoder, resolve_records},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "geocode_mapper")]
#[command(about = "Geocode address tables and emit GeoJSON for a static map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which single-address geocoding service to call.
#[derive(Copy, Clone, ValueEnum)]
enum Service {
    /// Free Photon endpoint, no credential needed
    Photon,
    /// Google Geocoding API, requires GOOGLE_MAPS_API_KEY
    Google,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode one address and log its coordinates
    Lookup {
        /// Free-text address, e.g. "1600 Amphitheatre Pkwy, Mountain View, CA"
        #[arg(value_name = "ADDRESS")]
        address: String,

        #[arg(short, long, value_enum, default_value = "photon")]
        service: Service,
    },
    /// Geocode an address table one request per row
    Geocode {
        /// Headerless CSV with columns id,street,city,state,zip
        #[arg(value_name = "INPUT")]
        input: String,

        /// GeoJSON output path
        #[arg(long, default_value = "coords.geojson")]
        geojson: String,

        /// JavaScript wrapper output path
        #[arg(long, default_value = "coords.js")]
        js: String,

        /// Variable name used in the script wrapper
        #[arg(long, default_value = "places")]
        var_name: String,

        #[arg(short, long, value_enum, default_value = "photon")]
        service: Service,
    },
    /// Submit the whole table to the Census batch geocoder in one upload
    BatchGeocode {
        /// Headerless CSV with columns id,street,city,state,zip
        #[arg(value_name = "INPUT")]
        input: String,

        /// GeoJSON output path
        #[arg(long, default_value = "coords.geojson")]
        geojson: String,

        /// JavaScript wrapper output path
        #[arg(long, default_value = "coords.js")]
        js: String,

        /// Variable name used in the script wrapper
        #[arg(long, default_value = "places")]
        var_name: String,

        /// Optional: save the raw batch response text before post-processing
        #[arg(long)]
        raw_output: Option<String>,

        /// Census benchmark dataset
        #[arg(long, default_value = "Public_AR_Current")]
        benchmark: String,

        /// Census vintage dataset
        #[arg(long, default_value = "Current_Current")]
        vintage: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/geocode_mapper.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("geocode_mapper.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup { address, service } => {
            let geocoder = make_geocoder(service)?;
            let point = geocoder.resolve(&address).await?;

            info!(
                address = %address,
                longitude = %point.longitude,
                latitude = %point.latitude,
                matched_address = point.matched_address.as_deref().unwrap_or("-"),
                "Address resolved"
            );
        }
        Commands::Geocode {
            input,
            geojson,
            js,
            var_name,
            service,
        } => {
            let records = load_records(&input)?;
            info!(%input, records = records.len(), "Address table loaded");

            let geocoder = make_geocoder(service)?;
            let results = resolve_records(geocoder.as_ref(), &records).await;

            write_outputs(&records, results, &geojson, &js, &var_name)?;
        }
        Commands::BatchGeocode {
            input,
            geojson,
            js,
            var_name,
            raw_output,
            benchmark,
            vintage,
        } => {
            let records = load_records(&input)?;
            info!(%input, records = records.len(), %benchmark, %vintage, "Address table loaded");

            let client = CensusBatchClient::new(&benchmark, &vintage)?;
            let raw = client.submit(&records).await?;

            if let Some(path) = raw_output {
                std::fs::write(&path, &raw)
                    .with_context(|| format!("saving raw batch response to '{path}'"))?;
                info!(%path, "Raw batch response saved");
            }

            let results = parse_batch_response(&raw)?;
            write_outputs(&records, results, &geojson, &js, &var_name)?;
        }
    }

    Ok(())
}

/// Builds the requested single-address geocoding client.
fn make_geocoder(service: Service) -> Result<Box<dyn Geocoder>> {
    match service {
        Service::Photon => Ok(Box::new(PhotonClient::new())),
        Service::Google => {
            let key = std::env::var("GOOGLE_MAPS_API_KEY")
                .context("GOOGLE_MAPS_API_KEY must be set for the google service")?;
            Ok(Box::new(GoogleClient::new(key)))
        }
    }
}

/// Filters to matched results, joins them back onto the source records, and
/// writes the GeoJSON document plus its script wrapper.
fn write_outputs(
    records: &[AddressRecord],
    results: Vec<GeocodeResult>,
    geojson: &str,
    js: &str,
    var_name: &str,
) -> Result<()> {
    let total = results.len();
    let matched = filter_matched(results);
    info!(matched = matched.len(), total, "Match filter applied");

    let features = build_features(&matched, records)?;
    let collection = FeatureCollection { features };

    write_geojson(geojson, &collection)?;
    write_js(js, var_name, &collection)?;
    Ok(())
}
