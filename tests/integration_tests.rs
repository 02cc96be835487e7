use std::env;
use std::fs;

use geocode_mapper::error::GeocodeError;
use geocode_mapper::features::{FeatureCollection, Geometry, build_features};
use geocode_mapper::infra::census::parse_batch_response;
use geocode_mapper::output::{write_geojson, write_js};
use geocode_mapper::records::{AddressRecord, filter_matched, load_records};
use geocode_mapper::services::geocoder::{GeocodePoint, Geocoder, resolve_records};

fn temp_path(name: &str) -> String {
    format!("{}/{}", env::temp_dir().display(), name)
}

fn record(id: &str, street: &str, city: Option<&str>) -> AddressRecord {
    AddressRecord {
        id: id.to_string(),
        street: street.to_string(),
        city: city.map(str::to_string),
        state: Some("CA".to_string()),
        zip: Some("94605".to_string()),
    }
}

/// Deterministic stand-in for a remote geocoding service.
struct StubGeocoder;

#[async_trait::async_trait]
impl Geocoder for StubGeocoder {
    async fn resolve(&self, address: &str) -> Result<GeocodePoint, GeocodeError> {
        Ok(GeocodePoint {
            longitude: "-122.27".to_string(),
            latitude: "37.80".to_string(),
            matched_address: Some(address.to_uppercase()),
        })
    }
}

#[tokio::test]
async fn test_single_mode_pipeline_end_to_end() {
    let input_path = temp_path("geocode_mapper_it_input.csv");
    let geojson_path = temp_path("geocode_mapper_it_single.geojson");
    let js_path = temp_path("geocode_mapper_it_single.js");
    fs::write(
        &input_path,
        "house 1,409 Main St,Oakland,CA,94605\nhouse 2,310 Main St,,CA,94605\n",
    )
    .unwrap();

    let records = load_records(&input_path).unwrap();
    assert_eq!(records.len(), 2);

    let results = resolve_records(&StubGeocoder, &records).await;
    let matched = filter_matched(results);
    assert_eq!(matched.len(), 2);

    let features = build_features(&matched, &records).unwrap();
    let collection = FeatureCollection { features };

    write_geojson(&geojson_path, &collection).unwrap();
    write_js(&js_path, "houses", &collection).unwrap();

    // Round trip: same feature count, exact coordinate values
    let reread: FeatureCollection =
        serde_json::from_str(&fs::read_to_string(&geojson_path).unwrap()).unwrap();
    assert_eq!(reread.features.len(), 2);
    let Geometry::Point { coordinates } = reread.features[0].geometry;
    assert_eq!(coordinates, [-122.27, 37.80]);

    // Script wrapper minus its prefix is the identical document
    let script = fs::read_to_string(&js_path).unwrap();
    let stripped = script.strip_prefix("var houses = ").unwrap();
    assert_eq!(stripped, fs::read_to_string(&geojson_path).unwrap());

    for path in [&input_path, &geojson_path, &js_path] {
        fs::remove_file(path).unwrap();
    }
}

#[test]
fn test_batch_response_chain_keeps_only_matches() {
    let raw = include_str!("fixtures/census_response.csv");

    let results = parse_batch_response(raw).unwrap();
    assert_eq!(results.len(), 4);

    let matched = filter_matched(results);
    assert_eq!(matched.len(), 2);

    let records = vec![
        record("12th St Oakland City Center", "1245 Broadway", Some("Oakland")),
        record("16th St Mission", "2000 Mission St", Some("San Francisco")),
        record("Ashby", "3100 Adeline St", None),
        record("Balboa Park", "401 Geneva Ave", Some("San Francisco")),
    ];

    let features = build_features(&matched, &records).unwrap();
    assert_eq!(features.len(), 2);

    let Geometry::Point { coordinates } = features[0].geometry;
    assert_eq!(coordinates, [-122.271604, 37.803664]);
    assert_eq!(features[0].properties.name, "12th St Oakland City Center");
    assert_eq!(
        features[0].properties.address.as_deref(),
        Some("1245 BROADWAY, OAKLAND, CA, 94612")
    );

    // No feature derives from the No_Match or Tie rows
    assert!(features.iter().all(|f| f.properties.name != "Ashby"));
    assert!(features.iter().all(|f| f.properties.name != "Balboa Park"));
}
