//! Writers for the feature collection: a GeoJSON document plus a JavaScript
//! wrapper the map page can include directly with a `<script>` tag.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::GeocodeError;
use crate::features::FeatureCollection;

/// Writes the collection as pretty-printed GeoJSON (two-space indent).
///
/// I/O failures surface unmodified; callers wanting atomicity can write to
/// a temporary path and rename.
pub fn write_geojson(path: impl AsRef<Path>, collection: &FeatureCollection) -> Result<(), GeocodeError> {
    let document = serde_json::to_string_pretty(collection)?;
    fs::write(&path, document)?;
    info!(
        path = %path.as_ref().display(),
        features = collection.features.len(),
        "GeoJSON written"
    );
    Ok(())
}

/// Writes the identical document prefixed with `var <name> = `, making the
/// file an executable assignment rather than pure data. No terminator or
/// other trailing transformation is applied.
pub fn write_js(
    path: impl AsRef<Path>,
    var_name: &str,
    collection: &FeatureCollection,
) -> Result<(), GeocodeError> {
    let document = serde_json::to_string_pretty(collection)?;
    fs::write(&path, format!("var {var_name} = {document}"))?;
    info!(path = %path.as_ref().display(), var_name, "Script file written");
    Ok(())
}
