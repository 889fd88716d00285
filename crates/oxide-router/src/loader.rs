//! Loading route records from YAML or JSON files.
//!
//! A route file has a top-level `routes` key holding either a list of
//! records or a map of named records:
//!
//! ```yaml
//! routes:
//!   index:
//!     path: /
//!     handler: [HomeController, index]
//!   post_detail:
//!     path: /posts/{id}
//!     handler: [PostController, show]
//!     methods: [GET]
//! ```
//!
//! Files ending in `.json` are parsed as JSON, anything else as YAML.

use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::route::RouteRecord;

/// Reads the route records from a file, in declaration order.
///
/// For the map form, each key becomes the record's name unless the record
/// names itself.
///
/// # Errors
///
/// Returns [`RouterError::InvalidRouteFile`] if the document has no `routes`
/// list or map, and an IO or parse error if the file cannot be read.
pub fn load_routes(path: impl AsRef<Path>) -> Result<Vec<RouteRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let document: Value = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    let records = routes_from_document(path, document)?;
    debug!(file = %path.display(), routes = records.len(), "route file parsed");
    Ok(records)
}

fn routes_from_document(path: &Path, document: Value) -> Result<Vec<RouteRecord>> {
    let invalid = || RouterError::InvalidRouteFile(path.to_path_buf());

    let Value::Mapping(mut root) = document else {
        return Err(invalid());
    };

    match root.remove("routes") {
        Some(Value::Sequence(items)) => items
            .into_iter()
            .map(|item| serde_yaml::from_value(item).map_err(RouterError::from))
            .collect(),
        Some(Value::Mapping(named)) => named
            .into_iter()
            .map(|(key, item)| -> Result<RouteRecord> {
                let mut record: RouteRecord = serde_yaml::from_value(item)?;
                if record.name.is_none() {
                    record.name = key.as_str().map(str::to_string);
                }
                Ok(record)
            })
            .collect(),
        _ => Err(invalid()),
    }
}
