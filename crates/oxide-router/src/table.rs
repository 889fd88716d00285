//! The ordered route table.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{info, trace};

use crate::error::{Result, RouterError};
use crate::path::{normalize_path, PathPattern};
use crate::request::Method;
use crate::route::RouteRecord;

/// A route record together with its compiled pattern.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    /// The record as it was loaded.
    pub record: RouteRecord,
    /// The compiled path template.
    pub pattern: PathPattern,
}

impl CompiledRoute {
    /// Compiles a route record.
    ///
    /// # Errors
    ///
    /// Returns an error if the path template is malformed or the record
    /// lists an unknown method.
    pub fn compile(record: RouteRecord) -> Result<Self> {
        let unknown = record
            .methods
            .iter()
            .flatten()
            .find(|name| Method::parse(name).is_none());
        if let Some(method) = unknown {
            return Err(RouterError::UnknownMethod {
                path: record.path.clone(),
                method: method.clone(),
            });
        }

        let pattern = PathPattern::compile(&record.path)?;
        Ok(Self { record, pattern })
    }
}

/// A successful route lookup.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The matched route.
    pub route: Arc<CompiledRoute>,
    /// Parameter values in placeholder order.
    pub params: Vec<String>,
}

/// A snapshot of the loaded routes, in declaration order.
pub type Routes = Arc<Vec<Arc<CompiledRoute>>>;

/// The ordered list of routes consulted by the dispatcher.
///
/// Matching is first-match: routes are tried in declaration order and the
/// first one whose method set and pattern both accept the request wins.
/// Reloading swaps the whole table at once, so a lookup never sees a mix of
/// old and new routes.
///
/// # Example
///
/// ```
/// use oxide_router::{Method, RouteRecord, RouteTable};
///
/// let table = RouteTable::new();
/// table
///     .load(vec![
///         RouteRecord::new("/posts/{id}", "PostController", "show"),
///         RouteRecord::new("/posts/{slug}", "PostController", "by_slug"),
///     ])
///     .unwrap();
///
/// let matched = table.match_route(Method::Get, "/posts/42/").unwrap();
/// assert_eq!(matched.route.record.handler[1], "show");
/// assert_eq!(matched.params, vec!["42"]);
/// ```
#[derive(Debug)]
pub struct RouteTable {
    routes: ArcSwap<Vec<Arc<CompiledRoute>>>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    /// Creates an empty route table.
    pub fn new() -> Self {
        Self {
            routes: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Creates a route table from records.
    ///
    /// # Errors
    ///
    /// Returns an error if any path template is malformed or any record lists
    /// an unknown method.
    pub fn from_records(records: Vec<RouteRecord>) -> Result<Self> {
        let table = Self::new();
        table.load(records)?;
        Ok(table)
    }

    /// Replaces the loaded routes.
    ///
    /// Every record is compiled before the swap. If one fails, the previous
    /// routes stay in place.
    ///
    /// # Errors
    ///
    /// Returns an error if any path template is malformed or any record lists
    /// an unknown method.
    pub fn load(&self, records: Vec<RouteRecord>) -> Result<()> {
        let compiled = records
            .into_iter()
            .map(|record| CompiledRoute::compile(record).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        info!(routes = compiled.len(), "route table loaded");
        self.routes.store(Arc::new(compiled));
        Ok(())
    }

    /// Returns the currently loaded routes.
    pub fn snapshot(&self) -> Routes {
        self.routes.load_full()
    }

    /// Returns the loaded route records, in declaration order.
    pub fn routes(&self) -> Vec<RouteRecord> {
        self.snapshot()
            .iter()
            .map(|route| route.record.clone())
            .collect()
    }

    /// Returns the number of loaded routes.
    pub fn len(&self) -> usize {
        self.routes.load().len()
    }

    /// Returns whether no route is loaded.
    pub fn is_empty(&self) -> bool {
        self.routes.load().is_empty()
    }

    /// Finds the first route accepting `method` and `uri`.
    ///
    /// The query string and trailing slashes of `uri` are ignored. A route
    /// restricted to other methods is skipped, not treated as a failure.
    pub fn match_route(&self, method: Method, uri: &str) -> Option<MatchResult> {
        let path = normalize_path(uri);

        self.snapshot().iter().find_map(|route| {
            if !route.record.accepts(method) {
                trace!(route = %route.record.path, %method, "method not accepted");
                return None;
            }

            route.pattern.match_path(path).map(|params| MatchResult {
                route: Arc::clone(route),
                params,
            })
        })
    }

    /// Generates a URL for a named route.
    pub fn url_for(&self, name: &str, params: &HashMap<String, String>) -> Option<String> {
        self.snapshot()
            .iter()
            .find(|route| route.record.name.as_deref() == Some(name))
            .and_then(|route| route.pattern.reverse(params))
    }
}
