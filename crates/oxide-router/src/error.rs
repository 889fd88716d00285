//! Error types for routing and dispatch.

use std::path::PathBuf;

use thiserror::Error;

/// A boxed error raised by an external collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Router configuration errors.
///
/// Not-found and access-denied conditions are never errors: they become
/// ordinary responses. Everything here points at a bad route table or a bad
/// controller registration and is surfaced to the caller as-is.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Invalid path pattern.
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending template.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A route lists a name that is not an HTTP method.
    #[error("unknown HTTP method '{method}' for route '{path}'")]
    UnknownMethod {
        /// Path template of the offending route.
        path: String,
        /// The unrecognized method name.
        method: String,
    },

    /// A route's handler entry is not a `[controller, action]` pair.
    #[error("invalid handler format for route '{path}': expected 2 elements, found {found}")]
    InvalidHandlerFormat {
        /// Path template of the offending route.
        path: String,
        /// Number of elements in the handler entry.
        found: usize,
    },

    /// A constructor parameter cannot be resolved.
    #[error("unsupported parameter type: {parameter} (controller {controller})")]
    UnsupportedParameter {
        /// Controller being constructed.
        controller: String,
        /// Parameter name.
        parameter: String,
    },

    /// The service lookup has no value for a constructor dependency.
    #[error("dependency not found: {type_name}")]
    DependencyNotFound {
        /// The type identity that was looked up.
        type_name: String,
        /// Error raised by the lookup, if it failed rather than came back empty.
        #[source]
        source: Option<BoxError>,
    },

    /// A controller constructor rejected its resolved arguments.
    #[error("failed to construct controller {controller}: {source}")]
    Construction {
        /// Controller being constructed.
        controller: String,
        /// Error returned by the constructor.
        #[source]
        source: BoxError,
    },

    /// A route file has no `routes` collection.
    #[error("invalid route configuration in file: {}", .0.display())]
    InvalidRouteFile(PathBuf),

    /// IO error while reading a route file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML route file could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON route file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
