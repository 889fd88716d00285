//! Constructor dependency resolution.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{trace, warn};

use crate::error::{BoxError, Result, RouterError};

/// A shared service instance.
pub type Service = Arc<dyn Any + Send + Sync>;

/// Looks up services by type identity.
pub trait ServiceLookup: Send + Sync {
    /// Returns the service registered under `type_name`.
    ///
    /// `Ok(None)` means nothing is registered; `Err` means the lookup itself
    /// failed.
    ///
    /// # Errors
    ///
    /// Implementations return an error when the service cannot be produced.
    fn get(&self, type_name: &str) -> std::result::Result<Option<Service>, BoxError>;
}

/// A simple map-backed service container.
///
/// ```
/// use oxide_router::{ServiceContainer, ServiceLookup};
///
/// struct Mailer;
///
/// let services = ServiceContainer::new().with(Mailer);
/// assert!(services.get(std::any::type_name::<Mailer>()).unwrap().is_some());
/// ```
#[derive(Default)]
pub struct ServiceContainer {
    services: HashMap<String, Service>,
}

impl ServiceContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service under its Rust type name.
    #[must_use]
    pub fn with<T: Any + Send + Sync>(self, service: T) -> Self {
        self.with_named(type_name::<T>(), service)
    }

    /// Registers a service under an explicit type identity.
    #[must_use]
    pub fn with_named<T>(mut self, name: impl Into<String>, service: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.insert(name, Arc::new(service));
        self
    }

    /// Registers an already shared service.
    pub fn insert(&mut self, name: impl Into<String>, service: Service) {
        self.services.insert(name.into(), service);
    }

    /// Returns whether a service is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}

impl ServiceLookup for ServiceContainer {
    fn get(&self, type_name: &str) -> std::result::Result<Option<Service>, BoxError> {
        Ok(self.services.get(type_name).cloned())
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The declared type of a constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// No type was declared. Never resolvable.
    Untyped,
    /// A builtin kind such as `string` or `int`.
    Builtin {
        /// Kind name.
        kind: String,
        /// Explicit value to pass.
        value: Option<String>,
    },
    /// A named type looked up in the service container.
    Service(String),
}

/// A declared constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub ty: ParamType,
}

impl Parameter {
    /// A parameter without a declared type.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Untyped,
        }
    }

    /// A builtin-typed parameter without an explicit value.
    pub fn builtin(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Builtin {
                kind: kind.into(),
                value: None,
            },
        }
    }

    /// A builtin-typed parameter with an explicit value.
    pub fn value(
        name: impl Into<String>,
        kind: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Builtin {
                kind: kind.into(),
                value: Some(value.into()),
            },
        }
    }

    /// A parameter resolved from the container under `type_name`.
    pub fn service(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Service(type_name.into()),
        }
    }

    /// A parameter resolved from the container under the Rust type name of `T`.
    pub fn service_of<T: Any>(name: impl Into<String>) -> Self {
        Self::service(name, type_name::<T>())
    }
}

/// What to do with a builtin parameter that has no explicit value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuiltinPolicy {
    /// Pass the kind name itself as the value.
    ///
    /// Kept for compatibility with route tables written against the legacy
    /// resolver. New controllers should give builtin parameters a value.
    #[default]
    Passthrough,
    /// Fail with [`RouterError::UnsupportedParameter`].
    Reject,
}

/// A resolved constructor argument.
#[derive(Clone)]
pub enum Argument {
    /// A service from the container.
    Service(Service),
    /// A builtin value.
    Value(String),
}

impl std::fmt::Debug for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(_) => f.write_str("Service(..)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Resolved constructor arguments, in parameter order.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    args: Vec<Argument>,
}

impl Arguments {
    /// Returns the number of arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Returns the argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.args.get(index)
    }

    /// Returns the service at `index` if it has type `T`.
    pub fn service<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
        match self.args.get(index)? {
            Argument::Service(service) => Arc::clone(service).downcast::<T>().ok(),
            Argument::Value(_) => None,
        }
    }

    /// Returns the builtin value at `index`.
    pub fn value(&self, index: usize) -> Option<&str> {
        match self.args.get(index)? {
            Argument::Value(value) => Some(value),
            Argument::Service(_) => None,
        }
    }

    /// Returns the service at `index`, or an error naming the expected type.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing or has another type.
    pub fn require<T>(&self, index: usize) -> std::result::Result<Arc<T>, BoxError>
    where
        T: Any + Send + Sync,
    {
        self.service(index)
            .ok_or_else(|| format!("argument {index} is not a {}", type_name::<T>()).into())
    }
}

/// Resolves constructor parameters into arguments.
///
/// Services are fetched from `lookup`; builtin parameters are handled
/// according to `policy`. The lookup is not consulted when `parameters` is
/// empty.
///
/// # Errors
///
/// Returns [`RouterError::UnsupportedParameter`] for untyped parameters (and
/// builtin ones under [`BuiltinPolicy::Reject`]), and
/// [`RouterError::DependencyNotFound`] when the lookup comes back empty or
/// fails.
pub fn resolve(
    controller: &str,
    parameters: &[Parameter],
    lookup: &dyn ServiceLookup,
    policy: BuiltinPolicy,
) -> Result<Arguments> {
    let unsupported = |parameter: &Parameter| RouterError::UnsupportedParameter {
        controller: controller.to_string(),
        parameter: parameter.name.clone(),
    };

    let mut args = Vec::with_capacity(parameters.len());

    for parameter in parameters {
        let argument = match &parameter.ty {
            ParamType::Untyped => return Err(unsupported(parameter)),
            ParamType::Builtin {
                value: Some(value), ..
            } => Argument::Value(value.clone()),
            ParamType::Builtin { kind, value: None } => match policy {
                BuiltinPolicy::Passthrough => {
                    warn!(
                        controller,
                        parameter = %parameter.name,
                        kind = %kind,
                        "builtin constructor parameter without a value, passing its type name"
                    );
                    Argument::Value(kind.clone())
                }
                BuiltinPolicy::Reject => return Err(unsupported(parameter)),
            },
            ParamType::Service(type_name) => {
                trace!(controller, service = %type_name, "looking up dependency");
                match lookup.get(type_name) {
                    Ok(Some(service)) => Argument::Service(service),
                    Ok(None) => {
                        return Err(RouterError::DependencyNotFound {
                            type_name: type_name.clone(),
                            source: None,
                        })
                    }
                    Err(source) => {
                        return Err(RouterError::DependencyNotFound {
                            type_name: type_name.clone(),
                            source: Some(source),
                        })
                    }
                }
            }
        };
        args.push(argument);
    }

    Ok(Arguments { args })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestHelper {
        greeting: &'static str,
    }

    #[derive(Default)]
    struct CountingLookup {
        calls: AtomicUsize,
    }

    impl ServiceLookup for CountingLookup {
        fn get(&self, _type_name: &str) -> std::result::Result<Option<Service>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    struct FailingLookup;

    impl ServiceLookup for FailingLookup {
        fn get(&self, _type_name: &str) -> std::result::Result<Option<Service>, BoxError> {
            Err("container is sealed".into())
        }
    }

    #[test]
    fn test_resolves_services() {
        let services = ServiceContainer::new().with(TestHelper { greeting: "hi" });
        let args = resolve(
            "Home",
            &[Parameter::service_of::<TestHelper>("helper")],
            &services,
            BuiltinPolicy::default(),
        )
        .unwrap();

        assert_eq!(args.len(), 1);
        assert_eq!(args.service::<TestHelper>(0).unwrap().greeting, "hi");
        assert!(args.service::<String>(0).is_none());
        assert!(args.require::<String>(0).is_err());
    }

    #[test]
    fn test_missing_service() {
        let err = resolve(
            "Home",
            &[Parameter::service("helper", "UndefinedTestHelper")],
            &ServiceContainer::new(),
            BuiltinPolicy::default(),
        )
        .unwrap_err();

        match err {
            RouterError::DependencyNotFound { type_name, source } => {
                assert_eq!(type_name, "UndefinedTestHelper");
                assert!(source.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failing_lookup_is_chained() {
        let err = resolve(
            "Home",
            &[Parameter::service("helper", "Helper")],
            &FailingLookup,
            BuiltinPolicy::default(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "dependency not found: Helper");
        assert_eq!(err.source().unwrap().to_string(), "container is sealed");
    }

    #[test]
    fn test_untyped_parameter() {
        let err = resolve(
            "Ambiguous",
            &[Parameter::untyped("thing")],
            &ServiceContainer::new(),
            BuiltinPolicy::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            RouterError::UnsupportedParameter { ref parameter, .. } if parameter == "thing"
        ));
    }

    #[test]
    fn test_builtin_passthrough() {
        let args = resolve(
            "Legacy",
            &[Parameter::builtin("name", "string")],
            &ServiceContainer::new(),
            BuiltinPolicy::Passthrough,
        )
        .unwrap();

        assert_eq!(args.value(0), Some("string"));
    }

    #[test]
    fn test_builtin_reject() {
        let err = resolve(
            "Legacy",
            &[Parameter::builtin("name", "string")],
            &ServiceContainer::new(),
            BuiltinPolicy::Reject,
        )
        .unwrap_err();

        assert!(matches!(err, RouterError::UnsupportedParameter { .. }));
    }

    #[test]
    fn test_builtin_with_value() {
        let args = resolve(
            "Configured",
            &[Parameter::value("per_page", "int", "20")],
            &ServiceContainer::new(),
            BuiltinPolicy::Reject,
        )
        .unwrap();

        assert_eq!(args.value(0), Some("20"));
    }

    #[test]
    fn test_no_parameters_never_calls_lookup() {
        let lookup = CountingLookup::default();
        let args = resolve("Plain", &[], &lookup, BuiltinPolicy::default()).unwrap();

        assert!(args.is_empty());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }
}
