//! Route records as loaded from configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};
use crate::request::Method;

/// A single route definition.
///
/// Records are plain data: the path template is compiled when the record is
/// loaded into a [`RouteTable`](crate::RouteTable), and the handler entry is
/// only checked when the route is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Optional route name for reverse URL lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Path template (e.g., `/posts/{id}`).
    pub path: String,
    /// `[controller, action]` pair.
    pub handler: Vec<String>,
    /// Accepted HTTP methods. `None` accepts any method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

impl RouteRecord {
    /// Creates a route accepting any method.
    pub fn new(
        path: impl Into<String>,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            path: path.into(),
            handler: vec![controller.into(), action.into()],
            methods: None,
        }
    }

    /// Sets the route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restricts the route to the given methods.
    #[must_use]
    pub fn methods(mut self, methods: &[Method]) -> Self {
        self.methods = Some(methods.iter().map(|m| m.as_str().to_string()).collect());
        self
    }

    /// Returns whether the route accepts `method`.
    pub fn accepts(&self, method: Method) -> bool {
        self.methods.as_ref().is_none_or(|methods| {
            methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(method.as_str()))
        })
    }

    /// Parses the handler entry.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidHandlerFormat`] unless the entry has
    /// exactly two elements.
    pub fn handler_ref(&self) -> Result<HandlerRef> {
        match self.handler.as_slice() {
            [controller, action] => Ok(HandlerRef {
                controller: controller.clone(),
                action: action.clone(),
            }),
            other => Err(RouterError::InvalidHandlerFormat {
                path: self.path.clone(),
                found: other.len(),
            }),
        }
    }
}

/// The controller and action a route dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    /// Registered controller name.
    pub controller: String,
    /// Action name on the controller.
    pub action: String,
}

impl std::fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.controller, self.action)
    }
}
