//! # oxide-router
//!
//! Request dispatch to registered controllers.
//!
//! This crate provides:
//! - Path templates with `{name}` placeholders
//! - An ordered, first-match route table loaded from YAML or JSON
//! - A controller registry with per-action protection rules
//! - Constructor dependency resolution from a service lookup
//! - Normalization of action return values into responses
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_router::{Action, Controller, Controllers, Dispatcher, Method, RouteRecord};
//!
//! #[derive(Default)]
//! struct BlogController;
//!
//! let controllers = Controllers::new().register(
//!     "BlogController",
//!     Controller::<BlogController>::new().action(
//!         "show",
//!         Action::new(|_, args| {
//!             format!(
//!                 "Category: {} | Post ID: {}",
//!                 args.param(0).unwrap_or_default(),
//!                 args.param(1).unwrap_or_default()
//!             )
//!         }),
//!     ),
//! );
//!
//! let dispatcher = Dispatcher::new(controllers);
//! dispatcher
//!     .load_routes(vec![RouteRecord::new(
//!         "/blog/{category}/{id}",
//!         "BlogController",
//!         "show",
//!     )])
//!     .unwrap();
//!
//! let res = dispatcher.dispatch(Method::Get, "/blog/recipes/1/").unwrap();
//! assert_eq!(res.body_string().as_deref(), Some("Category: recipes | Post ID: 1"));
//! ```
//!
//! ## Protected Actions
//!
//! Actions carry [`ProtectionRule`](oxide_guard::ProtectionRule)s. A denied
//! request never reaches the controller: it is redirected when the failing
//! rule names a redirect path and answered with `403 Not Allowed` otherwise.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use oxide_guard::{FlashBag, ProtectionRule, INFO};
//! use oxide_router::{Action, Controller, Controllers, Dispatcher, Method, RouteRecord};
//!
//! #[derive(Default)]
//! struct AccountController;
//!
//! let flash = Arc::new(FlashBag::new());
//! let dispatcher = Dispatcher::new(Controllers::new().register(
//!     "AccountController",
//!     Controller::<AccountController>::new().action(
//!         "index",
//!         Action::new(|_, _| "Your account").protect(
//!             ProtectionRule::authenticated()
//!                 .redirect_to("/login")
//!                 .with_message("Please sign in first."),
//!         ),
//!     ),
//! ))
//! .flash(flash.clone());
//! dispatcher
//!     .load_routes(vec![RouteRecord::new("/account", "AccountController", "index")])
//!     .unwrap();
//!
//! let res = dispatcher.dispatch(Method::Get, "/account").unwrap();
//! assert_eq!(res.status, 302);
//! assert_eq!(res.get_header("Location"), Some("/login"));
//! assert_eq!(flash.take(INFO), vec!["Please sign in first."]);
//! ```
//!
//! ## Route Files
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
//! Load one with [`Dispatcher::load_routes_from_file`] or [`load_routes`].

mod controller;
mod dispatcher;
mod error;
mod loader;
mod path;
mod reply;
mod request;
mod resolver;
mod response;
mod route;
mod table;

pub use controller::{
    Action, ActionEntry, Controller, ControllerEntry, Controllers, HandlerArgs, Instance,
};
pub use dispatcher::Dispatcher;
pub use error::{BoxError, Result, RouterError};
pub use loader::load_routes;
pub use path::{normalize_path, PathPattern, PathSegment};
pub use reply::{adapt, ContentType, Reply};
pub use request::{Method, Request};
pub use resolver::{
    resolve, Argument, Arguments, BuiltinPolicy, ParamType, Parameter, Service, ServiceContainer,
    ServiceLookup,
};
pub use response::{Response, NOT_ALLOWED_BODY, NOT_FOUND_BODY};
pub use route::{HandlerRef, RouteRecord};
pub use table::{CompiledRoute, MatchResult, RouteTable, Routes};
