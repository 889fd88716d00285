//! Request dispatch.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use oxide_guard::{
    AccessGuard, Anonymous, Decision, Denial, Discard, FlashSink, PermissionPolicy, UserProvider,
};
use tracing::{debug, error, info};

use crate::controller::{Controllers, HandlerArgs};
use crate::error::Result;
use crate::loader::load_routes;
use crate::reply::adapt;
use crate::request::{Method, Request};
use crate::resolver::{BuiltinPolicy, ServiceContainer, ServiceLookup};
use crate::response::Response;
use crate::route::RouteRecord;
use crate::table::RouteTable;

/// Maps requests to controller actions.
///
/// A dispatch runs through matching, handler lookup, access checks,
/// controller construction, invocation and reply adaptation. Not-found and
/// denied requests come back as ordinary responses; an `Err` always means
/// the route table or a controller registration is broken.
///
/// # Example
///
/// ```
/// use oxide_router::{Action, Controller, Controllers, Dispatcher, Method, RouteRecord};
///
/// #[derive(Default)]
/// struct HomeController;
///
/// let dispatcher = Dispatcher::new(Controllers::new().register(
///     "HomeController",
///     Controller::<HomeController>::new().action("index", Action::new(|_, _| "Welcome")),
/// ));
/// dispatcher
///     .load_routes(vec![RouteRecord::new("/", "HomeController", "index")])
///     .unwrap();
///
/// let res = dispatcher.dispatch(Method::Get, "/?page=2").unwrap();
/// assert_eq!(res.status, 200);
/// assert_eq!(res.body_string().as_deref(), Some("Welcome"));
///
/// let res = dispatcher.dispatch(Method::Get, "/missing").unwrap();
/// assert_eq!(res.status, 404);
/// ```
pub struct Dispatcher {
    table: RouteTable,
    controllers: Controllers,
    services: Arc<dyn ServiceLookup>,
    users: Arc<dyn UserProvider>,
    flash: Arc<dyn FlashSink>,
    guard: AccessGuard,
    builtins: BuiltinPolicy,
}

impl Dispatcher {
    /// Creates a dispatcher with an empty route table.
    ///
    /// Until configured otherwise there are no services, nobody is signed in
    /// and flash messages are dropped.
    pub fn new(controllers: Controllers) -> Self {
        Self {
            table: RouteTable::new(),
            controllers,
            services: Arc::new(ServiceContainer::new()),
            users: Arc::new(Anonymous),
            flash: Arc::new(Discard),
            guard: AccessGuard::new(),
            builtins: BuiltinPolicy::default(),
        }
    }

    /// Sets the service lookup used for constructor dependencies.
    #[must_use]
    pub fn services(mut self, services: impl ServiceLookup + 'static) -> Self {
        self.services = Arc::new(services);
        self
    }

    /// Sets the source of the current user.
    #[must_use]
    pub fn users(mut self, users: impl UserProvider + 'static) -> Self {
        self.users = Arc::new(users);
        self
    }

    /// Sets the sink receiving denial messages.
    #[must_use]
    pub fn flash(mut self, flash: Arc<dyn FlashSink>) -> Self {
        self.flash = flash;
        self
    }

    /// Sets how permission rules are evaluated.
    #[must_use]
    pub const fn permission_policy(mut self, policy: PermissionPolicy) -> Self {
        self.guard = self.guard.permission_policy(policy);
        self
    }

    /// Sets how builtin constructor parameters without a value are handled.
    #[must_use]
    pub const fn builtin_policy(mut self, policy: BuiltinPolicy) -> Self {
        self.builtins = policy;
        self
    }

    /// Replaces the route table.
    ///
    /// # Errors
    ///
    /// Returns an error if any path template is malformed or any record lists
    /// an unknown method. The previous
    /// routes stay in place.
    pub fn load_routes(&self, records: Vec<RouteRecord>) -> Result<()> {
        self.table.load(records)
    }

    /// Replaces the route table from a YAML or JSON route file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if any record
    /// fails to compile.
    pub fn load_routes_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.table.load(load_routes(path)?)
    }

    /// Returns the loaded route records, in declaration order.
    pub fn routes(&self) -> Vec<RouteRecord> {
        self.table.routes()
    }

    /// Returns the route table.
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Generates a URL for a named route.
    pub fn url_for(&self, name: &str, params: &HashMap<String, String>) -> Option<String> {
        self.table.url_for(name, params)
    }

    /// Dispatches a bare method and URI.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle`].
    pub fn dispatch(&self, method: Method, uri: &str) -> Result<Response> {
        self.handle(&Request::new(method, uri))
    }

    /// Dispatches a request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHandlerFormat`](crate::RouterError::InvalidHandlerFormat)
    /// for a matched route whose handler entry is not a pair, and a resolution
    /// or construction error when the controller cannot be built.
    pub fn handle(&self, req: &Request) -> Result<Response> {
        let Some(matched) = self.table.match_route(req.method, &req.path) else {
            info!(method = %req.method, path = %req.path, "no route matched");
            return Ok(Response::not_found());
        };
        let record = &matched.route.record;
        debug!(route = %record.path, params = ?matched.params, "route matched");

        let handler = record.handler_ref().inspect_err(|err| error!(%err, "bad route"))?;

        let Some(controller) = self.controllers.get(&handler.controller) else {
            info!(%handler, "controller not registered");
            return Ok(Response::not_found());
        };
        let Some(action) = controller.action(&handler.action) else {
            info!(%handler, "action not registered");
            return Ok(Response::not_found());
        };
        debug!(%handler, "handler resolved");

        let user = self.users.current_user();
        let decision = self
            .guard
            .check(action.rules(), user.as_deref(), self.flash.as_ref());
        if let Decision::Deny(denial) = decision {
            info!(%handler, rule = %denial.rule, "request denied");
            return Ok(Self::denied(denial));
        }

        let instance = controller
            .instantiate(self.services.as_ref(), self.builtins)
            .inspect_err(|err| error!(%handler, %err, "controller construction failed"))?;
        debug!(%handler, "controller constructed");

        let request = action.wants_request().then_some(req);
        let reply = action.invoke(&instance, HandlerArgs::new(request, &matched.params));

        let response = adapt(reply, req.accept());
        debug!(%handler, status = response.status, "request handled");
        Ok(response)
    }

    fn denied(denial: Denial) -> Response {
        denial
            .redirect_path
            .map_or_else(Response::not_allowed, Response::redirect)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.table)
            .field("controllers", &self.controllers)
            .field("guard", &self.guard)
            .field("builtins", &self.builtins)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Action, Controller};
    use crate::error::RouterError;
    use oxide_guard::{FlashBag, ProtectionRule, Role, SignedIn, User, INFO};

    #[derive(Default)]
    struct Pages;

    fn dispatcher() -> Dispatcher {
        let controllers = Controllers::new().register(
            "Pages",
            Controller::<Pages>::new()
                .action("home", Action::new(|_, _| "home"))
                .action(
                    "admin",
                    Action::new(|_, _| "admin area").protect(ProtectionRule::roles(["admin"])),
                )
                .action(
                    "account",
                    Action::new(|_, _| "account").protect(
                        ProtectionRule::authenticated()
                            .redirect_to("/login")
                            .with_message("Please sign in"),
                    ),
                )
                .action(
                    "agent",
                    Action::new(|_, args| {
                        args.request()
                            .and_then(|req| req.get_header("User-Agent"))
                            .map(str::to_string)
                    })
                    .with_request(),
                ),
        );

        let dispatcher = Dispatcher::new(controllers);
        dispatcher
            .load_routes(vec![
                RouteRecord::new("/", "Pages", "home"),
                RouteRecord::new("/admin", "Pages", "admin"),
                RouteRecord::new("/account", "Pages", "account"),
                RouteRecord::new("/agent", "Pages", "agent"),
                RouteRecord::new("/ghost", "Missing", "home"),
                RouteRecord::new("/nothing", "Pages", "missing"),
            ])
            .unwrap();
        dispatcher
    }

    #[test]
    fn test_not_found() {
        let dispatcher = dispatcher();
        for uri in ["/not-existing", "/ghost", "/nothing"] {
            let res = dispatcher.dispatch(Method::Get, uri).unwrap();
            assert_eq!(res.status, 404, "{uri}");
            assert_eq!(res.body_string().as_deref(), Some("404 Not Found"));
        }
    }

    #[test]
    fn test_denied_without_redirect() {
        let res = dispatcher().dispatch(Method::Get, "/admin").unwrap();
        assert_eq!(res.status, 403);
        assert_eq!(res.body_string().as_deref(), Some("403 Not Allowed"));
    }

    #[test]
    fn test_denied_with_redirect_queues_message() {
        let flash = Arc::new(FlashBag::new());
        let dispatcher = dispatcher().flash(flash.clone());

        let res = dispatcher.dispatch(Method::Get, "/account").unwrap();
        assert_eq!(res.status, 302);
        assert_eq!(res.get_header("Location"), Some("/login"));
        assert_eq!(flash.take(INFO), vec!["Please sign in"]);
    }

    #[test]
    fn test_allowed_with_role() {
        let admin = User::new("root").with_role(Role::new("admin"));
        let dispatcher = dispatcher().users(SignedIn::new(admin));

        let res = dispatcher.dispatch(Method::Get, "/admin").unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string().as_deref(), Some("admin area"));
    }

    #[test]
    fn test_request_passed_when_asked() {
        let req = Request::get("/agent").header("User-Agent", "curl/8.0");
        let res = dispatcher().handle(&req).unwrap();
        assert_eq!(res.body_string().as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn test_text_reply_content_type() {
        let dispatcher = dispatcher();

        let res = dispatcher.dispatch(Method::Get, "/").unwrap();
        assert_eq!(res.get_header("Content-Type"), Some("text/html"));

        let req = Request::get("/").header("Accept", "application/json");
        let res = dispatcher.handle(&req).unwrap();
        assert_eq!(res.get_header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_invalid_handler_is_an_error() {
        let dispatcher = dispatcher();
        let mut record = RouteRecord::new("/broken", "Pages", "home");
        record.handler.push("extra".to_string());
        dispatcher.load_routes(vec![record]).unwrap();

        let err = dispatcher.dispatch(Method::Get, "/broken").unwrap_err();
        assert!(matches!(err, RouterError::InvalidHandlerFormat { found: 3, .. }));
    }

    #[test]
    fn test_url_for() {
        let dispatcher = Dispatcher::new(Controllers::new());
        dispatcher
            .load_routes(vec![RouteRecord::new("/posts/{id}", "Posts", "show").name("post")])
            .unwrap();

        let params = HashMap::from([("id".to_string(), "7".to_string())]);
        assert_eq!(dispatcher.url_for("post", &params).as_deref(), Some("/posts/7"));
    }
}
