//! Controller and action descriptors.
//!
//! A controller is registered once with everything the dispatcher needs to
//! know about it: how to construct it, which constructor dependencies it
//! declares, and for each action the protection rules it carries and whether
//! it wants the request object.
//!
//! ```
//! use oxide_guard::ProtectionRule;
//! use oxide_router::{Action, Controller, Controllers, Response};
//!
//! #[derive(Default)]
//! struct BlogController;
//!
//! impl BlogController {
//!     fn show(&self, category: &str, id: &str) -> String {
//!         format!("Category: {category} | Post ID: {id}")
//!     }
//! }
//!
//! let controllers = Controllers::new().register(
//!     "BlogController",
//!     Controller::<BlogController>::new()
//!         .action(
//!             "show",
//!             Action::new(|c: &BlogController, args| {
//!                 c.show(args.param(0).unwrap_or_default(), args.param(1).unwrap_or_default())
//!             }),
//!         )
//!         .action(
//!             "edit",
//!             Action::new(|_: &BlogController, _| Response::html("<form></form>"))
//!                 .protect(ProtectionRule::roles(["editor"]).redirect_to("/login")),
//!         ),
//! );
//!
//! let entry = controllers.get("BlogController").unwrap();
//! assert!(entry.action("show").is_some());
//! assert_eq!(entry.action("edit").unwrap().rules().len(), 1);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use oxide_guard::ProtectionRule;

use crate::error::{BoxError, Result, RouterError};
use crate::reply::Reply;
use crate::request::Request;
use crate::resolver::{resolve, Arguments, BuiltinPolicy, Parameter, ServiceLookup};

/// A constructed controller.
pub type Instance = Box<dyn Any + Send + Sync>;

type Build = Arc<dyn Fn(&Arguments) -> std::result::Result<Instance, BoxError> + Send + Sync>;
type Invoke<C> = Arc<dyn Fn(&C, HandlerArgs<'_>) -> Reply + Send + Sync>;
type ErasedInvoke = Arc<dyn Fn(&(dyn Any + Send + Sync), HandlerArgs<'_>) -> Reply + Send + Sync>;

/// Arguments passed to an action.
#[derive(Debug, Clone, Copy)]
pub struct HandlerArgs<'a> {
    request: Option<&'a Request>,
    params: &'a [String],
}

impl<'a> HandlerArgs<'a> {
    /// Creates action arguments.
    pub const fn new(request: Option<&'a Request>, params: &'a [String]) -> Self {
        Self { request, params }
    }

    /// Returns the live request, if the action asked for it.
    pub const fn request(&self) -> Option<&'a Request> {
        self.request
    }

    /// Returns the route parameters in placeholder order.
    pub const fn params(&self) -> &'a [String] {
        self.params
    }

    /// Returns the route parameter at `index`.
    pub fn param(&self, index: usize) -> Option<&'a str> {
        self.params.get(index).map(String::as_str)
    }
}

/// A typed action on controller `C`.
pub struct Action<C> {
    invoke: Invoke<C>,
    rules: Vec<ProtectionRule>,
    wants_request: bool,
}

impl<C: 'static> Action<C> {
    /// Creates an action from a handler function.
    pub fn new<F, R>(handler: F) -> Self
    where
        F: Fn(&C, HandlerArgs<'_>) -> R + Send + Sync + 'static,
        R: Into<Reply>,
    {
        Self {
            invoke: Arc::new(move |controller: &C, args: HandlerArgs<'_>| {
                handler(controller, args).into()
            }),
            rules: Vec::new(),
            wants_request: false,
        }
    }

    /// Passes the live request to the action.
    #[must_use]
    pub const fn with_request(mut self) -> Self {
        self.wants_request = true;
        self
    }

    /// Attaches a protection rule. Rules keep their declaration order.
    #[must_use]
    pub fn protect(mut self, rule: ProtectionRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// A typed controller registration.
pub struct Controller<C> {
    parameters: Option<Vec<Parameter>>,
    build: Build,
    actions: HashMap<String, Action<C>>,
    _marker: PhantomData<fn() -> C>,
}

impl<C> Controller<C>
where
    C: Send + Sync + 'static,
{
    /// A controller without a declared constructor, built with `Default`.
    pub fn new() -> Self
    where
        C: Default,
    {
        Self {
            parameters: None,
            build: Arc::new(|_: &Arguments| Ok(Box::new(C::default()) as Instance)),
            actions: HashMap::new(),
            _marker: PhantomData,
        }
    }

    /// A controller whose constructor declares `parameters`.
    ///
    /// `build` receives the resolved arguments in parameter order.
    pub fn with_constructor<F>(parameters: Vec<Parameter>, build: F) -> Self
    where
        F: Fn(&Arguments) -> std::result::Result<C, BoxError> + Send + Sync + 'static,
    {
        Self {
            parameters: Some(parameters),
            build: Arc::new(move |args: &Arguments| build(args).map(|c| Box::new(c) as Instance)),
            actions: HashMap::new(),
            _marker: PhantomData,
        }
    }

    /// Adds an action.
    #[must_use]
    pub fn action(mut self, name: impl Into<String>, action: Action<C>) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    fn into_entry(self, name: String) -> ControllerEntry {
        let actions = self
            .actions
            .into_iter()
            .map(|(action_name, action)| {
                let invoke = action.invoke;
                let erased: ErasedInvoke =
                    Arc::new(move |instance: &(dyn Any + Send + Sync), args: HandlerArgs<'_>| {
                        instance
                            .downcast_ref::<C>()
                            .map_or(Reply::Empty, |controller| invoke(controller, args))
                    });
                let entry = ActionEntry {
                    rules: action.rules,
                    wants_request: action.wants_request,
                    invoke: erased,
                };
                (action_name, entry)
            })
            .collect();

        ControllerEntry {
            name,
            parameters: self.parameters,
            build: self.build,
            actions,
        }
    }
}

impl<C> Default for Controller<C>
where
    C: Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A registered action, with its type erased.
pub struct ActionEntry {
    rules: Vec<ProtectionRule>,
    wants_request: bool,
    invoke: ErasedInvoke,
}

impl ActionEntry {
    /// Returns the protection rules in declaration order.
    pub fn rules(&self) -> &[ProtectionRule] {
        &self.rules
    }

    /// Returns whether the action takes the request object.
    pub const fn wants_request(&self) -> bool {
        self.wants_request
    }

    /// Invokes the action on a constructed controller.
    pub fn invoke(&self, instance: &Instance, args: HandlerArgs<'_>) -> Reply {
        (self.invoke)(&**instance, args)
    }
}

impl std::fmt::Debug for ActionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEntry")
            .field("rules", &self.rules)
            .field("wants_request", &self.wants_request)
            .finish_non_exhaustive()
    }
}

/// A registered controller, with its type erased.
pub struct ControllerEntry {
    name: String,
    parameters: Option<Vec<Parameter>>,
    build: Build,
    actions: HashMap<String, ActionEntry>,
}

impl ControllerEntry {
    /// Returns the registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared constructor parameters, if a constructor is declared.
    pub fn parameters(&self) -> Option<&[Parameter]> {
        self.parameters.as_deref()
    }

    /// Returns the named action.
    pub fn action(&self, name: &str) -> Option<&ActionEntry> {
        self.actions.get(name)
    }

    /// Constructs the controller, resolving declared dependencies.
    ///
    /// A controller without a declared constructor is built without touching
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// Returns a resolution error from [`resolve`], or
    /// [`RouterError::Construction`] if the constructor fails.
    pub fn instantiate(
        &self,
        lookup: &dyn ServiceLookup,
        policy: BuiltinPolicy,
    ) -> Result<Instance> {
        let args = match &self.parameters {
            Some(parameters) => resolve(&self.name, parameters, lookup, policy)?,
            None => Arguments::default(),
        };

        (self.build)(&args).map_err(|source| RouterError::Construction {
            controller: self.name.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for ControllerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerEntry")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

/// The registry of controllers routes can refer to.
#[derive(Debug, Default)]
pub struct Controllers {
    entries: HashMap<String, ControllerEntry>,
}

impl Controllers {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller under `name`, replacing any previous one.
    #[must_use]
    pub fn register<C>(mut self, name: impl Into<String>, controller: Controller<C>) -> Self
    where
        C: Send + Sync + 'static,
    {
        self.insert(name, controller);
        self
    }

    /// Registers a controller under `name`, replacing any previous one.
    pub fn insert<C>(&mut self, name: impl Into<String>, controller: Controller<C>)
    where
        C: Send + Sync + 'static,
    {
        let name = name.into();
        self.entries
            .insert(name.clone(), controller.into_entry(name));
    }

    /// Returns the controller registered under `name`.
    pub fn get(&self, name: &str) -> Option<&ControllerEntry> {
        self.entries.get(name)
    }

    /// Returns the number of registered controllers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no controller is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
