#![allow(dead_code)]

use oxide_guard::ProtectionRule;
use oxide_router::{
    Action, Controller, Controllers, Dispatcher, Method, Parameter, Response, RouteRecord,
};

#[derive(Default)]
pub struct TestController;

impl TestController {
    fn index(&self) -> &'static str {
        "string"
    }

    fn multiple(&self, category: &str, id: &str) -> String {
        format!("Category: {category} | Post ID: {id}")
    }
}

pub struct TestHelper {
    pub greeting: String,
}

pub struct TestControllerWithDependencies {
    helper: std::sync::Arc<TestHelper>,
}

pub struct StringDependencyController {
    name: String,
}

pub fn controllers() -> Controllers {
    Controllers::new()
        .register(
            "TestController",
            Controller::<TestController>::new()
                .action("index", Action::new(|c: &TestController, _| c.index()))
                .action(
                    "params",
                    Action::new(|_: &TestController, args| args.param(0).map(str::to_string)),
                )
                .action(
                    "multipleParams",
                    Action::new(|c: &TestController, args| {
                        c.multiple(
                            args.param(0).unwrap_or_default(),
                            args.param(1).unwrap_or_default(),
                        )
                    }),
                )
                .action(
                    "returnResponse",
                    Action::new(|_: &TestController, args| {
                        args.request().map(|_| Response::ok().body("Test response"))
                    })
                    .with_request(),
                )
                .action("returnNothing", Action::new(|_: &TestController, _| ()))
                .action(
                    "notAuthenticated",
                    Action::new(|_: &TestController, _| "Secret").protect(
                        ProtectionRule::authenticated()
                            .redirect_to("/login")
                            .with_message("You must be logged in to view this page."),
                    ),
                )
                .action(
                    "notAuthenticatedSuccess",
                    Action::new(|_: &TestController, _| "Success")
                        .protect(ProtectionRule::unauthenticated()),
                )
                .action(
                    "admin",
                    Action::new(|_: &TestController, _| "Admin")
                        .protect(ProtectionRule::authenticated())
                        .protect(ProtectionRule::roles(["admin"])),
                )
                .action(
                    "publish",
                    Action::new(|_: &TestController, _| "Published")
                        .protect(ProtectionRule::permissions(["publish"])),
                ),
        )
        .register(
            "TestControllerWithDependencies",
            Controller::with_constructor(
                vec![Parameter::service_of::<TestHelper>("helper")],
                |args| {
                    Ok(TestControllerWithDependencies {
                        helper: args.require::<TestHelper>(0)?,
                    })
                },
            )
            .action(
                "index",
                Action::new(|c: &TestControllerWithDependencies, _| c.helper.greeting.clone()),
            ),
        )
        .register(
            "TestControllerWithUndefinedDependency",
            Controller::<TestController>::with_constructor(
                vec![Parameter::service("helper", "UndefinedTestHelper")],
                |_| Ok(TestController),
            )
            .action("index", Action::new(|c: &TestController, _| c.index())),
        )
        .register(
            "StringDependencyController",
            Controller::with_constructor(vec![Parameter::builtin("name", "string")], |args| {
                Ok(StringDependencyController {
                    name: args.value(0).unwrap_or_default().to_string(),
                })
            })
            .action(
                "index",
                Action::new(|c: &StringDependencyController, _| c.name.clone()),
            ),
        )
        .register(
            "AmbiguousDependencyController",
            Controller::<TestController>::with_constructor(
                vec![Parameter::untyped("thing")],
                |_| Ok(TestController),
            )
            .action("index", Action::new(|c: &TestController, _| c.index())),
        )
}

pub fn routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::new("/", "TestController", "index").name("index"),
        RouteRecord::new("/test", "TestController", "index"),
        RouteRecord::new("/test/blog/{id}", "TestController", "params"),
        RouteRecord::new("/test/blog/{category}/{id}", "TestController", "multipleParams")
            .name("post_detail"),
        RouteRecord::new("/response", "TestController", "returnResponse"),
        RouteRecord::new("/nothing", "TestController", "returnNothing"),
        RouteRecord::new("/account", "TestController", "notAuthenticated"),
        RouteRecord::new("/login", "TestController", "notAuthenticatedSuccess"),
        RouteRecord::new("/admin", "TestController", "admin"),
        RouteRecord::new("/publish", "TestController", "publish").methods(&[Method::Post]),
        RouteRecord::new("/publish", "TestController", "index").methods(&[Method::Get]),
        RouteRecord::new("/helper", "TestControllerWithDependencies", "index"),
        RouteRecord::new("/undefined", "TestControllerWithUndefinedDependency", "index"),
        RouteRecord::new("/string", "StringDependencyController", "index"),
        RouteRecord::new("/ambiguous", "AmbiguousDependencyController", "index"),
        RouteRecord::new("/missing-controller", "NoSuchController", "index"),
        RouteRecord::new("/missing-action", "TestController", "noSuchAction"),
    ]
}

pub fn dispatcher() -> Dispatcher {
    let dispatcher = Dispatcher::new(controllers());
    dispatcher
        .load_routes(routes())
        .unwrap_or_else(|e| panic!("Failed to load routes: {e}"));
    dispatcher
}

pub fn body(res: &Response) -> String {
    res.body_string()
        .unwrap_or_else(|| panic!("Body is not UTF-8: {:?}", res.body))
}
