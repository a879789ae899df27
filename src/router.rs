//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware registered
//! with [`Router::with`] wraps the lookup itself, so it runs before a route is
//! chosen: a layer that rewrites the method changes which tree is searched.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, Handler, IntoHandler};
use crate::middleware::{Middleware, Stack};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve),
/// or turn it into a plain handler with [`Router::into_handler`].
/// Each registration returns `self` so calls chain naturally.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    stack: Stack,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    /// For middleware that applies to a single route, wrap the handler before
    /// registering it:
    ///
    /// ```rust
    /// # use http::Method;
    /// # use pipework::{IntoHandler, Request, Router};
    /// # use pipework::middleware::{Middleware, MethodOverride};
    /// # async fn get_user(_: Request) -> &'static str { "" }
    /// # async fn delete_user(_: Request) -> &'static str { "" }
    /// Router::new()
    ///     .on(Method::GET,    "/users/{id}", get_user)
    ///     .on(Method::DELETE, "/users/{id}", MethodOverride::new().wrap(delete_user.into_handler()));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on<H, M>(mut self, method: Method, path: &str, handler: H) -> Self
    where
        H: IntoHandler<M>,
    {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Adds a middleware layer around every route. The first layer added is
    /// the outermost.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.stack.push(middleware);
        self
    }

    /// The composed pipeline: global middleware around route lookup.
    /// Unmatched requests get `404 Not Found`.
    pub fn into_handler(self) -> BoxedHandler {
        let table: BoxedHandler = Arc::new(RouteTable { routes: self.routes });
        self.stack.wrap(table)
    }
}

/// The terminal handler behind the router's middleware stack.
struct RouteTable {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl RouteTable {
    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Handler for RouteTable {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(&req.method, req.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req)
            }
            None => Box::pin(async { Response::status(StatusCode::NOT_FOUND) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::Uri;

    use super::*;

    async fn show(req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or("?"))
    }

    #[tokio::test]
    async fn dispatches_by_method_and_path() {
        let app = Router::new()
            .on(Method::GET, "/users/{id}", show)
            .on(Method::DELETE, "/users/{id}", |_req: Request| async { StatusCode::NO_CONTENT })
            .into_handler();

        let res = app.call(Request::new(Method::GET, Uri::from_static("/users/42"))).await;
        assert_eq!(res.body(), b"user 42");

        let res = app.call(Request::new(Method::DELETE, Uri::from_static("/users/42"))).await;
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn unmatched_is_not_found() {
        let app = Router::new().on(Method::GET, "/users/{id}", show).into_handler();

        let res = app.call(Request::new(Method::POST, Uri::from_static("/users/42"))).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let res = app.call(Request::new(Method::GET, Uri::from_static("/nope"))).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn router_middleware_runs_before_lookup() {
        let reroute = crate::middleware::middleware_fn(|next: BoxedHandler| -> BoxedHandler {
            Arc::new(crate::handler::handler_fn(move |mut req: Request| {
                req.set_method(Method::GET);
                next.call(req)
            }))
        });
        let app = Router::new()
            .on(Method::GET, "/users/{id}", show)
            .with(reroute)
            .into_handler();

        let res = app.call(Request::new(Method::PUT, Uri::from_static("/users/7"))).await;
        assert_eq!(res.body(), b"user 7");
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new()
            .on(Method::GET, "/users/{id}", show)
            .on(Method::GET, "/users/{id}", show);
    }
}
