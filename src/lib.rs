//! # pipework
//!
//! Composable HTTP middleware stacks, and a method-override layer that lets
//! plain HTML forms speak PUT, PATCH and DELETE.
//!
//! ## The model
//!
//! - A [`Handler`] turns a [`Request`] into a [`Response`].
//! - A [`Middleware`](middleware::Middleware) wraps a handler and returns a
//!   new one.
//! - A [`Stack`](middleware::Stack) applies an ordered list of middleware;
//!   the first entry is the outermost layer.
//! - [`MethodOverride`](middleware::MethodOverride) rewrites
//!   `POST` + `_method=delete` into `DELETE` before routing.
//!
//! [`Router`] and [`Server`] host the pipeline: the router's middleware runs
//! ahead of route lookup, and the server feeds it requests from hyper.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::Method;
//! use pipework::{ContentType, Request, Response, Router, Server};
//! use pipework::middleware::MethodOverride;
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .on(Method::GET,    "/posts/{id}", show_post)
//!         .on(Method::DELETE, "/posts/{id}", delete_post)
//!         .with(MethodOverride::new());
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn show_post(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::builder().bytes(ContentType::Html, format!(
//!         r#"<form method="post"><input type="hidden" name="_method" value="delete"><button>Delete {id}</button></form>"#
//!     ))
//! }
//!
//! // Reached by the form above: POST /posts/{id} with `_method=delete`.
//! async fn delete_post(_req: Request) -> http::StatusCode {
//!     http::StatusCode::NO_CONTENT
//! }
//! ```

mod error;
mod form;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use error::{Error, FormError};
pub use form::{Form, FORM_TYPE};
pub use handler::{handler_fn, BoxFuture, BoxedHandler, Handler, HandlerFn, IntoHandler};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Server, DEFAULT_MAX_BODY_SIZE};
