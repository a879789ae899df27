//! Method override for HTML forms.
//!
//! Browsers only submit forms as GET or POST. Applications that route on
//! PUT, PATCH and DELETE let forms smuggle the intended method in a hidden
//! field:
//!
//! ```html
//! <form method="post" action="/posts/42">
//!   <input type="hidden" name="_method" value="delete">
//!   <button>Delete</button>
//! </form>
//! ```
//!
//! [`MethodOverride`] rewrites such a POST into a DELETE before the rest of
//! the pipeline (and the router) sees it.

use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::error::FormError;
use crate::form::{Form, FORM_TYPE};
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::IntoResponse;

use super::Middleware;

/// Methods a form may override POST with.
pub static ELIGIBLE: [Method; 3] = [Method::PUT, Method::PATCH, Method::DELETE];

/// Name of the hidden form field carrying the override.
pub const METHOD_FIELD: &str = "_method";

/// Largest form body the middleware will decode: 10 MiB.
pub const DEFAULT_MAX_FORM_SIZE: usize = 10 << 20;

/// Lets `<form method="post">` dispatch PUT, PATCH and DELETE requests by
/// overriding the request method from a hidden `_method` field.
///
/// A request is rewritten only when all of these hold:
///
/// 1. the method is `POST`;
/// 2. a body is present and `Content-Type` is exactly
///    `application/x-www-form-urlencoded`;
/// 3. the form decodes (otherwise the layer answers `400 Bad Request` with
///    the decoding error as body, and nothing downstream runs);
/// 4. `_method`, ASCII-uppercased, is `PUT`, `PATCH` or `DELETE`.
///
/// The field is looked up in the body first and then in the query string.
/// Anything else passes through untouched. Layers above this one in a
/// [`Stack`](super::Stack) still observe the original `POST`.
///
/// ```rust
/// use http::Method;
/// use pipework::{Request, Router};
/// use pipework::middleware::MethodOverride;
///
/// # async fn update(_req: Request) -> &'static str { "updated" }
/// let app = Router::new()
///     .on(Method::PATCH, "/posts/{id}", update)
///     .with(MethodOverride::new());
/// # let _ = app;
/// ```
#[derive(Clone, Debug)]
pub struct MethodOverride {
    max_form_size: usize,
}

impl MethodOverride {
    pub fn new() -> Self {
        debug!("method override middleware installed");
        Self { max_form_size: DEFAULT_MAX_FORM_SIZE }
    }

    /// Caps the body size the layer is willing to decode. Larger bodies are
    /// rejected with `400 Bad Request`.
    pub fn with_max_form_size(mut self, bytes: usize) -> Self {
        self.max_form_size = bytes;
        self
    }
}

impl Default for MethodOverride {
    fn default() -> Self { Self::new() }
}

impl Middleware for MethodOverride {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(Overriding { next, max_form_size: self.max_form_size })
    }
}

struct Overriding {
    next: BoxedHandler,
    max_form_size: usize,
}

impl Handler for Overriding {
    fn call(&self, mut req: Request) -> BoxFuture {
        if let Err(e) = apply(&mut req, self.max_form_size) {
            debug!(path = req.path(), error = %e, "rejecting malformed form body");
            return Box::pin(async move { e.into_response() });
        }
        self.next.call(req)
    }
}

/// Rewrites `req.method` in place when the request asks for an override.
///
/// Only a decoding failure is an error; every other case leaves the request
/// as it was.
fn apply(req: &mut Request, max_form_size: usize) -> Result<(), FormError> {
    if req.method != Method::POST {
        return Ok(());
    }
    let Some(body) = req.body.as_ref() else {
        return Ok(());
    };
    if req.header("content-type") != Some(FORM_TYPE) {
        return Ok(());
    }
    if body.len() > max_form_size {
        return Err(FormError::TooLarge { limit: max_form_size });
    }

    let mut form = Form::parse(body)?;
    if let Some(query) = req.query() {
        form.extend(Form::parse(query.as_bytes())?);
    }

    let requested = form.get(METHOD_FIELD).map(str::to_ascii_uppercase);
    let target = requested
        .as_deref()
        .and_then(|m| ELIGIBLE.iter().find(|e| e.as_str() == m));
    if let Some(method) = target {
        debug!(path = req.path(), from = %req.method, to = %method, "overriding request method");
        req.method = method.clone();
    }

    req.form = Some(form);
    Ok(())
}
