//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! Routes, middleware and the composed pipeline all hold handlers of
//! *different* concrete types behind one shape: [`BoxedHandler`], an
//! `Arc<dyn Handler>`. Middleware receives a `BoxedHandler` and returns a new
//! one, so layers nest without knowing anything about each other.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! hello.into_handler()                             ← IntoHandler blanket impl
//!        ↓
//! Arc::new(HandlerFn(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn Handler>
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_response() })  ← BoxFuture
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` let tokio move the future across threads safely.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Processes one request and produces one response.
///
/// Implement this directly when a handler needs to own state, as middleware
/// does with the `next` handler it wraps. For plain functions use
/// [`handler_fn`] or pass the `async fn` wherever an [`IntoHandler`] is
/// accepted.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call(&self, req: Request) -> BoxFuture {
        (**self).call(req)
    }
}

// ── Function adapter ──────────────────────────────────────────────────────────

/// Adapts a function or closure into a [`Handler`].
///
/// ```rust
/// use pipework::{handler_fn, Handler, Request};
///
/// let hello = handler_fn(|req: Request| async move {
///     format!("hello from {}", req.path())
/// });
/// # let _ = hello;
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    HandlerFn(f)
}

/// A [`Handler`] built from a function. Created by [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F>(F);

impl<F, Fut, R> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Conversion ────────────────────────────────────────────────────────────────

/// Anything that can be registered as a route: a [`Handler`] value, or any
/// function with the signature
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The type parameter only disambiguates the two blanket impls; callers never
/// name it.
pub trait IntoHandler<Marker>: Send + Sync + 'static {
    fn into_handler(self) -> BoxedHandler;
}

#[doc(hidden)]
pub enum ViaHandler {}

#[doc(hidden)]
pub enum ViaFn {}

impl<H: Handler> IntoHandler<ViaHandler> for H {
    fn into_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

impl<F, Fut, R> IntoHandler<ViaFn> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_handler(self) -> BoxedHandler {
        Arc::new(HandlerFn(self))
    }
}
