//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns. A middleware turns one handler into another:
//!
//! ```text
//! wrap(next) -> handler
//! ```
//!
//! The returned handler may inspect or rewrite the request, answer on its
//! own, or delegate to `next` and post-process what comes back.
//!
//! Layers are collected in a [`Stack`]. The first entry is the outermost
//! layer: it sees the request first and the response last.
//!
//! ```text
//! request ─▶ stack[0] ─▶ stack[1] ─▶ … ─▶ handler
//! response ◀─ stack[0] ◀─ stack[1] ◀─ … ◀─┘
//! ```
//!
//! Built-in middleware:
//! - [`MethodOverride`] — POST + hidden `_method` field → PUT / PATCH / DELETE

mod method_override;

pub use method_override::{MethodOverride, DEFAULT_MAX_FORM_SIZE, ELIGIBLE, METHOD_FIELD};

use std::sync::Arc;

use crate::handler::BoxedHandler;

/// Wraps a handler, producing a new handler.
///
/// Implementations are built once at startup and shared by every request;
/// any state they hold is configuration, never per-request data.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (**self).wrap(next)
    }
}

// ── Function adapter ──────────────────────────────────────────────────────────

/// Adapts a plain function into a [`Middleware`].
///
/// ```rust
/// use std::sync::Arc;
/// use pipework::middleware::{middleware_fn, Middleware};
/// use pipework::{handler_fn, BoxedHandler, Handler, Request};
///
/// let powered_by = middleware_fn(|next: BoxedHandler| -> BoxedHandler {
///     Arc::new(handler_fn(move |req: Request| {
///         let next = Arc::clone(&next);
///         async move {
///             let mut res = next.call(req).await;
///             res.headers_mut().insert("x-powered-by", "pipework".parse().unwrap());
///             res
///         }
///     }))
/// });
/// # let _ = powered_by;
/// ```
pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    MiddlewareFn(f)
}

/// A [`Middleware`] built from a function. Created by [`middleware_fn`].
#[derive(Clone, Copy)]
pub struct MiddlewareFn<F>(F);

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (self.0)(next)
    }
}

// ── Stack ─────────────────────────────────────────────────────────────────────

/// An ordered sequence of middleware.
///
/// Entries may be `None` (a layer switched off by configuration, say); they
/// are skipped when the stack is applied. A `Stack` is itself a
/// [`Middleware`], so stacks nest, and one stack can wrap any number of
/// handlers.
#[derive(Clone, Default)]
pub struct Stack {
    layers: Vec<Option<Arc<dyn Middleware>>>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `middleware` as the new innermost layer.
    pub fn push(&mut self, middleware: impl Middleware) -> &mut Self {
        self.layers.push(Some(Arc::new(middleware)));
        self
    }

    /// Appends an optional layer. `None` keeps its slot but wraps nothing.
    pub fn push_opt(&mut self, middleware: Option<Arc<dyn Middleware>>) -> &mut Self {
        self.layers.push(middleware);
        self
    }

    /// Builder-style [`push`](Stack::push).
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.push(middleware);
        self
    }

    pub fn len(&self) -> usize { self.layers.len() }
    pub fn is_empty(&self) -> bool { self.layers.is_empty() }
}

impl Middleware for Stack {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        // Right-to-left so that layers[0] ends up outermost.
        self.layers.iter().rev().flatten().fold(next, |h, m| m.wrap(h))
    }
}

impl<M> FromIterator<M> for Stack
where
    M: Into<Option<Arc<dyn Middleware>>>,
{
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self { layers: iter.into_iter().map(Into::into).collect() }
    }
}

/// Composes `stack` into a single middleware.
///
/// `compose([a, b]).wrap(h)` is equivalent to `a.wrap(b.wrap(h))`. An empty
/// or all-`None` sequence yields the identity: `wrap(h)` returns `h` itself.
/// Composition never fails.
pub fn compose<I>(stack: I) -> Stack
where
    I: IntoIterator,
    I::Item: Into<Option<Arc<dyn Middleware>>>,
{
    stack.into_iter().collect()
}
