//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, Uri};
use http_body_util::{BodyExt, Limited};

use crate::form::Form;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An incoming HTTP request with its body fully buffered.
///
/// Middleware receives the request by value and may mutate it before handing
/// it on; changes are visible to every layer further down the chain.
///
/// ```rust
/// use pipework::Request;
/// use http::{Method, header};
///
/// let req = Request::new(Method::POST, "/users/42".parse().unwrap())
///     .with_header(header::CONTENT_TYPE, "application/x-www-form-urlencoded".parse().unwrap())
///     .with_body("_method=DELETE");
///
/// assert_eq!(req.header("Content-Type"), Some("application/x-www-form-urlencoded"));
/// ```
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) form: Option<Form>,
}

impl Request {
    /// A request with no headers and no body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: None,
            params: HashMap::new(),
            form: None,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Buffers a hyper request, reading at most `limit` body bytes.
    ///
    /// Requests off the wire always carry a body, possibly empty; `None` is
    /// reserved for requests built in-process without one. A body over the
    /// limit fails with [`LengthLimitError`](http_body_util::LengthLimitError).
    pub(crate) async fn from_hyper<B>(req: http::Request<B>, limit: usize) -> Result<Self, BoxError>
    where
        B: hyper::body::Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let bytes = Limited::new(body, limit).collect().await?.to_bytes();
        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: Some(bytes),
            params: HashMap::new(),
            form: None,
        })
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn query(&self) -> Option<&str> { self.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// The buffered body, or `None` if the request carried none.
    pub fn body(&self) -> Option<&[u8]> { self.body.as_deref() }

    pub fn set_method(&mut self, method: Method) { self.method = method; }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    /// Case-insensitive header lookup. Returns the first value, and only if
    /// it is visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The form decoded by [`MethodOverride`](crate::middleware::MethodOverride),
    /// if that layer ran and parsed one. Body fields come before query fields.
    pub fn form(&self) -> Option<&Form> { self.form.as_ref() }
}
