//! HTTP server and graceful shutdown.
//!
//! The server is the host for a [`Router`]'s pipeline: it accepts
//! connections, buffers each request body, and runs the composed handler.
//!
//! On **SIGTERM** (or Ctrl-C) it stops accepting, lets every in-flight
//! connection finish, and then returns from [`Server::serve`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{Full, LengthLimitError};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::DEFAULT_MAX_FORM_SIZE;
use crate::request::{BoxError, Request};
use crate::response::Response;
use crate::router::Router;

/// Default cap on buffered request bodies: the same 10 MiB the form
/// decoder accepts.
pub const DEFAULT_MAX_BODY_SIZE: usize = DEFAULT_MAX_FORM_SIZE;

/// The HTTP server.
pub struct Server {
    addr: String,
    max_body_size: usize,
}

impl Server {
    /// Configures the server to bind to `addr` (`host:port`) when
    /// [`serve`](Server::serve) is called. The address is validated there.
    ///
    /// ```rust,no_run
    /// use pipework::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: impl Into<String>) -> Self {
        Self { addr: addr.into(), max_body_size: DEFAULT_MAX_BODY_SIZE }
    }

    /// Caps how many body bytes are buffered per request. Larger bodies are
    /// answered with `413 Content Too Large` before any handler runs.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// The router's middleware stack is composed once, here; every request
    /// shares the resulting handler.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let addr: SocketAddr = self.addr.parse().map_err(|source| Error::Addr {
            addr: self.addr.clone(),
            source,
        })?;
        let listener = TcpListener::bind(addr).await?;
        let app = router.into_handler();
        let limit = self.max_body_size;

        info!(%addr, "pipework listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting even if
                // more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { dispatch(app, req, limit, remote_addr).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("pipework stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers one request and runs it through the pipeline.
///
/// Every failure becomes a response, so hyper never sees an error.
async fn dispatch(
    app: BoxedHandler,
    req: hyper::Request<Incoming>,
    limit: usize,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let response = match Request::from_hyper(req, limit).await {
        Ok(req) => app.call(req).await,
        Err(e) => {
            warn!(peer = %remote_addr, "failed to read request body: {e}");
            body_error_response(&e)
        }
    };
    Ok(response.into_inner())
}

fn body_error_response(err: &BoxError) -> Response {
    if err.is::<LengthLimitError>() {
        Response::status(StatusCode::PAYLOAD_TOO_LARGE)
    } else {
        Response::status(StatusCode::BAD_REQUEST)
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives: SIGTERM or
/// SIGINT on Unix, Ctrl-C elsewhere. If a handler cannot be installed that
/// arm never resolves and the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bad_address_is_reported() {
        let err = Server::bind("not an address").serve(Router::new()).await.unwrap_err();
        assert!(matches!(err, Error::Addr { .. }));
        assert!(err.to_string().starts_with("invalid socket address `not an address`"));
    }

    #[tokio::test]
    async fn oversized_body_maps_to_content_too_large() {
        let wire = http::Request::post("/").body(Full::new(Bytes::from_static(b"0123456789"))).unwrap();
        let err = Request::from_hyper(wire, 4).await.unwrap_err();
        assert_eq!(body_error_response(&err).status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let other: BoxError = "connection reset".into();
        assert_eq!(body_error_response(&other).status_code(), StatusCode::BAD_REQUEST);
    }
}
