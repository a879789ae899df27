//! Method override demo: an HTML form that edits and deletes a post.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example form_override
//!
//! Try:
//!   curl http://localhost:3000/posts/42
//!   curl -X POST http://localhost:3000/posts/42 \
//!        -H 'content-type: application/x-www-form-urlencoded' \
//!        -d '_method=patch&title=hello'
//!   curl -X POST http://localhost:3000/posts/42 \
//!        -H 'content-type: application/x-www-form-urlencoded' \
//!        -d '_method=delete'
//!   curl -X POST http://localhost:3000/posts/42 \
//!        -H 'content-type: application/x-www-form-urlencoded' \
//!        -d '_method=%zz'                                  # 400

use std::sync::Arc;
use std::time::Instant;

use http::{Method, StatusCode};
use pipework::middleware::{middleware_fn, MethodOverride};
use pipework::{handler_fn, BoxedHandler, ContentType, Handler, Request, Response, Router, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Outermost: logs the method as the client sent it. The override layer
    // runs inside it, so POSTs are logged as POST.
    let app = Router::new()
        .on(Method::GET,    "/posts/{id}", show_post)
        .on(Method::PATCH,  "/posts/{id}", update_post)
        .on(Method::DELETE, "/posts/{id}", delete_post)
        .with(middleware_fn(access_log))
        .with(MethodOverride::new());

    if let Err(e) = Server::bind("0.0.0.0:3000").serve(app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}

fn access_log(next: BoxedHandler) -> BoxedHandler {
    Arc::new(handler_fn(move |req: Request| {
        let next = Arc::clone(&next);
        async move {
            let method = req.method().clone();
            let path = req.path().to_owned();
            let started = Instant::now();
            let res = next.call(req).await;
            tracing::info!(
                %method,
                %path,
                status = res.status_code().as_u16(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "request",
            );
            res
        }
    }))
}

// GET /posts/{id}
async fn show_post(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    let page = format!(
        r#"<h1>Post {id}</h1>
<form method="post" action="/posts/{id}">
  <input type="hidden" name="_method" value="patch">
  <input name="title">
  <button>Rename</button>
</form>
<form method="post" action="/posts/{id}">
  <input type="hidden" name="_method" value="delete">
  <button>Delete</button>
</form>"#
    );
    Response::builder().bytes(ContentType::Html, page)
}

// PATCH /posts/{id}, or POST with `_method=patch`
async fn update_post(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    let title = req.form().and_then(|f| f.get("title")).unwrap_or("untitled");
    Response::text(format!("post {id} renamed to {title:?}"))
}

// DELETE /posts/{id}, or POST with `_method=delete`
async fn delete_post(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}
