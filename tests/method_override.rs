//! End-to-end behaviour of `MethodOverride` in front of a router: the
//! overridden method decides which route matches.

use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode, Uri};
use pipework::middleware::MethodOverride;
use pipework::{BoxedHandler, Handler, Request, Router, FORM_TYPE};

async fn ok(_req: Request) -> StatusCode {
    StatusCode::OK
}

fn app(method: Method) -> BoxedHandler {
    Router::new()
        .on(method, "/", ok)
        .with(MethodOverride::new())
        .into_handler()
}

fn post(body: Option<&'static str>, content_type: bool) -> Request {
    let mut req = Request::new(Method::POST, Uri::from_static("/"));
    if content_type {
        req = req.with_header(CONTENT_TYPE, HeaderValue::from_static(FORM_TYPE));
    }
    match body {
        Some(body) => req.with_body(body),
        None => req,
    }
}

#[tokio::test]
async fn no_method_field_is_not_found() {
    let res = app(Method::PATCH).call(post(Some(""), true)).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_override_reaches_patch_route() {
    let res = app(Method::PATCH).call(post(Some("_method=PATCH"), true)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn missing_body_is_not_found() {
    let res = app(Method::PATCH).call(post(None, true)).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_content_type_is_not_found() {
    let res = app(Method::PATCH).call(post(Some("_method=PATCH"), false)).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lowercase_patch_is_accepted() {
    let res = app(Method::PATCH).call(post(Some("_method=patch"), true)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn lowercase_delete_is_accepted() {
    let res = app(Method::DELETE).call(post(Some("_method=delete"), true)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn lowercase_put_is_accepted() {
    let res = app(Method::PUT).call(post(Some("_method=put"), true)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn get_is_not_an_override_target() {
    let res = app(Method::GET).call(post(Some("_method=get"), true)).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn plain_post_still_reaches_post_route() {
    let res = app(Method::POST).call(post(Some("_method=get&name=x"), true)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let res = app(Method::PATCH).call(post(Some("_method=PATCH&x=%"), true)).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    assert_eq!(res.body(), br#"invalid URL escape "%""#);
}

#[tokio::test]
async fn query_override_with_form_body() {
    let req = Request::new(Method::POST, Uri::from_static("/?_method=delete"))
        .with_header(CONTENT_TYPE, HeaderValue::from_static(FORM_TYPE))
        .with_body("title=x");
    let res = app(Method::DELETE).call(req).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn path_params_survive_override() {
    let app = Router::new()
        .on(Method::DELETE, "/posts/{id}", |req: Request| async move {
            format!("deleted {}", req.param("id").unwrap_or("?"))
        })
        .with(MethodOverride::new())
        .into_handler();

    let req = Request::new(Method::POST, Uri::from_static("/posts/9"))
        .with_header(CONTENT_TYPE, HeaderValue::from_static(FORM_TYPE))
        .with_body("_method=DELETE");
    let res = app.call(req).await;
    assert_eq!(res.body(), b"deleted 9");
}
