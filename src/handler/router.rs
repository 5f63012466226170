//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health probes, the messages
//! endpoint with method dispatch, access logging and common headers.

use crate::config::AppState;
use crate::handler::messages;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let access_log = state
        .cached_access_log
        .load(std::sync::atomic::Ordering::Relaxed);
    let mut entry = access_log.then(|| {
        let mut entry =
            AccessLogEntry::start(peer, req.method(), req.uri(), req.version(), req.headers());
        entry.remote_user = state.users.current_user(req.headers()).map(|u| u.email);
        entry
    });

    let mut response = route_request(req, peer, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(entry) = entry.as_mut() {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(
            response.status().as_u16(),
            usize::try_from(body_bytes).unwrap_or(usize::MAX),
        );
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and method
async fn route_request<B>(
    req: Request<B>,
    peer: SocketAddr,
    state: &AppState,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let routes = &state.config.routes;
    let path = req.uri().path();

    // Health check endpoints (highest priority, always fast)
    if routes.health.enabled
        && (path == routes.health.liveness_path || path == routes.health.readiness_path)
    {
        return http::build_health_response("ok");
    }

    if path != routes.messages_path {
        return http::build_404_response();
    }

    let method = req.method().clone();
    match method {
        Method::GET | Method::HEAD => {
            messages::get_messages(req.uri().query(), method == Method::HEAD, state).await
        }
        Method::POST => {
            let (parts, body) = req.into_parts();
            messages::post_message(&parts.headers, body, peer, state).await
        }
        Method::OPTIONS => http::build_options_response(state.config.http.enable_cors),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::messages::tests::{test_state, StubLocator, ALICE};
    use crate::store::{Datastore, MemoryDatastore};
    use http_body_util::BodyExt;
    use hyper::header::{COOKIE, LOCATION};
    use hyper::StatusCode;

    fn peer() -> SocketAddr {
        "198.51.100.20:51000".parse().unwrap()
    }

    fn state_with(store: Arc<MemoryDatastore>, locator: StubLocator) -> Arc<AppState> {
        Arc::new(test_state(store, Arc::new(locator)))
    }

    fn request(method: Method, uri: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    fn with_session(mut req: Request<Full<Bytes>>) -> Request<Full<Bytes>> {
        req.headers_mut()
            .insert(COOKIE, HeaderValue::from_static("session=tok-alice"));
        req
    }

    async fn send(req: Request<Full<Bytes>>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
        handle_request(req, peer(), Arc::clone(state)).await.unwrap()
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_without_user() {
        let state = state_with(Arc::new(MemoryDatastore::new()), StubLocator::country("US"));
        let response = send(request(Method::GET, "/messages", ""), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[SERVER], "message-board/0.1");
        assert_eq!(body_string(response).await, "[]");
    }

    #[tokio::test]
    async fn test_post_then_get_roundtrip() {
        let store = Arc::new(MemoryDatastore::new());
        let state = state_with(store.clone(), StubLocator::country("US"));

        let post = with_session(request(
            Method::POST,
            "/messages",
            "text=listen+http%3A%2F%2Fx.com%2Fsong.mp3",
        ));
        let response = send(post, &state).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "/user-page.html?user=alice%40example.com"
        );

        let get = request(Method::GET, "/messages?user=alice%40example.com", "");
        let json: serde_json::Value =
            serde_json::from_str(&body_string(send(get, &state).await).await).unwrap();
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["user"], ALICE);
        assert_eq!(
            items[0]["text"],
            r#"listen <audio controls> <source src="http://x.com/song.mp3"> </audio>"#
        );
        assert_eq!(store.get_locations(ALICE).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_post_unauthenticated() {
        let store = Arc::new(MemoryDatastore::new());
        let state = state_with(store.clone(), StubLocator::country("US"));

        let response = send(request(Method::POST, "/messages", "text=hi"), &state).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/index.html");
        assert!(store.get_messages(ALICE).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_rate_limited_geolocation() {
        let store = Arc::new(MemoryDatastore::new());
        let state = state_with(store.clone(), StubLocator::rate_limited());

        let post = with_session(request(Method::POST, "/messages", "text=still+here"));
        let response = send(post, &state).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(store.get_messages(ALICE).unwrap()[0].text, "still here");
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let state = state_with(Arc::new(MemoryDatastore::new()), StubLocator::country("US"));
        let response = send(request(Method::HEAD, "/messages?user=x", ""), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Length"], "2");
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let state = state_with(Arc::new(MemoryDatastore::new()), StubLocator::country("US"));
        let response = send(request(Method::DELETE, "/messages", ""), &state).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_options() {
        let state = state_with(Arc::new(MemoryDatastore::new()), StubLocator::country("US"));
        let response = send(request(Method::OPTIONS, "/messages", ""), &state).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key("Allow"));
    }

    #[tokio::test]
    async fn test_unknown_path_and_health() {
        let state = state_with(Arc::new(MemoryDatastore::new()), StubLocator::country("US"));
        let response = send(request(Method::GET, "/elsewhere", ""), &state).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(request(Method::GET, "/healthz", ""), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");
    }
}
