//! Access logging middleware.
//!
//! Emits one event per request with method, URL, status, response size and
//! latency. POST bodies are included; other methods log no body.

use crate::MAX_BODY_SIZE;
use axum::{
    body::{to_bytes, Body, HttpBody},
    extract::Request,
    http::{header::CONTENT_LENGTH, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::time::Instant;
use tracing::info;

/// Request logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let url = request.uri().to_string();

    let (response, body) = if method == Method::POST {
        let (parts, body) = request.into_parts();
        match to_bytes(body, MAX_BODY_SIZE).await {
            Ok(bytes) => {
                let logged = render_body(&bytes);
                let request = Request::from_parts(parts, Body::from(bytes));
                (next.run(request).await, Some(logged))
            }
            Err(_) => (StatusCode::PAYLOAD_TOO_LARGE.into_response(), None),
        }
    } else {
        (next.run(request).await, None)
    };

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let content_length = response_size(&response)
        .map(|len| len.to_string())
        .unwrap_or_else(|| "-".to_string());

    info!(
        method = %method,
        url = %url,
        status = response.status().as_u16(),
        content_length = %content_length,
        elapsed_ms,
        body = body.as_deref(),
        "request"
    );

    response
}

/// Compact JSON rendering of a request body, or the raw text if it is not JSON
fn render_body(bytes: &Bytes) -> String {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .map(|value| value.to_string())
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

/// Response size from the header if set, otherwise from the body's exact size
fn response_size(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| response.body().size_hint().exact())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::Request as HttpRequest,
        middleware,
        routing::{get, post},
        Router,
    };
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    type Fields = HashMap<String, String>;

    /// Collects the fields of every `request` event
    #[derive(Clone, Default)]
    struct AccessLog(Arc<Mutex<Vec<Fields>>>);

    impl AccessLog {
        fn lines(&self) -> Vec<Fields> {
            self.0.lock().unwrap().clone()
        }
    }

    struct FieldVisitor<'a>(&'a mut Fields);

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: Subscriber> Layer<S> for AccessLog {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = Fields::new();
            event.record(&mut FieldVisitor(&mut fields));
            if fields.get("message").map(String::as_str) == Some("request") {
                self.0.lock().unwrap().push(fields);
            }
        }
    }

    fn echo_app() -> Router {
        Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .route("/people", get(|| async { "[]" }).put(|| async { "ok" }).delete(|| async { "" }))
            .layer(middleware::from_fn(log_requests))
    }

    fn request(method: Method, uri: &str, body: impl Into<Body>) -> Request {
        HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(body.into())
            .unwrap()
    }

    fn post_request(body: impl Into<Body>) -> Request {
        request(Method::POST, "/echo", body)
    }

    #[test]
    fn render_body_compacts_json() {
        let bytes = Bytes::from_static(b"{ \"name\" : \"Ada\",\n \"number\": \"123\" }");
        assert_eq!(render_body(&bytes), r#"{"name":"Ada","number":"123"}"#);
    }

    #[test]
    fn render_body_keeps_non_json_text() {
        let bytes = Bytes::from_static(b"name=Ada");
        assert_eq!(render_body(&bytes), "name=Ada");
    }

    #[tokio::test]
    async fn post_body_still_reaches_handler() {
        let response = echo_app().oneshot(post_request("hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_size(&response), Some(5));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn post_line_carries_request_body() {
        let log = AccessLog::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(log.clone()),
        );

        let raw = r#"{ "name": "Ada", "number": "123" }"#;
        echo_app().oneshot(post_request(raw)).await.unwrap();

        let lines = log.lines();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["method"], "POST");
        assert_eq!(line["url"], "/echo");
        assert_eq!(line["status"], "200");
        assert_eq!(line["content_length"], raw.len().to_string());
        assert!(line["elapsed_ms"].parse::<f64>().is_ok());
        assert_eq!(line["body"], r#"{"name":"Ada","number":"123"}"#);
    }

    #[tokio::test]
    async fn other_methods_log_no_body() {
        let log = AccessLog::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(log.clone()),
        );

        for method in [Method::GET, Method::PUT, Method::DELETE] {
            echo_app()
                .oneshot(request(method, "/people?x=1", r#"{"name":"Ada"}"#))
                .await
                .unwrap();
        }

        let lines = log.lines();
        assert_eq!(lines.len(), 3);
        for (line, method) in lines.iter().zip(["GET", "PUT", "DELETE"]) {
            assert_eq!(line["method"], method);
            assert_eq!(line["url"], "/people?x=1");
            assert_eq!(line["status"], "200");
            assert!(line.contains_key("content_length"));
            assert!(line.contains_key("elapsed_ms"));
            assert!(!line.contains_key("body"), "{method} logged a body");
        }
    }

    #[tokio::test]
    async fn oversized_post_is_still_logged() {
        let log = AccessLog::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(log.clone()),
        );

        let response = echo_app()
            .oneshot(post_request(vec![b'a'; MAX_BODY_SIZE + 1]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let lines = log.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["status"], "413");
        assert!(!lines[0].contains_key("body"));
    }
}
