//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - per-session WebSocket at `/api/v1/sessions/:id/ws`
/// - Static SPA from the configured directory with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let static_service = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(format!("{static_dir}/index.html")));
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD));

    Router::new()
        // Dataset queries
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/dataset", get(http::http_get_dataset))
        .route("/api/v1/outline", get(http::http_get_outline))
        .route("/api/v1/topics/:topic_id/explanation", get(http::http_get_topic_explanation))
        .route("/api/v1/topics/:topic_id/questions", get(http::http_get_topic_questions))
        .route("/api/v1/topics/:topic_id/highlights", get(http::http_get_topic_highlights))
        .route("/api/v1/subtopics/:subtopic_id/explanation", get(http::http_get_subtopic_explanation))
        .route("/api/v1/subtopics/:subtopic_id/questions", get(http::http_get_subtopic_questions))
        .route("/api/v1/pages/:page/highlights", get(http::http_get_page_highlights))
        // Sessions
        .route("/api/v1/sessions", post(http::http_post_session))
        .route("/api/v1/sessions/:id", axum::routing::delete(http::http_delete_session))
        .route("/api/v1/sessions/:id/dashboard", get(http::http_get_dashboard))
        .route("/api/v1/sessions/:id/select", post(http::http_post_select))
        .route("/api/v1/sessions/:id/answer", post(http::http_post_answer))
        .route("/api/v1/sessions/:id/advance", post(http::http_post_advance))
        .route(
            "/api/v1/sessions/:id/document",
            post(http::http_post_document)
                .get(http::http_get_document)
                .delete(http::http_delete_document)
                .layer(upload_limit),
        )
        .route("/api/v1/sessions/:id/ws", get(ws::ws_upgrade))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::DashboardConfig;
    use crate::seeds;

    const BOUNDARY: &str = "sensei-test-boundary";

    async fn ready_state() -> Arc<AppState> {
        let state = Arc::new(AppState::new(DashboardConfig::default()));
        state.set_dataset(Some(seeds::single_topic())).await;
        state
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    async fn new_session(app: &Router) -> String {
        let (status, json) = send(app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        json["session_id"].as_str().unwrap().to_string()
    }

    fn multipart_request(session: &str, parts: &[(&str, &str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (file_name, content_type, payload) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(payload);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1/sessions/{session}/document"))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn upload_request(session: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
        multipart_request(session, &[("slides.pdf", content_type, payload)])
    }

    async fn stored_document(app: &Router, session: &str) -> Option<Vec<u8>> {
        let req = Request::builder()
            .uri(format!("/api/v1/sessions/{session}/document"))
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        if res.status() != StatusCode::OK {
            return None;
        }
        Some(to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec())
    }

    #[tokio::test]
    async fn health_ok() {
        let app = build_router(ready_state().await);
        let (status, json) = send(&app, Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn dashboard_walkthrough() {
        let app = build_router(ready_state().await);
        let id = new_session(&app).await;

        let (_, view) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}/dashboard"), None).await;
        assert_eq!(view["dataset"], "ready");
        assert_eq!(view["selected_subtopic_id"], "s1");
        assert_eq!(view["pdf_page"], 1);
        assert_eq!(view["quiz"]["status"], "in_progress");
        assert_eq!(view["quiz"]["can_advance"], false);

        let (_, view) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/select"),
            Some(serde_json::json!({ "subtopicId": "s1" })),
        )
        .await;
        assert_eq!(view["pdf_page"], 3);

        let answer = |choice: &'static str| Some(serde_json::json!({ "choiceId": choice }));
        let (_, view) = send(&app, Method::POST, &format!("/api/v1/sessions/{id}/answer"), answer("q1_a")).await;
        assert_eq!(view["explanation"], "q1: picked a");
        assert_eq!(view["quiz"]["can_advance"], true);

        let (_, view) = send(&app, Method::POST, &format!("/api/v1/sessions/{id}/advance"), None).await;
        assert_eq!(view["quiz"]["index"], 1);
        assert_eq!(view["explanation"], "About t1");

        send(&app, Method::POST, &format!("/api/v1/sessions/{id}/answer"), answer("q2_b")).await;
        let (_, view) = send(&app, Method::POST, &format!("/api/v1/sessions/{id}/advance"), None).await;
        assert_eq!(view["quiz"]["status"], "complete");
        assert_eq!(view["explanation"], crate::config::PanelTexts::default().completion);
        assert_eq!(view["pdf_page"], 3);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let app = build_router(ready_state().await);
        let uri = format!("/api/v1/sessions/{}/dashboard", uuid::Uuid::new_v4());
        let (status, json) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], 404);
    }

    #[tokio::test]
    async fn empty_dataset_renders_placeholders() {
        let state = Arc::new(AppState::new(DashboardConfig::default()));
        state.set_dataset(None).await;
        let app = build_router(state);
        let id = new_session(&app).await;
        let (status, view) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}/dashboard"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["dataset"], "unavailable");
        assert!(view["selected_subtopic_id"].is_null());
        assert_eq!(view["quiz"]["status"], "empty");
        assert_eq!(view["quiz"]["message"], crate::config::PanelTexts::default().quiz_placeholder);

        let (status, _) = send(&app, Method::GET, "/api/v1/topics/t1/questions", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn dataset_queries() {
        let app = build_router(ready_state().await);
        let (_, json) = send(&app, Method::GET, "/api/v1/subtopics/s1/explanation", None).await;
        assert_eq!(json["explanation"], "About t1");
        let (_, json) = send(&app, Method::GET, "/api/v1/topics/t1/questions", None).await;
        assert_eq!(json["questions"].as_array().unwrap().len(), 2);
        let (_, json) = send(&app, Method::GET, "/api/v1/outline", None).await;
        assert_eq!(json["topics"][0]["subtopics"][0]["page_reference"], 3);
        let (_, json) = send(&app, Method::GET, "/api/v1/pages/3/highlights", None).await;
        assert_eq!(json["highlights"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn upload_replace_and_reject() {
        let app = build_router(ready_state().await);
        let id = new_session(&app).await;

        let res = app.clone().oneshot(upload_request(&id, "application/pdf", b"%PDF-1.4 one")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.clone().oneshot(upload_request(&id, "text/plain", b"not a pdf")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let req = Request::builder()
            .uri(format!("/api/v1/sessions/{id}/document"))
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/pdf");
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.4 one");

        let (_, view) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}/dashboard"), None).await;
        assert_eq!(view["document"]["file_name"], "slides.pdf");
        assert!(view["document"]["viewer_url"].as_str().unwrap().ends_with("#page=1"));

        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/sessions/{id}/document"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}/document"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn multiple_files_are_rejected() {
        let app = build_router(ready_state().await);
        let id = new_session(&app).await;
        app.clone().oneshot(upload_request(&id, "application/pdf", b"%PDF keep")).await.unwrap();

        let req = multipart_request(
            &id,
            &[("a.pdf", "application/pdf", &b"%PDF a"[..]), ("b.pdf", "application/pdf", &b"%PDF b"[..])],
        );
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(stored_document(&app, &id).await.as_deref(), Some(&b"%PDF keep"[..]));
    }

    #[tokio::test]
    async fn oversized_uploads_are_413() {
        let mut cfg = DashboardConfig::default();
        cfg.max_upload_bytes = 16;
        let state = Arc::new(AppState::new(cfg));
        state.set_dataset(Some(seeds::single_topic())).await;
        let app = build_router(state);
        let id = new_session(&app).await;

        // Over the configured limit but inside the body limit: rejected by validation.
        let res = app.clone().oneshot(upload_request(&id, "application/pdf", &[b'%'; 64])).await.unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // Over the body limit itself: rejected while reading the multipart stream.
        let huge = vec![b'%'; 16 + MULTIPART_OVERHEAD + 1024];
        let res = app.clone().oneshot(upload_request(&id, "application/pdf", &huge)).await.unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

        assert!(stored_document(&app, &id).await.is_none());
    }

    #[tokio::test]
    async fn root_serves_the_frontend() {
        let app = build_router(ready_state().await);
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(std::str::from_utf8(&html).unwrap().contains("/api/v1/sessions"));
    }
}
