//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI document endpoint (disable with `ARCADEGEN_ENABLE_SWAGGER=false`)
//! - `/api` routes: health, generation and stored games
//! - Optional static front end for every other path (`ARCADEGEN_STATIC_DIR`)

pub mod doc;
mod games;
mod generate;
mod health;

use std::sync::Arc;

use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .merge(generate::router())
        .merge(games::router());

    let mut app = Router::new().nest("/api", api_router);

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    if let Some(dir) = &state.config.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    use super::*;
    use crate::state::testing::test_state;

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, bytes) = call_raw(app, method, uri, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn call_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, bytes)
    }

    async fn generate(app: &Router, prompt: &str) -> Value {
        let (status, body) =
            call(app, Method::POST, "/api/generate", Some(json!({ "prompt": prompt }))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        body["game"].clone()
    }

    #[tokio::test]
    async fn health_is_served_under_api() {
        let (_dir, _model, state) = test_state().await;
        let app = build(state);
        let (status, _, _) = call_raw(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn responses_carry_a_trace_id() {
        let (_dir, _model, state) = test_state().await;
        let app = build(state);
        let (_, headers, _) = call_raw(&app, Method::GET, "/api/health", None).await;
        let id = headers.get(trace::X_TRACE_ID).unwrap().to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    #[traced_test]
    async fn generate_fetch_delete_lifecycle() {
        let (_dir, _model, state) = test_state().await;
        let app = build(state.clone());

        let game = generate(&app, "avoid falling rocks").await;
        assert_eq!(game["title"], "avoid falling rocks");
        assert_eq!(game["prompt"], "avoid falling rocks");
        assert_eq!(game["playCount"], 0);
        assert!(game["code"].as_str().unwrap().starts_with("const canvas"));
        let id = game["id"].as_str().unwrap().to_owned();

        let (status, body) = call(&app, Method::GET, &format!("/api/games/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["game"]["playCount"], 1);

        let (status, body) = call(&app, Method::DELETE, &format!("/api/games/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = call(&app, Method::GET, &format!("/api/games/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, _) = call(&app, Method::DELETE, &format!("/api/games/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(state.store.is_empty().await);
        assert!(logs_contain("game generated"));
        assert!(logs_contain("game deleted"));
    }

    #[tokio::test]
    async fn long_prompt_title_is_truncated() {
        let (_dir, _model, state) = test_state().await;
        let app = build(state);
        let prompt = "a".repeat(60);
        let game = generate(&app, &prompt).await;
        assert_eq!(game["title"], format!("{}...", "a".repeat(50)));
        assert_eq!(game["prompt"], prompt);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_stable() {
        let (_dir, _model, state) = test_state().await;
        let app = build(state);
        let first = generate(&app, "first").await;
        let second = generate(&app, "second").await;

        let (status, body) = call(&app, Method::GET, "/api/games", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body["games"].as_array().unwrap().iter().map(|g| g["id"].clone()).collect();
        assert_eq!(ids, vec![second["id"].clone(), first["id"].clone()]);

        let (_, again) = call(&app, Method::GET, "/api/games", None).await;
        assert_eq!(body, again);
    }

    #[tokio::test]
    async fn blank_or_missing_prompt_is_rejected() {
        let (_dir, _model, state) = test_state().await;
        let app = build(state.clone());
        for body in [json!({ "prompt": "   " }), json!({})] {
            let (status, reply) = call(&app, Method::POST, "/api/generate", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(reply["error"], "prompt is required");
        }
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn unreadable_bodies_get_the_json_error_shape() {
        let (_dir, _model, state) = test_state().await;
        let app = build(state.clone());
        let cases = [
            (Some("application/json"), r#"{"prompt": 5}"#),
            (Some("application/json"), "{not json"),
            (None, r#"{"prompt": "pong"}"#),
        ];
        for (content_type, raw) in cases {
            let mut builder = Request::builder().method(Method::POST).uri("/api/generate");
            if let Some(ct) = content_type {
                builder = builder.header(header::CONTENT_TYPE, ct);
            }
            let resp = app
                .clone()
                .oneshot(builder.body(Body::from(raw)).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{raw}");
            assert!(
                resp.headers()[header::CONTENT_TYPE]
                    .to_str()
                    .unwrap()
                    .starts_with("application/json")
            );
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["success"], false);
            assert!(!body["error"].as_str().unwrap().is_empty());
        }
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn malformed_generation_is_reported_and_not_stored() {
        let (_dir, model, state) = test_state().await;
        model.set_reply("```js\nnope\n```");
        let app = build(state.clone());

        let (status, body) =
            call(&app, Method::POST, "/api/generate", Some(json!({ "prompt": "x" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("too short"));
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn script_endpoint_serves_prepared_code_without_counting_a_play() {
        let (_dir, _model, state) = test_state().await;
        let app = build(state.clone());
        let game = generate(&app, "pong").await;
        let id = game["id"].as_str().unwrap();

        let (status, headers, bytes) =
            call_raw(&app, Method::GET, &format!("/api/games/{id}/script"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("application/javascript"));
        let script = String::from_utf8(bytes).unwrap();
        assert!(script.starts_with("(function (canvas, ctx) {"));
        assert!(script.contains("canvas/* requestFullscreen removed */;"));

        assert_eq!(state.store.get(id).await.unwrap().play_count, 0);

        let (status, _, _) = call_raw(&app, Method::GET, "/api/games/missing/script", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
