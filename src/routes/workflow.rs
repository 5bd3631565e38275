//! Routes built from the declared workflows: one path per `/{tag}{path}`, methods merged.

use crate::error::ConfigError;
use crate::state::AppState;
use crate::workflows;
use axum::{routing::MethodRouter, Router};
use std::collections::BTreeMap;
use tower_http::limit::RequestBodyLimitLayer;

pub fn workflow_routes(state: AppState, max_body_bytes: usize) -> Result<Router, ConfigError> {
    let mut by_route: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();
    for w in &state.model.workflows {
        let handler = workflows::handler(&w.name, w.method)
            .ok_or_else(|| ConfigError::UnknownWorkflow(w.name.clone()))?;
        let merged = match by_route.remove(&w.route) {
            Some(existing) => existing.merge(handler),
            None => handler,
        };
        tracing::debug!(workflow = %w.name, method = w.method.as_str(), route = %w.route, "route");
        by_route.insert(w.route.clone(), merged);
    }

    let mut router = Router::new();
    for (path, methods) in by_route {
        router = router.route(&path, methods);
    }
    Ok(router
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{app_config, resolve};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    /// Router over a pool that never connects: requests rejected before any query succeed
    /// without a database.
    fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/studio")
            .unwrap();
        let state = AppState::new(pool, resolve(&app_config("public")).unwrap());
        workflow_routes(state, 1024).unwrap()
    }

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("content-length", body.len())
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn page_size_out_of_range_is_unprocessable() {
        let (status, body) = send(get("/actors?pageSize=0")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "validation_error");

        let (status, _) = send(get("/tasks?pageSize=101&pageNo=1")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_order_field_is_bad_request() {
        let (status, body) = send(get("/tasks?pageSize=10&pageNo=1&orderBy=title,-priority")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_field");
        assert_eq!(body["error"]["details"]["field"], "priority");
    }

    #[tokio::test]
    async fn empty_order_token_is_bad_request() {
        let (status, body) = send(get("/list?orderBy=title,")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["field"], "");
    }

    #[tokio::test]
    async fn unknown_include_is_bad_request() {
        let (status, body) = send(get("/tasks?pageSize=10&pageNo=1&include=owner")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["field"], "owner");
    }

    #[tokio::test]
    async fn invalid_bodies_never_reach_the_database() {
        let (status, body) = send(json("POST", "/actors", r#"{"name":"  ","photo":"not a url"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = body["error"]["message"].as_str().unwrap_or_default();
        assert!(message.contains("name"));
        assert!(message.contains("photo"));

        let (status, _) = send(json("PUT", "/tasks", r#"{"id":"nope","title":"a","description":"","categoryId":"x"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(json("POST", "/category", "{broken")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let name = "a".repeat(4096);
        let (status, _) = send(json("POST", "/category", &format!(r#"{{"name":"{}"}}"#, name))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn undeclared_method_is_not_allowed() {
        let (status, _) = send(Request::delete("/actors").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
