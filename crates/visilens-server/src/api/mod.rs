mod analyses;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use visilens_store::JobStore;

use crate::middleware::{request_id, RequestId};
use crate::pipeline::Analyzer;

#[derive(Clone)]
pub struct AppState {
    pub store: JobStore,
    pub analyzer: Arc<Analyzer>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    jobs: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/analyses", post(analyses::create_analysis))
        .route("/api/v1/analyses/{job_id}", get(analyses::get_analysis))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let jobs = state.store.len().await;

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData { status: "ok", jobs },
            meta,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use uuid::Uuid;
    use visilens_rater::RaterClient;
    use visilens_scraper::ScrapeClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(base_url: &str) -> AppState {
        AppState {
            store: JobStore::new(),
            analyzer: Arc::new(Analyzer {
                scraper: ScrapeClient::new(5, "visilens-test/0.1").expect("scrape client"),
                rater: RaterClient::with_base_url("test-key", 5, base_url)
                    .expect("rater client"),
                lexicons: visilens_core::Lexicons::default(),
            }),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn health_returns_ok_with_request_id() {
        let app = build_app(test_state("http://127.0.0.1:9"));

        let response = app.oneshot(get_req("/api/v1/health")).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["jobs"], 0);
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn request_id_header_is_echoed() {
        let app = build_app(test_state("http://127.0.0.1:9"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-test-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get("x-request-id").map(|v| v.to_str().unwrap()),
            Some("req-test-42")
        );
        let json = body_json(response).await;
        assert_eq!(json["meta"]["request_id"], "req-test-42");
    }

    #[tokio::test]
    async fn create_rejects_empty_input() {
        let app = build_app(test_state("http://127.0.0.1:9"));

        let response = app
            .oneshot(post_json(
                "/api/v1/analyses",
                serde_json::json!({ "input": "   ", "input_type": "brand" }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn create_rejects_unknown_input_type() {
        let app = build_app(test_state("http://127.0.0.1:9"));

        let response = app
            .oneshot(post_json(
                "/api/v1/analyses",
                serde_json::json!({ "input": "Acme", "input_type": "domain" }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn create_returns_accepted_with_job_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let state = test_state(&server.uri());
        let app = build_app(state.clone());

        let response = app
            .oneshot(post_json(
                "/api/v1/analyses",
                serde_json::json!({ "input": "Acme", "input_type": "brand" }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let json = body_json(response).await;
        let job_id = json["data"]["job_id"].as_str().expect("job id");
        assert!(Uuid::parse_str(job_id).is_ok());
        assert_eq!(state.store.len().await, 1);
    }

    #[tokio::test]
    async fn poll_unknown_job_returns_not_found() {
        let app = build_app(test_state("http://127.0.0.1:9"));
        let missing = Uuid::new_v4();

        let response = app
            .oneshot(get_req(&format!("/api/v1/analyses/{missing}")))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn poll_malformed_job_id_returns_bad_request() {
        let app = build_app(test_state("http://127.0.0.1:9"));

        let response = app
            .oneshot(get_req("/api/v1/analyses/not-a-uuid"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn brand_analysis_lifecycle_reaches_completed() {
        let server = MockServer::start().await;
        let opinion = serde_json::json!({
            "strengths": ["Clear product line"],
            "keywords": ["widgets"],
            "visibility": { "score": 72.0, "assessment": "strong" },
            "sentiment": { "score": 0.6, "assessment": "positive" },
            "mentions": { "count": 4, "contexts": ["buying guides"] }
        });
        let completion = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": opinion.to_string() } }
            ]
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion))
            .mount(&server)
            .await;
        let app = build_app(test_state(&server.uri()));

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/analyses",
                serde_json::json!({
                    "input": "Acme",
                    "input_type": "brand",
                    "raters": ["chatgpt-4o"]
                }),
            ))
            .await
            .expect("create response");
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let json = body_json(response).await;
        let job_id = json["data"]["job_id"].as_str().expect("job id").to_string();

        let mut last = serde_json::Value::Null;
        for _ in 0..50 {
            let poll = app
                .clone()
                .oneshot(get_req(&format!("/api/v1/analyses/{job_id}")))
                .await
                .expect("poll response");
            assert_eq!(poll.status(), StatusCode::OK);
            last = body_json(poll).await;
            if last["data"]["status"] == "completed" {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }

        assert_eq!(last["data"]["status"], "completed");
        assert_eq!(last["data"]["progress"], 100);
        let report = &last["data"]["result"]["report"];
        assert_eq!(report["input_value"], "Acme");
        assert_eq!(report["summary"]["visibility_score"], 72);
        assert_eq!(report["keywords"]["top"][0]["text"], "widgets");
        assert!(last["data"]["result"]["metadata"]["analysis_date"].is_string());
        assert!(last["data"].get("error").is_none());
    }
}
