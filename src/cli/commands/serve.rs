//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for episode listing, search, and grounded answers.

use super::load_library;
use crate::chunking::{ChunkStrategy, Segment};
use crate::cli::Output;
use crate::config::Settings;
use crate::episode::Episode;
use crate::error::ClipcastError;
use crate::index::{RetrievalResult, SearchFilter};
use crate::library::Library;
use crate::rag::{AnswerGenerator, GroundingWarning, Retriever};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    library: Library,
    /// Absent when the completion endpoint is not configured.
    generator: Option<AnswerGenerator>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let library = load_library(settings)?;

    let generator = match library.answer_generator() {
        Ok(generator) => Some(generator),
        Err(e) => {
            Output::warning(&format!("POST /ask disabled: {}", e));
            None
        }
    };

    let state = Arc::new(AppState { library, generator });
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("clipcast API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("List Episodes", "GET  /episodes");
    Output::kv("Get Episode", "GET  /episodes/{id}");
    Output::kv("Search", "POST /search");
    Output::kv("Ask (RAG)", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/episodes", get(list_episodes))
        .route("/episodes/{id}", get(get_episode))
        .route("/search", post(search))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    episode_id: Option<String>,
    #[serde(default)]
    season: Option<String>,
    #[serde(default)]
    strategy: Option<ChunkStrategy>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: RetrievalResult,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default)]
    episode_id: Option<String>,
    #[serde(default)]
    season: Option<String>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: RetrievalResult,
    warnings: Vec<GroundingWarning>,
}

#[derive(Serialize)]
struct EpisodeInfo {
    id: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    short_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    season: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    episode: Option<String>,
    header_segments: usize,
    window_segments: usize,
    duration_seconds: f64,
}

impl From<&Episode> for EpisodeInfo {
    fn from(episode: &Episode) -> Self {
        let transcript = episode.transcript();
        Self {
            id: episode.id().to_string(),
            title: episode.title().to_string(),
            short_title: transcript.short_title.clone(),
            season: transcript.season.clone(),
            episode: transcript.episode_number.clone(),
            header_segments: episode.header_segments().len(),
            window_segments: episode.window_segments().len(),
            duration_seconds: episode.duration_seconds(),
        }
    }
}

#[derive(Serialize)]
struct EpisodeListResponse {
    episodes: Vec<EpisodeInfo>,
    total: usize,
}

#[derive(Serialize)]
struct EpisodeDetailResponse {
    #[serde(flatten)]
    info: EpisodeInfo,
    segments: Vec<Segment>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Filter for a request, 404 when the episode is unknown.
fn request_filter(
    library: &Library,
    episode_id: Option<&str>,
    season: Option<&str>,
) -> Result<SearchFilter, Response> {
    let filter = match episode_id {
        Some(id) if library.episode(id).is_none() => {
            return Err(error_response(
                StatusCode::NOT_FOUND,
                ClipcastError::EpisodeNotFound(id.to_string()),
            ))
        }
        Some(id) => SearchFilter::episode(id),
        None => SearchFilter::all(),
    };
    Ok(match season {
        Some(season) => filter.with_season(season),
        None => filter,
    })
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_episodes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let episodes: Vec<EpisodeInfo> = state.library.episodes().iter().map(EpisodeInfo::from).collect();
    Json(EpisodeListResponse {
        total: episodes.len(),
        episodes,
    })
}

async fn get_episode(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.library.episode(&id) {
        Some(episode) => Json(EpisodeDetailResponse {
            info: EpisodeInfo::from(episode),
            segments: episode.all_segments().cloned().collect(),
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, ClipcastError::EpisodeNotFound(id)),
    }
}

async fn search(State(state): State<Arc<AppState>>, Json(req): Json<SearchRequest>) -> Response {
    let library = &state.library;
    let mut filter = match request_filter(library, req.episode_id.as_deref(), req.season.as_deref()) {
        Ok(filter) => filter,
        Err(response) => return response,
    };
    if let Some(strategy) = req.strategy {
        filter = filter.with_strategy(strategy);
    }

    let results = match req.limit {
        Some(limit) => Retriever::new(limit, library.settings().retrieval.overlap_dedup_threshold)
            .retrieve(library.index(), &library.normalize_query(&req.query), &filter),
        None => library.search(&req.query, &filter),
    };

    Json(SearchResponse { results }).into_response()
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    let Some(generator) = &state.generator else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Answer generation is not configured",
        );
    };

    let filter = match request_filter(
        &state.library,
        req.episode_id.as_deref(),
        req.season.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(response) => return response,
    };

    match state.library.ask(generator, &req.question, &filter, None).await {
        Ok(response) => Json(AskResponse {
            answer: response.answer,
            sources: response.sources,
            warnings: response.warnings,
        })
        .into_response(),
        Err(e) => {
            warn!("Ask failed: {}", e);
            let status = match e {
                ClipcastError::Generation(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::rag::Completer;
    use crate::testing::sample_transcript;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct FixedCompleter;

    #[async_trait]
    impl Completer for FixedCompleter {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok("Stefan builds a recommender [35:39] → https://invented.example/x".to_string())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn app(with_generator: bool) -> Router {
        let library =
            Library::from_transcripts(vec![sample_transcript()], Settings::default()).unwrap();
        let generator = with_generator.then(|| {
            library
                .answer_generator_with(Arc::new(FixedCompleter))
                .unwrap()
        });
        router(Arc::new(AppState { library, generator }))
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app(false)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_and_get_episode() {
        let resp = app(false)
            .oneshot(Request::builder().uri("/episodes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = json_body(resp).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["episodes"][0]["id"], "IDzhmmKeNG4");

        let resp = app(false)
            .oneshot(
                Request::builder()
                    .uri("/episodes/IDzhmmKeNG4")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        assert_eq!(json["header_segments"], 2);
        assert!(json["segments"].as_array().unwrap().len() > 2);

        let resp = app(false)
            .oneshot(Request::builder().uri("/episodes/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search() {
        let resp = app(false)
            .oneshot(post(
                "/search",
                serde_json::json!({ "query": "personalization recommender", "limit": 3 }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        let results = json["results"].as_array().unwrap();
        assert!(!results.is_empty() && results.len() <= 3);
        assert_eq!(results[0]["segment"]["strategy"], "header");

        let resp = app(false)
            .oneshot(post(
                "/search",
                serde_json::json!({ "query": "recommender", "episode_id": "missing" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ask_grounds_answer() {
        let resp = app(true)
            .oneshot(post(
                "/ask",
                serde_json::json!({ "question": "What recommender does Stefan build?" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        let answer = json["answer"].as_str().unwrap();
        assert!(!answer.contains("invented.example"));
        assert!(answer.contains("https://www.youtube.com/watch?v=IDzhmmKeNG4&t=2139"));
        assert_eq!(json["warnings"][0]["kind"], "ungrounded_link");
    }

    #[tokio::test]
    async fn test_ask_without_generator() {
        let resp = app(false)
            .oneshot(post("/ask", serde_json::json!({ "question": "anything" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_search_by_season() {
        let resp = app(false)
            .oneshot(post(
                "/search",
                serde_json::json!({ "query": "recommender", "season": "8" }),
            ))
            .await
            .unwrap();
        let json = json_body(resp).await;
        let results = json["results"].as_array().unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r["segment"]["season"] == "8"));

        let resp = app(false)
            .oneshot(post(
                "/search",
                serde_json::json!({ "query": "recommender", "season": "3" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(json_body(resp).await["results"].as_array().unwrap().is_empty());
    }
}
