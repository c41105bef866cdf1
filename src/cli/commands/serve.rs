//! HTTP API server for the lecture Q&A frontend.
//!
//! Provides REST endpoints for rooms, audio ingestion and questions.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{ServerSettings, Settings};
use crate::error::LecternError;
use crate::input::{NewRoom, QuestionText};
use crate::orchestrator::Orchestrator;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, warn};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    preflight::check(Operation::Serve, &settings)?;

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let server = settings.server.clone();

    let orchestrator = Arc::new(Orchestrator::new(settings)?);
    let app = router(orchestrator, &server);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lectern API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("List rooms", "GET    /rooms");
    Output::kv("Create room", "POST   /rooms");
    Output::kv("Delete room", "DELETE /rooms/{room_id}");
    Output::kv("Upload audio", "POST   /rooms/{room_id}/audio");
    Output::kv("List questions", "GET    /rooms/{room_id}/questions");
    Output::kv("Ask", "POST   /rooms/{room_id}/questions");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router over an orchestrator.
pub fn router(orchestrator: Arc<Orchestrator>, server: &ServerSettings) -> Router {
    let state = Arc::new(AppState { orchestrator });

    Router::new()
        .route("/health", get(health))
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{room_id}", axum::routing::delete(delete_room))
        .route("/rooms/{room_id}/audio", post(upload_audio))
        .route(
            "/rooms/{room_id}/questions",
            get(list_questions).post(ask_question),
        )
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(cors_layer(&server.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(allowed))
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    question: QuestionText,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomResponse {
    room_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadAudioResponse {
    chunk_ids: Vec<Uuid>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Maps pipeline errors onto HTTP statuses.
struct ApiError(LecternError);

impl From<LecternError> for ApiError {
    fn from(e: LecternError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(LecternError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LecternError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LecternError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_capability_failure() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// === Handlers ===

async fn health() -> &'static str {
    "ok"
}

async fn list_rooms(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let rooms = state.orchestrator.records().list_rooms().await?;
    Ok(Json(rooms))
}

async fn create_room(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<NewRoom>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(new_room) = body?;
    let room = state.orchestrator.records().create_room(&new_room).await?;
    Ok((StatusCode::CREATED, Json(CreateRoomResponse { room_id: room.id })))
}

async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if state.orchestrator.delete_room(room_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(LecternError::RoomNotFound(room_id).into())
    }
}

async fn upload_audio(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    state.orchestrator.require_room(room_id).await?;

    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| LecternError::InvalidInput("Missing Content-Type header".to_string()))?;

    let result = state
        .orchestrator
        .ingest_audio(room_id, &body, mime_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadAudioResponse {
            chunk_ids: result.chunk_ids,
        }),
    ))
}

async fn list_questions(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.orchestrator.require_room(room_id).await?;
    let questions = state.orchestrator.records().list_questions(room_id).await?;
    Ok(Json(questions))
}

async fn ask_question(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
    body: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    state.orchestrator.require_room(room_id).await?;
    let Json(req) = body?;

    let answered = state
        .orchestrator
        .answer_question(room_id, &req.question)
        .await?;
    Ok((StatusCode::CREATED, Json(answered)))
}
