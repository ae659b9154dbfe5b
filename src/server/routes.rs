use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ServerError;
use super::state::AppState;
use crate::recommender::{RecommendationRecord, DEFAULT_TOP_N};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent_ready: bool,
    pub model_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub song_name: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SongsListResponse {
    pub songs: Vec<String>,
    pub count: usize,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/recommend", post(recommend))
        .route("/chat", post(chat))
        .route("/songs", get(songs))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        agent_ready: state.agent.is_ready(),
        model_name: state.agent.model_name().to_owned(),
    })
}

/// Songs similar to `song_name`; 404 when the title is unknown.
async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<Vec<RecommendationRecord>>, ServerError> {
    info!(song = %request.song_name, top_n = request.top_n, "recommendation request");

    match state
        .agent
        .recommender()
        .recommend(&request.song_name, request.top_n)?
    {
        Some(records) => Ok(Json(records)),
        None => Err(ServerError::NotFound("Song not found".to_owned())),
    }
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    info!(message = %request.message, "chat message");
    Json(ChatResponse {
        response: state.agent.chat(&request.message).await,
    })
}

async fn songs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SongsListResponse>, ServerError> {
    let songs = state.agent.recommender().song_titles()?;
    info!(count = songs.len(), "listing songs");
    Ok(Json(SongsListResponse {
        count: songs.len(),
        songs,
    }))
}
