use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::server::{json_error, AppState};

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    let prompt = req.message.trim();
    if prompt.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "No input message provided");
    }

    info!(chars = prompt.len(), "chat request");
    match state.generator.generate(prompt).await {
        Ok(response) => {
            info!(chars = response.len(), "chat response");
            (StatusCode::OK, Json(ChatResponse { response })).into_response()
        }
        Err(err) => {
            error!(error = %err, "text generation failed");
            json_error(StatusCode::BAD_GATEWAY, &format!("Text generation failed: {}", err))
        }
    }
}
