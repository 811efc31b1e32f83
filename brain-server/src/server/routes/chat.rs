use super::super::dto::{ChatRequestBody, ChatResponseBody, ErrorResponse, ResetResponse};
use super::super::error::{ApiError, api_error};
use super::super::state::ServerState;
use crate::history::HistoryError;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use brain_core::agent::{ChatInput, ConversationTurn};
use brain_core::model::ModelProvider;
use brain_core::types::{Interface, Language};
use std::sync::Arc;
use tracing::{error, info};

const USER_ID_HEADER: &str = "user-id";
const SESSION_ID_HEADER: &str = "session-id";

fn required_header(headers: &HeaderMap, name: &str) -> Result<String, ApiError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("missing {name} header")))
}

fn history_failure(session_id: &str, err: HistoryError) -> ApiError {
    error!(session_id, error = %err, "History store failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequestBody,
    params(
        ("user-id" = String, Header, description = "Caller identity"),
        ("session-id" = String, Header, description = "Conversation to continue")
    ),
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponseBody),
        (status = 400, description = "Missing header or empty message", body = ErrorResponse),
        (status = 500, description = "History store unavailable", body = ErrorResponse)
    )
)]
pub async fn chat_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequestBody>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let user_id = required_header(&headers, USER_ID_HEADER)?;
    let session_id = required_header(&headers, SESSION_ID_HEADER)?;
    info!(
        user_id = user_id.as_str(),
        session_id = session_id.as_str(),
        interface = payload.interface.as_str(),
        "Received /chat request"
    );

    if payload.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "message cannot be empty"));
    }

    let history = state
        .history
        .get(&session_id)
        .await
        .map_err(|err| history_failure(&session_id, err))?;
    state
        .history
        .append(&session_id, ConversationTurn::user(payload.message.clone()))
        .await
        .map_err(|err| history_failure(&session_id, err))?;

    let input = ChatInput::new(payload.message)
        .with_history(history)
        .with_session(user_id, session_id.clone())
        .with_interface(Interface::parse(&payload.interface))
        .with_language(Language::parse(&payload.language));
    let response = state.agent.chat(input).await;

    state
        .history
        .append(&session_id, ConversationTurn::assistant(response.clone()))
        .await
        .map_err(|err| history_failure(&session_id, err))?;

    Ok(Json(ChatResponseBody {
        response,
        actions: Vec::new(),
    }))
}

#[utoipa::path(
    post,
    path = "/reset-session",
    tag = "chat",
    params(("session-id" = String, Header, description = "Conversation to clear")),
    responses(
        (status = 200, description = "History cleared", body = ResetResponse),
        (status = 400, description = "Missing session-id header", body = ErrorResponse),
        (status = 500, description = "History store unavailable", body = ErrorResponse)
    )
)]
pub async fn reset_session_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    headers: HeaderMap,
) -> Result<Json<ResetResponse>, ApiError> {
    let session_id = required_header(&headers, SESSION_ID_HEADER)?;
    state
        .history
        .clear(&session_id)
        .await
        .map_err(|err| history_failure(&session_id, err))?;
    info!(session_id = session_id.as_str(), "Session reset");

    Ok(Json(ResetResponse {
        status: "reset".to_string(),
        session_id,
    }))
}
