use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use application::{MessageDto, ParticipantDto, PostMessageRequest, RegisterParticipantRequest};

use crate::{auth::ActingUser, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendMessagePayload {
    to: Option<String>,
    text: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedQuery {
    /// Kept raw so a non-numeric value degrades to "no limit" instead of a
    /// rejected request.
    limit: Option<String>,
}

impl FeedQuery {
    fn parsed_limit(&self) -> Option<u32> {
        self.limit
            .as_deref()
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|limit| *limit > 0)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/participants",
            post(register_participant).get(list_participants),
        )
        .route("/messages", post(post_message).get(get_messages))
        .route("/messages/{message_id}", delete(delete_message))
        .route("/status", post(touch_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn register_participant(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<ParticipantDto>), ApiError> {
    let participant = state
        .participant_service
        .register(RegisterParticipantRequest {
            name: payload.name.unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ParticipantDto::from(&participant))))
}

async fn list_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantDto>>, ApiError> {
    let participants = state.participant_service.list().await?;
    Ok(Json(participants.iter().map(ParticipantDto::from).collect()))
}

async fn post_message(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Json(payload): Json<SendMessagePayload>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    // the header is checked before anything in the body
    let Some(user) = user else {
        return Err(ApiError::bad_request("missing user header"));
    };

    let message = state
        .message_service
        .post(PostMessageRequest {
            sender: user,
            to: payload.to.unwrap_or_default(),
            text: payload.text.unwrap_or_default(),
            kind: payload.kind.unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MessageDto::from(&message))))
}

async fn get_messages(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let Some(user) = user else {
        return Err(ApiError::unauthorized("missing user header"));
    };

    let messages = state
        .message_service
        .recent(&user, query.parsed_limit())
        .await?;

    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}

async fn touch_status(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> Result<StatusCode, ApiError> {
    let Some(user) = user else {
        return Err(ApiError::unauthorized("missing user header"));
    };

    state.participant_service.touch(&user).await?;
    Ok(StatusCode::OK)
}

async fn delete_message(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(message_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let Some(user) = user else {
        return Err(ApiError::unauthorized("missing user header"));
    };

    state.message_service.remove(message_id, &user).await?;
    Ok(StatusCode::OK)
}
