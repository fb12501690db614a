// src/handlers/messaging.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{ModMensagens, RequireModule},
    },
    models::messaging::{Conversation, ConversationSummary, CreateConversationPayload, Message, SendMessagePayload},
};

// GET /api/conversations
#[utoipa::path(
    get,
    path = "/api/conversations",
    tag = "Messaging",
    responses((status = 200, description = "Conversas do usuário com contagem de não lidas", body = Vec<ConversationSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_conversations(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModMensagens>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let conversations = app_state
        .messaging_service
        .list_for_user(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(conversations))
}

// POST /api/conversations
#[utoipa::path(
    post,
    path = "/api/conversations",
    tag = "Messaging",
    request_body = CreateConversationPayload,
    responses(
        (status = 201, description = "Conversa criada", body = Conversation),
        (status = 404, description = "Participante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModMensagens>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateConversationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let conversation = app_state
        .messaging_service
        .create_conversation(&payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(conversation)))
}

// GET /api/conversations/{id}/messages
#[utoipa::path(
    get,
    path = "/api/conversations/{id}/messages",
    tag = "Messaging",
    responses(
        (status = 200, description = "Mensagens em ordem cronológica", body = Vec<Message>),
        (status = 403, description = "Usuário não participa da conversa")
    ),
    params(("id" = Uuid, Path, description = "ID da conversa")),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModMensagens>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .messaging_service
        .messages(id, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(messages))
}

// POST /api/conversations/{id}/messages
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/messages",
    tag = "Messaging",
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Mensagem enviada", body = Message),
        (status = 403, description = "Usuário não participa da conversa")
    ),
    params(("id" = Uuid, Path, description = "ID da conversa")),
    security(("api_jwt" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModMensagens>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state
        .messaging_service
        .send(id, user.0.id, &payload.conteudo)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(message)))
}

// POST /api/conversations/{id}/read
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/read",
    tag = "Messaging",
    responses(
        (status = 204, description = "Conversa marcada como lida"),
        (status = 403, description = "Usuário não participa da conversa")
    ),
    params(("id" = Uuid, Path, description = "ID da conversa")),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModMensagens>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .messaging_service
        .mark_read(id, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
