// src/handlers/workspaces.rs

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
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::RequireAdmin},
    models::workspace::{
        CreateFeatureFlagPayload, CreateWorkspacePayload, FeatureFlag, FlagEvaluation, UpdateFeatureFlagPayload,
        UpdateWorkspacePayload, Workspace,
    },
};

// =============================================================================
//  WORKSPACES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/workspaces",
    tag = "Workspaces",
    responses((status = 200, description = "Workspaces configurados", body = Vec<Workspace>)),
    security(("api_jwt" = []))
)]
pub async fn list_workspaces(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let workspaces = app_state
        .workspace_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(workspaces))
}

#[utoipa::path(
    post,
    path = "/api/workspaces",
    tag = "Workspaces",
    request_body = CreateWorkspacePayload,
    responses(
        (status = 201, description = "Workspace criado", body = Workspace),
        (status = 409, description = "Slug já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_workspace(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Json(payload): Json<CreateWorkspacePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let workspace = app_state
        .workspace_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(workspace)))
}

#[utoipa::path(
    put,
    path = "/api/workspaces/{id}",
    tag = "Workspaces",
    request_body = UpdateWorkspacePayload,
    responses(
        (status = 200, description = "Workspace atualizado", body = Workspace),
        (status = 404, description = "Workspace não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do workspace")),
    security(("api_jwt" = []))
)]
pub async fn update_workspace(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkspacePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let workspace = app_state
        .workspace_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(workspace))
}

// POST /api/workspaces/{id}/default
#[utoipa::path(
    post,
    path = "/api/workspaces/{id}/default",
    tag = "Workspaces",
    responses(
        (status = 200, description = "Workspace marcado como padrão", body = Workspace),
        (status = 404, description = "Workspace não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do workspace")),
    security(("api_jwt" = []))
)]
pub async fn set_default_workspace(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let workspace = app_state
        .workspace_service
        .set_default(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(workspace))
}

// =============================================================================
//  FEATURE FLAGS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/feature-flags",
    tag = "Feature Flags",
    responses((status = 200, description = "Flags cadastradas", body = Vec<FeatureFlag>)),
    security(("api_jwt" = []))
)]
pub async fn list_flags(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let flags = app_state
        .workspace_service
        .list_flags()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(flags))
}

#[utoipa::path(
    post,
    path = "/api/feature-flags",
    tag = "Feature Flags",
    request_body = CreateFeatureFlagPayload,
    responses(
        (status = 201, description = "Flag criada", body = FeatureFlag),
        (status = 409, description = "Chave já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_flag(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Json(payload): Json<CreateFeatureFlagPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let flag = app_state
        .workspace_service
        .create_flag(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(flag)))
}

#[utoipa::path(
    put,
    path = "/api/feature-flags/{chave}",
    tag = "Feature Flags",
    request_body = UpdateFeatureFlagPayload,
    responses(
        (status = 200, description = "Flag atualizada", body = FeatureFlag),
        (status = 404, description = "Flag não encontrada")
    ),
    params(("chave" = String, Path, description = "Chave da flag")),
    security(("api_jwt" = []))
)]
pub async fn update_flag(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(chave): Path<String>,
    Json(payload): Json<UpdateFeatureFlagPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let flag = app_state
        .workspace_service
        .update_flag(&chave, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(flag))
}

#[utoipa::path(
    delete,
    path = "/api/feature-flags/{chave}",
    tag = "Feature Flags",
    responses(
        (status = 204, description = "Flag removida"),
        (status = 404, description = "Flag não encontrada")
    ),
    params(("chave" = String, Path, description = "Chave da flag")),
    security(("api_jwt" = []))
)]
pub async fn delete_flag(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(chave): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .workspace_service
        .delete_flag(&chave)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/feature-flags/{chave}/evaluate
// Qualquer usuário logado pode perguntar por uma flag.
#[utoipa::path(
    get,
    path = "/api/feature-flags/{chave}/evaluate",
    tag = "Feature Flags",
    responses((status = 200, description = "Resultado da flag para o usuário logado", body = FlagEvaluation)),
    params(("chave" = String, Path, description = "Chave da flag")),
    security(("api_jwt" = []))
)]
pub async fn evaluate_flag(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(chave): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let evaluation = app_state
        .workspace_service
        .evaluate(&chave, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(evaluation))
}
