// src/handlers/access.rs

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
    models::{
        access::{
            ApplyTemplatePayload, BatchActionPayload, BatchDispatch, BatchResult, CreateModulePayload,
            CreateRoleTemplatePayload, Module, PermissionMatrix, RoleTemplate, TogglePermissionPayload,
            ToggleResult, UpdateModulePayload, UpdateProfilePayload,
        },
        auth::Profile,
    },
};

// =============================================================================
//  1. MÓDULOS
// =============================================================================

// GET /api/access/modules
#[utoipa::path(
    get,
    path = "/api/access/modules",
    tag = "Access",
    responses(
        (status = 200, description = "Todos os módulos cadastrados", body = Vec<Module>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_modules(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let modules = app_state
        .access_service
        .list_modules()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(modules))
}

// POST /api/access/modules
#[utoipa::path(
    post,
    path = "/api/access/modules",
    tag = "Access",
    request_body = CreateModulePayload,
    responses(
        (status = 201, description = "Módulo criado", body = Module),
        (status = 409, description = "Slug já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_module(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Json(payload): Json<CreateModulePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let module = app_state
        .access_service
        .create_module(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(module)))
}

// PUT /api/access/modules/{id}
#[utoipa::path(
    put,
    path = "/api/access/modules/{id}",
    tag = "Access",
    request_body = UpdateModulePayload,
    responses(
        (status = 200, description = "Módulo atualizado", body = Module),
        (status = 404, description = "Módulo não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do módulo")),
    security(("api_jwt" = []))
)]
pub async fn update_module(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateModulePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let module = app_state
        .access_service
        .update_module(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(module))
}

// DELETE /api/access/modules/{id}
#[utoipa::path(
    delete,
    path = "/api/access/modules/{id}",
    tag = "Access",
    responses(
        (status = 204, description = "Módulo removido"),
        (status = 404, description = "Módulo não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do módulo")),
    security(("api_jwt" = []))
)]
pub async fn delete_module(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access_service
        .delete_module(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/access/me/modules
#[utoipa::path(
    get,
    path = "/api/access/me/modules",
    tag = "Access",
    responses(
        (status = 200, description = "Slugs dos módulos liberados para o usuário logado", body = Vec<String>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_modules(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let modules = app_state
        .access_service
        .effective_module_slugs(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(modules))
}

// =============================================================================
//  2. PERMISSÕES POR PERFIL
// =============================================================================

// GET /api/access/permissions
#[utoipa::path(
    get,
    path = "/api/access/permissions",
    tag = "Access",
    responses(
        (status = 200, description = "Matriz perfil x módulos", body = PermissionMatrix)
    ),
    security(("api_jwt" = []))
)]
pub async fn permission_matrix(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let matrix = app_state
        .access_service
        .permission_matrix()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(matrix))
}

// POST /api/access/permissions/toggle
#[utoipa::path(
    post,
    path = "/api/access/permissions/toggle",
    tag = "Access",
    request_body = TogglePermissionPayload,
    responses(
        (status = 200, description = "Permissão concedida ou revogada", body = ToggleResult),
        (status = 400, description = "O perfil admin não pode ser alterado")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_permission(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Json(payload): Json<TogglePermissionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .access_service
        .toggle_permission(payload.role, payload.module_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(result))
}

// =============================================================================
//  3. TEMPLATES DE PERFIL
// =============================================================================

// GET /api/access/templates
#[utoipa::path(
    get,
    path = "/api/access/templates",
    tag = "Access",
    responses((status = 200, description = "Templates de perfil", body = Vec<RoleTemplate>)),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let templates = app_state
        .access_service
        .list_templates()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(templates))
}

// POST /api/access/templates
#[utoipa::path(
    post,
    path = "/api/access/templates",
    tag = "Access",
    request_body = CreateRoleTemplatePayload,
    responses(
        (status = 201, description = "Template criado", body = RoleTemplate),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Json(payload): Json<CreateRoleTemplatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let template = app_state
        .access_service
        .create_template(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(template)))
}

// DELETE /api/access/templates/{id}
#[utoipa::path(
    delete,
    path = "/api/access/templates/{id}",
    tag = "Access",
    responses(
        (status = 204, description = "Template removido"),
        (status = 404, description = "Template não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do template")),
    security(("api_jwt" = []))
)]
pub async fn delete_template(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access_service
        .delete_template(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/access/templates/{id}/apply
#[utoipa::path(
    post,
    path = "/api/access/templates/{id}/apply",
    tag = "Access",
    request_body = ApplyTemplatePayload,
    responses(
        (status = 200, description = "Perfil do usuário após aplicar o template", body = Profile),
        (status = 404, description = "Template ou usuário não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do template")),
    security(("api_jwt" = []))
)]
pub async fn apply_template(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplyTemplatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .access_service
        .apply_role_template(id, payload.user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}

// =============================================================================
//  4. PERFIS
// =============================================================================

// GET /api/access/profiles
#[utoipa::path(
    get,
    path = "/api/access/profiles",
    tag = "Access",
    responses((status = 200, description = "Perfis cadastrados", body = Vec<Profile>)),
    security(("api_jwt" = []))
)]
pub async fn list_profiles(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let profiles = app_state
        .access_service
        .list_profiles()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profiles))
}

// PATCH /api/access/profiles/{id}
#[utoipa::path(
    patch,
    path = "/api/access/profiles/{id}",
    tag = "Access",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = Profile),
        (status = 404, description = "Perfil não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .access_service
        .update_profile(id, payload.role, payload.ativo)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}

// =============================================================================
//  5. AÇÕES EM LOTE
// =============================================================================

// POST /api/access/batch
#[utoipa::path(
    post,
    path = "/api/access/batch",
    tag = "Access",
    request_body = BatchActionPayload,
    responses(
        (status = 200, description = "Resultado do disparo (interrompe no primeiro erro)", body = BatchResult),
        (status = 400, description = "Parâmetros da ação ausentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn run_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    user: AuthenticatedUser,
    Json(payload): Json<BatchActionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .batch_service
        .dispatch(&app_state.access_service, &payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(result))
}

// GET /api/access/batch
#[utoipa::path(
    get,
    path = "/api/access/batch",
    tag = "Access",
    responses((status = 200, description = "Histórico de disparos", body = Vec<BatchDispatch>)),
    security(("api_jwt" = []))
)]
pub async fn batch_history(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let history = app_state
        .batch_service
        .history()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(history))
}
