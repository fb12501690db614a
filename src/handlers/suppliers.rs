// src/handlers/suppliers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_user_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{ModFornecedores, RequireModule},
    },
    models::supplier::{
        ChangeSupplierStatusPayload, CreateSupplierPayload, EvaluateSupplierPayload, Supplier, SupplierEvaluation,
        SupplierFilter, SupplierHistoryEntry, UpdateSupplierPayload,
    },
};

// GET /api/suppliers
#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Suppliers",
    params(SupplierFilter),
    responses(
        (status = 200, description = "Fornecedores filtrados", body = Vec<Supplier>),
        (status = 403, description = "Sem acesso ao módulo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModFornecedores>,
    Query(filter): Query<SupplierFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = app_state
        .supplier_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(suppliers))
}

// POST /api/suppliers
#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Suppliers",
    request_body = CreateSupplierPayload,
    responses(
        (status = 201, description = "Fornecedor cadastrado como pendente", body = Supplier),
        (status = 400, description = "Dados ou CNPJ inválidos"),
        (status = 409, description = "CNPJ já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModFornecedores>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_user_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let supplier = app_state
        .supplier_service
        .create(&mut *conn, &payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

// GET /api/suppliers/{id}
#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    responses(
        (status = 200, description = "Fornecedor", body = Supplier),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    security(("api_jwt" = []))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModFornecedores>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = app_state
        .supplier_service
        .get(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(supplier))
}

// PUT /api/suppliers/{id}
#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    request_body = UpdateSupplierPayload,
    responses(
        (status = 200, description = "Fornecedor atualizado", body = Supplier),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModFornecedores>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_user_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let supplier = app_state
        .supplier_service
        .update(&mut *conn, id, &payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(supplier))
}

// POST /api/suppliers/{id}/status
#[utoipa::path(
    post,
    path = "/api/suppliers/{id}/status",
    tag = "Suppliers",
    request_body = ChangeSupplierStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = Supplier),
        (status = 422, description = "Transição de status inválida")
    ),
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    security(("api_jwt" = []))
)]
pub async fn change_supplier_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModFornecedores>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeSupplierStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_user_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let supplier = app_state
        .supplier_service
        .change_status(&mut *conn, id, &payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(supplier))
}

// POST /api/suppliers/{id}/evaluations
#[utoipa::path(
    post,
    path = "/api/suppliers/{id}/evaluations",
    tag = "Suppliers",
    request_body = EvaluateSupplierPayload,
    responses(
        (status = 201, description = "Avaliação registrada, média recalculada", body = SupplierEvaluation),
        (status = 404, description = "Fornecedor ou pedido não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    security(("api_jwt" = []))
)]
pub async fn evaluate_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModFornecedores>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EvaluateSupplierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_user_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let evaluation = app_state
        .supplier_service
        .evaluate(&mut *conn, id, &payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(evaluation)))
}

// GET /api/suppliers/{id}/evaluations
#[utoipa::path(
    get,
    path = "/api/suppliers/{id}/evaluations",
    tag = "Suppliers",
    responses((status = 200, description = "Avaliações do fornecedor", body = Vec<SupplierEvaluation>)),
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    security(("api_jwt" = []))
)]
pub async fn list_evaluations(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModFornecedores>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let evaluations = app_state
        .supplier_service
        .evaluations(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(evaluations))
}

// GET /api/suppliers/{id}/history
#[utoipa::path(
    get,
    path = "/api/suppliers/{id}/history",
    tag = "Suppliers",
    responses((status = 200, description = "Histórico de ações do fornecedor", body = Vec<SupplierHistoryEntry>)),
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    security(("api_jwt" = []))
)]
pub async fn supplier_history(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModFornecedores>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = app_state
        .supplier_service
        .history(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(history))
}
