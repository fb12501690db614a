// src/handlers/requisitions.rs

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
        rbac::{ModAprovacoes, ModPedidos, ModRequisicoes, RequireModule},
    },
    models::{
        order::PurchaseOrder,
        requisition::{
            ConvertRequisitionPayload, CreateRequisitionPayload, RejectRequisitionPayload, Requisition,
            RequisitionDetail, RequisitionFilter, RequisitionStatus,
        },
    },
};

// GET /api/requisitions
#[utoipa::path(
    get,
    path = "/api/requisitions",
    tag = "Requisitions",
    params(RequisitionFilter),
    responses((status = 200, description = "Requisições filtradas", body = Vec<Requisition>)),
    security(("api_jwt" = []))
)]
pub async fn list_requisitions(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModRequisicoes>,
    user: AuthenticatedUser,
    Query(filter): Query<RequisitionFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let requisitions = app_state
        .requisition_service
        .list(&filter, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requisitions))
}

// POST /api/requisitions
#[utoipa::path(
    post,
    path = "/api/requisitions",
    tag = "Requisitions",
    request_body = CreateRequisitionPayload,
    responses(
        (status = 201, description = "Requisição criada (rascunho ou pendente)", body = RequisitionDetail),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_requisition(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModRequisicoes>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateRequisitionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_user_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let requisition = app_state
        .requisition_service
        .create(&mut *conn, &payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(requisition)))
}

// GET /api/requisitions/{id}
#[utoipa::path(
    get,
    path = "/api/requisitions/{id}",
    tag = "Requisitions",
    responses(
        (status = 200, description = "Requisição com itens", body = RequisitionDetail),
        (status = 404, description = "Requisição não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn get_requisition(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModRequisicoes>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let requisition = app_state
        .requisition_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requisition))
}

// Envio para aprovação e cancelamento compartilham o mesmo caminho.
async fn move_to(
    app_state: AppState,
    locale: Locale,
    user: AuthenticatedUser,
    id: Uuid,
    next: RequisitionStatus,
) -> Result<Json<Requisition>, ApiError> {
    let mut conn = get_user_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let requisition = app_state
        .requisition_service
        .transition(&mut *conn, id, next)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requisition))
}

// POST /api/requisitions/{id}/submit
#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/submit",
    tag = "Requisitions",
    responses(
        (status = 200, description = "Requisição enviada para aprovação", body = Requisition),
        (status = 422, description = "Transição de status inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn submit_requisition(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModRequisicoes>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    move_to(app_state, locale, user, id, RequisitionStatus::Pendente).await
}

// POST /api/requisitions/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/cancel",
    tag = "Requisitions",
    responses(
        (status = 200, description = "Requisição cancelada", body = Requisition),
        (status = 422, description = "Transição de status inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn cancel_requisition(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModRequisicoes>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    move_to(app_state, locale, user, id, RequisitionStatus::Cancelada).await
}

// POST /api/requisitions/{id}/approve
#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/approve",
    tag = "Requisitions",
    responses(
        (status = 200, description = "Requisição aprovada", body = Requisition),
        (status = 403, description = "Sem acesso ao módulo de aprovações"),
        (status = 422, description = "Transição de status inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn approve_requisition(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModAprovacoes>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_user_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let requisition = app_state
        .requisition_service
        .approve(&mut *conn, id, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requisition))
}

// POST /api/requisitions/{id}/reject
#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/reject",
    tag = "Requisitions",
    request_body = RejectRequisitionPayload,
    responses(
        (status = 200, description = "Requisição rejeitada", body = Requisition),
        (status = 400, description = "Motivo ausente"),
        (status = 422, description = "Transição de status inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn reject_requisition(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModAprovacoes>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequisitionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_user_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let requisition = app_state
        .requisition_service
        .reject(&mut *conn, id, &payload.motivo, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requisition))
}

// POST /api/requisitions/{id}/convert
#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/convert",
    tag = "Requisitions",
    request_body = ConvertRequisitionPayload,
    responses(
        (status = 201, description = "Pedido de compra gerado a partir da requisição", body = PurchaseOrder),
        (status = 422, description = "Requisição não aprovada ou fornecedor não qualificado")
    ),
    params(("id" = Uuid, Path, description = "ID da requisição")),
    security(("api_jwt" = []))
)]
pub async fn convert_requisition(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModPedidos>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConvertRequisitionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_user_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .requisition_service
        .convert_to_order(&mut *conn, id, payload.fornecedor_id, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order)))
}
