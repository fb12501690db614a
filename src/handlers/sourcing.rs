// src/handlers/sourcing.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{ModSourcing, RequireModule},
    },
    models::sourcing::{
        AddCriterionPayload, AwardPayload, CreateSourcingEventPayload, EvaluationCriterion, InviteSuppliersPayload,
        Proposal, RankedProposal, ScoreProposalPayload, SourcingEvent, SourcingEventDetail, SourcingStatus,
        SubmitProposalPayload, TransitionSourcingPayload,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SourcingFilter {
    pub status: Option<SourcingStatus>,
}

// GET /api/sourcing/events
#[utoipa::path(
    get,
    path = "/api/sourcing/events",
    tag = "Sourcing",
    params(SourcingFilter),
    responses((status = 200, description = "Eventos de sourcing", body = Vec<SourcingEvent>)),
    security(("api_jwt" = []))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    Query(filter): Query<SourcingFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let events = app_state
        .sourcing_service
        .list_events(filter.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(events))
}

// POST /api/sourcing/events
#[utoipa::path(
    post,
    path = "/api/sourcing/events",
    tag = "Sourcing",
    request_body = CreateSourcingEventPayload,
    responses((status = 201, description = "Evento criado em rascunho", body = SourcingEvent)),
    security(("api_jwt" = []))
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateSourcingEventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let event = app_state
        .sourcing_service
        .create_event(&payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(event)))
}

// GET /api/sourcing/events/{id}
#[utoipa::path(
    get,
    path = "/api/sourcing/events/{id}",
    tag = "Sourcing",
    responses(
        (status = 200, description = "Evento com convites, critérios e propostas", body = SourcingEventDetail),
        (status = 404, description = "Evento não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn get_event(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .sourcing_service
        .get_event(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(event))
}

// POST /api/sourcing/events/{id}/status
#[utoipa::path(
    post,
    path = "/api/sourcing/events/{id}/status",
    tag = "Sourcing",
    request_body = TransitionSourcingPayload,
    responses(
        (status = 200, description = "Status do evento alterado", body = SourcingEvent),
        (status = 422, description = "Transição de status inválida")
    ),
    params(("id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn transition_event(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionSourcingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .sourcing_service
        .transition(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(event))
}

// POST /api/sourcing/events/{id}/invitations
#[utoipa::path(
    post,
    path = "/api/sourcing/events/{id}/invitations",
    tag = "Sourcing",
    request_body = InviteSuppliersPayload,
    responses(
        (status = 200, description = "Fornecedores convidados", body = SourcingEventDetail),
        (status = 422, description = "Fornecedor não qualificado ou evento encerrado")
    ),
    params(("id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn invite_suppliers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InviteSuppliersPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let event = app_state
        .sourcing_service
        .invite(id, &payload.fornecedor_ids)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(event))
}

// POST /api/sourcing/events/{id}/proposals
#[utoipa::path(
    post,
    path = "/api/sourcing/events/{id}/proposals",
    tag = "Sourcing",
    request_body = SubmitProposalPayload,
    responses(
        (status = 201, description = "Proposta registrada (reenvio substitui a anterior)", body = Proposal),
        (status = 422, description = "Evento fechado para propostas ou fornecedor não convidado")
    ),
    params(("id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn submit_proposal(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitProposalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let proposal = app_state
        .sourcing_service
        .submit_proposal(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(proposal)))
}

// POST /api/sourcing/events/{id}/criteria
#[utoipa::path(
    post,
    path = "/api/sourcing/events/{id}/criteria",
    tag = "Sourcing",
    request_body = AddCriterionPayload,
    responses(
        (status = 201, description = "Critério adicionado", body = EvaluationCriterion),
        (status = 409, description = "Critério já existe no evento")
    ),
    params(("id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn add_criterion(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddCriterionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let criterion = app_state
        .sourcing_service
        .add_criterion(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(criterion)))
}

// POST /api/sourcing/events/{id}/proposals/{proposta_id}/scores
#[utoipa::path(
    post,
    path = "/api/sourcing/events/{id}/proposals/{proposta_id}/scores",
    tag = "Sourcing",
    request_body = ScoreProposalPayload,
    responses(
        (status = 200, description = "Notas salvas, ranking atualizado", body = Vec<RankedProposal>),
        (status = 422, description = "Evento fora de avaliação ou critério de outro evento")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do evento"),
        ("proposta_id" = Uuid, Path, description = "ID da proposta")
    ),
    security(("api_jwt" = []))
)]
pub async fn score_proposal(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    user: AuthenticatedUser,
    Path((id, proposta_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ScoreProposalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let ranking = app_state
        .sourcing_service
        .score_proposal(id, proposta_id, &payload.notas, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ranking))
}

// GET /api/sourcing/events/{id}/ranking
#[utoipa::path(
    get,
    path = "/api/sourcing/events/{id}/ranking",
    tag = "Sourcing",
    responses((status = 200, description = "Propostas ordenadas pela nota ponderada", body = Vec<RankedProposal>)),
    params(("id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn ranking(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ranking = app_state
        .sourcing_service
        .ranking(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ranking))
}

// POST /api/sourcing/events/{id}/award
#[utoipa::path(
    post,
    path = "/api/sourcing/events/{id}/award",
    tag = "Sourcing",
    request_body = AwardPayload,
    responses(
        (status = 200, description = "Evento encerrado com a proposta vencedora", body = SourcingEvent),
        (status = 422, description = "Evento fora de avaliação")
    ),
    params(("id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn award_event(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModSourcing>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AwardPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .sourcing_service
        .award(id, payload.proposta_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(event))
}
