// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{ModPedidos, RequireModule},
    },
    services::document_service::order_label,
};

// GET /api/orders/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/orders/{id}/pdf",
    tag = "Orders",
    responses(
        (status = 200, description = "PDF do pedido de compra", content_type = "application/pdf"),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn generate_order_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModPedidos>,
    Path(order_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (numero, pdf_bytes) = app_state
        .document_service
        .generate_order_pdf(&app_state.db_pool, order_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let disposition = format!("attachment; filename=\"{}.pdf\"", order_label(numero));
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}
