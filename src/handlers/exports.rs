// src/handlers/exports.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{ModRelatorios, RequireModule},
    },
    services::export_service::ExportKind,
};

// GET /api/exports/{file}
#[utoipa::path(
    get,
    path = "/api/exports/{file}",
    tag = "Reports",
    responses(
        (status = 200, description = "Planilha CSV (UTF-8 com BOM)", content_type = "text/csv"),
        (status = 400, description = "Exportação desconhecida")
    ),
    params(("file" = String, Path, description = "suppliers.csv, requisitions.csv ou orders.csv")),
    security(("api_jwt" = []))
)]
pub async fn export_csv(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireModule<ModRelatorios>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let kind = ExportKind::from_file_name(&file).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let csv = app_state
        .export_service
        .export(kind)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let disposition = format!("attachment; filename=\"{}\"", kind.file_name(Utc::now().date_naive()));
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, csv).into_response())
}
