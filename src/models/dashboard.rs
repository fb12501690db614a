// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Quantos fornecedores em cada situação
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub total: i64,
}

// Os cards do topo do painel de compras
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub fornecedores_por_status: Vec<StatusCount>,
    pub requisicoes_pendentes: i64,
    pub pedidos_em_aberto: i64,
    pub valor_pedidos_em_aberto: Decimal,
    pub eventos_abertos: i64,
}
