// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{common::error::AppError, models::dashboard::StatusCount};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn suppliers_by_status(&self) -> Result<Vec<StatusCount>, AppError> {
        let rows = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status::text AS status, COUNT(*) AS total
            FROM fornecedores
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn pending_requisitions(&self) -> Result<i64, AppError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM requisicoes WHERE status = 'pendente'")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Pedidos emitidos ou confirmados: quantidade e valor somado.
    pub async fn open_orders(&self) -> Result<(i64, Decimal), AppError> {
        let row: (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total), 0)
            FROM pedidos
            WHERE status IN ('emitido', 'confirmado')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn open_sourcing_events(&self) -> Result<i64, AppError> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM eventos_sourcing WHERE status IN ('aberto', 'em_avaliacao')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
