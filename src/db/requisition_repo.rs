// src/db/requisition_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::requisition::{
        CreateRequisitionPayload, ItemInput, Requisition, RequisitionFilter, RequisitionItem,
        RequisitionStatus,
    },
};

const REQUISITION_COLUMNS: &str = "id, numero, solicitante_id, justificativa, centro_custo, prioridade, \
     status, necessario_em, total_estimado, aprovador_id, motivo_rejeicao, pedido_id, created_at, updated_at";

#[derive(Clone)]
pub struct RequisitionRepository {
    pool: PgPool,
}

impl RequisitionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &RequisitionFilter, user_id: Uuid) -> Result<Vec<Requisition>, AppError> {
        let solicitante = filter.minhas.then_some(user_id);

        let rows = sqlx::query_as::<_, Requisition>(&format!(
            r#"
            SELECT {REQUISITION_COLUMNS}
            FROM requisicoes
            WHERE ($1::requisition_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR solicitante_id = $2)
            ORDER BY numero DESC
            "#
        ))
        .bind(filter.status)
        .bind(solicitante)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Requisition>(&format!(
            "SELECT {REQUISITION_COLUMNS} FROM requisicoes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("requisition"))
    }

    /// Mesma busca, travando a linha até o fim da transação.
    pub async fn find_for_update(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Requisition, AppError> {
        sqlx::query_as::<_, Requisition>(&format!(
            "SELECT {REQUISITION_COLUMNS} FROM requisicoes WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::ResourceNotFound("requisition"))
    }

    pub async fn items<'e, E>(&self, executor: E, requisicao_id: Uuid) -> Result<Vec<RequisitionItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, RequisitionItem>(
            r#"
            SELECT id, requisicao_id, descricao, quantidade, unidade, preco_estimado
            FROM requisicao_itens
            WHERE requisicao_id = $1
            ORDER BY ordem
            "#,
        )
        .bind(requisicao_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Cabeçalho + itens, na mesma transação.
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        solicitante_id: Uuid,
        input: &CreateRequisitionPayload,
        status: RequisitionStatus,
        total: Decimal,
    ) -> Result<Requisition, AppError> {
        let requisition = sqlx::query_as::<_, Requisition>(&format!(
            r#"
            INSERT INTO requisicoes
                (solicitante_id, justificativa, centro_custo, prioridade, status, necessario_em, total_estimado)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {REQUISITION_COLUMNS}
            "#
        ))
        .bind(solicitante_id)
        .bind(&input.justificativa)
        .bind(&input.centro_custo)
        .bind(input.prioridade)
        .bind(status)
        .bind(input.necessario_em)
        .bind(total)
        .fetch_one(&mut **tx)
        .await?;

        self.insert_items(tx, requisition.id, &input.itens).await?;

        Ok(requisition)
    }

    async fn insert_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        requisicao_id: Uuid,
        itens: &[ItemInput],
    ) -> Result<(), AppError> {
        for (ordem, item) in itens.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO requisicao_itens (requisicao_id, ordem, descricao, quantidade, unidade, preco_estimado)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(requisicao_id)
            .bind(ordem as i32)
            .bind(&item.descricao)
            .bind(item.quantidade)
            .bind(&item.unidade)
            .bind(item.preco)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: RequisitionStatus) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Requisition>(&format!(
            "UPDATE requisicoes SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {REQUISITION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("requisition"))
    }

    /// Registra a decisão do aprovador (aprovada ou rejeitada).
    pub async fn record_decision<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: RequisitionStatus,
        aprovador_id: Uuid,
        motivo: Option<&str>,
    ) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Requisition>(&format!(
            r#"
            UPDATE requisicoes
            SET status = $2, aprovador_id = $3, motivo_rejeicao = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {REQUISITION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(aprovador_id)
        .bind(motivo)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("requisition"))
    }

    pub async fn mark_converted<'e, E>(&self, executor: E, id: Uuid, pedido_id: Uuid) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Requisition>(&format!(
            r#"
            UPDATE requisicoes
            SET status = 'convertida', pedido_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REQUISITION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(pedido_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("requisition"))
    }

    pub async fn list_all(&self) -> Result<Vec<Requisition>, AppError> {
        let rows = sqlx::query_as::<_, Requisition>(&format!(
            "SELECT {REQUISITION_COLUMNS} FROM requisicoes ORDER BY numero"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
