// src/db/order_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        order::{OrderFilter, OrderStatus, PurchaseOrder, PurchaseOrderItem},
        requisition::ItemInput,
    },
};

const ORDER_COLUMNS: &str = "id, numero, fornecedor_id, requisicao_id, comprador_id, status, total, \
     previsao_entrega, condicao_pagamento, observacoes, emitido_em, recebido_em, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, pedido_id, descricao, quantidade, unidade, preco_unitario";

/// Dados do cabeçalho de um pedido novo.
pub struct NewOrder<'a> {
    pub fornecedor_id: Uuid,
    pub requisicao_id: Option<Uuid>,
    pub comprador_id: Uuid,
    pub previsao_entrega: Option<NaiveDate>,
    pub condicao_pagamento: Option<&'a str>,
    pub observacoes: Option<&'a str>,
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<PurchaseOrder>, AppError> {
        let rows = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM pedidos
            WHERE ($1::order_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR fornecedor_id = $2)
            ORDER BY numero DESC
            "#
        ))
        .bind(filter.status)
        .bind(filter.fornecedor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_all(&self) -> Result<Vec<PurchaseOrder>, AppError> {
        let rows = sqlx::query_as::<_, PurchaseOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM pedidos ORDER BY numero"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PurchaseOrder>(&format!("SELECT {ORDER_COLUMNS} FROM pedidos WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ResourceNotFound("order"))
    }

    pub async fn find_for_update(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<PurchaseOrder, AppError> {
        sqlx::query_as::<_, PurchaseOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM pedidos WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::ResourceNotFound("order"))
    }

    pub async fn items<'e, E>(&self, executor: E, pedido_id: Uuid) -> Result<Vec<PurchaseOrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, PurchaseOrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM pedido_itens WHERE pedido_id = $1 ORDER BY ordem"
        ))
        .bind(pedido_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Insere o cabeçalho. O `numero` vem da sequência do banco.
    pub async fn create(&self, tx: &mut Transaction<'_, Postgres>, order: &NewOrder<'_>) -> Result<PurchaseOrder, AppError> {
        sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            INSERT INTO pedidos
                (fornecedor_id, requisicao_id, comprador_id, previsao_entrega, condicao_pagamento, observacoes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.fornecedor_id)
        .bind(order.requisicao_id)
        .bind(order.comprador_id)
        .bind(order.previsao_entrega)
        .bind(order.condicao_pagamento)
        .bind(order.observacoes)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound("supplier");
                }
            }
            e.into()
        })
    }

    /// Acrescenta itens depois dos que já existem.
    pub async fn append_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pedido_id: Uuid,
        itens: &[ItemInput],
    ) -> Result<(), AppError> {
        let (start,): (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(ordem) + 1, 0) FROM pedido_itens WHERE pedido_id = $1")
                .bind(pedido_id)
                .fetch_one(&mut **tx)
                .await?;

        for (offset, item) in itens.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO pedido_itens (pedido_id, ordem, descricao, quantidade, unidade, preco_unitario)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(pedido_id)
            .bind(start + offset as i32)
            .bind(&item.descricao)
            .bind(item.quantidade)
            .bind(&item.unidade)
            .bind(item.preco)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Total = Σ quantidade × preço unitário dos itens atuais.
    pub async fn recalculate_total<'e, E>(&self, executor: E, pedido_id: Uuid) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            UPDATE pedidos
            SET total = (
                    SELECT COALESCE(SUM(quantidade * preco_unitario), 0)
                    FROM pedido_itens
                    WHERE pedido_id = $1
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(pedido_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("order"))
    }

    /// Troca a situação, carimbando emissão e recebimento.
    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: OrderStatus) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            UPDATE pedidos
            SET status = $2,
                emitido_em = CASE WHEN $2 = 'emitido'::order_status THEN NOW() ELSE emitido_em END,
                recebido_em = CASE WHEN $2 = 'recebido'::order_status THEN NOW() ELSE recebido_em END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("order"))
    }
}
