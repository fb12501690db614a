// src/db/supplier_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::supplier::{
        CreateSupplierPayload, Supplier, SupplierEvaluation, SupplierFilter, SupplierHistoryEntry,
        SupplierStatus, UpdateSupplierPayload,
    },
};

const SUPPLIER_COLUMNS: &str = "id, razao_social, nome_fantasia, cnpj, email, telefone, categoria, \
     endereco, observacoes, status, nota_media, created_at, updated_at";

/// `%termo%` para ILIKE, com os curingas do próprio termo escapados.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
pub struct SupplierRepository {
    pool: PgPool,
}

impl SupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lista com busca por nome/CNPJ e filtro de situação.
    pub async fn list(&self, filter: &SupplierFilter) -> Result<Vec<Supplier>, AppError> {
        let pattern = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(contains_pattern);

        // Pontuação do CNPJ não atrapalha a busca
        let digits = filter
            .q
            .as_deref()
            .map(|q| q.chars().filter(char::is_ascii_digit).collect::<String>())
            .filter(|d| !d.is_empty())
            .map(|d| format!("%{d}%"));

        let rows = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            SELECT {SUPPLIER_COLUMNS}
            FROM fornecedores
            WHERE ($1::text IS NULL
                   OR razao_social ILIKE $1
                   OR nome_fantasia ILIKE $1
                   OR ($2::text IS NOT NULL AND cnpj LIKE $2))
              AND ($3::supplier_status IS NULL OR status = $3)
            ORDER BY razao_social
            "#
        ))
        .bind(pattern)
        .bind(digits)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM fornecedores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("supplier"))
    }

    pub async fn find_many<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM fornecedores WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateSupplierPayload,
        cnpj: &str,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO fornecedores
                (razao_social, nome_fantasia, cnpj, email, telefone, categoria, endereco, observacoes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(&input.razao_social)
        .bind(&input.nome_fantasia)
        .bind(cnpj)
        .bind(&input.email)
        .bind(&input.telefone)
        .bind(&input.categoria)
        .bind(&input.endereco)
        .bind(&input.observacoes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, format!("CNPJ {cnpj}")))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, input: &UpdateSupplierPayload) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE fornecedores
            SET razao_social = COALESCE($2, razao_social),
                nome_fantasia = COALESCE($3, nome_fantasia),
                email = COALESCE($4, email),
                telefone = COALESCE($5, telefone),
                categoria = COALESCE($6, categoria),
                endereco = COALESCE($7, endereco),
                observacoes = COALESCE($8, observacoes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.razao_social)
        .bind(&input.nome_fantasia)
        .bind(&input.email)
        .bind(&input.telefone)
        .bind(&input.categoria)
        .bind(&input.endereco)
        .bind(&input.observacoes)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("supplier"))
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: SupplierStatus) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(&format!(
            "UPDATE fornecedores SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("supplier"))
    }

    // =========================================================================
    //  HISTÓRICO
    // =========================================================================

    pub async fn record_history<'e, E>(
        &self,
        executor: E,
        fornecedor_id: Uuid,
        acao: &str,
        detalhes: Value,
        user_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO historico_acao_fornecedor (fornecedor_id, acao, detalhes, user_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(fornecedor_id)
        .bind(acao)
        .bind(detalhes)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn history(&self, fornecedor_id: Uuid) -> Result<Vec<SupplierHistoryEntry>, AppError> {
        let rows = sqlx::query_as::<_, SupplierHistoryEntry>(
            r#"
            SELECT id, fornecedor_id, acao, detalhes, user_id, created_at
            FROM historico_acao_fornecedor
            WHERE fornecedor_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(fornecedor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    //  AVALIAÇÕES
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_evaluation<'e, E>(
        &self,
        executor: E,
        fornecedor_id: Uuid,
        pedido_id: Option<Uuid>,
        respostas_positivas: i32,
        problema_critico: bool,
        nota: i32,
        comentario: Option<&str>,
        avaliado_por: Uuid,
    ) -> Result<SupplierEvaluation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SupplierEvaluation>(
            r#"
            INSERT INTO avaliacoes_fornecedor
                (fornecedor_id, pedido_id, respostas_positivas, problema_critico, nota, comentario, avaliado_por)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, fornecedor_id, pedido_id, respostas_positivas, problema_critico,
                      nota, comentario, avaliado_por, created_at
            "#,
        )
        .bind(fornecedor_id)
        .bind(pedido_id)
        .bind(respostas_positivas)
        .bind(problema_critico)
        .bind(nota)
        .bind(comentario)
        .bind(avaliado_por)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound("order");
                }
            }
            e.into()
        })
    }

    /// Recalcula `nota_media` a partir de todas as avaliações.
    pub async fn refresh_average<'e, E>(&self, executor: E, fornecedor_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE fornecedores
            SET nota_media = (
                    SELECT ROUND(AVG(nota)::numeric, 2)
                    FROM avaliacoes_fornecedor
                    WHERE fornecedor_id = $1
                ),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(fornecedor_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn evaluations(&self, fornecedor_id: Uuid) -> Result<Vec<SupplierEvaluation>, AppError> {
        let rows = sqlx::query_as::<_, SupplierEvaluation>(
            r#"
            SELECT id, fornecedor_id, pedido_id, respostas_positivas, problema_critico,
                   nota, comentario, avaliado_por, created_at
            FROM avaliacoes_fornecedor
            WHERE fornecedor_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(fornecedor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_term_is_wrapped_for_substring_match() {
        assert_eq!(contains_pattern("papelaria"), "%papelaria%");
    }

    #[test]
    fn wildcards_in_search_term_are_literal() {
        assert_eq!(contains_pattern("_"), "%\\_%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
