// src/db/messaging_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::messaging::{Conversation, ConversationSummary, Message},
};

const CONVERSATION_COLUMNS: &str = "id, assunto, fornecedor_id, pedido_id, criado_por, created_at, ultima_mensagem_em";

#[derive(Clone)]
pub struct MessagingRepository {
    pool: PgPool,
}

impl MessagingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_conversation<'e, E>(
        &self,
        executor: E,
        assunto: &str,
        fornecedor_id: Option<Uuid>,
        pedido_id: Option<Uuid>,
        criado_por: Uuid,
    ) -> Result<Conversation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Conversation>(&format!(
            r#"
            INSERT INTO conversas (assunto, fornecedor_id, pedido_id, criado_por)
            VALUES ($1, $2, $3, $4)
            RETURNING {CONVERSATION_COLUMNS}
            "#
        ))
        .bind(assunto)
        .bind(fornecedor_id)
        .bind(pedido_id)
        .bind(criado_por)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound("conversation");
                }
            }
            e.into()
        })
    }

    pub async fn add_participants<'e, E>(&self, executor: E, conversa_id: Uuid, user_ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO conversa_participantes (conversa_id, user_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(conversa_id)
        .bind(user_ids)
        .execute(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound("user");
                }
            }
            e.into()
        })?;

        Ok(())
    }

    pub async fn is_participant(&self, conversa_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM conversa_participantes WHERE conversa_id = $1 AND user_id = $2)",
        )
        .bind(conversa_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn conversation_exists(&self, conversa_id: Uuid) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM conversas WHERE id = $1)")
            .bind(conversa_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Caixa de entrada: conversas do usuário com as mensagens de outros
    /// autores ainda não lidas.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>, AppError> {
        let rows = sqlx::query_as::<_, ConversationSummary>(
            r#"
            SELECT c.id, c.assunto, c.fornecedor_id, c.pedido_id, c.criado_por, c.created_at,
                   c.ultima_mensagem_em,
                   (SELECT COUNT(*)
                      FROM mensagens m
                     WHERE m.conversa_id = c.id
                       AND m.autor_id <> $1
                       AND (cp.lida_em IS NULL OR m.created_at > cp.lida_em)) AS nao_lidas
            FROM conversas c
            JOIN conversa_participantes cp ON cp.conversa_id = c.id AND cp.user_id = $1
            ORDER BY COALESCE(c.ultima_mensagem_em, c.created_at) DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn messages(&self, conversa_id: Uuid) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversa_id, autor_id, conteudo, created_at
            FROM mensagens
            WHERE conversa_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversa_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn insert_message<'e, E>(
        &self,
        executor: E,
        conversa_id: Uuid,
        autor_id: Uuid,
        conteudo: &str,
    ) -> Result<Message, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let message = sqlx::query_as::<_, Message>(
            r#"
            WITH nova AS (
                INSERT INTO mensagens (conversa_id, autor_id, conteudo)
                VALUES ($1, $2, $3)
                RETURNING id, conversa_id, autor_id, conteudo, created_at
            ), toque AS (
                UPDATE conversas SET ultima_mensagem_em = (SELECT created_at FROM nova)
                WHERE id = $1
            )
            SELECT id, conversa_id, autor_id, conteudo, created_at FROM nova
            "#,
        )
        .bind(conversa_id)
        .bind(autor_id)
        .bind(conteudo)
        .fetch_one(executor)
        .await?;

        Ok(message)
    }

    pub async fn mark_read(&self, conversa_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE conversa_participantes SET lida_em = NOW() WHERE conversa_id = $1 AND user_id = $2",
        )
        .bind(conversa_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("conversation"));
        }
        Ok(())
    }
}
