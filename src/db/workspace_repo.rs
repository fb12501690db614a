// src/db/workspace_repo.rs

use sqlx::{PgPool, Postgres, Executor};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::workspace::{
        CreateFeatureFlagPayload, CreateWorkspacePayload, FeatureFlag, UpdateFeatureFlagPayload,
        UpdateWorkspacePayload, Workspace,
    },
};

const WORKSPACE_COLUMNS: &str =
    "id, nome, slug, descricao, modulos_habilitados, configuracoes, ativo, padrao, created_at, updated_at";
const FLAG_COLUMNS: &str =
    "id, chave, descricao, estrategia, percentual, usuarios_permitidos, workspace_id, created_at, updated_at";

#[derive(Clone)]
pub struct WorkspaceRepository {
    pool: PgPool,
}

impl WorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  WORKSPACES
    // =========================================================================

    pub async fn list(&self) -> Result<Vec<Workspace>, AppError> {
        let rows = sqlx::query_as::<_, Workspace>(&format!(
            "SELECT {WORKSPACE_COLUMNS} FROM workspaces ORDER BY padrao DESC, nome"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// O workspace marcado como padrão, se houver um ativo.
    pub async fn find_default(&self) -> Result<Option<Workspace>, AppError> {
        let row = sqlx::query_as::<_, Workspace>(&format!(
            "SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE padrao = true AND ativo = true"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create(&self, input: &CreateWorkspacePayload) -> Result<Workspace, AppError> {
        sqlx::query_as::<_, Workspace>(&format!(
            r#"
            INSERT INTO workspaces (nome, slug, descricao, modulos_habilitados, configuracoes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {WORKSPACE_COLUMNS}
            "#
        ))
        .bind(&input.nome)
        .bind(&input.slug)
        .bind(&input.descricao)
        .bind(&input.modulos_habilitados)
        .bind(&input.configuracoes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, format!("workspace '{}'", input.slug)))
    }

    pub async fn update(&self, id: Uuid, input: &UpdateWorkspacePayload) -> Result<Workspace, AppError> {
        sqlx::query_as::<_, Workspace>(&format!(
            r#"
            UPDATE workspaces
            SET nome = COALESCE($2, nome),
                descricao = COALESCE($3, descricao),
                modulos_habilitados = COALESCE($4, modulos_habilitados),
                configuracoes = COALESCE($5, configuracoes),
                ativo = COALESCE($6, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {WORKSPACE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.nome)
        .bind(&input.descricao)
        .bind(&input.modulos_habilitados)
        .bind(&input.configuracoes)
        .bind(input.ativo)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ResourceNotFound("workspace"))
    }

    pub async fn clear_default<'e, E>(&self, executor: E) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE workspaces SET padrao = false WHERE padrao = true")
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn set_default<'e, E>(&self, executor: E, id: Uuid) -> Result<Workspace, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Workspace>(&format!(
            "UPDATE workspaces SET padrao = true, updated_at = NOW() WHERE id = $1 RETURNING {WORKSPACE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("workspace"))
    }

    // =========================================================================
    //  FEATURE FLAGS
    // =========================================================================

    pub async fn list_flags(&self) -> Result<Vec<FeatureFlag>, AppError> {
        let rows = sqlx::query_as::<_, FeatureFlag>(&format!(
            "SELECT {FLAG_COLUMNS} FROM feature_flags ORDER BY chave"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_flag(&self, chave: &str) -> Result<Option<FeatureFlag>, AppError> {
        let row = sqlx::query_as::<_, FeatureFlag>(&format!(
            "SELECT {FLAG_COLUMNS} FROM feature_flags WHERE chave = $1"
        ))
        .bind(chave)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create_flag(&self, input: &CreateFeatureFlagPayload) -> Result<FeatureFlag, AppError> {
        sqlx::query_as::<_, FeatureFlag>(&format!(
            r#"
            INSERT INTO feature_flags (chave, descricao, estrategia, percentual, usuarios_permitidos, workspace_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FLAG_COLUMNS}
            "#
        ))
        .bind(&input.chave)
        .bind(&input.descricao)
        .bind(input.estrategia)
        .bind(input.percentual)
        .bind(&input.usuarios_permitidos)
        .bind(input.workspace_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, format!("flag '{}'", input.chave)))
    }

    pub async fn update_flag(&self, chave: &str, input: &UpdateFeatureFlagPayload) -> Result<FeatureFlag, AppError> {
        sqlx::query_as::<_, FeatureFlag>(&format!(
            r#"
            UPDATE feature_flags
            SET descricao = COALESCE($2, descricao),
                estrategia = COALESCE($3, estrategia),
                percentual = COALESCE($4, percentual),
                usuarios_permitidos = COALESCE($5, usuarios_permitidos),
                updated_at = NOW()
            WHERE chave = $1
            RETURNING {FLAG_COLUMNS}
            "#
        ))
        .bind(chave)
        .bind(&input.descricao)
        .bind(input.estrategia)
        .bind(input.percentual)
        .bind(&input.usuarios_permitidos)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ResourceNotFound("feature_flag"))
    }

    pub async fn delete_flag(&self, chave: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM feature_flags WHERE chave = $1")
            .bind(chave)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("feature_flag"));
        }
        Ok(())
    }
}
