// src/db/access_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::access::{
        BatchAction, BatchDispatch, BatchStatus, CreateModulePayload, CreateRoleTemplatePayload,
        Module, ModulePermission, RoleTemplate, UpdateModulePayload,
    },
    models::auth::UserRole,
};

const MODULE_COLUMNS: &str = "id, slug, nome, descricao, categoria, ativo, ordem, created_at";
const TEMPLATE_COLUMNS: &str = "id, nome, descricao, role, module_slugs, created_at";
const DISPATCH_COLUMNS: &str =
    "id, acao, user_ids, processados, status, erro, executado_por, iniciado_em, finalizado_em";

#[derive(Clone)]
pub struct AccessRepository {
    pool: PgPool,
}

impl AccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MÓDULOS
    // =========================================================================

    pub async fn list_modules(&self) -> Result<Vec<Module>, AppError> {
        let modules = sqlx::query_as::<_, Module>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules ORDER BY ordem, slug"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    pub async fn create_module(&self, input: &CreateModulePayload) -> Result<Module, AppError> {
        sqlx::query_as::<_, Module>(&format!(
            r#"
            INSERT INTO modules (slug, nome, descricao, categoria, ordem)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MODULE_COLUMNS}
            "#
        ))
        .bind(&input.slug)
        .bind(&input.nome)
        .bind(&input.descricao)
        .bind(&input.categoria)
        .bind(input.ordem)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, format!("módulo '{}'", input.slug)))
    }

    /// Insere o módulo só se o slug ainda não existir. Devolve `true` se inseriu.
    pub async fn insert_module_if_missing(
        &self,
        slug: &str,
        nome: &str,
        descricao: &str,
        categoria: &str,
        ordem: i32,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO modules (slug, nome, descricao, categoria, ordem)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(slug)
        .bind(nome)
        .bind(descricao)
        .bind(categoria)
        .bind(ordem)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn update_module(&self, id: Uuid, input: &UpdateModulePayload) -> Result<Module, AppError> {
        sqlx::query_as::<_, Module>(&format!(
            r#"
            UPDATE modules
            SET nome = COALESCE($2, nome),
                descricao = COALESCE($3, descricao),
                categoria = COALESCE($4, categoria),
                ativo = COALESCE($5, ativo),
                ordem = COALESCE($6, ordem)
            WHERE id = $1
            RETURNING {MODULE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.nome)
        .bind(&input.descricao)
        .bind(&input.categoria)
        .bind(input.ativo)
        .bind(input.ordem)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ResourceNotFound("module"))
    }

    pub async fn delete_module(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("module"));
        }
        Ok(())
    }

    pub async fn find_modules_by_slugs<'e, E>(&self, executor: E, slugs: &[String]) -> Result<Vec<Module>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let modules = sqlx::query_as::<_, Module>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE slug = ANY($1)"
        ))
        .bind(slugs)
        .fetch_all(executor)
        .await?;

        Ok(modules)
    }

    // =========================================================================
    //  PERMISSÕES (module_permissions)
    // =========================================================================

    pub async fn list_permissions(&self) -> Result<Vec<ModulePermission>, AppError> {
        let rows = sqlx::query_as::<_, ModulePermission>(
            "SELECT id, role, module_id, created_at FROM module_permissions",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Remove o vínculo perfil/módulo. Devolve quantas linhas saíram (0 ou 1).
    pub async fn delete_permission<'e, E>(&self, executor: E, role: UserRole, module_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM module_permissions WHERE role = $1 AND module_id = $2")
            .bind(role)
            .bind(module_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_permission<'e, E>(&self, executor: E, role: UserRole, module_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO module_permissions (role, module_id)
            VALUES ($1, $2)
            ON CONFLICT (role, module_id) DO NOTHING
            "#,
        )
        .bind(role)
        .bind(module_id)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound("module");
                }
            }
            e.into()
        })?;

        Ok(())
    }

    /// Slugs dos módulos ativos liberados para um perfil.
    pub async fn role_module_slugs(&self, role: UserRole) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT m.slug
            FROM module_permissions mp
            JOIN modules m ON m.id = mp.module_id
            WHERE mp.role = $1 AND m.ativo = true
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(slug,)| slug).collect())
    }

    /// Slugs dos módulos ativos liberados diretamente para o usuário.
    pub async fn user_module_slugs(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT m.slug
            FROM user_module_permissions ump
            JOIN modules m ON m.id = ump.module_id
            WHERE ump.user_id = $1 AND m.ativo = true
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(slug,)| slug).collect())
    }

    pub async fn active_modules(&self) -> Result<Vec<Module>, AppError> {
        let modules = sqlx::query_as::<_, Module>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE ativo = true ORDER BY ordem, slug"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    pub async fn clear_user_modules<'e, E>(&self, executor: E, user_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM user_module_permissions WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    // Inserção em massa usando UNNEST
    pub async fn grant_user_modules<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        module_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_module_permissions (user_id, module_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(module_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    // =========================================================================
    //  TEMPLATES DE PERFIL
    // =========================================================================

    pub async fn list_templates(&self) -> Result<Vec<RoleTemplate>, AppError> {
        let templates = sqlx::query_as::<_, RoleTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM role_templates ORDER BY nome"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    pub async fn find_template<'e, E>(&self, executor: E, id: Uuid) -> Result<RoleTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RoleTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM role_templates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("template"))
    }

    pub async fn create_template(&self, input: &CreateRoleTemplatePayload) -> Result<RoleTemplate, AppError> {
        sqlx::query_as::<_, RoleTemplate>(&format!(
            r#"
            INSERT INTO role_templates (nome, descricao, role, module_slugs)
            VALUES ($1, $2, $3, $4)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(&input.nome)
        .bind(&input.descricao)
        .bind(input.role)
        .bind(&input.module_slugs)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, format!("template '{}'", input.nome)))
    }

    pub async fn delete_template(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM role_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("template"));
        }
        Ok(())
    }

    // =========================================================================
    //  DISPAROS EM LOTE (disparo_acao_lote)
    // =========================================================================

    pub async fn start_dispatch(
        &self,
        acao: BatchAction,
        user_ids: &[Uuid],
        executado_por: Uuid,
    ) -> Result<Uuid, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO disparo_acao_lote (acao, user_ids, processados, status, executado_por)
            VALUES ($1, $2, 0, 'interrompido', $3)
            RETURNING id
            "#,
        )
        .bind(acao)
        .bind(user_ids)
        .bind(executado_por)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn finish_dispatch(
        &self,
        id: Uuid,
        processados: i32,
        status: BatchStatus,
        erro: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE disparo_acao_lote
            SET processados = $2, status = $3, erro = $4, finalizado_em = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(processados)
        .bind(status)
        .bind(erro)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_dispatches(&self) -> Result<Vec<BatchDispatch>, AppError> {
        let rows = sqlx::query_as::<_, BatchDispatch>(&format!(
            "SELECT {DISPATCH_COLUMNS} FROM disparo_acao_lote ORDER BY iniciado_em DESC LIMIT 100"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
