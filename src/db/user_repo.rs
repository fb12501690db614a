// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Profile, User, UserRole},
};

// O repositório de usuários: tabelas 'users' (credenciais) e 'profiles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // Cria um novo usuário no banco de dados
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    // =========================================================================
    //  PERFIS
    // =========================================================================

    /// Trava a tabela de perfis até o fim da transação, para que dois
    /// cadastros simultâneos não se vejam como "o primeiro".
    pub async fn lock_profiles<'e, E>(&self, executor: E) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("LOCK TABLE profiles IN SHARE ROW EXCLUSIVE MODE")
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn count_profiles<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles")
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        nome: &str,
        email: &str,
        role: UserRole,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, nome, email, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, nome, email, role, ativo, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(nome)
        .bind(email)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(profile)
    }

    pub async fn find_profile<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, nome, email, role, ativo, created_at, updated_at FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(profile)
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, nome, email, role, ativo, created_at, updated_at FROM profiles ORDER BY nome ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    /// Atualiza papel e/ou situação. Campos `None` ficam como estão.
    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role: Option<UserRole>,
        ativo: Option<bool>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET role = COALESCE($2, role),
                ativo = COALESCE($3, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, nome, email, role, ativo, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(role)
        .bind(ativo)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("profile"))
    }
}
