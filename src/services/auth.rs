// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Profile, UserRole},
};

const TOKEN_TTL_DAYS: i64 = 7;

/// O primeiro perfil criado administra o sistema; os demais entram
/// apenas como leitores até um admin promovê-los.
pub fn initial_role(existing_profiles: i64) -> UserRole {
    if existing_profiles == 0 {
        UserRole::Admin
    } else {
        UserRole::Visualizador
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    pub async fn register_user(&self, email: &str, password: &str, nome: &str) -> Result<String, AppError> {
        // 1. Hashing fora da transação (não toca no banco)
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 2. Credenciais + perfil na mesma transação
        let mut tx = self.pool.begin().await?;

        let new_user = self.user_repo.create_user(&mut *tx, email, &hashed_password).await?;

        self.user_repo.lock_profiles(&mut *tx).await?;
        let existing = self.user_repo.count_profiles(&mut *tx).await?;
        let role = initial_role(existing);

        self.user_repo
            .create_profile(&mut *tx, new_user.id, nome, email, role)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %new_user.id, role = role.as_str(), "novo usuário registrado");

        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    /// Decodifica o token e carrega o perfil do dono.
    pub async fn validate_token(&self, token: &str) -> Result<Profile, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_profile(&self.pool, token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/suprimentos_test")
            .unwrap();
        AuthService::new(UserRepository::new(pool.clone()), "segredo-de-teste".into(), pool)
    }

    #[test]
    fn first_profile_becomes_admin() {
        assert_eq!(initial_role(0), UserRole::Admin);
        assert_eq!(initial_role(1), UserRole::Visualizador);
        assert_eq!(initial_role(42), UserRole::Visualizador);
    }

    #[tokio::test]
    async fn issued_token_carries_user_and_seven_day_expiry() {
        let svc = service();
        let user_id = Uuid::new_v4();

        let token = svc.create_token(user_id).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"segredo-de-teste"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.exp - data.claims.iat, 7 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_before_touching_the_database() {
        let svc = service();
        let err = svc.validate_token("nao.e.jwt").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let svc = service();
        let other = AuthService {
            jwt_secret: "outro".into(),
            ..svc.clone()
        };
        let token = other.create_token(Uuid::new_v4()).unwrap();

        assert!(matches!(svc.validate_token(&token).await, Err(AppError::InvalidToken)));
    }
}
