// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro interno. Cada variante carrega o mínimo necessário
// para montar a mensagem traduzida na borda da API.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Perfil inativo")]
    InactiveProfile,

    #[error("Acesso restrito a administradores")]
    AdminRequired,

    #[error("Sem acesso ao módulo {0}")]
    ModuleAccessDenied(String),

    // A string é a chave do recurso (ex: "supplier", "order")
    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // Regra de negócio violada. A string é a chave de tradução.
    #[error("Regra de negócio violada: {0}")]
    BusinessRule(&'static str),

    // Acesso negado por regra de negócio (ex: conversa de outros). Chave de tradução.
    #[error("Acesso negado: {0}")]
    Forbidden(&'static str),

    // Requisição malformada além do que o validator cobre. Chave de tradução.
    #[error("Requisição inválida: {0}")]
    BadRequest(&'static str),

    #[error("CNPJ inválido")]
    InvalidCnpj,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// O erro que efetivamente sai pela API, já traduzido.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    /// Converte o erro interno na resposta pública, traduzindo a mensagem
    /// para o idioma pedido pelo cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();

        match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => store.translate(lang, m),
                            None => store.translate(lang, &e.code),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: store.translate(lang, "validation_failed"),
                    details: Some(json!(details)),
                }
            }
            AppError::EmailAlreadyExists => {
                simple(StatusCode::CONFLICT, store.translate(lang, "email_already_exists"))
            }
            AppError::InvalidCredentials => {
                simple(StatusCode::UNAUTHORIZED, store.translate(lang, "invalid_credentials"))
            }
            AppError::InvalidToken => {
                simple(StatusCode::UNAUTHORIZED, store.translate(lang, "invalid_token"))
            }
            AppError::UserNotFound => {
                simple(StatusCode::NOT_FOUND, store.translate(lang, "user_not_found"))
            }
            AppError::InactiveProfile => {
                simple(StatusCode::FORBIDDEN, store.translate(lang, "inactive_profile"))
            }
            AppError::AdminRequired => {
                simple(StatusCode::FORBIDDEN, store.translate(lang, "admin_required"))
            }
            AppError::ModuleAccessDenied(slug) => simple(
                StatusCode::FORBIDDEN,
                store.translate_with(lang, "module_access_denied", &[slug.as_str()]),
            ),
            AppError::ResourceNotFound(resource) => {
                let resource_name = store.translate(lang, &format!("resource.{}", resource));
                simple(
                    StatusCode::NOT_FOUND,
                    store.translate_with(lang, "resource_not_found", &[resource_name.as_str()]),
                )
            }
            AppError::UniqueConstraintViolation(what) => simple(
                StatusCode::CONFLICT,
                store.translate_with(lang, "unique_violation", &[what.as_str()]),
            ),
            AppError::InvalidTransition { from, to } => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: store.translate_with(lang, "invalid_transition", &[from.as_str(), to.as_str()]),
                details: Some(json!({ "from": from, "to": to })),
            },
            AppError::BusinessRule(key) => {
                simple(StatusCode::UNPROCESSABLE_ENTITY, store.translate(lang, key))
            }
            AppError::Forbidden(key) => simple(StatusCode::FORBIDDEN, store.translate(lang, key)),
            AppError::BadRequest(key) => simple(StatusCode::BAD_REQUEST, store.translate(lang, key)),
            AppError::InvalidCnpj => {
                simple(StatusCode::BAD_REQUEST, store.translate(lang, "invalid_cnpj"))
            }

            // Todos os outros erros (banco, bcrypt, jwt, fontes, anyhow) viram 500.
            // O detalhe vai para o log, nunca para o cliente.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                simple(StatusCode::INTERNAL_SERVER_ERROR, store.translate(lang, "internal_error"))
            }
        }
    }

    /// Converte erros de unicidade do Postgres no nosso erro de conflito.
    pub fn from_unique(e: sqlx::Error, what: impl Into<String>) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation(what.into());
            }
        }
        e.into()
    }
}

fn simple(status: StatusCode, error: String) -> ApiError {
    ApiError { status, error, details: None }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 2, message = "name_too_short"))]
        nome: String,
    }

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn validation_errors_carry_translated_field_details() {
        let store = I18nStore::new();
        let err = Payload { nome: "a".into() }.validate().unwrap_err();

        let api = AppError::ValidationError(err).to_api_error(&pt(), &store);

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["nome"][0], "O nome deve ter no mínimo 2 caracteres.");
    }

    #[test]
    fn not_found_names_the_resource_in_the_requested_language() {
        let store = I18nStore::new();
        let api = AppError::ResourceNotFound("supplier")
            .to_api_error(&Locale("en".into()), &store);

        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Supplier not found.");
    }

    #[test]
    fn invalid_transition_is_unprocessable() {
        let store = I18nStore::new();
        let api = AppError::InvalidTransition { from: "recebido".into(), to: "emitido".into() }
            .to_api_error(&pt(), &store);

        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(api.error.contains("recebido"));
        assert_eq!(api.details.unwrap()["to"], "emitido");
    }

    #[test]
    fn internal_errors_hide_details() {
        let store = I18nStore::new();
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo do banco"))
            .to_api_error(&pt(), &store);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
    }
}
