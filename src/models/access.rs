// src/models/access.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::auth::UserRole;

pub(crate) fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let ok = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !ok {
        let mut err = ValidationError::new("slug_format");
        err.message = Some("slug_format".into());
        return Err(err);
    }
    Ok(())
}

// =============================================================================
//  MÓDULOS
// =============================================================================

// O que sai do banco (Tabela modules)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,
    #[schema(example = "fornecedores")]
    pub slug: String,
    #[schema(example = "Fornecedores")]
    pub nome: String,
    #[schema(example = "Cadastro e qualificação de fornecedores")]
    pub descricao: Option<String>,
    #[schema(example = "cadastros")]
    pub categoria: String,
    pub ativo: bool,
    #[schema(example = 10)]
    pub ordem: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateModulePayload {
    #[validate(custom(function = "validate_slug"))]
    #[schema(example = "contratos")]
    pub slug: String,
    #[validate(length(min = 2, message = "name_too_short"))]
    #[schema(example = "Contratos")]
    pub nome: String,
    pub descricao: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "cadastros")]
    pub categoria: String,
    #[serde(default)]
    pub ordem: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModulePayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub categoria: Option<String>,
    pub ativo: Option<bool>,
    pub ordem: Option<i32>,
}

// =============================================================================
//  PERMISSÕES POR PERFIL
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModulePermission {
    pub id: Uuid,
    pub role: UserRole,
    pub module_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TogglePermissionPayload {
    pub role: UserRole,
    pub module_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PermissionChange {
    Granted,
    Revoked,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResult {
    pub role: UserRole,
    pub module_id: Uuid,
    pub change: PermissionChange,
}

/// A matriz que a tela de permissões desenha: perfil -> módulos.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionMatrix {
    pub modules: Vec<Module>,
    #[schema(value_type = Object)]
    pub grants: BTreeMap<String, Vec<Uuid>>,
}

// =============================================================================
//  TEMPLATES DE PERFIL
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleTemplate {
    pub id: Uuid,
    #[schema(example = "Comprador Júnior")]
    pub nome: String,
    pub descricao: Option<String>,
    pub role: UserRole,
    #[schema(example = json!(["fornecedores", "requisicoes", "pedidos"]))]
    pub module_slugs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleTemplatePayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub nome: String,
    pub descricao: Option<String>,
    pub role: UserRole,
    #[schema(example = json!(["fornecedores", "requisicoes"]))]
    pub module_slugs: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTemplatePayload {
    pub user_id: Uuid,
}

// =============================================================================
//  ADMINISTRAÇÃO DE PERFIS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    pub role: Option<UserRole>,
    pub ativo: Option<bool>,
}

// =============================================================================
//  AÇÕES EM LOTE (disparo_acao_lote)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "batch_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BatchAction {
    AlterarRole,
    AplicarTemplate,
    Ativar,
    Desativar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "batch_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Concluido,
    Interrompido,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchActionPayload {
    pub acao: BatchAction,
    #[validate(length(min = 1, message = "at_least_one"))]
    pub user_ids: Vec<Uuid>,
    pub role: Option<UserRole>,
    pub template_id: Option<Uuid>,
}

/// O que cada iteração do laço faz com um usuário.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    SetRole(UserRole),
    ApplyTemplate(Uuid),
    SetActive(bool),
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchDispatch {
    pub id: Uuid,
    pub acao: BatchAction,
    pub user_ids: Vec<Uuid>,
    pub processados: i32,
    pub status: BatchStatus,
    pub erro: Option<String>,
    pub executado_por: Uuid,
    pub iniciado_em: DateTime<Utc>,
    pub finalizado_em: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub dispatch_id: Uuid,
    pub status: BatchStatus,
    pub processed: Vec<Uuid>,
    pub failed_user_id: Option<Uuid>,
    pub error: Option<String>,
}
