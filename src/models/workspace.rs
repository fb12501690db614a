// src/models/workspace.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::access::validate_slug;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    #[schema(example = "Matriz")]
    pub nome: String,
    #[schema(example = "matriz")]
    pub slug: String,
    pub descricao: Option<String>,
    #[schema(example = json!(["fornecedores", "pedidos"]))]
    pub modulos_habilitados: Vec<String>,
    #[schema(example = json!({"moeda": "BRL", "aprovacaoDupla": false}))]
    pub configuracoes: Value,
    pub ativo: bool,
    pub padrao: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspacePayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub nome: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    pub descricao: Option<String>,
    #[serde(default)]
    pub modulos_habilitados: Vec<String>,
    #[serde(default = "empty_object")]
    pub configuracoes: Value,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkspacePayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub modulos_habilitados: Option<Vec<String>>,
    pub configuracoes: Option<Value>,
    pub ativo: Option<bool>,
}

fn empty_object() -> Value {
    json!({})
}

// =============================================================================
//  FEATURE FLAGS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "flag_strategy", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FlagStrategy {
    /// Ligada para todos.
    Global,
    /// Ligada só para os usuários da lista.
    Lista,
    /// Liberação gradual por percentual de usuários.
    Percentual,
    Desabilitado,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlag {
    pub id: Uuid,
    #[schema(example = "novo_fluxo_aprovacao")]
    pub chave: String,
    pub descricao: Option<String>,
    pub estrategia: FlagStrategy,
    pub percentual: Option<i16>,
    pub usuarios_permitidos: Vec<Uuid>,
    pub workspace_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_percentage(value: i16) -> Result<(), validator::ValidationError> {
    if !(0..=100).contains(&value) {
        let mut err = validator::ValidationError::new("range");
        err.message = Some("percentage_range".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeatureFlagPayload {
    #[validate(custom(function = "validate_slug"))]
    pub chave: String,
    pub descricao: Option<String>,
    pub estrategia: FlagStrategy,
    #[validate(custom(function = "validate_percentage"))]
    pub percentual: Option<i16>,
    #[serde(default)]
    pub usuarios_permitidos: Vec<Uuid>,
    pub workspace_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeatureFlagPayload {
    pub descricao: Option<String>,
    pub estrategia: Option<FlagStrategy>,
    #[validate(custom(function = "validate_percentage"))]
    pub percentual: Option<i16>,
    pub usuarios_permitidos: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlagEvaluation {
    pub chave: String,
    pub enabled: bool,
    pub estrategia: FlagStrategy,
    pub motivo: String,
}
