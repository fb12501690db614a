// src/models/supplier.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

/// Ciclo de vida do fornecedor (cadastro -> análise -> qualificação).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "supplier_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    Pendente,
    EmAnalise,
    Qualificado,
    Reprovado,
    Bloqueado,
    Inativo,
}

impl SupplierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierStatus::Pendente => "pendente",
            SupplierStatus::EmAnalise => "em_analise",
            SupplierStatus::Qualificado => "qualificado",
            SupplierStatus::Reprovado => "reprovado",
            SupplierStatus::Bloqueado => "bloqueado",
            SupplierStatus::Inativo => "inativo",
        }
    }

    pub fn can_transition_to(&self, next: SupplierStatus) -> bool {
        use SupplierStatus::*;
        match (self, next) {
            (Inativo, _) => false,
            (_, Inativo) => true,
            (Pendente, EmAnalise) => true,
            (EmAnalise, Qualificado) | (EmAnalise, Reprovado) => true,
            (Qualificado, Bloqueado) | (Bloqueado, Qualificado) => true,
            _ => false,
        }
    }
}

// --- FORNECEDOR ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    #[schema(example = "Papelaria Central Ltda")]
    pub razao_social: String,
    #[schema(example = "Papelaria Central")]
    pub nome_fantasia: Option<String>,
    #[schema(example = "11222333000181")]
    pub cnpj: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    #[schema(example = "material_escritorio")]
    pub categoria: Option<String>,
    pub endereco: Option<Value>,
    pub observacoes: Option<String>,
    pub status: SupplierStatus,
    #[schema(example = "4.50")]
    pub nota_media: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub razao_social: String,
    pub nome_fantasia: Option<String>,
    #[validate(length(min = 14, message = "invalid_cnpj"))]
    #[schema(example = "11.222.333/0001-81")]
    pub cnpj: String,
    #[validate(email(message = "email_invalid"))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub categoria: Option<String>,
    pub endereco: Option<Value>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub razao_social: Option<String>,
    pub nome_fantasia: Option<String>,
    #[validate(email(message = "email_invalid"))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub categoria: Option<String>,
    pub endereco: Option<Value>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSupplierStatusPayload {
    pub status: SupplierStatus,
    pub motivo: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SupplierFilter {
    /// Busca por razão social, nome fantasia ou CNPJ
    pub q: Option<String>,
    pub status: Option<SupplierStatus>,
}

// --- HISTÓRICO (historico_acao_fornecedor) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierHistoryEntry {
    pub id: Uuid,
    pub fornecedor_id: Uuid,
    #[schema(example = "status_alterado")]
    pub acao: String,
    pub detalhes: Value,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// --- AVALIAÇÃO DE DESEMPENHO ---

/// As seis perguntas sim/não do formulário de avaliação.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationAnswers {
    pub entrega_no_prazo: bool,
    pub qualidade_conforme: bool,
    pub documentacao_correta: bool,
    pub atendimento_adequado: bool,
    pub preco_conforme: bool,
    /// Houve algum problema crítico no período?
    pub problema_critico: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateSupplierPayload {
    #[serde(flatten)]
    pub respostas: EvaluationAnswers,
    pub pedido_id: Option<Uuid>,
    pub comentario: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierEvaluation {
    pub id: Uuid,
    pub fornecedor_id: Uuid,
    pub pedido_id: Option<Uuid>,
    pub respostas_positivas: i32,
    pub problema_critico: bool,
    pub nota: i32,
    pub comentario: Option<String>,
    pub avaliado_por: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SupplierStatus::*;

    const ALL: [SupplierStatus; 6] = [Pendente, EmAnalise, Qualificado, Reprovado, Bloqueado, Inativo];

    #[test]
    fn qualification_flow_is_allowed() {
        assert!(Pendente.can_transition_to(EmAnalise));
        assert!(EmAnalise.can_transition_to(Qualificado));
        assert!(EmAnalise.can_transition_to(Reprovado));
        assert!(Qualificado.can_transition_to(Bloqueado));
        assert!(Bloqueado.can_transition_to(Qualificado));
    }

    #[test]
    fn any_active_status_can_be_inactivated() {
        for from in [Pendente, EmAnalise, Qualificado, Reprovado, Bloqueado] {
            assert!(from.can_transition_to(Inativo), "{} -> inativo", from.as_str());
        }
    }

    #[test]
    fn rejected_supplier_only_goes_inactive() {
        for next in ALL {
            assert_eq!(Reprovado.can_transition_to(next), next == Inativo, "reprovado -> {}", next.as_str());
        }
    }

    #[test]
    fn inactive_is_final() {
        for next in ALL {
            assert!(!Inativo.can_transition_to(next));
        }
    }

    #[test]
    fn cannot_skip_analysis() {
        assert!(!Pendente.can_transition_to(Qualificado));
        assert!(!Pendente.can_transition_to(Reprovado));
        assert!(!Pendente.can_transition_to(Bloqueado));
        assert!(!EmAnalise.can_transition_to(Bloqueado));
        assert!(!Qualificado.can_transition_to(EmAnalise));
    }
}
