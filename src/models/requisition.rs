// src/models/requisition.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "requisition_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequisitionStatus {
    Rascunho,
    Pendente,
    Aprovada,
    Rejeitada,
    Cancelada,
    Convertida,
}

impl RequisitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequisitionStatus::Rascunho => "rascunho",
            RequisitionStatus::Pendente => "pendente",
            RequisitionStatus::Aprovada => "aprovada",
            RequisitionStatus::Rejeitada => "rejeitada",
            RequisitionStatus::Cancelada => "cancelada",
            RequisitionStatus::Convertida => "convertida",
        }
    }

    pub fn can_transition_to(&self, next: RequisitionStatus) -> bool {
        use RequisitionStatus::*;
        matches!(
            (self, next),
            (Rascunho, Pendente)
                | (Pendente, Aprovada)
                | (Pendente, Rejeitada)
                | (Rascunho, Cancelada)
                | (Pendente, Cancelada)
                | (Aprovada, Convertida)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "requisition_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequisitionPriority {
    Baixa,
    Media,
    Alta,
    Urgente,
}

impl RequisitionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequisitionPriority::Baixa => "baixa",
            RequisitionPriority::Media => "media",
            RequisitionPriority::Alta => "alta",
            RequisitionPriority::Urgente => "urgente",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Requisition {
    pub id: Uuid,
    #[schema(example = 42)]
    pub numero: i64,
    pub solicitante_id: Uuid,
    #[schema(example = "Reposição de toners do 3º andar")]
    pub justificativa: String,
    #[schema(example = "ADM-001")]
    pub centro_custo: Option<String>,
    pub prioridade: RequisitionPriority,
    pub status: RequisitionStatus,
    pub necessario_em: Option<NaiveDate>,
    #[schema(example = "350.00")]
    pub total_estimado: Decimal,
    pub aprovador_id: Option<Uuid>,
    pub motivo_rejeicao: Option<String>,
    pub pedido_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionItem {
    pub id: Uuid,
    pub requisicao_id: Uuid,
    #[schema(example = "Toner HP 85A")]
    pub descricao: String,
    #[schema(example = "5")]
    pub quantidade: Decimal,
    #[schema(example = "un")]
    pub unidade: String,
    #[schema(example = "70.00")]
    pub preco_estimado: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionDetail {
    #[serde(flatten)]
    pub header: Requisition,
    pub itens: Vec<RequisitionItem>,
}

// --- Payloads ---

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("must_be_positive".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("must_not_be_negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    #[validate(length(min = 1, message = "required"))]
    pub descricao: String,
    #[validate(custom(function = "validate_positive"))]
    pub quantidade: Decimal,
    #[serde(default = "default_unit")]
    pub unidade: String,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub preco: Decimal,
}

fn default_unit() -> String {
    "un".to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequisitionPayload {
    #[validate(length(min = 5, message = "required"))]
    pub justificativa: String,
    pub centro_custo: Option<String>,
    pub prioridade: RequisitionPriority,
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-10")]
    pub necessario_em: Option<NaiveDate>,
    #[validate(length(min = 1, message = "at_least_one"), nested)]
    pub itens: Vec<ItemInput>,
    /// Envia direto para aprovação em vez de salvar como rascunho
    #[serde(default)]
    pub enviar: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequisitionPayload {
    pub motivo: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequisitionPayload {
    pub fornecedor_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionFilter {
    pub status: Option<RequisitionStatus>,
    /// Só as requisições do usuário logado
    #[serde(default)]
    pub minhas: bool,
}

/// Σ quantidade × preço, usado tanto em requisições quanto em pedidos.
pub fn items_total(itens: &[ItemInput]) -> Decimal {
    itens.iter().map(|i| i.quantidade * i.preco).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequisitionStatus::*;

    fn item(qtd: i64, preco: &str) -> ItemInput {
        ItemInput {
            descricao: "Toner".into(),
            quantidade: Decimal::from(qtd),
            unidade: "un".into(),
            preco: preco.parse().unwrap(),
        }
    }

    #[test]
    fn approval_flow_transitions() {
        assert!(Rascunho.can_transition_to(Pendente));
        assert!(Pendente.can_transition_to(Aprovada));
        assert!(Pendente.can_transition_to(Rejeitada));
        assert!(Aprovada.can_transition_to(Convertida));
    }

    #[test]
    fn terminal_states_do_not_move() {
        for next in [Rascunho, Pendente, Aprovada, Rejeitada, Cancelada, Convertida] {
            assert!(!Rejeitada.can_transition_to(next));
            assert!(!Cancelada.can_transition_to(next));
            assert!(!Convertida.can_transition_to(next));
        }
        assert!(!Aprovada.can_transition_to(Cancelada));
        assert!(!Rascunho.can_transition_to(Aprovada));
    }

    #[test]
    fn priority_names_match_database_labels() {
        assert_eq!(RequisitionPriority::Baixa.as_str(), "baixa");
        assert_eq!(RequisitionPriority::Media.as_str(), "media");
        assert_eq!(RequisitionPriority::Urgente.as_str(), "urgente");
        assert_eq!(
            serde_json::to_value(RequisitionPriority::Alta).unwrap(),
            RequisitionPriority::Alta.as_str()
        );
    }

    #[test]
    fn total_multiplies_quantity_by_price() {
        let total = items_total(&[item(5, "70.00"), item(2, "12.50")]);
        assert_eq!(total, "375.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn payload_rejects_empty_items_and_zero_quantity() {
        let payload = CreateRequisitionPayload {
            justificativa: "Reposição de estoque".into(),
            centro_custo: None,
            prioridade: RequisitionPriority::Media,
            necessario_em: None,
            itens: vec![],
            enviar: false,
        };
        assert!(payload.validate().is_err());

        let zero = ItemInput { quantidade: Decimal::ZERO, ..item(1, "1.00") };
        assert!(zero.validate().is_err());
    }
}
