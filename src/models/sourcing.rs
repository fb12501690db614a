// src/models/sourcing.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::requisition::{validate_not_negative, validate_positive};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sourcing_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourcingType {
    Rfp,
    Rfq,
    Cotacao,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sourcing_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourcingStatus {
    Rascunho,
    Aberto,
    EmAvaliacao,
    Encerrado,
    Cancelado,
}

impl SourcingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourcingStatus::Rascunho => "rascunho",
            SourcingStatus::Aberto => "aberto",
            SourcingStatus::EmAvaliacao => "em_avaliacao",
            SourcingStatus::Encerrado => "encerrado",
            SourcingStatus::Cancelado => "cancelado",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, SourcingStatus::Encerrado | SourcingStatus::Cancelado)
    }

    pub fn can_transition_to(&self, next: SourcingStatus) -> bool {
        use SourcingStatus::*;
        if self.is_closed() {
            return false;
        }
        matches!(
            (self, next),
            (Rascunho, Aberto) | (Aberto, EmAvaliacao) | (EmAvaliacao, Encerrado) | (_, Cancelado)
        )
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourcingEvent {
    pub id: Uuid,
    pub tipo: SourcingType,
    #[schema(example = "RFP Serviços de Limpeza 2025")]
    pub titulo: String,
    pub descricao: Option<String>,
    pub prazo: Option<DateTime<Utc>>,
    pub status: SourcingStatus,
    pub criado_por: Uuid,
    pub vencedor_proposta_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourcingInvitation {
    pub evento_id: Uuid,
    pub fornecedor_id: Uuid,
    pub convidado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,
    pub evento_id: Uuid,
    pub fornecedor_id: Uuid,
    #[schema(example = "12500.00")]
    pub valor: Decimal,
    #[schema(example = 15)]
    pub prazo_entrega_dias: Option<i32>,
    pub observacoes: Option<String>,
    pub enviada_em: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationCriterion {
    pub id: Uuid,
    pub evento_id: Uuid,
    #[schema(example = "Qualificação técnica")]
    pub nome: String,
    #[schema(example = "3")]
    pub peso: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalScore {
    pub proposta_id: Uuid,
    pub criterio_id: Uuid,
    pub nota: Decimal,
    pub avaliador_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedProposal {
    pub posicao: usize,
    pub proposta_id: Uuid,
    pub fornecedor_id: Uuid,
    pub valor: Decimal,
    #[schema(example = "8.25")]
    pub nota_ponderada: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourcingEventDetail {
    #[serde(flatten)]
    pub header: SourcingEvent,
    pub convites: Vec<SourcingInvitation>,
    pub criterios: Vec<EvaluationCriterion>,
    pub propostas: Vec<Proposal>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSourcingEventPayload {
    pub tipo: SourcingType,
    #[validate(length(min = 3, message = "required"))]
    pub titulo: String,
    pub descricao: Option<String>,
    pub prazo: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSourcingPayload {
    pub status: SourcingStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteSuppliersPayload {
    #[validate(length(min = 1, message = "at_least_one"))]
    pub fornecedor_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProposalPayload {
    pub fornecedor_id: Uuid,
    #[validate(custom(function = "validate_not_negative"))]
    pub valor: Decimal,
    pub prazo_entrega_dias: Option<i32>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCriterionPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub nome: String,
    #[validate(custom(function = "validate_positive"))]
    pub peso: Decimal,
}

fn validate_score(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO || *val > Decimal::TEN {
        let mut err = ValidationError::new("range");
        err.message = Some("score_range".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub criterio_id: Uuid,
    #[validate(custom(function = "validate_score"))]
    pub nota: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreProposalPayload {
    #[validate(length(min = 1, message = "at_least_one"), nested)]
    pub notas: Vec<ScoreInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardPayload {
    pub proposta_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SourcingStatus::*;

    #[test]
    fn event_moves_forward_only() {
        assert!(Rascunho.can_transition_to(Aberto));
        assert!(Aberto.can_transition_to(EmAvaliacao));
        assert!(EmAvaliacao.can_transition_to(Encerrado));
        assert!(!Aberto.can_transition_to(Rascunho));
        assert!(!Rascunho.can_transition_to(Encerrado));
    }

    #[test]
    fn open_events_can_be_cancelled_closed_ones_cannot() {
        assert!(Rascunho.can_transition_to(Cancelado));
        assert!(EmAvaliacao.can_transition_to(Cancelado));
        assert!(!Encerrado.can_transition_to(Cancelado));
        assert!(!Cancelado.can_transition_to(Aberto));
    }

    #[test]
    fn score_must_be_between_zero_and_ten() {
        let ok = ScoreInput { criterio_id: Uuid::new_v4(), nota: Decimal::TEN };
        let bad = ScoreInput { criterio_id: Uuid::new_v4(), nota: Decimal::from(11) };
        assert!(ok.validate().is_ok());
        assert!(bad.validate().is_err());
    }
}
