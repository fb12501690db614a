// src/models/messaging.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    #[schema(example = "Atraso na entrega do pedido 1024")]
    pub assunto: String,
    pub fornecedor_id: Option<Uuid>,
    pub pedido_id: Option<Uuid>,
    pub criado_por: Uuid,
    pub created_at: DateTime<Utc>,
    pub ultima_mensagem_em: Option<DateTime<Utc>>,
}

/// Linha da caixa de entrada: conversa + contador de não lidas.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub conversa: Conversation,
    pub nao_lidas: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversa_id: Uuid,
    pub autor_id: Uuid,
    pub conteudo: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationPayload {
    #[validate(length(min = 3, message = "required"))]
    pub assunto: String,
    #[serde(default)]
    pub participantes: Vec<Uuid>,
    pub fornecedor_id: Option<Uuid>,
    pub pedido_id: Option<Uuid>,
    #[validate(length(min = 1, max = 4000, message = "message_length"), custom(function = "validate_not_blank"))]
    pub mensagem_inicial: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[validate(length(min = 1, max = 4000, message = "message_length"), custom(function = "validate_not_blank"))]
    pub conteudo: String,
}

fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("message_length".into());
        return Err(err);
    }
    Ok(())
}

/// Garante o criador entre os participantes, sem duplicatas.
pub fn participants_with_creator(creator: Uuid, others: &[Uuid]) -> Vec<Uuid> {
    let mut all = vec![creator];
    for id in others {
        if !all.contains(id) {
            all.push(*id);
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creator_is_always_first_and_unique() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let list = participants_with_creator(me, &[other, me, other]);
        assert_eq!(list, vec![me, other]);
    }

    #[test]
    fn empty_message_is_rejected() {
        let payload = SendMessagePayload { conteudo: String::new() };
        assert!(payload.validate().is_err());

        let long = SendMessagePayload { conteudo: "a".repeat(4001) };
        assert!(long.validate().is_err());
    }

    #[test]
    fn whitespace_only_message_is_rejected() {
        let blank = SendMessagePayload { conteudo: " \n\t ".into() };
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("conteudo"));

        let ok = SendMessagePayload { conteudo: " oi ".into() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn blank_opening_message_is_rejected() {
        let payload = CreateConversationPayload {
            assunto: "Entrega atrasada".into(),
            participantes: vec![],
            fornecedor_id: None,
            pedido_id: None,
            mensagem_inicial: Some("   ".into()),
        };
        assert!(payload.validate().is_err());
    }
}
