// src/models/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::requisition::ItemInput;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Rascunho,
    Emitido,
    Confirmado,
    Recebido,
    Cancelado,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Rascunho => "rascunho",
            OrderStatus::Emitido => "emitido",
            OrderStatus::Confirmado => "confirmado",
            OrderStatus::Recebido => "recebido",
            OrderStatus::Cancelado => "cancelado",
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Rascunho, Emitido)
                | (Emitido, Confirmado)
                | (Confirmado, Recebido)
                | (Rascunho, Cancelado)
                | (Emitido, Cancelado)
                | (Confirmado, Cancelado)
        )
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: Uuid,
    #[schema(example = 1024)]
    pub numero: i64,
    pub fornecedor_id: Uuid,
    pub requisicao_id: Option<Uuid>,
    pub comprador_id: Uuid,
    pub status: OrderStatus,
    #[schema(example = "1500.00")]
    pub total: Decimal,
    #[schema(value_type = Option<String>, format = Date, example = "2025-04-01")]
    pub previsao_entrega: Option<NaiveDate>,
    #[schema(example = "30/60 dias")]
    pub condicao_pagamento: Option<String>,
    pub observacoes: Option<String>,
    pub emitido_em: Option<DateTime<Utc>>,
    pub recebido_em: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub pedido_id: Uuid,
    pub descricao: String,
    pub quantidade: Decimal,
    pub unidade: String,
    pub preco_unitario: Decimal,
}

impl PurchaseOrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.quantidade * self.preco_unitario
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub header: PurchaseOrder,
    pub fornecedor_nome: String,
    pub fornecedor_cnpj: String,
    pub itens: Vec<PurchaseOrderItem>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub fornecedor_id: Uuid,
    #[schema(value_type = Option<String>, format = Date, example = "2025-04-01")]
    pub previsao_entrega: Option<NaiveDate>,
    pub condicao_pagamento: Option<String>,
    pub observacoes: Option<String>,
    #[validate(length(min = 1, message = "at_least_one"), nested)]
    pub itens: Vec<ItemInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOrderPayload {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub fornecedor_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn happy_path_reaches_received() {
        assert!(Rascunho.can_transition_to(Emitido));
        assert!(Emitido.can_transition_to(Confirmado));
        assert!(Confirmado.can_transition_to(Recebido));
    }

    #[test]
    fn received_and_cancelled_are_final() {
        for next in [Rascunho, Emitido, Confirmado, Recebido, Cancelado] {
            assert!(!Recebido.can_transition_to(next));
            assert!(!Cancelado.can_transition_to(next));
        }
    }

    #[test]
    fn cannot_skip_steps() {
        assert!(!Rascunho.can_transition_to(Recebido));
        assert!(!Emitido.can_transition_to(Rascunho));
    }

    #[test]
    fn subtotal_is_quantity_times_price() {
        let item = PurchaseOrderItem {
            id: Uuid::new_v4(),
            pedido_id: Uuid::new_v4(),
            descricao: "Papel A4".into(),
            quantidade: Decimal::from(10),
            unidade: "cx".into(),
            preco_unitario: "25.90".parse().unwrap(),
        };
        assert_eq!(item.subtotal(), "259.00".parse::<Decimal>().unwrap());
    }
}
