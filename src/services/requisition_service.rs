// src/services/requisition_service.rs

use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{order_repo::NewOrder, OrderRepository, RequisitionRepository, SupplierRepository},
    models::{
        order::PurchaseOrder,
        requisition::{
            items_total, CreateRequisitionPayload, ItemInput, Requisition, RequisitionDetail,
            RequisitionFilter, RequisitionItem, RequisitionStatus,
        },
        supplier::SupplierStatus,
    },
};

fn ensure_transition(from: RequisitionStatus, to: RequisitionStatus) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}

/// Motivo obrigatório e sem espaços nas pontas.
pub fn rejection_reason(raw: &str) -> Result<&str, AppError> {
    let motivo = raw.trim();
    if motivo.is_empty() {
        return Err(AppError::BadRequest("rejection_reason_required"));
    }
    Ok(motivo)
}

/// Os itens da requisição viram itens do pedido, com o preço estimado
/// como preço unitário.
pub fn items_for_order(itens: &[RequisitionItem]) -> Vec<ItemInput> {
    itens
        .iter()
        .map(|i| ItemInput {
            descricao: i.descricao.clone(),
            quantidade: i.quantidade,
            unidade: i.unidade.clone(),
            preco: i.preco_estimado,
        })
        .collect()
}

#[derive(Clone)]
pub struct RequisitionService {
    repo: RequisitionRepository,
    supplier_repo: SupplierRepository,
    order_repo: OrderRepository,
    pool: PgPool,
}

impl RequisitionService {
    pub fn new(
        repo: RequisitionRepository,
        supplier_repo: SupplierRepository,
        order_repo: OrderRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, supplier_repo, order_repo, pool }
    }

    pub async fn list(&self, filter: &RequisitionFilter, user_id: Uuid) -> Result<Vec<Requisition>, AppError> {
        self.repo.list(filter, user_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<RequisitionDetail, AppError> {
        let header = self.repo.find_by_id(&self.pool, id).await?;
        let itens = self.repo.items(&self.pool, id).await?;
        Ok(RequisitionDetail { header, itens })
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateRequisitionPayload,
        user_id: Uuid,
    ) -> Result<RequisitionDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if input.itens.is_empty() {
            return Err(AppError::BusinessRule("requisition_without_items"));
        }

        let status = if input.enviar {
            RequisitionStatus::Pendente
        } else {
            RequisitionStatus::Rascunho
        };
        let total = items_total(&input.itens);

        let mut tx = executor.begin().await?;
        let header = self.repo.create(&mut tx, user_id, input, status, total).await?;
        let itens = self.repo.items(&mut *tx, header.id).await?;
        tx.commit().await?;

        tracing::info!(numero = header.numero, status = status.as_str(), %total, "requisição criada");
        Ok(RequisitionDetail { header, itens })
    }

    /// Transições simples (enviar, cancelar), sem dados extras.
    pub async fn transition<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        next: RequisitionStatus,
    ) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let current = self.repo.find_for_update(&mut tx, id).await?;

        // Aprovar, rejeitar e converter têm rotas próprias
        let decided_elsewhere = matches!(
            next,
            RequisitionStatus::Aprovada | RequisitionStatus::Rejeitada | RequisitionStatus::Convertida
        );
        if decided_elsewhere {
            return Err(AppError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        ensure_transition(current.status, next)?;
        let updated = self.repo.set_status(&mut *tx, id, next).await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn approve<'e, E>(&self, executor: E, id: Uuid, approver_id: Uuid) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let current = self.repo.find_for_update(&mut tx, id).await?;
        ensure_transition(current.status, RequisitionStatus::Aprovada)?;
        let updated = self
            .repo
            .record_decision(&mut *tx, id, RequisitionStatus::Aprovada, approver_id, None)
            .await?;
        tx.commit().await?;

        tracing::info!(numero = updated.numero, %approver_id, "requisição aprovada");
        Ok(updated)
    }

    pub async fn reject<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        motivo: &str,
        approver_id: Uuid,
    ) -> Result<Requisition, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let motivo = rejection_reason(motivo)?;

        let mut tx = executor.begin().await?;
        let current = self.repo.find_for_update(&mut tx, id).await?;
        ensure_transition(current.status, RequisitionStatus::Rejeitada)?;
        let updated = self
            .repo
            .record_decision(&mut *tx, id, RequisitionStatus::Rejeitada, approver_id, Some(motivo))
            .await?;
        tx.commit().await?;

        tracing::info!(numero = updated.numero, %approver_id, "requisição rejeitada");
        Ok(updated)
    }

    /// Gera o pedido a partir da requisição aprovada. Pedido criado e
    /// requisição convertida saem juntos ou não saem.
    pub async fn convert_to_order<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fornecedor_id: Uuid,
        buyer_id: Uuid,
    ) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let requisition = self.repo.find_for_update(&mut tx, id).await?;
        ensure_transition(requisition.status, RequisitionStatus::Convertida)?;

        let supplier = self.supplier_repo.find_by_id(&mut *tx, fornecedor_id).await?;
        if supplier.status != SupplierStatus::Qualificado {
            return Err(AppError::BusinessRule("supplier_not_qualified"));
        }

        let itens = self.repo.items(&mut *tx, id).await?;

        let order = self
            .order_repo
            .create(
                &mut tx,
                &NewOrder {
                    fornecedor_id,
                    requisicao_id: Some(id),
                    comprador_id: buyer_id,
                    previsao_entrega: requisition.necessario_em,
                    condicao_pagamento: None,
                    observacoes: Some(requisition.justificativa.as_str()),
                },
            )
            .await?;

        self.order_repo
            .append_items(&mut tx, order.id, &items_for_order(&itens))
            .await?;
        let order = self.order_repo.recalculate_total(&mut *tx, order.id).await?;

        self.repo.mark_converted(&mut *tx, id, order.id).await?;

        tx.commit().await?;

        tracing::info!(requisicao = requisition.numero, pedido = order.numero, "requisição convertida em pedido");
        Ok(order)
    }

    pub async fn list_all(&self) -> Result<Vec<Requisition>, AppError> {
        self.repo.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn blank_rejection_reason_is_refused() {
        assert!(matches!(
            rejection_reason("   "),
            Err(AppError::BadRequest("rejection_reason_required"))
        ));
        assert_eq!(rejection_reason("  fora do orçamento ").unwrap(), "fora do orçamento");
    }

    #[test]
    fn only_approved_requisitions_convert() {
        assert!(ensure_transition(RequisitionStatus::Aprovada, RequisitionStatus::Convertida).is_ok());

        let err = ensure_transition(RequisitionStatus::Pendente, RequisitionStatus::Convertida).unwrap_err();
        match err {
            AppError::InvalidTransition { from, to } => {
                assert_eq!(from, "pendente");
                assert_eq!(to, "convertida");
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn requisition_lines_become_order_lines() {
        let req_id = Uuid::new_v4();
        let itens = vec![RequisitionItem {
            id: Uuid::new_v4(),
            requisicao_id: req_id,
            descricao: "Resma A4".into(),
            quantidade: Decimal::from(10),
            unidade: "cx".into(),
            preco_estimado: "23.90".parse().unwrap(),
        }];

        let lines = items_for_order(&itens);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].descricao, "Resma A4");
        assert_eq!(lines[0].unidade, "cx");
        assert_eq!(items_total(&lines), "239.00".parse::<Decimal>().unwrap());
    }
}
