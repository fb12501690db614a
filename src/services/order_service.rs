// src/services/order_service.rs

use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{order_repo::NewOrder, OrderRepository, SupplierRepository},
    models::{
        order::{CreateOrderPayload, OrderFilter, OrderStatus, PurchaseOrder, PurchaseOrderDetail},
        requisition::ItemInput,
        supplier::SupplierStatus,
    },
};

fn ensure_transition(from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}

/// Itens só entram enquanto o pedido é rascunho.
pub fn ensure_editable(status: OrderStatus) -> Result<(), AppError> {
    if status == OrderStatus::Rascunho {
        Ok(())
    } else {
        Err(AppError::BusinessRule("order_not_editable"))
    }
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    supplier_repo: SupplierRepository,
    pool: PgPool,
}

impl OrderService {
    pub fn new(repo: OrderRepository, supplier_repo: SupplierRepository, pool: PgPool) -> Self {
        Self { repo, supplier_repo, pool }
    }

    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<PurchaseOrder>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn list_all(&self) -> Result<Vec<PurchaseOrder>, AppError> {
        self.repo.list_all().await
    }

    /// Cabeçalho + fornecedor + itens, usado pela tela e pelo PDF.
    pub async fn get_detail<'e, E>(&self, executor: E, id: Uuid) -> Result<PurchaseOrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let header = self.repo.find_by_id(&mut *tx, id).await?;
        let supplier = self.supplier_repo.find_by_id(&mut *tx, header.fornecedor_id).await?;
        let itens = self.repo.items(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(PurchaseOrderDetail {
            header,
            fornecedor_nome: supplier.razao_social,
            fornecedor_cnpj: supplier.cnpj,
            itens,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<PurchaseOrderDetail, AppError> {
        self.get_detail(&self.pool, id).await
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateOrderPayload,
        buyer_id: Uuid,
    ) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if input.itens.is_empty() {
            return Err(AppError::BusinessRule("order_without_items"));
        }

        let mut tx = executor.begin().await?;

        let supplier = self.supplier_repo.find_by_id(&mut *tx, input.fornecedor_id).await?;
        if supplier.status != SupplierStatus::Qualificado {
            return Err(AppError::BusinessRule("supplier_not_qualified"));
        }

        let order = self
            .repo
            .create(
                &mut tx,
                &NewOrder {
                    fornecedor_id: input.fornecedor_id,
                    requisicao_id: None,
                    comprador_id: buyer_id,
                    previsao_entrega: input.previsao_entrega,
                    condicao_pagamento: input.condicao_pagamento.as_deref(),
                    observacoes: input.observacoes.as_deref(),
                },
            )
            .await?;

        self.repo.append_items(&mut tx, order.id, &input.itens).await?;
        let order = self.repo.recalculate_total(&mut *tx, order.id).await?;

        tx.commit().await?;

        tracing::info!(numero = order.numero, total = %order.total, "pedido criado");
        Ok(order)
    }

    pub async fn add_item<'e, E>(&self, executor: E, id: Uuid, item: &ItemInput) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self.repo.find_for_update(&mut tx, id).await?;
        ensure_editable(order.status)?;

        self.repo.append_items(&mut tx, id, std::slice::from_ref(item)).await?;
        let order = self.repo.recalculate_total(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(order)
    }

    pub async fn transition<'e, E>(&self, executor: E, id: Uuid, next: OrderStatus) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.repo.find_for_update(&mut tx, id).await?;
        ensure_transition(current.status, next)?;

        // Pedido vazio não é emitido
        if next == OrderStatus::Emitido && self.repo.items(&mut *tx, id).await?.is_empty() {
            return Err(AppError::BusinessRule("order_without_items"));
        }

        let order = self.repo.set_status(&mut *tx, id, next).await?;
        tx.commit().await?;

        tracing::info!(
            numero = order.numero,
            from = current.status.as_str(),
            to = next.as_str(),
            "status do pedido alterado"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_drafts_accept_new_items() {
        assert!(ensure_editable(OrderStatus::Rascunho).is_ok());
        for status in [OrderStatus::Emitido, OrderStatus::Confirmado, OrderStatus::Recebido, OrderStatus::Cancelado] {
            assert!(matches!(ensure_editable(status), Err(AppError::BusinessRule("order_not_editable"))));
        }
    }

    #[test]
    fn skipping_confirmation_is_an_invalid_transition() {
        let err = ensure_transition(OrderStatus::Emitido, OrderStatus::Recebido).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert!(ensure_transition(OrderStatus::Confirmado, OrderStatus::Recebido).is_ok());
    }
}
