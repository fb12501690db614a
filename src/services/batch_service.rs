// src/services/batch_service.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AccessRepository,
    models::access::{BatchAction, BatchActionPayload, BatchDispatch, BatchOperation, BatchResult, BatchStatus},
};

/// Quem sabe aplicar uma operação de lote a um usuário.
#[async_trait]
pub trait BatchTarget: Send + Sync {
    async fn apply(&self, user_id: Uuid, op: BatchOperation) -> Result<(), AppError>;
}

/// Resultado do laço: quem já foi processado e onde parou.
#[derive(Debug)]
pub struct BatchOutcome {
    pub processed: Vec<Uuid>,
    pub failure: Option<(Uuid, AppError)>,
}

impl BatchOutcome {
    pub fn status(&self) -> BatchStatus {
        if self.failure.is_some() {
            BatchStatus::Interrompido
        } else {
            BatchStatus::Concluido
        }
    }
}

/// Traduz o payload na operação que o laço vai repetir.
pub fn operation_for(payload: &BatchActionPayload) -> Result<BatchOperation, AppError> {
    match payload.acao {
        BatchAction::AlterarRole => payload
            .role
            .map(BatchOperation::SetRole)
            .ok_or(AppError::BadRequest("batch_missing_role")),
        BatchAction::AplicarTemplate => payload
            .template_id
            .map(BatchOperation::ApplyTemplate)
            .ok_or(AppError::BadRequest("batch_missing_template")),
        BatchAction::Ativar => Ok(BatchOperation::SetActive(true)),
        BatchAction::Desativar => Ok(BatchOperation::SetActive(false)),
    }
}

/// Um usuário por vez, na ordem pedida. O primeiro erro interrompe o laço;
/// o que já foi aplicado fica aplicado.
pub async fn run_sequential<T>(target: &T, user_ids: &[Uuid], op: BatchOperation) -> BatchOutcome
where
    T: BatchTarget + ?Sized,
{
    let mut processed = Vec::with_capacity(user_ids.len());

    for &user_id in user_ids {
        if let Err(e) = target.apply(user_id, op).await {
            tracing::warn!(%user_id, error = %e, "ação em lote interrompida");
            return BatchOutcome { processed, failure: Some((user_id, e)) };
        }
        processed.push(user_id);
    }

    BatchOutcome { processed, failure: None }
}

#[derive(Clone)]
pub struct BatchService {
    repo: AccessRepository,
}

impl BatchService {
    pub fn new(repo: AccessRepository) -> Self {
        Self { repo }
    }

    pub async fn dispatch<T>(
        &self,
        target: &T,
        payload: &BatchActionPayload,
        executado_por: Uuid,
    ) -> Result<BatchResult, AppError>
    where
        T: BatchTarget + ?Sized,
    {
        let op = operation_for(payload)?;

        let dispatch_id = self
            .repo
            .start_dispatch(payload.acao, &payload.user_ids, executado_por)
            .await?;

        let outcome = run_sequential(target, &payload.user_ids, op).await;
        let status = outcome.status();
        let error = outcome.failure.as_ref().map(|(_, e)| e.to_string());

        self.repo
            .finish_dispatch(dispatch_id, outcome.processed.len() as i32, status, error.as_deref())
            .await?;

        tracing::info!(
            %dispatch_id,
            acao = ?payload.acao,
            processados = outcome.processed.len(),
            total = payload.user_ids.len(),
            "disparo em lote finalizado"
        );

        Ok(BatchResult {
            dispatch_id,
            status,
            failed_user_id: outcome.failure.as_ref().map(|(id, _)| *id),
            processed: outcome.processed,
            error,
        })
    }

    pub async fn history(&self) -> Result<Vec<BatchDispatch>, AppError> {
        self.repo.list_dispatches().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use std::sync::Mutex;

    /// Alvo falso: registra as chamadas e falha no usuário marcado.
    struct FakeTarget {
        calls: Mutex<Vec<(Uuid, BatchOperation)>>,
        fail_on: Option<Uuid>,
    }

    impl FakeTarget {
        fn new(fail_on: Option<Uuid>) -> Self {
            Self { calls: Mutex::new(Vec::new()), fail_on }
        }
    }

    #[async_trait]
    impl BatchTarget for FakeTarget {
        async fn apply(&self, user_id: Uuid, op: BatchOperation) -> Result<(), AppError> {
            self.calls.lock().unwrap().push((user_id, op));
            if self.fail_on == Some(user_id) {
                return Err(AppError::ResourceNotFound("profile"));
            }
            Ok(())
        }
    }

    fn payload(acao: BatchAction) -> BatchActionPayload {
        BatchActionPayload { acao, user_ids: vec![Uuid::new_v4()], role: None, template_id: None }
    }

    #[tokio::test]
    async fn applies_every_user_in_order() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let target = FakeTarget::new(None);

        let outcome = run_sequential(&target, &ids, BatchOperation::SetActive(true)).await;

        assert_eq!(outcome.processed, ids);
        assert_eq!(outcome.status(), BatchStatus::Concluido);
        let called: Vec<Uuid> = target.calls.lock().unwrap().iter().map(|(id, _)| *id).collect();
        assert_eq!(called, ids);
    }

    #[tokio::test]
    async fn first_error_stops_the_loop_and_keeps_earlier_work() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let target = FakeTarget::new(Some(ids[1]));

        let outcome = run_sequential(&target, &ids, BatchOperation::SetRole(UserRole::Comprador)).await;

        assert_eq!(outcome.processed, vec![ids[0]]);
        assert_eq!(outcome.status(), BatchStatus::Interrompido);
        let (failed, err) = outcome.failure.unwrap();
        assert_eq!(failed, ids[1]);
        assert!(matches!(err, AppError::ResourceNotFound("profile")));
        // Ninguém depois do erro foi tocado
        assert_eq!(target.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn payload_maps_to_operation() {
        assert_eq!(operation_for(&payload(BatchAction::Ativar)).unwrap(), BatchOperation::SetActive(true));
        assert_eq!(operation_for(&payload(BatchAction::Desativar)).unwrap(), BatchOperation::SetActive(false));

        let mut p = payload(BatchAction::AlterarRole);
        p.role = Some(UserRole::Aprovador);
        assert_eq!(operation_for(&p).unwrap(), BatchOperation::SetRole(UserRole::Aprovador));

        let template = Uuid::new_v4();
        let mut p = payload(BatchAction::AplicarTemplate);
        p.template_id = Some(template);
        assert_eq!(operation_for(&p).unwrap(), BatchOperation::ApplyTemplate(template));
    }

    #[test]
    fn missing_role_or_template_is_a_bad_request() {
        assert!(matches!(
            operation_for(&payload(BatchAction::AlterarRole)),
            Err(AppError::BadRequest("batch_missing_role"))
        ));
        assert!(matches!(
            operation_for(&payload(BatchAction::AplicarTemplate)),
            Err(AppError::BadRequest("batch_missing_template"))
        ));
    }
}
