// src/services/supplier_service.rs

use serde_json::json;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{cnpj, error::AppError},
    db::SupplierRepository,
    models::supplier::{
        ChangeSupplierStatusPayload, CreateSupplierPayload, EvaluateSupplierPayload, EvaluationAnswers,
        Supplier, SupplierEvaluation, SupplierFilter, SupplierHistoryEntry, UpdateSupplierPayload,
    },
};

const QUALITY_QUESTIONS: i32 = 5;
const MAX_SCORE: i32 = 5;
const CRITICAL_PENALTY: i32 = 2;

/// Nota de 0 a 5: proporção de respostas positivas nas cinco perguntas de
/// qualidade, menos 2 quando houve problema crítico.
/// Devolve `(respostas_positivas, nota)`.
pub fn evaluation_score(answers: &EvaluationAnswers) -> (i32, i32) {
    let positives = [
        answers.entrega_no_prazo,
        answers.qualidade_conforme,
        answers.documentacao_correta,
        answers.atendimento_adequado,
        answers.preco_conforme,
    ]
    .iter()
    .filter(|&&yes| yes)
    .count() as i32;

    let base = (positives as f64 / QUALITY_QUESTIONS as f64 * MAX_SCORE as f64).round() as i32;
    let penalty = if answers.problema_critico { CRITICAL_PENALTY } else { 0 };

    (positives, (base - penalty).max(0))
}

#[derive(Clone)]
pub struct SupplierService {
    repo: SupplierRepository,
}

impl SupplierService {
    pub fn new(repo: SupplierRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &SupplierFilter) -> Result<Vec<Supplier>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.find_by_id(executor, id).await
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateSupplierPayload,
        user_id: Uuid,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let digits = cnpj::normalize(&input.cnpj)?;

        let mut tx = executor.begin().await?;

        let supplier = self.repo.create(&mut *tx, input, &digits).await?;
        self.repo
            .record_history(
                &mut *tx,
                supplier.id,
                "criado",
                json!({ "razaoSocial": supplier.razao_social, "cnpj": cnpj::format(&digits) }),
                user_id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(supplier_id = %supplier.id, "fornecedor cadastrado");
        Ok(supplier)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateSupplierPayload,
        user_id: Uuid,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let supplier = self.repo.update(&mut *tx, id, input).await?;
        self.repo
            .record_history(&mut *tx, id, "atualizado", json!({}), user_id)
            .await?;

        tx.commit().await?;
        Ok(supplier)
    }

    pub async fn change_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &ChangeSupplierStatusPayload,
        user_id: Uuid,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.repo.find_by_id(&mut *tx, id).await?;
        if !current.status.can_transition_to(input.status) {
            return Err(AppError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: input.status.as_str().to_string(),
            });
        }

        let supplier = self.repo.set_status(&mut *tx, id, input.status).await?;
        self.repo
            .record_history(
                &mut *tx,
                id,
                "status_alterado",
                json!({
                    "de": current.status.as_str(),
                    "para": input.status.as_str(),
                    "motivo": input.motivo,
                }),
                user_id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            supplier_id = %id,
            from = current.status.as_str(),
            to = input.status.as_str(),
            "status do fornecedor alterado"
        );
        Ok(supplier)
    }

    pub async fn evaluate<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &EvaluateSupplierPayload,
        user_id: Uuid,
    ) -> Result<SupplierEvaluation, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (positives, score) = evaluation_score(&input.respostas);

        let mut tx = executor.begin().await?;

        // Garante 404 antes de tentar inserir
        self.repo.find_by_id(&mut *tx, id).await?;

        let evaluation = self
            .repo
            .insert_evaluation(
                &mut *tx,
                id,
                input.pedido_id,
                positives,
                input.respostas.problema_critico,
                score,
                input.comentario.as_deref(),
                user_id,
            )
            .await?;

        self.repo.refresh_average(&mut *tx, id).await?;
        self.repo
            .record_history(
                &mut *tx,
                id,
                "avaliado",
                json!({ "nota": score, "problemaCritico": input.respostas.problema_critico }),
                user_id,
            )
            .await?;

        tx.commit().await?;
        Ok(evaluation)
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<SupplierHistoryEntry>, AppError> {
        self.repo.history(id).await
    }

    pub async fn evaluations(&self, id: Uuid) -> Result<Vec<SupplierEvaluation>, AppError> {
        self.repo.evaluations(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(yes: usize, critical: bool) -> EvaluationAnswers {
        let flags: Vec<bool> = (0..5).map(|i| i < yes).collect();
        EvaluationAnswers {
            entrega_no_prazo: flags[0],
            qualidade_conforme: flags[1],
            documentacao_correta: flags[2],
            atendimento_adequado: flags[3],
            preco_conforme: flags[4],
            problema_critico: critical,
        }
    }

    #[test]
    fn all_positive_answers_give_full_score() {
        assert_eq!(evaluation_score(&answers(5, false)), (5, 5));
    }

    #[test]
    fn each_positive_answer_is_worth_one_point() {
        for yes in 0..=5 {
            assert_eq!(evaluation_score(&answers(yes, false)).1, yes as i32);
        }
    }

    #[test]
    fn critical_issue_costs_two_points() {
        assert_eq!(evaluation_score(&answers(5, true)), (5, 3));
        assert_eq!(evaluation_score(&answers(3, true)), (3, 1));
    }

    #[test]
    fn score_never_goes_below_zero() {
        assert_eq!(evaluation_score(&answers(1, true)).1, 0);
        assert_eq!(evaluation_score(&answers(0, true)).1, 0);
    }
}
