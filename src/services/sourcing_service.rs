// src/services/sourcing_service.rs

use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{SourcingRepository, SupplierRepository},
    models::{
        sourcing::{
            AddCriterionPayload, CreateSourcingEventPayload, EvaluationCriterion, Proposal, ProposalScore,
            RankedProposal, ScoreInput, SourcingEvent, SourcingEventDetail, SourcingStatus,
            SubmitProposalPayload,
        },
        supplier::SupplierStatus,
    },
};

/// Classificação das propostas pela nota ponderada
/// Σ(nota × peso) / Σ peso, com nota ausente valendo zero.
/// Empate: vence o menor valor.
pub fn rank_proposals(
    proposals: &[Proposal],
    criteria: &[EvaluationCriterion],
    scores: &[ProposalScore],
) -> Vec<RankedProposal> {
    let total_weight: Decimal = criteria.iter().map(|c| c.peso).sum();

    let by_pair: HashMap<(Uuid, Uuid), Decimal> = scores
        .iter()
        .map(|s| ((s.proposta_id, s.criterio_id), s.nota))
        .collect();

    let mut ranked: Vec<RankedProposal> = proposals
        .iter()
        .map(|p| {
            let weighted: Decimal = criteria
                .iter()
                .map(|c| by_pair.get(&(p.id, c.id)).copied().unwrap_or(Decimal::ZERO) * c.peso)
                .sum();

            let nota_ponderada = if total_weight > Decimal::ZERO {
                (weighted / total_weight).round_dp(2)
            } else {
                Decimal::ZERO
            };

            RankedProposal {
                posicao: 0,
                proposta_id: p.id,
                fornecedor_id: p.fornecedor_id,
                valor: p.valor,
                nota_ponderada,
            }
        })
        .collect();

    ranked.sort_by(|a, b| match b.nota_ponderada.cmp(&a.nota_ponderada) {
        Ordering::Equal => a.valor.cmp(&b.valor),
        other => other,
    });

    for (i, r) in ranked.iter_mut().enumerate() {
        r.posicao = i + 1;
    }

    ranked
}

#[derive(Clone)]
pub struct SourcingService {
    repo: SourcingRepository,
    supplier_repo: SupplierRepository,
    pool: PgPool,
}

impl SourcingService {
    pub fn new(repo: SourcingRepository, supplier_repo: SupplierRepository, pool: PgPool) -> Self {
        Self { repo, supplier_repo, pool }
    }

    pub async fn list_events(&self, status: Option<SourcingStatus>) -> Result<Vec<SourcingEvent>, AppError> {
        self.repo.list_events(status).await
    }

    pub async fn get_event(&self, id: Uuid) -> Result<SourcingEventDetail, AppError> {
        let header = self.repo.find_event(&self.pool, id).await?;
        let convites = self.repo.invitations(&self.pool, id).await?;
        let criterios = self.repo.criteria(&self.pool, id).await?;
        let propostas = self.repo.proposals(&self.pool, id).await?;

        Ok(SourcingEventDetail { header, convites, criterios, propostas })
    }

    pub async fn create_event(&self, input: &CreateSourcingEventPayload, user_id: Uuid) -> Result<SourcingEvent, AppError> {
        let event = self.repo.create_event(input, user_id).await?;
        tracing::info!(evento = %event.id, tipo = ?event.tipo, "evento de sourcing criado");
        Ok(event)
    }

    pub async fn transition(&self, id: Uuid, next: SourcingStatus) -> Result<SourcingEvent, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.repo.find_event_for_update(&mut tx, id).await?;
        if !current.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let event = self.repo.set_status(&mut *tx, id, next).await?;
        tx.commit().await?;
        Ok(event)
    }

    /// Só fornecedores qualificados entram no evento.
    pub async fn invite(&self, id: Uuid, fornecedor_ids: &[Uuid]) -> Result<SourcingEventDetail, AppError> {
        let event = self.repo.find_event(&self.pool, id).await?;
        if event.status.is_closed() {
            return Err(AppError::BusinessRule("sourcing_closed"));
        }

        let suppliers = self.supplier_repo.find_many(&self.pool, fornecedor_ids).await?;
        let all_found = fornecedor_ids.iter().all(|id| suppliers.iter().any(|s| s.id == *id));
        if !all_found {
            return Err(AppError::ResourceNotFound("supplier"));
        }
        if suppliers.iter().any(|s| s.status != SupplierStatus::Qualificado) {
            return Err(AppError::BusinessRule("supplier_not_qualified"));
        }

        self.repo.invite(&self.pool, id, fornecedor_ids).await?;
        self.get_event(id).await
    }

    pub async fn submit_proposal(&self, id: Uuid, input: &SubmitProposalPayload) -> Result<Proposal, AppError> {
        let event = self.repo.find_event(&self.pool, id).await?;
        if event.status != SourcingStatus::Aberto {
            return Err(AppError::BusinessRule("sourcing_not_open"));
        }
        if !self.repo.is_invited(id, input.fornecedor_id).await? {
            return Err(AppError::BusinessRule("sourcing_not_invited"));
        }

        let proposal = self.repo.upsert_proposal(id, input).await?;
        tracing::info!(evento = %id, fornecedor = %input.fornecedor_id, valor = %proposal.valor, "proposta recebida");
        Ok(proposal)
    }

    pub async fn add_criterion(&self, id: Uuid, input: &AddCriterionPayload) -> Result<EvaluationCriterion, AppError> {
        let event = self.repo.find_event(&self.pool, id).await?;
        if event.status.is_closed() {
            return Err(AppError::BusinessRule("sourcing_closed"));
        }
        self.repo.add_criterion(id, input).await
    }

    pub async fn score_proposal(
        &self,
        id: Uuid,
        proposta_id: Uuid,
        notas: &[ScoreInput],
        avaliador_id: Uuid,
    ) -> Result<Vec<RankedProposal>, AppError> {
        let mut tx = self.pool.begin().await?;

        let event = self.repo.find_event_for_update(&mut tx, id).await?;
        if event.status != SourcingStatus::EmAvaliacao {
            return Err(AppError::BusinessRule("sourcing_not_in_evaluation"));
        }

        let proposal = self.repo.find_proposal(&mut *tx, proposta_id).await?;
        if proposal.evento_id != id {
            return Err(AppError::BusinessRule("proposal_not_in_event"));
        }

        let criteria = self.repo.criteria(&mut *tx, id).await?;
        if notas.iter().any(|n| !criteria.iter().any(|c| c.id == n.criterio_id)) {
            return Err(AppError::BusinessRule("criterion_not_in_event"));
        }

        self.repo.save_scores(&mut tx, proposta_id, notas, avaliador_id).await?;
        tx.commit().await?;

        self.ranking(id).await
    }

    pub async fn ranking(&self, id: Uuid) -> Result<Vec<RankedProposal>, AppError> {
        // 404 para evento inexistente
        self.repo.find_event(&self.pool, id).await?;

        let proposals = self.repo.proposals(&self.pool, id).await?;
        let criteria = self.repo.criteria(&self.pool, id).await?;
        let scores = self.repo.scores(&self.pool, id).await?;

        Ok(rank_proposals(&proposals, &criteria, &scores))
    }

    /// Escolhe a proposta vencedora e encerra o evento.
    pub async fn award(&self, id: Uuid, proposta_id: Uuid) -> Result<SourcingEvent, AppError> {
        let mut tx = self.pool.begin().await?;

        let event = self.repo.find_event_for_update(&mut tx, id).await?;
        if event.status.is_closed() {
            return Err(AppError::BusinessRule("sourcing_closed"));
        }
        if event.status != SourcingStatus::EmAvaliacao {
            return Err(AppError::BusinessRule("sourcing_not_in_evaluation"));
        }

        let proposal = self.repo.find_proposal(&mut *tx, proposta_id).await?;
        if proposal.evento_id != id {
            return Err(AppError::BusinessRule("proposal_not_in_event"));
        }

        let event = self.repo.award(&mut *tx, id, proposta_id).await?;
        tx.commit().await?;

        tracing::info!(evento = %id, proposta = %proposta_id, "evento adjudicado");
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dec(v: &str) -> Decimal {
        v.parse().unwrap()
    }

    fn proposal(valor: &str) -> Proposal {
        Proposal {
            id: Uuid::new_v4(),
            evento_id: Uuid::nil(),
            fornecedor_id: Uuid::new_v4(),
            valor: dec(valor),
            prazo_entrega_dias: None,
            observacoes: None,
            enviada_em: Utc::now(),
        }
    }

    fn criterion(peso: &str) -> EvaluationCriterion {
        EvaluationCriterion { id: Uuid::new_v4(), evento_id: Uuid::nil(), nome: "c".into(), peso: dec(peso) }
    }

    fn score(p: &Proposal, c: &EvaluationCriterion, nota: &str) -> ProposalScore {
        ProposalScore { proposta_id: p.id, criterio_id: c.id, nota: dec(nota), avaliador_id: Uuid::nil() }
    }

    #[test]
    fn weighted_average_orders_proposals() {
        let tecnica = criterion("3");
        let preco = criterion("1");
        let a = proposal("1000");
        let b = proposal("800");

        let scores = vec![
            score(&a, &tecnica, "9"),
            score(&a, &preco, "5"),
            score(&b, &tecnica, "6"),
            score(&b, &preco, "10"),
        ];

        let ranking = rank_proposals(&[b.clone(), a.clone()], &[tecnica, preco], &scores);

        // a = (27 + 5) / 4 = 8; b = (18 + 10) / 4 = 7
        assert_eq!(ranking[0].proposta_id, a.id);
        assert_eq!(ranking[0].nota_ponderada, dec("8"));
        assert_eq!(ranking[0].posicao, 1);
        assert_eq!(ranking[1].proposta_id, b.id);
        assert_eq!(ranking[1].nota_ponderada, dec("7"));
        assert_eq!(ranking[1].posicao, 2);
    }

    #[test]
    fn missing_scores_count_as_zero() {
        let c1 = criterion("1");
        let c2 = criterion("1");
        let p = proposal("500");

        let ranking = rank_proposals(&[p.clone()], &[c1.clone(), c2], &[score(&p, &c1, "8")]);

        assert_eq!(ranking[0].nota_ponderada, dec("4"));
    }

    #[test]
    fn ties_go_to_the_cheaper_proposal() {
        let c = criterion("2");
        let cara = proposal("900");
        let barata = proposal("700");

        let scores = vec![score(&cara, &c, "7"), score(&barata, &c, "7")];
        let ranking = rank_proposals(&[cara.clone(), barata.clone()], &[c], &scores);

        assert_eq!(ranking[0].proposta_id, barata.id);
        assert_eq!(ranking[1].proposta_id, cara.id);
    }

    #[test]
    fn no_criteria_means_everyone_scores_zero() {
        let p = proposal("100");
        let q = proposal("50");
        let ranking = rank_proposals(&[p, q.clone()], &[], &[]);

        assert!(ranking.iter().all(|r| r.nota_ponderada.is_zero()));
        assert_eq!(ranking[0].proposta_id, q.id);
    }
}
