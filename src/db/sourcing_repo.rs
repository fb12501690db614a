// src/db/sourcing_repo.rs

use sqlx::{Executor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sourcing::{
        AddCriterionPayload, CreateSourcingEventPayload, EvaluationCriterion, Proposal, ProposalScore,
        ScoreInput, SourcingEvent, SourcingInvitation, SourcingStatus, SubmitProposalPayload,
    },
};

const EVENT_COLUMNS: &str =
    "id, tipo, titulo, descricao, prazo, status, criado_por, vencedor_proposta_id, created_at, updated_at";
const PROPOSAL_COLUMNS: &str = "id, evento_id, fornecedor_id, valor, prazo_entrega_dias, observacoes, enviada_em";

#[derive(Clone)]
pub struct SourcingRepository {
    pool: PgPool,
}

impl SourcingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  EVENTOS
    // =========================================================================

    pub async fn list_events(&self, status: Option<SourcingStatus>) -> Result<Vec<SourcingEvent>, AppError> {
        let rows = sqlx::query_as::<_, SourcingEvent>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM eventos_sourcing
            WHERE ($1::sourcing_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_event<'e, E>(&self, executor: E, id: Uuid) -> Result<SourcingEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SourcingEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM eventos_sourcing WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("sourcing_event"))
    }

    pub async fn find_event_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<SourcingEvent, AppError> {
        sqlx::query_as::<_, SourcingEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM eventos_sourcing WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::ResourceNotFound("sourcing_event"))
    }

    pub async fn create_event(
        &self,
        input: &CreateSourcingEventPayload,
        criado_por: Uuid,
    ) -> Result<SourcingEvent, AppError> {
        let event = sqlx::query_as::<_, SourcingEvent>(&format!(
            r#"
            INSERT INTO eventos_sourcing (tipo, titulo, descricao, prazo, criado_por)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(input.tipo)
        .bind(&input.titulo)
        .bind(&input.descricao)
        .bind(input.prazo)
        .bind(criado_por)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: SourcingStatus) -> Result<SourcingEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SourcingEvent>(&format!(
            "UPDATE eventos_sourcing SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("sourcing_event"))
    }

    pub async fn award<'e, E>(&self, executor: E, id: Uuid, proposta_id: Uuid) -> Result<SourcingEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SourcingEvent>(&format!(
            r#"
            UPDATE eventos_sourcing
            SET status = 'encerrado', vencedor_proposta_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(proposta_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("sourcing_event"))
    }

    // =========================================================================
    //  CONVITES
    // =========================================================================

    pub async fn invite<'e, E>(&self, executor: E, evento_id: Uuid, fornecedor_ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO convites_sourcing (evento_id, fornecedor_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT (evento_id, fornecedor_id) DO NOTHING
            "#,
        )
        .bind(evento_id)
        .bind(fornecedor_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn invitations<'e, E>(&self, executor: E, evento_id: Uuid) -> Result<Vec<SourcingInvitation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, SourcingInvitation>(
            r#"
            SELECT evento_id, fornecedor_id, convidado_em
            FROM convites_sourcing
            WHERE evento_id = $1
            ORDER BY convidado_em
            "#,
        )
        .bind(evento_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn is_invited(&self, evento_id: Uuid, fornecedor_id: Uuid) -> Result<bool, AppError> {
        let (invited,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM convites_sourcing WHERE evento_id = $1 AND fornecedor_id = $2)",
        )
        .bind(evento_id)
        .bind(fornecedor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(invited)
    }

    // =========================================================================
    //  PROPOSTAS
    // =========================================================================

    /// Uma proposta por fornecedor: reenvio substitui a anterior.
    pub async fn upsert_proposal(&self, evento_id: Uuid, input: &SubmitProposalPayload) -> Result<Proposal, AppError> {
        let proposal = sqlx::query_as::<_, Proposal>(&format!(
            r#"
            INSERT INTO propostas (evento_id, fornecedor_id, valor, prazo_entrega_dias, observacoes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (evento_id, fornecedor_id) DO UPDATE
            SET valor = EXCLUDED.valor,
                prazo_entrega_dias = EXCLUDED.prazo_entrega_dias,
                observacoes = EXCLUDED.observacoes,
                enviada_em = NOW()
            RETURNING {PROPOSAL_COLUMNS}
            "#
        ))
        .bind(evento_id)
        .bind(input.fornecedor_id)
        .bind(input.valor)
        .bind(input.prazo_entrega_dias)
        .bind(&input.observacoes)
        .fetch_one(&self.pool)
        .await?;

        Ok(proposal)
    }

    pub async fn proposals<'e, E>(&self, executor: E, evento_id: Uuid) -> Result<Vec<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Proposal>(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM propostas WHERE evento_id = $1 ORDER BY enviada_em"
        ))
        .bind(evento_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn find_proposal<'e, E>(&self, executor: E, id: Uuid) -> Result<Proposal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Proposal>(&format!("SELECT {PROPOSAL_COLUMNS} FROM propostas WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ResourceNotFound("proposal"))
    }

    // =========================================================================
    //  CRITÉRIOS E NOTAS
    // =========================================================================

    pub async fn add_criterion(&self, evento_id: Uuid, input: &AddCriterionPayload) -> Result<EvaluationCriterion, AppError> {
        let criterion = sqlx::query_as::<_, EvaluationCriterion>(
            r#"
            INSERT INTO criterios_avaliacao (evento_id, nome, peso)
            VALUES ($1, $2, $3)
            RETURNING id, evento_id, nome, peso
            "#,
        )
        .bind(evento_id)
        .bind(&input.nome)
        .bind(input.peso)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, format!("critério '{}'", input.nome)))?;

        Ok(criterion)
    }

    pub async fn criteria<'e, E>(&self, executor: E, evento_id: Uuid) -> Result<Vec<EvaluationCriterion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, EvaluationCriterion>(
            "SELECT id, evento_id, nome, peso FROM criterios_avaliacao WHERE evento_id = $1 ORDER BY nome",
        )
        .bind(evento_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn save_scores(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        proposta_id: Uuid,
        notas: &[ScoreInput],
        avaliador_id: Uuid,
    ) -> Result<(), AppError> {
        for nota in notas {
            sqlx::query(
                r#"
                INSERT INTO notas_proposta (proposta_id, criterio_id, nota, avaliador_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (proposta_id, criterio_id) DO UPDATE
                SET nota = EXCLUDED.nota, avaliador_id = EXCLUDED.avaliador_id
                "#,
            )
            .bind(proposta_id)
            .bind(nota.criterio_id)
            .bind(nota.nota)
            .bind(avaliador_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    pub async fn scores<'e, E>(&self, executor: E, evento_id: Uuid) -> Result<Vec<ProposalScore>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ProposalScore>(
            r#"
            SELECT n.proposta_id, n.criterio_id, n.nota, n.avaliador_id
            FROM notas_proposta n
            JOIN propostas p ON p.id = n.proposta_id
            WHERE p.evento_id = $1
            "#,
        )
        .bind(evento_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }
}
