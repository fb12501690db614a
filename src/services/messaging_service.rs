// src/services/messaging_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MessagingRepository,
    models::messaging::{
        participants_with_creator, Conversation, ConversationSummary, CreateConversationPayload, Message,
    },
};

#[derive(Clone)]
pub struct MessagingService {
    repo: MessagingRepository,
    pool: PgPool,
}

impl MessagingService {
    pub fn new(repo: MessagingRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create_conversation(
        &self,
        input: &CreateConversationPayload,
        creator: Uuid,
    ) -> Result<Conversation, AppError> {
        let participants = participants_with_creator(creator, &input.participantes);

        let mut tx = self.pool.begin().await?;

        let mut conversation = self
            .repo
            .create_conversation(&mut *tx, &input.assunto, input.fornecedor_id, input.pedido_id, creator)
            .await?;
        self.repo.add_participants(&mut *tx, conversation.id, &participants).await?;

        if let Some(texto) = input.mensagem_inicial.as_deref() {
            let first = self.repo.insert_message(&mut *tx, conversation.id, creator, texto).await?;
            conversation.ultima_mensagem_em = Some(first.created_at);
        }

        tx.commit().await?;

        tracing::info!(conversa = %conversation.id, participantes = participants.len(), "conversa criada");
        Ok(conversation)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>, AppError> {
        self.repo.list_for_user(user_id).await
    }

    /// 404 se a conversa não existe, 403 se existe mas o usuário não participa.
    async fn ensure_participant(&self, conversa_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if self.repo.is_participant(conversa_id, user_id).await? {
            return Ok(());
        }
        if self.repo.conversation_exists(conversa_id).await? {
            Err(AppError::Forbidden("not_a_participant"))
        } else {
            Err(AppError::ResourceNotFound("conversation"))
        }
    }

    pub async fn messages(&self, conversa_id: Uuid, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        self.ensure_participant(conversa_id, user_id).await?;
        self.repo.messages(conversa_id).await
    }

    pub async fn send(&self, conversa_id: Uuid, user_id: Uuid, conteudo: &str) -> Result<Message, AppError> {
        self.ensure_participant(conversa_id, user_id).await?;
        self.repo.insert_message(&self.pool, conversa_id, user_id, conteudo).await
    }

    pub async fn mark_read(&self, conversa_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        self.ensure_participant(conversa_id, user_id).await?;
        self.repo.mark_read(conversa_id, user_id).await
    }
}
