// src/services/workspace_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::WorkspaceRepository,
    models::workspace::{
        CreateFeatureFlagPayload, CreateWorkspacePayload, FeatureFlag, FlagEvaluation, FlagStrategy,
        UpdateFeatureFlagPayload, UpdateWorkspacePayload, Workspace,
    },
};

/// Avalia uma flag para um usuário. Flag inexistente vale como desligada.
pub fn evaluate_flag(chave: &str, flag: Option<&FeatureFlag>, user_id: Uuid) -> FlagEvaluation {
    let Some(flag) = flag else {
        return FlagEvaluation {
            chave: chave.to_string(),
            enabled: false,
            estrategia: FlagStrategy::Desabilitado,
            motivo: "flag não encontrada".to_string(),
        };
    };

    let (enabled, motivo) = match flag.estrategia {
        FlagStrategy::Global => (true, "ligada para todos".to_string()),
        FlagStrategy::Desabilitado => (false, "flag desabilitada".to_string()),
        FlagStrategy::Lista => {
            if flag.usuarios_permitidos.contains(&user_id) {
                (true, "usuário na lista".to_string())
            } else {
                (false, "usuário fora da lista".to_string())
            }
        }
        FlagStrategy::Percentual => {
            let pct = flag.percentual.unwrap_or(0).clamp(0, 100) as u128;
            let bucket = user_id.as_u128() % 100;
            (bucket < pct, format!("faixa {bucket} de {pct}%"))
        }
    };

    FlagEvaluation { chave: flag.chave.clone(), enabled, estrategia: flag.estrategia, motivo }
}

#[derive(Clone)]
pub struct WorkspaceService {
    repo: WorkspaceRepository,
    pool: PgPool,
}

impl WorkspaceService {
    pub fn new(repo: WorkspaceRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<Workspace>, AppError> {
        self.repo.list().await
    }

    pub async fn create(&self, input: &CreateWorkspacePayload) -> Result<Workspace, AppError> {
        self.repo.create(input).await
    }

    pub async fn update(&self, id: Uuid, input: &UpdateWorkspacePayload) -> Result<Workspace, AppError> {
        self.repo.update(id, input).await
    }

    /// Só um workspace é padrão por vez.
    pub async fn set_default(&self, id: Uuid) -> Result<Workspace, AppError> {
        let mut tx = self.pool.begin().await?;

        self.repo.clear_default(&mut *tx).await?;
        let workspace = self.repo.set_default(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!(workspace = %workspace.slug, "workspace padrão alterado");
        Ok(workspace)
    }

    // =========================================================================
    //  FEATURE FLAGS
    // =========================================================================

    pub async fn list_flags(&self) -> Result<Vec<FeatureFlag>, AppError> {
        self.repo.list_flags().await
    }

    pub async fn create_flag(&self, input: &CreateFeatureFlagPayload) -> Result<FeatureFlag, AppError> {
        self.repo.create_flag(input).await
    }

    pub async fn update_flag(&self, chave: &str, input: &UpdateFeatureFlagPayload) -> Result<FeatureFlag, AppError> {
        self.repo.update_flag(chave, input).await
    }

    pub async fn delete_flag(&self, chave: &str) -> Result<(), AppError> {
        self.repo.delete_flag(chave).await
    }

    pub async fn evaluate(&self, chave: &str, user_id: Uuid) -> Result<FlagEvaluation, AppError> {
        let flag = self.repo.find_flag(chave).await?;
        Ok(evaluate_flag(chave, flag.as_ref(), user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn flag(estrategia: FlagStrategy) -> FeatureFlag {
        FeatureFlag {
            id: Uuid::new_v4(),
            chave: "novo_fluxo".into(),
            descricao: None,
            estrategia,
            percentual: None,
            usuarios_permitidos: vec![],
            workspace_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_flag_is_disabled() {
        let eval = evaluate_flag("nao_existe", None, Uuid::new_v4());
        assert!(!eval.enabled);
        assert_eq!(eval.motivo, "flag não encontrada");
        assert_eq!(eval.chave, "nao_existe");
    }

    #[test]
    fn global_and_disabled_ignore_the_user() {
        assert!(evaluate_flag("x", Some(&flag(FlagStrategy::Global)), Uuid::new_v4()).enabled);
        assert!(!evaluate_flag("x", Some(&flag(FlagStrategy::Desabilitado)), Uuid::new_v4()).enabled);
    }

    #[test]
    fn list_strategy_checks_membership() {
        let allowed = Uuid::new_v4();
        let mut f = flag(FlagStrategy::Lista);
        f.usuarios_permitidos = vec![allowed];

        assert!(evaluate_flag("x", Some(&f), allowed).enabled);
        assert!(!evaluate_flag("x", Some(&f), Uuid::new_v4()).enabled);
    }

    #[test]
    fn percentage_strategy_buckets_by_user_id() {
        let mut f = flag(FlagStrategy::Percentual);
        // 0x...2a = 42, 42 % 100 = 42
        let user = Uuid::from_u128(42);

        f.percentual = Some(43);
        assert!(evaluate_flag("x", Some(&f), user).enabled);

        f.percentual = Some(42);
        assert!(!evaluate_flag("x", Some(&f), user).enabled);

        f.percentual = Some(100);
        assert!(evaluate_flag("x", Some(&f), Uuid::from_u128(199)).enabled);

        f.percentual = Some(0);
        assert!(!evaluate_flag("x", Some(&f), Uuid::from_u128(100)).enabled);
    }

    #[test]
    fn percentage_bucket_is_stable_for_the_same_user() {
        let mut f = flag(FlagStrategy::Percentual);
        f.percentual = Some(50);
        let user = Uuid::new_v4();
        let first = evaluate_flag("x", Some(&f), user).enabled;
        for _ in 0..10 {
            assert_eq!(evaluate_flag("x", Some(&f), user).enabled, first);
        }
    }
}
