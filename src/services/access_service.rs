// src/services/access_service.rs

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccessRepository, UserRepository, WorkspaceRepository},
    middleware::rbac::registered_modules,
    models::{
        access::{
            BatchOperation, CreateModulePayload, CreateRoleTemplatePayload, Module, PermissionChange,
            PermissionMatrix, RoleTemplate, ToggleResult, UpdateModulePayload,
        },
        auth::{Profile, UserRole},
    },
    services::batch_service::BatchTarget,
};

/// Calcula os módulos efetivos de um perfil.
///
/// `active` já vem ordenado por `ordem`. Admin recebe todos os ativos; os
/// demais recebem a união do que o papel e o próprio usuário têm,
/// restrita aos módulos habilitados no workspace padrão (lista vazia ou
/// ausente não restringe nada).
pub fn resolve_effective_modules(
    role: UserRole,
    active: &[Module],
    role_slugs: &[String],
    user_slugs: &[String],
    workspace_enabled: Option<&[String]>,
) -> Vec<String> {
    if role == UserRole::Admin {
        return active.iter().map(|m| m.slug.clone()).collect();
    }

    let granted: HashSet<&str> = role_slugs
        .iter()
        .chain(user_slugs.iter())
        .map(String::as_str)
        .collect();

    let allowed_by_workspace = |slug: &str| match workspace_enabled {
        Some(enabled) if !enabled.is_empty() => enabled.iter().any(|e| e == slug),
        _ => true,
    };

    active
        .iter()
        .filter(|m| granted.contains(m.slug.as_str()) && allowed_by_workspace(&m.slug))
        .map(|m| m.slug.clone())
        .collect()
}

/// O que um toggle faz com o par perfil/módulo.
pub fn toggle_outcome(role: UserRole, removed_rows: u64) -> Result<PermissionChange, AppError> {
    if role == UserRole::Admin {
        return Err(AppError::BadRequest("admin_role_is_implicit"));
    }
    Ok(if removed_rows > 0 {
        PermissionChange::Revoked
    } else {
        PermissionChange::Granted
    })
}

#[derive(Clone)]
pub struct AccessService {
    repo: AccessRepository,
    user_repo: UserRepository,
    workspace_repo: WorkspaceRepository,
    pool: PgPool,
}

impl AccessService {
    pub fn new(
        repo: AccessRepository,
        user_repo: UserRepository,
        workspace_repo: WorkspaceRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, user_repo, workspace_repo, pool }
    }

    /// Semeia na tabela `modules` os módulos declarados no código.
    pub async fn sync_registered_modules(&self) -> Result<usize, AppError> {
        let mut inserted = 0;
        for module in registered_modules() {
            let created = self
                .repo
                .insert_module_if_missing(module.slug, module.nome, module.descricao, module.categoria, module.ordem)
                .await?;
            if created {
                tracing::info!(slug = module.slug, "módulo registrado");
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    pub async fn effective_module_slugs(&self, profile: &Profile) -> Result<Vec<String>, AppError> {
        let active = self.repo.active_modules().await?;

        if profile.is_admin() {
            return Ok(resolve_effective_modules(profile.role, &active, &[], &[], None));
        }

        let role_slugs = self.repo.role_module_slugs(profile.role).await?;
        let user_slugs = self.repo.user_module_slugs(profile.id).await?;
        let workspace = self.workspace_repo.find_default().await?;

        Ok(resolve_effective_modules(
            profile.role,
            &active,
            &role_slugs,
            &user_slugs,
            workspace.as_ref().map(|w| w.modulos_habilitados.as_slice()),
        ))
    }

    // =========================================================================
    //  MÓDULOS
    // =========================================================================

    pub async fn list_modules(&self) -> Result<Vec<Module>, AppError> {
        self.repo.list_modules().await
    }

    pub async fn create_module(&self, input: &CreateModulePayload) -> Result<Module, AppError> {
        self.repo.create_module(input).await
    }

    pub async fn update_module(&self, id: Uuid, input: &UpdateModulePayload) -> Result<Module, AppError> {
        self.repo.update_module(id, input).await
    }

    pub async fn delete_module(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_module(id).await
    }

    // =========================================================================
    //  MATRIZ DE PERMISSÕES
    // =========================================================================

    pub async fn permission_matrix(&self) -> Result<PermissionMatrix, AppError> {
        let modules = self.repo.list_modules().await?;
        let permissions = self.repo.list_permissions().await?;

        let mut grants: BTreeMap<String, Vec<Uuid>> = UserRole::ALL
            .iter()
            .map(|r| (r.as_str().to_string(), Vec::new()))
            .collect();

        // Admin é implícito: aparece com todos os módulos
        if let Some(admin) = grants.get_mut(UserRole::Admin.as_str()) {
            admin.extend(modules.iter().map(|m| m.id));
        }

        for p in permissions.into_iter().filter(|p| p.role != UserRole::Admin) {
            grants.entry(p.role.as_str().to_string()).or_default().push(p.module_id);
        }

        Ok(PermissionMatrix { modules, grants })
    }

    /// Existe -> remove; não existe -> insere.
    pub async fn toggle_permission(&self, role: UserRole, module_id: Uuid) -> Result<ToggleResult, AppError> {
        toggle_outcome(role, 0)?;

        let mut tx = self.pool.begin().await?;

        let removed = self.repo.delete_permission(&mut *tx, role, module_id).await?;
        let change = toggle_outcome(role, removed)?;

        if change == PermissionChange::Granted {
            self.repo.insert_permission(&mut *tx, role, module_id).await?;
        }

        tx.commit().await?;

        tracing::info!(role = role.as_str(), %module_id, ?change, "permissão alternada");

        Ok(ToggleResult { role, module_id, change })
    }

    // =========================================================================
    //  TEMPLATES
    // =========================================================================

    pub async fn list_templates(&self) -> Result<Vec<RoleTemplate>, AppError> {
        self.repo.list_templates().await
    }

    pub async fn create_template(&self, input: &CreateRoleTemplatePayload) -> Result<RoleTemplate, AppError> {
        self.repo.create_template(input).await
    }

    pub async fn delete_template(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_template(id).await
    }

    /// Aplica o template: troca o papel do usuário e substitui as
    /// liberações diretas pelos módulos do template, tudo ou nada.
    pub async fn apply_role_template(&self, template_id: Uuid, user_id: Uuid) -> Result<Profile, AppError> {
        let mut tx = self.pool.begin().await?;

        let template = self.repo.find_template(&mut *tx, template_id).await?;
        let modules = self.repo.find_modules_by_slugs(&mut *tx, &template.module_slugs).await?;
        let module_ids: Vec<Uuid> = modules.iter().map(|m| m.id).collect();

        let profile = self
            .user_repo
            .update_profile(&mut *tx, user_id, Some(template.role), None)
            .await?;

        self.repo.clear_user_modules(&mut *tx, user_id).await?;
        if !module_ids.is_empty() {
            self.repo.grant_user_modules(&mut *tx, user_id, &module_ids).await?;
        }

        tx.commit().await?;

        tracing::info!(%user_id, template = %template.nome, modules = module_ids.len(), "template aplicado");

        Ok(profile)
    }

    // =========================================================================
    //  PERFIS
    // =========================================================================

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.user_repo.list_profiles().await
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        role: Option<UserRole>,
        ativo: Option<bool>,
    ) -> Result<Profile, AppError> {
        self.user_repo.update_profile(&self.pool, user_id, role, ativo).await
    }
}

#[async_trait]
impl BatchTarget for AccessService {
    async fn apply(&self, user_id: Uuid, op: BatchOperation) -> Result<(), AppError> {
        match op {
            BatchOperation::SetRole(role) => {
                self.update_profile(user_id, Some(role), None).await?;
            }
            BatchOperation::ApplyTemplate(template_id) => {
                self.apply_role_template(template_id, user_id).await?;
            }
            BatchOperation::SetActive(ativo) => {
                self.update_profile(user_id, None, Some(ativo)).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn module(slug: &str, ordem: i32) -> Module {
        Module {
            id: Uuid::new_v4(),
            slug: slug.into(),
            nome: slug.into(),
            descricao: None,
            categoria: "compras".into(),
            ativo: true,
            ordem,
            created_at: Utc::now(),
        }
    }

    fn active() -> Vec<Module> {
        vec![module("fornecedores", 10), module("requisicoes", 20), module("pedidos", 40), module("relatorios", 70)]
    }

    fn slugs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn admin_sees_every_active_module() {
        let enabled = slugs(&["pedidos"]);
        let result = resolve_effective_modules(UserRole::Admin, &active(), &[], &[], Some(enabled.as_slice()));
        assert_eq!(result, slugs(&["fornecedores", "requisicoes", "pedidos", "relatorios"]));
    }

    #[test]
    fn role_and_user_grants_are_merged_in_module_order() {
        let result = resolve_effective_modules(
            UserRole::Comprador,
            &active(),
            &slugs(&["pedidos", "fornecedores"]),
            &slugs(&["relatorios", "pedidos"]),
            None,
        );
        assert_eq!(result, slugs(&["fornecedores", "pedidos", "relatorios"]));
    }

    #[test]
    fn inactive_or_unknown_grants_are_ignored() {
        let result = resolve_effective_modules(
            UserRole::Visualizador,
            &active(),
            &slugs(&["sourcing"]),
            &[],
            None,
        );
        assert!(result.is_empty());
    }

    #[test]
    fn default_workspace_narrows_non_admin_modules() {
        let enabled = slugs(&["fornecedores", "relatorios"]);
        let result = resolve_effective_modules(
            UserRole::Gestor,
            &active(),
            &slugs(&["fornecedores", "pedidos", "relatorios"]),
            &[],
            Some(enabled.as_slice()),
        );
        assert_eq!(result, slugs(&["fornecedores", "relatorios"]));

        let unrestricted =
            resolve_effective_modules(UserRole::Gestor, &active(), &slugs(&["pedidos"]), &[], Some(&[][..]));
        assert_eq!(unrestricted, slugs(&["pedidos"]));
    }

    #[test]
    fn toggle_grants_when_nothing_was_removed_and_revokes_otherwise() {
        assert_eq!(toggle_outcome(UserRole::Comprador, 0).unwrap(), PermissionChange::Granted);
        assert_eq!(toggle_outcome(UserRole::Comprador, 1).unwrap(), PermissionChange::Revoked);
    }

    #[test]
    fn admin_role_cannot_be_toggled() {
        let err = toggle_outcome(UserRole::Admin, 0).unwrap_err();
        assert!(matches!(err, AppError::BadRequest("admin_role_is_implicit")));
    }
}
