// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

/// 1. O Trait que define um Módulo protegível
pub trait ModuleDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. Registro em tempo de compilação: cada módulo declarado aqui é
/// semeado na tabela `modules` na inicialização, se ainda não existir.
#[derive(Debug)]
pub struct ModuleRegistration {
    pub slug: &'static str,
    pub nome: &'static str,
    pub descricao: &'static str,
    pub categoria: &'static str,
    pub ordem: i32,
}

inventory::collect!(ModuleRegistration);

pub fn registered_modules() -> Vec<&'static ModuleRegistration> {
    let mut modules: Vec<_> = inventory::iter::<ModuleRegistration>.into_iter().collect();
    modules.sort_by_key(|m| (m.ordem, m.slug));
    modules
}

macro_rules! define_module {
    ($name:ident, $slug:literal, $nome:literal, $descricao:literal, $categoria:literal, $ordem:literal) => {
        pub struct $name;
        impl ModuleDef for $name {
            fn slug() -> &'static str {
                $slug
            }
        }
        inventory::submit! {
            ModuleRegistration {
                slug: $slug,
                nome: $nome,
                descricao: $descricao,
                categoria: $categoria,
                ordem: $ordem,
            }
        }
    };
}

// ---
// DEFINIÇÃO DOS MÓDULOS
// ---

define_module!(ModFornecedores, "fornecedores", "Fornecedores", "Cadastro, qualificação e avaliação de fornecedores", "cadastros", 10);
define_module!(ModRequisicoes, "requisicoes", "Requisições", "Solicitações internas de compra", "compras", 20);
define_module!(ModAprovacoes, "aprovacoes", "Aprovações", "Aprovação e rejeição de requisições", "compras", 30);
define_module!(ModPedidos, "pedidos", "Pedidos de Compra", "Emissão e acompanhamento de pedidos", "compras", 40);
define_module!(ModSourcing, "sourcing", "Sourcing", "Eventos de RFP, RFQ e cotação", "compras", 50);
define_module!(ModMensagens, "mensagens", "Mensagens", "Conversas internas e com fornecedores", "comunicacao", 60);
define_module!(ModRelatorios, "relatorios", "Relatórios", "Painel e exportações CSV", "gestao", 70);

/// 3. O Extractor (Guardião): só deixa passar quem tem o módulo liberado
pub struct RequireModule<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireModule<T>
where
    T: ModuleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});

        // A. Extrai Usuário
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Pega o slug do módulo
        let required = T::slug();

        // C. Resolve os módulos efetivos do usuário
        let modules = app_state
            .access_service
            .effective_module_slugs(&user.0)
            .await
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        if !modules.iter().any(|m| m == required) {
            tracing::debug!(user_id = %user.0.id, module = required, "acesso negado ao módulo");
            return Err(AppError::ModuleAccessDenied(required.to_string())
                .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireModule(PhantomData))
    }
}

/// Guardião das telas de administração (equivalente ao `is_admin`).
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.0.is_admin() {
            let app_state = AppState::from_ref(state);
            let locale = Locale::from_request_parts(parts, state)
                .await
                .unwrap_or_else(|never| match never {});
            return Err(AppError::AdminRequired.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_declared_module_is_registered_once_in_order() {
        let slugs: Vec<&str> = registered_modules().iter().map(|m| m.slug).collect();
        assert_eq!(
            slugs,
            vec!["fornecedores", "requisicoes", "aprovacoes", "pedidos", "sourcing", "mensagens", "relatorios"]
        );
    }

    #[test]
    fn module_types_expose_their_slug() {
        assert_eq!(ModPedidos::slug(), "pedidos");
        assert_eq!(ModAprovacoes::slug(), "aprovacoes");
    }
}
