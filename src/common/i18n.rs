// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";

// Catálogo de mensagens: (chave, português, inglês)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("email_already_exists", "Este e-mail já está em uso.", "This e-mail is already in use."),
    ("invalid_credentials", "E-mail ou senha inválidos.", "Invalid e-mail or password."),
    ("invalid_token", "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
    ("user_not_found", "Usuário não encontrado.", "User not found."),
    ("inactive_profile", "Seu perfil está inativo. Procure um administrador.", "Your profile is inactive. Contact an administrator."),
    ("admin_required", "Apenas administradores podem realizar esta ação.", "Only administrators can perform this action."),
    ("module_access_denied", "Você não tem acesso ao módulo '{0}'.", "You do not have access to the '{0}' module."),
    ("resource_not_found", "{0} não encontrado.", "{0} not found."),
    ("unique_violation", "Registro duplicado: {0}.", "Duplicate record: {0}."),
    ("invalid_transition", "Não é possível mudar o status de '{0}' para '{1}'.", "Cannot change status from '{0}' to '{1}'."),
    ("invalid_cnpj", "CNPJ inválido.", "Invalid CNPJ."),
    ("internal_error", "Ocorreu um erro inesperado.", "An unexpected error occurred."),

    // Regras de negócio
    ("admin_role_is_implicit", "O perfil admin tem acesso a todos os módulos e não pode ser alterado.", "The admin role has every module and cannot be changed."),
    ("batch_missing_role", "Informe o perfil para a ação 'alterar_role'.", "A role is required for the 'alterar_role' action."),
    ("batch_missing_template", "Informe o template para a ação 'aplicar_template'.", "A template is required for the 'aplicar_template' action."),
    ("supplier_not_qualified", "O fornecedor precisa estar qualificado.", "The supplier must be qualified."),
    ("requisition_without_items", "A requisição precisa de ao menos um item.", "The requisition needs at least one item."),
    ("rejection_reason_required", "Informe o motivo da rejeição.", "A rejection reason is required."),
    ("order_not_editable", "Itens só podem ser alterados em pedidos em rascunho.", "Items can only change while the order is a draft."),
    ("order_without_items", "O pedido precisa de ao menos um item.", "The order needs at least one item."),
    ("sourcing_not_open", "O evento não está aberto para propostas.", "The event is not accepting proposals."),
    ("sourcing_not_invited", "O fornecedor não foi convidado para este evento.", "The supplier was not invited to this event."),
    ("sourcing_not_in_evaluation", "O evento precisa estar em avaliação.", "The event must be under evaluation."),
    ("sourcing_closed", "O evento já foi encerrado.", "The event is already closed."),
    ("proposal_not_in_event", "A proposta não pertence a este evento.", "The proposal does not belong to this event."),
    ("criterion_not_in_event", "O critério não pertence a este evento.", "The criterion does not belong to this event."),
    ("not_a_participant", "Você não participa desta conversa.", "You are not part of this conversation."),
    ("unknown_export", "Exportação desconhecida.", "Unknown export."),

    // Mensagens dos validadores
    ("email_invalid", "O e-mail fornecido é inválido.", "The e-mail is invalid."),
    ("password_too_short", "A senha deve ter no mínimo 6 caracteres.", "The password must be at least 6 characters long."),
    ("name_too_short", "O nome deve ter no mínimo 2 caracteres.", "The name must be at least 2 characters long."),
    ("required", "Campo obrigatório.", "Required field."),
    ("must_be_positive", "O valor deve ser maior que zero.", "The value must be greater than zero."),
    ("must_not_be_negative", "O valor não pode ser negativo.", "The value cannot be negative."),
    ("percentage_range", "O percentual deve estar entre 0 e 100.", "The percentage must be between 0 and 100."),
    ("score_range", "A nota deve estar entre 0 e 10.", "The score must be between 0 and 10."),
    ("message_length", "A mensagem deve ter entre 1 e 4000 caracteres.", "The message must be between 1 and 4000 characters."),
    ("at_least_one", "Informe ao menos um item.", "Provide at least one entry."),
    ("slug_format", "Use apenas letras minúsculas, números, '-' e '_'.", "Use only lowercase letters, digits, '-' and '_'."),

    // Nomes de recursos
    ("resource.user", "Usuário", "User"),
    ("resource.profile", "Perfil", "Profile"),
    ("resource.module", "Módulo", "Module"),
    ("resource.template", "Template de perfil", "Role template"),
    ("resource.workspace", "Workspace", "Workspace"),
    ("resource.feature_flag", "Feature flag", "Feature flag"),
    ("resource.supplier", "Fornecedor", "Supplier"),
    ("resource.requisition", "Requisição", "Requisition"),
    ("resource.order", "Pedido", "Purchase order"),
    ("resource.sourcing_event", "Evento de sourcing", "Sourcing event"),
    ("resource.proposal", "Proposta", "Proposal"),
    ("resource.conversation", "Conversa", "Conversation"),
];

/// Armazena as traduções carregadas em memória.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut pt = HashMap::new();
        let mut en = HashMap::new();
        for (key, pt_msg, en_msg) in MESSAGES {
            pt.insert(*key, *pt_msg);
            en.insert(*key, *en_msg);
        }

        let mut messages = HashMap::new();
        messages.insert("pt", pt);
        messages.insert("en", en);
        Self { messages }
    }

    /// Traduz a chave. Idiomas desconhecidos caem no português, e chaves
    /// desconhecidas são devolvidas como vieram (mensagens livres).
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }

    /// Traduz e substitui os marcadores `{0}`, `{1}`...
    pub fn translate_with(&self, lang: &str, key: &str, args: &[&str]) -> String {
        let mut text = self.translate(lang, key);
        for (i, arg) in args.iter().enumerate() {
            text = text.replace(&format!("{{{}}}", i), arg);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(store.translate("fr", "user_not_found"), "Usuário não encontrado.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "Mensagem livre"), "Mensagem livre");
    }

    #[test]
    fn placeholders_are_replaced_in_order() {
        let store = I18nStore::new();
        let text = store.translate_with("en", "invalid_transition", &["draft", "received"]);
        assert_eq!(text, "Cannot change status from 'draft' to 'received'.");
    }
}
