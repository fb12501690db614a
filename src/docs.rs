// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::is_admin,

        // --- Access ---
        handlers::access::list_modules,
        handlers::access::create_module,
        handlers::access::update_module,
        handlers::access::delete_module,
        handlers::access::my_modules,
        handlers::access::permission_matrix,
        handlers::access::toggle_permission,
        handlers::access::list_templates,
        handlers::access::create_template,
        handlers::access::delete_template,
        handlers::access::apply_template,
        handlers::access::list_profiles,
        handlers::access::update_profile,
        handlers::access::run_batch,
        handlers::access::batch_history,

        // --- Workspaces & Flags ---
        handlers::workspaces::list_workspaces,
        handlers::workspaces::create_workspace,
        handlers::workspaces::update_workspace,
        handlers::workspaces::set_default_workspace,
        handlers::workspaces::list_flags,
        handlers::workspaces::create_flag,
        handlers::workspaces::update_flag,
        handlers::workspaces::delete_flag,
        handlers::workspaces::evaluate_flag,

        // --- Suppliers ---
        handlers::suppliers::list_suppliers,
        handlers::suppliers::create_supplier,
        handlers::suppliers::get_supplier,
        handlers::suppliers::update_supplier,
        handlers::suppliers::change_supplier_status,
        handlers::suppliers::evaluate_supplier,
        handlers::suppliers::list_evaluations,
        handlers::suppliers::supplier_history,

        // --- Requisitions ---
        handlers::requisitions::list_requisitions,
        handlers::requisitions::create_requisition,
        handlers::requisitions::get_requisition,
        handlers::requisitions::submit_requisition,
        handlers::requisitions::cancel_requisition,
        handlers::requisitions::approve_requisition,
        handlers::requisitions::reject_requisition,
        handlers::requisitions::convert_requisition,

        // --- Orders ---
        handlers::orders::list_orders,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::add_order_item,
        handlers::orders::transition_order,
        handlers::documents::generate_order_pdf,

        // --- Sourcing ---
        handlers::sourcing::list_events,
        handlers::sourcing::create_event,
        handlers::sourcing::get_event,
        handlers::sourcing::transition_event,
        handlers::sourcing::invite_suppliers,
        handlers::sourcing::submit_proposal,
        handlers::sourcing::add_criterion,
        handlers::sourcing::score_proposal,
        handlers::sourcing::ranking,
        handlers::sourcing::award_event,

        // --- Messaging ---
        handlers::messaging::list_conversations,
        handlers::messaging::create_conversation,
        handlers::messaging::list_messages,
        handlers::messaging::send_message,
        handlers::messaging::mark_read,

        // --- Reports ---
        handlers::exports::export_csv,
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::Profile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,
            models::auth::IsAdminResponse,

            // --- Access ---
            models::access::Module,
            models::access::CreateModulePayload,
            models::access::UpdateModulePayload,
            models::access::TogglePermissionPayload,
            models::access::PermissionChange,
            models::access::ToggleResult,
            models::access::PermissionMatrix,
            models::access::RoleTemplate,
            models::access::CreateRoleTemplatePayload,
            models::access::ApplyTemplatePayload,
            models::access::UpdateProfilePayload,
            models::access::BatchAction,
            models::access::BatchStatus,
            models::access::BatchActionPayload,
            models::access::BatchDispatch,
            models::access::BatchResult,

            // --- Workspaces ---
            models::workspace::Workspace,
            models::workspace::CreateWorkspacePayload,
            models::workspace::UpdateWorkspacePayload,
            models::workspace::FlagStrategy,
            models::workspace::FeatureFlag,
            models::workspace::CreateFeatureFlagPayload,
            models::workspace::UpdateFeatureFlagPayload,
            models::workspace::FlagEvaluation,

            // --- Suppliers ---
            models::supplier::SupplierStatus,
            models::supplier::Supplier,
            models::supplier::CreateSupplierPayload,
            models::supplier::UpdateSupplierPayload,
            models::supplier::ChangeSupplierStatusPayload,
            models::supplier::SupplierHistoryEntry,
            models::supplier::EvaluationAnswers,
            models::supplier::EvaluateSupplierPayload,
            models::supplier::SupplierEvaluation,

            // --- Requisitions ---
            models::requisition::RequisitionStatus,
            models::requisition::RequisitionPriority,
            models::requisition::Requisition,
            models::requisition::RequisitionItem,
            models::requisition::RequisitionDetail,
            models::requisition::ItemInput,
            models::requisition::CreateRequisitionPayload,
            models::requisition::RejectRequisitionPayload,
            models::requisition::ConvertRequisitionPayload,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::PurchaseOrder,
            models::order::PurchaseOrderItem,
            models::order::PurchaseOrderDetail,
            models::order::CreateOrderPayload,
            models::order::TransitionOrderPayload,

            // --- Sourcing ---
            models::sourcing::SourcingType,
            models::sourcing::SourcingStatus,
            models::sourcing::SourcingEvent,
            models::sourcing::SourcingInvitation,
            models::sourcing::Proposal,
            models::sourcing::EvaluationCriterion,
            models::sourcing::RankedProposal,
            models::sourcing::SourcingEventDetail,
            models::sourcing::CreateSourcingEventPayload,
            models::sourcing::TransitionSourcingPayload,
            models::sourcing::InviteSuppliersPayload,
            models::sourcing::SubmitProposalPayload,
            models::sourcing::AddCriterionPayload,
            models::sourcing::ScoreInput,
            models::sourcing::ScoreProposalPayload,
            models::sourcing::AwardPayload,

            // --- Messaging ---
            models::messaging::Conversation,
            models::messaging::ConversationSummary,
            models::messaging::Message,
            models::messaging::CreateConversationPayload,
            models::messaging::SendMessagePayload,

            // --- Dashboard ---
            models::dashboard::StatusCount,
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Access", description = "Módulos, Permissões por Perfil, Templates e Ações em Lote"),
        (name = "Workspaces", description = "Configuração de Workspaces"),
        (name = "Feature Flags", description = "Liberação gradual de funcionalidades"),
        (name = "Suppliers", description = "Cadastro, Qualificação e Avaliação de Fornecedores"),
        (name = "Requisitions", description = "Requisições Internas de Compra"),
        (name = "Orders", description = "Pedidos de Compra"),
        (name = "Sourcing", description = "Eventos de RFP, RFQ e Cotação"),
        (name = "Messaging", description = "Conversas Internas"),
        (name = "Reports", description = "Exportações CSV"),
        (name = "Dashboard", description = "Indicadores Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
