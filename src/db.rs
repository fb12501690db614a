pub mod user_repo;
pub use user_repo::UserRepository;
pub mod access_repo;
pub use access_repo::AccessRepository;
pub mod workspace_repo;
pub use workspace_repo::WorkspaceRepository;
pub mod supplier_repo;
pub use supplier_repo::SupplierRepository;
pub mod requisition_repo;
pub use requisition_repo::RequisitionRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod sourcing_repo;
pub use sourcing_repo::SourcingRepository;
pub mod messaging_repo;
pub use messaging_repo::MessagingRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
