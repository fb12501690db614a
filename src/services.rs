pub mod access_service;
pub mod auth;
pub mod batch_service;
pub mod dashboard_service;
pub mod document_service;
pub mod export_service;
pub mod messaging_service;
pub mod order_service;
pub mod requisition_service;
pub mod sourcing_service;
pub mod supplier_service;
pub mod workspace_service;
