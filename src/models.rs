pub mod access;
pub mod auth;
pub mod dashboard;
pub mod messaging;
pub mod order;
pub mod requisition;
pub mod sourcing;
pub mod supplier;
pub mod workspace;
