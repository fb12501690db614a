pub mod access;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod exports;
pub mod messaging;
pub mod orders;
pub mod requisitions;
pub mod sourcing;
pub mod suppliers;
pub mod workspaces;
