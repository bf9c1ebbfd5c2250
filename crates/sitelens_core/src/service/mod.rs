//! Collaborator boundary and use-case services.
//!
//! # Responsibility
//! - Define the fetch collaborator contract.
//! - Orchestrate fetch + query so UI layers stay free of engine details.

pub mod dashboard_service;
pub mod source;
