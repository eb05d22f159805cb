//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep edge handlers decoupled from storage details.

pub mod portal_service;
pub mod tree_service;
