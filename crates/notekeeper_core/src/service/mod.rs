//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate key-value storage into notebook/note and preference APIs.
//! - Keep rendering callers decoupled from storage details.

pub mod document_store;
pub mod theme_service;
