//! Core use-case services.
//!
//! # Responsibility
//! - Bridge UI commands to repository operations and domain events.
//! - Keep UI collaborators decoupled from storage details.

pub mod note_service;
pub mod settings_service;
