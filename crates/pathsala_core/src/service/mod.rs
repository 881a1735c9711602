//! Core use-case services.
//!
//! # Responsibility
//! - Wrap catalog source calls into admin-level actions.
//! - Keep view layers decoupled from transport errors.

pub mod admin_service;
