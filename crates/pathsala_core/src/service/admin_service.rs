//! Catalog administration use-cases.
//!
//! # Responsibility
//! - Create and delete colleges, programs, subjects and notes through a
//!   [`CatalogSource`].
//! - Convert every outcome into an [`ActionResponse`] envelope.
//!
//! # Invariants
//! - Admin APIs never return `Err`; failures become `ok=false` envelopes.
//! - Payload text fields are trimmed before validation.

use crate::model::academic::{NewCollege, NewProgram, NewSubject};
use crate::source::{CatalogResult, CatalogSource, CatalogStats};
use log::{info, warn};

/// Result envelope for one admin action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the action succeeded.
    pub ok: bool,
    /// Id of the created entity, when one was created.
    pub entity_id: Option<String>,
    /// Human-readable outcome for the admin view.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, entity_id: Option<String>) -> Self {
        Self {
            ok: true,
            entity_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entity_id: None,
            message: message.into(),
        }
    }
}

/// Admin facade over a catalog source.
pub struct CatalogAdmin<S: CatalogSource> {
    source: S,
}

impl<S: CatalogSource> CatalogAdmin<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn create_college(&self, payload: NewCollege) -> ActionResponse {
        let payload = NewCollege {
            name: payload.name.trim().to_string(),
            short_name: payload.short_name.trim().to_string(),
            description: payload.description.trim().to_string(),
            icon: payload.icon.trim().to_string(),
        };
        let result = self
            .source
            .create_college(&payload)
            .await
            .map(|college| college.id);
        created("college", "College created.", result)
    }

    pub async fn create_program(&self, payload: NewProgram) -> ActionResponse {
        let payload = NewProgram {
            college_id: payload.college_id.trim().to_string(),
            name: payload.name.trim().to_string(),
            short_name: payload.short_name.trim().to_string(),
            ..payload
        };
        let result = self
            .source
            .create_program(&payload)
            .await
            .map(|program| program.id);
        created("program", "Program created.", result)
    }

    pub async fn create_subject(&self, payload: NewSubject) -> ActionResponse {
        let payload = NewSubject {
            program_id: payload.program_id.trim().to_string(),
            code: payload.code.trim().to_string(),
            name: payload.name.trim().to_string(),
            description: payload.description.trim().to_string(),
            ..payload
        };
        let result = self
            .source
            .create_subject(&payload)
            .await
            .map(|subject| subject.id);
        created("subject", "Subject created.", result)
    }

    pub async fn delete_college(&self, id: &str) -> ActionResponse {
        let result = self.source.delete_college(id.trim()).await;
        deleted("college", id, "College deleted.", result)
    }

    pub async fn delete_program(&self, id: &str) -> ActionResponse {
        let result = self.source.delete_program(id.trim()).await;
        deleted("program", id, "Program deleted.", result)
    }

    pub async fn delete_subject(&self, id: &str) -> ActionResponse {
        let result = self.source.delete_subject(id.trim()).await;
        deleted("subject", id, "Subject deleted.", result)
    }

    pub async fn delete_note(&self, id: &str) -> ActionResponse {
        let result = self.source.delete_note(id.trim()).await;
        deleted("note", id, "Note deleted.", result)
    }

    /// Dashboard counts; zeros when the source is unreachable.
    pub async fn stats(&self) -> CatalogStats {
        match self.source.stats().await {
            Ok(stats) => stats,
            Err(err) => {
                warn!("event=admin_stats module=service status=error error={err}");
                CatalogStats::default()
            }
        }
    }
}

fn created(entity: &'static str, message: &str, result: CatalogResult<String>) -> ActionResponse {
    match result {
        Ok(id) => {
            info!("event=admin_create module=service status=ok entity={entity} id={id}");
            ActionResponse::success(message, Some(id))
        }
        Err(err) => {
            warn!("event=admin_create module=service status=error entity={entity} error={err}");
            ActionResponse::failure(format!("create {entity} failed: {err}"))
        }
    }
}

fn deleted(
    entity: &'static str,
    id: &str,
    message: &str,
    result: CatalogResult<()>,
) -> ActionResponse {
    match result {
        Ok(()) => {
            info!("event=admin_delete module=service status=ok entity={entity} id={id}");
            ActionResponse::success(message, None)
        }
        Err(err) => {
            warn!(
                "event=admin_delete module=service status=error entity={entity} id={id} error={err}"
            );
            ActionResponse::failure(format!("delete {entity} failed: {err}"))
        }
    }
}
