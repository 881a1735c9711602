//! Typed records for the academic catalog hierarchy.
//!
//! # Responsibility
//! - Define one distinct record per hierarchy level (college, program,
//!   subject, note) with the fields the browse flow depends on.
//! - Validate records at the catalog boundary before they reach filter state.
//!
//! # Invariants
//! - Every record is identified by a non-empty, stable string id.
//! - Child records always name their parent id (`college_id`, `program_id`,
//!   `subject_id`).

pub mod academic;
pub mod note;

use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

/// Record kind that can be received from a catalog source and validated.
pub trait CatalogRecord: DeserializeOwned {
    /// Entity name used in logs and errors.
    const ENTITY: &'static str;

    fn record_id(&self) -> &str;

    fn validate_record(&self) -> Result<(), ModelValidationError>;
}

/// Validation failure for a catalog record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Required text field is empty after trimming.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    /// Field holds a value outside its accepted range.
    InvalidValue {
        entity: &'static str,
        field: &'static str,
        message: String,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::InvalidValue {
                entity,
                field,
                message,
            } => write!(f, "invalid {entity}.{field}: {message}"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::EmptyField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_positive(
    entity: &'static str,
    field: &'static str,
    value: u32,
) -> Result<(), ModelValidationError> {
    if value == 0 {
        return Err(ModelValidationError::InvalidValue {
            entity,
            field,
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn require_range(
    entity: &'static str,
    field: &'static str,
    value: u32,
    range: RangeInclusive<u32>,
) -> Result<(), ModelValidationError> {
    if !range.contains(&value) {
        return Err(ModelValidationError::InvalidValue {
            entity,
            field,
            message: format!(
                "must be between {} and {}, got {value}",
                range.start(),
                range.end()
            ),
        });
    }
    Ok(())
}
