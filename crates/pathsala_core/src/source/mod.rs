//! Catalog data-access boundary.
//!
//! # Responsibility
//! - Define the async capability the option loader and admin service depend
//!   on, independent of transport.
//! - Provide the HTTP backend client and the local SQLite catalog.
//! - Reject malformed records at the boundary instead of trusting shape.
//!
//! # Invariants
//! - `None` parent ids in list queries mean "no scoping": all rows.
//! - Implementations never return records that fail `validate()`.

pub mod fixtures;
pub mod http;
pub mod sqlite;

use crate::db::DbError;
use crate::model::academic::{
    College, CollegeId, NewCollege, NewProgram, NewSubject, Program, ProgramId, Subject, SubjectId,
};
use crate::model::note::Note;
use crate::model::{CatalogRecord, ModelValidationError};
use async_trait::async_trait;
use self::http::ApiError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised by catalog sources.
#[derive(Debug)]
pub enum CatalogError {
    /// Backend transport or status failure.
    Api(ApiError),
    /// Local catalog database failure.
    Db(DbError),
    /// Payload rejected before reaching the source.
    Validation(ModelValidationError),
    /// Target record does not exist.
    NotFound { entity: &'static str, id: String },
    /// Stored or received data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid catalog data: {message}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ApiError> for CatalogError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<DbError> for CatalogError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ModelValidationError> for CatalogError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Program list scoping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramListQuery {
    pub college_id: Option<CollegeId>,
}

/// Subject list scoping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectListQuery {
    pub program_id: Option<ProgramId>,
    pub semester: Option<u32>,
}

/// Note list scoping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    pub subject_id: Option<SubjectId>,
    /// Maximum rows to return; `None` means the source default.
    pub limit: Option<u32>,
}

/// Catalog-wide record counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    #[serde(default)]
    pub colleges: u64,
    #[serde(default)]
    pub programs: u64,
    #[serde(default)]
    pub subjects: u64,
    #[serde(default)]
    pub notes: u64,
}

/// Async data-access capability for the academic catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_colleges(&self) -> CatalogResult<Vec<College>>;
    async fn list_programs(&self, query: &ProgramListQuery) -> CatalogResult<Vec<Program>>;
    async fn list_subjects(&self, query: &SubjectListQuery) -> CatalogResult<Vec<Subject>>;
    async fn list_notes(&self, query: &NoteListQuery) -> CatalogResult<Vec<Note>>;
    async fn get_note(&self, id: &str) -> CatalogResult<Note>;
    async fn delete_note(&self, id: &str) -> CatalogResult<()>;
    async fn create_college(&self, payload: &NewCollege) -> CatalogResult<College>;
    async fn delete_college(&self, id: &str) -> CatalogResult<()>;
    async fn create_program(&self, payload: &NewProgram) -> CatalogResult<Program>;
    async fn delete_program(&self, id: &str) -> CatalogResult<()>;
    async fn create_subject(&self, payload: &NewSubject) -> CatalogResult<Subject>;
    async fn delete_subject(&self, id: &str) -> CatalogResult<()>;
    async fn stats(&self) -> CatalogResult<CatalogStats>;
}

/// Decodes a raw JSON list, dropping entries that are malformed or invalid.
///
/// Each dropped entry emits one `record_rejected` warning.
pub fn decode_records<T: CatalogRecord>(values: Vec<serde_json::Value>) -> Vec<T> {
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let record = match serde_json::from_value::<T>(value) {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "event=record_rejected module=source entity={} index={} reason=malformed error={}",
                    T::ENTITY,
                    index,
                    err
                );
                continue;
            }
        };
        if let Err(err) = record.validate_record() {
            warn!(
                "event=record_rejected module=source entity={} index={} id={} reason=invalid error={}",
                T::ENTITY,
                index,
                record.record_id(),
                err
            );
            continue;
        }
        records.push(record);
    }
    records
}

/// Decodes one raw JSON record, failing when it is malformed or invalid.
pub fn decode_record<T: CatalogRecord>(value: serde_json::Value) -> CatalogResult<T> {
    let record = serde_json::from_value::<T>(value)
        .map_err(|err| CatalogError::InvalidData(format!("malformed {}: {err}", T::ENTITY)))?;
    record.validate_record()?;
    Ok(record)
}

/// Convenience for callers that only have an id.
pub(crate) fn not_found(entity: &'static str, id: &str) -> CatalogError {
    CatalogError::NotFound {
        entity,
        id: id.to_string(),
    }
}
