//! Client core for the Pathsala notes platform.
//!
//! Owns the browse filter cascade, option loading against a catalog source,
//! client-side note projection and URL query synchronization.

pub mod browser;
pub mod config;
pub mod db;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod model;
pub mod projector;
pub mod service;
pub mod source;

pub use browser::{BrowserSnapshot, NotesBrowser, SlotStatuses, NO_NOTES_MESSAGE};
pub use config::{ClientConfig, ConfigError};
pub use filter::query::{decode_query, encode_query, QuerySync};
pub use filter::state::{FilterChange, FilterKey, FilterState, ReloadPlan, SortMode};
pub use loader::{LoadOutcome, LoadStatus, LoadTicket, OptionSlot};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::academic::{College, NewCollege, NewProgram, NewSubject, Program, Subject};
pub use model::note::{FileType, Note, NoteStatus};
pub use projector::{filter_by_file_type, project_notes};
pub use service::admin_service::{ActionResponse, CatalogAdmin};
pub use source::fixtures::{load_fixture, CatalogFixture};
pub use source::http::{ApiError, ChatReply, HttpCatalog, PdfSummary, SummaryPlatform};
pub use source::sqlite::SqliteCatalog;
pub use source::{
    CatalogError, CatalogResult, CatalogSource, CatalogStats, NoteListQuery, ProgramListQuery,
    SubjectListQuery,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
