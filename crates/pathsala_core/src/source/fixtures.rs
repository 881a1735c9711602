//! Bundled sample catalog used to seed the local SQLite source.

use super::{CatalogError, CatalogResult};
use crate::model::academic::{College, Program, Subject};
use crate::model::note::Note;
use crate::model::CatalogRecord;
use serde::{Deserialize, Serialize};

const BUNDLED_CATALOG: &str = include_str!("catalog_fixture.json");

/// Full catalog snapshot in backend wire shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub colleges: Vec<College>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl CatalogFixture {
    /// Parses a fixture document and validates every record.
    ///
    /// Unlike list responses, a fixture is all-or-nothing: one bad record
    /// fails the whole document.
    pub fn from_json(raw: &str) -> CatalogResult<Self> {
        let fixture: Self = serde_json::from_str(raw)
            .map_err(|err| CatalogError::InvalidData(format!("malformed catalog fixture: {err}")))?;
        validate_all(&fixture.colleges)?;
        validate_all(&fixture.programs)?;
        validate_all(&fixture.subjects)?;
        validate_all(&fixture.notes)?;
        Ok(fixture)
    }
}

/// Loads the sample catalog compiled into the crate.
pub fn load_fixture() -> CatalogResult<CatalogFixture> {
    CatalogFixture::from_json(BUNDLED_CATALOG)
}

fn validate_all<T: CatalogRecord>(records: &[T]) -> CatalogResult<()> {
    for record in records {
        record.validate_record()?;
    }
    Ok(())
}
