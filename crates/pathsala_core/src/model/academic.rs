//! College, program and subject records.
//!
//! # Invariants
//! - A program belongs to exactly one college.
//! - A subject belongs to exactly one program and one semester number.

use super::{require_positive, require_range, require_text, CatalogRecord, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Stable college identifier as issued by the catalog.
pub type CollegeId = String;
/// Stable program identifier as issued by the catalog.
pub type ProgramId = String;
/// Stable subject identifier as issued by the catalog.
pub type SubjectId = String;

/// Longest accepted program, in years.
pub const MAX_PROGRAM_DURATION: u32 = 10;

/// Top level of the academic hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
    pub id: CollegeId,
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

impl College {
    /// Checks required fields.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("college", "id", &self.id)?;
        require_text("college", "name", &self.name)?;
        require_text("college", "short_name", &self.short_name)
    }
}

/// Degree program offered by one college.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub college_id: CollegeId,
    pub name: String,
    pub short_name: String,
    /// Program length in years.
    pub duration: u32,
    pub total_credits: u32,
}

impl Program {
    /// Checks required fields and parent linkage.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("program", "id", &self.id)?;
        require_text("program", "college_id", &self.college_id)?;
        require_text("program", "name", &self.name)?;
        require_text("program", "short_name", &self.short_name)?;
        require_range("program", "duration", self.duration, 1..=MAX_PROGRAM_DURATION)
    }
}

/// Course taught within one program and semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub program_id: ProgramId,
    /// 1-based semester number within the program.
    pub semester: u32,
    pub code: String,
    pub name: String,
    pub credits: u32,
    #[serde(default)]
    pub description: String,
}

impl Subject {
    /// Checks required fields and parent linkage.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("subject", "id", &self.id)?;
        require_text("subject", "program_id", &self.program_id)?;
        require_text("subject", "code", &self.code)?;
        require_text("subject", "name", &self.name)?;
        require_positive("subject", "semester", self.semester)
    }

    /// Display label used by option pickers, e.g. `CSE101 - Introduction to Programming`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}

impl CatalogRecord for College {
    const ENTITY: &'static str = "college";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate_record(&self) -> Result<(), ModelValidationError> {
        self.validate()
    }
}

impl CatalogRecord for Program {
    const ENTITY: &'static str = "program";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate_record(&self) -> Result<(), ModelValidationError> {
        self.validate()
    }
}

impl CatalogRecord for Subject {
    const ENTITY: &'static str = "subject";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate_record(&self) -> Result<(), ModelValidationError> {
        self.validate()
    }
}

/// Create payload for a college.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollege {
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

impl NewCollege {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("college", "name", &self.name)?;
        require_text("college", "short_name", &self.short_name)
    }
}

/// Create payload for a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProgram {
    pub college_id: CollegeId,
    pub name: String,
    pub short_name: String,
    pub duration: u32,
    pub total_credits: u32,
}

impl NewProgram {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("program", "college_id", &self.college_id)?;
        require_text("program", "name", &self.name)?;
        require_text("program", "short_name", &self.short_name)?;
        require_range("program", "duration", self.duration, 1..=MAX_PROGRAM_DURATION)
    }
}

/// Create payload for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubject {
    pub program_id: ProgramId,
    pub semester: u32,
    pub code: String,
    pub name: String,
    pub credits: u32,
    #[serde(default)]
    pub description: String,
}

impl NewSubject {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("subject", "program_id", &self.program_id)?;
        require_text("subject", "code", &self.code)?;
        require_text("subject", "name", &self.name)?;
        require_positive("subject", "semester", self.semester)
    }
}
