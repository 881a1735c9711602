//! Local catalog source on SQLite.
//!
//! # Responsibility
//! - Serve the same [`CatalogSource`] contract as the REST backend, offline.
//! - Seed itself from a [`CatalogFixture`].
//!
//! # Invariants
//! - The connection lock is released before any `.await`; every method
//!   finishes its SQL work synchronously.
//! - Rows that fail model validation are skipped with a warning.
//! - Created entities get UUID v4 ids.

use super::fixtures::CatalogFixture;
use super::{
    not_found, CatalogError, CatalogResult, CatalogSource, CatalogStats, NoteListQuery,
    ProgramListQuery, SubjectListQuery,
};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::academic::{College, NewCollege, NewProgram, NewSubject, Program, Subject};
use crate::model::note::{Note, NoteStatus};
use crate::model::CatalogRecord;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// SQLite-backed catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Wraps a connection whose schema is at the latest migration.
    pub fn try_new(conn: Connection) -> CatalogResult<Self> {
        let db_version = current_user_version(&conn)?;
        let latest = latest_version();
        if db_version != latest {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version,
                latest_supported: latest,
            }
            .into());
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (or creates) a catalog file.
    pub fn open(path: impl AsRef<Path>) -> CatalogResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens an empty in-memory catalog.
    pub fn in_memory() -> CatalogResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Upserts every record of `fixture` in one transaction.
    pub fn seed(&self, fixture: &CatalogFixture) -> CatalogResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for college in &fixture.colleges {
            tx.execute(
                "INSERT INTO colleges (id, name, short_name, description, icon)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    short_name = excluded.short_name,
                    description = excluded.description,
                    icon = excluded.icon;",
                params![
                    college.id,
                    college.name,
                    college.short_name,
                    college.description,
                    college.icon
                ],
            )?;
        }
        for program in &fixture.programs {
            insert_program(&tx, program)?;
        }
        for subject in &fixture.subjects {
            insert_subject(&tx, subject)?;
        }
        for note in &fixture.notes {
            insert_note(&tx, note)?;
        }

        tx.commit()?;
        info!(
            "event=catalog_seed module=source status=ok colleges={} programs={} subjects={} notes={}",
            fixture.colleges.len(),
            fixture.programs.len(),
            fixture.subjects.len(),
            fixture.notes.len()
        );
        Ok(())
    }

    fn lock(&self) -> CatalogResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::InvalidData("catalog connection lock poisoned".to_string()))
    }

    fn delete_row(&self, table: &'static str, entity: &'static str, id: &str) -> CatalogResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [id])?;
        if changed == 0 {
            return Err(not_found(entity, id));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for SqliteCatalog {
    async fn list_colleges(&self) -> CatalogResult<Vec<College>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, short_name, description, icon
             FROM colleges
             ORDER BY id ASC;",
        )?;
        let rows = stmt.query_map([], college_from_row)?;
        collect_valid(rows)
    }

    async fn list_programs(&self, query: &ProgramListQuery) -> CatalogResult<Vec<Program>> {
        let conn = self.lock()?;
        let mut sql = String::from(
            "SELECT id, college_id, name, short_name, duration, total_credits FROM programs",
        );
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(college_id) = query.college_id.as_ref() {
            sql.push_str(" WHERE college_id = ?");
            bind_values.push(Value::Text(college_id.clone()));
        }
        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), program_from_row)?;
        collect_valid(rows)
    }

    async fn list_subjects(&self, query: &SubjectListQuery) -> CatalogResult<Vec<Subject>> {
        let conn = self.lock()?;
        let mut sql = String::from(
            "SELECT id, program_id, semester, code, name, credits, description
             FROM subjects
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(program_id) = query.program_id.as_ref() {
            sql.push_str(" AND program_id = ?");
            bind_values.push(Value::Text(program_id.clone()));
        }
        if let Some(semester) = query.semester {
            sql.push_str(" AND semester = ?");
            bind_values.push(Value::Integer(i64::from(semester)));
        }
        sql.push_str(" ORDER BY semester ASC, code ASC, id ASC;");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), subject_from_row)?;
        collect_valid(rows)
    }

    async fn list_notes(&self, query: &NoteListQuery) -> CatalogResult<Vec<Note>> {
        let conn = self.lock()?;
        let mut sql = String::from(
            "SELECT id, subject_id, title, description, file_url, file_size, downloads, views,
                    status, created_at
             FROM notes",
        );
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(subject_id) = query.subject_id.as_ref() {
            sql.push_str(" WHERE subject_id = ?");
            bind_values.push(Value::Text(subject_id.clone()));
        }
        sql.push_str(" ORDER BY created_at DESC, id ASC");
        if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let note = note_from_row(&conn, row)?;
            if keep_valid(&note) {
                notes.push(note);
            }
        }
        Ok(notes)
    }

    async fn get_note(&self, id: &str) -> CatalogResult<Note> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, subject_id, title, description, file_url, file_size, downloads, views,
                    status, created_at
             FROM notes
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        let Some(row) = rows.next()? else {
            return Err(not_found(Note::ENTITY, id));
        };
        let note = note_from_row(&conn, row)?;
        note.validate()?;
        Ok(note)
    }

    async fn delete_note(&self, id: &str) -> CatalogResult<()> {
        self.delete_row("notes", Note::ENTITY, id)
    }

    async fn create_college(&self, payload: &NewCollege) -> CatalogResult<College> {
        payload.validate()?;
        let college = College {
            id: Uuid::new_v4().to_string(),
            name: payload.name.trim().to_string(),
            short_name: payload.short_name.trim().to_string(),
            description: payload.description.clone(),
            icon: payload.icon.clone(),
        };
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO colleges (id, name, short_name, description, icon)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                college.id,
                college.name,
                college.short_name,
                college.description,
                college.icon
            ],
        )?;
        Ok(college)
    }

    async fn delete_college(&self, id: &str) -> CatalogResult<()> {
        self.delete_row("colleges", College::ENTITY, id)
    }

    async fn create_program(&self, payload: &NewProgram) -> CatalogResult<Program> {
        payload.validate()?;
        let conn = self.lock()?;
        if !row_exists(&conn, "colleges", &payload.college_id)? {
            return Err(not_found(College::ENTITY, &payload.college_id));
        }
        let program = Program {
            id: Uuid::new_v4().to_string(),
            college_id: payload.college_id.clone(),
            name: payload.name.trim().to_string(),
            short_name: payload.short_name.trim().to_string(),
            duration: payload.duration,
            total_credits: payload.total_credits,
        };
        insert_program(&conn, &program)?;
        Ok(program)
    }

    async fn delete_program(&self, id: &str) -> CatalogResult<()> {
        self.delete_row("programs", Program::ENTITY, id)
    }

    async fn create_subject(&self, payload: &NewSubject) -> CatalogResult<Subject> {
        payload.validate()?;
        let conn = self.lock()?;
        if !row_exists(&conn, "programs", &payload.program_id)? {
            return Err(not_found(Program::ENTITY, &payload.program_id));
        }
        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            program_id: payload.program_id.clone(),
            semester: payload.semester,
            code: payload.code.trim().to_string(),
            name: payload.name.trim().to_string(),
            credits: payload.credits,
            description: payload.description.clone(),
        };
        insert_subject(&conn, &subject)?;
        Ok(subject)
    }

    async fn delete_subject(&self, id: &str) -> CatalogResult<()> {
        self.delete_row("subjects", Subject::ENTITY, id)
    }

    async fn stats(&self) -> CatalogResult<CatalogStats> {
        let conn = self.lock()?;
        Ok(CatalogStats {
            colleges: count_rows(&conn, "colleges")?,
            programs: count_rows(&conn, "programs")?,
            subjects: count_rows(&conn, "subjects")?,
            notes: count_rows(&conn, "notes")?,
        })
    }
}

fn insert_program(conn: &Connection, program: &Program) -> CatalogResult<()> {
    conn.execute(
        "INSERT INTO programs (id, college_id, name, short_name, duration, total_credits)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            college_id = excluded.college_id,
            name = excluded.name,
            short_name = excluded.short_name,
            duration = excluded.duration,
            total_credits = excluded.total_credits;",
        params![
            program.id,
            program.college_id,
            program.name,
            program.short_name,
            program.duration,
            program.total_credits
        ],
    )?;
    Ok(())
}

fn insert_subject(conn: &Connection, subject: &Subject) -> CatalogResult<()> {
    conn.execute(
        "INSERT INTO subjects (id, program_id, semester, code, name, credits, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            program_id = excluded.program_id,
            semester = excluded.semester,
            code = excluded.code,
            name = excluded.name,
            credits = excluded.credits,
            description = excluded.description;",
        params![
            subject.id,
            subject.program_id,
            subject.semester,
            subject.code,
            subject.name,
            subject.credits,
            subject.description
        ],
    )?;
    Ok(())
}

fn insert_note(conn: &Connection, note: &Note) -> CatalogResult<()> {
    conn.execute(
        "INSERT INTO notes
            (id, subject_id, title, description, file_url, file_size, downloads, views, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(id) DO UPDATE SET
            subject_id = excluded.subject_id,
            title = excluded.title,
            description = excluded.description,
            file_url = excluded.file_url,
            file_size = excluded.file_size,
            downloads = excluded.downloads,
            views = excluded.views,
            status = excluded.status,
            created_at = excluded.created_at;",
        params![
            note.id,
            note.subject_id,
            note.title,
            note.description,
            note.file_url,
            to_db_count(note.file_size)?,
            to_db_count(note.downloads)?,
            to_db_count(note.views)?,
            status_to_db(note.status),
            note.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
        ],
    )?;
    conn.execute("DELETE FROM note_tags WHERE note_id = ?1;", [note.id.as_str()])?;
    for (position, tag) in note.tags.iter().enumerate() {
        conn.execute(
            "INSERT INTO note_tags (note_id, position, tag) VALUES (?1, ?2, ?3);",
            params![note.id, position as i64, tag],
        )?;
    }
    Ok(())
}

fn college_from_row(row: &Row<'_>) -> rusqlite::Result<College> {
    Ok(College {
        id: row.get("id")?,
        name: row.get("name")?,
        short_name: row.get("short_name")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
    })
}

fn program_from_row(row: &Row<'_>) -> rusqlite::Result<Program> {
    Ok(Program {
        id: row.get("id")?,
        college_id: row.get("college_id")?,
        name: row.get("name")?,
        short_name: row.get("short_name")?,
        duration: row.get("duration")?,
        total_credits: row.get("total_credits")?,
    })
}

fn subject_from_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get("id")?,
        program_id: row.get("program_id")?,
        semester: row.get("semester")?,
        code: row.get("code")?,
        name: row.get("name")?,
        credits: row.get("credits")?,
        description: row.get("description")?,
    })
}

fn note_from_row(conn: &Connection, row: &Row<'_>) -> CatalogResult<Note> {
    let id: String = row.get("id")?;
    let status: String = row.get("status")?;
    let created_at: String = row.get("created_at")?;
    let tags = load_tags(conn, &id)?;
    Ok(Note {
        subject_id: row.get("subject_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        file_url: row.get("file_url")?,
        file_size: from_db_count(row.get("file_size")?),
        tags,
        downloads: from_db_count(row.get("downloads")?),
        views: from_db_count(row.get("views")?),
        status: status_from_db(&status)?,
        created_at: parse_timestamp(&created_at)?,
        id,
    })
}

fn load_tags(conn: &Connection, note_id: &str) -> CatalogResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT tag FROM note_tags WHERE note_id = ?1 ORDER BY position ASC;")?;
    let tags = stmt
        .query_map([note_id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

fn collect_valid<T: CatalogRecord>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> CatalogResult<Vec<T>> {
    let mut records = Vec::new();
    for row in rows {
        let record = row?;
        if keep_valid(&record) {
            records.push(record);
        }
    }
    Ok(records)
}

fn keep_valid<T: CatalogRecord>(record: &T) -> bool {
    match record.validate_record() {
        Ok(()) => true,
        Err(err) => {
            warn!(
                "event=record_rejected module=source entity={} id={} reason=invalid error={}",
                T::ENTITY,
                record.record_id(),
                err
            );
            false
        }
    }
}

fn row_exists(conn: &Connection, table: &'static str, id: &str) -> CatalogResult<bool> {
    let found = conn
        .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1;"), [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn count_rows(conn: &Connection, table: &'static str) -> CatalogResult<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    Ok(from_db_count(count))
}

fn status_to_db(status: NoteStatus) -> &'static str {
    match status {
        NoteStatus::Processing => "processing",
        NoteStatus::Ready => "ready",
    }
}

fn status_from_db(value: &str) -> CatalogResult<NoteStatus> {
    match value {
        "processing" => Ok(NoteStatus::Processing),
        "ready" => Ok(NoteStatus::Ready),
        other => Err(CatalogError::InvalidData(format!(
            "invalid note status `{other}` in notes.status"
        ))),
    }
}

fn parse_timestamp(value: &str) -> CatalogResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            CatalogError::InvalidData(format!("invalid timestamp `{value}` in notes.created_at"))
        })
}

fn to_db_count(value: u64) -> CatalogResult<i64> {
    i64::try_from(value)
        .map_err(|_| CatalogError::InvalidData(format!("count {value} exceeds storage range")))
}

fn from_db_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
