use async_trait::async_trait;
use pathsala_core::{
    load_fixture, CatalogError, CatalogResult, CatalogSource, CatalogStats, College, FileType,
    FilterChange, LoadOutcome, LoadStatus, NewCollege, NewProgram, NewSubject, Note,
    NoteListQuery, NotesBrowser, Program, ProgramListQuery, SortMode, SqliteCatalog, Subject,
    SubjectListQuery, NO_NOTES_MESSAGE,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Fixture catalog whose program and subject lists can be held back, whose
/// program list can be replaced and whose note lists can be made to fail.
struct ScriptedCatalog {
    inner: SqliteCatalog,
    program_gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    subject_gates: Mutex<HashMap<Option<u32>, oneshot::Receiver<()>>>,
    served_programs: Mutex<Option<Vec<Program>>>,
    fail_notes: AtomicBool,
}

impl ScriptedCatalog {
    fn new() -> Self {
        let inner = SqliteCatalog::in_memory().unwrap();
        inner.seed(&load_fixture().unwrap()).unwrap();
        Self {
            inner,
            program_gates: Mutex::new(HashMap::new()),
            subject_gates: Mutex::new(HashMap::new()),
            served_programs: Mutex::new(None),
            fail_notes: AtomicBool::new(false),
        }
    }

    /// Blocks the next program list for `college_id` until the sender fires.
    fn hold_programs(&self, college_id: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.program_gates
            .lock()
            .unwrap()
            .insert(college_id.to_string(), rx);
        tx
    }

    /// Blocks the next subject list for `semester` until the sender fires.
    fn hold_subjects(&self, semester: Option<u32>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.subject_gates.lock().unwrap().insert(semester, rx);
        tx
    }

    /// Answers every program list with `programs`, unvalidated.
    fn serve_programs(&self, programs: Vec<Program>) {
        *self.served_programs.lock().unwrap() = Some(programs);
    }

    fn fail_notes(&self, fail: bool) {
        self.fail_notes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalog {
    async fn list_colleges(&self) -> CatalogResult<Vec<College>> {
        self.inner.list_colleges().await
    }

    async fn list_programs(&self, query: &ProgramListQuery) -> CatalogResult<Vec<Program>> {
        let gate = query
            .college_id
            .as_ref()
            .and_then(|id| self.program_gates.lock().unwrap().remove(id));
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(programs) = self.served_programs.lock().unwrap().clone() {
            return Ok(programs);
        }
        self.inner.list_programs(query).await
    }

    async fn list_subjects(&self, query: &SubjectListQuery) -> CatalogResult<Vec<Subject>> {
        let gate = self.subject_gates.lock().unwrap().remove(&query.semester);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.list_subjects(query).await
    }

    async fn list_notes(&self, query: &NoteListQuery) -> CatalogResult<Vec<Note>> {
        if self.fail_notes.load(Ordering::SeqCst) {
            return Err(CatalogError::InvalidData("backend unavailable".to_string()));
        }
        self.inner.list_notes(query).await
    }

    async fn get_note(&self, id: &str) -> CatalogResult<Note> {
        self.inner.get_note(id).await
    }

    async fn delete_note(&self, id: &str) -> CatalogResult<()> {
        self.inner.delete_note(id).await
    }

    async fn create_college(&self, payload: &NewCollege) -> CatalogResult<College> {
        self.inner.create_college(payload).await
    }

    async fn delete_college(&self, id: &str) -> CatalogResult<()> {
        self.inner.delete_college(id).await
    }

    async fn create_program(&self, payload: &NewProgram) -> CatalogResult<Program> {
        self.inner.create_program(payload).await
    }

    async fn delete_program(&self, id: &str) -> CatalogResult<()> {
        self.inner.delete_program(id).await
    }

    async fn create_subject(&self, payload: &NewSubject) -> CatalogResult<Subject> {
        self.inner.create_subject(payload).await
    }

    async fn delete_subject(&self, id: &str) -> CatalogResult<()> {
        self.inner.delete_subject(id).await
    }

    async fn stats(&self) -> CatalogResult<CatalogStats> {
        self.inner.stats().await
    }
}

fn program_ids(browser: &NotesBrowser<ScriptedCatalog>) -> Vec<String> {
    browser
        .snapshot()
        .programs
        .into_iter()
        .map(|program| program.id)
        .collect()
}

fn visible_ids(browser: &NotesBrowser<ScriptedCatalog>) -> Vec<String> {
    browser
        .visible_notes()
        .into_iter()
        .map(|note| note.id)
        .collect()
}

#[tokio::test]
async fn earlier_request_resolving_last_is_discarded() {
    let browser = NotesBrowser::new(ScriptedCatalog::new());
    let release_a = browser.source().hold_programs("col_001");

    browser.set_filter(FilterChange::College(Some("col_001".to_string())));
    let load_a = browser.load_programs();
    let load_b_then_release_a = async {
        browser.set_filter(FilterChange::College(Some("col_002".to_string())));
        let outcome_b = browser.load_programs().await;
        release_a.send(()).unwrap();
        outcome_b
    };

    let (outcome_a, outcome_b) = tokio::join!(load_a, load_b_then_release_a);

    assert_eq!(outcome_b, LoadOutcome::Applied { count: 2 });
    assert_eq!(outcome_a, LoadOutcome::Stale);
    assert_eq!(program_ids(&browser), ["prog_004", "prog_005"]);
    assert_eq!(browser.snapshot().statuses.programs, LoadStatus::Ready);
}

#[tokio::test]
async fn response_for_a_replaced_parent_is_discarded_without_newer_load() {
    let browser = NotesBrowser::new(ScriptedCatalog::new());
    let release = browser.source().hold_programs("col_001");

    browser.set_filter(FilterChange::College(Some("col_001".to_string())));
    let load = browser.load_programs();
    let change_parent_then_release = async {
        browser.set_filter(FilterChange::College(Some("col_003".to_string())));
        release.send(()).unwrap();
    };

    let (outcome, ()) = tokio::join!(load, change_parent_then_release);

    assert_eq!(outcome, LoadOutcome::Stale);
    assert!(program_ids(&browser).is_empty());
    assert_eq!(browser.snapshot().statuses.programs, LoadStatus::Loading);
}

#[tokio::test]
async fn query_seeded_session_scopes_programs_and_filters_notes() {
    let browser =
        NotesBrowser::from_query(ScriptedCatalog::new(), "?college=col_001&search=python");

    let filters = browser.filters();
    assert_eq!(filters.college_id(), Some("col_001"));
    assert_eq!(filters.search(), "python");

    browser.refresh_all().await;

    assert_eq!(program_ids(&browser), ["prog_001", "prog_002", "prog_003"]);
    assert_eq!(visible_ids(&browser), ["note_008", "note_002", "note_001"]);
    assert_eq!(browser.snapshot().total_notes, 12);
    assert_eq!(browser.pending_query(), None);
}

#[tokio::test]
async fn selecting_program_narrows_subjects_and_updates_query() {
    let browser = NotesBrowser::from_query(ScriptedCatalog::new(), "?college=col_001");
    browser.refresh_all().await;

    let plan = browser
        .apply(FilterChange::Program(Some("prog_001".to_string())))
        .await;
    assert!(plan.subjects && !plan.programs && !plan.notes);

    let subjects = browser.snapshot().subjects;
    assert_eq!(subjects.len(), 9);
    assert!(subjects.iter().all(|subject| subject.program_id == "prog_001"));
    assert_eq!(browser.semester_options(), (1..=8).collect::<Vec<u32>>());
    assert_eq!(
        browser.pending_query().as_deref(),
        Some("college=col_001&program=prog_001")
    );

    browser.apply(FilterChange::Semester(Some(2))).await;
    let codes: Vec<String> = browser
        .snapshot()
        .subjects
        .into_iter()
        .map(|subject| subject.code)
        .collect();
    assert_eq!(codes, ["CSE201", "CSE202"]);
}

#[tokio::test]
async fn subject_selection_scopes_notes_and_popular_sort_reorders() {
    let browser = NotesBrowser::from_query(ScriptedCatalog::new(), "program=prog_001");
    browser.refresh_all().await;

    browser
        .apply(FilterChange::Subject(Some("subj_001".to_string())))
        .await;
    assert_eq!(visible_ids(&browser), ["note_002", "note_001"]);

    let plan = browser.apply(FilterChange::SortBy(SortMode::Popular)).await;
    assert!(plan.is_empty());
    assert_eq!(visible_ids(&browser), ["note_001", "note_002"]);
}

#[tokio::test]
async fn file_type_refinement_needs_no_reload() {
    let browser = NotesBrowser::new(ScriptedCatalog::new());
    browser.refresh_all().await;

    let plan = browser
        .apply(FilterChange::FileType(Some(FileType::Image)))
        .await;
    assert!(plan.is_empty());
    assert_eq!(visible_ids(&browser), ["note_012"]);
}

#[tokio::test]
async fn failed_note_load_reads_as_no_results() {
    let browser = NotesBrowser::new(ScriptedCatalog::new());
    browser.refresh_all().await;
    assert_eq!(browser.snapshot().total_notes, 12);

    browser.source().fail_notes(true);
    let outcome = browser.load_notes().await;

    let snapshot = browser.snapshot();
    assert_eq!(outcome, LoadOutcome::Failed);
    assert_eq!(snapshot.statuses.notes, LoadStatus::Failed);
    assert!(snapshot.notes.is_empty());
    assert_eq!(snapshot.notes_notice(), Some(NO_NOTES_MESSAGE));
}

#[tokio::test]
async fn toggling_selected_college_reloads_all_programs() {
    let browser = NotesBrowser::from_query(ScriptedCatalog::new(), "college=col_002");
    browser.refresh_all().await;
    assert_eq!(program_ids(&browser).len(), 2);

    browser
        .toggle(FilterChange::College(Some("col_002".to_string())))
        .await;
    assert_eq!(browser.filters().college_id(), None);
    assert_eq!(program_ids(&browser).len(), 8);
}

#[tokio::test]
async fn back_navigation_reseeds_state_but_own_writes_do_not() {
    let browser = NotesBrowser::from_query(ScriptedCatalog::new(), "college=col_001");
    browser.set_filter(FilterChange::Search("sql".to_string()));
    let written = browser.pending_query().unwrap();

    assert!(browser.navigate(&written).is_none());

    let plan = browser.navigate("?college=col_002").unwrap();
    assert!(plan.programs);
    assert_eq!(browser.filters().college_id(), Some("col_002"));
    assert_eq!(browser.filters().search(), "");
}

#[tokio::test]
async fn superseded_semester_load_is_discarded() {
    let browser =
        NotesBrowser::from_query(ScriptedCatalog::new(), "?college=col_001&program=prog_001");
    browser.refresh_all().await;
    let release_first = browser.source().hold_subjects(Some(1));

    browser.set_filter(FilterChange::Semester(Some(1)));
    let load_first = browser.load_subjects();
    let load_second_then_release_first = async {
        browser.set_filter(FilterChange::Semester(Some(2)));
        let outcome = browser.load_subjects().await;
        release_first.send(()).unwrap();
        outcome
    };

    let (first, second) = tokio::join!(load_first, load_second_then_release_first);

    assert_eq!(second, LoadOutcome::Applied { count: 2 });
    assert_eq!(first, LoadOutcome::Stale);
    let codes: Vec<String> = browser
        .snapshot()
        .subjects
        .into_iter()
        .map(|subject| subject.code)
        .collect();
    assert_eq!(codes, ["CSE201", "CSE202"]);
    assert_eq!(browser.snapshot().statuses.subjects, LoadStatus::Ready);
}

#[tokio::test]
async fn oversized_program_duration_caps_semester_options() {
    let catalog = ScriptedCatalog::new();
    catalog.serve_programs(vec![Program {
        id: "prog_long".to_string(),
        college_id: "col_001".to_string(),
        name: "Endless Studies".to_string(),
        short_name: "ES".to_string(),
        duration: 3_000_000_000,
        total_credits: 1,
    }]);
    let browser = NotesBrowser::from_query(catalog, "program=prog_long");
    browser.refresh_all().await;

    assert_eq!(program_ids(&browser), ["prog_long"]);
    assert_eq!(browser.semester_options(), (1..=20).collect::<Vec<u32>>());
}
