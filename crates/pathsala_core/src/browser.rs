//! Notes browse session: filter state, option slots and URL sync together.
//!
//! # Responsibility
//! - Apply filter mutations and report which option levels to reload.
//! - Run option loads against a [`CatalogSource`] and apply only fresh results.
//! - Produce the visible note list and the query string to write back.
//!
//! # Invariants
//! - The state lock is never held across an `.await`; overlapping reloads on
//!   one browser are allowed and resolved by slot generations.
//! - Load failures degrade to an empty slot; nothing here returns an error.

use crate::filter::query::QuerySync;
use crate::filter::state::{FilterChange, FilterState, ReloadPlan};
use crate::loader::{LoadOutcome, LoadStatus, OptionSlot};
use crate::model::academic::{College, Program, Subject, MAX_PROGRAM_DURATION};
use crate::model::note::Note;
use crate::projector::{filter_by_file_type, project_notes};
use crate::source::{CatalogSource, NoteListQuery, ProgramListQuery, SubjectListQuery};
use log::info;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shown when the visible note list is empty, whether the load failed or not.
pub const NO_NOTES_MESSAGE: &str = "No notes found";
pub const LOADING_NOTES_MESSAGE: &str = "Loading notes...";

/// Semesters offered when no program (or an unknown one) is selected.
const DEFAULT_SEMESTER_COUNT: u32 = 8;

struct BrowserState {
    filters: FilterState,
    query_sync: QuerySync,
    colleges: OptionSlot<College, ()>,
    programs: OptionSlot<Program, ProgramListQuery>,
    subjects: OptionSlot<Subject, SubjectListQuery>,
    notes: OptionSlot<Note, NoteListQuery>,
}

impl BrowserState {
    fn new(filters: FilterState, query_sync: QuerySync) -> Self {
        Self {
            filters,
            query_sync,
            colleges: OptionSlot::new("colleges"),
            programs: OptionSlot::new("programs"),
            subjects: OptionSlot::new("subjects"),
            notes: OptionSlot::new("notes"),
        }
    }
}

/// Load status of every option slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStatuses {
    pub colleges: LoadStatus,
    pub programs: LoadStatus,
    pub subjects: LoadStatus,
    pub notes: LoadStatus,
}

/// Point-in-time view of a browse session.
#[derive(Debug, Clone)]
pub struct BrowserSnapshot {
    pub filters: FilterState,
    pub colleges: Vec<College>,
    pub programs: Vec<Program>,
    pub subjects: Vec<Subject>,
    /// Notes after file-type refinement, search and sort.
    pub notes: Vec<Note>,
    /// Notes in the slot before client-side projection.
    pub total_notes: usize,
    pub statuses: SlotStatuses,
}

impl BrowserSnapshot {
    /// Message to show instead of the note list, if any.
    pub fn notes_notice(&self) -> Option<&'static str> {
        if self.statuses.notes == LoadStatus::Loading {
            return Some(LOADING_NOTES_MESSAGE);
        }
        if self.notes.is_empty() {
            return Some(NO_NOTES_MESSAGE);
        }
        None
    }
}

/// Browse session over one catalog source.
pub struct NotesBrowser<S> {
    source: S,
    notes_limit: Option<u32>,
    state: Mutex<BrowserState>,
}

impl<S: CatalogSource> NotesBrowser<S> {
    /// Session with empty filters.
    pub fn new(source: S) -> Self {
        Self {
            source,
            notes_limit: None,
            state: Mutex::new(BrowserState::new(FilterState::new(), QuerySync::new())),
        }
    }

    /// Session seeded from the URL the view was mounted with.
    pub fn from_query(source: S, raw_query: &str) -> Self {
        let mut query_sync = QuerySync::new();
        let filters = query_sync.mount(raw_query);
        info!(
            "event=browser_mount module=browser status=ok active_filters={} search_set={}",
            filters.active_filter_count(),
            !filters.search().is_empty()
        );
        Self {
            source,
            notes_limit: None,
            state: Mutex::new(BrowserState::new(filters, query_sync)),
        }
    }

    /// Caps every note list request.
    pub fn with_notes_limit(mut self, limit: Option<u32>) -> Self {
        self.notes_limit = limit.filter(|limit| *limit > 0);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn filters(&self) -> FilterState {
        self.lock().filters.clone()
    }

    pub fn set_filter(&self, change: FilterChange) -> ReloadPlan {
        self.lock().filters.set_filter(change)
    }

    pub fn toggle_filter(&self, change: FilterChange) -> ReloadPlan {
        self.lock().filters.toggle_filter(change)
    }

    pub fn clear_all(&self) -> ReloadPlan {
        self.lock().filters.clear_all()
    }

    /// Handles an external URL change (back/forward, pasted link).
    ///
    /// Returns `None` when the URL is an echo of our own last write.
    pub fn navigate(&self, raw_query: &str) -> Option<ReloadPlan> {
        let mut state = self.lock();
        let next = state.query_sync.observe(raw_query)?;
        Some(state.filters.replace(next))
    }

    /// Query string to write to the URL, or `None` when it is already current.
    pub fn pending_query(&self) -> Option<String> {
        let mut state = self.lock();
        let BrowserState {
            filters,
            query_sync,
            ..
        } = &mut *state;
        query_sync.push(filters)
    }

    pub async fn load_colleges(&self) -> LoadOutcome {
        let ticket = self.lock().colleges.begin(());
        let result = self.source.list_colleges().await;
        self.lock().colleges.complete(ticket, result, &())
    }

    /// Loads programs of the selected college, or all programs without one.
    pub async fn load_programs(&self) -> LoadOutcome {
        let (ticket, query) = {
            let mut state = self.lock();
            let query = program_scope(&state.filters);
            (state.programs.begin(query.clone()), query)
        };
        let result = self.source.list_programs(&query).await;
        let mut state = self.lock();
        let current = program_scope(&state.filters);
        state.programs.complete(ticket, result, &current)
    }

    /// Loads subjects of the selected program and semester.
    pub async fn load_subjects(&self) -> LoadOutcome {
        let (ticket, query) = {
            let mut state = self.lock();
            let query = subject_scope(&state.filters);
            (state.subjects.begin(query.clone()), query)
        };
        let result = self.source.list_subjects(&query).await;
        let mut state = self.lock();
        let current = subject_scope(&state.filters);
        state.subjects.complete(ticket, result, &current)
    }

    /// Loads notes of the selected subject, or all notes without one.
    pub async fn load_notes(&self) -> LoadOutcome {
        let (ticket, query) = {
            let mut state = self.lock();
            let query = self.note_scope(&state.filters);
            (state.notes.begin(query.clone()), query)
        };
        let result = self.source.list_notes(&query).await;
        let mut state = self.lock();
        let current = self.note_scope(&state.filters);
        state.notes.complete(ticket, result, &current)
    }

    /// Runs the loads named by `plan` concurrently.
    pub async fn reload(&self, plan: ReloadPlan) {
        tokio::join!(
            async {
                if plan.programs {
                    self.load_programs().await;
                }
            },
            async {
                if plan.subjects {
                    self.load_subjects().await;
                }
            },
            async {
                if plan.notes {
                    self.load_notes().await;
                }
            },
        );
    }

    /// Loads every slot; used right after mount.
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.load_colleges(),
            self.load_programs(),
            self.load_subjects(),
            self.load_notes(),
        );
    }

    /// `set_filter` followed by the reloads it requires.
    pub async fn apply(&self, change: FilterChange) -> ReloadPlan {
        let plan = self.set_filter(change);
        self.reload(plan).await;
        plan
    }

    /// `toggle_filter` followed by the reloads it requires.
    pub async fn toggle(&self, change: FilterChange) -> ReloadPlan {
        let plan = self.toggle_filter(change);
        self.reload(plan).await;
        plan
    }

    /// Notes after file-type refinement, search and sort.
    pub fn visible_notes(&self) -> Vec<Note> {
        let state = self.lock();
        visible(&state)
    }

    /// Semester numbers selectable under the current program.
    ///
    /// Two per program year, capped at [`MAX_PROGRAM_DURATION`] years.
    pub fn semester_options(&self) -> Vec<u32> {
        let state = self.lock();
        let count = state
            .filters
            .program_id()
            .and_then(|program_id| {
                state
                    .programs
                    .items()
                    .iter()
                    .find(|program| program.id == program_id)
            })
            .map_or(DEFAULT_SEMESTER_COUNT, |program| {
                program.duration.min(MAX_PROGRAM_DURATION).saturating_mul(2)
            });
        (1..=count).collect()
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        let state = self.lock();
        BrowserSnapshot {
            filters: state.filters.clone(),
            colleges: state.colleges.items().to_vec(),
            programs: state.programs.items().to_vec(),
            subjects: state.subjects.items().to_vec(),
            notes: visible(&state),
            total_notes: state.notes.items().len(),
            statuses: SlotStatuses {
                colleges: state.colleges.status(),
                programs: state.programs.status(),
                subjects: state.subjects.status(),
                notes: state.notes.status(),
            },
        }
    }

    fn note_scope(&self, filters: &FilterState) -> NoteListQuery {
        NoteListQuery {
            subject_id: filters.subject_id().map(str::to_string),
            limit: self.notes_limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrowserState> {
        // Slot state stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn program_scope(filters: &FilterState) -> ProgramListQuery {
    ProgramListQuery {
        college_id: filters.college_id().map(str::to_string),
    }
}

fn subject_scope(filters: &FilterState) -> SubjectListQuery {
    SubjectListQuery {
        program_id: filters.program_id().map(str::to_string),
        semester: filters.semester(),
    }
}

fn visible(state: &BrowserState) -> Vec<Note> {
    let refined = filter_by_file_type(state.notes.items(), state.filters.file_type());
    project_notes(&refined, state.filters.search(), state.filters.sort_by())
}
