//! Browse filter state and cascade resolution.
//!
//! # Responsibility
//! - Hold the current College → Program → Semester → Subject selection plus
//!   search/sort/file-type refinements.
//! - Enforce descendant invalidation whenever an ancestor changes.
//! - Report which option slots need a reload after each mutation.
//!
//! # Invariants
//! - Setting `college_id` always clears `program_id` and `subject_id`.
//! - Setting `program_id` always clears `subject_id` and keeps `college_id`.
//! - Setting `semester` always clears `subject_id`.
//! - A subject can only be selected under a selected program.
//! - `search`, `sort_by` and `file_type` never cascade.

use crate::model::academic::{CollegeId, ProgramId, SubjectId};
use crate::model::note::FileType;

/// Client-side ordering of the note list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    /// Newest `created_at` first.
    #[default]
    Recent,
    /// Highest `downloads` first.
    Popular,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Popular => "popular",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recent" => Some(Self::Recent),
            "popular" => Some(Self::Popular),
            _ => None,
        }
    }
}

/// Field addressed by a [`FilterChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Search,
    College,
    Program,
    Semester,
    Subject,
    FileType,
    SortBy,
}

/// One typed mutation of [`FilterState`].
///
/// `None` payloads clear the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Search(String),
    College(Option<CollegeId>),
    Program(Option<ProgramId>),
    Semester(Option<u32>),
    Subject(Option<SubjectId>),
    FileType(Option<FileType>),
    SortBy(SortMode),
}

impl FilterChange {
    pub fn key(&self) -> FilterKey {
        match self {
            Self::Search(_) => FilterKey::Search,
            Self::College(_) => FilterKey::College,
            Self::Program(_) => FilterKey::Program,
            Self::Semester(_) => FilterKey::Semester,
            Self::Subject(_) => FilterKey::Subject,
            Self::FileType(_) => FilterKey::FileType,
            Self::SortBy(_) => FilterKey::SortBy,
        }
    }

    /// The change that resets this change's field to its empty value.
    fn cleared(&self) -> Self {
        match self {
            Self::Search(_) => Self::Search(String::new()),
            Self::College(_) => Self::College(None),
            Self::Program(_) => Self::Program(None),
            Self::Semester(_) => Self::Semester(None),
            Self::Subject(_) => Self::Subject(None),
            Self::FileType(_) => Self::FileType(None),
            Self::SortBy(_) => Self::SortBy(SortMode::default()),
        }
    }
}

/// Option slots whose scoping parent changed during one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReloadPlan {
    pub programs: bool,
    pub subjects: bool,
    pub notes: bool,
}

impl ReloadPlan {
    pub fn is_empty(&self) -> bool {
        !(self.programs || self.subjects || self.notes)
    }
}

/// Current browse selection for one notes view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    search: String,
    college_id: Option<CollegeId>,
    program_id: Option<ProgramId>,
    semester: Option<u32>,
    subject_id: Option<SubjectId>,
    file_type: Option<FileType>,
    sort_by: SortMode,
}

impl FilterState {
    /// Empty selection: blank search, `recent` sort.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn college_id(&self) -> Option<&str> {
        self.college_id.as_deref()
    }

    pub fn program_id(&self) -> Option<&str> {
        self.program_id.as_deref()
    }

    pub fn semester(&self) -> Option<u32> {
        self.semester
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    pub fn file_type(&self) -> Option<FileType> {
        self.file_type
    }

    pub fn sort_by(&self) -> SortMode {
        self.sort_by
    }

    /// Number of active hierarchy selections (college, program, subject).
    pub fn active_filter_count(&self) -> usize {
        [&self.college_id, &self.program_id, &self.subject_id]
            .iter()
            .filter(|value| value.is_some())
            .count()
    }

    /// Whether the field addressed by `change` already holds `change`'s value.
    pub fn holds(&self, change: &FilterChange) -> bool {
        match change {
            FilterChange::Search(value) => self.search == *value,
            FilterChange::College(value) => self.college_id == *value,
            FilterChange::Program(value) => self.program_id == *value,
            FilterChange::Semester(value) => self.semester == *value,
            FilterChange::Subject(value) => self.subject_id == *value,
            FilterChange::FileType(value) => self.file_type == *value,
            FilterChange::SortBy(value) => self.sort_by == *value,
        }
    }

    /// Sets one field and clears every descendant selection.
    ///
    /// Descendants are cleared even when the new value equals the old one.
    pub fn set_filter(&mut self, change: FilterChange) -> ReloadPlan {
        let mut next = self.clone();
        match change {
            FilterChange::Search(value) => next.search = value,
            FilterChange::College(value) => {
                next.college_id = normalize_id(value);
                next.program_id = None;
                next.subject_id = None;
            }
            FilterChange::Program(value) => {
                next.program_id = normalize_id(value);
                next.subject_id = None;
            }
            FilterChange::Semester(value) => {
                next.semester = value.filter(|semester| *semester > 0);
                next.subject_id = None;
            }
            FilterChange::Subject(value) => {
                next.subject_id = normalize_id(value).filter(|_| next.program_id.is_some());
            }
            FilterChange::FileType(value) => next.file_type = value,
            FilterChange::SortBy(value) => next.sort_by = value,
        }
        self.commit(next)
    }

    /// Select/deselect semantics for filter chips.
    ///
    /// Re-selecting the value a field already holds clears the field (and its
    /// descendants); any other value is applied through [`Self::set_filter`].
    pub fn toggle_filter(&mut self, change: FilterChange) -> ReloadPlan {
        if self.holds(&change) {
            let cleared = change.cleared();
            return self.set_filter(cleared);
        }
        self.set_filter(change)
    }

    /// Resets to blank search, `recent` sort, no selections.
    pub fn clear_all(&mut self) -> ReloadPlan {
        self.commit(Self::default())
    }

    /// Swaps in a whole new state (e.g. after back/forward navigation).
    pub fn replace(&mut self, next: FilterState) -> ReloadPlan {
        self.commit(next)
    }

    pub(crate) fn from_parts(parts: FilterParts) -> Self {
        Self {
            search: parts.search,
            college_id: normalize_id(parts.college_id),
            program_id: normalize_id(parts.program_id),
            semester: parts.semester.filter(|semester| *semester > 0),
            subject_id: normalize_id(parts.subject_id),
            file_type: parts.file_type,
            sort_by: parts.sort_by,
        }
    }

    fn commit(&mut self, next: Self) -> ReloadPlan {
        let plan = ReloadPlan {
            programs: self.college_id != next.college_id,
            subjects: self.program_id != next.program_id || self.semester != next.semester,
            notes: self.subject_id != next.subject_id,
        };
        *self = next;
        plan
    }
}

/// Unchecked field bundle used when seeding state from a query string.
#[derive(Debug, Clone, Default)]
pub(crate) struct FilterParts {
    pub search: String,
    pub college_id: Option<CollegeId>,
    pub program_id: Option<ProgramId>,
    pub semester: Option<u32>,
    pub subject_id: Option<SubjectId>,
    pub file_type: Option<FileType>,
    pub sort_by: SortMode,
}

fn normalize_id(value: Option<String>) -> Option<String> {
    value.filter(|id| !id.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{FilterChange, FilterState, ReloadPlan, SortMode};
    use crate::model::note::FileType;

    fn selected() -> FilterState {
        let mut state = FilterState::new();
        state.set_filter(FilterChange::College(Some("col_001".into())));
        state.set_filter(FilterChange::Program(Some("prog_001".into())));
        state.set_filter(FilterChange::Semester(Some(1)));
        state.set_filter(FilterChange::Subject(Some("subj_001".into())));
        state
    }

    #[test]
    fn college_change_clears_program_and_subject() {
        let mut state = selected();
        let plan = state.set_filter(FilterChange::College(Some("col_002".into())));
        assert_eq!(state.college_id(), Some("col_002"));
        assert_eq!(state.program_id(), None);
        assert_eq!(state.subject_id(), None);
        assert_eq!(state.semester(), Some(1));
        assert_eq!(
            plan,
            ReloadPlan {
                programs: true,
                subjects: true,
                notes: true
            }
        );
    }

    #[test]
    fn same_college_via_set_still_clears_descendants() {
        let mut state = selected();
        let plan = state.set_filter(FilterChange::College(Some("col_001".into())));
        assert_eq!(state.college_id(), Some("col_001"));
        assert_eq!(state.program_id(), None);
        assert_eq!(state.subject_id(), None);
        assert!(!plan.programs);
        assert!(plan.subjects);
    }

    #[test]
    fn program_change_keeps_college() {
        let mut state = selected();
        state.set_filter(FilterChange::Program(Some("prog_002".into())));
        assert_eq!(state.college_id(), Some("col_001"));
        assert_eq!(state.program_id(), Some("prog_002"));
        assert_eq!(state.subject_id(), None);
    }

    #[test]
    fn semester_change_clears_subject_only() {
        let mut state = selected();
        let plan = state.set_filter(FilterChange::Semester(Some(2)));
        assert_eq!(state.program_id(), Some("prog_001"));
        assert_eq!(state.subject_id(), None);
        assert!(plan.subjects && plan.notes && !plan.programs);
    }

    #[test]
    fn subject_without_program_is_not_selected() {
        let mut state = FilterState::new();
        state.set_filter(FilterChange::College(Some("col_001".into())));
        let plan = state.set_filter(FilterChange::Subject(Some("subj_001".into())));
        assert_eq!(state.subject_id(), None);
        assert!(plan.is_empty());

        let mut state = selected();
        state.set_filter(FilterChange::Program(None));
        state.set_filter(FilterChange::Subject(Some("subj_002".into())));
        assert_eq!(state.subject_id(), None);
    }

    #[test]
    fn refinements_do_not_cascade() {
        let mut state = selected();
        let before = state.clone();
        let plan = state.set_filter(FilterChange::Search("python".into()));
        state.set_filter(FilterChange::SortBy(SortMode::Popular));
        state.set_filter(FilterChange::FileType(Some(FileType::Pdf)));
        assert!(plan.is_empty());
        assert_eq!(state.subject_id(), before.subject_id());
        assert_eq!(state.program_id(), before.program_id());
    }

    #[test]
    fn toggle_same_value_deselects_with_descendants() {
        let mut state = selected();
        state.toggle_filter(FilterChange::College(Some("col_001".into())));
        assert_eq!(state.college_id(), None);
        assert_eq!(state.program_id(), None);
        assert_eq!(state.subject_id(), None);
    }

    #[test]
    fn toggle_other_value_selects_and_clears_descendants() {
        let mut state = selected();
        state.toggle_filter(FilterChange::Program(Some("prog_003".into())));
        assert_eq!(state.program_id(), Some("prog_003"));
        assert_eq!(state.subject_id(), None);
        assert_eq!(state.college_id(), Some("col_001"));
    }

    #[test]
    fn toggle_sort_returns_to_default() {
        let mut state = FilterState::new();
        state.toggle_filter(FilterChange::SortBy(SortMode::Popular));
        assert_eq!(state.sort_by(), SortMode::Popular);
        state.toggle_filter(FilterChange::SortBy(SortMode::Popular));
        assert_eq!(state.sort_by(), SortMode::Recent);
    }

    #[test]
    fn clear_all_is_idempotent() {
        let mut state = selected();
        state.set_filter(FilterChange::Search("loops".into()));
        state.clear_all();
        let once = state.clone();
        let plan = state.clear_all();
        assert_eq!(state, once);
        assert_eq!(state, FilterState::new());
        assert!(plan.is_empty());
        assert_eq!(state.search(), "");
        assert_eq!(state.sort_by(), SortMode::Recent);
    }

    #[test]
    fn blank_ids_are_treated_as_cleared() {
        let mut state = selected();
        state.set_filter(FilterChange::College(Some("   ".into())));
        assert_eq!(state.college_id(), None);
    }

    #[test]
    fn active_filter_count_counts_hierarchy_only() {
        let mut state = selected();
        state.set_filter(FilterChange::Search("x".into()));
        assert_eq!(state.active_filter_count(), 3);
    }
}
