//! Query-string synchronization for [`FilterState`].
//!
//! # Responsibility
//! - Seed filter state from the navigable URL query on mount.
//! - Write the covered subset of filter state back into the query.
//! - Suppress echo writes so a URL update never re-triggers itself.
//!
//! # Invariants
//! - Absent fields produce no parameter; empty values decode as absent.
//! - Unrecognized or malformed parameters are ignored.
//! - `decode_query(&encode_query(state)) == state` for every state.

use super::state::{FilterParts, FilterState, SortMode};
use crate::model::note::FileType;
use log::warn;

const KEY_SEARCH: &str = "search";
const KEY_COLLEGE: &str = "college";
const KEY_PROGRAM: &str = "program";
const KEY_SEMESTER: &str = "semester";
const KEY_SUBJECT: &str = "subject";
const KEY_FILE_TYPE: &str = "type";
const KEY_SORT: &str = "sort";

/// Builds filter state from a query string.
///
/// Accepts a bare query (`a=b`), a `?`-prefixed query, or a path with a
/// query (`/notes?a=b#frag`). The first occurrence of a repeated key wins.
pub fn decode_query(raw: &str) -> FilterState {
    let query = extract_query(raw);
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(err) => {
            warn!("event=query_decode module=filter status=error error={err}");
            return FilterState::new();
        }
    };

    let mut parts = FilterParts::default();
    let mut seen: Vec<&str> = Vec::new();
    for (key, value) in &pairs {
        if value.is_empty() || seen.contains(&key.as_str()) {
            continue;
        }
        seen.push(key.as_str());
        match key.as_str() {
            KEY_SEARCH => parts.search = value.clone(),
            KEY_COLLEGE => parts.college_id = Some(value.clone()),
            KEY_PROGRAM => parts.program_id = Some(value.clone()),
            KEY_SEMESTER => parts.semester = value.trim().parse::<u32>().ok(),
            KEY_SUBJECT => parts.subject_id = Some(value.clone()),
            KEY_FILE_TYPE => parts.file_type = FileType::parse(value),
            KEY_SORT => parts.sort_by = SortMode::parse(value).unwrap_or_default(),
            _ => {}
        }
    }

    FilterState::from_parts(parts)
}

/// Encodes the covered subset of `state` as a query string without `?`.
///
/// Parameter order is fixed, so equal states always encode identically.
pub fn encode_query(state: &FilterState) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if !state.search().is_empty() {
        pairs.push((KEY_SEARCH, state.search().to_string()));
    }
    if let Some(college_id) = state.college_id() {
        pairs.push((KEY_COLLEGE, college_id.to_string()));
    }
    if let Some(program_id) = state.program_id() {
        pairs.push((KEY_PROGRAM, program_id.to_string()));
    }
    if let Some(semester) = state.semester() {
        pairs.push((KEY_SEMESTER, semester.to_string()));
    }
    if let Some(subject_id) = state.subject_id() {
        pairs.push((KEY_SUBJECT, subject_id.to_string()));
    }
    if let Some(file_type) = state.file_type() {
        pairs.push((KEY_FILE_TYPE, file_type.as_str().to_string()));
    }
    if state.sort_by() != SortMode::default() {
        pairs.push((KEY_SORT, state.sort_by().as_str().to_string()));
    }

    // Serializing a list of string pairs cannot fail.
    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}

/// Tracks the last query written to the address bar.
///
/// The host calls [`QuerySync::push`] after each state change and writes the
/// returned query only when one is returned; navigation events go through
/// [`QuerySync::observe`], which ignores echoes of our own writes.
#[derive(Debug, Default)]
pub struct QuerySync {
    last_written: Option<String>,
}

impl QuerySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds state from the initial URL and records it as already written.
    pub fn mount(&mut self, raw: &str) -> FilterState {
        let state = decode_query(raw);
        self.last_written = Some(encode_query(&state));
        state
    }

    /// Returns the query to write, or `None` when the URL is already current.
    pub fn push(&mut self, state: &FilterState) -> Option<String> {
        let encoded = encode_query(state);
        if self.last_written.as_deref() == Some(encoded.as_str()) {
            return None;
        }
        self.last_written = Some(encoded.clone());
        Some(encoded)
    }

    /// Handles an external URL change; `None` means it matches our last write.
    pub fn observe(&mut self, raw: &str) -> Option<FilterState> {
        let state = decode_query(raw);
        let encoded = encode_query(&state);
        if self.last_written.as_deref() == Some(encoded.as_str()) {
            return None;
        }
        self.last_written = Some(encoded);
        Some(state)
    }

    pub fn last_written(&self) -> Option<&str> {
        self.last_written.as_deref()
    }
}

fn extract_query(raw: &str) -> &str {
    let without_fragment = raw.split_once('#').map_or(raw, |(head, _)| head);
    without_fragment
        .split_once('?')
        .map_or(without_fragment, |(_, query)| query)
}
