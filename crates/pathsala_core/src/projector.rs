//! Client-side search, refinement and ordering of the fetched note list.
//!
//! All functions here are pure: same input, same output, input untouched.

use crate::filter::state::SortMode;
use crate::model::note::{FileType, Note};
use std::cmp::Ordering;

/// Applies search text and sort order to `notes`.
///
/// Search is a case-insensitive substring match over title, description and
/// each tag; blank search keeps everything. Ties in the sort key are broken
/// by note id ascending.
pub fn project_notes(notes: &[Note], search: &str, sort_by: SortMode) -> Vec<Note> {
    let needle = search.trim().to_lowercase();
    let mut projected: Vec<Note> = notes
        .iter()
        .filter(|note| matches_search(note, &needle))
        .cloned()
        .collect();
    projected.sort_by(|left, right| compare(left, right, sort_by));
    projected
}

/// Keeps notes of the requested file category; `None` keeps everything.
pub fn filter_by_file_type(notes: &[Note], file_type: Option<FileType>) -> Vec<Note> {
    match file_type {
        None => notes.to_vec(),
        Some(wanted) => notes
            .iter()
            .filter(|note| note.file_type() == Some(wanted))
            .cloned()
            .collect(),
    }
}

fn matches_search(note: &Note, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    note.title.to_lowercase().contains(needle)
        || note.description.to_lowercase().contains(needle)
        || note
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

fn compare(left: &Note, right: &Note, sort_by: SortMode) -> Ordering {
    let primary = match sort_by {
        SortMode::Recent => right.created_at.cmp(&left.created_at),
        SortMode::Popular => right.downloads.cmp(&left.downloads),
    };
    primary.then_with(|| left.id.cmp(&right.id))
}
