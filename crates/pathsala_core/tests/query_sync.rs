use pathsala_core::{decode_query, encode_query, FilterChange, QuerySync, SortMode};

#[test]
fn mount_seeds_college_and_search_with_default_sort() {
    let mut sync = QuerySync::new();
    let state = sync.mount("?college=col_001&search=python");

    assert_eq!(state.college_id(), Some("col_001"));
    assert_eq!(state.search(), "python");
    assert_eq!(state.sort_by(), SortMode::Recent);
    assert_eq!(state.program_id(), None);
    assert_eq!(state.subject_id(), None);
}

#[test]
fn absent_fields_never_produce_empty_parameters() {
    let state = decode_query("search=&college=col_001&program=&subject=");
    let encoded = encode_query(&state);
    assert_eq!(encoded, "college=col_001");
    assert!(!encoded.contains("program"));
}

#[test]
fn sort_is_written_only_when_not_recent() {
    let mut state = decode_query("college=col_001");
    state.set_filter(FilterChange::SortBy(SortMode::Popular));
    assert_eq!(encode_query(&state), "college=col_001&sort=popular");

    state.set_filter(FilterChange::SortBy(SortMode::Recent));
    assert_eq!(encode_query(&state), "college=col_001");
}

#[test]
fn percent_encoded_values_are_decoded() {
    let state = decode_query("?search=linked%20lists&program=prog%26x");
    assert_eq!(state.search(), "linked lists");
    assert_eq!(state.program_id(), Some("prog&x"));
}

#[test]
fn push_reports_each_distinct_query_once() {
    let mut sync = QuerySync::new();
    let mut state = sync.mount("");
    assert_eq!(sync.push(&state), None);

    state.set_filter(FilterChange::College(Some("col_002".to_string())));
    assert_eq!(sync.push(&state).as_deref(), Some("college=col_002"));
    assert_eq!(sync.push(&state), None);
    assert_eq!(sync.last_written(), Some("college=col_002"));
}

#[test]
fn observing_our_own_write_is_ignored() {
    let mut sync = QuerySync::new();
    let mut state = sync.mount("?college=col_001");
    state.set_filter(FilterChange::Search("sql".to_string()));
    let written = sync.push(&state).unwrap();

    assert!(sync.observe(&written).is_none());
    let reseeded = sync.observe("/notes?college=col_003#list").unwrap();
    assert_eq!(reseeded.college_id(), Some("col_003"));
    assert_eq!(reseeded.search(), "");
}
