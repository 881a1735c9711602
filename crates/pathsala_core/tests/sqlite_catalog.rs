use pathsala_core::{
    load_fixture, CatalogError, CatalogSource, NewCollege, NewProgram, NewSubject, NoteListQuery,
    ProgramListQuery, SqliteCatalog, SubjectListQuery,
};

fn seeded() -> SqliteCatalog {
    let catalog = SqliteCatalog::in_memory().unwrap();
    catalog.seed(&load_fixture().unwrap()).unwrap();
    catalog
}

#[tokio::test]
async fn empty_parent_lists_everything() {
    let catalog = seeded();

    let programs = catalog
        .list_programs(&ProgramListQuery::default())
        .await
        .unwrap();
    let subjects = catalog
        .list_subjects(&SubjectListQuery::default())
        .await
        .unwrap();
    let notes = catalog.list_notes(&NoteListQuery::default()).await.unwrap();

    assert_eq!(programs.len(), 8);
    assert_eq!(subjects.len(), 15);
    assert_eq!(notes.len(), 12);
}

#[tokio::test]
async fn lists_are_scoped_to_parent() {
    let catalog = seeded();

    let programs = catalog
        .list_programs(&ProgramListQuery {
            college_id: Some("col_003".to_string()),
        })
        .await
        .unwrap();
    let ids: Vec<_> = programs.iter().map(|program| program.id.as_str()).collect();
    assert_eq!(ids, ["prog_006", "prog_007"]);

    let subjects = catalog
        .list_subjects(&SubjectListQuery {
            program_id: Some("prog_004".to_string()),
            semester: Some(3),
        })
        .await
        .unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].code, "PHY301");

    let unknown = catalog
        .list_programs(&ProgramListQuery {
            college_id: Some("col_999".to_string()),
        })
        .await
        .unwrap();
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn note_limit_keeps_newest() {
    let catalog = seeded();
    let notes = catalog
        .list_notes(&NoteListQuery {
            subject_id: None,
            limit: Some(2),
        })
        .await
        .unwrap();
    let ids: Vec<_> = notes.iter().map(|note| note.id.as_str()).collect();
    assert_eq!(ids, ["note_011", "note_012"]);
}

#[tokio::test]
async fn get_note_round_trips_fixture_fields() {
    let catalog = seeded();
    let note = catalog.get_note("note_001").await.unwrap();
    let expected = load_fixture()
        .unwrap()
        .notes
        .into_iter()
        .find(|note| note.id == "note_001")
        .unwrap();
    assert_eq!(note, expected);

    let missing = catalog.get_note("note_999").await.unwrap_err();
    assert!(matches!(missing, CatalogError::NotFound { entity: "note", .. }));
}

#[tokio::test]
async fn created_entities_get_uuid_ids_and_link_to_parents() {
    let catalog = SqliteCatalog::in_memory().unwrap();

    let college = catalog
        .create_college(&NewCollege {
            name: "College of Law".to_string(),
            short_name: "COL".to_string(),
            description: String::new(),
            icon: String::new(),
        })
        .await
        .unwrap();
    assert!(uuid::Uuid::parse_str(&college.id).is_ok());

    let program = catalog
        .create_program(&NewProgram {
            college_id: college.id.clone(),
            name: "Bachelor of Laws".to_string(),
            short_name: "LLB".to_string(),
            duration: 5,
            total_credits: 180,
        })
        .await
        .unwrap();
    let subject = catalog
        .create_subject(&NewSubject {
            program_id: program.id.clone(),
            semester: 1,
            code: "LAW101".to_string(),
            name: "Constitutional Law".to_string(),
            credits: 4,
            description: String::new(),
        })
        .await
        .unwrap();

    let listed = catalog
        .list_subjects(&SubjectListQuery {
            program_id: Some(program.id.clone()),
            semester: None,
        })
        .await
        .unwrap();
    assert_eq!(listed, [subject]);
}

#[tokio::test]
async fn create_under_missing_parent_is_not_found() {
    let catalog = SqliteCatalog::in_memory().unwrap();
    let err = catalog
        .create_program(&NewProgram {
            college_id: "col_missing".to_string(),
            name: "Ghost".to_string(),
            short_name: "GH".to_string(),
            duration: 4,
            total_credits: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { entity: "college", .. }));
}

#[tokio::test]
async fn invalid_payload_is_rejected_before_insert() {
    let catalog = SqliteCatalog::in_memory().unwrap();
    let err = catalog
        .create_college(&NewCollege {
            name: "   ".to_string(),
            short_name: "X".to_string(),
            description: String::new(),
            icon: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
    assert_eq!(catalog.stats().await.unwrap().colleges, 0);
}

#[tokio::test]
async fn deleting_a_program_cascades_to_subjects_and_notes() {
    let catalog = seeded();
    catalog.delete_program("prog_001").await.unwrap();

    let stats = catalog.stats().await.unwrap();
    assert_eq!(stats.programs, 7);
    assert_eq!(stats.subjects, 6);
    assert_eq!(stats.notes, 2);

    let err = catalog.delete_program("prog_001").await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[test]
fn catalog_file_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let catalog = SqliteCatalog::open(&path).unwrap();
    catalog.seed(&load_fixture().unwrap()).unwrap();
    drop(catalog);

    let reopened = SqliteCatalog::open(&path).unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let stats = runtime.block_on(reopened.stats()).unwrap();
    assert_eq!(stats.notes, 12);
}
