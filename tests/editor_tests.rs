
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use portfolio_admin::{
    entities::{
        draft::{CoverChange, PageInput, ProjectDraft, ProjectField},
        project::{Project, ProjectPage},
    },
    errors::AppError,
    repositories::project::ProjectRepository,
    use_cases::{drafts::DraftWorkspace, editor::ProjectEditor},
};
use test_utils::*;
use uuid::Uuid;

fn draft_with_pages(pages: &[(&str, Option<&str>)]) -> ProjectDraft {
    let mut draft = ProjectDraft::new();
    draft.set_field(ProjectField::Title("Portfolio".into()));
    draft.set_field(ProjectField::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));

    for (name, image) in pages {
        let mut input = PageInput::new(*name, format!("{name} features"));
        if let Some(file_name) = image {
            input = input.with_image(png(file_name));
        }
        draft.add_page(input).unwrap();
    }
    draft
}

#[tokio::test]
async fn uploads_all_page_images_before_the_single_write() {
    let events = event_log();
    let repo = Arc::new(RecordingProjectRepo::new(events.clone()));
    let editor = ProjectEditor::new(repo.clone(), RecordingStorage::new(events.clone()));

    let draft = draft_with_pages(&[("A", Some("a.png")), ("B", Some("b.png")), ("C", Some("c.png"))]);
    let saved = editor.submit(&draft).await.unwrap();

    let log = events.lock().clone();
    assert_eq!(log.len(), 4);
    assert!(log[..3].iter().all(|e| matches!(e, Event::Upload(path) if path.starts_with("pages/"))));
    assert_eq!(log[3], Event::Create);

    let stored = repo.get_project(&saved.id).await.unwrap().unwrap();
    let names: Vec<_> = stored.pages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    for (page, file) in stored.pages.iter().zip(["_a.png", "_b.png", "_c.png"]) {
        let url = page.image_url.as_deref().unwrap();
        assert!(url.starts_with("https://cdn.test/pages/"));
        assert!(url.ends_with(file));
    }
}

#[tokio::test]
async fn failed_upload_aborts_before_any_write() {
    let events = event_log();
    let mut storage = RecordingStorage::new(events.clone());
    storage.fail_upload_of = Some("b.png".into());

    let mut repo = MockProjectRepo::new();
    repo.expect_create_project().never();
    repo.expect_update_project().never();

    let editor = ProjectEditor::new(repo, storage);
    let draft = draft_with_pages(&[("A", Some("a.png")), ("B", Some("b.png")), ("C", Some("c.png"))]);
    let before = draft.clone();

    let err = editor.submit(&draft).await.unwrap_err();

    assert!(matches!(err, AppError::Storage(_)));
    assert_eq!(draft.pages(), before.pages());
    assert!(!events.lock().contains(&Event::Create));
}

#[tokio::test]
async fn empty_page_list_is_rejected_without_network_calls() {
    let mut storage = MockStorage::new();
    storage.expect_upload().never();
    let mut repo = MockProjectRepo::new();
    repo.expect_create_project().never();

    let editor = ProjectEditor::new(repo, storage);
    let mut draft = ProjectDraft::new();
    draft.set_field(ProjectField::Title("No pages".into()));
    draft.set_field(ProjectField::Cover(CoverChange::Upload(png("cover.png"))));

    let err = editor.submit(&draft).await.unwrap_err();

    match err {
        AppError::ValidationError(errors) => assert_eq!(errors[0].field, "pages"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn pending_cover_is_uploaded_under_covers() {
    let mut storage = MockStorage::new();
    storage
        .expect_upload()
        .withf(|image, path| image.file_name == "Cover Shot.PNG" && path.starts_with("covers/") && path.ends_with("_cover-shot.png"))
        .times(1)
        .returning(|_, path| Ok(format!("https://cdn.test/{path}")));

    let mut repo = MockProjectRepo::new();
    repo.expect_create_project()
        .withf(|record| {
            record.image_url.as_deref().is_some_and(|url| url.contains("/covers/"))
                && record.pages[0].image_url.is_none()
        })
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    let editor = ProjectEditor::new(repo, storage);
    let mut draft = draft_with_pages(&[("Home", None)]);
    draft.set_field(ProjectField::Cover(CoverChange::Upload(png("Cover Shot.PNG"))));

    let saved = editor.submit(&draft).await.unwrap();
    assert!(saved.created);
}

#[tokio::test]
async fn cover_and_two_page_images_upload_before_one_create() {
    let events = event_log();
    let repo = Arc::new(RecordingProjectRepo::new(events.clone()));
    let editor = ProjectEditor::new(repo.clone(), RecordingStorage::new(events.clone()));

    let mut draft = draft_with_pages(&[("A", Some("a.png")), ("B", Some("b.png"))]);
    draft.set_field(ProjectField::Cover(CoverChange::Upload(png("c.png"))));

    let saved = editor.submit(&draft).await.unwrap();

    let log = events.lock().clone();
    assert_eq!(log.len(), 4);
    assert!(matches!(&log[0], Event::Upload(path) if path.starts_with("covers/") && path.ends_with("_c.png")));
    assert!(log[1..3].iter().all(|e| matches!(e, Event::Upload(path) if path.starts_with("pages/"))));
    assert_eq!(log[3], Event::Create);

    let stored = repo.get_project(&saved.id).await.unwrap().unwrap();
    assert!(stored.image_url.as_deref().is_some_and(|url| url.ends_with("_c.png")));
    assert!(stored.pages.iter().all(|page| page.image_url.is_some()));
}

#[tokio::test]
async fn untitled_draft_with_a_page_is_created() {
    let events = event_log();
    let repo = Arc::new(RecordingProjectRepo::new(events.clone()));
    let editor = ProjectEditor::new(repo.clone(), RecordingStorage::new(events.clone()));

    let mut draft = ProjectDraft::new();
    draft.add_page(PageInput::new("Home", "desc")).unwrap();

    let saved = editor.submit(&draft).await.unwrap();

    assert!(saved.created);
    assert_eq!(*events.lock(), vec![Event::Create]);
    let stored = repo.get_project(&saved.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "");
}

#[tokio::test]
async fn existing_project_is_updated_in_place() {
    let project_id = Uuid::new_v4();
    let existing = Project {
        id: project_id,
        title: "Old".into(),
        description: "d".into(),
        date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        technologies: vec!["Rust".into()],
        link: Some("https://example.com".into()),
        image_url: Some("https://cdn.test/covers/1_old.png".into()),
        pages: vec![
            ProjectPage { name: "Home".into(), features: "f".into(), image_url: Some("https://cdn.test/pages/1_home.png".into()) },
            ProjectPage { name: "About".into(), features: "f".into(), image_url: None },
        ],
        created_at: Utc::now(),
    };

    let mut draft = ProjectDraft::from_project(&existing);
    let about = draft.page_id_at(1).unwrap();
    draft
        .edit_page(about, PageInput::new("About us", "Team").with_image(png("team.png")))
        .unwrap();

    let mut storage = MockStorage::new();
    storage
        .expect_upload()
        .times(1)
        .returning(|_, path| Ok(format!("https://cdn.test/{path}")));

    let mut repo = MockProjectRepo::new();
    repo.expect_create_project().never();
    repo.expect_update_project()
        .withf(move |id, patch| {
            let pages = patch.pages.as_ref().unwrap();
            *id == project_id
                && pages[0].image_url.as_deref() == Some("https://cdn.test/pages/1_home.png")
                && pages[1].name == "About us"
                && pages[1].image_url.as_deref().is_some_and(|u| u.ends_with("_team.png"))
                && patch.image_url.flatten_str() == Some("https://cdn.test/covers/1_old.png")
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let editor = ProjectEditor::new(repo, storage);
    let saved = editor.submit(&draft).await.unwrap();

    assert_eq!(saved.id, project_id);
    assert!(!saved.created);
}

#[tokio::test]
async fn imageless_page_is_stored_without_image_key() {
    let events = event_log();
    let repo = Arc::new(RecordingProjectRepo::new(events.clone()));
    let editor = ProjectEditor::new(repo.clone(), RecordingStorage::new(events.clone()));
    let workspace = DraftWorkspace::new();

    let draft_id = workspace.open_new().id().to_string();
    workspace
        .mutate(&draft_id, |d| {
            d.set_field(ProjectField::Title("X".into()));
            d.add_page(PageInput::new("Home", "Landing page"))
        })
        .unwrap();

    let saved = workspace.submit(&draft_id, &editor).await.unwrap();

    let stored = repo.get_project(&saved.id).await.unwrap().unwrap();
    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["title"], "X");
    assert_eq!(json["pages"][0]["name"], "Home");
    assert!(json["pages"][0].get("imageUrl").is_none());
    assert!(json.get("imageUrl").is_none());
    assert_eq!(*events.lock(), vec![Event::Create]);
    assert!(workspace.is_empty());
}

#[tokio::test]
async fn failed_submit_keeps_draft_open() {
    let events = event_log();
    let mut storage = RecordingStorage::new(events.clone());
    storage.fail_upload_of = Some("home.png".into());
    let editor = ProjectEditor::new(Arc::new(RecordingProjectRepo::new(events.clone())), storage);
    let workspace = DraftWorkspace::new();

    let draft_id = workspace.open_new().id().to_string();
    workspace
        .mutate(&draft_id, |d| {
            d.set_field(ProjectField::Title("X".into()));
            d.add_page(PageInput::new("Home", "Landing").with_image(png("home.png")))
        })
        .unwrap();

    assert!(workspace.submit(&draft_id, &editor).await.is_err());

    let draft = workspace.get(&draft_id).unwrap();
    assert!(draft.pages()[0].image.is_pending());
}
