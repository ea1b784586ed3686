use crate::funnel_extras::{SAMPLE_URL, sample_analysis, sample_funnel, sample_sequence};
use funnelcraft::{ProjectStatus, Storage};
use rusqlite::{Connection, params};
use spectral::prelude::*;

mod funnel_extras;

#[tokio::test]
async fn project_advances_through_wizard() {
    let storage = Storage::new(":memory:").expect("In-memory database.");
    let analysis = sample_analysis().await;

    let id = storage
        .create_project("Acme Launch", SAMPLE_URL, &analysis)
        .expect("Project is created.");
    let project = storage.get_project(id).expect("Readable.").expect("Exists.");
    assert_that(&project.status).is_equal_to(ProjectStatus::Analyzed);
    assert_that(&project.analysis).is_equal_to(Some(analysis));
    assert_that(&project.funnel).is_none();

    let funnel = sample_funnel("Acme", 2, 2).await;
    storage.save_funnel(id, &funnel).expect("Funnel is saved.");
    storage.save_funnel(id, &funnel).expect("Funnel step can be re-run.");

    let sequence = sample_sequence("Acme");
    storage
        .save_email_sequence(id, &sequence)
        .expect("Sequence is saved.");

    let project = storage.get_project(id).expect("Readable.").expect("Exists.");
    assert_that(&project.status).is_equal_to(ProjectStatus::Completed);
    assert_that(&project.funnel).is_equal_to(Some(funnel));
    assert_that(&project.email_sequence).is_equal_to(Some(sequence));
}

#[tokio::test]
async fn skipping_or_reversing_steps_is_rejected() {
    let storage = Storage::new(":memory:").expect("In-memory database.");
    let id = storage
        .create_project("Acme Launch", SAMPLE_URL, &sample_analysis().await)
        .expect("Project is created.");

    assert_that(&storage.save_email_sequence(id, &sample_sequence("Acme")).is_err()).is_true();

    let funnel = sample_funnel("Acme", 1, 1).await;
    storage.save_funnel(id, &funnel).expect("Funnel is saved.");
    storage
        .save_email_sequence(id, &sample_sequence("Acme"))
        .expect("Sequence is saved.");

    assert_that(&storage.save_funnel(id, &funnel).is_err()).is_true();
    assert_that(&storage.save_funnel(999, &funnel).is_err()).is_true();
}

#[test]
fn status_transitions() {
    use funnelcraft::ProjectStatus::{Analyzed, Completed, FunnelGenerated, New};

    assert_that(&New.can_advance_to(Analyzed)).is_true();
    assert_that(&Analyzed.can_advance_to(Analyzed)).is_true();
    assert_that(&FunnelGenerated.can_advance_to(Completed)).is_true();
    assert_that(&Analyzed.can_advance_to(Completed)).is_false();
    assert_that(&Completed.can_advance_to(FunnelGenerated)).is_false();

    assert_that(&"funnel_generated".parse::<ProjectStatus>().ok()).is_equal_to(Some(FunnelGenerated));
    assert_that(&"archived".parse::<ProjectStatus>().is_err()).is_true();
}

#[tokio::test]
async fn projects_are_listed_and_deleted() {
    let storage = Storage::new(":memory:").expect("In-memory database.");
    let analysis = sample_analysis().await;
    let first = storage
        .create_project("First", SAMPLE_URL, &analysis)
        .expect("Project is created.");
    let second = storage
        .create_project("Second", "https://other.example.com", &analysis)
        .expect("Project is created.");

    let names: Vec<(i64, String)> = storage
        .list_projects()
        .expect("Listable.")
        .into_iter()
        .map(|project| (project.id, project.name))
        .collect();
    assert_that(&names).is_equal_to(vec![(first, "First".to_owned()), (second, "Second".to_owned())]);

    assert_that(&storage.delete_project(first).expect("Deletable.")).is_true();
    assert_that(&storage.delete_project(first).expect("Deletable.")).is_false();
    assert_that(&storage.get_project(first).expect("Readable.")).is_none();
    assert_that(&storage.list_projects().expect("Listable.")).has_length(1);
}

#[tokio::test]
async fn other_schema_versions_are_rejected_on_load() {
    let dir = tempfile::tempdir().expect("Temporary directory.");
    let path = dir.path().join("projects.db");
    let db = path.to_str().expect("UTF-8 path.");

    let storage = Storage::new(db).expect("Database is created.");
    let id = storage
        .create_project("Acme Launch", SAMPLE_URL, &sample_analysis().await)
        .expect("Project is created.");

    Connection::open(db)
        .expect("Database opens.")
        .execute(
            "UPDATE projects SET schema_version = ?1 WHERE id = ?2",
            params![99, id],
        )
        .expect("Version is changed.");

    let error = storage.get_project(id).expect_err("Version 99 is unknown");
    assert_that(&error.to_string()).contains("schema version 99");
}
