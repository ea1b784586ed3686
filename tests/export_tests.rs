use crate::funnel_extras::{sample_funnel, sample_project, sample_sequence};
use funnelcraft::template::{PageKind, escape_html};
use funnelcraft::{Project, TemplateSet, export_project, write_archive};
use spectral::prelude::*;
use std::io::{Cursor, Read};
use zip::ZipArchive;

mod funnel_extras;

fn archive_of(project: &Project, templates: &TemplateSet) -> ZipArchive<Cursor<Vec<u8>>> {
    let cursor = write_archive(project, templates, Cursor::new(Vec::new()))
        .expect("Project has a funnel.");
    ZipArchive::new(Cursor::new(cursor.into_inner())).expect("Archive is readable.")
}

fn entry_names(archive: &mut ZipArchive<Cursor<Vec<u8>>>) -> Vec<String> {
    (0..archive.len())
        .map(|index| {
            archive
                .by_index(index)
                .expect("Entry exists.")
                .name()
                .to_owned()
        })
        .collect()
}

fn entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("Missing entry {name}"))
        .read_to_string(&mut content)
        .expect("Entry is UTF-8.");
    content
}

#[tokio::test]
async fn archive_contains_every_page_and_email() {
    let project = sample_project(
        Some(sample_funnel("Acme", 2, 2).await),
        Some(sample_sequence("Acme")),
    );
    let mut archive = archive_of(&project, &TemplateSet::builtin());

    assert_that(&entry_names(&mut archive)).is_equal_to(
        [
            "index.html",
            "style.css",
            "funnel.js",
            "upsell_1.html",
            "upsell_2.html",
            "downsell_1.html",
            "downsell_2.html",
            "thank_you.html",
            "emails/email_1.txt",
            "emails/email_2.txt",
            "emails/email_3.txt",
            "emails/README.txt",
            "README.txt",
        ]
        .iter()
        .map(|name| (*name).to_owned())
        .collect::<Vec<_>>(),
    );
}

#[tokio::test]
async fn archive_without_emails_skips_email_directory() {
    let project = sample_project(Some(sample_funnel("Acme", 1, 1).await), None);
    let mut archive = archive_of(&project, &TemplateSet::builtin());

    let names = entry_names(&mut archive);
    assert_that(&names).has_length(7);
    assert_that(&names.iter().any(|name| name.starts_with("emails/"))).is_false();
}

#[tokio::test]
async fn pages_carry_flow_actions() {
    let project = sample_project(Some(sample_funnel("Acme", 2, 2).await), None);
    let mut archive = archive_of(&project, &TemplateSet::builtin());

    let index = entry(&mut archive, "index.html");
    assert_that(&index).contains("data-action=\"to_upsell_1\"");
    assert_that(&index).contains("data-action=\"exit\"");

    let upsell = entry(&mut archive, "upsell_2.html");
    assert_that(&upsell).contains("data-action=\"to_thank_you\"");
    assert_that(&upsell).contains("data-action=\"to_downsell_2\"");
    assert_that(&upsell).contains("$397");

    let script = entry(&mut archive, "funnel.js");
    assert_that(&script).contains("\"accept_action\":\"to_upsell_2\"");
    assert_that(&script.contains("{funnel_flow}")).is_false();
}

#[tokio::test]
async fn interpolated_text_is_escaped() {
    let project = sample_project(Some(sample_funnel("<Acme & Co>", 1, 1).await), None);
    let mut archive = archive_of(&project, &TemplateSet::builtin());

    for page in ["index.html", "upsell_1.html", "thank_you.html"] {
        let html = entry(&mut archive, page);
        assert_that(&html).contains("&lt;Acme &amp; Co&gt;");
        assert_that(&html.contains("<Acme & Co>")).is_false();
    }
}

#[tokio::test]
async fn unavailable_templates_use_skeleton_pages() {
    let funnel = sample_funnel("Acme", 1, 1).await;
    let headline = escape_html(&funnel.main_page.headline);
    let project = sample_project(Some(funnel), None);
    let templates = TemplateSet::default().with_template(PageKind::Upsell, "<h1>{unknown_slot}</h1>");
    let mut archive = archive_of(&project, &templates);

    let index = entry(&mut archive, "index.html");
    assert_that(&index).contains(format!("<h1>{headline}</h1>").as_str());
    assert_that(&index).contains("data-action=\"to_upsell_1\"");

    let upsell = entry(&mut archive, "upsell_1.html");
    assert_that(&upsell).contains("<h1>WAIT! Upgrade to Acme Pro for Maximum Results</h1>");
    assert_that(&upsell.contains("unknown_slot")).is_false();
}

#[tokio::test]
async fn emails_are_written_with_subject_header() {
    let project = sample_project(
        Some(sample_funnel("Acme", 1, 1).await),
        Some(sample_sequence("Acme")),
    );
    let mut archive = archive_of(&project, &TemplateSet::builtin());

    assert_that(&entry(&mut archive, "emails/email_1.txt")).is_equal_to(
        "Subject: Welcome to [Brand Name]\n\nWelcome email content goes here...".to_owned(),
    );

    let readme = entry(&mut archive, "emails/README.txt");
    assert_that(&readme).contains("- Email 1: Immediately after signup");
    assert_that(&readme).contains("- Email 3: Day 4");
    assert_that(&readme).contains("Number of Emails: 3");
}

#[tokio::test]
async fn export_writes_archive_named_after_project() {
    let dir = tempfile::tempdir().expect("Temporary directory.");
    let exports_dir = dir.path().join("exports");
    let project = sample_project(Some(sample_funnel("Acme", 1, 1).await), None);

    let path = export_project(&project, &exports_dir, &TemplateSet::builtin())
        .expect("Export succeeds.");

    assert_that(&path).is_equal_to(exports_dir.join("7.zip"));
    assert_that(&path.exists()).is_true();
}

#[test]
fn export_without_funnel_fails() {
    let dir = tempfile::tempdir().expect("Temporary directory.");
    let project = sample_project(None, Some(sample_sequence("Acme")));

    let result = export_project(&project, dir.path(), &TemplateSet::builtin());

    assert_that(&result.is_err()).is_true();
    assert_that(&dir.path().join("7.zip").exists()).is_false();
}
