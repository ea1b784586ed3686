use funnelcraft::TemplateSet;
use funnelcraft::template::{PageKind, escape_html, fill};
use spectral::prelude::*;
use std::fs;

#[test]
fn fill_replaces_every_slot() {
    let filled = fill(
        "{brand_name} costs ${price}, buy {brand_name} now",
        &[("brand_name", "Acme"), ("price", "97")],
    )
    .expect("All slots have values.");

    assert_that(&filled).is_equal_to("Acme costs $97, buy Acme now".to_owned());
}

#[test]
fn fill_leaves_braces_inside_values() {
    let filled = fill("<p>{text}</p>", &[("text", "{headline} stays")])
        .expect("All slots have values.");

    assert_that(&filled).is_equal_to("<p>{headline} stays</p>".to_owned());
}

#[test]
fn fill_reports_unresolved_slots() {
    let error = fill("{headline} and {price}", &[("headline", "Hi")])
        .expect_err("price has no value");

    assert_that(&error.to_string()).contains("price");
}

#[test]
fn escape_html_escapes_markup() {
    assert_that(&escape_html(r#"<b>"Tom" & 'Jerry'</b>"#))
        .is_equal_to("&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;".to_owned());
}

#[test]
fn builtin_templates_cover_every_kind() {
    let templates = TemplateSet::builtin();

    for kind in [PageKind::Main, PageKind::Upsell, PageKind::Downsell] {
        let template = templates.get(kind).expect("Builtin template exists.");
        assert_that(&template).contains("data-action=\"{accept_action}\"");
        assert_that(&template).contains("data-action=\"{decline_action}\"");
    }
}

#[test]
fn templates_from_dir_leave_missing_kinds_unavailable() {
    let dir = tempfile::tempdir().expect("Temporary directory.");
    fs::write(dir.path().join("upsell.html"), "<h1>{headline}</h1>").expect("Template written.");

    let templates = TemplateSet::from_dir(dir.path()).expect("Directory is readable.");

    assert_that(&templates.get(PageKind::Upsell)).is_equal_to(Some("<h1>{headline}</h1>"));
    assert_that(&templates.get(PageKind::Main)).is_none();
    assert_that(&templates.get(PageKind::Downsell)).is_none();
}

#[test]
fn with_template_overrides_one_kind() {
    let templates = TemplateSet::default().with_template(PageKind::Main, "<p>{headline}</p>");

    assert_that(&templates.get(PageKind::Main)).is_equal_to(Some("<p>{headline}</p>"));
    assert_that(&templates.get(PageKind::Upsell)).is_none();
}
