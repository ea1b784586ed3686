use funnelcraft::TextBy;
use funnelcraft::parse::parse_page;
use funnelcraft::scrape::{Cta, SalesElement};
use spectral::prelude::*;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Acme Growth Course</title>
    <meta name="description" content="Grow faster with Acme">
</head>
<body>
    <header><nav><a href="/">Home</a></nav>Acme</header>
    <main>
        <h1>Grow Your Business</h1>
        <h2>What you get</h2>
        <p>Weekly coaching calls</p>
        <ul><li>Templates</li><li>Checklists</li></ul>
        <div class="testimonial">Acme doubled our revenue.</div>
        <h3>Pro plan</h3>
        <div class="price-box">Only $197 today</div>
        <a class="btn-primary" href="/buy">Buy now</a>
        <form>
            <input type="email" name="email" placeholder="Your email">
            <input type="hidden" name="token" value="x">
            <button type="submit">Join</button>
        </form>
        <img src="/hero.png" alt="Hero">
    </main>
    <footer>Copyright Acme</footer>
</body>
</html>"#;

#[test]
fn landing_page_is_parsed() {
    let page = parse_page("https://acme.example.com", LANDING_PAGE, TextBy::FastHtml2Md)
        .expect("Selectors are valid.");

    assert_that(&page.title).is_equal_to("Acme Growth Course".to_owned());
    assert_that(&page.meta_description).is_equal_to("Grow faster with Acme".to_owned());

    let headings: Vec<(&str, &str)> = page
        .headings
        .iter()
        .map(|heading| (heading.level.as_str(), heading.text.as_str()))
        .collect();
    assert_that(&headings).is_equal_to(vec![
        ("h1", "Grow Your Business"),
        ("h2", "What you get"),
        ("h3", "Pro plan"),
    ]);

    assert_that(&page.images).has_length(1);
    assert_that(&page.structure.header.as_ref().map(|header| header.has_nav))
        .is_equal_to(Some(true));
    assert_that(&page.structure.footer).is_some();
    assert_that(&page.structure.main_content).is_some();
}

#[test]
fn sales_elements_are_collected() {
    let page = parse_page("https://acme.example.com", LANDING_PAGE, TextBy::FastHtml2Md)
        .expect("Selectors are valid.");

    assert_that(&page.sales_elements).contains(SalesElement::List {
        items: vec!["Templates".to_owned(), "Checklists".to_owned()],
    });
    assert_that(&page.sales_elements).contains(SalesElement::Testimonials {
        items: vec!["Acme doubled our revenue.".to_owned()],
    });
    assert_that(&page.sales_elements).contains(SalesElement::Benefits {
        heading: "what you get".to_owned(),
        content: vec![
            "Weekly coaching calls".to_owned(),
            "Templates".to_owned(),
            "Checklists".to_owned(),
        ],
    });
}

#[test]
fn calls_to_action_and_prices_are_collected() {
    let page = parse_page("https://acme.example.com", LANDING_PAGE, TextBy::FastHtml2Md)
        .expect("Selectors are valid.");

    assert_that(&page.ctas).contains(Cta::Button {
        text: "Buy now".to_owned(),
        url: "/buy".to_owned(),
    });

    let form = page.ctas.iter().find_map(|cta| match cta {
        Cta::Form {
            elements,
            submit_text,
        } => Some((elements.len(), submit_text.clone())),
        Cta::Button { .. } => None,
    });
    assert_that(&form).is_equal_to(Some((1, "Join".to_owned())));

    let prices: Vec<(&str, &str)> = page
        .pricing
        .iter()
        .map(|price| (price.title.as_str(), price.amount.as_str()))
        .collect();
    assert_that(&prices).is_equal_to(vec![("Pro plan", "197")]);
}

#[test]
fn prices_fall_back_to_text_amounts() {
    let html = "<html><head><title>Plain</title></head><body><p>Basic costs $49.99 per month.</p></body></html>";
    let page = parse_page("https://plain.example.com", html, TextBy::FastHtml2Md)
        .expect("Selectors are valid.");

    let amounts: Vec<&str> = page.pricing.iter().map(|price| price.amount.as_str()).collect();
    assert_that(&amounts).is_equal_to(vec!["49.99"]);
}
