// tests/providers_html.rs
use job_alert_notifier::extract::parse_salary;
use job_alert_notifier::ingest::providers::html_board::{HtmlBoardAdapter, HtmlBoardSpec};
use job_alert_notifier::ingest::types::SourceAdapter;

const BOARD_HTML: &str = include_str!("fixtures/board.html");

fn spec() -> HtmlBoardSpec {
    toml::from_str(
        r#"
name = "Example board"
url = "https://jobs.example.com/search?q=data"
default_location = "India"
[selectors]
card = "li.job-card"
title = ".job-title"
company = ".company"
location = ".location"
link = "a.job-link"
description = ".snippet"
salary = ".salary"
"#,
    )
    .expect("spec")
}

#[tokio::test]
async fn board_cards_become_postings() {
    let adapter = HtmlBoardAdapter::from_fixture_str(spec(), BOARD_HTML).expect("selectors ok");
    let items = adapter.fetch().await.expect("html parse ok");

    assert_eq!(items.len(), 2);
    let first = &items[0];
    assert_eq!(first.title, "Junior Data Analyst");
    assert_eq!(first.company, "Initech");
    assert_eq!(first.location, "Chennai, Tamil Nadu");
    assert_eq!(first.link, "https://jobs.example.com/jobs/7781");
    assert_eq!(first.description, "Excel & SQL reporting, KPI dashboards.");
    assert_eq!(first.salary.as_deref().and_then(parse_salary), Some(420_000));

    assert_eq!(items[1].link, "https://careers.example.org/r/55");
    assert!(items[1].salary.is_none());
    assert!(items.iter().all(|p| p.source == "Example board"));
}

#[tokio::test]
async fn page_without_cards_is_empty_not_error() {
    let adapter =
        HtmlBoardAdapter::from_fixture_str(spec(), "<html><body>No jobs</body></html>").unwrap();
    assert!(adapter.fetch().await.unwrap().is_empty());
}
