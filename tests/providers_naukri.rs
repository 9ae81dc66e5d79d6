// tests/providers_naukri.rs
use job_alert_notifier::ingest::providers::naukri::{NaukriAdapter, NaukriSpec};
use job_alert_notifier::ingest::types::SourceAdapter;

const NAUKRI_JSON: &str = include_str!("fixtures/naukri_search.json");

fn spec() -> NaukriSpec {
    toml::from_str(
        r#"
name = "Naukri Bangalore"
keyword = "data analyst"
location = "bangalore"
"#,
    )
    .expect("spec")
}

#[tokio::test]
async fn parses_job_details_and_placeholders() {
    let adapter = NaukriAdapter::from_fixture_str(spec(), NAUKRI_JSON);
    let items = adapter.fetch().await.expect("naukri parse ok");

    // the untitled entry is skipped
    assert_eq!(items.len(), 2);

    let first = &items[0];
    assert_eq!(first.title, "Data Analyst - Fresher");
    assert_eq!(first.company, "Acme Analytics Pvt Ltd");
    assert_eq!(first.location, "Bangalore/Bengaluru");
    assert_eq!(first.source, "Naukri Bangalore");
    assert_eq!(first.salary.as_deref(), Some("3-4.5 Lacs PA"));
    assert_eq!(first.experience.as_deref(), Some("0-1 Yrs"));
    assert_eq!(first.posted_date.as_deref(), Some("1 Day Ago"));
    assert!(first
        .link
        .starts_with("https://www.naukri.com/job-listings-data-analyst-fresher"));
    assert_eq!(
        first.description,
        "Work with Python , SQL and Excel to build weekly dashboards."
    );

    assert_eq!(
        items[1].link,
        "https://www.naukri.com/job-listings-senior-business-analyst-globex-102"
    );
}

#[tokio::test]
async fn empty_and_broken_bodies() {
    let empty = NaukriAdapter::from_fixture_str(spec(), r#"{"noOfJobs": 0}"#);
    assert!(empty.fetch().await.expect("no results is ok").is_empty());

    let broken = NaukriAdapter::from_fixture_str(spec(), "<html>captcha</html>");
    assert!(broken.fetch().await.is_err());
}
