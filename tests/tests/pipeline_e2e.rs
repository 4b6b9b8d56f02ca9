//! End-to-end tests of the attribution pipeline over mock stores.

use attribution_core::{Category, CustomerTable, RecordStatus};
use integration_tests::fixtures::{customer_csv, emails, jan, january, submission, Utm};
use integration_tests::mocks::MockConnector;
use integration_tests::setup::pipeline_for;
use pipeline::{validate, ValidationStatus};

/// No submissions in the store → one NO_RECORD row.
#[tokio::test]
async fn test_email_without_submissions_is_no_record() {
    let connector = MockConnector::new();
    let output = pipeline_for(&connector)
        .run(&emails(&["a@x.com"]), &january())
        .await
        .unwrap();

    assert_eq!(output.records.len(), 1);
    let row = &output.records[0];
    assert_eq!(row.category, Category::NoRecord);
    assert_eq!(row.status(), RecordStatus::NoRecord);
    assert!(!row.utm().has_any());
    assert!(row.submitted_at().is_none());
    assert_eq!(row.enriched.record.submission_count, 0);
}

/// Earlier valid Meta submission wins over a later placeholder-corrupted one.
#[tokio::test]
async fn test_earlier_valid_submission_wins_over_placeholder() {
    let connector = MockConnector::new();
    connector.add_adset("120200", "Prospecting TR");
    connector.add_submission(submission("b@x.com", jan(3, 10), Utm::meta("fb", "120200")));
    connector.add_submission(submission(
        "b@x.com",
        jan(9, 10),
        Utm::new()
            .source("ig")
            .campaign("{{campaign.name}}")
            .term("{{adset.id}}"),
    ));

    let output = pipeline_for(&connector)
        .run(&emails(&["b@x.com"]), &january())
        .await
        .unwrap();

    assert_eq!(output.records.len(), 1);
    let row = &output.records[0];
    assert_eq!(row.category, Category::AdMeta);
    assert_eq!(row.submitted_at(), Some(jan(3, 10)));
    assert_eq!(row.enriched.record.submission_count, 2);
    assert_eq!(row.enriched.campaign_name.as_deref(), Some("Winter Sale"));
    assert_eq!(row.enriched.ad_name.as_deref(), Some("Carousel A"));
    assert_eq!(row.adset_name(), Some("Prospecting TR"));
}

/// Only blank UTM values → EMPTY.
#[tokio::test]
async fn test_blank_utm_is_empty() {
    let connector = MockConnector::new();
    connector.add_submission(submission(
        "c@x.com",
        jan(5, 8),
        Utm::new().source("  ").medium("nan").term(""),
    ));

    let output = pipeline_for(&connector)
        .run(&emails(&["c@x.com"]), &january())
        .await
        .unwrap();

    let row = &output.records[0];
    assert_eq!(row.status(), RecordStatus::Empty);
    assert_eq!(row.category, Category::Empty);
    assert_eq!(row.submitted_at(), Some(jan(5, 8)));
    // The catalog is never needed without UTM rows
    assert_eq!(connector.ad_catalog_opens(), 0);
}

/// Non-Meta source → ORGANIC.
#[tokio::test]
async fn test_google_source_is_organic() {
    let connector = MockConnector::new();
    connector.add_submission(submission(
        "d@x.com",
        jan(12, 14),
        Utm::new().source("google").medium("cpc").campaign("brand"),
    ));

    let output = pipeline_for(&connector)
        .run(&emails(&["d@x.com"]), &january())
        .await
        .unwrap();

    assert_eq!(output.records[0].category, Category::Organic);
    assert_eq!(output.records[0].adset_name(), None);
}

/// Literal `null` / `None` text is a real UTM value, not a missing one.
#[tokio::test]
async fn test_literal_null_source_is_organic() {
    let connector = MockConnector::new();
    connector.add_submission(submission("n@x.com", jan(6, 11), Utm::new().source("null")));
    connector.add_submission(submission(
        "m@x.com",
        jan(7, 11),
        Utm::new().source("fb").term("None"),
    ));

    let output = pipeline_for(&connector)
        .run(&emails(&["n@x.com", "m@x.com"]), &january())
        .await
        .unwrap();

    let row = |email: &str| output.records.iter().find(|r| r.email() == email).unwrap();
    assert_eq!(row("n@x.com").status(), RecordStatus::UtmPresent);
    assert_eq!(row("n@x.com").category, Category::Organic);

    // A stringified empty ad-set ID is never looked up
    assert_eq!(row("m@x.com").category, Category::AdMeta);
    assert_eq!(output.stats.enricher.skipped, 1);
    assert_eq!(output.stats.enricher.attempted, 0);
    assert_eq!(connector.adset_lookups(), 0);
}

/// Unknown ad-set ID leaves adset_name empty and shows up in validation.
#[tokio::test]
async fn test_unknown_adset_counts_in_validation() {
    let connector = MockConnector::new();
    connector.add_submission(submission("e@x.com", jan(2, 9), Utm::meta("facebook", "12345")));

    let output = pipeline_for(&connector)
        .run(&emails(&["e@x.com"]), &january())
        .await
        .unwrap();

    let row = &output.records[0];
    assert_eq!(row.category, Category::AdMeta);
    assert_eq!(row.adset_name(), None);
    assert_eq!(output.stats.enricher.attempted, 1);
    assert_eq!(output.stats.enricher.failed, 1);

    let input = CustomerTable::from_reader(customer_csv("email", &["e@x.com"]).as_bytes(), None).unwrap();
    let report = validate(&input, &output.records);
    assert_eq!(report.stats.meta_null_adset, 1);
    assert_eq!(report.status, ValidationStatus::Success);
}

#[tokio::test]
async fn test_submissions_outside_window_are_ignored() {
    let connector = MockConnector::new();
    connector.add_submission(submission(
        "late@x.com",
        chrono::NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        Utm::meta("fb", "1"),
    ));
    connector.add_submission(submission("edge@x.com", jan(31, 23), Utm::meta("fb", "1")));

    let output = pipeline_for(&connector)
        .run(&emails(&["late@x.com", "edge@x.com"]), &january())
        .await
        .unwrap();

    let category = |email: &str| {
        output
            .records
            .iter()
            .find(|r| r.email() == email)
            .map(|r| r.category)
    };
    assert_eq!(category("late@x.com"), Some(Category::NoRecord));
    assert_eq!(category("edge@x.com"), Some(Category::AdMeta));
}

#[tokio::test]
async fn test_one_row_per_distinct_email() {
    let connector = MockConnector::new();
    for day in 1..=4 {
        connector.add_submission(submission("Multi@X.com", jan(day, 12), Utm::new().source("google")));
    }

    let input = emails(&["multi@x.com", " MULTI@x.com", "solo@x.com", "multi@x.com"]);
    let output = pipeline_for(&connector).run(&input, &january()).await.unwrap();

    assert_eq!(output.stats.collector.total_emails, 2);
    assert_eq!(output.stats.collector.total_records, 5);
    assert_eq!(output.records.len(), 2);
    assert_eq!(output.stats.resolver.resolved, 2);

    let sum: f64 = output.stats.categories.categories.iter().map(|c| c.percentage).sum();
    assert!((sum - 100.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_submission_store_down_is_fatal() {
    let connector = MockConnector::new();
    connector.set_submission_store_down(true);

    let err = pipeline_for(&connector)
        .run(&emails(&["a@x.com"]), &january())
        .await
        .unwrap_err();

    assert!(err.is_precondition());
    assert_eq!(err.error_code(), "STORE_001");
    assert_eq!(connector.ad_catalog_opens(), 0);
}

#[tokio::test]
async fn test_ad_catalog_down_is_fatal_after_closing_store() {
    let connector = MockConnector::new();
    connector.set_ad_catalog_down(true);
    connector.add_submission(submission("b@x.com", jan(3, 10), Utm::meta("ig", "7")));

    let err = pipeline_for(&connector)
        .run(&emails(&["b@x.com"]), &january())
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "STORE_002");
    assert_eq!(connector.submission_store_opens(), 1);
    // The submission store was closed when its stage finished
    assert_eq!(connector.closes(), 1);
}

#[tokio::test]
async fn test_per_row_failures_do_not_abort() {
    let connector = MockConnector::new();
    connector.fail_email("broken@x.com");
    connector.fail_adset("999");
    connector.add_submission(submission("ok@x.com", jan(4, 9), Utm::meta("fb", "999")));

    let output = pipeline_for(&connector)
        .run(&emails(&["broken@x.com", "ok@x.com"]), &january())
        .await
        .unwrap();

    assert_eq!(output.records.len(), 2);
    assert_eq!(output.stats.collector.lookup_errors, 1);
    assert_eq!(output.stats.enricher.errors, 1);

    let broken = output.records.iter().find(|r| r.email() == "broken@x.com").unwrap();
    assert_eq!(broken.category, Category::NoRecord);
    let ok = output.records.iter().find(|r| r.email() == "ok@x.com").unwrap();
    assert_eq!(ok.category, Category::AdMeta);
    assert_eq!(ok.adset_name(), None);

    // Both stores closed
    assert_eq!(connector.closes(), 2);
}

#[tokio::test]
async fn test_identical_adset_ids_are_looked_up_once() {
    let connector = MockConnector::new();
    connector.add_adset("555", "Retargeting");
    for i in 0..6 {
        let email = format!("buyer{}@x.com", i);
        connector.add_submission(submission(&email, jan(10, 10), Utm::meta("fb", "555")));
    }

    let input: Vec<String> = (0..6).map(|i| format!("buyer{}@x.com", i)).collect();
    let output = pipeline_for(&connector).run(&input, &january()).await.unwrap();

    assert!(output.records.iter().all(|r| r.adset_name() == Some("Retargeting")));
    assert_eq!(output.stats.enricher.succeeded, 6);
    assert_eq!(connector.adset_lookups(), 1);
}

#[tokio::test]
async fn test_validator_flags_missing_emails() {
    let connector = MockConnector::new();
    let output = pipeline_for(&connector)
        .run(&emails(&["a@x.com"]), &january())
        .await
        .unwrap();

    let complete = CustomerTable::from_reader(customer_csv("Email", &["A@x.com", "a@x.com"]).as_bytes(), None).unwrap();
    let report = validate(&complete, &output.records);
    assert_eq!(report.status, ValidationStatus::Success);
    assert_eq!(report.stats.duplicates, 1);

    let wider = CustomerTable::from_reader(customer_csv("email", &["a@x.com", "zz@x.com"]).as_bytes(), None).unwrap();
    let report = validate(&wider, &output.records);
    assert_eq!(report.status, ValidationStatus::Failed);
    assert_eq!(report.stats.missing_emails, 1);
}
