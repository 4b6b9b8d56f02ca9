//! Tests for the campaign HTTP API.

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use integration_tests::fixtures::{customer_csv, jan, submission, Utm};
use integration_tests::setup::{TestContext, TEST_API_KEY};

fn campaign_form(name: &str, start: &str, end: &str, file_name: &str, csv: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name.to_string())
        .add_text("start_date", start.to_string())
        .add_text("end_date", end.to_string())
        .add_part(
            "file",
            Part::bytes(csv.as_bytes().to_vec())
                .file_name(file_name.to_string())
                .mime_type("text/csv"),
        )
}

async fn create_campaign(server: &TestServer, csv: &str) -> String {
    let response = server
        .post("/api/campaigns")
        .multipart(campaign_form("Winter Sale", "2024-01-01", "2024-01-31", "customers.csv", csv))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    body["campaign_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_and_list_campaign() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let id = create_campaign(&server, &customer_csv("email", &["a@x.com"])).await;
    assert_eq!(id.len(), 8);

    let response = server.get(&format!("/api/campaigns/{}", id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Winter Sale");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["start_date"], "2024-01-01");

    let stored = ctx.campaigns.get(&id).await.unwrap();
    assert!(ctx.campaigns.upload_path(&stored.customer_file).exists());

    let response = server.get("/api/campaigns").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["campaigns"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let csv = customer_csv("email", &["a@x.com"]);

    let response = server
        .post("/api/campaigns")
        .multipart(campaign_form("X", "2024-01-01", "2024-01-31", "customers.xlsx", &csv))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/campaigns")
        .multipart(campaign_form("X", "2024-02-01", "2024-01-01", "customers.csv", &csv))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INPUT_002");

    let response = server
        .post("/api/campaigns")
        .multipart(campaign_form("X", "01/02/2024", "2024-01-31", "customers.csv", &csv))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/campaigns")
        .multipart(campaign_form("", "2024-01-01", "2024-01-31", "customers.csv", &csv))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    assert!(ctx.campaigns.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_campaign_is_404() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/api/campaigns/deadbeef").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CAMPAIGN_001");

    let response = server.post("/api/campaigns/deadbeef/analyze").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_exports_and_completes() {
    let ctx = TestContext::new().await;
    ctx.connector.add_adset("120200", "Prospecting TR");
    ctx.connector
        .add_submission(submission("meta@x.com", jan(3, 10), Utm::meta("fb", "120200")));
    ctx.connector
        .add_submission(submission("organic@x.com", jan(4, 10), Utm::new().source("google")));
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let csv = customer_csv(
        "MAİL ADRESİ",
        &["meta@x.com", "organic@x.com", "none@x.com", "META@x.com"],
    );
    let id = create_campaign(&server, &csv).await;

    let response = server.post(&format!("/api/campaigns/{}/analyze", id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let results = &body["results"];
    assert_eq!(results["email_column"], "MAİL ADRESİ");
    assert_eq!(results["final_stats"]["total_emails"], 3);
    assert_eq!(results["final_stats"]["ad_meta"], 1);
    assert_eq!(results["final_stats"]["organic"], 1);
    assert_eq!(results["final_stats"]["no_record"], 1);
    assert_eq!(results["final_stats"]["match_rate"], 33.3);
    assert_eq!(results["validation"]["status"], "success");
    assert_eq!(results["validation"]["stats"]["duplicates"], 1);

    let campaign = ctx.campaigns.get(&id).await.unwrap();
    assert_eq!(campaign.status.as_str(), "completed");

    let response = server.get(&format!("/api/campaigns/{}/files", id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["stats"]["ad_meta"], 1);
    let files: Vec<String> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["filename"].as_str().unwrap().to_string())
        .collect();
    // Analysis file plus one per category present
    assert_eq!(files.len(), 4);
    let analysis = files
        .iter()
        .find(|f| f.starts_with("Winter_Sale_ANALYSIS_"))
        .unwrap()
        .clone();

    let response = server
        .get(&format!("/api/campaigns/{}/download/{}", id, analysis))
        .await;
    response.assert_status_ok();
    let text = response.text();
    assert!(text.trim_start_matches('\u{feff}').starts_with("category,email,"));

    let response = server
        .get(&format!("/api/campaigns/{}/preview/{}", id, analysis))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["showing"], 3);
    assert_eq!(body["columns"][0], "category");
}

#[tokio::test]
async fn test_analyze_with_store_down_marks_error() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let id = create_campaign(&server, &customer_csv("email", &["a@x.com"])).await;

    ctx.connector.set_submission_store_down(true);
    let response = server.post(&format!("/api/campaigns/{}/analyze", id)).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "STORE_001");
    assert!(body["details"].is_array());

    assert_eq!(ctx.campaigns.get(&id).await.unwrap().status.as_str(), "error");
}

#[tokio::test]
async fn test_analyze_without_email_column_is_input_error() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let id = create_campaign(&server, "name,phone\nAyşe,555\n").await;

    let response = server.post(&format!("/api/campaigns/{}/analyze", id)).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INPUT_001");
    assert_eq!(body["details"][1], "phone");

    assert_eq!(ctx.campaigns.get(&id).await.unwrap().status.as_str(), "error");
    assert_eq!(ctx.connector.submission_store_opens(), 0);
}

#[tokio::test]
async fn test_download_rejects_unsafe_names() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let id = create_campaign(&server, &customer_csv("email", &["a@x.com"])).await;

    let response = server
        .get(&format!("/api/campaigns/{}/download/results.json", id))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get(&format!("/api/campaigns/{}/download/.hidden.csv", id))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get(&format!("/api/campaigns/{}/download/missing.csv", id))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let ctx = TestContext::with_api_key().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server
        .get("/api/campaigns")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/campaigns")
        .add_header("X-API-Key", "wrong")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/campaigns")
        .add_header("X-API-Key", TEST_API_KEY)
        .await
        .assert_status_ok();

    server
        .get("/api/campaigns")
        .add_header("Authorization", format!("Bearer {}", TEST_API_KEY))
        .await
        .assert_status_ok();

    // Probes stay open
    server.get("/health/live").await.assert_status_ok();
}
