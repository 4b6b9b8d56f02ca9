//! Campaign endpoints.

use attribution_core::limits::PREVIEW_ROWS;
use attribution_core::{parse_date, NewCampaign};
use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::extractors::AdminAuth;
use crate::response::{
    AnalyzeResponse, ApiError, CampaignFilesResponse, CampaignListResponse, CreateCampaignResponse,
    FileEntry, PreviewResponse,
};
use crate::service::{analyze_campaign, exported_file_path, load_results};
use crate::state::AppState;

/// POST /api/campaigns - Create a campaign from a multipart upload.
///
/// Fields: `name`, `start_date`, `end_date` (YYYY-MM-DD) and `file` (CSV).
pub async fn create_handler(
    _auth: AdminAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateCampaignResponse>), ApiError> {
    let mut name = None;
    let mut start_date = None;
    let mut end_date = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
                upload = Some((file_name, bytes.to_vec()));
            }
            "name" | "start_date" | "end_date" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid field {}: {}", field_name, e)))?;
                match field_name.as_str() {
                    "name" => name = Some(value),
                    "start_date" => start_date = Some(value),
                    _ => end_date = Some(value),
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    if file_name.trim().is_empty() {
        return Err(ApiError::bad_request("No file selected"));
    }
    if !file_name.to_lowercase().ends_with(".csv") {
        return Err(ApiError::bad_request("Only CSV files can be uploaded"));
    }

    let required = |value: Option<String>, field: &str| {
        value
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("Missing field: {}", field)))
    };
    let request = NewCampaign {
        name: required(name, "name")?,
        start_date: parse_date(&required(start_date, "start_date")?)?,
        end_date: parse_date(&required(end_date, "end_date")?)?,
    };

    let campaign = request.into_campaign(&file_name)?;
    tokio::fs::create_dir_all(state.campaigns.uploads_dir())
        .await
        .map_err(attribution_core::Error::from)?;
    tokio::fs::write(state.campaigns.upload_path(&campaign.customer_file), &bytes)
        .await
        .map_err(attribution_core::Error::from)?;
    state.campaigns.save(&campaign).await?;

    info!(
        campaign_id = %campaign.id,
        name = %campaign.name,
        bytes = bytes.len(),
        "Campaign created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateCampaignResponse {
            success: true,
            campaign_id: campaign.id,
        }),
    ))
}

/// GET /api/campaigns - All campaigns, newest first.
pub async fn list_handler(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<CampaignListResponse>, ApiError> {
    let campaigns = state.campaigns.list_all().await?;
    Ok(Json(CampaignListResponse { campaigns }))
}

/// GET /api/campaigns/:id
pub async fn get_handler(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<attribution_core::Campaign>, ApiError> {
    Ok(Json(state.campaigns.get(&id).await?))
}

/// POST /api/campaigns/:id/analyze - Run the attribution pipeline.
pub async fn analyze_handler(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    match analyze_campaign(&state, &id).await {
        Ok(results) => Ok(Json(AnalyzeResponse {
            success: true,
            campaign_id: id,
            results,
        })),
        Err(e) => {
            let precondition = e.is_precondition();
            let api = ApiError::from(e);
            if precondition {
                Err(api.with_details(vec![format!(
                    "campaign {} was marked as error; check the database settings",
                    id
                )]))
            } else {
                Err(api)
            }
        }
    }
}

/// GET /api/campaigns/:id/files - Exported files and stored results.
pub async fn files_handler(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CampaignFilesResponse>, ApiError> {
    let campaign = state.campaigns.get(&id).await?;
    let results = match load_results(&state, &id).await {
        Ok(results) => results,
        Err(e) => {
            warn!(campaign_id = %id, error = %e, "Unreadable results file");
            None
        }
    };

    let mut files = Vec::new();
    let dir = state.campaigns.results_dir(&id)?;
    if let Ok(mut entries) = tokio::fs::read_dir(&dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            let filename = entry.file_name().to_string_lossy().into_owned();
            if filename == store::RESULTS_FILE {
                continue;
            }
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            files.push(FileEntry {
                filename,
                size: meta.len(),
                created: meta.modified().ok().map(Into::into),
            });
        }
    }
    files.sort_by(|a, b| a.filename.cmp(&b.filename));

    let (validation, stats) = match results {
        Some(results) => (Some(results.validation), Some(results.final_stats)),
        None => (None, None),
    };

    Ok(Json(CampaignFilesResponse {
        status: campaign.status,
        files,
        validation,
        stats,
    }))
}

/// GET /api/campaigns/:id/download/:filename
pub async fn download_handler(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path((id, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let path = exported_file_path(&state, &id, &filename)?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::not_found(format!("File not found: {}", filename)))?;

    let content_type = if filename.ends_with(".csv") {
        "text/csv; charset=utf-8"
    } else {
        "application/octet-stream"
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

/// GET /api/campaigns/:id/preview/:filename - First rows of an exported CSV.
pub async fn preview_handler(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path((id, filename)): Path<(String, String)>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let path = exported_file_path(&state, &id, &filename)?;
    if !filename.ends_with(".csv") {
        return Err(ApiError::bad_request("Only CSV files can be previewed"));
    }
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::not_found(format!("File not found: {}", filename)))?;

    let preview = read_preview(&bytes, PREVIEW_ROWS).map_err(attribution_core::Error::from)?;
    Ok(Json(PreviewResponse {
        filename,
        showing: preview.1.len(),
        columns: preview.0,
        data: preview.1,
        total_rows: preview.2,
    }))
}

type PreviewRows = (
    Vec<String>,
    Vec<serde_json::Map<String, serde_json::Value>>,
    usize,
);

fn read_preview(bytes: &[u8], limit: usize) -> Result<PreviewRows, csv::Error> {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(body);
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    let mut total = 0;
    for record in reader.records() {
        let record = record?;
        total += 1;
        if rows.len() < limit {
            let row = columns
                .iter()
                .zip(record.iter())
                .map(|(column, value)| {
                    let value = if value.is_empty() {
                        serde_json::Value::Null
                    } else {
                        serde_json::Value::String(value.to_string())
                    };
                    (column.clone(), value)
                })
                .collect();
            rows.push(row);
        }
    }
    Ok((columns, rows, total))
}
