use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::{error, info, warn};

use crate::ai::TextGenerator;
use crate::analysis::{self, AnalysisSummary};
use crate::chat;
use crate::config::Config;
use crate::report;

const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;
const HOSTED_DOMAIN: &str = "onrender.com";

/// Everything a handler needs, injected instead of read from globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: TextGenerator,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/report", get(report_page))
        .route("/chat", post(chat::chat))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(
        "<h1>Budget Insight Backend Running</h1>\
         <p>Use /upload (POST) to upload a database and /report (GET) to see the latest report.</p>",
    )
}

async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut upload: Option<(String, Bytes)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "failed to read multipart body");
                break;
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let Some(filename) = sanitized_file_name(field.file_name().unwrap_or("")) else {
            return json_error(StatusCode::BAD_REQUEST, "No selected file");
        };
        match field.bytes().await {
            Ok(data) => upload = Some((filename, data)),
            Err(err) => {
                warn!(error = %err, "failed to read upload payload");
                return json_error(StatusCode::BAD_REQUEST, "Failed to read uploaded file");
            }
        }
        break;
    }

    let Some((filename, data)) = upload else {
        return json_error(StatusCode::BAD_REQUEST, "No file part");
    };

    let db_path = state.config.upload_dir.join(&filename);
    if let Err(err) = tokio::fs::write(&db_path, &data).await {
        error!(path = %db_path.display(), error = %err, "failed to persist upload");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save uploaded file");
    }
    info!(filename = %filename, bytes = data.len(), "upload saved");

    // rusqlite is synchronous, so the aggregation runs off the async runtime.
    let summary = match tokio::task::spawn_blocking(move || analysis::analyze_database(&db_path)).await {
        Ok(summary) => summary,
        Err(err) => {
            error!(error = %err, "analysis task failed");
            AnalysisSummary::default()
        }
    };

    let document = report::build_report(&summary, &filename);
    if let Err(err) = tokio::fs::write(&state.config.report_file, &document).await {
        error!(path = %state.config.report_file.display(), error = %err, "failed to write report");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to write report");
    }
    info!(filename = %filename, "report generated");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let report_url = format!("{}://{}/report", report_scheme(&headers, host), host);

    (StatusCode::OK, Json(json!({ "success": true, "report_url": report_url }))).into_response()
}

async fn report_page(State(state): State<AppState>) -> Html<String> {
    let contents = match tokio::fs::read_to_string(&state.config.report_file).await {
        Ok(contents) => contents,
        Err(_) => report::PLACEHOLDER.to_string(),
    };
    Html(contents)
}

pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Reduce a client-supplied filename to its final path component. Returns
/// None when nothing usable remains.
fn sanitized_file_name(raw: &str) -> Option<String> {
    Path::new(raw.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}

/// The report link is https when the proxy says the request was, or when the
/// service runs on the known hosting domain.
fn report_scheme(headers: &HeaderMap, host: &str) -> &'static str {
    let forwarded = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if forwarded.eq_ignore_ascii_case("https") || host.contains(HOSTED_DOMAIN) {
        "https"
    } else {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_is_reduced_to_basename() {
        assert_eq!(sanitized_file_name("budget.db"), Some("budget.db".to_string()));
        assert_eq!(sanitized_file_name("../../etc/passwd"), Some("passwd".to_string()));
        assert_eq!(sanitized_file_name("dir/sub/file.db"), Some("file.db".to_string()));
    }

    #[test]
    fn test_unusable_filenames_are_rejected() {
        assert_eq!(sanitized_file_name(""), None);
        assert_eq!(sanitized_file_name("   "), None);
        assert_eq!(sanitized_file_name(".."), None);
        assert_eq!(sanitized_file_name("/"), None);
    }

    #[test]
    fn test_scheme_follows_forwarded_proto_and_host() {
        let mut headers = HeaderMap::new();
        assert_eq!(report_scheme(&headers, "localhost:5000"), "http");

        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(report_scheme(&headers, "localhost:5000"), "https");

        let plain = HeaderMap::new();
        assert_eq!(report_scheme(&plain, "myapp.onrender.com"), "https");
    }
}
