// src/web.rs

use crate::config::{Config, ExportConfig};
use crate::error::AppError;
use crate::export;
use crate::fields::FieldSpec;
use crate::report::{self, Report, UploadedDoc};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Multipart field name used by the upload form.
const FILES_FIELD: &str = "files";

const PAGE_TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Bill Data Extractor</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 72rem; color: #1e293b; }
    form { margin: 1.5rem 0; padding: 1rem; border: 1px dashed #94a3b8; border-radius: 8px; }
    button { margin-left: 1rem; padding: .4rem 1rem; }
    table.report { border-collapse: collapse; width: 100%; }
    table.report th, table.report td { border: 1px solid #cbd5e1; padding: .35rem .6rem; text-align: left; }
    table.report th { background: #f1f5f9; }
    .notice { color: #b45309; }
  </style>
</head>
<body>
  <h1>Bill Data Extractor</h1>
  <form action="/extract" method="post" enctype="multipart/form-data">
    <label>Choose PDF Bills <input type="file" name="files" accept=".pdf,application/pdf" multiple></label>
    <button type="submit">Extract Data</button>
  </form>
{{RESULTS}}
</body>
</html>
"##;

fn render_page(results: &str) -> String {
    PAGE_TEMPLATE.replace("{{RESULTS}}", results)
}

struct Shared {
    fields: Vec<FieldSpec>,
    export: ExportConfig,
    /// Most recent spreadsheet; each run overwrites it.
    last_export: RwLock<Option<Vec<u8>>>,
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Shared>,
}

impl AppState {
    pub fn new(fields: Vec<FieldSpec>, export: ExportConfig) -> Self {
        Self {
            inner: Arc::new(Shared {
                fields,
                export,
                last_export: RwLock::new(None),
            }),
        }
    }

    async fn run_batch(&self, docs: Vec<UploadedDoc>) -> Result<Report, AppError> {
        let fields = self.inner.fields.clone();
        let report =
            tokio::task::spawn_blocking(move || report::process_batch(&docs, &fields)).await?;

        let bytes = export::write_xlsx(&report, &self.inner.export.sheet_name)?;
        *self.inner.last_export.write().await = Some(bytes);
        Ok(report)
    }
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/extract", post(extract))
        .route("/api/extract", post(api_extract))
        .route("/download", get(download))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web UI and block until Ctrl-C.
pub async fn serve(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.bind_addr();
    let state = AppState::new(cfg.fields, cfg.export);
    let router = build_router(state, cfg.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Bill Data Extractor listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

/// Pull every uploaded file out of the form, in upload order.
async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedDoc>, AppError> {
    let mut docs = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        // browsers send one empty part when nothing was picked
        if name.is_empty() && bytes.is_empty() {
            continue;
        }
        docs.push(UploadedDoc {
            name,
            bytes: bytes.to_vec(),
        });
    }
    Ok(docs)
}

async fn index() -> Html<String> {
    Html(render_page(""))
}

async fn extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut docs = read_uploads(multipart).await?;
    report::retain_pdfs(&mut docs);
    if docs.is_empty() {
        return Ok(Html(render_page(
            "<p class=\"notice\">Please upload some PDF files.</p>",
        )));
    }

    let report = state.run_batch(docs).await?;
    let results = format!(
        "{}\n<p><a href=\"/download\" download=\"{}\">Download Excel</a></p>",
        report.to_html(),
        report::escape_html(&state.inner.export.file_name),
    );
    Ok(Html(render_page(&results)))
}

async fn api_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Report>, AppError> {
    let mut docs = read_uploads(multipart).await?;
    report::retain_pdfs(&mut docs);
    if docs.is_empty() {
        // leave the previous export in place
        return Ok(Json(Report::new(&state.inner.fields)));
    }
    let report = state.run_batch(docs).await?;
    Ok(Json(report))
}

async fn download(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bytes = state
        .inner
        .last_export
        .read()
        .await
        .clone()
        .ok_or(AppError::NoExport)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        state.inner.export.file_name.replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
