//! HTTP handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::advisor::{ExpenseMap, FinancialSummary};
use crate::documents::{extract_text, Document};
use crate::error::FinsightError;
use crate::log_component;
use crate::session::Conversation;
use crate::utils::string::preview;

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: FinancialSummary,
    pub conversation: Conversation,
}

#[derive(Debug, Deserialize)]
pub struct FollowupRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub conversation: Conversation,
}

#[derive(Debug, Serialize)]
pub struct FollowupResponse {
    pub reply: String,
    pub conversation: Conversation,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub expenses: ExpenseMap,
    pub total: f64,
    pub empty: bool,
}

// ============================================================================
// Multipart upload
// ============================================================================

#[derive(Debug, Default)]
struct Upload {
    documents: Vec<Document>,
    api_key: Option<String>,
}

async fn read_upload(mut multipart: Multipart, max_bytes: u64) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| FinsightError::MissingInput(format!("malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "files" => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(|e| {
                    FinsightError::Document(format!("failed to read upload {}: {}", name, e))
                })? {
                    if (bytes.len() + chunk.len()) as u64 > max_bytes {
                        return Err(FinsightError::Document(format!(
                            "{} is too large (max {} bytes)",
                            name, max_bytes
                        ))
                        .into());
                    }
                    bytes.extend_from_slice(&chunk);
                }
                upload.documents.push(Document::new(name, bytes));
            }
            "api_key" => {
                let key = field.text().await.map_err(|e| {
                    FinsightError::MissingInput(format!("unreadable api_key field: {}", e))
                })?;
                upload.api_key = Some(key);
            }
            _ => {}
        }
    }

    Ok(upload)
}

/// Extract statement text from uploaded documents off the async runtime.
async fn statement_text(state: &AppState, documents: Vec<Document>) -> Result<String, ApiError> {
    let extractor = state.extractor.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(extractor.as_ref(), &documents))
        .await
        .map_err(|e| FinsightError::Io(std::io::Error::other(e)))??;

    log_component!(
        debug,
        "server",
        "extracted statement text",
        chars = text.chars().count(),
        preview = preview(&text, 100).as_str()
    );
    Ok(text)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /advice/
pub async fn advice_status() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Advice endpoint is working!",
    })
}

/// GET /analyze/
pub async fn analyze_status() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Analyze endpoint is working!",
    })
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /advice/summary - multipart `files` + `api_key`
pub async fn summary(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SummaryResponse>, ApiError> {
    let upload = read_upload(multipart, state.max_document_bytes).await?;
    if upload.documents.is_empty() {
        return Err(FinsightError::MissingInput("Missing files or API key".to_string()).into());
    }
    let credentials = state.credentials(upload.api_key)?;

    let text = statement_text(&state, upload.documents).await?;
    let (summary, conversation) = state.advisor.begin_session(&text, &credentials).await?;

    Ok(Json(SummaryResponse {
        summary,
        conversation,
    }))
}

/// POST /advice/followup - JSON `{question, api_key, conversation?}`
pub async fn followup(
    State(state): State<AppState>,
    body: Result<Json<FollowupRequest>, JsonRejection>,
) -> Result<Json<FollowupResponse>, ApiError> {
    let Json(request) = body.map_err(|e| {
        FinsightError::MissingInput(format!("invalid request body: {}", e.body_text()))
    })?;

    let question = request
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| FinsightError::MissingInput("Missing question or API key".to_string()))?;
    let credentials = state.credentials(request.api_key)?;

    let (reply, conversation) = state
        .advisor
        .answer_followup(&request.conversation, &question, &credentials)
        .await?;

    Ok(Json(FollowupResponse {
        reply,
        conversation,
    }))
}

/// POST /analyze/ - multipart `files` + `api_key`
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let upload = read_upload(multipart, state.max_document_bytes).await?;
    if upload.documents.is_empty() {
        return Err(FinsightError::MissingInput("Missing files or API key".to_string()).into());
    }
    let credentials = state.credentials(upload.api_key)?;

    let text = statement_text(&state, upload.documents).await?;
    let expenses = state
        .advisor
        .produce_expense_breakdown(&text, &credentials)
        .await?;

    Ok(Json(AnalyzeResponse {
        total: expenses.total(),
        empty: expenses.is_empty(),
        expenses,
    }))
}
