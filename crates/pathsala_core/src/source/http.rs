//! REST client for the notes backend.

use super::{
    decode_record, decode_records, CatalogResult, CatalogSource, CatalogStats, NoteListQuery,
    ProgramListQuery, SubjectListQuery,
};
use crate::config::ClientConfig;
use crate::model::academic::{College, NewCollege, NewProgram, NewSubject, Program, Subject};
use crate::model::note::Note;
use async_trait::async_trait;
use log::debug;
use reqwest::{header, multipart, Client, Method, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const API_PREFIX: &str = "api/v1";

/// Backend client error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; `message` is the backend `detail` when present.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Body does not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// `api_url` cannot be used as a base URL.
    #[error("Invalid base URL `{0}`")]
    InvalidBaseUrl(String),

    /// Bearer token contains characters not allowed in a header.
    #[error("Invalid API token")]
    InvalidToken,

    /// Upload rejected before it was sent.
    #[error("{0}")]
    InvalidUpload(String),
}

/// Assistant answer for a question about one note.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Language-model provider the backend summarizes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SummaryPlatform {
    #[default]
    Groq,
    OpenRouter,
}

impl SummaryPlatform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenRouter => "openrouter",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "openrouter" => Some(Self::OpenRouter),
            _ => None,
        }
    }
}

/// Summary of an uploaded PDF.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PdfSummary {
    pub summary: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub filename: String,
    /// Characters extracted from the PDF.
    #[serde(default)]
    pub original_text_length: u64,
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub chunks_processed: u32,
}

#[derive(Deserialize)]
struct SummaryEnvelope {
    data: PdfSummary,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// [`CatalogSource`] backed by the platform's REST API.
pub struct HttpCatalog {
    base: Url,
    client: Client,
}

impl HttpCatalog {
    /// Builds a client with bearer auth (when configured) and request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = build_base_url(&config.api_url)?;

        let mut headers = header::HeaderMap::new();
        if let Some(token) = config.api_token.as_deref() {
            let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidToken)?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { base, client })
    }

    /// Base URL every endpoint is resolved against (`{api_url}/api/v1/`).
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Asks the backend assistant a question about one note.
    pub async fn chat_about_note(
        &self,
        note_id: &str,
        message: &str,
    ) -> Result<ChatReply, ApiError> {
        let url = self.endpoint(&["chat", "note", note_id])?;
        let response = self
            .client
            .post(url)
            .json(&ChatRequest { message })
            .send()
            .await?;
        let body = read_json(response).await?;
        serde_json::from_value(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    /// Uploads one PDF as multipart `file` and returns the backend summary.
    ///
    /// Failures carry the backend `detail`, or `Server error (<status>)`.
    pub async fn summarize_pdf(
        &self,
        platform: SummaryPlatform,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<PdfSummary, ApiError> {
        if !filename.trim().to_ascii_lowercase().ends_with(".pdf") {
            return Err(ApiError::InvalidUpload("Please upload a PDF file.".to_string()));
        }
        let url = self.endpoint(&["pdf", "summarize"])?;
        debug!(
            "event=api_request module=source method=POST path={} platform={} size={}",
            url.path(),
            platform.as_str(),
            bytes.len()
        );
        let part = multipart::Part::bytes(bytes)
            .file_name(filename.trim().to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(url)
            .query(&[("platform", platform.as_str())])
            .multipart(form)
            .send()
            .await?;
        let body = read_json_or(response, "Server error").await?;
        let envelope: SummaryEnvelope = serde_json::from_value(body)
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        Ok(envelope.data)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("event=api_request module=source method=GET path={}", url.path());
        let response = self.client.get(url).query(params).send().await?;
        read_json(response).await
    }

    async fn get_list(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<Vec<Value>, ApiError> {
        match self.get(segments, params).await? {
            Value::Array(items) => Ok(items),
            other => Err(ApiError::InvalidResponse(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            ))),
        }
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(
            "event=api_request module=source method={} path={}",
            method,
            url.path()
        );
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        read_json(request.send().await?).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        self.send_json::<()>(Method::DELETE, segments, None).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn list_colleges(&self) -> CatalogResult<Vec<College>> {
        let values = self.get_list(&["admin", "colleges"], &[]).await?;
        Ok(decode_records(values))
    }

    async fn list_programs(&self, query: &ProgramListQuery) -> CatalogResult<Vec<Program>> {
        let mut params = Vec::new();
        if let Some(college_id) = query.college_id.as_deref() {
            params.push(("college_id", college_id.to_string()));
        }
        let values = self.get_list(&["admin", "programs"], &params).await?;
        Ok(decode_records(values))
    }

    async fn list_subjects(&self, query: &SubjectListQuery) -> CatalogResult<Vec<Subject>> {
        let mut params = Vec::new();
        if let Some(program_id) = query.program_id.as_deref() {
            params.push(("program_id", program_id.to_string()));
        }
        if let Some(semester) = query.semester {
            params.push(("semester", semester.to_string()));
        }
        let values = self.get_list(&["admin", "subjects"], &params).await?;
        Ok(decode_records(values))
    }

    async fn list_notes(&self, query: &NoteListQuery) -> CatalogResult<Vec<Note>> {
        let mut params = Vec::new();
        if let Some(subject_id) = query.subject_id.as_deref() {
            params.push(("subject_id", subject_id.to_string()));
        }
        if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
            params.push(("limit", limit.to_string()));
        }
        let values = self.get_list(&["notes", ""], &params).await?;
        Ok(decode_records(values))
    }

    async fn get_note(&self, id: &str) -> CatalogResult<Note> {
        let value = self.get(&["notes", id], &[]).await?;
        decode_record(value)
    }

    async fn delete_note(&self, id: &str) -> CatalogResult<()> {
        Ok(self.delete(&["notes", id]).await?)
    }

    async fn create_college(&self, payload: &NewCollege) -> CatalogResult<College> {
        payload.validate()?;
        let value = self
            .send_json(Method::POST, &["admin", "colleges"], Some(payload))
            .await?;
        decode_record(value)
    }

    async fn delete_college(&self, id: &str) -> CatalogResult<()> {
        Ok(self.delete(&["admin", "colleges", id]).await?)
    }

    async fn create_program(&self, payload: &NewProgram) -> CatalogResult<Program> {
        payload.validate()?;
        let value = self
            .send_json(Method::POST, &["admin", "programs"], Some(payload))
            .await?;
        decode_record(value)
    }

    async fn delete_program(&self, id: &str) -> CatalogResult<()> {
        Ok(self.delete(&["admin", "programs", id]).await?)
    }

    async fn create_subject(&self, payload: &NewSubject) -> CatalogResult<Subject> {
        payload.validate()?;
        let value = self
            .send_json(Method::POST, &["admin", "subjects"], Some(payload))
            .await?;
        decode_record(value)
    }

    async fn delete_subject(&self, id: &str) -> CatalogResult<()> {
        Ok(self.delete(&["admin", "subjects", id]).await?)
    }

    async fn stats(&self) -> CatalogResult<CatalogStats> {
        let value = self.get(&["stats", ""], &[]).await?;
        serde_json::from_value(value)
            .map_err(|err| ApiError::InvalidResponse(err.to_string()).into())
    }
}

fn build_base_url(api_url: &str) -> Result<Url, ApiError> {
    let trimmed = api_url.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{trimmed}/{API_PREFIX}/"))
        .map_err(|_| ApiError::InvalidBaseUrl(api_url.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidBaseUrl(api_url.to_string()));
    }
    Ok(url)
}

async fn read_json(response: Response) -> Result<Value, ApiError> {
    read_json_or(response, "Request failed").await
}

/// `fallback` prefixes the status code when the error body has no `detail`.
async fn read_json_or(response: Response, fallback: &str) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(ErrorBody {
                detail: Some(detail),
            }) => detail,
            _ => format!("{fallback} ({})", status.as_u16()),
        };
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
