//! HTTP client for the upstream software-mention annotation service.

use crate::error::SubmitError;
use crate::form::{service_url, IS_ALIVE_SUFFIX, PDF_SUFFIX, TEXT_SUFFIX};
use crate::models::{PdfAnnotationResponse, TextAnnotationResponse};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Status checks run on every page load and must not hold it up.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct AnnotationClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnnotationClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("softcite-viewer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn endpoint(&self, suffix: &str) -> String {
        service_url(&self.base_url, suffix)
    }

    /// Annotate raw text. Returns the response body as received so the
    /// caller can display it verbatim next to the rendered annotations.
    pub async fn annotate_text(&self, text: &str, disambiguate: bool) -> Result<String, SubmitError> {
        let url = self.endpoint(TEXT_SUFFIX);
        tracing::debug!(%url, chars = text.chars().count(), "submitting text");

        let response = self
            .http
            .get(&url)
            .query(&[("text", text), ("disambiguate", flag(disambiguate))])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_status(status, body).and_then(check_body)
    }

    /// Annotate a PDF document. Returns the raw body and its parsed form.
    pub async fn annotate_pdf(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        disambiguate: bool,
    ) -> Result<(String, PdfAnnotationResponse), SubmitError> {
        let url = self.endpoint(PDF_SUFFIX);
        tracing::debug!(%url, bytes = bytes.len(), file_name, "submitting document");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new()
            .part("input", part)
            .text("disambiguate", flag(disambiguate));

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let body = check_status(status, body).and_then(check_body)?;
        let parsed = parse_pdf_response(&body)?;
        Ok((body, parsed))
    }

    /// Ask the service whether it is up. Returns the service's own answer.
    pub async fn is_alive(&self) -> Result<String, SubmitError> {
        let response = self
            .http
            .get(self.endpoint(IS_ALIVE_SUFFIX))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        check_status(status, body)
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn check_status(status: reqwest::StatusCode, body: String) -> Result<String, SubmitError> {
    if status.is_success() {
        Ok(body)
    } else {
        tracing::warn!(%status, "annotation service returned an error");
        Err(SubmitError::Status { status, body })
    }
}

/// Reject empty or `null` bodies before any parsing happens.
pub fn check_body(body: String) -> Result<String, SubmitError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        Err(SubmitError::EmptyResponse)
    } else {
        Ok(body)
    }
}

pub fn parse_text_response(body: &str) -> Result<TextAnnotationResponse, SubmitError> {
    Ok(serde_json::from_str(body)?)
}

pub fn parse_pdf_response(body: &str) -> Result<PdfAnnotationResponse, SubmitError> {
    Ok(serde_json::from_str(body)?)
}
