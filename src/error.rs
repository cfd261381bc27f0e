//! Error types for submissions, PDF page rendering and knowledge-base lookups.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a submission to the annotation service produced no result.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Error encountered while requesting the server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Response {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Error encountered while receiving the server's answer: response is empty.")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No document was uploaded")]
    MissingUpload,

    /// The upload itself could not be read, e.g. it exceeds the body limit.
    #[error("Upload rejected: {message}")]
    Upload {
        status: axum::http::StatusCode,
        message: String,
    },
}

impl From<axum::extract::multipart::MultipartError> for SubmitError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        SubmitError::Upload {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl SubmitError {
    /// Message shown in the error region. PDF failures carry a hint pointing
    /// at the service logs.
    pub fn user_message(&self, pdf: bool) -> String {
        if pdf {
            format!(
                "{} - The PDF document cannot be annotated. Please check the server logs.",
                self
            )
        } else {
            self.to_string()
        }
    }
}

/// Failure while preparing page canvases from an uploaded PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Cannot parse PDF: {0}")]
    Parse(#[from] lopdf::Error),
}

/// Failure while looking up a concept in the knowledge base.
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("Knowledge base request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Knowledge base returned status {0}")]
    Status(StatusCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_includes_code() {
        let err = SubmitError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "overloaded".to_string(),
        };
        let msg = err.user_message(false);
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded"));
    }

    #[test]
    fn test_pdf_message_has_hint() {
        let msg = SubmitError::EmptyResponse.user_message(true);
        assert!(msg.contains("response is empty"));
        assert!(msg.ends_with("Please check the server logs."));
    }

    #[test]
    fn test_upload_message_keeps_reason() {
        let err = SubmitError::Upload {
            status: axum::http::StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".to_string(),
        };
        assert!(err.user_message(true).starts_with("Upload rejected: length limit exceeded"));
    }
}
