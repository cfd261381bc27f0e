//! Software mention viewer - re-exports for testing and external use.
//!
//! A small web front end for a software-mention annotation service: it
//! forwards text or PDF submissions upstream and renders the returned
//! annotations as highlighted text or as overlays on PDF pages.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub mod client;
pub mod detail;
pub mod error;
pub mod form;
pub mod handlers;
pub mod knowledge_base;
pub mod markup;
pub mod models;
pub mod pdf_view;
pub mod session;
pub mod templates;
pub mod text_view;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_BIND: &str = "127.0.0.1:8070";
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8060/service/";
pub const DEFAULT_PDF_COLUMN_WIDTH: f64 = 900.0;
pub const DEFAULT_RESOURCES_DIR: &str = "resources";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_UPLOAD: usize = 64 * 1024 * 1024;
pub use session::DEFAULT_MAX_SESSIONS;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub service_url: String,
    pub kb_url: Option<String>,
    pub pdf_column_width: f64,
    pub resources_dir: PathBuf,
    pub timeout: Duration,
    /// Largest accepted PDF upload, in bytes.
    pub max_upload: usize,
    pub max_sessions: usize,
}

impl Config {
    /// Read `SOFTCITE_*` variables, falling back to the defaults above.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let default_bind = SocketAddr::from(([127, 0, 0, 1], 8070));
        let bind = parse_or(get("SOFTCITE_BIND"), "SOFTCITE_BIND", default_bind);
        let pdf_column_width = parse_or(
            get("SOFTCITE_PDF_COLUMN_WIDTH"),
            "SOFTCITE_PDF_COLUMN_WIDTH",
            DEFAULT_PDF_COLUMN_WIDTH,
        )
        .max(1.0);
        let timeout_secs = parse_or(
            get("SOFTCITE_TIMEOUT_SECS"),
            "SOFTCITE_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        );
        let max_upload = parse_or(get("SOFTCITE_MAX_UPLOAD"), "SOFTCITE_MAX_UPLOAD", DEFAULT_MAX_UPLOAD);
        let max_sessions = parse_or(
            get("SOFTCITE_MAX_SESSIONS"),
            "SOFTCITE_MAX_SESSIONS",
            DEFAULT_MAX_SESSIONS,
        )
        .max(1);

        Self {
            bind,
            service_url: get("SOFTCITE_SERVICE_URL")
                .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string()),
            kb_url: get("SOFTCITE_KB_URL"),
            pdf_column_width,
            resources_dir: PathBuf::from(
                get("SOFTCITE_RESOURCES_DIR").unwrap_or_else(|| DEFAULT_RESOURCES_DIR.to_string()),
            ),
            timeout: Duration::from_secs(timeout_secs),
            max_upload,
            max_sessions,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid setting, using default");
            default
        }),
        None => default,
    }
}

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub client: AnnotationClient,
    pub kb: Arc<dyn KnowledgeBase>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = AnnotationClient::new(&config.service_url, config.timeout)?;
        let kb: Arc<dyn KnowledgeBase> = match &config.kb_url {
            Some(url) => Arc::new(HttpKnowledgeBase::new(url, config.timeout)?),
            None => Arc::new(NoKnowledgeBase),
        };
        Ok(Self::with_parts(config, client, kb))
    }

    /// Assemble state from prebuilt parts; tests plug in their own knowledge base.
    pub fn with_parts(config: Config, client: AnnotationClient, kb: Arc<dyn KnowledgeBase>) -> Self {
        let sessions = Arc::new(SessionStore::new(config.max_sessions));
        Self {
            config,
            client,
            kb,
            sessions,
        }
    }
}

// Re-export commonly used types
pub use client::AnnotationClient;
pub use error::{KnowledgeBaseError, PdfError, SubmitError};
pub use form::{service_url, FormConfig, ServiceKind};
pub use knowledge_base::{HttpKnowledgeBase, KnowledgeBase, NoKnowledgeBase};
pub use markup::{html_escape, render_markdown, wiki_to_html};
pub use models::{
    BoundingBox, Concept, Entity, Facet, Overlay, PageCanvas, PageInfo, PdfAnnotationResponse,
    Statement, TextAnnotationResponse,
};
pub use pdf_view::{overlay_rect, place_overlays, PageRenderer, RenderHandle};
pub use session::{Session, SessionStore};
pub use text_view::{annotate_text, AnnotatedText};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.kb_url, None);
        assert_eq!(config.pdf_column_width, 900.0);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.max_upload, DEFAULT_MAX_UPLOAD);
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
    }

    #[test]
    fn test_config_overrides_and_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("SOFTCITE_BIND", "0.0.0.0:9000"),
            ("SOFTCITE_KB_URL", "http://kb:8090/service"),
            ("SOFTCITE_PDF_COLUMN_WIDTH", "wide"),
            ("SOFTCITE_TIMEOUT_SECS", " 30 "),
            ("SOFTCITE_SERVICE_URL", ""),
            ("SOFTCITE_MAX_UPLOAD", "10485760"),
            ("SOFTCITE_MAX_SESSIONS", "0"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.kb_url.as_deref(), Some("http://kb:8090/service"));
        assert_eq!(config.pdf_column_width, DEFAULT_PDF_COLUMN_WIDTH);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.max_upload, 10 * 1024 * 1024);
        assert_eq!(config.max_sessions, 1);
    }
}
