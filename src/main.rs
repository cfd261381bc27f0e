//! Software mention viewer - web front end for a software-mention
//! annotation service.
//!
//! The application is organized into the following modules:
//!
//! - `models`: Service responses, entities, page geometry and concepts
//! - `form`: Endpoint URLs and the input mode of the submission form
//! - `client`: Requests to the annotation service
//! - `text_view` / `pdf_view`: Highlighting text and placing PDF overlays
//! - `detail`: The annotation detail panel and knowledge-base lookups
//! - `session`: Per-submission state
//! - `templates`: HTML/CSS/JS templates and rendering
//! - `handlers`: HTTP route handlers

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use softcite_viewer::{handlers, AppState, Config};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,softcite_viewer=debug")),
        )
        .init();

    let config = Config::from_env();
    let state = match AppState::new(config.clone()) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(error = %e, "cannot build HTTP client");
            std::process::exit(1);
        }
    };

    let app = handlers::router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(bind = %config.bind, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("Viewer running at http://{}", config.bind);
    tracing::info!(service = %config.service_url, "annotation service");
    match &config.kb_url {
        Some(url) => tracing::info!(%url, "knowledge base lookups enabled"),
        None => tracing::info!("knowledge base lookups disabled (set SOFTCITE_KB_URL to enable)"),
    }

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
    }
}
