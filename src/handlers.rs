//! HTTP route handlers for the web application.
//!
//! The demo page, the two submission routes that forward to the annotation
//! service, and the small endpoints the page script calls back into.

use crate::client::parse_text_response;
use crate::detail::{render_detail, resolve_concepts};
use crate::error::SubmitError;
use crate::form::ServiceKind;
use crate::pdf_view::{place_overlays, PageRenderer};
use crate::session::Session;
use crate::templates::{
    render_page, render_pdf_result, render_text_result, result_header, Info, PageView,
};
use crate::text_view::annotate_text;
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{
        header::{CONTENT_TYPE, HOST, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::CookieJar;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::services::ServeDir;

const FALLBACK_FILE_NAME: &str = "document.pdf";

/// Identifies a browser so its submissions replace only its own session.
pub const CLIENT_COOKIE: &str = "softcite_client";
const CLIENT_COOKIE_MAX_AGE: u64 = 30 * 24 * 3600;
const CLIENT_ID_LEN: usize = 16;

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    let max_upload = state.config.max_upload;
    let resources = ServeDir::new(&state.config.resources_dir);

    Router::new()
        // Page routes
        .route("/", get(index))
        .route("/index.html", get(index))
        // Annotation routes
        .route("/processSoftwareText", get(process_text).post(process_text_form))
        .route(
            "/annotateSoftwarePDF",
            post(annotate_pdf).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/isalive", get(is_alive))
        // Callbacks from the page script
        .route("/document/{generation}", get(document))
        .route("/api/annotation/{generation}/{index}", get(annotation_detail))
        .nest_service("/resources", resources)
        .with_state(state)
}

/// Where the browser loaded the page from, used to derive form actions.
fn page_location(headers: &HeaderMap, state: &AppState) -> String {
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| state.config.bind.to_string());
    format!("http://{}/index.html", host)
}

fn flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1" | "true" | "on"))
}

fn error_status(error: &SubmitError) -> StatusCode {
    match error {
        SubmitError::MissingUpload => StatusCode::BAD_REQUEST,
        SubmitError::Upload { status, .. } => *status,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn valid_client_id(value: &str) -> bool {
    value.len() == CLIENT_ID_LEN && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// The browser's id from its cookie, or a fresh id together with the
/// header that hands it out.
fn client_id(jar: &CookieJar) -> (String, HeaderMap) {
    let mut headers = HeaderMap::new();
    if let Some(id) = jar
        .get(CLIENT_COOKIE)
        .map(|c| c.value())
        .filter(|v| valid_client_id(v))
    {
        return (id.to_string(), headers);
    }

    let id: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(CLIENT_ID_LEN)
        .map(char::from)
        .collect();
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        CLIENT_COOKIE, id, CLIENT_COOKIE_MAX_AGE
    );
    if let Ok(value) = cookie.parse() {
        headers.insert(SET_COOKIE, value);
    }
    (id, headers)
}

/// Short status line for the navigation bar.
async fn service_status(state: &AppState) -> String {
    match state.client.is_alive().await {
        Ok(answer) if answer.trim() == "true" => "service up".to_string(),
        Ok(answer) => format!("service: {}", answer.trim()),
        Err(e) => {
            tracing::debug!(error = %e, "status check failed");
            "service unreachable".to_string()
        }
    }
}

fn mention_summary(count: usize) -> String {
    match count {
        0 => "no software mention found".to_string(),
        1 => "1 software mention".to_string(),
        n => format!("{} software mentions", n),
    }
}

// ============================================================================
// Index Handler
// ============================================================================

#[derive(Deserialize, Default)]
pub struct IndexQuery {
    pub service: Option<String>,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<IndexQuery>,
) -> Html<String> {
    let location = page_location(&headers, &state);
    let selected = query
        .service
        .as_deref()
        .and_then(ServiceKind::from_path_suffix)
        .unwrap_or(ServiceKind::ProcessSoftwareText);
    let mut view = PageView::new(&location, selected);
    view.service_status = Some(service_status(&state).await);
    Html(render_page(&view))
}

// ============================================================================
// Text Annotation
// ============================================================================

#[derive(Deserialize, Default)]
pub struct TextQuery {
    pub text: Option<String>,
    pub disambiguate: Option<String>,
}

pub async fn process_text(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(query): Query<TextQuery>,
) -> Response {
    let (client, cookie) = client_id(&jar);
    (cookie, annotate_text_request(&state, &client, &headers, query).await).into_response()
}

pub async fn process_text_form(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    axum::Form(form): axum::Form<TextQuery>,
) -> Response {
    let (client, cookie) = client_id(&jar);
    (cookie, annotate_text_request(&state, &client, &headers, form).await).into_response()
}

async fn annotate_text_request(
    state: &AppState,
    client: &str,
    headers: &HeaderMap,
    query: TextQuery,
) -> Response {
    let location = page_location(headers, state);
    let text = query.text.unwrap_or_default();
    let mut view = PageView::new(&location, ServiceKind::ProcessSoftwareText);
    view.text = &text;

    if text.trim().is_empty() {
        view.info = Some(Info::Message("Enter some text to annotate.".to_string()));
        return Html(render_page(&view)).into_response();
    }

    let session = state.sessions.begin(client, ServiceKind::ProcessSoftwareText).await;

    let result = async {
        let body = state
            .client
            .annotate_text(&text, flag(query.disambiguate.as_deref()))
            .await?;
        let parsed = parse_text_response(&body)?;
        Ok::<_, SubmitError>((body, parsed))
    }
    .await;

    let (body, response) = match result {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(generation = session.generation, error = %e, "text annotation failed");
            view.info = Some(Info::Error(e.user_message(false)));
            return (error_status(&e), Html(render_page(&view))).into_response();
        }
    };

    let entities = response.entities.unwrap_or_default();
    let annotated = annotate_text(&text, &entities);
    let count = entities.len();
    tracing::info!(
        generation = session.generation,
        mentions = count,
        highlighted = annotated.highlighted.len(),
        runtime_ms = response.runtime,
        "text annotated"
    );

    if !state.sessions.install_entities(session.generation, entities).await {
        view.info = Some(Info::Message(
            "A newer submission replaced this one; details are no longer available.".to_string(),
        ));
    }

    view.result = Some(format!(
        "{}{}",
        result_header(session.generation, session.created, &mention_summary(count)),
        render_text_result(session.generation, &annotated, &body)
    ));
    Html(render_page(&view)).into_response()
}

// ============================================================================
// PDF Annotation
// ============================================================================

struct Upload {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
    disambiguate: bool,
}

fn looks_like_pdf(upload: &Upload) -> bool {
    upload.content_type.as_deref() == Some("application/pdf")
        || upload.file_name.ends_with(".pdf")
        || upload.file_name.ends_with(".PDF")
}

fn log_upload_error(e: &axum::extract::multipart::MultipartError) {
    tracing::warn!(status = %e.status(), error = %e.body_text(), "failed to read upload");
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, SubmitError> {
    let mut upload = Upload {
        file_name: FALLBACK_FILE_NAME.to_string(),
        content_type: None,
        bytes: Vec::new(),
        disambiguate: false,
    };

    while let Some(field) = multipart.next_field().await.inspect_err(log_upload_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("input") => {
                if let Some(name) = field.file_name().filter(|n| !n.is_empty()) {
                    upload.file_name = name.to_string();
                }
                upload.content_type = field.content_type().map(str::to_string);
                upload.bytes = field.bytes().await.inspect_err(log_upload_error)?.to_vec();
            }
            Some("disambiguate") => {
                let value = field.text().await.inspect_err(log_upload_error)?;
                upload.disambiguate = flag(Some(&value));
            }
            _ => {}
        }
    }

    if upload.bytes.is_empty() {
        return Err(SubmitError::MissingUpload);
    }
    Ok(upload)
}

pub async fn annotate_pdf(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (client, cookie) = client_id(&jar);
    (cookie, annotate_pdf_request(&state, &client, &headers, multipart).await).into_response()
}

async fn annotate_pdf_request(
    state: &AppState,
    client: &str,
    headers: &HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let location = page_location(headers, state);
    let mut view = PageView::new(&location, ServiceKind::AnnotateSoftwarePdf);

    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            view.info = Some(Info::Error(e.user_message(true)));
            return (error_status(&e), Html(render_page(&view))).into_response();
        }
    };
    if !looks_like_pdf(&upload) {
        view.info = Some(Info::Message(format!(
            "{} is not a PDF document.",
            upload.file_name
        )));
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, Html(render_page(&view))).into_response();
    }

    let session = state.sessions.begin(client, ServiceKind::AnnotateSoftwarePdf).await;
    let bytes = Arc::new(upload.bytes);
    state.sessions.set_document(session.generation, bytes.clone()).await;

    // Pages are measured while the service works on the document.
    let pages = PageRenderer::spawn(bytes.clone(), state.config.pdf_column_width);

    let (body, response) = match state
        .client
        .annotate_pdf(bytes.to_vec(), &upload.file_name, upload.disambiguate)
        .await
    {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(generation = session.generation, error = %e, "PDF annotation failed");
            view.info = Some(Info::Error(e.user_message(true)));
            return (error_status(&e), Html(render_page(&view))).into_response();
        }
    };

    let entities = response.entities.clone().unwrap_or_default();
    let count = entities.len();
    if !state.sessions.install_entities(session.generation, entities).await {
        view.info = Some(Info::Message(
            "A newer submission replaced this one; details are no longer available.".to_string(),
        ));
    }

    let overlays = place_overlays(&response, &pages).await;
    let mut rendered = pages.finished().await;
    rendered.pages.sort_by_key(|p| p.number);

    if let Some(error) = &rendered.error {
        view.info = Some(Info::Error(format!(
            "{} - The PDF document cannot be displayed.",
            error
        )));
    }

    tracing::info!(
        generation = session.generation,
        file = %upload.file_name,
        mentions = count,
        overlays = overlays.len(),
        pages = rendered.pages.len(),
        runtime_ms = response.runtime,
        "PDF annotated"
    );

    view.result = Some(format!(
        "{}{}",
        result_header(session.generation, session.created, &mention_summary(count)),
        render_pdf_result(session.generation, &rendered.pages, &overlays, &body)
    ));
    Html(render_page(&view)).into_response()
}

// ============================================================================
// Service Status
// ============================================================================

pub async fn is_alive(State(state): State<Arc<AppState>>) -> Response {
    match state.client.is_alive().await {
        Ok(answer) => axum::Json(serde_json::json!({
            "alive": answer.trim() == "true",
            "answer": answer.trim(),
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "annotation service is not reachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(serde_json::json!({
                    "alive": false,
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Session Lookups
// ============================================================================

async fn current_session(state: &AppState, generation: u64) -> Result<Arc<Session>, Response> {
    state.sessions.get(generation).await.ok_or_else(|| {
        tracing::debug!(generation, "request for a superseded submission");
        (
            StatusCode::GONE,
            "This annotation belongs to an earlier submission.",
        )
            .into_response()
    })
}

pub async fn document(
    State(state): State<Arc<AppState>>,
    Path(generation): Path<u64>,
) -> Response {
    let session = match current_session(&state, generation).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    if session.mode != ServiceKind::AnnotateSoftwarePdf {
        return (StatusCode::NOT_FOUND, "Text submissions have no document").into_response();
    }
    match session.document().await {
        Some(bytes) => ([(CONTENT_TYPE, "application/pdf")], bytes.as_ref().clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "No document for this submission").into_response(),
    }
}

#[derive(Deserialize, Default)]
pub struct DetailQuery {
    pub page: Option<u32>,
    pub top: Option<f64>,
}

pub async fn annotation_detail(
    State(state): State<Arc<AppState>>,
    Path((generation, index)): Path<(u64, usize)>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let session = match current_session(&state, generation).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let entities = session.entities_at(index).await;
    if entities.is_empty() {
        return (StatusCode::NOT_FOUND, "Unknown annotation").into_response();
    }

    let concepts = resolve_concepts(&session, state.kb.as_ref(), &entities).await;
    // Text mode panels sit beside the text, PDF panels follow the overlay.
    let top = query.page.filter(|p| *p > 0).and(query.top);
    Html(render_detail(&entities, &concepts, top)).into_response()
}

#[cfg(test)]
#[path = "handlers_test.rs"]
mod handlers_test;
