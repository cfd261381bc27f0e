use super::*;
use crate::knowledge_base::NoKnowledgeBase;
use crate::models::Entity;
use crate::pdf_view::tests::padded_pdf;
use crate::{AnnotationClient, Config};
use axum_extra::extract::cookie::Cookie;
use std::net::SocketAddr;
use std::time::Duration;

const GROBID_TEXT: &str = "GROBID extracts software.";

fn state_for(service_url: &str, max_upload: Option<usize>) -> Arc<AppState> {
    let mut config = Config::default();
    config.service_url = service_url.to_string();
    if let Some(limit) = max_upload {
        config.max_upload = limit;
    }
    let client = AnnotationClient::new(&config.service_url, Duration::from_secs(5))
        .expect("client builds");
    Arc::new(AppState::with_parts(config, client, Arc::new(NoKnowledgeBase)))
}

// Nothing listens on the discard port, so upstream calls fail fast.
fn test_state() -> Arc<AppState> {
    state_for("http://127.0.0.1:9/service/", None)
}

fn host_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(HOST, "viewer.test:8070".parse().unwrap());
    headers
}

fn jar_for(client: &str) -> CookieJar {
    CookieJar::new().add(Cookie::new(CLIENT_COOKIE, client.to_string()))
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn grobid() -> Entity {
    Entity {
        entity_type: "software".to_string(),
        raw_form: Some("GROBID".to_string()),
        offset_start: Some(8),
        offset_end: Some(14),
        ..Default::default()
    }
}

fn generation_of(html: &str) -> u64 {
    let marker = r#"data-generation=""#;
    let start = html.find(marker).unwrap() + marker.len();
    let end = start + html[start..].find('"').unwrap();
    html[start..end].parse().unwrap()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

async fn stub_pdf_annotation(body: axum::body::Bytes) -> axum::Json<serde_json::Value> {
    assert!(!body.is_empty());
    axum::Json(serde_json::json!({
        "pages": [{"page_height": 792.0, "page_width": 612.0}],
        "entities": [{
            "type": "software",
            "software-name": {
                "rawForm": "GROBID",
                "boundingBoxes": [{"p": 1, "x": 72.0, "y": 100.0, "w": 40.0, "h": 10.0}]
            }
        }],
        "runtime": 42
    }))
}

/// Annotation service answering like GROBID on the sample sentence.
async fn stub_service() -> String {
    let app = Router::new()
        .route(
            "/service/processSoftwareText",
            get(|| async {
                axum::Json(serde_json::json!({
                    "entities": [{
                        "type": "software",
                        "rawForm": "GROBID",
                        "offsetStart": 0,
                        "offsetEnd": 6
                    }],
                    "runtime": 7
                }))
            }),
        )
        .route(
            "/service/annotateSoftwarePDF",
            post(stub_pdf_annotation).layer(DefaultBodyLimit::disable()),
        )
        .route("/service/isalive", get(|| async { "true" }));
    format!("http://{}/service/", serve(app).await)
}

async fn overloaded_service() -> String {
    let app = Router::new()
        .fallback(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") });
    format!("http://{}/service/", serve(app).await)
}

fn text_query(text: &str) -> TextQuery {
    TextQuery {
        text: Some(text.to_string()),
        disambiguate: None,
    }
}

#[test]
fn test_flag_values() {
    assert!(flag(Some("1")));
    assert!(flag(Some(" on ")));
    assert!(!flag(Some("0")));
    assert!(!flag(None));
}

#[test]
fn test_pdf_detection() {
    let upload = |name: &str, ct: Option<&str>| Upload {
        file_name: name.to_string(),
        content_type: ct.map(str::to_string),
        bytes: vec![1],
        disambiguate: false,
    };
    assert!(looks_like_pdf(&upload("paper.PDF", None)));
    assert!(looks_like_pdf(&upload("blob", Some("application/pdf"))));
    assert!(!looks_like_pdf(&upload("notes.txt", Some("text/plain"))));
}

#[test]
fn test_client_id_kept_or_issued() {
    let (id, headers) = client_id(&jar_for("aliceAAAAAAAAAAA"));
    assert_eq!(id, "aliceAAAAAAAAAAA");
    assert!(headers.get(SET_COOKIE).is_none());

    for jar in [CookieJar::new(), jar_for("short"), jar_for("bad;value=AAAAA")] {
        let (id, headers) = client_id(&jar);
        assert!(valid_client_id(&id));
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(&format!("{}={};", CLIENT_COOKIE, id)));
        assert!(cookie.contains("HttpOnly"));
    }
}

#[tokio::test]
async fn test_index_points_form_at_host() {
    let Html(html) = index(State(test_state()), host_headers(), Query(IndexQuery::default())).await;
    assert!(html.contains(r#"action="http://viewer.test:8070/processSoftwareText""#));
}

#[tokio::test]
async fn test_index_preselects_requested_service() {
    let query = IndexQuery {
        service: Some("annotateSoftwarePDF".to_string()),
    };
    let Html(html) = index(State(test_state()), host_headers(), Query(query)).await;
    assert!(html.contains(r#"action="http://viewer.test:8070/annotateSoftwarePDF""#));
    assert!(html.contains(r#"enctype="multipart/form-data""#));
}

#[tokio::test]
async fn test_index_shows_service_status() {
    let up = state_for(&stub_service().await, None);
    let Html(html) = index(State(up), host_headers(), Query(IndexQuery::default())).await;
    assert!(html.contains(r#"<span class="service-status">service up</span>"#));

    let Html(html) = index(State(test_state()), host_headers(), Query(IndexQuery::default())).await;
    assert!(html.contains(r#"<span class="service-status">service unreachable</span>"#));
}

#[tokio::test]
async fn test_empty_text_starts_no_session() {
    let state = test_state();
    let response = process_text(
        State(state.clone()),
        CookieJar::new(),
        host_headers(),
        Query(TextQuery::default()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Enter some text"));
    assert_eq!(state.sessions.len().await, 0);
}

#[tokio::test]
async fn test_unreachable_service_keeps_form_usable() {
    let state = test_state();
    let response = process_text(
        State(state),
        CookieJar::new(),
        host_headers(),
        Query(text_query("We used SPSS.")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let html = body_text(response).await;
    assert!(html.contains("Error encountered while requesting the server."));
    assert!(html.contains(r#"id="gbdForm""#));
    assert!(html.contains("We used SPSS.</textarea>"));
}

#[tokio::test]
async fn test_service_error_status_is_reported() {
    let state = state_for(&overloaded_service().await, None);
    let response = process_text(
        State(state),
        CookieJar::new(),
        host_headers(),
        Query(text_query(GROBID_TEXT)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let html = body_text(response).await;
    assert!(html.contains("503"));
    assert!(html.contains("overloaded"));
    assert!(!html.contains(r#"id="requestResult""#));
}

#[tokio::test]
async fn test_text_submission_highlights_and_resolves_detail() {
    let state = state_for(&stub_service().await, None);
    let response = process_text(
        State(state.clone()),
        CookieJar::new(),
        host_headers(),
        Query(text_query(GROBID_TEXT)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_some());
    let html = body_text(response).await;
    assert!(html.contains(
        r#"<p><span id="annot-0" rel="popover" data-color="software"><span class="label software" style="cursor:hand;cursor:pointer;">GROBID</span></span> extracts software.</p>"#
    ));
    assert!(html.contains("1 software mention"));

    let detail = annotation_detail(
        State(state),
        Path((generation_of(&html), 0)),
        Query(DetailQuery::default()),
    )
    .await;
    assert_eq!(detail.status(), StatusCode::OK);
    assert!(body_text(detail).await.contains("Raw name: <b>GROBID</b>"));
}

#[tokio::test]
async fn test_interleaved_clients_keep_their_details() {
    let state = state_for(&stub_service().await, None);
    let submit = |client: &'static str| {
        let state = state.clone();
        async move {
            let response = process_text(
                State(state),
                jar_for(client),
                host_headers(),
                Query(text_query(GROBID_TEXT)),
            )
            .await;
            generation_of(&body_text(response).await)
        }
    };

    let alice = submit("aliceAAAAAAAAAAA").await;
    let bob = submit("bobBBBBBBBBBBBBB").await;
    assert_ne!(alice, bob);

    for generation in [alice, bob] {
        let detail = annotation_detail(
            State(state.clone()),
            Path((generation, 0)),
            Query(DetailQuery::default()),
        )
        .await;
        assert_eq!(detail.status(), StatusCode::OK);
    }

    // Only alice's own resubmission retires her earlier result.
    let alice_again = submit("aliceAAAAAAAAAAA").await;
    let gone = annotation_detail(
        State(state.clone()),
        Path((alice, 0)),
        Query(DetailQuery::default()),
    )
    .await;
    assert_eq!(gone.status(), StatusCode::GONE);
    for generation in [alice_again, bob] {
        assert!(state.sessions.get(generation).await.is_some());
    }
}

#[tokio::test]
async fn test_large_pdf_annotated_through_router() {
    let state = state_for(&stub_service().await, None);
    let viewer = serve(router(state)).await;
    let pdf = padded_pdf(3 * 1024 * 1024);
    assert!(pdf.len() > 3 * 1024 * 1024);

    let form = reqwest::multipart::Form::new()
        .part(
            "input",
            reqwest::multipart::Part::bytes(pdf.clone())
                .file_name("paper.pdf")
                .mime_str("application/pdf")
                .unwrap(),
        )
        .text("disambiguate", "1");
    let http = reqwest::Client::new();
    let response = http
        .post(format!("http://{}/annotateSoftwarePDF", viewer))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().get("set-cookie").is_some());
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"<canvas data-page="1""#));
    assert!(html.contains(r#"<div class="textLayer" data-page="1"></div>"#));
    assert!(html.contains(r#"id="annot-0-0""#));
    assert!(!html.contains("cannot be displayed"));

    let document = http
        .get(format!("http://{}/document/{}", viewer, generation_of(&html)))
        .send()
        .await
        .unwrap();
    assert_eq!(document.status().as_u16(), 200);
    assert_eq!(document.bytes().await.unwrap().len(), pdf.len());
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let state = state_for(&stub_service().await, Some(1024));
    let viewer = serve(router(state.clone())).await;

    let form = reqwest::multipart::Form::new().part(
        "input",
        reqwest::multipart::Part::bytes(padded_pdf(4096))
            .file_name("paper.pdf")
            .mime_str("application/pdf")
            .unwrap(),
    );
    let response = reqwest::Client::new()
        .post(format!("http://{}/annotateSoftwarePDF", viewer))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 413);
    let html = response.text().await.unwrap();
    assert!(html.contains("Upload rejected"));
    assert!(html.contains(r#"id="gbdForm""#));
    assert_eq!(state.sessions.len().await, 0);
}

#[tokio::test]
async fn test_detail_for_current_submission() {
    let state = test_state();
    let session = state.sessions.begin("reader", ServiceKind::ProcessSoftwareText).await;
    assert!(state.sessions.install_entities(session.generation, vec![grobid()]).await);

    let response = annotation_detail(
        State(state.clone()),
        Path((session.generation, 0)),
        Query(DetailQuery::default()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("GROBID"));

    let missing = annotation_detail(
        State(state),
        Path((session.generation, 7)),
        Query(DetailQuery::default()),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_detail_for_superseded_submission_is_gone() {
    let state = test_state();
    let old = state.sessions.begin("reader", ServiceKind::ProcessSoftwareText).await;
    state.sessions.install_entities(old.generation, vec![grobid()]).await;
    state.sessions.begin("reader", ServiceKind::AnnotateSoftwarePdf).await;

    let response = annotation_detail(
        State(state),
        Path((old.generation, 0)),
        Query(DetailQuery::default()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::GONE);
}

#[tokio::test]
async fn test_document_served_as_pdf() {
    let state = test_state();
    let session = state.sessions.begin("reader", ServiceKind::AnnotateSoftwarePdf).await;
    let bytes = Arc::new(b"%PDF-1.4 test".to_vec());
    state.sessions.set_document(session.generation, bytes).await;

    let response = document(State(state.clone()), Path(session.generation)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(body_text(response).await, "%PDF-1.4 test");

    let stale = document(State(state), Path(session.generation + 1)).await;
    assert_eq!(stale.status(), StatusCode::GONE);
}

#[tokio::test]
async fn test_text_submission_has_no_document() {
    let state = test_state();
    let session = state.sessions.begin("reader", ServiceKind::ProcessSoftwareText).await;
    let response = document(State(state), Path(session.generation)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
