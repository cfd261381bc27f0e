//! Service selection: endpoint URL derivation and input-mode configuration
//! of the submission form.

use serde::Serialize;
use url::Url;

pub const TEXT_SUFFIX: &str = "processSoftwareText";
pub const PDF_SUFFIX: &str = "annotateSoftwarePDF";
pub const IS_ALIVE_SUFFIX: &str = "isalive";

const INDEX_PAGE: &str = "index.html";

// ============================================================================
// URL Builder
// ============================================================================

/// Derive an endpoint URL from a page location: a trailing `index.html` is
/// replaced by `suffix`, otherwise `suffix` is appended as a new path segment.
pub fn service_url(location: &str, suffix: &str) -> String {
    match Url::parse(location) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            let path = url.path().to_string();
            let new_path = join_suffix(&path, suffix);
            url.set_path(&new_path);
            url.to_string()
        }
        Err(_) => {
            let base = location
                .split(|c| c == '?' || c == '#')
                .next()
                .unwrap_or(location);
            join_suffix(base, suffix)
        }
    }
}

fn join_suffix(path: &str, suffix: &str) -> String {
    if let Some(prefix) = path.strip_suffix(INDEX_PAGE) {
        format!("{}{}", prefix, suffix)
    } else if path.ends_with('/') {
        format!("{}{}", path, suffix)
    } else {
        format!("{}/{}", path, suffix)
    }
}

// ============================================================================
// View-Mode Controller
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceKind {
    #[serde(rename = "processSoftwareText")]
    ProcessSoftwareText,
    #[serde(rename = "annotateSoftwarePDF")]
    AnnotateSoftwarePdf,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 2] = [
        ServiceKind::ProcessSoftwareText,
        ServiceKind::AnnotateSoftwarePdf,
    ];

    pub fn path_suffix(self) -> &'static str {
        match self {
            ServiceKind::ProcessSoftwareText => TEXT_SUFFIX,
            ServiceKind::AnnotateSoftwarePdf => PDF_SUFFIX,
        }
    }

    pub fn from_path_suffix(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.path_suffix() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::ProcessSoftwareText => "Process text",
            ServiceKind::AnnotateSoftwarePdf => "Annotate PDF",
        }
    }
}

/// How the submission form must be set up for one service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormConfig {
    pub service: ServiceKind,
    pub action: String,
    pub method: &'static str,
    pub enctype: Option<&'static str>,
    pub text_input_visible: bool,
    pub file_input_visible: bool,
}

impl FormConfig {
    pub fn for_service(service: ServiceKind, location: &str) -> Self {
        let action = service_url(location, service.path_suffix());
        match service {
            ServiceKind::ProcessSoftwareText => Self {
                service,
                action,
                method: "get",
                enctype: None,
                text_input_visible: true,
                file_input_visible: false,
            },
            ServiceKind::AnnotateSoftwarePdf => Self {
                service,
                action,
                method: "post",
                enctype: Some("multipart/form-data"),
                text_input_visible: false,
                file_input_visible: true,
            },
        }
    }

    /// Configurations for every service, keyed by selector value, for the
    /// client-side selector handler.
    pub fn all_as_json(location: &str) -> String {
        let map: serde_json::Map<String, serde_json::Value> = ServiceKind::ALL
            .into_iter()
            .filter_map(|kind| {
                serde_json::to_value(Self::for_service(kind, location))
                    .ok()
                    .map(|v| (kind.path_suffix().to_string(), v))
            })
            .collect();
        serde_json::Value::Object(map).to_string()
    }
}
