//! Shared HTML components for the annotation viewer.
//!
//! Contains the navigation bar, the submission form, the status line and
//! the base HTML template with the client-side glue script.

use crate::form::{FormConfig, ServiceKind};
use crate::markup::{html_escape, js_string};

use super::styles::STYLE;

// ============================================================================
// Navigation Bar
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    About,
    Demo,
    Doc,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::About, Section::Demo, Section::Doc];

    pub fn id(self) -> &'static str {
        match self {
            Section::About => "about",
            Section::Demo => "demo",
            Section::Doc => "doc",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Section::About => "About",
            Section::Demo => "Demo",
            Section::Doc => "Doc",
        }
    }
}

pub fn nav_bar(active: Section, service_status: Option<&str>) -> String {
    let links: String = Section::ALL
        .into_iter()
        .map(|s| {
            let class = if s == active {
                "section-active"
            } else {
                "section-not-active"
            };
            format!(
                r##"<a href="#{id}" id="nav-{id}" class="{class}" onclick="return showSection('{id}')">{label}</a>"##,
                id = s.id(),
                class = class,
                label = s.label()
            )
        })
        .collect();

    let status = service_status
        .map(|s| format!(r#"<span class="service-status">{}</span>"#, html_escape(s)))
        .unwrap_or_default();

    format!(
        r#"<nav class="nav-bar">
            <strong>Software mentions</strong>
            {links}
            <span class="spacer"></span>
            {status}
        </nav>"#
    )
}

// ============================================================================
// Submission Form
// ============================================================================

/// Example texts offered under the text box.
pub const EXAMPLES: &[&str] = &[
    "The statistical analysis was performed using SPSS version 22 (IBM Corp., Armonk, NY).",
    "Images were processed with ImageJ 1.48v (http://imagej.nih.gov/ij/) and quantified in R 3.2.1.",
    "Sequence alignments were built with ClustalW and phylogenetic trees were inferred with MEGA6.",
    "We used GROBID to extract the bibliographical references from the PDF documents.",
];

pub fn render_form(location: &str, selected: ServiceKind, text: &str) -> String {
    let config = FormConfig::for_service(selected, location);

    let options: String = ServiceKind::ALL
        .into_iter()
        .map(|kind| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                kind.path_suffix(),
                if kind == selected { " selected" } else { "" },
                kind.label()
            )
        })
        .collect();

    let examples: String = (0..EXAMPLES.len())
        .map(|i| format!(r##"<a href="#" id="example{i}" onclick="return useExample({i})">example {n}</a>"##, n = i + 1))
        .collect();

    let enctype = config
        .enctype
        .map(|e| format!(r#" enctype="{}""#, e))
        .unwrap_or_default();

    format!(
        r#"<form id="gbdForm" action="{action}" method="{method}"{enctype} onsubmit="return showRequesting()">
            <div class="form-row">
                <label for="selectedService">Service</label>
                <select id="selectedService" name="service" onchange="processChange()">{options}</select>
                <label><input type="checkbox" name="disambiguate" value="1"> disambiguate</label>
            </div>
            <div id="textInputDiv" class="{text_class}">
                <textarea id="inputTextArea" name="text" placeholder="Paste text to annotate">{text}</textarea>
                <div class="examples">Examples: {examples}</div>
            </div>
            <div id="fileInputDiv" class="{file_class}">
                <input type="file" id="input" name="input" accept="application/pdf,.pdf,.PDF">
            </div>
            <div class="form-row">
                <button type="submit" id="submitRequest" class="btn">Submit</button>
            </div>
        </form>"#,
        action = html_escape(&config.action),
        method = config.method,
        enctype = enctype,
        options = options,
        text_class = if config.text_input_visible { "" } else { "hidden" },
        file_class = if config.file_input_visible { "" } else { "hidden" },
        text = html_escape(text),
        examples = examples,
    )
}

// ============================================================================
// Status Line
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Info {
    Message(String),
    Error(String),
}

pub fn info_html(info: Option<&Info>) -> String {
    let inner = match info {
        Some(Info::Message(m)) => format!(r#"<span class="info">{}</span>"#, html_escape(m)),
        Some(Info::Error(e)) => format!(
            r#"<span class="error">Error encountered while requesting the server.<br/>{}</span>"#,
            html_escape(e)
        ),
        None => String::new(),
    };
    format!(r#"<div id="infoResult">{}</div>"#, inner)
}

// ============================================================================
// Base HTML Template
// ============================================================================

pub fn base_html(title: &str, nav: &str, content: &str, form_configs_json: &str) -> String {
    let examples_json =
        serde_json::to_string(EXAMPLES).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="container">
        {content}
    </div>
    <script>
    const FORM_CONFIGS = JSON.parse({configs});
    const EXAMPLES = {examples};

    function showSection(id) {{
        document.querySelectorAll('.section').forEach(s => s.classList.toggle('active', s.id === 'div-' + id));
        document.querySelectorAll('.nav-bar a[id^="nav-"]').forEach(a => {{
            a.className = a.id === 'nav-' + id ? 'section-active' : 'section-not-active';
        }});
        return false;
    }}

    // Keep exactly one input mode visible and the form pointed at the
    // selected service.
    function processChange() {{
        const selected = document.getElementById('selectedService').value;
        const cfg = FORM_CONFIGS[selected];
        if (!cfg) return;
        const form = document.getElementById('gbdForm');
        form.setAttribute('action', cfg.action);
        form.setAttribute('method', cfg.method);
        if (cfg.enctype) {{
            form.setAttribute('enctype', cfg.enctype);
        }} else {{
            form.removeAttribute('enctype');
        }}
        document.getElementById('textInputDiv').classList.toggle('hidden', !cfg.text_input_visible);
        document.getElementById('fileInputDiv').classList.toggle('hidden', !cfg.file_input_visible);
    }}

    function useExample(i) {{
        document.getElementById('inputTextArea').value = EXAMPLES[i] || '';
        return false;
    }}

    function showRequesting() {{
        document.getElementById('infoResult').innerHTML = '<span class="requesting">Requesting server...</span>';
        const result = document.getElementById('requestResult');
        if (result) result.innerHTML = '';
        return true;
    }}

    function showTab(id) {{
        document.querySelectorAll('.tab-pane').forEach(p => p.classList.toggle('active', p.id === id));
        document.querySelectorAll('.tab-bar li').forEach(li => {{
            li.classList.toggle('active', li.dataset.tab === id);
        }});
        return false;
    }}

    // Resolve a highlight back to its entity and fill the matching panel.
    async function viewEntity(event) {{
        const el = event.currentTarget;
        const result = document.getElementById('requestResult');
        if (!result || !result.dataset.generation) return;
        const index = el.id.split('-')[1];
        const page = el.dataset.page || '0';
        const params = new URLSearchParams({{ page: page }});
        if (el.dataset.page) params.set('top', el.offsetTop);
        const panel = document.getElementById('detailed_annot-' + page);
        if (!panel) return;
        try {{
            const response = await fetch('/api/annotation/' + result.dataset.generation + '/' + index + '?' + params);
            if (!response.ok) return;
            panel.innerHTML = await response.text();
            panel.classList.remove('hidden');
        }} catch (e) {{
            console.error('Failed to load annotation details:', e);
        }}
    }}

    function bindAnnotations() {{
        document.querySelectorAll('#requestResult [id^="annot-"]').forEach(el => {{
            el.addEventListener('mouseenter', viewEntity);
            el.addEventListener('click', viewEntity);
        }});
    }}

    document.addEventListener('DOMContentLoaded', bindAnnotations);
    </script>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav,
        content = content,
        configs = js_string(form_configs_json),
        examples = examples_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_form_shows_textbox_only() {
        let html = render_form("http://h/index.html", ServiceKind::ProcessSoftwareText, "a < b");
        assert!(html.contains(r#"action="http://h/processSoftwareText""#));
        assert!(html.contains(r#"method="get""#));
        assert!(!html.contains("enctype"));
        assert!(html.contains(r#"<div id="textInputDiv" class="">"#));
        assert!(html.contains(r#"<div id="fileInputDiv" class="hidden">"#));
        assert!(html.contains("a &lt; b</textarea>"));
    }

    #[test]
    fn test_pdf_form_is_multipart() {
        let html = render_form("http://h/index.html", ServiceKind::AnnotateSoftwarePdf, "");
        assert!(html.contains(r#"action="http://h/annotateSoftwarePDF""#));
        assert!(html.contains(r#"method="post" enctype="multipart/form-data""#));
        assert!(html.contains(r#"<div id="textInputDiv" class="hidden">"#));
        assert!(html.contains(r#"<option value="annotateSoftwarePDF" selected>"#));
    }

    #[test]
    fn test_error_info_is_escaped() {
        let html = info_html(Some(&Info::Error("<html>boom</html>".to_string())));
        assert!(html.contains("&lt;html&gt;boom"));
        assert!(html.contains("class=\"error\""));
        assert_eq!(info_html(None), r#"<div id="infoResult"></div>"#);
    }

    #[test]
    fn test_nav_marks_active_section() {
        let html = nav_bar(Section::Demo, Some("service up"));
        assert!(html.contains(r#"id="nav-demo" class="section-active""#));
        assert!(html.contains(r#"id="nav-about" class="section-not-active""#));
        assert!(html.contains("service up"));
    }

    #[test]
    fn test_base_html_embeds_configs() {
        let json = FormConfig::all_as_json("http://h/index.html");
        let html = base_html("Demo", "", "<p>x</p>", &json);
        assert!(html.contains("const FORM_CONFIGS = JSON.parse("));
        assert!(html.contains("<p>x</p>"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
