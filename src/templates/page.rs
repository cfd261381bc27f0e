//! Full demo page: About, Demo and Doc sections around the form.

use crate::form::{FormConfig, ServiceKind};
use crate::markup::{html_escape, render_markdown};

use super::components::{base_html, info_html, nav_bar, render_form, Info, Section};

const ABOUT_HTML: &str = r#"<h1>Software mention recognition</h1>
<p>This demo sends text or a PDF document to the software mention annotation
service and shows what it found: software names together with their version
numbers, release dates, URLs and creators.</p>
<p>Hover or click a highlighted mention to see its details. When
disambiguation is enabled, mentions linked to Wikipedia and Wikidata show the
knowledge base definition and statements.</p>"#;

const DOC_MARKDOWN: &str = r#"
## REST API

The viewer forwards to the annotation service below its base URL.

| Service | Method | Parameters |
|---|---|---|
| `processSoftwareText` | GET, POST | `text`, `disambiguate` (0 or 1) |
| `annotateSoftwarePDF` | POST multipart | `input` (PDF file), `disambiguate` |
| `isalive` | GET | none |

### Text

```
curl -G --data-urlencode "text=We used SPSS 22." \
     http://localhost:8060/service/processSoftwareText
```

Offsets in the response are UTF-16 code units into the submitted text.

### PDF

```
curl --form input=@article.pdf --form disambiguate=1 \
     http://localhost:8060/service/annotateSoftwarePDF
```

Each mention carries bounding boxes `{p, x, y, w, h}` in PDF points, and the
response lists the size of every page so boxes can be scaled onto the
rendered page.
"#;

/// Everything that varies between renders of the demo page.
pub struct PageView<'a> {
    pub location: &'a str,
    pub selected: ServiceKind,
    pub text: &'a str,
    pub info: Option<Info>,
    pub result: Option<String>,
    pub service_status: Option<String>,
}

impl<'a> PageView<'a> {
    pub fn new(location: &'a str, selected: ServiceKind) -> Self {
        Self {
            location,
            selected,
            text: "",
            info: None,
            result: None,
            service_status: None,
        }
    }
}

pub fn render_page(view: &PageView) -> String {
    let nav = nav_bar(Section::Demo, view.service_status.as_deref());

    let section = |s: Section, body: &str| {
        let class = if s == Section::Demo { "section active" } else { "section" };
        format!(r#"<div id="div-{}" class="{}">{}</div>"#, s.id(), class, body)
    };

    let demo = format!(
        "{}{}{}",
        render_form(view.location, view.selected, view.text),
        info_html(view.info.as_ref()),
        view.result.as_deref().unwrap_or(r#"<div id="requestResult"></div>"#),
    );

    let content = [
        section(Section::About, ABOUT_HTML),
        section(Section::Demo, &demo),
        section(
            Section::Doc,
            &format!(r#"<div class="doc-section">{}</div>"#, render_markdown(DOC_MARKDOWN)),
        ),
    ]
    .concat();

    base_html(
        "Software mentions",
        &nav,
        &content,
        &FormConfig::all_as_json(view.location),
    )
}

/// Header line above a result, naming when it was produced.
pub fn result_header(generation: u64, created: chrono::DateTime<chrono::Utc>, summary: &str) -> String {
    format!(
        r#"<p class="result-header">#{} at {}: {}</p>"#,
        generation,
        created.format("%Y-%m-%d %H:%M:%S UTC"),
        html_escape(summary)
    )
}
