//! Result regions for text and PDF submissions.

use crate::markup::{html_escape, js_string, pretty_json};
use crate::models::{Overlay, PageCanvas};
use crate::text_view::AnnotatedText;

const PDFJS_VERSION: &str = "3.11.174";

fn tabs(annotations: &str, raw_json: &str) -> String {
    format!(
        r##"<div class="note-tabs">
            <ul id="resultTab" class="tab-bar">
                <li class="active" data-tab="navbar-fixed-annotation"><a href="#navbar-fixed-annotation" onclick="return showTab('navbar-fixed-annotation')">Annotations</a></li>
                <li data-tab="navbar-fixed-json"><a href="#navbar-fixed-json" onclick="return showTab('navbar-fixed-json')">Response</a></li>
            </ul>
            <div class="tab-content">
                <div class="tab-pane active" id="navbar-fixed-annotation">{annotations}</div>
                <div class="tab-pane" id="navbar-fixed-json"><pre id="jsonCode">{json}</pre></div>
            </div>
        </div>"##,
        annotations = annotations,
        json = html_escape(&pretty_json(raw_json)),
    )
}

fn result_region(generation: u64, inner: &str) -> String {
    format!(
        r#"<div id="requestResult" data-generation="{}">{}</div>"#,
        generation, inner
    )
}

/// Annotated text next to its detail panel, plus the raw response.
pub fn render_text_result(generation: u64, annotated: &AnnotatedText, raw_json: &str) -> String {
    let annotations = format!(
        r#"<table id="sentenceNER">
            <tr>
                <td class="annotated-text" id="displayAnnotatedText">{}</td>
                <td class="detail-column"><div id="detailed_annot-0" class="hidden"></div></td>
            </tr>
        </table>"#,
        annotated.html
    );
    result_region(generation, &tabs(&annotations, raw_json))
}

/// One table per page: canvas, text layer and overlays on the left, the
/// page's detail panel on the right. A pdf.js script paints the pages into
/// canvases already sized by the server and fills each text layer from the
/// page's text content so the text can be selected.
pub fn render_pdf_result(
    generation: u64,
    pages: &[PageCanvas],
    overlays: &[Overlay],
    raw_json: &str,
) -> String {
    let total = pages.len();
    let mut html = String::new();

    for page in pages {
        let anchors: String = overlays
            .iter()
            .filter(|o| o.page == page.number)
            .map(render_overlay)
            .collect();

        html.push_str(&format!(
            r#"<table class="pdf-page-table">
                <tr>
                    <td class="page-cell">
                        <div class="page-info"><p>page {n}/{total}</p></div>
                        <div class="pdf-page" id="page-{n}">
                            <canvas data-page="{n}" width="{w}" height="{h}"></canvas>
                            <div class="textLayer" data-page="{n}"></div>
                            {anchors}
                        </div>
                    </td>
                    <td class="detail-cell"><div id="detailed_annot-{n}" class="hidden"></div></td>
                </tr>
            </table>"#,
            n = page.number,
            total = total,
            w = page.width,
            h = page.height,
            anchors = anchors,
        ));
    }

    let script = format!(
        r#"<script src="https://cdnjs.cloudflare.com/ajax/libs/pdf.js/{v}/pdf.min.js"></script>
        <script>
        pdfjsLib.GlobalWorkerOptions.workerSrc = 'https://cdnjs.cloudflare.com/ajax/libs/pdf.js/{v}/pdf.worker.min.js';
        (async function () {{
            try {{
                const pdf = await pdfjsLib.getDocument({url}).promise;
                for (const canvas of document.querySelectorAll('.pdf-page canvas')) {{
                    const number = parseInt(canvas.dataset.page, 10);
                    const page = await pdf.getPage(number);
                    const viewport = page.getViewport({{ scale: canvas.width / page.getViewport({{ scale: 1.0 }}).width }});
                    await page.render({{ canvasContext: canvas.getContext('2d'), viewport: viewport }}).promise;
                    const layer = document.querySelector('#page-' + number + ' .textLayer');
                    if (!layer) continue;
                    try {{
                        const textContent = await page.getTextContent();
                        layer.style.setProperty('--scale-factor', viewport.scale);
                        await pdfjsLib.renderTextLayer({{
                            textContentSource: textContent,
                            container: layer,
                            viewport: viewport,
                            textDivs: []
                        }}).promise;
                    }} catch (error) {{
                        console.warn('text layer unavailable for page ' + number, error);
                    }}
                }}
            }} catch (error) {{
                console.error('PDF render error:', error);
            }}
        }})();
        </script>"#,
        v = PDFJS_VERSION,
        url = js_string(&format!("/document/{}", generation)),
    );

    let annotations = format!("{}{}", html, script);
    result_region(generation, &tabs(&annotations, raw_json))
}

fn render_overlay(overlay: &Overlay) -> String {
    format!(
        r#"<a class="overlay {class}" id="annot-{e}-{p}" data-page="{page}" style="width:{w:.2}px; height:{h:.2}px; top:{top:.2}px; left:{left:.2}px;"></a>"#,
        class = overlay.class,
        e = overlay.entity_index,
        p = overlay.position_index,
        page = overlay.page,
        w = overlay.width,
        h = overlay.height,
        top = overlay.top,
        left = overlay.left,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32) -> PageCanvas {
        PageCanvas {
            number,
            width: 882.0,
            height: 1141.0,
            native_width: 612.0,
            native_height: 792.0,
        }
    }

    #[test]
    fn test_text_result_has_both_tabs() {
        let annotated = AnnotatedText {
            html: "<p>x</p>".to_string(),
            highlighted: vec![],
            skipped: vec![],
        };
        let html = render_text_result(4, &annotated, r#"{"entities":[{"rawForm":"<R>"}]}"#);
        assert!(html.contains(r#"data-generation="4""#));
        assert!(html.contains("<p>x</p>"));
        assert!(html.contains("detailed_annot-0"));
        assert!(html.contains("&quot;rawForm&quot;: &quot;&lt;R&gt;&quot;"));
        assert!(html.contains("navbar-fixed-json"));
    }

    #[test]
    fn test_pdf_result_places_overlays_on_their_page() {
        let overlays = vec![Overlay {
            entity_index: 3,
            position_index: 1,
            page: 2,
            left: 10.0,
            top: 20.0,
            width: 30.5,
            height: 8.25,
            class: "software".to_string(),
        }];
        let html = render_pdf_result(9, &[page(1), page(2)], &overlays, "{}");
        assert!(html.contains("page 1/2"));
        assert!(html.contains(r#"<canvas data-page="2" width="882" height="1141">"#));
        let page2 = html.find(r#"id="page-2""#).unwrap();
        let anchor = html.find(r#"id="annot-3-1""#).unwrap();
        assert!(anchor > page2);
        assert!(html.contains("width:30.50px; height:8.25px; top:20.00px; left:10.00px;"));
        assert!(html.contains("detailed_annot-2"));
        let layer = html.find(r#"<div class="textLayer" data-page="2"></div>"#).unwrap();
        assert!(layer > page2 && layer < anchor);
        assert!(html.contains("renderTextLayer"));
        assert!(html.contains("getTextContent"));
        assert!(!html.contains("<details"));
        assert!(html.contains(r#""/document/9""#));
    }
}
