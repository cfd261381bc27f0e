//! Reconstruction of annotated text from a text-mode entity list.
//!
//! Offsets are UTF-16 code-unit positions, the unit the annotation service
//! counts in.

use crate::markup::{css_token, html_escape};
use crate::models::Entity;

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedText {
    /// Paragraph-wrapped HTML with highlighted spans.
    pub html: String,
    /// Indices of entities that were wrapped in a highlight.
    pub highlighted: Vec<usize>,
    /// Indices of entities left unhighlighted (out of order or unlocated).
    pub skipped: Vec<usize>,
}

/// Walk `entities` in the order received and wrap each `[start, end)` range
/// of `text` in a highlight carrying the entity index. Entities starting
/// before the current cursor are skipped, never reordered.
pub fn annotate_text(text: &str, entities: &[Entity]) -> AnnotatedText {
    let units: Vec<u16> = text.encode_utf16().collect();
    let len = units.len();
    let slice = |from: usize, to: usize| html_escape(&String::from_utf16_lossy(&units[from..to]));

    let mut out = String::new();
    let mut highlighted = Vec::new();
    let mut skipped = Vec::new();
    let mut pos = 0usize;

    for (index, entity) in entities.iter().enumerate() {
        let (Some(start), Some(end)) = (entity.offset_start, entity.offset_end) else {
            tracing::warn!(index, "entity without offsets, left unhighlighted");
            skipped.push(index);
            continue;
        };

        if start < pos {
            tracing::warn!(
                index,
                start,
                cursor = pos,
                "entity offsets out of order in service response, left unhighlighted"
            );
            skipped.push(index);
            continue;
        }

        let start = snap_to_char(&units, start.min(len), false).max(pos);
        let end = snap_to_char(&units, end.clamp(start, len), true);
        let class = css_token(&entity.entity_type);

        out.push_str(&slice(pos, start));
        out.push_str(&format!(
            r#"<span id="annot-{index}" rel="popover" data-color="{class}"><span class="label {class}" style="cursor:hand;cursor:pointer;">{}</span></span>"#,
            slice(start, end)
        ));
        highlighted.push(index);
        pos = end;
    }

    out.push_str(&slice(pos, len));

    AnnotatedText {
        html: paragraphs(&out),
        highlighted,
        skipped,
    }
}

/// Keep `index` off the middle of a surrogate pair: moved to the pair's
/// start, or past its end when `forward`.
fn snap_to_char(units: &[u16], index: usize, forward: bool) -> usize {
    let splits_pair = index > 0
        && index < units.len()
        && (0xD800..=0xDBFF).contains(&units[index - 1])
        && (0xDC00..=0xDFFF).contains(&units[index]);
    match (splits_pair, forward) {
        (true, true) => index + 1,
        (true, false) => index - 1,
        (false, _) => index,
    }
}

/// Turn every line break into a paragraph break.
fn paragraphs(s: &str) -> String {
    let body = s.replace("\r\n", "\n").replace('\r', "\n").replace('\n', "</p><p>");
    format!("<p>{}</p>", body)
}
