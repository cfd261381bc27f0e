//! Text escaping and markup conversion helpers.

use pulldown_cmark::{Options, Parser};
use regex::Regex;
use std::sync::OnceLock;

// ============================================================================
// Text Escaping
// ============================================================================

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Restrict a value used as a CSS class or element id to a safe alphabet.
pub fn css_token(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

/// Embed a string as a JS string literal inside a `<script>` block.
pub fn js_string(s: &str) -> String {
    serde_json::to_string(s)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}

// ============================================================================
// JSON Pretty Printing
// ============================================================================

/// Re-indent a raw JSON body for display. Bodies that fail to parse are
/// returned unchanged.
pub fn pretty_json(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| raw.to_string())
}

// ============================================================================
// Markdown Rendering
// ============================================================================

pub fn render_markdown(content: &str) -> String {
    let parser = Parser::new_ext(content, Options::ENABLE_TABLES);
    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    ammonia::clean(&html_output)
}

// ============================================================================
// Wiki Markup
// ============================================================================

fn wiki_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").expect("valid regex"))
}

fn wiki_bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'''(.+?)'''").expect("valid regex"))
}

fn wiki_italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"''(.+?)''").expect("valid regex"))
}

fn wiki_template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{[^}]*\}\}").expect("valid regex"))
}

/// Convert the subset of wiki markup found in knowledge-base definitions
/// (links, bold, italic, templates) to sanitized HTML.
pub fn wiki_to_html(wiki: &str, lang: &str) -> String {
    // Quotes must survive escaping for the bold/italic patterns.
    let escaped = wiki
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    let no_templates = wiki_template_re().replace_all(&escaped, "");

    let linked = wiki_link_re().replace_all(&no_templates, |caps: &regex::Captures| {
        let target = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let label = caps.get(2).map(|m| m.as_str()).unwrap_or(target);
        format!(
            r#"<a href="https://{}.wikipedia.org/wiki/{}" target="_blank">{}</a>"#,
            css_token(lang),
            urlencoding::encode(&target.replace(' ', "_")),
            label
        )
    });

    let bold = wiki_bold_re().replace_all(&linked, "<b>$1</b>");
    let italic = wiki_italic_re().replace_all(&bold, "<i>$1</i>");

    ammonia::clean(&italic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_css_token_strips_unsafe() {
        assert_eq!(css_token("software\" onclick=\"x"), "softwareonclickx");
        assert_eq!(css_token("version-number"), "version-number");
    }

    #[test]
    fn test_js_string_cannot_close_script() {
        let s = js_string("</script><script>alert(1)</script>");
        assert!(!s.contains("</script>"));
        assert!(s.starts_with('"'));
    }

    #[test]
    fn test_pretty_json_reindents() {
        let pretty = pretty_json(r#"{"entities":[{"type":"software"}]}"#);
        assert!(pretty.contains("\n"));
        assert!(pretty.contains("\"type\": \"software\""));
    }

    #[test]
    fn test_pretty_json_passes_through_invalid() {
        assert_eq!(pretty_json("not json"), "not json");
    }

    #[test]
    fn test_wiki_bold_italic_and_links() {
        let html = wiki_to_html(
            "'''SPSS''' is a ''statistical'' [[software suite|suite]] by [[IBM]].",
            "en",
        );
        assert!(html.contains("<b>SPSS</b>"));
        assert!(html.contains("<i>statistical</i>"));
        assert!(html.contains("https://en.wikipedia.org/wiki/software_suite"));
        assert!(html.contains(">suite</a>"));
        assert!(html.contains("https://en.wikipedia.org/wiki/IBM"));
    }

    #[test]
    fn test_wiki_to_html_drops_raw_markup() {
        let html = wiki_to_html("<script>alert(1)</script>{{cite web}}text", "en");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("cite web"));
        assert!(html.contains("text"));
    }

    #[test]
    fn test_render_markdown_sanitizes() {
        let html = render_markdown("# Title\n\n<script>x</script>");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(!html.contains("<script>"));
    }
}
