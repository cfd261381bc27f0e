//! CSS styles for the annotation viewer.
//!
//! Contains the main STYLE constant with all CSS for the web interface.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base03: #002b36;
    --base02: #073642;
    --base01: #586e75;
    --base00: #657b83;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --yellow: #b58900;
    --orange: #cb4b16;
    --red: #dc322f;
    --magenta: #d33682;
    --violet: #6c71c4;
    --blue: #268bd2;
    --cyan: #2aa198;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --link: var(--blue);
    --link-hover: var(--cyan);
    --accent: var(--base2);
    --code-bg: var(--base2);

    /* annotation colours by entity type */
    --software: #800080;
    --version: var(--orange);
    --url: var(--blue);
    --creator: var(--green);
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
}

.container {
    max-width: 1300px;
    margin: 0 auto;
    padding: 1rem;
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

h1, h2, h3 { font-weight: 600; margin-top: 1.5em; margin-bottom: 0.5em; }
h1 { font-size: 1.5rem; }
p { margin: 0.4em 0; }

.nav-bar {
    position: sticky;
    top: 0;
    background: var(--bg);
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
    display: flex;
    gap: 1rem;
    align-items: center;
    flex-wrap: wrap;
    z-index: 100;
}

.nav-bar a { font-size: 0.9rem; }
.nav-bar .spacer { flex: 1; }
.nav-bar .section-active { font-weight: 600; color: var(--base01); }
.nav-bar .service-status { font-size: 0.8rem; color: var(--muted); }

.section { display: none; }
.section.active { display: block; }

/* Submission form */
#gbdForm {
    display: flex;
    flex-direction: column;
    gap: 0.75rem;
    margin: 1rem 0;
}

#gbdForm select, #gbdForm textarea, #gbdForm input[type="file"] {
    padding: 0.4rem 0.75rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-size: 0.9rem;
    font-family: inherit;
}

#inputTextArea { width: 100%; min-height: 160px; }

.form-row { display: flex; gap: 1rem; align-items: center; flex-wrap: wrap; }

.btn {
    padding: 0.4rem 1rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--accent);
    color: var(--fg);
    cursor: pointer;
    font-size: 0.9rem;
}
.btn:hover { background: var(--base1); color: var(--base3); }

.examples { font-size: 0.85rem; color: var(--muted); }
.examples a { margin-right: 0.75rem; }

.hidden { display: none; }

/* Status and errors */
#infoResult { min-height: 1.2em; font-size: 0.9rem; }
#infoResult .requesting { color: var(--muted); }
#infoResult .error { color: var(--red); }
#infoResult .info { color: var(--base01); }

/* Result tabs */
.note-tabs .tab-bar {
    display: flex;
    gap: 0.25rem;
    border-bottom: 1px solid var(--border);
    list-style: none;
}
.note-tabs .tab-bar li a {
    display: block;
    padding: 0.3rem 0.8rem;
    border: 1px solid transparent;
    border-bottom: none;
    border-radius: 4px 4px 0 0;
    color: var(--base01);
}
.note-tabs .tab-bar li.active a {
    border-color: var(--border);
    background: var(--base3);
    font-weight: 600;
}
.tab-pane { display: none; padding-top: 0.75rem; }
.tab-pane.active { display: block; }

#jsonCode {
    background: var(--code-bg);
    padding: 0.75rem;
    border-radius: 4px;
    font-size: 0.8rem;
    overflow-x: auto;
    white-space: pre-wrap;
}

/* Annotated text */
#sentenceNER { width: 100%; table-layout: fixed; border-collapse: collapse; }
#sentenceNER td { vertical-align: top; }
.annotated-text {
    font-size: small;
    width: 60%;
    border: 1px solid #ccc;
    padding: 0.5rem;
    white-space: normal;
}
.detail-column { font-size: small; width: 40%; padding: 0 5px; }

.label {
    border-radius: 3px;
    padding: 1px 3px;
    color: #fff;
    background: var(--software);
}
.label.version-number, .label.version-date { background: var(--version); }
.label.url { background: var(--url); }
.label.creator { background: var(--creator); }

/* Detail panel */
.info-sense-box {
    background: var(--software);
    border-radius: 4px;
    margin-bottom: 0.5rem;
    padding-top: 0.1rem;
}
.info-sense-box h3 { margin: 0.3rem 0; font-size: 1rem; }
.detail-body {
    background-color: #f9f9f9;
    color: #70695c;
    padding: 5px;
    margin-top: 5px;
}
.detail-fields { width: 100%; background-color: #fff; border: 0; }
.statements { width: 100%; border-collapse: collapse; font-size: 0.8rem; }
.statements td { border-top: 1px solid var(--border); padding: 2px 4px; }
.statement-property { color: var(--base01); width: 40%; }
.definition { margin: 0.4rem 0; }
.wiki-image-cell { text-align: right; vertical-align: top; background-color: #fff; }
.wiki-image { max-width: 150px; max-height: 150px; }
.ref-logo { max-width: 28px; max-height: 22px; margin-top: 5px; margin-right: 4px; }

/* PDF pages */
.pdf-page-table { table-layout: fixed; width: 100%; }
.pdf-page-table td.page-cell { width: 70%; }
.pdf-page-table td.detail-cell { width: 30%; vertical-align: top; }
.page-info { text-align: center; margin-top: 1cm; }
.pdf-page { position: relative; }
.pdf-page canvas { border: 1px solid gray; display: block; }
.pdf-page a.overlay {
    display: block;
    position: absolute;
    border: 2px solid #800080;
    cursor: pointer;
    z-index: 2;
}
.pdf-page a.overlay:hover { background: rgba(128, 0, 128, 0.15); }
.textLayer {
    position: absolute;
    inset: 0;
    overflow: hidden;
    line-height: 1;
    opacity: 0.25;
    z-index: 1;
}
.textLayer span, .textLayer br {
    color: transparent;
    position: absolute;
    white-space: pre;
    cursor: text;
    transform-origin: 0 0;
}
.textLayer ::selection { background: rgba(0, 0, 255, 0.3); }

.doc-section { max-width: 900px; }
.doc-section pre { background: var(--code-bg); padding: 0.5rem; border-radius: 4px; overflow-x: auto; }
"#;
