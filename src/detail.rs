//! Detail panel: the expanded view of one annotation shown next to the
//! text or the PDF page when a highlight is hovered or clicked.

use crate::knowledge_base::{KnowledgeBase, DEFAULT_LANG};
use crate::markup::{css_token, html_escape, wiki_to_html};
use crate::models::{Concept, Entity, Statement};
use crate::session::{ConceptMap, Session};
use std::collections::BTreeSet;

// ============================================================================
// Concept Resolution
// ============================================================================

/// Make sure every knowledge-base reference of `entities` is in the session
/// concept map, fetching only the ones not looked up before. Failed lookups
/// are not cached so a later hover can retry them. A found concept also gets
/// its page thumbnail; a failed thumbnail lookup only loses the image.
pub async fn resolve_concepts(
    session: &Session,
    kb: &dyn KnowledgeBase,
    entities: &[Entity],
) -> ConceptMap {
    let ids: BTreeSet<u64> = entities
        .iter()
        .filter_map(|e| e.wikipedia_external_ref)
        .collect();

    for id in ids {
        if session.cached_concept(id).await.is_some() {
            continue;
        }
        match kb.concept(id, DEFAULT_LANG).await {
            Ok(Some(mut concept)) => {
                if concept.image_url.is_none() {
                    match kb.thumbnail(id, DEFAULT_LANG).await {
                        Ok(url) => concept.image_url = url,
                        Err(e) => tracing::debug!(wikipedia_id = id, error = %e, "thumbnail lookup failed"),
                    }
                }
                session.cache_concept(id, Some(concept)).await;
            }
            Ok(None) => session.cache_concept(id, None).await,
            Err(e) => tracing::warn!(wikipedia_id = id, error = %e, "concept lookup failed"),
        }
    }

    session.concept_map().await
}

// ============================================================================
// Rendering
// ============================================================================

/// Render the panel for the entities anchored at one highlight, most recent
/// first. `top` aligns the panel with the highlight on a PDF page.
pub fn render_detail(entities: &[Entity], concepts: &ConceptMap, top: Option<f64>) -> String {
    entities
        .iter()
        .rev()
        .map(|entity| {
            let concept = entity
                .wikipedia_external_ref
                .and_then(|id| concepts.get(&id))
                .and_then(Option::as_ref);
            render_entity(entity, concept, top)
        })
        .collect()
}

fn render_entity(entity: &Entity, concept: Option<&Concept>, top: Option<f64>) -> String {
    let lang = DEFAULT_LANG;
    let entity_type = entity.entity_type.as_str();
    let content = entity.surface_form().unwrap_or("");

    let mut html = format!("<div class='info-sense-box {}'", css_token(entity_type));
    if let Some(top) = top.filter(|t| t.is_finite()) {
        html.push_str(&format!(
            " style='vertical-align:top; position:relative; top:{:.1}px'",
            top
        ));
    }
    html.push_str(&format!(
        "><h3 style='color:#FFF;padding-left:10px;'>{}</h3>",
        html_escape(&content.to_uppercase())
    ));
    html.push_str(
        "<div class='container-fluid detail-body'><table class='detail-fields'><tr><td>",
    );

    let mut field = |label: &str, value: Option<&str>| {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            html.push_str(&format!("<p>{}: <b>{}</b></p>", label, html_escape(v)));
        }
    };
    field("Type", Some(entity_type));
    field("Raw name", Some(content));
    field(
        "Normalized name",
        concept.and_then(|c| c.preferred_term.as_deref()),
    );
    field("Version number", entity.version_number_text());
    field("Version date", entity.version_date_text());
    field("URL", entity.url_text());
    field("Creator", entity.creator_text());

    let image = concept
        .and_then(|c| c.image_url.as_deref())
        .filter(|u| u.starts_with("https://") || u.starts_with("http://"));
    if let (Some(wikipedia), Some(src)) = (entity.wikipedia_external_ref, image) {
        html.push_str(&format!(
            "</td><td class='wiki-image-cell'><img class='wiki-image' id='img-{}' alt='{}' src='{}'/>",
            wikipedia,
            html_escape(content),
            html_escape(src)
        ));
    }

    html.push_str("</td></tr></table>");

    if let Some(definition) = concept
        .and_then(|c| c.definitions.first())
        .filter(|d| !d.definition.trim().is_empty())
    {
        let def_lang = definition.lang.as_deref().unwrap_or(lang);
        html.push_str(&format!(
            "<div class='definition'>{}</div>",
            wiki_to_html(&definition.definition, def_lang)
        ));
    }

    if let Some(statements) = concept.map(|c| &c.statements).filter(|s| !s.is_empty()) {
        let rows: String = statements.iter().map(display_statement).collect();
        html.push_str(&format!(
            "<div><table class='statements'>{}</table></div>",
            rows
        ));
    }

    let wikidata_id = entity
        .wikidata_id
        .as_deref()
        .or_else(|| concept.and_then(|c| c.wikidata_id.as_deref()))
        .filter(|id| !id.is_empty());
    if entity.wikipedia_external_ref.is_some() || wikidata_id.is_some() {
        html.push_str("<p class='references'>References: ");
        if let Some(wikipedia) = entity.wikipedia_external_ref {
            html.push_str(&format!(
                r#"<a href="https://{lang}.wikipedia.org/wiki?curid={wikipedia}" target="_blank"><img class="ref-logo" alt="Wikipedia" src="/resources/img/wikipedia.png"/></a>"#
            ));
        }
        if let Some(id) = wikidata_id {
            html.push_str(&format!(
                r#"<a href="https://www.wikidata.org/wiki/{}" target="_blank"><img class="ref-logo" alt="Wikidata" src="/resources/img/Wikidata-logo.svg"/></a>"#,
                urlencoding::encode(id)
            ));
        }
        html.push_str("</p>");
    }

    html.push_str("</div></div>");
    html
}

/// One row of the statements table.
pub fn display_statement(statement: &Statement) -> String {
    let property = statement
        .property_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&statement.property_id);
    let raw_value = value_text(&statement.value);

    let value = match statement.value_type.as_deref() {
        Some("wikibase-item") => {
            let label = statement
                .value_name
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(&raw_value);
            format!(
                r#"<a href="https://www.wikidata.org/wiki/{}" target="_blank">{}</a>"#,
                urlencoding::encode(&raw_value),
                html_escape(label)
            )
        }
        Some("url") if raw_value.starts_with("http://") || raw_value.starts_with("https://") => {
            format!(
                r#"<a href="{0}" target="_blank">{0}</a>"#,
                html_escape(&raw_value)
            )
        }
        Some("time") => html_escape(
            raw_value
                .trim_start_matches('+')
                .trim_end_matches("T00:00:00Z"),
        ),
        _ => html_escape(&raw_value),
    };

    format!(
        "<tr><td class='statement-property'>{}</td><td class='statement-value'>{}</td></tr>",
        html_escape(property),
        value
    )
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Object(map) => map
            .get("amount")
            .or_else(|| map.get("time"))
            .or_else(|| map.get("id"))
            .map(value_text)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}
