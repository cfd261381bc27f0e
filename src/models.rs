//! Data models for the annotation viewer.
//!
//! These mirror the JSON produced by the software-mention service and the
//! knowledge-base lookup service, plus the geometry types used when laying
//! overlays on rendered PDF pages.

use serde::{Deserialize, Serialize};

// ============================================================================
// Service Responses
// ============================================================================

/// Response of `processSoftwareText`: entities carry character offsets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextAnnotationResponse {
    #[serde(default)]
    pub entities: Option<Vec<Entity>>,
    #[serde(default)]
    pub runtime: Option<u64>,
}

/// Response of `annotateSoftwarePDF`: entities carry bounding boxes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfAnnotationResponse {
    #[serde(default)]
    pub pages: Vec<PageInfo>,
    #[serde(default)]
    pub entities: Option<Vec<Entity>>,
    #[serde(default)]
    pub runtime: Option<u64>,
}

impl PdfAnnotationResponse {
    /// Page geometry for a 1-based page number.
    pub fn page_info(&self, page: u32) -> Option<&PageInfo> {
        if page == 0 {
            return None;
        }
        self.pages.get(page as usize - 1)
    }
}

// ============================================================================
// Entities
// ============================================================================

/// One detected software mention. Read-only once received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(rename = "rawForm", default, skip_serializing_if = "Option::is_none")]
    pub raw_form: Option<String>,
    #[serde(rename = "software-name", default, skip_serializing_if = "Option::is_none")]
    pub software_name: Option<Facet>,
    #[serde(rename = "offsetStart", default, skip_serializing_if = "Option::is_none")]
    pub offset_start: Option<usize>,
    #[serde(rename = "offsetEnd", default, skip_serializing_if = "Option::is_none")]
    pub offset_end: Option<usize>,
    #[serde(rename = "boundingBoxes", default, skip_serializing_if = "Vec::is_empty")]
    pub bounding_boxes: Vec<BoundingBox>,
    #[serde(rename = "version-number", default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<Facet>,
    #[serde(rename = "version-date", default, skip_serializing_if = "Option::is_none")]
    pub version_date: Option<Facet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Facet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Facet>,
    #[serde(rename = "wikipediaExternalRef", default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_external_ref: Option<u64>,
    #[serde(rename = "wikidataId", default, skip_serializing_if = "Option::is_none")]
    pub wikidata_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A metadata facet of an entity (name, version, url, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    #[serde(rename = "rawForm", default, skip_serializing_if = "Option::is_none")]
    pub raw_form: Option<String>,
    #[serde(rename = "boundingBoxes", default, skip_serializing_if = "Vec::is_empty")]
    pub bounding_boxes: Vec<BoundingBox>,
    #[serde(rename = "offsetStart", default, skip_serializing_if = "Option::is_none")]
    pub offset_start: Option<usize>,
    #[serde(rename = "offsetEnd", default, skip_serializing_if = "Option::is_none")]
    pub offset_end: Option<usize>,
}

impl Facet {
    /// The facet's surface text, if non-empty.
    pub fn text(&self) -> Option<&str> {
        self.raw_form.as_deref().filter(|s| !s.is_empty())
    }
}

impl Entity {
    /// Surface text of the mention: the entity's own raw form, falling back
    /// to the software-name facet used by PDF responses.
    pub fn surface_form(&self) -> Option<&str> {
        self.raw_form
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.software_name.as_ref().and_then(Facet::text))
    }

    /// Facets that can carry bounding boxes, in overlay order.
    pub fn located_facets(&self) -> Vec<&Facet> {
        [
            self.software_name.as_ref(),
            self.version_number.as_ref(),
            self.version_date.as_ref(),
            self.url.as_ref(),
            self.creator.as_ref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn version_number_text(&self) -> Option<&str> {
        self.version_number.as_ref().and_then(Facet::text)
    }

    pub fn version_date_text(&self) -> Option<&str> {
        self.version_date.as_ref().and_then(Facet::text)
    }

    pub fn url_text(&self) -> Option<&str> {
        self.url.as_ref().and_then(Facet::text)
    }

    pub fn creator_text(&self) -> Option<&str> {
        self.creator.as_ref().and_then(Facet::text)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Rectangle on a PDF page, in native page points. `p` is 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub p: u32,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Native dimensions of one PDF page as reported by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page_height: f64,
    pub page_width: f64,
}

/// A page rendered into a canvas of known pixel size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageCanvas {
    pub number: u32,
    pub width: f64,
    pub height: f64,
    pub native_width: f64,
    pub native_height: f64,
}

/// A positioned, clickable highlight over a page canvas, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub entity_index: usize,
    pub position_index: usize,
    pub page: u32,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub class: String,
}

// ============================================================================
// Knowledge Base
// ============================================================================

/// Concept details fetched from the knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    #[serde(rename = "preferredTerm", default)]
    pub preferred_term: Option<String>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub statements: Vec<Statement>,
    #[serde(rename = "wikidataId", default)]
    pub wikidata_id: Option<String>,
    /// Wikipedia page thumbnail, looked up separately.
    #[serde(skip)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

/// A structured fact about a concept (Wikidata-style property/value pair).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "conceptId", default)]
    pub concept_id: Option<String>,
    #[serde(rename = "propertyId", default)]
    pub property_id: String,
    #[serde(rename = "propertyName", default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(rename = "valueName", default)]
    pub value_name: Option<String>,
    #[serde(rename = "valueType", default)]
    pub value_type: Option<String>,
}
