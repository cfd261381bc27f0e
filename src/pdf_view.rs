//! PDF page preparation and annotation overlay placement.
//!
//! Pages of an uploaded document are measured on a blocking thread and
//! published one at a time through a watch channel. Overlay placement waits
//! for the page it targets to be published, so boxes are never computed
//! against a canvas that does not exist yet.

use crate::error::PdfError;
use crate::markup::css_token;
use crate::models::{BoundingBox, Overlay, PageCanvas, PageInfo, PdfAnnotationResponse};
use futures_util::future::join_all;
use lopdf::{Document, Object, ObjectId};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::watch;

/// US Letter, used when a page has no usable CropBox or MediaBox.
const DEFAULT_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

/// Share of the page column the canvas may occupy.
const CANVAS_FILL: f64 = 0.98;

/// Overlays are grown by one pixel on each side of the scaled box.
const OVERLAY_OUTSET: f64 = 1.0;

const MAX_PARENT_DEPTH: usize = 32;

// ============================================================================
// Page Rendering
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub pages: Vec<PageCanvas>,
    pub finished: bool,
    pub error: Option<String>,
}

/// Receiving side of a page rendering job.
#[derive(Clone)]
pub struct RenderHandle {
    rx: watch::Receiver<RenderState>,
}

impl RenderHandle {
    /// A handle over pages that are already rendered.
    pub fn completed(pages: Vec<PageCanvas>) -> Self {
        let (_tx, rx) = watch::channel(RenderState {
            pages,
            finished: true,
            error: None,
        });
        Self { rx }
    }

    /// Wait until page `number` is rendered. Returns `None` when rendering
    /// finished (or failed) without producing that page.
    pub async fn wait_for_page(&self, number: u32) -> Option<PageCanvas> {
        let mut rx = self.rx.clone();
        let state = rx
            .wait_for(|s| s.finished || s.pages.iter().any(|p| p.number == number))
            .await
            .ok()?;
        state.pages.iter().find(|p| p.number == number).cloned()
    }

    /// Wait for the whole job and return its final state.
    pub async fn finished(&self) -> RenderState {
        let mut rx = self.rx.clone();
        if let Ok(state) = rx.wait_for(|s| s.finished).await {
            return state.clone();
        }
        let mut state = rx.borrow().clone();
        state.finished = true;
        state
            .error
            .get_or_insert_with(|| "page rendering stopped".to_string());
        state
    }
}

pub struct PageRenderer;

impl PageRenderer {
    /// Start measuring the pages of `bytes` for a page column of
    /// `column_width` pixels. Runs independently of the annotation request.
    /// Only page geometry is read here; the browser builds the text layer.
    pub fn spawn(bytes: Arc<Vec<u8>>, column_width: f64) -> RenderHandle {
        let (tx, rx) = watch::channel(RenderState::default());
        tokio::task::spawn_blocking(move || {
            if let Err(e) = render_pages(&bytes, column_width, &tx) {
                tracing::warn!(error = %e, "page rendering failed");
                tx.send_modify(|s| {
                    s.finished = true;
                    s.error = Some(e.to_string());
                });
            }
        });
        RenderHandle { rx }
    }
}

fn render_pages(
    bytes: &[u8],
    column_width: f64,
    tx: &watch::Sender<RenderState>,
) -> Result<(), PdfError> {
    let doc = Document::load_mem(bytes)?;

    for (number, page_id) in doc.get_pages() {
        let (native_width, native_height) = page_size(&doc, page_id);
        let canvas = canvas_for_page(number, native_width, native_height, column_width);
        tracing::trace!(page = number, width = canvas.width, height = canvas.height, "page ready");
        tx.send_modify(|s| s.pages.push(canvas));
    }

    tx.send_modify(|s| s.finished = true);
    Ok(())
}

/// Size a page canvas so its width fills the page column.
pub fn canvas_for_page(
    number: u32,
    native_width: f64,
    native_height: f64,
    column_width: f64,
) -> PageCanvas {
    let width = (column_width * CANVAS_FILL).floor();
    let scale = if native_width > 0.0 { width / native_width } else { 1.0 };
    PageCanvas {
        number,
        width,
        height: (native_height * scale).floor(),
        native_width,
        native_height,
    }
}

/// Displayed page size: the CropBox (else the MediaBox), with width and
/// height swapped for pages rotated by a quarter turn. Both boxes and
/// `/Rotate` may be inherited through `Parent` links.
fn page_size(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let (width, height) = inherited(doc, page_id, b"CropBox")
        .and_then(|obj| box_size(doc, obj))
        .or_else(|| inherited(doc, page_id, b"MediaBox").and_then(|obj| box_size(doc, obj)))
        .unwrap_or(DEFAULT_PAGE_SIZE);

    let rotate = inherited(doc, page_id, b"Rotate")
        .and_then(|obj| resolve(doc, obj))
        .and_then(number)
        .map(|r| (r as i64).rem_euclid(360))
        .unwrap_or(0);

    if rotate == 90 || rotate == 270 {
        (height, width)
    } else {
        (width, height)
    }
}

/// Look up `key` on the page dictionary or the nearest ancestor that has it.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    let mut depth = 0;
    while let Some(id) = current {
        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(obj) = dict.get(key) {
            return Some(obj);
        }
        depth += 1;
        if depth > MAX_PARENT_DEPTH {
            return None;
        }
        current = dict.get(b"Parent").and_then(|o| o.as_reference()).ok();
    }
    None
}

fn box_size(doc: &Document, obj: &Object) -> Option<(f64, f64)> {
    let obj = resolve(doc, obj)?;
    let values: Vec<f64> = obj
        .as_array()
        .ok()?
        .iter()
        .filter_map(|o| resolve(doc, o).and_then(number))
        .collect();
    if values.len() != 4 {
        return None;
    }
    let width = (values[2] - values[0]).abs();
    let height = (values[3] - values[1]).abs();
    (width > 0.0 && height > 0.0).then_some((width, height))
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

// ============================================================================
// Overlay Placement
// ============================================================================

/// Map a native bounding box onto a rendered canvas. Horizontal values scale
/// with the width ratio and vertical values with the height ratio.
pub fn overlay_rect(bbox: &BoundingBox, canvas: &PageCanvas, page: &PageInfo) -> Option<[f64; 4]> {
    if page.page_width <= 0.0 || page.page_height <= 0.0 {
        return None;
    }
    let scale_x = canvas.width / page.page_width;
    let scale_y = canvas.height / page.page_height;
    Some([
        bbox.x * scale_x - OVERLAY_OUTSET,
        bbox.y * scale_y - OVERLAY_OUTSET,
        bbox.w * scale_x + OVERLAY_OUTSET,
        bbox.h * scale_y + OVERLAY_OUTSET,
    ])
}

/// Compute every overlay for a PDF response. Boxes on pages the response
/// has no geometry for, or that were never rendered, are skipped.
pub async fn place_overlays(response: &PdfAnnotationResponse, pages: &RenderHandle) -> Vec<Overlay> {
    let entities = response.entities.as_deref().unwrap_or_default();

    let wanted: BTreeSet<u32> = entities
        .iter()
        .flat_map(|e| e.located_facets())
        .flat_map(|f| f.bounding_boxes.iter().map(|b| b.p))
        .collect();
    let canvases: HashMap<u32, PageCanvas> = join_all(wanted.into_iter().map(|p| pages.wait_for_page(p)))
        .await
        .into_iter()
        .flatten()
        .map(|c| (c.number, c))
        .collect();

    let mut overlays = Vec::new();
    for (entity_index, entity) in entities.iter().enumerate() {
        let class = css_token(&entity.entity_type.to_lowercase());
        let mut position_index = 0;
        for facet in entity.located_facets() {
            for bbox in &facet.bounding_boxes {
                let Some(page_info) = response.page_info(bbox.p) else {
                    tracing::debug!(entity_index, page = bbox.p, "no page geometry, overlay skipped");
                    continue;
                };
                let Some(canvas) = canvases.get(&bbox.p) else {
                    tracing::debug!(entity_index, page = bbox.p, "page not rendered, overlay skipped");
                    continue;
                };
                let Some([left, top, width, height]) = overlay_rect(bbox, canvas, page_info) else {
                    continue;
                };
                overlays.push(Overlay {
                    entity_index,
                    position_index,
                    page: bbox.p,
                    left,
                    top,
                    width,
                    height,
                    class: class.clone(),
                });
                position_index += 1;
            }
        }
    }
    overlays
}
