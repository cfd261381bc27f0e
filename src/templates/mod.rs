//! HTML templates and styling for the annotation viewer.
//!
//! ## Module Structure
//!
//! - `styles` - CSS constants and annotation colours
//! - `components` - Shared HTML components (nav bar, form, status line, base template)
//! - `results` - Annotated text and PDF page regions
//! - `page` - The assembled About / Demo / Doc page

mod components;
mod page;
mod results;
mod styles;

pub use components::{base_html, info_html, nav_bar, render_form, Info, Section, EXAMPLES};
pub use page::{render_page, result_header, PageView};
pub use results::{render_pdf_result, render_text_result};
pub use styles::STYLE;
