//! PDF layout reading: the lopdf-backed layout provider and line extraction.

mod backend;
mod layout;
mod options;
mod page;

pub use backend::{decode_text_simple, LayoutProvider, LopdfProvider, FORCE_BOLD_FLAG};
pub use layout::{is_bold_span, normalize_text, LineExtractor, LineRecord};
pub use options::{ErrorMode, ParseOptions};
pub use page::{BBox, LayoutBlock, LayoutLine, LayoutSpan, PageLayout};
