//! Layout provider abstraction.
//!
//! Structure extraction only ever sees [`PageLayout`] values; the concrete PDF
//! library (lopdf) stays behind the [`LayoutProvider`] trait.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::{detect_version_from_bytes, detect_version_from_path};
use crate::error::{Error, Result};

use super::page::{BBox, LayoutBlock, LayoutLine, LayoutSpan, PageLayout};

/// Source of per-page layout and plain text.
pub trait LayoutProvider {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Layout of the page at `index` (0-based).
    fn page_layout(&self, index: usize) -> Result<PageLayout>;

    /// Plain text of the page at `index` (0-based).
    fn page_text(&self, index: usize) -> Result<String> {
        Ok(self.page_layout(index)?.plain_text())
    }

    /// Height of the page at `index` (0-based).
    fn page_height(&self, index: usize) -> Result<f32> {
        Ok(self.page_layout(index)?.height)
    }
}

/// Pre-built layouts, mostly useful for tests and benchmarks.
impl LayoutProvider for Vec<PageLayout> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_layout(&self, index: usize) -> Result<PageLayout> {
        self.get(index)
            .cloned()
            .ok_or(Error::PageOutOfRange(index, self.len()))
    }
}

/// Default page size (US Letter) when no `/MediaBox` is found.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// `/Flags` bit marking a font as bold.
pub const FORCE_BOLD_FLAG: u32 = 1 << 18;

/// Default text leading when `TL` was never set.
const DEFAULT_LEADING: f32 = 12.0;

/// TJ adjustments beyond this (thousandths of an em) are treated as word gaps.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Concrete [`LayoutProvider`] backed by `lopdf::Document`.
///
/// The whole document is parsed into memory on construction, so no file
/// handle outlives [`LopdfProvider::open`].
pub struct LopdfProvider {
    doc: LopdfDocument,
    page_ids: Vec<ObjectId>,
}

impl LopdfProvider {
    /// Load from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let version = detect_version_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        log::debug!("Loaded {} (PDF {})", path.display(), version);
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect_version_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let page_ids = doc.get_pages().into_values().collect();
        Self { doc, page_ids }
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index, self.page_ids.len()))
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj) {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// `/MediaBox` of a page, inherited from the page tree when absent.
    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let mut current = self.doc.get_dictionary(page_id).ok();
        let mut depth = 0;
        while let Some(dict) = current {
            if let Ok(obj) = dict.get(b"MediaBox") {
                if let Object::Array(values) = self.resolve(obj) {
                    let numbers: Vec<f32> = values
                        .iter()
                        .filter_map(|v| get_number(self.resolve(v)))
                        .collect();
                    if numbers.len() == 4 {
                        return [numbers[0], numbers[1], numbers[2], numbers[3]];
                    }
                }
            }
            depth += 1;
            if depth > 32 {
                break;
            }
            current = dict.get(b"Parent").ok().and_then(|p| self.resolve_dict(p));
        }
        DEFAULT_MEDIA_BOX
    }

    /// Font resources of a page keyed by resource name.
    fn page_fonts(&self, page_id: ObjectId) -> Result<HashMap<Vec<u8>, FontInfo<'_>>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut fonts = HashMap::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| String::from_utf8_lossy(&name).to_string());
            let flags = self.font_flags(font_dict);
            fonts.insert(
                name,
                FontInfo {
                    base_font,
                    flags,
                    dict: font_dict,
                },
            );
        }
        Ok(fonts)
    }

    /// `/Flags` from the font descriptor (or the first descendant font's one).
    fn font_flags(&self, font: &Dictionary) -> u32 {
        let descriptor = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|d| self.resolve_dict(d))
            .or_else(|| {
                let descendants = font.get(b"DescendantFonts").ok()?;
                match self.resolve(descendants) {
                    Object::Array(items) => items
                        .first()
                        .and_then(|f| self.resolve_dict(f))
                        .and_then(|f| f.get(b"FontDescriptor").ok())
                        .and_then(|d| self.resolve_dict(d)),
                    _ => None,
                }
            });

        let Some(descriptor) = descriptor else {
            return 0;
        };

        let mut flags = descriptor
            .get(b"Flags")
            .ok()
            .and_then(|f| get_number(self.resolve(f)))
            .map(|f| f as u32)
            .unwrap_or(0);
        let weight = descriptor
            .get(b"FontWeight")
            .ok()
            .and_then(|w| get_number(self.resolve(w)))
            .unwrap_or(0.0);
        if weight >= 600.0 {
            flags |= FORCE_BOLD_FLAG;
        }
        flags
    }

    /// Decode a page's content stream into positioned spans (PDF user space).
    fn extract_raw_spans(&self, page_id: ObjectId) -> Result<Vec<RawSpan>> {
        let fonts = self.page_fonts(page_id)?;
        let content = self.doc.get_page_content(page_id)?;
        let content = lopdf::content::Content::decode(&content)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut state = TextState::default();
        let mut spans = Vec::new();

        for op in content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => state.ctm_stack.push(state.ctm),
                "Q" => {
                    if let Some(ctm) = state.ctm_stack.pop() {
                        state.ctm = ctm;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operands(operands) {
                        state.ctm = Matrix::multiply(&m, &state.ctm);
                    }
                }
                "BT" => {
                    state.in_text = true;
                    state.text_matrix = Matrix::IDENTITY;
                    state.line_matrix = Matrix::IDENTITY;
                }
                "ET" => state.in_text = false,
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        state.font = name.clone();
                    }
                    state.font_size = operands.get(1).and_then(get_number).unwrap_or(12.0);
                }
                "TL" => {
                    state.leading = operands.first().and_then(get_number).unwrap_or(0.0);
                }
                "Td" | "TD" => {
                    let tx = operands.first().and_then(get_number).unwrap_or(0.0);
                    let ty = operands.get(1).and_then(get_number).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
                "Tm" => {
                    if let Some(m) = matrix_operands(operands) {
                        state.text_matrix = m;
                        state.line_matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = decode_with_font(&self.doc, &fonts, &state.font, bytes);
                        state.emit(text, &fonts, &mut spans);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let text = decode_tj_array(&self.doc, &fonts, &state.font, items);
                        state.emit(text, &fonts, &mut spans);
                    }
                }
                "'" | "\"" => {
                    state.next_line();
                    let idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = operands.get(idx) {
                        let text = decode_with_font(&self.doc, &fonts, &state.font, bytes);
                        state.emit(text, &fonts, &mut spans);
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }
}

impl LayoutProvider for LopdfProvider {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_height(&self, index: usize) -> Result<f32> {
        let [_, y0, _, y1] = self.media_box(self.page_id(index)?);
        Ok((y1 - y0).abs())
    }

    fn page_layout(&self, index: usize) -> Result<PageLayout> {
        let page_id = self.page_id(index)?;
        let [mx0, my0, mx1, my1] = self.media_box(page_id);
        let geometry = PageGeometry {
            left: mx0.min(mx1),
            top: my0.max(my1),
        };
        let mut page = PageLayout::new(index, (mx1 - mx0).abs(), (my1 - my0).abs());

        let spans = self.extract_raw_spans(page_id)?;
        let lines = group_spans_into_lines(spans);
        for block in group_lines_into_blocks(lines) {
            page.add_block(LayoutBlock {
                lines: block
                    .into_iter()
                    .map(|line| geometry.to_layout_line(line))
                    .collect(),
            });
        }

        log::debug!(
            "Page {}: {} blocks, {} lines",
            index,
            page.blocks.len(),
            page.lines().count()
        );
        Ok(page)
    }
}

/// Font information resolved from the page resources.
struct FontInfo<'a> {
    base_font: String,
    flags: u32,
    dict: &'a Dictionary,
}

/// A span in PDF user space (y grows upward, `y` is the baseline).
#[derive(Debug, Clone)]
struct RawSpan {
    text: String,
    x: f32,
    y: f32,
    width: f32,
    font_size: f32,
    font_name: String,
    font_flags: u32,
}

/// 2D affine matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// `lhs × rhs` in PDF row-vector convention.
    fn multiply(lhs: &Matrix, rhs: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = lhs.0;
        let [a2, b2, c2, d2, e2, f2] = rhs.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn translation(tx: f32, ty: f32) -> Matrix {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    fn origin(&self) -> (f32, f32) {
        (self.0[4], self.0[5])
    }

    fn vertical_scale(&self) -> f32 {
        let [_, _, c, d, _, _] = self.0;
        (c * c + d * d).sqrt()
    }
}

/// Graphics/text state tracked while walking a content stream.
struct TextState {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            in_text: false,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::multiply(&Matrix::translation(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            DEFAULT_LEADING
        };
        self.move_line(0.0, -leading);
    }

    /// Record a span at the current position and advance past it.
    fn emit(&mut self, text: String, fonts: &HashMap<Vec<u8>, FontInfo<'_>>, spans: &mut Vec<RawSpan>) {
        if !self.in_text || text.trim().is_empty() {
            return;
        }

        let rendering = Matrix::multiply(&self.text_matrix, &self.ctm);
        let (x, y) = rendering.origin();
        let size = self.font_size * rendering.vertical_scale();
        let advance = estimate_width(&text, self.font_size);
        let width = estimate_width(&text, size);

        let (font_name, font_flags) = match fonts.get(&self.font) {
            Some(info) => (info.base_font.clone(), info.flags),
            None => (String::from_utf8_lossy(&self.font).to_string(), 0),
        };

        spans.push(RawSpan {
            text,
            x,
            y,
            width,
            font_size: size,
            font_name,
            font_flags,
        });

        self.text_matrix = Matrix::multiply(&Matrix::translation(advance, 0.0), &self.text_matrix);
    }
}

/// Glyph widths are not resolved; half an em per character is close enough for ordering.
fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}

/// Converts PDF user space into top-down page coordinates.
struct PageGeometry {
    left: f32,
    top: f32,
}

impl PageGeometry {
    fn to_layout_line(&self, spans: Vec<RawSpan>) -> LayoutLine {
        let spans = spans
            .into_iter()
            .map(|s| {
                let bbox = BBox::new(
                    s.x - self.left,
                    self.top - (s.y + s.font_size * 0.8),
                    s.x - self.left + s.width,
                    self.top - (s.y - s.font_size * 0.2),
                );
                LayoutSpan::new(s.text, s.font_size, s.font_name, bbox).with_flags(s.font_flags)
            })
            .collect();
        LayoutLine::from_spans(spans)
    }
}

/// Group spans sharing a baseline into lines, top to bottom, each sorted left to right.
fn group_spans_into_lines(mut spans: Vec<RawSpan>) -> Vec<Vec<RawSpan>> {
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<RawSpan>> = Vec::new();
    let mut current: Vec<RawSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(merge_adjacent(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(merge_adjacent(current));
    }
    lines
}

/// Merge touching spans of the same font so split words stay whole.
fn merge_adjacent(mut spans: Vec<RawSpan>) -> Vec<RawSpan> {
    spans.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut merged: Vec<RawSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(last) = merged.last_mut() {
            let gap = span.x - (last.x + last.width);
            let same_font =
                last.font_name == span.font_name && (last.font_size - span.font_size).abs() < 0.1;
            if same_font && gap <= span.font_size * 0.1 {
                last.text.push_str(&span.text);
                last.width = (span.x + span.width) - last.x;
                continue;
            }
        }
        merged.push(span);
    }
    merged
}

/// Split lines into blocks at large vertical gaps or font size changes.
fn group_lines_into_blocks(lines: Vec<Vec<RawSpan>>) -> Vec<Vec<Vec<RawSpan>>> {
    let baselines: Vec<f32> = lines.iter().map(|l| l[0].y).collect();
    let spacings: Vec<f32> = baselines
        .windows(2)
        .map(|w| (w[0] - w[1]).abs())
        .filter(|s| *s > 0.1)
        .collect();
    let avg_spacing = if spacings.is_empty() {
        DEFAULT_LEADING
    } else {
        spacings.iter().sum::<f32>() / spacings.len() as f32
    };

    let mut blocks: Vec<Vec<Vec<RawSpan>>> = Vec::new();
    let mut current: Vec<Vec<RawSpan>> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            let spacing = (prev[0].y - line[0].y).abs();
            let size_change = (prev[0].font_size - line[0].font_size).abs();
            if spacing > avg_spacing * 1.5 || size_change > 1.0 {
                blocks.push(std::mem::take(&mut current));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn decode_with_font(
    doc: &LopdfDocument,
    fonts: &HashMap<Vec<u8>, FontInfo<'_>>,
    font: &[u8],
    bytes: &[u8],
) -> String {
    if let Some(info) = fonts.get(font) {
        if let Ok(encoding) = info.dict.get_font_encoding(doc) {
            if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                return text;
            }
        }
    }
    decode_text_simple(bytes)
}

/// Decode a `TJ` array, turning large negative adjustments into spaces.
fn decode_tj_array(
    doc: &LopdfDocument,
    fonts: &HashMap<Vec<u8>, FontInfo<'_>>,
    font: &[u8],
    items: &[Object],
) -> String {
    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => {
                combined.push_str(&decode_with_font(doc, fonts, font, bytes))
            }
            other => {
                if let Some(adjustment) = get_number(other) {
                    if -adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                    {
                        combined.push(' ');
                    }
                }
            }
        }
    }
    combined
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut values = [0.0f32; 6];
    for (slot, obj) in values.iter_mut().zip(operands) {
        *slot = get_number(obj)?;
    }
    Some(Matrix(values))
}

/// Helper: extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
