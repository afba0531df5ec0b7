//! Page rasterization.
//!
//! [`LopdfRasterizer`] interprets the subset of PDF content operators the
//! quire renderers emit (paths, rectangles, colours, positioned text) and
//! paints them onto a `tiny_skia` pixmap. Text is filled from glyph
//! outlines: composite fonts use the TrueType program embedded in the
//! document, simple fonts are drawn with the bundled faces.

use crate::cache::PageImage;
use crate::error::PreviewError;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use quire_layout::{Font, FontFace, FontLibrary};
use quire_types::Size;
use std::collections::HashMap;
use std::sync::Arc;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Upper bound on either pixmap side, to keep a bad scale from allocating
/// gigabytes.
const MAX_SIDE_PX: u32 = 8192;

/// Turns a PDF binary into page images.
pub trait PageRasterizer: Send + Sync {
    fn page_count(&self, pdf: &[u8]) -> Result<usize, PreviewError>;

    /// Renders the given 1-based `pages` at `scale` pixels per point, in the
    /// order requested.
    fn render_pages(&self, pdf: &[u8], pages: &[usize], scale: f32) -> Result<Vec<PageImage>, PreviewError>;
}

#[derive(Debug, Clone, Default)]
pub struct LopdfRasterizer {
    fonts: FontLibrary,
}

impl LopdfRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn render_page(
        &self,
        doc: &Document,
        page_id: ObjectId,
        scale: f32,
        programs: &mut FontPrograms,
    ) -> Result<PageImage, PreviewError> {
        let size = page_size(doc, page_id);
        let (width, height) = size.scaled_pixels(scale);
        if width > MAX_SIDE_PX || height > MAX_SIDE_PX {
            return Err(PreviewError::Raster(format!(
                "{}x{} px exceeds the {} px limit",
                width, height, MAX_SIDE_PX
            )));
        }
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| PreviewError::Raster(format!("invalid raster size {}x{}", width, height)))?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let fonts = page_fonts(doc, page_id, programs);
        let content = Content::decode(&doc.get_page_content(page_id)?)?;
        let base = Transform::from_row(scale, 0.0, 0.0, -scale, 0.0, size.height * scale);

        let mut painter = Painter::new(&mut pixmap, base, &fonts, &self.fonts);
        for op in &content.operations {
            painter.apply(op);
        }

        let png = pixmap.encode_png().map_err(|e| PreviewError::Encode(e.to_string()))?;
        Ok(PageImage { width, height, png })
    }
}

impl PageRasterizer for LopdfRasterizer {
    fn page_count(&self, pdf: &[u8]) -> Result<usize, PreviewError> {
        Ok(Document::load_mem(pdf)?.get_pages().len())
    }

    fn render_pages(&self, pdf: &[u8], pages: &[usize], scale: f32) -> Result<Vec<PageImage>, PreviewError> {
        let doc = Document::load_mem(pdf)?;
        let page_ids = doc.get_pages();
        let total = page_ids.len();
        let mut programs = FontPrograms::new();
        pages
            .iter()
            .map(|&page| {
                let id = u32::try_from(page)
                    .ok()
                    .and_then(|n| page_ids.get(&n))
                    .ok_or(PreviewError::PageOutOfRange { page, total })?;
                self.render_page(&doc, *id, scale, &mut programs)
            })
            .collect()
    }
}

#[derive(Clone)]
struct GraphicsState {
    ctm: Transform,
    fill: [u8; 3],
    stroke: [u8; 3],
    line_width: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self { ctm: Transform::identity(), fill: [0, 0, 0], stroke: [0, 0, 0], line_width: 1.0 }
    }
}

/// How text shown with one font resource is drawn.
#[derive(Debug, Clone)]
enum PageFont {
    /// Identity-H composite font: two-byte glyph ids into the embedded program.
    Embedded(Arc<FontFace>),
    /// Single-byte font without a usable program, drawn with a bundled face.
    Simple(Font),
    /// Composite font whose program is missing; its text is skipped.
    Unavailable,
}

/// Embedded font programs already parsed, by font-file object. Merged
/// documents share them across many pages.
type FontPrograms = HashMap<ObjectId, Option<Arc<FontFace>>>;

#[derive(Clone)]
struct TextState {
    matrix: Transform,
    line_matrix: Transform,
    font: Vec<u8>,
    size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Transform::identity(),
            line_matrix: Transform::identity(),
            font: Vec::new(),
            size: 12.0,
            leading: 0.0,
        }
    }
}

struct Painter<'a> {
    pixmap: &'a mut Pixmap,
    base: Transform,
    fonts: &'a HashMap<Vec<u8>, PageFont>,
    library: &'a FontLibrary,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text: TextState,
    path: PathBuilder,
    has_path: bool,
}

impl<'a> Painter<'a> {
    fn new(
        pixmap: &'a mut Pixmap,
        base: Transform,
        fonts: &'a HashMap<Vec<u8>, PageFont>,
        library: &'a FontLibrary,
    ) -> Self {
        Self {
            pixmap,
            base,
            fonts,
            library,
            state: GraphicsState::default(),
            stack: Vec::new(),
            text: TextState::default(),
            path: PathBuilder::new(),
            has_path: false,
        }
    }

    /// Unknown operators and malformed operands are skipped; a preview
    /// should show as much of the page as it can.
    fn apply(&mut self, op: &Operation) {
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some([a, b, c, d, e, f]) = op_f32s::<6>(op) {
                    self.state.ctm = self.state.ctm.pre_concat(Transform::from_row(a, b, c, d, e, f));
                }
            }
            "w" => {
                if let Some([w]) = op_f32s::<1>(op) {
                    self.state.line_width = w.max(0.0);
                }
            }
            "rg" => {
                if let Some(rgb) = op_f32s::<3>(op) {
                    self.state.fill = to_rgb8(rgb);
                }
            }
            "RG" => {
                if let Some(rgb) = op_f32s::<3>(op) {
                    self.state.stroke = to_rgb8(rgb);
                }
            }
            "g" => {
                if let Some([v]) = op_f32s::<1>(op) {
                    self.state.fill = to_rgb8([v, v, v]);
                }
            }
            "G" => {
                if let Some([v]) = op_f32s::<1>(op) {
                    self.state.stroke = to_rgb8([v, v, v]);
                }
            }
            "m" => {
                if let Some([x, y]) = op_f32s::<2>(op) {
                    self.path.move_to(x, y);
                    self.has_path = true;
                }
            }
            "l" => {
                if let Some([x, y]) = op_f32s::<2>(op) {
                    self.path.line_to(x, y);
                    self.has_path = true;
                }
            }
            "h" => self.path.close(),
            "re" => {
                if let Some([x, y, w, h]) = op_f32s::<4>(op) {
                    if let Some(rect) = normalized_rect(x, y, w, h) {
                        self.path.push_rect(rect);
                        self.has_path = true;
                    }
                }
            }
            "f" | "F" => self.fill_path(FillRule::Winding),
            "f*" => self.fill_path(FillRule::EvenOdd),
            "S" => self.stroke_path(),
            "B" | "b" => {
                let path = self.take_path();
                if let Some(path) = path {
                    self.fill(&path, FillRule::Winding);
                    self.stroke(&path);
                }
            }
            "n" => {
                self.take_path();
            }
            "BT" => {
                self.text.matrix = Transform::identity();
                self.text.line_matrix = Transform::identity();
            }
            "ET" => {}
            "Tf" => {
                if let (Some(name), Some(size)) = (op.operands.first().and_then(|o| o.as_name().ok()), op_f32(op, 1)) {
                    self.text.font = name.to_vec();
                    self.text.size = size;
                }
            }
            "TL" => {
                if let Some([leading]) = op_f32s::<1>(op) {
                    self.text.leading = leading;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = op_f32s::<2>(op) {
                    self.move_text_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = op_f32s::<2>(op) {
                    self.text.leading = -ty;
                    self.move_text_line(tx, ty);
                }
            }
            "T*" => self.move_text_line(0.0, -self.text.leading),
            "Tm" => {
                if let Some([a, b, c, d, e, f]) = op_f32s::<6>(op) {
                    self.text.matrix = Transform::from_row(a, b, c, d, e, f);
                    self.text.line_matrix = self.text.matrix;
                }
            }
            "Tj" | "'" => {
                if op.operator == "'" {
                    self.move_text_line(0.0, -self.text.leading);
                }
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    self.show_text(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show_text(bytes),
                            other => {
                                if let Some(adjust) = obj_to_f32(other) {
                                    self.advance_text(-adjust / 1000.0 * self.text.size);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn move_text_line(&mut self, tx: f32, ty: f32) {
        self.text.line_matrix = self.text.line_matrix.pre_concat(Transform::from_translate(tx, ty));
        self.text.matrix = self.text.line_matrix;
    }

    fn advance_text(&mut self, tx: f32) {
        self.text.matrix = self.text.matrix.pre_concat(Transform::from_translate(tx, 0.0));
    }

    fn show_text(&mut self, bytes: &[u8]) {
        let size = self.text.size;
        let fonts = self.fonts;
        let library = self.library;
        match fonts.get(&self.text.font) {
            Some(PageFont::Embedded(program)) => {
                let Some(face) = program.as_face() else { return };
                let scale = size / f32::from(program.units_per_em());
                for pair in bytes.chunks_exact(2) {
                    self.show_glyph(&face, u16::from_be_bytes([pair[0], pair[1]]), scale);
                }
            }
            Some(PageFont::Unavailable) => {}
            simple => {
                let font = match simple {
                    Some(PageFont::Simple(font)) => *font,
                    _ => Font::Regular,
                };
                // The simple fonts quire writes are WinAnsi, which agrees
                // with Latin-1 on every character a page label uses.
                let text: String = bytes.iter().map(|&b| char::from(b)).collect();
                for run in library.runs(&text, font, size) {
                    let Some(program) = library.face(run.face) else { continue };
                    let Some(face) = program.as_face() else { continue };
                    let scale = size / f32::from(program.units_per_em());
                    for glyph in &run.glyphs {
                        self.show_glyph(&face, glyph.id, scale);
                    }
                }
            }
        }
    }

    /// Fills one glyph at the current text position and advances past it.
    fn show_glyph(&mut self, face: &Face<'_>, gid: u16, scale: f32) {
        let glyph = GlyphId(gid);
        let mut outline = GlyphPath::new(scale);
        if face.outline_glyph(glyph, &mut outline).is_some() {
            if let Some(path) = outline.finish() {
                let transform = self.base.pre_concat(self.state.ctm).pre_concat(self.text.matrix);
                self.pixmap.fill_path(&path, &paint(self.state.fill), FillRule::Winding, transform, None);
            }
        }
        self.advance_text(f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale);
    }

    fn take_path(&mut self) -> Option<tiny_skia::Path> {
        if !std::mem::take(&mut self.has_path) {
            self.path.clear();
            return None;
        }
        std::mem::take(&mut self.path).finish()
    }

    fn fill_path(&mut self, rule: FillRule) {
        if let Some(path) = self.take_path() {
            self.fill(&path, rule);
        }
    }

    fn stroke_path(&mut self) {
        if let Some(path) = self.take_path() {
            self.stroke(&path);
        }
    }

    fn fill(&mut self, path: &tiny_skia::Path, rule: FillRule) {
        let paint = paint(self.state.fill);
        self.pixmap.fill_path(path, &paint, rule, self.base.pre_concat(self.state.ctm), None);
    }

    fn stroke(&mut self, path: &tiny_skia::Path) {
        let paint = paint(self.state.stroke);
        let stroke = Stroke { width: self.state.line_width, ..Stroke::default() };
        self.pixmap.stroke_path(path, &paint, &stroke, self.base.pre_concat(self.state.ctm), None);
    }
}

/// Collects a glyph outline in text space, scaled from font units.
struct GlyphPath {
    builder: PathBuilder,
    scale: f32,
}

impl GlyphPath {
    fn new(scale: f32) -> Self {
        Self { builder: PathBuilder::new(), scale }
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPath {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x * self.scale, y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x * self.scale, y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let s = self.scale;
        self.builder.quad_to(x1 * s, y1 * s, x * s, y * s);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let s = self.scale;
        self.builder.cubic_to(x1 * s, y1 * s, x2 * s, y2 * s, x * s, y * s);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn paint(rgb: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb[0], rgb[1], rgb[2], 255);
    paint.anti_alias = true;
    paint
}

fn to_rgb8(rgb: [f32; 3]) -> [u8; 3] {
    rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn normalized_rect(x: f32, y: f32, w: f32, h: f32) -> Option<Rect> {
    Rect::from_ltrb(x.min(x + w), y.min(y + h), x.max(x + w), y.max(y + h))
}

fn obj_to_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn op_f32(op: &Operation, idx: usize) -> Option<f32> {
    obj_to_f32(op.operands.get(idx)?)
}

fn op_f32s<const N: usize>(op: &Operation) -> Option<[f32; N]> {
    if op.operands.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = op_f32(op, i)?;
    }
    Some(out)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Finds a page attribute on the page or the nearest ancestor that has it.
fn page_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut id = page_id;
    for _ in 0..32 {
        let dict = doc.get_object(id).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn page_size(doc: &Document, page_id: ObjectId) -> Size {
    page_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .filter(|arr| arr.len() >= 4)
        .and_then(|arr| {
            let [x0, y0, x1, y1] = [&arr[0], &arr[1], &arr[2], &arr[3]].map(obj_to_f32);
            Some(Size::new((x1? - x0?).abs().max(1.0), (y1? - y0?).abs().max(1.0)))
        })
        .unwrap_or_else(Size::a4)
}

/// Resolves the page's font resources to the way their text is drawn.
fn page_fonts(doc: &Document, page_id: ObjectId, programs: &mut FontPrograms) -> HashMap<Vec<u8>, PageFont> {
    let fonts: Option<&Dictionary> = page_attribute(doc, page_id, b"Resources")
        .and_then(|res| res.as_dict().ok())
        .and_then(|res| res.get(b"Font").ok())
        .and_then(|f| resolve(doc, f))
        .and_then(|f| f.as_dict().ok());

    let mut faces = HashMap::new();
    for (name, font) in fonts.into_iter().flat_map(Dictionary::iter) {
        let Some(font) = resolve(doc, font).and_then(|f| f.as_dict().ok()) else { continue };
        let page_font = if font.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Type0".as_slice()) {
            match embedded_program(doc, font, programs) {
                Some(program) => PageFont::Embedded(program),
                None => PageFont::Unavailable,
            }
        } else {
            let bold = font
                .get(b"BaseFont")
                .and_then(Object::as_name)
                .is_ok_and(|base| base.windows(4).any(|w| w == b"Bold"));
            PageFont::Simple(if bold { Font::Bold } else { Font::Regular })
        };
        faces.insert(name.clone(), page_font);
    }
    faces
}

/// The `FontFile2` program of a composite font's descendant.
fn embedded_program(doc: &Document, font: &Dictionary, programs: &mut FontPrograms) -> Option<Arc<FontFace>> {
    let descendant = font.get(b"DescendantFonts").ok()?.as_array().ok()?.first()?;
    let descendant = resolve(doc, descendant)?.as_dict().ok()?;
    let descriptor = resolve(doc, descendant.get(b"FontDescriptor").ok()?)?.as_dict().ok()?;
    let file_id = descriptor.get(b"FontFile2").and_then(Object::as_reference).ok()?;

    programs
        .entry(file_id)
        .or_insert_with(|| {
            let data = doc.get_object(file_id).and_then(Object::as_stream).ok()?.get_plain_content().ok()?;
            FontFace::from_data(Arc::new(data), 0)
                .inspect_err(|e| log::warn!("[PREVIEW] Embedded font {:?} is unusable: {}", file_id, e))
                .ok()
                .map(Arc::new)
        })
        .clone()
}
