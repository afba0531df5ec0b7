//! Font faces used for measuring and drawing text.
//!
//! [`FontLibrary`] holds a fallback chain per [`Font`]: the bundled DejaVu
//! face first, then any faces added with [`FontLibrary::with_fallback`] or
//! found by [`FontLibrary::with_system_fallbacks`]. Each character is set in
//! the first face of the chain that has a glyph for it, so a line can be
//! split into several [`GlyphRun`]s. Layout and the PDF writer resolve runs
//! through the same library, so measured widths are the widths drawn.

use crate::style::Font;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use ttf_parser::{name_id, Face, GlyphId};

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
static DEJAVU_SANS_BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// Installed families tried by [`FontLibrary::with_system_fallbacks`], in order.
/// The bundled faces cover Latin, Greek and Cyrillic; these add Hangul and
/// CJK ideographs where the host has them installed.
pub const SYSTEM_FALLBACK_FAMILIES: &[&str] = &[
    "Noto Sans CJK KR",
    "Noto Sans KR",
    "Source Han Sans K",
    "NanumGothic",
    "Malgun Gothic",
    "Apple SD Gothic Neo",
    "Noto Sans CJK JP",
    "Noto Sans CJK SC",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    #[error("Font data could not be parsed: {0}")]
    Parse(String),
}

/// A parsed font program. The raw data is shared, so clones are cheap.
#[derive(Clone)]
pub struct FontFace {
    data: Arc<Vec<u8>>,
    index: u32,
    postscript_name: String,
    units_per_em: u16,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("postscript_name", &self.postscript_name)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FontFace {
    /// Validates `data` as a TrueType/OpenType face and reads its names.
    pub fn from_data(data: Arc<Vec<u8>>, index: u32) -> Result<Self, FontError> {
        let face = Face::parse(&data, index).map_err(|e| FontError::Parse(e.to_string()))?;
        let postscript_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME && name.is_unicode())
            .find_map(|name| name.to_string())
            .map(|name| name.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect::<String>())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("QuireFace{}", index));
        let units_per_em = face.units_per_em().max(1);
        Ok(Self { data, index, postscript_name, units_per_em })
    }

    /// A lightweight [`Face`] view over the data. Parsing only reads the
    /// table directory, so this is called per measurement instead of
    /// keeping a self-referential parsed face around.
    pub fn as_face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.index).ok()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }
}

/// Index of a face inside one [`FontLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub usize);

/// A glyph with the character it was chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub id: u16,
    pub ch: char,
    /// Horizontal advance in font units.
    pub advance: u16,
}

/// Consecutive characters set in the same face.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub face: FaceId,
    pub glyphs: Vec<Glyph>,
    /// Advance of the whole run in points.
    pub width: f32,
}

#[derive(Clone)]
struct Chains {
    faces: Vec<Arc<FontFace>>,
    regular: Vec<FaceId>,
    bold: Vec<FaceId>,
}

/// Shared, immutable set of faces with a fallback chain per [`Font`].
#[derive(Clone)]
pub struct FontLibrary {
    inner: Arc<Chains>,
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.faces.iter().map(|face| face.postscript_name()))
            .finish()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FontLibrary {
    /// The bundled DejaVu Sans regular and bold faces.
    pub fn builtin() -> Self {
        static BUILTIN: OnceLock<FontLibrary> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let mut chains = Chains { faces: Vec::new(), regular: Vec::new(), bold: Vec::new() };
                for (bytes, font) in [(DEJAVU_SANS, Font::Regular), (DEJAVU_SANS_BOLD, Font::Bold)] {
                    match FontFace::from_data(Arc::new(bytes.to_vec()), 0) {
                        Ok(face) => {
                            let id = FaceId(chains.faces.len());
                            chains.faces.push(Arc::new(face));
                            match font {
                                Font::Regular => chains.regular.push(id),
                                Font::Bold => chains.bold.push(id),
                            }
                        }
                        Err(e) => log::error!("Bundled font for {:?} is unusable: {}", font, e),
                    }
                }
                // A bold line still renders if only the regular face loaded.
                let regular = chains.regular.clone();
                chains.bold.extend(regular);
                FontLibrary { inner: Arc::new(chains) }
            })
            .clone()
    }

    /// Appends `face` to the end of both fallback chains.
    pub fn with_fallback(self, face: FontFace) -> Self {
        let mut chains = (*self.inner).clone();
        let id = FaceId(chains.faces.len());
        log::debug!("Adding fallback font '{}' as {:?}.", face.postscript_name(), id);
        chains.faces.push(Arc::new(face));
        chains.regular.push(id);
        chains.bold.push(id);
        Self { inner: Arc::new(chains) }
    }

    /// Appends the first installed face of each family in
    /// [`SYSTEM_FALLBACK_FAMILIES`] that the library does not already hold.
    #[cfg(feature = "system-fonts")]
    pub fn with_system_fallbacks(self) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        log::debug!("Scanned {} system font faces.", db.len());

        let mut library = self;
        for &family in SYSTEM_FALLBACK_FAMILIES {
            let query = fontdb::Query {
                families: &[fontdb::Family::Name(family)],
                ..fontdb::Query::default()
            };
            let Some(id) = db.query(&query) else { continue };
            let loaded = db.with_face_data(id, |data, index| FontFace::from_data(Arc::new(data.to_vec()), index));
            match loaded {
                Some(Ok(face)) if !library.contains(face.postscript_name()) => {
                    library = library.with_fallback(face);
                }
                Some(Err(e)) => log::warn!("System font '{}' could not be loaded: {}", family, e),
                _ => {}
            }
        }
        library
    }

    /// Without the `system-fonts` feature there is nothing to scan.
    #[cfg(not(feature = "system-fonts"))]
    pub fn with_system_fallbacks(self) -> Self {
        log::warn!("Built without the `system-fonts` feature; using bundled fonts only.");
        self
    }

    #[cfg(feature = "system-fonts")]
    fn contains(&self, postscript_name: &str) -> bool {
        self.inner.faces.iter().any(|f| f.postscript_name() == postscript_name)
    }

    pub fn face(&self, id: FaceId) -> Option<&FontFace> {
        self.inner.faces.get(id.0).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.inner.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.faces.is_empty()
    }

    fn chain(&self, font: Font) -> &[FaceId] {
        match font {
            Font::Regular => &self.inner.regular,
            Font::Bold => &self.inner.bold,
        }
    }

    /// Splits `text` into runs of glyphs from the fallback chain of `font`.
    ///
    /// A character no face covers is set as the primary face's `.notdef`
    /// glyph, so it still occupies its advance on the page.
    pub fn runs(&self, text: &str, font: Font, size: f32) -> Vec<GlyphRun> {
        let chain: Vec<(FaceId, Face<'_>, f32)> = self
            .chain(font)
            .iter()
            .filter_map(|&id| {
                let face = self.face(id)?;
                Some((id, face.as_face()?, size / f32::from(face.units_per_em())))
            })
            .collect();
        let Some((primary_id, primary, primary_scale)) = chain.first() else {
            return Vec::new();
        };

        let mut runs: Vec<GlyphRun> = Vec::new();
        for ch in text.chars() {
            let (face_id, glyph_id, advance, scale) = chain
                .iter()
                .find_map(|(id, face, scale)| {
                    let glyph = face.glyph_index(ch).filter(|g| g.0 != 0)?;
                    Some((*id, glyph, face.glyph_hor_advance(glyph).unwrap_or(0), *scale))
                })
                .unwrap_or_else(|| {
                    let advance = primary.glyph_hor_advance(GlyphId(0)).unwrap_or(0);
                    (*primary_id, GlyphId(0), advance, *primary_scale)
                });

            let glyph = Glyph { id: glyph_id.0, ch, advance };
            let width = f32::from(advance) * scale;
            match runs.last_mut() {
                Some(run) if run.face == face_id => {
                    run.glyphs.push(glyph);
                    run.width += width;
                }
                _ => runs.push(GlyphRun { face: face_id, glyphs: vec![glyph], width }),
            }
        }
        runs
    }

    /// Width of `text` in points at `size`.
    pub fn width(&self, text: &str, font: Font, size: f32) -> f32 {
        self.runs(text, font, size).iter().map(|run| run.width).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_faces_have_names_and_metrics() {
        let fonts = FontLibrary::builtin();
        assert_eq!(fonts.len(), 2);
        let regular = fonts.face(FaceId(0)).unwrap();
        assert_eq!(regular.postscript_name(), "DejaVuSans");
        assert_eq!(regular.units_per_em(), 2048);
        assert_eq!(fonts.face(FaceId(1)).unwrap().postscript_name(), "DejaVuSans-Bold");
    }

    #[test]
    fn latin_and_cyrillic_resolve_in_the_primary_face() {
        let fonts = FontLibrary::builtin();
        let runs = fonts.runs("word слово", Font::Regular, 10.0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].face, FaceId(0));
        assert!(runs[0].glyphs.iter().all(|g| g.id != 0));
        assert_eq!(runs[0].glyphs.len(), 10);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let fonts = FontLibrary::builtin();
        let regular = fonts.width("Vocabulary", Font::Regular, 12.0);
        let bold = fonts.width("Vocabulary", Font::Bold, 12.0);
        assert!(regular > 0.0);
        assert!(bold > regular);
    }

    #[test]
    fn width_scales_linearly_with_size() {
        let fonts = FontLibrary::builtin();
        let small = fonts.width("Hello", Font::Regular, 10.0);
        let large = fonts.width("Hello", Font::Regular, 20.0);
        assert!((large - 2.0 * small).abs() < 0.001);
    }

    #[test]
    fn uncovered_characters_fall_back_to_notdef_with_an_advance() {
        let fonts = FontLibrary::builtin();
        // Hangul is not in DejaVu Sans.
        let runs = fonts.runs("사과", Font::Regular, 12.0);
        let glyphs: Vec<_> = runs.iter().flat_map(|r| r.glyphs.iter()).collect();
        assert_eq!(glyphs.len(), 2);
        assert!(glyphs.iter().all(|g| g.id == 0 && g.advance > 0));
        assert_eq!(glyphs[0].ch, '사');
    }

    #[test]
    fn fallback_faces_extend_both_chains() {
        let extra = FontFace::from_data(Arc::new(DEJAVU_SANS.to_vec()), 0).unwrap();
        let fonts = FontLibrary::builtin().with_fallback(extra);
        assert_eq!(fonts.len(), 3);
        assert_eq!(fonts.chain(Font::Regular).last(), Some(&FaceId(2)));
        assert_eq!(fonts.chain(Font::Bold).last(), Some(&FaceId(2)));
        // The builtin library itself is untouched.
        assert_eq!(FontLibrary::builtin().len(), 2);
    }

    #[test]
    fn garbage_is_not_a_font() {
        assert!(matches!(
            FontFace::from_data(Arc::new(b"not a font".to_vec()), 0),
            Err(FontError::Parse(_))
        ));
    }
}
