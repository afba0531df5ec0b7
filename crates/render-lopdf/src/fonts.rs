//! Embedding of the faces a document actually uses.
//!
//! Every face becomes a `Type0` font with `Identity-H` encoding over a
//! `CIDFontType2` descendant whose CIDs are glyph ids. Text operands are
//! therefore two bytes per glyph. A `ToUnicode` CMap maps the glyphs back to
//! characters so text stays searchable and extractable.

use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use quire_layout::{FaceId, FontLibrary, GlyphRun};
use quire_render_core::RenderError;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Glyphs used per face while a document's pages are written.
#[derive(Debug, Default)]
pub struct FontUsage {
    faces: BTreeMap<FaceId, BTreeMap<u16, char>>,
}

impl FontUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the glyphs of `run` and returns its `Tj` operand.
    pub fn encode_run(&mut self, run: &GlyphRun) -> Object {
        let used = self.faces.entry(run.face).or_default();
        let mut bytes = Vec::with_capacity(run.glyphs.len() * 2);
        for glyph in &run.glyphs {
            // .notdef stands in for every uncovered character.
            let ch = if glyph.id == 0 { char::REPLACEMENT_CHARACTER } else { glyph.ch };
            used.entry(glyph.id).or_insert(ch);
            bytes.extend_from_slice(&glyph.id.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Adds a font object per used face and returns the `/Font` resource
    /// dictionary naming them.
    pub fn embed(&self, doc: &mut Document, fonts: &FontLibrary) -> Result<Dictionary, RenderError> {
        let mut resources = Dictionary::new();
        for (&face_id, glyphs) in &self.faces {
            let font_id = embed_face(doc, fonts, face_id, glyphs)?;
            resources.set(resource_name(face_id), font_id);
        }
        Ok(resources)
    }
}

/// Name of a face in a page's `/Font` resources.
pub fn resource_name(face: FaceId) -> Vec<u8> {
    format!("F{}", face.0).into_bytes()
}

fn embed_face(
    doc: &mut Document,
    fonts: &FontLibrary,
    face_id: FaceId,
    glyphs: &BTreeMap<u16, char>,
) -> Result<lopdf::ObjectId, RenderError> {
    let missing = || RenderError::Font(format!("face {} is not in the font library", face_id.0));
    let font = fonts.face(face_id).ok_or_else(missing)?;
    let face = font
        .as_face()
        .ok_or_else(|| RenderError::Font(format!("face '{}' no longer parses", font.postscript_name())))?;

    let scale = 1000.0 / f32::from(font.units_per_em());
    let units = |v: i16| (f32::from(v) * scale).round() as i64;
    let base_font = Object::Name(font.postscript_name().as_bytes().to_vec());

    let file_id = doc.add_object(Stream::new(
        dictionary! { "Length1" => font.data().len() as i64 },
        font.data().to_vec(),
    ));

    let bbox = face.global_bounding_box();
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.clone(),
        "Flags" => 32,
        "FontBBox" => vec![
            units(bbox.x_min).into(),
            units(bbox.y_min).into(),
            units(bbox.x_max).into(),
            units(bbox.y_max).into(),
        ],
        "ItalicAngle" => 0,
        "Ascent" => units(face.ascender()),
        "Descent" => units(face.descender()),
        "CapHeight" => units(face.capital_height().unwrap_or_else(|| face.ascender())),
        "StemV" => 80,
        "FontFile2" => file_id,
    });

    let mut widths = Vec::with_capacity(glyphs.len() * 2);
    for &gid in glyphs.keys() {
        let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
        widths.push(Object::Integer(i64::from(gid)));
        widths.push(Object::Array(vec![Object::Integer((f32::from(advance) * scale).round() as i64)]));
    }
    let notdef = (f32::from(face.glyph_hor_advance(ttf_parser::GlyphId(0)).unwrap_or(0)) * scale).round() as i64;

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_font.clone(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => notdef,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });
    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, to_unicode_cmap(glyphs).into_bytes()));

    log::debug!(
        "[RENDER] Embedding '{}' with {} used glyphs.",
        font.postscript_name(),
        glyphs.len()
    );
    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![cid_font_id.into()],
        "ToUnicode" => to_unicode_id,
    }))
}

/// `ToUnicode` CMap for two-byte glyph codes, in blocks of at most 100
/// `bfchar` entries.
fn to_unicode_cmap(glyphs: &BTreeMap<u16, char>) -> String {
    let mut out = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    let entries: Vec<(&u16, &char)> = glyphs.iter().collect();
    for block in entries.chunks(100) {
        let _ = writeln!(out, "{} beginbfchar", block.len());
        for (gid, ch) in block {
            let mut utf16 = [0u16; 2];
            let target: String = ch.encode_utf16(&mut utf16).iter().map(|unit| format!("{:04X}", unit)).collect();
            let _ = writeln!(out, "<{:04X}> <{}>", gid, target);
        }
        out.push_str("endbfchar\n");
    }
    out.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    out
}

/// A PDF text string: plain bytes for ASCII, UTF-16BE with a byte order
/// mark otherwise.
pub fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::String(s.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
