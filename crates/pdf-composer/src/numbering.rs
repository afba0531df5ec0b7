use crate::{inherited_attribute, overlay_content, ComposerError};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};

/// Font resource name used for stamped page numbers. It cannot clash with
/// the `F<n>` names of embedded faces.
const NUMBER_FONT: &str = "QPN";

/// Helvetica advance widths (1/1000 em) of the glyphs a page label can contain.
fn label_glyph_width(ch: char) -> f32 {
    match ch {
        '0'..='9' => 556.0,
        '/' | ' ' => 278.0,
        _ => 556.0,
    }
}

/// Placement and appearance of the "k / T" page annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageNumberStyle {
    pub font_size: f32,
    /// Distance from the right page edge to the end of the label.
    pub right_offset: f32,
    /// Distance from the bottom page edge to the text baseline.
    pub bottom_offset: f32,
    /// RGB fill in 0..=1.
    pub color: [f32; 3],
}

impl Default for PageNumberStyle {
    fn default() -> Self {
        Self { font_size: 9.0, right_offset: 40.0, bottom_offset: 20.0, color: [0.4, 0.4, 0.4] }
    }
}

impl PageNumberStyle {
    pub fn label_width(&self, label: &str) -> f32 {
        label.chars().map(label_glyph_width).sum::<f32>() * self.font_size / 1000.0
    }
}

/// Stamps "k / T" on every page of `doc`, where T is the document's page count.
///
/// Returns the number of pages annotated.
pub fn stamp_page_numbers(doc: &mut Document, style: &PageNumberStyle) -> Result<usize, ComposerError> {
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let total = pages.len();
    if total == 0 {
        return Ok(0);
    }

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    for (i, page_id) in pages.iter().enumerate() {
        let label = format!("{} / {}", i + 1, total);
        let page_width = media_box_width(doc, *page_id)?;
        ensure_font_resource(doc, *page_id, font_id)?;

        let x = page_width - style.right_offset - style.label_width(&label);
        let [r, g, b] = style.color;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![NUMBER_FONT.into(), style.font_size.into()]),
                Operation::new("rg", vec![r.into(), g.into(), b.into()]),
                Operation::new("Td", vec![x.into(), style.bottom_offset.into()]),
                Operation::new("Tj", vec![Object::String(label.into_bytes(), StringFormat::Literal)]),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        };
        overlay_content(doc, *page_id, content.encode()?)?;
    }

    log::debug!("[COMPOSER] Stamped page numbers on {} pages.", total);
    Ok(total)
}

fn page_dict(doc: &Document, page_id: ObjectId) -> Result<&Dictionary, ComposerError> {
    Ok(doc.get_object(page_id)?.as_dict()?)
}

/// Resolves a page attribute set on the page itself or inherited from the tree.
fn page_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>, ComposerError> {
    let page = page_dict(doc, page_id)?;
    Ok(match page.get(key) {
        Ok(value) => Some(value.clone()),
        Err(_) => inherited_attribute(doc, page, key),
    })
}

fn resolve(doc: &Document, obj: Object) -> Result<Object, ComposerError> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(id)?.clone()),
        other => Ok(other),
    }
}

fn media_box_width(doc: &Document, page_id: ObjectId) -> Result<f32, ComposerError> {
    let media_box = page_attribute(doc, page_id, b"MediaBox")?
        .ok_or_else(|| ComposerError::Other(format!("Page {:?} has no MediaBox", page_id)))?;
    let media_box = resolve(doc, media_box)?;
    let values = media_box.as_array()?;
    if values.len() != 4 {
        return Err(ComposerError::Other(format!("Page {:?} has a malformed MediaBox", page_id)));
    }
    Ok(values[2].as_float()? - values[0].as_float()?)
}

/// Gives the page an inline `/Resources` dictionary containing the number font.
///
/// Resources may be shared between pages, so they are copied onto the page
/// rather than edited in place.
fn ensure_font_resource(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<(), ComposerError> {
    let mut resources = match page_attribute(doc, page_id, b"Resources")? {
        Some(obj) => resolve(doc, obj)?.as_dict()?.clone(),
        None => Dictionary::new(),
    };
    let mut fonts = match resources.get(b"Font") {
        Ok(obj) => resolve(doc, obj.clone())?.as_dict()?.clone(),
        Err(_) => Dictionary::new(),
    };
    fonts.set(NUMBER_FONT, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}
