use crate::fonts::{text_string, FontUsage};
use crate::helpers::render_page_content;
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use quire_layout::{BlockTemplate, FooterRepeat, LayoutEngine};
use quire_pdf_composer::{stamp_page_numbers, PageNumberStyle};
use quire_render_core::{Chunk, ChunkRenderer, RenderError, RenderOptions, RenderedDocument};

/// Renders a chunk of records into a standalone PDF with lopdf.
///
/// Text is drawn with the layout engine's font library, and every face a
/// chunk uses is embedded in that chunk's document.
#[derive(Debug, Clone, Default)]
pub struct LopdfRenderer {
    layout_engine: LayoutEngine,
    number_style: PageNumberStyle,
}

impl LopdfRenderer {
    pub fn new(layout_engine: LayoutEngine) -> Self {
        Self { layout_engine, number_style: PageNumberStyle::default() }
    }

    pub fn with_number_style(mut self, number_style: PageNumberStyle) -> Self {
        self.number_style = number_style;
        self
    }

    pub fn layout_engine(&self) -> &LayoutEngine {
        &self.layout_engine
    }
}

impl ChunkRenderer for LopdfRenderer {
    fn render(&self, chunk: &Chunk, options: &RenderOptions) -> Result<RenderedDocument, RenderError> {
        if chunk.is_empty() {
            return Err(RenderError::Chunk { chunk: chunk.index, message: "chunk has no records".into() });
        }

        let template = BlockTemplate::new(options.view_mode);
        let footer_deferred = options.continued && self.layout_engine.policy().footer == FooterRepeat::LastPageOnly;
        let header = if footer_deferred { chunk.header.without_footer() } else { chunk.header.clone() };
        let pages = self
            .layout_engine
            .layout_records(&chunk.records, chunk.first_record, &header, &template);
        let geometry = self.layout_engine.geometry();
        log::debug!(
            "[RENDER] Chunk {} ({} records from #{}) laid out into {} pages.",
            chunk.index,
            chunk.len(),
            chunk.first_record,
            pages.len()
        );

        let fonts = self.layout_engine.fonts();
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let resources_id = doc.new_object_id();
        let mut usage = FontUsage::new();

        let mut kids = Vec::with_capacity(pages.len());
        for page in &pages {
            let content = render_page_content(page, geometry, fonts, &mut usage);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.0.into(), 0.0.into(), geometry.size.width.into(), geometry.size.height.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let font_resources = usage.embed(&mut doc, fonts)?;
        doc.objects.insert(resources_id, Object::Dictionary(dictionary! { "Font" => font_resources }));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let title = chunk.header.title.trim();
        let mut info = dictionary! {
            "Producer" => Object::String(b"quire".to_vec(), StringFormat::Literal),
        };
        if !title.is_empty() {
            info.set("Title", text_string(title));
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        if options.page_numbers {
            stamp_page_numbers(&mut doc, &self.number_style)
                .map_err(|e| RenderError::Pdf(e.to_string()))?;
        }

        doc.compress();
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(RenderedDocument::new(bytes, pages.len()))
    }
}
