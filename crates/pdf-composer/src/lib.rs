//! Combines independently rendered PDF documents into one and annotates
//! the result.
//!
//! Chunks are rendered as standalone documents. [`DocumentMerger`] folds
//! them together one at a time with [`merge_documents`], and
//! [`stamp_page_numbers`] labels the finished page sequence.

mod error;
mod merger;
mod numbering;
mod transplant;

pub use error::ComposerError;
pub use merger::{merge_all, DocumentMerger, MergedDocument};
pub use numbering::{stamp_page_numbers, PageNumberStyle};

use lopdf::{Document, Object, ObjectId, Stream};
use transplant::Transplant;

pub(crate) use transplant::inherited_attribute;

/// Moves every page of `source` into `target`, after its existing pages or,
/// with `prepend`, before them.
///
/// Objects the pages reach are copied once each under new ids. Attributes a
/// page inherited from the source tree are written onto the page, which is
/// then parented to `target`'s root page node. Returns how many pages moved.
pub fn merge_documents(target: &mut Document, source: Document, prepend: bool) -> Result<usize, ComposerError> {
    let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    if source_pages.is_empty() {
        return Ok(0);
    }

    let root = pages_root(target)?;
    let moved = {
        let mut transplant = Transplant::new(&source, target);
        source_pages
            .iter()
            .map(|&id| transplant.page(id, root))
            .collect::<Result<Vec<_>, _>>()?
    };

    let node = target.get_object_mut(root)?.as_dict_mut()?;
    let count = node.get(b"Count")?.as_i64()?;
    let existing = node.get(b"Kids")?.as_array()?;
    let added = moved.iter().map(|&id| Object::Reference(id));
    let kids: Vec<Object> = if prepend {
        added.chain(existing.iter().cloned()).collect()
    } else {
        existing.iter().cloned().chain(added).collect()
    };
    node.set("Kids", kids);
    node.set("Count", count + moved.len() as i64);

    Ok(moved.len())
}

/// Draws `content` over a page by appending it to the page's `/Contents`.
pub fn overlay_content(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) -> Result<(), ComposerError> {
    let stream_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), content));
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;

    let mut contents = match page.get(b"Contents") {
        Ok(Object::Array(streams)) => streams.clone(),
        Ok(stream) => vec![stream.clone()],
        Err(_) => return Err(ComposerError::Other(format!("Page {:?} has no /Contents", page_id))),
    };
    contents.push(Object::Reference(stream_id));
    page.set("Contents", contents);
    Ok(())
}

fn pages_root(doc: &Document) -> Result<ObjectId, ComposerError> {
    let catalog = doc.trailer.get(b"Root")?.as_reference()?;
    Ok(doc.get_dictionary(catalog)?.get(b"Pages")?.as_reference()?)
}


#[cfg(test)]
mod tests {
    use super::test_support::{labelled_document, page_content};
    use super::*;

    #[test]
    fn appended_pages_follow_the_existing_ones() {
        let mut doc = labelled_document(2, "Chunk A");
        assert_eq!(merge_documents(&mut doc, labelled_document(3, "Chunk B"), false).unwrap(), 3);

        let order: Vec<String> = (1..=5).map(|n| page_content(&doc, n)).collect();
        assert!(order[1].contains("(Chunk A 2)"));
        assert!(order[2].contains("(Chunk B 1)"));
        assert!(order[4].contains("(Chunk B 3)"));
        let root = doc.get_dictionary(pages_root(&doc).unwrap()).unwrap();
        assert_eq!(root.get(b"Count").unwrap().as_i64().unwrap(), 5);
    }

    #[test]
    fn prepended_pages_come_first() {
        let mut doc = labelled_document(1, "Body");
        merge_documents(&mut doc, labelled_document(2, "Cover"), true).unwrap();

        assert!(page_content(&doc, 1).contains("(Cover 1)"));
        assert!(page_content(&doc, 3).contains("(Body 1)"));
    }

    #[test]
    fn moved_pages_hang_off_the_target_tree() {
        let mut doc = labelled_document(1, "Target");
        merge_documents(&mut doc, labelled_document(2, "Source"), false).unwrap();

        let root = pages_root(&doc).unwrap();
        for id in doc.get_pages().values() {
            let page = doc.get_dictionary(*id).unwrap();
            assert_eq!(page.get(b"Parent").unwrap().as_reference().unwrap(), root);
        }
        let moved = doc.get_dictionary(doc.get_pages()[&3]).unwrap();
        assert!(moved.has(b"MediaBox") && moved.has(b"Resources"));
    }

    #[test]
    fn an_empty_source_moves_nothing() {
        let mut doc = labelled_document(2, "Target");
        assert_eq!(merge_documents(&mut doc, labelled_document(0, "None"), false).unwrap(), 0);
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn overlay_draws_after_the_original_content() {
        let mut doc = labelled_document(1, "Base");
        let page = doc.get_pages()[&1];
        overlay_content(&mut doc, page, b"BT /L 8 Tf 10 10 Td (Stamp) Tj ET".to_vec()).unwrap();

        let contents = doc.get_dictionary(page).unwrap().get(b"Contents").unwrap().as_array().unwrap().len();
        assert_eq!(contents, 2);
        let text = page_content(&doc, 1);
        assert!(text.find("(Base 1)").unwrap() < text.find("(Stamp)").unwrap());
    }

    #[test]
    fn overlay_needs_existing_contents() {
        let mut doc = labelled_document(1, "Base");
        let page = doc.get_pages()[&1];
        doc.get_dictionary_mut(page).unwrap().remove(b"Contents");
        assert!(overlay_content(&mut doc, page, Vec::new()).is_err());
    }
}
