use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Copies objects from one document into another, renumbering references.
///
/// The id map persists across calls, so objects shared between pages (fonts,
/// resource dictionaries) land in the target only once.
pub(crate) struct Transplant<'a> {
    from: &'a Document,
    into: &'a mut Document,
    ids: HashMap<ObjectId, ObjectId>,
}

impl<'a> Transplant<'a> {
    pub(crate) fn new(from: &'a Document, into: &'a mut Document) -> Self {
        Self { from, into, ids: HashMap::new() }
    }

    /// Copies a page without its source `/Parent`, giving it `parent` instead.
    pub(crate) fn page(&mut self, id: ObjectId, parent: ObjectId) -> Result<ObjectId, lopdf::Error> {
        let mut page = self.from.get_dictionary(id)?.clone();
        for key in INHERITABLE {
            if page.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(self.from, &page, key) {
                page.set(key, value);
            }
        }
        page.remove(b"Parent");

        let new_id = self.reserve(id);
        let mut page = self.rewrite_dict(page)?;
        page.set("Parent", parent);
        self.into.objects.insert(new_id, Object::Dictionary(page));
        Ok(new_id)
    }

    fn object(&mut self, id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(&copied) = self.ids.get(&id) {
            return Ok(copied);
        }
        // Registered before descending so cycles resolve to this id.
        let new_id = self.reserve(id);
        let source = self.from.get_object(id)?.clone();
        let object = self.rewrite(source)?;
        self.into.objects.insert(new_id, object);
        Ok(new_id)
    }

    fn reserve(&mut self, id: ObjectId) -> ObjectId {
        let new_id = self.into.add_object(Object::Null);
        self.ids.insert(id, new_id);
        new_id
    }

    fn rewrite(&mut self, object: Object) -> Result<Object, lopdf::Error> {
        Ok(match object {
            Object::Reference(id) => Object::Reference(self.object(id)?),
            Object::Array(items) => {
                Object::Array(items.into_iter().map(|o| self.rewrite(o)).collect::<Result<_, _>>()?)
            }
            Object::Dictionary(dict) => Object::Dictionary(self.rewrite_dict(dict)?),
            Object::Stream(mut stream) => {
                stream.dict = self.rewrite_dict(stream.dict)?;
                Object::Stream(stream)
            }
            other => other,
        })
    }

    fn rewrite_dict(&mut self, mut dict: Dictionary) -> Result<Dictionary, lopdf::Error> {
        for (_, value) in dict.iter_mut() {
            let taken = std::mem::replace(value, Object::Null);
            *value = self.rewrite(taken)?;
        }
        Ok(dict)
    }
}

/// Walks `/Parent` links looking for an inherited page attribute.
pub(crate) fn inherited_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    // Bounded so a malformed cyclic tree cannot loop forever.
    for _ in 0..32 {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::labelled_document;

    #[test]
    fn shared_objects_are_copied_once() {
        let source = labelled_document(3, "Shared");
        let mut target = labelled_document(1, "Target");
        let before = target.objects.len();
        let pages: Vec<ObjectId> = source.get_pages().into_values().collect();
        let parent = (999, 0);

        let mut transplant = Transplant::new(&source, &mut target);
        for id in &pages {
            transplant.page(*id, parent).unwrap();
        }

        // 3 pages + 3 content streams + 1 resource dictionary + 1 font.
        assert_eq!(target.objects.len() - before, 8);
    }

    #[test]
    fn inherited_attributes_are_found_on_ancestors() {
        let doc = labelled_document(1, "Page");
        let page = doc.get_dictionary(doc.get_pages()[&1]).unwrap();
        assert!(inherited_attribute(&doc, page, b"MediaBox").is_some());
        assert!(inherited_attribute(&doc, page, b"Rotate").is_none());
    }
}
