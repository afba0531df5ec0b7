use indexmap::IndexMap;
use quire_types::DocumentId;
use std::sync::{Arc, Mutex};

/// A rasterized page, PNG encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Cache key: document, 1-based page number and scale in thousandths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub document: DocumentId,
    pub page: usize,
    scale_milli: u32,
}

impl CacheKey {
    pub fn new(document: DocumentId, page: usize, scale: f32) -> Self {
        Self { document, page, scale_milli: scale_to_milli(scale) }
    }

    pub fn scale(&self) -> f32 {
        self.scale_milli as f32 / 1000.0
    }
}

fn scale_to_milli(scale: f32) -> u32 {
    (scale.max(0.0) * 1000.0).round() as u32
}

pub type SharedPreviewCache = Arc<Mutex<PreviewCache>>;

/// Bounded page-image store shared by every open preview.
///
/// Eviction is FIFO by insertion order: reading an entry does not refresh
/// it. Re-inserting an existing key replaces the image and moves the key to
/// the back of the queue.
#[derive(Debug)]
pub struct PreviewCache {
    entries: IndexMap<CacheKey, Arc<PageImage>>,
    capacity: usize,
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::with_capacity(5)
    }
}

impl PreviewCache {
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: IndexMap::with_capacity(capacity + 1), capacity }
    }

    pub fn shared(capacity: usize) -> SharedPreviewCache {
        Arc::new(Mutex::new(Self::with_capacity(capacity)))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<PageImage>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: CacheKey, image: Arc<PageImage>) {
        self.entries.shift_remove(&key);
        self.entries.insert(key, image);
        while self.entries.len() > self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                log::trace!("[PREVIEW] Evicted {} page {} from cache.", evicted.document, evicted.page);
            }
        }
    }

    /// Drops every entry belonging to `document`. Returns the number removed.
    pub fn invalidate(&mut self, document: &DocumentId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| &key.document != document);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }
}
