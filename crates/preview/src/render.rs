use crate::cache::{CacheKey, PageImage, PreviewCache};
use crate::error::PreviewError;
use crate::raster::PageRasterizer;
use quire_types::{CancellationToken, DocumentId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub(crate) fn lock(cache: &Mutex<PreviewCache>) -> MutexGuard<'_, PreviewCache> {
    // A panic mid-insert leaves the map consistent, so a poisoned lock is
    // still usable.
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Produces one image per page of `pdf` at `scale`.
///
/// Each page is looked up in `cache` under `(document, page, scale)` first;
/// misses are rasterized and inserted in page order, evicting the oldest
/// entries once the cache is full. The cache lock is only held for lookups
/// and inserts, never while rasterizing.
pub fn render_to_images(
    cache: &Mutex<PreviewCache>,
    rasterizer: &dyn PageRasterizer,
    pdf: &[u8],
    scale: f32,
    document: &DocumentId,
) -> Result<Vec<Arc<PageImage>>, PreviewError> {
    let total = rasterizer.page_count(pdf)?;
    if total == 0 {
        return Err(PreviewError::NoPages);
    }
    render_pages(cache, rasterizer, pdf, &(1..=total).collect::<Vec<_>>(), scale, document, None)
}

/// Like [`render_to_images`], but stops with [`PreviewError::Cancelled`] once
/// `cancel` fires. Nothing is inserted into the cache after cancellation.
pub fn render_to_images_until(
    cache: &Mutex<PreviewCache>,
    rasterizer: &dyn PageRasterizer,
    pdf: &[u8],
    scale: f32,
    document: &DocumentId,
    cancel: &CancellationToken,
) -> Result<Vec<Arc<PageImage>>, PreviewError> {
    let total = rasterizer.page_count(pdf)?;
    if total == 0 {
        return Err(PreviewError::NoPages);
    }
    render_pages(cache, rasterizer, pdf, &(1..=total).collect::<Vec<_>>(), scale, document, Some(cancel))
}

/// Single-page variant of [`render_to_images`].
pub fn render_page_image(
    cache: &Mutex<PreviewCache>,
    rasterizer: &dyn PageRasterizer,
    pdf: &[u8],
    page: usize,
    scale: f32,
    document: &DocumentId,
) -> Result<Arc<PageImage>, PreviewError> {
    let mut images = render_pages(cache, rasterizer, pdf, &[page], scale, document, None)?;
    images.pop().ok_or(PreviewError::NoPages)
}

fn render_pages(
    cache: &Mutex<PreviewCache>,
    rasterizer: &dyn PageRasterizer,
    pdf: &[u8],
    pages: &[usize],
    scale: f32,
    document: &DocumentId,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<Arc<PageImage>>, PreviewError> {
    let cancelled = || cancel.is_some_and(CancellationToken::is_cancelled);
    let mut slots: Vec<Option<Arc<PageImage>>> = {
        let cache = lock(cache);
        pages
            .iter()
            .map(|&page| cache.get(&CacheKey::new(document.clone(), page, scale)))
            .collect()
    };

    let missing: Vec<usize> = pages
        .iter()
        .zip(&slots)
        .filter(|(_, slot)| slot.is_none())
        .map(|(&page, _)| page)
        .collect();
    log::debug!(
        "[PREVIEW] {}: {} of {} pages cached at scale {}.",
        document,
        pages.len() - missing.len(),
        pages.len(),
        scale
    );
    if missing.is_empty() {
        return Ok(slots.into_iter().flatten().collect());
    }

    if cancelled() {
        return Err(PreviewError::Cancelled);
    }
    let rendered = rasterizer.render_pages(pdf, &missing, scale)?;
    if rendered.len() != missing.len() {
        return Err(PreviewError::Raster(format!(
            "rasterizer returned {} images for {} pages",
            rendered.len(),
            missing.len()
        )));
    }

    let mut rendered = missing.into_iter().zip(rendered.into_iter().map(Arc::new));
    let mut cache = lock(cache);
    // Checked under the lock: an invalidation that follows a cancel can never
    // be overtaken by this insert.
    if cancelled() {
        return Err(PreviewError::Cancelled);
    }
    for (slot, &page) in slots.iter_mut().zip(pages) {
        if slot.is_none() {
            if let Some((rendered_page, image)) = rendered.next() {
                debug_assert_eq!(rendered_page, page);
                cache.insert(CacheKey::new(document.clone(), page, scale), image.clone());
                *slot = Some(image);
            }
        }
    }
    Ok(slots.into_iter().flatten().collect())
}


#[cfg(test)]
mod tests {
    use super::test_support::CountingRasterizer;
    use super::*;

    #[test]
    fn six_pages_into_five_slots_evicts_page_one() {
        let cache = Mutex::new(PreviewCache::with_capacity(5));
        let rasterizer = CountingRasterizer::default();
        let doc = DocumentId::from("A");

        let images = render_to_images(&cache, &rasterizer, &[6], 2.0, &doc).unwrap();
        assert_eq!(images.len(), 6);
        assert_eq!(lock(&cache).len(), 5);
        assert!(!lock(&cache).contains(&CacheKey::new(doc.clone(), 1, 2.0)));

        let again = render_page_image(&cache, &rasterizer, &[6], 1, 2.0, &doc).unwrap();
        assert_eq!(again.png, vec![1]);
        assert_eq!(rasterizer.renders_of(1), 2);
        assert_eq!(lock(&cache).len(), 5);
    }

    #[test]
    fn cached_pages_are_not_rasterized_again() {
        let cache = Mutex::new(PreviewCache::with_capacity(5));
        let rasterizer = CountingRasterizer::default();
        let doc = DocumentId::from("A");

        render_to_images(&cache, &rasterizer, &[3], 1.5, &doc).unwrap();
        let images = render_to_images(&cache, &rasterizer, &[3], 1.5, &doc).unwrap();
        assert_eq!(images.iter().map(|i| i.png[0]).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(rasterizer.renders_of(2), 1);

        // A different scale is a different entry.
        render_page_image(&cache, &rasterizer, &[3], 2, 3.0, &doc).unwrap();
        assert_eq!(rasterizer.renders_of(2), 2);
    }

    #[test]
    fn cancelled_render_inserts_nothing() {
        let cache = Mutex::new(PreviewCache::default());
        let token = CancellationToken::new();
        token.cancel();
        let result = render_to_images_until(&cache, &CountingRasterizer::default(), &[2], 1.0, &DocumentId::from("A"), &token);
        assert_eq!(result.unwrap_err(), PreviewError::Cancelled);
        assert!(lock(&cache).is_empty());
    }

    #[test]
    fn empty_document_is_reported() {
        let cache = Mutex::new(PreviewCache::default());
        let err = render_to_images(&cache, &CountingRasterizer::default(), &[0], 1.0, &DocumentId::from("A"));
        assert_eq!(err.unwrap_err(), PreviewError::NoPages);
    }
}
