//! The preview render state machine.
//!
//! ```text
//! Idle ──update──▶ Rendering ──▶ Ready
//!                     ▲    └───▶ Error
//!                     └── update / retry (from Ready or Error)
//! ```
//!
//! Every definition change cancels the in-flight render and starts a new
//! debounce window. A render whose token was cancelled never publishes a
//! state, so a slow stale render cannot overwrite a newer one.

use crate::cache::{PageImage, SharedPreviewCache};
use crate::config::PreviewConfig;
use crate::error::PreviewError;
use crate::raster::PageRasterizer;
use crate::render::{lock as lock_cache, render_to_images_until};
use quire_render_core::{Chunk, ChunkRenderer, RenderOptions};
use quire_types::{CancellationToken, ContentRecord, DocumentId, HeaderInfo, ViewMode};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

pub type PreviewPages = Arc<[Arc<PageImage>]>;

/// Everything that determines what a preview shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDefinition {
    pub records: Vec<ContentRecord>,
    pub header: HeaderInfo,
    pub view_mode: ViewMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    Idle,
    Rendering,
    Ready { pages: PreviewPages },
    /// A failed render. The pages of the last successful render stay
    /// available so the preview does not go blank.
    Error { message: String, last_good: Option<PreviewPages> },
}

impl RenderState {
    /// True for `Ready` and `Error`.
    pub fn is_settled(&self) -> bool {
        matches!(self, RenderState::Ready { .. } | RenderState::Error { .. })
    }

    /// The pages to display: the current ones, or the last good ones on error.
    pub fn pages(&self) -> Option<&PreviewPages> {
        match self {
            RenderState::Ready { pages } => Some(pages),
            RenderState::Error { last_good, .. } => last_good.as_ref(),
            _ => None,
        }
    }
}

struct Inner {
    generation: u64,
    token: Option<CancellationToken>,
    definition: Option<Arc<PreviewDefinition>>,
    last_good: Option<PreviewPages>,
    scale: f32,
    shut_down: bool,
}

struct Shared {
    document: DocumentId,
    cache: SharedPreviewCache,
    renderer: Arc<dyn ChunkRenderer>,
    rasterizer: Arc<dyn PageRasterizer>,
    state: watch::Sender<RenderState>,
    inner: Mutex<Inner>,
}

impl Shared {
    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(
        self: Arc<Self>,
        generation: u64,
        token: CancellationToken,
        definition: Arc<PreviewDefinition>,
        scale: f32,
        delay: Duration,
    ) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if token.is_cancelled() {
            return;
        }

        log::debug!("[PREVIEW] Rendering {} (generation {}).", self.document, generation);
        lock_cache(&self.cache).invalidate(&self.document);

        let job = self.clone();
        let job_token = token.clone();
        let result = tokio::task::spawn_blocking(move || job.render_blocking(&definition, scale, &job_token))
            .await
            .map_err(|e| PreviewError::Task(e.to_string()))
            .and_then(|r| r);

        if token.is_cancelled() {
            log::debug!("[PREVIEW] Discarding superseded render of {}.", self.document);
            return;
        }
        self.publish(generation, result);
    }

    fn render_blocking(
        &self,
        definition: &PreviewDefinition,
        scale: f32,
        token: &CancellationToken,
    ) -> Result<PreviewPages, PreviewError> {
        if definition.records.is_empty() {
            return Ok(Arc::from(Vec::new()));
        }
        let chunk = Chunk::whole(definition.records.clone(), definition.header.clone());
        let options = RenderOptions { view_mode: definition.view_mode, page_numbers: true, continued: false };
        let rendered = self.renderer.render(&chunk, &options)?;
        if token.is_cancelled() {
            return Err(PreviewError::Cancelled);
        }
        let pages = render_to_images_until(
            &self.cache,
            self.rasterizer.as_ref(),
            rendered.bytes(),
            scale,
            &self.document,
            token,
        )?;
        Ok(pages.into())
    }

    fn publish(&self, generation: u64, result: Result<PreviewPages, PreviewError>) {
        let mut inner = self.inner();
        if inner.shut_down || inner.generation != generation {
            return;
        }
        let state = match result {
            Ok(pages) => {
                inner.last_good = Some(pages.clone());
                RenderState::Ready { pages }
            }
            Err(e) => {
                log::warn!("[PREVIEW] Render of {} failed: {}", self.document, e);
                RenderState::Error { message: e.to_string(), last_good: inner.last_good.clone() }
            }
        };
        // Sent under the lock so a concurrent update cannot interleave.
        self.state.send_replace(state);
    }
}

/// Drives the preview of one document.
///
/// Must be used from within a Tokio runtime: renders run on spawned tasks,
/// with rasterization on the blocking pool.
pub struct PreviewController {
    shared: Arc<Shared>,
    debounce: Duration,
}

impl PreviewController {
    pub fn new(
        document: DocumentId,
        renderer: Arc<dyn ChunkRenderer>,
        rasterizer: Arc<dyn PageRasterizer>,
        cache: SharedPreviewCache,
        config: PreviewConfig,
    ) -> Self {
        let (state, _) = watch::channel(RenderState::Idle);
        let inner = Inner {
            generation: 0,
            token: None,
            definition: None,
            last_good: None,
            scale: config.default_scale,
            shut_down: false,
        };
        Self {
            shared: Arc::new(Shared { document, cache, renderer, rasterizer, state, inner: Mutex::new(inner) }),
            debounce: config.debounce(),
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.shared.document
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> RenderState {
        self.shared.state.borrow().clone()
    }

    /// Records a definition change and schedules a debounced render.
    /// Returns `false` after [`shutdown`](Self::shutdown).
    pub fn update(&self, definition: PreviewDefinition) -> bool {
        self.schedule(Some(definition), None, self.debounce)
    }

    /// Changes the preview scale and re-renders the current definition.
    pub fn set_scale(&self, scale: f32) -> bool {
        self.schedule(None, Some(scale), self.debounce)
    }

    /// Re-runs the last definition immediately. Only this document's cache
    /// entries are touched. Returns `false` if there is nothing to retry.
    pub fn retry(&self) -> bool {
        self.schedule(None, None, Duration::ZERO)
    }

    /// Cancels any in-flight render, drops this document's cached pages and
    /// returns to `Idle`. Further updates are ignored.
    pub fn shutdown(&self) {
        let mut inner = self.shared.inner();
        if inner.shut_down {
            return;
        }
        inner.shut_down = true;
        inner.generation += 1;
        if let Some(token) = inner.token.take() {
            token.cancel();
        }
        let removed = lock_cache(&self.shared.cache).invalidate(&self.shared.document);
        log::debug!("[PREVIEW] Shut down {} ({} cached pages dropped).", self.shared.document, removed);
        self.shared.state.send_replace(RenderState::Idle);
    }

    fn schedule(&self, definition: Option<PreviewDefinition>, scale: Option<f32>, delay: Duration) -> bool {
        let (generation, token, definition, scale) = {
            let mut inner = self.shared.inner();
            if inner.shut_down {
                return false;
            }
            if let Some(definition) = definition {
                inner.definition = Some(Arc::new(definition));
            }
            if let Some(scale) = scale {
                inner.scale = scale;
            }
            let Some(definition) = inner.definition.clone() else {
                return false;
            };
            if let Some(previous) = inner.token.take() {
                previous.cancel();
            }
            let token = CancellationToken::new();
            inner.token = Some(token.clone());
            inner.generation += 1;
            self.shared.state.send_replace(RenderState::Rendering);
            (inner.generation, token, definition, inner.scale)
        };

        tokio::spawn(self.shared.clone().run(generation, token, definition, scale, delay));
        true
    }
}

impl Drop for PreviewController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, PreviewCache};
    use crate::render::test_support::CountingRasterizer;
    use quire_render_core::{RenderError, RenderedDocument};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;

    /// Produces fake documents with one page per record; the rasterizer
    /// stub reads the page count from the first byte.
    #[derive(Default)]
    struct StubRenderer {
        calls: AtomicUsize,
        fail: AtomicBool,
        gate: Mutex<Option<(usize, mpsc::Receiver<()>)>>,
    }

    impl StubRenderer {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Blocks the next render of a `records`-long definition until the
        /// returned sender fires.
        fn hold(&self, records: usize) -> mpsc::Sender<()> {
            let (tx, rx) = mpsc::channel();
            *self.gate.lock().unwrap() = Some((records, rx));
            tx
        }
    }

    impl ChunkRenderer for StubRenderer {
        fn render(&self, chunk: &Chunk, _options: &RenderOptions) -> Result<RenderedDocument, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = {
                let mut gate = self.gate.lock().unwrap();
                match gate.as_ref() {
                    Some((n, _)) if *n == chunk.len() => gate.take(),
                    _ => None,
                }
            };
            if let Some((_, rx)) = gate {
                let _ = rx.recv();
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(RenderError::Other("boom".into()));
            }
            Ok(RenderedDocument::new(vec![chunk.len() as u8], chunk.len()))
        }
    }

    fn definition(records: usize) -> PreviewDefinition {
        PreviewDefinition {
            records: (0..records)
                .map(|i| ContentRecord::new(json!({ "word": format!("w{}", i) }), i).unwrap())
                .collect(),
            header: HeaderInfo::new("Preview", ""),
            view_mode: ViewMode::WordList,
        }
    }

    fn setup() -> (PreviewController, Arc<StubRenderer>, SharedPreviewCache) {
        let _ = env_logger::builder().is_test(true).try_init();
        let renderer = Arc::new(StubRenderer::default());
        let cache = PreviewCache::shared(5);
        let controller = PreviewController::new(
            DocumentId::from("doc"),
            renderer.clone(),
            Arc::new(CountingRasterizer::default()),
            cache.clone(),
            PreviewConfig::default(),
        );
        (controller, renderer, cache)
    }

    async fn settled(rx: &mut watch::Receiver<RenderState>) -> RenderState {
        rx.wait_for(RenderState::is_settled).await.unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_changes_are_coalesced_into_one_render() {
        let (controller, renderer, _cache) = setup();
        let mut rx = controller.subscribe();
        assert_eq!(controller.state(), RenderState::Idle);

        controller.update(definition(1));
        controller.update(definition(2));
        controller.update(definition(3));
        assert_eq!(controller.state(), RenderState::Rendering);

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(renderer.calls(), 0);

        let state = settled(&mut rx).await;
        assert_eq!(state.pages().unwrap().len(), 3);
        assert_eq!(renderer.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn error_keeps_last_good_pages_and_retry_recovers() {
        let (controller, renderer, _cache) = setup();
        let mut rx = controller.subscribe();

        controller.update(definition(2));
        assert!(matches!(settled(&mut rx).await, RenderState::Ready { .. }));

        renderer.fail.store(true, Ordering::SeqCst);
        controller.update(definition(3));
        match settled(&mut rx).await {
            RenderState::Error { message, last_good } => {
                assert!(message.contains("boom"));
                assert_eq!(last_good.unwrap().len(), 2);
            }
            other => panic!("expected error state, got {:?}", other),
        }

        renderer.fail.store(false, Ordering::SeqCst);
        assert!(controller.retry());
        let state = settled(&mut rx).await;
        assert!(matches!(state, RenderState::Ready { .. }));
        assert_eq!(state.pages().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_render_is_never_applied() {
        let (controller, renderer, cache) = setup();
        let mut rx = controller.subscribe();
        let release = renderer.hold(5);

        controller.update(definition(5));
        tokio::task::yield_now().await;
        // Paused time does not auto-advance while a blocking task runs, so
        // step past the debounce by hand and spin until the render is held.
        tokio::time::advance(Duration::from_millis(500)).await;
        while renderer.calls() == 0 {
            tokio::task::yield_now().await;
        }

        controller.update(definition(3));
        release.send(()).unwrap();

        let state = settled(&mut rx).await;
        assert_eq!(state.pages().unwrap().len(), 3);
        let cache = lock_cache(&cache);
        assert!(cache.keys().all(|k| k.page <= 3));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_only_this_documents_pages() {
        let (controller, _renderer, cache) = setup();
        let mut rx = controller.subscribe();
        let other = CacheKey::new(DocumentId::from("other"), 1, 1.5);
        lock_cache(&cache).insert(other.clone(), Arc::new(PageImage { width: 1, height: 1, png: vec![] }));

        controller.update(definition(2));
        settled(&mut rx).await;
        assert_eq!(lock_cache(&cache).len(), 3);

        controller.shutdown();
        assert_eq!(controller.state(), RenderState::Idle);
        assert_eq!(lock_cache(&cache).len(), 1);
        assert!(lock_cache(&cache).contains(&other));
        assert!(!controller.update(definition(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_definition_is_ready_with_no_pages() {
        let (controller, renderer, _cache) = setup();
        let mut rx = controller.subscribe();
        controller.update(definition(0));
        let state = settled(&mut rx).await;
        assert_eq!(state.pages().unwrap().len(), 0);
        assert_eq!(renderer.calls(), 0);
    }

    #[test]
    fn retry_without_a_definition_does_nothing() {
        let (controller, _renderer, _cache) = setup();
        assert!(!controller.retry());
    }
}
