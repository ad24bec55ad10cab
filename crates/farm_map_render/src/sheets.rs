//! Sprite sheet cache
//!
//! Sheets load once per path on a background thread. Until a load finishes,
//! `get` returns `None` and callers skip drawing. A failed load is remembered
//! so it is not retried every frame; `retry_failed` lets the next `request`
//! try again.

use image::RgbaImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur while loading a sprite sheet
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Failed to decode sheet image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Sheet '{0}' not found")]
    NotFound(String),
}

/// Where sheet images come from
pub trait SheetSource: Send + Sync + 'static {
    fn load(&self, path: &str) -> Result<RgbaImage, SheetError>;
}

/// Loads sheets from image files below an asset root
#[derive(Debug, Clone)]
pub struct FileSheetSource {
    root: PathBuf,
}

impl FileSheetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SheetSource for FileSheetSource {
    fn load(&self, path: &str) -> Result<RgbaImage, SheetError> {
        let full_path = self.root.join(path);
        if !full_path.exists() {
            return Err(SheetError::NotFound(full_path.display().to_string()));
        }
        Ok(image::open(&full_path)?.to_rgba8())
    }
}

/// Serves sheets from memory (generated sheets, tests)
#[derive(Debug, Clone, Default)]
pub struct MemorySheetSource {
    sheets: HashMap<String, RgbaImage>,
}

impl MemorySheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, path: impl Into<String>, image: RgbaImage) -> Self {
        self.sheets.insert(path.into(), image);
        self
    }
}

impl SheetSource for MemorySheetSource {
    fn load(&self, path: &str) -> Result<RgbaImage, SheetError> {
        self.sheets
            .get(path)
            .cloned()
            .ok_or_else(|| SheetError::NotFound(path.to_string()))
    }
}

enum SheetState {
    Loading,
    Ready(Arc<RgbaImage>),
    Failed,
}

type LoadResult = (String, Result<RgbaImage, SheetError>);

/// Path-keyed cache of loaded sprite sheets
pub struct SheetCache {
    source: Arc<dyn SheetSource>,
    entries: HashMap<String, SheetState>,
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
}

impl SheetCache {
    pub fn new(source: impl SheetSource) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            source: Arc::new(source),
            entries: HashMap::new(),
            sender,
            receiver,
        }
    }

    /// Start loading `path` unless it is loaded, loading or failed
    pub fn request(&mut self, path: &str) {
        if self.entries.contains_key(path) {
            return;
        }
        self.entries.insert(path.to_string(), SheetState::Loading);

        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let owned = path.to_string();
        let spawned = std::thread::Builder::new()
            .name(format!("sheet-load:{path}"))
            .spawn(move || {
                let result = source.load(&owned);
                // The cache may be gone by now; nothing to report to then.
                let _ = sender.send((owned, result));
            });
        if let Err(e) = spawned {
            tracing::warn!("Failed to start loading sheet '{}': {}", path, e);
            self.entries.remove(path);
        }
    }

    /// Collect finished loads. Returns how many sheets became ready.
    pub fn poll(&mut self) -> usize {
        let mut ready = 0;
        while let Ok(result) = self.receiver.try_recv() {
            if self.finish(result) {
                ready += 1;
            }
        }
        ready
    }

    /// Block until no load is in flight or `timeout` passes.
    ///
    /// Returns `true` if the cache went idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.pending() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(result) => {
                    self.finish(result);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }
        true
    }

    /// Loaded sheet for `path`, if ready
    pub fn get(&self, path: &str) -> Option<Arc<RgbaImage>> {
        match self.entries.get(path) {
            Some(SheetState::Ready(image)) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    /// Insert an already decoded sheet, replacing any entry
    pub fn insert(&mut self, path: impl Into<String>, image: RgbaImage) {
        self.entries
            .insert(path.into(), SheetState::Ready(Arc::new(image)));
    }

    pub fn is_loading(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(SheetState::Loading))
    }

    /// True when the last load of `path` failed
    pub fn is_failed(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(SheetState::Failed))
    }

    /// Forget failed loads so their paths can be requested again.
    /// Returns how many were forgotten.
    pub fn retry_failed(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, state| !matches!(state, SheetState::Failed));
        before - self.entries.len()
    }

    /// Number of loads in flight
    pub fn pending(&self) -> usize {
        self.entries
            .values()
            .filter(|s| matches!(s, SheetState::Loading))
            .count()
    }

    fn finish(&mut self, (path, result): LoadResult) -> bool {
        match result {
            Ok(image) => {
                tracing::debug!(
                    "Loaded sheet '{}' ({}x{})",
                    path,
                    image.width(),
                    image.height()
                );
                self.entries
                    .insert(path, SheetState::Ready(Arc::new(image)));
                true
            }
            Err(e) => {
                tracing::warn!("Failed to load sheet '{}': {}", path, e);
                self.entries.insert(path, SheetState::Failed);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_request_then_ready() {
        let source = MemorySheetSource::new().with_sheet("grass.png", RgbaImage::new(16, 16));
        let mut cache = SheetCache::new(source);
        assert!(cache.get("grass.png").is_none());

        cache.request("grass.png");
        cache.request("grass.png");
        assert!(cache.wait_idle(WAIT));
        assert_eq!(cache.get("grass.png").unwrap().dimensions(), (16, 16));
        assert_eq!(cache.pending(), 0);
    }

    #[test]
    fn test_failed_load_is_remembered_until_retry() {
        let mut cache = SheetCache::new(MemorySheetSource::new());
        cache.request("missing.png");
        assert!(cache.wait_idle(WAIT));
        assert!(cache.get("missing.png").is_none());
        assert!(cache.is_failed("missing.png"));

        cache.request("missing.png");
        assert!(!cache.is_loading("missing.png"));
        assert_eq!(cache.pending(), 0);

        assert_eq!(cache.retry_failed(), 1);
        assert!(!cache.is_failed("missing.png"));
        cache.request("missing.png");
        assert!(cache.is_loading("missing.png"));
        assert!(cache.wait_idle(WAIT));
        assert!(cache.is_failed("missing.png"));
    }

    #[test]
    fn test_insert_preseeds() {
        let mut cache = SheetCache::new(MemorySheetSource::new());
        cache.insert("water.png", RgbaImage::new(8, 8));
        cache.request("water.png");
        assert_eq!(cache.pending(), 0);
        assert!(cache.get("water.png").is_some());
    }

    #[test]
    fn test_file_source_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::new(4, 2).save(dir.path().join("sheet.png")).unwrap();

        let source = FileSheetSource::new(dir.path());
        assert_eq!(source.load("sheet.png").unwrap().dimensions(), (4, 2));
        assert!(matches!(source.load("nope.png"), Err(SheetError::NotFound(_))));
    }
}
