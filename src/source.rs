//! Image acquisition: sources, the decoded-image cache and a background loader.

use crate::Result;
use image::RgbaImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Yields a decoded image for a source identifier.
pub trait ImageSource {
    fn load(&self, id: &str) -> Result<RgbaImage>;
}

/// Treats identifiers as file paths, optionally relative to a root directory.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }
}

impl ImageSource for FileSource {
    fn load(&self, id: &str) -> Result<RgbaImage> {
        let path = match &self.root {
            Some(root) => root.join(id),
            None => PathBuf::from(id),
        };
        Ok(image::open(path)?.to_rgba8())
    }
}

/// Decoded images keyed by source identifier.
///
/// Remembers which entry was stored last so a failed load can fall back to
/// the most recent success.
#[derive(Debug, Default)]
pub struct ImageCache {
    images: HashMap<String, Arc<RgbaImage>>,
    latest: Option<String>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, image: RgbaImage) -> Arc<RgbaImage> {
        let image = Arc::new(image);
        self.images.insert(id.to_string(), Arc::clone(&image));
        self.latest = Some(id.to_string());
        image
    }

    pub fn get(&self, id: &str) -> Option<Arc<RgbaImage>> {
        self.images.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.images.contains_key(id)
    }

    pub fn latest(&self) -> Option<(&str, Arc<RgbaImage>)> {
        let id = self.latest.as_deref()?;
        self.images.get(id).map(|img| (id, Arc::clone(img)))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Result of one background load.
#[derive(Debug)]
pub struct Completion {
    pub id: String,
    pub result: Result<RgbaImage>,
}

/// Runs loads on the rayon pool and hands completions back over a channel.
pub struct BackgroundLoader<S> {
    source: Arc<S>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl<S: ImageSource + Send + Sync + 'static> BackgroundLoader<S> {
    pub fn new(source: S) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { source: Arc::new(source), tx, rx }
    }

    pub fn request(&self, id: &str) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let id = id.to_string();
        rayon::spawn(move || {
            let result = source.load(&id);
            // Receiver only goes away with the loader itself.
            let _ = tx.send(Completion { id, result });
        });
    }

    pub fn try_recv(&self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }

    /// Block until the next completion arrives.
    pub fn recv(&self) -> Option<Completion> {
        self.rx.recv().ok()
    }
}
