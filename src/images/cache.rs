//! LRU cache for decoded images.
//!
//! Keyed by the image reference (URL or data URI). This caches decoded
//! pixels for rendering, not API data; evicted entries are simply
//! re-fetched on the next request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use image::DynamicImage;

/// Maximum number of images to keep in cache
const MAX_CACHE_SIZE: usize = 50;

/// Cache entry for a decoded image
#[derive(Clone)]
struct CachedImage {
    image: Arc<DynamicImage>,
    /// Last access timestamp (for LRU eviction)
    last_access: Instant,
}

/// Thread-safe image cache shared between the loader task and the UI
#[derive(Clone)]
pub struct ImageCache {
    images: Arc<Mutex<HashMap<String, CachedImage>>>,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCache {
    /// Create a new image cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a decoded image, evicting the least recently used entry
    /// when the cache is full.
    pub fn insert(&self, reference: &str, image: DynamicImage) {
        let mut cache = self.images.lock().unwrap();

        if cache.len() >= MAX_CACHE_SIZE {
            evict_oldest(&mut cache);
        }

        cache.insert(
            reference.to_string(),
            CachedImage {
                image: Arc::new(image),
                last_access: Instant::now(),
            },
        );
    }

    /// Get a decoded image, refreshing its LRU timestamp.
    pub fn get(&self, reference: &str) -> Option<Arc<DynamicImage>> {
        let mut cache = self.images.lock().unwrap();
        if let Some(entry) = cache.get_mut(reference) {
            entry.last_access = Instant::now();
            Some(Arc::clone(&entry.image))
        } else {
            None
        }
    }

    /// Check if an image is cached.
    pub fn contains(&self, reference: &str) -> bool {
        self.images.lock().unwrap().contains_key(reference)
    }

    /// Clear the entire cache.
    pub fn clear(&self) {
        self.images.lock().unwrap().clear();
    }

    /// Get the number of cached images.
    pub fn len(&self) -> usize {
        self.images.lock().unwrap().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.images.lock().unwrap().is_empty()
    }
}

fn evict_oldest(cache: &mut HashMap<String, CachedImage>) {
    if let Some(oldest_key) = cache
        .iter()
        .min_by_key(|(_, v)| v.last_access)
        .map(|(k, _)| k.clone())
    {
        cache.remove(&oldest_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> DynamicImage {
        DynamicImage::new_rgb8(1, 1)
    }

    #[test]
    fn test_insert_and_get() {
        let cache = ImageCache::new();
        assert!(cache.is_empty());

        cache.insert("a", pixel());
        assert!(cache.contains("a"));
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_keeps_recently_used() {
        let cache = ImageCache::new();
        for i in 0..MAX_CACHE_SIZE {
            cache.insert(&format!("img-{i}"), pixel());
        }

        // Touch the oldest entry so it survives eviction
        assert!(cache.get("img-0").is_some());

        cache.insert("one-more", pixel());
        assert_eq!(cache.len(), MAX_CACHE_SIZE);
        assert!(cache.contains("img-0"));
        assert!(cache.contains("one-more"));
    }

    #[test]
    fn test_clear() {
        let cache = ImageCache::new();
        cache.insert("a", pixel());
        cache.clear();
        assert!(cache.is_empty());
    }
}
