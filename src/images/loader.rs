//! Async image loading from URLs and data URIs.

use anyhow::{Context, Result};
use base64::Engine as _;
use image::DynamicImage;
use tokio::sync::mpsc;

use super::ImageCache;

/// Message for the image loader task
#[derive(Debug)]
enum LoaderMessage {
    /// Request to load an image reference
    Load { reference: String },
    /// Shutdown the loader
    Shutdown,
}

/// Result of an image load operation
#[derive(Debug, Clone)]
pub enum LoadResult {
    /// Image decoded and cached
    Success {
        /// The reference that was requested
        reference: String,
    },
    /// Image loading failed
    Failed {
        /// The reference that was requested
        reference: String,
        /// Human-readable failure
        error: String,
    },
}

/// Async image loader that runs in a background task.
pub struct ImageLoader {
    /// Sender to request image loads
    sender: mpsc::UnboundedSender<LoaderMessage>,
    /// Receiver for load results
    result_rx: mpsc::UnboundedReceiver<LoadResult>,
}

impl ImageLoader {
    /// Create a new image loader with a shared cache.
    ///
    /// Spawns a background task to handle image loading.
    pub fn new(cache: ImageCache) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        tokio::spawn(loader_task(rx, result_tx, cache));

        Self {
            sender: tx,
            result_rx,
        }
    }

    /// Request an image to be loaded (URL or data URI).
    pub fn load(&self, reference: &str) {
        let _ = self.sender.send(LoaderMessage::Load {
            reference: reference.to_string(),
        });
    }

    /// Poll for completed loads (non-blocking).
    pub fn poll_results(&mut self) -> Vec<LoadResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }
        results
    }

    /// Shutdown the loader.
    pub fn shutdown(&self) {
        let _ = self.sender.send(LoaderMessage::Shutdown);
    }
}

/// Background task that handles image loading.
async fn loader_task(
    mut rx: mpsc::UnboundedReceiver<LoaderMessage>,
    result_tx: mpsc::UnboundedSender<LoadResult>,
    cache: ImageCache,
) {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default();

    while let Some(msg) = rx.recv().await {
        match msg {
            LoaderMessage::Load { reference } => {
                if cache.contains(&reference) {
                    let _ = result_tx.send(LoadResult::Success { reference });
                    continue;
                }

                match fetch_and_decode(&client, &reference).await {
                    Ok(image) => {
                        cache.insert(&reference, image);
                        let _ = result_tx.send(LoadResult::Success { reference });
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load image {reference}: {e:#}");
                        let _ = result_tx.send(LoadResult::Failed {
                            reference,
                            error: e.to_string(),
                        });
                    }
                }
            }
            LoaderMessage::Shutdown => {
                tracing::debug!("Image loader shutting down");
                break;
            }
        }
    }
}

/// Decode an image reference: inline for data URIs, HTTP for URLs.
async fn fetch_and_decode(client: &reqwest::Client, reference: &str) -> Result<DynamicImage> {
    let image = if reference.starts_with("data:") {
        decode_data_uri(reference)?
    } else {
        download_and_decode(client, reference).await?
    };

    Ok(resize_if_needed(image))
}

/// Decode a `data:image/...;base64,` URI.
fn decode_data_uri(uri: &str) -> Result<DynamicImage> {
    let payload = uri
        .split_once("base64,")
        .map(|(_, rest)| rest)
        .context("data URI is not base64-encoded")?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .context("invalid base64 payload")?;

    image::load_from_memory(&bytes).context("could not decode image data")
}

/// Download an image from a URL and decode it.
async fn download_and_decode(client: &reqwest::Client, url: &str) -> Result<DynamicImage> {
    tracing::debug!("Downloading image: {url}");

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    let bytes = response.bytes().await?;

    image::load_from_memory(&bytes).context("could not decode image data")
}

/// Resize image if it's too large (to save memory and rendering time).
fn resize_if_needed(image: DynamicImage) -> DynamicImage {
    const MAX_DIMENSION: u32 = 800;

    let (width, height) = (image.width(), image.height());

    if width <= MAX_DIMENSION && height <= MAX_DIMENSION {
        return image;
    }

    let ratio = f64::from(width) / f64::from(height);
    let (new_width, new_height) = if width > height {
        (MAX_DIMENSION, (f64::from(MAX_DIMENSION) / ratio) as u32)
    } else {
        ((f64::from(MAX_DIMENSION) * ratio) as u32, MAX_DIMENSION)
    };

    image.resize(new_width, new_height, image::imageops::FilterType::Triangle)
}
