//! Subject extraction strategies
//!
//! Strategies run in order; the first one that returns a raster wins.
//! The default chain is remote background removal, then the local
//! silhouette heuristic (which always produces a result).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{CompositorError, Result};
use crate::raster;
use crate::removebg::RemoveBgClient;
use crate::silhouette::extract_silhouette;

/// JPEG quality of the image submitted for remote processing
pub const SUBMIT_JPEG_QUALITY: u8 = 95;

/// File name prefix of the staged upload
pub const UPLOAD_PREFIX: &str = "poss_removebg_";

/// A way of cutting the photographed subject out of its background
#[async_trait]
pub trait SubjectExtractor: Send + Sync {
    /// Strategy identifier for logs (e.g., "removebg", "silhouette")
    fn source_id(&self) -> &'static str;

    /// Extract the subject as a raster the size of `photo`, with a
    /// transparent background.
    ///
    /// `Ok(None)` means the strategy has no result and the next one
    /// should run.
    async fn extract(&self, photo: Arc<RgbaImage>) -> Result<Option<RgbaImage>>;

    /// Check if the strategy can run at all (API key configured, etc.)
    fn is_available(&self) -> bool {
        true
    }
}

/// Remote background removal through Remove.bg
pub struct RemoteExtractor {
    client: Option<RemoveBgClient>,
    /// Where the upload JPEG is staged (system temp dir when unset)
    temp_dir: Option<PathBuf>,
}

impl RemoteExtractor {
    pub fn new(client: Option<RemoveBgClient>) -> Self {
        Self { client, temp_dir: None }
    }

    pub fn with_temp_dir(client: Option<RemoveBgClient>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            temp_dir: Some(temp_dir.into()),
        }
    }
}

/// Encode `photo` and write it to a fresh `poss_removebg_*.jpg`, removed
/// when the returned handle drops
fn stage_upload(photo: &RgbaImage, temp_dir: Option<&Path>) -> Result<NamedTempFile> {
    let jpeg = raster::encode_jpeg(photo, SUBMIT_JPEG_QUALITY)?;
    let mut builder = tempfile::Builder::new();
    builder.prefix(UPLOAD_PREFIX).suffix(".jpg");
    let mut temp = match temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    temp.write_all(&jpeg)?;
    temp.flush()?;
    Ok(temp)
}

#[async_trait]
impl SubjectExtractor for RemoteExtractor {
    fn source_id(&self) -> &'static str {
        "removebg"
    }

    async fn extract(&self, photo: Arc<RgbaImage>) -> Result<Option<RgbaImage>> {
        let Some(client) = &self.client else {
            return Ok(None);
        };
        let (width, height) = photo.dimensions();

        let temp = {
            let photo = Arc::clone(&photo);
            let temp_dir = self.temp_dir.clone();
            tokio::task::spawn_blocking(move || stage_upload(&photo, temp_dir.as_deref())).await??
        };

        let response = client.remove_background(temp.path()).await;
        // Dropping deletes the file; off the runtime thread like the write
        tokio::task::spawn_blocking(move || drop(temp)).await?;
        let bytes = response?;

        let cutout = tokio::task::spawn_blocking(move || -> Result<RgbaImage> {
            let decoded = raster::decode(&bytes)?;
            if decoded.dimensions() != (width, height) {
                debug!(
                    from = ?decoded.dimensions(),
                    to = ?(width, height),
                    "Rescaling Remove.bg result"
                );
                return Ok(raster::stretch(&decoded, width, height));
            }
            Ok(decoded)
        })
        .await??;

        Ok(Some(cutout))
    }

    fn is_available(&self) -> bool {
        self.client.is_some()
    }
}

/// Local luminance/edge silhouette heuristic
#[derive(Debug, Default)]
pub struct LocalSilhouetteExtractor;

#[async_trait]
impl SubjectExtractor for LocalSilhouetteExtractor {
    fn source_id(&self) -> &'static str {
        "silhouette"
    }

    async fn extract(&self, photo: Arc<RgbaImage>) -> Result<Option<RgbaImage>> {
        let cutout = tokio::task::spawn_blocking(move || extract_silhouette(&photo)).await?;
        Ok(Some(cutout))
    }
}

/// Ordered list of extraction strategies
pub struct ExtractionChain {
    strategies: Vec<Box<dyn SubjectExtractor>>,
}

impl ExtractionChain {
    pub fn new(strategies: Vec<Box<dyn SubjectExtractor>>) -> Self {
        Self { strategies }
    }

    /// Remote removal (when a client is configured), then local silhouette
    pub fn with_remote(client: Option<RemoveBgClient>) -> Self {
        Self::new(vec![
            Box::new(RemoteExtractor::new(client)),
            Box::new(LocalSilhouetteExtractor),
        ])
    }

    pub fn source_ids(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.source_id()).collect()
    }

    /// Strategies that can currently run
    pub fn available_ids(&self) -> Vec<&'static str> {
        self.strategies
            .iter()
            .filter(|s| s.is_available())
            .map(|s| s.source_id())
            .collect()
    }

    /// Run strategies in order; errors are logged and treated as no result
    pub async fn extract(&self, photo: Arc<RgbaImage>) -> Option<RgbaImage> {
        for strategy in &self.strategies {
            if !strategy.is_available() {
                debug!(source = strategy.source_id(), "Extractor unavailable, skipping");
                continue;
            }

            match strategy.extract(Arc::clone(&photo)).await {
                Ok(Some(cutout)) => {
                    info!(source = strategy.source_id(), "Subject extracted");
                    return Some(cutout);
                }
                Ok(None) => {
                    debug!(source = strategy.source_id(), "Extractor returned no result");
                }
                Err(CompositorError::Remote(e)) => {
                    warn!(source = strategy.source_id(), error = %e, "Remote extraction unavailable, falling back");
                }
                Err(e) => {
                    warn!(source = strategy.source_id(), error = %e, "Extraction failed, falling back");
                }
            }
        }
        None
    }
}

impl Default for ExtractionChain {
    fn default() -> Self {
        Self::with_remote(None)
    }
}
