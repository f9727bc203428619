//! Composition pipeline
//!
//! ```text
//! photo ─ decode ─┬─ overlay found ─ darken base ─ feathered overlay ─ subject on top ─┐
//!                 └─ no overlay ──── horror tone ───────────────────────────────────────┤
//!                                                                  encode JPEG ─ write ─┘
//! ```
//!
//! Every failure degrades to a fallback. Decode failures, I/O errors and
//! cancellation return the original photo path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::edge_blur::feather_edges;
use crate::error::{CompositorError, Result};
use crate::extraction::ExtractionChain;
use crate::horror::apply_horror_tone;
use crate::overlay::{find_overlay, CameraOrientation, OverlayStore};
use crate::raster::{self, alpha_to_opacity, BASE_DARKEN_FACTOR, OUTPUT_JPEG_QUALITY};

/// Output file name prefix
pub const OUTPUT_PREFIX: &str = "possessed_";

/// Which branch of the pipeline produced the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionOutcome {
    /// Overlay and subject layered over the darkened photo
    Composited,
    /// No overlay asset: horror-tone treatment of the photo
    HorrorTone,
    /// Original photo returned unchanged
    Passthrough,
}

/// Result of `ImageCompositor::compose`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    /// Written output, or the original photo for `Passthrough`
    pub image: PathBuf,
    pub outcome: CompositionOutcome,
}

impl Composition {
    fn passthrough(photo: &Path) -> Self {
        Self {
            image: photo.to_path_buf(),
            outcome: CompositionOutcome::Passthrough,
        }
    }
}

/// Darkened `base` with the edge-feathered `overlay` stretched over it at
/// the orientation's alpha
pub fn layer_overlay(base: &RgbaImage, overlay: &RgbaImage, orientation: CameraOrientation) -> RgbaImage {
    let (width, height) = base.dimensions();

    let mut canvas = base.clone();
    raster::darken(&mut canvas, BASE_DARKEN_FACTOR);

    let feathered = feather_edges(&raster::stretch(overlay, width, height));
    raster::draw_over(&mut canvas, &feathered, alpha_to_opacity(orientation.overlay_alpha()));
    canvas
}

/// Photo compositor for one overlay namespace and output directory
pub struct ImageCompositor {
    overlays: Arc<dyn OverlayStore>,
    extractors: ExtractionChain,
    output_dir: PathBuf,
}

impl ImageCompositor {
    pub fn new(overlays: Arc<dyn OverlayStore>, extractors: ExtractionChain, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            overlays,
            extractors,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn extractors(&self) -> &ExtractionChain {
        &self.extractors
    }

    /// Compose `photo` with the overlay of `entity_id`.
    ///
    /// Never fails: the worst case is a `Passthrough` of the original path.
    /// When `cancel` fires, no output file is left behind.
    pub async fn compose(
        &self,
        photo: &Path,
        entity_id: &str,
        orientation: CameraOrientation,
        cancel: &CancellationToken,
    ) -> Composition {
        info!(photo = %photo.display(), entity_id, camera = %orientation, "Composing image");

        match self.try_compose(photo, entity_id, orientation, cancel).await {
            Ok(composition) => {
                info!(
                    image = %composition.image.display(),
                    outcome = ?composition.outcome,
                    "Composition complete"
                );
                composition
            }
            Err(CompositorError::Cancelled) => {
                info!(entity_id, "Composition cancelled");
                Composition::passthrough(photo)
            }
            Err(e @ CompositorError::Decode(_)) => {
                warn!(photo = %photo.display(), error = %e, "Photo unreadable, returning original");
                Composition::passthrough(photo)
            }
            Err(e) => {
                error!(photo = %photo.display(), error = %e, "Composition failed, returning original");
                Composition::passthrough(photo)
            }
        }
    }

    async fn try_compose(
        &self,
        photo: &Path,
        entity_id: &str,
        orientation: CameraOrientation,
        cancel: &CancellationToken,
    ) -> Result<Composition> {
        let bytes = tokio::fs::read(photo).await?;
        let base = tokio::task::spawn_blocking(move || raster::decode(&bytes)).await??;
        ensure_active(cancel)?;

        let overlay = {
            let store = Arc::clone(&self.overlays);
            let entity_id = entity_id.to_string();
            tokio::task::spawn_blocking(move || find_overlay(store.as_ref(), &entity_id, orientation)).await?
        };
        ensure_active(cancel)?;

        let (result, outcome) = match overlay {
            None => {
                warn!(entity_id, "No overlay asset, applying horror tone");
                let toned = tokio::task::spawn_blocking(move || apply_horror_tone(&base)).await?;
                (toned, CompositionOutcome::HorrorTone)
            }
            Some((name, overlay)) => {
                debug!(overlay = %name, "Layering overlay");
                let base = Arc::new(base);
                let layered = {
                    let base = Arc::clone(&base);
                    tokio::task::spawn_blocking(move || layer_overlay(&base, &overlay, orientation)).await?
                };
                ensure_active(cancel)?;

                let subject = tokio::select! {
                    _ = cancel.cancelled() => return Err(CompositorError::Cancelled),
                    subject = self.extractors.extract(Arc::clone(&base)) => subject,
                };

                let mut result = layered;
                match subject {
                    Some(subject) => raster::draw_over(&mut result, &subject, 1.0),
                    None => warn!("No extractor produced a subject, keeping overlay only"),
                }
                (result, CompositionOutcome::Composited)
            }
        };
        ensure_active(cancel)?;

        let jpeg = tokio::task::spawn_blocking(move || raster::encode_jpeg(&result, OUTPUT_JPEG_QUALITY)).await??;
        ensure_active(cancel)?;

        let path = self.output_dir.join(format!("{}{}.jpg", OUTPUT_PREFIX, Uuid::new_v4()));
        {
            let dir = self.output_dir.clone();
            let path = path.clone();
            tokio::task::spawn_blocking(move || -> Result<()> {
                std::fs::create_dir_all(&dir)?;
                raster::write_atomic(&path, &jpeg)
            })
            .await??;
        }

        if cancel.is_cancelled() {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to discard cancelled output");
            }
            return Err(CompositorError::Cancelled);
        }

        Ok(Composition { image: path, outcome })
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(CompositorError::Cancelled);
    }
    Ok(())
}
