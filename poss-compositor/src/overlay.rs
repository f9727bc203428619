//! Overlay assets: camera orientation, naming chain and asset store

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CompositorError, Result};
use crate::raster;

/// File extension of overlay assets
pub const OVERLAY_EXTENSION: &str = "png";

/// Prefix of the generic overlays used when an entity has none of its own
pub const DEFAULT_OVERLAY_PREFIX: &str = "default";

/// Which camera took the photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraOrientation {
    #[serde(rename = "frontal")]
    Front,
    #[default]
    #[serde(rename = "traseira")]
    Rear,
}

impl CameraOrientation {
    pub const ALL: [CameraOrientation; 2] = [CameraOrientation::Front, CameraOrientation::Rear];

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraOrientation::Front => "frontal",
            CameraOrientation::Rear => "traseira",
        }
    }

    /// Any tag containing "traseira" is the rear camera, everything else
    /// the front one
    pub fn from_tag(tag: &str) -> Self {
        if tag.to_lowercase().contains("traseira") {
            CameraOrientation::Rear
        } else {
            CameraOrientation::Front
        }
    }

    /// Paint alpha (0-255) of the overlay layer
    pub fn overlay_alpha(&self) -> u8 {
        match self {
            CameraOrientation::Front => 130,
            CameraOrientation::Rear => 150,
        }
    }
}

impl FromStr for CameraOrientation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}

impl fmt::Display for CameraOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type NamingStrategy = fn(&str, &str) -> String;

fn entity_with_separator(entity: &str, camera: &str) -> String {
    format!("{}_{}", entity, camera)
}

fn entity_joined(entity: &str, camera: &str) -> String {
    format!("{}{}", entity, camera)
}

fn default_with_separator(_: &str, camera: &str) -> String {
    entity_with_separator(DEFAULT_OVERLAY_PREFIX, camera)
}

fn default_joined(_: &str, camera: &str) -> String {
    entity_joined(DEFAULT_OVERLAY_PREFIX, camera)
}

/// Asset name conventions, in lookup order
const NAMING_CHAIN: [NamingStrategy; 4] = [
    entity_with_separator,
    entity_joined,
    default_with_separator,
    default_joined,
];

/// Asset names tried for an entity and orientation, first match wins
pub fn overlay_candidates(entity_id: &str, orientation: CameraOrientation) -> Vec<String> {
    NAMING_CHAIN
        .iter()
        .map(|name| format!("{}.{}", name(entity_id, orientation.as_str()), OVERLAY_EXTENSION))
        .collect()
}

/// Read-only overlay asset namespace
pub trait OverlayStore: Send + Sync {
    /// Load an asset by file name. `CompositorError::AssetNotFound` when
    /// the name does not exist.
    fn load(&self, name: &str) -> Result<RgbaImage>;
}

/// Overlay assets stored as files in one directory
#[derive(Debug, Clone)]
pub struct DirOverlayStore {
    dir: PathBuf,
}

impl DirOverlayStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OverlayStore for DirOverlayStore {
    fn load(&self, name: &str) -> Result<RgbaImage> {
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(CompositorError::AssetNotFound(name.to_string()));
        }
        raster::load(&path)
    }
}

/// Walk the naming chain and return the first asset that loads
pub fn find_overlay(
    store: &dyn OverlayStore,
    entity_id: &str,
    orientation: CameraOrientation,
) -> Option<(String, RgbaImage)> {
    for name in overlay_candidates(entity_id, orientation) {
        match store.load(&name) {
            Ok(img) => {
                debug!(overlay = %name, width = img.width(), height = img.height(), "Overlay loaded");
                return Some((name, img));
            }
            Err(CompositorError::AssetNotFound(_)) => {
                debug!(overlay = %name, "Overlay not present");
            }
            Err(e) => {
                warn!(overlay = %name, error = %e, "Overlay unreadable, trying next name");
            }
        }
    }
    warn!(entity_id, camera = %orientation, "No overlay found");
    None
}
