//! # Possessão Image Compositor
//!
//! Blends a captured photo with the overlay asset of the chosen entity:
//! - Overlay lookup through an ordered naming chain
//! - Darkened base, edge-feathered overlay, extracted subject on top
//! - Subject extraction by remote background removal, falling back to a
//!   local silhouette heuristic
//! - Horror-tone treatment when no overlay asset exists
//!
//! `ImageCompositor::compose` never fails: every stage degrades to the next
//! fallback, and the worst case returns the original photo path.

pub mod compositor;
pub mod edge_blur;
pub mod error;
pub mod extraction;
pub mod horror;
pub mod overlay;
pub mod paint;
pub mod placeholder;
pub mod raster;
pub mod removebg;
pub mod silhouette;

pub use compositor::{Composition, CompositionOutcome, ImageCompositor};
pub use error::{CompositorError, Result};
pub use extraction::{ExtractionChain, LocalSilhouetteExtractor, RemoteExtractor, SubjectExtractor};
pub use overlay::{CameraOrientation, DirOverlayStore, OverlayStore};
pub use removebg::{RemoveBgClient, RemoveBgError};
