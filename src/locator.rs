//! Strategy dispatch for feature location.

use image::{GrayImage, RgbImage};
use log::{debug, warn};

use crate::features::{FaceLocation, FeatureSet, LandmarkPredictor};
use crate::region::RegionLocator;
use crate::{landmarks, preprocess};

/// Immutable handle bundling the configured locator strategies.
///
/// Built once per process (or per worker) and passed into the pipeline.
/// Either strategy may be absent; location then degrades accordingly —
/// an unconfigured locator simply never finds a face, which the renderer
/// treats as the documented degraded path, never as an error.
#[derive(Default)]
pub struct FeatureLocator {
    mesh: Option<Box<dyn LandmarkPredictor>>,
    region: Option<RegionLocator>,
}

impl FeatureLocator {
    /// A locator with no strategies configured: every `locate` call
    /// reports "no face found".
    pub fn none() -> Self {
        Self::default()
    }

    /// Attach a dense-landmark backend for the mesh strategy.
    pub fn with_mesh(mut self, predictor: Box<dyn LandmarkPredictor>) -> Self {
        self.mesh = Some(predictor);
        self
    }

    /// Attach a region-strategy locator.
    pub fn with_region(mut self, region: RegionLocator) -> Self {
        self.region = Some(region);
        self
    }

    /// Whether the mesh strategy is available.
    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Whether the region strategy is available.
    pub fn has_region(&self) -> bool {
        self.region.is_some()
    }

    /// Run the mesh strategy, if configured.
    pub fn locate_mesh(&self, image: &RgbImage) -> Option<(FeatureSet, FaceLocation)> {
        let predictor = self.mesh.as_deref()?;
        landmarks::locate(predictor, image)
    }

    /// Run the region strategy, if configured.
    pub fn locate_region(&self, gray: &GrayImage) -> Option<(FeatureSet, FaceLocation)> {
        self.region.as_ref()?.locate(gray)
    }

    /// Locate features, preferring the mesh strategy and falling back to
    /// the region strategy.
    pub fn locate(&self, image: &RgbImage) -> Option<(FeatureSet, FaceLocation)> {
        if let Some(located) = self.locate_mesh(image) {
            debug!("mesh strategy located a face");
            return Some(located);
        }
        let gray = preprocess::to_intensity(image);
        if let Some(located) = self.locate_region(&gray) {
            debug!("region strategy located a face");
            return Some(located);
        }
        warn!("no face found by any configured locator strategy");
        None
    }
}
