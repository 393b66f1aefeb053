use std::path::Path;

use crate::error::SketchError;
use crate::features::{FaceBounds, FaceDetector};

/// Frontal-face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model is read from a caller-supplied path once at construction; the
/// handle is immutable afterwards and safe to share across threads. A fresh
/// engine is built per `detect` call, so one instance can serve concurrent
/// requests.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load a SeetaFace frontal-face model from `path`.
    pub fn from_model_path(path: impl AsRef<Path>) -> Result<Self, SketchError> {
        let bytes =
            std::fs::read(path.as_ref()).map_err(|e| SketchError::ModelLoad(e.to_string()))?;
        let model = rustface::read_model(std::io::Cursor::new(bytes))
            .map_err(|e| SketchError::ModelLoad(e.to_string()))?;
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }
}
