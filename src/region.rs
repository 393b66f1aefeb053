//! Coarse region-based feature locator: frontal-face rectangle plus
//! optional eye/nose/mouth sub-detectors, with heuristic estimation of
//! missing features from the face and eye geometry.

use image::GrayImage;
use log::debug;

use crate::features::{
    FaceDetector, FaceLocation, FeatureGeometry, FeatureName, FeatureRect, FeatureSet,
};

/// Region-strategy locator.
///
/// Holds one mandatory frontal-face detector and up to three optional
/// sub-detectors that run inside the detected face rectangle. When a
/// sub-detector is absent or finds nothing, nose and mouth rectangles are
/// estimated from the face and eye geometry instead. All backends are
/// best-effort: the only hard requirement for a result is a face rectangle.
pub struct RegionLocator {
    face: Box<dyn FaceDetector>,
    eye: Option<Box<dyn FaceDetector>>,
    nose: Option<Box<dyn FaceDetector>>,
    mouth: Option<Box<dyn FaceDetector>>,
}

impl RegionLocator {
    /// Create a locator with only a face detector; all sub-features are
    /// estimated heuristically.
    pub fn new(face: Box<dyn FaceDetector>) -> Self {
        Self {
            face,
            eye: None,
            nose: None,
            mouth: None,
        }
    }

    /// Attach an eye detector, run within the face rectangle.
    pub fn with_eye_detector(mut self, eye: Box<dyn FaceDetector>) -> Self {
        self.eye = Some(eye);
        self
    }

    /// Attach a nose detector, run within the face rectangle.
    pub fn with_nose_detector(mut self, nose: Box<dyn FaceDetector>) -> Self {
        self.nose = Some(nose);
        self
    }

    /// Attach a mouth detector, run within the face rectangle.
    pub fn with_mouth_detector(mut self, mouth: Box<dyn FaceDetector>) -> Self {
        self.mouth = Some(mouth);
        self
    }

    /// Locate the face and its features in a grayscale image.
    ///
    /// The largest detected face rectangle wins. Returns `None` when no
    /// face is found.
    pub fn locate(&self, gray: &GrayImage) -> Option<(FeatureSet, FaceLocation)> {
        let (width, height) = gray.dimensions();
        let faces = self.face.detect(gray.as_raw(), width, height);

        let face = faces
            .iter()
            .max_by(|a, b| {
                (a.width * a.height)
                    .partial_cmp(&(b.width * b.height))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?
            .clone();

        let fx = face.x as i32;
        let fy = face.y as i32;
        let fw = face.width as i32;
        let fh = face.height as i32;
        let location = FaceLocation {
            x: fx,
            y: fy,
            width: fw,
            height: fh,
        };

        // Sub-detectors operate on the face crop; their coordinates come
        // back face-relative and are shifted into image space here.
        let crop = face_crop(gray, &location);
        let mut set = FeatureSet::new();

        let eyes = self.detect_in_face(self.eye.as_deref(), &crop);
        match eyes.len() {
            0 => {}
            1 => {
                set.insert(
                    FeatureName::Eye,
                    FeatureGeometry::Region(offset(eyes[0], fx, fy)),
                );
            }
            _ => {
                let mut sorted = eyes;
                sorted.sort_by_key(|r| r.x);
                set.insert(
                    FeatureName::LeftEye,
                    FeatureGeometry::Region(offset(sorted[0], fx, fy)),
                );
                set.insert(
                    FeatureName::RightEye,
                    FeatureGeometry::Region(offset(sorted[1], fx, fy)),
                );
            }
        }

        if let Some(nose) = self.detect_in_face(self.nose.as_deref(), &crop).first() {
            set.insert(FeatureName::Nose, FeatureGeometry::Region(offset(*nose, fx, fy)));
        }
        if let Some(mouth) = self.detect_in_face(self.mouth.as_deref(), &crop).first() {
            set.insert(
                FeatureName::Mouth,
                FeatureGeometry::Region(offset(*mouth, fx, fy)),
            );
        }

        estimate_missing(&mut set, fw, fh);

        debug!(
            "region locator: face {}x{} at ({}, {}), {} features",
            fw,
            fh,
            fx,
            fy,
            set.len()
        );

        Some((set, location))
    }

    fn detect_in_face(
        &self,
        detector: Option<&dyn FaceDetector>,
        crop: &GrayImage,
    ) -> Vec<FeatureRect> {
        let Some(detector) = detector else {
            return Vec::new();
        };
        detector
            .detect(crop.as_raw(), crop.width(), crop.height())
            .iter()
            .map(|b| FeatureRect {
                x: b.x as i32,
                y: b.y as i32,
                width: b.width as i32,
                height: b.height as i32,
            })
            .collect()
    }
}

/// Estimate nose and mouth rectangles when their detectors found nothing.
///
/// Nose: centered between the eyes, offset below by the taller eye's
/// height, a quarter of the face wide and a fifth of the face tall.
/// Mouth: below the nose by a twelfth of the face height, one and a half
/// nose widths wide and an eighth of the face tall.
pub(crate) fn estimate_missing(set: &mut FeatureSet, face_width: i32, face_height: i32) {
    if set.rect(FeatureName::Nose).is_none() {
        if let (Some(left), Some(right)) = (
            set.rect(FeatureName::LeftEye),
            set.rect(FeatureName::RightEye),
        ) {
            let nose = FeatureRect {
                x: (left.x + right.x + right.width) / 2 - face_width / 8,
                y: left.y.max(right.y) + left.height.max(right.height),
                width: face_width / 4,
                height: face_height / 5,
            };
            set.insert(FeatureName::Nose, FeatureGeometry::Region(nose));
        }
    }

    if set.rect(FeatureName::Mouth).is_none() {
        if let Some(nose) = set.rect(FeatureName::Nose) {
            let mouth = FeatureRect {
                x: nose.x - nose.width / 4,
                y: nose.y + nose.height + face_height / 12,
                width: nose.width + nose.width / 2,
                height: face_height / 8,
            };
            set.insert(FeatureName::Mouth, FeatureGeometry::Region(mouth));
        }
    }
}

fn offset(rect: FeatureRect, dx: i32, dy: i32) -> FeatureRect {
    FeatureRect {
        x: rect.x + dx,
        y: rect.y + dy,
        ..rect
    }
}

fn face_crop(gray: &GrayImage, face: &FaceLocation) -> GrayImage {
    let x = face.x.max(0) as u32;
    let y = face.y.max(0) as u32;
    let w = (face.width.max(1) as u32).min(gray.width().saturating_sub(x).max(1));
    let h = (face.height.max(1) as u32).min(gray.height().saturating_sub(y).max(1));
    image::imageops::crop_imm(gray, x, y, w, h).to_image()
}
