//! Facial feature geometry and the pluggable detection backends.

use std::collections::BTreeMap;

use image::RgbImage;

/// Named facial features produced by the two locator strategies.
///
/// The mesh strategy yields the polyline features (face oval through jaw
/// curves); the region strategy yields the rectangle features (`LeftEye`,
/// `RightEye`, `Eye`, `Nose`, `Mouth`). The two sets overlap on the eyes:
/// geometry, not the name, distinguishes which strategy produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FeatureName {
    /// Full face outline (jawline and forehead).
    FaceOval,
    /// Left eye contour or rectangle.
    LeftEye,
    /// Right eye contour or rectangle.
    RightEye,
    /// Left eyebrow curve.
    LeftEyebrow,
    /// Right eyebrow curve.
    RightEyebrow,
    /// Nose bridge line.
    NoseBridge,
    /// Nose tip cluster.
    NoseTip,
    /// Nose wings (nostril sides).
    NoseWings,
    /// Outer mouth contour or rectangle.
    MouthOuter,
    /// Upper lip curve.
    UpperLip,
    /// Lower lip curve.
    LowerLip,
    /// Chin definition curve.
    Chin,
    /// Left jaw curve.
    JawLeft,
    /// Right jaw curve.
    JawRight,
    /// A single eye when the region strategy finds exactly one.
    Eye,
    /// Nose rectangle (region strategy).
    Nose,
    /// Mouth rectangle (region strategy).
    Mouth,
}

/// Axis-aligned feature rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRect {
    /// X coordinate of the top-left corner.
    pub x: i32,
    /// Y coordinate of the top-left corner.
    pub y: i32,
    /// Rectangle width in pixels.
    pub width: i32,
    /// Rectangle height in pixels.
    pub height: i32,
}

/// Geometry of one located feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureGeometry {
    /// Ordered pixel points tracing the feature (mesh strategy).
    Polyline(Vec<(i32, i32)>),
    /// Bounding rectangle of the feature (region strategy).
    Region(FeatureRect),
}

/// Bounding rectangle of the whole detected face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceLocation {
    /// X coordinate of the top-left corner.
    pub x: i32,
    /// Y coordinate of the top-left corner.
    pub y: i32,
    /// Face width in pixels.
    pub width: i32,
    /// Face height in pixels.
    pub height: i32,
}

/// Mapping from feature name to located geometry, produced fresh per
/// request and never mutated after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    features: BTreeMap<FeatureName, FeatureGeometry>,
}

impl FeatureSet {
    /// Create an empty feature set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a feature. Later inserts for the same name replace earlier ones.
    pub fn insert(&mut self, name: FeatureName, geometry: FeatureGeometry) {
        self.features.insert(name, geometry);
    }

    /// Geometry of a named feature, if located.
    pub fn get(&self, name: FeatureName) -> Option<&FeatureGeometry> {
        self.features.get(&name)
    }

    /// Polyline points of a named feature, if that feature was located
    /// by the mesh strategy.
    pub fn points(&self, name: FeatureName) -> Option<&[(i32, i32)]> {
        match self.features.get(&name) {
            Some(FeatureGeometry::Polyline(points)) => Some(points),
            _ => None,
        }
    }

    /// Rectangle of a named feature, if that feature was located by the
    /// region strategy.
    pub fn rect(&self, name: FeatureName) -> Option<FeatureRect> {
        match self.features.get(&name) {
            Some(FeatureGeometry::Region(rect)) => Some(*rect),
            _ => None,
        }
    }

    /// Number of located features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no features were located.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterate features in a fixed, deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, &FeatureGeometry)> {
        self.features.iter().map(|(name, geom)| (*name, geom))
    }
}

/// Bounding box of a detected face within an image.
#[derive(Debug, Clone)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

/// Pluggable rectangular detection backend for the region strategy.
///
/// Implement this to provide the frontal-face detector (or the optional
/// eye/nose/mouth sub-detectors) from any engine — the built-in
/// [`crate::RustfaceDetector`] is one such backend.
pub trait FaceDetector: Send + Sync {
    /// Detect regions in a row-major grayscale buffer of `width` × `height`
    /// bytes. Best effort: an empty result means "nothing found".
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds>;
}

/// Pluggable dense facial-landmark backend for the mesh strategy.
///
/// The backend is expected to be configured for a single still image, at
/// most one face, with sub-pixel landmark refinement and a minimum
/// detection confidence of 0.5. It returns the canonical 468 landmark
/// positions in normalized [0, 1] image coordinates, or `None` when no
/// face is found. Inference is assumed deterministic.
pub trait LandmarkPredictor: Send + Sync {
    /// Predict normalized landmark positions for the single most
    /// prominent face, or `None` when no face is detected.
    fn predict(&self, image: &RgbImage) -> Option<Vec<(f32, f32)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_set_lookup_by_kind() {
        let mut set = FeatureSet::new();
        set.insert(
            FeatureName::LeftEye,
            FeatureGeometry::Polyline(vec![(1, 2), (3, 4)]),
        );
        set.insert(
            FeatureName::Nose,
            FeatureGeometry::Region(FeatureRect {
                x: 10,
                y: 20,
                width: 30,
                height: 40,
            }),
        );

        assert_eq!(set.points(FeatureName::LeftEye), Some(&[(1, 2), (3, 4)][..]));
        assert_eq!(set.rect(FeatureName::LeftEye), None);
        assert_eq!(
            set.rect(FeatureName::Nose),
            Some(FeatureRect {
                x: 10,
                y: 20,
                width: 30,
                height: 40,
            })
        );
        assert_eq!(set.points(FeatureName::Nose), None);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn iteration_order_is_deterministic() {
        let mut a = FeatureSet::new();
        a.insert(FeatureName::Mouth, FeatureGeometry::Polyline(vec![]));
        a.insert(FeatureName::FaceOval, FeatureGeometry::Polyline(vec![]));

        let mut b = FeatureSet::new();
        b.insert(FeatureName::FaceOval, FeatureGeometry::Polyline(vec![]));
        b.insert(FeatureName::Mouth, FeatureGeometry::Polyline(vec![]));

        let order_a: Vec<_> = a.iter().map(|(name, _)| name).collect();
        let order_b: Vec<_> = b.iter().map(|(name, _)| name).collect();
        assert_eq!(order_a, order_b);
    }
}
