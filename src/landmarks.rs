//! Dense-landmark ("mesh") feature locator.
//!
//! Groups the 468 canonical face-mesh landmark positions into named
//! feature polylines using a fixed index table curated offline. The table
//! is pure data, versioned, and unit-tested independently of rendering.

use image::RgbImage;
use log::debug;

use crate::features::{
    FaceLocation, FeatureGeometry, FeatureName, FeatureSet, LandmarkPredictor,
};

/// Number of landmark positions the mesh backend produces.
pub const LANDMARK_COUNT: usize = 468;

/// Version tag for [`LANDMARK_GROUPS`]. Bump when the index table changes.
pub const LANDMARK_TABLE_VERSION: &str = "face-mesh-468/1";

/// Landmark indices composing each named feature, in drawing order.
///
/// Curated offline against the canonical 468-point face-mesh topology;
/// never recomputed at runtime.
pub const LANDMARK_GROUPS: &[(FeatureName, &[usize])] = &[
    (
        FeatureName::FaceOval,
        &[
            10, 338, 297, 332, 284, 251, 389, 356, 454, 323, 361, 288, 397, 365, 379, 378, 400,
            377, 152, 148, 176, 149, 150, 136, 172, 58, 132, 93, 234, 127, 162, 21, 54, 103, 67,
            109,
        ],
    ),
    (
        FeatureName::LeftEye,
        &[33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161, 246],
    ),
    (
        FeatureName::RightEye,
        &[362, 382, 381, 380, 374, 373, 390, 249, 263, 466, 388, 387, 386, 385, 384, 398],
    ),
    (
        FeatureName::LeftEyebrow,
        &[46, 53, 52, 51, 48, 115, 131, 134, 102, 49, 220, 305, 292, 334, 293, 300],
    ),
    (
        FeatureName::RightEyebrow,
        &[276, 283, 282, 295, 285, 336, 296, 334, 293, 300, 441, 442, 443, 444, 445],
    ),
    (
        FeatureName::NoseBridge,
        &[6, 168, 8, 9, 10, 151, 195, 197, 196, 3],
    ),
    (FeatureName::NoseTip, &[1, 2, 5, 4, 19, 20, 94, 125]),
    (
        FeatureName::NoseWings,
        &[131, 134, 102, 49, 220, 305, 292, 331, 279, 278, 294, 457],
    ),
    (
        FeatureName::MouthOuter,
        &[61, 84, 17, 314, 405, 320, 307, 375, 321, 308, 324, 318],
    ),
    (
        FeatureName::UpperLip,
        &[61, 84, 17, 314, 405, 320, 307, 375, 78, 95, 88, 178, 87, 14, 317, 402, 318, 324],
    ),
    (
        FeatureName::LowerLip,
        &[
            146, 91, 181, 84, 17, 314, 405, 320, 307, 375, 321, 308, 324, 318, 317, 14, 87, 178,
            88, 95,
        ],
    ),
    (FeatureName::Chin, &[18, 175, 199, 200, 9, 10, 151]),
    (
        FeatureName::JawLeft,
        &[172, 136, 150, 149, 176, 148, 152, 377, 400, 378, 379, 365, 397, 288, 361, 323],
    ),
    (
        FeatureName::JawRight,
        &[397, 365, 379, 378, 400, 377, 152, 148, 176, 149, 150, 136, 172, 58, 132, 93],
    ),
];

/// Run the mesh strategy against `image`.
///
/// Normalized landmark positions are mapped to pixel coordinates by
/// truncation (`x_px = x_norm * width` as integer) and clamped to the
/// image bounds, then grouped per [`LANDMARK_GROUPS`]. The face location
/// is the bounding box of all returned landmarks.
///
/// Returns `None` when the backend finds no face or produces no points.
pub fn locate(
    predictor: &dyn LandmarkPredictor,
    image: &RgbImage,
) -> Option<(FeatureSet, FaceLocation)> {
    let normalized = predictor.predict(image)?;
    if normalized.is_empty() {
        return None;
    }

    let (width, height) = image.dimensions();
    let pixels: Vec<(i32, i32)> = normalized
        .iter()
        .map(|&(x, y)| {
            let px = ((x * width as f32) as i32).clamp(0, width as i32 - 1);
            let py = ((y * height as f32) as i32).clamp(0, height as i32 - 1);
            (px, py)
        })
        .collect();

    let mut set = FeatureSet::new();
    for &(name, indices) in LANDMARK_GROUPS {
        let points: Vec<(i32, i32)> = indices
            .iter()
            .filter(|&&idx| idx < pixels.len())
            .map(|&idx| pixels[idx])
            .collect();
        if !points.is_empty() {
            set.insert(name, FeatureGeometry::Polyline(points));
        }
    }

    let min_x = pixels.iter().map(|p| p.0).min()?;
    let max_x = pixels.iter().map(|p| p.0).max()?;
    let min_y = pixels.iter().map(|p| p.1).min()?;
    let max_y = pixels.iter().map(|p| p.1).max()?;

    debug!(
        "mesh locator: {} landmarks, {} feature groups",
        pixels.len(),
        set.len()
    );

    Some((
        set,
        FaceLocation {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend producing one landmark per canonical index, spread over the
    /// unit square so every feature group gets distinct pixel positions.
    struct SyntheticMesh;

    impl LandmarkPredictor for SyntheticMesh {
        fn predict(&self, _image: &RgbImage) -> Option<Vec<(f32, f32)>> {
            Some(
                (0..LANDMARK_COUNT)
                    .map(|i| {
                        let x = (i % 24) as f32 / 24.0;
                        let y = (i / 24) as f32 / 24.0;
                        (x, y)
                    })
                    .collect(),
            )
        }
    }

    struct NoFace;

    impl LandmarkPredictor for NoFace {
        fn predict(&self, _image: &RgbImage) -> Option<Vec<(f32, f32)>> {
            None
        }
    }

    #[test]
    fn all_indices_in_range() {
        for &(_, indices) in LANDMARK_GROUPS {
            for &idx in indices {
                assert!(idx < LANDMARK_COUNT, "index {idx} out of range");
            }
        }
    }

    #[test]
    fn group_lengths_survive_mapping() {
        let image = RgbImage::new(240, 240);
        let (set, _) = locate(&SyntheticMesh, &image).unwrap();

        for &(name, indices) in LANDMARK_GROUPS {
            let points = set.points(name).unwrap();
            assert_eq!(
                points.len(),
                indices.len(),
                "feature {name:?} lost points during grouping"
            );
        }
    }

    #[test]
    fn pixel_mapping_truncates() {
        struct SinglePoint;
        impl LandmarkPredictor for SinglePoint {
            fn predict(&self, _image: &RgbImage) -> Option<Vec<(f32, f32)>> {
                // One landmark repeated: 0.5039 * 200 = 100.78 → 100
                Some(vec![(0.5039, 0.5039); LANDMARK_COUNT])
            }
        }

        let image = RgbImage::new(200, 200);
        let (set, face) = locate(&SinglePoint, &image).unwrap();
        let points = set.points(FeatureName::NoseTip).unwrap();
        assert!(points.iter().all(|&p| p == (100, 100)));
        assert_eq!((face.x, face.y), (100, 100));
        assert_eq!((face.width, face.height), (0, 0));
    }

    #[test]
    fn face_location_spans_all_landmarks() {
        let image = RgbImage::new(240, 240);
        let (_, face) = locate(&SyntheticMesh, &image).unwrap();
        assert_eq!(face.x, 0);
        assert_eq!(face.y, 0);
        assert!(face.width > 0 && face.height > 0);
        assert!(face.x + face.width <= 240);
        assert!(face.y + face.height <= 240);
    }

    #[test]
    fn no_face_yields_none() {
        let image = RgbImage::new(64, 64);
        assert!(locate(&NoFace, &image).is_none());
    }

    #[test]
    fn out_of_range_normals_are_clamped() {
        struct Overshoot;
        impl LandmarkPredictor for Overshoot {
            fn predict(&self, _image: &RgbImage) -> Option<Vec<(f32, f32)>> {
                Some(vec![(1.2, -0.1); LANDMARK_COUNT])
            }
        }

        let image = RgbImage::new(100, 100);
        let (set, _) = locate(&Overshoot, &image).unwrap();
        let points = set.points(FeatureName::FaceOval).unwrap();
        assert!(points.iter().all(|&(x, y)| x == 99 && y == 0));
    }
}
