//! Explicit line-art rendering from located facial features.
//!
//! Unlike the edge-synthesis styles, this mode ignores the photograph's
//! pixels entirely and draws the located geometry onto a blank page:
//! thick closed curves for the face oval and mouth, finer strokes for
//! detail, plus small accents (irises, brow hatching, a nose shadow and
//! cheek contours) that give the drawing depth.

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use log::debug;

use crate::features::{FaceLocation, FeatureName, FeatureRect, FeatureSet};
use crate::sketch::{BACKGROUND, TRACE};
use crate::smooth::smooth_curve;

/// Resampled point count for the smoothed face oval.
const OVAL_SAMPLES: usize = 100;

const THICK: u32 = 5;
const MEDIUM: u32 = 4;
const THIN: u32 = 3;
const DETAIL: u32 = 2;

/// Iris radius in pixels.
const IRIS_RADIUS: i32 = 12;
/// Filled pupil radius in pixels.
const PUPIL_RADIUS: i32 = 5;
/// Vertical length of each eyebrow hair hatch.
const HATCH_LENGTH: i32 = 10;
/// Half-width of the shadow stroke under the nose.
const NOSE_SHADOW_REACH: i32 = 15;

/// Draw line art from a dense landmark-mesh feature set.
pub fn draw_mesh_outline(width: u32, height: u32, set: &FeatureSet) -> GrayImage {
    let mut canvas = blank(width, height);
    debug!("drawing mesh outline from {} feature groups", set.len());

    if let Some(oval) = set.points(FeatureName::FaceOval) {
        let smoothed = smooth_curve(oval, OVAL_SAMPLES);
        draw_polyline(&mut canvas, &smoothed, true, THICK);
    }
    for jaw in [FeatureName::JawLeft, FeatureName::JawRight] {
        if let Some(points) = set.points(jaw) {
            draw_polyline(&mut canvas, points, false, MEDIUM);
        }
    }

    for eye in [FeatureName::LeftEye, FeatureName::RightEye] {
        if let Some(points) = set.points(eye) {
            draw_polyline(&mut canvas, points, true, MEDIUM);
            if points.len() > 4 {
                let (cx, cy) = centroid(points);
                draw_arc(&mut canvas, cx, cy, IRIS_RADIUS, IRIS_RADIUS, 0.0, 360.0, MEDIUM);
                draw_filled_circle_mut(&mut canvas, (cx, cy), PUPIL_RADIUS, Luma([TRACE]));
            }
        }
    }

    for brow in [FeatureName::LeftEyebrow, FeatureName::RightEyebrow] {
        if let Some(points) = set.points(brow) {
            draw_polyline(&mut canvas, points, false, THICK);
            // Hair hatching: a short vertical stroke at every third
            // vertex, leaving the final vertex unhatched.
            for &(x, y) in points[..points.len().saturating_sub(1)].iter().step_by(3) {
                draw_stroke(&mut canvas, (x, y), (x, y + HATCH_LENGTH), DETAIL);
            }
        }
    }

    if let Some(points) = set.points(FeatureName::NoseBridge) {
        draw_polyline(&mut canvas, points, false, MEDIUM);
    }
    if let Some(points) = set.points(FeatureName::NoseTip) {
        draw_polyline(&mut canvas, points, false, MEDIUM);
    }
    if let Some(points) = set.points(FeatureName::NoseWings) {
        draw_polyline(&mut canvas, points, false, THIN);
    }

    if let Some(points) = set.points(FeatureName::MouthOuter) {
        draw_polyline(&mut canvas, points, true, THICK);
    }
    if let Some(points) = set.points(FeatureName::UpperLip) {
        draw_polyline(&mut canvas, points, false, MEDIUM);
    }
    if let Some(points) = set.points(FeatureName::LowerLip) {
        draw_polyline(&mut canvas, points, false, MEDIUM);
    }
    if let Some(points) = set.points(FeatureName::Chin) {
        draw_polyline(&mut canvas, points, false, MEDIUM);
    }

    draw_depth_accents(&mut canvas, set);
    canvas
}

/// Shadow under the nose and half-ellipse cheek contours, anchored on
/// the face-oval bounding box.
fn draw_depth_accents(canvas: &mut GrayImage, set: &FeatureSet) {
    let Some(oval) = set.points(FeatureName::FaceOval) else {
        return;
    };
    if oval.is_empty() {
        return;
    }
    let (x_min, y_min, x_max, y_max) = bounds(oval);

    if let Some(tip) = set.points(FeatureName::NoseTip) {
        if !tip.is_empty() {
            // Anchor on the per-axis maxima of the tip points.
            let (_, _, tip_x, tip_y) = bounds(tip);
            let shadow_y = tip_y + 5;
            draw_stroke(
                canvas,
                (tip_x - NOSE_SHADOW_REACH, shadow_y),
                (tip_x + NOSE_SHADOW_REACH, shadow_y),
                DETAIL,
            );
        }
    }

    let cheek_left = x_min + (x_max - x_min) / 4;
    let cheek_right = x_max - (x_max - x_min) / 4;
    let cheek_y = y_min + (y_max - y_min) / 2;
    draw_arc(canvas, cheek_left, cheek_y, 8, 15, 0.0, 180.0, DETAIL);
    draw_arc(canvas, cheek_right, cheek_y, 8, 15, 0.0, 180.0, DETAIL);
}

/// Draw line art from cascade-style rectangular feature regions.
pub fn draw_region_outline(
    width: u32,
    height: u32,
    set: &FeatureSet,
    face: FaceLocation,
) -> GrayImage {
    let mut canvas = blank(width, height);
    debug!("drawing region outline from {} feature rects", set.len());

    draw_arc(
        &mut canvas,
        face.x + face.width / 2,
        face.y + face.height / 2,
        face.width / 2,
        face.height / 2,
        0.0,
        360.0,
        DETAIL,
    );

    let left = set.rect(FeatureName::LeftEye);
    let right = set.rect(FeatureName::RightEye);
    if let (Some(l), Some(r)) = (left, right) {
        for eye in [l, r] {
            draw_eye_rect(&mut canvas, eye);
            // Brow stroke a quarter eye-height above the lid.
            let brow_y = eye.y - eye.height / 4;
            draw_stroke(&mut canvas, (eye.x, brow_y), (eye.x + eye.width, brow_y), 1);
        }
    } else if let Some(eye) = set.rect(FeatureName::Eye) {
        draw_eye_rect(&mut canvas, eye);
    }

    if let Some(nose) = set.rect(FeatureName::Nose) {
        let center_x = nose.x + nose.width / 2;
        draw_stroke(
            &mut canvas,
            (center_x, nose.y),
            (center_x, nose.y + nose.height),
            1,
        );
        draw_arc(
            &mut canvas,
            center_x,
            nose.y + nose.height - nose.height / 4,
            nose.width / 3,
            nose.height / 4,
            0.0,
            360.0,
            1,
        );
    }

    if let Some(mouth) = set.rect(FeatureName::Mouth) {
        let mouth_y = mouth.y + mouth.height / 2;
        draw_stroke(
            &mut canvas,
            (mouth.x, mouth_y),
            (mouth.x + mouth.width, mouth_y),
            1,
        );
        let center_x = mouth.x + mouth.width / 2;
        let rx = mouth.width / 2;
        let ry = mouth.height / 4;
        // Upper lip bows downward, lower lip upward.
        draw_arc(&mut canvas, center_x, mouth.y + mouth.height / 3, rx, ry, 0.0, 180.0, 1);
        draw_arc(
            &mut canvas,
            center_x,
            mouth.y + 2 * mouth.height / 3,
            rx,
            ry,
            180.0,
            360.0,
            1,
        );
    }

    canvas
}

fn draw_eye_rect(canvas: &mut GrayImage, eye: FeatureRect) {
    draw_arc(
        canvas,
        eye.x + eye.width / 2,
        eye.y + eye.height / 2,
        eye.width / 2,
        eye.height / 2,
        0.0,
        360.0,
        1,
    );
}

fn blank(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([BACKGROUND]))
}

fn centroid(points: &[(i32, i32)]) -> (i32, i32) {
    let n = points.len() as i64;
    let (sx, sy) = points
        .iter()
        .fold((0i64, 0i64), |(sx, sy), &(x, y)| (sx + i64::from(x), sy + i64::from(y)));
    ((sx / n) as i32, (sy / n) as i32)
}

/// Per-axis minima and maxima of a point list.
fn bounds(points: &[(i32, i32)]) -> (i32, i32, i32, i32) {
    let mut x_min = i32::MAX;
    let mut y_min = i32::MAX;
    let mut x_max = i32::MIN;
    let mut y_max = i32::MIN;
    for &(x, y) in points {
        x_min = x_min.min(x);
        y_min = y_min.min(y);
        x_max = x_max.max(x);
        y_max = y_max.max(y);
    }
    (x_min, y_min, x_max, y_max)
}

/// Stamped-offset disk giving a line segment visible thickness.
fn stamp_offsets(thickness: u32) -> Vec<(f32, f32)> {
    let r = (thickness / 2) as i32;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                offsets.push((dx as f32, dy as f32));
            }
        }
    }
    offsets
}

fn draw_stroke(canvas: &mut GrayImage, start: (i32, i32), end: (i32, i32), thickness: u32) {
    for (dx, dy) in stamp_offsets(thickness) {
        draw_line_segment_mut(
            canvas,
            (start.0 as f32 + dx, start.1 as f32 + dy),
            (end.0 as f32 + dx, end.1 as f32 + dy),
            Luma([TRACE]),
        );
    }
}

fn draw_polyline(canvas: &mut GrayImage, points: &[(i32, i32)], closed: bool, thickness: u32) {
    if points.len() < 2 {
        return;
    }
    for pair in points.windows(2) {
        draw_stroke(canvas, pair[0], pair[1], thickness);
    }
    if closed {
        draw_stroke(canvas, points[points.len() - 1], points[0], thickness);
    }
}

/// Sampled elliptical arc. Angles are in degrees with 0° along +x and
/// the sweep running clockwise in image coordinates (y grows downward),
/// so 0°..180° is the lower half of the ellipse.
fn draw_arc(
    canvas: &mut GrayImage,
    cx: i32,
    cy: i32,
    rx: i32,
    ry: i32,
    start_deg: f32,
    end_deg: f32,
    thickness: u32,
) {
    if rx <= 0 || ry <= 0 {
        return;
    }
    const SAMPLES: u32 = 90;
    let mut arc = Vec::with_capacity(SAMPLES as usize + 1);
    for i in 0..=SAMPLES {
        let t = i as f32 / SAMPLES as f32;
        let theta = (start_deg + t * (end_deg - start_deg)).to_radians();
        let x = cx as f32 + rx as f32 * theta.cos();
        let y = cy as f32 + ry as f32 * theta.sin();
        arc.push((x.round() as i32, y.round() as i32));
    }
    draw_polyline(canvas, &arc, false, thickness);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureGeometry;

    fn ink_count(canvas: &GrayImage) -> usize {
        canvas.pixels().filter(|p| p.0[0] == TRACE).count()
    }

    fn is_binary(canvas: &GrayImage) -> bool {
        canvas
            .pixels()
            .all(|p| p.0[0] == TRACE || p.0[0] == BACKGROUND)
    }

    #[test]
    fn empty_feature_set_yields_blank_page() {
        let set = FeatureSet::new();
        let canvas = draw_mesh_outline(100, 100, &set);
        assert_eq!(ink_count(&canvas), 0);
    }

    #[test]
    fn mesh_outline_draws_face_oval() {
        let mut set = FeatureSet::new();
        set.insert(
            FeatureName::FaceOval,
            FeatureGeometry::Polyline(vec![
                (50, 20),
                (80, 50),
                (50, 90),
                (20, 50),
            ]),
        );
        let canvas = draw_mesh_outline(100, 100, &set);
        assert!(is_binary(&canvas));
        assert!(ink_count(&canvas) > 0);
    }

    #[test]
    fn eye_with_enough_points_gets_iris_and_pupil() {
        let mut set = FeatureSet::new();
        set.insert(
            FeatureName::LeftEye,
            FeatureGeometry::Polyline(vec![
                (30, 50),
                (40, 45),
                (50, 45),
                (60, 50),
                (50, 55),
                (40, 55),
            ]),
        );
        let canvas = draw_mesh_outline(100, 100, &set);
        // Pupil is filled at the centroid.
        assert_eq!(canvas.get_pixel(45, 50).0[0], TRACE);
    }

    #[test]
    fn brow_hatching_skips_final_vertex() {
        let mut set = FeatureSet::new();
        set.insert(
            FeatureName::LeftEyebrow,
            FeatureGeometry::Polyline(vec![(10, 50), (20, 50), (30, 50), (40, 50)]),
        );
        let canvas = draw_mesh_outline(100, 100, &set);

        // Vertex 0 is hatched: a vertical stroke well below the brow line.
        assert_eq!(canvas.get_pixel(10, 58).0[0], TRACE);
        // Vertex 3 is the final vertex and must not be, even though the
        // step lands on it.
        assert_eq!(canvas.get_pixel(40, 58).0[0], BACKGROUND);
    }

    #[test]
    fn strokes_are_clipped_at_canvas_edges() {
        let mut set = FeatureSet::new();
        set.insert(
            FeatureName::Chin,
            FeatureGeometry::Polyline(vec![(-20, -20), (150, 150)]),
        );
        // Out-of-bounds coordinates must not panic.
        let canvas = draw_mesh_outline(100, 100, &set);
        assert!(ink_count(&canvas) > 0);
    }

    #[test]
    fn region_outline_draws_all_feature_rects() {
        let mut set = FeatureSet::new();
        for (name, rect) in [
            (FeatureName::LeftEye, FeatureRect { x: 25, y: 35, width: 15, height: 10 }),
            (FeatureName::RightEye, FeatureRect { x: 60, y: 35, width: 15, height: 10 }),
            (FeatureName::Nose, FeatureRect { x: 42, y: 45, width: 16, height: 20 }),
            (FeatureName::Mouth, FeatureRect { x: 35, y: 70, width: 30, height: 12 }),
        ] {
            set.insert(name, FeatureGeometry::Region(rect));
        }
        let face = FaceLocation { x: 10, y: 10, width: 80, height: 90 };

        let canvas = draw_region_outline(100, 100, &set, face);
        assert!(is_binary(&canvas));

        // Nose bridge is a vertical stroke through the rect center.
        assert_eq!(canvas.get_pixel(50, 50).0[0], TRACE);
        // Mouth line runs across the rect at mid-height.
        assert_eq!(canvas.get_pixel(40, 76).0[0], TRACE);
    }

    #[test]
    fn single_eye_fallback_draws_one_ellipse() {
        let mut set = FeatureSet::new();
        set.insert(
            FeatureName::Eye,
            FeatureGeometry::Region(FeatureRect { x: 40, y: 40, width: 20, height: 10 }),
        );
        let face = FaceLocation { x: 0, y: 0, width: 100, height: 100 };

        let with_eye = draw_region_outline(100, 100, &set, face);
        let without = draw_region_outline(100, 100, &FeatureSet::new(), face);
        assert!(ink_count(&with_eye) > ink_count(&without));
    }
}
