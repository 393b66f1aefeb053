//! Face-photo to coloring-book sketch conversion: locate facial features,
//! synthesize a black-on-white line drawing, and encode it as PNG.
//!
//! # Example
//!
//! ```no_run
//! use facesketch::{SketchConverter, SketchStyle};
//!
//! let raw_bytes = std::fs::read("portrait.jpg").unwrap();
//! let sketch = SketchConverter::new(raw_bytes)
//!     .unwrap()
//!     .style(SketchStyle::HeadContour)
//!     .max_dimension(800)
//!     .sketch()
//!     .unwrap();
//! std::fs::write("sketch.png", sketch.to_png().unwrap()).unwrap();
//! ```
#![warn(missing_docs)]

mod clahe;
mod codec;
mod error;
/// Facial feature geometry and the pluggable detection backends.
pub mod features;
/// Landmark index tables and mesh-strategy feature grouping.
pub mod landmarks;
/// Strategy dispatch for feature location.
pub mod locator;
/// Explicit line-art drawing from located features.
pub mod outline;
mod preprocess;
/// Cascade-style region detection strategy.
pub mod region;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;
/// Sketch style algorithms and the canvas constants.
pub mod sketch;
/// Parametric curve smoothing for jagged polylines.
pub mod smooth;

/// Error type returned by facesketch operations.
pub use error::SketchError;
/// Feature geometry types and the two detection backend traits.
pub use features::{
    FaceBounds, FaceDetector, FaceLocation, FeatureGeometry, FeatureName, FeatureRect,
    FeatureSet, LandmarkPredictor,
};
/// Dual-strategy feature locator.
pub use locator::FeatureLocator;
/// Region-strategy locator built from cascade-style detectors.
pub use region::RegionLocator;
#[cfg(feature = "rustface")]
/// Built-in detector that loads a SeetaFace model from disk.
pub use rustface_backend::RustfaceDetector;
/// Canvas paper and ink values.
pub use sketch::{BACKGROUND, TRACE};

use image::GrayImage;
use log::warn;

/// Which sketch algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SketchStyle {
    /// Soft color-dodge trace with sharp Canny detail fused in over the
    /// located facial features. Degrades to the plain trace when no face
    /// is found.
    #[default]
    OutlineDetailed,

    /// Bold multi-scale edge synthesis with contrast equalization and
    /// thickened, denoised strokes.
    ThickenedOutline,

    /// Simplified head contour: one heavy smoothing pass and a blend of
    /// soft and hard edge maps.
    HeadContour,

    /// Minimal single-pass trace; also the resolution for unknown style
    /// names.
    Basic,
}

impl SketchStyle {
    /// Parse a style selector string.
    ///
    /// Accepts the short wire names (`"outline"`, `"detailed"`,
    /// `"artistic"`) and the descriptive aliases. Anything else resolves
    /// to [`SketchStyle::Basic`] deterministically rather than erroring.
    pub fn from_name(name: &str) -> Self {
        match name {
            "outline" | "outline-detailed" => SketchStyle::OutlineDetailed,
            "detailed" | "thickened-outline" => SketchStyle::ThickenedOutline,
            "artistic" | "head-contour" => SketchStyle::HeadContour,
            _ => SketchStyle::Basic,
        }
    }

    /// The canonical short name for this style.
    pub fn name(self) -> &'static str {
        match self {
            SketchStyle::OutlineDetailed => "outline",
            SketchStyle::ThickenedOutline => "detailed",
            SketchStyle::HeadContour => "artistic",
            SketchStyle::Basic => "basic",
        }
    }
}

/// Result of a sketch conversion.
#[derive(Debug, Clone)]
pub struct Sketch {
    /// The finished canvas. Every pixel is either [`BACKGROUND`] or
    /// [`TRACE`], at the dimensions of the (bounded) input image.
    pub canvas: GrayImage,

    /// The style that produced the canvas.
    pub style: SketchStyle,

    /// Bounding box of the located face, if any strategy found one.
    pub face: Option<FaceLocation>,
}

impl Sketch {
    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Encode the canvas as a lossless 8-bit grayscale PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, SketchError> {
        codec::encode_png(&self.canvas)
    }

    /// Encode the canvas as PNG, consuming the sketch.
    pub fn into_png(self) -> Result<Vec<u8>, SketchError> {
        codec::encode_png(&self.canvas)
    }
}

/// Builder for converting face photos into coloring-book sketches.
///
/// Decodes the input image on construction, then applies resizing,
/// feature location, and sketch synthesis with configurable parameters.
pub struct SketchConverter {
    input: Vec<u8>,
    style: SketchStyle,
    max_dimension: u32,
    locator: FeatureLocator,
}

impl SketchConverter {
    /// Create a new converter from raw image bytes (JPEG, PNG, or WebP).
    pub fn new(input: Vec<u8>) -> Result<Self, SketchError> {
        // Validate that the input can be decoded
        codec::detect_format(&input)?;

        Ok(Self {
            input,
            style: SketchStyle::default(),
            max_dimension: 1024,
            locator: FeatureLocator::none(),
        })
    }

    /// Set the sketch style (default: [`SketchStyle::OutlineDetailed`]).
    pub fn style(mut self, style: SketchStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the sketch style from a selector string. Unknown names
    /// resolve to [`SketchStyle::Basic`].
    pub fn style_name(mut self, name: &str) -> Self {
        self.style = SketchStyle::from_name(name);
        self
    }

    /// Set the maximum input dimension in pixels (default: 1024).
    ///
    /// Larger inputs are scaled down preserving aspect ratio before any
    /// other processing; smaller inputs are left untouched.
    pub fn max_dimension(mut self, dimension: u32) -> Self {
        self.max_dimension = dimension;
        self
    }

    /// Attach a dense-landmark predictor for the mesh location strategy.
    ///
    /// ```no_run
    /// use facesketch::{SketchConverter, LandmarkPredictor};
    /// use image::RgbImage;
    ///
    /// struct MyMesh;
    /// impl LandmarkPredictor for MyMesh {
    ///     fn predict(&self, image: &RgbImage) -> Option<Vec<(f32, f32)>> {
    ///         // Your landmark model here
    ///         None
    ///     }
    /// }
    ///
    /// let bytes = std::fs::read("portrait.jpg").unwrap();
    /// let sketch = SketchConverter::new(bytes).unwrap()
    ///     .landmark_predictor(Box::new(MyMesh))
    ///     .sketch().unwrap();
    /// ```
    pub fn landmark_predictor(mut self, predictor: Box<dyn LandmarkPredictor>) -> Self {
        self.locator = self.locator.with_mesh(predictor);
        self
    }

    /// Attach a face detector for the region location strategy, with no
    /// sub-feature detectors. Eye, nose, and mouth regions are then
    /// estimated from face proportions.
    pub fn face_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.locator = self.locator.with_region(RegionLocator::new(detector));
        self
    }

    /// Attach a fully configured region-strategy locator, including any
    /// sub-feature detectors.
    pub fn region_locator(mut self, region: RegionLocator) -> Self {
        self.locator = self.locator.with_region(region);
        self
    }

    /// Run the pipeline and return the finished sketch.
    ///
    /// Feature location failure is never an error: styles that use
    /// located features degrade gracefully, and `face` is simply `None`
    /// in the result.
    pub fn sketch(self) -> Result<Sketch, SketchError> {
        let (rgb, gray) = self.prepare()?;

        let located = self.locator.locate(&rgb);
        let features = located.as_ref().map(|(set, _)| set);
        let canvas = sketch::render_located(&gray, self.style, features);

        Ok(Sketch {
            canvas,
            style: self.style,
            face: located.map(|(_, face)| face),
        })
    }

    /// Run feature location and draw explicit line art instead of
    /// synthesizing edges from the photograph.
    ///
    /// Mesh-located features are drawn as detailed curves; region-located
    /// features as simpler ellipse-and-line geometry. When no face is
    /// found the result is a blank page.
    pub fn feature_outline(self) -> Result<Sketch, SketchError> {
        let (rgb, gray) = self.prepare()?;
        let (width, height) = gray.dimensions();

        if let Some((set, face)) = self.locator.locate_mesh(&rgb) {
            let canvas = outline::draw_mesh_outline(width, height, &set);
            return Ok(Sketch {
                canvas,
                style: self.style,
                face: Some(face),
            });
        }
        if let Some((set, face)) = self.locator.locate_region(&gray) {
            let canvas = outline::draw_region_outline(width, height, &set, face);
            return Ok(Sketch {
                canvas,
                style: self.style,
                face: Some(face),
            });
        }

        warn!("no face found; feature outline is a blank page");
        Ok(Sketch {
            canvas: GrayImage::from_pixel(width, height, image::Luma([BACKGROUND])),
            style: self.style,
            face: None,
        })
    }

    /// Decode, validate, bound, and split the input into its color and
    /// intensity forms.
    fn prepare(&self) -> Result<(image::RgbImage, GrayImage), SketchError> {
        if self.max_dimension == 0 {
            return Err(SketchError::InvalidMaxDimension);
        }

        let decoded = codec::decode_image(&self.input)?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(SketchError::ZeroDimensions);
        }

        let rgb = preprocess::resize_bounded(&decoded.to_rgb8(), self.max_dimension);
        let gray = preprocess::to_intensity(&rgb);
        Ok((rgb, gray))
    }
}
