//! Bubble candidate detection on binarized sheet images
//!
//! Implements bubble detection that:
//! - Binarizes the sheet with grayscale conversion, Gaussian smoothing, and
//!   inverse thresholding (marks are darker than the page)
//! - Extracts external contours of connected foreground components
//! - Filters contours by aspect ratio, area, and circularity
//! - Orders surviving regions in row-major reading order
//!
//! The ordering is load-bearing: position in the sorted sequence is the only
//! correlation between a detected region and a question/option slot. No
//! per-region label exists, so the sheet layout must place bubbles such that
//! the filtered, sorted regions land in exactly the expected reading order.

use opencv::{
    core::{Mat, Point, Size, Vector, BORDER_DEFAULT},
    imgproc::{
        arc_length, bounding_rect, contour_area, cvt_color, find_contours, gaussian_blur,
        threshold, CHAIN_APPROX_SIMPLE, COLOR_BGR2GRAY, RETR_EXTERNAL, THRESH_BINARY_INV,
    },
    prelude::*,
};

use crate::config::DetectionConfig;
use crate::constants;
use crate::error::{OmrError, Result};

type VectorOfPoint = Vector<Point>;

/// A bubble candidate: the bounding box of a contour that passed the
/// geometric filter. Coordinates are in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BubbleRegion {
    /// Bounding box as an OpenCV rect, for cropping the mask
    pub fn rect(&self) -> opencv::core::Rect {
        opencv::core::Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Bounding box area in pixels
    pub fn box_area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Detection output: ordered bubble candidates plus the binary mask they were
/// found in. The mask is kept so the extractor can test fill state without
/// re-binarizing; both are scoped to one evaluation and dropped after it.
#[derive(Debug)]
pub struct DetectionResult {
    /// Bubble candidates in row-major reading order (top-to-bottom, then
    /// left-to-right within a row)
    pub regions: Vec<BubbleRegion>,
    /// Binary mask (foreground 255 = mark-dark pixels)
    pub mask: Mat,
}

/// Geometric measurements of one contour, tested against the filter bounds.
///
/// Split out from the OpenCV plumbing so the filter policy is testable with
/// exact synthetic values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContourStats {
    pub area: f64,
    pub perimeter: f64,
    pub width: i32,
    pub height: i32,
}

impl ContourStats {
    pub(crate) fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Shape metric `4π·area / perimeter²`, 1.0 for a perfect circle.
    /// Callers must skip zero-perimeter contours before computing this.
    pub(crate) fn circularity(&self) -> f64 {
        4.0 * std::f64::consts::PI * self.area / (self.perimeter * self.perimeter)
    }

    /// Filter policy: all three bounds are open intervals, so a value landing
    /// exactly on a bound is rejected.
    pub(crate) fn is_bubble(&self, config: &DetectionConfig) -> bool {
        within_open(self.aspect_ratio(), config.min_aspect_ratio, config.max_aspect_ratio)
            && within_open(self.area, config.min_area, config.max_area)
            && within_open(self.circularity(), config.min_circularity, config.max_circularity)
    }
}

/// Strict open-interval membership
fn within_open(value: f64, min: f64, max: f64) -> bool {
    value > min && value < max
}

/// Bubble detector implementing threshold-binarization and shape filtering
#[derive(Debug, Clone)]
pub struct BubbleDetector {
    config: DetectionConfig,
}

impl Default for BubbleDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl BubbleDetector {
    /// Create a detector with the given configuration
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Detect bubble candidates in a sheet image
    ///
    /// # Arguments
    ///
    /// * `image` - 3-channel BGR sheet image
    ///
    /// # Returns
    ///
    /// [`DetectionResult`] with regions in reading order and the binary mask.
    ///
    /// If fewer or more regions pass the filter than the sheet actually
    /// contains, no error is raised: the extractor masks miscounts by
    /// padding or truncating the answer vector.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::MalformedImage`] for an empty image and
    /// [`OmrError::OpenCv`] if an image operation fails.
    pub fn detect(&self, image: &Mat) -> Result<DetectionResult> {
        if image.empty() {
            return Err(OmrError::MalformedImage {
                reason: "input image has no pixels".into(),
            });
        }

        let mask = self.binarize(image)?;
        let contours = self.find_candidate_contours(&mask)?;
        let regions = self.filter_and_order(&contours)?;

        Ok(DetectionResult { regions, mask })
    }

    /// Grayscale, blur, and inverse-threshold the sheet image
    fn binarize(&self, image: &Mat) -> Result<Mat> {
        let mut gray = Mat::default();
        cvt_color(
            image,
            &mut gray,
            COLOR_BGR2GRAY,
            0,
        )
        .map_err(|e| OmrError::opencv("grayscale conversion", e))?;

        // Sigma 0 lets OpenCV derive it from the kernel size
        let k = self.config.blur_kernel_size;
        let mut blurred = Mat::default();
        gaussian_blur(
            &gray,
            &mut blurred,
            Size::new(k, k),
            0.0,
            0.0,
            BORDER_DEFAULT,
        )
        .map_err(|e| OmrError::opencv("Gaussian blur", e))?;

        // Inverse: pixels darker than the cutoff become foreground
        let mut mask = Mat::default();
        threshold(
            &blurred,
            &mut mask,
            self.config.intensity_threshold,
            constants::detection::THRESHOLD_MAX_VALUE,
            THRESH_BINARY_INV,
        )
        .map_err(|e| OmrError::opencv("inverse threshold", e))?;

        Ok(mask)
    }

    /// External contours only: bubble shapes are closed blobs, holes and
    /// child contours carry no extra information
    fn find_candidate_contours(&self, mask: &Mat) -> Result<Vector<VectorOfPoint>> {
        let mut contours = Vector::<VectorOfPoint>::new();
        find_contours(
            mask,
            &mut contours,
            RETR_EXTERNAL,
            CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .map_err(|e| OmrError::opencv("contour detection", e))?;
        Ok(contours)
    }

    /// Apply the geometric filter and sort survivors into reading order
    fn filter_and_order(&self, contours: &Vector<VectorOfPoint>) -> Result<Vec<BubbleRegion>> {
        let mut regions = Vec::new();

        for contour in contours.iter() {
            let rect = bounding_rect(&contour)
                .map_err(|e| OmrError::opencv("bounding rect", e))?;
            let area = contour_area(&contour, false)
                .map_err(|e| OmrError::opencv("contour area", e))?;
            let perimeter = arc_length(&contour, true)
                .map_err(|e| OmrError::opencv("arc length", e))?;

            // Degenerate single-pixel or empty contour; skipping also guards
            // the division in the circularity metric
            if perimeter == 0.0 {
                continue;
            }

            let stats = ContourStats {
                area,
                perimeter,
                width: rect.width,
                height: rect.height,
            };

            if stats.is_bubble(&self.config) {
                regions.push(BubbleRegion {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                });
            }
        }

        // Row-major reading order: top-to-bottom, then left-to-right
        regions.sort_by_key(|r| (r.y, r.x));

        Ok(regions)
    }
}
