//! Configuration structures for the sheet evaluation pipeline.
//!
//! This module defines all tunable parameters for bubble detection and answer
//! extraction, organized into logical groups. Every threshold the pipeline
//! applies lives here; nothing geometric is hardcoded in the detection code.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use omr_scan::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`SheetLayout`]: subjects and question counts
//! - [`DetectionConfig`]: binarization and shape-filter parameters
//! - [`ExtractionConfig`]: fill decision parameters

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{OmrError, Result};

/// Complete pipeline configuration for sheet evaluation.
///
/// Contains all parameters needed to process a sheet image from input to
/// answer vector. Can be serialized to/from JSON for reproducible runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sheet layout (subjects, questions per subject)
    pub layout: SheetLayout,

    /// Bubble detection configuration
    pub detection: DetectionConfig,

    /// Answer extraction configuration
    pub extraction: ExtractionConfig,
}

/// Sheet layout description.
///
/// The answer vector length is `subjects.len() * questions_per_subject`;
/// subject blocks are assigned to subjects in the order listed here, not
/// derived from the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Subject names in reading order (top block first)
    pub subjects: Vec<String>,

    /// Questions per subject block
    pub questions_per_subject: usize,
}

/// Bubble detection parameters.
///
/// Controls binarization and the geometric filter that separates bubble
/// contours from noise, text, and borders. All bounds are open intervals
/// (strict inequalities). These values are calibrated for one capture
/// condition; under different lighting or DPI, results degrade silently
/// rather than erroring, so recalibrate here per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Gaussian blur kernel size (must be odd)
    pub blur_kernel_size: i32,

    /// Inverse threshold intensity cutoff (0-255); darker pixels become
    /// foreground
    pub intensity_threshold: f64,

    /// Minimum bounding-box aspect ratio (w/h) for a bubble candidate
    pub min_aspect_ratio: f64,

    /// Maximum bounding-box aspect ratio (w/h) for a bubble candidate
    pub max_aspect_ratio: f64,

    /// Minimum contour area in pixels
    pub min_area: f64,

    /// Maximum contour area in pixels
    pub max_area: f64,

    /// Minimum circularity (4π·area/perimeter²)
    pub min_circularity: f64,

    /// Maximum circularity
    pub max_circularity: f64,
}

/// Answer extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// A bubble counts as filled when its fill ratio strictly exceeds this
    pub fill_ratio_threshold: f64,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            subjects: constants::layout::DEFAULT_SUBJECTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            questions_per_subject: constants::layout::QUESTIONS_PER_SUBJECT,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        use constants::detection::*;
        Self {
            blur_kernel_size: BLUR_KERNEL_SIZE,
            intensity_threshold: INTENSITY_THRESHOLD,
            min_aspect_ratio: MIN_ASPECT_RATIO,
            max_aspect_ratio: MAX_ASPECT_RATIO,
            min_area: MIN_AREA,
            max_area: MAX_AREA,
            min_circularity: MIN_CIRCULARITY,
            max_circularity: MAX_CIRCULARITY,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fill_ratio_threshold: constants::extraction::FILL_RATIO_THRESHOLD,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            layout: SheetLayout::default(),
            detection: DetectionConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl SheetLayout {
    /// Total answer slots on the sheet
    pub fn total_slots(&self) -> usize {
        self.subjects.len() * self.questions_per_subject
    }
}

impl PipelineConfig {
    /// Check the configuration for values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.layout.subjects.is_empty() {
            return Err(OmrError::invalid_parameter("layout.subjects", "empty"));
        }
        if self.layout.questions_per_subject == 0 {
            return Err(OmrError::invalid_parameter(
                "layout.questions_per_subject",
                self.layout.questions_per_subject,
            ));
        }
        if self.detection.blur_kernel_size <= 0 || self.detection.blur_kernel_size % 2 == 0 {
            return Err(OmrError::invalid_parameter(
                "detection.blur_kernel_size",
                self.detection.blur_kernel_size,
            ));
        }
        if !(0.0..=255.0).contains(&self.detection.intensity_threshold) {
            return Err(OmrError::invalid_parameter(
                "detection.intensity_threshold",
                self.detection.intensity_threshold,
            ));
        }
        if self.detection.min_aspect_ratio >= self.detection.max_aspect_ratio {
            return Err(OmrError::invalid_parameter(
                "detection.min_aspect_ratio",
                self.detection.min_aspect_ratio,
            ));
        }
        if self.detection.min_area >= self.detection.max_area {
            return Err(OmrError::invalid_parameter(
                "detection.min_area",
                self.detection.min_area,
            ));
        }
        if self.detection.min_circularity >= self.detection.max_circularity {
            return Err(OmrError::invalid_parameter(
                "detection.min_circularity",
                self.detection.min_circularity,
            ));
        }
        if !(0.0..1.0).contains(&self.extraction.fill_ratio_threshold) {
            return Err(OmrError::invalid_parameter(
                "extraction.fill_ratio_threshold",
                self.extraction.fill_ratio_threshold,
            ));
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &std::path::Path) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &std::path::Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
