//! Default thresholds and sheet layout constants
//!
//! These are the baseline values used by `PipelineConfig::default()`. All of
//! them were tuned empirically against one scan resolution and print format;
//! deployments with a different DPI or sheet stock should override them
//! through the configuration object rather than editing this module.

/// Sheet layout defaults
pub mod layout {
    /// Number of subject blocks on the sheet
    pub const SUBJECT_COUNT: usize = 5;

    /// Questions per subject block
    pub const QUESTIONS_PER_SUBJECT: usize = 20;

    /// Total answer slots on the sheet
    pub const ANSWER_SLOTS: usize = SUBJECT_COUNT * QUESTIONS_PER_SUBJECT;

    /// Subject names in reading order (top block first)
    pub const DEFAULT_SUBJECTS: [&str; SUBJECT_COUNT] =
        ["PYTHON", "DATA ANALYSIS", "MySQL", "POWER BI", "Adv STATS"];
}

/// Bubble detection parameters
pub mod detection {
    /// Gaussian blur kernel size (must be odd)
    pub const BLUR_KERNEL_SIZE: i32 = 5;

    /// Intensity cutoff for inverse binarization: pixels darker than this
    /// become foreground. Assumes marks are darker than the page.
    pub const INTENSITY_THRESHOLD: f64 = 150.0;

    /// Foreground value written by the threshold
    pub const THRESHOLD_MAX_VALUE: f64 = 255.0;

    /// Bounding-box aspect ratio bounds (open interval): near-square boxes,
    /// consistent with round or oval bubbles
    pub const MIN_ASPECT_RATIO: f64 = 0.8;
    pub const MAX_ASPECT_RATIO: f64 = 1.2;

    /// Contour area bounds in pixels (open interval): rejects noise specks
    /// below and text blocks or borders above
    pub const MIN_AREA: f64 = 200.0;
    pub const MAX_AREA: f64 = 2000.0;

    /// Circularity bounds (open interval), 1.0 for a perfect circle:
    /// rejects stray lines and squared cells
    pub const MIN_CIRCULARITY: f64 = 0.7;
    pub const MAX_CIRCULARITY: f64 = 1.2;
}

/// Answer extraction parameters
pub mod extraction {
    /// A bubble counts as filled when its foreground fill ratio strictly
    /// exceeds this fraction of the bounding box
    pub const FILL_RATIO_THRESHOLD: f64 = 0.5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_totals() {
        assert_eq!(layout::ANSWER_SLOTS, 100);
        assert_eq!(layout::DEFAULT_SUBJECTS.len(), layout::SUBJECT_COUNT);
    }

    #[test]
    fn test_threshold_ranges() {
        assert!(detection::MIN_ASPECT_RATIO < detection::MAX_ASPECT_RATIO);
        assert!(detection::MIN_AREA < detection::MAX_AREA);
        assert!(detection::MIN_CIRCULARITY < detection::MAX_CIRCULARITY);
        assert_eq!(detection::BLUR_KERNEL_SIZE % 2, 1);
    }
}
