//! Answer vector extraction from detected bubble regions
//!
//! Implements answer extraction that:
//! - Measures the fill ratio of each region against the binary mask
//! - Decides filled/empty with a strict threshold
//! - Normalizes the result to a fixed-length 0/1 vector
//!
//! Detection miscounts are masked, not raised: the vector is padded with
//! zeros or truncated to the configured slot count so downstream scoring
//! always sees a fixed shape. The pad/truncate counts are reported in
//! [`ExtractionDiagnostics`] for callers that need observability.

use opencv::core::{count_non_zero, Mat};
use serde::{Deserialize, Serialize};

use crate::config::{ExtractionConfig, PipelineConfig};
use crate::detection::{BubbleDetector, BubbleRegion};
use crate::error::{OmrError, Result};

/// Counts describing how far detection deviated from the expected slot count.
///
/// All-zero diagnostics mean the detector found exactly as many regions as
/// the sheet has slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionDiagnostics {
    /// Regions that passed the geometric filter
    pub detected_regions: usize,
    /// Trailing zero entries appended to reach the slot count
    pub padded: usize,
    /// Detected marks dropped beyond the slot count
    pub truncated: usize,
}

/// Fixed-length sequence of 0/1 marks, one per answer slot.
///
/// Indexed by `subject_index * questions_per_subject + question_index`.
/// The length is always exactly the layout's slot count, regardless of how
/// many regions the detector produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerVector {
    values: Vec<u8>,
    diagnostics: ExtractionDiagnostics,
}

impl AnswerVector {
    /// Normalize raw marks to exactly `total_slots` entries
    pub(crate) fn from_marks(mut marks: Vec<u8>, total_slots: usize) -> Self {
        let detected_regions = marks.len();
        let (padded, truncated) = if detected_regions < total_slots {
            (total_slots - detected_regions, 0)
        } else {
            (0, detected_regions - total_slots)
        };
        marks.resize(total_slots, 0);

        Self {
            values: marks,
            diagnostics: ExtractionDiagnostics {
                detected_regions,
                padded,
                truncated,
            },
        }
    }

    /// Marks in slot order, each 0 or 1
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// How detection deviated from the expected slot count, if at all
    pub fn diagnostics(&self) -> ExtractionDiagnostics {
        self.diagnostics
    }

    /// Contiguous per-subject blocks, in layout order
    pub fn subject_blocks(&self, questions_per_subject: usize) -> impl Iterator<Item = &[u8]> {
        self.values.chunks(questions_per_subject)
    }
}

/// Decide filled/empty from a fill ratio. Strictly greater than: a region at
/// exactly the threshold is not marked filled.
fn mark_from_ratio(fill_ratio: f64, threshold: f64) -> u8 {
    u8::from(fill_ratio > threshold)
}

/// Answer extractor: runs the detector and reads fill state per region
#[derive(Debug, Clone)]
pub struct AnswerExtractor {
    detector: BubbleDetector,
    config: ExtractionConfig,
    total_slots: usize,
}

impl Default for AnswerExtractor {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl AnswerExtractor {
    /// Create an extractor from a pipeline configuration
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            detector: BubbleDetector::new(config.detection.clone()),
            config: config.extraction.clone(),
            total_slots: config.layout.total_slots(),
        }
    }

    /// Extract the answer vector from a sheet image
    ///
    /// Runs bubble detection, measures each region's fill ratio against the
    /// binary mask, and normalizes to the configured slot count. A pure
    /// function of the pixel data: the same image always yields the same
    /// vector.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::MalformedImage`] for an empty image and
    /// [`OmrError::OpenCv`] if an image operation fails. Detection miscounts
    /// are not errors.
    pub fn extract(&self, image: &Mat) -> Result<AnswerVector> {
        let detection = self.detector.detect(image)?;
        let marks = self.read_marks(&detection.mask, &detection.regions)?;
        Ok(AnswerVector::from_marks(marks, self.total_slots))
    }

    /// Fill ratio per region: foreground pixels over bounding-box area
    fn read_marks(&self, mask: &Mat, regions: &[BubbleRegion]) -> Result<Vec<u8>> {
        let mut marks = Vec::with_capacity(regions.len());

        for region in regions {
            let roi = Mat::roi(mask, region.rect())
                .map_err(|e| OmrError::opencv("mask crop", e))?;
            let foreground = count_non_zero(&roi)
                .map_err(|e| OmrError::opencv("foreground count", e))?;

            let fill_ratio = foreground as f64 / region.box_area() as f64;
            marks.push(mark_from_ratio(fill_ratio, self.config.fill_ratio_threshold));
        }

        Ok(marks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC1};

    fn grid_regions(count: usize) -> Vec<BubbleRegion> {
        // Reading-order grid of 20x20 boxes, 10 per row
        (0..count)
            .map(|i| BubbleRegion {
                x: (i % 10) as i32 * 30,
                y: (i / 10) as i32 * 30,
                width: 20,
                height: 20,
            })
            .collect()
    }

    fn uniform_mask(value: f64) -> Mat {
        Mat::new_rows_cols_with_default(400, 400, CV_8UC1, Scalar::all(value)).unwrap()
    }

    #[test]
    fn test_fill_decision_is_strict() {
        assert_eq!(mark_from_ratio(0.5, 0.5), 0);
        assert_eq!(mark_from_ratio(0.51, 0.5), 1);
        assert_eq!(mark_from_ratio(0.49, 0.5), 0);
        assert_eq!(mark_from_ratio(1.0, 0.5), 1);
    }

    #[test]
    fn test_padding_to_slot_count() {
        let vector = AnswerVector::from_marks(vec![1; 95], 100);
        assert_eq!(vector.len(), 100);
        assert_eq!(&vector.values()[..95], &[1; 95][..]);
        assert_eq!(&vector.values()[95..], &[0; 5][..]);
        assert_eq!(
            vector.diagnostics(),
            ExtractionDiagnostics {
                detected_regions: 95,
                padded: 5,
                truncated: 0,
            }
        );
    }

    #[test]
    fn test_truncation_to_slot_count() {
        let mut marks = vec![0; 120];
        for (i, mark) in marks.iter_mut().enumerate() {
            *mark = (i % 2) as u8;
        }
        let vector = AnswerVector::from_marks(marks.clone(), 100);
        assert_eq!(vector.len(), 100);
        // First 100 in detection order survive
        assert_eq!(vector.values(), &marks[..100]);
        assert_eq!(
            vector.diagnostics(),
            ExtractionDiagnostics {
                detected_regions: 120,
                padded: 0,
                truncated: 20,
            }
        );
    }

    #[test]
    fn test_exact_count_has_clean_diagnostics() {
        let vector = AnswerVector::from_marks(vec![1; 100], 100);
        assert_eq!(vector.diagnostics(), ExtractionDiagnostics {
            detected_regions: 100,
            padded: 0,
            truncated: 0,
        });
    }

    #[test]
    fn test_subject_blocks_partition() {
        let marks: Vec<u8> = (0..100).map(|i| (i / 20 % 2) as u8).collect();
        let vector = AnswerVector::from_marks(marks, 100);

        let blocks: Vec<&[u8]> = vector.subject_blocks(20).collect();
        assert_eq!(blocks.len(), 5);
        for block in &blocks {
            assert_eq!(block.len(), 20);
        }
        assert!(blocks[0].iter().all(|&m| m == 0));
        assert!(blocks[1].iter().all(|&m| m == 1));
    }

    #[test]
    fn test_all_foreground_mask_reads_ones() {
        let extractor = AnswerExtractor::default();
        let mask = uniform_mask(255.0);
        let regions = grid_regions(100);

        let marks = extractor.read_marks(&mask, &regions).unwrap();
        assert_eq!(marks.len(), 100);
        assert!(marks.iter().all(|&m| m == 1));
    }

    #[test]
    fn test_all_background_mask_reads_zeros() {
        let extractor = AnswerExtractor::default();
        let mask = uniform_mask(0.0);
        let regions = grid_regions(100);

        let marks = extractor.read_marks(&mask, &regions).unwrap();
        assert_eq!(marks.len(), 100);
        assert!(marks.iter().all(|&m| m == 0));
    }

    #[test]
    fn test_extract_rejects_empty_image() {
        let extractor = AnswerExtractor::default();
        let empty = Mat::default();
        assert!(matches!(
            extractor.extract(&empty),
            Err(OmrError::MalformedImage { .. })
        ));
    }
}
