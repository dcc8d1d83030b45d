//! # omr_scan
//!
//! A Rust crate for scoring bubble-sheet (OMR) exams from photographed or
//! scanned answer sheets.
//!
//! This library evaluates a sheet by:
//! - Binarizing the image and locating bubble candidate regions
//! - Ordering regions in reading order and deciding filled/empty per region
//! - Reconstructing a fixed-length answer vector (padded or truncated)
//! - Comparing against a per-set answer key for per-subject and total scores
//!
//! The pipeline is stateless per evaluation: one image in, one result out,
//! no caching between calls. Thresholds are configuration, not constants —
//! they are calibrated for one scan resolution and should be tuned per
//! deployment through [`PipelineConfig`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use omr_scan::{evaluate_sheet, AnswerKeySet, PipelineConfig};
//! use std::path::Path;
//!
//! let config = PipelineConfig::default();
//! let keys = AnswerKeySet::builtin(&config.layout);
//! let result = evaluate_sheet(Path::new("sheet.jpg"), "A", &config, &keys)?;
//! println!("total: {}/{}", result.score.total, result.score.max_total);
//! # Ok::<(), omr_scan::OmrError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod extraction;
pub mod image_loader;
pub mod scoring;

pub use config::{DetectionConfig, ExtractionConfig, PipelineConfig, SheetLayout};
pub use detection::{BubbleDetector, BubbleRegion, DetectionResult};
pub use error::{OmrError, Result};
pub use extraction::{AnswerExtractor, AnswerVector, ExtractionDiagnostics};
pub use scoring::{score_sheet, AnswerKey, AnswerKeySet, SheetScore, SubjectScore};

/// Complete evaluation result for one sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetResult {
    /// Answer set the sheet was scored against
    pub set: String,
    /// Extracted 0/1 marks with detection diagnostics
    pub answers: AnswerVector,
    /// Per-subject and total scores
    pub score: SheetScore,
}

/// Evaluate one sheet image against an answer set
///
/// This is the main entry point. It loads and decodes the image, extracts
/// the answer vector, and scores it against the key for `set`.
///
/// # Arguments
///
/// * `image_path` - Path to the sheet image (JPEG, PNG, ...)
/// * `set` - Answer set identifier, e.g. "A"
/// * `config` - Pipeline configuration (layout and thresholds)
/// * `keys` - Answer key set containing `set`
///
/// # Errors
///
/// Returns [`OmrError`] if:
/// - The configuration or key set is inconsistent
/// - The image cannot be loaded, or decodes to zero dimensions
/// - `set` is not in the key set
///
/// Detection miscounts do not error; they surface in
/// [`AnswerVector::diagnostics`].
pub fn evaluate_sheet(
    image_path: &Path,
    set: &str,
    config: &PipelineConfig,
    keys: &AnswerKeySet,
) -> Result<SheetResult> {
    config.validate()?;
    keys.validate(&config.layout)?;
    let key = keys.get(set)?;

    let image = image_loader::load_image(image_path)?;
    let extractor = AnswerExtractor::new(config);
    let answers = extractor.extract(&image)?;
    let score = score_sheet(&answers, key, &config.layout)?;

    Ok(SheetResult {
        set: set.to_string(),
        answers,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_sheet_missing_file() {
        let config = PipelineConfig::default();
        let keys = AnswerKeySet::builtin(&config.layout);
        let result = evaluate_sheet(Path::new("no_such_sheet.png"), "A", &config, &keys);
        assert!(matches!(result, Err(OmrError::ImageLoad { .. })));
    }

    #[test]
    fn test_evaluate_sheet_unknown_set() {
        let config = PipelineConfig::default();
        let keys = AnswerKeySet::builtin(&config.layout);
        let result = evaluate_sheet(Path::new("no_such_sheet.png"), "Q", &config, &keys);
        assert!(matches!(result, Err(OmrError::UnknownAnswerSet { .. })));
    }

    #[test]
    fn test_sheet_result_serialization() {
        let config = PipelineConfig::default();
        let keys = AnswerKeySet::builtin(&config.layout);
        let answers = AnswerVector::from_marks(vec![1; 100], 100);
        let score = score_sheet(&answers, keys.get("A").unwrap(), &config.layout).unwrap();

        let result = SheetResult {
            set: "A".to_string(),
            answers,
            score,
        };

        let json = serde_json::to_string(&result).unwrap();
        let restored: SheetResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, restored);
    }
}
