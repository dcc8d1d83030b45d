//! Answer-key comparison and score aggregation
//!
//! The scorer is a thin collaborator on top of the extraction core: it folds
//! an answer vector against a selected key, counting positions where the
//! marked value equals the expected value (an unmarked slot matching an
//! expected-empty slot counts as correct). Keys are data, loaded from
//! configuration or supplied programmatically; the builtin sets reproduce the
//! four deployed variants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::SheetLayout;
use crate::error::{OmrError, Result};
use crate::extraction::AnswerVector;

/// Expected marks per subject for one answer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey {
    /// Subject name -> expected 0/1 marks, one per question
    answers: BTreeMap<String, Vec<u8>>,
}

impl AnswerKey {
    pub fn new(answers: BTreeMap<String, Vec<u8>>) -> Self {
        Self { answers }
    }

    /// Expected marks for one subject, if the key covers it
    pub fn for_subject(&self, subject: &str) -> Option<&[u8]> {
        self.answers.get(subject).map(|v| v.as_slice())
    }

    /// Build a key giving every subject the same per-question pattern
    fn uniform(layout: &SheetLayout, pattern: impl Fn(usize) -> u8) -> Self {
        let marks: Vec<u8> = (0..layout.questions_per_subject).map(pattern).collect();
        Self {
            answers: layout
                .subjects
                .iter()
                .map(|s| (s.clone(), marks.clone()))
                .collect(),
        }
    }
}

/// Closed set of answer keys, addressed by set identifier ("A".."D" in the
/// builtin configuration)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeySet {
    sets: BTreeMap<String, AnswerKey>,
}

impl AnswerKeySet {
    pub fn new(sets: BTreeMap<String, AnswerKey>) -> Self {
        Self { sets }
    }

    /// The four deployed answer sets:
    /// A = every bubble filled, B = every bubble empty,
    /// C = alternating starting filled, D = alternating starting empty
    pub fn builtin(layout: &SheetLayout) -> Self {
        let mut sets = BTreeMap::new();
        sets.insert("A".to_string(), AnswerKey::uniform(layout, |_| 1));
        sets.insert("B".to_string(), AnswerKey::uniform(layout, |_| 0));
        sets.insert(
            "C".to_string(),
            AnswerKey::uniform(layout, |i| u8::from(i % 2 == 0)),
        );
        sets.insert(
            "D".to_string(),
            AnswerKey::uniform(layout, |i| u8::from(i % 2 == 1)),
        );
        Self { sets }
    }

    /// Look up a key by set identifier
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::UnknownAnswerSet`] for an identifier not in the
    /// set.
    pub fn get(&self, set: &str) -> Result<&AnswerKey> {
        self.sets.get(set).ok_or_else(|| OmrError::UnknownAnswerSet {
            set: set.to_string(),
        })
    }

    /// Configured set identifiers, in sorted order
    pub fn set_ids(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(|s| s.as_str())
    }

    /// Check every key against the sheet layout: each must cover exactly the
    /// layout's subjects with exactly one mark per question
    pub fn validate(&self, layout: &SheetLayout) -> Result<()> {
        for (id, key) in &self.sets {
            for subject in &layout.subjects {
                let marks = key.for_subject(subject).ok_or_else(|| OmrError::KeyMismatch {
                    reason: format!("set {} is missing subject '{}'", id, subject),
                })?;
                if marks.len() != layout.questions_per_subject {
                    return Err(OmrError::KeyMismatch {
                        reason: format!(
                            "set {} subject '{}' has {} answers, layout expects {}",
                            id,
                            subject,
                            marks.len(),
                            layout.questions_per_subject
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Load a key set from JSON file
    pub fn from_json_file(path: &std::path::Path) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let keys: Self = serde_json::from_str(&content)?;
        Ok(keys)
    }

    /// Save a key set to JSON file
    pub fn to_json_file(&self, path: &std::path::Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Correct-answer count for one subject block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub subject: String,
    pub correct: u32,
    pub out_of: u32,
}

/// Per-subject scores plus the sheet total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetScore {
    pub subjects: Vec<SubjectScore>,
    pub total: u32,
    pub max_total: u32,
}

/// Score an answer vector against one key
///
/// Element-wise equality fold per subject block: a position counts as correct
/// when the marked value equals the expected value.
///
/// # Errors
///
/// Returns [`OmrError::KeyMismatch`] if the key does not cover a layout
/// subject or a block length disagrees with the layout.
pub fn score_sheet(
    answers: &AnswerVector,
    key: &AnswerKey,
    layout: &SheetLayout,
) -> Result<SheetScore> {
    let mut subjects = Vec::with_capacity(layout.subjects.len());
    let mut total = 0u32;

    let blocks = answers.subject_blocks(layout.questions_per_subject);
    for (subject, given) in layout.subjects.iter().zip(blocks) {
        let expected = key.for_subject(subject).ok_or_else(|| OmrError::KeyMismatch {
            reason: format!("key has no subject '{}'", subject),
        })?;
        if expected.len() != given.len() {
            return Err(OmrError::KeyMismatch {
                reason: format!(
                    "subject '{}' key length {} does not match block length {}",
                    subject,
                    expected.len(),
                    given.len()
                ),
            });
        }

        let correct = expected
            .iter()
            .zip(given.iter())
            .filter(|(e, g)| e == g)
            .count() as u32;
        total += correct;
        subjects.push(SubjectScore {
            subject: subject.clone(),
            correct,
            out_of: layout.questions_per_subject as u32,
        });
    }

    Ok(SheetScore {
        subjects,
        total,
        max_total: layout.total_slots() as u32,
    })
}
