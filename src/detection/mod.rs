//! Bubble detection module
//!
//! This module handles the computer vision side of sheet evaluation:
//! binarizing the scanned sheet and locating bubble candidate regions in
//! reading order.

pub mod bubble;

pub use bubble::{BubbleDetector, BubbleRegion, DetectionResult};
