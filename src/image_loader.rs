//! Unified image loading for scanned and photographed sheets
//!
//! Provides a single entry point for decoding uploaded sheet images into the
//! OpenCV `Mat` the pipeline operates on. Decoding happens here, at the
//! boundary: the detection and extraction code assumes a valid, non-empty
//! 3-channel image and never touches the filesystem.
//!
//! ## Supported Formats
//!
//! Standard formats via the `image` crate: JPEG, PNG, GIF, WebP, TIFF, BMP.
//!
//! ## Design
//!
//! The loader converts all images to OpenCV Mat in BGR format for consistent
//! downstream processing. Malformed input (undecodable file, zero dimensions)
//! fails fast with a clear error before entering the pipeline.

use std::path::Path;

use opencv::core::Mat;
use opencv::prelude::*;

use crate::error::{OmrError, Result};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image (first frame only)
    Gif,
    /// WebP image
    WebP,
    /// TIFF image
    Tiff,
    /// BMP image
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

/// Load a sheet image from disk and convert to OpenCV Mat (BGR format)
///
/// # Arguments
///
/// * `path` - Path to the image file
///
/// # Returns
///
/// OpenCV Mat in BGR format (standard OpenCV color layout)
///
/// # Errors
///
/// Returns [`OmrError::ImageLoad`] if the file cannot be opened, the format
/// is unsupported, or decoding fails; [`OmrError::MalformedImage`] if the
/// decoded image has zero dimensions.
pub fn load_image(path: &Path) -> Result<Mat> {
    if ImageFormat::from_extension(path).is_none() {
        return Err(OmrError::ImageLoad {
            message: format!("Unknown image format for file: {}", path.display()),
            source: None,
        });
    }

    let reader = image::ImageReader::open(path).map_err(|e| {
        OmrError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;

    let img = reader.decode().map_err(|e| {
        OmrError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    bgr_mat_from_rgb(&rgb.into_raw(), width as i32, height as i32)
}

/// Convert an interleaved RGB byte buffer to an OpenCV BGR Mat
fn bgr_mat_from_rgb(rgb_data: &[u8], width: i32, height: i32) -> Result<Mat> {
    if width <= 0 || height <= 0 {
        return Err(OmrError::MalformedImage {
            reason: format!("decoded image has zero dimensions ({}x{})", width, height),
        });
    }
    if rgb_data.len() != (width * height * 3) as usize {
        return Err(OmrError::MalformedImage {
            reason: format!(
                "pixel buffer length {} does not match {}x{}x3",
                rgb_data.len(),
                width,
                height
            ),
        });
    }

    let mut bgr = Vec::with_capacity(rgb_data.len());
    for px in rgb_data.chunks_exact(3) {
        bgr.push(px[2]);
        bgr.push(px[1]);
        bgr.push(px[0]);
    }

    let flat = Mat::from_slice(&bgr).map_err(|e| OmrError::opencv("Mat creation", e))?;
    let shaped = flat
        .reshape(3, height)
        .map_err(|e| OmrError::opencv("Mat reshape", e))?;
    shaped
        .try_clone()
        .map_err(|e| OmrError::opencv("Mat clone", e))
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "bmp"]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImageFormat::from_extension(Path::new("sheet.jpg")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_extension(Path::new("sheet.JPEG")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_extension(Path::new("sheet.png")),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_extension(Path::new("sheet.xyz")), None);
        assert_eq!(ImageFormat::from_extension(Path::new("sheet")), None);
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("jpg"));
        assert!(is_supported_extension("JPEG"));
        assert!(is_supported_extension("png"));
        assert!(!is_supported_extension("xyz"));
        assert!(!is_supported_extension("doc"));
    }

    #[test]
    fn test_bgr_conversion() {
        // 2x2 image: red, green, blue, white
        let rgb_data = vec![
            255, 0, 0, // red
            0, 255, 0, // green
            0, 0, 255, // blue
            255, 255, 255, // white
        ];

        let mat = bgr_mat_from_rgb(&rgb_data, 2, 2).unwrap();
        assert_eq!(mat.rows(), 2);
        assert_eq!(mat.cols(), 2);
        assert_eq!(mat.channels(), 3);

        let px: &opencv::core::Vec3b = mat.at_2d(0, 0).unwrap();
        assert_eq!((px[0], px[1], px[2]), (0, 0, 255)); // BGR of red

        let px: &opencv::core::Vec3b = mat.at_2d(0, 1).unwrap();
        assert_eq!((px[0], px[1], px[2]), (0, 255, 0));

        let px: &opencv::core::Vec3b = mat.at_2d(1, 0).unwrap();
        assert_eq!((px[0], px[1], px[2]), (255, 0, 0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let result = bgr_mat_from_rgb(&[], 0, 0);
        assert!(matches!(result, Err(OmrError::MalformedImage { .. })));
    }

    #[test]
    fn test_buffer_length_mismatch_rejected() {
        let result = bgr_mat_from_rgb(&[1, 2, 3], 2, 2);
        assert!(matches!(result, Err(OmrError::MalformedImage { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_image(Path::new("nonexistent_sheet.png"));
        assert!(matches!(result, Err(OmrError::ImageLoad { .. })));
    }
}
