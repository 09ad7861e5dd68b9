//! Still-photo production: mirror the sampled frame and encode it as PNG.
//!
//! The live preview is displayed horizontally mirrored, so the still frame is
//! flipped the same way before encoding. Without the flip the saved photo
//! would look reversed relative to what the user was watching.

use crate::errors::CrowdcamError;
use crate::types::VideoFrame;
use bytes::Bytes;
use image::{imageops, ImageFormat, RgbImage};
use std::io::Cursor;

pub const PHOTO_MIME_TYPE: &str = "image/png";

fn to_image(frame: VideoFrame) -> Result<RgbImage, CrowdcamError> {
    if frame.is_empty() {
        return Err(CrowdcamError::EncodingFailed(
            "frame contains no image data".to_string(),
        ));
    }
    let (width, height, len) = (frame.width, frame.height, frame.data.len());
    RgbImage::from_raw(width, height, frame.data).ok_or_else(|| {
        CrowdcamError::EncodingFailed(format!(
            "frame buffer of {} bytes does not match {}x{} RGB8",
            len, width, height
        ))
    })
}

/// Flip a frame horizontally.
pub fn mirror_frame(frame: VideoFrame) -> Result<VideoFrame, CrowdcamError> {
    let flipped = imageops::flip_horizontal(&to_image(frame)?);
    let (width, height) = flipped.dimensions();
    Ok(VideoFrame::new(flipped.into_raw(), width, height))
}

/// Encode an RGB8 frame as PNG bytes.
pub fn encode_png(frame: VideoFrame) -> Result<Bytes, CrowdcamError> {
    let image = to_image(frame)?;
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    if buf.is_empty() {
        return Err(CrowdcamError::EncodingFailed(
            "encoder produced no data".to_string(),
        ));
    }
    Ok(Bytes::from(buf))
}

/// Mirror then encode, the full photo path used by the capture session.
pub fn mirrored_png(frame: VideoFrame) -> Result<Bytes, CrowdcamError> {
    encode_png(mirror_frame(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_2x1() -> VideoFrame {
        // left pixel red, right pixel blue
        VideoFrame::new(vec![255, 0, 0, 0, 0, 255], 2, 1)
    }

    #[test]
    fn test_mirror_swaps_columns() {
        let mirrored = mirror_frame(frame_2x1()).unwrap();
        assert_eq!(mirrored.data, vec![0, 0, 255, 255, 0, 0]);
        assert_eq!((mirrored.width, mirrored.height), (2, 1));
    }

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(frame_2x1()).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_png_decodes_to_mirrored_pixels() {
        let png = mirrored_png(frame_2x1()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.into_raw(), vec![0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn test_empty_frame_fails() {
        let err = encode_png(VideoFrame::new(Vec::new(), 0, 0)).unwrap_err();
        assert!(matches!(err, CrowdcamError::EncodingFailed(_)));
    }

    #[test]
    fn test_size_mismatch_fails() {
        let err = mirror_frame(VideoFrame::new(vec![1, 2, 3], 4, 4)).unwrap_err();
        assert!(err.to_string().contains("does not match 4x4"));
    }
}
