use crate::{Error, Result};

use std::{ops::Deref, panic};

use image::{DynamicImage, RgbImage};
use webp::Encoder;

/// Lossy WebP encoding at `quality` (0-100)
pub fn encode_webp(img: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
	if img.width() == 0 || img.height() == 0 {
		return Err(Error::Empty);
	}

	// The encoder only understands 8 bit RGB(A)
	let img = if img.color().has_alpha() {
		DynamicImage::ImageRgba8(img.to_rgba8())
	} else {
		DynamicImage::ImageRgb8(img.to_rgb8())
	};

	let encoder =
		Encoder::from_image(&img).map_err(|reason| Error::WebPEncoding(reason.to_string()))?;

	// Type `WebPMemory` is !Send, so we copy it out into a plain `Vec<u8>` right away
	Ok(encoder.encode(quality.clamp(0.0, 100.0)).deref().to_owned())
}

/// Encodes a single pixel to make sure libwebp is actually usable in this process
#[must_use]
pub fn raster_self_test() -> bool {
	panic::catch_unwind(|| {
		encode_webp(
			&DynamicImage::ImageRgb8(RgbImage::new(1, 1)),
			crate::TARGET_QUALITY,
		)
		.is_ok_and(|bytes| !bytes.is_empty())
	})
	.unwrap_or(false)
}

#[cfg(test)]
mod tests {
	use super::*;

	use image::{Rgba, RgbaImage};

	#[test]
	fn encodes_riff_webp() {
		let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 128])));
		let bytes = encode_webp(&img, 60.0).unwrap();

		assert_eq!(&bytes[..4], b"RIFF");
		assert_eq!(&bytes[8..12], b"WEBP");
	}

	#[test]
	fn self_test_passes() {
		assert!(raster_self_test());
	}

	#[test]
	fn refuses_empty_images() {
		let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
		assert!(matches!(encode_webp(&img, 60.0), Err(Error::Empty)));
	}
}
