use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Largest `(width, height)` with the same aspect ratio as `(w, h)` that fits inside a
/// `bound` x `bound` square. Never upscales, and never returns a zero dimension.
#[must_use]
#[allow(
	clippy::cast_possible_truncation,
	clippy::cast_sign_loss,
	clippy::cast_precision_loss
)]
pub fn fit_within(w: u32, h: u32, bound: u32) -> (u32, u32) {
	if w == 0 || h == 0 || bound == 0 {
		return (w.min(bound), h.min(bound));
	}

	if w <= bound && h <= bound {
		return (w, h);
	}

	let scale = (bound as f64 / w as f64).min(bound as f64 / h as f64);

	(
		((w as f64 * scale).round() as u32).clamp(1, bound),
		((h as f64 * scale).round() as u32).clamp(1, bound),
	)
}

/// Resizes `img` so it fits the bounding box, returning it untouched if it already does
#[must_use]
pub fn resize_to_fit(img: &DynamicImage, bound: u32) -> DynamicImage {
	let (w, h) = img.dimensions();
	let (w_scaled, h_scaled) = fit_within(w, h, bound);

	if (w, h) == (w_scaled, h_scaled) {
		img.clone()
	} else {
		img.resize_exact(w_scaled, h_scaled, FilterType::Triangle)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use image::RgbImage;

	#[test]
	fn landscape_is_bounded_by_width() {
		assert_eq!(fit_within(2000, 1000, 400), (400, 200));
	}

	#[test]
	fn portrait_is_bounded_by_height() {
		assert_eq!(fit_within(600, 1200, 400), (200, 400));
	}

	#[test]
	fn small_images_are_never_upscaled() {
		assert_eq!(fit_within(120, 80, 400), (120, 80));
		assert_eq!(fit_within(400, 400, 400), (400, 400));
	}

	#[test]
	fn extreme_ratios_keep_one_pixel() {
		assert_eq!(fit_within(10_000, 1, 400), (400, 1));
	}

	#[test]
	fn resize_preserves_aspect() {
		let img = DynamicImage::ImageRgb8(RgbImage::new(2000, 1000));
		let resized = resize_to_fit(&img, 400);
		assert_eq!(resized.dimensions(), (400, 200));
	}
}
