use crate::{error::Result, generic::GenericHandler, read_bounded, ImageHandler, ThumbnailOptions};

#[cfg(feature = "canvas")]
use crate::{consts, svg::SvgHandler};

use std::path::Path;

use image::DynamicImage;

/// Loads and decodes the image at `path`, picking a handler from its extension.
pub fn format_image(path: impl AsRef<Path>, options: &ThumbnailOptions) -> Result<DynamicImage> {
	let path = path.as_ref();
	let data = read_bounded(path, options.maximum_file_size)?;
	let ext = path
		.extension()
		.and_then(|ext| ext.to_str())
		.map(str::to_ascii_lowercase)
		.unwrap_or_default();

	match_to_handler(&ext).handle_image(&data, options)
}

fn match_to_handler(ext: &str) -> Box<dyn ImageHandler> {
	#[cfg(feature = "canvas")]
	if consts::SVG_EXTENSIONS.contains(&ext) {
		return Box::new(SvgHandler {});
	}

	#[cfg(not(feature = "canvas"))]
	let _ = ext;

	Box::new(GenericHandler {})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;

	use std::fs;

	use image::{GenericImageView, Rgb, RgbImage};
	use tempfile::tempdir;

	#[test]
	fn decodes_generic_images_by_content() {
		let dir = tempdir().unwrap();
		// Misleading extension, the reader sniffs the content anyway
		let path = dir.path().join("photo.jpg");
		RgbImage::from_pixel(32, 16, Rgb([200, 10, 10]))
			.save_with_format(&path, image::ImageFormat::Png)
			.unwrap();

		let img = format_image(&path, &ThumbnailOptions::default()).unwrap();
		assert_eq!(img.dimensions(), (32, 16));
	}

	#[test]
	fn refuses_files_over_the_limit() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("big.png");
		fs::write(&path, vec![0_u8; 2048]).unwrap();

		let options = ThumbnailOptions {
			maximum_file_size: 1024,
			..Default::default()
		};

		assert!(matches!(
			format_image(&path, &options),
			Err(Error::TooLarge { size: 2048, limit: 1024 })
		));
	}

	#[test]
	fn garbage_is_an_error() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("broken.png");
		fs::write(&path, b"definitely not a png").unwrap();

		assert!(format_image(&path, &ThumbnailOptions::default()).is_err());
	}

	#[cfg(feature = "canvas")]
	#[test]
	fn svg_sources_render_at_the_bounding_box() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("logo.svg");
		fs::write(
			&path,
			r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><rect width="100" height="50" fill="red"/></svg>"#,
		)
		.unwrap();

		let img = format_image(&path, &ThumbnailOptions::default()).unwrap();
		assert_eq!(img.dimensions(), (400, 200));
	}
}
