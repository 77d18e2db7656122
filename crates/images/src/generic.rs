use crate::{error::Result, Error, ImageHandler, ThumbnailOptions};

use std::io::Cursor;

use image::{DynamicImage, ImageReader};

/// Anything the `image` crate can sniff and decode
pub struct GenericHandler {}

impl ImageHandler for GenericHandler {
	fn handle_image(&self, data: &[u8], _options: &ThumbnailOptions) -> Result<DynamicImage> {
		let img = ImageReader::new(Cursor::new(data))
			.with_guessed_format()?
			.decode()?;

		if img.width() == 0 || img.height() == 0 {
			return Err(Error::Empty);
		}

		Ok(img)
	}
}
