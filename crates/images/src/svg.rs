use crate::{canvas, error::Result, ImageHandler, ThumbnailOptions};

use image::DynamicImage;

/// SVG sources have no native resolution, so they are rendered straight at the
/// bounding box size instead of being decoded and then shrunk.
#[derive(PartialEq, Eq)]
pub struct SvgHandler {}

impl ImageHandler for SvgHandler {
	fn handle_image(&self, data: &[u8], options: &ThumbnailOptions) -> Result<DynamicImage> {
		canvas::rasterize_svg(data, options.bounding_box)
	}
}
