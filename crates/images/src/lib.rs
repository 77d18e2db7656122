#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	clippy::expect_used,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro
)]
#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

#[cfg(feature = "canvas")]
pub mod canvas;
mod consts;
#[cfg(feature = "raster")]
mod encode;
mod error;
mod formatter;
mod generic;
mod scale;
#[cfg(feature = "canvas")]
mod svg;

pub use consts::{DEFAULT_BOUNDING_BOX, DEFAULT_MAXIMUM_FILE_SIZE, SVG_EXTENSIONS, TARGET_QUALITY};
#[cfg(feature = "raster")]
pub use encode::{encode_webp, raster_self_test};
pub use error::{Error, Result};
pub use formatter::format_image;
pub use image::DynamicImage;
pub use scale::{fit_within, resize_to_fit};

use std::{fs, io::Read, path::Path};

/// How a thumbnail gets produced out of a source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailOptions {
	/// Thumbnails must fit in a `bounding_box` x `bounding_box` square
	pub bounding_box: u32,
	/// Lossy quality between 0 and 100
	pub quality: f32,
	/// Source files over this many bytes are refused before decoding
	pub maximum_file_size: u64,
}

impl Default for ThumbnailOptions {
	fn default() -> Self {
		Self {
			bounding_box: DEFAULT_BOUNDING_BOX,
			quality: TARGET_QUALITY,
			maximum_file_size: DEFAULT_MAXIMUM_FILE_SIZE,
		}
	}
}

pub trait ImageHandler {
	fn handle_image(&self, data: &[u8], options: &ThumbnailOptions) -> Result<DynamicImage>;
}

/// Reads a whole file, refusing anything over `maximum_size` bytes
pub fn read_bounded(path: &Path, maximum_size: u64) -> Result<Vec<u8>> {
	let mut file = fs::File::open(path)?;
	let len = file.metadata()?.len();

	if len > maximum_size {
		return Err(Error::TooLarge {
			size: len,
			limit: maximum_size,
		});
	}

	let mut data = Vec::with_capacity(usize::try_from(len)?);
	file.read_to_end(&mut data)?;
	Ok(data)
}

/// Decodes `path`, shrinks it to fit the bounding box and recompresses it as WebP
#[cfg(feature = "raster")]
pub fn generate_thumbnail(path: impl AsRef<Path>, options: &ThumbnailOptions) -> Result<Vec<u8>> {
	let img = format_image(path, options)?;
	encode_thumbnail(&img, options)
}

/// Shrinks an already decoded image to fit the bounding box and recompresses it as WebP
#[cfg(feature = "raster")]
pub fn encode_thumbnail(img: &DynamicImage, options: &ThumbnailOptions) -> Result<Vec<u8>> {
	encode_webp(&resize_to_fit(img, options.bounding_box), options.quality)
}
