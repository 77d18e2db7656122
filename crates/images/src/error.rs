use std::num::TryFromIntError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[cfg(feature = "canvas")]
	#[error("error with usvg: {0}")]
	USvg(#[from] resvg::usvg::Error),
	#[error("failed to allocate a `Pixmap` of {0}x{1}")]
	Pixmap(u32, u32),
	#[error("error while loading the image (via the `image` crate): {0}")]
	Image(#[from] image::ImageError),
	#[error("there was an i/o error: {0}")]
	Io(#[from] std::io::Error),
	#[error("there was an error while converting the canvas to an `RgbaImage`")]
	RgbImageConversion,
	#[error("the image provided is too large ({size} bytes, limit is {limit})")]
	TooLarge { size: u64, limit: u64 },
	#[error("the image has no pixels")]
	Empty,
	#[error("failed to encode webp: {0}")]
	WebPEncoding(String),
	#[error("error while parsing integers")]
	TryFromInt(#[from] TryFromIntError),
}
