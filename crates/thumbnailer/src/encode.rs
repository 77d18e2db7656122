use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use strum::Display;

pub const WEBP_MEDIA_TYPE: &str = "image/webp";

/// Rendering tiers, most preferred first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RenderTier {
	/// An actual picture of the content
	Real,
	/// Synthesized badge art
	Placeholder,
	None,
}

#[derive(Clone, PartialEq, Eq)]
pub enum PreviewBody {
	/// WebP bytes
	Raster(Vec<u8>),
	/// SVG markup
	Vector(String),
}

impl fmt::Debug for PreviewBody {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Raster(bytes) => write!(f, "Raster({} bytes)", bytes.len()),
			Self::Vector(svg) => write!(f, "Vector({} chars)", svg.len()),
		}
	}
}

/// Whatever a tier produced, before it is turned into a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
	pub tier: RenderTier,
	pub body: PreviewBody,
}

impl Preview {
	#[must_use]
	pub const fn real(webp: Vec<u8>) -> Self {
		Self {
			tier: RenderTier::Real,
			body: PreviewBody::Raster(webp),
		}
	}

	#[must_use]
	pub const fn placeholder(svg: String) -> Self {
		Self {
			tier: RenderTier::Placeholder,
			body: PreviewBody::Vector(svg),
		}
	}

	#[must_use]
	pub const fn media_type(&self) -> &'static str {
		match self.body {
			PreviewBody::Raster(_) => WEBP_MEDIA_TYPE,
			PreviewBody::Vector(_) => kb_placeholder::MEDIA_TYPE,
		}
	}

	#[must_use]
	pub fn bytes(&self) -> &[u8] {
		match &self.body {
			PreviewBody::Raster(bytes) => bytes,
			PreviewBody::Vector(svg) => svg.as_bytes(),
		}
	}

	/// The only representation callers ever get to see
	#[must_use]
	pub fn to_data_uri(&self) -> String {
		data_uri(self.media_type(), self.bytes())
	}
}

/// `data:<media_type>;base64,<payload>`
#[must_use]
pub fn data_uri(media_type: &str, bytes: &[u8]) -> String {
	let mut uri = String::with_capacity(media_type.len() + 13 + bytes.len().div_ceil(3) * 4);
	uri.push_str("data:");
	uri.push_str(media_type);
	uri.push_str(";base64,");
	STANDARD.encode_string(bytes, &mut uri);
	uri
}

/// Rasterizes a vector placeholder to WebP, so callers that can't show SVG still get a
/// picture.
#[cfg(all(feature = "canvas", feature = "raster"))]
pub(crate) fn rasterize_placeholder(
	svg: &str,
	bounding_box: u32,
	quality: f32,
) -> Result<Vec<u8>, kb_images::Error> {
	let img = kb_images::canvas::rasterize_svg(svg.as_bytes(), bounding_box)?;
	let img = kb_images::canvas::flatten_on_white(&img)?;
	kb_images::encode_webp(&img, quality)
}
