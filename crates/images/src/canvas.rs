//! Off-screen tiny-skia canvas.
//!
//! Used for everything vector shaped: SVG sources, placeholder art, and for flattening
//! rendered PDF pages onto an opaque page background.

use crate::{fit_within, Error, Result};

use std::sync::Arc;

use image::{DynamicImage, RgbImage, RgbaImage};
use once_cell::sync::Lazy;
use resvg::{
	tiny_skia::{self, ColorU8, Pixmap, PixmapPaint, Transform},
	usvg,
};

// Loading system fonts is slow, do it at most once per process
static FONT_DATABASE: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
	let mut fontdb = usvg::fontdb::Database::new();
	fontdb.load_system_fonts();
	Arc::new(fontdb)
});

/// Checks that we are able to allocate a `width` x `height` canvas
#[must_use]
pub fn probe(width: u32, height: u32) -> bool {
	Pixmap::new(width, height).is_some()
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
	Pixmap::new(width, height).ok_or(Error::Pixmap(width, height))
}

/// Renders SVG markup so that it fits inside a `bound` x `bound` square.
#[allow(
	clippy::cast_possible_truncation,
	clippy::cast_sign_loss,
	clippy::cast_precision_loss
)]
pub fn rasterize_svg(data: &[u8], bound: u32) -> Result<DynamicImage> {
	let options = usvg::Options {
		fontdb: Arc::clone(&FONT_DATABASE),
		..Default::default()
	};

	let tree = usvg::Tree::from_data(data, &options)?;
	let size = tree.size();

	// Vectors scale freely, so we fill the bounding box rather than keeping the
	// intrinsic size
	let (width, height) = if size.width() >= size.height() {
		(bound, (bound as f32 * size.height() / size.width()).round() as u32)
	} else {
		((bound as f32 * size.width() / size.height()).round() as u32, bound)
	};
	let (width, height) = fit_within(width.max(1), height.max(1), bound);

	let mut pixmap = new_pixmap(width, height)?;

	resvg::render(
		&tree,
		Transform::from_scale(
			width as f32 / size.width(),
			height as f32 / size.height(),
		),
		&mut pixmap.as_mut(),
	);

	pixmap_to_image(&pixmap)
}

/// Paints `img` onto a white canvas of the same size, dropping its transparency.
///
/// PDF pages are routinely rendered with a transparent background, which would come out
/// black in viewers that ignore alpha.
pub fn flatten_on_white(img: &DynamicImage) -> Result<DynamicImage> {
	let rgba = img.to_rgba8();
	let (width, height) = rgba.dimensions();

	let mut layer = new_pixmap(width, height)?;
	for (dst, src) in layer.pixels_mut().iter_mut().zip(rgba.pixels()) {
		*dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
	}

	let mut canvas = new_pixmap(width, height)?;
	canvas.fill(tiny_skia::Color::WHITE);
	canvas.draw_pixmap(
		0,
		0,
		layer.as_ref(),
		&PixmapPaint::default(),
		Transform::identity(),
		None,
	);

	// Fully opaque now, so premultiplied and straight colours are the same thing
	let rgb = canvas
		.pixels()
		.iter()
		.flat_map(|px| [px.red(), px.green(), px.blue()])
		.collect::<Vec<_>>();

	RgbImage::from_raw(width, height, rgb)
		.map(DynamicImage::ImageRgb8)
		.ok_or(Error::RgbImageConversion)
}

fn pixmap_to_image(pixmap: &Pixmap) -> Result<DynamicImage> {
	let rgba = pixmap
		.pixels()
		.iter()
		.flat_map(|px| {
			let px = px.demultiply();
			[px.red(), px.green(), px.blue(), px.alpha()]
		})
		.collect::<Vec<_>>();

	RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
		.map(DynamicImage::ImageRgba8)
		.ok_or(Error::RgbImageConversion)
}

#[cfg(test)]
mod tests {
	use super::*;

	use image::{GenericImageView, Rgba};

	#[test]
	fn probes_reasonable_sizes() {
		assert!(probe(400, 400));
		assert!(!probe(0, 400));
	}

	#[test]
	fn flattening_removes_transparency() {
		let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 0])));
		let flat = flatten_on_white(&img).unwrap();

		assert_eq!(flat.dimensions(), (4, 2));
		assert!(!flat.color().has_alpha());
		assert_eq!(flat.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
	}

	#[test]
	fn flattening_keeps_opaque_pixels() {
		let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255])));
		let flat = flatten_on_white(&img).unwrap();

		assert_eq!(flat.get_pixel(1, 1), Rgba([10, 20, 30, 255]));
	}

	#[test]
	fn rasterizes_svg_to_fit() {
		let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300"><rect width="400" height="300" fill="#123456"/></svg>"##;
		let img = rasterize_svg(svg, 200).unwrap();

		assert_eq!(img.dimensions(), (200, 150));
		assert_eq!(img.get_pixel(100, 75), Rgba([0x12, 0x34, 0x56, 255]));
	}

	#[test]
	fn rejects_broken_svg() {
		assert!(rasterize_svg(b"<svg", 200).is_err());
	}
}
