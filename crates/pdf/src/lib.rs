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

use std::path::{Path, PathBuf};

use image::DynamicImage;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::{PdfRenderConfig, Pdfium, PdfiumError};
use tracing::{debug, trace};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("failed to bind to the pdfium library: {0}")]
	Binding(PdfiumError),
	#[error("pdfium error: {0}")]
	Pdfium(#[from] PdfiumError),
	#[error("the document has no pages")]
	NoPages,
	#[error("the first page has an invalid size: {width}x{height}")]
	InvalidPageSize { width: f32, height: f32 },
}

// Binding to pdfium is a process wide thing, every renderer shares it
static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// Default location of a bundled pdfium, relative to the running binary
#[cfg(windows)]
pub const BUNDLED_LIBRARY_DIR: &str = "./";
#[cfg(unix)]
pub const BUNDLED_LIBRARY_DIR: &str = if cfg!(target_os = "macos") {
	"../Frameworks/"
} else {
	"../lib/keepbase"
};

/// Size of a page in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
	pub width: f32,
	pub height: f32,
}

impl PageSize {
	/// The uniform scale that fits the page inside a `bound` x `bound` square without
	/// exceeding it in either dimension
	#[must_use]
	#[allow(clippy::cast_precision_loss)]
	pub fn viewport_scale(&self, bound: u32) -> f32 {
		(bound as f32 / self.width).min(bound as f32 / self.height)
	}

	/// Pixel dimensions of the page rendered at [`Self::viewport_scale`], never 0 and
	/// never past `bound`
	#[must_use]
	#[allow(
		clippy::cast_possible_truncation,
		clippy::cast_sign_loss,
		clippy::cast_precision_loss
	)]
	pub fn viewport(&self, bound: u32) -> (u32, u32) {
		let scale = self.viewport_scale(bound);

		(
			((self.width * scale).round() as u32).clamp(1, bound),
			((self.height * scale).round() as u32).clamp(1, bound),
		)
	}

	fn validate(self) -> Result<Self> {
		if self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
		{
			Ok(self)
		} else {
			Err(Error::InvalidPageSize {
				width: self.width,
				height: self.height,
			})
		}
	}
}

/// Renders PDF pages through pdfium.
#[derive(Clone, Copy)]
pub struct PdfRenderer {
	pdfium: &'static Pdfium,
}

impl std::fmt::Debug for PdfRenderer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PdfRenderer").finish_non_exhaustive()
	}
}

impl PdfRenderer {
	/// Binds to pdfium, looking in `library_dir` (or [`BUNDLED_LIBRARY_DIR`]) first and
	/// then on the system library path.
	pub fn bind(library_dir: Option<&Path>) -> Result<Self> {
		let pdfium = PDFIUM.get_or_try_init(|| {
			let library_dir = library_dir.map_or_else(
				|| PathBuf::from(BUNDLED_LIBRARY_DIR),
				Path::to_path_buf,
			);

			trace!(library_dir = %library_dir.display(), "Binding to pdfium");

			Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
				&*library_dir.to_string_lossy(),
			))
			.or_else(|e| {
				debug!(?e, "No bundled pdfium found, trying the system library;");
				Pdfium::bind_to_system_library()
			})
			.map(Pdfium::new)
			.map_err(Error::Binding)
		})?;

		Ok(Self { pdfium })
	}

	/// Rasterizes the first page so it fits inside a `bound` x `bound` square
	pub fn render_first_page(&self, path: impl AsRef<Path>, bound: u32) -> Result<DynamicImage> {
		let document = self.pdfium.load_pdf_from_file(path.as_ref(), None)?;
		let pages = document.pages();

		if pages.is_empty() {
			return Err(Error::NoPages);
		}

		let page = pages.get(0)?;
		let size = PageSize {
			width: page.width().value,
			height: page.height().value,
		}
		.validate()?;

		let (width, height) = size.viewport(bound);
		trace!(?size, width, height, "Rendering first page");

		#[allow(clippy::cast_possible_wrap)]
		let render_config = PdfRenderConfig::new()
			.set_target_width(width as i32)
			.set_target_height(height as i32);

		let image = page.render_with_config(&render_config)?.as_image();
		Ok(image)
	}
}
