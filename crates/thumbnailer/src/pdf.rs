use crate::{
	capability::Capability, source::SourceFile, Preview, Thumbnailer, ThumbnailerError,
};

use std::{fmt, path::Path};

use image::DynamicImage;
use kb_placeholder::PlaceholderKind;
use tracing::{debug, error, instrument};

/// Something that can turn the first page of a PDF into pixels.
///
/// Called from the blocking pool, implementations are free to block.
pub trait PdfBackend: fmt::Debug + Send + Sync {
	/// Renders page 1 so it fits inside a `bounding_box` x `bounding_box` square
	fn render_first_page(
		&self,
		path: &Path,
		bounding_box: u32,
	) -> Result<DynamicImage, ThumbnailerError>;
}

/// Used when the crate is built without pdf support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPdfBackend;

impl PdfBackend for NoPdfBackend {
	fn render_first_page(&self, _: &Path, _: u32) -> Result<DynamicImage, ThumbnailerError> {
		Err(ThumbnailerError::MissingBackend(Capability::PdfParser))
	}
}

/// Renders through pdfium, bound once per process.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Default)]
pub struct PdfiumBackend {
	library_dir: Option<std::path::PathBuf>,
}

#[cfg(feature = "pdf")]
impl PdfiumBackend {
	#[must_use]
	pub const fn new(library_dir: Option<std::path::PathBuf>) -> Self {
		Self { library_dir }
	}
}

#[cfg(feature = "pdf")]
impl PdfBackend for PdfiumBackend {
	fn render_first_page(
		&self,
		path: &Path,
		bounding_box: u32,
	) -> Result<DynamicImage, ThumbnailerError> {
		kb_pdf::PdfRenderer::bind(self.library_dir.as_deref())?
			.render_first_page(path, bounding_box)
			.map_err(Into::into)
	}
}

/// First page preview of a PDF, falling back to the PDF placeholder on anything short of
/// a complete render.
#[instrument(skip_all, fields(path = %source.path.display()))]
pub(crate) async fn render_pdf_first_page(thumbnailer: &Thumbnailer, source: &SourceFile) -> Preview {
	if !thumbnailer.has(Capability::PdfParser).await {
		debug!("No PDF parser, using placeholder");
		return thumbnailer.placeholder(PlaceholderKind::Pdf, source, &[]);
	}

	// Without a canvas to paint on there is no real tier, so don't even open the document
	if !thumbnailer.has(Capability::HeadlessCanvas).await
		|| !thumbnailer.has(Capability::RasterLib).await
	{
		debug!("No canvas to paint the page on, using placeholder");
		return thumbnailer.placeholder(PlaceholderKind::Pdf, source, &[]);
	}

	match render_page(thumbnailer, source).await {
		Ok(webp) => Preview::real(webp),
		Err(e) => {
			error!(?e, "Failed to render the first page, using placeholder;");
			thumbnailer.placeholder(PlaceholderKind::Pdf, source, &[])
		}
	}
}

#[cfg(all(feature = "canvas", feature = "raster"))]
async fn render_page(thumbnailer: &Thumbnailer, source: &SourceFile) -> Result<Vec<u8>, ThumbnailerError> {
	let backend = std::panic::AssertUnwindSafe(std::sync::Arc::clone(&thumbnailer.pdf));
	let options = thumbnailer.options();

	crate::codec::run_codec(source.path.clone(), move |path| {
		let page = backend.render_first_page(path, options.bounding_box)?;

		let page = kb_images::canvas::flatten_on_white(&page)
			.map_err(|e| ThumbnailerError::image(path, e))?;

		kb_images::encode_thumbnail(&page, &options).map_err(|e| ThumbnailerError::image(path, e))
	})
	.await
}

#[cfg(not(all(feature = "canvas", feature = "raster")))]
async fn render_page(_: &Thumbnailer, _: &SourceFile) -> Result<Vec<u8>, ThumbnailerError> {
	Err(ThumbnailerError::MissingBackend(Capability::HeadlessCanvas))
}
