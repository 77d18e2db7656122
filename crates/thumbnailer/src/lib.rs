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

//! Bounded size previews for whatever users throw at us.
//!
//! [`Thumbnailer::generate_thumbnail`] picks a strategy from the declared resource type and
//! MIME type, tries a real render when the needed backends are around, falls back to
//! synthesized placeholder art, and hands back an inline data URI, or `None`. It never
//! fails in any other way.

mod capability;
mod codec;
mod config;
mod document;
mod encode;
mod error;
mod pdf;
mod source;
mod video;

pub use capability::{
	Capability, CapabilityProvider, CapabilitySet, ProbeSettings, ProbedCapabilities,
	StaticCapabilities,
};
pub use config::{
	ConfigError, DocumentConfig, PdfConfig, PlaceholderConfig, ThumbnailerConfig, VideoConfig,
	ENV_PREFIX,
};
pub use document::{
	placeholder_kind, CommandTextExtractor, NoTextExtractor, PlainTextExtractor, TextExtractor,
	TextExtractors,
};
pub use encode::{data_uri, Preview, PreviewBody, RenderTier, WEBP_MEDIA_TYPE};
pub use error::ThumbnailerError;
pub use kb_file_ext::ResourceType;
pub use pdf::{NoPdfBackend, PdfBackend};
pub use source::SourceFile;
pub use video::{FrameSource, NoFrameSource};

#[cfg(feature = "pdf")]
pub use pdf::PdfiumBackend;
#[cfg(feature = "ffmpeg")]
pub use video::FfmpegFrameSource;

use std::{path::Path, sync::Arc};

use kb_file_ext::mime;
use kb_images::ThumbnailOptions;
use kb_placeholder::{render_placeholder, PlaceholderKind};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, trace};

/// Which strategy a file gets, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
	Image,
	Pdf,
	Video,
	Document,
}

impl Route {
	fn select(resource_type: ResourceType, mime_type: &str) -> Option<Self> {
		if resource_type == ResourceType::Image || mime::is_image(mime_type) {
			Some(Self::Image)
		} else if resource_type == ResourceType::Pdf || mime::is_pdf(mime_type) {
			Some(Self::Pdf)
		} else if resource_type == ResourceType::Video || mime::is_video(mime_type) {
			Some(Self::Video)
		} else if resource_type == ResourceType::Document {
			Some(Self::Document)
		} else {
			None
		}
	}
}

/// The preview pipeline. Cheap to share behind an [`Arc`], every method takes `&self`.
#[derive(Debug)]
pub struct Thumbnailer {
	config: Arc<ThumbnailerConfig>,
	capabilities: Arc<dyn CapabilityProvider>,
	pdf: Arc<dyn PdfBackend>,
	frames: Arc<dyn FrameSource>,
	text: Arc<dyn TextExtractor>,
	cancel: CancellationToken,
}

impl Thumbnailer {
	/// Production wiring: capabilities are probed on first use and every backend compiled
	/// in is used.
	#[must_use]
	pub fn new(config: ThumbnailerConfig) -> Self {
		let probed = Arc::new(ProbedCapabilities::new(ProbeSettings {
			bounding_box: config.bounding_box,
			pdfium_library_dir: config.pdf.library_dir.clone(),
			ffmpeg_path: config.video.ffmpeg_path.clone(),
			probe_timeout: config.video.probe_timeout(),
		}));

		#[allow(unused_mut)]
		let mut builder = Self::builder(config).capabilities(Arc::clone(&probed) as _);

		#[cfg(feature = "pdf")]
		{
			let library_dir = builder.config.pdf.library_dir.clone();
			builder = builder.pdf_backend(Arc::new(PdfiumBackend::new(library_dir)));
		}

		#[cfg(feature = "ffmpeg")]
		{
			let mut grabber = kb_ffmpeg::FrameGrabberBuilder::new().bound(builder.config.bounding_box);
			if let Some(scratch_dir) = &builder.config.video.scratch_dir {
				grabber = grabber.scratch_root(scratch_dir);
			}

			builder = builder.frame_source(Arc::new(FfmpegFrameSource::new(probed, grabber)));
		}

		builder.build()
	}

	/// Starts from nothing available: no capabilities, no PDF or video backends. Only the
	/// text extractors follow `config`.
	#[must_use]
	pub fn builder(config: ThumbnailerConfig) -> ThumbnailerBuilder {
		ThumbnailerBuilder {
			text: default_text_extractor(&config),
			config,
			capabilities: Arc::new(StaticCapabilities::default()),
			pdf: Arc::new(NoPdfBackend),
			frames: Arc::new(NoFrameSource),
		}
	}

	#[must_use]
	pub fn config(&self) -> &ThumbnailerConfig {
		&self.config
	}

	/// Probes (or recalls) every capability
	pub async fn capabilities(&self) -> CapabilitySet {
		self.capabilities.detect().await
	}

	/// Preview of the file at `path` as a data URI, `None` when there is nothing to show.
	///
	/// `resource_type` is matched case-insensitively against `image`, `pdf`, `video` and
	/// `document`; the MIME type can route images, PDFs and videos on its own.
	pub async fn generate_thumbnail(
		&self,
		path: impl AsRef<Path> + Send,
		resource_type: &str,
		mime_type: &str,
	) -> Option<String> {
		self.generate(&SourceFile::new(
			path.as_ref(),
			ResourceType::parse(resource_type),
			mime_type,
		))
		.await
	}

	/// Same as [`Self::generate_thumbnail`], for an already described file
	pub async fn generate(&self, source: &SourceFile) -> Option<String> {
		let preview = self.preview(source).await?;
		Some(self.encode(source, &preview).await)
	}

	/// The preview before encoding, exposing which tier produced it.
	#[instrument(
		skip_all,
		fields(
			path = %source.path.display(),
			resource_type = %source.resource_type,
			mime_type = %source.mime_type,
		)
	)]
	pub async fn preview(&self, source: &SourceFile) -> Option<Preview> {
		if !fs::try_exists(&source.path).await.unwrap_or(false) {
			let e = ThumbnailerError::SourceNotFound(source.path.as_path().into());
			error!(%e, "No preview;");
			return None;
		}

		let Some(route) = Route::select(source.resource_type, &source.mime_type) else {
			debug!("Nothing to preview this kind of file with");
			return None;
		};

		trace!(?route, "Routing preview");

		let preview = match route {
			Route::Image => self.image_thumbnail(source).await?,
			Route::Pdf => pdf::render_pdf_first_page(self, source).await,
			Route::Video => video::extract_video_frame(self, source).await,
			Route::Document => document::placeholder_for_document(self, source).await,
		};

		debug!(tier = %preview.tier, "Preview ready");

		Some(preview)
	}

	/// Kills anything still running on behalf of this thumbnailer; calls in flight end up
	/// with their placeholders.
	pub fn shutdown(&self) {
		self.cancel.cancel();
	}

	async fn image_thumbnail(&self, source: &SourceFile) -> Option<Preview> {
		if !self.has(Capability::RasterLib).await {
			debug!("No raster library, images get no preview");
			return None;
		}

		// Images never escalate to a placeholder, a broken image gets nothing
		match codec::thumbnail_image(&source.path, self.options()).await {
			Ok(webp) => Some(Preview::real(webp)),
			Err(e) => {
				error!(?e, "Failed to generate image thumbnail;");
				None
			}
		}
	}

	/// Final encoding of a preview of `source`, the one chokepoint every result goes
	/// through.
	///
	/// Raster previews become `data:image/webp` URIs and placeholders `data:image/svg+xml`
	/// ones, unless `placeholders.rasterize` is set and the canvas is around.
	#[cfg_attr(
		not(all(feature = "canvas", feature = "raster")),
		allow(unused_variables, clippy::unused_async)
	)]
	pub async fn encode(&self, source: &SourceFile, preview: &Preview) -> String {
		#[cfg(all(feature = "canvas", feature = "raster"))]
		if let PreviewBody::Vector(svg) = &preview.body {
			if self.config.placeholders.rasterize
				&& self.has(Capability::HeadlessCanvas).await
				&& self.has(Capability::RasterLib).await
			{
				let svg = svg.clone();
				let options = self.options();

				match codec::run_codec(source.path.clone(), move |path| {
					encode::rasterize_placeholder(&svg, options.bounding_box, options.quality)
						.map_err(|e| ThumbnailerError::image(path, e))
				})
				.await
				{
					Ok(webp) => return data_uri(WEBP_MEDIA_TYPE, &webp),
					Err(e) => error!(?e, "Failed to rasterize placeholder, keeping it as SVG;"),
				}
			}
		}

		preview.to_data_uri()
	}

	pub(crate) async fn has(&self, capability: Capability) -> bool {
		self.capabilities.has(capability).await
	}

	pub(crate) fn options(&self) -> ThumbnailOptions {
		ThumbnailOptions {
			bounding_box: self.config.bounding_box,
			quality: self.config.quality,
			maximum_file_size: self.config.max_image_size,
		}
	}

	pub(crate) fn placeholder(
		&self,
		kind: PlaceholderKind,
		source: &SourceFile,
		body: &[String],
	) -> Preview {
		Preview::placeholder(render_placeholder(
			kind,
			&source.original_name,
			body,
			kind.accent(),
		))
	}
}

fn default_text_extractor(config: &ThumbnailerConfig) -> Arc<dyn TextExtractor> {
	let documents = &config.documents;
	let plain: Arc<dyn TextExtractor> = Arc::new(PlainTextExtractor::new(documents.preview_chars));

	match documents.extract_command.as_deref().and_then(|command| {
		CommandTextExtractor::new(
			command,
			std::time::Duration::from_secs(documents.extract_timeout_secs),
			documents.preview_chars,
		)
	}) {
		Some(command) => Arc::new(TextExtractors::new(vec![plain, Arc::new(command)])),
		None => plain,
	}
}

/// Builds a [`Thumbnailer`] out of explicit parts.
#[derive(Debug)]
pub struct ThumbnailerBuilder {
	config: ThumbnailerConfig,
	capabilities: Arc<dyn CapabilityProvider>,
	pdf: Arc<dyn PdfBackend>,
	frames: Arc<dyn FrameSource>,
	text: Arc<dyn TextExtractor>,
}

impl ThumbnailerBuilder {
	#[must_use]
	pub fn capabilities(mut self, capabilities: Arc<dyn CapabilityProvider>) -> Self {
		self.capabilities = capabilities;
		self
	}

	#[must_use]
	pub fn pdf_backend(mut self, pdf: Arc<dyn PdfBackend>) -> Self {
		self.pdf = pdf;
		self
	}

	#[must_use]
	pub fn frame_source(mut self, frames: Arc<dyn FrameSource>) -> Self {
		self.frames = frames;
		self
	}

	#[must_use]
	pub fn text_extractor(mut self, text: Arc<dyn TextExtractor>) -> Self {
		self.text = text;
		self
	}

	#[must_use]
	pub fn build(self) -> Thumbnailer {
		Thumbnailer {
			config: Arc::new(self.config),
			capabilities: self.capabilities,
			pdf: self.pdf,
			frames: self.frames,
			text: self.text,
			cancel: CancellationToken::new(),
		}
	}
}
