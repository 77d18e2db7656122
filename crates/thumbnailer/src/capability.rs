//! Which optional rendering backends this process can actually use.
//!
//! Every probe runs at most once per [`ProbedCapabilities`], the first time someone asks
//! for it. A backend that fails to load stays absent for good, we warn about it once and
//! never try again.

use std::{fmt, path::PathBuf, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

#[cfg(feature = "ffmpeg")]
use kb_ffmpeg::Transcoder;
#[cfg(feature = "pdf")]
use kb_pdf::PdfRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
	RasterLib,
	HeadlessCanvas,
	PdfParser,
	VideoTranscoder,
}

/// Snapshot of every capability at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
	pub has_raster_lib: bool,
	pub has_headless_canvas: bool,
	pub has_pdf_parser: bool,
	pub has_video_transcoder: bool,
}

impl CapabilitySet {
	/// Everything available
	#[must_use]
	pub const fn all() -> Self {
		Self {
			has_raster_lib: true,
			has_headless_canvas: true,
			has_pdf_parser: true,
			has_video_transcoder: true,
		}
	}

	#[must_use]
	pub const fn get(&self, capability: Capability) -> bool {
		match capability {
			Capability::RasterLib => self.has_raster_lib,
			Capability::HeadlessCanvas => self.has_headless_canvas,
			Capability::PdfParser => self.has_pdf_parser,
			Capability::VideoTranscoder => self.has_video_transcoder,
		}
	}

	#[must_use]
	pub const fn with(mut self, capability: Capability, available: bool) -> Self {
		match capability {
			Capability::RasterLib => self.has_raster_lib = available,
			Capability::HeadlessCanvas => self.has_headless_canvas = available,
			Capability::PdfParser => self.has_pdf_parser = available,
			Capability::VideoTranscoder => self.has_video_transcoder = available,
		}
		self
	}
}

#[async_trait]
pub trait CapabilityProvider: fmt::Debug + Send + Sync {
	/// Whether `capability` is usable, probing for it on first use.
	async fn has(&self, capability: Capability) -> bool;

	/// Probes (or recalls) everything
	async fn detect(&self) -> CapabilitySet {
		let mut set = CapabilitySet::default();
		for capability in Capability::iter() {
			set = set.with(capability, self.has(capability).await);
		}
		set
	}
}

/// Fixed capabilities, nothing gets probed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCapabilities(pub CapabilitySet);

#[async_trait]
impl CapabilityProvider for StaticCapabilities {
	async fn has(&self, capability: Capability) -> bool {
		self.0.get(capability)
	}
}

/// Where the probes look for their backends.
#[derive(Debug, Clone, Default)]
pub struct ProbeSettings {
	pub bounding_box: u32,
	pub pdfium_library_dir: Option<PathBuf>,
	pub ffmpeg_path: Option<PathBuf>,
	pub probe_timeout: Duration,
}

/// Production capabilities, each one probed lazily and then memoized.
///
/// Also hands out the backends it acquired while probing, so they are only ever loaded
/// once.
pub struct ProbedCapabilities {
	settings: ProbeSettings,
	raster: OnceCell<bool>,
	canvas: OnceCell<bool>,
	#[cfg(feature = "pdf")]
	pdf: OnceCell<Option<PdfRenderer>>,
	#[cfg(feature = "ffmpeg")]
	transcoder: OnceCell<Option<Transcoder>>,
}

impl fmt::Debug for ProbedCapabilities {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProbedCapabilities")
			.field("settings", &self.settings)
			.field("raster", &self.raster.get())
			.field("canvas", &self.canvas.get())
			.finish_non_exhaustive()
	}
}

impl ProbedCapabilities {
	#[must_use]
	pub fn new(settings: ProbeSettings) -> Self {
		Self {
			settings,
			raster: OnceCell::new(),
			canvas: OnceCell::new(),
			#[cfg(feature = "pdf")]
			pdf: OnceCell::new(),
			#[cfg(feature = "ffmpeg")]
			transcoder: OnceCell::new(),
		}
	}

	async fn raster(&self) -> bool {
		*self
			.raster
			.get_or_init(|| async {
				#[cfg(feature = "raster")]
				let available = tokio::task::spawn_blocking(kb_images::raster_self_test)
					.await
					.unwrap_or(false);
				#[cfg(not(feature = "raster"))]
				let available = false;

				report(Capability::RasterLib, available, "webp self test failed");
				available
			})
			.await
	}

	async fn canvas(&self) -> bool {
		*self
			.canvas
			.get_or_init(|| async {
				#[cfg(feature = "canvas")]
				let available = kb_images::canvas::probe(
					self.settings.bounding_box.max(1),
					self.settings.bounding_box.max(1),
				);
				#[cfg(not(feature = "canvas"))]
				let available = false;

				report(
					Capability::HeadlessCanvas,
					available,
					"couldn't allocate an off-screen canvas",
				);
				available
			})
			.await
	}

	/// The bound pdfium, if it could be loaded
	#[cfg(feature = "pdf")]
	pub async fn pdf_renderer(&self) -> Option<PdfRenderer> {
		*self
			.pdf
			.get_or_init(|| async {
				let library_dir = self.settings.pdfium_library_dir.clone();

				let res = tokio::task::spawn_blocking(move || {
					PdfRenderer::bind(library_dir.as_deref()).map_err(|e| e.to_string())
				})
				.await
				.map_err(|e| e.to_string())
				.and_then(|res| res);

				match res {
					Ok(renderer) => {
						report(Capability::PdfParser, true, "");
						Some(renderer)
					}
					Err(reason) => {
						report(Capability::PdfParser, false, &reason);
						None
					}
				}
			})
			.await
	}

	/// The located ffmpeg, if there is a working one
	#[cfg(feature = "ffmpeg")]
	pub async fn transcoder(&self) -> Option<&Transcoder> {
		self.transcoder
			.get_or_init(|| async {
				match Transcoder::locate(
					self.settings.ffmpeg_path.as_deref(),
					self.settings.probe_timeout,
				)
				.await
				{
					Ok(transcoder) => {
						debug!(version = transcoder.version(), "Using transcoder");
						report(Capability::VideoTranscoder, true, "");
						Some(transcoder)
					}
					Err(e) => {
						report(Capability::VideoTranscoder, false, &e.to_string());
						None
					}
				}
			})
			.await
			.as_ref()
	}
}

#[async_trait]
impl CapabilityProvider for ProbedCapabilities {
	async fn has(&self, capability: Capability) -> bool {
		match capability {
			Capability::RasterLib => self.raster().await,
			Capability::HeadlessCanvas => self.canvas().await,
			#[cfg(feature = "pdf")]
			Capability::PdfParser => self.pdf_renderer().await.is_some(),
			#[cfg(feature = "ffmpeg")]
			Capability::VideoTranscoder => self.transcoder().await.is_some(),
			#[allow(unreachable_patterns)]
			_ => false,
		}
	}
}

fn report(capability: Capability, available: bool, reason: &str) {
	if available {
		debug!(%capability, "Capability available");
	} else {
		warn!(%capability, %reason, "Capability unavailable, falling back to placeholders;");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use tracing_test::traced_test;

	#[test]
	fn set_accessors_agree() {
		let set = CapabilitySet::default()
			.with(Capability::PdfParser, true)
			.with(Capability::RasterLib, true);

		assert!(set.get(Capability::PdfParser));
		assert!(set.get(Capability::RasterLib));
		assert!(!set.get(Capability::HeadlessCanvas));
		assert!(!set.get(Capability::VideoTranscoder));
		assert!(
			!CapabilitySet::all()
				.with(Capability::PdfParser, false)
				.has_pdf_parser
		);
	}

	#[tokio::test]
	async fn static_capabilities_detect_what_they_hold() {
		let set = CapabilitySet::default().with(Capability::HeadlessCanvas, true);
		assert_eq!(StaticCapabilities(set).detect().await, set);
	}

	#[cfg(feature = "raster")]
	#[tokio::test]
	#[traced_test]
	async fn raster_probe_succeeds_and_is_memoized() {
		let probed = ProbedCapabilities::new(ProbeSettings {
			bounding_box: 400,
			..Default::default()
		});

		assert!(probed.has(Capability::RasterLib).await);
		assert!(probed.has(Capability::RasterLib).await);
		assert!(logs_contain("Capability available"));
	}

	#[cfg(feature = "ffmpeg")]
	#[tokio::test]
	#[traced_test]
	async fn missing_transcoder_is_absent_for_good() {
		let dir = tempfile::tempdir().unwrap();
		let probed = ProbedCapabilities::new(ProbeSettings {
			bounding_box: 400,
			ffmpeg_path: Some(dir.path().join("no-such-ffmpeg")),
			probe_timeout: Duration::from_secs(1),
			..Default::default()
		});

		assert!(!probed.has(Capability::VideoTranscoder).await);
		// The file showing up later doesn't matter, we never probe twice
		std::fs::write(dir.path().join("no-such-ffmpeg"), b"").unwrap();
		assert!(!probed.has(Capability::VideoTranscoder).await);
		assert!(logs_contain("Capability unavailable"));
	}
}
