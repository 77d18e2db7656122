use crate::{
	capability::Capability, codec::reencode, source::SourceFile, Preview, Thumbnailer,
	ThumbnailerError,
};

use std::{fmt, path::Path, time::Duration};

use async_trait::async_trait;
use kb_placeholder::PlaceholderKind;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

/// Captures a single encoded frame (PNG, JPEG, ...) out of a video.
#[async_trait]
pub trait FrameSource: fmt::Debug + Send + Sync {
	async fn grab(
		&self,
		path: &Path,
		at: Duration,
		timeout: Duration,
		cancel: &CancellationToken,
	) -> Result<Vec<u8>, ThumbnailerError>;
}

/// Used when the crate is built without ffmpeg support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFrameSource;

#[async_trait]
impl FrameSource for NoFrameSource {
	async fn grab(
		&self,
		_: &Path,
		_: Duration,
		_: Duration,
		_: &CancellationToken,
	) -> Result<Vec<u8>, ThumbnailerError> {
		Err(ThumbnailerError::MissingBackend(Capability::VideoTranscoder))
	}
}

/// Grabs frames with the ffmpeg found while probing capabilities.
#[cfg(feature = "ffmpeg")]
#[derive(Debug)]
pub struct FfmpegFrameSource {
	capabilities: std::sync::Arc<crate::ProbedCapabilities>,
	builder: kb_ffmpeg::FrameGrabberBuilder,
}

#[cfg(feature = "ffmpeg")]
impl FfmpegFrameSource {
	#[must_use]
	pub const fn new(
		capabilities: std::sync::Arc<crate::ProbedCapabilities>,
		builder: kb_ffmpeg::FrameGrabberBuilder,
	) -> Self {
		Self {
			capabilities,
			builder,
		}
	}
}

#[cfg(feature = "ffmpeg")]
#[async_trait]
impl FrameSource for FfmpegFrameSource {
	async fn grab(
		&self,
		path: &Path,
		at: Duration,
		timeout: Duration,
		cancel: &CancellationToken,
	) -> Result<Vec<u8>, ThumbnailerError> {
		let transcoder = self
			.capabilities
			.transcoder()
			.await
			.ok_or(ThumbnailerError::MissingBackend(Capability::VideoTranscoder))?;

		self.builder
			.clone()
			.build(transcoder.clone())
			.grab(path, at, timeout, cancel)
			.await
			.map_err(Into::into)
	}
}

/// Frame preview of a video: first try, then exactly one earlier retry, then the video
/// placeholder.
#[instrument(skip_all, fields(path = %source.path.display()))]
pub(crate) async fn extract_video_frame(thumbnailer: &Thumbnailer, source: &SourceFile) -> Preview {
	if !thumbnailer.has(Capability::VideoTranscoder).await
		|| !thumbnailer.has(Capability::RasterLib).await
	{
		debug!("No video transcoder, using placeholder");
		return thumbnailer.placeholder(PlaceholderKind::Video, source, &[]);
	}

	let overall = thumbnailer.config.video.overall_timeout();

	// Anything still running when we leave gets killed, whatever the way out
	let cancel = thumbnailer.cancel.child_token();
	let _guard = cancel.clone().drop_guard();

	match timeout(overall, capture_with_retry(thumbnailer, source, &cancel)).await {
		Ok(Some(webp)) => Preview::real(webp),
		Ok(None) => thumbnailer.placeholder(PlaceholderKind::Video, source, &[]),
		Err(_) => {
			error!(?overall, "Frame extraction ran out of time, using placeholder;");
			thumbnailer.placeholder(PlaceholderKind::Video, source, &[])
		}
	}
}

async fn capture_with_retry(
	thumbnailer: &Thumbnailer,
	source: &SourceFile,
	cancel: &CancellationToken,
) -> Option<Vec<u8>> {
	let [first, retry] = thumbnailer.config.video.timestamps();

	match capture(thumbnailer, source, first, cancel).await {
		Ok(webp) => return Some(webp),
		Err(e) => warn!(
			?e,
			at = first.as_secs_f64(),
			"Frame capture failed, retrying earlier in the video;"
		),
	}

	if cancel.is_cancelled() {
		return None;
	}

	match capture(thumbnailer, source, retry, cancel).await {
		Ok(webp) => Some(webp),
		Err(e) => {
			error!(
				?e,
				at = retry.as_secs_f64(),
				"Frame capture retry failed too, using placeholder;"
			);
			None
		}
	}
}

async fn capture(
	thumbnailer: &Thumbnailer,
	source: &SourceFile,
	at: Duration,
	cancel: &CancellationToken,
) -> Result<Vec<u8>, ThumbnailerError> {
	let frame = thumbnailer
		.frames
		.grab(
			&source.path,
			at,
			thumbnailer.config.video.attempt_timeout(),
			cancel,
		)
		.await?;

	reencode(source.path.clone(), frame, thumbnailer.options()).await
}
