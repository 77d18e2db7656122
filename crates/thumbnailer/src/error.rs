use crate::capability::Capability;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Everything that can go wrong while previewing a single file.
///
/// None of these ever reach the caller of the dispatcher, they pick the next tier and
/// end up in the logs.
#[derive(Error, Debug)]
pub enum ThumbnailerError {
	#[error("source file not found: '{}'", .0.display())]
	SourceNotFound(Box<Path>),
	#[error("backend is not available: {0}")]
	MissingBackend(Capability),
	#[error("failed to process image '{}': {source}", .path.display())]
	Image {
		path: Box<Path>,
		#[source]
		source: kb_images::Error,
	},
	#[error("failed to render '{}': {reason}", .path.display())]
	Render { path: Box<Path>, reason: String },
	#[cfg(feature = "pdf")]
	#[error("pdf error: {0}")]
	Pdf(#[from] kb_pdf::Error),
	#[cfg(feature = "ffmpeg")]
	#[error("transcoder error: {0}")]
	Transcode(#[from] kb_ffmpeg::Error),
	#[error("text extraction failed for '{}': {reason}", .path.display())]
	Extraction { path: Box<Path>, reason: String },
	#[error("panic while generating a preview for '{}': {1}", .0.display())]
	Panic(PathBuf, String),
	#[error("background task failed: {0}")]
	Join(#[from] tokio::task::JoinError),
}

impl ThumbnailerError {
	pub(crate) fn image(path: impl AsRef<Path>, source: kb_images::Error) -> Self {
		Self::Image {
			path: path.as_ref().into(),
			source,
		}
	}
}

/// Turns the payload of a caught panic into something printable
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	payload
		.downcast_ref::<&str>()
		.map(ToString::to_string)
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| String::from("Internal panic on third party crate"))
}
