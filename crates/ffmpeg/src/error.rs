use std::{
	path::{Path, PathBuf},
	process::ExitStatus,
	time::Duration,
};

use thiserror::Error;

/// Error type for the library.
#[derive(Error, Debug)]
pub enum Error {
	#[error("file I/O error: {source}; path: '{}'", .path.display())]
	FileIO {
		path: Box<Path>,
		#[source]
		source: std::io::Error,
	},
	#[error("no ffmpeg executable found (looked for '{0}')")]
	NotFound(PathBuf),
	#[error("failed to spawn '{}': {source}", .program.display())]
	Spawn {
		program: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed while waiting for the transcoder: {0}")]
	Wait(#[source] std::io::Error),
	#[error("transcoder timed out after {0:?}")]
	Timeout(Duration),
	#[error("transcoder was canceled")]
	Canceled,
	#[error("transcoder exited with {status}: {stderr}")]
	ExitStatus { status: ExitStatus, stderr: String },
	#[error("transcoder finished without producing a frame")]
	EmptyFrame,
}

impl Error {
	pub(crate) fn file_io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
		Self::FileIO {
			path: path.as_ref().into(),
			source,
		}
	}
}
