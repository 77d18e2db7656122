use crate::{process::run_with_deadline, Error, Transcoder};

use std::{
	io::ErrorKind,
	path::{Path, PathBuf},
	time::Duration,
};

use tokio::{fs, process::Command, task};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

const FRAME_FILE_NAME: &str = "frame.png";

/// `FrameGrabber` holds data from a `FrameGrabberBuilder`, exposing a method to capture
/// single frames out of video files.
#[derive(Debug, Clone)]
pub struct FrameGrabber {
	transcoder: Transcoder,
	builder: FrameGrabberBuilder,
}

impl FrameGrabber {
	#[must_use]
	pub const fn transcoder(&self) -> &Transcoder {
		&self.transcoder
	}

	/// Captures the frame at offset `at` into `input` as PNG bytes, scaled down to fit the
	/// bounding box.
	///
	/// Each call gets its own scratch directory, which is removed before returning, whatever
	/// the outcome. The transcoder is killed if `timeout` elapses or `cancel` fires.
	pub async fn grab(
		&self,
		input: impl AsRef<Path>,
		at: Duration,
		timeout: Duration,
		cancel: &CancellationToken,
	) -> Result<Vec<u8>, Error> {
		let input = input.as_ref();

		let scratch = self.scratch_dir()?;
		let output = scratch.path().join(FRAME_FILE_NAME);

		trace!(
			input = %input.display(),
			at = at.as_secs_f64(),
			?timeout,
			"Grabbing frame",
		);

		let res = self.capture(input, &output, at, timeout, cancel).await;

		// Removing the directory is blocking i/o, keep it off the runtime threads
		let scratch_path = scratch.path().to_path_buf();
		match task::spawn_blocking(move || scratch.close()).await {
			Ok(Ok(())) => {}
			Ok(Err(e)) => {
				warn!(?e, scratch = %scratch_path.display(), "Failed to remove frame scratch directory;");
			}
			Err(e) => {
				warn!(?e, scratch = %scratch_path.display(), "Scratch directory cleanup task failed;");
			}
		}

		res
	}

	async fn capture(
		&self,
		input: &Path,
		output: &Path,
		at: Duration,
		timeout: Duration,
		cancel: &CancellationToken,
	) -> Result<Vec<u8>, Error> {
		let finished = run_with_deadline(
			Command::new(self.transcoder.program()).args(self.arguments(input, output, at)),
			timeout,
			cancel,
		)
		.await?;
		trace!(elapsed = ?finished.elapsed, "Transcoder exited");

		// Seeking past the end is not an error for ffmpeg, it just doesn't write anything
		match fs::read(output).await {
			Ok(bytes) if bytes.is_empty() => Err(Error::EmptyFrame),
			Ok(bytes) => Ok(bytes),
			Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::EmptyFrame),
			Err(e) => Err(Error::file_io(output, e)),
		}
	}

	fn arguments(&self, input: &Path, output: &Path, at: Duration) -> Vec<std::ffi::OsString> {
		let bound = self.builder.bound;

		[
			"-hide_banner",
			"-loglevel",
			"error",
			"-nostdin",
			"-y",
			"-ss",
			&format!("{:.3}", at.as_secs_f64()),
			"-i",
		]
		.into_iter()
		.map(Into::into)
		.chain([input.as_os_str().to_owned()])
		.chain(
			[
				"-frames:v",
				"1",
				"-an",
				"-vf",
				&format!(
					"scale=w='min(iw,{bound})':h='min(ih,{bound})':force_original_aspect_ratio=decrease"
				),
				"-f",
				"image2",
				"-c:v",
				"png",
			]
			.into_iter()
			.map(Into::into),
		)
		.chain([output.as_os_str().to_owned()])
		.collect()
	}

	fn scratch_dir(&self) -> Result<tempfile::TempDir, Error> {
		let builder = {
			let mut builder = tempfile::Builder::new();
			builder.prefix("kb-frame-");
			builder
		};

		match &self.builder.scratch_root {
			Some(root) => builder.tempdir_in(root).map_err(|e| Error::file_io(root, e)),
			None => builder
				.tempdir()
				.map_err(|e| Error::file_io(std::env::temp_dir(), e)),
		}
	}
}

/// `FrameGrabberBuilder` holds data to build a `FrameGrabber`.
#[derive(Debug, Clone)]
pub struct FrameGrabberBuilder {
	bound: u32,
	scratch_root: Option<PathBuf>,
}

impl Default for FrameGrabberBuilder {
	fn default() -> Self {
		Self {
			bound: 400,
			scratch_root: None,
		}
	}
}

impl FrameGrabberBuilder {
	/// Creates a new `FrameGrabberBuilder` with default values:
	/// - `bound`: 400 pixels
	/// - `scratch_root`: the system temporary directory
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Captured frames are scaled down to fit a `bound` x `bound` square, never up
	#[must_use]
	pub const fn bound(mut self, bound: u32) -> Self {
		self.bound = bound;
		self
	}

	/// Where per-capture scratch directories get created
	#[must_use]
	pub fn scratch_root(mut self, scratch_root: impl Into<PathBuf>) -> Self {
		self.scratch_root = Some(scratch_root.into());
		self
	}

	#[must_use]
	pub const fn build(self, transcoder: Transcoder) -> FrameGrabber {
		FrameGrabber {
			transcoder,
			builder: self,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn arguments_seek_before_input_and_bound_the_frame() {
		let grabber = FrameGrabberBuilder::new().bound(320).build(Transcoder::for_tests());
		let args = grabber.arguments(
			Path::new("/videos/clip.mp4"),
			Path::new("/scratch/frame.png"),
			Duration::from_millis(5000),
		);
		let args = args
			.iter()
			.map(|arg| arg.to_string_lossy().into_owned())
			.collect::<Vec<_>>();

		let ss = args.iter().position(|arg| arg == "-ss").unwrap();
		let input = args.iter().position(|arg| arg == "-i").unwrap();

		assert!(ss < input);
		assert_eq!(args[ss + 1], "5.000");
		assert_eq!(args[input + 1], "/videos/clip.mp4");
		assert!(args.contains(
			&"scale=w='min(iw,320)':h='min(ih,320)':force_original_aspect_ratio=decrease".to_owned()
		));
		assert_eq!(args.last().map(String::as_str), Some("/scratch/frame.png"));
	}
}
