use crate::{error::panic_message, ThumbnailerError};

use std::{
	panic,
	path::{Path, PathBuf},
};

use kb_images::ThumbnailOptions;
use tokio::{sync::oneshot, task::spawn_blocking};
use tracing::{error, instrument, trace};

/// Runs CPU heavy codec work on the blocking pool, turning panics into errors.
///
/// Codecs are fed untrusted bytes, so a panic in one of them must never take the
/// caller down with it.
pub(crate) async fn run_codec<T, F>(path: PathBuf, work: F) -> Result<T, ThumbnailerError>
where
	T: Send + 'static,
	F: FnOnce(&Path) -> Result<T, ThumbnailerError> + Send + panic::UnwindSafe + 'static,
{
	let (tx, rx) = oneshot::channel();

	// Using a channel instead of awaiting the JoinHandle, the handle is only needed to
	// recover the panic
	let handle = spawn_blocking({
		let path = path.clone();
		move || {
			// Handling error on receiver side
			let _ = tx.send(
				panic::catch_unwind(|| work(&path)).unwrap_or_else(|payload| {
					Err(ThumbnailerError::Panic(
						path.clone(),
						panic_message(payload.as_ref()),
					))
				}),
			);
		}
	});

	if let Ok(res) = rx.await {
		res
	} else {
		error!(path = %path.display(), "Codec task vanished without an answer");
		Err(match handle.await {
			Err(e) => ThumbnailerError::Join(e),
			Ok(()) => ThumbnailerError::Panic(path, String::from("codec task dropped its result")),
		})
	}
}

/// Decodes, shrinks and recompresses an image as WebP.
///
/// Failures are returned as is; the dispatcher turns them into no preview at all.
#[cfg(feature = "raster")]
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub(crate) async fn thumbnail_image(
	path: impl AsRef<Path> + Send,
	options: ThumbnailOptions,
) -> Result<Vec<u8>, ThumbnailerError> {
	let webp = run_codec(path.as_ref().to_path_buf(), move |path| {
		kb_images::generate_thumbnail(path, &options)
			.map_err(|e| ThumbnailerError::image(path, e))
	})
	.await?;

	trace!(bytes = webp.len(), "Generated image thumbnail");

	Ok(webp)
}

#[cfg(not(feature = "raster"))]
pub(crate) async fn thumbnail_image(
	_path: impl AsRef<Path> + Send,
	_options: ThumbnailOptions,
) -> Result<Vec<u8>, ThumbnailerError> {
	Err(ThumbnailerError::MissingBackend(
		crate::capability::Capability::RasterLib,
	))
}

/// Shrinks an encoded frame (any format `image` can sniff) to the bounding box as WebP.
#[cfg(feature = "raster")]
pub(crate) async fn reencode(
	origin: PathBuf,
	encoded: Vec<u8>,
	options: ThumbnailOptions,
) -> Result<Vec<u8>, ThumbnailerError> {
	run_codec(origin, move |path| {
		let img = image::load_from_memory(&encoded)
			.map_err(|e| ThumbnailerError::image(path, e.into()))?;
		kb_images::encode_thumbnail(&img, &options).map_err(|e| ThumbnailerError::image(path, e))
	})
	.await
}

#[cfg(not(feature = "raster"))]
pub(crate) async fn reencode(
	_origin: PathBuf,
	_encoded: Vec<u8>,
	_options: ThumbnailOptions,
) -> Result<Vec<u8>, ThumbnailerError> {
	Err(ThumbnailerError::MissingBackend(
		crate::capability::Capability::RasterLib,
	))
}
