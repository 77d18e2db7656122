use crate::{process::run_with_deadline, Error};

use std::{
	env::{self, consts::EXE_SUFFIX},
	ffi::OsString,
	path::{Path, PathBuf},
	time::Duration,
};

use tokio::{fs, process::Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

pub const DEFAULT_PROGRAM: &str = "ffmpeg";

/// An ffmpeg executable that answered `-version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoder {
	program: PathBuf,
	version: String,
}

impl Transcoder {
	/// Finds a usable ffmpeg.
	///
	/// `configured` may be a full path or a bare program name; bare names (and `None`,
	/// meaning [`DEFAULT_PROGRAM`]) are looked up on `PATH`. The candidate only counts when
	/// `ffmpeg -version` succeeds inside `probe_timeout`.
	pub async fn locate(configured: Option<&Path>, probe_timeout: Duration) -> Result<Self, Error> {
		let wanted = configured.unwrap_or_else(|| Path::new(DEFAULT_PROGRAM));

		let program = if wanted.components().count() > 1 || wanted.is_absolute() {
			is_file(wanted)
				.await
				.then(|| wanted.to_path_buf())
				.ok_or_else(|| Error::NotFound(wanted.to_path_buf()))?
		} else {
			search_path(wanted.as_os_str(), env::var_os("PATH"))
				.await
				.ok_or_else(|| Error::NotFound(wanted.to_path_buf()))?
		};

		trace!(program = %program.display(), "Probing transcoder");

		let output = run_with_deadline(
			Command::new(&program).arg("-version"),
			probe_timeout,
			&CancellationToken::new(),
		)
		.await?;

		let version = String::from_utf8_lossy(&output.stdout)
			.lines()
			.next()
			.unwrap_or_default()
			.trim()
			.to_owned();

		debug!(program = %program.display(), %version, "Found transcoder");

		Ok(Self { program, version })
	}

	#[must_use]
	pub fn program(&self) -> &Path {
		&self.program
	}

	/// First line of `ffmpeg -version`
	#[must_use]
	pub fn version(&self) -> &str {
		&self.version
	}

	#[cfg(test)]
	pub(crate) fn for_tests() -> Self {
		Self {
			program: PathBuf::from(DEFAULT_PROGRAM),
			version: String::from("ffmpeg version test"),
		}
	}
}

async fn is_file(path: &Path) -> bool {
	fs::metadata(path).await.is_ok_and(|meta| meta.is_file())
}

async fn search_path(name: &std::ffi::OsStr, path_var: Option<OsString>) -> Option<PathBuf> {
	let mut file_name = name.to_owned();
	if !EXE_SUFFIX.is_empty() && Path::new(name).extension().is_none() {
		file_name.push(EXE_SUFFIX);
	}

	for dir in env::split_paths(&path_var?) {
		let candidate = dir.join(&file_name);
		if is_file(&candidate).await {
			return Some(candidate);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;

	use tempfile::tempdir;
	use tracing_test::traced_test;

	#[tokio::test]
	#[traced_test]
	async fn searches_every_path_entry() {
		let empty = tempdir().unwrap();
		let full = tempdir().unwrap();
		let expected = full.path().join(format!("fake-ffmpeg{EXE_SUFFIX}"));
		std::fs::write(&expected, b"").unwrap();

		let path_var = env::join_paths([empty.path(), full.path()]).unwrap();

		assert_eq!(
			search_path("fake-ffmpeg".as_ref(), Some(path_var)).await,
			Some(expected)
		);
	}

	#[tokio::test]
	#[traced_test]
	async fn missing_programs_are_not_found() {
		let empty = tempdir().unwrap();
		let path_var = env::join_paths([empty.path()]).unwrap();

		assert_eq!(search_path("ffmpeg".as_ref(), Some(path_var)).await, None);
		assert_eq!(search_path("ffmpeg".as_ref(), None).await, None);
	}

	#[tokio::test]
	#[traced_test]
	async fn configured_paths_must_exist() {
		let dir = tempdir().unwrap();
		let res = Transcoder::locate(
			Some(&dir.path().join("nope").join("ffmpeg")),
			Duration::from_secs(1),
		)
		.await;

		assert!(matches!(res, Err(Error::NotFound(_))));
	}
}
