use std::{
	path::{Path, PathBuf},
	time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Prefix of every environment variable that overrides the configuration
pub const ENV_PREFIX: &str = "KB_THUMB_";

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("failed to read config file '{}': {source}", .path.display())]
	Read {
		path: Box<Path>,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse config file '{}': {source}", .path.display())]
	Parse {
		path: Box<Path>,
		#[source]
		source: toml::de::Error,
	},
	#[error("invalid value for environment variable {key}: '{value}'")]
	Env { key: String, value: String },
	#[error("invalid configuration: {0}")]
	Invalid(&'static str),
}

/// Knobs of the whole preview pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailerConfig {
	/// Every preview fits inside a `bounding_box` x `bounding_box` square
	pub bounding_box: u32,
	/// WebP quality, 0 to 100
	pub quality: f32,
	/// Source images over this many bytes are not decoded at all
	pub max_image_size: u64,
	pub video: VideoConfig,
	pub pdf: PdfConfig,
	pub placeholders: PlaceholderConfig,
	pub documents: DocumentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
	/// Full path or bare name of the ffmpeg executable, looked up on `PATH` by default
	pub ffmpeg_path: Option<PathBuf>,
	pub first_timestamp_secs: f64,
	pub retry_timestamp_secs: f64,
	/// Wall clock budget of a single capture attempt
	pub timeout_secs: u64,
	/// Wall clock budget of the whole extraction, retry included
	pub overall_timeout_secs: u64,
	/// How long `ffmpeg -version` may take when probing
	pub probe_timeout_secs: u64,
	/// Where capture scratch directories are created, the system temp dir by default
	pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdfConfig {
	/// Directory holding a bundled pdfium library
	pub library_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
	/// Ship placeholders as WebP instead of SVG when the canvas is around
	pub rasterize: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentConfig {
	/// Characters of preview text handed to the placeholder
	pub preview_chars: usize,
	/// External text extraction command, the file path is appended as last argument
	pub extract_command: Option<Vec<String>>,
	pub extract_timeout_secs: u64,
}

impl Default for ThumbnailerConfig {
	fn default() -> Self {
		Self {
			bounding_box: kb_images::DEFAULT_BOUNDING_BOX,
			quality: kb_images::TARGET_QUALITY,
			max_image_size: kb_images::DEFAULT_MAXIMUM_FILE_SIZE,
			video: VideoConfig::default(),
			pdf: PdfConfig::default(),
			placeholders: PlaceholderConfig::default(),
			documents: DocumentConfig::default(),
		}
	}
}

impl Default for VideoConfig {
	fn default() -> Self {
		Self {
			ffmpeg_path: None,
			first_timestamp_secs: 5.0,
			retry_timestamp_secs: 1.0,
			timeout_secs: 10,
			overall_timeout_secs: 20,
			probe_timeout_secs: 5,
			scratch_dir: None,
		}
	}
}

impl Default for DocumentConfig {
	fn default() -> Self {
		Self {
			preview_chars: 400,
			extract_command: None,
			extract_timeout_secs: 10,
		}
	}
}

impl VideoConfig {
	/// Where the capture seeks to, first try then retry. Values that can't be a
	/// [`Duration`] (negative, NaN, absurdly large) fall back to the defaults.
	#[must_use]
	pub fn timestamps(&self) -> [Duration; 2] {
		let defaults = Self::default();

		[
			seek_point(self.first_timestamp_secs, defaults.first_timestamp_secs),
			seek_point(self.retry_timestamp_secs, defaults.retry_timestamp_secs),
		]
	}

	#[must_use]
	pub const fn attempt_timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	#[must_use]
	pub const fn overall_timeout(&self) -> Duration {
		Duration::from_secs(self.overall_timeout_secs)
	}

	#[must_use]
	pub const fn probe_timeout(&self) -> Duration {
		Duration::from_secs(self.probe_timeout_secs)
	}
}

impl ThumbnailerConfig {
	/// Reads `path` (or starts from the defaults), applies `KB_THUMB_*` overrides from the
	/// process environment and validates the result.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let config = match path {
			Some(path) => Self::from_file(path)?,
			None => Self::default(),
		};

		let config = config.with_env_overrides(std::env::vars())?;
		config.validate()?;

		Ok(config)
	}

	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.into(),
			source,
		})?;

		toml::from_str(&contents).map_err(|source| ConfigError::Parse {
			path: path.into(),
			source,
		})
	}

	/// Applies every `KB_THUMB_*` variable in `vars`, ignoring anything else.
	pub fn with_env_overrides(
		mut self,
		vars: impl IntoIterator<Item = (String, String)>,
	) -> Result<Self, ConfigError> {
		for (key, value) in vars {
			let Some(name) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};

			debug!(%key, "Applying configuration override");

			match name {
				"BOUNDING_BOX" => self.bounding_box = parse(&key, &value)?,
				"QUALITY" => self.quality = parse(&key, &value)?,
				"MAX_IMAGE_SIZE" => self.max_image_size = parse(&key, &value)?,
				"FFMPEG_PATH" => self.video.ffmpeg_path = non_empty(&value).map(PathBuf::from),
				"VIDEO_TIMEOUT_SECS" => self.video.timeout_secs = parse(&key, &value)?,
				"VIDEO_OVERALL_TIMEOUT_SECS" => {
					self.video.overall_timeout_secs = parse(&key, &value)?;
				}
				"SCRATCH_DIR" => self.video.scratch_dir = non_empty(&value).map(PathBuf::from),
				"PDFIUM_DIR" => self.pdf.library_dir = non_empty(&value).map(PathBuf::from),
				"RASTERIZE_PLACEHOLDERS" => self.placeholders.rasterize = parse(&key, &value)?,
				"EXTRACT_COMMAND" => {
					self.documents.extract_command = non_empty(&value)
						.map(|command| command.split_whitespace().map(ToOwned::to_owned).collect());
				}
				// Where the file itself lives, for whoever calls `load`
				"CONFIG" => {}
				_ => debug!(%key, "Unknown configuration override, ignoring it"),
			}
		}

		Ok(self)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.bounding_box == 0 {
			return Err(ConfigError::Invalid("bounding_box must be greater than 0"));
		}

		if !(0.0..=100.0).contains(&self.quality) {
			return Err(ConfigError::Invalid("quality must be between 0 and 100"));
		}

		if self.max_image_size == 0 {
			return Err(ConfigError::Invalid("max_image_size must be greater than 0"));
		}

		let video = &self.video;
		if ![video.first_timestamp_secs, video.retry_timestamp_secs]
			.into_iter()
			.all(|secs| Duration::try_from_secs_f64(secs).is_ok())
		{
			return Err(ConfigError::Invalid(
				"video timestamps must be finite, not negative and representable as a duration",
			));
		}

		if video.timeout_secs == 0 || video.overall_timeout_secs == 0 || video.probe_timeout_secs == 0
		{
			return Err(ConfigError::Invalid("video timeouts must be greater than 0"));
		}

		if self
			.documents
			.extract_command
			.as_ref()
			.is_some_and(Vec::is_empty)
		{
			return Err(ConfigError::Invalid("extract_command can't be empty"));
		}

		if self.documents.extract_timeout_secs == 0 {
			return Err(ConfigError::Invalid("extract_timeout_secs must be greater than 0"));
		}

		Ok(())
	}
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
	value.trim().parse().map_err(|_| ConfigError::Env {
		key: key.to_owned(),
		value: value.to_owned(),
	})
}

fn seek_point(secs: f64, fallback: f64) -> Duration {
	Duration::try_from_secs_f64(secs)
		.or_else(|_| Duration::try_from_secs_f64(fallback))
		.unwrap_or_default()
}

fn non_empty(value: &str) -> Option<&str> {
	Some(value.trim()).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	use tempfile::tempdir;

	fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
		pairs
			.iter()
			.map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
			.collect()
	}

	#[test]
	fn defaults_are_valid() {
		let config = ThumbnailerConfig::default();

		assert!(config.validate().is_ok());
		assert_eq!(config.bounding_box, 400);
		assert_eq!(
			config.video.timestamps(),
			[Duration::from_secs(5), Duration::from_secs(1)]
		);
		assert_eq!(config.video.attempt_timeout(), Duration::from_secs(10));
	}

	#[test]
	fn unrepresentable_timestamps_are_rejected() {
		for secs in [1e20, f64::NAN, f64::INFINITY, -1.0] {
			let mut config = ThumbnailerConfig::default();
			config.video.first_timestamp_secs = secs;

			assert!(
				matches!(config.validate(), Err(ConfigError::Invalid(_))),
				"{secs} should not validate"
			);
		}
	}

	#[test]
	fn unrepresentable_timestamps_fall_back_to_the_defaults() {
		let mut config = ThumbnailerConfig::default();
		config.video.first_timestamp_secs = 1e20;
		config.video.retry_timestamp_secs = f64::NAN;

		assert_eq!(
			config.video.timestamps(),
			[Duration::from_secs(5), Duration::from_secs(1)]
		);

		config.video.first_timestamp_secs = 2.5;
		assert_eq!(config.video.timestamps()[0], Duration::from_millis(2500));
	}

	#[test]
	fn partial_files_keep_the_other_defaults() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("thumbs.toml");
		std::fs::write(
			&path,
			"quality = 75.0\n\n[video]\ntimeout_secs = 3\n\n[placeholders]\nrasterize = true\n",
		)
		.unwrap();

		let config = ThumbnailerConfig::from_file(&path).unwrap();

		assert!((config.quality - 75.0).abs() < f32::EPSILON);
		assert_eq!(config.video.timeout_secs, 3);
		assert_eq!(config.video.overall_timeout_secs, 20);
		assert!(config.placeholders.rasterize);
		assert_eq!(config.bounding_box, 400);
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("thumbs.toml");
		std::fs::write(&path, "bounding_boxx = 12\n").unwrap();

		assert!(matches!(
			ThumbnailerConfig::from_file(&path),
			Err(ConfigError::Parse { .. })
		));
	}

	#[test]
	fn environment_overrides_apply() {
		let config = ThumbnailerConfig::default()
			.with_env_overrides(vars(&[
				("KB_THUMB_BOUNDING_BOX", "256"),
				("KB_THUMB_FFMPEG_PATH", "/opt/ffmpeg/bin/ffmpeg"),
				("KB_THUMB_RASTERIZE_PLACEHOLDERS", "true"),
				("KB_THUMB_EXTRACT_COMMAND", "python3 extract_pptx.py"),
				("HOME", "/root"),
			]))
			.unwrap();

		assert_eq!(config.bounding_box, 256);
		assert_eq!(
			config.video.ffmpeg_path.as_deref(),
			Some(Path::new("/opt/ffmpeg/bin/ffmpeg"))
		);
		assert!(config.placeholders.rasterize);
		assert_eq!(
			config.documents.extract_command,
			Some(vec!["python3".to_owned(), "extract_pptx.py".to_owned()])
		);
	}

	#[test]
	fn bad_environment_values_are_errors() {
		assert!(matches!(
			ThumbnailerConfig::default().with_env_overrides(vars(&[("KB_THUMB_QUALITY", "high")])),
			Err(ConfigError::Env { .. })
		));
	}

	#[test]
	fn validation_catches_nonsense() {
		let mut config = ThumbnailerConfig {
			quality: 120.0,
			..Default::default()
		};
		assert!(config.validate().is_err());

		config.quality = 60.0;
		config.bounding_box = 0;
		assert!(config.validate().is_err());

		config.bounding_box = 400;
		config.video.retry_timestamp_secs = -1.0;
		assert!(config.validate().is_err());

		config.video.retry_timestamp_secs = 1.0;
		config.documents.extract_command = Some(vec![]);
		assert!(config.validate().is_err());
	}
}
