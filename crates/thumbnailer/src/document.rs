use crate::{source::SourceFile, Preview, Thumbnailer, ThumbnailerError};

use std::{
	fmt,
	path::{Path, PathBuf},
	process::Stdio,
	sync::Arc,
	time::Duration,
};

use async_trait::async_trait;
use kb_file_ext::{text::decode_head, DocumentStyle};
use kb_placeholder::PlaceholderKind;
use serde::Deserialize;
use tokio::{fs, io::AsyncReadExt, process::Command, time::timeout};
use tracing::{debug, instrument, trace};

/// Badge used for each document bucket
#[must_use]
pub const fn placeholder_kind(style: DocumentStyle) -> PlaceholderKind {
	match style {
		DocumentStyle::WordProcessor => PlaceholderKind::Docx,
		DocumentStyle::Spreadsheet => PlaceholderKind::Xlsx,
		DocumentStyle::DelimitedText => PlaceholderKind::Csv,
		DocumentStyle::PlainText => PlaceholderKind::Txt,
		DocumentStyle::Presentation => PlaceholderKind::Pptx,
		DocumentStyle::Generic => PlaceholderKind::Generic,
	}
}

/// Best effort source of a few lines of text to print on a document placeholder.
#[async_trait]
pub trait TextExtractor: fmt::Debug + Send + Sync {
	/// `None` means there is nothing to show, for whatever reason
	async fn extract_preview_text(&self, path: &Path, mime_type: &str) -> Option<String>;
}

/// Never has anything to say.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTextExtractor;

#[async_trait]
impl TextExtractor for NoTextExtractor {
	async fn extract_preview_text(&self, _: &Path, _: &str) -> Option<String> {
		None
	}
}

/// Reads the head of plain text like files (txt, md, csv, logs...).
#[derive(Debug, Clone, Copy)]
pub struct PlainTextExtractor {
	max_chars: usize,
}

impl PlainTextExtractor {
	#[must_use]
	pub const fn new(max_chars: usize) -> Self {
		Self { max_chars }
	}
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
	async fn extract_preview_text(&self, path: &Path, mime_type: &str) -> Option<String> {
		if !DocumentStyle::classify(path, mime_type).is_textual() || self.max_chars == 0 {
			return None;
		}

		// Worst case every char takes 4 bytes in UTF-8
		let limit = u64::try_from(self.max_chars.saturating_mul(4)).unwrap_or(u64::MAX);

		let mut head = Vec::new();
		fs::File::open(path)
			.await
			.ok()?
			.take(limit)
			.read_to_end(&mut head)
			.await
			.ok()?;

		clip(&decode_head(&head)?, self.max_chars)
	}
}

/// Runs an external extraction program with the file path as its last argument.
///
/// The program may print plain text, or a slide deck as JSON:
/// `{ "success": true, "slides": [{ "index": 0, "text": "..." }] }`.
#[derive(Debug, Clone)]
pub struct CommandTextExtractor {
	program: PathBuf,
	args: Vec<String>,
	timeout: Duration,
	max_chars: usize,
}

#[derive(Deserialize)]
struct SlideDeck {
	success: bool,
	#[serde(default)]
	slides: Vec<Slide>,
	#[serde(default)]
	error: Option<String>,
}

#[derive(Deserialize)]
struct Slide {
	index: usize,
	#[serde(default)]
	text: String,
}

impl CommandTextExtractor {
	/// `command` holds the program followed by its leading arguments, `None` if empty
	#[must_use]
	pub fn new(command: &[String], timeout: Duration, max_chars: usize) -> Option<Self> {
		let (program, args) = command.split_first()?;

		Some(Self {
			program: PathBuf::from(program),
			args: args.to_vec(),
			timeout,
			max_chars,
		})
	}

	async fn run(&self, path: &Path) -> Result<String, ThumbnailerError> {
		let failed = |reason: String| ThumbnailerError::Extraction {
			path: path.into(),
			reason,
		};

		let output = timeout(
			self.timeout,
			Command::new(&self.program)
				.args(&self.args)
				.arg(path)
				.stdin(Stdio::null())
				.kill_on_drop(true)
				.output(),
		)
		.await
		.map_err(|_| failed(format!("timed out after {:?}", self.timeout)))?
		.map_err(|e| failed(e.to_string()))?;

		if !output.status.success() {
			return Err(failed(format!(
				"exited with {}: {}",
				output.status,
				String::from_utf8_lossy(&output.stderr).trim()
			)));
		}

		match serde_json::from_slice::<SlideDeck>(&output.stdout) {
			Ok(SlideDeck {
				success: true,
				mut slides,
				..
			}) => {
				slides.sort_by_key(|slide| slide.index);
				Ok(slides
					.into_iter()
					.map(|slide| slide.text)
					.filter(|text| !text.trim().is_empty())
					.collect::<Vec<_>>()
					.join("\n"))
			}
			Ok(SlideDeck { error, .. }) => Err(failed(
				error.unwrap_or_else(|| String::from("extraction reported a failure")),
			)),
			Err(_) => decode_head(&output.stdout).ok_or_else(|| failed(String::from("binary output"))),
		}
	}
}

#[async_trait]
impl TextExtractor for CommandTextExtractor {
	async fn extract_preview_text(&self, path: &Path, _: &str) -> Option<String> {
		match self.run(path).await {
			Ok(text) => clip(&text, self.max_chars),
			Err(e) => {
				// Not worth more than a debug line, the placeholder just goes without a body
				debug!(?e, "Text extraction failed;");
				None
			}
		}
	}
}

/// Asks each extractor in turn, the first one with something to say wins.
#[derive(Debug, Clone, Default)]
pub struct TextExtractors(Vec<Arc<dyn TextExtractor>>);

impl TextExtractors {
	#[must_use]
	pub fn new(extractors: Vec<Arc<dyn TextExtractor>>) -> Self {
		Self(extractors)
	}
}

#[async_trait]
impl TextExtractor for TextExtractors {
	async fn extract_preview_text(&self, path: &Path, mime_type: &str) -> Option<String> {
		for extractor in &self.0 {
			if let Some(text) = extractor.extract_preview_text(path, mime_type).await {
				return Some(text);
			}
		}

		None
	}
}

fn clip(text: &str, max_chars: usize) -> Option<String> {
	let text = text.trim();
	let clipped = match text.char_indices().nth(max_chars) {
		Some((end, _)) => &text[..end],
		None => text,
	};

	Some(clipped.trim_end().to_owned()).filter(|text| !text.is_empty())
}

/// Badge placeholder for a document, with a few lines of its text when we can get them.
#[instrument(skip_all, fields(path = %source.path.display()))]
pub(crate) async fn placeholder_for_document(
	thumbnailer: &Thumbnailer,
	source: &SourceFile,
) -> Preview {
	let style = DocumentStyle::classify(&source.path, &source.mime_type);

	let text = thumbnailer
		.text
		.extract_preview_text(&source.path, &source.mime_type)
		.await;

	trace!(%style, has_text = text.is_some(), "Synthesizing document placeholder");

	let body = text.map(|text| {
		text.lines()
			.map(str::trim)
			.filter(|line| !line.is_empty())
			.map(ToOwned::to_owned)
			.collect::<Vec<_>>()
	});

	thumbnailer.placeholder(placeholder_kind(style), source, body.as_deref().unwrap_or_default())
}

#[cfg(test)]
mod tests {
	use super::*;

	use tempfile::tempdir;
	use tracing_test::traced_test;

	#[test]
	fn every_bucket_has_a_badge() {
		assert_eq!(
			placeholder_kind(DocumentStyle::WordProcessor),
			PlaceholderKind::Docx
		);
		assert_eq!(
			placeholder_kind(DocumentStyle::DelimitedText),
			PlaceholderKind::Csv
		);
		assert_eq!(
			placeholder_kind(DocumentStyle::Generic),
			PlaceholderKind::Generic
		);
	}

	#[test]
	fn clipping_respects_char_boundaries() {
		assert_eq!(clip("  héllo wörld  ", 5).as_deref(), Some("héllo"));
		assert_eq!(clip("short", 100).as_deref(), Some("short"));
		assert_eq!(clip("   ", 10), None);
	}

	#[tokio::test]
	#[traced_test]
	async fn plain_text_reads_the_head() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("notes.md");
		std::fs::write(&path, "# Groceries\n\n- milk\n- eggs\n".repeat(50)).unwrap();

		let text = PlainTextExtractor::new(20)
			.extract_preview_text(&path, "text/markdown")
			.await
			.unwrap();

		assert!(text.starts_with("# Groceries"));
		assert!(text.chars().count() <= 20);
	}

	#[tokio::test]
	#[traced_test]
	async fn plain_text_skips_office_files() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("report.docx");
		std::fs::write(&path, "looks like text but isn't a text document").unwrap();

		assert_eq!(
			PlainTextExtractor::new(100)
				.extract_preview_text(&path, "application/zip")
				.await,
			None
		);
	}

	#[tokio::test]
	#[traced_test]
	async fn plain_text_ignores_binary_garbage() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("dump.log");
		std::fs::write(&path, [0_u8, 1, 2, 3, 0xff, 0xfe, 0]).unwrap();

		assert_eq!(
			PlainTextExtractor::new(100)
				.extract_preview_text(&path, "text/plain")
				.await,
			None
		);
	}

	#[cfg(unix)]
	#[tokio::test]
	#[traced_test]
	async fn commands_can_print_slide_decks() {
		let command = [
			String::from("sh"),
			String::from("-c"),
			String::from(
				r#"echo '{"success": true, "slides": [{"index": 1, "text": "Second"}, {"index": 0, "text": "First"}]}'"#,
			),
			// `sh -c` takes the next argument as $0, the file path lands after it
			String::from("extract"),
		];

		let extractor =
			CommandTextExtractor::new(&command, Duration::from_secs(5), 100).unwrap();

		assert_eq!(
			extractor
				.extract_preview_text(Path::new("/decks/q3.pptx"), "")
				.await
				.as_deref(),
			Some("First\nSecond")
		);
	}

	#[cfg(unix)]
	#[tokio::test]
	#[traced_test]
	async fn commands_can_print_plain_text() {
		let command = [
			String::from("sh"),
			String::from("-c"),
			String::from(r#"printf 'extracted from %s' "$1""#),
			String::from("extract"),
		];

		let extractor =
			CommandTextExtractor::new(&command, Duration::from_secs(5), 100).unwrap();

		assert_eq!(
			extractor
				.extract_preview_text(Path::new("/docs/a.doc"), "")
				.await
				.as_deref(),
			Some("extracted from /docs/a.doc")
		);
	}

	#[cfg(unix)]
	#[tokio::test]
	#[traced_test]
	async fn failing_or_slow_commands_yield_nothing() {
		for script in [
			r#"echo '{"success": false, "error": "python-pptx not installed"}'"#,
			"exit 1",
			"sleep 30",
		] {
			let command = [
				String::from("sh"),
				String::from("-c"),
				String::from(script),
				String::from("extract"),
			];
			let extractor =
				CommandTextExtractor::new(&command, Duration::from_millis(300), 100).unwrap();

			assert_eq!(
				extractor
					.extract_preview_text(Path::new("/decks/q3.pptx"), "")
					.await,
				None
			);
		}

		assert!(logs_contain("Text extraction failed"));
	}

	#[test]
	fn empty_commands_are_refused() {
		assert!(CommandTextExtractor::new(&[], Duration::from_secs(1), 10).is_none());
	}

	#[tokio::test]
	async fn first_extractor_with_text_wins() {
		#[derive(Debug)]
		struct Fixed(&'static str);

		#[async_trait]
		impl TextExtractor for Fixed {
			async fn extract_preview_text(&self, _: &Path, _: &str) -> Option<String> {
				Some(self.0.to_owned())
			}
		}

		let chain = TextExtractors::new(vec![Arc::new(NoTextExtractor), Arc::new(Fixed("hello"))]);

		assert_eq!(
			chain
				.extract_preview_text(Path::new("a.txt"), "text/plain")
				.await
				.as_deref(),
			Some("hello")
		);
	}
}
