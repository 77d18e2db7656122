//! Small MIME helpers. Importers are sloppy with casing and parameters, so everything
//! here works on the lowercase essence (`type/subtype`) only.

use std::path::Path;

pub const PDF: &str = "application/pdf";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Lowercase `type/subtype`, without parameters like `; charset=utf-8`
#[must_use]
pub fn essence(mime_type: &str) -> String {
	mime_type
		.split(';')
		.next()
		.unwrap_or_default()
		.trim()
		.to_ascii_lowercase()
}

#[must_use]
pub fn is_image(mime_type: &str) -> bool {
	essence(mime_type).starts_with("image/")
}

#[must_use]
pub fn is_video(mime_type: &str) -> bool {
	essence(mime_type).starts_with("video/")
}

#[must_use]
pub fn is_pdf(mime_type: &str) -> bool {
	essence(mime_type) == PDF
}

/// Best effort MIME guess from a file extension, used when the caller doesn't have one.
#[must_use]
pub fn guess_from_path(path: impl AsRef<Path>) -> &'static str {
	let Some(ext) = path
		.as_ref()
		.extension()
		.and_then(|ext| ext.to_str())
		.map(str::to_ascii_lowercase)
	else {
		return OCTET_STREAM;
	};

	match ext.as_str() {
		"jpg" | "jpeg" => "image/jpeg",
		"png" => "image/png",
		"gif" => "image/gif",
		"webp" => "image/webp",
		"bmp" => "image/bmp",
		"ico" => "image/x-icon",
		"tif" | "tiff" => "image/tiff",
		"svg" | "svgz" => "image/svg+xml",
		"avif" => "image/avif",
		"pdf" => PDF,
		"mp4" | "m4v" => "video/mp4",
		"mov" | "qt" => "video/quicktime",
		"mkv" => "video/x-matroska",
		"webm" => "video/webm",
		"avi" => "video/x-msvideo",
		"ogv" => "video/ogg",
		"doc" => "application/msword",
		"docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
		"odt" => "application/vnd.oasis.opendocument.text",
		"rtf" => "application/rtf",
		"xls" => "application/vnd.ms-excel",
		"xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
		"ods" => "application/vnd.oasis.opendocument.spreadsheet",
		"ppt" => "application/vnd.ms-powerpoint",
		"pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
		"odp" => "application/vnd.oasis.opendocument.presentation",
		"csv" => "text/csv",
		"tsv" => "text/tab-separated-values",
		"txt" | "log" => "text/plain",
		"md" | "markdown" => "text/markdown",
		_ => OCTET_STREAM,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn essence_strips_parameters_and_case() {
		assert_eq!(essence("Text/CSV; charset=UTF-8"), "text/csv");
		assert_eq!(essence("  image/PNG "), "image/png");
		assert_eq!(essence(""), "");
	}

	#[test]
	fn class_predicates() {
		assert!(is_image("image/jpeg"));
		assert!(!is_image("application/pdf"));
		assert!(is_video("VIDEO/mp4"));
		assert!(is_pdf("application/pdf; version=1.7"));
		assert!(!is_pdf("application/x-pdf-viewer"));
	}

	#[test]
	fn guesses_from_extension() {
		assert_eq!(guess_from_path("a/b/photo.JPG"), "image/jpeg");
		assert_eq!(guess_from_path("clip.mov"), "video/quicktime");
		assert_eq!(guess_from_path("paper.pdf"), PDF);
		assert_eq!(guess_from_path("README"), OCTET_STREAM);
	}
}
