use crate::mime;

use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Document extensions we know how to badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DocumentExtension {
	// word processors
	Doc,
	Docx,
	Odt,
	Rtf,
	Pages,
	// spreadsheets
	Xls,
	Xlsx,
	Ods,
	Numbers,
	// delimited text
	Csv,
	Tsv,
	// plain text
	Txt,
	Md,
	Markdown,
	Log,
	// presentations
	Ppt,
	Pptx,
	Odp,
	Key,
}

impl DocumentExtension {
	#[must_use]
	pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
		path.as_ref()
			.extension()
			.and_then(|ext| ext.to_str())
			.and_then(|ext| Self::from_str(ext).ok())
	}

	#[must_use]
	pub const fn style(self) -> DocumentStyle {
		use DocumentExtension::{
			Csv, Doc, Docx, Key, Log, Markdown, Md, Numbers, Odp, Ods, Odt, Pages, Ppt, Pptx,
			Rtf, Tsv, Txt, Xls, Xlsx,
		};

		match self {
			Doc | Docx | Odt | Rtf | Pages => DocumentStyle::WordProcessor,
			Xls | Xlsx | Ods | Numbers => DocumentStyle::Spreadsheet,
			Csv | Tsv => DocumentStyle::DelimitedText,
			Txt | Md | Markdown | Log => DocumentStyle::PlainText,
			Ppt | Pptx | Odp | Key => DocumentStyle::Presentation,
		}
	}
}

/// The visual bucket a document falls into when we draw its placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentStyle {
	WordProcessor,
	Spreadsheet,
	DelimitedText,
	PlainText,
	Presentation,
	Generic,
}

impl DocumentStyle {
	/// Classifies a document by its extension first, falling back to the MIME type.
	///
	/// Extensions win because importers frequently hand us `application/octet-stream`
	/// or the zip MIME for office files.
	#[must_use]
	pub fn classify(path: impl AsRef<Path>, mime_type: &str) -> Self {
		DocumentExtension::from_path(path)
			.map(DocumentExtension::style)
			.unwrap_or_else(|| Self::from_mime(mime_type))
	}

	#[must_use]
	pub fn from_mime(mime_type: &str) -> Self {
		let essence = mime::essence(mime_type);

		match essence.as_str() {
			"application/msword"
			| "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
			| "application/vnd.oasis.opendocument.text"
			| "application/rtf"
			| "text/rtf" => Self::WordProcessor,
			"application/vnd.ms-excel"
			| "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
			| "application/vnd.oasis.opendocument.spreadsheet" => Self::Spreadsheet,
			"text/csv" | "text/tab-separated-values" | "application/csv" => Self::DelimitedText,
			"application/vnd.ms-powerpoint"
			| "application/vnd.openxmlformats-officedocument.presentationml.presentation"
			| "application/vnd.oasis.opendocument.presentation" => Self::Presentation,
			other if other.starts_with("text/") => Self::PlainText,
			_ => Self::Generic,
		}
	}

	/// Whether a plain read of the file head yields something worth showing.
	#[must_use]
	pub const fn is_textual(self) -> bool {
		matches!(self, Self::DelimitedText | Self::PlainText)
	}
}
