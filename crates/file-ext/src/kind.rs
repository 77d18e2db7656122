use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// The resource type declared by whoever imported the file.
///
/// Anything we don't know how to preview collapses into [`ResourceType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceType {
	Image,
	Pdf,
	Video,
	Document,
	Other,
}

impl ResourceType {
	/// Lenient parsing, unknown or empty strings map to [`ResourceType::Other`]
	#[must_use]
	pub fn parse(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"image" => Self::Image,
			"pdf" => Self::Pdf,
			"video" => Self::Video,
			"document" => Self::Document,
			_ => Self::Other,
		}
	}
}

impl From<&str> for ResourceType {
	fn from(value: &str) -> Self {
		Self::parse(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_known_types_case_insensitively() {
		assert_eq!(ResourceType::parse("image"), ResourceType::Image);
		assert_eq!(ResourceType::parse("PDF"), ResourceType::Pdf);
		assert_eq!(ResourceType::parse(" Video "), ResourceType::Video);
		assert_eq!(ResourceType::parse("document"), ResourceType::Document);
	}

	#[test]
	fn unknown_types_are_other() {
		assert_eq!(ResourceType::parse(""), ResourceType::Other);
		assert_eq!(ResourceType::parse("bookmark"), ResourceType::Other);
		assert_eq!(ResourceType::from("audio"), ResourceType::Other);
	}

	#[test]
	fn lenient_conversion_from_str() {
		let declared: ResourceType = "Pdf".into();
		assert_eq!(declared, ResourceType::Pdf);
		assert_eq!(ResourceType::from("other"), ResourceType::Other);
	}

	#[test]
	fn displays_lowercase() {
		assert_eq!(ResourceType::Document.to_string(), "document");
		assert_eq!(ResourceType::Pdf.as_ref(), "pdf");
	}
}
