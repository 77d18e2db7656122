use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// What the placeholder stands in for, picks the badge and colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlaceholderKind {
	Pdf,
	Docx,
	Xlsx,
	Csv,
	Txt,
	Pptx,
	Video,
	Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
	pub badge: &'static str,
	pub accent: &'static str,
	pub background: &'static str,
}

impl PlaceholderKind {
	#[must_use]
	pub const fn style(self) -> Style {
		match self {
			Self::Pdf => Style {
				badge: "PDF",
				accent: "#dc2626",
				background: "#fef2f2",
			},
			Self::Docx => Style {
				badge: "DOCX",
				accent: "#2563eb",
				background: "#eff6ff",
			},
			Self::Xlsx => Style {
				badge: "XLSX",
				accent: "#16a34a",
				background: "#f0fdf4",
			},
			Self::Csv => Style {
				badge: "CSV",
				accent: "#0d9488",
				background: "#f0fdfa",
			},
			Self::Txt => Style {
				badge: "TXT",
				accent: "#475569",
				background: "#f8fafc",
			},
			Self::Pptx => Style {
				badge: "PPTX",
				accent: "#ea580c",
				background: "#fff7ed",
			},
			Self::Video => Style {
				badge: "VIDEO",
				accent: "#7c3aed",
				background: "#f5f3ff",
			},
			Self::Generic => Style {
				badge: "FILE",
				accent: "#6b7280",
				background: "#f9fafb",
			},
		}
	}

	#[must_use]
	pub const fn accent(self) -> &'static str {
		self.style().accent
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::collections::HashSet;

	use strum::IntoEnumIterator;

	#[test]
	fn every_kind_has_a_distinct_badge() {
		let badges = PlaceholderKind::iter()
			.map(|kind| kind.style().badge)
			.collect::<HashSet<_>>();

		assert_eq!(badges.len(), PlaceholderKind::iter().count());
	}
}
