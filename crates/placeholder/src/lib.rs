#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	clippy::expect_used,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro
)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Placeholder art for resources that can't (or couldn't) be rendered for real.
//!
//! Everything in here is pure: the same inputs always produce byte identical SVG, so
//! callers are free to cache or compare the output.

mod style;
mod text;

pub use style::{PlaceholderKind, Style};
pub use text::{escape, truncate_label, wrap_body};

/// Logical width of every placeholder
pub const WIDTH: u32 = 400;
/// Logical height of every placeholder, keeping a 4:3 aspect ratio
pub const HEIGHT: u32 = 300;

/// Characters of the label we keep before cutting it with [`ELLIPSIS`]
pub const LABEL_BUDGET: usize = 35;
pub const ELLIPSIS: &str = "...";

pub const MAX_BODY_LINES: usize = 6;
pub const MAX_LINE_CHARS: usize = 48;

pub const MEDIA_TYPE: &str = "image/svg+xml";

const FONT_FAMILY: &str = "Inter, Helvetica, Arial, sans-serif";
const MARGIN: u32 = 24;
const BADGE_HEIGHT: u32 = 28;
const BODY_TOP: u32 = 120;
const BODY_LINE_HEIGHT: u32 = 22;

/// Renders a placeholder as SVG markup.
///
/// `label` is usually the file name; `body` holds paragraphs of preview text which get
/// word wrapped into at most [`MAX_BODY_LINES`] lines. `accent` must be a `#rgb` or
/// `#rrggbb` colour, anything else falls back to the accent of `kind`.
#[must_use]
pub fn render_placeholder<S: AsRef<str>>(
	kind: PlaceholderKind,
	label: &str,
	body: &[S],
	accent: &str,
) -> String {
	let style = kind.style();
	let accent = if is_hex_color(accent) {
		accent
	} else {
		style.accent
	};

	let label = escape(&truncate_label(label));
	let lines = wrap_body(body);

	#[allow(clippy::cast_possible_truncation)]
	let badge_width = 16 + 10 * style.badge.len() as u32;

	let mut svg = format!(
		r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
	);
	svg.push_str(&format!(
		r#"<rect width="{WIDTH}" height="{HEIGHT}" rx="12" fill="{}"/>"#,
		style.background
	));
	svg.push_str(&format!(
		r#"<rect width="{WIDTH}" height="6" fill="{accent}"/>"#
	));
	svg.push_str(&format!(
		r#"<rect x="{MARGIN}" y="{MARGIN}" width="{badge_width}" height="{BADGE_HEIGHT}" rx="6" fill="{accent}"/>"#
	));
	svg.push_str(&format!(
		r##"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="14" font-weight="700" fill="#ffffff" text-anchor="middle">{}</text>"##,
		MARGIN + badge_width / 2,
		MARGIN + 19,
		style.badge
	));

	if !label.is_empty() {
		svg.push_str(&format!(
			r##"<text x="{MARGIN}" y="92" font-family="{FONT_FAMILY}" font-size="16" font-weight="600" fill="#1f2937">{label}</text>"##
		));
	}

	if lines.is_empty() {
		push_page_glyph(&mut svg, accent);
	} else {
		for (i, line) in (0_u32..).zip(&lines) {
			svg.push_str(&format!(
				r##"<text x="{MARGIN}" y="{}" font-family="{FONT_FAMILY}" font-size="13" fill="#4b5563" xml:space="preserve">{}</text>"##,
				BODY_TOP + i * BODY_LINE_HEIGHT,
				escape(line)
			));
		}
	}

	svg.push_str("</svg>");
	svg
}

/// A faded folded-corner page, drawn when there is no body text to fill the card
fn push_page_glyph(svg: &mut String, accent: &str) {
	let (x, y, w, h, fold) = (WIDTH / 2 - 40, 128, 80, 104, 22);

	svg.push_str(&format!(
		r#"<path d="M{x} {y}h{}l{fold} {fold}v{}h-{w}z" fill="none" stroke="{accent}" stroke-width="4" stroke-linejoin="round" opacity="0.35"/>"#,
		w - fold,
		h - fold,
	));
	svg.push_str(&format!(
		r#"<path d="M{} {y}v{fold}h{fold}" fill="none" stroke="{accent}" stroke-width="4" stroke-linejoin="round" opacity="0.35"/>"#,
		x + w - fold,
	));
}

fn is_hex_color(value: &str) -> bool {
	value.strip_prefix('#').is_some_and(|hex| {
		matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rendering_is_deterministic() {
		let body = ["Quarterly numbers", "Revenue grew 12%"];
		let a = render_placeholder(PlaceholderKind::Pdf, "report.pdf", &body, "#dc2626");
		let b = render_placeholder(PlaceholderKind::Pdf, "report.pdf", &body, "#dc2626");
		assert_eq!(a.as_bytes(), b.as_bytes());
	}

	#[test]
	fn output_is_a_fixed_size_svg() {
		let svg = render_placeholder::<&str>(PlaceholderKind::Generic, "file", &[], "#000");
		assert!(svg.starts_with("<svg "));
		assert!(svg.ends_with("</svg>"));
		assert!(svg.contains(r#"viewBox="0 0 400 300""#));
	}

	#[test]
	fn interpolated_text_is_escaped() {
		let svg = render_placeholder(
			PlaceholderKind::Txt,
			"<script>alert(1)</script>.txt",
			&["a & b \"quoted\" <tag>"],
			"#2563eb",
		);
		assert!(!svg.contains("<script>"));
		assert!(svg.contains("&lt;script&gt;"));
		assert!(svg.contains("a &amp; b &quot;quoted&quot; &lt;tag&gt;"));
	}

	#[test]
	fn invalid_accent_falls_back_to_kind_style() {
		let svg = render_placeholder::<&str>(
			PlaceholderKind::Xlsx,
			"sheet.xlsx",
			&[],
			r#"red" onload="alert(1)"#,
		);
		assert!(!svg.contains("onload"));
		assert!(svg.contains(PlaceholderKind::Xlsx.style().accent));
	}

	#[test]
	fn badge_matches_kind() {
		let svg = render_placeholder::<&str>(PlaceholderKind::Docx, "a.docx", &[], "#2563eb");
		assert!(svg.contains(">DOCX</text>"));
	}

	#[test]
	fn empty_body_draws_no_text_lines() {
		let svg = render_placeholder::<&str>(PlaceholderKind::Docx, "a.docx", &[], "#2563eb");
		assert!(!svg.contains("xml:space"));
		assert!(!svg.contains("null"));
	}

	#[test]
	fn body_is_capped_at_six_lines() {
		let long = "lorem ipsum dolor sit amet ".repeat(40);
		let svg = render_placeholder(PlaceholderKind::Txt, "notes.txt", &[long], "#475569");
		assert_eq!(svg.matches("xml:space").count(), MAX_BODY_LINES);
	}

	#[test]
	fn hex_colors() {
		assert!(is_hex_color("#fff"));
		assert!(is_hex_color("#A1b2C3"));
		assert!(!is_hex_color("fff"));
		assert!(!is_hex_color("#ggg"));
		assert!(!is_hex_color("#12345"));
	}
}
