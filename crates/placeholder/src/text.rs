use crate::{ELLIPSIS, LABEL_BUDGET, MAX_BODY_LINES, MAX_LINE_CHARS};

/// Escapes text for use inside SVG/XML text nodes and attribute values
#[must_use]
pub fn escape(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());

	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&apos;"),
			// XML 1.0 forbids most control characters, even escaped
			c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
			c => escaped.push(c),
		}
	}

	escaped
}

/// Cuts `label` down to [`LABEL_BUDGET`] characters followed by [`ELLIPSIS`].
///
/// Works on `char`s so multi byte names are never split mid character.
#[must_use]
pub fn truncate_label(label: &str) -> String {
	let label = label.trim();

	if label.chars().count() <= LABEL_BUDGET {
		return label.to_owned();
	}

	let mut truncated = label
		.chars()
		.take(LABEL_BUDGET)
		.collect::<String>()
		.trim_end()
		.to_owned();
	truncated.push_str(ELLIPSIS);
	truncated
}

/// Greedy word wrap of `paragraphs` into at most [`MAX_BODY_LINES`] lines of
/// [`MAX_LINE_CHARS`] characters.
///
/// Each paragraph starts on a new line, words that don't fit in the budget are dropped
/// and a single word longer than a line is hard cut.
#[must_use]
pub fn wrap_body<S: AsRef<str>>(paragraphs: &[S]) -> Vec<String> {
	let mut lines = Vec::with_capacity(MAX_BODY_LINES);

	'paragraphs: for paragraph in paragraphs {
		let mut current = String::new();
		let mut current_len = 0;

		for word in paragraph.as_ref().split_whitespace() {
			let mut word = word.chars().collect::<Vec<_>>();

			loop {
				let needed = if current_len == 0 {
					word.len()
				} else {
					current_len + 1 + word.len()
				};

				if needed <= MAX_LINE_CHARS {
					if current_len > 0 {
						current.push(' ');
					}
					current.extend(word.iter());
					current_len = needed;
					break;
				}

				if current_len > 0 {
					lines.push(std::mem::take(&mut current));
					current_len = 0;
					if lines.len() == MAX_BODY_LINES {
						break 'paragraphs;
					}
					continue;
				}

				// A lone word wider than a whole line
				let rest = word.split_off(MAX_LINE_CHARS);
				lines.push(word.into_iter().collect());
				if lines.len() == MAX_BODY_LINES {
					break 'paragraphs;
				}
				word = rest;
			}
		}

		if current_len > 0 {
			lines.push(current);
			if lines.len() == MAX_BODY_LINES {
				break;
			}
		}
	}

	lines
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escapes_markup() {
		assert_eq!(
			escape(r#"<a href="x">Tom & Jerry's</a>"#),
			"&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
		);
		assert_eq!(escape("bell\u{7}"), "bell");
	}

	#[test]
	fn short_labels_are_untouched() {
		assert_eq!(truncate_label("notes.txt"), "notes.txt");
		assert_eq!(truncate_label(&"a".repeat(LABEL_BUDGET)), "a".repeat(LABEL_BUDGET));
	}

	#[test]
	fn long_labels_are_truncated_with_an_ellipsis() {
		let label = "My Really Long Annual Report Draft Final V12";
		let truncated = truncate_label(label);

		assert!(truncated.ends_with(ELLIPSIS));
		assert!(truncated.chars().count() <= LABEL_BUDGET + ELLIPSIS.len());
		assert_eq!(truncated, "My Really Long Annual Report Draft...");
	}

	#[test]
	fn truncation_respects_char_boundaries() {
		let label = "é".repeat(50);
		let truncated = truncate_label(&label);
		assert_eq!(truncated.chars().count(), LABEL_BUDGET + ELLIPSIS.len());
	}

	#[test]
	fn wraps_words_into_lines() {
		let lines = wrap_body(&["the quick brown fox jumps over the lazy dog and keeps on running far away"]);

		assert_eq!(lines.len(), 2);
		assert!(lines.iter().all(|line| line.chars().count() <= MAX_LINE_CHARS));
		assert_eq!(
			lines.join(" "),
			"the quick brown fox jumps over the lazy dog and keeps on running far away"
		);
	}

	#[test]
	fn paragraphs_start_new_lines() {
		let lines = wrap_body(&["name,amount", "coffee,3.50", "", "  "]);
		assert_eq!(lines, vec!["name,amount", "coffee,3.50"]);
	}

	#[test]
	fn drops_words_beyond_the_budget() {
		let text = (0..200).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
		let lines = wrap_body(&[text]);

		assert_eq!(lines.len(), MAX_BODY_LINES);
		assert!(!lines.join(" ").contains("w199"));
	}

	#[test]
	fn hard_cuts_overlong_words() {
		let word = "x".repeat(MAX_LINE_CHARS * 2 + 5);
		let lines = wrap_body(&[word]);

		assert_eq!(lines.len(), 3);
		assert_eq!(lines[0].len(), MAX_LINE_CHARS);
		assert_eq!(lines[2].len(), 5);
	}

	#[test]
	fn empty_body_wraps_to_nothing() {
		assert!(wrap_body::<&str>(&[]).is_empty());
	}
}
