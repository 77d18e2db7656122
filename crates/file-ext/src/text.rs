/**
 * Text sniffing, based on the encoding heuristics of the `file` utility
 * https://github.com/file/file/blob/445f38730df6a2654eadcc180116035cc6788363/src/encoding.c
 *
 * Only UTF-8 and Latin-1 are recognised, which covers every text preview we render.
 */

/// Control bytes that are allowed inside text: BEL, BS, HT, LF, VT, FF, CR and ESC
const fn is_text_control(byte: u8) -> bool {
	matches!(byte, 0x07..=0x0d | 0x1b)
}

const fn is_text_ascii(byte: u8) -> bool {
	is_text_control(byte) || (byte >= 0x20 && byte != 0x7f)
}

fn looks_utf8(buf: &[u8], partial: bool) -> bool {
	let buf = buf.strip_prefix(&[0xef, 0xbb, 0xbf]).unwrap_or(buf);

	let text = match std::str::from_utf8(buf) {
		Ok(text) => text,
		// A sample cut from the middle of a file may end inside a multi byte sequence
		Err(e) if partial && e.error_len().is_none() => {
			match std::str::from_utf8(&buf[..e.valid_up_to()]) {
				Ok(text) => text,
				Err(_) => return false,
			}
		}
		Err(_) => return false,
	};

	text.bytes().filter(u8::is_ascii).all(is_text_ascii)
}

fn looks_latin1(buf: &[u8]) -> bool {
	buf.iter()
		.all(|&byte| is_text_ascii(byte) || byte == 0x85 || byte >= 0xa0)
}

/// Returns the detected encoding if `data` looks like human readable text.
///
/// Set `partial` when `data` is only the head of a larger file.
#[must_use]
pub fn is_text(data: &[u8], partial: bool) -> Option<&'static str> {
	if data.is_empty() {
		return None;
	}

	if looks_utf8(data, partial) {
		Some("utf-8")
	} else if looks_latin1(data) {
		Some("iso-8859-1")
	} else {
		None
	}
}

/// Decodes the head of a text file, dropping a BOM and any trailing partial character.
#[must_use]
pub fn decode_head(data: &[u8]) -> Option<String> {
	match is_text(data, true)? {
		"utf-8" => {
			let data = data.strip_prefix(&[0xef, 0xbb, 0xbf]).unwrap_or(data);
			Some(String::from_utf8_lossy(data).trim_end_matches('\u{fffd}').to_owned())
		}
		_ => Some(data.iter().map(|&byte| char::from(byte)).collect()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_utf8() {
		assert_eq!(is_text(b"hello, world\n", false), Some("utf-8"));
		assert_eq!(is_text("naïve café".as_bytes(), false), Some("utf-8"));
		assert_eq!(is_text(b"\xef\xbb\xbfwith bom", false), Some("utf-8"));
	}

	#[test]
	fn partial_utf8_sequences_are_accepted_only_when_partial() {
		let mut data = "résumé".as_bytes().to_vec();
		data.pop();
		assert_eq!(is_text(&data, true), Some("utf-8"));
		assert_ne!(is_text(&data, false), Some("utf-8"));
	}

	#[test]
	fn detects_latin1() {
		assert_eq!(is_text(b"caf\xe9", false), Some("iso-8859-1"));
	}

	#[test]
	fn rejects_binary() {
		assert_eq!(is_text(b"\x00\x01\x02PK", false), None);
		assert_eq!(is_text(b"", false), None);
	}

	#[test]
	fn decodes_heads() {
		let mut data = "café".as_bytes().to_vec();
		data.pop();
		assert_eq!(decode_head(&data).as_deref(), Some("caf"));
		assert_eq!(
			decode_head(b"caf\xe9 au lait").as_deref(),
			Some("café au lait")
		);
		assert_eq!(decode_head(b"\x00\x00"), None);
	}
}
