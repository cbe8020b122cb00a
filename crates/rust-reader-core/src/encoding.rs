/// Encoding detection and decoding for fetched documents.
use anyhow::{Context, Result};

/// Encodings a document can arrive in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Ascii,
    /// A named encoding from `encoding_rs` (e.g., "windows-1252").
    Legacy(&'static str),
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::Utf8Bom => write!(f, "UTF-8 BOM"),
            Self::Utf16Le => write!(f, "UTF-16 LE"),
            Self::Utf16Be => write!(f, "UTF-16 BE"),
            Self::Ascii => write!(f, "ASCII"),
            Self::Legacy(name) => write!(f, "{name}"),
        }
    }
}

/// Detects the encoding of raw bytes.
pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
    // BOM first
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return TextEncoding::Utf8Bom;
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return TextEncoding::Utf16Le;
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return TextEncoding::Utf16Be;
    }

    if std::str::from_utf8(bytes).is_ok() {
        if bytes.is_ascii() {
            return TextEncoding::Ascii;
        }
        return TextEncoding::Utf8;
    }

    // Older Gutenberg texts are commonly Latin-1 / Windows-1252
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    TextEncoding::Legacy(detector.guess(None, true).name())
}

fn decode_utf16(content: &[u8], from_bytes: fn([u8; 2]) -> u16) -> Result<String> {
    let units: Vec<u16> = content
        .chunks_exact(2)
        .map(|chunk| from_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16(&units).context("invalid UTF-16 content")
}

/// Decodes raw bytes using `encoding`.
///
/// Legacy code pages decode with replacement characters rather than failing;
/// a warning is logged when replacements were needed.
///
/// # Errors
///
/// Returns an error for malformed UTF-8/UTF-16 or an unknown encoding label.
pub fn decode_bytes(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Ascii => {
            String::from_utf8(bytes.to_vec()).context("invalid UTF-8 content")
        }
        TextEncoding::Utf8Bom => {
            let content = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
            String::from_utf8(content.to_vec()).context("invalid UTF-8 BOM content")
        }
        TextEncoding::Utf16Le => {
            let content = bytes.strip_prefix(&[0xFF, 0xFE]).unwrap_or(bytes);
            decode_utf16(content, u16::from_le_bytes).context("UTF-16 LE")
        }
        TextEncoding::Utf16Be => {
            let content = bytes.strip_prefix(&[0xFE, 0xFF]).unwrap_or(bytes);
            decode_utf16(content, u16::from_be_bytes).context("UTF-16 BE")
        }
        TextEncoding::Legacy(name) => {
            let encoding = encoding_rs::Encoding::for_label(name.as_bytes())
                .with_context(|| format!("unknown encoding: {name}"))?;
            let (decoded, _, had_errors) = encoding.decode(bytes);
            if had_errors {
                tracing::warn!("Replaced malformed sequences while decoding as {name}");
            }
            Ok(decoded.into_owned())
        }
    }
}

/// Normalizes line endings to `\n` (LF).
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Detects, decodes and normalizes a fetched document.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded in the detected encoding.
pub fn decode_document(bytes: &[u8]) -> Result<(String, TextEncoding)> {
    let encoding = detect_encoding(bytes);
    let text = decode_bytes(bytes, encoding)
        .with_context(|| format!("failed to decode document as {encoding}"))?;
    Ok((normalize_line_endings(&text), encoding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_ascii() {
        assert_eq!(detect_encoding(b"hello world"), TextEncoding::Ascii);
    }

    #[test]
    fn test_detect_utf8() {
        assert_eq!(detect_encoding("naïve café".as_bytes()), TextEncoding::Utf8);
    }

    #[test]
    fn test_detect_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"hello");
        assert_eq!(detect_encoding(&bytes), TextEncoding::Utf8Bom);
        assert_eq!(decode_bytes(&bytes, TextEncoding::Utf8Bom).unwrap(), "hello");
    }

    #[test]
    fn test_utf16_le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(detect_encoding(&bytes), TextEncoding::Utf16Le);
        assert_eq!(decode_bytes(&bytes, TextEncoding::Utf16Le).unwrap(), "Hi");
    }

    #[test]
    fn test_utf16_be_with_bom() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Ok".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_bytes(&bytes, detect_encoding(&bytes)).unwrap(), "Ok");
    }

    #[test]
    fn test_latin1_bytes_decode_as_legacy() {
        let original = "Le café était très agréable, et la bibliothèque fermée à l'été.\n";
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(original);
        assert!(std::str::from_utf8(&bytes).is_err());
        let (text, encoding) = decode_document(&bytes).unwrap();
        assert!(matches!(encoding, TextEncoding::Legacy(_)));
        assert!(text.starts_with("Le caf"));
        assert_eq!(text.chars().count(), original.chars().count());
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        assert!(decode_bytes(&[0xC3, 0x28], TextEncoding::Utf8).is_err());
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        assert!(decode_bytes(b"abc", TextEncoding::Legacy("no-such-charset")).is_err());
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_decode_document_normalizes_crlf() {
        let (text, _) = decode_document(b"one\r\ntwo\r\n").unwrap();
        assert_eq!(text, "one\ntwo\n");
    }
}
