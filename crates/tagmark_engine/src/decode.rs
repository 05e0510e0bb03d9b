use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode page bytes as {encoding}")]
    Malformed { encoding: String },
}

/// Decode a saved page into UTF-8: BOM, then an explicit charset hint, then
/// `chardetng` detection (which also honours `<meta charset>`).
pub fn decode_page(bytes: &[u8], charset_hint: Option<&str>) -> Result<DecodedPage, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(encoding) = charset_hint
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

/// Accepts either a bare label (`latin1`) or a content type (`text/html; charset=latin1`).
fn charset_label(hint: &str) -> Option<String> {
    if !hint.contains(';') && !hint.contains('=') {
        let label = hint.trim();
        return (!label.is_empty()).then(|| label.to_string());
    }
    hint.split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\'']).to_string())
        })
        .next()
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedPage, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(DecodedPage {
        html: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_wins_over_hint() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<p>@alice</p>".as_bytes());
        let page = decode_page(&bytes, Some("windows-1252")).unwrap();
        assert_eq!(page.encoding_label, "UTF-8");
        assert_eq!(page.html, "<p>@alice</p>");
    }

    #[test]
    fn content_type_hint_selects_encoding() {
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        let page = decode_page(&bytes, Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(page.encoding_label, "windows-1252");
        assert_eq!(page.html, "café");
    }
}
