use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Page body converted to UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub text: String,
    pub encoding_label: String,
    /// True when malformed sequences were replaced with U+FFFD.
    pub lossy: bool,
}

/// Best-effort decode of a response body: BOM -> Content-Type charset ->
/// chardetng guess. Malformed input never fails; it is replaced instead, since
/// title and email matching still work on the readable remainder.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> PageText {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(charset_param) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> PageText {
    // `decode` sniffs a BOM itself; the encoding it reports wins.
    let (text, used, had_errors) = enc.decode(bytes);
    PageText {
        text: text.into_owned(),
        encoding_label: used.name().to_string(),
        lossy: had_errors,
    }
}
