//! Response body text decoding.

use encoding_rs::Encoding;
use encoding_rs::UTF_8;

const META_SCAN_BYTES: usize = 8192;

/// Decodes a proxied page body into text.
///
/// A `<meta charset>` in the first few KiB wins over the Content-Type
/// parameter; unknown or missing labels fall back to UTF-8 with replacement.
pub fn decode_page_text(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_charset(body, content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn detect_charset(body: &[u8], content_type: Option<&str>) -> Option<String> {
    // Proxies commonly drop Content-Type; assume HTML then.
    let looks_like_html = content_type.is_none_or(|value| {
        let lower = value.to_ascii_lowercase();
        lower.contains("text/html") || lower.contains("application/xhtml+xml")
    });

    if looks_like_html {
        if let Some(label) = charset_from_html_prefix(body) {
            return Some(label);
        }
    }

    content_type.and_then(charset_from_content_type)
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let (name, value) = part.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let label = value.trim().trim_matches('"').trim_matches('\'');
        (!label.is_empty()).then(|| label.to_owned())
    })
}

fn charset_from_html_prefix(body: &[u8]) -> Option<String> {
    let prefix = String::from_utf8_lossy(&body[..body.len().min(META_SCAN_BYTES)]);
    let lower = prefix.to_ascii_lowercase();
    let mut search_start = 0_usize;

    while let Some(relative) = lower[search_start..].find("charset=") {
        let label_start = search_start + relative + "charset=".len();
        if let Some(label) = charset_label(&prefix[label_start..]) {
            return Some(label);
        }
        search_start = label_start;
    }

    None
}

fn charset_label(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    let first = trimmed.chars().next()?;

    let label = if first == '"' || first == '\'' {
        let rest = &trimmed[first.len_utf8()..];
        rest[..rest.find(first)?].trim()
    } else {
        let end = trimmed
            .find(|ch: char| ch.is_whitespace() || matches!(ch, '"' | '\'' | ';' | '>' | '/'))
            .unwrap_or(trimmed.len());
        trimmed[..end].trim()
    };

    (!label.is_empty()).then(|| label.to_owned())
}

#[cfg(test)]
mod tests {
    use super::charset_from_content_type;
    use super::charset_from_html_prefix;
    use super::decode_page_text;

    #[test]
    fn reads_charset_parameter_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=\"ISO-8859-1\"").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn reads_meta_charset_in_both_forms() {
        assert_eq!(
            charset_from_html_prefix(b"<meta charset='windows-1252'>").as_deref(),
            Some("windows-1252")
        );
        assert_eq!(
            charset_from_html_prefix(
                b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=shift_jis\">"
            )
            .as_deref(),
            Some("shift_jis")
        );
    }

    #[test]
    fn meta_charset_overrides_header() {
        let body = b"<meta charset=windows-1252><p>caf\xe9</p>";
        let text = decode_page_text(body, Some("text/html; charset=utf-8"));
        assert_eq!(text, "<meta charset=windows-1252><p>caf\u{e9}</p>");
    }

    #[test]
    fn falls_back_to_lossy_utf8() {
        assert_eq!(decode_page_text(b"plain \xff", None), "plain \u{fffd}");
        assert_eq!(
            decode_page_text("na\u{ef}ve".as_bytes(), Some("text/html; charset=bogus")),
            "na\u{ef}ve"
        );
    }
}
