//! Byte-level HTML tokenizer.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
}

pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut idx = 0_usize;

    while idx < bytes.len() {
        if bytes[idx] != b'<' {
            let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
            push_text(&mut tokens, decode_entities(&source[idx..next]));
            idx = next;
            continue;
        }

        if starts_with(bytes, idx, b"<!--") {
            idx = find_subslice(bytes, idx.saturating_add(4), b"-->")
                .map(|end| end.saturating_add(3))
                .unwrap_or(bytes.len());
            continue;
        }

        if starts_with(bytes, idx, b"<!") || starts_with(bytes, idx, b"<?") {
            idx = skip_to_gt(bytes, idx.saturating_add(2));
            continue;
        }

        if starts_with(bytes, idx, b"</") {
            match parse_end_tag(bytes, idx) {
                Some((name, next)) => {
                    tokens.push(Token::End { name });
                    idx = next;
                }
                None => {
                    push_text(&mut tokens, "<".to_owned());
                    idx = idx.saturating_add(1);
                }
            }
            continue;
        }

        let Some((token, next)) = parse_start_tag(source, idx) else {
            push_text(&mut tokens, "<".to_owned());
            idx = idx.saturating_add(1);
            continue;
        };

        let raw_text_tag = match &token {
            Token::Start {
                name, self_closing, ..
            } if !*self_closing && is_raw_text_tag(name) => Some(name.clone()),
            _ => None,
        };
        tokens.push(token);
        idx = next;

        if let Some(tag_name) = raw_text_tag {
            let (raw, after) = read_raw_text(source, idx, &tag_name);
            if !raw.is_empty() {
                tokens.push(Token::Text(raw.to_owned()));
            }
            tokens.push(Token::End { name: tag_name });
            idx = after;
        }
    }

    tokens
}

fn push_text(tokens: &mut Vec<Token>, text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(Token::Text(previous)) = tokens.last_mut() {
        previous.push_str(&text);
        return;
    }
    tokens.push(Token::Text(text));
}

fn parse_end_tag(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut idx = skip_spaces(bytes, start.saturating_add(2));
    let name_start = idx;
    while idx < bytes.len() && is_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }
    if idx == name_start {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[name_start..idx]).to_ascii_lowercase();
    let end = find_byte(bytes, idx, b'>')?;
    Some((name, end.saturating_add(1)))
}

fn parse_start_tag(source: &str, start: usize) -> Option<(Token, usize)> {
    let bytes = source.as_bytes();
    let mut idx = start.saturating_add(1);
    let name_start = idx;
    while idx < bytes.len() && is_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }
    if idx == name_start || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }

    let name = source[name_start..idx].to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        idx = skip_spaces(bytes, idx);
        let byte = *bytes.get(idx)?;

        if byte == b'>' {
            idx = idx.saturating_add(1);
            break;
        }

        if byte == b'/' {
            self_closing = true;
            idx = idx.saturating_add(1);
            continue;
        }
        self_closing = false;

        let attr_start = idx;
        while idx < bytes.len() && !is_attr_name_terminator(bytes[idx]) {
            idx = idx.saturating_add(1);
        }
        if idx == attr_start {
            // Stray `=` or quote; skip it rather than stalling.
            idx = idx.saturating_add(1);
            continue;
        }
        let attr_name = source[attr_start..idx].to_ascii_lowercase();

        idx = skip_spaces(bytes, idx);
        let mut value = String::new();
        if bytes.get(idx).copied() == Some(b'=') {
            idx = skip_spaces(bytes, idx.saturating_add(1));
            match bytes.get(idx).copied() {
                Some(quote @ (b'"' | b'\'')) => {
                    let value_start = idx.saturating_add(1);
                    let value_end = find_byte(bytes, value_start, quote).unwrap_or(bytes.len());
                    value = decode_entities(&source[value_start..value_end]);
                    idx = value_end.saturating_add(1);
                }
                Some(_) => {
                    let value_start = idx;
                    while idx < bytes.len()
                        && !bytes[idx].is_ascii_whitespace()
                        && bytes[idx] != b'>'
                    {
                        idx = idx.saturating_add(1);
                    }
                    value = decode_entities(&source[value_start..idx]);
                }
                None => return None,
            }
        }

        // First occurrence wins, as in browsers.
        if !attrs.iter().any(|(existing, _)| *existing == attr_name) {
            attrs.push((attr_name, value));
        }
    }

    Some((
        Token::Start {
            name,
            attrs,
            self_closing,
        },
        idx,
    ))
}

fn read_raw_text<'a>(source: &'a str, start: usize, tag_name: &str) -> (&'a str, usize) {
    let bytes = source.as_bytes();
    let tag_bytes = tag_name.as_bytes();
    let mut idx = start;

    while let Some(lt) = find_byte(bytes, idx, b'<') {
        let name_start = lt.saturating_add(2);
        if bytes.get(lt.saturating_add(1)).copied() == Some(b'/')
            && starts_with_ignore_ascii_case(bytes, name_start, tag_bytes)
            && tag_name_boundary(bytes, name_start.saturating_add(tag_bytes.len()))
        {
            let end = find_byte(bytes, lt, b'>')
                .map(|gt| gt.saturating_add(1))
                .unwrap_or(bytes.len());
            return (&source[start..lt], end);
        }
        idx = lt.saturating_add(1);
    }

    (&source[start..], bytes.len())
}

pub(crate) fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0_usize;

    while let Some(relative) = input[cursor..].find('&') {
        let amp = cursor + relative;
        out.push_str(&input[cursor..amp]);

        let rest = &input[amp + 1..];
        let decoded = rest
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_entity(&rest[..semi]).map(|ch| (ch, semi)));

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                cursor = amp + 1 + semi + 1;
            }
            None => {
                out.push('&');
                cursor = amp + 1;
            }
        }
    }

    out.push_str(&input[cursor..]);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "nbsp" => Some('\u{a0}'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "copy" => Some('\u{a9}'),
        "reg" => Some('\u{ae}'),
        "hellip" => Some('\u{2026}'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        _ => {
            let value = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(value)
        }
    }
}

pub(crate) fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

fn is_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn is_attr_name_terminator(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'=' | b'>' | b'/' | b'"' | b'\'')
}

fn tag_name_boundary(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx).copied() {
        None => true,
        Some(byte) => byte.is_ascii_whitespace() || byte == b'>' || byte == b'/',
    }
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx = idx.saturating_add(1);
    }
    idx
}

fn skip_to_gt(bytes: &[u8], from: usize) -> usize {
    find_byte(bytes, from, b'>')
        .map(|gt| gt.saturating_add(1))
        .unwrap_or(bytes.len())
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end] == *pattern
}

fn starts_with_ignore_ascii_case(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end].eq_ignore_ascii_case(pattern)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::Token;
    use super::decode_entities;
    use super::tokenize;

    #[test]
    fn tokenizes_attributes_in_all_quote_styles() {
        let tokens = tokenize("<input id=q name='query' value=\"a&amp;b\" disabled>");
        assert_eq!(
            tokens,
            vec![Token::Start {
                name: "input".to_owned(),
                attrs: vec![
                    ("id".to_owned(), "q".to_owned()),
                    ("name".to_owned(), "query".to_owned()),
                    ("value".to_owned(), "a&b".to_owned()),
                    ("disabled".to_owned(), String::new()),
                ],
                self_closing: false,
            }]
        );
    }

    #[test]
    fn keeps_script_body_raw() {
        let tokens = tokenize("<SCRIPT>if (a < b) { x = '</div>'; }</script >after");
        assert_eq!(
            tokens,
            vec![
                Token::Start {
                    name: "script".to_owned(),
                    attrs: Vec::new(),
                    self_closing: false,
                },
                Token::Text("if (a < b) { x = '</div>'; }".to_owned()),
                Token::End {
                    name: "script".to_owned()
                },
                Token::Text("after".to_owned()),
            ]
        );
    }

    #[test]
    fn skips_comments_and_doctype() {
        let tokens = tokenize("<!DOCTYPE html><!-- hidden -->a < b");
        assert_eq!(tokens, vec![Token::Text("a < b".to_owned())]);
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("&lt;p&gt; &#65;&#x42; &bogus; &"), "<p> AB &bogus; &");
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
    }
}
