//! Inline `style` attribute editing.

pub(crate) fn get(style: &str, property: &str) -> Option<String> {
    declarations(style)
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
        .map(|(_, value)| value)
}

/// Returns the updated attribute text. Property order is preserved; a new
/// property is appended and an empty value drops the declaration.
pub(crate) fn set(style: &str, property: &str, value: &str) -> String {
    let value = value.trim();
    let mut entries = declarations(style);
    match entries
        .iter_mut()
        .position(|(name, _)| name.eq_ignore_ascii_case(property))
    {
        Some(index) if value.is_empty() => {
            entries.remove(index);
        }
        Some(index) => entries[index].1 = value.to_owned(),
        None if value.is_empty() => {}
        None => entries.push((property.to_ascii_lowercase(), value.to_owned())),
    }

    entries
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn declarations(style: &str) -> Vec<(String, String)> {
    split_top_level(style)
        .into_iter()
        .filter_map(|entry| {
            let (name, value) = entry.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            (!name.is_empty()).then(|| (name.to_ascii_lowercase(), value.to_owned()))
        })
        .collect()
}

/// Splits on `;` outside parentheses and quotes, so values such as
/// `url(data:image/png;base64,...)` stay whole.
fn split_top_level(style: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (idx, ch) in style.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (_, '\\') => escaped = true,
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                entries.push(&style[start..idx]);
                start = idx + 1;
            }
            (None, _) => {}
        }
    }
    entries.push(&style[start..]);
    entries
}
