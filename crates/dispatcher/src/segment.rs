//! Transport-size-limited text segmentation.

/// Split `text` into segments of at most `limit` characters whose
/// concatenation equals the original text.
///
/// Cuts are made at fixed `limit`-character positions and only moved
/// earlier when the cut would land inside a markup tag (`<...>`) or a
/// character entity (`&...;`). A tag or entity longer than the whole
/// segment is cut anyway so progress is guaranteed.
pub fn split_segments(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + limit).min(chars.len());
        if end < chars.len() {
            if let Some(adjusted) = safe_cut(&chars, start, end) {
                end = adjusted;
            }
        }
        segments.push(chars[start..end].iter().collect());
        start = end;
    }

    segments
}

/// Move a cut position before an unterminated tag or entity, if any.
///
/// Returns the adjusted cut position, or `None` when the cut is already
/// safe or cannot be made safe within this segment.
fn safe_cut(chars: &[char], start: usize, end: usize) -> Option<usize> {
    // Entities are short; only look back a handful of characters for '&'.
    const MAX_ENTITY_LEN: usize = 8;

    for pos in (start..end).rev() {
        match chars[pos] {
            '>' | ';' => return None,
            '<' => {
                // Cut would split this tag; cut just before it instead,
                // unless the tag spans the entire segment.
                return if pos > start { Some(pos) } else { None };
            }
            '&' => {
                if end - pos <= MAX_ENTITY_LEN {
                    return if pos > start { Some(pos) } else { None };
                }
                return None;
            }
            _ => {}
        }
    }
    None
}
