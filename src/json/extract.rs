//! Locating JSON regions embedded in prose or markdown.

const FENCE: &str = "```";

/// Content of the first fenced code block, with an optional `json` tag removed.
///
/// Returns `None` when there is no closed fence or the block is empty.
pub fn extract_fenced_block(text: &str) -> Option<&str> {
    let open = text.find(FENCE)?;
    let mut body = &text[open + FENCE.len()..];
    if body.len() >= 4 && body.is_char_boundary(4) && body[..4].eq_ignore_ascii_case("json") {
        body = &body[4..];
    }
    let close = body.find(FENCE)?;
    let content = body[..close].trim();
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

/// First balanced `open ... close` span in `text`.
///
/// The scan starts at the first `open` character and tracks depth until the
/// matching `close` brings it back to zero. Delimiters inside string literals
/// of the span are not counted. Returns `None` if that span never closes.
pub fn extract_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                let end = start + offset + c.len_utf8();
                return Some(&text[start..end]);
            }
        }
    }

    tracing::trace!(open = %open, "no balanced span found");
    None
}

/// Best JSON-looking region: a fenced block, else an object span, else an array span.
pub fn extract_json_region(text: &str) -> Option<&str> {
    extract_fenced_block(text)
        .or_else(|| extract_balanced(text, '{', '}'))
        .or_else(|| extract_balanced(text, '[', ']'))
}
