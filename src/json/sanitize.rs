//! Textual repairs applied before re-parsing a payload.

use std::iter::Peekable;
use std::str::Chars;

/// Repair common textual defects in agent-produced JSON.
///
/// - strips a leading byte-order mark
/// - removes control characters other than newline and tab
/// - drops trailing commas before `}` or `]`
/// - escapes raw newlines, carriage returns and tabs inside string literals
/// - turns literal `\n`, `\r` and `\t` escapes between tokens into
///   whitespace, as left behind by double-encoded output
///
/// The scan tracks string literals so commas and control characters inside
/// quoted text are handled as text, not structure.
pub fn sanitize_json_text(input: &str) -> String {
    let input = input.trim_start_matches('\u{feff}');
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
                if !c.is_control() {
                    out.push(c);
                } else if c == '\n' {
                    // backslash followed by a real line break
                    out.push('n');
                } else {
                    out.push(' ');
                }
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => {}
                c => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '\\' => match chars.peek() {
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                Some('r') => {
                    chars.next();
                    out.push(' ');
                }
                _ => out.push(c),
            },
            ',' if next_significant_closes(chars.clone()) => {}
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

/// True when the next non-whitespace character closes an object or array.
///
/// Literal `\n`, `\r` and `\t` escapes count as whitespace here.
fn next_significant_closes(mut rest: Peekable<Chars<'_>>) -> bool {
    while let Some(c) = rest.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == '\\' && matches!(rest.peek(), Some('n' | 'r' | 't')) {
            rest.next();
            continue;
        }
        return c == '}' || c == ']';
    }
    false
}
