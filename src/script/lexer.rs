//! Lightweight script lexer.
//!
//! Not a JavaScript parser: it only understands enough of the token structure
//! (comments, string/template/regex literals, brackets) to blank out comments
//! and to reject bodies whose delimiters do not balance.

use crate::core::SyntaxError;

/// Return `text` with every comment replaced by spaces, keeping byte offsets
/// and line breaks intact.
///
/// Fails on unterminated strings, template literals or block comments, and on
/// unbalanced `()`, `[]` or `{}`.
pub(super) fn mask_comments(text: &str) -> Result<String, SyntaxError> {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut stack: Vec<(u8, usize)> = Vec::new();
    let mut line = 1;
    let mut last_significant: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\n' => {
                line += 1;
                i += 1;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start_line = line;
                out[i] = b' ';
                out[i + 1] = b' ';
                i += 2;
                loop {
                    match bytes.get(i) {
                        None => return Err(SyntaxError::new(start_line, "unterminated block comment")),
                        Some(b'*') if bytes.get(i + 1) == Some(&b'/') => {
                            out[i] = b' ';
                            out[i + 1] = b' ';
                            i += 2;
                            break;
                        }
                        Some(b'\n') => {
                            line += 1;
                            i += 1;
                        }
                        Some(_) => {
                            out[i] = b' ';
                            i += 1;
                        }
                    }
                }
                continue;
            }
            b'/' if regex_may_start(last_significant) => {
                if let Some(end) = regex_literal_end(bytes, i) {
                    i = end;
                    last_significant = Some(b'/');
                    continue;
                }
            }
            b'\'' | b'"' => {
                let start_line = line;
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => {
                            return Err(SyntaxError::new(start_line, "unterminated string literal"));
                        }
                        Some(b'\\') => i += 2,
                        Some(&c) if c == b => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                last_significant = Some(b);
                continue;
            }
            b'`' => {
                let start_line = line;
                i += 1;
                loop {
                    match bytes.get(i) {
                        None => return Err(SyntaxError::new(start_line, "unterminated template literal")),
                        Some(b'\\') => i += 2,
                        Some(b'`') => {
                            i += 1;
                            break;
                        }
                        Some(b'\n') => {
                            line += 1;
                            i += 1;
                        }
                        Some(_) => i += 1,
                    }
                }
                last_significant = Some(b);
                continue;
            }
            b'(' | b'[' | b'{' => stack.push((b, line)),
            b')' | b']' | b'}' => {
                let expected = match b {
                    b')' => b'(',
                    b']' => b'[',
                    _ => b'{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, open_line)) => {
                        return Err(SyntaxError::new(
                            line,
                            format!(
                                "unexpected '{}' (expected closer for '{}' opened on line {open_line})",
                                b as char, open as char
                            ),
                        ));
                    }
                    None => return Err(SyntaxError::new(line, format!("unexpected '{}'", b as char))),
                }
            }
            _ => {}
        }

        if !b.is_ascii_whitespace() {
            last_significant = Some(b);
        }
        i += 1;
    }

    if let Some((open, open_line)) = stack.pop() {
        return Err(SyntaxError::new(open_line, format!("unclosed '{}'", open as char)));
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Whether a `/` after `previous` starts a regex literal rather than a division.
fn regex_may_start(previous: Option<u8>) -> bool {
    match previous {
        None => true,
        Some(b) => matches!(b, b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b'}' | b';'),
    }
}

/// End offset (exclusive) of the regex literal starting at `start`, or `None`
/// if no closing `/` appears before the end of the line.
fn regex_literal_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let mut in_class = false;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'\n' => return None,
            b'\\' => i += 1,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => {
                i += 1;
                while bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
                    i += 1;
                }
                return Some(i);
            }
            _ => {}
        }
        i += 1;
    }
    None
}
