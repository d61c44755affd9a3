//! Tolerant HTML tag scanner.
//!
//! Uses memchr for delimiter search. Only start tags are inspected; everything
//! else (text, end tags, doctype) is skipped. Raw-text elements are honored so
//! that markup inside a script or style body is never mistaken for tags.

use memchr::memchr;
use memchr::memmem;

use super::attributes::parse_attributes;
use super::{DocumentParser, MarkupDocument, MarkupNode};
use crate::constants::{IMPORT_LINK_REL, TEMPLATE_TAG};
use crate::core::SyntaxError;

/// The default [`DocumentParser`].
///
/// Fails only on structural problems that make the rest of the document
/// ambiguous: an unterminated comment, start tag, or `<script>` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlScanner;

impl HtmlScanner {
    /// Create a scanner.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for HtmlScanner {
    fn parse(&self, text: &str) -> Result<MarkupDocument, SyntaxError> {
        Scan::new(text).run()
    }
}

/// Incremental byte-offset to line-number mapping.
struct LineCounter<'a> {
    input: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
        }
    }

    /// Line of `offset`; offsets must be requested in increasing order.
    fn line_at(&mut self, offset: usize) -> usize {
        if offset > self.offset {
            self.line += memchr::memchr_iter(b'\n', &self.input[self.offset..offset]).count();
            self.offset = offset;
        }
        self.line
    }
}

struct Scan<'a> {
    text: &'a str,
    bytes: &'a [u8],
    lower: Vec<u8>,
    lines: LineCounter<'a>,
    document: MarkupDocument,
}

impl<'a> Scan<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            lower: text.as_bytes().to_ascii_lowercase(),
            lines: LineCounter::new(text.as_bytes()),
            document: MarkupDocument::default(),
        }
    }

    fn run(mut self) -> Result<MarkupDocument, SyntaxError> {
        let bytes = self.bytes;
        let mut pos = 0;

        while let Some(offset) = memchr(b'<', &bytes[pos..]) {
            let start = pos + offset;
            let rest = &bytes[start..];

            pos = if rest.starts_with(b"<!--") {
                let end = memmem::find(&bytes[start + 4..], b"-->")
                    .ok_or_else(|| self.error(start, "unterminated comment"))?;
                start + 4 + end + 3
            } else if rest.starts_with(b"<!") || rest.starts_with(b"<?") || rest.starts_with(b"</") {
                let end = memchr(b'>', rest).ok_or_else(|| self.error(start, "unterminated tag"))?;
                start + end + 1
            } else if rest.get(1).is_some_and(u8::is_ascii_alphabetic) {
                self.start_tag(start)?
            } else {
                // A bare '<' in text content.
                start + 1
            };
        }

        Ok(self.document)
    }

    /// Handle the start tag at `start`; returns the offset to resume from.
    fn start_tag(&mut self, start: usize) -> Result<usize, SyntaxError> {
        let (text, bytes) = (self.text, self.bytes);
        let name_start = start + 1;
        let mut name_end = name_start;
        while name_end < bytes.len() && is_tag_name_byte(bytes[name_end]) {
            name_end += 1;
        }
        let tag = text[name_start..name_end].to_ascii_lowercase();

        let tag_end = self
            .find_tag_end(name_end)
            .ok_or_else(|| self.error(start, format!("unterminated <{tag}> tag")))?;
        let line = self.lines.line_at(start);
        let attributes = parse_attributes(&text[name_end..tag_end]);
        let after = tag_end + 1;

        let mut node = MarkupNode {
            tag: tag.clone(),
            attributes,
            text: None,
            line,
        };

        match tag.as_str() {
            "script" => {
                let close = memmem::find(&self.lower[after..], b"</script")
                    .ok_or_else(|| self.error(start, "unterminated <script> element"))?;
                let body = &text[after..after + close];
                let close_end = memchr(b'>', &bytes[after + close..])
                    .map_or(bytes.len(), |end| after + close + end + 1);

                if !body.trim().is_empty() {
                    node.text = Some(body.to_string());
                }
                self.document.scripts.push(node);
                Ok(close_end)
            }
            "style" | "textarea" | "title" => {
                let closing = format!("</{tag}");
                Ok(memmem::find(&self.lower[after..], closing.as_bytes())
                    .map_or(bytes.len(), |close| after + close))
            }
            "link" => {
                let is_import = node
                    .attr("rel")
                    .is_some_and(|rel| rel.split_ascii_whitespace().any(|r| r.eq_ignore_ascii_case(IMPORT_LINK_REL)));
                if is_import {
                    self.document.imports.push(node);
                }
                Ok(after)
            }
            TEMPLATE_TAG => {
                self.document.templates.push(node);
                Ok(after)
            }
            _ => Ok(after),
        }
    }

    /// Offset of the `>` closing the tag whose attributes begin at `from`,
    /// skipping over quoted attribute values.
    ///
    /// A quote opens a value only right after `=` and optional whitespace;
    /// elsewhere it is an ordinary byte of a bare value.
    fn find_tag_end(&self, from: usize) -> Option<usize> {
        let mut quote: Option<u8> = None;
        let mut after_eq = false;
        for (i, &b) in self.bytes[from..].iter().enumerate() {
            if let Some(q) = quote {
                if b == q {
                    quote = None;
                }
                continue;
            }
            match b {
                b'>' => return Some(from + i),
                b'=' => after_eq = true,
                b'"' | b'\'' if after_eq => {
                    quote = Some(b);
                    after_eq = false;
                }
                _ if b.is_ascii_whitespace() => {}
                _ => after_eq = false,
            }
        }
        None
    }

    fn error(&self, offset: usize, reason: impl Into<String>) -> SyntaxError {
        let line = 1 + memchr::memchr_iter(b'\n', &self.bytes[..offset]).count();
        SyntaxError::new(line, reason)
    }
}

#[inline]
fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}
