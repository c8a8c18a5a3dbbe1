//! Helper functions for scanning declaration text.
//!
//! The scanner never builds a syntax tree. It only tracks delimiter depth
//! and string literals, which is enough to find where a parameter list,
//! an interface body or a type expression ends.

/// Replace comments with spaces.
///
/// Byte offsets and newlines are preserved so line numbers computed on the
/// masked text are valid for the original. String, template and regex
/// literals are copied verbatim, so quotes or slashes inside a regex do not
/// open a string or a comment.
pub fn mask_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\'' | b'`' => {
                let end = skip_string(bytes, i);
                out.extend_from_slice(&bytes[i..end]);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out.push(b' ');
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.extend_from_slice(b"  ");
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        out.extend_from_slice(b"  ");
                        i += 2;
                        break;
                    }
                    out.push(if bytes[i] == b'\n' { b'\n' } else { b' ' });
                    i += 1;
                }
            }
            b'/' if regex_allowed(&out) => {
                let end = skip_regex(bytes, i);
                out.extend_from_slice(&bytes[i..end]);
                i = end;
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }

    // Only whole comments are replaced, and always by ASCII, so this holds.
    String::from_utf8(out).unwrap_or_else(|_| source.to_string())
}

/// Return the index just past the string literal starting at `start`.
///
/// Single and double quoted strings also end at a newline, so an
/// unterminated literal cannot swallow the rest of the file.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if quote != b'`' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Whether a `/` following `before` starts a regex literal rather than a
/// division. Only tokens after which an operand is expected qualify.
fn regex_allowed(before: &[u8]) -> bool {
    const KEYWORDS: &[&[u8]] = &[b"return", b"typeof", b"case", b"yield", b"await"];

    let end = before
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let before = &before[..end];
    let Some(&last) = before.last() else {
        return true;
    };
    match last {
        b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b';' | b'%'
        | b'~' | b'^' => true,
        b'>' => before.ends_with(b"=>"),
        _ => KEYWORDS.iter().any(|kw| {
            before.ends_with(kw)
                && !before[..before.len() - kw.len()]
                    .last()
                    .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
        }),
    }
}

/// Return the index just past the regex literal starting at `start`.
///
/// A `/` inside a character class does not close the literal. A newline
/// ends it, as for quoted strings. Flags are left to the caller.
fn skip_regex(bytes: &[u8], start: usize) -> usize {
    let mut in_class = false;
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Maps byte offsets to 1-based line numbers.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// Get line number (1-indexed) for a byte offset.
    pub fn line_of(&self, offset: usize) -> u32 {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }
}

/// Iterates the bytes of `text` that lie outside string literals, together
/// with the delimiter depth in effect before each byte.
///
/// `(`, `[`, `{` and `<` open a level; their counterparts close one. The
/// `>` of an arrow (`=>`) is not a closer. Depth may go negative when the
/// text closes a scope it did not open; callers treat a closer seen at
/// depth 0 as the end of their region.
pub struct TopLevelBytes<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: i32,
}

impl<'a> TopLevelBytes<'a> {
    pub fn new(text: &'a str, start: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: start,
            depth: 0,
        }
    }
}

impl Iterator for TopLevelBytes<'_> {
    type Item = (usize, u8, i32);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.bytes.len() {
            let i = self.pos;
            let b = self.bytes[i];
            if matches!(b, b'"' | b'\'' | b'`') {
                self.pos = skip_string(self.bytes, i);
                continue;
            }

            let depth = self.depth;
            if is_opener(b) {
                self.depth += 1;
            } else if is_closer(self.bytes, i) {
                self.depth -= 1;
            }
            self.pos += 1;
            return Some((i, b, depth));
        }
        None
    }
}

fn is_opener(b: u8) -> bool {
    matches!(b, b'(' | b'[' | b'{' | b'<')
}

/// True if the byte at `i` closes a delimiter. `=>` is an arrow.
pub fn is_closer(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b')' | b']' | b'}' => true,
        b'>' => i == 0 || bytes[i - 1] != b'=',
        _ => false,
    }
}

fn closer_for(open: u8) -> Option<u8> {
    match open {
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        b'<' => Some(b'>'),
        _ => None,
    }
}

/// Find the index of the delimiter closing the one at `open`.
///
/// Returns `None` when the text ends first or a different closer shows up
/// at the same level.
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let expected = closer_for(*text.as_bytes().get(open)?)?;
    let bytes = text.as_bytes();
    TopLevelBytes::new(text, open + 1)
        .find(|&(i, _, depth)| depth == 0 && is_closer(bytes, i))
        .and_then(|(i, b, _)| (b == expected).then_some(i))
}

/// Split `text` at any of `separators` found at depth 0.
///
/// Each piece is returned with its byte offset in `text`. Pieces are not
/// trimmed and may be empty.
pub fn split_top_level<'a>(text: &'a str, separators: &[u8]) -> Vec<(usize, &'a str)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, b, depth) in TopLevelBytes::new(text, 0) {
        if depth == 0 && separators.contains(&b) {
            pieces.push((start, &text[start..i]));
            start = i + 1;
        }
    }
    pieces.push((start, &text[start..]));
    pieces
}

/// Skip ASCII whitespace starting at `pos`.
pub fn skip_ws(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = pos;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Decide whether a type expression interrupted by a newline carries on
/// into the next line.
///
/// `before` is the expression so far, `after` the text following the
/// newline.
pub fn continues_expression(before: &str, after: &str) -> bool {
    let before = before.trim_end();
    if before.is_empty() {
        return true;
    }
    const TRAILING: &[&str] = &["|", "&", ":", "=>", ",", "=", "?", "extends", "keyof", "typeof"];
    if TRAILING.iter().any(|t| before.ends_with(t)) {
        return true;
    }
    let after = after.trim_start();
    after.starts_with(['|', '&', '?', ':', '.', '='])
        || after.starts_with("extends ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_comments_preserves_offsets() {
        let src = "a // export function x()\n/* b\nc */ d";
        let masked = mask_comments(src);
        assert_eq!(masked.len(), src.len());
        assert!(!masked.contains("export"));
        assert_eq!(masked.matches('\n').count(), 2);
        assert!(masked.ends_with(" d"));
    }

    #[test]
    fn test_mask_comments_keeps_strings() {
        let src = r#"const url = "http://example.com"; // gone"#;
        let masked = mask_comments(src);
        assert!(masked.contains("http://example.com"));
        assert!(!masked.contains("gone"));
    }

    #[test]
    fn test_mask_comments_skips_regex_literals() {
        let src = "const tick = /`/g;\nconst url = /https?:\\/\\/[^/]+/;\nexport function after(): void {}\n";
        let masked = mask_comments(src);
        assert_eq!(masked.len(), src.len());
        assert!(masked.contains("export function after(): void {}"));
        assert!(masked.contains("/https?:\\/\\/[^/]+/"));
    }

    #[test]
    fn test_mask_comments_division_is_not_regex() {
        let src = "const half = total / 2; // gone\nconst r = (a) / b / c; /* gone too */ x";
        let masked = mask_comments(src);
        assert!(!masked.contains("gone"));
        assert!(masked.contains("total / 2;"));
        assert!(masked.ends_with(" x"));
    }

    #[test]
    fn test_regex_allowed_after_operand_positions() {
        assert!(regex_allowed(b""));
        assert!(regex_allowed(b"x = "));
        assert!(regex_allowed(b"items.filter(x => "));
        assert!(regex_allowed(b"  return "));
        assert!(!regex_allowed(b"total "));
        assert!(!regex_allowed(b"(a) "));
        assert!(!regex_allowed(b"noreturn "));
    }

    #[test]
    fn test_mask_comments_unicode() {
        let src = "// héllo wörld\nx";
        let masked = mask_comments(src);
        assert_eq!(masked.len(), src.len());
        assert!(masked.ends_with("\nx"));
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("one\ntwo\nthree");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 1);
        assert_eq!(index.line_of(4), 2);
        assert_eq!(index.line_of(9), 3);
    }

    #[test]
    fn test_matching_close_nested() {
        let text = "(a: Map<string, (x) => void>, b = \")\") rest";
        let close = matching_close(text, 0).unwrap();
        assert_eq!(&text[close + 1..], " rest");
    }

    #[test]
    fn test_matching_close_unbalanced() {
        assert_eq!(matching_close("(a: string", 0), None);
        assert_eq!(matching_close("(a: string]", 0), None);
        assert_eq!(matching_close("x", 0), None);
    }

    #[test]
    fn test_split_top_level() {
        let pieces: Vec<&str> = split_top_level("a: Map<K, V>, b: [x, y], c", b",")
            .into_iter()
            .map(|(_, s)| s.trim())
            .collect();
        assert_eq!(pieces, vec!["a: Map<K, V>", "b: [x, y]", "c"]);
    }

    #[test]
    fn test_continues_expression() {
        assert!(continues_expression("type A =", "  | 'x'"));
        assert!(continues_expression("'a' |", "'b'"));
        assert!(continues_expression("string", "  | null"));
        assert!(!continues_expression("string", "export const x = 1"));
    }
}
