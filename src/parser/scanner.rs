//! Tag-boundary scanner.
//!
//! Given the code starting at the second `{` of an opening `{{`, finds the
//! matching close and the `|>` filter separators while skipping over nested
//! braces, strings, template literals, comments, and regex literals. The
//! scanner only locates boundaries; it never interprets the code between
//! them.

/// Lexical region the scanner is currently inside.
///
/// Kept on a LIFO stack; the top of the stack alone decides how the next
/// byte is interpreted. An empty stack means plain tag code, where `{`,
/// quotes, `/`, and `|` are all significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Bracket,
    SingleQuote,
    DoubleQuote,
    TemplateLiteral,
    Regex,
    BlockComment,
    LineComment,
}

/// Boundary event reported to the scan visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    /// A `{` pushed onto an empty stack: the start of the tag body.
    OpenBracket,
    /// The `}` that emptied the stack. Scanning stops here.
    Close,
    /// A `|>` at tag depth; the offset points just past the `>`.
    NewFilter,
    /// Input ended with the tag still open.
    Unclosed,
}

/// Scan tag code, reporting boundary events to `visit`.
///
/// `code` must start at the second `{` of the opening `{{` (the tokenizer
/// passes `&source[open + 1..]`). Offsets are byte offsets into `code`.
/// The visitor may return `false` to halt the scan early; `Close` always
/// ends the scan regardless.
pub fn scan_tag<F>(code: &str, mut visit: F)
where
    F: FnMut(ScanEvent, usize) -> bool,
{
    let bytes = code.as_bytes();
    let mut stack: Vec<ScanState> = Vec::new();
    // Previous byte, for `${`, `*/`, and backslash escapes.
    let mut prev: u8 = 0;
    // Last non-whitespace byte seen in plain code, for regex-vs-division.
    let mut prev_code: u8 = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let top = stack.last().copied();
        let in_plain = matches!(top, None | Some(ScanState::Bracket));

        match b {
            b'{' => {
                let interpolation =
                    top == Some(ScanState::TemplateLiteral) && prev == b'$';
                if interpolation || in_plain {
                    let was_empty = stack.is_empty();
                    stack.push(ScanState::Bracket);
                    if was_empty && !visit(ScanEvent::OpenBracket, i) {
                        return;
                    }
                }
            }
            b'}' => {
                if top == Some(ScanState::Bracket) {
                    stack.pop();
                    if stack.is_empty() {
                        visit(ScanEvent::Close, i);
                        return;
                    }
                }
            }
            b'"' => match top {
                Some(ScanState::DoubleQuote) if prev != b'\\' => {
                    stack.pop();
                }
                None | Some(ScanState::Bracket) => stack.push(ScanState::DoubleQuote),
                _ => {}
            },
            b'\'' => match top {
                Some(ScanState::SingleQuote) if prev != b'\\' => {
                    stack.pop();
                }
                None | Some(ScanState::Bracket) => stack.push(ScanState::SingleQuote),
                _ => {}
            },
            b'`' => match top {
                Some(ScanState::TemplateLiteral) if prev != b'\\' => {
                    stack.pop();
                }
                None | Some(ScanState::Bracket) => stack.push(ScanState::TemplateLiteral),
                _ => {}
            },
            b'/' => match top {
                Some(ScanState::BlockComment) => {
                    if prev == b'*' {
                        stack.pop();
                    }
                }
                Some(ScanState::Regex) => {
                    if prev != b'\\' {
                        stack.pop();
                    }
                }
                None | Some(ScanState::Bracket) => {
                    let next = bytes.get(i + 1).copied();
                    if next == Some(b'*') {
                        stack.push(ScanState::BlockComment);
                    } else if next == Some(b'/') {
                        stack.push(ScanState::LineComment);
                    } else if matches!(prev_code, b'(' | b'=' | b':' | b',') {
                        // Known-incomplete heuristic: a regex literal after a
                        // keyword (`return /x/`) or inside an array literal is
                        // read as division. Kept for compatibility.
                        stack.push(ScanState::Regex);
                    }
                    // Anything else is division; not a region.
                }
                _ => {}
            },
            b'\n' => {
                if top == Some(ScanState::LineComment) {
                    stack.pop();
                }
            }
            b'|' => {
                if in_plain && stack.len() == 1 && bytes.get(i + 1) == Some(&b'>') {
                    if !visit(ScanEvent::NewFilter, i + 2) {
                        return;
                    }
                    prev = b'>';
                    prev_code = b'>';
                    i += 2;
                    continue;
                }
            }
            _ => {}
        }

        prev = b;
        if !b.is_ascii_whitespace()
            && matches!(stack.last().copied(), None | Some(ScanState::Bracket))
        {
            prev_code = b;
        }
        i += 1;
    }

    visit(ScanEvent::Unclosed, bytes.len());
}

/// Collect the breakpoint offsets of tag code: every filter start and the
/// final close. An unclosed tag simply yields no `Close` breakpoint.
pub fn parse_tag(code: &str) -> Vec<usize> {
    let mut breakpoints = Vec::new();
    scan_tag(code, |event, offset| {
        match event {
            ScanEvent::NewFilter | ScanEvent::Close => breakpoints.push(offset),
            ScanEvent::OpenBracket | ScanEvent::Unclosed => {}
        }
        true
    });
    breakpoints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(code: &str) -> Vec<(ScanEvent, usize)> {
        let mut out = Vec::new();
        scan_tag(code, |ev, off| {
            out.push((ev, off));
            true
        });
        out
    }

    #[test]
    fn test_simple_close() {
        assert_eq!(parse_tag("{ b }}"), vec![4]);
        assert_eq!(
            events("{ b }}"),
            vec![(ScanEvent::OpenBracket, 0), (ScanEvent::Close, 4)]
        );
    }

    #[test]
    fn test_filters() {
        // breakpoints sit just past each `|>` plus the close
        assert_eq!(parse_tag("{ x |> f |> g }}"), vec![6, 11, 14]);
    }

    #[test]
    fn test_nested_braces() {
        assert_eq!(parse_tag("{ {a: 1} }}"), vec![9]);
    }

    #[test]
    fn test_filter_only_at_tag_depth() {
        // the `|>` inside the nested brace is not a filter separator
        assert_eq!(parse_tag("{ {a |> b} }}"), vec![11]);
    }

    #[test]
    fn test_brace_inside_string() {
        assert_eq!(parse_tag("{ \"}\" }}"), vec![6]);
        assert_eq!(parse_tag("{ '}' }}"), vec![6]);
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(parse_tag("{ \"a\\\"b\" }}"), vec![9]);
    }

    #[test]
    fn test_template_literal_interpolation() {
        assert_eq!(parse_tag("{ `a${b}c` }}"), vec![11]);
    }

    #[test]
    fn test_brace_inside_template_literal() {
        assert_eq!(parse_tag("{ `a}b` }}"), vec![8]);
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(parse_tag("{ // }}\n }}"), vec![9]);
    }

    #[test]
    fn test_block_comment() {
        assert_eq!(parse_tag("{ /* }} */ }}"), vec![11]);
    }

    #[test]
    fn test_division_is_not_regex() {
        assert_eq!(parse_tag("{ a / b }}"), vec![8]);
    }

    #[test]
    fn test_regex_after_equals() {
        // `}` and `/`-adjacent characters inside the regex are skipped
        assert_eq!(parse_tag("{ x = /a}b/ }}"), vec![12]);
    }

    #[test]
    fn test_regex_after_open_paren() {
        assert_eq!(parse_tag("{ f(/x}y/) }}"), vec![11]);
    }

    #[test]
    fn test_regex_interior_characters() {
        assert_eq!(parse_tag("{ x = /ab+c/ }}"), vec![13]);
    }

    #[test]
    fn test_unclosed() {
        assert_eq!(parse_tag("{ x "), Vec::<usize>::new());
        assert_eq!(
            events("{ x "),
            vec![(ScanEvent::OpenBracket, 0), (ScanEvent::Unclosed, 4)]
        );
    }

    #[test]
    fn test_unclosed_inside_string() {
        assert_eq!(
            events("{ \"x }}"),
            vec![(ScanEvent::OpenBracket, 0), (ScanEvent::Unclosed, 7)]
        );
    }

    #[test]
    fn test_visitor_halts_scan() {
        let mut seen = Vec::new();
        scan_tag("{ x |> f }}", |ev, off| {
            seen.push((ev, off));
            false
        });
        assert_eq!(seen, vec![(ScanEvent::OpenBracket, 0)]);
    }
}
