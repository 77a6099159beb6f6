use serde::Serialize;

use crate::error::{ErrorKind, TemplateError};
use crate::parser::scanner::{scan_tag, ScanEvent};

/// Kind of token, serialized with the wire names the compiler consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Literal output text between tags.
    #[serde(rename = "string")]
    Text,
    Comment,
    Tag,
    Filter,
}

/// One token of a template, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of `text` in the source.
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, text: &str, offset: usize) -> Self {
        Self {
            kind,
            text: text.to_string(),
            offset,
        }
    }
}

/// Result of tokenizing one template.
///
/// `tokenize` never fails outright: on error the tokens emitted so far are
/// returned alongside the error, and `position` holds the byte offset of
/// the failing construct's opening `{{`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TemplateError>,
}

/// Split a template into text, comment, tag, and filter tokens.
///
/// Three modes drive the loop: text (scan to the next `{{`), comment
/// (`{{# ... #}}`), and tag (delegated to the boundary scanner). An
/// unterminated comment runs to end-of-input without error; unterminated
/// tags and echo blocks are fatal to the template.
pub fn tokenize(source: &str) -> TokenizeResult {
    let mut tokens: Vec<Token> = Vec::new();
    let mut position = 0usize;

    loop {
        let rest = &source[position..];
        let Some(rel) = rest.find("{{") else {
            // No more tags: the remainder is one final text token, even empty.
            tokens.push(Token::new(TokenKind::Text, rest, position));
            return TokenizeResult {
                tokens,
                position: source.len(),
                error: None,
            };
        };

        let open = position + rel;
        tokens.push(Token::new(TokenKind::Text, &source[position..open], position));

        if source[open + 2..].starts_with('#') {
            position = tokenize_comment(source, open, &mut tokens);
            continue;
        }

        match tokenize_tag(source, open, &mut tokens) {
            Ok(next) => position = next,
            Err(error) => {
                return TokenizeResult {
                    tokens,
                    position: open,
                    error: Some(error),
                };
            }
        }
    }
}

/// Consume a `{{# ... #}}` comment starting at `open`; returns the position
/// after it. A missing `#}}` closes the comment at end-of-input without an
/// error, asymmetric with how unclosed tags are handled.
fn tokenize_comment(source: &str, open: usize, tokens: &mut Vec<Token>) -> usize {
    let content_start = open + 3;
    match source[content_start..].find("#}}") {
        Some(rel) => {
            let content_end = content_start + rel;
            tokens.push(Token::new(
                TokenKind::Comment,
                &source[content_start..content_end],
                content_start,
            ));
            content_end + 3
        }
        None => {
            tokens.push(Token::new(
                TokenKind::Comment,
                &source[content_start..],
                content_start,
            ));
            source.len()
        }
    }
}

/// Consume a `{{ ... }}` tag starting at `open`, emitting the tag token and
/// its filter tokens; returns the position after the closing `}}`.
fn tokenize_tag(
    source: &str,
    open: usize,
    tokens: &mut Vec<Token>,
) -> Result<usize, TemplateError> {
    // The scanner sees everything from the second `{` of the opening `{{`.
    let body = &source[open + 1..];
    let mut filters: Vec<usize> = Vec::new();
    let mut close: Option<usize> = None;
    scan_tag(body, |event, offset| {
        match event {
            ScanEvent::NewFilter => filters.push(offset),
            ScanEvent::Close => close = Some(offset),
            ScanEvent::OpenBracket | ScanEvent::Unclosed => {}
        }
        true
    });

    let Some(close) = close else {
        return Err(TemplateError::new(ErrorKind::UnclosedTag, open));
    };

    // The span from just after the opening brace to the first breakpoint is
    // the tag; each following span is one filter. A span that ends at a
    // filter breakpoint ends before that filter's `|>`.
    let tag_index = tokens.len();
    let mut starts = Vec::with_capacity(filters.len() + 1);
    starts.push(1usize);
    starts.extend(filters.iter().copied());
    for (i, &start) in starts.iter().enumerate() {
        let end = match starts.get(i + 1) {
            Some(&next_start) => next_start - 2,
            None => close,
        };
        let kind = if i == 0 { TokenKind::Tag } else { TokenKind::Filter };
        tokens.push(Token::new(kind, &body[start..end], open + 1 + start));
    }

    // The close event fires on the `}` that empties the stack; the template
    // closer is `}}`, so consume one byte past it (clamped for a tag closed
    // by a lone `}` at end-of-input).
    let after_tag = (open + 1 + close + 2).min(source.len());
    let tag_code = &tokens[tag_index].text;
    let normalized = tag_code.trim().trim_matches('-').trim();
    if normalized == "echo" {
        return tokenize_echo(source, open, after_tag, tag_index, tokens);
    }

    Ok(after_tag)
}

/// Handle the raw-capture form: the body between `{{ echo }}` and the next
/// `{{ /echo }}` is captured verbatim, never tokenized, and substituted
/// JSON-stringified as the sole argument of an `echo(...)` call in the tag
/// token.
fn tokenize_echo(
    source: &str,
    open: usize,
    body_start: usize,
    tag_index: usize,
    tokens: &mut Vec<Token>,
) -> Result<usize, TemplateError> {
    let Some((close_start, close_end)) = find_echo_close(&source[body_start..]) else {
        return Err(TemplateError::new(ErrorKind::UnclosedEchoTag, open));
    };

    let captured = &source[body_start..body_start + close_start];
    let literal = serde_json::Value::String(captured.to_string()).to_string();

    let text = &tokens[tag_index].text;
    // The tag code is known to contain `echo` (that is how we got here).
    if let Some(at) = text.find("echo") {
        let mut rewritten = String::with_capacity(text.len() + literal.len() + 2);
        rewritten.push_str(&text[..at]);
        rewritten.push_str("echo(");
        rewritten.push_str(&literal);
        rewritten.push(')');
        rewritten.push_str(&text[at + 4..]);
        tokens[tag_index].text = rewritten;
    }

    Ok(body_start + close_end)
}

/// Find a dash/whitespace-tolerant `{{ /echo }}` closer; returns the byte
/// range (start of `{{`, end past `}}`) of the first match.
fn find_echo_close(source: &str) -> Option<(usize, usize)> {
    let bytes = source.as_bytes();
    let mut from = 0;
    while let Some(rel) = source[from..].find("{{") {
        let start = from + rel;
        let mut i = start + 2;
        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
        while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
            i += 1;
        }
        if source[i..].starts_with("/echo") {
            let mut j = i + 5;
            while bytes.get(j).is_some_and(|b| b.is_ascii_whitespace()) {
                j += 1;
            }
            if bytes.get(j) == Some(&b'-') {
                j += 1;
            }
            if source[j..].starts_with("}}") {
                return Some((start, j + 2));
            }
        }
        from = start + 2;
    }
    None
}
