pub mod error;
pub mod parser;
pub mod transform;

pub use error::{ErrorKind, TemplateError, TransformError};
pub use parser::{parse_tag, scan_tag, tokenize, ScanEvent, Token, TokenKind, TokenizeResult};
pub use transform::{transform_template_code, transform_template_code_with, GlobalsPolicy};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_then_transform_tag_code() {
        let result = tokenize("<p>{{ user.label }}</p>");
        assert!(result.error.is_none());
        let tag = result
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::Tag)
            .expect("tag token");
        let code = transform_template_code(&tag.text, "state").expect("transform");
        assert_eq!(code, " state.user.label ");
    }

    #[test]
    fn test_filters_transform_independently() {
        let result = tokenize("{{ title |> truncate(limit) }}");
        let filter = result
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::Filter)
            .expect("filter token");
        let code = transform_template_code(&filter.text, "state").expect("transform");
        assert_eq!(code, " state.truncate(state.limit) ");
    }

    #[test]
    fn test_transformed_echo_argument_stays_literal() {
        let result = tokenize("{{ echo }}<i>{{ x }}</i>{{ /echo }}");
        let tag = &result.tokens[1];
        let code = transform_template_code(&tag.text, "state").expect("transform");
        // The captured body is a string literal; only the call is rewritten.
        assert_eq!(code, " state.echo(\"<i>{{ x }}</i>\") ");
    }

    #[test]
    fn test_tokenize_error_does_not_poison_next_call() {
        let bad = tokenize("{{ broken ");
        assert!(bad.error.is_some());
        let good = tokenize("fine {{ x }}");
        assert!(good.error.is_none());
        assert_eq!(good.tokens[1].text, " x ");
    }
}
