//! Position conversion utilities.
//!
//! Tokens and errors carry byte offsets; error rendering wants line/column.
//! Columns are counted in characters, not bytes, so caret underlines line up
//! in a terminal.

/// Convert a byte offset to a 0-indexed (line, column) pair.
///
/// Offsets past the end of the source are clamped to the last position.
pub fn line_col(source: &str, byte_offset: usize) -> (usize, usize) {
    let byte_offset = byte_offset.min(source.len());
    let before = &source[..byte_offset];
    let line = before.bytes().filter(|&b| b == b'\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = before[line_start..].chars().count();
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let source = "hello world";
        assert_eq!(line_col(source, 0), (0, 0));
        assert_eq!(line_col(source, 5), (0, 5));
    }

    #[test]
    fn test_later_lines() {
        let source = "ab\ncd\nef";
        assert_eq!(line_col(source, 3), (1, 0));
        assert_eq!(line_col(source, 5), (1, 2));
        assert_eq!(line_col(source, 7), (2, 1));
    }

    #[test]
    fn test_multibyte() {
        let source = "café x";
        // é is 2 bytes but 1 column
        assert_eq!(line_col(source, 6), (0, 5));
    }

    #[test]
    fn test_out_of_bounds() {
        let source = "hello";
        assert_eq!(line_col(source, 100), (0, 5)); // clamped to length
    }
}
