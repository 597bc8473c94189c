//! Column helpers for UTF-8 rows.
//!
//! Every column in the editor counts chars, not bytes. These helpers do the
//! conversions so the rest of the engine can splice rows by column.

/// Number of columns (chars) in a row.
pub fn width(line: &str) -> usize {
    line.chars().count()
}

/// Byte offset of column `col`, clamped to the end of the row.
pub fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map_or(line.len(), |(i, _)| i)
}

/// Column of byte offset `byte` (which must sit on a char boundary).
pub fn column_of_byte(line: &str, byte: usize) -> usize {
    line[..byte.min(line.len())].chars().count()
}

/// Text between two columns. Out of range columns are clamped.
pub fn slice(line: &str, from: usize, to: usize) -> &str {
    let start = byte_index(line, from);
    let end = byte_index(line, to.max(from));
    &line[start..end]
}

/// Text before column `col`.
pub fn head(line: &str, col: usize) -> &str {
    &line[..byte_index(line, col)]
}

/// Text from column `col` onward.
pub fn tail(line: &str, col: usize) -> &str {
    &line[byte_index(line, col)..]
}

/// Insert `text` into `line` at column `col`.
pub fn insert_at(line: &mut String, col: usize, text: &str) {
    let at = byte_index(line, col);
    line.insert_str(at, text);
}

/// Remove `count` columns starting at `col`.
pub fn remove_at(line: &mut String, col: usize, count: usize) {
    let start = byte_index(line, col);
    let end = byte_index(line, col + count);
    line.replace_range(start..end, "");
}

/// Char at column `col`, if any.
pub fn char_at(line: &str, col: usize) -> Option<char> {
    line.chars().nth(col)
}

/// Word characters: alphanumerics and underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Column span `[start, end)` of the word or non-word run holding column `col`.
///
/// Returns `None` when `col` is at or past the end of the row.
pub fn run_at(line: &str, col: usize) -> Option<(usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    let kind = is_word_char(*chars.get(col)?);
    let mut start = col;
    while start > 0 && is_word_char(chars[start - 1]) == kind {
        start -= 1;
    }
    let mut end = col + 1;
    while end < chars.len() && is_word_char(chars[end]) == kind {
        end += 1;
    }
    Some((start, end))
}

/// Leading whitespace of a row.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(line.len(), |(i, _)| i);
    &line[..end]
}

/// Split raw document data into rows.
///
/// Accepts `\n`, `\r\n` and lone `\r` line endings. Always yields at least
/// one row.
pub fn data_to_lines(data: &str) -> Vec<String> {
    let normalized = data.replace("\r\n", "\n").replace('\r', "\n");
    normalized.split('\n').map(ToOwned::to_owned).collect()
}

/// Join rows back into document data.
pub fn lines_to_data(lines: &[String]) -> String {
    lines.join("\n")
}

/// Columns where a word or non-word run starts or ends, ascending.
pub fn word_boundaries(line: &str) -> Vec<usize> {
    let mut bounds = vec![0];
    let mut previous: Option<bool> = None;
    let mut width = 0;
    for (col, c) in line.chars().enumerate() {
        let kind = is_word_char(c);
        if previous.is_some_and(|p| p != kind) {
            bounds.push(col);
        }
        previous = Some(kind);
        width = col + 1;
    }
    if width > 0 {
        bounds.push(width);
    }
    bounds
}

/// Columns where a camelCase or snake_case piece starts or ends, ascending.
///
/// Forward motion keeps a `_`/`-` separator with the piece after it;
/// backward motion keeps it with the piece before it, so both directions
/// stop just past the separator they cross.
pub fn subword_boundaries(line: &str, forward: bool) -> Vec<usize> {
    let chars: Vec<char> = line.chars().collect();
    let mut bounds = vec![0, chars.len()];
    let mut i = 0;
    while i < chars.len() {
        let piece = if forward {
            subword_forward(&chars, i)
        } else {
            subword_backward(&chars, i)
        };
        match piece {
            Some(end) => {
                bounds.push(i);
                bounds.push(end);
                i = end;
            }
            None => i += 1,
        }
    }
    bounds.sort_unstable();
    bounds.dedup();
    bounds
}

const fn is_separator(c: char) -> bool {
    c == '_' || c == '-'
}

/// End of an upper-case run starting at `from` that is not directly
/// followed by a lower-case letter, backing off one capital at a time.
fn capitals_end(chars: &[char], from: usize) -> Option<usize> {
    let mut end = from;
    while end < chars.len() && chars[end].is_ascii_uppercase() {
        end += 1;
    }
    while end > from && chars.get(end).is_some_and(char::is_ascii_lowercase) {
        end -= 1;
    }
    (end > from).then_some(end)
}

/// `Word` (capital plus lower case or `-`), `WORD`, `word` or a non-word run.
fn subword_body(chars: &[char], at: usize) -> Option<usize> {
    let c = *chars.get(at)?;
    if c.is_ascii_uppercase() {
        let mut end = at + 1;
        while end < chars.len() && (chars[end].is_ascii_lowercase() || chars[end] == '-') {
            end += 1;
        }
        if end > at + 1 {
            return Some(end);
        }
        return capitals_end(chars, at);
    }
    if c.is_ascii_lowercase() {
        let mut end = at + 1;
        while end < chars.len() && chars[end].is_ascii_lowercase() {
            end += 1;
        }
        return Some(end);
    }
    None
}

fn non_word_run(chars: &[char], at: usize) -> Option<usize> {
    if is_word_char(chars[at]) {
        return None;
    }
    let mut end = at + 1;
    while end < chars.len() && !is_word_char(chars[end]) {
        end += 1;
    }
    Some(end)
}

fn subword_forward(chars: &[char], at: usize) -> Option<usize> {
    if is_separator(chars[at]) {
        if let Some(end) = subword_body(chars, at + 1) {
            return Some(end);
        }
    }
    subword_body(chars, at).or_else(|| non_word_run(chars, at))
}

fn subword_backward(chars: &[char], at: usize) -> Option<usize> {
    match subword_body(chars, at) {
        Some(end) if chars.get(end).copied().is_some_and(is_separator) => Some(end + 1),
        Some(end) => Some(end),
        None => non_word_run(chars, at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_index_multibyte() {
        assert_eq!(byte_index("café!", 3), 3);
        assert_eq!(byte_index("café!", 4), 5);
        assert_eq!(byte_index("café!", 99), 6);
    }

    #[test]
    fn test_slice_clamps() {
        assert_eq!(slice("hello", 1, 3), "el");
        assert_eq!(slice("hello", 3, 99), "lo");
        assert_eq!(slice("hello", 7, 9), "");
        assert_eq!(slice("hello", 3, 1), "");
    }

    #[test]
    fn test_insert_and_remove() {
        let mut line = String::from("héllo");
        insert_at(&mut line, 2, "XY");
        assert_eq!(line, "héXYllo");
        remove_at(&mut line, 1, 3);
        assert_eq!(line, "hllo");
    }

    #[test]
    fn test_run_at_word_and_punctuation() {
        assert_eq!(run_at("a.b.c", 2), Some((2, 3)));
        assert_eq!(run_at("a.b.c", 1), Some((1, 2)));
        assert_eq!(run_at("foo_bar  baz", 4), Some((0, 7)));
        assert_eq!(run_at("foo_bar  baz", 7), Some((7, 9)));
        assert_eq!(run_at("abc", 3), None);
    }

    #[test]
    fn test_data_to_lines_line_endings() {
        assert_eq!(data_to_lines("a\r\nb\rc\n"), vec!["a", "b", "c", ""]);
        assert_eq!(data_to_lines(""), vec![String::new()]);
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(leading_whitespace("  \tx y"), "  \t");
        assert_eq!(leading_whitespace("   "), "   ");
    }

    #[test]
    fn test_word_boundaries() {
        assert_eq!(word_boundaries("foo bar"), vec![0, 3, 4, 7]);
        assert_eq!(word_boundaries("a.b"), vec![0, 1, 2, 3]);
        assert_eq!(word_boundaries(""), vec![0]);
    }

    #[test]
    fn test_subword_boundaries_camel_case() {
        assert_eq!(subword_boundaries("fooBarBaz", true), vec![0, 3, 6, 9]);
        assert_eq!(subword_boundaries("HTTPServer", true), vec![0, 4, 10]);
    }

    #[test]
    fn test_subword_boundaries_separator_side() {
        assert_eq!(subword_boundaries("foo_bar", true), vec![0, 3, 7]);
        assert_eq!(subword_boundaries("foo_bar", false), vec![0, 4, 7]);
    }

    #[test]
    fn test_subword_boundaries_skip_digits() {
        assert_eq!(subword_boundaries("ab12cd", true), vec![0, 2, 4, 6]);
    }
}
