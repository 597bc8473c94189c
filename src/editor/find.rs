//! Search patterns and the substitute command.
//!
//! Matching works on UTF-8 byte offsets from `regex`; everything leaving
//! this module is converted back to char columns.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use super::selection::Position;
use super::text;

/// A search or replace pattern failed to compile.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PatternError(#[from] regex::Error);

#[derive(Debug, Error)]
pub enum SubstituteError {
    #[error("An exchange needs three {0} separators")]
    MissingSeparators(char),
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// How user search text becomes a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub ignore_case: bool,
    pub use_regex: bool,
    pub whole_word: bool,
    pub dot_all: bool,
    pub verbose: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            use_regex: true,
            whole_word: false,
            dot_all: false,
            verbose: false,
        }
    }
}

/// Which way a search runs from the pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    /// Start at the pen, so a match under it is found again.
    Here,
    Forward,
}

/// A compiled search.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    regex: Regex,
}

/// Where a search landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    pub start: Position,
    /// Match length in columns.
    pub len: usize,
    /// The search passed the end (or start) of the document.
    pub wrapped: bool,
}

impl SearchPattern {
    pub fn new(search_for: &str, options: FindOptions) -> Result<Self, PatternError> {
        let mut pattern: Cow<'_, str> = if options.use_regex {
            Cow::Borrowed(search_for)
        } else {
            Cow::Owned(regex::escape(search_for))
        };
        if options.whole_word {
            pattern = Cow::Owned(format!(r"\b(?:{pattern})\b"));
        }
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(options.ignore_case)
            .dot_matches_new_line(options.dot_all)
            .ignore_whitespace(options.verbose)
            .build()?;
        Ok(Self { regex })
    }

    /// The compiled expression, for highlighting matches.
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// First (or with `last`, final) match in `line` as a column span.
    fn search_line(&self, line: &str, last: bool) -> Option<(usize, usize)> {
        let found = if last {
            self.regex.find_iter(line).last()
        } else {
            self.regex.find(line)
        }?;
        let start = text::column_of_byte(line, found.start());
        let end = text::column_of_byte(line, found.end());
        Some((start, end - start))
    }

    /// Search the document from `pen`.
    ///
    /// Order: the rest of the pen row, rows beyond it, then wrapping around
    /// to the rows on the other side, then the part of the pen row the first
    /// step skipped.
    pub fn search(&self, lines: &[String], pen: Position, direction: Direction) -> Option<Found> {
        let backward = direction == Direction::Backward;
        let line = lines.get(pen.row).map_or("", String::as_str);
        let hit = |row: usize, offset: usize, span: Option<(usize, usize)>, wrapped: bool| {
            span.map(|(col, len)| Found {
                start: Position::new(row, offset + col),
                len,
                wrapped,
            })
        };

        let first = if backward {
            hit(pen.row, 0, self.search_line(text::head(line, pen.col), true), false)
        } else {
            let offset = pen.col + usize::from(direction == Direction::Forward);
            let rest = if offset > text::width(line) { "" } else { text::tail(line, offset) };
            hit(pen.row, offset, self.search_line(rest, false), false)
        };
        if first.is_some() {
            return first;
        }

        let beyond: Box<dyn Iterator<Item = usize>> = if backward {
            Box::new((0..pen.row).rev())
        } else {
            Box::new(pen.row + 1..lines.len())
        };
        for row in beyond {
            if let Some(found) = hit(row, 0, self.search_line(&lines[row], backward), false) {
                return Some(found);
            }
        }

        let wrapped: Box<dyn Iterator<Item = usize>> = if backward {
            Box::new((pen.row + 1..lines.len()).rev())
        } else {
            Box::new(0..pen.row)
        };
        for row in wrapped {
            if let Some(found) = hit(row, 0, self.search_line(&lines[row], backward), true) {
                return Some(found);
            }
        }

        if backward {
            hit(pen.row, pen.col, self.search_line(text::tail(line, pen.col), true), true)
        } else {
            hit(pen.row, 0, self.search_line(line, false), true)
        }
    }

    /// Substitute every match in `data` using a replacement template.
    pub fn replace_all<'a>(&self, data: &'a str, replacement: &str) -> Cow<'a, str> {
        self.regex.replace_all(data, replacement_template(replacement).as_ref())
    }
}

/// A parsed `/find/replace/flags` command.
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
}

impl Substitution {
    /// Parse a command whose first char is the separator, e.g. `/a/b/i`.
    ///
    /// Flags: `i` ignore case, `s` dot matches newline, `x` verbose, `m`
    /// multi-line (always on). Other letters are ignored.
    pub fn parse(command: &str) -> Result<Self, SubstituteError> {
        let Some(separator) = command.chars().next() else {
            return Err(SubstituteError::MissingSeparators('/'));
        };
        let parts: Vec<&str> = command.splitn(4, separator).collect();
        let [_, find, replace, flags] = parts[..] else {
            return Err(SubstituteError::MissingSeparators(separator));
        };
        let pattern = RegexBuilder::new(find)
            .multi_line(true)
            .case_insensitive(flags.contains('i'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'))
            .build()
            .map_err(PatternError::from)?;
        Ok(Self {
            pattern,
            replacement: replace.to_owned(),
        })
    }

    pub fn apply<'a>(&self, data: &'a str) -> Cow<'a, str> {
        self.pattern
            .replace_all(data, replacement_template(&self.replacement).as_ref())
    }
}

/// Accept `\1` style group references alongside `$1`.
fn replacement_template(replacement: &str) -> Cow<'_, str> {
    if !replacement.contains('\\') {
        return Cow::Borrowed(replacement);
    }
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('\\', Some(d)) if d.is_ascii_digit() => {
                out.push_str("${");
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    out.push(d);
                }
                out.push('}');
            }
            ('\\', Some('\\')) => {
                chars.next();
                out.push('\\');
            }
            ('\\', Some('n')) => {
                chars.next();
                out.push('\n');
            }
            ('\\', Some('t')) => {
                chars.next();
                out.push('\t');
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
