//! Index stack and numbering formats.
//!
//! Ordered lists and maps push a 1-based counter while they render their items.
//! A numbering format such as `%I.%n` consumes the innermost counters: the last
//! `%` code maps to the innermost list, the one before it to its parent, and so on.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::TemplateError;

lazy_static! {
    static ref FORMAT_CODE: Regex = Regex::new(r"%(.)").unwrap();
}

const ROMAN_NUMERALS: [(usize, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingFormat {
    /// `%n`: 1, 2, 3
    Arabic,
    /// `%s`: a, b, ..., z, aa, bb
    LowerString,
    /// `%S`: A, B, ..., Z, AA, BB
    UpperString,
    /// `%i`: i, ii, iii
    LowerRoman,
    /// `%I`: I, II, III
    UpperRoman,
}

impl NumberingFormat {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'n' => Some(Self::Arabic),
            's' => Some(Self::LowerString),
            'S' => Some(Self::UpperString),
            'i' => Some(Self::LowerRoman),
            'I' => Some(Self::UpperRoman),
            _ => None,
        }
    }

    pub fn format(self, index: usize) -> String {
        match self {
            Self::Arabic => index.to_string(),
            Self::LowerString => letters(index, b'a'),
            Self::UpperString => letters(index, b'A'),
            Self::LowerRoman => roman(index).to_lowercase(),
            Self::UpperRoman => roman(index),
        }
    }
}

fn letters(index: usize, base: u8) -> String {
    if index == 0 {
        return String::new();
    }
    let offset = (index - 1) % 26;
    let count = (index - 1) / 26 + 1;
    let letter = char::from(base + offset as u8);
    std::iter::repeat(letter).take(count).collect()
}

fn roman(mut index: usize) -> String {
    let mut out = String::new();
    for (value, numeral) in ROMAN_NUMERALS {
        while index >= value {
            out.push_str(numeral);
            index -= value;
        }
    }
    out
}

/// Stack of 1-based item counters, one per enclosing ordered list or map.
#[derive(Debug, Default, Clone)]
pub struct IndexStack {
    entries: Vec<usize>,
}

impl IndexStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new ordered scope; the counter starts before the first item.
    pub fn push(&mut self) {
        self.entries.push(0);
    }

    /// Advance the innermost counter. No-op on an empty stack.
    pub fn increment(&mut self) {
        if let Some(last) = self.entries.last_mut() {
            *last += 1;
        }
    }

    pub fn pop(&mut self) {
        self.entries.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counters from outermost to innermost.
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }
}

/// Expand every `%x` code of `format` against the innermost `indexes`.
pub fn format_numbering(format: &str, indexes: &[usize]) -> Result<String, TemplateError> {
    let codes = FORMAT_CODE.captures_iter(format).count();
    if codes > indexes.len() {
        return Err(TemplateError::InvalidNumberingFormat {
            format: format.to_string(),
            reason: format!(
                "{} format codes but only {} enclosing ordered lists",
                codes,
                indexes.len()
            ),
        });
    }

    let mut position = indexes.len() - codes;
    let mut invalid = None;
    let output = FORMAT_CODE.replace_all(format, |caps: &Captures| {
        let code = caps[1].chars().next().unwrap_or('%');
        let index = indexes[position];
        position += 1;
        match NumberingFormat::from_code(code) {
            Some(numbering) => numbering.format(index),
            None => {
                invalid.get_or_insert(code);
                String::new()
            }
        }
    });

    if let Some(code) = invalid {
        return Err(TemplateError::InvalidNumberingFormat {
            format: format.to_string(),
            reason: format!("unknown format code `%{}`", code),
        });
    }
    Ok(output.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters() {
        assert_eq!(NumberingFormat::LowerString.format(1), "a");
        assert_eq!(NumberingFormat::LowerString.format(26), "z");
        assert_eq!(NumberingFormat::LowerString.format(27), "aa");
        assert_eq!(NumberingFormat::UpperString.format(28), "BB");
    }

    #[test]
    fn test_roman() {
        assert_eq!(NumberingFormat::UpperRoman.format(4), "IV");
        assert_eq!(NumberingFormat::UpperRoman.format(1994), "MCMXCIV");
        assert_eq!(NumberingFormat::LowerRoman.format(9), "ix");
    }

    #[test]
    fn test_format_uses_innermost_indexes() {
        assert_eq!(format_numbering("%n.", &[3]).unwrap(), "3.");
        assert_eq!(format_numbering("%I.%n", &[1, 2]).unwrap(), "I.2");
        assert_eq!(format_numbering("%n)", &[4, 2]).unwrap(), "2)");
        assert_eq!(format_numbering("%S-%s-%n", &[1, 2, 3]).unwrap(), "A-b-3");
    }

    #[test]
    fn test_literal_text_and_trailing_percent() {
        assert_eq!(format_numbering("Chapter", &[1]).unwrap(), "Chapter");
        assert_eq!(format_numbering("%n%", &[5]).unwrap(), "5%");
    }

    #[test]
    fn test_invalid_formats() {
        assert!(matches!(
            format_numbering("%x", &[1]),
            Err(TemplateError::InvalidNumberingFormat { .. })
        ));
        assert!(matches!(
            format_numbering("%n.%n", &[1]),
            Err(TemplateError::InvalidNumberingFormat { .. })
        ));
    }

    #[test]
    fn test_index_stack() {
        let mut stack = IndexStack::new();
        stack.increment();
        assert!(stack.is_empty());
        stack.push();
        stack.increment();
        stack.push();
        stack.increment();
        stack.increment();
        assert_eq!(stack.entries(), &[1, 2]);
        stack.pop();
        stack.increment();
        assert_eq!(stack.entries(), &[2]);
        stack.pop();
        assert!(stack.is_empty());
    }
}
