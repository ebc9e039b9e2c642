//! Splitting runs of digits into numbers.

use regex::Regex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which characters may continue a number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DigitPattern {
    /// `1{,}000.5`: `{,}` groups thousands, `.` is the decimal point.
    #[default]
    Default,
    /// `1{.}000,5`: the roles of `.` and `,` are swapped.
    European,
    /// A custom regular expression, matched at the start of the digit run.
    Custom(String),
}

const DEFAULT_PATTERN: &str = r"^(?:[0-9]+(?:\{,\}[0-9]{3})*(?:\.[0-9]*)?|\.[0-9]+)";
const EUROPEAN_PATTERN: &str = r"^(?:[0-9]+(?:\{\.\}[0-9]{3})*(?:,[0-9]*)?|,[0-9]+)";

impl DigitPattern {
    pub(crate) fn compile(&self) -> Result<Regex, regex::Error> {
        match self {
            DigitPattern::Default => Regex::new(DEFAULT_PATTERN),
            DigitPattern::European => Regex::new(EUROPEAN_PATTERN),
            DigitPattern::Custom(pattern) => Regex::new(&format!("^(?:{pattern})")),
        }
    }
}

/// The characters that may appear in the candidate text for a number.
#[inline]
pub(crate) fn is_number_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | ',' | '{' | '}')
}

/// The length of the number at the start of `candidate`, in characters.
///
/// The candidate only contains ASCII characters, see [`is_number_char`].
pub(crate) fn match_number(pattern: &Regex, candidate: &str) -> Option<usize> {
    pattern
        .find(candidate)
        .map(|found| found.end())
        .filter(|&len| len > 0)
}

/// The text of a matched number, without grouping braces.
pub(crate) fn number_text(matched: &str) -> String {
    matched.chars().filter(|ch| !matches!(ch, '{' | '}')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(pattern: &DigitPattern, candidate: &str) -> Vec<String> {
        let regex = pattern.compile().unwrap();
        let mut rest = candidate;
        let mut numbers = Vec::new();
        while !rest.is_empty() {
            let len = match_number(&regex, rest).unwrap_or(1);
            numbers.push(number_text(&rest[..len]));
            rest = &rest[len..];
        }
        numbers
    }

    #[test]
    fn default_pattern() {
        assert_eq!(split(&DigitPattern::Default, "123.45"), ["123.45"]);
        assert_eq!(split(&DigitPattern::Default, "1{,}000{,}000"), ["1,000,000"]);
        assert_eq!(split(&DigitPattern::Default, "1{,}0000.10"), ["1,000", "0.10"]);
        assert_eq!(split(&DigitPattern::Default, ".5"), [".5"]);
        assert_eq!(split(&DigitPattern::Default, "1,5"), ["1", ",", "5"]);
    }

    #[test]
    fn european_pattern() {
        assert_eq!(split(&DigitPattern::European, "1{.}0000,10"), ["1.000", "0,10"]);
        assert_eq!(split(&DigitPattern::European, "1.5"), ["1", ".", "5"]);
    }

    #[test]
    fn custom_pattern() {
        let pattern = DigitPattern::Custom("[0-9]".to_string());
        assert_eq!(split(&pattern, "12"), ["1", "2"]);
        assert!(DigitPattern::Custom("[0-".to_string()).compile().is_err());
    }
}
