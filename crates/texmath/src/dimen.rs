//! TeX dimensions such as `2.5em` or `-3 mu`.

use math_tree::{Length, LengthUnit};

/// Match a dimension at the start of `text`.
///
/// The accepted syntax is an optional sign, a decimal number (`1`, `1.`, `.5`, `1.5`), optional
/// spaces, and a two-letter unit. Returns the length and the number of characters consumed.
pub(crate) fn match_dimen(text: &str) -> Option<(Length, usize)> {
    let bytes = text.as_bytes();
    let mut pos = skip_spaces(bytes, 0);
    let number_start = pos;
    if matches!(bytes.get(pos), Some(b'+' | b'-')) {
        pos += 1;
    }
    let integer_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    let integer_len = pos - integer_start;
    let mut fraction_len = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
            fraction_len += 1;
        }
    }
    if integer_len == 0 && fraction_len == 0 {
        return None;
    }
    let number = text.get(number_start..pos)?;
    pos = skip_spaces(bytes, pos);
    let unit = LengthUnit::from_name(text.get(pos..pos + 2)?)?;
    pos += 2;
    // Everything consumed so far is ASCII, so bytes and characters coincide.
    Some((Length::new(parse_number(number)?, unit), pos))
}

/// Parse a complete dimension; surrounding spaces are allowed.
pub(crate) fn parse_dimen(text: &str) -> Option<Length> {
    let (length, consumed) = match_dimen(text)?;
    text.get(consumed..)?.trim().is_empty().then_some(length)
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos) == Some(&b' ') {
        pos += 1;
    }
    pos
}

/// Parse a number matched by [`match_dimen`].
///
/// `f32::from_str` rejects a trailing dot and a leading `+`, which TeX allows.
fn parse_number(number: &str) -> Option<f32> {
    let number = number.strip_prefix('+').unwrap_or(number);
    let number = number.strip_suffix('.').unwrap_or(number);
    let (number, sign) = match number.strip_prefix('-') {
        Some(rest) => (rest, -1.0),
        None => (number, 1.0),
    };
    let value = if number.is_empty() {
        0.0
    } else if let Some(fraction) = number.strip_prefix('.') {
        ("0.".to_string() + fraction).parse::<f32>().ok()?
    } else {
        number.parse::<f32>().ok()?
    };
    Some(sign * value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_prefix() {
        let (length, consumed) = match_dimen("3mu x").unwrap();
        assert_eq!(length, Length::new(3.0, LengthUnit::Mu));
        assert_eq!(consumed, 3);
        let (length, consumed) = match_dimen(" -.5 em").unwrap();
        assert_eq!(length, Length::new(-0.5, LengthUnit::Em));
        assert_eq!(consumed, 7);
        let (length, _) = match_dimen("+2.pt").unwrap();
        assert_eq!(length, Length::new(2.0, LengthUnit::Pt));
    }

    #[test]
    fn reject() {
        assert_eq!(match_dimen("em"), None);
        assert_eq!(match_dimen("."), None);
        assert_eq!(match_dimen("3"), None);
        assert_eq!(match_dimen("3xx"), None);
        assert_eq!(parse_dimen("3em x"), None);
    }

    #[test]
    fn whole_dimension() {
        assert_eq!(parse_dimen(" 1.5cm "), Some(Length::new(1.5, LengthUnit::Cm)));
        assert_eq!(parse_dimen("0pt").map(|l| l.is_zero()), Some(true));
    }
}
