use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'source> {
    /// End of input.
    Eoi,
    /// A run of whitespace characters.
    Whitespace,
    /// The character `{`.
    GroupBegin,
    /// The character `}`.
    GroupEnd,
    /// The character `^` for superscripts.
    Circumflex,
    /// The character `_` for subscripts.
    Underscore,
    /// The alignment tab `&`.
    Ampersand,
    /// The character `'`.
    Prime,
    /// A macro parameter `#1` to `#9`, stored as 1 to 9.
    Param(u8),
    /// A `#` that is not followed by a parameter number.
    Hash,
    /// A control sequence, without the backslash.
    Command(&'source str),
    /// A character that some loaded package has made active, e.g. `~`.
    Active(char),
    /// A letter, e.g. `a`, `Z` or `α`.
    Letter(char),
    /// An ASCII digit.
    Digit(char),
    /// Any other character, e.g. `+` or `(`.
    Other(char),
    /// Never produced by the lexer. Marks the end of an argument that was put back into the
    /// token stream, so that the argument cannot read past it.
    ArgEnd,
}

static_assertions::assert_eq_size!(Token<'_>, [usize; 3]);

impl Token<'_> {
    /// The character this token stands for when it is treated as plain text.
    pub(crate) fn as_char(&self) -> Option<char> {
        match self {
            Token::Letter(ch) | Token::Digit(ch) | Token::Other(ch) | Token::Active(ch) => {
                Some(*ch)
            }
            Token::Whitespace => Some(' '),
            Token::Circumflex => Some('^'),
            Token::Underscore => Some('_'),
            Token::Ampersand => Some('&'),
            Token::Prime => Some('\''),
            Token::Hash => Some('#'),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn is_other(&self, expected: char) -> bool {
        matches!(self, Token::Other(ch) if *ch == expected)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn zero_width(at: usize) -> Self {
        Span { start: at, end: at }
    }

    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Returns a new `Span` with the same start position as `self`, but with the end position set
    /// to `self.start + length`.
    #[inline]
    pub const fn with_length(self, length: usize) -> Self {
        Span {
            start: self.start,
            end: self.start + length,
        }
    }

    /// The smallest span covering both `self` and `other`.
    #[inline]
    pub fn join(self, other: Span) -> Self {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Span> for Range<usize> {
    #[inline]
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A token together with its span in the input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokSpan<'source>(Token<'source>, Span);

impl<'source> TokSpan<'source> {
    #[inline]
    pub const fn new(token: Token<'source>, span: Span) -> Self {
        TokSpan(token, span)
    }

    #[inline]
    pub fn token(&self) -> &Token<'source> {
        &self.0
    }

    #[inline]
    pub fn into_parts(self) -> (Token<'source>, Span) {
        (self.0, self.1)
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.1
    }

    /// The same token, reported at `span`.
    #[inline]
    pub fn with_span(self, span: Span) -> Self {
        TokSpan(self.0, span)
    }
}

impl<'source> From<Token<'source>> for TokSpan<'source> {
    #[inline]
    fn from(token: Token<'source>) -> Self {
        TokSpan(token, Span::default())
    }
}
