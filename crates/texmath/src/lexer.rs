use std::mem;
use std::str::CharIndices;

use crate::error::{ParseResult, TexErrKind, TexError};
use crate::token::{Span, TokSpan, Token};

/// Splits TeX source into tokens.
///
/// The lexer knows nothing about macros: control sequences are returned by name and resolved by
/// the parser.
pub(crate) struct Lexer<'source> {
    input: CharIndices<'source>,
    peek: (usize, Option<char>),
    input_string: &'source str,
    input_length: usize,
    /// Characters that are lexed as [`Token::Active`].
    active: &'source str,
}

impl<'source> Lexer<'source> {
    pub(crate) fn new(input: &'source str, active: &'source str) -> Self {
        let mut lexer = Lexer {
            input: input.char_indices(),
            peek: (0, None),
            input_string: input,
            input_length: input.len(),
            active,
        };
        lexer.read_char(); // Initialize `peek`.
        lexer
    }

    /// One character progresses.
    fn read_char(&mut self) -> (usize, Option<char>) {
        mem::replace(
            &mut self.peek,
            self.input
                .next()
                .map(|(idx, ch)| (idx, Some(ch)))
                .unwrap_or((self.input_length, None)),
        )
    }

    /// Skip whitespace characters.
    ///
    /// Returns the span of the skipped run, or `None` if there was no whitespace.
    fn skip_whitespace(&mut self) -> Option<Span> {
        let start = self.peek.0;
        while self.peek.1.is_some_and(|ch| ch.is_whitespace()) {
            self.read_char();
        }
        let end = self.peek.0;
        (end > start).then(|| Span::new(start, end))
    }

    /// Read the name of a control sequence; the backslash has already been consumed.
    ///
    /// Returns `None` if the input ends right after the backslash.
    fn read_command(&mut self) -> Option<(&'source str, bool)> {
        let start = self.peek.0;
        while self.peek.1.is_some_and(|ch| ch.is_ascii_alphabetic()) {
            self.read_char();
        }
        let is_letters = start != self.peek.0;
        if !is_letters {
            // A single non-letter character.
            self.read_char().1?;
        }
        let end = self.peek.0;
        Some((self.input_string.get(start..end)?, is_letters))
    }

    pub(crate) fn next_token(&mut self) -> ParseResult<TokSpan<'source>> {
        loop {
            if let Some(span) = self.skip_whitespace() {
                return Ok(TokSpan::new(Token::Whitespace, span));
            }
            if self.peek.1 != Some('%') {
                break;
            }
            // Skip the comment and its newline.
            while self.peek.1.is_some_and(|ch| ch != '\n') {
                self.read_char();
            }
            self.read_char();
        }

        let (loc, ch) = self.read_char();
        let Some(ch) = ch else {
            return Ok(TokSpan::new(Token::Eoi, Span::zero_width(loc)));
        };
        let mut span = Span::new(loc, loc + ch.len_utf8());
        let tok = match ch {
            '\\' => {
                let Some((name, is_letters)) = self.read_command() else {
                    return Err(Box::new(TexError(
                        span.into(),
                        TexErrKind::UnterminatedControlSequence,
                    )));
                };
                span = Span::new(loc, self.peek.0);
                if is_letters {
                    // Whitespace after a control word is not significant.
                    self.skip_whitespace();
                }
                Token::Command(name)
            }
            '{' => Token::GroupBegin,
            '}' => Token::GroupEnd,
            '^' => Token::Circumflex,
            '_' => Token::Underscore,
            '&' => Token::Ampersand,
            '\'' => Token::Prime,
            '#' => match self.peek.1 {
                Some(digit @ '1'..='9') => {
                    self.read_char();
                    span = span.with_length(2);
                    Token::Param(digit as u8 - b'0')
                }
                _ => Token::Hash,
            },
            c if self.active.contains(c) => Token::Active(c),
            c if c.is_ascii_digit() => Token::Digit(c),
            c if c.is_alphabetic() => Token::Letter(c),
            c if c.is_control() => {
                return Err(Box::new(TexError(
                    span.into(),
                    TexErrKind::IllegalCharacter(c),
                )));
            }
            c => Token::Other(c),
        };
        Ok(TokSpan::new(tok, span))
    }

    /// Lex the whole remaining input, without the final [`Token::Eoi`].
    pub(crate) fn collect_tokens(mut self) -> ParseResult<Vec<TokSpan<'source>>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if matches!(tok.token(), Token::Eoi) {
                return Ok(tokens);
            }
            tokens.push(tok);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use insta::assert_snapshot;

    use super::*;

    fn lex(problem: &str) -> String {
        let mut lexer = Lexer::new(problem, "~");
        let mut tokens = String::new();
        loop {
            match lexer.next_token() {
                Ok(tokloc) => {
                    if matches!(tokloc.token(), Token::Eoi) {
                        break;
                    }
                    let (tok, span) = tokloc.into_parts();
                    writeln!(tokens, "{}..{}: {:?}", span.start(), span.end(), tok).unwrap();
                }
                Err(err) => {
                    writeln!(tokens, "Error at {}..{}: {}", err.0.start, err.0.end, err.1.id())
                        .unwrap();
                    break;
                }
            }
        }
        tokens
    }

    #[test]
    fn simple_expression() {
        assert_snapshot!(lex(r"x+1"), @r"
        0..1: Letter('x')
        1..2: Other('+')
        2..3: Digit('1')
        ");
    }

    #[test]
    fn control_words_eat_following_space() {
        assert_snapshot!(lex(r"\alpha  \beta\, x"), @r#"
        0..6: Command("alpha")
        8..13: Command("beta")
        13..15: Command(",")
        15..16: Whitespace
        16..17: Letter('x')
        "#);
    }

    #[test]
    fn comments_and_active_characters() {
        assert_snapshot!(lex("a%hello\n~b"), @r"
        0..1: Letter('a')
        8..9: Active('~')
        9..10: Letter('b')
        ");
    }

    #[test]
    fn many_comment_lines() {
        let problem = "%\n".repeat(200_000) + "x";
        assert_eq!(lex(&problem), "400000..400001: Letter('x')\n");
        assert_snapshot!(lex("a % one\n  % two\n% three"), @r"
        0..1: Letter('a')
        1..2: Whitespace
        8..10: Whitespace
        ");
    }

    #[test]
    fn parameters() {
        assert_snapshot!(lex(r"#1#a"), @r"
        0..2: Param(1)
        2..3: Hash
        3..4: Letter('a')
        ");
    }

    #[test]
    fn unicode_letters() {
        assert_snapshot!(lex("αβ≤"), @r"
        0..2: Letter('α')
        2..4: Letter('β')
        4..7: Other('≤')
        ");
    }

    #[test]
    fn errors() {
        assert_snapshot!(lex("x\\"), @r"
        0..1: Letter('x')
        Error at 1..2: UnterminatedControlSequence
        ");
        assert_snapshot!(lex("x + \u{0}"), @r"
        0..1: Letter('x')
        1..2: Whitespace
        2..3: Other('+')
        3..4: Whitespace
        Error at 4..5: IllegalCharacter
        ");
    }
}
