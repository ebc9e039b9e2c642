use std::collections::VecDeque;

use crate::{
    error::{ParseResult, TexErrKind, TexError},
    lexer::Lexer,
    token::{Span, TokSpan, Token},
};

/// A token queue that allows peeking at the next non-whitespace token, and into which
/// expanded tokens can be pushed back.
pub(crate) struct TokenQueue<'source> {
    lexer: Lexer<'source>,
    queue: VecDeque<TokSpan<'source>>,
    lexer_is_eoi: bool,
    next_non_whitespace: usize,
    eoi: TokSpan<'source>,
}

impl<'source> TokenQueue<'source> {
    pub(crate) fn new(lexer: Lexer<'source>, input_length: usize) -> ParseResult<Self> {
        let mut tq = TokenQueue {
            lexer,
            queue: VecDeque::with_capacity(4),
            lexer_is_eoi: false,
            next_non_whitespace: 0,
            eoi: TokSpan::new(Token::Eoi, Span::zero_width(input_length)),
        };
        // Ensure that we have at least one non-whitespace token in the buffer for peeking.
        let offset = tq.load_token()?;
        tq.next_non_whitespace = offset;
        Ok(tq)
    }

    /// Load tokens from the lexer into the buffer, up to and including the next
    /// non-whitespace token.
    ///
    /// Returns the offset of that token relative to the previous end of the buffer.
    fn load_token(&mut self) -> ParseResult<usize> {
        if self.lexer_is_eoi {
            // Returning here with offset 0 is the right thing to do,
            // because it will result in an index that is one past the end of the buffer.
            return Ok(0);
        }
        let mut non_skipped_offset = 0usize;
        loop {
            let tok = self.lexer.next_token()?;
            match tok.token() {
                Token::Whitespace => {
                    self.queue.push_back(tok);
                    non_skipped_offset += 1;
                }
                Token::Eoi => {
                    self.eoi = tok;
                    self.lexer_is_eoi = true;
                    // The EOI token itself is never stored; `peek` falls back to `self.eoi`.
                    break;
                }
                _ => {
                    self.queue.push_back(tok);
                    break;
                }
            }
        }
        Ok(non_skipped_offset)
    }

    /// Perform a linear search to find the next non-whitespace token in the buffer.
    fn find_next_non_whitespace(&self) -> Option<usize> {
        self.queue.iter().position(is_not_whitespace)
    }

    fn ensure_next_non_whitespace(&mut self) -> ParseResult<()> {
        let pos = 'pos_calc: {
            // First, try to find the next non-whitespace token in the existing buffer.
            if let Some(pos) = self.find_next_non_whitespace() {
                break 'pos_calc pos;
            };
            // Then, try to load more tokens until we find one or reach EOI.
            let starting_len = self.queue.len();
            starting_len + self.load_token()?
        };
        self.next_non_whitespace = pos;
        Ok(())
    }

    /// Peek at the next non-whitespace token without consuming it.
    ///
    /// If the lexer has reached the end of the input, this will return an EOI token.
    #[inline]
    pub(crate) fn peek(&self) -> &TokSpan<'source> {
        // `next_non_whitespace` points to the next non-whitespace token,
        // or to one past the end of the buffer if there is none.
        self.queue.get(self.next_non_whitespace).unwrap_or(&self.eoi)
    }

    /// Peek at the non-whitespace token after the next one.
    pub(crate) fn peek_second(&mut self) -> ParseResult<&TokSpan<'source>> {
        let start = self.next_non_whitespace;
        let found = if start < self.queue.len() {
            self.queue
                .range(start + 1..)
                .position(is_not_whitespace)
                .map(|pos| start + 1 + pos)
        } else {
            return Ok(&self.eoi);
        };
        let idx = match found {
            Some(idx) => idx,
            None => {
                let starting_len = self.queue.len();
                starting_len + self.load_token()?
            }
        };
        Ok(self.queue.get(idx).unwrap_or(&self.eoi))
    }

    /// Peek at the `n`-th upcoming token, counting whitespace tokens.
    pub(crate) fn peek_nth_with_whitespace(&mut self, n: usize) -> ParseResult<&TokSpan<'source>> {
        while self.queue.len() <= n && !self.lexer_is_eoi {
            self.load_token()?;
        }
        Ok(self.queue.get(n).unwrap_or(&self.eoi))
    }

    /// Get the next non-whitespace token.
    ///
    /// This method also ensures that there is always a peekable token after this one.
    pub(crate) fn next(&mut self) -> ParseResult<TokSpan<'source>> {
        // Pop elements until we reach `next_non_whitespace`.
        for _ in 0..self.next_non_whitespace {
            let _ = self.queue.pop_front();
        }

        // Now pop the next token.
        if let Some(ret) = self.queue.pop_front() {
            self.ensure_next_non_whitespace()?;
            Ok(ret)
        } else {
            // We must have reached EOI previously.
            self.next_non_whitespace = 0;
            Ok(self.eoi)
        }
    }

    /// Get the next token which may be whitespace.
    pub(crate) fn next_with_whitespace(&mut self) -> ParseResult<TokSpan<'source>> {
        if let Some(ret) = self.queue.pop_front() {
            // `next_non_whitespace` may need to be updated.
            if let Some(new_pos) = self.next_non_whitespace.checked_sub(1) {
                self.next_non_whitespace = new_pos;
            } else {
                // We popped `next_non_whitespace` itself, so we need to find the next one.
                self.ensure_next_non_whitespace()?;
            }
            Ok(ret)
        } else {
            Ok(self.eoi)
        }
    }

    /// The number of tokens read from the lexer or queued, but not consumed yet.
    pub(crate) fn buffered(&self) -> usize {
        self.queue.len()
    }

    /// Put tokens back in front of the queue; they are read before anything else.
    pub(crate) fn queue_in_front(&mut self, tokens: &[impl Into<TokSpan<'source>> + Copy]) {
        self.queue.reserve(tokens.len());
        // Queue the token stream in the front in reverse order.
        for tok in tokens.iter().rev() {
            self.queue.push_front((*tok).into());
        }

        // Update the next_non_whitespace position.
        if let Some(pos) = self.find_next_non_whitespace() {
            self.next_non_whitespace = pos;
        } else {
            // There is only one scenario in which we wouldn't find a non-whitespace token:
            // We reached EOI previously and all queued tokens are whitespace.
            self.next_non_whitespace = self.queue.len();
        }
    }

    /// Read a group of tokens, ending with (an unopened) `}`.
    ///
    /// The initial `{` must have already been consumed. The closing `}` is not included
    /// in the output token vector. Returns the end of the group in the input.
    pub(crate) fn read_group(&mut self, tokens: &mut Vec<TokSpan<'source>>) -> ParseResult<usize> {
        let mut nesting_level = 0usize;
        let end = loop {
            let tokloc = self.next_with_whitespace()?;
            match tokloc.token() {
                Token::GroupBegin => {
                    nesting_level += 1;
                }
                Token::GroupEnd => {
                    // If the nesting level reaches one below where we started, we
                    // stop reading.
                    let Some(new_level) = nesting_level.checked_sub(1) else {
                        // We break directly without pushing the `}` token.
                        break tokloc.span().end();
                    };
                    nesting_level = new_level;
                }
                Token::Eoi | Token::ArgEnd => {
                    if matches!(tokloc.token(), Token::ArgEnd) {
                        self.queue_in_front(&[tokloc]);
                    }
                    return Err(Box::new(TexError(
                        tokloc.span().into(),
                        TexErrKind::ExtraOpenMissingClose,
                    )));
                }
                _ => {}
            }
            tokens.push(tokloc);
        };
        Ok(end)
    }

    /// Read tokens up to an unnested `]`; the opening `[` must have already been consumed.
    ///
    /// Returns `None` if the input ends first.
    pub(crate) fn read_bracket(
        &mut self,
        tokens: &mut Vec<TokSpan<'source>>,
    ) -> ParseResult<Option<usize>> {
        let mut nesting_level = 0usize;
        loop {
            let tokloc = self.next_with_whitespace()?;
            match tokloc.token() {
                Token::GroupBegin => nesting_level += 1,
                Token::GroupEnd => match nesting_level.checked_sub(1) {
                    Some(new_level) => nesting_level = new_level,
                    None => {
                        self.queue_in_front(&[tokloc]);
                        return Ok(None);
                    }
                },
                Token::Other(']') if nesting_level == 0 => {
                    return Ok(Some(tokloc.span().end()));
                }
                Token::Eoi => return Ok(None),
                Token::ArgEnd => {
                    self.queue_in_front(&[tokloc]);
                    return Ok(None);
                }
                _ => {}
            }
            tokens.push(tokloc);
        }
    }
}

fn is_not_whitespace(tok: &TokSpan) -> bool {
    !matches!(tok.token(), Token::Whitespace)
}
