//! Macro expansion and the definitions made with `\newcommand`, `\def` and `\let`.

use std::rc::Rc;

use log::trace;

use math_tree::TreeBuilder;

use super::{MAX_BUFFER, Parser, cs, error, tokens_to_string};
use crate::error::{ParseResult, TexErrKind};
use crate::lexer::Lexer;
use crate::symbols::{Def, MacroDef};
use crate::token::{Span, TokSpan, Token};

/// A macro defined at runtime or in the configuration.
#[derive(Debug)]
pub(super) struct UserMacro<'source> {
    params: u8,
    /// Default for an optional first argument.
    default: Option<Vec<TokSpan<'source>>>,
    /// Parameter text of a `\def` with delimited arguments.
    pattern: Option<DefPattern<'source>>,
    body: Vec<TokSpan<'source>>,
}

#[derive(Debug)]
struct DefPattern<'source> {
    /// Tokens that must follow the macro name.
    prefix: Vec<TokSpan<'source>>,
    /// The tokens that end each argument; an empty delimiter means an undelimited argument.
    delimiters: Vec<Vec<TokSpan<'source>>>,
}

/// An entry of the per-parse definition table.
#[derive(Debug, Clone)]
pub(super) enum SessionDef<'source> {
    Macro(Rc<UserMacro<'source>>),
    /// `\let` to a package definition.
    Alias(Def),
    /// `\let` to a single token.
    Token(TokSpan<'source>),
}

/// A macro from the configuration, checked when the converter is built.
#[derive(Debug, Clone)]
pub(crate) struct ConfigMacro {
    pub name: String,
    pub params: u8,
    pub body: String,
}

impl ConfigMacro {
    /// The number of parameters is the highest `#n` in the body.
    pub(crate) fn new(name: &str, body: &str, active: &str) -> ParseResult<Self> {
        let tokens = Lexer::new(body, active).collect_tokens()?;
        let params = tokens
            .iter()
            .filter_map(|tok| match tok.token() {
                Token::Param(n) => Some(*n),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Ok(ConfigMacro {
            name: name.strip_prefix('\\').unwrap_or(name).to_string(),
            params,
            body: body.to_string(),
        })
    }
}

/// Whether `name` can be the name of a control sequence: letters, or a single other character.
pub(crate) fn is_command_name(name: &str) -> bool {
    let name = name.strip_prefix('\\').unwrap_or(name);
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (None, _) => false,
        (Some(ch), None) => !ch.is_whitespace() && !ch.is_control(),
        _ => name.chars().all(|ch| ch.is_ascii_alphabetic()),
    }
}

fn check_params(body: &[TokSpan], params: u8, span: Span) -> ParseResult<()> {
    let too_high = body
        .iter()
        .any(|tok| matches!(tok.token(), Token::Param(n) if *n > params));
    if too_high {
        return Err(error(span, TexErrKind::IllegalMacroParam));
    }
    Ok(())
}

/// Drop whitespace at both ends, then one pair of braces around the whole argument.
fn strip_argument(mut tokens: Vec<TokSpan>) -> Vec<TokSpan> {
    while matches!(tokens.last().map(TokSpan::token), Some(Token::Whitespace)) {
        tokens.pop();
    }
    let leading = tokens
        .iter()
        .take_while(|tok| matches!(tok.token(), Token::Whitespace))
        .count();
    tokens.drain(..leading);
    let wrapped = matches!(tokens.first().map(TokSpan::token), Some(Token::GroupBegin))
        && matches!(tokens.last().map(TokSpan::token), Some(Token::GroupEnd));
    if wrapped {
        let mut level = 0usize;
        let closes_at_end = tokens.iter().enumerate().all(|(i, tok)| {
            match tok.token() {
                Token::GroupBegin => level += 1,
                Token::GroupEnd => level -= 1,
                _ => {}
            }
            level > 0 || i + 1 == tokens.len()
        });
        if closes_at_end {
            tokens.pop();
            tokens.remove(0);
        }
    }
    tokens
}

impl<'source, B: TreeBuilder + ?Sized> Parser<'source, '_, B> {
    pub(super) fn load_config_macros(&mut self) -> ParseResult<()> {
        let macros = self.config_macros;
        for config in macros {
            let body = Lexer::new(&config.body, self.active).collect_tokens()?;
            let user = UserMacro {
                params: config.params,
                default: None,
                pattern: None,
                body,
            };
            self.session
                .insert(&config.name, SessionDef::Macro(Rc::new(user)));
        }
        Ok(())
    }

    pub(super) fn count_expansion(&mut self, span: Span) -> ParseResult<()> {
        self.expansions += 1;
        if self.expansions > self.max_macros {
            return Err(error(span, TexErrKind::MaxMacroSub));
        }
        Ok(())
    }

    pub(super) fn expand_user_macro(
        &mut self,
        user: &UserMacro<'source>,
        name: &str,
        span: Span,
    ) -> ParseResult<()> {
        self.count_expansion(span)?;
        trace!(name = name, params = user.params; "expand macro");
        let args = match &user.pattern {
            Some(pattern) => self.read_delimited_args(pattern, name, span)?,
            None => self.read_macro_args(user.params, user.default.as_deref(), name)?,
        };
        let tokens = substitute(&user.body, &args, span, self.buffer_room())?;
        self.tokens.queue_in_front(&tokens);
        Ok(())
    }

    /// How many tokens an expansion may still add to the token buffer.
    fn buffer_room(&self) -> usize {
        MAX_BUFFER.saturating_sub(self.tokens.buffered())
    }

    pub(super) fn expand_package_macro(
        &mut self,
        def: MacroDef,
        name: &str,
        span: Span,
    ) -> ParseResult<()> {
        self.count_expansion(span)?;
        trace!(name = name, params = def.params; "expand package macro");
        let body: Vec<TokSpan<'source>> = Lexer::new(def.body, self.active)
            .collect_tokens()
            .map_err(|err| error(span, err.1))?
            .into_iter()
            .map(|tok| tok.with_span(span))
            .collect();
        let args = self.read_macro_args(def.params, None, name)?;
        let tokens = substitute(&body, &args, span, self.buffer_room())?;
        self.tokens.queue_in_front(&tokens);
        Ok(())
    }

    fn read_macro_args(
        &mut self,
        params: u8,
        default: Option<&[TokSpan<'source>]>,
        name: &str,
    ) -> ParseResult<Vec<Vec<TokSpan<'source>>>> {
        let mut args = Vec::with_capacity(usize::from(params));
        if let Some(default) = default
            && params > 0
        {
            let arg = match self.read_optional(name)? {
                Some(tokens) => tokens,
                None => default.to_vec(),
            };
            args.push(arg);
        }
        while args.len() < usize::from(params) {
            args.push(self.read_raw_arg(name)?);
        }
        Ok(args)
    }

    fn read_delimited_args(
        &mut self,
        pattern: &DefPattern<'source>,
        name: &str,
        span: Span,
    ) -> ParseResult<Vec<Vec<TokSpan<'source>>>> {
        for expected in &pattern.prefix {
            let tok = self.tokens.next()?;
            if tok.token() != expected.token() {
                if matches!(tok.token(), Token::ArgEnd) {
                    self.tokens.queue_in_front(&[tok]);
                }
                return Err(error(span, TexErrKind::MismatchUseDef(cs(name))));
            }
        }
        let mut args = Vec::with_capacity(pattern.delimiters.len());
        for delimiter in &pattern.delimiters {
            let arg = if delimiter.is_empty() {
                self.read_raw_arg(name)?
            } else {
                self.read_until(delimiter, name, span)?
            };
            args.push(arg);
        }
        Ok(args)
    }

    /// Read tokens up to `delimiter` at brace level zero; the delimiter is consumed.
    fn read_until(
        &mut self,
        delimiter: &[TokSpan<'source>],
        name: &str,
        span: Span,
    ) -> ParseResult<Vec<TokSpan<'source>>> {
        let runaway = || error(span, TexErrKind::RunawayArgument(cs(name)));
        let mut tokens = Vec::new();
        let mut level = 0usize;
        loop {
            if level == 0
                && let Some(length) = self.delimiter_follows(delimiter)?
            {
                for _ in 0..length {
                    self.tokens.next_with_whitespace()?;
                }
                return Ok(strip_argument(tokens));
            }
            let tok = self.tokens.next_with_whitespace()?;
            match tok.token() {
                Token::Eoi => return Err(runaway()),
                Token::ArgEnd => {
                    self.tokens.queue_in_front(&[tok]);
                    return Err(runaway());
                }
                Token::GroupBegin => level += 1,
                Token::GroupEnd => match level.checked_sub(1) {
                    Some(new_level) => level = new_level,
                    None => return Err(runaway()),
                },
                _ => {}
            }
            tokens.push(tok);
        }
    }

    /// The number of upcoming tokens (whitespace included) that make up `delimiter`, if it
    /// follows. Whitespace is ignored when comparing.
    fn delimiter_follows(&mut self, delimiter: &[TokSpan<'source>]) -> ParseResult<Option<usize>> {
        let mut n = 0;
        for expected in delimiter {
            let tok = loop {
                let tok = *self.tokens.peek_nth_with_whitespace(n)?;
                n += 1;
                if !matches!(tok.token(), Token::Whitespace) {
                    break tok;
                }
            };
            if tok.token() != expected.token() {
                return Ok(None);
            }
        }
        Ok(Some(n))
    }

    /// `\newcommand` and `\renewcommand`.
    pub(super) fn new_command(&mut self, name: &str, span: Span) -> ParseResult<()> {
        let target = self.read_cs_name(name, span)?;
        let params = match self.read_optional(name)? {
            Some(tokens) => match tokens_to_string(&tokens).trim().parse::<u8>() {
                Ok(n) if n <= 9 => n,
                _ => return Err(error(span, TexErrKind::IllegalMacroParam)),
            },
            None => 0,
        };
        let default = if params > 0 {
            self.read_optional(name)?
        } else {
            None
        };
        let body = self.read_raw_arg(name)?;
        check_params(&body, params, span)?;
        trace!(name = target, params = params; "define macro");
        let user = UserMacro {
            params,
            default,
            pattern: None,
            body,
        };
        self.session
            .insert(target, SessionDef::Macro(Rc::new(user)));
        Ok(())
    }

    /// The control sequence to define, either bare or in braces.
    fn read_cs_name(&mut self, name: &str, span: Span) -> ParseResult<&'source str> {
        let missing = || error(span, TexErrKind::MissingCS(cs(name)));
        let tok = self.tokens.next()?;
        match *tok.token() {
            Token::Command(target) => Ok(target),
            Token::GroupBegin => {
                let mut tokens = Vec::new();
                self.tokens.read_group(&mut tokens)?;
                let mut names = tokens
                    .iter()
                    .filter(|tok| !matches!(tok.token(), Token::Whitespace));
                match (names.next().map(TokSpan::token), names.next()) {
                    (Some(Token::Command(target)), None) => Ok(*target),
                    _ => Err(missing()),
                }
            }
            Token::ArgEnd => {
                self.tokens.queue_in_front(&[tok]);
                Err(missing())
            }
            _ => Err(missing()),
        }
    }

    /// `\def\name<parameter text>{body}`
    pub(super) fn define(&mut self, span: Span) -> ParseResult<()> {
        let tok = self.tokens.next()?;
        let Token::Command(target) = *tok.token() else {
            if matches!(tok.token(), Token::ArgEnd) {
                self.tokens.queue_in_front(&[tok]);
            }
            return Err(error(span, TexErrKind::MissingCS(cs("def"))));
        };
        let mut prefix = Vec::new();
        let mut delimiters: Vec<Vec<TokSpan<'source>>> = Vec::new();
        let mut params = 0u8;
        loop {
            let tok = self.tokens.next_with_whitespace()?;
            match *tok.token() {
                Token::GroupBegin => break,
                Token::Param(n) => {
                    if n != params + 1 {
                        return Err(error(tok.span(), TexErrKind::IllegalMacroParam));
                    }
                    params = n;
                    delimiters.push(Vec::new());
                }
                Token::Hash => return Err(error(tok.span(), TexErrKind::IllegalMacroParam)),
                Token::Whitespace => {}
                Token::Eoi => return Err(error(span, TexErrKind::MissingArgFor(cs("def")))),
                Token::ArgEnd => {
                    self.tokens.queue_in_front(&[tok]);
                    return Err(error(span, TexErrKind::MissingArgFor(cs("def"))));
                }
                _ => match delimiters.last_mut() {
                    Some(delimiter) => delimiter.push(tok),
                    None => prefix.push(tok),
                },
            }
        }
        let mut body = Vec::new();
        self.tokens.read_group(&mut body)?;
        check_params(&body, params, span)?;
        trace!(name = target, params = params; "def");
        let pattern = (!prefix.is_empty() || delimiters.iter().any(|d| !d.is_empty()))
            .then_some(DefPattern { prefix, delimiters });
        let user = UserMacro {
            params,
            default: None,
            pattern,
            body,
        };
        self.session
            .insert(target, SessionDef::Macro(Rc::new(user)));
        Ok(())
    }

    /// `\let\name=<token>`
    pub(super) fn let_command(&mut self, span: Span) -> ParseResult<()> {
        let tok = self.tokens.next()?;
        let Token::Command(target) = *tok.token() else {
            if matches!(tok.token(), Token::ArgEnd) {
                self.tokens.queue_in_front(&[tok]);
            }
            return Err(error(span, TexErrKind::MissingCS(cs("let"))));
        };
        if self.tokens.peek().token().is_other('=') {
            self.tokens.next()?;
        }
        let value = self.tokens.next()?;
        let def = match *value.token() {
            Token::Command(other) => match self.session.get(other) {
                Some(def) => def.clone(),
                None => match self.packages.command(other) {
                    Some(def) => SessionDef::Alias(*def),
                    None => {
                        return Err(error(
                            value.span(),
                            TexErrKind::UndefinedControlSequence(other.into()),
                        ));
                    }
                },
            },
            Token::Eoi => return Err(error(span, TexErrKind::MissingArgFor(cs("let")))),
            Token::ArgEnd => {
                self.tokens.queue_in_front(&[value]);
                return Err(error(span, TexErrKind::MissingArgFor(cs("let"))));
            }
            _ => SessionDef::Token(value),
        };
        self.session.insert(target, def);
        Ok(())
    }
}

/// Replace the parameters in `body` by the arguments; all other tokens are reported at `span`.
///
/// The expansion may be at most `room` tokens long.
fn substitute<'source>(
    body: &[TokSpan<'source>],
    args: &[Vec<TokSpan<'source>>],
    span: Span,
    room: usize,
) -> ParseResult<Vec<TokSpan<'source>>> {
    let mut tokens = Vec::with_capacity(body.len().min(room));
    for tok in body {
        match tok.token() {
            Token::Param(n) => {
                let arg = args
                    .get(usize::from(*n) - 1)
                    .ok_or_else(|| error(span, TexErrKind::IllegalMacroParam))?;
                if tokens.len() + arg.len() > room {
                    return Err(error(span, TexErrKind::MaxBufferSize));
                }
                tokens.extend_from_slice(arg);
            }
            _ => {
                if tokens.len() >= room {
                    return Err(error(span, TexErrKind::MaxBufferSize));
                }
                tokens.push(tok.with_span(span));
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::super::tests::tree;
    use super::*;

    #[test]
    fn newcommand() {
        assert_snapshot!(
            tree(r"\newcommand{\sq}[1]{#1^2}\sq{x}"),
            @r#"math(mrow*(msup(mi"x" mn"2")))"#
        );
        assert_snapshot!(
            tree(r"\newcommand\f[2][a]{#1+#2}\f{b}\f[c]{d}"),
            @r#"math(mrow*(mi"a" mo"+" mi"b" mi"c" mo"+" mi"d"))"#
        );
        assert_snapshot!(
            tree(r"\newcommand\x{y}\renewcommand\x{z}\x"),
            @r#"math(mrow*(mi"z"))"#
        );
    }

    #[test]
    fn newcommand_errors() {
        assert_snapshot!(tree(r"\newcommand{x}{y}"), @"0: MissingCS");
        assert_snapshot!(tree(r"\newcommand\f[10]{x}"), @"0: IllegalMacroParam");
        assert_snapshot!(tree(r"\newcommand\f{#2}"), @"0: IllegalMacroParam");
        assert_snapshot!(tree(r"\newcommand\f[1]{#1}\f"), @"22: MissingArgFor");
    }

    #[test]
    fn def_with_delimiters() {
        assert_snapshot!(
            tree(r"\def\foo#1.{#1#1}\foo ab."),
            @r#"math(mrow*(mi"a" mi"b" mi"a" mi"b"))"#
        );
        assert_snapshot!(
            tree(r"\def\pair(#1,#2){#2#1}\pair(a,b)"),
            @r#"math(mrow*(mi"b" mi"a"))"#
        );
        assert_snapshot!(tree(r"\def\foo(#1){#1}\foo x"), @"16: MismatchUseDef");
        assert_snapshot!(tree(r"\def\foo#1.{#1}\foo ab"), @"15: RunawayArgument");
        assert_snapshot!(tree(r"\def\foo#2{#2}"), @"8: IllegalMacroParam");
    }

    #[test]
    fn let_and_recursion() {
        assert_snapshot!(tree(r"\let\a=\alpha \a"), @r#"math(mrow*(mi"α"))"#);
        assert_snapshot!(tree(r"\let\b x\b"), @r#"math(mrow*(mi"x"))"#);
        assert_snapshot!(tree(r"\let\a\nothing"), @"6: UndefinedControlSequence");
        assert_snapshot!(tree(r"\def\a{\a}\a"), @"10: MaxMacroSub");
    }

    #[test]
    fn growing_expansion() {
        assert_snapshot!(tree(r"\def\a#1{\a{#1#1}}\a x"), @"18: MaxBufferSize");

        let body = "x".repeat(MAX_BUFFER);
        let tokens = Lexer::new(&body, "").collect_tokens().unwrap();
        let span = Span::zero_width(0);
        assert_eq!(substitute(&tokens, &[], span, MAX_BUFFER).unwrap().len(), MAX_BUFFER);
        let err = substitute(&tokens, &[], span, MAX_BUFFER - 1).unwrap_err();
        assert_eq!(err.1, TexErrKind::MaxBufferSize);
    }

    #[test]
    fn argument_stripping() {
        let tokens = Lexer::new(" {a}{b} ", "").collect_tokens().unwrap();
        assert_eq!(tokens_to_string(&strip_argument(tokens)), "{a}{b}");
        let tokens = Lexer::new("{ab}", "").collect_tokens().unwrap();
        assert_eq!(tokens_to_string(&strip_argument(tokens)), "ab");
    }

    #[test]
    fn config_macro_names() {
        assert!(is_command_name("foo"));
        assert!(is_command_name(r"\foo"));
        assert!(is_command_name("|"));
        assert!(!is_command_name("foo1"));
        assert!(!is_command_name(""));
        let config = ConfigMacro::new("RR", r"\mathbb{R}^#2", "~").unwrap();
        assert_eq!(config.params, 2);
    }
}
