//! The stack machine that turns tokens into a tree.
//!
//! Every open construct (a brace group, an argument, `\left`, an environment, a pending script,
//! a style switch) is a [`Frame`] on the stack. Tokens are read one at a time; leaf tokens append
//! nodes to the top frame, openers push a frame and closers pop one and hand the finished node to
//! the frame below. Command arguments are parsed by running the same loop until the argument
//! frame is closed again.

mod commands;
mod environments;
mod macros;
mod text;

use std::mem;

use log::trace;
use regex::Regex;
use rustc_hash::FxHashMap;

use math_tree::{
    Attr, Length, MathVariant, NodeId, NodeKind, PropValue, Property, TexClass, TreeBuilder,
};

use crate::class::clean_tree;
use crate::digits::{is_number_char, match_number, number_text};
use crate::dimen::{match_dimen, parse_dimen};
use crate::error::{ParseResult, TexErrKind, TexError, make_error};
use crate::lexer::Lexer;
use crate::packages::PackageList;
use crate::symbols::{CharDef, Def, OverKind};
use crate::tags::{TagCounter, TagManager, TagStyle};
use crate::token::{Span, TokSpan, Token};
use crate::token_queue::TokenQueue;

use self::environments::ArrayState;
pub(crate) use self::macros::{ConfigMacro, is_command_name};
use self::macros::SessionDef;

/// Maximum number of open frames.
const MAX_NESTING: usize = 256;
/// Maximum number of tokens waiting in the token buffer after a macro expansion.
const MAX_BUFFER: usize = 5 * 1024;
/// Maximum number of arguments that are being parsed inside each other.
const MAX_ARG_DEPTH: usize = 64;

/// Everything a parse needs from the converter; all of it is immutable.
pub(crate) struct Settings<'source> {
    pub packages: &'source PackageList,
    pub active: &'source str,
    pub digits: &'source Regex,
    pub tag_style: TagStyle,
    pub macros: &'source [ConfigMacro],
    pub max_macros: usize,
}

/// Parse `input` into a `math` node.
///
/// Returns the numbering state to carry over to the next formula. A failed parse leaves the
/// numbering state untouched.
pub(crate) fn parse<'source, B: TreeBuilder + ?Sized>(
    input: &'source str,
    display: bool,
    settings: &Settings<'source>,
    builder: &mut B,
    counter: TagCounter,
) -> (ParseResult<NodeId>, TagCounter) {
    let saved = counter.clone();
    let tokens = match TokenQueue::new(Lexer::new(input, settings.active), input.len()) {
        Ok(tokens) => tokens,
        Err(err) => return (Err(err), saved),
    };
    let mut parser = Parser {
        tokens,
        builder,
        packages: settings.packages,
        active: settings.active,
        digits: settings.digits,
        config_macros: settings.macros,
        session: FxHashMap::default(),
        colors: FxHashMap::default(),
        stack: Vec::new(),
        tags: TagManager::new(settings.tag_style, counter, display),
        expansions: 0,
        max_macros: settings.max_macros,
        arg_depth: 0,
        arg_result: None,
        renders_undefined: settings.packages.renders_undefined(),
    };
    match parser.parse_root(display) {
        Ok(root) => (Ok(root), parser.tags.into_counter()),
        Err(err) => (Err(err), saved),
    }
}

#[inline]
pub(crate) fn error(span: Span, kind: TexErrKind) -> Box<TexError> {
    Box::new(TexError(span.into(), kind))
}

/// The name of a control sequence as it is written, for error messages.
#[inline]
pub(crate) fn cs(name: &str) -> Box<str> {
    format!("\\{name}").into_boxed_str()
}

/// The text of a token list, with control sequences written out.
pub(crate) fn tokens_to_string(tokens: &[TokSpan]) -> String {
    let mut text = String::new();
    for tok in tokens {
        match tok.token() {
            Token::Command(name) => {
                text.push('\\');
                text.push_str(name);
            }
            Token::GroupBegin => text.push('{'),
            Token::GroupEnd => text.push('}'),
            Token::Param(n) => {
                text.push('#');
                text.push(char::from(b'0' + n));
            }
            other => {
                if let Some(ch) = other.as_char() {
                    text.push(ch);
                }
            }
        }
    }
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Sub,
    Sup,
}

impl Position {
    fn double(self) -> TexErrKind {
        match self {
            Position::Sub => TexErrKind::DoubleSubscripts,
            Position::Sup => TexErrKind::DoubleExponent,
        }
    }

    fn missing_open(self) -> TexErrKind {
        match self {
            Position::Sub => TexErrKind::MissingOpenForSub,
            Position::Sup => TexErrKind::MissingOpenForSup,
        }
    }
}

/// A base waiting for its sub- or superscript.
#[derive(Debug)]
struct ScriptState {
    base: NodeId,
    sub: Option<NodeId>,
    sup: Option<NodeId>,
    /// Primes that are merged into the superscript.
    primes: Option<NodeId>,
    pending: Position,
    /// Build `munder`/`mover` instead of `msub`/`msup`.
    limits: bool,
    /// The base was a function like `\sin`.
    was_fn: bool,
}

/// A fraction from `\over` and friends; the numerator is everything before the command.
#[derive(Debug)]
struct OverState {
    kind: OverKind,
    numerator: NodeId,
    delims: Option<(String, String)>,
    thickness: Option<Length>,
}

#[derive(Debug)]
enum FrameKind {
    /// The whole formula.
    Start,
    /// `{...}`
    Group,
    /// A command argument; `sentinel` arguments end at [`Token::ArgEnd`] instead of `}`.
    Arg { sentinel: bool },
    /// `\left ... \right`
    Left { open: NodeId },
    Env(Box<ArrayState>),
    Script(Box<ScriptState>),
    /// The rest of the group is wrapped in `mstyle` with these attributes.
    Style(Vec<(Attr, String)>),
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    nodes: Vec<NodeId>,
    font: Option<MathVariant>,
    /// Runs of letters form a single identifier (`\mathrm{sin}`).
    merge_letters: bool,
    /// A function name was pushed last; the next atom is its argument.
    fn_pending: bool,
    /// `\not` was seen at this position.
    not_pending: Option<Span>,
    over: Option<Box<OverState>>,
    /// The last node in `nodes` was built from a script and may still take primes or another
    /// script.
    last_script: Option<NodeId>,
    span: Span,
}

pub(crate) struct Parser<'source, 'b, B: TreeBuilder + ?Sized> {
    tokens: TokenQueue<'source>,
    builder: &'b mut B,
    packages: &'source PackageList,
    active: &'source str,
    digits: &'source Regex,
    config_macros: &'source [ConfigMacro],
    /// Definitions made during this parse; they shadow all packages.
    session: FxHashMap<&'source str, SessionDef<'source>>,
    /// Colours from `\definecolor`.
    colors: FxHashMap<String, String>,
    stack: Vec<Frame>,
    tags: TagManager,
    expansions: usize,
    max_macros: usize,
    arg_depth: usize,
    /// The node of the argument (or formula) that was closed last.
    arg_result: Option<NodeId>,
    renders_undefined: bool,
}

impl<'source, B: TreeBuilder + ?Sized> Parser<'source, '_, B> {
    fn parse_root(&mut self, display: bool) -> ParseResult<NodeId> {
        self.load_config_macros()?;
        let start = Span::zero_width(0);
        self.push_frame(FrameKind::Start, start)?;
        self.run_until(0)?;
        let content = self.take_arg_result(start)?;
        let content = match self.tags.finish_tag(&mut *self.builder) {
            Some(tag) => self.labeled_table(tag, content),
            None => content,
        };
        let attrs: &[(Attr, &str)] = if display {
            &[(Attr::Display, "block")]
        } else {
            &[]
        };
        let math = self
            .builder
            .create_node(NodeKind::Math, &[content], attrs, None);
        clean_tree(&mut *self.builder, math);
        self.tags.resolve_refs(&mut *self.builder);
        Ok(math)
    }

    /// A one-row table carrying an equation number.
    fn labeled_table(&mut self, tag: NodeId, content: NodeId) -> NodeId {
        let cell = self
            .builder
            .create_node(NodeKind::Mtd, &[content], &[], None);
        let row = self
            .builder
            .create_node(NodeKind::Mlabeledtr, &[tag, cell], &[], None);
        self.builder.create_node(
            NodeKind::Mtable,
            &[row],
            &[(Attr::Displaystyle, "true"), (Attr::Side, "right")],
            None,
        )
    }

    fn run_until(&mut self, depth: usize) -> ParseResult<()> {
        while self.stack.len() > depth {
            let tok = self.tokens.next()?;
            self.step(tok)?;
        }
        Ok(())
    }

    fn step(&mut self, tok: TokSpan<'source>) -> ParseResult<()> {
        let (token, span) = tok.into_parts();
        match token {
            Token::Eoi => self.end_of_input(span, false),
            Token::ArgEnd => self.end_of_input(span, true),
            Token::Whitespace => Ok(()),
            Token::GroupBegin => self.push_frame(FrameKind::Group, span),
            Token::GroupEnd => self.group_end(span),
            Token::Circumflex => self.script(Position::Sup, span),
            Token::Underscore => self.script(Position::Sub, span),
            Token::Prime => self.primes(span),
            Token::Ampersand => self.ampersand(span),
            Token::Param(_) | Token::Hash => Err(error(span, TexErrKind::CantUseHash)),
            Token::Command(name) => self.command(name, span),
            Token::Active(ch) => self.character(ch, span),
            Token::Letter(ch) => self.letter(ch, span),
            Token::Digit(ch) => {
                if !self.number(ch, span)? {
                    let node = self.token_node(NodeKind::Mn, &ch.to_string());
                    self.push(node)?;
                }
                Ok(())
            }
            Token::Other(ch) => {
                if matches!(ch, '.' | ',')
                    && matches!(
                        self.tokens.peek_nth_with_whitespace(0)?.token(),
                        Token::Digit(_)
                    )
                    && self.number(ch, span)?
                {
                    return Ok(());
                }
                self.character(ch, span)
            }
        }
    }

    fn command(&mut self, name: &'source str, span: Span) -> ParseResult<()> {
        if let Some(def) = self.session.get(name).cloned() {
            return match def {
                SessionDef::Macro(user) => self.expand_user_macro(&user, name, span),
                SessionDef::Alias(def) => self.apply_def(def, name, span),
                SessionDef::Token(tok) => {
                    self.count_expansion(span)?;
                    self.tokens.queue_in_front(&[tok.with_span(span)]);
                    Ok(())
                }
            };
        }
        if let Some(def) = self.packages.command(name) {
            return self.apply_def(*def, name, span);
        }
        if self.renders_undefined {
            let node = self.builder.create_node(
                NodeKind::Mtext,
                &[],
                &[(Attr::Mathcolor, "red")],
                Some(&cs(name)),
            );
            return self.push(node);
        }
        Err(error(span, TexErrKind::UndefinedControlSequence(name.into())))
    }

    fn apply_def(&mut self, def: Def, name: &str, span: Span) -> ParseResult<()> {
        match def {
            Def::Char(char_def) | Def::Delim(char_def) => {
                let node = self.char_node(&char_def);
                self.push(node)
            }
            Def::Macro(macro_def) => self.expand_package_macro(macro_def, name, span),
            Def::Prim(prim) => self.primitive(prim, name, span),
            Def::Env(env) => self.begin_command_env(env, name, span),
        }
    }

    /// A character that is not a letter or a digit (or an active character).
    fn character(&mut self, ch: char, span: Span) -> ParseResult<()> {
        if let Some(def) = self.packages.char(ch) {
            let mut buf = [0u8; 4];
            return self.apply_def(*def, ch.encode_utf8(&mut buf), span);
        }
        let node = self.token_node(NodeKind::Mo, &ch.to_string());
        self.builder.set_tex_class(node, TexClass::Ord);
        self.push(node)
    }

    fn letter(&mut self, ch: char, span: Span) -> ParseResult<()> {
        if let Some(def) = self.packages.char(ch) {
            let mut buf = [0u8; 4];
            return self.apply_def(*def, ch.encode_utf8(&mut buf), span);
        }
        let mut text = String::from(ch);
        if self.top().merge_letters && ch.is_ascii_alphabetic() {
            while let Token::Letter(next) = *self.tokens.peek_nth_with_whitespace(0)?.token()
                && next.is_ascii_alphabetic()
            {
                text.push(next);
                self.tokens.next()?;
            }
        }
        let node = self.token_node(NodeKind::Mi, &text);
        self.push(node)
    }

    /// Try to read a number starting with `first`, which has already been consumed.
    ///
    /// Returns `false` if the digit pattern does not match, in which case nothing is consumed.
    fn number(&mut self, first: char, span: Span) -> ParseResult<bool> {
        let mut candidate = String::from(first);
        let mut ends = vec![span.end()];
        if !matches!(self.top().kind, FrameKind::Script(_)) {
            let mut n = 0;
            loop {
                let tok = self.tokens.peek_nth_with_whitespace(n)?;
                let ch = match tok.token() {
                    Token::Digit(ch) | Token::Other(ch) => *ch,
                    Token::GroupBegin => '{',
                    Token::GroupEnd => '}',
                    _ => break,
                };
                if !is_number_char(ch) {
                    break;
                }
                candidate.push(ch);
                ends.push(tok.span().end());
                n += 1;
            }
        }
        let Some(mut len) = match_number(self.digits, &candidate) else {
            return Ok(false);
        };
        if !braces_balanced(&candidate[..len]) {
            len = candidate.bytes().take_while(u8::is_ascii_digit).count();
            if len == 0 {
                return Ok(false);
            }
        }
        if len < candidate.len() {
            trace!(candidate = candidate.as_str(), len = len; "number split");
        }
        for _ in 1..len {
            self.tokens.next_with_whitespace()?;
        }
        let node = self.token_node(NodeKind::Mn, &number_text(&candidate[..len]));
        self.push(node)?;
        Ok(true)
    }

    /// A token node in the current font.
    fn token_node(&mut self, kind: NodeKind, text: &str) -> NodeId {
        let node = self.builder.create_node(kind, &[], &[], Some(text));
        if let Some(font) = self.top().font {
            self.builder
                .set_attribute(node, Attr::Mathvariant, font.into());
        }
        node
    }

    fn char_node(&mut self, def: &CharDef) -> NodeId {
        let node = self
            .builder
            .create_node(def.kind, &[], def.attrs, Some(def.text));
        if def.kind == NodeKind::Mo {
            self.builder.set_tex_class(node, def.class);
        }
        if let Some(family) = def.family {
            self.builder.set_property(
                node,
                Property::RelFamily,
                PropValue::from(<&str>::from(family)),
            );
        }
        if def.limits {
            self.builder
                .set_property(node, Property::MoveSupSub, PropValue::Bool(true));
        }
        if let Some(font) = self.top().font {
            self.builder
                .set_attribute(node, Attr::Mathvariant, font.into());
        }
        node
    }

    // Frames

    #[inline]
    fn top(&self) -> &Frame {
        // Handlers only run while a frame is open.
        &self.stack[self.stack.len() - 1]
    }

    #[inline]
    fn top_mut(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_frame(&mut self, kind: FrameKind, span: Span) -> ParseResult<()> {
        if self.stack.len() >= MAX_NESTING {
            return Err(error(span, TexErrKind::MaxNesting));
        }
        let (font, merge_letters) = self
            .stack
            .last()
            .map_or((None, false), |frame| (frame.font, frame.merge_letters));
        self.stack.push(Frame {
            kind,
            nodes: Vec::new(),
            font,
            merge_letters,
            fn_pending: false,
            not_pending: None,
            over: None,
            last_script: None,
            span,
        });
        Ok(())
    }

    fn pop_frame(&mut self, span: Span) -> ParseResult<Frame> {
        self.stack
            .pop()
            .ok_or_else(|| error(span, TexErrKind::Internal))
    }

    fn take_arg_result(&mut self, span: Span) -> ParseResult<NodeId> {
        self.arg_result
            .take()
            .ok_or_else(|| error(span, TexErrKind::Internal))
    }

    /// Wrap several nodes in an inferred row; a single node is returned as is.
    fn row_node(&mut self, nodes: &[NodeId]) -> NodeId {
        match nodes {
            [single] => *single,
            _ => {
                let row = self.builder.create_node(NodeKind::Mrow, nodes, &[], None);
                self.builder
                    .set_property(row, Property::Inferred, PropValue::Bool(true));
                row
            }
        }
    }

    /// Take the content of a frame as a single node, completing a pending `\over`.
    fn finish_nodes(&mut self, frame: &mut Frame) -> ParseResult<NodeId> {
        if let Some(span) = frame.not_pending.take() {
            return Err(error(span, TexErrKind::ExpectedRelation));
        }
        let nodes = mem::take(&mut frame.nodes);
        frame.last_script = None;
        frame.fn_pending = false;
        match frame.over.take() {
            Some(over) => Ok(self.build_over(*over, &nodes)),
            None => Ok(self.row_node(&nodes)),
        }
    }

    /// Append a finished node to the top frame.
    pub(crate) fn push(&mut self, node: NodeId) -> ParseResult<()> {
        if matches!(self.top().kind, FrameKind::Script(_)) {
            return self.fill_script(node);
        }
        let node = match self.top_mut().not_pending.take() {
            Some(span) => self.negate(node, span)?,
            None => node,
        };
        if mem::take(&mut self.top_mut().fn_pending) && !self.ends_function(node) {
            let apply = self
                .builder
                .create_node(NodeKind::Mo, &[], &[], Some("\u{2061}"));
            self.builder.set_tex_class(apply, TexClass::None);
            self.top_mut().nodes.push(apply);
        }
        self.top_mut().nodes.push(node);
        Ok(())
    }

    /// Push a function name like `\sin`; the next atom becomes its argument.
    fn push_function(&mut self, node: NodeId) -> ParseResult<()> {
        let fills_script = matches!(self.top().kind, FrameKind::Script(_));
        self.push(node)?;
        if !fills_script {
            self.top_mut().fn_pending = true;
        }
        Ok(())
    }

    /// Atoms after which no function application is inserted.
    fn ends_function(&self, node: NodeId) -> bool {
        let builder = &*self.builder;
        match builder.kind(node) {
            NodeKind::Mspace => return true,
            NodeKind::Mstyle => {
                let first = builder
                    .get_children(node)
                    .first()
                    .and_then(|&row| builder.get_children(row).first());
                if first.is_some_and(|&child| builder.is_kind(child, NodeKind::Mspace)) {
                    return true;
                }
            }
            _ => {}
        }
        matches!(
            builder.tex_class(node),
            TexClass::Bin | TexClass::Rel | TexClass::Close | TexClass::Punct
        )
    }

    /// Apply `\not` to a relation.
    fn negate(&mut self, node: NodeId, span: Span) -> ParseResult<NodeId> {
        let core = self.builder.core_mo(node);
        if !self.builder.is_kind(core, NodeKind::Mo) || self.builder.tex_class(core) != TexClass::Rel
        {
            return Err(error(span, TexErrKind::ExpectedRelation));
        }
        let text = self.builder.text(core).unwrap_or("");
        let negated = match negated_relation(text) {
            Some(negated) => negated.to_string(),
            None => format!("{text}\u{338}"),
        };
        let replacement = self
            .builder
            .create_node(NodeKind::Mo, &[], &[], Some(&negated));
        self.builder.copy_attributes(core, replacement);
        self.builder.set_tex_class(replacement, TexClass::Rel);
        if core == node {
            return Ok(replacement);
        }
        if let Some(parent) = self.builder.parent(core) {
            let children: Vec<NodeId> = self
                .builder
                .get_children(parent)
                .iter()
                .map(|&child| if child == core { replacement } else { child })
                .collect();
            self.builder.set_children(parent, &children);
        }
        Ok(node)
    }

    // Scripts

    fn script(&mut self, position: Position, span: Span) -> ParseResult<()> {
        if let FrameKind::Script(state) = &self.top().kind {
            let kind = if state.pending == position {
                position.double()
            } else {
                state.pending.missing_open()
            };
            return Err(error(span, kind));
        }
        let frame = self.top_mut();
        let was_fn = mem::take(&mut frame.fn_pending);
        let previous = frame.nodes.pop();
        let is_script = previous.is_some() && previous == frame.last_script.take();
        let mut state = match previous {
            Some(node) if is_script => self.decompose_script(node),
            Some(node) => {
                let core = self.builder.core_mo(node);
                let limits = self.builder.has_flag(node, Property::MoveSupSub)
                    || (core != node && self.builder.has_flag(core, Property::MoveSupSub));
                ScriptState::new(node, limits)
            }
            None => {
                let empty = self.builder.create_node(NodeKind::Mi, &[], &[], None);
                ScriptState::new(empty, false)
            }
        };
        let taken = match position {
            Position::Sub => state.sub.is_some(),
            Position::Sup => state.sup.is_some(),
        };
        if taken {
            return Err(error(span, position.double()));
        }
        state.pending = position;
        state.was_fn = was_fn;
        self.push_frame(FrameKind::Script(Box::new(state)), span)
    }

    /// Take apart a script node so that another script can be added to it.
    fn decompose_script(&self, node: NodeId) -> ScriptState {
        let children = self.builder.get_children(node);
        let child = |i: usize| children.get(i).copied();
        let kind = self.builder.kind(node);
        let limits = matches!(
            kind,
            NodeKind::Munder | NodeKind::Mover | NodeKind::Munderover
        );
        let (sub, sup) = match kind {
            NodeKind::Msub | NodeKind::Munder => (child(1), None),
            NodeKind::Msup | NodeKind::Mover => (None, child(1)),
            NodeKind::Msubsup | NodeKind::Munderover => (child(1), child(2)),
            _ => return ScriptState::new(node, false),
        };
        let mut state = ScriptState::new(child(0).unwrap_or(node), limits);
        state.sub = sub;
        if self.builder.has_flag(node, Property::Primes) {
            state.primes = sup;
        } else {
            state.sup = sup;
        }
        state
    }

    fn fill_script(&mut self, value: NodeId) -> ParseResult<()> {
        let frame = self.pop_frame(Span::default())?;
        let FrameKind::Script(mut state) = frame.kind else {
            return Err(error(frame.span, TexErrKind::Internal));
        };
        match state.pending {
            Position::Sub => state.sub = Some(value),
            Position::Sup => {
                state.sup = Some(match state.primes.take() {
                    Some(primes) => {
                        self.builder
                            .create_node(NodeKind::Mrow, &[primes, value], &[], None)
                    }
                    None => value,
                });
            }
        }
        let node = self.build_script(&state);
        let parent = self.top_mut();
        parent.nodes.push(node);
        parent.last_script = Some(node);
        parent.fn_pending = state.was_fn;
        Ok(())
    }

    fn build_script(&mut self, state: &ScriptState) -> NodeId {
        let sup = state.sup.or(state.primes);
        let (kind, children) = match (state.sub, sup) {
            (Some(sub), Some(sup)) => {
                let kind = if state.limits {
                    NodeKind::Munderover
                } else {
                    NodeKind::Msubsup
                };
                (kind, vec![state.base, sub, sup])
            }
            (Some(sub), None) => {
                let kind = if state.limits {
                    NodeKind::Munder
                } else {
                    NodeKind::Msub
                };
                (kind, vec![state.base, sub])
            }
            (None, Some(sup)) => {
                let kind = if state.limits {
                    NodeKind::Mover
                } else {
                    NodeKind::Msup
                };
                (kind, vec![state.base, sup])
            }
            (None, None) => return state.base,
        };
        let node = self.builder.create_node(kind, &children, &[], None);
        if state.sup.is_none() && state.primes.is_some() {
            self.builder
                .set_property(node, Property::Primes, PropValue::Bool(true));
        }
        node
    }

    fn primes(&mut self, span: Span) -> ParseResult<()> {
        let mut count = 1;
        while matches!(self.tokens.peek().token(), Token::Prime) {
            self.tokens.next()?;
            count += 1;
        }
        let text = "\u{2032}"
            .repeat(count)
            .replace("\u{2032}\u{2032}\u{2032}\u{2032}", "\u{2057}")
            .replace("\u{2032}\u{2032}\u{2032}", "\u{2034}")
            .replace("\u{2032}\u{2032}", "\u{2033}");
        let prime = self.builder.create_node(NodeKind::Mo, &[], &[], Some(&text));
        if matches!(self.top().kind, FrameKind::Script(_)) {
            return self.push(prime);
        }
        let frame = self.top_mut();
        let was_fn = mem::take(&mut frame.fn_pending);
        let previous = frame.nodes.pop();
        let is_script = previous.is_some() && previous == frame.last_script.take();
        let node = match previous {
            Some(node) if is_script => {
                let children = self.builder.get_children(node).to_vec();
                let kind = match self.builder.kind(node) {
                    NodeKind::Msub => NodeKind::Msubsup,
                    NodeKind::Munder => NodeKind::Munderover,
                    _ => return Err(error(span, TexErrKind::DoubleExponentPrime)),
                };
                let mut children = children;
                children.push(prime);
                self.builder.create_node(kind, &children, &[], None)
            }
            Some(node) => self
                .builder
                .create_node(NodeKind::Msup, &[node, prime], &[], None),
            None => {
                let empty = self.builder.create_node(NodeKind::Mi, &[], &[], None);
                self.builder
                    .create_node(NodeKind::Msup, &[empty, prime], &[], None)
            }
        };
        self.builder
            .set_property(node, Property::Primes, PropValue::Bool(true));
        let frame = self.top_mut();
        frame.nodes.push(node);
        frame.last_script = Some(node);
        frame.fn_pending = was_fn;
        Ok(())
    }

    // Closers

    /// Close pending style switches before the group they belong to is closed.
    ///
    /// A pending script cannot be completed by a closer; `hard` closers report a missing script,
    /// other commands a missing brace.
    fn close_styles(&mut self, span: Span, hard: bool) -> ParseResult<()> {
        loop {
            match &self.top().kind {
                FrameKind::Style(_) => {
                    let mut frame = self.pop_frame(span)?;
                    let content = self.finish_nodes(&mut frame)?;
                    let FrameKind::Style(attrs) = frame.kind else {
                        return Err(error(span, TexErrKind::Internal));
                    };
                    let attrs: Vec<(Attr, &str)> = attrs
                        .iter()
                        .map(|(attr, value)| (*attr, value.as_str()))
                        .collect();
                    let node = self
                        .builder
                        .create_node(NodeKind::Mstyle, &[content], &attrs, None);
                    self.push(node)?;
                }
                FrameKind::Script(state) => {
                    let kind = if hard {
                        TexErrKind::MissingScript
                    } else {
                        state.pending.missing_open()
                    };
                    return Err(error(span, kind));
                }
                _ => return Ok(()),
            }
        }
    }

    /// The error for a frame that is still open when it cannot be closed any more.
    fn unclosed(frame: &Frame) -> Box<TexError> {
        let kind = match &frame.kind {
            FrameKind::Group | FrameKind::Arg { .. } => TexErrKind::ExtraOpenMissingClose,
            FrameKind::Left { .. } => TexErrKind::ExtraLeftMissingRight,
            FrameKind::Env(state) if state.command_form => TexErrKind::ExtraOpenMissingClose,
            FrameKind::Env(state) => TexErrKind::EnvMissingEnd(state.name.clone()),
            FrameKind::Start | FrameKind::Script(_) | FrameKind::Style(_) => TexErrKind::Internal,
        };
        error(frame.span, kind)
    }

    fn group_end(&mut self, span: Span) -> ParseResult<()> {
        self.close_styles(span, true)?;
        let mut frame = self.pop_frame(span)?;
        match frame.kind {
            FrameKind::Group => {
                let content = self.finish_nodes(&mut frame)?;
                let atom = self
                    .builder
                    .create_node(NodeKind::TeXAtom, &[content], &[], None);
                self.builder.set_tex_class(atom, TexClass::Ord);
                self.push(atom)
            }
            FrameKind::Arg { sentinel: false } => {
                let content = self.finish_nodes(&mut frame)?;
                self.arg_result = Some(content);
                Ok(())
            }
            FrameKind::Env(ref state) if state.command_form => self.finish_env(frame, span),
            FrameKind::Left { .. } => Err(error(span, TexErrKind::ExtraLeftMissingRight)),
            _ => Err(error(span, TexErrKind::ExtraCloseMissingOpen)),
        }
    }

    /// End of the input, or of a sentinel-delimited argument.
    fn end_of_input(&mut self, span: Span, arg_end: bool) -> ParseResult<()> {
        self.close_styles(span, true)?;
        let mut frame = self.pop_frame(span)?;
        let closes = matches!(
            (&frame.kind, arg_end),
            (FrameKind::Start, false) | (FrameKind::Arg { sentinel: true }, true)
        );
        if !closes {
            return Err(Self::unclosed(&frame));
        }
        let content = self.finish_nodes(&mut frame)?;
        self.arg_result = Some(content);
        Ok(())
    }

    // Delimiters

    fn fence_node(&mut self, text: &str, class: TexClass) -> NodeId {
        let node = self.builder.create_node(
            NodeKind::Mo,
            &[],
            &[
                (Attr::Fence, "true"),
                (Attr::Stretchy, "true"),
                (Attr::Symmetric, "true"),
            ],
            Some(text),
        );
        self.builder.set_tex_class(node, class);
        node
    }

    /// `content` between fixed delimiters; empty delimiters are left out.
    fn fenced(&mut self, open: &str, content: NodeId, close: &str) -> NodeId {
        let mut children = Vec::with_capacity(3);
        if !open.is_empty() {
            children.push(self.fence_node(open, TexClass::Open));
        }
        children.push(content);
        if !close.is_empty() {
            children.push(self.fence_node(close, TexClass::Close));
        }
        let row = self
            .builder
            .create_node(NodeKind::Mrow, &children, &[], None);
        self.builder.set_tex_class(row, TexClass::Inner);
        row
    }

    /// Read the delimiter after `\left`, `\big` and friends; `.` is the empty delimiter.
    fn read_delimiter(&mut self, name: &str) -> ParseResult<String> {
        let tok = self.tokens.next()?;
        let (token, span) = tok.into_parts();
        let def = match token {
            Token::Other('.') => return Ok(String::new()),
            Token::Other('<') => return Ok("\u{27E8}".to_string()),
            Token::Other('>') => return Ok("\u{27E9}".to_string()),
            Token::Other(ch) | Token::Letter(ch) | Token::Active(ch) => self.packages.char(ch),
            Token::Command(name) => match self.session.get(name) {
                Some(SessionDef::Alias(def)) => Some(def),
                _ => self.packages.command(name),
            },
            Token::ArgEnd => {
                self.tokens.queue_in_front(&[tok]);
                None
            }
            _ => None,
        };
        match def {
            Some(Def::Delim(char_def)) => Ok(char_def.text.to_string()),
            Some(Def::Char(char_def)) if char_def.kind == NodeKind::Mo => {
                Ok(char_def.text.to_string())
            }
            _ => Err(error(
                span,
                TexErrKind::MissingOrUnrecognizedDelim(cs(name)),
            )),
        }
    }

    fn left(&mut self, span: Span) -> ParseResult<()> {
        let delim = self.read_delimiter("left")?;
        let open = self.fence_node(&delim, TexClass::Open);
        self.push_frame(FrameKind::Left { open }, span)
    }

    fn right(&mut self, span: Span) -> ParseResult<()> {
        let delim = self.read_delimiter("right")?;
        self.close_styles(span, true)?;
        if !matches!(self.top().kind, FrameKind::Left { .. }) {
            return Err(error(span, TexErrKind::MissingLeftExtraRight));
        }
        let mut frame = self.pop_frame(span)?;
        let content = self.finish_nodes(&mut frame)?;
        let FrameKind::Left { open } = frame.kind else {
            return Err(error(span, TexErrKind::Internal));
        };
        let close = self.fence_node(&delim, TexClass::Close);
        let open_text = self.builder.text(open).unwrap_or("").to_string();
        let row = self
            .builder
            .create_node(NodeKind::Mrow, &[open, content, close], &[], None);
        self.builder.set_tex_class(row, TexClass::Inner);
        self.builder
            .set_property(row, Property::Open, PropValue::from(open_text.as_str()));
        self.builder
            .set_property(row, Property::Close, PropValue::from(delim.as_str()));
        self.push(row)
    }

    fn middle(&mut self, span: Span) -> ParseResult<()> {
        let delim = self.read_delimiter("middle")?;
        self.close_styles(span, true)?;
        if !matches!(self.top().kind, FrameKind::Left { .. }) {
            return Err(error(span, TexErrKind::ExtraMiddle));
        }
        let close = self.builder.create_node(NodeKind::TeXAtom, &[], &[], None);
        self.builder.set_tex_class(close, TexClass::Close);
        let mo = self.builder.create_node(
            NodeKind::Mo,
            &[],
            &[(Attr::Stretchy, "true"), (Attr::Symmetric, "true")],
            Some(&delim),
        );
        let open = self.builder.create_node(NodeKind::TeXAtom, &[], &[], None);
        self.builder.set_tex_class(open, TexClass::Open);
        let frame = self.top_mut();
        frame.nodes.extend([close, mo, open]);
        frame.last_script = None;
        Ok(())
    }

    // Fractions made with `\over`

    fn over(&mut self, kind: OverKind, name: &str, span: Span) -> ParseResult<()> {
        if let FrameKind::Script(state) = &self.top().kind {
            return Err(error(span, state.pending.missing_open()));
        }
        if self.top().over.is_some() {
            return Err(error(span, TexErrKind::AmbiguousUseOf(cs(name))));
        }
        let delims = if kind.reads_delims() {
            Some((self.read_delimiter(name)?, self.read_delimiter(name)?))
        } else {
            kind.delims()
                .map(|(open, close)| (open.to_string(), close.to_string()))
        };
        let thickness = if kind.reads_thickness() {
            Some(self.read_dimen(name, span)?)
        } else {
            None
        };
        let mut frame = self.pop_frame(span)?;
        let numerator = self.finish_nodes(&mut frame);
        self.stack.push(frame);
        let numerator = numerator?;
        self.top_mut().over = Some(Box::new(OverState {
            kind,
            numerator,
            delims,
            thickness,
        }));
        Ok(())
    }

    fn build_over(&mut self, over: OverState, denominator: &[NodeId]) -> NodeId {
        let denominator = self.row_node(denominator);
        let thickness = over.thickness.map(|length| length.to_string());
        let mut attrs: Vec<(Attr, &str)> = Vec::new();
        if over.kind.has_no_rule() {
            attrs.push((Attr::Linethickness, "0"));
        } else if let Some(thickness) = &thickness {
            attrs.push((Attr::Linethickness, thickness));
        }
        let frac = self.builder.create_node(
            NodeKind::Mfrac,
            &[over.numerator, denominator],
            &attrs,
            None,
        );
        match &over.delims {
            Some((open, close)) => self.fenced(open, frac, close),
            None => frac,
        }
    }

    // Arguments

    /// Parse one argument: a group, or a single token.
    pub(crate) fn parse_arg(&mut self, name: &str) -> ParseResult<NodeId> {
        self.parse_arg_with(name, |_| {})
    }

    /// Parse one argument, adjusting the argument's frame first (e.g. to set a font).
    fn parse_arg_with(&mut self, name: &str, setup: impl FnOnce(&mut Frame)) -> ParseResult<NodeId> {
        let tok = self.tokens.next()?;
        let span = tok.span();
        let sentinel = match tok.token() {
            Token::GroupBegin => false,
            Token::GroupEnd => return Err(error(span, TexErrKind::ExtraCloseMissingOpen)),
            Token::Eoi => return Err(error(span, TexErrKind::MissingArgFor(cs(name)))),
            Token::ArgEnd => {
                self.tokens.queue_in_front(&[tok]);
                return Err(error(span, TexErrKind::MissingArgFor(cs(name))));
            }
            _ => {
                let end = TokSpan::new(Token::ArgEnd, Span::zero_width(span.end()));
                self.tokens.queue_in_front(&[tok, end]);
                true
            }
        };
        self.run_arg(FrameKind::Arg { sentinel }, span, setup)
    }

    /// Parse a list of tokens that was read ahead, e.g. an optional argument.
    fn parse_tokens(&mut self, tokens: Vec<TokSpan<'source>>, span: Span) -> ParseResult<NodeId> {
        self.parse_tokens_with(tokens, span, |_| {})
    }

    fn parse_tokens_with(
        &mut self,
        mut tokens: Vec<TokSpan<'source>>,
        span: Span,
        setup: impl FnOnce(&mut Frame),
    ) -> ParseResult<NodeId> {
        tokens.push(TokSpan::new(Token::ArgEnd, Span::zero_width(span.end())));
        self.tokens.queue_in_front(&tokens);
        self.run_arg(FrameKind::Arg { sentinel: true }, span, setup)
    }

    fn run_arg(
        &mut self,
        kind: FrameKind,
        span: Span,
        setup: impl FnOnce(&mut Frame),
    ) -> ParseResult<NodeId> {
        if self.arg_depth >= MAX_ARG_DEPTH {
            return Err(error(span, TexErrKind::MaxNesting));
        }
        self.arg_depth += 1;
        let depth = self.stack.len();
        self.push_frame(kind, span)?;
        setup(self.top_mut());
        self.run_until(depth)?;
        self.arg_depth -= 1;
        self.take_arg_result(span)
    }

    /// Read an argument as tokens without parsing it; braces around a group are dropped.
    fn read_raw_arg(&mut self, name: &str) -> ParseResult<Vec<TokSpan<'source>>> {
        let tok = self.tokens.next()?;
        match tok.token() {
            Token::GroupBegin => {
                let mut tokens = Vec::new();
                self.tokens.read_group(&mut tokens)?;
                Ok(tokens)
            }
            Token::GroupEnd => Err(error(tok.span(), TexErrKind::ExtraCloseMissingOpen)),
            Token::Eoi => Err(error(tok.span(), TexErrKind::MissingArgFor(cs(name)))),
            Token::ArgEnd => {
                self.tokens.queue_in_front(&[tok]);
                Err(error(tok.span(), TexErrKind::MissingArgFor(cs(name))))
            }
            _ => Ok(vec![tok]),
        }
    }

    /// An argument as trimmed plain text, e.g. a label or a colour name.
    fn read_string_arg(&mut self, name: &str) -> ParseResult<String> {
        let tokens = self.read_raw_arg(name)?;
        Ok(tokens_to_string(&tokens).trim().to_string())
    }

    /// The tokens of an optional `[...]` argument, if there is one.
    fn read_optional(&mut self, name: &str) -> ParseResult<Option<Vec<TokSpan<'source>>>> {
        if !self.tokens.peek().token().is_other('[') {
            return Ok(None);
        }
        let open = self.tokens.next()?;
        let mut tokens = Vec::new();
        match self.tokens.read_bracket(&mut tokens)? {
            Some(_) => Ok(Some(tokens)),
            None => Err(error(
                open.span(),
                TexErrKind::MissingCloseBracket(cs(name)),
            )),
        }
    }

    /// Whether a `*` follows; it is consumed if so.
    fn read_star(&mut self) -> ParseResult<bool> {
        if self.tokens.peek().token().is_other('*') {
            self.tokens.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// A dimension, either in braces or directly in the token stream (`\kern3mu`).
    fn read_dimen(&mut self, name: &str, span: Span) -> ParseResult<Length> {
        let missing = || error(span, TexErrKind::MissingDimOrUnits(cs(name)));
        if matches!(self.tokens.peek().token(), Token::GroupBegin) {
            let text = self.read_string_arg(name)?;
            return parse_dimen(&text).ok_or_else(missing);
        }
        let mut candidate = String::new();
        let mut n = 0;
        while n < 32 {
            let ch = match self.tokens.peek_nth_with_whitespace(n)?.token() {
                Token::Whitespace => ' ',
                Token::Digit(ch) | Token::Letter(ch) | Token::Other(ch) if ch.is_ascii() => *ch,
                _ => break,
            };
            candidate.push(ch);
            n += 1;
        }
        let (length, consumed) = match_dimen(&candidate).ok_or_else(missing)?;
        for _ in 0..consumed {
            self.tokens.next_with_whitespace()?;
        }
        Ok(length)
    }

    /// Report a soft error: an error node takes the place of the construct and parsing goes on.
    fn soft_error(&mut self, span: Span, kind: TexErrKind) -> ParseResult<()> {
        let err = TexError(span.into(), kind);
        log::debug!(error = err.1.id(); "recovered from error");
        let node = make_error(&mut *self.builder, &err);
        self.push(node)
    }
}

impl ScriptState {
    fn new(base: NodeId, limits: bool) -> Self {
        ScriptState {
            base,
            sub: None,
            sup: None,
            primes: None,
            pending: Position::Sup,
            limits,
            was_fn: false,
        }
    }
}

fn braces_balanced(text: &str) -> bool {
    let mut level = 0usize;
    for ch in text.chars() {
        match ch {
            '{' => level += 1,
            '}' => match level.checked_sub(1) {
                Some(new_level) => level = new_level,
                None => return false,
            },
            _ => {}
        }
    }
    level == 0
}

/// Relations with a precomposed negated form.
fn negated_relation(text: &str) -> Option<&'static str> {
    Some(match text {
        "=" => "\u{2260}",
        "<" => "\u{226E}",
        ">" => "\u{226F}",
        "\u{2264}" => "\u{2270}",
        "\u{2265}" => "\u{2271}",
        "\u{2261}" => "\u{2262}",
        "\u{2248}" => "\u{2249}",
        "\u{223C}" => "\u{2241}",
        "\u{2243}" => "\u{2244}",
        "\u{2245}" => "\u{2247}",
        "\u{2208}" => "\u{2209}",
        "\u{220B}" => "\u{220C}",
        "\u{2282}" => "\u{2284}",
        "\u{2283}" => "\u{2285}",
        "\u{2286}" => "\u{2288}",
        "\u{2287}" => "\u{2289}",
        "\u{2223}" => "\u{2224}",
        "\u{2225}" => "\u{2226}",
        "\u{227A}" => "\u{2280}",
        "\u{227B}" => "\u{2281}",
        "\u{22A2}" => "\u{22AC}",
        "\u{22A8}" => "\u{22AD}",
        "\u{2192}" => "\u{219B}",
        "\u{2190}" => "\u{219A}",
        _ => return None,
    })
}
