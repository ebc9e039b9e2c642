//! Handlers of the primitive control sequences.

use math_tree::{Attr, Length, LengthUnit, NodeId, NodeKind, PropValue, Property, TexClass, TreeBuilder};

use super::{Frame, FrameKind, Parser, cs, error, tokens_to_string};
use crate::dimen::parse_dimen;
use crate::error::{ParseResult, TexErrKind};
use crate::packages::{model_color, named_color};
use crate::symbols::{Decoration, Def, MathStyle, PhantomKind, Prim};
use crate::token::{Span, Token};

/// The notation of `\cancelto`.
const CANCEL_TO: &str = "updiagonalstrike updiagonalarrow northeastarrow";

impl<'source, B: TreeBuilder + ?Sized> Parser<'source, '_, B> {
    pub(super) fn primitive(&mut self, prim: Prim, name: &str, span: Span) -> ParseResult<()> {
        match prim {
            Prim::Begin => self.begin_environment(span),
            Prim::End => self.end_environment(span),
            Prim::Left => self.left(span),
            Prim::Right => self.right(span),
            Prim::Middle => self.middle(span),
            Prim::Big(size, class) => {
                let delim = self.read_delimiter(name)?;
                let mo = self.builder.create_node(
                    NodeKind::Mo,
                    &[],
                    &[
                        (Attr::Fence, "true"),
                        (Attr::Stretchy, "true"),
                        (Attr::Symmetric, "true"),
                        (Attr::Minsize, size),
                        (Attr::Maxsize, size),
                    ],
                    Some(&delim),
                );
                let atom = self.atom(mo, class);
                self.push(atom)
            }
            Prim::Frac(style) => {
                let numerator = self.parse_arg(name)?;
                let denominator = self.parse_arg(name)?;
                let frac =
                    self.builder
                        .create_node(NodeKind::Mfrac, &[numerator, denominator], &[], None);
                let node = self.styled(frac, style);
                self.push(node)
            }
            Prim::CFrac => {
                // The alignment of the numerator is not represented.
                self.read_optional(name)?;
                let numerator = self.parse_arg(name)?;
                let denominator = self.parse_arg(name)?;
                let text = MathStyle::Text.attrs();
                let numerator = self
                    .builder
                    .create_node(NodeKind::Mstyle, &[numerator], &text, None);
                let denominator = self
                    .builder
                    .create_node(NodeKind::Mstyle, &[denominator], &text, None);
                let frac =
                    self.builder
                        .create_node(NodeKind::Mfrac, &[numerator, denominator], &[], None);
                let node = self.styled(frac, Some(MathStyle::Display));
                self.push(node)
            }
            Prim::Binom(style) => {
                let top = self.parse_arg(name)?;
                let bottom = self.parse_arg(name)?;
                let frac = self.builder.create_node(
                    NodeKind::Mfrac,
                    &[top, bottom],
                    &[(Attr::Linethickness, "0")],
                    None,
                );
                let fenced = self.fenced("(", frac, ")");
                let node = self.styled(fenced, style);
                self.push(node)
            }
            Prim::Genfrac => self.genfrac(name, span),
            Prim::Over(kind) => self.over(kind, name, span),
            Prim::Sqrt => {
                // An empty index is no index.
                let index = match self.read_optional(name)? {
                    Some(tokens)
                        if tokens.iter().any(|tok| !matches!(tok.token(), Token::Whitespace)) =>
                    {
                        Some(self.parse_tokens(tokens, span)?)
                    }
                    _ => None,
                };
                let radicand = self.parse_arg(name)?;
                let node = match index {
                    Some(index) => {
                        self.builder
                            .create_node(NodeKind::Mroot, &[radicand, index], &[], None)
                    }
                    None => self
                        .builder
                        .create_node(NodeKind::Msqrt, &[radicand], &[], None),
                };
                self.push(node)
            }
            Prim::Limits(limits) => self.limits(limits, name, span),
            Prim::Font(variant) => {
                let content = self.parse_arg_with(name, |frame: &mut Frame| {
                    frame.font = Some(variant);
                    frame.merge_letters = true;
                })?;
                let atom = self.atom(content, TexClass::Ord);
                self.push(atom)
            }
            Prim::FontSwitch(variant) => {
                let frame = self.top_mut();
                frame.font = Some(variant);
                frame.merge_letters = false;
                Ok(())
            }
            Prim::Style(style) => {
                let attrs = style
                    .attrs()
                    .iter()
                    .map(|(attr, value)| (*attr, value.to_string()))
                    .collect();
                self.push_frame(FrameKind::Style(attrs), span)
            }
            Prim::Color => {
                let color_name = self.read_string_arg(name)?;
                match self.resolve_color(&color_name) {
                    Some(color) => {
                        self.push_frame(FrameKind::Style(vec![(Attr::Mathcolor, color)]), span)
                    }
                    None => self.soft_error(span, TexErrKind::UnknownColor(color_name.into())),
                }
            }
            Prim::TextColor => {
                let color_name = self.read_string_arg(name)?;
                let Some(color) = self.resolve_color(&color_name) else {
                    self.read_raw_arg(name)?;
                    return self.soft_error(span, TexErrKind::UnknownColor(color_name.into()));
                };
                let content = self.parse_arg(name)?;
                let node = self.builder.create_node(
                    NodeKind::Mstyle,
                    &[content],
                    &[(Attr::Mathcolor, &color)],
                    None,
                );
                self.push(node)
            }
            Prim::ColorBox => {
                let color_name = self.read_string_arg(name)?;
                let Some(color) = self.resolve_color(&color_name) else {
                    self.read_raw_arg(name)?;
                    return self.soft_error(span, TexErrKind::UnknownColor(color_name.into()));
                };
                let content = self.text_mode(name, None)?;
                let node = self.builder.create_node(
                    NodeKind::Mpadded,
                    &[content],
                    &[
                        (Attr::Mathbackground, &color),
                        (Attr::Width, "+10px"),
                        (Attr::Height, "+5px"),
                        (Attr::Depth, "+5px"),
                        (Attr::Lspace, "5px"),
                    ],
                    None,
                );
                self.push(node)
            }
            Prim::DefineColor => {
                let color_name = self.read_string_arg(name)?;
                let model = self.read_string_arg(name)?;
                let spec = self.read_string_arg(name)?;
                match model_color(&model, &spec) {
                    Some(color) => {
                        self.colors.insert(color_name, color);
                        Ok(())
                    }
                    None => self.soft_error(span, TexErrKind::UnknownColor(spec.into())),
                }
            }
            Prim::Class(class) => {
                let content = self.parse_arg(name)?;
                let atom = self.atom(content, class);
                if class == TexClass::Op {
                    self.builder
                        .set_property(atom, Property::MoveSupSub, PropValue::Bool(true));
                }
                self.push(atom)
            }
            Prim::Space(length) => self.push_space(length),
            Prim::NonBreakingSpace => {
                let node = self
                    .builder
                    .create_node(NodeKind::Mtext, &[], &[], Some("\u{A0}"));
                self.push(node)
            }
            Prim::Hspace => {
                self.read_star()?;
                let text = self.read_string_arg(name)?;
                let length = parse_dimen(&text)
                    .ok_or_else(|| error(span, TexErrKind::MissingDimOrUnits(cs(name))))?;
                self.push_space(length)
            }
            Prim::Kern(mu_only) => {
                let length = self.read_dimen(name, span)?;
                if mu_only && length.unit() != LengthUnit::Mu {
                    return Err(error(span, TexErrKind::MissingDimOrUnits(cs(name))));
                }
                self.push_space(length)
            }
            Prim::Text(variant) => {
                let node = self.text_mode(name, variant)?;
                self.push(node)
            }
            Prim::Not => {
                self.top_mut().not_pending = Some(span);
                Ok(())
            }
            Prim::Phantom(kind) => {
                let content = self.parse_arg(name)?;
                let phantom = self
                    .builder
                    .create_node(NodeKind::Mphantom, &[content], &[], None);
                let attrs: &[(Attr, &str)] = match kind {
                    PhantomKind::Both => &[],
                    PhantomKind::Horizontal => &[(Attr::Height, "0"), (Attr::Depth, "0")],
                    PhantomKind::Vertical => &[(Attr::Width, "0")],
                };
                let node = if attrs.is_empty() {
                    phantom
                } else {
                    self.builder
                        .create_node(NodeKind::Mpadded, &[phantom], attrs, None)
                };
                self.push(node)
            }
            Prim::Smash => {
                let which = self
                    .read_optional(name)?
                    .map(|tokens| tokens_to_string(&tokens))
                    .unwrap_or_default();
                let content = self.parse_arg(name)?;
                let attrs: &[(Attr, &str)] = match which.trim() {
                    "t" => &[(Attr::Height, "0")],
                    "b" => &[(Attr::Depth, "0")],
                    _ => &[(Attr::Height, "0"), (Attr::Depth, "0")],
                };
                let node = self
                    .builder
                    .create_node(NodeKind::Mpadded, &[content], attrs, None);
                self.push(node)
            }
            Prim::Enclose(notation) => {
                let content = self.parse_arg(name)?;
                let node = self.builder.create_node(
                    NodeKind::Menclose,
                    &[content],
                    &[(Attr::Notation, notation)],
                    None,
                );
                self.push(node)
            }
            Prim::CancelTo => {
                let value = self.parse_arg(name)?;
                let content = self.parse_arg(name)?;
                let cancelled = self.builder.create_node(
                    NodeKind::Menclose,
                    &[content],
                    &[(Attr::Notation, CANCEL_TO)],
                    None,
                );
                let value = self.builder.create_node(
                    NodeKind::Mpadded,
                    &[value],
                    &[
                        (Attr::Depth, "-.1em"),
                        (Attr::Height, "+.1em"),
                        (Attr::Voffset, ".1em"),
                    ],
                    None,
                );
                let node = self
                    .builder
                    .create_node(NodeKind::Msup, &[cancelled, value], &[], None);
                self.push(node)
            }
            Prim::Bbox => self.bbox(name, span),
            Prim::Accent(accent, stretchy) => {
                let base = self.parse_arg(name)?;
                let stretchy = if stretchy { "true" } else { "false" };
                let mo = self.builder.create_node(
                    NodeKind::Mo,
                    &[],
                    &[(Attr::Stretchy, stretchy)],
                    Some(accent),
                );
                let over = self.builder.create_node(
                    NodeKind::Mover,
                    &[base, mo],
                    &[(Attr::Accent, "true")],
                    None,
                );
                let atom = self.atom(over, TexClass::Ord);
                self.push(atom)
            }
            Prim::Decorate(decoration) => {
                let base = self.parse_arg(name)?;
                let mo = self.builder.create_node(
                    NodeKind::Mo,
                    &[],
                    &[(Attr::Stretchy, "true")],
                    Some(decoration.text()),
                );
                let node = if decoration.is_over() {
                    self.builder.create_node(
                        NodeKind::Mover,
                        &[base, mo],
                        &[(Attr::Accent, "true")],
                        None,
                    )
                } else {
                    self.builder.create_node(
                        NodeKind::Munder,
                        &[base, mo],
                        &[(Attr::Accentunder, "true")],
                        None,
                    )
                };
                let node = match decoration {
                    Decoration::Overbrace | Decoration::Underbrace => {
                        self.builder
                            .set_property(node, Property::MoveSupSub, PropValue::Bool(true));
                        node
                    }
                    _ => self.atom(node, TexClass::Ord),
                };
                self.push(node)
            }
            Prim::Overset | Prim::Underset => {
                let script = self.parse_arg(name)?;
                let base = self.parse_arg(name)?;
                let core = self.builder.core_mo(base);
                if self.builder.get_attribute(core, Attr::Movablelimits).is_some() {
                    self.builder
                        .set_attribute(core, Attr::Movablelimits, "false");
                }
                let kind = if matches!(prim, Prim::Overset) {
                    NodeKind::Mover
                } else {
                    NodeKind::Munder
                };
                let node = self
                    .builder
                    .create_node(kind, &[base, script], &[], None);
                self.push(node)
            }
            Prim::Stackrel => {
                let top = self.parse_arg(name)?;
                let base = self.parse_arg(name)?;
                let over = self
                    .builder
                    .create_node(NodeKind::Mover, &[base, top], &[], None);
                let atom = self.atom(over, TexClass::Rel);
                self.push(atom)
            }
            Prim::XArrow(arrow) => {
                let under = match self.read_optional(name)? {
                    Some(tokens) => Some(self.parse_tokens(tokens, span)?),
                    None => None,
                };
                let over = self.parse_arg(name)?;
                let mo = self.builder.create_node(
                    NodeKind::Mo,
                    &[],
                    &[(Attr::Stretchy, "true")],
                    Some(arrow),
                );
                self.builder.set_tex_class(mo, TexClass::Rel);
                let over = self.builder.create_node(
                    NodeKind::Mpadded,
                    &[over],
                    &[
                        (Attr::Width, "+0.833em"),
                        (Attr::Lspace, "0.278em"),
                        (Attr::Voffset, "-.2em"),
                        (Attr::Height, "-.2em"),
                    ],
                    None,
                );
                let node = match under {
                    Some(under) => {
                        let under = self.builder.create_node(
                            NodeKind::Mpadded,
                            &[under],
                            &[
                                (Attr::Width, "+0.833em"),
                                (Attr::Lspace, "0.278em"),
                                (Attr::Height, "-.2em"),
                            ],
                            None,
                        );
                        self.builder
                            .create_node(NodeKind::Munderover, &[mo, under, over], &[], None)
                    }
                    None => self
                        .builder
                        .create_node(NodeKind::Mover, &[mo, over], &[], None),
                };
                self.push(node)
            }
            Prim::NamedFn(text) => self.named_fn(text),
            Prim::NamedOp(text) => self.named_op(text),
            Prim::OperatorName => {
                let starred = self.read_star()?;
                let tokens = self.read_raw_arg(name)?;
                let text = operator_text(&tokens);
                if starred {
                    self.named_op(&text)
                } else {
                    self.named_fn(&text)
                }
            }
            Prim::Cr => self.row_end(name, span),
            Prim::Hline => self.hline(name, span),
            Prim::Tag => {
                let starred = self.read_star()?;
                let text = self.read_string_arg(name)?;
                self.tags
                    .tag(text, starred)
                    .map_err(|kind| error(span, kind))
            }
            Prim::Notag => {
                self.tags.notag();
                Ok(())
            }
            Prim::Label => {
                let label = self.read_string_arg(name)?;
                self.tags.label(label).map_err(|kind| error(span, kind))
            }
            Prim::Ref(parens) => {
                let label = self.read_string_arg(name)?;
                let node = self.tags.reference(&mut *self.builder, label, parens);
                self.push(node)
            }
            Prim::NewCommand => self.new_command(name, span),
            Prim::Def => self.define(span),
            Prim::Let => self.let_command(span),
        }
    }

    /// Wrap a node in a `TeXAtom` of the given class.
    fn atom(&mut self, content: NodeId, class: TexClass) -> NodeId {
        let atom = self
            .builder
            .create_node(NodeKind::TeXAtom, &[content], &[], None);
        self.builder.set_tex_class(atom, class);
        atom
    }

    fn styled(&mut self, node: NodeId, style: Option<MathStyle>) -> NodeId {
        match style {
            Some(style) => self
                .builder
                .create_node(NodeKind::Mstyle, &[node], &style.attrs(), None),
            None => node,
        }
    }

    fn push_space(&mut self, length: Length) -> ParseResult<()> {
        let width = length.to_string();
        let node = self
            .builder
            .create_node(NodeKind::Mspace, &[], &[(Attr::Width, &width)], None);
        self.push(node)
    }

    /// A colour name defined with `\definecolor`, a known name or a hex literal.
    fn resolve_color(&self, name: &str) -> Option<String> {
        match self.colors.get(name) {
            Some(color) => Some(color.clone()),
            None => named_color(name),
        }
    }

    fn named_fn(&mut self, text: &str) -> ParseResult<()> {
        let node = self
            .builder
            .create_node(NodeKind::Mi, &[], &[], Some(text));
        self.builder.set_tex_class(node, TexClass::Op);
        self.builder
            .set_property(node, Property::FnOp, PropValue::Bool(true));
        self.push_function(node)
    }

    fn named_op(&mut self, text: &str) -> ParseResult<()> {
        let text = text.replace(' ', "\u{2006}");
        let node = self.builder.create_node(
            NodeKind::Mo,
            &[],
            &[(Attr::Movablelimits, "true")],
            Some(&text),
        );
        self.builder.set_tex_class(node, TexClass::Op);
        self.builder
            .set_property(node, Property::MoveSupSub, PropValue::Bool(true));
        self.builder
            .set_property(node, Property::FnOp, PropValue::Bool(true));
        self.push_function(node)
    }

    /// `\genfrac{left}{right}{thickness}{style}{numerator}{denominator}`
    fn genfrac(&mut self, name: &str, span: Span) -> ParseResult<()> {
        let left = self.read_string_arg(name)?;
        let right = self.read_string_arg(name)?;
        let thickness = self.read_string_arg(name)?;
        let style = self.read_string_arg(name)?;
        let numerator = self.parse_arg(name)?;
        let denominator = self.parse_arg(name)?;
        let thickness = if thickness.is_empty() {
            None
        } else {
            let length = parse_dimen(&thickness)
                .ok_or_else(|| error(span, TexErrKind::MissingDimOrUnits(cs(name))))?;
            Some(length.to_string())
        };
        let attrs: Vec<(Attr, &str)> = thickness
            .iter()
            .map(|thickness| (Attr::Linethickness, thickness.as_str()))
            .collect();
        let frac = self.builder.create_node(
            NodeKind::Mfrac,
            &[numerator, denominator],
            &attrs,
            None,
        );
        let left = self.delimiter_text(&left);
        let right = self.delimiter_text(&right);
        let node = if left.is_empty() && right.is_empty() {
            frac
        } else {
            self.fenced(&left, frac, &right)
        };
        // A style that is not a digit from 0 to 3 is ignored.
        let style = style.chars().next().and_then(MathStyle::from_genfrac);
        let node = self.styled(node, style);
        self.push(node)
    }

    /// The text of a delimiter given as a string, as in the arguments of `\genfrac`.
    fn delimiter_text(&self, text: &str) -> String {
        let def = match text.strip_prefix('\\') {
            Some(name) => self.packages.command(name),
            None => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some('.'), None) | (None, _) => return String::new(),
                    (Some(ch), None) => self.packages.char(ch),
                    _ => None,
                }
            }
        };
        match def {
            Some(Def::Delim(char_def)) => char_def.text.to_string(),
            Some(Def::Char(char_def)) if char_def.kind == NodeKind::Mo => {
                char_def.text.to_string()
            }
            _ => text.to_string(),
        }
    }

    fn limits(&mut self, limits: bool, name: &str, span: Span) -> ParseResult<()> {
        let frame = self.top();
        let Some(&previous) = frame.nodes.last() else {
            return Err(error(span, TexErrKind::MisplacedLimits(cs(name))));
        };
        let is_script = frame.last_script == Some(previous);
        let base = if is_script {
            self.builder
                .get_children(previous)
                .first()
                .copied()
                .unwrap_or(previous)
        } else {
            previous
        };
        let core = self.builder.core_mo(base);
        let is_operator = self.builder.tex_class(base) == TexClass::Op
            || self.builder.has_flag(base, Property::MoveSupSub)
            || self.builder.has_flag(core, Property::MoveSupSub);
        if !is_operator {
            return Err(error(span, TexErrKind::MisplacedLimits(cs(name))));
        }
        self.builder
            .set_property(base, Property::MoveSupSub, PropValue::Bool(limits));
        self.builder
            .set_property(base, Property::LimitsSet, PropValue::Bool(true));
        if core != base {
            self.builder
                .set_property(core, Property::MoveSupSub, PropValue::Bool(limits));
        }
        if self.builder.is_kind(core, NodeKind::Mo) {
            self.builder
                .set_attribute(core, Attr::Movablelimits, "false");
        }
        if is_script {
            let kind = match (self.builder.kind(previous), limits) {
                (NodeKind::Msub, true) => NodeKind::Munder,
                (NodeKind::Msup, true) => NodeKind::Mover,
                (NodeKind::Msubsup, true) => NodeKind::Munderover,
                (NodeKind::Munder, false) => NodeKind::Msub,
                (NodeKind::Mover, false) => NodeKind::Msup,
                (NodeKind::Munderover, false) => NodeKind::Msubsup,
                _ => return Ok(()),
            };
            let children = self.builder.get_children(previous).to_vec();
            let replacement = self.builder.create_node(kind, &children, &[], None);
            if self.builder.has_flag(previous, Property::Primes) {
                self.builder
                    .set_property(replacement, Property::Primes, PropValue::Bool(true));
            }
            let frame = self.top_mut();
            frame.nodes.pop();
            frame.nodes.push(replacement);
            frame.last_script = Some(replacement);
        }
        Ok(())
    }

    /// `\bbox[options]{content}`: background colour, padding and CSS style.
    fn bbox(&mut self, name: &str, span: Span) -> ParseResult<()> {
        let options = self
            .read_optional(name)?
            .map(|tokens| tokens_to_string(&tokens))
            .unwrap_or_default();
        let mut background: Option<String> = None;
        let mut padding: Option<Length> = None;
        let mut style: Option<String> = None;
        for part in options.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let conflict = if let Some(length) = parse_dimen(part) {
                padding.replace(length).map(|_| "Padding")
            } else if is_color_word(part) {
                let color = self.resolve_color(part).unwrap_or_else(|| part.to_string());
                background.replace(color).map(|_| "Background")
            } else if part.contains(':') {
                style.replace(part.to_string()).map(|_| "Style")
            } else {
                self.read_raw_arg(name)?;
                return self.soft_error(span, TexErrKind::InvalidBBoxProperty(part.into()));
            };
            if let Some(property) = conflict {
                self.read_raw_arg(name)?;
                return self.soft_error(span, TexErrKind::MultipleBBoxProperty(property));
            }
        }
        let content = self.parse_arg(name)?;
        let mut attrs: Vec<(Attr, String)> = Vec::new();
        if let Some(padding) = padding {
            let double = Length::new(padding.value() * 2.0, padding.unit());
            attrs.push((Attr::Width, format!("+{double}")));
            attrs.push((Attr::Height, format!("+{padding}")));
            attrs.push((Attr::Depth, format!("+{padding}")));
            attrs.push((Attr::Lspace, padding.to_string()));
        }
        if let Some(background) = background {
            attrs.push((Attr::Mathbackground, background));
        }
        if let Some(style) = style {
            attrs.push((Attr::Style, style));
        }
        let attrs: Vec<(Attr, &str)> = attrs
            .iter()
            .map(|(attr, value)| (*attr, value.as_str()))
            .collect();
        let node = self
            .builder
            .create_node(NodeKind::Mpadded, &[content], &attrs, None);
        self.push(node)
    }
}

/// A word that `\bbox` takes as a background colour.
fn is_color_word(part: &str) -> bool {
    match part.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => part.bytes().all(|b| b.is_ascii_alphanumeric()),
    }
}

/// The name of an operator from `\operatorname`; spacing commands become thin spaces.
fn operator_text(tokens: &[crate::token::TokSpan]) -> String {
    let mut text = String::new();
    for tok in tokens {
        match tok.token() {
            Token::Command("," | ":" | ";" | " ") | Token::Active('~') => text.push(' '),
            Token::Command(name) => {
                text.push('\\');
                text.push_str(name);
            }
            Token::Whitespace | Token::GroupBegin | Token::GroupEnd => {}
            other => {
                if let Some(ch) = other.as_char() {
                    text.push(ch);
                }
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::super::tests::tree;

    #[test]
    fn fractions() {
        assert_snapshot!(tree(r"\frac12"), @r#"math(mrow*(mfrac(mn"1" mn"2")))"#);
        assert_snapshot!(tree(r"\frac{a}{b}"), @r#"math(mrow*(mfrac(mi"a" mi"b")))"#);
        assert_snapshot!(tree(r"\dfrac{a}{b}"), @r#"math(mrow*(mstyle{displaystyle=true,scriptlevel=0}(mrow*(mfrac(mi"a" mi"b")))))"#);
        assert_snapshot!(tree(r"\frac{a}"), @"8: MissingArgFor");
        assert_snapshot!(tree(r"\genfrac{[}{]}{0pt}{}{a}{b}"), @r#"math(mrow*(mrow[INNER](mo{fence=true,stretchy=true,symmetric=true}"[" mfrac{linethickness=0em}(mi"a" mi"b") mo{fence=true,stretchy=true,symmetric=true}"]")))"#);
    }

    #[test]
    fn binomials() {
        assert_snapshot!(tree(r"\binom{n}{k}"), @r#"math(mrow*(mrow[INNER](mo{fence=true,stretchy=true,symmetric=true}"(" mfrac{linethickness=0}(mi"n" mi"k") mo{fence=true,stretchy=true,symmetric=true}")")))"#);
    }

    #[test]
    fn roots() {
        assert_snapshot!(tree(r"\sqrt{x}"), @r#"math(mrow*(msqrt(mrow*(mi"x"))))"#);
        assert_snapshot!(tree(r"\sqrt[3]{x}"), @r#"math(mrow*(mroot(mi"x" mn"3")))"#);
        assert_snapshot!(tree(r"\sqrt[3{x}"), @"5: MissingCloseBracket");
        assert_snapshot!(tree(r"\sqrt[]{x}"), @r#"math(mrow*(msqrt(mrow*(mi"x"))))"#);
        assert_snapshot!(tree(r"\sqrt[ ]{x}"), @r#"math(mrow*(msqrt(mrow*(mi"x"))))"#);
    }

    #[test]
    fn fonts() {
        assert_snapshot!(tree(r"\mathrm{sin}"), @r#"math(mrow*(TeXAtom[ORD](mrow*(mi{mathvariant=normal}"sin"))))"#);
        assert_snapshot!(tree(r"\mathbf{x1}"), @r#"math(mrow*(TeXAtom[ORD](mrow*(mi{mathvariant=bold}"x" mn{mathvariant=bold}"1"))))"#);
        assert_snapshot!(tree(r"{\bf ab} c"), @r#"math(mrow*(TeXAtom[ORD](mrow*(mi{mathvariant=bold}"a" mi{mathvariant=bold}"b")) mi"c"))"#);
    }

    #[test]
    fn styles_and_colors() {
        assert_snapshot!(tree(r"a \displaystyle b"), @r#"math(mrow*(mi"a" mstyle{displaystyle=true,scriptlevel=0}(mrow*(mi"b"))))"#);
        assert_snapshot!(tree(r"{\color{red} x} y"), @r#"math(mrow*(TeXAtom[ORD](mrow*(mstyle{mathcolor=red}(mrow*(mi"x")))) mi"y"))"#);
        assert_snapshot!(tree(r"\textcolor{Apricot}{x}"), @r#"math(mrow*(mstyle{mathcolor=#FBB982}(mrow*(mi"x"))))"#);
        assert_snapshot!(tree(r"\definecolor{mine}{rgb}{1,0,0}\color{mine}x"), @r#"math(mrow*(mstyle{mathcolor=#FF0000}(mrow*(mi"x"))))"#);
        assert_snapshot!(tree(r"\color{reddish} x"), @r#"math(mrow*(merror(mrow*(mtext"Undefined color 'reddish'")) mi"x"))"#);
    }

    #[test]
    fn spaces() {
        assert_snapshot!(tree(r"a\,b"), @r#"math(mrow*(mi"a" mspace{width=0.167em} mi"b"))"#);
        assert_snapshot!(tree(r"\kern2em"), @"math(mrow*(mspace{width=2em}))");
        assert_snapshot!(tree(r"\mkern18mu"), @"math(mrow*(mspace{width=1em}))");
        assert_snapshot!(tree(r"\mkern1em"), @"0: MissingDimOrUnits");
        assert_snapshot!(tree(r"\hspace{5pt}"), @"math(mrow*(mspace{width=0.5em}))");
    }

    #[test]
    fn accents_and_decorations() {
        assert_snapshot!(tree(r"\hat x"), @r#"math(mrow*(TeXAtom[ORD](mrow*(mover{accent=true}(mi"x" mo{stretchy=false}"^")))))"#);
        assert_snapshot!(tree(r"\overbrace{x}^n"), @r#"math(mrow*(mover(mover{accent=true}(mi"x" mo{stretchy=true}"⏞") mi"n")))"#);
        assert_snapshot!(tree(r"\stackrel{?}{=}"), @r#"math(mrow*(TeXAtom[REL](mrow*(mover(mo"=" mo"?")))))"#);
    }

    #[test]
    fn limits() {
        assert_snapshot!(tree(r"\int\limits_0^1"), @r#"math(mrow*(munderover(mo{movablelimits=false}"∫" mn"0" mn"1")))"#);
        assert_snapshot!(tree(r"\sum\nolimits_0"), @r#"math(mrow*(msub(mo{movablelimits=false}"∑" mn"0")))"#);
        assert_snapshot!(tree(r"\sum_0\nolimits"), @r#"math(mrow*(msub(mo{movablelimits=false}"∑" mn"0")))"#);
        assert_snapshot!(tree(r"x\limits"), @"1: MisplacedLimits");
    }

    #[test]
    fn named_operators() {
        assert_snapshot!(tree(r"\lim_{x} f"), @r#"math(mrow*(munder(mo{movablelimits=true}"lim" TeXAtom[ORD](mrow*(mi"x"))) mo"⁡" mi"f"))"#);
        assert_snapshot!(tree(r"\operatorname{rank} A"), @r#"math(mrow*(mi"rank" mo"⁡" mi"A"))"#);
        assert_snapshot!(tree(r"\operatorname*{argmax}"), @r#"math(mrow*(mo{movablelimits=true}"argmax"))"#);
    }

    #[test]
    fn boxes() {
        assert_snapshot!(tree(r"\boxed{x}"), @r#"math(mrow*(menclose{notation=box}(mrow*(mi"x"))))"#);
        assert_snapshot!(tree(r"\hphantom{x}"), @r#"math(mrow*(mpadded{height=0,depth=0}(mrow*(mphantom(mrow*(mi"x"))))))"#);
        assert_snapshot!(tree(r"\bbox[red,5pt]{x}"), @r#"math(mrow*(mpadded{width=+1em,height=+0.5em,depth=+0.5em,lspace=0.5em,mathbackground=red}(mrow*(mi"x"))))"#);
        assert_snapshot!(tree(r"\bbox[skyish]{x}"), @r#"math(mrow*(mpadded{mathbackground=skyish}(mrow*(mi"x"))))"#);
        assert_snapshot!(tree(r"\bbox[red,blue]{x}"), @r#"math(mrow*(merror(mrow*(mtext"Background specified twice in \\bbox"))))"#);
        assert_snapshot!(tree(r"\cancelto{0}{x}"), @r#"math(mrow*(msup(menclose{notation=updiagonalstrike updiagonalarrow northeastarrow}(mrow*(mi"x")) mpadded{depth=-.1em,height=+.1em,voffset=.1em}(mrow*(mn"0")))))"#);
    }

    #[test]
    fn arrows() {
        assert_snapshot!(tree(r"\xrightarrow{f}"), @r#"math(mrow*(mover(mo{stretchy=true}"→" mpadded{width=+0.833em,lspace=0.278em,voffset=-.2em,height=-.2em}(mrow*(mi"f")))))"#);
    }
}
