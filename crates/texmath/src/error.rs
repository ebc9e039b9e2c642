use std::fmt;
use std::ops::Range;

use strum_macros::IntoStaticStr;

use math_tree::{NodeId, NodeKind, PropValue, Property, TreeBuilder};

/// An error that occurred while parsing TeX.
///
/// The range is a byte span into the input string. Errors raised while expanding a macro point
/// at the macro invocation.
#[derive(Debug, Clone)]
pub struct TexError(pub Range<usize>, pub TexErrKind);

pub(crate) type ParseResult<T> = Result<T, Box<TexError>>;

/// The kind of a [`TexError`].
///
/// The variant name is the stable identifier of the error, see [`TexErrKind::id`].
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[non_exhaustive]
pub enum TexErrKind {
    DoubleExponent,
    DoubleSubscripts,
    DoubleExponentPrime,
    MissingScript,
    ExtraOpenMissingClose,
    ExtraCloseMissingOpen,
    MissingLeftExtraRight,
    ExtraLeftMissingRight,
    ExtraMiddle,
    MissingOrUnrecognizedDelim(Box<str>),
    AmbiguousUseOf(Box<str>),
    Misplaced(Box<str>),
    UndefinedControlSequence(Box<str>),
    UnknownEnv(Box<str>),
    EnvBadEnd {
        begin: Box<str>,
        end: Box<str>,
    },
    EnvMissingEnd(Box<str>),
    MissingBeginExtraEnd(Box<str>),
    ErroneousNestingEq,
    MissingArgFor(Box<str>),
    MissingCloseBracket(Box<str>),
    MissingOpenForSub,
    MissingOpenForSup,
    MisplacedLimits(Box<str>),
    IllegalCharacter(char),
    UnterminatedControlSequence,
    CantUseHash,
    IllegalMacroParam,
    MissingCS(Box<str>),
    MaxMacroSub,
    MaxBufferSize,
    MaxNesting,
    MultipleCommand(Box<str>),
    MultipleLabel(Box<str>),
    CommandNotAllowedInEnv {
        cmd: Box<str>,
        env: Box<str>,
    },
    MissingDimOrUnits(Box<str>),
    BadColumnSpec(char),
    UnknownColor(Box<str>),
    MultipleBBoxProperty(&'static str),
    InvalidBBoxProperty(Box<str>),
    ExpectedRelation,
    RunawayArgument(Box<str>),
    MismatchUseDef(Box<str>),
    Internal,
}

static_assertions::assert_eq_size!(Option<Box<TexError>>, usize);

impl TexErrKind {
    /// The stable identifier of this kind of error, e.g. `"DoubleExponent"`.
    #[inline]
    pub fn id(&self) -> &'static str {
        self.into()
    }

    /// Returns the error message as a string.
    pub fn string(&self) -> String {
        match self {
            TexErrKind::DoubleExponent => "Double exponent: use braces to clarify".to_string(),
            TexErrKind::DoubleSubscripts => "Double subscripts: use braces to clarify".to_string(),
            TexErrKind::DoubleExponentPrime => {
                "Prime causes double exponent: use braces to clarify".to_string()
            }
            TexErrKind::MissingScript => "Missing superscript or subscript argument".to_string(),
            TexErrKind::ExtraOpenMissingClose => {
                "Extra open brace or missing close brace".to_string()
            }
            TexErrKind::ExtraCloseMissingOpen => {
                "Extra close brace or missing open brace".to_string()
            }
            TexErrKind::MissingLeftExtraRight => r"Missing \left or extra \right".to_string(),
            TexErrKind::ExtraLeftMissingRight => r"Extra \left or missing \right".to_string(),
            TexErrKind::ExtraMiddle => r"Extra \middle".to_string(),
            TexErrKind::MissingOrUnrecognizedDelim(cmd) => {
                "Missing or unrecognized delimiter for ".to_string() + cmd
            }
            TexErrKind::AmbiguousUseOf(cmd) => "Ambiguous use of ".to_string() + cmd,
            TexErrKind::Misplaced(what) => "Misplaced ".to_string() + what,
            TexErrKind::UndefinedControlSequence(name) => {
                "Undefined control sequence \\".to_string() + name
            }
            TexErrKind::UnknownEnv(name) => "Unknown environment '".to_string() + name + "'",
            TexErrKind::EnvBadEnd { begin, end } => {
                "\\begin{".to_string() + begin + "} ended with \\end{" + end + "}"
            }
            TexErrKind::EnvMissingEnd(name) => "Missing \\end{".to_string() + name + "}",
            TexErrKind::MissingBeginExtraEnd(name) => {
                "Missing \\begin{".to_string() + name + "} or extra \\end{" + name + "}"
            }
            TexErrKind::ErroneousNestingEq => {
                "Erroneous nesting of equation structures".to_string()
            }
            TexErrKind::MissingArgFor(cmd) => "Missing argument for ".to_string() + cmd,
            TexErrKind::MissingCloseBracket(cmd) => {
                "Could not find closing ']' for argument to ".to_string() + cmd
            }
            TexErrKind::MissingOpenForSub => "Missing open brace for subscript".to_string(),
            TexErrKind::MissingOpenForSup => "Missing open brace for superscript".to_string(),
            TexErrKind::MisplacedLimits(cmd) => {
                cmd.to_string() + " is allowed only on operators"
            }
            TexErrKind::IllegalCharacter(ch) => {
                format!("Illegal character U+{:04X} in math mode", *ch as u32)
            }
            TexErrKind::UnterminatedControlSequence => {
                "Unterminated control sequence at end of input".to_string()
            }
            TexErrKind::CantUseHash => {
                "You can't use 'macro parameter character #' in math mode".to_string()
            }
            TexErrKind::IllegalMacroParam => "Illegal macro parameter reference".to_string(),
            TexErrKind::MissingCS(cmd) => cmd.to_string() + " must be followed by a control sequence",
            TexErrKind::MaxMacroSub => {
                "Maximum macro substitution count exceeded; is there a recursive macro call?"
                    .to_string()
            }
            TexErrKind::MaxBufferSize => {
                "Token buffer size exceeded; is there a recursive macro call?".to_string()
            }
            TexErrKind::MaxNesting => "Maximum nesting depth exceeded".to_string(),
            TexErrKind::MultipleCommand(cmd) => "Multiple ".to_string() + cmd,
            TexErrKind::MultipleLabel(label) => {
                "Label '".to_string() + label + "' multiply defined"
            }
            TexErrKind::CommandNotAllowedInEnv { cmd, env } => {
                cmd.to_string() + " not allowed in " + env + " environment"
            }
            TexErrKind::MissingDimOrUnits(cmd) => {
                "Missing dimension or its units for ".to_string() + cmd
            }
            TexErrKind::BadColumnSpec(ch) => {
                let mut text = "Illegal column specification '".to_string();
                text.push(*ch);
                text.push('\'');
                text
            }
            TexErrKind::UnknownColor(name) => "Undefined color '".to_string() + name + "'",
            TexErrKind::MultipleBBoxProperty(prop) => {
                prop.to_string() + " specified twice in \\bbox"
            }
            TexErrKind::InvalidBBoxProperty(option) => {
                "'".to_string() + option + "' doesn't look like a color, a padding dimension, or a style"
            }
            TexErrKind::ExpectedRelation => r"Expected a relation after \not".to_string(),
            TexErrKind::RunawayArgument(cmd) => "Runaway argument for ".to_string() + cmd + "?",
            TexErrKind::MismatchUseDef(cmd) => {
                "Use of ".to_string() + cmd + " doesn't match its definition"
            }
            TexErrKind::Internal => "Internal parser error".to_string(),
        }
    }

    /// Soft errors are reported inline; parsing continues after them.
    #[inline]
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            TexErrKind::UnknownColor(_)
                | TexErrKind::MultipleBBoxProperty(_)
                | TexErrKind::InvalidBBoxProperty(_)
        )
    }
}

impl TexError {
    #[inline]
    pub fn kind(&self) -> &TexErrKind {
        &self.1
    }

    pub fn error_message(&self) -> String {
        self.1.string()
    }
}

#[cfg(feature = "ariadne")]
impl TexError {
    /// Convert this error into an [`ariadne::Report`] for pretty-printing.
    pub fn to_report<'name>(
        &self,
        source_name: &'name str,
        with_color: bool,
    ) -> ariadne::Report<'static, (&'name str, Range<usize>)> {
        use ariadne::{Label, Report, ReportKind};

        let label_msg = match &self.1 {
            TexErrKind::DoubleExponent | TexErrKind::DoubleExponentPrime => {
                "second superscript".into()
            }
            TexErrKind::DoubleSubscripts => "second subscript".into(),
            TexErrKind::MissingScript
            | TexErrKind::MissingOpenForSub
            | TexErrKind::MissingOpenForSup => "expected a script here".into(),
            TexErrKind::ExtraOpenMissingClose => "this group is never closed".into(),
            TexErrKind::ExtraCloseMissingOpen => "unmatched \"}\"".into(),
            TexErrKind::MissingLeftExtraRight => "unmatched \"\\right\"".into(),
            TexErrKind::ExtraLeftMissingRight => "expected \"\\right\"".into(),
            TexErrKind::ExtraMiddle => "not inside \\left ... \\right".into(),
            TexErrKind::MissingOrUnrecognizedDelim(cmd) => {
                format!("expected a delimiter after \"{cmd}\"")
            }
            TexErrKind::AmbiguousUseOf(_) => "second fraction in the same group".into(),
            TexErrKind::Misplaced(_) => "only valid in a table".into(),
            TexErrKind::UndefinedControlSequence(_) => "unknown command".into(),
            TexErrKind::UnknownEnv(_) => "unknown environment".into(),
            TexErrKind::EnvBadEnd { begin, .. } => format!("expected \"\\end{{{begin}}}\" here"),
            TexErrKind::EnvMissingEnd(name) => format!("expected \"\\end{{{name}}}\""),
            TexErrKind::MissingBeginExtraEnd(_) => "unmatched \"\\end\"".into(),
            TexErrKind::ErroneousNestingEq => "nested numbered environment".into(),
            TexErrKind::MissingArgFor(_) => "expected an argument here".into(),
            TexErrKind::MissingCloseBracket(_) => "expected \"]\"".into(),
            TexErrKind::MisplacedLimits(_) => "no operator before this".into(),
            TexErrKind::IllegalCharacter(_) => "illegal character".into(),
            TexErrKind::UnterminatedControlSequence => "lone backslash".into(),
            TexErrKind::CantUseHash | TexErrKind::IllegalMacroParam => {
                "unexpected macro parameter".into()
            }
            TexErrKind::MissingCS(_) => "expected a control sequence".into(),
            TexErrKind::MaxMacroSub | TexErrKind::MaxBufferSize | TexErrKind::MaxNesting => {
                "limit exceeded".into()
            }
            TexErrKind::MultipleCommand(_) => "duplicate".into(),
            TexErrKind::MultipleLabel(_) => "label already used".into(),
            TexErrKind::CommandNotAllowedInEnv { .. } => "not allowed here".into(),
            TexErrKind::MissingDimOrUnits(_) => "expected length with units".into(),
            TexErrKind::BadColumnSpec(_) => "expected one of l, c, r or |".into(),
            TexErrKind::UnknownColor(_) => "unknown color".into(),
            TexErrKind::MultipleBBoxProperty(_) | TexErrKind::InvalidBBoxProperty(_) => {
                "invalid option".into()
            }
            TexErrKind::ExpectedRelation => "expected a relation".into(),
            TexErrKind::RunawayArgument(_) => "delimiter never found".into(),
            TexErrKind::MismatchUseDef(_) => "parameter text does not match".into(),
            TexErrKind::Internal => "internal error".into(),
        };

        let mut config = ariadne::Config::default().with_index_type(ariadne::IndexType::Byte);
        if !with_color {
            config = config.with_color(false);
        }
        Report::build(ReportKind::Error, (source_name, self.0.start..self.0.start))
            .with_config(config)
            .with_code(self.1.id())
            .with_message(self.1.string())
            .with_label(Label::new((source_name, self.0.clone())).with_message(label_msg))
            .finish()
    }
}

impl fmt::Display for TexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0.start, self.1.string())
    }
}

impl std::error::Error for TexError {}

/// Create an `merror` node describing `error`.
///
/// The node carries the error identifier and message as the `errorKind` and `errorMessage`
/// properties, so that callers can detect failure without inspecting the text.
pub fn make_error<B: TreeBuilder + ?Sized>(builder: &mut B, error: &TexError) -> NodeId {
    let message = error.1.string();
    let text = builder.create_node(NodeKind::Mtext, &[], &[], Some(&message));
    let node = builder.create_node(NodeKind::Merror, &[text], &[], None);
    builder.set_property(node, Property::ErrorKind, PropValue::from(error.1.id()));
    builder.set_property(node, Property::ErrorMessage, PropValue::from(message.as_str()));
    node
}

/// The `(errorKind, errorMessage)` of an error node.
///
/// `node` may be the error node itself or a `math` root whose only child is one.
pub fn error_of<B: TreeBuilder + ?Sized>(builder: &B, node: NodeId) -> Option<(&str, &str)> {
    let mut node = node;
    while builder.kind(node) != NodeKind::Merror {
        match builder.get_children(node) {
            [only] if matches!(builder.kind(node), NodeKind::Math | NodeKind::Mrow) => {
                node = *only;
            }
            _ => return None,
        }
    }
    let kind = builder.get_property(node, Property::ErrorKind)?.as_str()?;
    let message = builder.get_property(node, Property::ErrorMessage)?.as_str()?;
    Some((kind, message))
}

#[cfg(test)]
mod tests {
    use math_tree::{Arena, dump};

    use super::*;

    #[test]
    fn ids_are_variant_names() {
        assert_eq!(TexErrKind::DoubleExponent.id(), "DoubleExponent");
        assert_eq!(
            TexErrKind::EnvBadEnd {
                begin: "align".into(),
                end: "gather".into()
            }
            .id(),
            "EnvBadEnd"
        );
        assert_eq!(TexErrKind::UnknownColor("x".into()).id(), "UnknownColor");
    }

    #[test]
    fn messages() {
        assert_eq!(
            TexErrKind::AmbiguousUseOf(r"\over".into()).string(),
            r"Ambiguous use of \over"
        );
        assert_eq!(
            TexErrKind::EnvBadEnd {
                begin: "align".into(),
                end: "gather".into()
            }
            .string(),
            r"\begin{align} ended with \end{gather}"
        );
        assert_eq!(
            TexErrKind::IllegalCharacter('\u{1}').string(),
            "Illegal character U+0001 in math mode"
        );
        let err = TexError(3..4, TexErrKind::DoubleExponent);
        assert_eq!(err.to_string(), "3: Double exponent: use braces to clarify");
    }

    #[test]
    fn error_node() {
        let mut arena = Arena::new();
        let err = TexError(0..1, TexErrKind::ExtraMiddle);
        let node = make_error(&mut arena, &err);
        assert_eq!(dump(&arena, node), r#"merror(mrow*(mtext"Extra \\middle"))"#);
        assert_eq!(
            error_of(&arena, node),
            Some(("ExtraMiddle", r"Extra \middle"))
        );
        let math = arena.create_node(NodeKind::Math, &[node], &[], None);
        assert_eq!(error_of(&arena, math).map(|(kind, _)| kind), Some("ExtraMiddle"));
    }
}
