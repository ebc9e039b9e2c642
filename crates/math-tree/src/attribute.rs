#[cfg(feature = "serde")]
use serde::Serialize;

use strum_macros::IntoStaticStr;

/// Presentation attributes that end up in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[strum(serialize_all = "lowercase")]
pub enum Attr {
    Mathvariant,
    Stretchy,
    Fence,
    Symmetric,
    Separator,
    Lspace,
    Rspace,
    Largeop,
    Movablelimits,
    Minsize,
    Maxsize,
    Accent,
    Accentunder,
    Linethickness,
    Displaystyle,
    Scriptlevel,
    Width,
    Height,
    Depth,
    Voffset,
    Notation,
    Mathcolor,
    Mathbackground,
    Columnalign,
    Rowalign,
    Columnlines,
    Rowlines,
    Columnspacing,
    Rowspacing,
    Frame,
    Framespacing,
    Side,
    Minlabelspacing,
    Display,
    Style,
    Id,
    Href,
}

/// The TeX spacing class of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[strum(serialize_all = "UPPERCASE")]
pub enum TexClass {
    /// `mathord`
    #[default]
    Ord = 0,
    /// `mathop`
    Op,
    /// `mathbin`
    Bin,
    /// `mathrel`
    Rel,
    /// `mathopen`
    Open,
    /// `mathclose`
    Close,
    /// `mathpunct`
    Punct,
    /// `mathinner`
    Inner,
    /// `\vcenter`
    VCenter,
    /// No class; the atom is invisible to spacing (e.g. explicit spaces).
    None,
}

/// Parser bookkeeping stored on nodes; never written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[strum(serialize_all = "camelCase")]
pub enum Property {
    TexClass,
    /// Marks an implicit row inserted by the builder.
    Inferred,
    /// Scripts on this node are placed as limits (under/over).
    MoveSupSub,
    /// The node came from `\limits`/`\nolimits` and must not be changed again.
    LimitsSet,
    /// The superscript of this script node is a prime node.
    Primes,
    /// Opening delimiter of a `\left ... \right` row.
    Open,
    /// Closing delimiter of a `\left ... \right` row.
    Close,
    /// The node is a named function such as `\sin`.
    FnOp,
    /// Family used to decide which adjacent relations may be merged.
    RelFamily,
    /// Marks a reference placeholder created by `\ref`.
    Ref,
    ErrorKind,
    ErrorMessage,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum PropValue {
    Bool(bool),
    Class(TexClass),
    Str(Box<str>),
}

impl PropValue {
    #[inline]
    pub fn as_bool(&self) -> bool {
        matches!(self, PropValue::Bool(true))
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for PropValue {
    #[inline]
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<TexClass> for PropValue {
    #[inline]
    fn from(value: TexClass) -> Self {
        PropValue::Class(value)
    }
}

impl From<&str> for PropValue {
    #[inline]
    fn from(value: &str) -> Self {
        PropValue::Str(value.into())
    }
}

/// `mathvariant` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MathVariant {
    #[strum(serialize = "normal")]
    Normal,
    #[strum(serialize = "bold")]
    Bold,
    #[strum(serialize = "italic")]
    Italic,
    #[strum(serialize = "bold-italic")]
    BoldItalic,
    #[strum(serialize = "double-struck")]
    DoubleStruck,
    #[strum(serialize = "fraktur")]
    Fraktur,
    #[strum(serialize = "bold-fraktur")]
    BoldFraktur,
    #[strum(serialize = "script")]
    Script,
    #[strum(serialize = "bold-script")]
    BoldScript,
    #[strum(serialize = "sans-serif")]
    SansSerif,
    #[strum(serialize = "bold-sans-serif")]
    BoldSansSerif,
    #[strum(serialize = "sans-serif-italic")]
    SansSerifItalic,
    #[strum(serialize = "monospace")]
    Monospace,
    #[strum(serialize = "-tex-calligraphic")]
    Calligraphic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names() {
        assert_eq!(<&str>::from(Attr::Movablelimits), "movablelimits");
        assert_eq!(<&str>::from(Attr::Mathbackground), "mathbackground");
        assert_eq!(<&str>::from(TexClass::Punct), "PUNCT");
        assert_eq!(<&str>::from(Property::MoveSupSub), "moveSupSub");
        assert_eq!(<&str>::from(MathVariant::DoubleStruck), "double-struck");
    }
}
