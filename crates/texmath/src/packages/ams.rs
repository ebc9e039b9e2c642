use math_tree::{MathVariant, TexClass};

use super::{EMPTY_CHARS, Package};
use crate::symbols::{
    Def, EnvDef, EnvKind, MathStyle, Prim,
    RelFamily::{Arrow, Equality, Order, Other},
    bin, int_op, mac, mi, mo, rel,
};

pub(super) static PACKAGE: Package = Package {
    name: "ams",
    commands: &COMMANDS,
    chars: &EMPTY_CHARS,
    environments: &ENVIRONMENTS,
    active: "",
    renders_undefined: false,
};

static COMMANDS: phf::Map<&'static str, Def> = phf::phf_map! {
    "dfrac" => Def::Prim(Prim::Frac(Some(MathStyle::Display))),
    "tfrac" => Def::Prim(Prim::Frac(Some(MathStyle::Text))),
    "cfrac" => Def::Prim(Prim::CFrac),
    "binom" => Def::Prim(Prim::Binom(None)),
    "dbinom" => Def::Prim(Prim::Binom(Some(MathStyle::Display))),
    "tbinom" => Def::Prim(Prim::Binom(Some(MathStyle::Text))),
    "genfrac" => Def::Prim(Prim::Genfrac),
    "overset" => Def::Prim(Prim::Overset),
    "underset" => Def::Prim(Prim::Underset),
    "xrightarrow" => Def::Prim(Prim::XArrow("→")),
    "xleftarrow" => Def::Prim(Prim::XArrow("←")),
    "operatorname" => Def::Prim(Prim::OperatorName),
    "boxed" => Def::Prim(Prim::Enclose("box")),
    "boldsymbol" => Def::Prim(Prim::Font(MathVariant::BoldItalic)),
    "tag" => Def::Prim(Prim::Tag),
    "notag" => Def::Prim(Prim::Notag),
    "nonumber" => Def::Prim(Prim::Notag),
    "eqref" => Def::Prim(Prim::Ref(true)),

    "iint" => Def::Char(int_op("∬")),
    "iiint" => Def::Char(int_op("∭")),
    "oiint" => Def::Char(int_op("∯")),
    "varnothing" => Def::Char(mi("⌀")),
    "nexists" => Def::Char(mo("∄", TexClass::Ord)),
    "complement" => Def::Char(mi("∁")),
    "square" => Def::Char(mo("□", TexClass::Ord)),
    "blacksquare" => Def::Char(mo("■", TexClass::Ord)),
    "lozenge" => Def::Char(mo("◊", TexClass::Ord)),
    "checkmark" => Def::Char(mo("✓", TexClass::Ord)),
    "dotplus" => Def::Char(bin("∔")),
    "ltimes" => Def::Char(bin("⋉")),
    "rtimes" => Def::Char(bin("⋊")),
    "leqslant" => Def::Char(rel("⩽", Order)),
    "geqslant" => Def::Char(rel("⩾", Order)),
    "lesssim" => Def::Char(rel("≲", Order)),
    "gtrsim" => Def::Char(rel("≳", Order)),
    "lessgtr" => Def::Char(rel("≶", Order)),
    "nless" => Def::Char(rel("≮", Order)),
    "ngtr" => Def::Char(rel("≯", Order)),
    "nleq" => Def::Char(rel("≰", Order)),
    "ngeq" => Def::Char(rel("≱", Order)),
    "approxeq" => Def::Char(rel("≊", Equality)),
    "backsim" => Def::Char(rel("∽", Equality)),
    "triangleq" => Def::Char(rel("≜", Equality)),
    "ncong" => Def::Char(rel("≇", Equality)),
    "nsim" => Def::Char(rel("≁", Equality)),
    "therefore" => Def::Char(rel("∴", Other)),
    "because" => Def::Char(rel("∵", Other)),
    "subsetneq" => Def::Char(rel("⊊", Other)),
    "supsetneq" => Def::Char(rel("⊋", Other)),
    "nsubseteq" => Def::Char(rel("⊈", Other)),
    "nmid" => Def::Char(rel("∤", Other)),
    "nparallel" => Def::Char(rel("∦", Other)),
    "vDash" => Def::Char(rel("⊨", Other)),
    "Vdash" => Def::Char(rel("⊩", Other)),
    "twoheadrightarrow" => Def::Char(rel("↠", Arrow)),
    "twoheadleftarrow" => Def::Char(rel("↞", Arrow)),
    "rightsquigarrow" => Def::Char(rel("⇝", Arrow)),
    "leftrightarrows" => Def::Char(rel("⇆", Arrow)),
    "rightleftarrows" => Def::Char(rel("⇄", Arrow)),
    "nrightarrow" => Def::Char(rel("↛", Arrow)),
    "nleftarrow" => Def::Char(rel("↚", Arrow)),
    "implies" => mac(r"\;\Longrightarrow\;", 0),
    "impliedby" => mac(r"\;\Longleftarrow\;", 0),
    "lvert" => Def::Delim(mo("|", TexClass::Open)),
    "rvert" => Def::Delim(mo("|", TexClass::Close)),
    "lVert" => Def::Delim(mo("‖", TexClass::Open)),
    "rVert" => Def::Delim(mo("‖", TexClass::Close)),
    "ulcorner" => Def::Delim(mo("⌜", TexClass::Open)),
    "urcorner" => Def::Delim(mo("⌝", TexClass::Close)),
    "llcorner" => Def::Delim(mo("⌞", TexClass::Open)),
    "lrcorner" => Def::Delim(mo("⌟", TexClass::Close)),
};

static ENVIRONMENTS: phf::Map<&'static str, EnvDef> = phf::phf_map! {
    "matrix" => EnvDef::new(EnvKind::Matrix("", "")),
    "pmatrix" => EnvDef::new(EnvKind::Matrix("(", ")")),
    "bmatrix" => EnvDef::new(EnvKind::Matrix("[", "]")),
    "Bmatrix" => EnvDef::new(EnvKind::Matrix("{", "}")),
    "vmatrix" => EnvDef::new(EnvKind::Matrix("|", "|")),
    "Vmatrix" => EnvDef::new(EnvKind::Matrix("‖", "‖")),
    "smallmatrix" => EnvDef::new(EnvKind::SmallMatrix),
    "cases" => EnvDef::new(EnvKind::Cases),
    "aligned" => EnvDef::new(EnvKind::Aligned),
    "gathered" => EnvDef::new(EnvKind::Gathered),
    "split" => EnvDef::new(EnvKind::Split),
    "align" => EnvDef::numbered(EnvKind::Align),
    "align*" => EnvDef::new(EnvKind::Align),
    "gather" => EnvDef::numbered(EnvKind::Gather),
    "gather*" => EnvDef::new(EnvKind::Gather),
    "multline" => EnvDef::numbered(EnvKind::Multline),
    "multline*" => EnvDef::new(EnvKind::Multline),
};
