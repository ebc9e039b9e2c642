use math_tree::{Attr, Length, LengthUnit, MathVariant, TexClass};

use super::Package;
use crate::symbols::{
    Decoration, Def, EnvDef, EnvKind, MathStyle, OverKind, PhantomKind, Prim,
    RelFamily::{Arrow, Equality, Order, Other},
    big_op, bin, int_op, mac, mi, mi_upright, mo, rel,
};

pub(super) static PACKAGE: Package = Package {
    name: "base",
    commands: &COMMANDS,
    chars: &CHARS,
    environments: &ENVIRONMENTS,
    active: "~",
    renders_undefined: false,
};

const NOT_STRETCHY: &[(Attr, &str)] = &[(Attr::Stretchy, "false")];

const fn open(text: &'static str) -> Def {
    Def::Delim(mo(text, TexClass::Open).with_attrs(NOT_STRETCHY))
}

const fn close(text: &'static str) -> Def {
    Def::Delim(mo(text, TexClass::Close).with_attrs(NOT_STRETCHY))
}

const fn fence(text: &'static str) -> Def {
    Def::Delim(mo(text, TexClass::Ord).with_attrs(NOT_STRETCHY))
}

const fn em(value: f32) -> Prim {
    Prim::Space(Length::new(value, LengthUnit::Em))
}

static COMMANDS: phf::Map<&'static str, Def> = phf::phf_map! {
    // Greek letters
    "alpha" => Def::Char(mi("α")),
    "beta" => Def::Char(mi("β")),
    "gamma" => Def::Char(mi("γ")),
    "delta" => Def::Char(mi("δ")),
    "epsilon" => Def::Char(mi("ϵ")),
    "varepsilon" => Def::Char(mi("ε")),
    "zeta" => Def::Char(mi("ζ")),
    "eta" => Def::Char(mi("η")),
    "theta" => Def::Char(mi("θ")),
    "vartheta" => Def::Char(mi("ϑ")),
    "iota" => Def::Char(mi("ι")),
    "kappa" => Def::Char(mi("κ")),
    "lambda" => Def::Char(mi("λ")),
    "mu" => Def::Char(mi("μ")),
    "nu" => Def::Char(mi("ν")),
    "xi" => Def::Char(mi("ξ")),
    "omicron" => Def::Char(mi("ο")),
    "pi" => Def::Char(mi("π")),
    "varpi" => Def::Char(mi("ϖ")),
    "rho" => Def::Char(mi("ρ")),
    "varrho" => Def::Char(mi("ϱ")),
    "sigma" => Def::Char(mi("σ")),
    "varsigma" => Def::Char(mi("ς")),
    "tau" => Def::Char(mi("τ")),
    "upsilon" => Def::Char(mi("υ")),
    "phi" => Def::Char(mi("ϕ")),
    "varphi" => Def::Char(mi("φ")),
    "chi" => Def::Char(mi("χ")),
    "psi" => Def::Char(mi("ψ")),
    "omega" => Def::Char(mi("ω")),
    "Gamma" => Def::Char(mi_upright("Γ")),
    "Delta" => Def::Char(mi_upright("Δ")),
    "Theta" => Def::Char(mi_upright("Θ")),
    "Lambda" => Def::Char(mi_upright("Λ")),
    "Xi" => Def::Char(mi_upright("Ξ")),
    "Pi" => Def::Char(mi_upright("Π")),
    "Sigma" => Def::Char(mi_upright("Σ")),
    "Upsilon" => Def::Char(mi_upright("Υ")),
    "Phi" => Def::Char(mi_upright("Φ")),
    "Psi" => Def::Char(mi_upright("Ψ")),
    "Omega" => Def::Char(mi_upright("Ω")),

    // Ordinary symbols
    "infty" => Def::Char(mi("∞")),
    "partial" => Def::Char(mi("∂")),
    "nabla" => Def::Char(mi("∇")),
    "emptyset" => Def::Char(mi("∅")),
    "hbar" => Def::Char(mi("ℏ")),
    "ell" => Def::Char(mi("ℓ")),
    "aleph" => Def::Char(mi("ℵ")),
    "wp" => Def::Char(mi("℘")),
    "Re" => Def::Char(mi("ℜ")),
    "Im" => Def::Char(mi("ℑ")),
    "imath" => Def::Char(mi("ı")),
    "jmath" => Def::Char(mi("ȷ")),
    "angle" => Def::Char(mi("∠")),
    "triangle" => Def::Char(mi("△")),
    "top" => Def::Char(mo("⊤", TexClass::Ord)),
    "bot" => Def::Char(mo("⊥", TexClass::Ord)),
    "forall" => Def::Char(mo("∀", TexClass::Ord)),
    "exists" => Def::Char(mo("∃", TexClass::Ord)),
    "neg" => Def::Char(mo("¬", TexClass::Ord)),
    "lnot" => Def::Char(mo("¬", TexClass::Ord)),
    "prime" => Def::Char(mo("′", TexClass::Ord)),
    "flat" => Def::Char(mo("♭", TexClass::Ord)),
    "natural" => Def::Char(mo("♮", TexClass::Ord)),
    "sharp" => Def::Char(mo("♯", TexClass::Ord)),
    "clubsuit" => Def::Char(mo("♣", TexClass::Ord)),
    "diamondsuit" => Def::Char(mo("♢", TexClass::Ord)),
    "heartsuit" => Def::Char(mo("♡", TexClass::Ord)),
    "spadesuit" => Def::Char(mo("♠", TexClass::Ord)),
    "ldots" => Def::Char(mo("…", TexClass::Inner)),
    "cdots" => Def::Char(mo("⋯", TexClass::Inner)),
    "vdots" => Def::Char(mo("⋮", TexClass::Ord)),
    "ddots" => Def::Char(mo("⋱", TexClass::Inner)),
    "dots" => mac(r"\ldots", 0),
    "colon" => mac(r"\mathpunct{:}", 0),
    "surd" => Def::Char(mo("√", TexClass::Ord)),
    "$" => Def::Char(mo("$", TexClass::Ord)),
    "%" => Def::Char(mo("%", TexClass::Ord)),
    "&" => Def::Char(mo("&", TexClass::Ord)),
    "#" => Def::Char(mo("#", TexClass::Ord)),
    "_" => Def::Char(mo("_", TexClass::Ord)),

    // Binary operators
    "pm" => Def::Char(bin("±")),
    "mp" => Def::Char(bin("∓")),
    "times" => Def::Char(bin("×")),
    "div" => Def::Char(bin("÷")),
    "cdot" => Def::Char(bin("⋅")),
    "ast" => Def::Char(bin("∗")),
    "star" => Def::Char(bin("⋆")),
    "circ" => Def::Char(bin("∘")),
    "bullet" => Def::Char(bin("∙")),
    "cap" => Def::Char(bin("∩")),
    "cup" => Def::Char(bin("∪")),
    "wedge" => Def::Char(bin("∧")),
    "land" => Def::Char(bin("∧")),
    "vee" => Def::Char(bin("∨")),
    "lor" => Def::Char(bin("∨")),
    "setminus" => Def::Char(bin("∖")),
    "oplus" => Def::Char(bin("⊕")),
    "ominus" => Def::Char(bin("⊖")),
    "otimes" => Def::Char(bin("⊗")),
    "oslash" => Def::Char(bin("⊘")),
    "odot" => Def::Char(bin("⊙")),
    "sqcap" => Def::Char(bin("⊓")),
    "sqcup" => Def::Char(bin("⊔")),
    "uplus" => Def::Char(bin("⊎")),
    "amalg" => Def::Char(bin("⨿")),
    "diamond" => Def::Char(bin("⋄")),
    "bigcirc" => Def::Char(bin("◯")),
    "bigtriangleup" => Def::Char(bin("△")),
    "bigtriangledown" => Def::Char(bin("▽")),
    "triangleleft" => Def::Char(bin("◃")),
    "triangleright" => Def::Char(bin("▹")),
    "wr" => Def::Char(bin("≀")),
    "dagger" => Def::Char(bin("†")),
    "ddagger" => Def::Char(bin("‡")),
    "bmod" => mac(r"\mathbin{\mathrm{mod}}", 0),
    "pmod" => mac(r"\quad(\mathrm{mod}\,#1)", 1),

    // Relations
    "lt" => Def::Char(rel("<", Order)),
    "gt" => Def::Char(rel(">", Order)),
    "le" => Def::Char(rel("≤", Order)),
    "leq" => Def::Char(rel("≤", Order)),
    "ge" => Def::Char(rel("≥", Order)),
    "geq" => Def::Char(rel("≥", Order)),
    "ll" => Def::Char(rel("≪", Order)),
    "gg" => Def::Char(rel("≫", Order)),
    "prec" => Def::Char(rel("≺", Order)),
    "succ" => Def::Char(rel("≻", Order)),
    "preceq" => Def::Char(rel("⪯", Order)),
    "succeq" => Def::Char(rel("⪰", Order)),
    "equiv" => Def::Char(rel("≡", Equality)),
    "sim" => Def::Char(rel("∼", Equality)),
    "simeq" => Def::Char(rel("≃", Equality)),
    "approx" => Def::Char(rel("≈", Equality)),
    "cong" => Def::Char(rel("≅", Equality)),
    "ne" => Def::Char(rel("≠", Equality)),
    "neq" => Def::Char(rel("≠", Equality)),
    "doteq" => Def::Char(rel("≐", Equality)),
    "propto" => Def::Char(rel("∝", Equality)),
    "asymp" => Def::Char(rel("≍", Equality)),
    "in" => Def::Char(rel("∈", Other)),
    "ni" => Def::Char(rel("∋", Other)),
    "owns" => Def::Char(rel("∋", Other)),
    "notin" => Def::Char(rel("∉", Other)),
    "subset" => Def::Char(rel("⊂", Other)),
    "supset" => Def::Char(rel("⊃", Other)),
    "subseteq" => Def::Char(rel("⊆", Other)),
    "supseteq" => Def::Char(rel("⊇", Other)),
    "sqsubseteq" => Def::Char(rel("⊑", Other)),
    "sqsupseteq" => Def::Char(rel("⊒", Other)),
    "mid" => Def::Char(rel("∣", Other)),
    "parallel" => Def::Char(rel("∥", Other)),
    "perp" => Def::Char(rel("⊥", Other)),
    "vdash" => Def::Char(rel("⊢", Other)),
    "dashv" => Def::Char(rel("⊣", Other)),
    "models" => Def::Char(rel("⊨", Other)),
    "smile" => Def::Char(rel("⌣", Other)),
    "frown" => Def::Char(rel("⌢", Other)),
    "bowtie" => Def::Char(rel("⋈", Other)),

    // Arrows
    "to" => Def::Char(rel("→", Arrow)),
    "rightarrow" => Def::Char(rel("→", Arrow)),
    "leftarrow" => Def::Char(rel("←", Arrow)),
    "gets" => Def::Char(rel("←", Arrow)),
    "leftrightarrow" => Def::Char(rel("↔", Arrow)),
    "Rightarrow" => Def::Char(rel("⇒", Arrow)),
    "Leftarrow" => Def::Char(rel("⇐", Arrow)),
    "Leftrightarrow" => Def::Char(rel("⇔", Arrow)),
    "mapsto" => Def::Char(rel("↦", Arrow)),
    "longrightarrow" => Def::Char(rel("⟶", Arrow)),
    "longleftarrow" => Def::Char(rel("⟵", Arrow)),
    "longleftrightarrow" => Def::Char(rel("⟷", Arrow)),
    "Longrightarrow" => Def::Char(rel("⟹", Arrow)),
    "Longleftarrow" => Def::Char(rel("⟸", Arrow)),
    "Longleftrightarrow" => Def::Char(rel("⟺", Arrow)),
    "longmapsto" => Def::Char(rel("⟼", Arrow)),
    "hookrightarrow" => Def::Char(rel("↪", Arrow)),
    "hookleftarrow" => Def::Char(rel("↩", Arrow)),
    "uparrow" => Def::Char(rel("↑", Arrow)),
    "downarrow" => Def::Char(rel("↓", Arrow)),
    "updownarrow" => Def::Char(rel("↕", Arrow)),
    "Uparrow" => Def::Char(rel("⇑", Arrow)),
    "Downarrow" => Def::Char(rel("⇓", Arrow)),
    "Updownarrow" => Def::Char(rel("⇕", Arrow)),
    "nearrow" => Def::Char(rel("↗", Arrow)),
    "searrow" => Def::Char(rel("↘", Arrow)),
    "swarrow" => Def::Char(rel("↙", Arrow)),
    "nwarrow" => Def::Char(rel("↖", Arrow)),
    "rightharpoonup" => Def::Char(rel("⇀", Arrow)),
    "rightharpoondown" => Def::Char(rel("⇁", Arrow)),
    "leftharpoonup" => Def::Char(rel("↼", Arrow)),
    "leftharpoondown" => Def::Char(rel("↽", Arrow)),
    "rightleftharpoons" => Def::Char(rel("⇌", Arrow)),
    "iff" => mac(r"\;\Longleftrightarrow\;", 0),

    // Large operators
    "sum" => Def::Char(big_op("∑")),
    "prod" => Def::Char(big_op("∏")),
    "coprod" => Def::Char(big_op("∐")),
    "bigcup" => Def::Char(big_op("⋃")),
    "bigcap" => Def::Char(big_op("⋂")),
    "bigvee" => Def::Char(big_op("⋁")),
    "bigwedge" => Def::Char(big_op("⋀")),
    "bigoplus" => Def::Char(big_op("⨁")),
    "bigotimes" => Def::Char(big_op("⨂")),
    "bigodot" => Def::Char(big_op("⨀")),
    "biguplus" => Def::Char(big_op("⨄")),
    "bigsqcup" => Def::Char(big_op("⨆")),
    "int" => Def::Char(int_op("∫")),
    "oint" => Def::Char(int_op("∮")),

    // Named functions
    "arccos" => Def::Prim(Prim::NamedFn("arccos")),
    "arcsin" => Def::Prim(Prim::NamedFn("arcsin")),
    "arctan" => Def::Prim(Prim::NamedFn("arctan")),
    "arg" => Def::Prim(Prim::NamedFn("arg")),
    "cos" => Def::Prim(Prim::NamedFn("cos")),
    "cosh" => Def::Prim(Prim::NamedFn("cosh")),
    "cot" => Def::Prim(Prim::NamedFn("cot")),
    "coth" => Def::Prim(Prim::NamedFn("coth")),
    "csc" => Def::Prim(Prim::NamedFn("csc")),
    "deg" => Def::Prim(Prim::NamedFn("deg")),
    "dim" => Def::Prim(Prim::NamedFn("dim")),
    "exp" => Def::Prim(Prim::NamedFn("exp")),
    "hom" => Def::Prim(Prim::NamedFn("hom")),
    "ker" => Def::Prim(Prim::NamedFn("ker")),
    "lg" => Def::Prim(Prim::NamedFn("lg")),
    "ln" => Def::Prim(Prim::NamedFn("ln")),
    "log" => Def::Prim(Prim::NamedFn("log")),
    "sec" => Def::Prim(Prim::NamedFn("sec")),
    "sin" => Def::Prim(Prim::NamedFn("sin")),
    "sinh" => Def::Prim(Prim::NamedFn("sinh")),
    "tan" => Def::Prim(Prim::NamedFn("tan")),
    "tanh" => Def::Prim(Prim::NamedFn("tanh")),
    "lim" => Def::Prim(Prim::NamedOp("lim")),
    "limsup" => Def::Prim(Prim::NamedOp("lim sup")),
    "liminf" => Def::Prim(Prim::NamedOp("lim inf")),
    "max" => Def::Prim(Prim::NamedOp("max")),
    "min" => Def::Prim(Prim::NamedOp("min")),
    "sup" => Def::Prim(Prim::NamedOp("sup")),
    "inf" => Def::Prim(Prim::NamedOp("inf")),
    "det" => Def::Prim(Prim::NamedOp("det")),
    "gcd" => Def::Prim(Prim::NamedOp("gcd")),
    "Pr" => Def::Prim(Prim::NamedOp("Pr")),

    // Delimiters
    "{" => open("{"),
    "}" => close("}"),
    "lbrace" => open("{"),
    "rbrace" => close("}"),
    "lbrack" => open("["),
    "rbrack" => close("]"),
    "langle" => open("⟨"),
    "rangle" => close("⟩"),
    "lfloor" => open("⌊"),
    "rfloor" => close("⌋"),
    "lceil" => open("⌈"),
    "rceil" => close("⌉"),
    "|" => fence("‖"),
    "Vert" => fence("‖"),
    "vert" => fence("|"),
    "backslash" => fence("\\"),

    // Structure
    "begin" => Def::Prim(Prim::Begin),
    "end" => Def::Prim(Prim::End),
    "left" => Def::Prim(Prim::Left),
    "right" => Def::Prim(Prim::Right),
    "middle" => Def::Prim(Prim::Middle),
    "big" => Def::Prim(Prim::Big("1.2em", TexClass::Ord)),
    "Big" => Def::Prim(Prim::Big("1.623em", TexClass::Ord)),
    "bigg" => Def::Prim(Prim::Big("2.047em", TexClass::Ord)),
    "Bigg" => Def::Prim(Prim::Big("2.470em", TexClass::Ord)),
    "bigl" => Def::Prim(Prim::Big("1.2em", TexClass::Open)),
    "Bigl" => Def::Prim(Prim::Big("1.623em", TexClass::Open)),
    "biggl" => Def::Prim(Prim::Big("2.047em", TexClass::Open)),
    "Biggl" => Def::Prim(Prim::Big("2.470em", TexClass::Open)),
    "bigr" => Def::Prim(Prim::Big("1.2em", TexClass::Close)),
    "Bigr" => Def::Prim(Prim::Big("1.623em", TexClass::Close)),
    "biggr" => Def::Prim(Prim::Big("2.047em", TexClass::Close)),
    "Biggr" => Def::Prim(Prim::Big("2.470em", TexClass::Close)),
    "bigm" => Def::Prim(Prim::Big("1.2em", TexClass::Rel)),
    "Bigm" => Def::Prim(Prim::Big("1.623em", TexClass::Rel)),
    "biggm" => Def::Prim(Prim::Big("2.047em", TexClass::Rel)),
    "Biggm" => Def::Prim(Prim::Big("2.470em", TexClass::Rel)),
    "frac" => Def::Prim(Prim::Frac(None)),
    "binom" => mac(r"{#1 \choose #2}", 2),
    "over" => Def::Prim(Prim::Over(OverKind::Over)),
    "atop" => Def::Prim(Prim::Over(OverKind::Atop)),
    "above" => Def::Prim(Prim::Over(OverKind::Above)),
    "choose" => Def::Prim(Prim::Over(OverKind::Choose)),
    "brace" => Def::Prim(Prim::Over(OverKind::Brace)),
    "brack" => Def::Prim(Prim::Over(OverKind::Brack)),
    "overwithdelims" => Def::Prim(Prim::Over(OverKind::OverWithDelims)),
    "atopwithdelims" => Def::Prim(Prim::Over(OverKind::AtopWithDelims)),
    "abovewithdelims" => Def::Prim(Prim::Over(OverKind::AboveWithDelims)),
    "sqrt" => Def::Prim(Prim::Sqrt),
    "limits" => Def::Prim(Prim::Limits(true)),
    "nolimits" => Def::Prim(Prim::Limits(false)),
    "not" => Def::Prim(Prim::Not),

    // Fonts and styles
    "mathrm" => Def::Prim(Prim::Font(MathVariant::Normal)),
    "mathup" => Def::Prim(Prim::Font(MathVariant::Normal)),
    "mathbf" => Def::Prim(Prim::Font(MathVariant::Bold)),
    "mathit" => Def::Prim(Prim::Font(MathVariant::Italic)),
    "mathbb" => Def::Prim(Prim::Font(MathVariant::DoubleStruck)),
    "mathfrak" => Def::Prim(Prim::Font(MathVariant::Fraktur)),
    "mathcal" => Def::Prim(Prim::Font(MathVariant::Calligraphic)),
    "mathscr" => Def::Prim(Prim::Font(MathVariant::Script)),
    "mathsf" => Def::Prim(Prim::Font(MathVariant::SansSerif)),
    "mathtt" => Def::Prim(Prim::Font(MathVariant::Monospace)),
    "rm" => Def::Prim(Prim::FontSwitch(MathVariant::Normal)),
    "bf" => Def::Prim(Prim::FontSwitch(MathVariant::Bold)),
    "it" => Def::Prim(Prim::FontSwitch(MathVariant::Italic)),
    "cal" => Def::Prim(Prim::FontSwitch(MathVariant::Calligraphic)),
    "sf" => Def::Prim(Prim::FontSwitch(MathVariant::SansSerif)),
    "tt" => Def::Prim(Prim::FontSwitch(MathVariant::Monospace)),
    "displaystyle" => Def::Prim(Prim::Style(MathStyle::Display)),
    "textstyle" => Def::Prim(Prim::Style(MathStyle::Text)),
    "scriptstyle" => Def::Prim(Prim::Style(MathStyle::Script)),
    "scriptscriptstyle" => Def::Prim(Prim::Style(MathStyle::ScriptScript)),
    "mathord" => Def::Prim(Prim::Class(TexClass::Ord)),
    "mathop" => Def::Prim(Prim::Class(TexClass::Op)),
    "mathbin" => Def::Prim(Prim::Class(TexClass::Bin)),
    "mathrel" => Def::Prim(Prim::Class(TexClass::Rel)),
    "mathopen" => Def::Prim(Prim::Class(TexClass::Open)),
    "mathclose" => Def::Prim(Prim::Class(TexClass::Close)),
    "mathpunct" => Def::Prim(Prim::Class(TexClass::Punct)),
    "mathinner" => Def::Prim(Prim::Class(TexClass::Inner)),

    // Spacing
    "," => Def::Prim(Prim::Space(Length::mu(3.0))),
    "thinspace" => Def::Prim(Prim::Space(Length::mu(3.0))),
    ":" => Def::Prim(Prim::Space(Length::mu(4.0))),
    ">" => Def::Prim(Prim::Space(Length::mu(4.0))),
    "medspace" => Def::Prim(Prim::Space(Length::mu(4.0))),
    ";" => Def::Prim(Prim::Space(Length::mu(5.0))),
    "thickspace" => Def::Prim(Prim::Space(Length::mu(5.0))),
    "!" => Def::Prim(Prim::Space(Length::mu(-3.0))),
    "negthinspace" => Def::Prim(Prim::Space(Length::mu(-3.0))),
    "enspace" => Def::Prim(em(0.5)),
    "quad" => Def::Prim(em(1.0)),
    "qquad" => Def::Prim(em(2.0)),
    " " => Def::Prim(Prim::NonBreakingSpace),
    "space" => Def::Prim(Prim::NonBreakingSpace),
    "nobreakspace" => Def::Prim(Prim::NonBreakingSpace),
    "hspace" => Def::Prim(Prim::Hspace),
    "kern" => Def::Prim(Prim::Kern(false)),
    "hskip" => Def::Prim(Prim::Kern(false)),
    "mkern" => Def::Prim(Prim::Kern(true)),
    "mskip" => Def::Prim(Prim::Kern(true)),

    // Text
    "text" => Def::Prim(Prim::Text(None)),
    "mbox" => Def::Prim(Prim::Text(None)),
    "hbox" => Def::Prim(Prim::Text(None)),
    "textrm" => Def::Prim(Prim::Text(Some(MathVariant::Normal))),
    "textbf" => Def::Prim(Prim::Text(Some(MathVariant::Bold))),
    "textit" => Def::Prim(Prim::Text(Some(MathVariant::Italic))),
    "textsf" => Def::Prim(Prim::Text(Some(MathVariant::SansSerif))),
    "texttt" => Def::Prim(Prim::Text(Some(MathVariant::Monospace))),

    // Boxes and decorations
    "phantom" => Def::Prim(Prim::Phantom(PhantomKind::Both)),
    "hphantom" => Def::Prim(Prim::Phantom(PhantomKind::Horizontal)),
    "vphantom" => Def::Prim(Prim::Phantom(PhantomKind::Vertical)),
    "smash" => Def::Prim(Prim::Smash),
    "mathstrut" => mac(r"\vphantom{(}", 0),
    "hat" => Def::Prim(Prim::Accent("^", false)),
    "check" => Def::Prim(Prim::Accent("ˇ", false)),
    "tilde" => Def::Prim(Prim::Accent("~", false)),
    "acute" => Def::Prim(Prim::Accent("´", false)),
    "grave" => Def::Prim(Prim::Accent("`", false)),
    "dot" => Def::Prim(Prim::Accent("˙", false)),
    "ddot" => Def::Prim(Prim::Accent("¨", false)),
    "breve" => Def::Prim(Prim::Accent("˘", false)),
    "bar" => Def::Prim(Prim::Accent("¯", false)),
    "vec" => Def::Prim(Prim::Accent("→", false)),
    "mathring" => Def::Prim(Prim::Accent("˚", false)),
    "widehat" => Def::Prim(Prim::Accent("^", true)),
    "widetilde" => Def::Prim(Prim::Accent("~", true)),
    "overline" => Def::Prim(Prim::Decorate(Decoration::Overline)),
    "underline" => Def::Prim(Prim::Decorate(Decoration::Underline)),
    "overbrace" => Def::Prim(Prim::Decorate(Decoration::Overbrace)),
    "underbrace" => Def::Prim(Prim::Decorate(Decoration::Underbrace)),
    "overrightarrow" => Def::Prim(Prim::Decorate(Decoration::Overarrow("→"))),
    "overleftarrow" => Def::Prim(Prim::Decorate(Decoration::Overarrow("←"))),
    "overleftrightarrow" => Def::Prim(Prim::Decorate(Decoration::Overarrow("↔"))),
    "underrightarrow" => Def::Prim(Prim::Decorate(Decoration::Underarrow("→"))),
    "underleftarrow" => Def::Prim(Prim::Decorate(Decoration::Underarrow("←"))),
    "stackrel" => Def::Prim(Prim::Stackrel),

    // Tables
    "\\" => Def::Prim(Prim::Cr),
    "cr" => Def::Prim(Prim::Cr),
    "newline" => Def::Prim(Prim::Cr),
    "hline" => Def::Prim(Prim::Hline),
    "matrix" => Def::Env(EnvDef::new(EnvKind::Matrix("", ""))),
    "pmatrix" => Def::Env(EnvDef::new(EnvKind::Matrix("(", ")"))),
    "cases" => Def::Env(EnvDef::new(EnvKind::Cases)),
    "label" => Def::Prim(Prim::Label),
    "ref" => Def::Prim(Prim::Ref(false)),
};

static CHARS: phf::Map<char, Def> = phf::phf_map! {
    '+' => Def::Char(bin("+")),
    '-' => Def::Char(bin("−")),
    '*' => Def::Char(bin("∗")),
    '/' => Def::Char(mo("/", TexClass::Ord)),
    '=' => Def::Char(rel("=", Equality)),
    '<' => Def::Char(rel("<", Order)),
    '>' => Def::Char(rel(">", Order)),
    ':' => Def::Char(rel(":", Other)),
    '(' => open("("),
    ')' => close(")"),
    '[' => open("["),
    ']' => close("]"),
    '|' => fence("|"),
    ',' => Def::Char(mo(",", TexClass::Punct)),
    ';' => Def::Char(mo(";", TexClass::Punct)),
    '!' => Def::Char(mo("!", TexClass::Close)),
    '?' => Def::Char(mo("?", TexClass::Close)),
    '.' => Def::Char(mo(".", TexClass::Ord)),
    '~' => Def::Prim(Prim::NonBreakingSpace),
    '≤' => Def::Char(rel("≤", Order)),
    '≥' => Def::Char(rel("≥", Order)),
    '≠' => Def::Char(rel("≠", Equality)),
    '≈' => Def::Char(rel("≈", Equality)),
    '≡' => Def::Char(rel("≡", Equality)),
    '∈' => Def::Char(rel("∈", Other)),
    '→' => Def::Char(rel("→", Arrow)),
    '←' => Def::Char(rel("←", Arrow)),
    '×' => Def::Char(bin("×")),
    '±' => Def::Char(bin("±")),
    '⋅' => Def::Char(bin("⋅")),
    '−' => Def::Char(bin("−")),
    '∑' => Def::Char(big_op("∑")),
    '∏' => Def::Char(big_op("∏")),
    '∫' => Def::Char(int_op("∫")),
};

static ENVIRONMENTS: phf::Map<&'static str, EnvDef> = phf::phf_map! {
    "array" => EnvDef::new(EnvKind::Array),
    "equation" => EnvDef::numbered(EnvKind::Equation),
    "equation*" => EnvDef::new(EnvKind::Equation),
};

#[cfg(test)]
mod tests {
    use math_tree::NodeKind;

    use super::*;

    #[test]
    fn greek_capitals_are_upright() {
        let Some(Def::Char(gamma)) = COMMANDS.get("Gamma") else {
            panic!("\\Gamma is not a character");
        };
        assert_eq!(gamma.kind, NodeKind::Mi);
        assert_eq!(gamma.attrs, &[(Attr::Mathvariant, "normal")]);
    }

    #[test]
    fn relations_have_families() {
        let Some(Def::Char(le)) = CHARS.get(&'<') else {
            panic!("< is not a character");
        };
        assert_eq!(le.class, TexClass::Rel);
        assert_eq!(le.family, Some(Order));
        let Some(Def::Char(sum)) = COMMANDS.get("sum") else {
            panic!("\\sum is not a character");
        };
        assert!(sum.limits);
    }
}
