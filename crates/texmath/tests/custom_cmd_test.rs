use texmath::{Arena, MathDisplay, TexConfig, TexParser, dump, error_of};

fn parser(macros: &[(&str, &str)]) -> TexParser {
    let config = TexConfig {
        macros: macros
            .iter()
            .map(|(name, body)| (name.to_string(), body.to_string()))
            .collect(),
        ..Default::default()
    };
    TexParser::new(config).unwrap()
}

fn convert(parser: &TexParser, tex: &str) -> String {
    let mut arena = Arena::new();
    let root = parser.parse_with_local_counter(tex, MathDisplay::Inline, &mut arena);
    dump(&arena, root)
}

#[test]
fn config_macros() {
    let parser = parser(&[
        ("d", r"\mathrm{d}"),
        (r"\half", r"\frac{1}{2}"),
        ("pair", "(#1, #2)"),
    ]);
    assert_eq!(
        convert(&parser, r"\half"),
        r#"math(mrow*(mfrac(mn"1" mn"2")))"#
    );
    assert_eq!(
        convert(&parser, r"\d"),
        r#"math(mrow*(TeXAtom[ORD](mrow*(mi{mathvariant=normal}"d"))))"#
    );
    let output = convert(&parser, r"\pair{a}{b}");
    assert!(output.contains(r#"mi"a""#) && output.contains(r#"mi"b""#), "{output}");

    let mut arena = Arena::new();
    let err = parser
        .try_parse(r"\pair{a}", MathDisplay::Inline, &mut arena)
        .unwrap_err();
    assert_eq!(err.kind().id(), "MissingArgFor");
}

#[test]
fn config_macros_can_be_redefined() {
    let parser = parser(&[("x", "y")]);
    assert_eq!(convert(&parser, r"\x"), r#"math(mrow*(mi"y"))"#);
    assert_eq!(
        convert(&parser, r"\renewcommand{\x}{z}\x"),
        r#"math(mrow*(mi"z"))"#
    );
    // The redefinition is local to the formula.
    assert_eq!(convert(&parser, r"\x"), r#"math(mrow*(mi"y"))"#);
}

#[test]
fn newcommand_in_formula() {
    let parser = parser(&[]);
    assert_eq!(
        convert(&parser, r"\newcommand{\sq}[1]{#1^2}\sq{x}"),
        r#"math(mrow*(msup(mi"x" mn"2")))"#
    );
    assert_eq!(
        convert(&parser, r"\def\sq#1{#1^2}\sq y"),
        r#"math(mrow*(msup(mi"y" mn"2")))"#
    );
    assert_eq!(
        convert(&parser, r"\let\plus=+ a\plus b"),
        r#"math(mrow*(mi"a" mo"+" mi"b"))"#
    );
}

#[test]
fn recursion_is_bounded() {
    let config = TexConfig {
        max_macros: 50,
        ..Default::default()
    };
    let parser = TexParser::new(config).unwrap();
    let mut arena = Arena::new();
    let root = parser.parse_with_local_counter(r"\def\a{x\a}\a", MathDisplay::Inline, &mut arena);
    let (kind, _) = error_of(&arena, root).unwrap();
    assert_eq!(kind, "MaxMacroSub");
}
