use texmath::{Arena, MathDisplay, NodeKind, TexConfig, TexParser, TreeBuilder, dump};

fn convert(tex: &str, display: MathDisplay) -> String {
    let parser = TexParser::new(TexConfig::default()).unwrap();
    let mut arena = Arena::new();
    let root = parser.parse_with_local_counter(tex, display, &mut arena);
    dump(&arena, root)
}

#[test]
fn main() {
    let problems = [
        ("empty", "", "math(mrow*)"),
        ("identifier", "x", r#"math(mrow*(mi"x"))"#),
        (
            "quadratic_formula",
            r"x = \frac{-b \pm \sqrt{b^2 - 4ac}}{2a}",
            r#"math(mrow*(mi"x" mo"=" mfrac(mrow(mo"−" mi"b" mo"±" msqrt(mrow*(msup(mi"b" mn"2") mo"−" mn"4" mi"a" mi"c"))) mrow(mn"2" mi"a"))))"#,
        ),
        (
            "sum_with_limits",
            r"\sum_{i}^n",
            r#"math(mrow*(munderover(mo{movablelimits=true}"∑" TeXAtom[ORD](mrow*(mi"i")) mi"n")))"#,
        ),
        (
            "function_application",
            r"\sin x",
            r#"math(mrow*(mi"sin" mo"⁡" mi"x"))"#,
        ),
        (
            "fenced",
            r"\left(\right)",
            r#"math(mrow*(mrow[INNER](mo{fence=true,stretchy=true,symmetric=true}"(" mo{fence=true,stretchy=true,symmetric=true}")")))"#,
        ),
        (
            "root",
            r"\sqrt[3]{x}",
            r#"math(mrow*(mroot(mi"x" mn"3")))"#,
        ),
        (
            "comment",
            "x % a comment\n+ 1",
            r#"math(mrow*(mi"x" mo"+" mn"1"))"#,
        ),
        (
            "text",
            r"\text{abc}",
            r#"math(mrow*(mtext"abc"))"#,
        ),
        (
            "negated_relation",
            r"a \not= b",
            r#"math(mrow*(mi"a" mo"≠" mi"b"))"#,
        ),
    ];

    for (name, problem, expected) in problems {
        assert_eq!(convert(problem, MathDisplay::Inline), expected, "{name}: {problem}");
    }
}

#[test]
fn display_mode() {
    assert_eq!(
        convert("x", MathDisplay::Block),
        r#"math{display=block}(mrow*(mi"x"))"#
    );
}

#[test]
fn dyn_builder() {
    let parser = TexParser::new(TexConfig::default()).unwrap();
    let mut arena = Arena::new();
    let builder: &mut dyn TreeBuilder = &mut arena;
    let root = parser.parse_with_local_counter(r"\frac12", MathDisplay::Inline, &mut *builder);
    assert_eq!(builder.kind(root), NodeKind::Math);
    let row = builder.get_children(root)[0];
    assert!(builder.is_inferred(row));
    let frac = builder.get_children(row)[0];
    assert_eq!(builder.kind(frac), NodeKind::Mfrac);
    assert_eq!(builder.parent(frac), Some(row));
    assert_eq!(dump(&*builder, root), r#"math(mrow*(mfrac(mn"1" mn"2")))"#);
}

#[test]
fn arena_is_reusable() {
    let parser = TexParser::new(TexConfig::default()).unwrap();
    let mut arena = Arena::new();
    let first = parser.parse_with_local_counter("a", MathDisplay::Inline, &mut arena);
    let second = parser.parse_with_local_counter("b", MathDisplay::Inline, &mut arena);
    assert_ne!(first, second);
    assert_eq!(dump(&arena, first), r#"math(mrow*(mi"a"))"#);
    assert_eq!(dump(&arena, second), r#"math(mrow*(mi"b"))"#);
}

#[test]
fn matrices() {
    let output = convert(
        r"\begin{pmatrix} 1 & 0 \\ 0 & 1 \end{pmatrix}",
        MathDisplay::Inline,
    );
    assert!(output.contains(r#"mo{fence=true,stretchy=true,symmetric=true}"(""#), "{output}");
    assert_eq!(output.matches("mtr").count(), 2, "{output}");
    assert_eq!(output.matches("mtd").count(), 4, "{output}");
}
