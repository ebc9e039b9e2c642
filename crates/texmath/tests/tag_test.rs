use texmath::{Arena, MathDisplay, TagStyle, TexConfig, TexParser, dump};

fn parser(tag_style: TagStyle) -> TexParser {
    TexParser::new(TexConfig {
        tag_style,
        ..Default::default()
    })
    .unwrap()
}

fn block(parser: &TexParser, tex: &str) -> String {
    let mut arena = Arena::new();
    let root = parser.parse_with_local_counter(tex, MathDisplay::Block, &mut arena);
    dump(&arena, root)
}

#[test]
fn ams_align_is_numbered() {
    let output = block(&parser(TagStyle::Ams), "x = 1");
    assert!(!output.contains("mjx-eqn"), "{output}");

    let output = block(&parser(TagStyle::Ams), r"\begin{align} a \\ b \end{align}");
    assert!(output.starts_with("math{display=block}"), "{output}");
    assert!(output.contains(r#"mtd{id=mjx-eqn:1}(mrow*(mtext"(1)"))"#), "{output}");
    assert!(output.contains(r#"mtd{id=mjx-eqn:2}(mrow*(mtext"(2)"))"#), "{output}");
    assert_eq!(output.matches("mlabeledtr").count(), 2, "{output}");
}

#[test]
fn starred_environments_and_notag() {
    let parser = parser(TagStyle::Ams);
    let output = block(&parser, r"\begin{align*} a \\ b \end{align*}");
    assert!(!output.contains("mlabeledtr"), "{output}");

    let output = block(&parser, r"\begin{align} a \notag \\ b \end{align}");
    assert_eq!(output.matches("mlabeledtr").count(), 1, "{output}");
    assert!(output.contains(r#"mtext"(1)""#), "{output}");
    assert!(!output.contains(r#"mtext"(2)""#), "{output}");
}

#[test]
fn equation_environment() {
    let output = block(&parser(TagStyle::Ams), r"\begin{equation} E = mc^2 \end{equation}");
    assert!(output.contains(r#"mtext"(1)""#), "{output}");
    let output = block(&parser(TagStyle::None), r"\begin{equation} E = mc^2 \end{equation}");
    assert!(!output.contains("mlabeledtr"), "{output}");
}

#[test]
fn default_style_numbers_every_display_formula() {
    let parser = parser(TagStyle::Default);
    let output = block(&parser, "x");
    assert!(output.contains(r#"mtd{id=mjx-eqn:1}(mrow*(mtext"(1)"))"#), "{output}");
    let mut arena = Arena::new();
    let root = parser.parse_with_local_counter("x", MathDisplay::Inline, &mut arena);
    assert_eq!(dump(&arena, root), r#"math(mrow*(mi"x"))"#);
}

#[test]
fn explicit_tags() {
    let parser = parser(TagStyle::None);
    let output = block(&parser, r"x \tag{A}");
    assert!(output.contains(r#"mtd{id=mjx-eqn:A}(mrow*(mtext"(A)"))"#), "{output}");
    let output = block(&parser, r"x \tag*{A}");
    assert!(output.contains(r#"mtext"A""#), "{output}");
    assert!(!output.contains(r#"mtext"(A)""#), "{output}");

    let mut arena = Arena::new();
    let err = parser
        .try_parse(r"\tag{1}", MathDisplay::Inline, &mut arena)
        .unwrap_err();
    assert_eq!(err.kind().id(), "CommandNotAllowedInEnv");
    assert_eq!(err.0.start, 0);
    let err = parser
        .try_parse(r"x \tag{1} \tag{2}", MathDisplay::Block, &mut arena)
        .unwrap_err();
    assert_eq!(err.kind().id(), "MultipleCommand");
}

#[test]
fn labels_and_references() {
    let parser = parser(TagStyle::Ams);
    let output = block(
        &parser,
        r"\begin{align} a \label{first} \\ b \end{align} \text{see } \eqref{first}",
    );
    assert!(output.contains(r#"mtd{id=mjx-eqn:first}"#), "{output}");
    assert!(output.contains(r#"mtext{href=#mjx-eqn:first}"(1)""#), "{output}");

    let output = block(&parser, r"\ref{later} \begin{equation} x \label{later} \end{equation}");
    assert!(output.contains(r#"mtext{href=#mjx-eqn:later}"1""#), "{output}");

    let output = block(&parser, r"\ref{nowhere}");
    assert!(output.contains(r#""???""#), "{output}");
}

#[test]
fn global_counter() {
    let mut parser = parser(TagStyle::Ams);
    let mut arena = Arena::new();
    let env = r"\begin{equation} x \label{eq:x} \end{equation}";

    let first = parser.parse_with_global_counter(env, MathDisplay::Block, &mut arena);
    assert!(dump(&arena, first).contains(r#"mtext"(1)""#));

    let second = parser.parse_with_global_counter(
        r"\begin{equation} y \end{equation}",
        MathDisplay::Block,
        &mut arena,
    );
    assert!(dump(&arena, second).contains(r#"mtext"(2)""#));

    // Labels survive into later formulas.
    let reference = parser.parse_with_global_counter(r"\eqref{eq:x}", MathDisplay::Inline, &mut arena);
    assert!(dump(&arena, reference).contains(r#""(1)""#));

    // Failed formulas leave the numbering alone.
    parser.parse_with_global_counter(r"\begin{equation} \frac{a} \end{equation}", MathDisplay::Block, &mut arena);
    let third = parser.parse_with_global_counter(
        r"\begin{equation} z \end{equation}",
        MathDisplay::Block,
        &mut arena,
    );
    assert!(dump(&arena, third).contains(r#"mtext"(3)""#));

    // The local counter always starts over.
    let local = parser.parse_with_local_counter(
        r"\begin{equation} z \end{equation}",
        MathDisplay::Block,
        &mut arena,
    );
    assert!(dump(&arena, local).contains(r#"mtext"(1)""#));

    parser.reset_global_counter();
    let after_reset = parser.parse_with_global_counter(
        r"\begin{equation} z \end{equation}",
        MathDisplay::Block,
        &mut arena,
    );
    assert!(dump(&arena, after_reset).contains(r#"mtext"(1)""#));
    // Labels are forgotten too, so the label can be used again.
    let relabel = parser.parse_with_global_counter(env, MathDisplay::Block, &mut arena);
    assert!(texmath::error_of(&arena, relabel).is_none());
}
