use texmath::{
    Arena, MathDisplay, NodeKind, TexConfig, TexErrKind, TexParser, TreeBuilder, error_of,
};

#[test]
fn main() {
    let problems = [
        ("end_without_open", r"\end{matrix}", "MissingBeginExtraEnd", 0),
        ("curly_close_without_open", r"}", "ExtraCloseMissingOpen", 0),
        ("unsupported_command", r"\asdf", "UndefinedControlSequence", 0),
        (
            "unsupported_environment",
            r"\begin{xmatrix} 1 \end{xmatrix}",
            "UnknownEnv",
            0,
        ),
        ("unclosed_bracket", r"\sqrt[lim", "MissingCloseBracket", 5),
        (
            "mismatched_begin_end",
            r"\begin{matrix} 1 \end{bmatrix}",
            "EnvBadEnd",
            17,
        ),
        ("unclosed_begin", r"\begin{matrix", "ExtraOpenMissingClose", 13),
        ("incomplete_sup", r"x^", "MissingScript", 2),
        ("sup_closed", r"{x^}", "MissingScript", 3),
        ("double_sub", r"x__3", "DoubleSubscripts", 2),
        ("sup_sup", "x^2^3 y", "DoubleExponent", 3),
        ("super_then_prime", "f^2'", "DoubleExponentPrime", 3),
        ("unclosed_brace", r"{", "ExtraOpenMissingClose", 0),
        ("unclosed_left", r"\left( x", "ExtraLeftMissingRight", 0),
        ("unmatched_right", r"x \right)", "MissingLeftExtraRight", 2),
        ("unclosed_env", r"\begin{matrix} x", "EnvMissingEnd", 0),
        ("missing_frac_arg", r"\frac{a}", "MissingArgFor", 8),
        ("ampersand_outside_array", r"x & y", "Misplaced", 2),
        ("hash_outside_macro_definition", r"x # y", "CantUseHash", 2),
        ("mathrm_unknown_cmd", r"\mathrm{ab\asdf}", "UndefinedControlSequence", 10),
        ("left_with_non_delimiter", r"\left x 1 \right)", "MissingOrUnrecognizedDelim", 6),
        ("hspace_unknown_unit", r"\hspace{2ly}", "MissingDimOrUnits", 0),
        ("limits_without_operator", r"x\limits", "MisplacedLimits", 1),
        ("two_overs", r"a \over b \over c", "AmbiguousUseOf", 10),
        ("bad_column", r"\begin{array}{q}x\end{array}", "BadColumnSpec", 0),
        (
            "nested_align",
            r"\begin{align}\begin{align}\end{align}\end{align}",
            "ErroneousNestingEq",
            13,
        ),
        ("tag_inline", r"x\tag{1}", "CommandNotAllowedInEnv", 1),
        ("lone_backslash", "x\\", "UnterminatedControlSequence", 1),
        ("control_character", "x\u{1}", "IllegalCharacter", 1),
        ("not_before_end", r"\not", "ExpectedRelation", 0),
        ("recursive_macro", r"\def\a{\a}\a", "MaxMacroSub", 10),
        ("doubling_macro", r"\def\a#1{\a{#1#1}}\a x", "MaxBufferSize", 18),
    ];

    let converter = TexParser::new(TexConfig::default()).unwrap();
    for (name, problem, kind, start) in problems {
        let mut arena = Arena::new();
        let Err(error) = converter.try_parse(problem, MathDisplay::Inline, &mut arena) else {
            panic!("problem `{name}` did not return an error");
        };
        assert_eq!(error.kind().id(), kind, "{name}: {problem}");
        assert_eq!(error.0.start, start, "{name}: {problem}");

        // The error node carries the same information.
        let root = converter.parse_with_local_counter(problem, MathDisplay::Inline, &mut arena);
        assert_eq!(arena.kind(root), NodeKind::Merror);
        let (node_kind, message) = error_of(&arena, root).unwrap();
        assert_eq!(node_kind, kind);
        assert_eq!(message, error.error_message());
    }
}

#[test]
fn messages() {
    let converter = TexParser::new(TexConfig::default()).unwrap();
    let mut arena = Arena::new();
    let message = |input: &str, arena: &mut Arena| {
        converter
            .try_parse(input, MathDisplay::Inline, arena)
            .unwrap_err()
            .to_string()
    };
    assert_eq!(
        message("x^1^2", &mut arena),
        "3: Double exponent: use braces to clarify"
    );
    assert_eq!(message(r"a \over b \over c", &mut arena), r"10: Ambiguous use of \over");
    assert_eq!(
        message(r"\begin{align}x\end{gather}", &mut arena),
        r"14: \begin{align} ended with \end{gather}"
    );
}

#[test]
fn soft_errors_keep_parsing() {
    let converter = TexParser::new(TexConfig::default()).unwrap();
    let mut arena = Arena::new();
    let root = converter
        .try_parse(r"\color{nocolor} x + y", MathDisplay::Inline, &mut arena)
        .unwrap();
    let row = arena.get_children(root)[0];
    let children = arena.get_children(row);
    assert_eq!(arena.kind(children[0]), NodeKind::Merror);
    assert_eq!(
        error_of(&arena, children[0]),
        Some(("UnknownColor", "Undefined color 'nocolor'"))
    );
    assert_eq!(children.len(), 4);

    assert!(TexErrKind::UnknownColor("nocolor".into()).is_soft());
    let err = converter
        .try_parse(r"\frac{a}", MathDisplay::Inline, &mut arena)
        .unwrap_err();
    assert!(!err.kind().is_soft());
}

#[test]
fn report() {
    let converter = TexParser::new(TexConfig::default()).unwrap();
    let mut arena = Arena::new();
    let problem = r"\frac{a}";
    let error = converter
        .try_parse(problem, MathDisplay::Inline, &mut arena)
        .unwrap_err();
    let report = error.to_report("<input>", false);
    let mut buf = Vec::new();
    report
        .write(("<input>", ariadne::Source::from(problem)), &mut buf)
        .expect("failed to write report");
    let output = String::from_utf8(buf).expect("report should be valid UTF-8");
    assert!(output.contains("MissingArgFor"), "{output}");
    assert!(output.contains(r"Missing argument for \frac"), "{output}");
}
