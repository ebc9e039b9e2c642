use proptest::prelude::*;

use texmath::{Arena, MathDisplay, TexConfig, TexParser, dump};

fn tex_like() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-z0-9]",
            r"[{}^_&#'~ .,+=()\[\]|<>-]",
            Just(r"\frac".to_string()),
            Just(r"\sqrt".to_string()),
            Just(r"\left(".to_string()),
            Just(r"\right)".to_string()),
            Just(r"\over".to_string()),
            Just(r"\\".to_string()),
            Just(r"\begin{matrix}".to_string()),
            Just(r"\end{matrix}".to_string()),
            Just(r"\text{".to_string()),
            Just("$".to_string()),
            Just(r"\def\a#1{".to_string()),
            Just(r"\a".to_string()),
            Just(r"\not".to_string()),
            Just(r"\color{".to_string()),
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn never_panics_and_is_deterministic(tex in tex_like()) {
        let parser = TexParser::new(TexConfig::default()).unwrap();
        let mut arena = Arena::new();
        let first = parser.parse_with_local_counter(&tex, MathDisplay::Inline, &mut arena);
        let second = parser.parse_with_local_counter(&tex, MathDisplay::Inline, &mut arena);
        prop_assert_eq!(dump(&arena, first), dump(&arena, second));
    }

    #[test]
    fn errors_point_into_the_input(tex in tex_like()) {
        let parser = TexParser::new(TexConfig::default()).unwrap();
        let mut arena = Arena::new();
        match parser.try_parse(&tex, MathDisplay::Block, &mut arena) {
            Ok(_) => {}
            Err(err) => {
                prop_assert!(err.0.start <= tex.len());
                prop_assert!(err.0.end <= tex.len());
                prop_assert!(!err.error_message().is_empty());
            }
        }
    }

    #[test]
    fn plain_identifiers(name in "[a-z]{1,12}") {
        let parser = TexParser::new(TexConfig::default()).unwrap();
        let mut arena = Arena::new();
        let root = parser.parse_with_local_counter(&name, MathDisplay::Inline, &mut arena);
        let output = dump(&arena, root);
        prop_assert_eq!(output.matches("mi\"").count(), name.len());
    }
}
