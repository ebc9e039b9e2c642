use texmath::{Arena, DigitPattern, MathDisplay, TagStyle, TexConfig, TexParser, dump};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn from_json() {
    init_logger();
    let config: TexConfig = serde_json::from_str(
        r#"{
            "packages": ["base", "ams"],
            "digit-pattern": "european",
            "tag-style": "ams",
            "macros": {"half": "\\frac{1}{2}"},
            "max-macros": 100
        }"#,
    )
    .unwrap();
    assert_eq!(config.packages, ["base", "ams"]);
    assert_eq!(config.digit_pattern, DigitPattern::European);
    assert_eq!(config.tag_style, TagStyle::Ams);
    assert_eq!(config.macros, [("half".to_string(), r"\frac{1}{2}".to_string())]);
    assert_eq!(config.max_macros, 100);

    let parser = TexParser::new(config).unwrap();
    let mut arena = Arena::new();
    let root = parser.parse_with_local_counter(r"1,5 \half", MathDisplay::Inline, &mut arena);
    assert_eq!(
        dump(&arena, root),
        r#"math(mrow*(mn"1,5" mfrac(mn"1" mn"2")))"#
    );
}

#[test]
fn missing_fields_use_defaults() {
    init_logger();
    let config: TexConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.packages.first().map(String::as_str), Some("base"));
    assert_eq!(config.digit_pattern, DigitPattern::Default);
    assert_eq!(config.tag_style, TagStyle::None);
    assert!(config.macros.is_empty());
    assert_eq!(config.max_macros, 10_000);

    let config: TexConfig =
        serde_json::from_str(r#"{"digit-pattern": {"custom": "[0-9]"}}"#).unwrap();
    let parser = TexParser::new(config).unwrap();
    let mut arena = Arena::new();
    let root = parser.parse_with_local_counter("12", MathDisplay::Inline, &mut arena);
    assert_eq!(
        dump(&arena, root),
        r#"math(mrow*(mn"1" mn"2"))"#
    );
}

#[test]
fn round_trip() {
    init_logger();
    let config = TexConfig {
        tag_style: TagStyle::Default,
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(r#""tag-style":"default""#), "{json}");
    let back: TexConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.tag_style, TagStyle::Default);
    assert_eq!(back.packages, config.packages);
}

#[test]
fn without_ams() {
    init_logger();
    let config = TexConfig {
        packages: vec!["base".to_string()],
        ..Default::default()
    };
    let parser = TexParser::new(config).unwrap();
    let mut arena = Arena::new();
    let err = parser
        .try_parse(r"\begin{align} x \end{align}", MathDisplay::Block, &mut arena)
        .unwrap_err();
    assert_eq!(err.kind().id(), "UnknownEnv");
}
