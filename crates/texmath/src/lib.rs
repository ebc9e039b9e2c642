//! Parse TeX math into a MathML-shaped tree.
//!
//! The tree is built through the [`TreeBuilder`] trait, so that callers can supply their own
//! node storage. [`Arena`] is the default implementation, and [`dump`] renders a subtree as a
//! compact string for tests and debugging.
//!
//! # Usage
//!
//! The main struct of this library is [`TexParser`]. Create it once from a [`TexConfig`] and
//! then parse any number of formulas with it.
//!
//! ```rust
//! use texmath::{Arena, MathDisplay, TexConfig, TexParser, dump};
//!
//! let parser = TexParser::new(TexConfig::default()).unwrap();
//! let mut arena = Arena::new();
//! let root = parser.parse_with_local_counter(r"x^2", MathDisplay::Inline, &mut arena);
//! assert_eq!(dump(&arena, root), r#"math(mrow*(msup(mi"x" mn"2")))"#);
//! ```
//!
//! Failed parses do not panic or return an error: the root is an `merror` node, see
//! [`error_of`]. Use [`TexParser::try_parse`] to get the [`TexError`] itself.
//!
//! # Features
//!
//! - `serde`: [`TexConfig`] implements serde's `Serialize` and `Deserialize`.
//! - `ariadne`: [`TexError::to_report`] renders an error together with the source.
//!
mod class;
mod digits;
mod dimen;
mod error;
mod lexer;
mod packages;
mod parser;
mod symbols;
mod tags;
mod token;
mod token_queue;

use std::fmt;

use log::debug;
use regex::Regex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use math_tree::{Arena, NodeId, NodeKind, TreeBuilder, dump};

pub use self::digits::DigitPattern;
pub use self::error::{TexErrKind, TexError, error_of, make_error};
pub use self::tags::TagStyle;
use self::packages::PackageList;
use self::parser::{ConfigMacro, Settings};
use self::tags::TagCounter;

/// Display mode of a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathDisplay {
    /// For inline equations, like those in `$...$` in LaTeX.
    Inline,
    /// For block equations (or "display style" equations), like those in `$$...$$` in LaTeX.
    Block,
}

fn default_packages() -> Vec<String> {
    ["base", "ams", "newcommand", "color", "cancel", "bbox"]
        .into_iter()
        .map(String::from)
        .collect()
}

const DEFAULT_MAX_MACROS: usize = 10_000;

/// Configuration object for [`TexParser`].
///
/// # Example usage
///
/// ```rust
/// use texmath::{TagStyle, TexConfig};
///
/// let macros = vec![
///     ("d".to_string(), r"\mathrm{d}".to_string()),
///     ("bb".to_string(), r"\mathbb{#1}".to_string()), // with argument
/// ];
/// let config = TexConfig {
///     tag_style: TagStyle::Ams,
///     macros,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct TexConfig {
    /// Packages to load, in order; later packages shadow earlier ones. `base` is always loaded.
    pub packages: Vec<String>,
    /// How runs of digits are split into numbers.
    pub digit_pattern: DigitPattern,
    /// Which equations are numbered automatically.
    pub tag_style: TagStyle,
    /// A list of macros; each tuple contains (macro_name, macro_definition). The number of
    /// parameters is the highest `#n` in the definition.
    #[cfg_attr(feature = "serde", serde(with = "tuple_vec_map"))]
    pub macros: Vec<(String, String)>,
    /// Maximum number of macro expansions in one formula.
    pub max_macros: usize,
}

impl Default for TexConfig {
    fn default() -> Self {
        TexConfig {
            packages: default_packages(),
            digit_pattern: DigitPattern::default(),
            tag_style: TagStyle::default(),
            macros: Vec::new(),
            max_macros: DEFAULT_MAX_MACROS,
        }
    }
}

/// An invalid [`TexConfig`].
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigError {
    UnknownPackage(String),
    DigitPattern(regex::Error),
    /// A macro definition could not be tokenized.
    Macro {
        error: Box<TexError>,
        index: usize,
        definition: String,
    },
    MacroName { index: usize, name: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownPackage(name) => write!(f, "unknown package '{name}'"),
            ConfigError::DigitPattern(err) => write!(f, "invalid digit pattern: {err}"),
            ConfigError::Macro {
                error,
                index,
                definition,
            } => write!(f, "macro {index} ('{definition}'): {error}"),
            ConfigError::MacroName { index, name } => {
                write!(f, "macro {index}: invalid name '{name}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::DigitPattern(err) => Some(err),
            ConfigError::Macro { error, .. } => Some(&**error),
            _ => None,
        }
    }
}

/// A converter from TeX math to trees.
///
/// All configuration is checked and compiled once, in [`TexParser::new`]. Definitions made by
/// a formula (`\newcommand`, `\def`, `\let`, `\definecolor`) are dropped when it is finished.
#[derive(Debug)]
pub struct TexParser {
    packages: PackageList,
    active: String,
    digits: Regex,
    tag_style: TagStyle,
    macros: Vec<ConfigMacro>,
    max_macros: usize,
    /// Equation numbers and labels carried from one formula to the next.
    counter: TagCounter,
}

impl TexParser {
    pub fn new(config: TexConfig) -> Result<Self, ConfigError> {
        let packages = PackageList::resolve(&config.packages).map_err(ConfigError::UnknownPackage)?;
        let active = packages.active_chars();
        let digits = config
            .digit_pattern
            .compile()
            .map_err(ConfigError::DigitPattern)?;
        let mut macros = Vec::with_capacity(config.macros.len());
        for (index, (name, definition)) in config.macros.into_iter().enumerate() {
            if !parser::is_command_name(&name) {
                return Err(ConfigError::MacroName { index, name });
            }
            match ConfigMacro::new(&name, &definition, &active) {
                Ok(config_macro) => macros.push(config_macro),
                Err(error) => {
                    return Err(ConfigError::Macro {
                        error,
                        index,
                        definition,
                    });
                }
            }
        }
        debug!(
            packages = packages.names().collect::<Vec<_>>().join(",").as_str(),
            macros = macros.len();
            "created parser"
        );
        Ok(TexParser {
            packages,
            active,
            digits,
            tag_style: config.tag_style,
            macros,
            max_macros: config.max_macros,
            counter: TagCounter::default(),
        })
    }

    fn settings(&self) -> Settings<'_> {
        Settings {
            packages: &self.packages,
            active: &self.active,
            digits: &self.digits,
            tag_style: self.tag_style,
            macros: &self.macros,
            max_macros: self.max_macros,
        }
    }

    fn run<B: TreeBuilder + ?Sized>(
        &self,
        tex: &str,
        display: MathDisplay,
        builder: &mut B,
        counter: TagCounter,
    ) -> (Result<NodeId, Box<TexError>>, TagCounter) {
        let (result, counter) = parser::parse(
            tex,
            display == MathDisplay::Block,
            &self.settings(),
            builder,
            counter,
        );
        match &result {
            Ok(_) => debug!(length = tex.len(); "parsed formula"),
            Err(err) => debug!(error = err.1.id(), at = err.0.start; "formula failed"),
        }
        (result, counter)
    }

    /// Parse a formula, returning the error instead of an error node.
    ///
    /// Equation numbers start at 1.
    pub fn try_parse<B: TreeBuilder + ?Sized>(
        &self,
        tex: &str,
        display: MathDisplay,
        builder: &mut B,
    ) -> Result<NodeId, Box<TexError>> {
        self.run(tex, display, builder, TagCounter::default()).0
    }

    /// Parse a formula; equation numbers start at 1.
    ///
    /// ```rust
    /// use texmath::{Arena, MathDisplay, TexConfig, TexParser, error_of};
    ///
    /// let parser = TexParser::new(TexConfig::default()).unwrap();
    /// let mut arena = Arena::new();
    /// let root = parser.parse_with_local_counter(r"x^1^2", MathDisplay::Block, &mut arena);
    /// let (kind, _) = error_of(&arena, root).unwrap();
    /// assert_eq!(kind, "DoubleExponent");
    /// ```
    pub fn parse_with_local_counter<B: TreeBuilder + ?Sized>(
        &self,
        tex: &str,
        display: MathDisplay,
        builder: &mut B,
    ) -> NodeId {
        match self.try_parse(tex, display, builder) {
            Ok(root) => root,
            Err(err) => make_error(builder, &err),
        }
    }

    /// Parse a formula, continuing the equation numbers and labels of earlier calls.
    ///
    /// A formula that fails to parse leaves the numbering untouched. The counter can be reset
    /// with [`TexParser::reset_global_counter`].
    pub fn parse_with_global_counter<B: TreeBuilder + ?Sized>(
        &mut self,
        tex: &str,
        display: MathDisplay,
        builder: &mut B,
    ) -> NodeId {
        let counter = std::mem::take(&mut self.counter);
        let (result, counter) = self.run(tex, display, builder, counter);
        self.counter = counter;
        match result {
            Ok(root) => root,
            Err(err) => make_error(builder, &err),
        }
    }

    /// Reset equation numbers and forget all labels.
    ///
    /// This should normally be done at the beginning of a new document or section.
    pub fn reset_global_counter(&mut self) {
        self.counter = TagCounter::default();
    }
}

/// Parse one inline formula into a fresh [`Arena`].
pub fn parse(tex: &str, config: &TexConfig) -> Result<(Arena, NodeId), ConfigError> {
    let parser = TexParser::new(config.clone())?;
    let mut arena = Arena::new();
    let root = parser.parse_with_local_counter(tex, MathDisplay::Inline, &mut arena);
    Ok((arena, root))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_macros(macros: &[(&str, &str)]) -> TexConfig {
        TexConfig {
            macros: macros
                .iter()
                .map(|(name, body)| (name.to_string(), body.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn invalid_configs() {
        let config = TexConfig {
            packages: vec!["physics".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            TexParser::new(config),
            Err(ConfigError::UnknownPackage(name)) if name == "physics"
        ));
        let config = TexConfig {
            digit_pattern: DigitPattern::Custom("(".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            TexParser::new(config),
            Err(ConfigError::DigitPattern(_))
        ));
        let config = config_with_macros(&[("ok", "x"), ("not ok", "y")]);
        assert!(matches!(
            TexParser::new(config),
            Err(ConfigError::MacroName { index: 1, .. })
        ));
        let config = config_with_macros(&[("bad", "\\")]);
        let Err(ConfigError::Macro { error, index, .. }) = TexParser::new(config) else {
            panic!("expected a macro error");
        };
        assert_eq!(index, 0);
        assert_eq!(*error.kind(), TexErrKind::UnterminatedControlSequence);
    }

    #[test]
    fn config_macros() {
        let config = config_with_macros(&[("RR", r"\mathbb{R}"), ("sq", "{#1}^2")]);
        let (arena, root) = parse(r"\RR \sq{x}", &config).unwrap();
        assert_eq!(
            dump(&arena, root),
            r#"math(mrow*(TeXAtom[ORD](mrow*(mi{mathvariant=double-struck}"R")) msup(TeXAtom[ORD](mrow*(mi"x")) mn"2")))"#
        );
    }

    #[test]
    fn errors_become_error_nodes() {
        let (arena, root) = parse(r"\frac{a}", &TexConfig::default()).unwrap();
        assert_eq!(
            error_of(&arena, root),
            Some(("MissingArgFor", r"Missing argument for \frac"))
        );
        let parser = TexParser::new(TexConfig::default()).unwrap();
        let mut arena = Arena::new();
        let err = parser
            .try_parse(r"\undefined", MathDisplay::Inline, &mut arena)
            .unwrap_err();
        assert_eq!(err.0, 0..10);
    }

    #[test]
    fn definitions_do_not_leak() {
        let parser = TexParser::new(TexConfig::default()).unwrap();
        let mut arena = Arena::new();
        let root = parser.parse_with_local_counter(r"\def\x{y}\x", MathDisplay::Inline, &mut arena);
        assert_eq!(dump(&arena, root), r#"math(mrow*(mi"y"))"#);
        let err = parser
            .try_parse(r"\x", MathDisplay::Inline, &mut arena)
            .unwrap_err();
        assert_eq!(err.1, TexErrKind::UndefinedControlSequence("x".into()));
    }
}
