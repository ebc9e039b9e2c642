//! Internal library for the `texmath` crate for building math trees.
//!
//! The parser never allocates nodes itself; it goes through the [`TreeBuilder`] trait, and
//! [`Arena`] is the implementation used by default. The structural rules of the tree (inferred
//! rows, embellished operators, inherited TeX classes) live here, so that every builder agrees on
//! them.
//!
//! # Example
//!
//! ```rust
//! use texmath_tree_internal::{Arena, Attr, NodeKind, TexClass, TreeBuilder, dump};
//!
//! let mut arena = Arena::new();
//! let sum = arena.create_node(NodeKind::Mo, &[], &[(Attr::Movablelimits, "true")], Some("∑"));
//! arena.set_tex_class(sum, TexClass::Op);
//! let i = arena.create_node(NodeKind::Mi, &[], &[], Some("i"));
//! let under = arena.create_node(NodeKind::Munder, &[sum, i], &[], None);
//!
//! assert_eq!(arena.tex_class(under), TexClass::Op);
//! assert_eq!(
//!     dump(&arena, under),
//!     r#"munder(mo{movablelimits=true}"∑" mi"i")"#
//! );
//! ```
pub mod arena;
pub mod attribute;
pub mod builder;
mod fmt;
pub mod kind;
pub mod length;

pub use arena::{Arena, NodeId};
pub use attribute::{Attr, MathVariant, PropValue, Property, TexClass};
pub use builder::TreeBuilder;
pub use fmt::dump;
pub use kind::{Arity, NodeKind};
pub use length::{Length, LengthUnit};
