//! Equation numbers, `\tag`, `\label` and `\ref`.

use rustc_hash::FxHashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use math_tree::{Attr, NodeId, NodeKind, PropValue, Property, TreeBuilder};

use crate::error::TexErrKind;

/// Which equations are numbered automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TagStyle {
    /// Only explicit `\tag`s.
    #[default]
    None,
    /// Numbered environments, and every display equation without one.
    Default,
    /// Only the numbered AMS environments (`equation`, `align`, `gather`, `multline`).
    Ams,
}

/// Numbering state that may outlive a single parse.
#[derive(Debug, Clone, Default)]
pub(crate) struct TagCounter {
    pub counter: usize,
    /// Label name to tag text.
    pub labels: FxHashMap<String, String>,
}

#[derive(Debug)]
struct TagState {
    env: Box<str>,
    numbered: bool,
    tag: Option<(String, bool)>,
    no_tag: bool,
    label: Option<String>,
    /// A numbered environment was started inside this one.
    has_inner: bool,
}

impl TagState {
    fn new(env: &str, numbered: bool) -> Self {
        TagState {
            env: env.into(),
            numbered,
            tag: None,
            no_tag: false,
            label: None,
            has_inner: false,
        }
    }

    fn reset_row(&mut self) {
        self.tag = None;
        self.no_tag = false;
        self.label = None;
    }
}

struct PendingRef {
    node: NodeId,
    label: String,
    parens: bool,
}

/// Tracks the tagging state of the environments that are currently open.
///
/// The bottom of the stack is the whole formula; it only accepts `\tag` in display mode.
pub(crate) struct TagManager {
    style: TagStyle,
    stack: Vec<TagState>,
    counter: TagCounter,
    refs: Vec<PendingRef>,
}

impl TagManager {
    pub(crate) fn new(style: TagStyle, counter: TagCounter, display: bool) -> Self {
        let top = if display {
            TagState::new("equation", style == TagStyle::Default)
        } else {
            TagState::new("math", false)
        };
        TagManager {
            style,
            stack: vec![top],
            counter,
            refs: Vec::new(),
        }
    }

    fn current(&mut self) -> &mut TagState {
        // The stack always contains the state of the whole formula.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Enter a display environment such as `align`.
    pub(crate) fn start_tag(&mut self, env: &str, numbered: bool) -> Result<(), TexErrKind> {
        if self.stack.len() > 1 {
            return Err(TexErrKind::ErroneousNestingEq);
        }
        self.current().has_inner = true;
        let numbered = numbered && self.style != TagStyle::None;
        self.stack.push(TagState::new(env, numbered));
        Ok(())
    }

    /// Leave the display environment entered last.
    pub(crate) fn end_tag(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub(crate) fn tag(&mut self, text: String, starred: bool) -> Result<(), TexErrKind> {
        let state = self.current();
        if &*state.env == "math" {
            return Err(TexErrKind::CommandNotAllowedInEnv {
                cmd: r"\tag".into(),
                env: "math".into(),
            });
        }
        if state.tag.is_some() {
            return Err(TexErrKind::MultipleCommand(r"\tag".into()));
        }
        state.tag = Some((text, starred));
        Ok(())
    }

    pub(crate) fn notag(&mut self) {
        self.current().no_tag = true;
    }

    /// Forget the `\tag`, `\notag` and `\label` of a row that is dropped.
    pub(crate) fn discard_row(&mut self) {
        self.current().reset_row();
    }

    /// The tag text recorded for `label`, if it has been seen.
    pub(crate) fn get_tag(&self, label: &str) -> Option<&str> {
        self.counter.labels.get(label).map(String::as_str)
    }

    pub(crate) fn label(&mut self, name: String) -> Result<(), TexErrKind> {
        if self.counter.labels.contains_key(&name) {
            return Err(TexErrKind::MultipleLabel(name.into()));
        }
        let state = self.current();
        if state.label.is_some() {
            return Err(TexErrKind::MultipleCommand(r"\label".into()));
        }
        state.label = Some(name);
        Ok(())
    }

    /// Finish the current row (or the whole formula) and create its tag cell, if it has one.
    pub(crate) fn finish_tag<B: TreeBuilder + ?Sized>(&mut self, builder: &mut B) -> Option<NodeId> {
        let is_formula = self.stack.len() == 1;
        let state = self.current();
        let automatic = state.numbered && !state.no_tag && !(is_formula && state.has_inner);
        let tag = state.tag.take();
        let label = state.label.take();
        state.reset_row();
        let (text, id) = match tag {
            Some((text, starred)) => {
                let shown = if starred { text.clone() } else { format!("({text})") };
                (Some((shown, text.clone())), text)
            }
            None if automatic => {
                self.counter.counter += 1;
                let number = self.counter.counter.to_string();
                (Some((format!("({number})"), number.clone())), number)
            }
            None => (None, String::new()),
        };
        if let Some(label) = &label {
            let value = text.as_ref().map(|(_, raw)| raw.clone()).unwrap_or_default();
            self.counter.labels.insert(label.clone(), value);
        }
        let (shown, _) = text?;
        let id = "mjx-eqn:".to_string() + label.as_deref().unwrap_or(&id);
        let text = builder.create_node(NodeKind::Mtext, &[], &[], Some(&shown));
        Some(builder.create_node(NodeKind::Mtd, &[text], &[(Attr::Id, &id)], None))
    }

    /// Create a placeholder for `\ref{label}`; it is filled in by [`TagManager::resolve_refs`].
    pub(crate) fn reference<B: TreeBuilder + ?Sized>(
        &mut self,
        builder: &mut B,
        label: String,
        parens: bool,
    ) -> NodeId {
        let href = "#mjx-eqn:".to_string() + &label;
        let node = builder.create_node(NodeKind::Mtext, &[], &[(Attr::Href, &href)], None);
        builder.set_property(node, Property::Ref, PropValue::from(label.as_str()));
        self.refs.push(PendingRef {
            node,
            label,
            parens,
        });
        node
    }

    /// Fill in all references; labels defined later in the same formula are found too.
    pub(crate) fn resolve_refs<B: TreeBuilder + ?Sized>(&mut self, builder: &mut B) {
        for pending in self.refs.drain(..) {
            let text = match self.counter.labels.get(&pending.label) {
                Some(tag) if pending.parens => format!("({tag})"),
                Some(tag) => tag.clone(),
                None => "???".to_string(),
            };
            builder.append_text(pending.node, &text);
        }
    }

    pub(crate) fn into_counter(self) -> TagCounter {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use math_tree::{Arena, dump};

    use super::*;

    #[test]
    fn ams_numbers_only_numbered_environments() {
        let mut arena = Arena::new();
        let mut tags = TagManager::new(TagStyle::Ams, TagCounter::default(), true);
        tags.start_tag("align", true).unwrap();
        let first = tags.finish_tag(&mut arena).unwrap();
        tags.notag();
        assert!(tags.finish_tag(&mut arena).is_none());
        let third = tags.finish_tag(&mut arena).unwrap();
        tags.end_tag();
        assert!(tags.finish_tag(&mut arena).is_none());
        assert_eq!(dump(&arena, first), r#"mtd{id=mjx-eqn:1}(mrow*(mtext"(1)"))"#);
        assert_eq!(dump(&arena, third), r#"mtd{id=mjx-eqn:2}(mrow*(mtext"(2)"))"#);
    }

    #[test]
    fn default_style_numbers_display_formula() {
        let mut arena = Arena::new();
        let mut tags = TagManager::new(TagStyle::Default, TagCounter::default(), true);
        assert!(tags.finish_tag(&mut arena).is_some());
        let mut tags = TagManager::new(TagStyle::Default, TagCounter::default(), true);
        tags.start_tag("gather", true).unwrap();
        tags.finish_tag(&mut arena);
        tags.end_tag();
        assert!(tags.finish_tag(&mut arena).is_none());
        assert_eq!(tags.into_counter().counter, 1);
    }

    #[test]
    fn explicit_tags_and_labels() {
        let mut arena = Arena::new();
        let mut tags = TagManager::new(TagStyle::None, TagCounter::default(), true);
        let reference = tags.reference(&mut arena, "eq".to_string(), true);
        tags.tag("A".to_string(), false).unwrap();
        assert_eq!(
            tags.tag("B".to_string(), false),
            Err(TexErrKind::MultipleCommand(r"\tag".into()))
        );
        tags.label("eq".to_string()).unwrap();
        let cell = tags.finish_tag(&mut arena).unwrap();
        assert_eq!(dump(&arena, cell), r#"mtd{id=mjx-eqn:eq}(mrow*(mtext"(A)"))"#);
        assert_eq!(
            tags.label("eq".to_string()),
            Err(TexErrKind::MultipleLabel("eq".into()))
        );
        assert_eq!(tags.get_tag("eq"), Some("A"));
        let missing = tags.reference(&mut arena, "nowhere".to_string(), false);
        tags.resolve_refs(&mut arena);
        assert_eq!(dump(&arena, reference), r#"mtext{href=#mjx-eqn:eq}"(A)""#);
        assert_eq!(dump(&arena, missing), r#"mtext{href=#mjx-eqn:nowhere}"???""#);
    }

    #[test]
    fn errors() {
        let mut tags = TagManager::new(TagStyle::Ams, TagCounter::default(), false);
        assert!(matches!(
            tags.tag("1".to_string(), false),
            Err(TexErrKind::CommandNotAllowedInEnv { .. })
        ));
        tags.start_tag("align", true).unwrap();
        assert_eq!(
            tags.start_tag("equation", true),
            Err(TexErrKind::ErroneousNestingEq)
        );
    }
}
