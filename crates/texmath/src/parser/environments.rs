//! `\begin{...}` / `\end{...}` and the tables they build.

use log::trace;

use math_tree::{Attr, Length, NodeId, NodeKind, TreeBuilder};

use super::{Frame, FrameKind, Parser, cs, error, tokens_to_string};
use crate::dimen::parse_dimen;
use crate::error::{ParseResult, TexErrKind};
use crate::symbols::{EnvDef, EnvKind};
use crate::token::{Span, Token};

/// An open environment.
#[derive(Debug)]
pub(super) struct ArrayState {
    pub(super) name: Box<str>,
    def: EnvDef,
    /// Opened as `\matrix{...}` and closed by `}`.
    pub(super) command_form: bool,
    /// Column alignment of `array`.
    columns: Vec<&'static str>,
    /// Lines between the columns of `array`.
    column_lines: Vec<&'static str>,
    framed: bool,
    rows: Vec<NodeId>,
    /// Finished cells of the current row.
    cells: Vec<NodeId>,
    /// Extra space requested with `\\[...]` after each row.
    spacing: Vec<Option<Length>>,
    /// Indices of the rows before which `\hline` was given.
    hlines: Vec<usize>,
    /// Number of cells in the widest row.
    width: usize,
}

impl ArrayState {
    fn new(name: &str, def: EnvDef, command_form: bool) -> Self {
        ArrayState {
            name: name.into(),
            def,
            command_form,
            columns: Vec::new(),
            column_lines: Vec::new(),
            framed: false,
            rows: Vec::new(),
            cells: Vec::new(),
            spacing: Vec::new(),
            hlines: Vec::new(),
            width: 0,
        }
    }

    /// Read an `array` column specification such as `{c|l}`.
    fn set_columns(&mut self, spec: &str) -> Result<(), TexErrKind> {
        let mut line_before = false;
        for ch in spec.chars() {
            let align = match ch {
                'l' => "left",
                'c' => "center",
                'r' => "right",
                '|' => {
                    line_before = true;
                    continue;
                }
                ' ' => continue,
                other => return Err(TexErrKind::BadColumnSpec(other)),
            };
            if self.columns.is_empty() {
                self.framed |= line_before;
            } else {
                self.column_lines
                    .push(if line_before { "solid" } else { "none" });
            }
            line_before = false;
            self.columns.push(align);
        }
        self.framed |= line_before && !self.columns.is_empty();
        Ok(())
    }
}

fn default_row_spacing(kind: EnvKind) -> &'static str {
    match kind {
        EnvKind::Array | EnvKind::Matrix(..) => "4pt",
        EnvKind::SmallMatrix => "0.2em",
        EnvKind::Cases => ".2em",
        _ => "3pt",
    }
}

impl<B: TreeBuilder + ?Sized> Parser<'_, '_, B> {
    pub(super) fn begin_environment(&mut self, span: Span) -> ParseResult<()> {
        let name = self.read_string_arg("begin")?;
        let Some(def) = self.packages.environment(&name) else {
            return Err(error(span, TexErrKind::UnknownEnv(name.into())));
        };
        self.start_environment(*def, &name, false, span)
    }

    /// `\matrix{...}` and the other environments that have a command form.
    pub(super) fn begin_command_env(&mut self, def: EnvDef, name: &str, span: Span) -> ParseResult<()> {
        let tok = self.tokens.next()?;
        match tok.token() {
            Token::GroupBegin => self.start_environment(def, name, true, span),
            Token::ArgEnd => {
                self.tokens.queue_in_front(&[tok]);
                Err(error(tok.span(), TexErrKind::MissingArgFor(cs(name))))
            }
            _ => Err(error(tok.span(), TexErrKind::MissingArgFor(cs(name)))),
        }
    }

    fn start_environment(
        &mut self,
        def: EnvDef,
        name: &str,
        command_form: bool,
        span: Span,
    ) -> ParseResult<()> {
        trace!(env = name; "begin environment");
        let mut state = ArrayState::new(name, def, command_form);
        if def.kind == EnvKind::Array {
            // The vertical position of the array is not represented.
            self.read_optional("begin")?;
            let spec = self.read_string_arg("begin")?;
            state.set_columns(&spec).map_err(|kind| error(span, kind))?;
        }
        if def.is_display() {
            self.tags
                .start_tag(name, def.numbered)
                .map_err(|kind| error(span, kind))?;
        }
        self.push_frame(FrameKind::Env(Box::new(state)), span)
    }

    pub(super) fn end_environment(&mut self, span: Span) -> ParseResult<()> {
        let name = self.read_string_arg("end")?;
        self.close_styles(span, true)?;
        match &self.top().kind {
            FrameKind::Env(state) if !state.command_form => {
                if *state.name != *name {
                    return Err(error(
                        span,
                        TexErrKind::EnvBadEnd {
                            begin: state.name.clone(),
                            end: name.into(),
                        },
                    ));
                }
            }
            FrameKind::Start => {
                return Err(error(span, TexErrKind::MissingBeginExtraEnd(name.into())));
            }
            _ => return Err(Self::unclosed(self.top())),
        }
        let frame = self.pop_frame(span)?;
        self.finish_env(frame, span)
    }

    fn in_table(&self) -> bool {
        matches!(&self.top().kind, FrameKind::Env(state) if state.def.is_table())
    }

    /// `&`
    pub(super) fn ampersand(&mut self, span: Span) -> ParseResult<()> {
        self.close_styles(span, true)?;
        if !self.in_table() {
            return Err(error(span, TexErrKind::Misplaced("&".into())));
        }
        let mut frame = self.pop_frame(span)?;
        let result = self.finish_cell(&mut frame);
        self.stack.push(frame);
        result
    }

    /// `\\` and `\cr`, with an optional extra row spacing.
    pub(super) fn row_end(&mut self, name: &str, span: Span) -> ParseResult<()> {
        let spacing = match self.read_optional(name)? {
            Some(tokens) => {
                let text = tokens_to_string(&tokens);
                let length = parse_dimen(&text)
                    .ok_or_else(|| error(span, TexErrKind::MissingDimOrUnits(cs(name))))?;
                Some(length)
            }
            None => None,
        };
        self.close_styles(span, true)?;
        if !self.in_table() {
            return Err(error(span, TexErrKind::Misplaced(cs(name))));
        }
        let mut frame = self.pop_frame(span)?;
        let result = self.finish_cell(&mut frame);
        if result.is_ok() {
            self.finish_row(&mut frame, spacing);
        }
        self.stack.push(frame);
        result
    }

    /// `\hline`; only allowed at the start of a row.
    pub(super) fn hline(&mut self, name: &str, span: Span) -> ParseResult<()> {
        let frame = self.top_mut();
        let row_is_empty = frame.nodes.is_empty() && frame.over.is_none();
        match &mut frame.kind {
            FrameKind::Env(state) if state.def.is_table() && row_is_empty && state.cells.is_empty() => {
                state.hlines.push(state.rows.len());
                Ok(())
            }
            _ => Err(error(span, TexErrKind::Misplaced(cs(name)))),
        }
    }

    fn finish_cell(&mut self, frame: &mut Frame) -> ParseResult<()> {
        let content = self.finish_nodes(frame)?;
        let cell = self
            .builder
            .create_node(NodeKind::Mtd, &[content], &[], None);
        if let FrameKind::Env(state) = &mut frame.kind {
            state.cells.push(cell);
        }
        Ok(())
    }

    fn finish_row(&mut self, frame: &mut Frame, spacing: Option<Length>) {
        let FrameKind::Env(state) = &mut frame.kind else {
            return;
        };
        let cells = std::mem::take(&mut state.cells);
        state.width = state.width.max(cells.len());
        // A `multline` has a single number, which goes on its last row.
        let tag = if state.def.is_display() && state.def.kind != EnvKind::Multline {
            self.tags.finish_tag(&mut *self.builder)
        } else {
            None
        };
        let row = match tag {
            Some(tag) => {
                let mut children = Vec::with_capacity(cells.len() + 1);
                children.push(tag);
                children.extend(cells);
                self.builder
                    .create_node(NodeKind::Mlabeledtr, &children, &[], None)
            }
            None => self.builder.create_node(NodeKind::Mtr, &cells, &[], None),
        };
        state.rows.push(row);
        state.spacing.push(spacing);
    }

    /// Close an environment whose frame has been popped.
    pub(super) fn finish_env(&mut self, mut frame: Frame, span: Span) -> ParseResult<()> {
        let (def, row_is_empty, has_rows) = match &frame.kind {
            FrameKind::Env(state) => (
                state.def,
                state.cells.is_empty() && frame.nodes.is_empty() && frame.over.is_none(),
                !state.rows.is_empty(),
            ),
            _ => return Err(error(span, TexErrKind::Internal)),
        };
        let node = if def.is_table() {
            if row_is_empty && has_rows {
                // A trailing `\\` does not start a new row.
                if def.is_display() && def.kind != EnvKind::Multline {
                    self.tags.discard_row();
                }
            } else {
                self.finish_cell(&mut frame)?;
                self.finish_row(&mut frame, None);
            }
            let FrameKind::Env(mut state) = frame.kind else {
                return Err(error(span, TexErrKind::Internal));
            };
            if def.kind == EnvKind::Multline {
                self.tag_last_row(&mut state);
            }
            trace!(env = &*state.name, rows = state.rows.len(); "end environment");
            self.build_table(&state)
        } else {
            let content = self.finish_nodes(&mut frame)?;
            match self.tags.finish_tag(&mut *self.builder) {
                Some(tag) => self.labeled_table(tag, content),
                None => content,
            }
        };
        if def.is_display() {
            self.tags.end_tag();
        }
        self.push(node)
    }

    fn tag_last_row(&mut self, state: &mut ArrayState) {
        let Some(tag) = self.tags.finish_tag(&mut *self.builder) else {
            return;
        };
        let Some(last) = state.rows.pop() else {
            return;
        };
        let mut children = vec![tag];
        children.extend_from_slice(self.builder.get_children(last));
        let row = self
            .builder
            .create_node(NodeKind::Mlabeledtr, &children, &[], None);
        state.rows.push(row);
    }

    fn build_table(&mut self, state: &ArrayState) -> NodeId {
        let kind = state.def.kind;
        let rows = state.rows.len();
        let columns = state.width.max(1);
        let mut attrs: Vec<(Attr, String)> = Vec::new();
        match kind {
            EnvKind::Array => {
                if !state.columns.is_empty() {
                    attrs.push((Attr::Columnalign, state.columns.join(" ")));
                }
                if state.column_lines.contains(&"solid") {
                    attrs.push((Attr::Columnlines, state.column_lines.join(" ")));
                }
            }
            EnvKind::Matrix(..) => {
                attrs.push((Attr::Columnspacing, "1em".into()));
                attrs.push((Attr::Rowspacing, "4pt".into()));
            }
            EnvKind::SmallMatrix => {
                attrs.push((Attr::Columnspacing, "0.333em".into()));
                attrs.push((Attr::Rowspacing, "0.2em".into()));
            }
            EnvKind::Cases => {
                attrs.push((Attr::Columnalign, "left left".into()));
                attrs.push((Attr::Columnspacing, "1em".into()));
                attrs.push((Attr::Rowspacing, ".2em".into()));
            }
            EnvKind::Align | EnvKind::Aligned | EnvKind::Split => {
                let align: Vec<&str> = ["right", "left"].iter().copied().cycle().take(columns).collect();
                let spacing: Vec<&str> = ["0em", "2em"]
                    .iter()
                    .copied()
                    .cycle()
                    .take(columns.saturating_sub(1).max(1))
                    .collect();
                attrs.push((Attr::Columnalign, align.join(" ")));
                attrs.push((Attr::Columnspacing, spacing.join(" ")));
                attrs.push((Attr::Displaystyle, "true".into()));
                attrs.push((Attr::Rowspacing, "3pt".into()));
            }
            EnvKind::Gather | EnvKind::Gathered | EnvKind::Multline | EnvKind::Equation => {
                attrs.push((Attr::Displaystyle, "true".into()));
                attrs.push((Attr::Rowspacing, "3pt".into()));
            }
        }
        let explicit = state.spacing.iter().take(rows.saturating_sub(1));
        if explicit.clone().any(Option::is_some) {
            let default = default_row_spacing(kind);
            let spacing: Vec<String> = explicit
                .map(|length| match length {
                    Some(length) => length.to_string(),
                    None => default.to_string(),
                })
                .collect();
            attrs.retain(|(attr, _)| *attr != Attr::Rowspacing);
            attrs.push((Attr::Rowspacing, spacing.join(" ")));
        }
        let mut row_lines = vec!["none"; rows.saturating_sub(1)];
        let mut framed = state.framed;
        for &position in &state.hlines {
            if position == 0 || position >= rows {
                framed = true;
            } else {
                row_lines[position - 1] = "solid";
            }
        }
        if row_lines.contains(&"solid") {
            attrs.push((Attr::Rowlines, row_lines.join(" ")));
        }
        if framed {
            attrs.push((Attr::Frame, "solid".into()));
        }
        if state
            .rows
            .iter()
            .any(|&row| self.builder.is_kind(row, NodeKind::Mlabeledtr))
        {
            attrs.push((Attr::Side, "right".into()));
        }
        if kind == EnvKind::Multline && rows > 1 {
            for (i, &row) in state.rows.iter().enumerate() {
                let align = match i {
                    0 => "left",
                    i if i + 1 == rows => "right",
                    _ => "center",
                };
                self.builder.set_attribute(row, Attr::Columnalign, align);
            }
        }
        let attrs: Vec<(Attr, &str)> = attrs
            .iter()
            .map(|(attr, value)| (*attr, value.as_str()))
            .collect();
        let table = self
            .builder
            .create_node(NodeKind::Mtable, &state.rows, &attrs, None);
        match kind {
            EnvKind::Matrix(open, close) if !open.is_empty() || !close.is_empty() => {
                self.fenced(open, table, close)
            }
            EnvKind::SmallMatrix => {
                self.builder
                    .create_node(NodeKind::Mstyle, &[table], &[(Attr::Scriptlevel, "1")], None)
            }
            EnvKind::Cases => self.fenced("{", table, ""),
            _ => table,
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::super::tests::tree;

    #[test]
    fn matrices() {
        assert_snapshot!(
            tree(r"\begin{matrix}a&b\\c&d\end{matrix}"),
            @r#"math(mrow*(mtable{columnspacing=1em,rowspacing=4pt}(mtr(mtd(mrow*(mi"a")) mtd(mrow*(mi"b"))) mtr(mtd(mrow*(mi"c")) mtd(mrow*(mi"d"))))))"#
        );
        assert_snapshot!(
            tree(r"\begin{pmatrix}1\end{pmatrix}"),
            @r#"math(mrow*(mrow[INNER](mo{fence=true,stretchy=true,symmetric=true}"(" mtable{columnspacing=1em,rowspacing=4pt}(mtr(mtd(mrow*(mn"1")))) mo{fence=true,stretchy=true,symmetric=true}")")))"#
        );
        assert_snapshot!(
            tree(r"\matrix{a&b}"),
            @r#"math(mrow*(mtable{columnspacing=1em,rowspacing=4pt}(mtr(mtd(mrow*(mi"a")) mtd(mrow*(mi"b"))))))"#
        );
    }

    #[test]
    fn trailing_row_is_dropped() {
        assert_snapshot!(
            tree(r"\begin{matrix}a\\\end{matrix}"),
            @r#"math(mrow*(mtable{columnspacing=1em,rowspacing=4pt}(mtr(mtd(mrow*(mi"a"))))))"#
        );
        assert_snapshot!(
            tree(r"\begin{matrix}\end{matrix}"),
            @"math(mrow*(mtable{columnspacing=1em,rowspacing=4pt}(mtr(mtd(mrow*)))))"
        );
    }

    #[test]
    fn arrays() {
        assert_snapshot!(
            tree(r"\begin{array}{c|l}a&b\\\hline c&d\end{array}"),
            @r#"math(mrow*(mtable{columnalign=center left,columnlines=solid,rowlines=solid}(mtr(mtd(mrow*(mi"a")) mtd(mrow*(mi"b"))) mtr(mtd(mrow*(mi"c")) mtd(mrow*(mi"d"))))))"#
        );
        assert_snapshot!(tree(r"\begin{array}{cx}a\end{array}"), @"0: BadColumnSpec");
        assert_snapshot!(tree(r"\begin{array}{c}a\hline\end{array}"), @"17: Misplaced");
    }

    #[test]
    fn cases() {
        assert_snapshot!(
            tree(r"\begin{cases}1&x\end{cases}"),
            @r#"math(mrow*(mrow[INNER](mo{fence=true,stretchy=true,symmetric=true}"{" mtable{columnalign=left left,columnspacing=1em,rowspacing=.2em}(mtr(mtd(mrow*(mn"1")) mtd(mrow*(mi"x")))))))"#
        );
    }

    #[test]
    fn row_spacing() {
        assert_snapshot!(
            tree(r"\begin{matrix}a\\[2pt]b\end{matrix}"),
            @r#"math(mrow*(mtable{columnspacing=1em,rowspacing=0.2em}(mtr(mtd(mrow*(mi"a"))) mtr(mtd(mrow*(mi"b"))))))"#
        );
    }

    #[test]
    fn errors() {
        assert_snapshot!(tree("a&b"), @"1: Misplaced");
        assert_snapshot!(tree(r"a\\b"), @"1: Misplaced");
        assert_snapshot!(tree(r"\begin{foo}"), @"0: UnknownEnv");
        assert_snapshot!(tree(r"\begin{matrix}a\end{pmatrix}"), @"15: EnvBadEnd");
        assert_snapshot!(tree(r"\end{matrix}"), @"0: MissingBeginExtraEnd");
        assert_snapshot!(tree(r"\begin{matrix}a"), @"0: EnvMissingEnd");
        assert_snapshot!(tree(r"\begin{matrix}{a\end{matrix}"), @"14: ExtraOpenMissingClose");
        assert_snapshot!(
            tree(r"\begin{align}\begin{align}\end{align}\end{align}"),
            @"13: ErroneousNestingEq"
        );
    }
}
