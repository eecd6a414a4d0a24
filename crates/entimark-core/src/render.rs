use crate::entity::Entity;
use crate::error::{RenderError, Result};
use crate::options::{LineBreakMode, RenderOptions};
use crate::registry::{self, SyntaxRegistry};
use crate::sanitize::sanitize_html;
use crate::span::Span;
use crate::syntax::Syntax;
use crate::tags::{LineBreaks, Tag, TagContext, TagMapping};
use crate::utf16::Utf16Map;
use std::cmp::Reverse;

/// Renders `text` with `entities` using the process-wide registry and
/// default options.
pub fn render(text: &str, entities: &[Entity], syntax: Syntax) -> Result<String> {
    render_with(
        text,
        entities,
        syntax,
        &registry::global(),
        &RenderOptions::default(),
    )
}

pub fn render_with(
    text: &str,
    entities: &[Entity],
    syntax: Syntax,
    registry: &SyntaxRegistry,
    options: &RenderOptions,
) -> Result<String> {
    validate(entities)?;

    let mapping = registry.mapping(syntax);
    let styled = collect_styled(text, entities, syntax, mapping);
    let events = boundary_events(&styled);

    let mut writer = MarkupWriter::new(syntax, &mapping.line_breaks, options.line_breaks, &styled);
    let mut cursor = 0usize;
    let mut idx = 0usize;
    while idx < events.len() {
        let pos = events[idx].pos;
        writer.text(&text[cursor..pos]);
        cursor = pos;

        let mut closing = Vec::new();
        while idx < events.len() && events[idx].pos == pos && events[idx].boundary == Boundary::Close
        {
            closing.push(events[idx].styled);
            idx += 1;
        }
        writer.close(&closing);

        while idx < events.len() && events[idx].pos == pos {
            writer.open(events[idx].styled);
            idx += 1;
        }
    }
    writer.text(&text[cursor..]);
    let out = writer.finish();

    tracing::debug!(
        syntax = %syntax,
        entities = entities.len(),
        styled = styled.len(),
        "rendered message"
    );

    if options.sanitize && syntax == Syntax::Html {
        Ok(sanitize_html(&out))
    } else {
        Ok(out)
    }
}

/// Borrowing front end: bind a message once, render it in any syntax.
#[derive(Clone, Debug)]
pub struct MessageRenderer<'a> {
    text: &'a str,
    entities: &'a [Entity],
    options: RenderOptions,
    registry: Option<&'a SyntaxRegistry>,
}

impl<'a> MessageRenderer<'a> {
    pub fn new(text: &'a str, entities: &'a [Entity]) -> Self {
        Self {
            text,
            entities,
            options: RenderOptions::default(),
            registry: None,
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: &'a SyntaxRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Renders into the syntax named `name` (case-sensitive, e.g. `"html"`).
    pub fn to_syntax(&self, name: &str) -> Result<String> {
        let syntax: Syntax = name.parse()?;
        self.render(syntax)
    }

    pub fn render(&self, syntax: Syntax) -> Result<String> {
        match self.registry {
            Some(registry) => {
                render_with(self.text, self.entities, syntax, registry, &self.options)
            }
            None => render_with(
                self.text,
                self.entities,
                syntax,
                &registry::global(),
                &self.options,
            ),
        }
    }
}

fn validate(entities: &[Entity]) -> Result<()> {
    match entities
        .iter()
        .enumerate()
        .find(|(_, entity)| entity.offset < 0 || entity.length < 0)
    {
        Some((index, entity)) => Err(RenderError::InvalidEntity {
            index,
            offset: entity.offset,
            length: entity.length,
        }),
        None => Ok(()),
    }
}

/// Entity that survived clamping and has a tag in the active mapping.
struct Styled {
    span: Span,
    tag: Tag,
    code: bool,
}

fn collect_styled(
    text: &str,
    entities: &[Entity],
    syntax: Syntax,
    mapping: &TagMapping,
) -> Vec<Styled> {
    let map = Utf16Map::new(text);
    let len = map.len_utf16();
    let mut styled = Vec::with_capacity(entities.len());

    for (index, entity) in entities.iter().enumerate() {
        if entity.length == 0 {
            tracing::trace!(index, kind = %entity.kind, "skipping zero-length entity");
            continue;
        }
        // Non-negative after `validate`.
        let start = entity.offset as usize;
        if start >= len {
            tracing::debug!(index, offset = entity.offset, len, "entity starts past the end of text");
            continue;
        }
        let end = usize::try_from(entity.end()).map_or(len, |end| end.min(len));
        if i64::try_from(len).is_ok_and(|len| entity.end() > len) {
            tracing::debug!(index, end = entity.end(), len, "clamping entity to end of text");
        }
        let Some(renderer) = mapping.get(&entity.kind) else {
            tracing::trace!(index, kind = %entity.kind, syntax = %syntax, "no tag mapped for entity kind");
            continue;
        };

        let span = map.span(start, end);
        let ctx = TagContext {
            entity,
            text: span.slice(text),
            syntax,
        };
        styled.push(Styled {
            span,
            tag: renderer.render(&ctx),
            code: entity.kind.is_code(),
        });
    }
    styled
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
enum Boundary {
    Close,
    Open,
}

#[derive(Clone, Copy, Debug)]
struct Event {
    pos: usize,
    boundary: Boundary,
    styled: usize,
}

/// Events ordered by position, closes before opens, and opens outermost
/// first (furthest end), ties in input order. Close order is decided by the
/// writer's stack.
fn boundary_events(styled: &[Styled]) -> Vec<Event> {
    let mut events = Vec::with_capacity(styled.len() * 2);
    for (id, item) in styled.iter().enumerate() {
        events.push(Event {
            pos: item.span.start,
            boundary: Boundary::Open,
            styled: id,
        });
        events.push(Event {
            pos: item.span.end,
            boundary: Boundary::Close,
            styled: id,
        });
    }
    events.sort_by_key(|event| {
        (
            event.pos,
            event.boundary,
            Reverse(styled[event.styled].span.end),
            event.styled,
        )
    });
    events
}

struct Frame {
    styled: usize,
    // False while the opening tag is withheld after a split; it is emitted
    // only once text or a nested tag follows.
    emitted: bool,
}

struct MarkupWriter<'a> {
    out: String,
    syntax: Syntax,
    line_breaks: &'a LineBreaks,
    mode: LineBreakMode,
    styled: &'a [Styled],
    stack: Vec<Frame>,
}

impl<'a> MarkupWriter<'a> {
    fn new(
        syntax: Syntax,
        line_breaks: &'a LineBreaks,
        mode: LineBreakMode,
        styled: &'a [Styled],
    ) -> Self {
        let mut out = String::new();
        if mode == LineBreakMode::Paragraphs {
            out.push_str(&line_breaks.paragraph.opening);
        }
        Self {
            out,
            syntax,
            line_breaks,
            mode,
            styled,
            stack: Vec::new(),
        }
    }

    fn open(&mut self, id: usize) {
        self.flush_withheld();
        self.out.push_str(&self.styled[id].tag.opening);
        self.stack.push(Frame {
            styled: id,
            emitted: true,
        });
    }

    /// Closes every entity in `closing`. Entities opened after one of them
    /// and still running are closed too and resume afterwards.
    fn close(&mut self, closing: &[usize]) {
        let Some(depth) = self
            .stack
            .iter()
            .position(|frame| closing.contains(&frame.styled))
        else {
            return;
        };

        let mut resumed = Vec::new();
        while self.stack.len() > depth {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            if frame.emitted {
                self.out.push_str(&self.styled[frame.styled].tag.closing);
            }
            if !closing.contains(&frame.styled) {
                resumed.push(frame.styled);
            }
        }
        if !resumed.is_empty() {
            tracing::trace!(resumed = resumed.len(), "split overlapping entities");
        }
        for id in resumed.into_iter().rev() {
            self.stack.push(Frame {
                styled: id,
                emitted: false,
            });
        }
    }

    fn text(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        match self.mode {
            LineBreakMode::Preserve => self.escaped(chunk),
            LineBreakMode::Paragraphs => {
                for (idx, line) in chunk.split('\n').enumerate() {
                    if idx > 0 {
                        self.line_break();
                    }
                    self.escaped(line);
                }
            }
        }
    }

    fn escaped(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.flush_withheld();
        // Markdown code spans and fences take their content literally.
        if self.syntax == Syntax::Markdown && self.in_code() {
            self.out.push_str(chunk);
        } else {
            self.out.push_str(&self.syntax.escape_text(chunk));
        }
    }

    fn in_code(&self) -> bool {
        self.stack.iter().any(|frame| self.styled[frame.styled].code)
    }

    fn line_break(&mut self) {
        if self.in_code() {
            self.flush_withheld();
            self.out.push_str(&self.line_breaks.newline);
            return;
        }
        for frame in self.stack.iter_mut().rev() {
            if frame.emitted {
                self.out.push_str(&self.styled[frame.styled].tag.closing);
                frame.emitted = false;
            }
        }
        self.out.push_str(&self.line_breaks.paragraph.closing);
        self.out.push_str(&self.line_breaks.separator);
        self.out.push_str(&self.line_breaks.paragraph.opening);
    }

    fn flush_withheld(&mut self) {
        for frame in self.stack.iter_mut() {
            if !frame.emitted {
                self.out.push_str(&self.styled[frame.styled].tag.opening);
                frame.emitted = true;
            }
        }
    }

    fn finish(mut self) -> String {
        for frame in self.stack.iter().rev() {
            if frame.emitted {
                self.out.push_str(&self.styled[frame.styled].tag.closing);
            }
        }
        if self.mode == LineBreakMode::Paragraphs {
            self.out.push_str(&self.line_breaks.paragraph.closing);
        }
        self.out
    }
}
