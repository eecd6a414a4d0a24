use crate::entity::{Entity, EntityKind};
use crate::syntax::Syntax;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opening and closing markup emitted around an entity's text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tag {
    pub opening: String,
    pub closing: String,
}

impl Tag {
    pub fn new(opening: impl Into<String>, closing: impl Into<String>) -> Self {
        Self {
            opening: opening.into(),
            closing: closing.into(),
        }
    }
}

/// Everything a [`TagRenderer`] may look at when producing markup.
#[derive(Clone, Copy, Debug)]
pub struct TagContext<'a> {
    pub entity: &'a Entity,
    /// Message text covered by the entity after clamping.
    pub text: &'a str,
    pub syntax: Syntax,
}

impl<'a> TagContext<'a> {
    pub fn attr(&self, key: &str) -> Option<&'a str> {
        self.entity.attr(key)
    }

    /// Attribute value escaped for use inside markup; empty when absent.
    pub fn escaped_attr(&self, key: &str) -> String {
        self.attr(key)
            .map(|value| self.syntax.escape_attr(value))
            .unwrap_or_default()
    }

    /// Covered text escaped for use inside markup (e.g. as a link target).
    pub fn escaped_text(&self) -> String {
        self.syntax.escape_attr(self.text)
    }
}

/// Produces the markup for one entity kind in one syntax.
pub trait TagRenderer: Send + Sync {
    fn render(&self, ctx: &TagContext<'_>) -> Tag;

    fn render_open(&self, ctx: &TagContext<'_>) -> String {
        self.render(ctx).opening
    }

    fn render_close(&self, ctx: &TagContext<'_>) -> String {
        self.render(ctx).closing
    }
}

impl TagRenderer for Tag {
    fn render(&self, _ctx: &TagContext<'_>) -> Tag {
        self.clone()
    }
}

/// Renderer backed by a closure.
pub struct TagFn<F>(F);

/// Wraps `f` as a [`TagRenderer`].
pub fn tag_fn<F>(f: F) -> TagFn<F>
where
    F: Fn(&TagContext<'_>) -> Tag + Send + Sync,
{
    TagFn(f)
}

impl<F> TagRenderer for TagFn<F>
where
    F: Fn(&TagContext<'_>) -> Tag + Send + Sync,
{
    fn render(&self, ctx: &TagContext<'_>) -> Tag {
        (self.0)(ctx)
    }
}

/// Renderer defined by open/close strings with `{placeholder}` substitution.
///
/// `{text}` expands to the covered text, any other `{name}` to the entity
/// attribute `name`. Values are escaped with the syntax's attribute rules;
/// missing attributes expand to nothing. Braces not forming a placeholder are
/// copied verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateTag {
    pub open: String,
    pub close: String,
}

impl TemplateTag {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl TagRenderer for TemplateTag {
    fn render(&self, ctx: &TagContext<'_>) -> Tag {
        Tag::new(expand(&self.open, ctx), expand(&self.close, ctx))
    }
}

fn expand(template: &str, ctx: &TagContext<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder(&after[..close]) => {
                let name = &after[..close];
                if name == "text" {
                    out.push_str(&ctx.escaped_text());
                } else {
                    out.push_str(&ctx.escaped_attr(name));
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_placeholder(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

/// Markup used for `\n` when rendering in paragraph mode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineBreaks {
    /// Wraps every paragraph, including the first and the last.
    pub paragraph: Tag,
    /// Emitted between the closing and reopening paragraph tags.
    pub separator: String,
    /// Replaces `\n` inside code entities.
    pub newline: String,
}

impl Default for LineBreaks {
    fn default() -> Self {
        Self {
            paragraph: Tag::default(),
            separator: "\n".to_string(),
            newline: "\n".to_string(),
        }
    }
}

/// Kind identifier to renderer table for a single syntax.
#[derive(Clone, Default)]
pub struct TagMapping {
    tags: HashMap<String, Arc<dyn TagRenderer>>,
    pub line_breaks: LineBreaks,
}

impl TagMapping {
    pub fn new(line_breaks: LineBreaks) -> Self {
        Self {
            tags: HashMap::new(),
            line_breaks,
        }
    }

    pub fn insert(&mut self, kind: impl Into<EntityKind>, renderer: impl TagRenderer + 'static) {
        self.insert_shared(kind, Arc::new(renderer));
    }

    pub fn insert_shared(&mut self, kind: impl Into<EntityKind>, renderer: Arc<dyn TagRenderer>) {
        self.tags.insert(String::from(kind.into()), renderer);
    }

    /// Returns whether a renderer was registered for `kind`.
    pub fn remove(&mut self, kind: &EntityKind) -> bool {
        self.tags.remove(kind.as_str()).is_some()
    }

    pub fn get(&self, kind: &EntityKind) -> Option<&dyn TagRenderer> {
        self.tags.get(kind.as_str()).map(|renderer| renderer.as_ref())
    }

    pub fn contains(&self, kind: &EntityKind) -> bool {
        self.tags.contains_key(kind.as_str())
    }

    /// Mapped kind identifiers, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.tags.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for TagMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagMapping")
            .field("kinds", &self.kinds())
            .field("line_breaks", &self.line_breaks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Tag, TagContext, TagMapping, TagRenderer, TemplateTag, tag_fn};
    use crate::entity::{ATTR_URL, Entity, EntityKind};
    use crate::syntax::Syntax;

    fn context<'a>(entity: &'a Entity, text: &'a str, syntax: Syntax) -> TagContext<'a> {
        TagContext {
            entity,
            text,
            syntax,
        }
    }

    #[test]
    fn template_substitutes_escaped_values() {
        let entity = Entity::new(EntityKind::TextLink, 0, 4).with_attr(ATTR_URL, "a?b=1&c=\"2\"");
        let template = TemplateTag::new("<a href=\"{url}\" title=\"{text}\">", "</a>");
        let tag = template.render(&context(&entity, "x<y", Syntax::Html));
        assert_eq!(
            tag.opening,
            "<a href=\"a?b=1&amp;c=&quot;2&quot;\" title=\"x&lt;y\">"
        );
        assert_eq!(tag.closing, "</a>");
    }

    #[test]
    fn template_keeps_stray_braces() {
        let entity = Entity::new(EntityKind::Code, 0, 1);
        let template = TemplateTag::new("{ {not a placeholder} {", "}{missing}");
        let tag = template.render(&context(&entity, "x", Syntax::Text));
        assert_eq!(tag.opening, "{ {not a placeholder} {");
        assert_eq!(tag.closing, "}");
    }

    #[test]
    fn closures_render_through_the_trait() {
        let renderer = tag_fn(|ctx: &TagContext<'_>| {
            Tag::new(format!("[{}:", ctx.entity.kind), "]")
        });
        let entity = Entity::new(EntityKind::Bold, 0, 1);
        let ctx = context(&entity, "x", Syntax::Text);
        assert_eq!(renderer.render_open(&ctx), "[bold:");
        assert_eq!(renderer.render_close(&ctx), "]");
    }

    #[test]
    fn mapping_lookup_is_exact() {
        let mut mapping = TagMapping::default();
        mapping.insert(EntityKind::Bold, Tag::new("<b>", "</b>"));
        mapping.insert("my_kind", Tag::new("<x>", "</x>"));
        assert!(mapping.contains(&EntityKind::Bold));
        assert!(mapping.contains(&EntityKind::from("my_kind")));
        assert!(!mapping.contains(&EntityKind::from("My_Kind")));
        assert_eq!(mapping.kinds(), vec!["bold", "my_kind"]);
        assert!(mapping.remove(&EntityKind::Bold));
        assert!(!mapping.remove(&EntityKind::Bold));
    }
}
