use crate::entity::{ATTR_CUSTOM_EMOJI_ID, ATTR_LANGUAGE, ATTR_URL, ATTR_USER_ID, EntityKind};
use crate::syntax::Syntax;
use crate::tags::{LineBreaks, Tag, TagContext, TagMapping, TagRenderer, TemplateTag, tag_fn};
use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

/// One [`TagMapping`] per [`Syntax`].
#[derive(Clone, Debug)]
pub struct SyntaxRegistry {
    mappings: [TagMapping; 4],
}

impl SyntaxRegistry {
    /// Registry with no tags at all; every entity renders as plain text.
    pub fn empty() -> Self {
        Self {
            mappings: Syntax::ALL.map(|syntax| TagMapping::new(builtin_line_breaks(syntax))),
        }
    }

    /// Registry with the built-in mappings for every syntax.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        install_html(registry.mapping_mut(Syntax::Html));
        install_markdown(registry.mapping_mut(Syntax::Markdown));
        install_docuwiki(registry.mapping_mut(Syntax::DocuWiki));
        install_text(registry.mapping_mut(Syntax::Text));
        registry
    }

    pub fn mapping(&self, syntax: Syntax) -> &TagMapping {
        &self.mappings[slot(syntax)]
    }

    pub fn mapping_mut(&mut self, syntax: Syntax) -> &mut TagMapping {
        &mut self.mappings[slot(syntax)]
    }

    pub fn register(
        &mut self,
        syntax: Syntax,
        kind: impl Into<EntityKind>,
        renderer: impl TagRenderer + 'static,
    ) {
        self.mapping_mut(syntax).insert(kind, renderer);
    }

    pub fn unregister(&mut self, syntax: Syntax, kind: &EntityKind) -> bool {
        self.mapping_mut(syntax).remove(kind)
    }
}

impl Default for SyntaxRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn slot(syntax: Syntax) -> usize {
    match syntax {
        Syntax::Html => 0,
        Syntax::Markdown => 1,
        Syntax::DocuWiki => 2,
        Syntax::Text => 3,
    }
}

static GLOBAL: Lazy<RwLock<SyntaxRegistry>> = Lazy::new(|| RwLock::new(SyntaxRegistry::builtin()));

// Every mutation below is a single map insert/remove or a whole-value swap,
// so a poisoned lock never guards a half-updated registry.

/// Read access to the process-wide registry used by [`crate::render`].
pub fn global() -> RwLockReadGuard<'static, SyntaxRegistry> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
}

/// Clone of the process-wide registry, for callers that want to extend it
/// locally without affecting other threads.
pub fn snapshot() -> SyntaxRegistry {
    global().clone()
}

pub fn register_tag(
    syntax: Syntax,
    kind: impl Into<EntityKind>,
    renderer: impl TagRenderer + 'static,
) {
    let kind = kind.into();
    tracing::debug!(syntax = %syntax, kind = %kind, "registering tag renderer");
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(syntax, kind, renderer);
}

pub fn unregister_tag(syntax: Syntax, kind: &EntityKind) -> bool {
    tracing::debug!(syntax = %syntax, kind = %kind, "unregistering tag renderer");
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .unregister(syntax, kind)
}

/// Restores the built-in mappings.
pub fn reset() {
    tracing::debug!("restoring built-in tag mappings");
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = SyntaxRegistry::builtin();
}

fn builtin_line_breaks(syntax: Syntax) -> LineBreaks {
    match syntax {
        Syntax::Html => LineBreaks {
            paragraph: Tag::new("<p>", "</p>"),
            separator: String::new(),
            newline: "<br />".to_string(),
        },
        Syntax::Markdown | Syntax::DocuWiki | Syntax::Text => LineBreaks::default(),
    }
}

/// Link target for a `@username` mention.
fn mention_target(ctx: &TagContext<'_>) -> String {
    ctx.syntax.escape_attr(ctx.text.trim_start_matches('@'))
}

fn install_html(mapping: &mut TagMapping) {
    mapping.insert(EntityKind::Bold, Tag::new("<b>", "</b>"));
    mapping.insert(EntityKind::Italic, Tag::new("<i>", "</i>"));
    mapping.insert(EntityKind::Underline, Tag::new("<u>", "</u>"));
    mapping.insert(EntityKind::Strikethrough, Tag::new("<s>", "</s>"));
    mapping.insert(
        EntityKind::Spoiler,
        Tag::new("<span class=\"tg-spoiler\">", "</span>"),
    );
    mapping.insert(EntityKind::Code, Tag::new("<code>", "</code>"));
    mapping.insert(
        EntityKind::Pre,
        tag_fn(|ctx: &TagContext<'_>| match ctx.attr(ATTR_LANGUAGE) {
            Some(language) if !language.is_empty() => Tag::new(
                format!(
                    "<pre><code class=\"language-{}\">",
                    ctx.syntax.escape_attr(language)
                ),
                "</code></pre>",
            ),
            _ => Tag::new("<pre><code>", "</code></pre>"),
        }),
    );
    mapping.insert(
        EntityKind::TextLink,
        TemplateTag::new(format!("<a href=\"{{{ATTR_URL}}}\">"), "</a>"),
    );
    mapping.insert(EntityKind::Url, TemplateTag::new("<a href=\"{text}\">", "</a>"));
    mapping.insert(
        EntityKind::Email,
        TemplateTag::new("<a href=\"mailto:{text}\">", "</a>"),
    );
    mapping.insert(
        EntityKind::PhoneNumber,
        TemplateTag::new("<a href=\"tel:{text}\">", "</a>"),
    );
    mapping.insert(
        EntityKind::Mention,
        tag_fn(|ctx: &TagContext<'_>| {
            Tag::new(
                format!("<a href=\"https://t.me/{}\">", mention_target(ctx)),
                "</a>",
            )
        }),
    );
    mapping.insert(
        EntityKind::TextMention,
        TemplateTag::new(format!("<a href=\"tg://user?id={{{ATTR_USER_ID}}}\">"), "</a>"),
    );
    mapping.insert(EntityKind::Hashtag, Tag::new("<a href=\"#\">", "</a>"));
    mapping.insert(
        EntityKind::Blockquote,
        Tag::new("<blockquote>", "</blockquote>"),
    );
    mapping.insert(
        EntityKind::CustomEmoji,
        TemplateTag::new(
            format!("<tg-emoji emoji-id=\"{{{ATTR_CUSTOM_EMOJI_ID}}}\">"),
            "</tg-emoji>",
        ),
    );
}

fn install_markdown(mapping: &mut TagMapping) {
    mapping.insert(EntityKind::Bold, Tag::new("**", "**"));
    mapping.insert(EntityKind::Italic, Tag::new("*", "*"));
    mapping.insert(EntityKind::Underline, Tag::new("__", "__"));
    mapping.insert(EntityKind::Strikethrough, Tag::new("~~", "~~"));
    mapping.insert(EntityKind::Spoiler, Tag::new("||", "||"));
    mapping.insert(EntityKind::Code, Tag::new("`", "`"));
    mapping.insert(
        EntityKind::Pre,
        TemplateTag::new(format!("```{{{ATTR_LANGUAGE}}}\n"), "\n```"),
    );
    mapping.insert(
        EntityKind::TextLink,
        TemplateTag::new("[", format!("]({{{ATTR_URL}}})")),
    );
    mapping.insert(EntityKind::Url, TemplateTag::new("[", "]({text})"));
    mapping.insert(EntityKind::Email, TemplateTag::new("[", "](mailto:{text})"));
    mapping.insert(EntityKind::PhoneNumber, TemplateTag::new("[", "](tel:{text})"));
    mapping.insert(
        EntityKind::Mention,
        tag_fn(|ctx: &TagContext<'_>| {
            Tag::new("[", format!("](https://t.me/{})", mention_target(ctx)))
        }),
    );
    mapping.insert(
        EntityKind::TextMention,
        TemplateTag::new("[", format!("](tg://user?id={{{ATTR_USER_ID}}})")),
    );
    mapping.insert(EntityKind::Blockquote, Tag::new("> ", ""));
}

fn install_docuwiki(mapping: &mut TagMapping) {
    mapping.insert(EntityKind::Bold, Tag::new("**", "**"));
    mapping.insert(EntityKind::Italic, Tag::new("//", "//"));
    mapping.insert(EntityKind::Underline, Tag::new("__", "__"));
    mapping.insert(EntityKind::Strikethrough, Tag::new("<del>", "</del>"));
    mapping.insert(EntityKind::Spoiler, Tag::new("??", "??"));
    mapping.insert(EntityKind::Code, Tag::new("''", "''"));
    mapping.insert(
        EntityKind::Pre,
        TemplateTag::new(format!("<code {{{ATTR_LANGUAGE}}}>"), "</code>"),
    );
    mapping.insert(
        EntityKind::TextLink,
        TemplateTag::new(format!("[[{{{ATTR_URL}}}|"), "]]"),
    );
    mapping.insert(EntityKind::Url, TemplateTag::new("[[{text}|", "]]"));
    mapping.insert(EntityKind::Email, TemplateTag::new("[[mailto:{text}|", "]]"));
    mapping.insert(EntityKind::PhoneNumber, TemplateTag::new("[[tel:{text}|", "]]"));
    mapping.insert(
        EntityKind::Mention,
        tag_fn(|ctx: &TagContext<'_>| {
            Tag::new(format!("[[https://t.me/{}|", mention_target(ctx)), "]]")
        }),
    );
    mapping.insert(
        EntityKind::TextMention,
        TemplateTag::new(format!("[[tg://user?id={{{ATTR_USER_ID}}}|"), "]]"),
    );
    mapping.insert(EntityKind::Blockquote, Tag::new("> ", ""));
}

fn install_text(mapping: &mut TagMapping) {
    mapping.insert(
        EntityKind::TextLink,
        TemplateTag::new("", format!(" ({{{ATTR_URL}}})")),
    );
    mapping.insert(
        EntityKind::TextMention,
        TemplateTag::new("", format!(" ({{{ATTR_USER_ID}}})")),
    );
    mapping.insert(EntityKind::Blockquote, Tag::new("«", "»"));
}
