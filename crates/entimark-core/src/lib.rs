mod entity;
mod error;
mod options;
pub mod registry;
mod render;
mod sanitize;
mod span;
mod syntax;
mod tags;
mod utf16;

pub use entity::{
    ATTR_CUSTOM_EMOJI_ID, ATTR_LANGUAGE, ATTR_URL, ATTR_USER_ID, Entity, EntityKind,
};
pub use error::{RenderError, Result};
pub use options::{LineBreakMode, RenderOptions};
pub use registry::SyntaxRegistry;
pub use render::{MessageRenderer, render, render_with};
pub use sanitize::sanitize_html;
pub use span::Span;
pub use syntax::Syntax;
pub use tags::{LineBreaks, Tag, TagContext, TagFn, TagMapping, TagRenderer, TemplateTag, tag_fn};
pub use utf16::Utf16Map;
