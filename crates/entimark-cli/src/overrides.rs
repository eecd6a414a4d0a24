use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use entimark_core::{EntityKind, Syntax, SyntaxRegistry, TemplateTag};
use serde::Deserialize;

/// Operator-supplied changes to the tag mapping, read from TOML:
///
/// ```toml
/// [[tag]]
/// syntax = "html"
/// kind = "cashtag"
/// open = "<a href=\"https://finance.example/{text}\">"
/// close = "</a>"
///
/// [[tag]]
/// syntax = "markdown"
/// kind = "spoiler"
/// disabled = true
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct TagOverrides {
    #[serde(default, rename = "tag")]
    pub tags: Vec<TagOverride>,
}

#[derive(Debug, Deserialize)]
pub struct TagOverride {
    pub syntax: Syntax,
    pub kind: String,
    #[serde(default)]
    pub open: String,
    #[serde(default)]
    pub close: String,
    #[serde(default)]
    pub disabled: bool,
}

impl TagOverrides {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid tag overrides in {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply(&self, registry: &mut SyntaxRegistry) {
        for tag in &self.tags {
            let kind = EntityKind::from(tag.kind.as_str());
            if tag.disabled {
                tracing::debug!(syntax = %tag.syntax, kind = %kind, "disabling tag");
                registry.unregister(tag.syntax, &kind);
            } else {
                tracing::debug!(syntax = %tag.syntax, kind = %kind, "overriding tag");
                registry.register(
                    tag.syntax,
                    kind,
                    TemplateTag::new(tag.open.clone(), tag.close.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TagOverrides;
    use entimark_core::{EntityKind, Syntax, SyntaxRegistry};

    #[test]
    fn parses_and_applies_overrides() {
        let overrides = TagOverrides::parse(
            r#"
            [[tag]]
            syntax = "html"
            kind = "cashtag"
            open = "<a href=\"https://finance.example/{text}\">"
            close = "</a>"

            [[tag]]
            syntax = "md"
            kind = "spoiler"
            disabled = true
            "#,
        )
        .expect("overrides");
        assert_eq!(overrides.tags.len(), 2);

        let mut registry = SyntaxRegistry::builtin();
        overrides.apply(&mut registry);
        assert!(registry.mapping(Syntax::Html).contains(&EntityKind::Cashtag));
        assert!(!registry.mapping(Syntax::Markdown).contains(&EntityKind::Spoiler));
    }

    #[test]
    fn rejects_unknown_syntax() {
        let err = TagOverrides::parse("[[tag]]\nsyntax = \"rtf\"\nkind = \"bold\"\n")
            .expect_err("unsupported syntax");
        assert!(err.to_string().contains("rtf"), "{err}");
    }

    #[test]
    fn empty_file_changes_nothing() {
        let overrides = TagOverrides::parse("").expect("overrides");
        assert!(overrides.tags.is_empty());
    }
}
