use serde::{Deserialize, Serialize};

/// How `\n` in the message text is rendered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineBreakMode {
    /// Newlines are ordinary text.
    #[default]
    Preserve,
    /// Output is split into paragraphs using the syntax's line-break tags.
    ///
    /// Paragraphs wrap every entity, block-level ones included, so HTML
    /// `pre` and `blockquote` end up inside `<p>`. A sanitizing pass
    /// re-parses that and hoists the block out of the paragraph.
    Paragraphs,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub line_breaks: LineBreakMode,
    /// Pass HTML output through the allow-list sanitizer. Ignored for other syntaxes.
    pub sanitize: bool,
}

#[cfg(test)]
mod tests {
    use super::{LineBreakMode, RenderOptions};

    #[test]
    fn missing_fields_use_defaults() {
        let options: RenderOptions = serde_json::from_str("{}").expect("options");
        assert_eq!(options, RenderOptions::default());
        let options: RenderOptions =
            serde_json::from_str(r#"{"line_breaks": "paragraphs"}"#).expect("options");
        assert_eq!(options.line_breaks, LineBreakMode::Paragraphs);
        assert!(!options.sanitize);
    }
}
