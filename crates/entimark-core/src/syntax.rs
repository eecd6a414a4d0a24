use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target markup syntax. Each syntax carries its own escaping rules and its
/// own tag mapping in the registry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Syntax {
    Html,
    Markdown,
    DocuWiki,
    Text,
}

impl Syntax {
    pub const ALL: [Syntax; 4] = [Syntax::Html, Syntax::Markdown, Syntax::DocuWiki, Syntax::Text];

    pub fn name(self) -> &'static str {
        match self {
            Syntax::Html => "html",
            Syntax::Markdown => "markdown",
            Syntax::DocuWiki => "docuwiki",
            Syntax::Text => "text",
        }
    }

    /// Escapes message text appearing between tags.
    pub fn escape_text(self, text: &str) -> String {
        match self {
            Syntax::Html => escape_html(text),
            Syntax::Markdown => escape_markdown(text),
            Syntax::DocuWiki | Syntax::Text => text.to_string(),
        }
    }

    /// Escapes a value substituted into tag markup (link targets, ids).
    pub fn escape_attr(self, value: &str) -> String {
        match self {
            Syntax::Html => escape_attr(value),
            Syntax::Markdown => escape_markdown_target(value),
            Syntax::DocuWiki => escape_docuwiki_target(value),
            Syntax::Text => value.to_string(),
        }
    }
}

impl FromStr for Syntax {
    type Err = RenderError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "html" => Ok(Syntax::Html),
            "markdown" | "md" => Ok(Syntax::Markdown),
            "docuwiki" | "dw" => Ok(Syntax::DocuWiki),
            "text" | "plain" => Ok(Syntax::Text),
            other => Err(RenderError::UnsupportedSyntax(other.to_string())),
        }
    }
}

impl TryFrom<String> for Syntax {
    type Error = RenderError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Syntax> for String {
    fn from(syntax: Syntax) -> Self {
        syntax.name().to_string()
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '(' | ')' | '~' | '|') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn escape_markdown_target(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ' ' => out.push_str("%20"),
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

fn escape_docuwiki_target(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '|' => out.push_str("%7C"),
            '[' => out.push_str("%5B"),
            ']' => out.push_str("%5D"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::Syntax;
    use crate::error::RenderError;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("html".parse::<Syntax>(), Ok(Syntax::Html));
        assert_eq!("md".parse::<Syntax>(), Ok(Syntax::Markdown));
        assert_eq!("dw".parse::<Syntax>(), Ok(Syntax::DocuWiki));
        assert_eq!("plain".parse::<Syntax>(), Ok(Syntax::Text));
        for syntax in Syntax::ALL {
            assert_eq!(syntax.name().parse::<Syntax>(), Ok(syntax));
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(
            "HTML".parse::<Syntax>(),
            Err(RenderError::UnsupportedSyntax("HTML".to_string()))
        );
    }

    #[test]
    fn html_escaping() {
        assert_eq!(Syntax::Html.escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(Syntax::Html.escape_text("\"q\""), "\"q\"");
        assert_eq!(Syntax::Html.escape_attr("x\"y'z"), "x&quot;y&#x27;z");
    }

    #[test]
    fn markdown_escaping() {
        assert_eq!(Syntax::Markdown.escape_text("2*3_[x]"), "2\\*3\\_\\[x\\]");
        assert_eq!(Syntax::Markdown.escape_attr("a b(c)"), "a%20b\\(c\\)");
    }

    #[test]
    fn docuwiki_and_text_pass_through() {
        assert_eq!(Syntax::DocuWiki.escape_text("<b>"), "<b>");
        assert_eq!(Syntax::DocuWiki.escape_attr("a|b"), "a%7Cb");
        assert_eq!(Syntax::Text.escape_text("*x*"), "*x*");
    }
}
