use ammonia::Builder;
use std::collections::{HashMap, HashSet};

/// Cleans rendered HTML against the allow-list of tags the built-in mapping
/// can produce. Custom mappings emitting other tags lose them here.
pub fn sanitize_html(raw_html: &str) -> String {
    let tags: HashSet<&'static str> = [
        "a",
        "b",
        "blockquote",
        "br",
        "code",
        "i",
        "p",
        "pre",
        "s",
        "span",
        "tg-emoji",
        "u",
    ]
    .iter()
    .copied()
    .collect();

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href"].iter().copied().collect());
    tag_attributes.insert("code", ["class"].iter().copied().collect());
    tag_attributes.insert("span", ["class"].iter().copied().collect());
    tag_attributes.insert("tg-emoji", ["emoji-id"].iter().copied().collect());

    Builder::new()
        .tags(tags)
        .generic_attributes(HashSet::new())
        .tag_attributes(tag_attributes)
        .add_url_schemes(["tg"])
        .link_rel(None)
        .clean(raw_html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::sanitize_html;

    #[test]
    fn keeps_message_markup() {
        let html = "<b>a</b><span class=\"tg-spoiler\">b</span><a href=\"https://x.y\">c</a>";
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn strips_scripts_and_unsafe_links() {
        let cleaned = sanitize_html("<a href=\"javascript:alert(1)\">x</a><script>bad()</script>");
        assert!(!cleaned.contains("javascript"));
        assert!(!cleaned.contains("script"));
        assert!(cleaned.contains(">x</a>"));
    }

    #[test]
    fn keeps_user_links() {
        let html = "<a href=\"tg://user?id=42\">n</a>";
        assert_eq!(sanitize_html(html), html);
    }
}
