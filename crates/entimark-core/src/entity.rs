use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const ATTR_URL: &str = "url";
pub const ATTR_USER_ID: &str = "user_id";
pub const ATTR_LANGUAGE: &str = "language";
pub const ATTR_CUSTOM_EMOJI_ID: &str = "custom_emoji_id";

/// Style annotation over the half-open code-unit range `[offset, offset + length)`.
///
/// Offsets are signed so that malformed upstream records can be represented
/// and rejected instead of wrapping around.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub offset: i32,
    pub length: i32,
    #[serde(alias = "type")]
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(kind: impl Into<EntityKind>, offset: i32, length: i32) -> Self {
        Self {
            offset,
            length,
            kind: kind.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// End of the range in code units, computed without overflow.
    pub(crate) fn end(&self) -> i64 {
        i64::from(self.offset) + i64::from(self.length)
    }
}

/// Entity kinds known to the built-in tag mappings.
///
/// Identifiers follow the messaging platform's entity type names. Any other
/// identifier is kept verbatim in [`EntityKind::Other`] so operators can map it
/// through the registry.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre,
    TextLink,
    Url,
    Email,
    PhoneNumber,
    Mention,
    TextMention,
    Hashtag,
    Cashtag,
    BotCommand,
    BankCard,
    Blockquote,
    CustomEmoji,
    Other(String),
}

impl EntityKind {
    pub const KNOWN: [EntityKind; 19] = [
        EntityKind::Bold,
        EntityKind::Italic,
        EntityKind::Underline,
        EntityKind::Strikethrough,
        EntityKind::Spoiler,
        EntityKind::Code,
        EntityKind::Pre,
        EntityKind::TextLink,
        EntityKind::Url,
        EntityKind::Email,
        EntityKind::PhoneNumber,
        EntityKind::Mention,
        EntityKind::TextMention,
        EntityKind::Hashtag,
        EntityKind::Cashtag,
        EntityKind::BotCommand,
        EntityKind::BankCard,
        EntityKind::Blockquote,
        EntityKind::CustomEmoji,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Bold => "bold",
            EntityKind::Italic => "italic",
            EntityKind::Underline => "underline",
            EntityKind::Strikethrough => "strikethrough",
            EntityKind::Spoiler => "spoiler",
            EntityKind::Code => "code",
            EntityKind::Pre => "pre",
            EntityKind::TextLink => "text_link",
            EntityKind::Url => "url",
            EntityKind::Email => "email",
            EntityKind::PhoneNumber => "phone_number",
            EntityKind::Mention => "mention",
            EntityKind::TextMention => "text_mention",
            EntityKind::Hashtag => "hashtag",
            EntityKind::Cashtag => "cashtag",
            EntityKind::BotCommand => "bot_command",
            EntityKind::BankCard => "bank_card",
            EntityKind::Blockquote => "blockquote",
            EntityKind::CustomEmoji => "custom_emoji",
            EntityKind::Other(name) => name,
        }
    }

    /// Kinds whose content is verbatim code; line breaks inside them are not
    /// paragraph breaks.
    pub fn is_code(&self) -> bool {
        matches!(self, EntityKind::Code | EntityKind::Pre)
    }
}

impl From<&str> for EntityKind {
    fn from(name: &str) -> Self {
        EntityKind::KNOWN
            .iter()
            .find(|kind| kind.as_str() == name)
            .cloned()
            .unwrap_or_else(|| EntityKind::Other(name.to_string()))
    }
}

impl From<String> for EntityKind {
    fn from(name: String) -> Self {
        match EntityKind::from(name.as_str()) {
            EntityKind::Other(_) => EntityKind::Other(name),
            known => known,
        }
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{ATTR_URL, Entity, EntityKind};

    #[test]
    fn identifiers_round_trip() {
        for kind in EntityKind::KNOWN {
            assert_eq!(EntityKind::from(kind.as_str()), kind);
        }
        assert_eq!(
            EntityKind::from("unknown_future_kind"),
            EntityKind::Other("unknown_future_kind".to_string())
        );
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        assert_eq!(
            EntityKind::from("Bold"),
            EntityKind::Other("Bold".to_string())
        );
    }

    #[test]
    fn deserializes_platform_records() {
        let json = r#"[
            {"offset": 0, "length": 4, "type": "bold"},
            {"offset": 5, "length": 3, "kind": "text_link", "attributes": {"url": "https://a.b"}}
        ]"#;
        let entities: Vec<Entity> = serde_json::from_str(json).expect("entities");
        assert_eq!(entities[0], Entity::new(EntityKind::Bold, 0, 4));
        assert_eq!(entities[1].kind, EntityKind::TextLink);
        assert_eq!(entities[1].attr(ATTR_URL), Some("https://a.b"));
    }

    #[test]
    fn end_does_not_overflow() {
        let entity = Entity::new("bold", i32::MAX, i32::MAX);
        assert_eq!(entity.end(), 2 * i64::from(i32::MAX));
    }
}
