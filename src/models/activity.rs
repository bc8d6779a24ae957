//! Activity record model (canonical form of one feed entry)

use serde::{Deserialize, Serialize};

/// Kind of activity entry, from the wire `type` tag
///
/// Only updates and comments participate in thread reconstruction; every
/// other tag stays in the flat store but never renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityKind {
    /// Top-level post (`activity_update`)
    Update,
    /// Comment on a post or on another comment (`activity_comment`)
    Comment,
    /// Any other activity tag (new friendship, badge earned, ...)
    Other(String),
}

impl ActivityKind {
    /// Parse from the wire tag
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "activity_update" => Self::Update,
            "activity_comment" => Self::Comment,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire tag for this kind
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Update => "activity_update",
            Self::Comment => "activity_comment",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this kind participates in thread reconstruction
    pub const fn is_threadable(&self) -> bool {
        matches!(self, Self::Update | Self::Comment)
    }
}

impl From<String> for ActivityKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.as_tag().to_string()
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// One activity entry in canonical, typed form
///
/// Produced by the tolerant decoder; everything except `id` is best-effort
/// and may be absent when the server sent something unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Server-side activity id, unique within a feed session
    pub id: i64,
    /// Author id (absent on malformed payloads)
    pub user_id: Option<i64>,
    /// What kind of entry this is
    pub kind: ActivityKind,
    /// First parent candidate (`item_id` on the wire)
    pub item_id: Option<i64>,
    /// Second parent candidate (`secondary_item_id` on the wire)
    pub secondary_item_id: Option<i64>,
    /// Raw content, possibly HTML/entity-escaped
    pub content: Option<String>,
    /// Whether the current user favorited this entry
    pub favorited: Option<bool>,
    /// Opaque server timestamp, compared as a string for ordering only
    pub recorded_at: Option<String>,
    /// Nested comments, attached by the thread reconstructor
    #[serde(default)]
    pub children: Vec<ActivityRecord>,
}

impl ActivityRecord {
    /// Create a bare record with the given id and kind
    pub const fn new(id: i64, kind: ActivityKind) -> Self {
        Self {
            id,
            user_id: None,
            kind,
            item_id: None,
            secondary_item_id: None,
            content: None,
            favorited: None,
            recorded_at: None,
            children: Vec::new(),
        }
    }

    /// Content with entities decoded and HTML tags stripped
    pub fn plain_text(&self) -> String {
        let Some(raw) = &self.content else {
            return String::new();
        };

        let text = html_escape::decode_html_entities(raw)
            .to_string()
            .replace("<br>", "\n")
            .replace("<br/>", "\n")
            .replace("<br />", "\n")
            .replace("</p><p>", "\n\n");

        // Simple HTML tag removal
        regex_lite::Regex::new(r"<[^>]+>")
            .map(|re| re.replace_all(&text, "").to_string())
            .unwrap_or(text)
    }

    /// Short single-line preview of the content (for list display)
    pub fn preview(&self, max_len: usize) -> String {
        let content = self.plain_text().replace('\n', " ");
        if content.chars().count() <= max_len {
            content
        } else {
            // Truncate on char boundaries; content is arbitrary Unicode
            let truncated: String = content.chars().take(max_len.saturating_sub(3)).collect();
            format!("{truncated}...")
        }
    }

    /// Total number of records in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}
