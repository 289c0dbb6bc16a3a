use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::lenient;

/// Category of a logged user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    New,
    Update,
    Delete,
    User,
    Config,
    Complete,
    #[serde(other)]
    Info,
}

impl ActivityKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::New => "➕",
            Self::Update => "🔄",
            Self::Delete => "🗑️",
            Self::User => "👤",
            Self::Config => "⚙️",
            Self::Complete => "✅",
            Self::Info => "ℹ️",
        }
    }

    /// Read a kind from its name or its icon. Unknown tags are `Info`.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        const KINDS: [ActivityKind; 6] = [
            ActivityKind::New,
            ActivityKind::Update,
            ActivityKind::Delete,
            ActivityKind::User,
            ActivityKind::Config,
            ActivityKind::Complete,
        ];
        KINDS
            .into_iter()
            .find(|k| k.icon() == tag || k.name().eq_ignore_ascii_case(tag))
            .unwrap_or(Self::Info)
    }

    fn name(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::User => "user",
            Self::Config => "config",
            Self::Complete => "complete",
            Self::Info => "info",
        }
    }
}

fn kind_from_tag<'de, D>(deserializer: D) -> Result<ActivityKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_str().map_or(ActivityKind::Info, ActivityKind::from_tag))
}

/// One entry of the activity history. Older files store the kind as an icon
/// under `type` and the time as `dd/mm HH:MM` under `time`; both are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, alias = "time", deserialize_with = "lenient::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_kind", alias = "type", deserialize_with = "kind_from_tag")]
    pub kind: ActivityKind,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "desc")]
    pub description: String,
}

fn default_kind() -> ActivityKind {
    ActivityKind::Info
}

impl Activity {
    pub fn new(kind: ActivityKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            title: title.into(),
            description: description.into(),
        }
    }

    /// `dd/mm HH:MM` in local time.
    pub fn display_time(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%d/%m %H:%M").to_string()
    }
}

/// Append-only history, most recent first. Everything is persisted; only the
/// display is capped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<Activity>,
}

impl ActivityLog {
    pub fn record(&mut self, activity: Activity) {
        self.entries.insert(0, activity);
    }

    pub fn recent(&self, limit: usize) -> &[Activity] {
        &self.entries[..limit.min(self.entries.len())]
    }

    pub fn all(&self) -> &[Activity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
