//! The module model.
//!
//! A module is a feature area with its own data and its own sharing
//! consent: the journal, the dream log, and so on. Modules expose their
//! entries to the aggregator through the [`EntrySource`] accessor trait;
//! the data itself stays owned by the feature.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A feature area whose data may be shared into generation prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    /// Free-form journal entries.
    Journal,
    /// The dream log.
    Dreams,
    /// Ritual practice notes.
    Rituals,
    /// Emotion check-ins.
    Emotions,
    /// Stated intentions and goals.
    Intentions,
}

impl ModuleId {
    /// Every module, in a stable order.
    pub const ALL: [ModuleId; 5] = [
        ModuleId::Journal,
        ModuleId::Dreams,
        ModuleId::Rituals,
        ModuleId::Emotions,
        ModuleId::Intentions,
    ];

    /// Stable string form, used in persisted permission maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Dreams => "dreams",
            Self::Rituals => "rituals",
            Self::Emotions => "emotions",
            Self::Intentions => "intentions",
        }
    }

    /// Parse the stable string form back.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "journal" => Some(Self::Journal),
            "dreams" => Some(Self::Dreams),
            "rituals" => Some(Self::Rituals),
            "emotions" => Some(Self::Emotions),
            "intentions" => Some(Self::Intentions),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw entry as a module hands it to the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Feature-owned identifier.
    pub id: String,
    /// Short title or first line.
    pub title: String,
    /// When the entry was authored.
    pub date: DateTime<Utc>,
    /// Full entry text.
    pub content: String,
}

/// Accessor a module implements to expose its entries.
///
/// Consent is *not* this trait's concern; the aggregator checks the
/// sharing registry before ever calling `list_entries`.
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// Which module this source speaks for.
    fn module(&self) -> ModuleId;

    /// The module's entries, any order.
    async fn list_entries(&self) -> Vec<ModuleEntry>;
}

// ── tests ────────────────────────────────────────────────────────────
