//! Context aggregation.
//!
//! Before a generation request leaves the device, the aggregator assembles
//! a bounded, consent-gated slice of the user's own words to ground the
//! prompt: allowed modules only, optionally filtered by a theme, newest
//! first, capped. Callers always get a [`ContextOutcome`]; there is no
//! error path out of aggregation, and "nothing to share" is reported
//! distinctly from "nothing matched".

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::modules::{EntrySource, ModuleEntry, ModuleId};
use crate::sharing::SharingRegistry;

/// Upper bound on items rendered into one context block. A cost and
/// latency control, not a contract; tune freely.
pub const MAX_CONTEXT_ITEMS: usize = 12;

/// Character budget per item snippet.
const SNIPPET_BUDGET: usize = 280;

/// A normalized projection of one module entry, built per request and
/// never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextItem {
    /// Feature-owned entry id.
    pub id: String,
    /// Entry title.
    pub title: String,
    /// Module the entry came from.
    pub module: ModuleId,
    /// When the entry was authored.
    pub date: DateTime<Utc>,
    /// Content excerpt, bounded to the snippet budget.
    pub snippet: String,
}

impl ContextItem {
    fn project(module: ModuleId, entry: ModuleEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            module,
            date: entry.date,
            snippet: truncate_chars(&entry.content, SNIPPET_BUDGET),
        }
    }

    fn matches_theme(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.snippet.to_lowercase().contains(needle)
    }
}

/// The result of building context for a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextOutcome {
    /// At least one entry made it into the rendered block.
    Available(String),
    /// Modules were willing to share, but nothing matched (or nothing has
    /// been written yet). Callers that *require* context should surface
    /// this to the user; the fix is writing more entries, not a retry.
    NoRelevantEntries,
    /// No candidate module has sharing enabled. Expected steady state, not
    /// an error; callers proceed without personal context.
    SharingDisabled,
}

/// Sentinel injected into prompts when no context is available, so prompt
/// templates can branch on it instead of on an empty string.
pub const NO_CONTEXT_SENTINEL: &str = "no context available";

impl ContextOutcome {
    /// The text to splice into a prompt. Non-available outcomes render the
    /// [`NO_CONTEXT_SENTINEL`].
    pub fn as_prompt_block(&self) -> &str {
        match self {
            Self::Available(text) => text,
            Self::NoRelevantEntries | Self::SharingDisabled => NO_CONTEXT_SENTINEL,
        }
    }

    /// Whether real user context was assembled.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Assembles consent-gated context blocks from module entry sources.
#[derive(Clone)]
pub struct ContextAggregator {
    registry: SharingRegistry,
}

impl ContextAggregator {
    /// Create an aggregator that consults `registry` for consent.
    pub fn new(registry: SharingRegistry) -> Self {
        Self { registry }
    }

    /// The registry this aggregator consults.
    pub fn registry(&self) -> &SharingRegistry {
        &self.registry
    }

    /// Build a context block from the given sources.
    ///
    /// Disallowed modules are skipped silently. With a `theme`, only items
    /// whose title or snippet contains it (case-insensitively) are kept.
    /// Survivors are sorted newest-first and capped at
    /// [`MAX_CONTEXT_ITEMS`].
    pub async fn build_context(
        &self,
        sources: &[&dyn EntrySource],
        theme: Option<&str>,
    ) -> ContextOutcome {
        let mut any_allowed = false;
        let mut items: Vec<ContextItem> = Vec::new();

        for source in sources {
            let module = source.module();
            if !self.registry.is_allowed(module).await {
                debug!(module = %module, "sharing disabled, module skipped");
                continue;
            }
            any_allowed = true;
            for entry in source.list_entries().await {
                items.push(ContextItem::project(module, entry));
            }
        }

        if !any_allowed {
            return ContextOutcome::SharingDisabled;
        }

        if let Some(theme) = theme {
            let needle = theme.to_lowercase();
            items.retain(|item| item.matches_theme(&needle));
        }

        if items.is_empty() {
            return ContextOutcome::NoRelevantEntries;
        }

        items.sort_by(|a, b| b.date.cmp(&a.date));
        items.truncate(MAX_CONTEXT_ITEMS);

        debug!(items = items.len(), theme = theme.unwrap_or(""), "context assembled");
        ContextOutcome::Available(render(&items))
    }
}

/// Render items into the flat textual block spliced into prompts.
fn render(items: &[ContextItem]) -> String {
    let mut block = String::from("Recent entries the user has chosen to share:\n");
    for item in items {
        block.push_str(&format!(
            "- [{}] {} | {}: {}\n",
            item.module,
            item.date.format("%Y-%m-%d"),
            item.title,
            item.snippet,
        ));
    }
    block
}

/// Truncate on a char boundary, appending an ellipsis when content was cut.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_owned()
    } else {
        let mut out: String = s.chars().take(max).collect();
        out.push_str("...");
        out
    }
}

// ── tests ────────────────────────────────────────────────────────────
