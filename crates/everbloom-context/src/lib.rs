//! # everbloom-context
//!
//! Consent-gated context assembly.
//!
//! Every generation request that wants to reference the user's own words
//! goes through two gates defined here:
//!
//! 1. The [`SharingRegistry`]: a persisted, deny-by-default map of which
//!    modules (journal, dreams, rituals, ...) may share data at all.
//! 2. The [`ContextAggregator`]: projects allowed modules' entries into a
//!    bounded, newest-first textual block, optionally filtered by a theme.
//!
//! Nothing in this crate errors on missing consent: a module that is not
//! allowed to share is skipped as a matter of course, and callers receive
//! a [`ContextOutcome`] that tells "nothing shared" apart from "nothing
//! matched".

pub mod aggregator;
pub mod modules;
pub mod sharing;

// ── re-exports ───────────────────────────────────────────────────────

pub use aggregator::{
    ContextAggregator, ContextItem, ContextOutcome, MAX_CONTEXT_ITEMS, NO_CONTEXT_SENTINEL,
};
pub use modules::{EntrySource, ModuleEntry, ModuleId};
pub use sharing::SharingRegistry;
