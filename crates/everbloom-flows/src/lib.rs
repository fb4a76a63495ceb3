//! # everbloom-flows
//!
//! The feature flows of Everbloom, built on the three core crates:
//! persistence (`everbloom-store`), consent-gated context
//! (`everbloom-context`), and the generation gateway (`everbloom-oracle`).
//!
//! - [`catalogs`]: five catalogs (plants, animals, crystals, oils,
//!   soundscapes) sharing one memoized-generation implementation.
//! - [`journey`]: guided multi-day journeys with per-slug memoized plans
//!   and persisted progress.
//! - [`path`]: goal-driven personalized paths.
//! - [`review`]: one generated review per ISO week.
//! - [`quiz`]: the wound quiz and its per-archetype exercise plans.
//!
//! Every flow persists through state cells, generates through the gateway,
//! and includes user context only via the aggregator — no feature talks to
//! the oracle or the database directly.

pub mod catalogs;
pub mod error;
pub mod journey;
pub mod path;
pub mod quiz;
pub mod review;

#[cfg(test)]
mod test_support;

// ── re-exports ───────────────────────────────────────────────────────

pub use catalogs::{
    AnimalCatalog, AnimalProfile, Catalog, CatalogProfile, CrystalCatalog, CrystalProfile,
    OilCatalog, OilProfile, PlantCatalog, PlantProfile, SoundLibrary, SoundProfile,
};
pub use error::{FlowError, FlowResult};
pub use journey::{JourneyDay, JourneyFlow, JourneyPlan, JourneyProgress};
pub use path::{PathBlueprint, PathFlow, PathState, PathStep};
pub use quiz::{Exercise, ExercisePlan, QuizFlow, QuizQuestion, QuizState, WoundReading};
pub use review::{ReviewFlow, WeeklyReview, week_key};
