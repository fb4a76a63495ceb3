//! Catalog features.
//!
//! Five independent catalogs share one implementation: a typed profile,
//! a prompt, a schema, and a [`ContentCache`] namespace, all supplied by
//! the [`CatalogProfile`] trait. Looking an item up generates its profile
//! at most once; every later selection of the same name is a cache hit
//! and costs nothing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use everbloom_oracle::{Gateway, OracleRequest};
use everbloom_store::{ContentCache, Store};

use crate::error::{FlowError, FlowResult};

const CATALOG_SCHEMA_VERSION: u32 = 1;

/// System framing shared by all catalog generations.
const CATALOG_SYSTEM: &str =
    "You are a warm, grounded personal-growth guide. Keep descriptions short and concrete.";

/// What a catalog needs to provide to ride on the shared implementation.
pub trait CatalogProfile:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// Store namespace the catalog persists under.
    const NAMESPACE: &'static str;

    /// Human label for the catalog's items, used in prompts.
    const LABEL: &'static str;

    /// The generation prompt for one item.
    fn prompt(name: &str) -> String;

    /// JSON Schema the generated profile must conform to.
    fn schema() -> Value;
}

/// A catalog of memoized, generated item profiles.
pub struct Catalog<P> {
    cache: ContentCache<P>,
    gateway: Gateway,
}

impl<P> Clone for Catalog<P> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            gateway: self.gateway.clone(),
        }
    }
}

impl<P: CatalogProfile> Catalog<P> {
    /// Bind the catalog to its namespace.
    pub fn new(store: Store, gateway: Gateway) -> Self {
        Self {
            cache: ContentCache::new(store, P::NAMESPACE, CATALOG_SCHEMA_VERSION),
            gateway,
        }
    }

    /// The profile for `name`, generated on first selection, served from
    /// the cache on every later one. Item names are case-sensitive
    /// canonical catalog names.
    pub async fn describe(&self, name: &str) -> FlowResult<P> {
        self.cache
            .get_or_generate(name, || async {
                let request = OracleRequest::text(P::prompt(name))
                    .with_system(CATALOG_SYSTEM)
                    .with_schema(P::schema());
                let profile: P = self.gateway.generate_json(request).await?;
                Ok::<P, FlowError>(profile)
            })
            .await
    }

    /// The cached profile, if one exists. Never generates.
    pub async fn cached(&self, name: &str) -> Option<P> {
        self.cache.get(name).await
    }

    /// Every item name resolved so far.
    pub async fn known(&self) -> Vec<String> {
        self.cache.keys().await
    }

    pub(crate) fn cache(&self) -> &ContentCache<P> {
        &self.cache
    }
}

// ── profiles ─────────────────────────────────────────────────────────

/// A plant ally: description, benefits, and a way to work with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantProfile {
    pub description: String,
    pub main_benefits: Vec<String>,
    pub ritual_suggestion: String,
}

impl CatalogProfile for PlantProfile {
    const NAMESPACE: &'static str = "catalog.plants";
    const LABEL: &'static str = "botanical ally";

    fn prompt(name: &str) -> String {
        format!(
            "Describe the plant \"{name}\" as a {}: what it is, its main \
             benefits for wellbeing, and one simple ritual to work with it.",
            Self::LABEL
        )
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["description", "main_benefits", "ritual_suggestion"],
            "properties": {
                "description": {"type": "string"},
                "main_benefits": {"type": "array", "items": {"type": "string"}},
                "ritual_suggestion": {"type": "string"},
            },
        })
    }
}

/// A spirit animal: what it symbolizes and what it asks of the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalProfile {
    pub symbolism: String,
    pub message: String,
    pub shadow_aspect: String,
}

impl CatalogProfile for AnimalProfile {
    const NAMESPACE: &'static str = "catalog.animals";
    const LABEL: &'static str = "spirit animal";

    fn prompt(name: &str) -> String {
        format!(
            "Describe \"{name}\" as a {}: its symbolism, the message it \
             carries, and its shadow aspect.",
            Self::LABEL
        )
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["symbolism", "message", "shadow_aspect"],
            "properties": {
                "symbolism": {"type": "string"},
                "message": {"type": "string"},
                "shadow_aspect": {"type": "string"},
            },
        })
    }
}

/// A crystal: properties, associated chakra, and care notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrystalProfile {
    pub properties: Vec<String>,
    pub chakra: String,
    pub care: String,
}

impl CatalogProfile for CrystalProfile {
    const NAMESPACE: &'static str = "catalog.crystals";
    const LABEL: &'static str = "crystal";

    fn prompt(name: &str) -> String {
        format!(
            "Describe the {} \"{name}\": its properties, the chakra it is \
             associated with, and how to care for it.",
            Self::LABEL
        )
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["properties", "chakra", "care"],
            "properties": {
                "properties": {"type": "array", "items": {"type": "string"}},
                "chakra": {"type": "string"},
                "care": {"type": "string"},
            },
        })
    }
}

/// An essential oil: description, benefits, and blending notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OilProfile {
    pub description: String,
    pub main_benefits: Vec<String>,
    pub blending: String,
}

impl CatalogProfile for OilProfile {
    const NAMESPACE: &'static str = "catalog.oils";
    const LABEL: &'static str = "essential oil";

    fn prompt(name: &str) -> String {
        format!(
            "Describe the {} \"{name}\": what it is, its main benefits, and \
             what it blends well with.",
            Self::LABEL
        )
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["description", "main_benefits", "blending"],
            "properties": {
                "description": {"type": "string"},
                "main_benefits": {"type": "array", "items": {"type": "string"}},
                "blending": {"type": "string"},
            },
        })
    }
}

/// A soundscape: what it sounds like, its mood, and when to use it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundProfile {
    pub description: String,
    pub mood: String,
    pub suggested_use: String,
}

impl CatalogProfile for SoundProfile {
    const NAMESPACE: &'static str = "catalog.sounds";
    const LABEL: &'static str = "soundscape";

    fn prompt(name: &str) -> String {
        format!(
            "Describe the {} \"{name}\": what it sounds like, the mood it \
             sets, and when to listen to it.",
            Self::LABEL
        )
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["description", "mood", "suggested_use"],
            "properties": {
                "description": {"type": "string"},
                "mood": {"type": "string"},
                "suggested_use": {"type": "string"},
            },
        })
    }
}

pub type PlantCatalog = Catalog<PlantProfile>;
pub type AnimalCatalog = Catalog<AnimalProfile>;
pub type CrystalCatalog = Catalog<CrystalProfile>;
pub type OilCatalog = Catalog<OilProfile>;

/// The soundscape library: the one catalog whose entries the user can also
/// author and delete themselves.
#[derive(Clone)]
pub struct SoundLibrary {
    inner: Catalog<SoundProfile>,
}

impl SoundLibrary {
    pub fn new(store: Store, gateway: Gateway) -> Self {
        Self {
            inner: Catalog::new(store, gateway),
        }
    }

    /// Generated-or-cached profile, like any catalog.
    pub async fn describe(&self, name: &str) -> FlowResult<SoundProfile> {
        self.inner.describe(name).await
    }

    /// Store a user-authored soundscape under `name`, overwriting any
    /// generated profile for that name.
    pub async fn add_custom(&self, name: &str, profile: SoundProfile) -> FlowResult<()> {
        self.inner.cache().put(name, profile).await?;
        Ok(())
    }

    /// Remove one entry. Returns whether it existed.
    pub async fn forget(&self, name: &str) -> FlowResult<bool> {
        Ok(self.inner.cache().remove(name).await?)
    }

    pub async fn cached(&self, name: &str) -> Option<SoundProfile> {
        self.inner.cached(name).await
    }

    pub async fn known(&self) -> Vec<String> {
        self.inner.known().await
    }
}

// ── tests ────────────────────────────────────────────────────────────
