//! The sharing registry.
//!
//! One boolean per module: may this module's data be included in outgoing
//! generation requests? Absent means **no**; consent is opt-in, and the
//! only thing that flips a flag is an explicit settings action. Reads have
//! no side effects; a disallowed module is simply skipped, never an error.

use std::collections::BTreeMap;

use everbloom_store::{StateCell, Store, StoreResult};

use crate::modules::ModuleId;

const SHARING_NAMESPACE: &str = "context.sharing";
const SHARING_SCHEMA_VERSION: u32 = 1;

/// Persisted per-module sharing consent.
#[derive(Clone)]
pub struct SharingRegistry {
    cell: StateCell<BTreeMap<ModuleId, bool>>,
}

impl SharingRegistry {
    /// Bind the registry to its namespace in `store`.
    pub fn new(store: Store) -> Self {
        Self {
            cell: StateCell::new(
                store,
                SHARING_NAMESPACE,
                SHARING_SCHEMA_VERSION,
                BTreeMap::new,
            ),
        }
    }

    /// Whether `module` may contribute data to generation requests.
    /// Unset modules are denied.
    pub async fn is_allowed(&self, module: ModuleId) -> bool {
        self.cell.get().await.get(&module).copied().unwrap_or(false)
    }

    /// Record a consent decision for one module.
    pub async fn set_allowed(&self, module: ModuleId, allowed: bool) -> StoreResult<()> {
        self.cell
            .update(|map| {
                map.insert(module, allowed);
            })
            .await?;
        tracing::info!(module = %module, allowed, "sharing consent updated");
        Ok(())
    }

    /// Record the same decision for several modules in one write.
    pub async fn set_allowed_for(&self, modules: &[ModuleId], allowed: bool) -> StoreResult<()> {
        let modules = modules.to_vec();
        self.cell
            .update(move |map| {
                for module in modules {
                    map.insert(module, allowed);
                }
            })
            .await?;
        tracing::info!(allowed, "bulk sharing consent updated");
        Ok(())
    }

    /// The modules currently allowed to share, in stable order.
    pub async fn allowed_modules(&self) -> Vec<ModuleId> {
        let map = self.cell.get().await;
        ModuleId::ALL
            .into_iter()
            .filter(|m| map.get(m).copied().unwrap_or(false))
            .collect()
    }
}

// ── tests ────────────────────────────────────────────────────────────
