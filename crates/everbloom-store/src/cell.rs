//! Typed state cells.
//!
//! A [`StateCell`] binds one namespace to one strongly-typed value with a
//! default. Features read through the cell on mount and write through it on
//! every mutation; the persisted value converges with the in-memory value
//! after each completed `set`. There is no batching or debouncing: writes
//! are user-paced, so correctness beats write amplification here.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreResult;
use crate::store::Store;

/// A strongly-typed, persistent value bound to a single namespace.
pub struct StateCell<T> {
    store: Store,
    namespace: &'static str,
    schema_version: u32,
    default: fn() -> T,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            namespace: self.namespace,
            schema_version: self.schema_version,
            default: self.default,
        }
    }
}

impl<T> StateCell<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    /// Bind a cell to `namespace`. The default is produced lazily whenever
    /// the namespace is absent or unreadable.
    pub fn new(
        store: Store,
        namespace: &'static str,
        schema_version: u32,
        default: fn() -> T,
    ) -> Self {
        Self {
            store,
            namespace,
            schema_version,
            default,
        }
    }

    /// The namespace this cell persists under.
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Read the current value (default on absent or corrupt payload).
    pub async fn get(&self) -> T {
        self.store.read(self.namespace, (self.default)()).await
    }

    /// Persist a new value, overwriting the previous one.
    pub async fn set(&self, value: &T) -> StoreResult<()> {
        self.store
            .write(self.namespace, self.schema_version, value)
            .await
    }

    /// Read-modify-write. Returns the value that was persisted.
    pub async fn update<F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.get().await;
        f(&mut value);
        self.set(&value).await?;
        Ok(value)
    }

    /// Drop the persisted value; the next `get` yields the default again.
    pub async fn reset(&self) -> StoreResult<()> {
        self.store.remove(self.namespace).await?;
        Ok(())
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        reminders_enabled: bool,
        daily_goal: u32,
    }

    fn default_settings() -> Settings {
        Settings {
            reminders_enabled: false,
            daily_goal: 1,
        }
    }

    async fn test_cell() -> StateCell<Settings> {
        let db = Database::open_in_memory().unwrap();
        db.run_migrations().await.unwrap();
        StateCell::new(Store::new(db), "settings", 1, default_settings)
    }

    #[tokio::test]
    async fn get_before_any_write_yields_default() {
        let cell = test_cell().await;
        assert_eq!(cell.get().await, default_settings());
    }

    #[tokio::test]
    async fn set_then_get_converges() {
        let cell = test_cell().await;
        let wanted = Settings {
            reminders_enabled: true,
            daily_goal: 3,
        };
        cell.set(&wanted).await.unwrap();
        assert_eq!(cell.get().await, wanted);
    }

    #[tokio::test]
    async fn update_persists_the_mutation() {
        let cell = test_cell().await;
        let updated = cell.update(|s| s.daily_goal = 5).await.unwrap();
        assert_eq!(updated.daily_goal, 5);
        assert_eq!(cell.get().await.daily_goal, 5);
    }

    #[tokio::test]
    async fn reset_restores_default() {
        let cell = test_cell().await;
        cell.update(|s| s.daily_goal = 9).await.unwrap();
        cell.reset().await.unwrap();
        assert_eq!(cell.get().await, default_settings());
    }
}
