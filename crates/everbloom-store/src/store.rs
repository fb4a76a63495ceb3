//! Versioned namespace store.
//!
//! Every piece of application state lives under a named namespace, one row
//! per namespace in the `namespaces` table. The payload shape is owned by
//! the feature that writes it; the store never validates it, it only
//! serializes, persists, and hands it back.
//!
//! Payloads are stored in canonical `serde_json` form (object keys sorted),
//! which keeps export → import round trips byte-stable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{StoreError, StoreResult};

/// Export format version written into every [`ExportBundle`].
///
/// Bump when the bundle layout itself changes; per-namespace payload shapes
/// evolve independently via their `schema_version`.
pub const FORMAT_VERSION: u32 = 1;

/// A single namespace snapshot inside an [`ExportBundle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceRecord {
    /// Payload schema version, owned by the feature that wrote it.
    pub schema_version: u32,
    /// The persisted JSON payload.
    pub payload: Value,
}

/// A wholesale snapshot of the store, suitable for writing to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundle {
    /// Bundle layout version; imports reject versions newer than this build.
    pub format_version: u32,
    /// When the snapshot was taken.
    pub exported_at: DateTime<Utc>,
    /// Every known namespace at snapshot time.
    pub namespaces: BTreeMap<String, NamespaceRecord>,
}

/// Handle to the versioned namespace store.
///
/// Cloning is cheap; clones share the underlying [`Database`].
#[derive(Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    /// Create a store over an already-migrated database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Read a namespace payload, falling back to `default` when the
    /// namespace is absent or its payload no longer deserializes.
    ///
    /// Corruption fails soft: the incident is logged and the default is
    /// returned, so a single bad payload never takes a feature down.
    pub async fn read<T>(&self, namespace: &str, default: T) -> T
    where
        T: DeserializeOwned + Send + 'static,
    {
        let ns = namespace.to_owned();
        let row: StoreResult<Option<String>> = self
            .db
            .execute(move |conn| {
                let payload = conn
                    .query_row(
                        "SELECT payload FROM namespaces WHERE namespace = ?1",
                        [&ns],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(payload)
            })
            .await;

        match row {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(err) => {
                    warn!(namespace, %err, "corrupt namespace payload, using default");
                    default
                }
            },
            Ok(None) => default,
            Err(err) => {
                warn!(namespace, %err, "namespace read failed, using default");
                default
            }
        }
    }

    /// Serialize `value` and persist it under `namespace`, overwriting any
    /// previous payload.
    ///
    /// Failures (serialization, disk full, quota) surface as [`StoreError`]
    /// and are never retried here; a silent retry could mask data loss.
    pub async fn write<T: Serialize>(
        &self,
        namespace: &str,
        schema_version: u32,
        value: &T,
    ) -> StoreResult<()> {
        // Canonical form: object keys sorted by serde_json's Value map.
        let payload = serde_json::to_value(value)?.to_string();
        let ns = namespace.to_owned();

        self.db
            .execute(move |conn| {
                let now = Utc::now().timestamp();
                conn.execute(
                    "INSERT INTO namespaces (namespace, schema_version, payload, updated_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(namespace) DO UPDATE SET
                         schema_version = excluded.schema_version,
                         payload        = excluded.payload,
                         updated_at     = excluded.updated_at",
                    params![ns, schema_version, payload, now],
                )?;
                Ok(())
            })
            .await?;

        debug!(namespace, "namespace written");
        Ok(())
    }

    /// Delete a single namespace. Returns whether a row existed.
    pub async fn remove(&self, namespace: &str) -> StoreResult<bool> {
        let ns = namespace.to_owned();
        let rows = self
            .db
            .execute(move |conn| {
                Ok(conn.execute("DELETE FROM namespaces WHERE namespace = ?1", [&ns])?)
            })
            .await?;
        Ok(rows > 0)
    }

    /// Snapshot every known namespace into an [`ExportBundle`].
    pub async fn export_all(&self) -> StoreResult<ExportBundle> {
        let namespaces = self
            .db
            .execute(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT namespace, schema_version, payload FROM namespaces ORDER BY namespace",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?;

                let mut out = BTreeMap::new();
                for row in rows {
                    let (namespace, schema_version, payload) = row?;
                    let payload: Value = serde_json::from_str(&payload)?;
                    out.insert(
                        namespace,
                        NamespaceRecord {
                            schema_version,
                            payload,
                        },
                    );
                }
                Ok(out)
            })
            .await?;

        info!(namespaces = namespaces.len(), "store exported");
        Ok(ExportBundle {
            format_version: FORMAT_VERSION,
            exported_at: Utc::now(),
            namespaces,
        })
    }

    /// Replace every namespace present in `bundle`, atomically.
    ///
    /// Namespaces absent from the bundle are left untouched; namespaces
    /// present are replaced wholesale. A failure anywhere leaves the store
    /// in its pre-import state: the whole bundle is applied inside one
    /// transaction, or not at all.
    pub async fn import_all(&self, bundle: ExportBundle) -> StoreResult<()> {
        if bundle.format_version > FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: bundle.format_version,
                supported: FORMAT_VERSION,
            });
        }

        let count = bundle.namespaces.len();
        self.db
            .execute_mut(move |conn| {
                let tx = conn.transaction()?;
                let now = Utc::now().timestamp();
                for (namespace, record) in &bundle.namespaces {
                    tx.execute(
                        "INSERT INTO namespaces (namespace, schema_version, payload, updated_at)
                         VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(namespace) DO UPDATE SET
                             schema_version = excluded.schema_version,
                             payload        = excluded.payload,
                             updated_at     = excluded.updated_at",
                        params![
                            namespace,
                            record.schema_version,
                            record.payload.to_string(),
                            now
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;

        info!(namespaces = count, "import applied");
        Ok(())
    }

    /// Remove every namespace the application owns. Irreversible.
    pub async fn wipe_all(&self) -> StoreResult<()> {
        let removed = self
            .db
            .execute(|conn| Ok(conn.execute("DELETE FROM namespaces", [])?))
            .await?;
        info!(removed, "all namespaces wiped");
        Ok(())
    }

    /// Export the store to a JSON file in `dir`, named after the export date
    /// (`everbloom-export-YYYY-MM-DD.json`). Returns the written path.
    pub async fn export_to_file(&self, dir: impl AsRef<Path>) -> StoreResult<PathBuf> {
        let bundle = self.export_all().await?;
        let filename = format!(
            "everbloom-export-{}.json",
            bundle.exported_at.format("%Y-%m-%d")
        );
        let path = dir.as_ref().join(filename);
        let json = serde_json::to_string_pretty(&bundle)?;
        tokio::fs::write(&path, json).await?;
        info!(path = %path.display(), "export file written");
        Ok(path)
    }

    /// Import a previously exported JSON file. All-or-nothing, like
    /// [`Store::import_all`].
    pub async fn import_from_file(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let bundle: ExportBundle = serde_json::from_str(&raw)?;
        self.import_all(bundle).await
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
    }

    async fn test_store() -> Store {
        let db = Database::open_in_memory().unwrap();
        db.run_migrations().await.unwrap();
        Store::new(db)
    }

    fn dark() -> Prefs {
        Prefs {
            theme: "dark".into(),
        }
    }

    fn light() -> Prefs {
        Prefs {
            theme: "light".into(),
        }
    }

    #[tokio::test]
    async fn read_absent_returns_default() {
        let store = test_store().await;
        let prefs: Prefs = store.read("prefs", light()).await;
        assert_eq!(prefs, light());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = test_store().await;
        store.write("prefs", 1, &dark()).await.unwrap();
        let prefs: Prefs = store.read("prefs", light()).await;
        assert_eq!(prefs, dark());
    }

    #[tokio::test]
    async fn corrupt_payload_falls_back_to_default() {
        let store = test_store().await;
        store.write("prefs", 1, &dark()).await.unwrap();

        // Clobber the payload with something that is not a Prefs.
        store
            .db
            .execute(|conn| {
                conn.execute(
                    "UPDATE namespaces SET payload = 'not json at all' WHERE namespace = 'prefs'",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let prefs: Prefs = store.read("prefs", light()).await;
        assert_eq!(prefs, light());
    }

    #[tokio::test]
    async fn wipe_all_resets_to_defaults() {
        let store = test_store().await;
        store.write("prefs", 1, &dark()).await.unwrap();
        store.wipe_all().await.unwrap();

        let prefs: Prefs = store.read("prefs", light()).await;
        assert_eq!(prefs, light());
    }

    #[tokio::test]
    async fn remove_single_namespace() {
        let store = test_store().await;
        store.write("prefs", 1, &dark()).await.unwrap();

        assert!(store.remove("prefs").await.unwrap());
        assert!(!store.remove("prefs").await.unwrap());

        let prefs: Prefs = store.read("prefs", light()).await;
        assert_eq!(prefs, light());
    }

    #[tokio::test]
    async fn export_import_round_trip_is_payload_identical() {
        let store = test_store().await;
        store.write("prefs", 1, &dark()).await.unwrap();
        store
            .write("journal", 2, &vec!["entry one", "entry two"])
            .await
            .unwrap();

        let bundle = store.export_all().await.unwrap();
        store.wipe_all().await.unwrap();
        store.import_all(bundle.clone()).await.unwrap();

        let after = store.export_all().await.unwrap();
        assert_eq!(bundle.namespaces, after.namespaces);
    }

    #[tokio::test]
    async fn import_replaces_listed_namespaces_wholesale() {
        let store = test_store().await;
        store.write("prefs", 1, &dark()).await.unwrap();
        store.write("untouched", 1, &"keep me").await.unwrap();

        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            "prefs".to_string(),
            NamespaceRecord {
                schema_version: 1,
                payload: serde_json::json!({"theme": "light"}),
            },
        );
        let bundle = ExportBundle {
            format_version: FORMAT_VERSION,
            exported_at: Utc::now(),
            namespaces,
        };

        store.import_all(bundle).await.unwrap();

        let prefs: Prefs = store.read("prefs", dark()).await;
        assert_eq!(prefs, light());
        let kept: String = store.read("untouched", String::new()).await;
        assert_eq!(kept, "keep me");
    }

    #[tokio::test]
    async fn import_rejects_newer_format_and_modifies_nothing() {
        let store = test_store().await;
        store.write("prefs", 1, &dark()).await.unwrap();

        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            "prefs".to_string(),
            NamespaceRecord {
                schema_version: 1,
                payload: serde_json::json!({"theme": "light"}),
            },
        );
        let bundle = ExportBundle {
            format_version: FORMAT_VERSION + 1,
            exported_at: Utc::now(),
            namespaces,
        };

        let err = store.import_all(bundle).await.unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedVersion { .. }));

        // Pre-import state is intact.
        let prefs: Prefs = store.read("prefs", light()).await;
        assert_eq!(prefs, dark());
    }

    #[tokio::test]
    async fn export_file_embeds_date_in_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store().await;
        store.write("prefs", 1, &dark()).await.unwrap();

        let path = store.export_to_file(dir.path()).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("everbloom-export-"));
        assert!(name.ends_with(".json"));

        store.wipe_all().await.unwrap();
        store.import_from_file(&path).await.unwrap();
        let prefs: Prefs = store.read("prefs", light()).await;
        assert_eq!(prefs, dark());
    }
}
