//! Integration tests for the everbloom-store crate.
//!
//! These exercise the full persistence stack — migrations, namespace store,
//! state cells, and the keyed content cache — against a real SQLite
//! database on disk (via tempfile), including reopening the file to prove
//! durability across process restarts.

use everbloom_store::{ContentCache, Database, StateCell, Store, StoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct JournalState {
    entries: Vec<String>,
    streak_days: u32,
}

fn empty_journal() -> JournalState {
    JournalState {
        entries: Vec::new(),
        streak_days: 0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SoundProfile {
    description: String,
    mood: String,
}

// ═══════════════════════════════════════════════════════════════════════
//  Durability across reopen
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn state_survives_database_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("everbloom.db");

    {
        let db = Database::open_and_migrate(db_path.clone()).await.unwrap();
        let cell = StateCell::new(Store::new(db), "journal", 1, empty_journal);
        cell.update(|j| {
            j.entries.push("first entry".into());
            j.streak_days = 1;
        })
        .await
        .unwrap();
    }

    let db = Database::open_and_migrate(db_path).await.unwrap();
    let cell = StateCell::new(Store::new(db), "journal", 1, empty_journal);
    let journal = cell.get().await;
    assert_eq!(journal.entries, vec!["first entry".to_string()]);
    assert_eq!(journal.streak_days, 1);
}

#[tokio::test]
async fn cached_content_survives_database_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("everbloom.db");

    let rain = SoundProfile {
        description: "Steady rain on a tin roof.".into(),
        mood: "grounding".into(),
    };

    {
        let db = Database::open_and_migrate(db_path.clone()).await.unwrap();
        let cache: ContentCache<SoundProfile> =
            ContentCache::new(Store::new(db), "catalog.sounds", 1);
        cache.put("Rain", rain.clone()).await.unwrap();
    }

    let db = Database::open_and_migrate(db_path).await.unwrap();
    let cache: ContentCache<SoundProfile> = ContentCache::new(Store::new(db), "catalog.sounds", 1);

    // The entry is a hit after reopen, so this generator must not run.
    let got = cache
        .get_or_generate("Rain", || async {
            Err::<SoundProfile, StoreError>(StoreError::TaskJoin("should not generate".into()))
        })
        .await
        .unwrap();
    assert_eq!(got, rain);
}

// ═══════════════════════════════════════════════════════════════════════
//  Export / import / wipe lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn full_backup_and_restore_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_and_migrate(dir.path().join("everbloom.db"))
        .await
        .unwrap();
    let store = Store::new(db);

    let journal = StateCell::new(store.clone(), "journal", 1, empty_journal);
    journal
        .update(|j| j.entries.push("kept through backup".into()))
        .await
        .unwrap();

    let sounds: ContentCache<SoundProfile> = ContentCache::new(store.clone(), "catalog.sounds", 1);
    sounds
        .put(
            "Ocean",
            SoundProfile {
                description: "Long slow waves.".into(),
                mood: "calm".into(),
            },
        )
        .await
        .unwrap();

    let export_path = store.export_to_file(dir.path()).await.unwrap();

    // Full wipe, then restore from the file.
    store.wipe_all().await.unwrap();
    assert_eq!(journal.get().await, empty_journal());
    assert!(sounds.is_empty().await);

    store.import_from_file(&export_path).await.unwrap();
    assert_eq!(
        journal.get().await.entries,
        vec!["kept through backup".to_string()]
    );
    assert_eq!(sounds.keys().await, vec!["Ocean".to_string()]);
}

#[tokio::test]
async fn partial_bundle_import_leaves_other_namespaces_alone() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_and_migrate(dir.path().join("everbloom.db"))
        .await
        .unwrap();
    let store = Store::new(db);

    let journal = StateCell::new(store.clone(), "journal", 1, empty_journal);
    journal
        .update(|j| j.entries.push("original".into()))
        .await
        .unwrap();

    // Export only contains `journal` at this point.
    let bundle = store.export_all().await.unwrap();

    // A namespace written after the export must survive the import untouched.
    let sounds: ContentCache<SoundProfile> = ContentCache::new(store.clone(), "catalog.sounds", 1);
    sounds
        .put(
            "Wind",
            SoundProfile {
                description: "High mountain wind.".into(),
                mood: "open".into(),
            },
        )
        .await
        .unwrap();

    journal
        .update(|j| j.entries.push("will be rolled back".into()))
        .await
        .unwrap();

    store.import_all(bundle).await.unwrap();

    assert_eq!(journal.get().await.entries, vec!["original".to_string()]);
    assert_eq!(sounds.keys().await, vec!["Wind".to_string()]);
}
