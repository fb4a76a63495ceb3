//! Shared fixtures for flow tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use everbloom_context::{
    ContextAggregator, EntrySource, ModuleEntry, ModuleId, SharingRegistry,
};
use everbloom_oracle::{
    Gateway, Oracle, OracleError, OracleRequest, OracleResponse, OracleResult,
};
use everbloom_store::{Database, Store};

/// Renders a JSON value the way the oracle would reply it.
pub fn json_reply(value: Value) -> String {
    value.to_string()
}

/// An oracle that replays scripted replies in order, counts calls, and
/// records every request it saw.
pub struct ScriptedOracle {
    replies: Mutex<Vec<OracleResult<OracleResponse>>>,
    seen: Mutex<Vec<OracleRequest>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(Vec::new()),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn push_reply(&self, text: String) {
        self.replies.lock().unwrap().push(Ok(OracleResponse { text }));
    }

    pub fn push_transport_error(&self, reason: &str) {
        self.replies.lock().unwrap().push(Err(OracleError::Transport {
            reason: reason.into(),
        }));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The prompt of the most recent request.
    pub fn last_prompt(&self) -> String {
        self.seen
            .lock()
            .unwrap()
            .last()
            .expect("oracle was never called")
            .prompt
            .clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn send(&self, request: &OracleRequest) -> OracleResult<OracleResponse> {
        self.seen.lock().unwrap().push(request.clone());
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            panic!("oracle called with no scripted reply left");
        }
        replies.remove(0)
    }
}

/// A module source with a fixed entry list.
pub struct FixedSource {
    pub module: ModuleId,
    pub entries: Vec<ModuleEntry>,
}

impl FixedSource {
    pub fn with_entries(module: ModuleId, titles: &[(&str, &str)]) -> Self {
        let entries = titles
            .iter()
            .enumerate()
            .map(|(i, (title, content))| ModuleEntry {
                id: i.to_string(),
                title: (*title).to_owned(),
                date: Utc.with_ymd_and_hms(2026, 7, (i + 1) as u32, 9, 0, 0).unwrap(),
                content: (*content).to_owned(),
            })
            .collect();
        Self { module, entries }
    }
}

#[async_trait]
impl EntrySource for FixedSource {
    fn module(&self) -> ModuleId {
        self.module
    }

    async fn list_entries(&self) -> Vec<ModuleEntry> {
        self.entries.clone()
    }
}

/// Everything a flow test needs, wired over an in-memory database.
pub struct TestHarness {
    pub store: Store,
    pub gateway: Gateway,
    pub aggregator: ContextAggregator,
    pub oracle: Arc<ScriptedOracle>,
}

impl TestHarness {
    pub async fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        db.run_migrations().await.unwrap();
        let store = Store::new(db);

        let oracle = ScriptedOracle::new();
        let gateway = Gateway::new(Arc::clone(&oracle) as Arc<dyn Oracle>);
        let aggregator = ContextAggregator::new(SharingRegistry::new(store.clone()));

        Self {
            store,
            gateway,
            aggregator,
            oracle,
        }
    }

    /// Enable sharing for `module` so aggregation tests have consent.
    pub async fn allow(&self, module: ModuleId) {
        self.aggregator
            .registry()
            .set_allowed(module, true)
            .await
            .unwrap();
    }
}
