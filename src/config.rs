//! Per-board configuration store.
//!
//! Parses write what they learn about a board (page count, title) through
//! to a [`ConfigStore`] as they see it. Values are JSON values keyed by an
//! optional board scope; `None` is the site-wide scope.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Key/value store shared by every parse of one site.
///
/// Implementations must tolerate concurrent writers from parallel parses.
pub trait ConfigStore: Send + Sync {
    fn set(&self, scope: Option<&str>, key: &str, value: Value);

    fn get(&self, scope: Option<&str>, key: &str) -> Option<Value>;
}

/// Serializable image of a [`MemoryConfigStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default)]
    pub global: BTreeMap<String, Value>,
    #[serde(default)]
    pub boards: BTreeMap<String, BTreeMap<String, Value>>,
}

/// In-process [`ConfigStore`].
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<ConfigSnapshot>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_snapshot(snapshot: ConfigSnapshot) -> Self {
        Self {
            values: RwLock::new(snapshot),
        }
    }

    /// Copy of everything stored so far.
    #[must_use]
    pub fn snapshot(&self) -> ConfigSnapshot {
        self.values.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn set(&self, scope: Option<&str>, key: &str, value: Value) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let map = match scope {
            Some(board) => values.boards.entry(board.to_string()).or_default(),
            None => &mut values.global,
        };
        map.insert(key.to_string(), value);
    }

    fn get(&self, scope: Option<&str>, key: &str) -> Option<Value> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        match scope {
            Some(board) => values.boards.get(board)?.get(key).cloned(),
            None => values.global.get(key).cloned(),
        }
    }
}

pub const KEY_PAGES_COUNT: &str = "pages_count";
pub const KEY_BOARD_TITLE: &str = "board_title";
pub const KEY_BUMP_LIMIT: &str = "bump_limit";
pub const KEY_SPOILERS_ENABLED: &str = "spoilers_enabled";
pub const KEY_CODE_ENABLED: &str = "code_enabled";
pub const KEY_FLAGS_ENABLED: &str = "flags_enabled";
pub const KEY_MAX_COMMENT_LENGTH: &str = "max_comment_length";
pub const KEY_SAFE_FOR_WORK: &str = "safe_for_work";

/// Typed view over a [`ConfigStore`].
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct ChanConfiguration {
    store: Arc<dyn ConfigStore>,
}

impl ChanConfiguration {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Configuration backed by a fresh [`MemoryConfigStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryConfigStore::new()))
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    pub fn set(&self, scope: Option<&str>, key: &str, value: impl Into<Value>) {
        self.store.set(scope, key, value.into());
    }

    #[must_use]
    pub fn get_bool(&self, scope: Option<&str>, key: &str, default: bool) -> bool {
        self.store
            .get(scope, key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    #[must_use]
    pub fn get_i64(&self, scope: Option<&str>, key: &str) -> Option<i64> {
        self.store.get(scope, key).and_then(|v| v.as_i64())
    }

    #[must_use]
    pub fn get_string(&self, scope: Option<&str>, key: &str) -> Option<String> {
        match self.store.get(scope, key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn store_pages_count(&self, board: &str, pages: u32) {
        debug!(board, pages, "pages count");
        self.set(Some(board), KEY_PAGES_COUNT, pages);
    }

    #[must_use]
    pub fn pages_count(&self, board: &str) -> Option<u32> {
        self.get_i64(Some(board), KEY_PAGES_COUNT)
            .and_then(|n| u32::try_from(n).ok())
    }

    /// Stores a board title. Blank titles are ignored.
    pub fn store_board_title(&self, board: &str, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }
        debug!(board, title, "board title");
        self.set(Some(board), KEY_BOARD_TITLE, title);
    }

    #[must_use]
    pub fn board_title(&self, board: &str) -> Option<String> {
        self.get_string(Some(board), KEY_BOARD_TITLE)
    }

    pub fn store_bump_limit(&self, board: &str, limit: u32) {
        self.set(Some(board), KEY_BUMP_LIMIT, limit);
    }

    #[must_use]
    pub fn bump_limit(&self, board: &str) -> Option<u32> {
        self.get_i64(Some(board), KEY_BUMP_LIMIT)
            .or_else(|| self.get_i64(None, KEY_BUMP_LIMIT))
            .and_then(|n| u32::try_from(n).ok())
    }

    /// Applies a `boards.json` document (`{"boards": [{"board": "b", ...}]}`)
    /// and returns how many boards were updated.
    ///
    /// Missing or mistyped fields read as zero; entries without a board
    /// name are skipped.
    pub fn update_from_boards_json(&self, json: &Value) -> usize {
        let Some(boards) = json.get("boards").and_then(Value::as_array) else {
            warn!("boards document has no boards array");
            return 0;
        };
        let mut updated = 0;
        for entry in boards {
            let Some(board) = entry.get("board").and_then(Value::as_str).filter(|b| !b.is_empty()) else {
                continue;
            };
            let int = |key: &str| entry.get(key).and_then(Value::as_i64).unwrap_or(0);
            let scope = Some(board);
            self.set(scope, KEY_SPOILERS_ENABLED, int("spoilers") != 0);
            self.set(scope, KEY_CODE_ENABLED, int("code_tags") != 0);
            self.set(scope, KEY_FLAGS_ENABLED, int("country_flags") != 0);
            if let Ok(limit @ 1..) = u32::try_from(int("bump_limit")) {
                self.store_bump_limit(board, limit);
            }
            let max_comment = int("max_comment_chars");
            if max_comment > 0 {
                self.set(scope, KEY_MAX_COMMENT_LENGTH, max_comment);
            }
            self.set(scope, KEY_SAFE_FOR_WORK, int("ws_board") != 0);
            updated += 1;
        }
        debug!(updated, "applied boards document");
        updated
    }
}

impl fmt::Debug for ChanConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChanConfiguration").finish_non_exhaustive()
    }
}

impl Default for ChanConfiguration {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scopes_are_separate() {
        let store = MemoryConfigStore::new();
        store.set(None, "k", json!(1));
        store.set(Some("b"), "k", json!(2));
        assert_eq!(store.get(None, "k"), Some(json!(1)));
        assert_eq!(store.get(Some("b"), "k"), Some(json!(2)));
        assert_eq!(store.get(Some("a"), "k"), None);
    }

    #[test]
    fn typed_accessors() {
        let config = ChanConfiguration::in_memory();
        config.store_pages_count("b", 10);
        config.store_board_title("b", "  Random ");
        config.store_board_title("b", "   ");
        assert_eq!(config.pages_count("b"), Some(10));
        assert_eq!(config.board_title("b").as_deref(), Some("Random"));
        assert!(config.get_bool(Some("b"), "missing", true));
        assert_eq!(config.get_string(Some("b"), KEY_PAGES_COUNT), None);
    }

    #[test]
    fn bump_limit_falls_back_to_global() {
        let config = ChanConfiguration::in_memory();
        config.set(None, KEY_BUMP_LIMIT, 500);
        assert_eq!(config.bump_limit("b"), Some(500));
        config.store_bump_limit("b", 300);
        assert_eq!(config.bump_limit("b"), Some(300));
    }

    #[test]
    fn boards_json_update() {
        let config = ChanConfiguration::in_memory();
        let doc = json!({"boards": [
            {"board": "g", "spoilers": 1, "code_tags": 1, "bump_limit": 310, "max_comment_chars": 2000},
            {"board": "b", "country_flags": 1, "ws_board": 0, "bump_limit": "oops"},
            {"title": "nameless"}
        ]});
        assert_eq!(config.update_from_boards_json(&doc), 2);
        assert!(config.get_bool(Some("g"), KEY_SPOILERS_ENABLED, false));
        assert!(config.get_bool(Some("g"), KEY_CODE_ENABLED, false));
        assert!(!config.get_bool(Some("g"), KEY_FLAGS_ENABLED, true));
        assert_eq!(config.bump_limit("g"), Some(310));
        assert_eq!(config.get_i64(Some("g"), KEY_MAX_COMMENT_LENGTH), Some(2000));
        assert!(config.get_bool(Some("b"), KEY_FLAGS_ENABLED, false));
        assert_eq!(config.bump_limit("b"), None);
        assert_eq!(config.update_from_boards_json(&json!({"nope": []})), 0);
    }

    #[test]
    fn snapshot_round_trip() {
        let store = MemoryConfigStore::new();
        store.set(Some("b"), KEY_PAGES_COUNT, json!(7));
        let restored = MemoryConfigStore::from_snapshot(store.snapshot());
        assert_eq!(restored.get(Some("b"), KEY_PAGES_COUNT), Some(json!(7)));
        let text = serde_json::to_string(&store.snapshot()).unwrap_or_default();
        assert!(text.contains("\"pages_count\":7"));
    }

    #[test]
    fn shared_between_clones() {
        let config = ChanConfiguration::in_memory();
        let other = config.clone();
        other.store_pages_count("b", 3);
        assert_eq!(config.pages_count("b"), Some(3));
    }
}
