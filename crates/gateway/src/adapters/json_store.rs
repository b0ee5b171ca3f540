use async_trait::async_trait;
use hermes_core::{AgentState, Trade};
use hermes_ports::{StateStore, StoreError, StoreResult, TradeStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const TRADES_FILE: &str = "trades.jsonl";
const AGENTS_DIR: &str = "agents";

/// File-backed persistence
///
/// Layout under the root directory:
/// - `agents/<name>.json`: latest state snapshot per agent
/// - `trades.jsonl`: append-only trade history, one JSON object per line
pub struct JsonFileStore {
    root: PathBuf,
    /// Serializes appends so lines never interleave
    append_lock: Mutex<()>,
    /// Serializes snapshot writes through the shared temp file
    snapshot_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            append_lock: Mutex::new(()),
            snapshot_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn state_path(&self, agent: &str) -> PathBuf {
        self.root
            .join(AGENTS_DIR)
            .join(format!("{}.json", escape_file_name(agent)))
    }

    fn trades_path(&self) -> PathBuf {
        self.root.join(TRADES_FILE)
    }

    /// Read back the full trade history
    pub async fn load_trades(&self) -> StoreResult<Vec<Trade>> {
        let path = self.trades_path();
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&path, e)),
        };
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .collect()
    }
}

/// One-to-one mapping from agent name to file stem
///
/// ASCII letters, digits and `-` pass through; every other byte, `_`
/// included, becomes `_` followed by two hex digits.
fn escape_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("_{:02x}", byte));
        }
    }
    out
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn save_state(&self, state: &AgentState) -> StoreResult<()> {
        let path = self.state_path(&state.name);
        let dir = self.root.join(AGENTS_DIR);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error(&dir, e))?;

        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Replace the snapshot atomically
        let _guard = self.snapshot_lock.lock().await;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await.map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(())
    }

    async fn load_state(&self, agent: &str) -> StoreResult<AgentState> {
        let path = self.state_path(agent);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(agent.to_string()));
            }
            Err(e) => return Err(io_error(&path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl TradeStore for JsonFileStore {
    async fn save_trade(&self, trade: &Trade) -> StoreResult<()> {
        let mut line =
            serde_json::to_string(trade).map_err(|e| StoreError::Serialization(e.to_string()))?;
        line.push('\n');

        let path = self.trades_path();
        let _guard = self.append_lock.lock().await;
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| io_error(&path, e))?;
        file.flush().await.map_err(|e| io_error(&path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{AccountSnapshot, Position};
    use rust_decimal_macros::dec;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("hermes-store-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_state_is_not_found() {
        let store = JsonFileStore::new(temp_root());
        assert!(matches!(
            store.load_state("nobody").await,
            Err(StoreError::NotFound(name)) if name == "nobody"
        ));
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let root = temp_root();
        let store = JsonFileStore::new(&root);

        let mut state = AgentState::new("rng agent", dec!(1000));
        state.refresh(
            AccountSnapshot::with_cash(dec!(800)),
            vec![Position::new("ABC", dec!(2), dec!(100))],
        );
        state.record_failure("rejected");
        store.save_state(&state).await.unwrap();

        assert!(root.join("agents").join("rng_20agent.json").exists());
        let loaded = store.load_state("rng agent").await.unwrap();
        assert_eq!(loaded, state);

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_file_names_are_distinct() {
        let names = ["a.b", "a_b", "a b", "a_2eb", "ä", "a-b", "ab"];
        let escaped: std::collections::HashSet<_> =
            names.iter().map(|n| escape_file_name(n)).collect();
        assert_eq!(escaped.len(), names.len());
        assert_eq!(escape_file_name("RNG-Agent1"), "RNG-Agent1");
        assert_eq!(escape_file_name("a_b"), "a_5fb");
        assert_eq!(escape_file_name("../x"), "_2e_2e_2fx");
    }

    #[tokio::test]
    async fn test_similar_names_do_not_share_a_snapshot() {
        let root = temp_root();
        let store = JsonFileStore::new(&root);

        store.save_state(&AgentState::new("a.b", dec!(100))).await.unwrap();
        store.save_state(&AgentState::new("a_b", dec!(200))).await.unwrap();

        assert_eq!(store.load_state("a.b").await.unwrap().account.cash, dec!(100));
        assert_eq!(store.load_state("a_b").await.unwrap().account.cash, dec!(200));

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_trades_append_in_order() {
        let root = temp_root();
        let store = JsonFileStore::new(&root);
        assert!(store.load_trades().await.unwrap().is_empty());

        let first = Trade::buy("alice", "ABC", dec!(10));
        let second = Trade::hold("alice").with_rationale("waiting");
        store.save_trade(&first).await.unwrap();
        store.save_trade(&second).await.unwrap();

        let loaded = store.load_trades().await.unwrap();
        assert_eq!(loaded, vec![first, second]);

        let _ = std::fs::remove_dir_all(root);
    }
}
