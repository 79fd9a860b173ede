//! Time-boxed snapshot of the last resolved identity. One named slot on
//! disk, written only by the session manager; readers in other contexts
//! subscribe to a generation counter and re-read on change. Storage
//! failures of any kind are demoted to a cache miss.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use crate::session::identity::Identity;

/// Snapshots older than this are treated as absent and evicted on read.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(30 * 60);

const SNAPSHOT_FILE: &str = "ark-auth-user-v1.json";

#[derive(Debug, Serialize, Deserialize)]
struct Slot {
    ts: u64,
    user: Option<Identity>,
}

/// Single-slot identity cache. Clones share the slot and the change channel,
/// which is how separate contexts observe each other's writes.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    changes: watch::Sender<u64>,
}

impl SnapshotStore {
    pub fn new(dir: &Path) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            path: dir.join(SNAPSHOT_FILE),
            changes,
        }
    }

    /// Returns the cached identity if present and not expired. An expired
    /// slot is removed as a side effect.
    pub fn read(&self) -> Option<Identity> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    warn!("snapshot read error: {err}");
                }
                return None;
            }
        };

        let slot: Slot = match serde_json::from_str(&raw) {
            Ok(slot) => slot,
            Err(err) => {
                warn!("snapshot parse error: {err}");
                return None;
            }
        };

        if slot.ts == 0 {
            return None;
        }

        let age = now_unix_millis().saturating_sub(slot.ts);
        if age > SNAPSHOT_TTL.as_millis() as u64 {
            self.remove_slot();
            self.bump();
            return None;
        }

        slot.user
    }

    /// `None` clears the slot; `Some` stores the identity with a fresh
    /// timestamp.
    pub fn write(&self, identity: Option<&Identity>) {
        match identity {
            Some(identity) => {
                let slot = Slot {
                    ts: now_unix_millis(),
                    user: Some(identity.clone()),
                };
                match serde_json::to_string(&slot) {
                    Ok(encoded) => {
                        if let Some(parent) = self.path.parent() {
                            let _ = fs::create_dir_all(parent);
                        }
                        if let Err(err) = fs::write(&self.path, encoded) {
                            warn!("snapshot write error: {err}");
                        }
                    }
                    Err(err) => warn!("snapshot encode error: {err}"),
                }
            }
            None => self.remove_slot(),
        }
        self.bump();
    }

    /// Unconditionally removes the slot.
    pub fn clear(&self) {
        self.remove_slot();
        self.bump();
    }

    /// Generation counter bumped on every mutation. Subscribers should
    /// re-read the store when it changes.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn remove_slot(&self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                warn!("snapshot clear error: {err}");
            }
        }
    }

    fn bump(&self) {
        self.changes.send_modify(|generation| *generation += 1);
    }
}

fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::identity::Role;
    use tempfile::TempDir;

    fn identity() -> Identity {
        Identity {
            id: "u1".to_string(),
            email: Some("jane@x.com".to_string()),
            name: "jane".to_string(),
            role: Role::User,
            photo_url: None,
            cv_url: None,
            employer: None,
            username: None,
        }
    }

    fn write_slot_with_age(store: &SnapshotStore, age: Duration) {
        let slot = Slot {
            ts: now_unix_millis() - age.as_millis() as u64,
            user: Some(identity()),
        };
        fs::create_dir_all(store.path.parent().expect("parent")).expect("mkdir");
        fs::write(&store.path, serde_json::to_string(&slot).expect("encode")).expect("write");
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());

        store.write(Some(&identity()));
        assert_eq!(store.read(), Some(identity()));
    }

    #[test]
    fn fresh_snapshot_survives_within_ttl() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());

        write_slot_with_age(&store, Duration::from_secs(29 * 60));
        assert_eq!(store.read(), Some(identity()));
    }

    #[test]
    fn stale_snapshot_is_evicted_on_read() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());

        write_slot_with_age(&store, Duration::from_secs(31 * 60));
        assert_eq!(store.read(), None);
        // The slot file itself must be gone after eviction.
        assert!(!store.path.exists());
    }

    #[test]
    fn corrupt_slot_is_a_cache_miss() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());

        fs::write(&store.path, "{not json").expect("write");
        assert_eq!(store.read(), None);
    }

    #[test]
    fn missing_timestamp_is_a_cache_miss() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());

        fs::write(&store.path, r#"{"ts":0,"user":null}"#).expect("write");
        assert_eq!(store.read(), None);
    }

    #[test]
    fn write_none_clears_the_slot() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());

        store.write(Some(&identity()));
        store.write(None);
        assert_eq!(store.read(), None);
        assert!(!store.path.exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());

        store.clear();
        store.clear();
        assert_eq!(store.read(), None);
    }

    #[test]
    fn mutations_bump_the_change_generation() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        let changes = store.changes();

        let before = *changes.borrow();
        store.write(Some(&identity()));
        store.clear();
        assert_eq!(*changes.borrow(), before + 2);
    }

    #[test]
    fn clones_share_the_change_channel() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        let other = store.clone();
        let mut changes = other.changes();

        store.write(Some(&identity()));
        assert!(changes.has_changed().expect("channel open"));
        assert_eq!(other.read(), Some(identity()));
    }
}
