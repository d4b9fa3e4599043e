//! Seen-set: the gate between "file observed" and "file displayed".

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What identifies a message for deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DedupKey {
    /// Modification time. Two files written within the same clock tick
    /// collide and only the first one admitted is shown.
    #[default]
    Timestamp,
    /// File path. Every distinct file is shown once; mtime only orders.
    Path,
}

/// Record of every message already displayed.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    key: DedupKey,
    /// Timestamp → first path admitted with it. Maintained under both policies.
    by_time: HashMap<SystemTime, PathBuf>,
    /// Only populated under [`DedupKey::Path`].
    by_path: HashSet<PathBuf>,
    admitted: usize,
}

impl SeenSet {
    /// Create an empty seen-set using the given policy.
    pub fn new(key: DedupKey) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    /// Active dedup policy.
    pub fn key(&self) -> DedupKey {
        self.key
    }

    /// Whether a message with this path/timestamp would be rejected.
    pub fn is_seen(&self, path: &Path, timestamp: SystemTime) -> bool {
        match self.key {
            DedupKey::Timestamp => self.by_time.contains_key(&timestamp),
            DedupKey::Path => self.by_path.contains(path),
        }
    }

    /// Record a message. Returns `true` if it was new and should be displayed.
    pub fn admit(&mut self, path: &Path, timestamp: SystemTime) -> bool {
        if self.is_seen(path, timestamp) {
            return false;
        }

        self.by_time
            .entry(timestamp)
            .or_insert_with(|| path.to_path_buf());
        if self.key == DedupKey::Path {
            self.by_path.insert(path.to_path_buf());
        }
        self.admitted += 1;
        true
    }

    /// Path first admitted with `timestamp`.
    pub fn first_seen(&self, timestamp: SystemTime) -> Option<&Path> {
        self.by_time.get(&timestamp).map(PathBuf::as_path)
    }

    /// Number of messages admitted so far.
    pub fn len(&self) -> usize {
        self.admitted
    }

    /// Whether nothing has been admitted yet.
    pub fn is_empty(&self) -> bool {
        self.admitted == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn admit_accepts_then_rejects_same_timestamp() {
        let mut seen = SeenSet::new(DedupKey::Timestamp);

        assert!(seen.admit(Path::new("/d/$a"), at(1)));
        assert!(!seen.admit(Path::new("/d/$a"), at(1)));
        assert!(
            !seen.admit(Path::new("/d/$other"), at(1)),
            "timestamp policy ignores the path"
        );
        assert_eq!(seen.len(), 1);
        assert_eq!(seen.first_seen(at(1)), Some(Path::new("/d/$a")));
    }

    #[test]
    fn timestamp_policy_accepts_distinct_times() {
        let mut seen = SeenSet::new(DedupKey::Timestamp);
        assert!(seen.admit(Path::new("/d/$a"), at(1)));
        assert!(seen.admit(Path::new("/d/$a"), at(2)));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn path_policy_keeps_colliding_timestamps() {
        let mut seen = SeenSet::new(DedupKey::Path);

        assert!(seen.admit(Path::new("/d/$a"), at(1)));
        assert!(seen.admit(Path::new("/d/$b"), at(1)));
        assert!(!seen.admit(Path::new("/d/$a"), at(5)));

        assert_eq!(seen.len(), 2);
        assert_eq!(seen.first_seen(at(1)), Some(Path::new("/d/$a")));
    }

    #[test]
    fn is_seen_does_not_record() {
        let mut seen = SeenSet::new(DedupKey::Timestamp);
        assert!(!seen.is_seen(Path::new("/d/$a"), at(1)));
        assert!(seen.is_empty());
        assert!(seen.admit(Path::new("/d/$a"), at(1)));
        assert!(seen.is_seen(Path::new("/d/$zzz"), at(1)));
    }

    #[test]
    fn default_key_is_timestamp() {
        assert_eq!(DedupKey::default(), DedupKey::Timestamp);
        assert_eq!(SeenSet::default().key(), DedupKey::Timestamp);
    }
}
