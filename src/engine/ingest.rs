//! The ingestion engine: one object owning all transcript state.
//!
//! Both the initial scan and the live merger feed files through
//! [`IngestEngine::offer`], so dedup and room tracking behave identically no
//! matter how a file was found.

use super::{DedupKey, IdentityResolver, SeenSet, TranscriptFormatter};
use crate::config::{AliasTable, ResolvedConfig};
use crate::model::RenderedMessage;
use crate::source::collect_chronological;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Outcome of offering one file to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// New message, written to the output.
    Displayed,
    /// Already displayed (per the dedup policy); nothing written.
    Duplicate,
    /// Content could not be read; nothing written and nothing recorded.
    Unreadable,
}

/// Counts from the initial replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Message files found by the scan.
    pub discovered: usize,
    /// Messages written to the output.
    pub displayed: usize,
    /// Files dropped by the seen-set.
    pub duplicates: usize,
    /// Files whose content could not be read.
    pub unreadable: usize,
}

impl ReplaySummary {
    fn record(&mut self, offer: Offer) {
        match offer {
            Offer::Displayed => self.displayed += 1,
            Offer::Duplicate => self.duplicates += 1,
            Offer::Unreadable => self.unreadable += 1,
        }
    }
}

/// Seen-set, identity resolver and formatter behind a single gate.
#[derive(Debug, Clone)]
pub struct IngestEngine {
    resolver: IdentityResolver,
    seen: SeenSet,
    formatter: TranscriptFormatter,
}

impl IngestEngine {
    /// Assemble an engine from already-built parts.
    pub fn new(resolver: IdentityResolver, seen: SeenSet, formatter: TranscriptFormatter) -> Self {
        Self {
            resolver,
            seen,
            formatter,
        }
    }

    /// Build an engine from resolved configuration, loading both alias tables.
    ///
    /// Alias files that are missing or malformed are logged and replaced by
    /// empty tables.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let rooms = AliasTable::load_or_empty(&config.rooms_path());
        let senders = AliasTable::load_or_empty(&config.accounts_path());

        Self::new(
            IdentityResolver::new(rooms, senders),
            SeenSet::new(config.dedup_key),
            TranscriptFormatter::new(config.time_format.clone(), config.self_identity.clone()),
        )
    }

    /// Messages displayed so far.
    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Active dedup policy.
    pub fn dedup_key(&self) -> DedupKey {
        self.seen.key()
    }

    /// Room of the last message written.
    pub fn last_room(&self) -> &str {
        self.formatter.last_room()
    }

    /// Offer a message file found by either source.
    ///
    /// Duplicates are rejected before the file is read. A read failure is
    /// logged and leaves the seen-set untouched, so a later notification for
    /// the same file gets another attempt.
    ///
    /// # Errors
    ///
    /// Only write failures on `out` are returned.
    pub fn offer<W: Write>(&mut self, path: &Path, timestamp: SystemTime, out: &mut W) -> io::Result<Offer> {
        if self.seen.is_seen(path, timestamp) {
            debug!(path = %path.display(), "Skipping already displayed message");
            return Ok(Offer::Duplicate);
        }

        let body = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
            Err(error) => {
                warn!(path = %path.display(), %error, "Failed to read message file");
                return Ok(Offer::Unreadable);
            }
        };

        self.seen.admit(path, timestamp);
        let message = RenderedMessage {
            identity: self.resolver.resolve(path),
            timestamp,
            body,
        };
        self.formatter.write_message(out, &message)?;

        Ok(Offer::Displayed)
    }

    /// Scan `root` and write every message in it, oldest first.
    ///
    /// # Errors
    ///
    /// Only write failures on `out` are returned.
    pub fn replay<W: Write>(&mut self, root: &Path, out: &mut W) -> io::Result<ReplaySummary> {
        let files = collect_chronological(root);
        let mut summary = ReplaySummary {
            discovered: files.len(),
            ..ReplaySummary::default()
        };

        for file in &files {
            let offer = self.offer(&file.path, file.modified, out)?;
            summary.record(offer);
        }

        info!(
            root = %root.display(),
            discovered = summary.discovered,
            displayed = summary.displayed,
            duplicates = summary.duplicates,
            unreadable = summary.unreadable,
            "Replayed existing messages"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn engine(key: DedupKey) -> IngestEngine {
        IngestEngine::new(
            IdentityResolver::new(
                AliasTable::from_entries([("!general", "General")]),
                AliasTable::from_entries([("@me1", "me")]),
            ),
            SeenSet::new(key),
            TranscriptFormatter::new("", "me"),
        )
    }

    fn write_message(root: &Path, rel: &str, body: &str, modified: SystemTime) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        path
    }

    #[test]
    fn offer_writes_trimmed_body_once() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_message(temp.path(), "!general/@me1/$1", "  hello \n", at(1));
        let mut engine = engine(DedupKey::Timestamp);
        let mut out = Vec::new();

        assert_eq!(engine.offer(&path, at(1), &mut out).unwrap(), Offer::Displayed);
        assert_eq!(engine.offer(&path, at(1), &mut out).unwrap(), Offer::Duplicate);

        assert_eq!(String::from_utf8(out).unwrap(), "\nGeneral\nhello\n");
        assert_eq!(engine.seen().len(), 1);
        assert_eq!(engine.last_room(), "General");
    }

    #[test]
    fn unreadable_file_is_not_recorded() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("!general/@me1/$1");
        let mut engine = engine(DedupKey::Timestamp);
        let mut out = Vec::new();

        assert_eq!(engine.offer(&path, at(1), &mut out).unwrap(), Offer::Unreadable);
        assert!(out.is_empty());
        assert!(engine.seen().is_empty());

        // Appears later: the retry goes through.
        write_message(temp.path(), "!general/@me1/$1", "late", at(1));
        assert_eq!(engine.offer(&path, at(1), &mut out).unwrap(), Offer::Displayed);
    }

    #[test]
    fn replay_orders_by_mtime_and_counts() {
        let temp = tempfile::tempdir().unwrap();
        write_message(temp.path(), "!b/@x/$1", "second", at(20));
        write_message(temp.path(), "!general/@me1/$2", "first", at(10));
        write_message(temp.path(), "!b/@x/$3", "third", at(30));
        let mut engine = engine(DedupKey::Timestamp);
        let mut out = Vec::new();

        let summary = engine.replay(temp.path(), &mut out).unwrap();

        assert_eq!(
            summary,
            ReplaySummary {
                discovered: 3,
                displayed: 3,
                duplicates: 0,
                unreadable: 0,
            }
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nGeneral\nfirst\n\n!b\n\x1b[1msecond\x1b[0m\n\x1b[1mthird\x1b[0m\n"
        );
    }

    #[test]
    fn replay_drops_timestamp_collisions_under_default_policy() {
        let temp = tempfile::tempdir().unwrap();
        write_message(temp.path(), "!general/@me1/$1", "a", at(10));
        write_message(temp.path(), "!general/@me1/$2", "b", at(10));
        let mut engine = engine(DedupKey::Timestamp);
        let mut out = Vec::new();

        let summary = engine.replay(temp.path(), &mut out).unwrap();

        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.displayed, 1);
        assert_eq!(summary.duplicates, 1);
    }

    #[test]
    fn replay_keeps_timestamp_collisions_under_path_policy() {
        let temp = tempfile::tempdir().unwrap();
        write_message(temp.path(), "!general/@me1/$1", "a", at(10));
        write_message(temp.path(), "!general/@me1/$2", "b", at(10));
        let mut engine = engine(DedupKey::Path);
        let mut out = Vec::new();

        let summary = engine.replay(temp.path(), &mut out).unwrap();

        assert_eq!(summary.displayed, 2);
        assert_eq!(engine.dedup_key(), DedupKey::Path);
    }

    #[test]
    fn from_config_loads_alias_tables() {
        let temp = tempfile::tempdir().unwrap();
        let config_dir = temp.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("rooms.json"), r#"{"!general":"General"}"#).unwrap();
        // accounts.json missing: empty table

        let config = ResolvedConfig::with_dirs(crate::config::StorageDirs {
            data_dir: temp.path().join("data"),
            config_dir,
        });
        let mut engine = IngestEngine::from_config(&config);

        let path = write_message(temp.path(), "data/!general/@me1/$1", "hi", at(1));
        let mut out = Vec::new();
        engine.offer(&path, at(1), &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("\nGeneral\n"), "got: {:?}", output);
        assert!(
            output.contains("\x1b[1mhi\x1b[0m"),
            "@me1 is unmapped so it is not self: {:?}",
            output
        );
    }
}
