//! Recursive filesystem watch over the storage tree.
//!
//! Wraps a `notify` watcher and flattens its events into one
//! [`Notification`] per affected path, delivered over a std mpsc channel. The
//! watch stays active for as long as the [`DirectoryWatcher`] is alive.

use super::{LiveMessage, Notification};
use crate::model::WatchError;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{info, trace, warn};

/// Live recursive watch of a directory tree.
pub struct DirectoryWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl DirectoryWatcher {
    /// Start watching `root` and return the watcher with its receiving end.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::Init` if the platform backend cannot be created
    /// and `WatchError::Watch` if `root` cannot be watched (e.g. it does not exist).
    pub fn start(root: &Path) -> Result<(Self, Receiver<LiveMessage>), WatchError> {
        let (tx, rx) = mpsc::channel();
        let watcher = Self::start_with_sender(root, tx)?;
        Ok((watcher, rx))
    }

    /// Start watching `root`, forwarding notifications into an existing channel.
    ///
    /// Lets a caller keep its own sender around, e.g. to inject
    /// [`LiveMessage::Shutdown`].
    pub fn start_with_sender(root: &Path, tx: Sender<LiveMessage>) -> Result<Self, WatchError> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                trace!(kind = ?event.kind, paths = ?event.paths, "Received notify event");
                for notification in notifications_from_event(event) {
                    // Receiver gone means the live loop is over; nothing to do.
                    let _ = tx.send(LiveMessage::Notification(notification));
                }
            }
            Err(error) => warn!(%error, "Filesystem watch error"),
        })
        .map_err(WatchError::Init)?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Watch {
                path: root.to_path_buf(),
                source,
            })?;

        info!(root = %root.display(), "Watching for new messages");

        Ok(Self {
            root: root.to_path_buf(),
            _watcher: watcher,
        })
    }

    /// Root of the watched tree.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Flatten a notify event into one notification per path.
///
/// A file renamed into the tree counts as created: inotify reports it as
/// `IN_MOVED_TO`, which notify surfaces as a `Name` modification. For a
/// `Both` rename only the destination (the second path) is a creation.
pub fn notifications_from_event(event: Event) -> Vec<Notification> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event
            .paths
            .into_iter()
            .map(Notification::created)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| {
                if i == 1 {
                    Notification::created(path)
                } else {
                    Notification::other(path)
                }
            })
            .collect(),
        _ => event.paths.into_iter().map(Notification::other).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::NotificationKind;
    use notify::event::{CreateKind, RemoveKind};
    use std::fs;
    use std::time::{Duration, Instant};

    #[test]
    fn create_event_maps_to_created_notifications() {
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/d/!r/@s/$1"))
            .add_path(PathBuf::from("/d/!r/@s/$2"));

        let notifications = notifications_from_event(event);

        assert_eq!(
            notifications,
            vec![
                Notification::created("/d/!r/@s/$1"),
                Notification::created("/d/!r/@s/$2"),
            ]
        );
    }

    #[test]
    fn rename_into_tree_maps_to_created() {
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To)))
            .add_path(PathBuf::from("/d/!r/@s/$1"));

        assert_eq!(
            notifications_from_event(event),
            vec![Notification::created("/d/!r/@s/$1")]
        );
    }

    #[test]
    fn rename_with_both_paths_creates_only_destination() {
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/d/!r/@s/tmp"))
            .add_path(PathBuf::from("/d/!r/@s/$1"));

        assert_eq!(
            notifications_from_event(event),
            vec![
                Notification::other("/d/!r/@s/tmp"),
                Notification::created("/d/!r/@s/$1"),
            ]
        );
    }

    #[test]
    fn non_create_events_map_to_other() {
        for kind in [
            EventKind::Modify(ModifyKind::Any),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            EventKind::Remove(RemoveKind::File),
            EventKind::Any,
        ] {
            let event = Event::new(kind).add_path(PathBuf::from("/d/$1"));
            assert_eq!(
                notifications_from_event(event),
                vec![Notification::other("/d/$1")],
                "kind: {:?}",
                kind
            );
        }
    }

    #[test]
    fn start_fails_for_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("absent");

        let result = DirectoryWatcher::start(&missing);

        assert!(
            matches!(result, Err(WatchError::Watch { ref path, .. }) if path == &missing),
            "got: {:?}",
            result.map(|(w, _)| w.root().to_path_buf())
        );
    }

    #[test]
    fn watcher_reports_file_created_in_subdirectory() {
        let temp = tempfile::tempdir().unwrap();
        let room = temp.path().join("!r").join("@s");
        fs::create_dir_all(&room).unwrap();

        let (watcher, rx) = DirectoryWatcher::start(temp.path()).unwrap();
        assert_eq!(watcher.root(), temp.path());

        let message = room.join("$1700000000");
        fs::write(&message, "hi").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen_create = false;
        while Instant::now() < deadline {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(LiveMessage::Notification(n))
                    if n.kind == NotificationKind::Created && n.path.ends_with("$1700000000") =>
                {
                    seen_create = true;
                    break;
                }
                _ => continue,
            }
        }

        assert!(seen_create, "expected a create notification for {:?}", message);
    }

    #[test]
    fn watcher_reports_file_renamed_into_tree() {
        let store = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let room = store.path().join("!r").join("@s");
        fs::create_dir_all(&room).unwrap();

        let (_watcher, rx) = DirectoryWatcher::start(store.path()).unwrap();

        let draft = staging.path().join("draft");
        fs::write(&draft, "hi").unwrap();
        let message = room.join("$1700000000");
        fs::rename(&draft, &message).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen_create = false;
        while Instant::now() < deadline {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(LiveMessage::Notification(n))
                    if n.kind == NotificationKind::Created && n.path.ends_with("$1700000000") =>
                {
                    seen_create = true;
                    break;
                }
                _ => continue,
            }
        }

        assert!(seen_create, "expected a create notification for {:?}", message);
    }
}
