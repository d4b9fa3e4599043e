//! Path → (room, sender) resolution.

use crate::config::AliasTable;
use crate::model::{Identity, ROOM_SIGIL, SENDER_SIGIL};
use std::path::{Component, Path};

/// Resolves message paths into display identities via the alias tables.
///
/// Storage layout is e.g. `<root>/!roomid/@senderid/$1700000000`. Any path
/// segment starting with `!` names the room and any starting with `@` names
/// the sender; all others are ignored. If several segments match, the last
/// one wins.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    rooms: AliasTable,
    senders: AliasTable,
}

impl IdentityResolver {
    /// Create a resolver from the room and account alias tables.
    pub fn new(rooms: AliasTable, senders: AliasTable) -> Self {
        Self { rooms, senders }
    }

    /// Room and sender for a message path.
    ///
    /// Scans every segment; the last `!` segment names the room and the last
    /// `@` segment the sender. A missing kind resolves to the empty string.
    pub fn resolve(&self, path: &Path) -> Identity {
        let mut identity = Identity::default();

        for component in path.components() {
            let Component::Normal(segment) = component else {
                continue;
            };
            let segment = segment.to_string_lossy();

            if segment.starts_with(ROOM_SIGIL) {
                identity.room = self.rooms.resolve(&segment).to_string();
            } else if segment.starts_with(SENDER_SIGIL) {
                identity.sender = self.senders.resolve(&segment).to_string();
            }
        }

        identity
    }
}
