//! Alias tables mapping raw path tokens to display names.
//!
//! Two tables are loaded at startup from the config directory: `rooms.json`
//! for `!room` tokens and `accounts.json` for `@sender` tokens. Both are flat
//! JSON objects of strings. They are read-only once loaded.

use crate::model::AliasError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Placeholder that alias values use to smuggle in terminal escape codes.
const ESCAPE_PLACEHOLDER: &str = "\\033";

/// Expand the `\033` placeholder into a real ESC character.
///
/// Lets an alias carry its own emphasis, e.g. `"\\033[32mGeneral\\033[0m"`.
pub fn expand_escapes(value: &str) -> String {
    value.replace(ESCAPE_PLACEHOLDER, "\x1b")
}

/// Token → display-name mapping. Lookups never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// An empty table: every token resolves to itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw pairs, expanding escape placeholders in values.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), expand_escapes(v.as_ref())))
                .collect(),
        }
    }

    /// Load a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `AliasError::Read` if the file cannot be read and
    /// `AliasError::Parse` if it is not a JSON object of strings.
    pub fn load(path: &Path) -> Result<Self, AliasError> {
        let json = std::fs::read_to_string(path).map_err(|source| AliasError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: HashMap<String, String> =
            serde_json::from_str(&json).map_err(|source| AliasError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::from_entries(raw))
    }

    /// Load a table, substituting an empty one on any failure.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(table) => {
                debug!(path = %path.display(), entries = table.len(), "Loaded alias table");
                table
            }
            Err(error) => {
                warn!(%error, "Using empty alias table");
                Self::new()
            }
        }
    }

    /// Display name for `token`, or `token` itself when unmapped.
    ///
    /// An alias mapped to the empty string counts as unmapped.
    pub fn resolve<'a>(&'a self, token: &'a str) -> &'a str {
        match self.entries.get(token) {
            Some(value) if !value.is_empty() => value,
            _ => token,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
