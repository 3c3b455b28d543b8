//! Alias dictionary: canonical component name → lowercase aliases.
//!
//! Entries keep the key order of the source JSON object. That order is part
//! of the contract: extractors that pick "the first entry that matches" walk
//! [`AliasDictionary::entries`] front to back.

use crate::config::AttributorConfig;
use crate::error::AttributionError;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// One canonical component with its aliases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub canonical_name: String,

    /// Lowercase, trimmed, de-duplicated, in source order
    pub aliases: Vec<String>,

    /// Lowercase canonical name followed by the aliases
    match_names: Vec<String>,
}

impl AliasEntry {
    pub fn new<I, S>(canonical_name: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical_name = canonical_name.into().trim().to_string();
        let mut cleaned: Vec<String> = Vec::new();
        for alias in aliases {
            let alias = alias.as_ref().trim().to_lowercase();
            if !alias.is_empty() && !cleaned.contains(&alias) {
                cleaned.push(alias);
            }
        }

        let mut match_names = vec![canonical_name.to_lowercase()];
        for alias in &cleaned {
            if !match_names.contains(alias) {
                match_names.push(alias.clone());
            }
        }

        Self {
            canonical_name,
            aliases: cleaned,
            match_names,
        }
    }

    /// Every lowercase string that identifies this component
    pub fn names(&self) -> &[String] {
        &self.match_names
    }

    /// Length in chars of the longest matchable name
    pub fn longest_name_len(&self) -> usize {
        self.match_names
            .iter()
            .map(|n| n.chars().count())
            .max()
            .unwrap_or(0)
    }
}

/// Immutable, ordered set of [`AliasEntry`] values
#[derive(Debug, Clone, Default)]
pub struct AliasDictionary {
    entries: Vec<AliasEntry>,
    /// lowercase name or alias → index of the first entry claiming it
    lookup: HashMap<String, usize>,
}

impl AliasDictionary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from entries; a repeated canonical name keeps the first entry
    pub fn from_entries(entries: impl IntoIterator<Item = AliasEntry>) -> Self {
        let mut kept: Vec<AliasEntry> = Vec::new();
        let mut lookup = HashMap::new();

        for entry in entries {
            if entry.canonical_name.is_empty() {
                continue;
            }
            let key = entry.canonical_name.to_lowercase();
            if kept.iter().any(|e| e.canonical_name.to_lowercase() == key) {
                warn!("Duplicate component {:?} ignored", entry.canonical_name);
                continue;
            }
            let idx = kept.len();
            for name in entry.names() {
                lookup.entry(name.clone()).or_insert(idx);
            }
            kept.push(entry);
        }

        Self {
            entries: kept,
            lookup,
        }
    }

    /// Parse the `{ "canonical": ["alias", ...] }` format.
    ///
    /// Values that are not arrays and array elements that are not strings are
    /// skipped; only a document that is not a JSON object is an error.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let raw: IndexMap<String, Value> = serde_json::from_str(content)?;
        let mut entries = Vec::with_capacity(raw.len());

        for (name, value) in raw {
            let Value::Array(items) = value else {
                warn!("Aliases for {:?} are not an array, skipping", name);
                continue;
            };
            let aliases: Vec<&str> = items
                .iter()
                .filter_map(|item| {
                    let alias = item.as_str();
                    if alias.is_none() {
                        debug!("Non-string alias under {:?}: {}", name, item);
                    }
                    alias
                })
                .collect();
            entries.push(AliasEntry::new(name, aliases));
        }

        Ok(Self::from_entries(entries))
    }

    /// Load from a file, surfacing every failure
    pub fn try_load(path: &Path) -> Result<Self, AttributionError> {
        if !path.exists() {
            return Err(AttributionError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| AttributionError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_json(&content).map_err(|e| AttributionError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a file; a missing or corrupt file yields an empty dictionary
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(dictionary) => {
                info!(
                    "Loaded {} components from {}",
                    dictionary.len(),
                    path.display()
                );
                dictionary
            }
            Err(e) => {
                warn!("{}; continuing with an empty alias dictionary", e);
                Self::empty()
            }
        }
    }

    /// Load the dictionary `config` points at, softly like [`Self::load`]
    pub fn from_config(config: &AttributorConfig) -> Self {
        match config.resolve_aliases_path() {
            Ok(path) => Self::load(&path),
            Err(e) => {
                warn!("{}; continuing with an empty alias dictionary", e);
                Self::empty()
            }
        }
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry owning a name or alias (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&AliasEntry> {
        self.lookup
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Canonical form of `raw`, or `raw` lowercased when unknown
    pub fn canonical_name_of(&self, raw: &str) -> String {
        match self.get(raw) {
            Some(entry) => entry.canonical_name.clone(),
            None => raw.trim().to_lowercase(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
