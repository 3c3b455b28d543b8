//! Pattern extraction strategies.
//!
//! Every extractor is deterministic and side-effect free. Patterns that depend
//! on the alias dictionary or the reserved prefix are compiled once in
//! [`PatternExtractors::new`].

use crate::dictionary::AliasDictionary;
use crate::heuristics::{
    is_platform_type, looks_like_component_name, ReservedPrefix, RE_KEBAB, RE_MULTI_PASCAL,
};
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

lazy_static! {
    /// `<noun> component`, `<noun> componenti`, `<noun> komponentinde`, ...
    static ref RE_COMPONENT_PHRASE: Regex =
        Regex::new(r"(?i)\b([\p{L}\p{N}][\p{L}\p{N}-]*)\s+(?:component|komponent)\p{L}*").unwrap();
}

/// Compiled matcher for one dictionary name
#[derive(Debug, Clone)]
struct NamePattern {
    name: String,
    /// `^<name>\s+component[ia]?\b`
    title_prefix: Option<Regex>,
    /// `\b<name>\b`
    word: Option<Regex>,
}

impl NamePattern {
    fn compile(name: &str) -> Self {
        let escaped = regex::escape(name);
        let title_prefix = Regex::new(&format!(r"(?i)^{}\s+component[ia]?\b", escaped));
        let word = Regex::new(&format!(r"\b{}\b", escaped));
        if let Err(e) = title_prefix.as_ref().and(word.as_ref()) {
            warn!("Could not compile pattern for alias {:?}: {}", name, e);
        }
        Self {
            name: name.to_string(),
            title_prefix: title_prefix.ok(),
            word: word.ok(),
        }
    }
}

#[derive(Debug, Clone)]
struct ComponentPatterns {
    canonical_name: String,
    /// Longest name first
    names: Vec<NamePattern>,
}

/// The four extraction strategies plus the description phrase matcher
#[derive(Debug, Clone)]
pub struct PatternExtractors {
    dictionary: Arc<AliasDictionary>,
    prefix: ReservedPrefix,
    /// Dictionary order
    components: Vec<ComponentPatterns>,
    /// Indices into `components`, longest alias first
    by_longest_alias: Vec<usize>,
}

impl PatternExtractors {
    pub fn new(dictionary: Arc<AliasDictionary>, prefix: ReservedPrefix) -> Self {
        let components: Vec<ComponentPatterns> = dictionary
            .entries()
            .iter()
            .map(|entry| {
                let mut names: Vec<NamePattern> =
                    entry.names().iter().map(|n| NamePattern::compile(n)).collect();
                names.sort_by(|a, b| b.name.chars().count().cmp(&a.name.chars().count()));
                ComponentPatterns {
                    canonical_name: entry.canonical_name.clone(),
                    names,
                }
            })
            .collect();

        let mut by_longest_alias: Vec<usize> = (0..components.len()).collect();
        by_longest_alias.sort_by(|&a, &b| {
            let len = |i: usize| dictionary.entries()[i].longest_name_len();
            len(b).cmp(&len(a))
        });

        Self {
            dictionary,
            prefix,
            components,
            by_longest_alias,
        }
    }

    pub fn dictionary(&self) -> &AliasDictionary {
        &self.dictionary
    }

    pub fn prefix(&self) -> &ReservedPrefix {
        &self.prefix
    }

    // ------------------------------------------------------------------------
    // 1. Title prefix
    // ------------------------------------------------------------------------

    /// Component named explicitly at the start of a title.
    ///
    /// Matches `<name> component...` or a first token equal to a known name.
    /// Returns the canonical name of the first dictionary entry that matches.
    pub fn title_prefix(&self, title: &str) -> Option<String> {
        let title = title.trim().to_lowercase();
        if title.is_empty() {
            return None;
        }
        let first_token = title.split_whitespace().next().unwrap_or_default();

        self.components
            .iter()
            .find(|component| {
                component.names.iter().any(|pattern| {
                    first_token == pattern.name
                        || pattern
                            .title_prefix
                            .as_ref()
                            .is_some_and(|re| re.is_match(&title))
                })
            })
            .map(|component| component.canonical_name.clone())
    }

    // ------------------------------------------------------------------------
    // 2. Alias / keyword
    // ------------------------------------------------------------------------

    /// First component (longest alias first) mentioned anywhere in `text`.
    ///
    /// A whole-word hit is tried before a bare substring hit for each
    /// component.
    pub fn alias_keyword(&self, text: &str) -> Option<String> {
        let text = text.to_lowercase();
        if text.trim().is_empty() {
            return None;
        }

        self.by_longest_alias
            .iter()
            .map(|&idx| &self.components[idx])
            .find(|component| {
                let word_hit = component
                    .names
                    .iter()
                    .any(|p| p.word.as_ref().is_some_and(|re| re.is_match(&text)));
                word_hit || component.names.iter().any(|p| text.contains(&p.name))
            })
            .map(|component| component.canonical_name.clone())
    }

    // ------------------------------------------------------------------------
    // 3. Identifier style
    // ------------------------------------------------------------------------

    /// Structured identifiers: prefixed PascalCase, prefixed kebab-case,
    /// `@prefix/name` imports, then filtered generic PascalCase.
    ///
    /// The result is de-duplicated but not ranked.
    pub fn identifiers(&self, text: &str) -> Vec<String> {
        let mut found: IndexSet<String> = IndexSet::new();

        found.extend(self.prefix.pascal_matches(text).into_iter().map(String::from));
        found.extend(self.prefix.kebab_matches(text).into_iter().map(String::from));
        found.extend(self.prefix.import_matches(text).into_iter().map(String::from));

        for m in RE_MULTI_PASCAL.find_iter(text) {
            let name = m.as_str();
            if self.prefix.is_prefixed(name) || is_platform_type(name) {
                continue;
            }
            if looks_like_component_name(name) {
                found.insert(name.to_string());
            }
        }

        found.into_iter().collect()
    }

    // ------------------------------------------------------------------------
    // 4. Generic UI terms
    // ------------------------------------------------------------------------

    /// Any kebab-case token that looks like a UI component
    pub fn generic_terms(&self, text: &str) -> Vec<String> {
        let mut found: IndexSet<String> = IndexSet::new();
        for m in RE_KEBAB.find_iter(text) {
            if looks_like_component_name(m.as_str()) {
                found.insert(m.as_str().to_string());
            }
        }
        found.into_iter().collect()
    }

    // ------------------------------------------------------------------------
    // Description phrase
    // ------------------------------------------------------------------------

    /// Bare noun of the first `<noun> component<suffix>` phrase.
    ///
    /// The noun must be a dictionary name or look like a UI term; it is
    /// returned in canonical form.
    pub fn component_phrase(&self, text: &str) -> Option<String> {
        RE_COMPONENT_PHRASE
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .find(|noun| self.dictionary.contains(noun) || looks_like_component_name(noun))
            .map(|noun| self.dictionary.canonical_name_of(noun))
    }
}

// ============================================================================
// Tests
// ============================================================================
