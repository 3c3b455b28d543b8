//! Deterministic, offline component detection for a single task.
//!
//! Strategies run in a fixed order and the first one that yields anything
//! wins:
//!
//! 1. explicit component hint
//! 2. title prefix (`<name> component ...`)
//! 3. alias/keyword in the title
//! 4. identifiers in the title, ranked by the resolver
//! 5. description: `<noun> component<suffix>` phrase, then alias/keyword,
//!    then ranked identifiers
//! 6. optionally, generic kebab-case UI terms in title then description
//!
//! The model fallback is not part of this module.

use crate::dictionary::AliasDictionary;
use crate::extractors::PatternExtractors;
use crate::heuristics::ReservedPrefix;
use crate::resolver::SpecificityResolver;
use crate::task::TaskRef;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Which strategy produced a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Hint,
    TitlePrefix,
    Alias,
    Identifier,
    ComponentPhrase,
    Generic,
    Model,
    None,
}

/// Task field a strategy matched in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Description,
}

/// Component names for one task plus where they came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    pub names: Vec<String>,
}

impl Detection {
    pub fn none() -> Self {
        Self {
            strategy: Strategy::None,
            field: None,
            names: Vec::new(),
        }
    }

    fn found(strategy: Strategy, field: Option<Field>, names: Vec<String>) -> Option<Self> {
        if names.is_empty() {
            None
        } else {
            Some(Self {
                strategy,
                field,
                names,
            })
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ComponentDetector {
    extractors: PatternExtractors,
    resolver: SpecificityResolver,
    generic_fallback: bool,
}

impl ComponentDetector {
    pub fn new(dictionary: Arc<AliasDictionary>, prefix: ReservedPrefix) -> Self {
        Self {
            extractors: PatternExtractors::new(dictionary, prefix.clone()),
            resolver: SpecificityResolver::new(prefix),
            generic_fallback: false,
        }
    }

    /// Enable the generic kebab-case step after every other strategy
    pub fn with_generic_fallback(mut self, enabled: bool) -> Self {
        self.generic_fallback = enabled;
        self
    }

    pub fn extractors(&self) -> &PatternExtractors {
        &self.extractors
    }

    pub fn resolver(&self) -> &SpecificityResolver {
        &self.resolver
    }

    /// Names only
    pub fn extract(&self, task: &TaskRef) -> Vec<String> {
        self.detect(task).names
    }

    /// Run the strategy chain; never calls the model
    pub fn detect(&self, task: &TaskRef) -> Detection {
        let detection = self.run_chain(task).unwrap_or_else(Detection::none);
        debug!(
            "Detected {:?} via {:?} for {:?}",
            detection.names,
            detection.strategy,
            truncate(&task.title, 50)
        );
        detection
    }

    fn run_chain(&self, task: &TaskRef) -> Option<Detection> {
        use Field::{Description, Title};

        if let Some(hint) = task.hint() {
            return Detection::found(Strategy::Hint, None, vec![hint.to_string()]);
        }

        let title = task.title.as_str();
        let ex = &self.extractors;

        Detection::found(Strategy::TitlePrefix, Some(Title), opt_vec(ex.title_prefix(title)))
            .or_else(|| {
                Detection::found(Strategy::Alias, Some(Title), opt_vec(ex.alias_keyword(title)))
            })
            .or_else(|| {
                Detection::found(
                    Strategy::Identifier,
                    Some(Title),
                    self.resolver.resolve(ex.identifiers(title)),
                )
            })
            .or_else(|| {
                let description = task.description()?;
                Detection::found(
                    Strategy::ComponentPhrase,
                    Some(Description),
                    opt_vec(ex.component_phrase(description)),
                )
                .or_else(|| {
                    Detection::found(
                        Strategy::Alias,
                        Some(Description),
                        opt_vec(ex.alias_keyword(description)),
                    )
                })
                .or_else(|| {
                    Detection::found(
                        Strategy::Identifier,
                        Some(Description),
                        self.resolver.resolve(ex.identifiers(description)),
                    )
                })
            })
            .or_else(|| self.generic(task))
    }

    fn generic(&self, task: &TaskRef) -> Option<Detection> {
        if !self.generic_fallback {
            return None;
        }
        let ex = &self.extractors;
        Detection::found(
            Strategy::Generic,
            Some(Field::Title),
            self.resolver.resolve(ex.generic_terms(&task.title)),
        )
        .or_else(|| {
            let description = task.description()?;
            Detection::found(
                Strategy::Generic,
                Some(Field::Description),
                self.resolver.resolve(ex.generic_terms(description)),
            )
        })
    }
}

fn opt_vec(name: Option<String>) -> Vec<String> {
    name.into_iter().collect()
}

/// First `max` chars, for log lines
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::AliasEntry;

    fn detector() -> ComponentDetector {
        let dictionary = AliasDictionary::from_entries(vec![
            AliasEntry::new("datatable", ["data table", "tablo"]),
            AliasEntry::new("dropdown", ["select", "açılır liste"]),
            AliasEntry::new("tooltip", ["ipucu"]),
        ]);
        ComponentDetector::new(Arc::new(dictionary), ReservedPrefix::new("cfa").unwrap())
    }

    #[test]
    fn test_hint_short_circuits() {
        let task = TaskRef::new("Datatable component hatası")
            .with_hint("  CfaWeirdThing ")
            .with_description("tablo componentinde sorun");
        let detection = detector().detect(&task);
        assert_eq!(detection.strategy, Strategy::Hint);
        assert_eq!(detection.names, vec!["CfaWeirdThing"]);
    }

    #[test]
    fn test_blank_hint_is_ignored() {
        let task = TaskRef::new("Datatable component hatası").with_hint("   ");
        assert_eq!(detector().detect(&task).strategy, Strategy::TitlePrefix);
    }

    #[test]
    fn test_title_prefix_wins() {
        let task = TaskRef::new("Datatable component hatası");
        let detection = detector().detect(&task);
        assert_eq!(detection.strategy, Strategy::TitlePrefix);
        assert_eq!(detection.field, Some(Field::Title));
        assert_eq!(detection.names, vec!["datatable"]);
    }

    #[test]
    fn test_alias_in_title() {
        let task = TaskRef::new("Filtre ekranında açılır liste kapanmıyor");
        let detection = detector().detect(&task);
        assert_eq!(detection.strategy, Strategy::Alias);
        assert_eq!(detection.names, vec!["dropdown"]);
    }

    #[test]
    fn test_identifiers_in_title_are_ranked() {
        let task = TaskRef::new("CfaSubmitButton and SubmitButton misaligned");
        let detection = detector().detect(&task);
        assert_eq!(detection.strategy, Strategy::Identifier);
        assert_eq!(detection.names, vec!["CfaSubmitButton"]);
    }

    #[test]
    fn test_description_phrase() {
        let task = TaskRef::new("Ödeme sayfası bozuk")
            .with_description("Sipariş özetindeki tablo componentinde toplam yanlış");
        let detection = detector().detect(&task);
        assert_eq!(detection.strategy, Strategy::ComponentPhrase);
        assert_eq!(detection.field, Some(Field::Description));
        assert_eq!(detection.names, vec!["datatable"]);
    }

    #[test]
    fn test_description_alias_then_identifiers() {
        let task = TaskRef::new("Hata").with_description("ipucu görünmüyor");
        let detection = detector().detect(&task);
        assert_eq!(detection.strategy, Strategy::Alias);
        assert_eq!(detection.names, vec!["tooltip"]);

        let task = TaskRef::new("Hata").with_description("see @cfa/side-panel");
        let detection = detector().detect(&task);
        assert_eq!(detection.strategy, Strategy::Identifier);
        assert_eq!(detection.names, vec!["side-panel"]);
    }

    #[test]
    fn test_exhaustion_is_empty() {
        let detection = detector().detect(&TaskRef::new("xyz").with_description(""));
        assert_eq!(detection, Detection::none());
        assert!(detector().extract(&TaskRef::default()).is_empty());
    }

    #[test]
    fn test_generic_fallback_is_opt_in() {
        let task = TaskRef::new("mobile nav-bar overlaps");
        assert!(detector().extract(&task).is_empty());

        let detection = detector().with_generic_fallback(true).detect(&task);
        assert_eq!(detection.strategy, Strategy::Generic);
        assert_eq!(detection.names, vec!["nav-bar"]);
    }

    #[test]
    fn test_deterministic() {
        let task = TaskRef::new("Tablo ve ipucu sorunları").with_description("CfaGrid");
        let first = detector().extract(&task);
        for _ in 0..5 {
            assert_eq!(detector().extract(&task), first);
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("şğüçöı", 3), "şğü");
        assert_eq!(truncate("ab", 10), "ab");
    }
}
