//! Attribution service: deterministic detection with an opportunistic model
//! fallback, plus batch aggregation.
//!
//! Nothing here returns an error to the caller. A missing dictionary, an
//! unreachable model or a malformed model response all end up as "no
//! components" for the task concerned.

use crate::aggregate::{build_report, AggregationReport};
use crate::config::{AttributorConfig, BatchOptions, ModelConfig, DEFAULT_RESERVED_PREFIX};
use crate::detector::{truncate, ComponentDetector, Detection, Strategy};
use crate::dictionary::AliasDictionary;
use crate::error::AttributionError;
use crate::heuristics::ReservedPrefix;
use crate::model::{ModelClient, OllamaClient};
use crate::task::TaskRef;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AttributionService<C: ModelClient = OllamaClient> {
    detector: ComponentDetector,
    client: C,
    model_config: ModelConfig,
    batch: BatchOptions,
}

impl AttributionService<OllamaClient> {
    /// Build from configuration, loading the alias dictionary softly
    pub fn from_config(config: &AttributorConfig) -> Result<Self, AttributionError> {
        let dictionary = AliasDictionary::from_config(config);

        let mut prefix_token = config.reserved_prefix.trim();
        if prefix_token.is_empty() {
            warn!("Empty reserved prefix, using {:?}", DEFAULT_RESERVED_PREFIX);
            prefix_token = DEFAULT_RESERVED_PREFIX;
        }
        let prefix = ReservedPrefix::new(prefix_token).map_err(|source| {
            AttributionError::InvalidPrefix {
                prefix: prefix_token.to_string(),
                source,
            }
        })?;

        let detector = ComponentDetector::new(Arc::new(dictionary), prefix)
            .with_generic_fallback(config.generic_terms_fallback);

        Ok(Self::new(detector, OllamaClient::new()?)
            .with_model_config(config.model.clone())
            .with_batch_options(config.batch.clone()))
    }
}

impl<C: ModelClient> AttributionService<C> {
    pub fn new(detector: ComponentDetector, client: C) -> Self {
        Self {
            detector,
            client,
            model_config: ModelConfig::default(),
            batch: BatchOptions::default(),
        }
    }

    /// Model settings used when a call passes `None`
    pub fn with_model_config(mut self, model_config: ModelConfig) -> Self {
        self.model_config = model_config;
        self
    }

    pub fn with_batch_options(mut self, batch: BatchOptions) -> Self {
        self.batch = batch;
        self
    }

    pub fn detector(&self) -> &ComponentDetector {
        &self.detector
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    // ------------------------------------------------------------------------
    // Single task
    // ------------------------------------------------------------------------

    /// Component names for one task
    pub fn attribute(
        &self,
        task: &TaskRef,
        use_model: bool,
        model_config: Option<&ModelConfig>,
    ) -> Vec<String> {
        self.attribute_detailed(task, use_model, model_config).names
    }

    /// Component names for one task, tagged with the strategy that found them
    pub fn attribute_detailed(
        &self,
        task: &TaskRef,
        use_model: bool,
        model_config: Option<&ModelConfig>,
    ) -> Detection {
        let detection = self.detector.detect(task);
        if !detection.is_empty() || !use_model {
            return detection;
        }

        let text = task.full_text();
        if text.is_empty() {
            return Detection::none();
        }

        let config = model_config.unwrap_or(&self.model_config);
        if !self.client.is_available(config) {
            debug!("Model {} unavailable, skipping fallback", self.client.name());
            return Detection::none();
        }

        let raw = match self.client.extract_components(&text, config) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Model fallback failed for {:?}: {}",
                    truncate(&task.title, 50),
                    e
                );
                return Detection::none();
            }
        };

        let names = self.detector.resolver().resolve(raw);
        if names.is_empty() {
            return Detection::none();
        }
        Detection {
            strategy: Strategy::Model,
            field: None,
            names,
        }
    }

    pub fn is_model_available(&self, model_config: Option<&ModelConfig>) -> bool {
        self.client
            .is_available(model_config.unwrap_or(&self.model_config))
    }

    // ------------------------------------------------------------------------
    // Batch
    // ------------------------------------------------------------------------

    /// Attribute every task and fold the results into component buckets
    pub fn aggregate(
        &self,
        tasks: &[TaskRef],
        use_model: bool,
        model_config: Option<&ModelConfig>,
    ) -> AggregationReport {
        let attributions = self.attribute_all(tasks, use_model, model_config);
        let report = build_report(tasks, &attributions);
        info!(
            "Attributed {}/{} tasks to {} components",
            report.attributed_tasks,
            report.total_tasks,
            report.buckets.len()
        );
        report
    }

    /// One result per task, in input order
    pub fn attribute_all(
        &self,
        tasks: &[TaskRef],
        use_model: bool,
        model_config: Option<&ModelConfig>,
    ) -> Vec<Vec<String>> {
        if !self.batch.memoize {
            let refs: Vec<&TaskRef> = tasks.iter().collect();
            return self.run_batch(&refs, use_model, model_config);
        }

        // distinct tasks in first-seen order, and each task's slot among them
        let mut distinct: IndexMap<MemoKey<'_>, &TaskRef> = IndexMap::new();
        let slots: Vec<usize> = tasks
            .iter()
            .map(|task| {
                let entry = distinct.entry(MemoKey::of(task));
                let slot = entry.index();
                entry.or_insert(task);
                slot
            })
            .collect();

        let unique: Vec<&TaskRef> = distinct.into_values().collect();
        debug!("Memoized batch: {} distinct of {} tasks", unique.len(), tasks.len());
        let results = self.run_batch(&unique, use_model, model_config);

        slots.into_iter().map(|slot| results[slot].clone()).collect()
    }

    fn run_batch(
        &self,
        tasks: &[&TaskRef],
        use_model: bool,
        model_config: Option<&ModelConfig>,
    ) -> Vec<Vec<String>> {
        let attribute = |task: &&TaskRef| self.attribute(task, use_model, model_config);

        if self.batch.workers <= 1 || tasks.len() <= 1 {
            return tasks.iter().map(attribute).collect();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.batch.workers)
            .build()
        {
            Ok(pool) => pool.install(|| tasks.par_iter().map(attribute).collect()),
            Err(e) => {
                warn!("Could not start worker pool ({}), running sequentially", e);
                tasks.iter().map(attribute).collect()
            }
        }
    }
}

/// Fields that determine a task's attribution
#[derive(Debug, PartialEq, Eq, Hash)]
struct MemoKey<'a> {
    hint: Option<&'a str>,
    title: &'a str,
    description: Option<&'a str>,
}

impl<'a> MemoKey<'a> {
    fn of(task: &'a TaskRef) -> Self {
        Self {
            hint: task.hint(),
            title: task.title.trim(),
            description: task.description().map(str::trim),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
