//! Component Attributor - assigns canonical UI component identifiers to
//! free-text bug/task records.
//!
//! Detection is layered and priority ordered: explicit hint, title prefix,
//! alias/keyword, structured identifiers, description phrases. Only when
//! every deterministic strategy comes back empty does the service ask a local
//! text-completion model, and a failed model call is never fatal.
//!
//! ```no_run
//! use component_attributor::{AttributionService, AttributorConfig, TaskRef};
//!
//! let config = AttributorConfig::default().with_env();
//! let service = AttributionService::from_config(&config)?;
//! let names = service.attribute(&TaskRef::new("Datatable component hatası"), false, None);
//! # Ok::<(), component_attributor::AttributionError>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod detector;
pub mod dictionary;
pub mod error;
pub mod extractors;
pub mod heuristics;
pub mod model;
pub mod resolver;
pub mod service;
pub mod task;

pub use aggregate::{AggregationReport, ComponentBucket, TaskSummary};
pub use config::{AttributorConfig, BatchOptions, ModelConfig};
pub use detector::{ComponentDetector, Detection, Field, Strategy};
pub use dictionary::{AliasDictionary, AliasEntry};
pub use error::AttributionError;
pub use extractors::PatternExtractors;
pub use heuristics::{looks_like_component_name, ReservedPrefix};
pub use model::{parse_model_response, ModelClient, OllamaClient};
pub use resolver::SpecificityResolver;
pub use service::AttributionService;
pub use task::{TaskRef, TaskStatus};
