use component_attributor::{
    AliasDictionary, AliasEntry, AttributionError, AttributionService, ComponentDetector,
    ModelClient, ModelConfig, OllamaClient, ReservedPrefix, SpecificityResolver, Strategy, TaskRef,
    TaskStatus,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Model stub answering from a fixed table keyed by the task text
#[derive(Default)]
struct ScriptedClient {
    available: bool,
    fail: bool,
    responses: HashMap<String, Vec<String>>,
    default_response: Vec<String>,
    probes: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn answering(names: &[&str]) -> Self {
        Self {
            available: true,
            default_response: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelClient for ScriptedClient {
    fn is_available(&self, _config: &ModelConfig) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.available
    }

    fn extract_components(
        &self,
        text: &str,
        _config: &ModelConfig,
    ) -> Result<Vec<String>, AttributionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AttributionError::ModelResponse("timed out".to_string()));
        }
        Ok(self
            .responses
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn sample_dictionary() -> AliasDictionary {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("component-aliases.json");
    AliasDictionary::try_load(&path).expect("sample dictionary")
}

fn service_with<C: ModelClient>(dictionary: AliasDictionary, client: C) -> AttributionService<C> {
    let detector = ComponentDetector::new(Arc::new(dictionary), ReservedPrefix::new("cfa").unwrap());
    AttributionService::new(detector, client)
}

#[test]
fn attribution_is_deterministic_without_model() {
    let service = service_with(sample_dictionary(), ScriptedClient::default());
    let tasks = [
        TaskRef::new("Sipariş ekranında tarih seçici açılmıyor"),
        TaskRef::new("CfaOrderTable and OrderTable header misaligned"),
        TaskRef::new("Hata").with_description("ödeme sekmesi component'i yüklenmiyor"),
        TaskRef::new("xyz"),
    ];
    for task in &tasks {
        let first = service.attribute(task, false, None);
        for _ in 0..3 {
            assert_eq!(service.attribute(task, false, None), first);
        }
    }
}

#[test]
fn hint_is_returned_verbatim() {
    let service = service_with(sample_dictionary(), ScriptedClient::answering(&["tooltip"]));
    let task = TaskRef::new("Datatable component hatası")
        .with_description("CfaDatePicker")
        .with_hint("  Checkout Summary ");
    assert_eq!(service.attribute(&task, true, None), vec!["Checkout Summary"]);
    assert_eq!(service.client().calls(), 0);
}

#[test]
fn title_prefix_needs_no_alias() {
    let dictionary = AliasDictionary::from_entries(vec![
        AliasEntry::new("dropdown", Vec::<String>::new()),
        AliasEntry::new("datatable", Vec::<String>::new()),
    ]);
    let service = service_with(dictionary, ScriptedClient::default());
    let detection =
        service.attribute_detailed(&TaskRef::new("Datatable component hatası"), false, None);
    assert_eq!(detection.strategy, Strategy::TitlePrefix);
    assert_eq!(detection.names, vec!["datatable"]);
}

#[test]
fn specific_name_suppresses_generic_one() {
    let resolver = SpecificityResolver::new(ReservedPrefix::new("cfa").unwrap());
    assert_eq!(
        resolver.resolve(["Button", "CfaSubmitButton"]),
        vec!["CfaSubmitButton"]
    );
}

#[test]
fn exhausted_strategies_yield_nothing() {
    let service = service_with(sample_dictionary(), ScriptedClient::answering(&["tooltip"]));
    let task = TaskRef::new("xyz").with_description("");
    assert!(service.attribute(&task, false, None).is_empty());
    assert_eq!(service.client().calls(), 0);
}

#[test]
fn model_only_called_when_patterns_fail() {
    let service = service_with(sample_dictionary(), ScriptedClient::answering(&["tooltip"]));

    let matched = service.attribute(&TaskRef::new("Modal kapanmıyor"), true, None);
    assert_eq!(matched, vec!["modal"]);
    assert_eq!(service.client().calls(), 0);

    let unmatched = service.attribute(&TaskRef::new("xyz"), true, None);
    assert_eq!(unmatched, vec!["tooltip"]);
    assert_eq!(service.client().calls(), 1);
}

#[test]
fn unavailable_model_is_not_called() {
    let client = ScriptedClient {
        available: false,
        default_response: vec!["tooltip".to_string()],
        ..Default::default()
    };
    let service = service_with(sample_dictionary(), client);
    assert!(service.attribute(&TaskRef::new("xyz"), true, None).is_empty());
    assert_eq!(service.client().probes.load(Ordering::SeqCst), 1);
    assert_eq!(service.client().calls(), 0);
}

#[test]
fn model_failure_degrades_to_empty() {
    let client = ScriptedClient {
        available: true,
        fail: true,
        ..Default::default()
    };
    let service = service_with(sample_dictionary(), client);
    assert!(service.attribute(&TaskRef::new("xyz"), true, None).is_empty());
    assert_eq!(service.client().calls(), 1);
}

#[test]
fn unreachable_model_service_degrades_to_empty() {
    let config = ModelConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        probe_timeout_secs: 1,
        request_timeout_secs: 1,
        ..Default::default()
    };
    let service = service_with(sample_dictionary(), OllamaClient::new().unwrap());
    assert!(!service.is_model_available(Some(&config)));
    assert!(service.attribute(&TaskRef::new("xyz"), true, Some(&config)).is_empty());
}

#[test]
fn aggregation_counts_active_and_completed() {
    let mut client = ScriptedClient::answering(&[]);
    client
        .responses
        .insert("zz".to_string(), vec!["x".to_string(), "y".to_string()]);
    let service = service_with(AliasDictionary::empty(), client);

    let tasks = vec![
        TaskRef::new("aa").with_hint("x").with_status(TaskStatus::Done),
        TaskRef::new("zz").with_status(TaskStatus::Open),
        TaskRef::new("qq").with_status(TaskStatus::Open),
    ];
    let report = service.aggregate(&tasks, true, None);

    let x = report.bucket("x").unwrap();
    assert_eq!((x.count, x.active_count, x.completed_count), (2, 1, 1));
    let y = report.bucket("y").unwrap();
    assert_eq!((y.count, y.active_count, y.completed_count), (1, 1, 0));
    assert_eq!(report.total_tasks, 3);
    assert_eq!(report.analyzed_tasks, 3);
    assert_eq!(service.client().calls(), 2);
}

#[test]
fn sample_dictionary_covers_turkish_and_english() {
    let service = service_with(sample_dictionary(), ScriptedClient::default());
    let cases = [
        ("Takvim yanlış günü gösteriyor", "datepicker"),
        ("Dosya yükleme büyük dosyalarda takılıyor", "file-upload"),
        ("Snackbar overlaps the footer", "toast"),
        ("Sayfalama son sayfada bozuluyor", "pagination"),
    ];
    for (title, expected) in cases {
        assert_eq!(
            service.attribute(&TaskRef::new(title), false, None),
            vec![expected],
            "title: {}",
            title
        );
    }
}
