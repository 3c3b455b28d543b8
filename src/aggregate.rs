//! Per-component statistics over a batch of attributed tasks.

use crate::task::{TaskRef, TaskStatus};
use indexmap::IndexMap;
use serde::Serialize;

/// What a bucket lists for each contributing task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub status: TaskStatus,
}

impl From<&TaskRef> for TaskSummary {
    fn from(task: &TaskRef) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentBucket {
    /// Lowercase, trimmed component name
    pub component: String,
    pub count: usize,
    pub active_count: usize,
    pub completed_count: usize,
    pub tasks: Vec<TaskSummary>,
}

impl ComponentBucket {
    fn new(component: String) -> Self {
        Self {
            component,
            count: 0,
            active_count: 0,
            completed_count: 0,
            tasks: Vec::new(),
        }
    }

    fn add(&mut self, task: &TaskRef) {
        self.count += 1;
        if task.status.is_completed() {
            self.completed_count += 1;
        } else {
            self.active_count += 1;
        }
        self.tasks.push(TaskSummary::from(task));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    /// Most active first
    pub buckets: Vec<ComponentBucket>,
    pub total_tasks: usize,
    /// Tasks that had anything to attribute
    pub analyzed_tasks: usize,
    /// Tasks with at least one component
    pub attributed_tasks: usize,
}

impl AggregationReport {
    pub fn bucket(&self, component: &str) -> Option<&ComponentBucket> {
        let key = bucket_key(component);
        self.buckets.iter().find(|b| b.component == key)
    }
}

/// Fold per-task attributions into sorted buckets.
///
/// `attributions[i]` belongs to `tasks[i]`. A task counts once per distinct
/// bucket key even if two of its names normalize to the same key.
pub fn build_report(tasks: &[TaskRef], attributions: &[Vec<String>]) -> AggregationReport {
    let mut buckets: IndexMap<String, ComponentBucket> = IndexMap::new();
    let mut analyzed_tasks = 0;
    let mut attributed_tasks = 0;

    for (task, names) in tasks.iter().zip(attributions) {
        if task.has_content() {
            analyzed_tasks += 1;
        }

        let keys: Vec<String> = names
            .iter()
            .map(|n| bucket_key(n))
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            continue;
        }
        attributed_tasks += 1;

        let mut seen: Vec<&str> = Vec::with_capacity(keys.len());
        for key in &keys {
            if seen.contains(&key.as_str()) {
                continue;
            }
            seen.push(key.as_str());
            buckets
                .entry(key.clone())
                .or_insert_with(|| ComponentBucket::new(key.clone()))
                .add(task);
        }
    }

    let mut buckets: Vec<ComponentBucket> = buckets.into_values().collect();
    // stable: ties keep discovery order
    buckets.sort_by(|a, b| {
        b.active_count
            .cmp(&a.active_count)
            .then_with(|| b.count.cmp(&a.count))
    });

    AggregationReport {
        buckets,
        total_tasks: tasks.len(),
        analyzed_tasks,
        attributed_tasks,
    }
}

pub fn bucket_key(component: &str) -> String {
    component.to_lowercase().trim().to_string()
}

// ============================================================================
// Tests
// ============================================================================
