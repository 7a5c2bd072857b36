use crate::errors::ConfigError;
use crate::workers::WorkerKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Built-in workflow catalogue
static BUILTIN_TEMPLATES: &str = include_str!("../templates/workflows.yaml");

/// A single `(worker, instruction)` pairing to execute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(alias = "agent")]
    pub worker: WorkerKind,
    #[serde(alias = "action")]
    pub instruction: String,
    #[serde(default, alias = "reasoning", skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Step {
    pub fn new(worker: WorkerKind, instruction: impl Into<String>) -> Self {
        Self {
            worker,
            instruction: instruction.into(),
            rationale: None,
        }
    }
}

/// Where a plan came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanSource {
    /// A catalogue template matched the task
    Template { id: String },
    /// The generation service proposed the steps
    Generated,
    /// The fixed fallback plan
    Default,
}

/// Ordered sequence of steps for one run; never modified once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub source: PlanSource,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(source: PlanSource, steps: Vec<Step>) -> Self {
        Self { source, steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn workers(&self) -> Vec<WorkerKind> {
        self.steps.iter().map(|s| s.worker).collect()
    }

    /// Workers used by the plan, each once, in order of first use
    pub fn distinct_workers(&self) -> Vec<WorkerKind> {
        let mut seen = HashSet::new();
        self.steps
            .iter()
            .map(|s| s.worker)
            .filter(|w| seen.insert(*w))
            .collect()
    }
}

/// Static catalogue entry matched by keyword containment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub keywords: Vec<String>,
    pub steps: Vec<Step>,
}

impl WorkflowTemplate {
    /// Whether any keyword occurs in the already lower-cased task
    pub fn matches(&self, task_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| task_lower.contains(kw.to_lowercase().as_str()))
    }
}

/// Ordered, validated set of workflow templates.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCatalogue {
    templates: Vec<WorkflowTemplate>,
}

impl TemplateCatalogue {
    /// Validates and wraps a list of templates, keeping declaration order.
    pub fn new(templates: Vec<WorkflowTemplate>) -> Result<Self, ConfigError> {
        let mut ids = HashSet::new();
        for template in &templates {
            if !ids.insert(template.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate template id '{}'",
                    template.id
                )));
            }
            if template.keywords.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "template '{}' has no keywords",
                    template.id
                )));
            }
            // a blank keyword is contained in every task
            if template.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "template '{}' has a blank keyword",
                    template.id
                )));
            }
            if template.steps.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "template '{}' has no steps",
                    template.id
                )));
            }
        }
        Ok(Self { templates })
    }

    pub fn builtin() -> Result<Self, ConfigError> {
        let templates: Vec<WorkflowTemplate> = serde_yaml::from_str(BUILTIN_TEMPLATES)?;
        Self::new(templates)
    }

    pub fn empty() -> Self {
        Self { templates: vec![] }
    }

    pub fn templates(&self) -> &[WorkflowTemplate] {
        &self.templates
    }

    /// First template, in declaration order, with a keyword contained in the task
    pub fn find_match(&self, task: &str) -> Option<&WorkflowTemplate> {
        let task_lower = task.to_lowercase();
        self.templates.iter().find(|t| t.matches(&task_lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogue_loads_in_declaration_order() {
        let catalogue = TemplateCatalogue::builtin().unwrap();
        let ids: Vec<_> = catalogue.templates().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["research_report", "data_analysis", "code_project"]);
    }

    #[test]
    fn todo_api_task_matches_code_project() {
        let catalogue = TemplateCatalogue::builtin().unwrap();
        let template = catalogue.find_match("Build a REST API for a todo app").unwrap();
        assert_eq!(template.id, "code_project");
        assert_eq!(
            template.steps.iter().map(|s| s.worker).collect::<Vec<_>>(),
            vec![
                WorkerKind::Code,
                WorkerKind::Code,
                WorkerKind::Qa,
                WorkerKind::Writing
            ]
        );
    }

    #[test]
    fn first_declared_template_wins() {
        let catalogue = TemplateCatalogue::builtin().unwrap();
        // "report" (research_report) and "data" (data_analysis) both match
        let template = catalogue.find_match("Write a REPORT about data").unwrap();
        assert_eq!(template.id, "research_report");
    }

    #[test]
    fn no_keyword_no_match() {
        let catalogue = TemplateCatalogue::builtin().unwrap();
        assert!(catalogue.find_match("Tell me a joke").is_none());
    }

    #[test]
    fn rejects_duplicate_ids_and_empty_steps() {
        let template = WorkflowTemplate {
            id: "a".to_string(),
            name: String::new(),
            description: String::new(),
            keywords: vec!["x".to_string()],
            steps: vec![Step::new(WorkerKind::Writing, "write")],
        };
        assert!(TemplateCatalogue::new(vec![template.clone(), template.clone()]).is_err());

        let empty = WorkflowTemplate {
            steps: vec![],
            ..template
        };
        assert!(TemplateCatalogue::new(vec![empty]).is_err());
    }

    #[test]
    fn rejects_any_blank_keyword() {
        let template = WorkflowTemplate {
            id: "docs".to_string(),
            name: String::new(),
            description: String::new(),
            keywords: vec!["document".to_string(), "  ".to_string()],
            steps: vec![Step::new(WorkerKind::Writing, "write")],
        };
        assert!(matches!(
            TemplateCatalogue::new(vec![template.clone()]),
            Err(ConfigError::Invalid(msg)) if msg.contains("blank keyword")
        ));

        let no_keywords = WorkflowTemplate {
            keywords: vec![],
            ..template
        };
        assert!(TemplateCatalogue::new(vec![no_keywords]).is_err());
    }

    #[test]
    fn step_accepts_planner_field_names() {
        let step: Step =
            serde_json::from_str(r#"{"agent": "qa", "action": "review", "reasoning": "check"}"#)
                .unwrap();
        assert_eq!(step.worker, WorkerKind::Qa);
        assert_eq!(step.instruction, "review");
        assert_eq!(step.rationale.as_deref(), Some("check"));
    }

    #[test]
    fn distinct_workers_keep_first_use_order() {
        let plan = Plan::new(
            PlanSource::Generated,
            vec![
                Step::new(WorkerKind::Code, "a"),
                Step::new(WorkerKind::Qa, "b"),
                Step::new(WorkerKind::Code, "c"),
            ],
        );
        assert_eq!(plan.distinct_workers(), vec![WorkerKind::Code, WorkerKind::Qa]);
        assert_eq!(plan.len(), 3);
    }
}
