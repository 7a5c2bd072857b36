use async_trait::async_trait;
use orchestra::config::OrchestraConfig;
use orchestra::constants::{NO_SUCCESSFUL_OUTPUTS, ORCHESTRATOR_ID, ORCHESTRATOR_SYSTEM_PROMPT};
use orchestra::core::{Orchestrator, PlanSource};
use orchestra::errors::GenerationError;
use orchestra::llm::{Generation, GenerationRequest, LlmClient, LlmProvider};
use orchestra::workers::WorkerKind;
use serde_json::{json, Map};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Tokens reported for every successful reply
const TOKENS_PER_REPLY: u64 = 25;

/// Answers like a well-behaved model, routed on the system prompt.
#[derive(Debug, Default)]
struct RoutedProvider {
    plan: Option<String>,
    fail_synthesis: bool,
    unreachable: bool,
    calls: Arc<AtomicUsize>,
    synthesis_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LlmProvider for RoutedProvider {
    async fn call_llm_api(
        &self,
        request: GenerationRequest,
    ) -> Result<Generation, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(GenerationError::Other("connection refused".to_string()));
        }
        self.reply(&request).map(|text| Generation::new(text).with_tokens(TOKENS_PER_REPLY))
    }
}

impl RoutedProvider {
    fn reply(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let system = request.messages[0].content.as_str();
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if system == ORCHESTRATOR_SYSTEM_PROMPT {
            if prompt.starts_with("Create an execution plan") {
                return Ok(self.plan.clone().unwrap_or_else(|| "no plan today".to_string()));
            }
            self.synthesis_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_synthesis {
                return Err(GenerationError::Other("synthesis backend down".to_string()));
            }
            return Ok(format!("FINAL ({} sections)", prompt.matches("**:\n").count()));
        }

        let reply = if system.starts_with("You are a code worker") {
            "```python\ndef add(a, b):\n    return a + b\n```".to_string()
        } else if system.starts_with("You are a QA worker") {
            "Issue: missing tests (Minor)\nFinal Assessment: Pass".to_string()
        } else {
            format!("output for: {}", prompt.lines().next().unwrap_or_default())
        };
        Ok(reply)
    }
}

fn orchestrator(config: &OrchestraConfig, provider: RoutedProvider) -> Orchestrator {
    let client = Arc::new(LlmClient::from_provider(Box::new(provider)));
    Orchestrator::new(config, client).unwrap()
}

#[tokio::test]
async fn todo_api_runs_the_code_project_template() {
    let orchestrator = orchestrator(&OrchestraConfig::default(), RoutedProvider::default());

    let report = orchestrator.run("Build a REST API for a todo app", None).await;

    assert!(report.success, "{:?}", report.error);
    assert_eq!(report.output.as_deref(), Some("FINAL (4 sections)"));
    assert_eq!(
        report.summary.plan_source,
        Some(PlanSource::Template {
            id: "code_project".to_string()
        })
    );
    assert_eq!(report.summary.total_iterations, 4);
    assert!(report.state.context.contains_key("generated_code"));
    assert!(report.state.context.contains_key("qa_results"));
    assert!(report.state.context.contains_key("written_content"));
    assert_eq!(report.summary.messages_by_sender.get("code"), Some(&2));
}

#[tokio::test]
async fn untemplated_task_follows_generated_plan() {
    let provider = RoutedProvider {
        plan: Some(
            r#"[{"worker": "research", "action": "collect puns"}, {"worker": "writing", "action": "write the joke"}, {"worker": "jester", "action": "perform"}]"#
                .to_string(),
        ),
        ..RoutedProvider::default()
    };
    let orchestrator = orchestrator(&OrchestraConfig::default(), provider);

    let report = orchestrator.run("Tell me a joke", None).await;

    assert!(report.success);
    assert_eq!(report.summary.plan_source, Some(PlanSource::Generated));
    assert_eq!(
        report.summary.workers_used,
        vec![WorkerKind::Research, WorkerKind::Writing]
    );
    assert!(report.state.context.contains_key("research_results"));
}

#[tokio::test]
async fn malformed_plan_falls_back_to_research_then_writing() {
    let orchestrator = orchestrator(&OrchestraConfig::default(), RoutedProvider::default());

    let report = orchestrator.run("Tell me a joke", None).await;

    assert!(report.success);
    assert_eq!(report.summary.plan_source, Some(PlanSource::Default));
    assert_eq!(
        report.summary.workers_used,
        vec![WorkerKind::Research, WorkerKind::Writing]
    );
}

#[tokio::test]
async fn iteration_ceiling_cuts_the_plan_short() {
    let mut config = OrchestraConfig::default();
    config.parameters.max_iterations = 1;
    let orchestrator = orchestrator(&config, RoutedProvider::default());

    let report = orchestrator.run("Build a REST API for a todo app", None).await;

    assert!(report.success);
    assert_eq!(report.summary.steps_planned, 4);
    assert_eq!(report.summary.steps_executed, 1);
    assert_eq!(report.state.iteration, 1);
    assert_eq!(report.output.as_deref(), Some("FINAL (1 sections)"));
}

#[tokio::test]
async fn data_from_initial_context_reaches_the_analysis() {
    let orchestrator = orchestrator(&OrchestraConfig::default(), RoutedProvider::default());
    let mut context = Map::new();
    context.insert("data".to_string(), json!("month,sales\njan,10\nfeb,12"));

    let report = orchestrator
        .run("Analyze the sales dataset", Some(context))
        .await;

    assert!(report.success);
    assert_eq!(
        report.summary.plan_source,
        Some(PlanSource::Template {
            id: "data_analysis".to_string()
        })
    );
    assert!(report.state.context.contains_key("data_analysis"));
    assert_eq!(report.state.context["task"], json!("Analyze the sales dataset"));
}

#[tokio::test]
async fn failing_synthesis_is_reported_not_raised() {
    let provider = RoutedProvider {
        fail_synthesis: true,
        ..RoutedProvider::default()
    };
    let calls = provider.synthesis_calls.clone();
    let orchestrator = orchestrator(&OrchestraConfig::default(), provider);

    let report = orchestrator.run("Build a CLI", None).await;

    assert!(!report.success);
    assert!(report.output.is_none());
    assert!(report.error.unwrap().contains("synthesis backend down"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(orchestrator.history(5).await.len(), 1);
}

#[tokio::test]
async fn disabled_research_worker_is_substituted_in_default_plan() {
    let mut config = OrchestraConfig::default();
    config.workers.research.enabled = false;
    let orchestrator = orchestrator(&config, RoutedProvider::default());

    let report = orchestrator.run("Tell me a joke", None).await;

    assert!(report.success);
    assert_eq!(report.summary.plan_source, Some(PlanSource::Default));
    assert_eq!(
        report.summary.workers_used,
        vec![WorkerKind::Code, WorkerKind::Writing]
    );
    assert_eq!(report.summary.failed_steps, 0);
}

#[tokio::test]
async fn unreachable_service_still_completes_the_run() {
    let provider = RoutedProvider {
        unreachable: true,
        ..RoutedProvider::default()
    };
    let calls = provider.calls.clone();
    let synthesis_calls = provider.synthesis_calls.clone();
    let orchestrator = orchestrator(&OrchestraConfig::default(), provider);

    let report = orchestrator.run("Tell me a joke", None).await;

    assert!(report.success, "{:?}", report.error);
    assert_eq!(report.output.as_deref(), Some(NO_SUCCESSFUL_OUTPUTS));
    assert_eq!(report.summary.plan_source, Some(PlanSource::Default));
    assert_eq!(
        report.summary.workers_used,
        vec![WorkerKind::Research, WorkerKind::Writing]
    );
    assert_eq!(report.summary.steps_executed, 2);
    assert_eq!(report.summary.failed_steps, 2);
    assert!(report.state.results.is_empty());
    // planning plus one call per worker, none for synthesis
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(synthesis_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn worker_stats_count_generation_calls_and_tokens() {
    let orchestrator = orchestrator(&OrchestraConfig::default(), RoutedProvider::default());
    orchestrator.run("Build a REST API for a todo app", None).await;

    let stats = orchestrator.worker_stats();
    let code = stats.iter().find(|s| s.id == "code").unwrap();
    assert_eq!(code.executions, 2);
    assert_eq!(code.generation_calls, 2);
    assert_eq!(code.total_tokens, 2 * TOKENS_PER_REPLY);
    assert_eq!(code.average_tokens, TOKENS_PER_REPLY as f64);

    let own = stats.iter().find(|s| s.id == ORCHESTRATOR_ID).unwrap();
    assert_eq!(own.executions, 1);
    assert_eq!(own.generation_calls, 1);
    assert_eq!(own.total_tokens, TOKENS_PER_REPLY);

    orchestrator.reset_stats();
    assert!(orchestrator
        .worker_stats()
        .iter()
        .all(|s| s.executions == 0 && s.generation_calls == 0 && s.total_tokens == 0));
}
