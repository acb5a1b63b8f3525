//! End-to-end tests for the refinement pipeline.
//!
//! These exercise the full path from a raw idea to a refinement result:
//! template construction, layer resolution, branch extraction, the provider
//! adapter, reply parsing, the local fallback and output assembly.

use std::sync::{Arc, Mutex};

use altitude_core::error::ProviderError;
use altitude_core::message::Message;
use altitude_core::provider::{GenerationOptions, Provider, ProviderRequest, ProviderResponse};
use altitude_core::{
    Blueprint, Branch, ExtractionRule, IdeaTree, LayerBlueprint, LayerHistory, LayerVocabulary, Progress,
    ReadinessStatus, Template,
};
use altitude_providers::ProviderGenerator;
use altitude_workflow::{
    AssembledOutput, RefinementSource, Refiner, TemplateRegistry, assemble_output, local_rewrite, prune_tree,
};

// ── Mock Providers ───────────────────────────────────────────────────────

/// Returns scripted replies in sequence and records every request.
struct ScriptedProvider {
    replies: Vec<String>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let reply = self
            .replies
            .get(requests.len())
            .cloned()
            .unwrap_or_else(|| panic!("ScriptedProvider exhausted after {} calls", requests.len()));
        requests.push(request);
        Ok(ProviderResponse {
            message: Message::assistant(reply),
            usage: None,
            model: "e2e-model".into(),
        })
    }
}

/// Rejects every request.
struct RejectingProvider;

#[async_trait::async_trait]
impl Provider for RejectingProvider {
    fn name(&self) -> &str {
        "e2e_rejecting"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::AuthenticationFailed("invalid key".into()))
    }
}

fn refiner(provider: Arc<dyn Provider>) -> Refiner {
    let generator = Arc::new(ProviderGenerator::new(provider, "e2e-model"));
    let registry = Arc::new(TemplateRegistry::with_builtins().unwrap());
    Refiner::new(generator, registry)
}

/// A → B → C, with a "business" rule at B and focus words at A.
fn abc_template() -> Template {
    let layer = |id: &str, name: &str, focus: &str, rules: Vec<ExtractionRule>| LayerBlueprint {
        id: Some(id.into()),
        name: name.into(),
        description: format!("{name} layer"),
        focus: focus.into(),
        questions: vec![format!("{name} question one?"), format!("{name} question two?")],
        transition: String::new(),
        vocabulary: LayerVocabulary {
            rules,
            ..Default::default()
        },
    };
    Template::from_blueprint(&Blueprint {
        name: "abc".into(),
        description: "Three layer test flow".into(),
        layers: vec![
            layer("A", "Aspiration", "What you want to start and why the business matters", vec![]),
            layer(
                "B",
                "Business",
                "Which business model",
                vec![ExtractionRule::new("Venture", "Business", &["business", "company"])],
            ),
            layer("C", "Concrete", "Concrete deliverables", vec![]),
        ],
        output_format: Default::default(),
    })
    .unwrap()
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_first_layer_with_business_rule() {
    let provider = ScriptedProvider::new(&[
        r#"{"refined_prompt": "Start a small consulting business for local shops", "questions": ["Which shops?", "Why you?"]}"#,
    ]);
    let r = refiner(provider.clone());
    let template = abc_template();

    let result = r
        .refine(
            &template,
            "I want to start a business",
            Progress::Tree(IdeaTree::new()),
            &[],
            false,
        )
        .await
        .unwrap();

    assert_eq!(result.current_layer, "A");
    assert_eq!(result.next_layer.as_deref(), Some("B"));
    assert_eq!(result.input_readiness.status, ReadinessStatus::Yellow);
    assert_eq!(result.new_branches, vec![Branch::new("Venture", "Business", "B")]);
    assert_eq!(result.source, RefinementSource::Service);
    assert_eq!(result.refined_text, "Start a small consulting business for local shops");
    assert_eq!(result.questions.len(), 2);

    // The request carried both instructions through the adapter.
    assert_eq!(provider.calls(), 1);
    let requests = provider.requests.lock().unwrap();
    assert!(requests[0].messages[0].content.contains("Aspiration"));
    assert!(requests[0].messages[1].content.contains("I want to start a business"));
}

#[tokio::test]
async fn scenario_altitude_specialization_needs_literal_phrase() {
    let tree = IdeaTree::from(vec![Branch::new("Industry", "Insurance", "20k")]);
    let r = refiner(Arc::new(RejectingProvider));

    let plain = r
        .refine_altitude("I want to be an insurance agent", tree.clone(), false)
        .await
        .unwrap();
    assert_eq!(plain.current_layer, "20k");
    assert!(plain.new_branches.iter().all(|b| b.value != "Life Insurance"));
    assert!(plain.new_branches.contains(&Branch::new("Role", "Agent", "10k")));

    let literal = r
        .refine_altitude("I want to be a life insurance agent", tree, false)
        .await
        .unwrap();
    assert_eq!(literal.current_layer, "20k");
    assert!(
        literal
            .new_branches
            .contains(&Branch::new("Specialization", "Life Insurance", "10k"))
    );
}

#[tokio::test]
async fn scenario_yolo_targets_last_layer() {
    let provider = ScriptedProvider::new(&[]);
    let r = refiner(provider.clone());

    let result = r
        .refine_altitude("My dream is to find my purpose", IdeaTree::new(), true)
        .await
        .unwrap();

    assert_eq!(result.next_layer.as_deref(), Some("5k"));
    assert_eq!(result.readiness, ReadinessStatus::Green);
    assert!(result.new_branches.is_empty());
    assert!(matches!(result.output, Some(AssembledOutput::Plan(_))));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn scenario_rejecting_service_falls_back_deterministically() {
    let text = "i want to sell some good stuff online as a business";

    let r = refiner(Arc::new(RejectingProvider));
    let result = r.refine_altitude(text, IdeaTree::new(), false).await.unwrap();
    assert_eq!(result.source, RefinementSource::Fallback);
    assert_eq!(result.refined_text, local_rewrite(text));
    assert_eq!(result.questions.len(), 2);

    // With the mock enabled the adapter answers, but the notice is not a
    // refinement, so the result is the same.
    let with_mock = refiner(Arc::new(RejectingProvider)).with_options(GenerationOptions {
        fallback_to_mock: true,
        ..GenerationOptions::default()
    });
    let mocked = with_mock.refine_altitude(text, IdeaTree::new(), false).await.unwrap();
    assert_eq!(mocked.refined_text, result.refined_text);
    assert_eq!(mocked.source, RefinementSource::Fallback);
}

#[tokio::test]
async fn scenario_prune_on_direction_change() {
    let tree = IdeaTree::from(vec![Branch::new("Industry", "Insurance", "20k")]);
    let kept = prune_tree(&tree, "I want to pivot to software development").unwrap();
    assert!(kept.is_empty());
}

// ── Full sessions ────────────────────────────────────────────────────────

#[tokio::test]
async fn altitude_session_reaches_execution_plan() {
    let provider = ScriptedProvider::new(&[
        r#"{"refined_prompt": "I want to sell life insurance to retirees as an independent agent", "questions": ["Which state?", "Which carrier?"]}"#,
        r#"Here you go: {"refinedPrompt": "Get licensed this month and call ten retirees a week", "questions": ["Budget?", "Start date?"]}"#,
    ]);
    let r = refiner(provider.clone());

    let first = r
        .refine_altitude("Someday I dream of freedom running my own insurance business", IdeaTree::new(), false)
        .await
        .unwrap();
    assert_eq!(first.current_layer, "30k");
    assert_eq!(first.next_layer.as_deref(), Some("20k"));
    assert_eq!(first.new_branches.len(), 2);
    let tree = first.progress.tree().unwrap().clone();

    let second = r.refine_altitude(&first.refined_text, tree, false).await.unwrap();
    assert_eq!(second.current_layer, "20k");
    assert_eq!(second.next_layer.as_deref(), Some("10k"));
    let tree = second.progress.tree().unwrap().clone();
    assert!(tree.contains_key("Specialization", "Life Insurance"));
    assert!(tree.contains_key("Target Market", "Seniors"));
    assert!(tree.contains_key("Role", "Agent"));

    let last = r.refine_altitude(&second.refined_text, tree.clone(), false).await.unwrap();
    assert_eq!(last.current_layer, "10k");
    assert!(last.is_terminal());
    assert_eq!(last.progress, Progress::Tree(tree.clone()));
    let Some(AssembledOutput::Plan(plan)) = &last.output else {
        panic!("expected an execution plan");
    };
    assert_eq!(plan.domain, "insurance");
    assert_eq!(plan.focus, "Life Insurance");
    assert_eq!(provider.calls(), 2);

    let export = assemble_output(&tree, &last.refined_text, last.readiness);
    assert_eq!(export.readiness_status, ReadinessStatus::Green);
    assert_eq!(export.branches.len(), tree.len());
}

#[tokio::test]
async fn feature_spec_history_session_ends_in_json() {
    let r = refiner(Arc::new(RejectingProvider));
    let blueprint = altitude_workflow::builtin::feature_spec();
    let mut history = LayerHistory::new();
    let inputs = [
        "Exports time out for large accounts",
        "Finance admins during month end close",
        "Generate exports in the background and email a link",
    ];

    for input in inputs {
        let result = r
            .refine_with_template(&blueprint, input, history, &[], false)
            .await
            .unwrap();
        history = result.progress.history().unwrap().clone();
        if result.is_terminal() {
            break;
        }
    }
    assert_eq!(history.len(), 2);

    let last = r
        .refine_with_template(&blueprint, "Acceptance: exports under a minute", history, &[], false)
        .await
        .unwrap();
    assert!(last.is_terminal());
    let Some(AssembledOutput::Structured(doc)) = &last.output else {
        panic!("expected structured output");
    };
    assert_eq!(doc["final_output"]["problem"], "Exports time out for large accounts");
}
