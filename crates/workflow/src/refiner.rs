//! Refinement orchestrator.
//!
//! One call takes the caller's text and progress, decides where the idea sits
//! in the template, and returns updated progress plus a refinement aimed at
//! the next layer. Nothing is kept between calls. The only suspension point is
//! the text-generation call; any failure there falls back to the local
//! rewriter and the layer's default questions.

use std::sync::Arc;

use altitude_core::{
    Blueprint, Branch, Error, GenerationOptions, IdeaTree, LayerDefinition, LayerHistory, LayerHistoryEntry,
    Progress, ReadinessStatus, Result, Template, TextGenerator, TreeError,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::branches::{extract, merge_unique};
use crate::builtin;
use crate::output::{AssembledOutput, OutputInput, assemble};
use crate::prompt::{PromptContext, build_instructions, normalize_questions, parse_reply};
use crate::readiness::{Assessment, assess};
use crate::registry::TemplateRegistry;
use crate::rewrite::local_rewrite;
use crate::text::contains_any;

/// Where the refined text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementSource {
    /// Decoded from the text-generation service
    Service,
    /// Local rewriter after a service or decode failure
    Fallback,
    /// Output layer reached; nothing was refined
    Terminal,
}

/// Outcome of one refinement call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementResult {
    pub template: String,
    pub original_text: String,
    pub refined_text: String,
    pub current_layer: String,
    /// `None` when the current layer is already the output layer
    pub next_layer: Option<String>,
    /// The input text judged at the current layer
    pub input_readiness: Assessment,
    pub readiness: ReadinessStatus,
    /// Score behind `readiness`: the refined text judged at the next layer,
    /// or 1.0 once the output layer is reached
    pub score: f32,
    /// Updated tree or history
    pub progress: Progress,
    pub new_branches: Vec<Branch>,
    pub questions: Vec<String>,
    /// Present only once the output layer is reached
    pub output: Option<AssembledOutput>,
    pub source: RefinementSource,
}

impl RefinementResult {
    pub fn is_terminal(&self) -> bool {
        self.source == RefinementSource::Terminal
    }
}

/// Stateless refinement engine over a template registry.
pub struct Refiner {
    generator: Arc<dyn TextGenerator>,
    registry: Arc<TemplateRegistry>,
    options: GenerationOptions,
}

impl Refiner {
    pub fn new(generator: Arc<dyn TextGenerator>, registry: Arc<TemplateRegistry>) -> Self {
        Self {
            generator,
            registry,
            options: GenerationOptions::default(),
        }
    }

    /// Options passed to every service call.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Refine with the fixed altitude template.
    pub async fn refine_altitude(&self, text: &str, tree: IdeaTree, yolo: bool) -> Result<RefinementResult> {
        let template = self.registry.require(builtin::ALTITUDE)?;
        self.refine(&template, text, Progress::Tree(tree), &[], yolo).await
    }

    /// Refine with a template built from `blueprint` for this call only.
    pub async fn refine_with_template(
        &self,
        blueprint: &Blueprint,
        text: &str,
        history: LayerHistory,
        responses: &[String],
        yolo: bool,
    ) -> Result<RefinementResult> {
        let template = Template::from_blueprint(blueprint)?;
        self.refine(&template, text, Progress::History(history), responses, yolo).await
    }

    /// Refine `text` through `template`.
    ///
    /// `yolo` jumps straight to the output layer.
    pub async fn refine(
        &self,
        template: &Template,
        text: &str,
        progress: Progress,
        responses: &[String],
        yolo: bool,
    ) -> Result<RefinementResult> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        progress.validate()?;

        let current_idx = current_layer_index(template, &progress, text)?;
        let last_idx = template.len() - 1;
        let next_idx = if yolo { last_idx } else { (current_idx + 1).min(last_idx) };

        let current = &template.layers()[current_idx];
        let next = &template.layers()[next_idx];
        let input_readiness = assess(text, current);

        debug!(
            template = %template.name(),
            current = %current.id,
            next = %next.id,
            yolo,
            "Resolved layers"
        );

        if current.is_output_layer || next.is_output_layer {
            return Ok(self.terminal(template, text, progress, responses, current, next, input_readiness));
        }

        // Branches describe where the idea is heading, so they belong to `next`.
        let (progress, new_branches, known) = match progress {
            Progress::Tree(mut tree) => {
                let added = merge_unique(&mut tree, extract(text, next));
                let known = tree.branches().to_vec();
                (Progress::Tree(tree), added, known)
            }
            Progress::History(history) => (Progress::History(history), extract(text, next), Vec::new()),
        };

        let payload = build_instructions(&PromptContext {
            template,
            current,
            next,
            text,
            known: &known,
            responses,
        });

        let (refined_text, questions, source) = match self
            .generator
            .generate(&payload.system, &payload.user, &self.options)
            .await
        {
            Ok(raw) => match parse_reply(&raw) {
                Some(reply) => (reply.refined_prompt, reply.questions, RefinementSource::Service),
                None => {
                    warn!(generator = %self.generator.name(), "Unusable reply, using local rewrite");
                    (local_rewrite(text), Vec::new(), RefinementSource::Fallback)
                }
            },
            Err(e) => {
                warn!(generator = %self.generator.name(), error = %e, "Text generation failed, using local rewrite");
                (local_rewrite(text), Vec::new(), RefinementSource::Fallback)
            }
        };
        let questions = normalize_questions(questions, next);
        let refined = assess(&refined_text, next);

        let progress = match progress {
            Progress::History(mut history) => {
                history.push(LayerHistoryEntry {
                    layer_id: current.id.clone(),
                    prompt: text.trim().to_string(),
                    refined_prompt: refined_text.clone(),
                    responses: responses.to_vec(),
                    timestamp: Utc::now(),
                });
                Progress::History(history)
            }
            tree => tree,
        };

        info!(
            template = %template.name(),
            current = %current.id,
            next = %next.id,
            readiness = %refined.status,
            new_branches = new_branches.len(),
            ?source,
            "Refined idea"
        );

        Ok(RefinementResult {
            template: template.name().to_string(),
            original_text: text.to_string(),
            refined_text,
            current_layer: current.id.clone(),
            next_layer: Some(next.id.clone()),
            input_readiness,
            readiness: refined.status,
            score: refined.score,
            progress,
            new_branches,
            questions,
            output: None,
            source,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn terminal(
        &self,
        template: &Template,
        text: &str,
        progress: Progress,
        responses: &[String],
        current: &LayerDefinition,
        next: &LayerDefinition,
        input_readiness: Assessment,
    ) -> RefinementResult {
        let output = assemble(&OutputInput {
            template,
            progress: &progress,
            text,
            responses,
            current_layer: &current.id,
        });
        info!(template = %template.name(), current = %current.id, format = %template.output_format().kind(), "Output layer reached");

        RefinementResult {
            template: template.name().to_string(),
            original_text: text.to_string(),
            refined_text: text.to_string(),
            current_layer: current.id.clone(),
            next_layer: (next.id != current.id).then(|| next.id.clone()),
            input_readiness,
            readiness: ReadinessStatus::Green,
            score: 1.0,
            progress,
            new_branches: Vec::new(),
            questions: Vec::new(),
            output: Some(output),
            source: RefinementSource::Terminal,
        }
    }
}

/// Index of the layer the idea currently sits at.
///
/// Empty progress: the first layer whose indicators appear in `text`, else
/// the first layer. Trees: the deepest layer any branch is tagged with.
/// Histories: the layer after the deepest recorded one, clamped.
fn current_layer_index(template: &Template, progress: &Progress, text: &str) -> Result<usize> {
    if progress.is_empty() {
        return Ok(detect_layer(template, text));
    }

    let mut deepest = 0;
    for layer_id in progress.layer_ids() {
        let index = template.index_of(layer_id).ok_or_else(|| TreeError::UnknownLayer {
            layer_id: layer_id.to_string(),
            template: template.name().to_string(),
        })?;
        deepest = deepest.max(index);
    }

    Ok(match progress {
        Progress::Tree(_) => deepest,
        Progress::History(_) => (deepest + 1).min(template.len() - 1),
    })
}

fn detect_layer(template: &Template, text: &str) -> usize {
    let lower = text.to_lowercase();
    template
        .layers()
        .iter()
        .position(|layer| contains_any(&lower, &layer.vocabulary.indicators))
        .unwrap_or(0)
}
