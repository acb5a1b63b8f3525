//! Instruction payloads for the text-generation service and parsing of its
//! replies.

use std::fmt::Write as _;

use altitude_core::{Branch, LayerDefinition, Template};
use serde::Deserialize;

/// Number of follow-up questions every result carries.
pub const QUESTION_COUNT: usize = 2;

/// System and user instructions for one service call.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionPayload {
    pub system: String,
    pub user: String,
}

/// Everything the instructions are built from.
pub struct PromptContext<'a> {
    pub template: &'a Template,
    pub current: &'a LayerDefinition,
    pub next: &'a LayerDefinition,
    pub text: &'a str,
    pub known: &'a [Branch],
    pub responses: &'a [String],
}

/// Build the instruction payload for refining `ctx.text` toward `ctx.next`.
pub fn build_instructions(ctx: &PromptContext<'_>) -> InstructionPayload {
    let mut system = String::new();
    let _ = writeln!(
        system,
        "You help people refine a rough idea step by step using the \"{}\" framework.",
        ctx.template.name()
    );
    if !ctx.template.description().is_empty() {
        let _ = writeln!(system, "{}", ctx.template.description());
    }
    let _ = writeln!(system, "\nLayers, from most abstract to most concrete:");
    for (i, layer) in ctx.template.layers().iter().enumerate() {
        let _ = writeln!(system, "{}. {} ({}): {}", i + 1, layer.name, layer.id, layer.description);
    }
    let _ = writeln!(system, "\nThe idea currently sits at: {}", ctx.current.name);
    if !ctx.current.focus.is_empty() {
        let _ = writeln!(system, "Current focus: {}", ctx.current.focus);
    }
    let _ = writeln!(system, "Move it toward: {}", ctx.next.name);
    if !ctx.next.focus.is_empty() {
        let _ = writeln!(system, "Next focus: {}", ctx.next.focus);
    }
    if !ctx.current.transition.is_empty() {
        let _ = writeln!(system, "Transition: {}", ctx.current.transition);
    }
    let _ = writeln!(
        system,
        "\nRules:\n\
         - Rewrite the idea so it answers the next focus more concretely. Keep the user's intent.\n\
         - Do not invent facts the user did not state; ask instead.\n\
         - Ask exactly {QUESTION_COUNT} short follow-up questions for the next layer.\n\
         - Respond with JSON only: {{\"refined_prompt\": \"...\", \"questions\": [\"...\", \"...\"]}}"
    );

    let mut user = String::new();
    if !ctx.known.is_empty() {
        let _ = writeln!(user, "Known details:");
        for branch in ctx.known {
            let _ = writeln!(user, "- {}: {}", branch.label, branch.value);
        }
        user.push('\n');
    }
    if !ctx.responses.is_empty() {
        let _ = writeln!(user, "Answers to earlier questions:");
        for response in ctx.responses {
            let _ = writeln!(user, "- {response}");
        }
        user.push('\n');
    }
    let _ = write!(user, "Idea: {}", ctx.text.trim());

    InstructionPayload { system, user }
}

/// A decoded service reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceReply {
    #[serde(alias = "refinedPrompt")]
    pub refined_prompt: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

/// Decode a raw service reply.
///
/// Tolerates prose, stray braces or code fences around the JSON object: each
/// balanced object in the reply is tried in order. Returns `None` when none
/// decodes with a non-blank `refined_prompt`.
pub fn parse_reply(raw: &str) -> Option<ServiceReply> {
    json_objects(raw).find_map(|candidate| {
        let mut reply: ServiceReply = serde_json::from_str(candidate).ok()?;
        reply.refined_prompt = reply.refined_prompt.trim().to_string();
        (!reply.refined_prompt.is_empty()).then_some(reply)
    })
}

/// Exactly [`QUESTION_COUNT`] non-blank questions, padded from `defaults`
/// and then from generic prompts about `layer`.
pub fn normalize_questions(questions: Vec<String>, layer: &LayerDefinition) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(QUESTION_COUNT);
    let generic = [
        format!("What would make this more concrete for the {} stage?", layer.name),
        format!("What is the single most important detail to settle for {}?", layer.name),
    ];
    let candidates = questions
        .into_iter()
        .chain(layer.questions.iter().cloned())
        .chain(generic);

    for question in candidates {
        let question = question.trim();
        if question.is_empty() || out.iter().any(|q| q == question) {
            continue;
        }
        out.push(question.to_string());
        if out.len() == QUESTION_COUNT {
            break;
        }
    }
    out
}

/// Every balanced `{...}` slice of `raw`, one per opening brace, in order.
pub fn json_objects(raw: &str) -> impl Iterator<Item = &str> {
    raw.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(move |(start, _)| {
            let remainder = &raw[start..];
            find_matching_brace(remainder).map(|end| &remainder[..end])
        })
}

/// Byte offset just past the brace closing the first `{`, skipping braces
/// inside JSON strings.
fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;

    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
