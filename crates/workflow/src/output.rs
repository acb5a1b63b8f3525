//! Output assembly for ideas that reached their output layer.
//!
//! Two shapes exist: the simple [`IdeaExport`] of a tree, and the
//! format-driven [`AssembledOutput`] a template declares.

use std::fmt::Write as _;

use altitude_core::{Branch, FieldSource, IdeaTree, OutputFormat, Progress, ReadinessStatus, Template};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::plan::{ExecutionPlan, build_plan};

/// Plain export of an idea and its tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaExport {
    pub core_idea: String,
    pub branches: Vec<Branch>,
    pub readiness_status: ReadinessStatus,
}

pub fn assemble_output(tree: &IdeaTree, core_idea: &str, readiness_status: ReadinessStatus) -> IdeaExport {
    IdeaExport {
        core_idea: core_idea.trim().to_string(),
        branches: tree.branches().to_vec(),
        readiness_status,
    }
}

/// What was captured at one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub responses: Vec<String>,
}

impl LayerRecord {
    fn is_empty(&self) -> bool {
        self.prompt.is_empty() && self.responses.is_empty()
    }
}

/// The rendered output of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "content", rename_all = "snake_case")]
pub enum AssembledOutput {
    /// `json` and custom formats
    Structured(Value),
    /// `markdown` and `text` formats
    Document(String),
    Plan(ExecutionPlan),
}

/// Inputs to output assembly.
pub struct OutputInput<'a> {
    pub template: &'a Template,
    pub progress: &'a Progress,
    pub text: &'a str,
    pub responses: &'a [String],
    /// Layer the final text was submitted at
    pub current_layer: &'a str,
}

/// Render the template's declared output format.
pub fn assemble(input: &OutputInput<'_>) -> AssembledOutput {
    let records = layer_records(input);
    let template = input.template;

    match template.output_format() {
        OutputFormat::Json { structure } => AssembledOutput::Structured(structured(input, &records, structure, None)),
        OutputFormat::Custom { kind, structure } => {
            AssembledOutput::Structured(structured(input, &records, structure, Some(kind.as_str())))
        }
        OutputFormat::Markdown => AssembledOutput::Document(markdown(template, &records)),
        OutputFormat::Text => AssembledOutput::Document(plain_text(template, &records)),
        OutputFormat::Plan => {
            let empty = IdeaTree::new();
            let tree = input.progress.tree().unwrap_or(&empty);
            AssembledOutput::Plan(build_plan(template, tree, input.text))
        }
    }
}

/// Captured layers in template order, with the final text attached to the
/// current layer when nothing else was captured there.
pub fn layer_records(input: &OutputInput<'_>) -> Vec<LayerRecord> {
    let text = input.text.trim();
    let mut records = Vec::new();

    for layer in input.template.layers() {
        let mut record = LayerRecord {
            id: layer.id.clone(),
            name: layer.name.clone(),
            prompt: String::new(),
            responses: Vec::new(),
        };

        match input.progress {
            Progress::History(history) => {
                if let Some(entry) = history.entries().iter().rev().find(|e| e.layer_id == layer.id) {
                    record.prompt = entry.prompt.clone();
                    record.responses = entry.responses.clone();
                }
            }
            Progress::Tree(tree) => {
                record.responses = tree
                    .iter()
                    .filter(|b| b.layer_id == layer.id)
                    .map(|b| format!("{}: {}", b.label, b.value))
                    .collect();
            }
        }

        if layer.id == input.current_layer {
            if record.prompt.is_empty() {
                record.prompt = text.to_string();
            }
            if record.responses.is_empty() {
                record.responses = input.responses.to_vec();
            }
        }

        if !record.is_empty() {
            records.push(record);
        }
    }

    records
}

fn summary(records: &[LayerRecord]) -> String {
    records
        .iter()
        .filter(|r| !r.prompt.is_empty())
        .map(|r| r.prompt.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}

fn structured(
    input: &OutputInput<'_>,
    records: &[LayerRecord],
    structure: &[(String, FieldSource)],
    custom_kind: Option<&str>,
) -> Value {
    let layers: Map<String, Value> = records
        .iter()
        .map(|r| {
            (
                r.id.clone(),
                json!({ "name": r.name, "prompt": r.prompt, "responses": r.responses }),
            )
        })
        .collect();

    let mut doc = json!({
        "template": input.template.name(),
        "summary": summary(records),
        "layers": layers,
        "final_output": build_fields(structure, input, records),
    });
    if let (Some(kind), Value::Object(map)) = (custom_kind, &mut doc) {
        map.insert("format".into(), Value::String(kind.to_string()));
    }
    doc
}

fn build_fields(structure: &[(String, FieldSource)], input: &OutputInput<'_>, records: &[LayerRecord]) -> Value {
    let mut out = Map::new();
    for (name, source) in structure {
        out.insert(name.clone(), resolve(name, source, input, records));
    }
    Value::Object(out)
}

fn resolve(name: &str, source: &FieldSource, input: &OutputInput<'_>, records: &[LayerRecord]) -> Value {
    let record = |layer: &str| records.iter().find(|r| r.id == layer);
    match source {
        FieldSource::Prompt { layer } => record(layer.as_str()).map_or(Value::Null, |r| Value::String(r.prompt.clone())),
        FieldSource::Responses { layer } => record(layer.as_str()).map_or_else(|| json!([]), |r| json!(r.responses)),
        FieldSource::Static(value) => value.clone(),
        FieldSource::Computed(kind) => computed(kind.as_deref().unwrap_or(name), input, records),
        FieldSource::Nested(fields) => build_fields(fields, input, records),
    }
}

fn computed(kind: &str, input: &OutputInput<'_>, records: &[LayerRecord]) -> Value {
    match kind {
        "summary" => Value::String(summary(records)),
        "timestamp" | "generated_at" => Value::String(Utc::now().to_rfc3339()),
        "layer_count" | "layers_completed" => json!(records.len()),
        "template" => Value::String(input.template.name().to_string()),
        "text" | "final_prompt" => Value::String(input.text.trim().to_string()),
        _ => Value::Null,
    }
}

fn markdown(template: &Template, records: &[LayerRecord]) -> String {
    let mut out = format!("# {}\n", template.name());
    if !template.description().is_empty() {
        let _ = write!(out, "\n{}\n", template.description());
    }
    for record in records {
        let _ = write!(out, "\n## {}\n", record.name);
        if !record.prompt.is_empty() {
            let _ = write!(out, "\n{}\n", record.prompt);
        }
        if !record.responses.is_empty() {
            out.push('\n');
            for response in &record.responses {
                let _ = writeln!(out, "- {response}");
            }
        }
    }
    out
}

fn plain_text(template: &Template, records: &[LayerRecord]) -> String {
    let title = template.name().to_uppercase();
    let mut out = format!("{title}\n{}\n", "=".repeat(title.chars().count()));
    for record in records {
        let _ = write!(out, "\n{}\n", record.name);
        if !record.prompt.is_empty() {
            let _ = writeln!(out, "  {}", record.prompt);
        }
        for response in &record.responses {
            let _ = writeln!(out, "  - {response}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use altitude_core::{Blueprint, LayerHistory, LayerHistoryEntry, OutputFormatBlueprint};

    fn entry(layer: &str, prompt: &str, responses: &[&str]) -> LayerHistoryEntry {
        LayerHistoryEntry {
            layer_id: layer.into(),
            prompt: prompt.into(),
            refined_prompt: String::new(),
            responses: responses.iter().map(|s| s.to_string()).collect(),
            timestamp: Utc::now(),
        }
    }

    fn feature_spec() -> Template {
        Template::from_blueprint(&builtin::feature_spec()).unwrap()
    }

    fn history() -> Progress {
        Progress::History(LayerHistory::from(vec![
            entry("problem", "Exports time out", &[]),
            entry("users", "Finance admins", &["Monthly close", "Large ledgers"]),
            entry("solution", "Stream exports in the background", &[]),
        ]))
    }

    #[test]
    fn simple_export_shape() {
        let tree = IdeaTree::from(vec![Branch::new("Industry", "Insurance", "20k")]);
        let export = assemble_output(&tree, " Sell insurance ", ReadinessStatus::Yellow);
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["core_idea"], "Sell insurance");
        assert_eq!(value["readiness_status"], "yellow");
        assert_eq!(value["branches"][0]["value"], "Insurance");
    }

    #[test]
    fn json_format_walks_the_structure() {
        let t = feature_spec();
        let progress = history();
        let responses = vec!["Ship behind a flag".to_string()];
        let out = assemble(&OutputInput {
            template: &t,
            progress: &progress,
            text: "Background export with email link",
            responses: &responses,
            current_layer: "spec",
        });

        let AssembledOutput::Structured(doc) = out else {
            panic!("expected structured output");
        };
        assert_eq!(doc["template"], "feature-spec");
        assert_eq!(doc["layers"]["spec"]["prompt"], "Background export with email link");
        assert_eq!(doc["layers"]["spec"]["responses"][0], "Ship behind a flag");

        let final_output = &doc["final_output"];
        assert_eq!(final_output["problem"], "Exports time out");
        assert_eq!(final_output["users"], json!(["Monthly close", "Large ledgers"]));
        assert_eq!(final_output["layers_completed"], 4);
        assert!(final_output["summary"].as_str().unwrap().starts_with("Exports time out / "));
        assert!(final_output["generated_at"].as_str().is_some());
    }

    #[test]
    fn custom_format_keeps_kind_and_nested_fields() {
        let mut blueprint = builtin::feature_spec();
        blueprint.output_format = OutputFormatBlueprint {
            kind: "javascript".into(),
            structure: match json!({
                "meta": { "title": { "source": "static", "value": "Export" } },
                "missing": "nowhere.prompt",
                "unknown": "computed:mystery"
            }) {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
        };
        let t = Template::from_blueprint(&blueprint).unwrap();
        let progress = history();
        let out = assemble(&OutputInput {
            template: &t,
            progress: &progress,
            text: "done",
            responses: &[],
            current_layer: "spec",
        });

        let AssembledOutput::Structured(doc) = out else {
            panic!("expected structured output");
        };
        assert_eq!(doc["format"], "javascript");
        assert_eq!(doc["final_output"]["meta"]["title"], "Export");
        assert!(doc["final_output"]["missing"].is_null());
        assert!(doc["final_output"]["unknown"].is_null());
    }

    #[test]
    fn markdown_has_a_heading_per_layer() {
        let mut blueprint = builtin::feature_spec();
        blueprint.output_format.kind = "markdown".into();
        let t = Template::from_blueprint(&blueprint).unwrap();
        let progress = history();
        let AssembledOutput::Document(doc) = assemble(&OutputInput {
            template: &t,
            progress: &progress,
            text: "Final spec",
            responses: &[],
            current_layer: "spec",
        }) else {
            panic!("expected document");
        };

        assert!(doc.starts_with("# feature-spec\n"));
        for heading in ["## Problem", "## Users", "## Solution", "## Spec"] {
            assert!(doc.contains(heading), "missing {heading}");
        }
        assert!(doc.contains("- Monthly close\n"));
    }

    #[test]
    fn text_format_for_tree_progress() {
        let t = Template::from_blueprint(&Blueprint {
            name: "notes".into(),
            description: String::new(),
            layers: builtin::altitude().layers,
            output_format: OutputFormatBlueprint::default(),
        })
        .unwrap();
        let progress = Progress::Tree(IdeaTree::from(vec![Branch::new("Industry", "Insurance", "20k")]));
        let AssembledOutput::Document(doc) = assemble(&OutputInput {
            template: &t,
            progress: &progress,
            text: "Sell life insurance",
            responses: &[],
            current_layer: "10k",
        }) else {
            panic!("expected document");
        };
        assert!(doc.starts_with("NOTES\n=====\n"));
        assert!(doc.contains("  - Industry: Insurance\n"));
        assert!(doc.contains("Specialization\n  Sell life insurance\n"));
        assert!(!doc.contains("Vision"));
    }

    #[test]
    fn plan_format_uses_the_tree() {
        let t = Template::from_blueprint(&builtin::altitude()).unwrap();
        let progress = Progress::Tree(IdeaTree::from(vec![Branch::new("Industry", "Software", "20k")]));
        let AssembledOutput::Plan(plan) = assemble(&OutputInput {
            template: &t,
            progress: &progress,
            text: "x",
            responses: &[],
            current_layer: "10k",
        }) else {
            panic!("expected plan");
        };
        assert_eq!(plan.domain, "software");
    }
}
