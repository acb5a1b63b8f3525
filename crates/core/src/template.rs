//! Blueprints and the templates built from them.
//!
//! A [`Blueprint`] is the declarative, user- or operator-supplied description
//! of a layer sequence. [`Template::from_blueprint`] freezes it into an
//! immutable [`Template`] that is reused across many refinement calls.
//!
//! # Example Blueprint
//!
//! ```json
//! {
//!   "name": "story",
//!   "description": "From premise to outline",
//!   "layers": [
//!     { "id": "premise", "name": "Premise", "description": "...", "focus": "...",
//!       "questions": ["Who is it about?"], "transition": "..." },
//!     { "name": "Outline", "description": "...", "focus": "...",
//!       "questions": [], "transition": "" }
//!   ],
//!   "outputFormat": { "type": "json",
//!                     "structure": { "logline": "premise.prompt" } }
//! }
//! ```

use std::collections::HashMap;

use crate::error::TemplateError;
use crate::layer::{LayerDefinition, LayerVocabulary, ReadinessSignal};
use crate::readiness::Thresholds;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declarative description of a layer sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub layers: Vec<LayerBlueprint>,

    #[serde(default, alias = "outputFormat")]
    pub output_format: OutputFormatBlueprint,
}

/// Declarative description of one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerBlueprint {
    /// Defaults to `layer_{index+1}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub focus: String,

    #[serde(default)]
    pub questions: Vec<String>,

    #[serde(default)]
    pub transition: String,

    #[serde(default)]
    pub vocabulary: LayerVocabulary,
}

/// The raw `outputFormat` object of a blueprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputFormatBlueprint {
    #[serde(rename = "type", default = "default_format_kind")]
    pub kind: String,

    #[serde(default)]
    pub structure: Map<String, Value>,
}

fn default_format_kind() -> String {
    "text".into()
}

impl Default for OutputFormatBlueprint {
    fn default() -> Self {
        Self {
            kind: default_format_kind(),
            structure: Map::new(),
        }
    }
}

/// Where a field of a structured output takes its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource {
    /// The prompt captured at a layer
    Prompt { layer: String },
    /// The responses captured at a layer
    Responses { layer: String },
    /// A constant
    Static(Value),
    /// A value computed by the assembler; `None` means "by field name"
    Computed(Option<String>),
    /// A nested object of fields
    Nested(Vec<(String, FieldSource)>),
}

impl FieldSource {
    /// Parse one `structure` entry.
    ///
    /// Accepted forms:
    /// - `"<layer>.prompt"`, `"<layer>.responses"`, `"computed"`, `"computed:<kind>"`
    /// - `{"source": "prompt"|"responses", "layer": "<id>"}`
    /// - `{"source": "static", "value": ...}`, `{"source": "computed", "kind": "..."}`
    /// - any other object: nested fields
    /// - any other value: a constant
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::parse_shorthand(s),
            Value::Object(map) => match map.get("source").and_then(Value::as_str) {
                Some(source) => Self::parse_tagged(source, map),
                None => FieldSource::Nested(parse_structure(map)),
            },
            other => FieldSource::Static(other.clone()),
        }
    }

    fn parse_shorthand(s: &str) -> Self {
        if s == "computed" {
            return FieldSource::Computed(None);
        }
        if let Some(kind) = s.strip_prefix("computed:") {
            return FieldSource::Computed(Some(kind.trim().to_string()));
        }
        if let Some(layer) = s.strip_suffix(".prompt") {
            return FieldSource::Prompt { layer: layer.to_string() };
        }
        if let Some(layer) = s.strip_suffix(".responses") {
            return FieldSource::Responses { layer: layer.to_string() };
        }
        FieldSource::Static(Value::String(s.to_string()))
    }

    fn parse_tagged(source: &str, map: &Map<String, Value>) -> Self {
        let layer = map
            .get("layer")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match source {
            "prompt" => FieldSource::Prompt { layer },
            "responses" => FieldSource::Responses { layer },
            "computed" => FieldSource::Computed(
                map.get("kind").and_then(Value::as_str).map(String::from),
            ),
            _ => FieldSource::Static(map.get("value").cloned().unwrap_or(Value::Null)),
        }
    }
}

fn parse_structure(map: &Map<String, Value>) -> Vec<(String, FieldSource)> {
    map.iter()
        .map(|(key, value)| (key.clone(), FieldSource::parse(value)))
        .collect()
}

/// The declared output format of a template.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    /// Structured document with a `final_output` built from `structure`
    Json { structure: Vec<(String, FieldSource)> },
    /// Heading-per-layer Markdown document
    Markdown,
    /// Plain-text document
    Text,
    /// Execution plan derived from the idea tree
    Plan,
    /// Host-defined format, rendered as a plain structure
    Custom {
        kind: String,
        structure: Vec<(String, FieldSource)>,
    },
}

impl OutputFormat {
    pub fn from_blueprint(raw: &OutputFormatBlueprint) -> Self {
        match raw.kind.trim().to_lowercase().as_str() {
            "json" => OutputFormat::Json {
                structure: parse_structure(&raw.structure),
            },
            "markdown" | "md" => OutputFormat::Markdown,
            "text" | "plain" => OutputFormat::Text,
            "plan" | "execution_plan" => OutputFormat::Plan,
            _ => OutputFormat::Custom {
                kind: raw.kind.clone(),
                structure: parse_structure(&raw.structure),
            },
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            OutputFormat::Json { .. } => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
            OutputFormat::Plan => "plan",
            OutputFormat::Custom { kind, .. } => kind,
        }
    }
}

/// An immutable, ordered layer sequence.
///
/// Invariants: at least one layer; ids are unique; the last layer in order
/// is the only output layer.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    description: String,
    layers: Vec<LayerDefinition>,
    index: HashMap<String, usize>,
    output_format: OutputFormat,
}

impl Template {
    /// Build a template from a blueprint.
    ///
    /// A blueprint without layers gets one implicit layer (`layer_1`) named
    /// after the blueprint, which is therefore always the output layer.
    pub fn from_blueprint(blueprint: &Blueprint) -> Result<Self, TemplateError> {
        let implicit;
        let declared: &[LayerBlueprint] = if blueprint.layers.is_empty() {
            implicit = [LayerBlueprint {
                id: None,
                name: blueprint.name.clone(),
                description: blueprint.description.clone(),
                focus: blueprint.description.clone(),
                questions: Vec::new(),
                transition: String::new(),
                vocabulary: LayerVocabulary::default(),
            }];
            &implicit
        } else {
            &blueprint.layers
        };

        let count = declared.len();
        let mut layers = Vec::with_capacity(count);
        let mut index = HashMap::with_capacity(count);

        for (i, layer) in declared.iter().enumerate() {
            let id = match &layer.id {
                Some(id) if id.trim().is_empty() => {
                    return Err(TemplateError::InvalidBlueprint {
                        name: blueprint.name.clone(),
                        reason: format!("layer {} has an empty id", i + 1),
                    });
                }
                Some(id) => id.trim().to_string(),
                None => format!("layer_{}", i + 1),
            };

            if index.insert(id.clone(), i).is_some() {
                return Err(TemplateError::DuplicateLayer(id));
            }

            let mut vocabulary = layer.vocabulary.clone();
            if vocabulary.signals.is_empty() {
                if let Some(signal) = focus_signal(&layer.focus) {
                    vocabulary.signals.push(signal);
                }
            }
            let thresholds = vocabulary
                .thresholds
                .unwrap_or_else(|| Thresholds::for_position(i, count));

            layers.push(LayerDefinition {
                id,
                name: layer.name.clone(),
                description: layer.description.clone(),
                focus: layer.focus.clone(),
                questions: layer.questions.clone(),
                transition: layer.transition.clone(),
                is_output_layer: i + 1 == count,
                vocabulary,
                thresholds,
            });
        }

        Ok(Self {
            name: blueprint.name.clone(),
            description: blueprint.description.clone(),
            layers,
            index,
            output_format: OutputFormat::from_blueprint(&blueprint.output_format),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format
    }

    /// Layers in execution order.
    pub fn layers(&self) -> &[LayerDefinition] {
        &self.layers
    }

    /// Layer ids in execution order.
    pub fn layer_order(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false: construction guarantees at least one layer.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn index_of(&self, layer_id: &str) -> Option<usize> {
        self.index.get(layer_id).copied()
    }

    pub fn layer_at(&self, index: usize) -> Option<&LayerDefinition> {
        self.layers.get(index)
    }

    pub fn first_layer(&self) -> &LayerDefinition {
        &self.layers[0]
    }

    pub fn last_layer(&self) -> &LayerDefinition {
        &self.layers[self.layers.len() - 1]
    }

    pub fn get_layer_info(&self, layer_id: &str) -> Option<&LayerDefinition> {
        self.index_of(layer_id).map(|i| &self.layers[i])
    }

    pub fn get_next_layer(&self, layer_id: &str) -> Option<&str> {
        let i = self.index_of(layer_id)?;
        self.layers.get(i + 1).map(|l| l.id.as_str())
    }

    pub fn get_previous_layer(&self, layer_id: &str) -> Option<&str> {
        let i = self.index_of(layer_id)?;
        i.checked_sub(1).map(|p| self.layers[p].id.as_str())
    }

    /// True iff `layer_id` has no successor (unknown ids included).
    pub fn is_output_layer(&self, layer_id: &str) -> bool {
        self.get_next_layer(layer_id).is_none()
    }
}

const STOPWORDS: &[&str] = &[
    "about", "also", "been", "being", "does", "from", "have", "into", "just", "like", "more",
    "most", "much", "only", "over", "some", "such", "than", "that", "their", "them", "then",
    "there", "these", "they", "this", "those", "through", "very", "what", "when", "where",
    "which", "while", "will", "with", "would", "your",
];

/// The overlap signal used when a layer declares no signals of its own.
fn focus_signal(focus: &str) -> Option<ReadinessSignal> {
    let mut terms: Vec<String> = Vec::new();
    for word in focus.split(|c: char| !c.is_alphanumeric()) {
        let word = word.to_lowercase();
        if word.chars().count() >= 4 && !STOPWORDS.contains(&word.as_str()) && !terms.contains(&word) {
            terms.push(word);
        }
    }
    if terms.is_empty() {
        return None;
    }
    Some(ReadinessSignal {
        name: "focus".into(),
        terms,
        weight: 0.15,
        max_hits: 3,
    })
}
