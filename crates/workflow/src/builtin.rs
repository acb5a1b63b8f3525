//! Built-in blueprints.
//!
//! The altitude flow is plain blueprint data: four layers from a 30,000 ft
//! vision down to a 5,000 ft execution plan, each with the keyword tables
//! that drive detection, extraction and scoring.

use altitude_core::{
    Blueprint, ExtractionRule, LayerBlueprint, LayerVocabulary, OutputFormatBlueprint, ReadinessSignal,
};
use serde_json::{Map, Value, json};

pub const ALTITUDE: &str = "altitude";
pub const FEATURE_SPEC: &str = "feature-spec";

/// Words that state intent; shared by every altitude layer.
const INTENT: &[&str] = &["want", "plan", "goal", "aim", "intend", "hope", "will"];

const VAGUE: &[&str] = &["something", "stuff", "things", "maybe", "somehow", "whatever", "kind of", "sort of"];

/// The fixed four-layer altitude blueprint.
pub fn altitude() -> Blueprint {
    Blueprint {
        name: ALTITUDE.into(),
        description: "Descend from a broad vision to an actionable plan, 30,000 ft at a time.".into(),
        layers: vec![vision(), category(), specialization(), execution()],
        output_format: OutputFormatBlueprint {
            kind: "plan".into(),
            structure: Map::new(),
        },
    }
}

fn vision() -> LayerBlueprint {
    LayerBlueprint {
        id: Some("30k".into()),
        name: "Vision".into(),
        description: "The big picture: what you want your life or work to look like.".into(),
        focus: "Why this matters to you and what success would feel like".into(),
        questions: strings(&[
            "What would achieving this change for you?",
            "Which area or industry excites you most?",
            "Who do you picture benefiting from this?",
        ]),
        transition: "Name the field or industry this vision lives in.".into(),
        vocabulary: LayerVocabulary {
            indicators: strings(&["dream", "vision", "someday", "passion", "purpose", "freedom"]),
            // Branches are extracted for the layer being refined toward, so
            // the first layer never extracts; its goals are read at 20k.
            rules: Vec::new(),
            signals: vec![
                ReadinessSignal::new("intent", 0.15, INTENT).with_max_hits(2),
                ReadinessSignal::new("vague", -0.15, VAGUE).with_max_hits(2),
                ReadinessSignal::new("domain", 0.25, &["dream", "vision", "purpose", "passion", "freedom", "impact", "independence"]),
            ],
            thresholds: None,
        },
    }
}

fn category() -> LayerBlueprint {
    LayerBlueprint {
        id: Some("20k".into()),
        name: "Category".into(),
        description: "The industry or field your idea belongs to.".into(),
        focus: "Which industry or field, and what kind of venture".into(),
        questions: strings(&[
            "Which industry does this idea belong to?",
            "Do you want to build a company, join one, or work independently?",
            "What experience do you already have in this field?",
        ]),
        transition: "Pick the specific niche, role and market within the field.".into(),
        vocabulary: LayerVocabulary {
            indicators: strings(&["industry", "business", "company", "field", "sector", "market"]),
            rules: vec![
                ExtractionRule::new("Industry", "Insurance", &["insurance"]),
                ExtractionRule::new("Industry", "Software", &["software", "app", "saas"]),
                ExtractionRule::new("Industry", "Real Estate", &["real estate", "property management", "realtor"]),
                ExtractionRule::new("Industry", "Food Service", &["restaurant", "food", "bakery", "cafe", "catering"]),
                ExtractionRule::new("Industry", "Health & Fitness", &["fitness", "gym", "wellness", "personal trainer"]),
                ExtractionRule::new("Industry", "Consulting", &["consulting", "consultant", "advisory"]),
                ExtractionRule::new("Industry", "E-commerce", &["e-commerce", "ecommerce", "online store", "shopify"]),
                ExtractionRule::new("Venture", "Business", &["business", "company", "startup"]),
                ExtractionRule::new("Goal", "Financial Independence", &["financial freedom", "financial independence", "passive income"]),
                ExtractionRule::new("Goal", "Independence", &["be my own boss", "work for myself", "independence"]),
                ExtractionRule::new("Goal", "Impact", &["help people", "make a difference", "give back"]),
            ],
            signals: vec![
                ReadinessSignal::new("intent", 0.15, INTENT).with_max_hits(2),
                ReadinessSignal::new("vague", -0.15, VAGUE).with_max_hits(2),
                ReadinessSignal::new(
                    "domain",
                    0.25,
                    &["insurance", "software", "real estate", "restaurant", "food", "fitness", "consulting", "e-commerce", "industry"],
                )
                .with_max_hits(2),
            ],
            thresholds: None,
        },
    }
}

fn specialization() -> LayerBlueprint {
    LayerBlueprint {
        id: Some("10k".into()),
        name: "Specialization".into(),
        description: "Your niche: the specific product, role and target market.".into(),
        focus: "The specific niche, your role, and who you serve".into(),
        questions: strings(&[
            "What specific product or service will you offer?",
            "Who exactly is your target customer?",
            "What role will you play day to day?",
        ]),
        transition: "Turn the niche into concrete steps, dates and a budget.".into(),
        vocabulary: LayerVocabulary {
            indicators: strings(&["specifically", "niche", "specialize", "focus on", "target"]),
            rules: vec![
                ExtractionRule::new("Specialization", "Life Insurance", &["life insurance"]),
                ExtractionRule::new("Specialization", "Health Insurance", &["health insurance", "medicare"]),
                ExtractionRule::new("Specialization", "Auto Insurance", &["auto insurance", "car insurance"]),
                ExtractionRule::new("Specialization", "Property Insurance", &["property insurance", "home insurance", "homeowners insurance"]),
                ExtractionRule::new("Specialization", "Mobile App", &["mobile app", "ios app", "android app"]),
                ExtractionRule::new("Specialization", "Web Application", &["web app", "web application", "website"]),
                ExtractionRule::new("Role", "Agent", &["agent", "broker"]),
                ExtractionRule::new("Role", "Founder", &["founder", "co-founder"]),
                ExtractionRule::new("Target Market", "Seniors", &["seniors", "retirees", "elderly"]),
                ExtractionRule::new("Target Market", "Families", &["families", "parents"]),
                ExtractionRule::new("Target Market", "Small Business", &["small business", "small businesses", "smb"]),
            ],
            signals: vec![
                ReadinessSignal::new("intent", 0.15, INTENT).with_max_hits(2),
                ReadinessSignal::new("vague", -0.15, VAGUE).with_max_hits(2),
                ReadinessSignal::new(
                    "domain",
                    0.3,
                    &["specifically", "niche", "target", "seniors", "families", "small business", "agent", "life insurance"],
                )
                .with_max_hits(2),
            ],
            thresholds: None,
        },
    }
}

fn execution() -> LayerBlueprint {
    LayerBlueprint {
        id: Some("5k".into()),
        name: "Execution".into(),
        description: "Concrete next steps, timelines and resources.".into(),
        focus: "The first steps, deadlines, budget and resources".into(),
        questions: strings(&[
            "What is the very first step you can take this week?",
            "What budget can you commit to getting started?",
            "When do you want to launch?",
        ]),
        transition: String::new(),
        vocabulary: LayerVocabulary {
            indicators: strings(&["step", "deadline", "this week", "budget", "launch date", "schedule"]),
            rules: Vec::new(),
            signals: vec![
                ReadinessSignal::new("intent", 0.15, INTENT).with_max_hits(2),
                ReadinessSignal::new("vague", -0.2, VAGUE).with_max_hits(2),
                ReadinessSignal::new(
                    "domain",
                    0.3,
                    &["step", "deadline", "week", "month", "budget", "$", "launch", "schedule", "license"],
                )
                .with_max_hits(2),
            ],
            thresholds: None,
        },
    }
}

/// A product-feature flow that ends in a structured JSON spec.
pub fn feature_spec() -> Blueprint {
    let layer = |id: &str, name: &str, description: &str, focus: &str, questions: &[&str], transition: &str| {
        LayerBlueprint {
            id: Some(id.into()),
            name: name.into(),
            description: description.into(),
            focus: focus.into(),
            questions: strings(questions),
            transition: transition.into(),
            vocabulary: LayerVocabulary::default(),
        }
    };

    let structure = json!({
        "problem": "problem.prompt",
        "users": "users.responses",
        "solution": "solution.prompt",
        "summary": "computed",
        "generated_at": "computed:timestamp",
        "layers_completed": "computed:layer_count",
    });

    Blueprint {
        name: FEATURE_SPEC.into(),
        description: "Turn a feature idea into a reviewable product spec.".into(),
        layers: vec![
            layer(
                "problem",
                "Problem",
                "The pain the feature removes.",
                "Describe the problem, how often it happens and what it costs",
                &["Who hits this problem most often?", "What do they do today instead?"],
                "Name the users affected.",
            ),
            layer(
                "users",
                "Users",
                "Who the feature is for.",
                "Describe the primary users, their goals and constraints",
                &["Which user matters most for the first release?", "What does success look like for them?"],
                "Propose a solution for these users.",
            ),
            layer(
                "solution",
                "Solution",
                "How the feature solves the problem.",
                "Describe the proposed behavior and its scope boundaries",
                &["What is explicitly out of scope?", "Which existing flows does this touch?"],
                "Write the spec.",
            ),
            layer(
                "spec",
                "Spec",
                "A reviewable specification.",
                "Acceptance criteria, rollout and metrics",
                &[],
                "",
            ),
        ],
        output_format: OutputFormatBlueprint {
            kind: "json".into(),
            structure: match structure {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        },
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
