//! Execution plans for ideas that reached the most concrete layer.
//!
//! The plan is selected by sniffing the most specific branch of the idea
//! tree for a known domain; anything else gets the generic kit.

use altitude_core::{Branch, IdeaTree, Template};
use serde::{Deserialize, Serialize};

use crate::text::contains_term;

/// A concrete plan for acting on a refined idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// The most specific thing the plan is about
    pub focus: String,
    pub domain: String,
    pub immediate_actions: Vec<String>,
    pub timeline: Vec<TimelinePhase>,
    pub success_metrics: Vec<String>,
    pub resource_needs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePhase {
    pub phase: String,
    pub duration: String,
    pub goals: Vec<String>,
}

struct Kit {
    domain: &'static str,
    keywords: &'static [&'static str],
    actions: &'static [&'static str],
    metrics: &'static [&'static str],
    resources: &'static [&'static str],
}

const KITS: &[Kit] = &[
    Kit {
        domain: "insurance",
        keywords: &["insurance"],
        actions: &[
            "Research the licensing requirements in your state",
            "Enroll in a pre-licensing course",
            "Schedule the licensing exam",
            "Shortlist carriers or agencies to appoint with",
        ],
        metrics: &[
            "License obtained",
            "First 10 qualified prospects contacted",
            "First policy written",
        ],
        resources: &[
            "Pre-licensing course fee",
            "Exam and license application fees",
            "E&O insurance",
            "CRM for tracking prospects",
        ],
    },
    Kit {
        domain: "software",
        keywords: &["software", "app", "web", "saas"],
        actions: &[
            "Write down the one problem the first version solves",
            "Interview five potential users",
            "Sketch the core user flow",
            "Pick a stack and set up the repository",
        ],
        metrics: &[
            "Five user interviews completed",
            "Working prototype demoed",
            "First ten active users",
        ],
        resources: &[
            "Development time",
            "Hosting and domain",
            "Design or UX help",
        ],
    },
    Kit {
        domain: "food service",
        keywords: &["food", "restaurant", "bakery", "cafe", "catering"],
        actions: &[
            "Check local health permit and food handler requirements",
            "Draft a focused starter menu",
            "Price out kitchen space or a commissary",
            "Test recipes with a small group of customers",
        ],
        metrics: &[
            "Permits approved",
            "Menu costed with target margins",
            "First paying customers served",
        ],
        resources: &[
            "Kitchen space",
            "Equipment and ingredients",
            "Permits and insurance",
        ],
    },
];

const GENERIC: Kit = Kit {
    domain: "general",
    keywords: &[],
    actions: &[
        "Write a one-paragraph description of the idea",
        "Identify the first customer or user you can reach",
        "List the three biggest unknowns",
        "Set a date for the first concrete milestone",
    ],
    metrics: &[
        "First milestone met on time",
        "Feedback from five target users",
        "Clear go or no-go decision",
    ],
    resources: &["Dedicated weekly time", "Small starting budget", "A mentor or peer for feedback"],
};

/// Build the plan for `tree`, falling back to `text` when the tree is empty.
///
/// Branches are sniffed from the most specific down, and the first one naming
/// a known domain picks the kit and the focus. This goes further than reading
/// only the single most specific branch: a tree ending in a market such as
/// `Seniors` still gets the insurance kit from the `Life Insurance` branch
/// above it. Only when no branch names a domain does the most specific branch
/// (or `text`) become the focus of the generic kit.
pub fn build_plan(template: &Template, tree: &IdeaTree, text: &str) -> ExecutionPlan {
    let ranked = by_specificity(template, tree);
    let matched = ranked
        .iter()
        .find_map(|branch| kit_for(&branch.value).map(|kit| (kit, branch.value.clone())));

    let (kit, focus) = match matched {
        Some(found) => found,
        None => {
            let focus = ranked
                .first()
                .map(|b| b.value.clone())
                .unwrap_or_else(|| text.trim().to_string());
            (kit_for(&focus).unwrap_or(&GENERIC), focus)
        }
    };

    ExecutionPlan {
        domain: kit.domain.to_string(),
        immediate_actions: to_strings(kit.actions),
        timeline: timeline(&focus),
        success_metrics: to_strings(kit.metrics),
        resource_needs: to_strings(kit.resources),
        focus,
    }
}

fn kit_for(value: &str) -> Option<&'static Kit> {
    let sniffed = value.to_lowercase();
    KITS.iter()
        .find(|kit| kit.keywords.iter().any(|k| contains_term(&sniffed, k)))
}

/// Branches from the deepest layer up; later insertions first within a layer.
fn by_specificity<'a>(template: &Template, tree: &'a IdeaTree) -> Vec<&'a Branch> {
    let mut ranked: Vec<(usize, usize, &Branch)> = tree
        .iter()
        .enumerate()
        .map(|(i, b)| (template.index_of(&b.layer_id).unwrap_or(0), i, b))
        .collect();
    ranked.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
    ranked.into_iter().map(|(_, _, b)| b).collect()
}

fn timeline(focus: &str) -> Vec<TimelinePhase> {
    let phase = |phase: &str, duration: &str, goals: Vec<String>| TimelinePhase {
        phase: phase.into(),
        duration: duration.into(),
        goals,
    };
    vec![
        phase(
            "Foundation",
            "Weeks 1-2",
            vec![format!("Validate demand for {focus}"), "Finish the immediate actions".into()],
        ),
        phase("Build", "Weeks 3-6", vec![format!("Prepare a first offering of {focus}")]),
        phase("Launch", "Weeks 7-8", vec!["Reach the first customers".into()]),
        phase(
            "Grow",
            "Weeks 9-12",
            vec!["Review the success metrics".into(), "Double down on what works".into()],
        ),
    ]
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    fn altitude() -> Template {
        Template::from_blueprint(&builtin::altitude()).unwrap()
    }

    #[test]
    fn insurance_branch_selects_insurance_kit() {
        let tree = IdeaTree::from(vec![
            Branch::new("Industry", "Insurance", "20k"),
            Branch::new("Specialization", "Life Insurance", "10k"),
            Branch::new("Venture", "Business", "20k"),
        ]);
        let plan = build_plan(&altitude(), &tree, "whatever");
        assert_eq!(plan.focus, "Life Insurance");
        assert_eq!(plan.domain, "insurance");
        assert!(plan.immediate_actions[0].contains("licensing"));
        assert_eq!(plan.timeline.len(), 4);
    }

    #[test]
    fn sniffs_past_branches_without_a_domain() {
        let tree = IdeaTree::from(vec![
            Branch::new("Industry", "Insurance", "20k"),
            Branch::new("Specialization", "Life Insurance", "10k"),
            Branch::new("Role", "Agent", "10k"),
            Branch::new("Target Market", "Seniors", "10k"),
        ]);
        let plan = build_plan(&altitude(), &tree, "");
        assert_eq!(plan.domain, "insurance");
        assert_eq!(plan.focus, "Life Insurance");
    }

    #[test]
    fn unknown_domain_is_generic() {
        let tree = IdeaTree::from(vec![Branch::new("Industry", "Consulting", "20k")]);
        let plan = build_plan(&altitude(), &tree, "");
        assert_eq!(plan.domain, "general");
        assert_eq!(plan.focus, "Consulting");
    }

    #[test]
    fn empty_tree_sniffs_the_text() {
        let plan = build_plan(&altitude(), &IdeaTree::new(), " Launch a bakery this week ");
        assert_eq!(plan.domain, "food service");
        assert_eq!(plan.focus, "Launch a bakery this week");
    }
}
