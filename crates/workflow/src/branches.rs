//! Branch extraction, merging and pruning.

use altitude_core::{Branch, IdeaTree, LayerDefinition, TreeError};

use crate::text::contains_term;

/// Candidate branches for `layer` found in `text`.
///
/// One branch per matching rule (the first matching phrase wins), tagged
/// with the layer's id. Rules that map to an already emitted
/// `(label, value)` are skipped.
pub fn extract(text: &str, layer: &LayerDefinition) -> Vec<Branch> {
    let lower = text.to_lowercase();
    let mut found: Vec<Branch> = Vec::new();

    for rule in &layer.vocabulary.rules {
        if !rule.phrases.iter().any(|p| contains_term(&lower, p)) {
            continue;
        }
        let branch = Branch::new(&rule.label, &rule.value, &layer.id);
        if !found.iter().any(|b| b.same_key(&branch)) {
            found.push(branch);
        }
    }

    found
}

/// Append the candidates whose `(label, value)` is not yet in `tree`.
///
/// Returns the branches that were actually added, in order.
pub fn merge_unique(tree: &mut IdeaTree, candidates: impl IntoIterator<Item = Branch>) -> Vec<Branch> {
    let mut added = Vec::new();
    for branch in candidates {
        if tree.push_unique(branch.clone()) {
            added.push(branch);
        }
    }
    added
}

/// Keep only branches still relevant to `direction`.
///
/// A branch survives if the direction mentions its value or its label, or if
/// its value contains the whole direction. Comparison is case-insensitive
/// substring matching.
pub fn prune(tree: &IdeaTree, direction: &str) -> IdeaTree {
    let direction = direction.to_lowercase();
    let mut pruned = tree.clone();
    pruned.retain(|branch| {
        let value = branch.value.to_lowercase();
        let label = branch.label.to_lowercase();
        direction.contains(&value) || direction.contains(&label) || value.contains(&direction)
    });
    pruned
}

/// Validate `tree`, then prune it against `direction`.
pub fn prune_tree(tree: &IdeaTree, direction: &str) -> Result<Vec<Branch>, TreeError> {
    tree.validate()?;
    let kept = prune(tree, direction);
    tracing::debug!(before = tree.len(), after = kept.len(), "Pruned idea tree");
    Ok(kept.into_branches())
}

#[cfg(test)]
mod tests {
    use super::*;
    use altitude_core::{ExtractionRule, LayerVocabulary, Thresholds};

    fn layer(rules: Vec<ExtractionRule>) -> LayerDefinition {
        LayerDefinition {
            id: "10k".into(),
            name: "Specialization".into(),
            description: String::new(),
            focus: String::new(),
            questions: Vec::new(),
            transition: String::new(),
            is_output_layer: false,
            vocabulary: LayerVocabulary {
                rules,
                ..Default::default()
            },
            thresholds: Thresholds::MIDDLE,
        }
    }

    #[test]
    fn extract_requires_the_literal_phrase() {
        let layer = layer(vec![
            ExtractionRule::new("Specialization", "Life Insurance", &["life insurance"]),
            ExtractionRule::new("Role", "Agent", &["agent", "broker"]),
        ]);

        let found = extract("I'm an insurance agent", &layer);
        assert_eq!(found, vec![Branch::new("Role", "Agent", "10k")]);

        let found = extract("I want to sell Life Insurance as an agent", &layer);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, "Life Insurance");
        assert_eq!(found[0].layer_id, "10k");
    }

    #[test]
    fn many_phrases_emit_one_branch() {
        let layer = layer(vec![
            ExtractionRule::new("Industry", "Software", &["software", "app", "saas"]),
            ExtractionRule::new("Industry", "Software", &["platform"]),
        ]);
        let found = extract("a SaaS app and software platform", &layer);
        assert_eq!(found, vec![Branch::new("Industry", "Software", "10k")]);
    }

    #[test]
    fn merge_preserves_order_and_uniqueness() {
        let mut tree = IdeaTree::from(vec![Branch::new("Industry", "Insurance", "20k")]);
        let added = merge_unique(
            &mut tree,
            vec![
                Branch::new("Industry", "Insurance", "10k"),
                Branch::new("Role", "Agent", "10k"),
                Branch::new("Role", "Agent", "10k"),
            ],
        );
        assert_eq!(added, vec![Branch::new("Role", "Agent", "10k")]);
        let values: Vec<&str> = tree.iter().map(|b| b.value.as_str()).collect();
        assert_eq!(values, vec!["Insurance", "Agent"]);
    }

    #[test]
    fn prune_drops_unrelated_branches() {
        let tree = IdeaTree::from(vec![Branch::new("Industry", "Insurance", "20k")]);
        let kept = prune_tree(&tree, "I want to pivot to software development").unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn prune_keeps_mentioned_values_and_labels() {
        let tree = IdeaTree::from(vec![
            Branch::new("Industry", "Insurance", "20k"),
            Branch::new("Role", "Agent", "10k"),
            Branch::new("Target Market", "Seniors", "10k"),
        ]);
        let kept = prune(&tree, "Still insurance, but a different role");
        let values: Vec<&str> = kept.iter().map(|b| b.value.as_str()).collect();
        assert_eq!(values, vec!["Insurance", "Agent"]);

        // A direction that is a fragment of a value keeps it too.
        let kept = prune(&tree, "senior");
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn prune_rejects_malformed_trees() {
        let tree = IdeaTree::from(vec![Branch::new("Industry", "", "20k")]);
        assert!(matches!(
            prune_tree(&tree, "anything"),
            Err(TreeError::MalformedBranch { index: 0, .. })
        ));
    }

    #[test]
    fn prune_rejects_repeated_keys() {
        let tree = IdeaTree::from(vec![
            Branch::new("Industry", "Insurance", "20k"),
            Branch::new("Industry", "Insurance", "20k"),
        ]);
        match prune_tree(&tree, "insurance") {
            Err(TreeError::MalformedBranch { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("duplicate"));
            }
            other => panic!("Expected MalformedBranch, got: {other:?}"),
        }
    }
}
