//! `altitude prune` — Drop branches that no longer fit a new direction.

use std::path::Path;

use altitude_core::IdeaTree;
use altitude_workflow::prune_tree;

use crate::session::Session;

pub async fn run(direction: &str, session_path: &Path, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::load(session_path)?
        .ok_or_else(|| format!("No session at {}", session_path.display()))?;

    let before = session.tree.len();
    let kept = prune_tree(&session.tree, direction)?;

    println!("Kept {} of {} branches:", kept.len(), before);
    for branch in &kept {
        println!("  - {}: {} ({})", branch.label, branch.value, branch.layer_id);
    }

    if dry_run {
        println!("\n(dry run, session unchanged)");
        return Ok(());
    }

    session.tree = IdeaTree::from(kept);
    session.updated_at = chrono::Utc::now();
    session.save(session_path)?;
    Ok(())
}
