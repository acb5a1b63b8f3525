//! `altitude export` — Print the session's idea and its progress as JSON.
//!
//! Altitude sessions export their branch tree; templated sessions export
//! their layer history.

use std::path::Path;

use altitude_core::{LayerHistoryEntry, Progress, ReadinessStatus};
use altitude_workflow::assemble_output;
use serde::Serialize;
use serde_json::Value;

use crate::session::Session;

pub async fn run(session_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::load(session_path)?
        .ok_or_else(|| format!("No session at {}", session_path.display()))?;

    println!("{}", serde_json::to_string_pretty(&document(&session)?)?);
    Ok(())
}

#[derive(Serialize)]
struct HistoryExport<'a> {
    template: &'a str,
    core_idea: &'a str,
    history: &'a [LayerHistoryEntry],
    readiness_status: ReadinessStatus,
}

fn document(session: &Session) -> Result<Value, serde_json::Error> {
    let readiness = session.readiness.unwrap_or(ReadinessStatus::Red);
    match session.progress() {
        Progress::Tree(tree) => serde_json::to_value(assemble_output(&tree, &session.text, readiness)),
        Progress::History(_) => serde_json::to_value(HistoryExport {
            template: &session.template,
            core_idea: session.text.trim(),
            history: session.history.entries(),
            readiness_status: readiness,
        }),
    }
}
