//! Session files: the caller-owned state carried between CLI invocations.

use std::path::Path;

use altitude_core::{IdeaTree, LayerHistory, Progress, ReadinessStatus};
use altitude_workflow::RefinementResult;
use altitude_workflow::builtin::ALTITUDE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub template: String,

    /// Latest text of the idea
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub tree: IdeaTree,

    #[serde(default)]
    pub history: LayerHistory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessStatus>,

    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            template: template.into(),
            text: String::new(),
            tree: IdeaTree::new(),
            history: LayerHistory::new(),
            readiness: None,
            updated_at: Utc::now(),
        }
    }

    /// Load `path`, or `None` if it does not exist yet.
    pub fn load(path: &Path) -> Result<Option<Self>, Box<dyn std::error::Error>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read session {}: {e}", path.display()))?;
        let session = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid session file {}: {e}", path.display()))?;
        Ok(Some(session))
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The altitude flow tracks a branch tree; other templates a history.
    pub fn progress(&self) -> Progress {
        if self.template == ALTITUDE {
            Progress::Tree(self.tree.clone())
        } else {
            Progress::History(self.history.clone())
        }
    }

    /// Take over the state returned by a refinement.
    pub fn absorb(&mut self, result: &RefinementResult) {
        self.text = result.refined_text.clone();
        match &result.progress {
            Progress::Tree(tree) => self.tree = tree.clone(),
            Progress::History(history) => self.history = history.clone(),
        }
        self.readiness = Some(result.readiness);
        self.updated_at = Utc::now();
    }
}
