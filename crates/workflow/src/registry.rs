//! Template registry.
//!
//! Owned by whoever composes the application and passed to the refiner.
//! Templates are frozen on registration and shared behind `Arc`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use altitude_core::{Blueprint, Template, TemplateError};
use tracing::{debug, info, warn};

use crate::builtin;

/// Named templates available to refinement.
#[derive(Debug, Default, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<Template>>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `altitude` and `feature-spec` templates.
    pub fn with_builtins() -> Result<Self, TemplateError> {
        let mut registry = Self::new();
        registry.register(&builtin::altitude())?;
        registry.register(&builtin::feature_spec())?;
        Ok(registry)
    }

    /// Build a template from `blueprint` and register it under its name,
    /// replacing any previous template of that name.
    pub fn register(&mut self, blueprint: &Blueprint) -> Result<Arc<Template>, TemplateError> {
        if blueprint.name.trim().is_empty() {
            return Err(TemplateError::InvalidBlueprint {
                name: blueprint.name.clone(),
                reason: "blueprint name is empty".into(),
            });
        }
        let template = Arc::new(Template::from_blueprint(blueprint)?);
        if self
            .templates
            .insert(blueprint.name.clone(), template.clone())
            .is_some()
        {
            warn!(template = %blueprint.name, "Replacing registered template");
        }
        debug!(template = %blueprint.name, layers = template.len(), "Registered template");
        Ok(template)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.templates.get(name).cloned()
    }

    /// Like [`get`](Self::get), but a missing template is an error.
    pub fn require(&self, name: &str) -> Result<Arc<Template>, TemplateError> {
        self.get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Register every `*.json` and `*.toml` blueprint in `dir`.
    ///
    /// A missing directory registers nothing. Returns the registered names.
    pub fn load_dir(&mut self, dir: &Path) -> Result<Vec<String>, TemplateError> {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "No template directory");
            return Ok(Vec::new());
        }

        let read_err = |reason: String| TemplateError::InvalidBlueprint {
            name: dir.display().to_string(),
            reason,
        };
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(|e| read_err(e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("json" | "toml")))
            .collect();
        paths.sort();

        let mut names = Vec::with_capacity(paths.len());
        for path in paths {
            let blueprint = read_blueprint(&path)?;
            self.register(&blueprint)?;
            names.push(blueprint.name);
        }
        info!(dir = %dir.display(), count = names.len(), "Loaded templates");
        Ok(names)
    }
}

/// Parse one blueprint file; the format follows the extension.
pub fn read_blueprint(path: &Path) -> Result<Blueprint, TemplateError> {
    let invalid = |reason: String| TemplateError::InvalidBlueprint {
        name: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| invalid(e.to_string())),
        _ => serde_json::from_str(&content).map_err(|e| invalid(e.to_string())),
    }
}
