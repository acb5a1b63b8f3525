pub mod export;
pub mod onboard;
pub mod prune;
pub mod refine;
pub mod templates;

use altitude_config::AppConfig;
use altitude_workflow::TemplateRegistry;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}

/// Built-in templates plus any blueprints in the configured directory.
pub(crate) fn load_registry(config: &AppConfig) -> Result<TemplateRegistry, Box<dyn std::error::Error>> {
    let mut registry = TemplateRegistry::with_builtins()?;
    registry.load_dir(&config.templates_dir())?;
    Ok(registry)
}
