//! `altitude templates` — List templates or show one.

pub async fn run(name: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let registry = super::load_registry(&config)?;

    let Some(name) = name else {
        println!("Templates ({}):", registry.len());
        for name in registry.list() {
            let marker = if name == config.templates.default { " (default)" } else { "" };
            if let Some(template) = registry.get(name) {
                println!("  {name}{marker} — {} layers, {} output", template.len(), template.output_format().kind());
            }
        }
        println!("\nExtra blueprints are read from {}", config.templates_dir().display());
        return Ok(());
    };

    let template = registry.require(name)?;
    println!("{}", template.name());
    if !template.description().is_empty() {
        println!("{}", template.description());
    }
    println!();
    for (i, layer) in template.layers().iter().enumerate() {
        let output = if layer.is_output_layer { "  [output]" } else { "" };
        println!("{}. {} ({}){output}", i + 1, layer.name, layer.id);
        if !layer.focus.is_empty() {
            println!("   Focus: {}", layer.focus);
        }
        for question in &layer.questions {
            println!("   ? {question}");
        }
    }
    Ok(())
}
