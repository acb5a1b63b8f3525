//! `altitude refine` — Refine an idea one layer further.

use std::path::PathBuf;
use std::sync::Arc;

use altitude_providers::router;
use altitude_workflow::{AssembledOutput, RefinementResult, Refiner};

use crate::session::Session;

pub struct RefineArgs {
    pub text: String,
    pub template: Option<String>,
    pub session: Option<PathBuf>,
    pub yolo: bool,
    pub responses: Vec<String>,
    pub json: bool,
}

pub async fn run(args: RefineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let registry = super::load_registry(&config)?;

    let existing = match &args.session {
        Some(path) => Session::load(path)?,
        None => None,
    };
    let template_name = args
        .template
        .clone()
        .or_else(|| existing.as_ref().map(|s| s.template.clone()))
        .unwrap_or_else(|| config.templates.default.clone());

    let mut session = match existing {
        // Switching templates starts over: layer ids are template-specific.
        Some(s) if s.template == template_name => s,
        _ => Session::new(&template_name),
    };
    let template = registry.require(&template_name)?;

    if !config.has_api_key() && !config.refinement.fallback_to_mock {
        tracing::warn!("No API key configured; refinement will use the local rewriter");
    }

    let generator = Arc::new(router::build_generator(&config));
    let refiner = Refiner::new(generator, Arc::new(registry)).with_options(config.generation_options());

    let result = refiner
        .refine(&template, &args.text, session.progress(), &args.responses, args.yolo)
        .await?;

    if let Some(path) = &args.session {
        session.absorb(&result);
        session.save(path)?;
        tracing::debug!(session = %session.id, path = %path.display(), "Saved session");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result)?;
    }
    Ok(())
}

fn print_result(result: &RefinementResult) -> Result<(), Box<dyn std::error::Error>> {
    let next = result.next_layer.as_deref().unwrap_or("-");
    println!("Template:   {}", result.template);
    println!("Layer:      {} → {}", result.current_layer, next);
    println!(
        "Readiness:  {} (input {} at {:.2})",
        result.readiness, result.input_readiness.status, result.input_readiness.score
    );

    if let Some(output) = &result.output {
        println!("\nOutput layer reached.\n");
        match output {
            AssembledOutput::Document(doc) => println!("{doc}"),
            AssembledOutput::Structured(value) => println!("{}", serde_json::to_string_pretty(value)?),
            AssembledOutput::Plan(plan) => println!("{}", serde_json::to_string_pretty(plan)?),
        }
        return Ok(());
    }

    println!("\nRefined:\n  {}", result.refined_text);
    if !result.new_branches.is_empty() {
        println!("\nNew branches:");
        for branch in &result.new_branches {
            println!("  - {}: {} ({})", branch.label, branch.value, branch.layer_id);
        }
    }
    println!("\nNext questions:");
    for question in &result.questions {
        println!("  ? {question}");
    }
    Ok(())
}
