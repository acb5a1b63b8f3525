//! `altitude onboard` — First-time setup.

use altitude_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let templates_dir = config_dir.join("templates");

    println!("Altitude — First-Time Setup");
    println!("===========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !templates_dir.exists() {
        std::fs::create_dir_all(&templates_dir)?;
        println!("Created template directory: {}", templates_dir.display());
    }

    if config_path.exists() {
        println!("\nConfig already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("Created config.toml at: {}", config_path.display());
        println!("\nNext steps:");
        println!("   1. Add your API key to {} (or set ALTITUDE_API_KEY)", config_path.display());
        println!("   2. Drop extra blueprints (*.json, *.toml) into {}", templates_dir.display());
        println!("   3. Run: altitude refine \"your idea\" --session idea.json\n");
    }

    Ok(())
}
