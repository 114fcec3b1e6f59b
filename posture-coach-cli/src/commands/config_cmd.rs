use anyhow::Result;
use std::path::Path;

use posture_coach::config::PostureConfig;

pub async fn show_config(path: &Path) -> Result<()> {
    let config = PostureConfig::load_from(path)?.with_env_overrides()?;
    let config_str = toml::to_string_pretty(&config)?;

    println!("Current Configuration ({})", path.display());
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);

    Ok(())
}

pub async fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    PostureConfig::default().save_to(path)?;

    println!("✓ Configuration initialized at: {}", path.display());

    Ok(())
}
