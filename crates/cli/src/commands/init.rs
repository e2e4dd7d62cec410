//! `souschef init`: Write a default config file.

use std::path::PathBuf;

use souschef_config::AppConfig;

pub fn run(path: Option<PathBuf>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = path.unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));

    println!("🍳 SousChef — Setup");
    println!("===================\n");

    if config_path.exists() && !force {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or re-run with --force.\n");
        return Ok(());
    }

    AppConfig::write_default(&config_path)?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Add your API key and endpoint to {}", config_path.display());
    println!("   2. Run: souschef chat");
    println!("   3. Tell SousChef what's in your fridge!\n");

    Ok(())
}
