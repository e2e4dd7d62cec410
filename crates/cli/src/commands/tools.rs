//! `souschef tools`: List the registered tools and their parameter schemas.

use souschef_config::AppConfig;

pub fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = souschef_tools::default_registry(&config.tools, None);

    if registry.is_empty() {
        println!("  No tools enabled. Check the [tools] section of your config.");
        return Ok(());
    }

    println!("  {} tool(s) registered:", registry.len());
    for definition in registry.definitions() {
        println!();
        println!("  {}", definition.name);
        println!("    {}", definition.description);
        let schema = serde_json::to_string_pretty(&definition.parameters)?;
        for line in schema.lines() {
            println!("    {line}");
        }
    }
    println!();

    Ok(())
}
