//! Configuration management commands.

use std::path::Path;

use console::style;

use gallerycrawl::config::{user_config_path, Settings};
use gallerycrawl::services::parse_listing_date;

/// Print the effective configuration.
pub async fn cmd_config_show(explicit: Option<&Path>) -> anyhow::Result<()> {
    let settings = Settings::load(explicit).await?;

    match &settings.source_path {
        Some(path) => eprintln!("{} Loaded from {}", style("→").dim(), path.display()),
        None => eprintln!("{} No config file found, showing defaults", style("→").dim()),
    }

    print!("{}", settings.to_toml_string()?);
    Ok(())
}

/// Write the default configuration to `path` or the user config location.
pub fn cmd_config_init(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine user config directory"))?,
    };

    if target.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            target.display()
        );
    }

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, Settings::default().to_toml_string()?)?;

    eprintln!(
        "{} Wrote default config to {}",
        style("✓").green(),
        target.display()
    );
    Ok(())
}

/// Show how each value parses as a listing date.
pub fn cmd_parse_date(values: &[String]) -> anyhow::Result<()> {
    let mut failures = 0usize;
    for value in values {
        match parse_listing_date(value) {
            Ok(date) => println!("{} {} -> {}", style("✓").green(), value, date),
            Err(e) => {
                failures += 1;
                println!("{} {}", style("✗").red(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} values did not parse", failures, values.len());
    }
    Ok(())
}
