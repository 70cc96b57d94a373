use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use herald_core::config::Config;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Check that every required key is present
    Validate,

    /// Print the effective configuration with credentials redacted
    Show,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config_path: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::read(config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    match subcmd {
        ConfigSubcommand::Validate => validate(&config, json),
        ConfigSubcommand::Show => show(&config, json),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config: &Config, json: bool) -> anyhow::Result<()> {
    let missing: Vec<String> = config.missing().iter().map(|e| e.to_string()).collect();

    if json {
        print_json(&serde_json::json!({
            "valid": missing.is_empty(),
            "missing": missing,
        }))?;
    } else if missing.is_empty() {
        println!("Config is valid.");
    } else {
        for m in &missing {
            println!("[error] {m}");
        }
    }

    if !missing.is_empty() {
        anyhow::bail!("config is missing {} required value(s)", missing.len());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config: &Config, json: bool) -> anyhow::Result<()> {
    let redacted = config.redacted();
    if json {
        print_json(&redacted)?;
    } else {
        let yaml = serde_yaml::to_string(&redacted).context("failed to render config")?;
        print!("{yaml}");
    }
    Ok(())
}
