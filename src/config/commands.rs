//! Config command handlers

use anyhow::{Context, Result};
use colored::Colorize;
use std::str::FromStr;

use super::Config;
use crate::cli::{ConfigAction, ConfigArgs};

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(),
        ConfigAction::Init { force } => init_config(force),
        ConfigAction::Set { key, value } => set_config(&key, &value),
        ConfigAction::Get { key } => get_config(&key),
        ConfigAction::Path => show_path(),
        ConfigAction::Edit => edit_config(),
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    let content = toml::to_string_pretty(&config)?;

    println!("{}", "[Config]".green());
    println!("{}", content);

    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() && !force {
        println!(
            "{}",
            format!("Config file already exists: {}", path.display()).yellow()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let saved_path = Config::default().save()?;

    println!("{}", "[Config] Initialized".green());
    println!("  Created: {}", saved_path.display());
    println!();
    println!("Point the glossary builder at your TRA tree:");
    println!("  tra-glossary config set general.source_dir /path/to/source_tra");

    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .ok()
        .with_context(|| format!("{} expects a non-negative integer, got '{}'", key, value))
}

/// Apply `key = value` to `config`. Keys are `section.field` paths.
pub fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "source_dir"] => config.general.source_dir = optional(value),
        ["general", "output"] => config.general.output = optional(value),
        ["general", "indent"] => config.general.indent = number(key, value)?,
        ["corpus", "source_lang"] => config.corpus.source_lang = value.to_string(),
        ["corpus", "target_lang"] => config.corpus.target_lang = value.to_string(),
        ["corpus", "file_name"] => config.corpus.file_name = value.to_string(),
        ["extraction", "min_span_count"] => {
            config.extraction.min_span_count = number(key, value)?;
        }
        ["extraction", "min_phrase_count"] => {
            config.extraction.min_phrase_count = number(key, value)?;
        }
        ["extraction", "max_span_words"] => {
            config.extraction.max_span_words = number(key, value)?;
        }
        ["extraction", "min_phrase_chars"] => {
            config.extraction.min_phrase_chars = number(key, value)?;
        }
        ["extraction", "max_phrase_chars"] => {
            config.extraction.max_phrase_chars = number(key, value)?;
        }
        ["extraction", "max_phrase_words"] => {
            config.extraction.max_phrase_words = number(key, value)?;
        }
        ["extraction", "patterns_file"] => config.extraction.patterns_file = optional(value),
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    Ok(())
}

/// Read `key` from `config`; `None` when the key is unset.
pub fn lookup(config: &Config, key: &str) -> Result<Option<String>> {
    let parts: Vec<&str> = key.split('.').collect();

    let value = match parts.as_slice() {
        ["general", "source_dir"] => config.general.source_dir.clone(),
        ["general", "output"] => config.general.output.clone(),
        ["general", "indent"] => Some(config.general.indent.to_string()),
        ["corpus", "source_lang"] => Some(config.corpus.source_lang.clone()),
        ["corpus", "target_lang"] => Some(config.corpus.target_lang.clone()),
        ["corpus", "file_name"] => Some(config.corpus.file_name.clone()),
        ["extraction", "min_span_count"] => Some(config.extraction.min_span_count.to_string()),
        ["extraction", "min_phrase_count"] => {
            Some(config.extraction.min_phrase_count.to_string())
        }
        ["extraction", "max_span_words"] => Some(config.extraction.max_span_words.to_string()),
        ["extraction", "min_phrase_chars"] => {
            Some(config.extraction.min_phrase_chars.to_string())
        }
        ["extraction", "max_phrase_chars"] => {
            Some(config.extraction.max_phrase_chars.to_string())
        }
        ["extraction", "max_phrase_words"] => {
            Some(config.extraction.max_phrase_words.to_string())
        }
        ["extraction", "patterns_file"] => config.extraction.patterns_file.clone(),
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    };

    Ok(value)
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    apply(&mut config, key, value)?;
    config.save()?;
    println!("{}", format!("[Config] Set {} = {}", key, value).green());

    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;

    match lookup(&config, key)? {
        Some(v) => println!("{} = {}", key, v),
        None => println!("{} = (not set)", key),
    }

    Ok(())
}

fn show_path() -> Result<()> {
    match Config::config_path() {
        Some(path) => {
            println!("{}", path.display());
            if path.exists() {
                println!("{}", "(exists)".green());
            } else {
                println!("{}", "(not created)".yellow());
            }
        }
        None => {
            println!("{}", "Could not determine config path".red());
        }
    }
    Ok(())
}

fn edit_config() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if !path.exists() {
        Config::default().save()?;
        println!("{}", "[Config] Created default config".green());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening config with: {}", editor);
    println!("Path: {}", path.display());

    std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .context(format!("Failed to open editor: {}", editor))?;

    Ok(())
}
