use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use git_ticker::config::{default_config_path, TickerConfig};

use super::{Globals, Runtime};

fn config_path(globals: &Globals) -> PathBuf {
    globals
        .config_path
        .clone()
        .unwrap_or_else(default_config_path)
}

/// `config show`: effective configuration after file, env and flags.
pub fn run_show(globals: &Globals) -> Result<()> {
    let runtime = Runtime::load(globals)?;
    println!("{}", serde_json::to_string_pretty(&runtime.config)?);
    println!();
    println!("credentials: {:?}", runtime.credentials);
    Ok(())
}

/// `config path`
pub fn run_path(globals: &Globals) -> Result<()> {
    let path = config_path(globals);
    let state = if path.exists() { "" } else { " (not created yet)" };
    println!("{}{}", path.display(), state);
    Ok(())
}

/// `config get <key>`: one value from the effective configuration.
///
/// Key uses dot notation: `llm.provider`, `summarization.max_diff_size`
pub fn run_get(globals: &Globals, key: &str) -> Result<()> {
    let runtime = Runtime::load(globals)?;
    let config = serde_json::to_value(&runtime.config)?;
    match resolve_path(&config, key) {
        Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
        None => bail!("Key not found: {}", key),
    }
    Ok(())
}

/// `config set <key> <value>`: write one value to the config file.
///
/// The value is parsed as JSON, falling back to a plain string. The result
/// must still deserialize as a configuration.
pub fn run_set(globals: &Globals, key: &str, value: &str) -> Result<()> {
    let path = config_path(globals);

    let mut config: serde_json::Value = if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).unwrap_or(serde_json::json!({}))
    } else {
        serde_json::to_value(TickerConfig::default())?
    };

    let parsed: serde_json::Value =
        serde_json::from_str(value).unwrap_or(serde_json::Value::String(value.to_string()));
    set_path(&mut config, key, parsed.clone())?;

    serde_json::from_value::<TickerConfig>(config.clone())
        .with_context(|| format!("Invalid value for {}", key))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} = {}", key, serde_json::to_string(&parsed)?);
    Ok(())
}

fn resolve_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Set a value at a dot-separated path, creating intermediate objects.
fn set_path(root: &mut serde_json::Value, path: &str, value: serde_json::Value) -> Result<()> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        bail!("Empty key path");
    };

    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = serde_json::json!({});
        }
        let serde_json::Value::Object(map) = current else {
            bail!("Cannot descend into {}", segment);
        };
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| serde_json::json!({}));
    }

    if !current.is_object() {
        *current = serde_json::json!({});
    }
    if let serde_json::Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
    Ok(())
}
