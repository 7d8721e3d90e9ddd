//! Controller configuration files

use std::path::Path;

use anyhow::{Context, Result};
use gc_pacer::PiConfig;

/// Load PI tuning from a JSON file, or TOML when the extension is `.toml`
pub fn load(path: &Path) -> Result<PiConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading controller config {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config: PiConfig = if is_toml {
        toml::from_str(&text).context("parsing controller config as TOML")?
    } else {
        serde_json::from_str(&text).context("unmarshalling controller config")?
    };
    config.validate()?;

    log::debug!("loaded controller config from {}: {config:?}", path.display());
    Ok(config)
}
