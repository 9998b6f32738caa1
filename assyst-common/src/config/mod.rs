pub mod config;

use std::path::Path;

use anyhow::Context;

use crate::config::config::AssystConfig;

pub static CONFIG_LOCATION: &str = "./config.toml";

impl AssystConfig {
    /// Reads and parses the TOML configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<AssystConfig> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

        Self::parse(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<AssystConfig> {
        Ok(toml::from_str::<AssystConfig>(raw)?)
    }
}
