// See config.toml.example for the layout of the file these are read from.

use serde::Deserialize;
use twilight_model::id::marker::GuildMarker;
use twilight_model::id::Id;

#[derive(Deserialize)]
pub struct AssystConfig {
    pub authentication: Authentication,
    #[serde(default)]
    pub registration: Registration,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Deserialize)]
pub struct Authentication {
    pub discord_token: String,
}

#[derive(Deserialize, Default)]
pub struct Registration {
    /// Register all commands to this guild only. Guild commands update instantly, so this is
    /// useful when testing changes to the command tree.
    pub debug_guild_id: Option<Id<GuildMarker>>,
}

#[derive(Deserialize)]
pub struct Logging {
    /// Default `tracing` filter directive, used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self { filter: default_filter() }
    }
}

fn default_filter() -> String {
    "info".to_owned()
}
