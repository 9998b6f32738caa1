use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use twilight_http::Client as HttpClient;
use twilight_model::application::command::Command as TwilightCommand;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};
use twilight_model::id::Id;

/// Where commands get registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationScope {
    Global,
    /// A single guild, for testing. Guild commands show up immediately.
    Guild(Id<GuildMarker>),
}
impl From<Option<Id<GuildMarker>>> for RegistrationScope {
    fn from(v: Option<Id<GuildMarker>>) -> Self {
        v.map_or(Self::Global, Self::Guild)
    }
}
impl Display for RegistrationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Guild(id) => write!(f, "guild {id}"),
        }
    }
}

/// Discord's application command registry.
#[async_trait]
pub trait RemoteRegistry: Send + Sync {
    /// Replaces every command in `scope` with `commands`, returning what Discord now has
    /// registered (with IDs assigned).
    async fn bulk_overwrite(
        &self,
        scope: RegistrationScope,
        commands: &[TwilightCommand],
    ) -> anyhow::Result<Vec<TwilightCommand>>;
}

/// [`RemoteRegistry`] backed by the Discord HTTP API.
pub struct HttpRemoteRegistry {
    http: Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
}
impl HttpRemoteRegistry {
    pub fn new(http: Arc<HttpClient>, application_id: Id<ApplicationMarker>) -> Self {
        Self { http, application_id }
    }

    /// Looks up the application ID of the bot the client is authenticated as.
    pub async fn for_current_application(http: Arc<HttpClient>) -> anyhow::Result<Self> {
        let application_id = http.current_user_application().await?.model().await?.id;
        Ok(Self::new(http, application_id))
    }

    pub fn application_id(&self) -> Id<ApplicationMarker> {
        self.application_id
    }
}

#[async_trait]
impl RemoteRegistry for HttpRemoteRegistry {
    async fn bulk_overwrite(
        &self,
        scope: RegistrationScope,
        commands: &[TwilightCommand],
    ) -> anyhow::Result<Vec<TwilightCommand>> {
        let interactions = self.http.interaction(self.application_id);

        let registered = match scope {
            RegistrationScope::Global => interactions.set_global_commands(commands).await?.models().await?,
            RegistrationScope::Guild(guild_id) => {
                interactions
                    .set_guild_commands(guild_id, commands)
                    .await?
                    .models()
                    .await?
            },
        };

        Ok(registered)
    }
}
