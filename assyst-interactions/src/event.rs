use twilight_model::application::interaction::application_command::CommandDataOption;
use twilight_model::application::interaction::{Interaction, InteractionData, InteractionType};
use twilight_model::gateway::event::Event;
use twilight_model::gateway::ShardId;
use twilight_model::id::marker::{ChannelMarker, CommandMarker, GuildMarker, InteractionMarker, UserMarker};
use twilight_model::id::Id;

/// Everything the pipeline needs from an application command interaction.
#[derive(Clone, Debug)]
pub struct InvocationEvent {
    pub interaction_id: Id<InteractionMarker>,
    pub interaction_token: String,
    /// ID Discord assigned to the invoked root command.
    pub command_id: Id<CommandMarker>,
    pub command_name: String,
    /// Top level options. For subcommands these nest, see [`crate::resolver`].
    pub options: Vec<CommandDataOption>,
    pub user_id: Option<Id<UserMarker>>,
    pub channel_id: Option<Id<ChannelMarker>>,
    pub guild_id: Option<Id<GuildMarker>>,
}
impl InvocationEvent {
    /// Returns `None` for anything other than a chat input command being run (autocomplete,
    /// components, modals...).
    pub fn from_interaction(interaction: Interaction) -> Option<Self> {
        if interaction.kind != InteractionType::ApplicationCommand {
            return None;
        }

        let user_id = interaction.author_id();
        let channel_id = interaction.channel.as_ref().map(|x| x.id);

        let data = match interaction.data {
            Some(InteractionData::ApplicationCommand(data)) => *data,
            _ => return None,
        };

        Some(Self {
            interaction_id: interaction.id,
            interaction_token: interaction.token,
            command_id: data.id,
            command_name: data.name,
            options: data.options,
            user_id,
            channel_id,
            guild_id: interaction.guild_id,
        })
    }
}

/// The events the dispatcher reacts to. Anything else ends up in `Other` and is dropped.
#[derive(Debug)]
pub enum IncomingEvent {
    CommandInvocation(Box<InvocationEvent>),
    /// Discord state should be re-synchronised, e.g. after a shard became ready.
    RefreshCommands,
    Other(String),
}
impl IncomingEvent {
    pub fn kind(&self) -> &str {
        match self {
            Self::CommandInvocation(_) => "COMMAND_INVOCATION",
            Self::RefreshCommands => "REFRESH_COMMANDS",
            Self::Other(kind) => kind,
        }
    }
}
impl From<Event> for IncomingEvent {
    fn from(event: Event) -> Self {
        match event {
            Event::InteractionCreate(interaction) => {
                let kind = format!("INTERACTION_CREATE ({:?})", interaction.kind);
                match InvocationEvent::from_interaction(interaction.0) {
                    Some(invocation) => IncomingEvent::CommandInvocation(Box::new(invocation)),
                    None => IncomingEvent::Other(kind),
                }
            },
            Event::Ready(ready) if refreshes_on(ready.shard) => IncomingEvent::RefreshCommands,
            other => IncomingEvent::Other(format!("{:?}", other.kind())),
        }
    }
}

/// Commands are registered per application, not per shard, so only the first shard becoming
/// ready triggers a refresh.
fn refreshes_on(shard: Option<ShardId>) -> bool {
    shard.map_or(true, |x| x.number() == 0)
}
