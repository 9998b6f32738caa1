use std::collections::HashMap;
use std::sync::Arc;

use assyst_interactions::command::{Command, CommandArgument, CommandTree};
use assyst_interactions::context::ExecutionCtxt;
use assyst_interactions::dispatcher::{CommandErrored, CommandErroredHandler, CommandExecutor};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use twilight_http::Client as HttpClient;
use twilight_model::guild::Permissions;
use twilight_model::id::marker::ApplicationMarker;
use twilight_model::id::Id;
use twilight_model::user::User;

use crate::response::ResponseBuilder;

const MAX_ECHO_REPEATS: i64 = 5;

pub fn tree() -> CommandTree {
    CommandTree::new(vec![
        Command::leaf("ping", "Check that the bot is responding", vec![]),
        Command::leaf(
            "echo",
            "Repeat some text",
            vec![
                CommandArgument::required::<String>("text", "Text to repeat"),
                CommandArgument::optional::<i64>("times", "How many times to repeat it", 1),
            ],
        ),
        Command::leaf(
            "whois",
            "Show a user's name and ID",
            vec![CommandArgument::required::<User>("user", "User to look up")],
        ),
        Command::group(
            "config",
            "Per-channel settings",
            vec![
                Command::leaf(
                    "set",
                    "Set a setting",
                    vec![
                        CommandArgument::required::<String>("key", "Setting name"),
                        CommandArgument::optional::<String>("value", "Setting value", String::new()),
                    ],
                ),
                Command::leaf(
                    "get",
                    "Show a setting",
                    vec![CommandArgument::required::<String>("key", "Setting name")],
                ),
            ],
        )
        .default_permissions(Permissions::MANAGE_GUILD),
    ])
}

/// Values set through `config set`, keyed by (channel id, key).
#[derive(Default)]
pub struct Settings(Mutex<HashMap<(u64, String), String>>);

impl Settings {
    pub async fn reply_for(&self, ctxt: &ExecutionCtxt) -> anyhow::Result<String> {
        let args = &ctxt.arguments;
        let channel = ctxt.channel_id.map_or(0, |x| x.get());

        let reply = match ctxt.qualified_name.as_str() {
            "ping" => "pong!".to_owned(),
            "echo" => {
                let text = args.get::<String>("text").cloned().unwrap_or_default();
                let times = args.get::<i64>("times").copied().unwrap_or(1).clamp(1, MAX_ECHO_REPEATS);
                vec![text; usize::try_from(times)?].join(" ")
            },
            "whois" => match args.get::<User>("user") {
                Some(user) => format!("{} ({})", user.name, user.id),
                None => "No user given".to_owned(),
            },
            "config set" => {
                let key = args.get::<String>("key").cloned().unwrap_or_default();
                let value = args.get::<String>("value").cloned().unwrap_or_default();
                let mut settings = self.0.lock().await;

                if value.is_empty() {
                    settings.remove(&(channel, key.clone()));
                    format!("Cleared `{key}`")
                } else {
                    settings.insert((channel, key.clone()), value.clone());
                    format!("Set `{key}` to `{value}`")
                }
            },
            "config get" => {
                let key = args.get::<String>("key").cloned().unwrap_or_default();
                match self.0.lock().await.get(&(channel, key.clone())) {
                    Some(value) => format!("`{key}` is `{value}`"),
                    None => format!("`{key}` is not set"),
                }
            },
            other => anyhow::bail!("no handler for command {other}"),
        };

        Ok(reply)
    }
}

/// Runs the commands in [`tree`] and replies to the interaction.
pub struct SlashExecutor {
    http: Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
    settings: Settings,
}
impl SlashExecutor {
    pub fn new(http: Arc<HttpClient>, application_id: Id<ApplicationMarker>) -> Self {
        Self {
            http,
            application_id,
            settings: Settings::default(),
        }
    }
}

#[async_trait]
impl CommandExecutor for SlashExecutor {
    async fn execute(&self, ctxt: ExecutionCtxt) -> anyhow::Result<()> {
        let reply = self.settings.reply_for(&ctxt).await?;
        let response = ResponseBuilder::channel_message_with_source().content(reply).build();

        self.http
            .interaction(self.application_id)
            .create_response(ctxt.interaction_id, &ctxt.interaction_token, &response)
            .await?;

        Ok(())
    }
}

/// Tells the user which argument could not be converted.
pub struct ErrorReply {
    http: Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
}
impl ErrorReply {
    pub fn new(http: Arc<HttpClient>, application_id: Id<ApplicationMarker>) -> Self {
        Self { http, application_id }
    }
}

pub fn error_message(event: &CommandErrored) -> String {
    format!(
        ":warning: `{}`: invalid value for `{}`: {}",
        event.context.qualified_name, event.argument, event.error
    )
}

#[async_trait]
impl CommandErroredHandler for ErrorReply {
    async fn handle(&self, event: &CommandErrored) -> anyhow::Result<()> {
        debug!("Replying to failed command {}", event.context.qualified_name);

        let response = ResponseBuilder::channel_message_with_source()
            .content(error_message(event))
            .ephemeral(true)
            .build();

        self.http
            .interaction(self.application_id)
            .create_response(
                event.context.interaction_id,
                &event.context.interaction_token,
                &response,
            )
            .await?;

        Ok(())
    }
}
