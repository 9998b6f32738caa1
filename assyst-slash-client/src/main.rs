#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::missing_safety_doc
)]
use std::sync::Arc;

use anyhow::Context;
use assyst_common::ansi::Ansi;
use assyst_common::config::config::AssystConfig;
use assyst_common::config::CONFIG_LOCATION;
use assyst_common::util::tracing_init;
use assyst_interactions::converter::builtin::candidates;
use assyst_interactions::converter::discovery::Services;
use assyst_interactions::converter::ConverterRegistry;
use assyst_interactions::dispatcher::{ErrorSubscribers, InteractionDispatcher};
use assyst_interactions::event::IncomingEvent;
use assyst_interactions::registrar::CommandRegistrar;
use assyst_interactions::remote::HttpRemoteRegistry;
use commands::{ErrorReply, SlashExecutor};
use tokio::spawn;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{debug, info, warn};
use twilight_gateway::{Event, EventTypeFlags, Intents, Shard, StreamExt};
use twilight_http::Client as HttpClient;

mod commands;
mod response;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AssystConfig::load(CONFIG_LOCATION)?;
    tracing_init(&config.logging.filter);

    let token = config.authentication.discord_token.clone();
    let http = Arc::new(HttpClient::new(token.clone()));
    let remote = HttpRemoteRegistry::for_current_application(http.clone())
        .await
        .context("Failed to fetch the current application")?;
    let application_id = remote.application_id();

    let mut builder = ConverterRegistry::builder();
    let services = Services::new().with(http.clone());
    let registered = builder.register_from_source(candidates(), Some(&services))?;
    let converters = Arc::new(builder.build());
    debug!("Registered {registered} argument converters");

    let tree = Arc::new(commands::tree());
    converters.validate(&tree)?;

    let registrar = Arc::new(CommandRegistrar::new(
        tree,
        converters.clone(),
        Arc::new(remote),
        config.registration.debug_guild_id.into(),
    ));
    registrar.synchronize().await?;

    let mut errors = ErrorSubscribers::new();
    errors.subscribe(Arc::new(ErrorReply::new(http.clone(), application_id)));

    let dispatcher = Arc::new(InteractionDispatcher::new(
        converters,
        registrar,
        Arc::new(SlashExecutor::new(http.clone(), application_id)),
        errors,
    ));

    let gateway_config = twilight_gateway::Config::new(token, Intents::empty());
    let shards = twilight_gateway::create_recommended(&http, gateway_config, |_, b| b.build())
        .await?
        .collect::<Vec<_>>();

    info!("{} {} shard(s)", "Starting".fg_green().bold(), shards.len());

    let (tx, mut rx) = unbounded_channel::<Event>();
    for shard in shards {
        spawn(runner(shard, tx.clone()));
    }
    drop(tx);

    // commands were just synchronized, the first refresh comes from the initial connection
    let mut connected = false;

    while let Some(event) = rx.recv().await {
        let event = IncomingEvent::from(event);

        if matches!(event, IncomingEvent::RefreshCommands) && !connected {
            connected = true;
            debug!("Skipping refresh for the initial connection");
            continue;
        }

        let dispatcher = dispatcher.clone();
        spawn(async move {
            dispatcher.handle(event).await;
        });
    }

    Ok(())
}

async fn runner(mut shard: Shard, tx: UnboundedSender<Event>) {
    let flags = EventTypeFlags::INTERACTION_CREATE | EventTypeFlags::READY;

    while let Some(item) = shard.next_event(flags).await {
        match item {
            Ok(event) => {
                if tx.send(event).is_err() {
                    break;
                }
            },
            Err(e) => warn!("Shard {} failed to receive an event: {e}", shard.id()),
        }
    }
}
