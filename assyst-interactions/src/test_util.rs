//! Fakes shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use twilight_model::application::command::{Command as TwilightCommand, CommandOptionType};
use twilight_model::application::interaction::application_command::{CommandDataOption, CommandOptionValue};
use twilight_model::id::Id;

use crate::command::{ArgumentValue, DataType};
use crate::context::ConversionCtxt;
use crate::converter::builtin::candidates;
use crate::converter::{ArgumentConverter, ConverterRegistry};
use crate::errors::ConversionError;
use crate::event::InvocationEvent;
use crate::remote::{RegistrationScope, RemoteRegistry};

/// The built-in converters, minus the HTTP backed one.
pub fn converters() -> ConverterRegistry {
    let mut builder = ConverterRegistry::builder();
    builder.register_from_source(candidates(), None).unwrap();
    builder.build()
}

pub fn invocation(command_id: u64, options: Vec<CommandDataOption>) -> InvocationEvent {
    InvocationEvent {
        interaction_id: Id::new(1),
        interaction_token: "token".to_owned(),
        command_id: Id::new(command_id),
        command_name: String::new(),
        options,
        user_id: Some(Id::new(2)),
        channel_id: Some(Id::new(3)),
        guild_id: None,
    }
}

pub fn string(name: &str, value: &str) -> CommandDataOption {
    CommandDataOption {
        name: name.to_owned(),
        value: CommandOptionValue::String(value.to_owned()),
    }
}

pub fn integer(name: &str, value: i64) -> CommandDataOption {
    CommandDataOption {
        name: name.to_owned(),
        value: CommandOptionValue::Integer(value),
    }
}

pub fn subcommand(name: &str, options: Vec<CommandDataOption>) -> CommandDataOption {
    CommandDataOption {
        name: name.to_owned(),
        value: CommandOptionValue::SubCommand(options),
    }
}

pub fn subcommand_group(name: &str, options: Vec<CommandDataOption>) -> CommandDataOption {
    CommandDataOption {
        name: name.to_owned(),
        value: CommandOptionValue::SubCommandGroup(options),
    }
}

/// A string converter that refuses empty strings.
#[derive(Default)]
pub struct FailingStringConverter;

#[async_trait]
impl ArgumentConverter for FailingStringConverter {
    fn data_type(&self) -> DataType {
        DataType::of::<String>()
    }

    fn option_type(&self) -> CommandOptionType {
        CommandOptionType::String
    }

    async fn convert(&self, ctxt: &ConversionCtxt<'_>) -> Result<Option<ArgumentValue>, ConversionError> {
        match ctxt.value() {
            Some(CommandOptionValue::String(value)) if value.is_empty() => {
                Err(ConversionError::Other(anyhow::anyhow!("{} must not be empty", ctxt.argument.name)))
            },
            Some(CommandOptionValue::String(value)) => {
                let value: ArgumentValue = Arc::new(value.clone());
                Ok(Some(value))
            },
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
struct FakeRemoteState {
    ids: HashMap<String, u64>,
    forgotten: HashSet<String>,
    calls: usize,
    fail_next: bool,
    last_scope: Option<RegistrationScope>,
}

/// Hands out stable, sequential IDs per command name, like Discord does for overwrites.
pub struct FakeRemote {
    next_id: Mutex<u64>,
    state: Mutex<FakeRemoteState>,
}
impl FakeRemote {
    pub fn new(first_id: u64) -> Self {
        Self {
            next_id: Mutex::new(first_id),
            state: Mutex::new(FakeRemoteState::default()),
        }
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn last_scope(&self) -> Option<RegistrationScope> {
        self.state.lock().unwrap().last_scope
    }

    /// Leaves `name` out of every later response.
    pub fn forget(&self, name: &str) {
        self.state.lock().unwrap().forgotten.insert(name.to_owned());
    }

    pub fn fail_next(&self) {
        self.state.lock().unwrap().fail_next = true;
    }
}

#[async_trait]
impl RemoteRegistry for FakeRemote {
    async fn bulk_overwrite(
        &self,
        scope: RegistrationScope,
        commands: &[TwilightCommand],
    ) -> anyhow::Result<Vec<TwilightCommand>> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.last_scope = Some(scope);

        if std::mem::take(&mut state.fail_next) {
            anyhow::bail!("discord is down");
        }

        let mut registered = Vec::new();
        for command in commands {
            if state.forgotten.contains(&command.name) {
                continue;
            }

            let id = *state.ids.entry(command.name.clone()).or_insert_with(|| {
                let mut next_id = self.next_id.lock().unwrap();
                let id = *next_id;
                *next_id += 1;
                id
            });

            let mut command = command.clone();
            command.id = Some(Id::new(id));
            registered.push(command);
        }

        Ok(registered)
    }
}
