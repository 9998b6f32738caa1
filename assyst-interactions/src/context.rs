use std::any::Any;
use std::sync::Arc;

use twilight_model::application::interaction::application_command::{CommandDataOption, CommandOptionValue};
use twilight_model::id::marker::{ChannelMarker, GuildMarker, InteractionMarker, UserMarker};
use twilight_model::id::Id;

use crate::command::{ArgumentValue, Command, CommandArgument};
use crate::event::InvocationEvent;

/// What a converter gets to look at: the argument being converted, the option paired with it (if
/// the user supplied that many), and the surrounding invocation.
pub struct ConversionCtxt<'a> {
    pub event: &'a InvocationEvent,
    pub command: &'a Command,
    pub argument: &'a CommandArgument,
    /// Position of `argument` in the command's declared arguments.
    pub index: usize,
    option: Option<&'a CommandDataOption>,
}
impl<'a> ConversionCtxt<'a> {
    pub fn new(
        event: &'a InvocationEvent,
        command: &'a Command,
        argument: &'a CommandArgument,
        index: usize,
        option: Option<&'a CommandDataOption>,
    ) -> Self {
        Self {
            event,
            command,
            argument,
            index,
            option,
        }
    }

    pub fn option(&self) -> Option<&'a CommandDataOption> {
        self.option
    }

    pub fn value(&self) -> Option<&'a CommandOptionValue> {
        self.option.map(|x| &x.value)
    }
}

#[derive(Clone)]
pub struct ArgumentSlot {
    pub name: String,
    /// `None` when conversion stopped before reaching this argument.
    pub value: Option<ArgumentValue>,
    default: Option<ArgumentValue>,
}

/// Converted arguments, in declaration order and addressable by name.
#[derive(Clone, Default)]
pub struct Arguments {
    slots: Vec<ArgumentSlot>,
}
impl Arguments {
    /// Pairs `values` with the leading arguments of `command`. Arguments past the end of `values`
    /// are left unset.
    pub fn from_converted(command: &Command, values: Vec<ArgumentValue>) -> Self {
        let mut values = values.into_iter();
        let slots = command
            .arguments()
            .iter()
            .map(|argument| ArgumentSlot {
                name: argument.name.clone(),
                value: values.next(),
                default: argument.default.clone(),
            })
            .collect();

        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// How many arguments actually have a converted value.
    pub fn converted_count(&self) -> usize {
        self.slots.iter().filter(|x| x.value.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArgumentSlot> {
        self.slots.iter()
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.slot(name).is_some_and(|x| x.value.is_some())
    }

    /// The converted value of `name`, ignoring defaults.
    pub fn raw(&self, name: &str) -> Option<&ArgumentValue> {
        self.slot(name).and_then(|x| x.value.as_ref())
    }

    /// The value of `name`, falling back to the argument's declared default when it was not
    /// converted. `None` if unset with no default, or if `T` is the wrong type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        let slot = self.slot(name)?;
        slot.value.as_ref().or(slot.default.as_ref())?.downcast_ref::<T>()
    }

    fn slot(&self, name: &str) -> Option<&ArgumentSlot> {
        self.slots.iter().find(|x| x.name == name)
    }
}

/// Handed to the executor once an invocation has been resolved and converted. If conversion
/// failed, the same structure (with whatever was converted so far) goes to the error subscribers.
#[derive(Clone)]
pub struct ExecutionCtxt {
    pub interaction_id: Id<InteractionMarker>,
    pub interaction_token: String,
    pub user_id: Option<Id<UserMarker>>,
    pub channel_id: Option<Id<ChannelMarker>>,
    pub guild_id: Option<Id<GuildMarker>>,
    /// The leaf command that was resolved.
    pub command: Arc<Command>,
    /// Space separated path from the root, e.g. `config set`.
    pub qualified_name: String,
    pub arguments: Arguments,
}
impl ExecutionCtxt {
    pub fn new(event: &InvocationEvent, command: Arc<Command>, qualified_name: String, arguments: Arguments) -> Self {
        Self {
            interaction_id: event.interaction_id,
            interaction_token: event.interaction_token.clone(),
            user_id: event.user_id,
            channel_id: event.channel_id,
            guild_id: event.guild_id,
            command,
            qualified_name,
            arguments,
        }
    }
}
