use std::sync::Arc;

use twilight_model::application::interaction::application_command::{CommandDataOption, CommandOptionValue};
use twilight_model::id::marker::CommandMarker;
use twilight_model::id::Id;

use crate::command::Command;
use crate::errors::ResolveError;
use crate::registrar::RemoteCommandMap;

/// The leaf command an interaction is meant for.
#[derive(Debug)]
pub struct ResolvedCommand<'a> {
    pub command: Arc<Command>,
    /// e.g. `config set`
    pub qualified_name: String,
    /// The options belonging to the leaf, i.e. its arguments.
    pub options: &'a [CommandDataOption],
}

/// Finds the root registered under `command_id`, then follows subcommand and subcommand group
/// options down to the leaf.
///
/// Interactions only carry the root command's ID; which subcommand was used is encoded as a chain
/// of single `SubCommandGroup`/`SubCommand` options, each nesting the next level's options.
pub fn resolve<'a>(
    commands: &RemoteCommandMap,
    command_id: Id<CommandMarker>,
    options: &'a [CommandDataOption],
) -> Result<ResolvedCommand<'a>, ResolveError> {
    let mut command = commands
        .get(&command_id)
        .cloned()
        .ok_or(ResolveError::UnknownCommandIdentifier(command_id))?;
    let mut qualified_name = command.name.clone();
    let mut options = options;

    while let Some(option) = options.first() {
        let nested = match &option.value {
            CommandOptionValue::SubCommand(nested) | CommandOptionValue::SubCommandGroup(nested) => nested,
            _ => break,
        };

        let next = command
            .subcommand(&option.name)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownSubcommandName {
                parent: qualified_name.clone(),
                name: option.name.clone(),
            })?;

        qualified_name.push(' ');
        qualified_name.push_str(&next.name);
        command = next;
        options = nested.as_slice();
    }

    Ok(ResolvedCommand {
        command,
        qualified_name,
        options,
    })
}
