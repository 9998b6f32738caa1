use std::collections::HashMap;
use std::sync::Arc;

use assyst_common::ansi::Ansi;
use tokio::sync::RwLock;
use tracing::{info, warn};
use twilight_model::application::command::{Command as TwilightCommand, CommandOption, CommandOptionType, CommandType};
use twilight_model::id::marker::CommandMarker;
use twilight_model::id::Id;
use twilight_util::builder::command::{CommandBuilder, SubCommandBuilder, SubCommandGroupBuilder};

use crate::command::{Command, CommandTree};
use crate::converter::ConverterRegistry;
use crate::errors::{ConfigurationError, RegistrationError};
use crate::remote::{RegistrationScope, RemoteRegistry};

/// Discord command ID → the root command it was registered for.
pub type RemoteCommandMap = HashMap<Id<CommandMarker>, Arc<Command>>;

/// The current [`RemoteCommandMap`]. It is never modified in place: a synchronisation builds a new
/// map and swaps it in, so a snapshot is always a complete map from one registration.
#[derive(Default)]
pub struct RemoteCommands(RwLock<Arc<RemoteCommandMap>>);
impl RemoteCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<RemoteCommandMap> {
        self.0.read().await.clone()
    }

    pub async fn publish(&self, map: RemoteCommandMap) {
        *self.0.write().await = Arc::new(map);
    }
}

/// Registers the command tree with Discord and keeps [`RemoteCommands`] in line with what was
/// registered.
pub struct CommandRegistrar {
    tree: Arc<CommandTree>,
    converters: Arc<ConverterRegistry>,
    remote: Arc<dyn RemoteRegistry>,
    scope: RegistrationScope,
    commands: Arc<RemoteCommands>,
}
impl CommandRegistrar {
    pub fn new(
        tree: Arc<CommandTree>,
        converters: Arc<ConverterRegistry>,
        remote: Arc<dyn RemoteRegistry>,
        scope: RegistrationScope,
    ) -> Self {
        Self {
            tree,
            converters,
            remote,
            scope,
            commands: Arc::new(RemoteCommands::new()),
        }
    }

    pub fn commands(&self) -> &Arc<RemoteCommands> {
        &self.commands
    }

    pub fn tree(&self) -> &Arc<CommandTree> {
        &self.tree
    }

    pub fn scope(&self) -> RegistrationScope {
        self.scope
    }

    /// Overwrites every registered command with the local tree and publishes the resulting ID map.
    /// Returns the number of commands in the new map.
    ///
    /// Nothing is published if serialisation or the request fails; the previous map stays.
    pub async fn synchronize(&self) -> Result<usize, RegistrationError> {
        let descriptors = describe_tree(&self.tree, &self.converters)?;

        let registered = self
            .remote
            .bulk_overwrite(self.scope, &descriptors)
            .await
            .map_err(RegistrationError::Remote)?;

        let map = map_registered(&self.tree, registered);
        let count = map.len();

        let names = self
            .tree
            .roots()
            .iter()
            .map(|x| x.name.fg_blue())
            .collect::<Vec<_>>()
            .join(", ");
        info!("{} {} commands with [{names}]", "Registered".fg_green(), self.scope);

        self.commands.publish(map).await;

        Ok(count)
    }
}

/// Serialises the whole tree into Discord's command schema.
pub fn describe_tree(
    tree: &CommandTree,
    converters: &ConverterRegistry,
) -> Result<Vec<TwilightCommand>, ConfigurationError> {
    tree.roots()
        .iter()
        .map(|root| describe_root(root, converters))
        .collect()
}

fn describe_root(root: &Command, converters: &ConverterRegistry) -> Result<TwilightCommand, ConfigurationError> {
    let mut builder = CommandBuilder::new(root.name.clone(), root.description.clone(), CommandType::ChatInput)
        .nsfw(root.attributes.nsfw);

    if let Some(permissions) = root.attributes.default_member_permissions {
        builder = builder.default_member_permissions(permissions);
    }

    for option in describe_options(&root.name, root, converters)? {
        builder = builder.option(option);
    }

    Ok(builder.build())
}

/// Options of `command`: one per argument for a leaf, one per subcommand for a group.
fn describe_options(
    path: &str,
    command: &Command,
    converters: &ConverterRegistry,
) -> Result<Vec<CommandOption>, ConfigurationError> {
    if !command.is_group() {
        return describe_arguments(path, command, converters);
    }

    command
        .subcommands()
        .iter()
        .map(|sub| -> Result<CommandOption, ConfigurationError> {
            let path = format!("{path} {}", sub.name);

            if !sub.is_group() {
                return Ok(describe_subcommand(&path, sub, converters)?.build());
            }

            // a group inside a group is registered as a subcommand group
            let subcommands = sub
                .subcommands()
                .iter()
                .map(|leaf| describe_subcommand(&format!("{path} {}", leaf.name), leaf, converters))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(SubCommandGroupBuilder::new(sub.name.clone(), sub.description.clone())
                .subcommands(subcommands)
                .build())
        })
        .collect()
}

fn describe_subcommand(
    path: &str,
    command: &Command,
    converters: &ConverterRegistry,
) -> Result<SubCommandBuilder, ConfigurationError> {
    let mut subcommand = SubCommandBuilder::new(command.name.clone(), command.description.clone());

    for option in describe_options(path, command, converters)? {
        subcommand = subcommand.option(option);
    }

    Ok(subcommand)
}

fn describe_arguments(
    path: &str,
    command: &Command,
    converters: &ConverterRegistry,
) -> Result<Vec<CommandOption>, ConfigurationError> {
    command
        .arguments()
        .iter()
        .map(|argument| {
            let kind = converters
                .option_type(&argument.data_type)
                .ok_or_else(|| ConfigurationError::MissingTypeMapping {
                    command: path.to_owned(),
                    argument: argument.name.clone(),
                    data_type: argument.data_type,
                })?;

            let mut option = empty_option(kind, &argument.name, &argument.description);
            option.required = Some(argument.is_required());
            Ok(option)
        })
        .collect()
}

/// Argument options, whose kind is only known once the converter is looked up.
fn empty_option(kind: CommandOptionType, name: &str, description: &str) -> CommandOption {
    CommandOption {
        autocomplete: None,
        channel_types: None,
        choices: None,
        description: description.to_owned(),
        description_localizations: None,
        kind,
        max_length: None,
        max_value: None,
        min_length: None,
        min_value: None,
        name: name.to_owned(),
        name_localizations: None,
        options: None,
        required: None,
    }
}

/// Matches the commands Discord returned back to local roots by name.
fn map_registered(tree: &CommandTree, registered: Vec<TwilightCommand>) -> RemoteCommandMap {
    let mut map = HashMap::new();

    for command in registered {
        let Some(id) = command.id else {
            warn!("Discord returned command {} without an id, ignoring", command.name);
            continue;
        };

        match tree.root_by_name(&command.name) {
            Some(root) => {
                map.insert(id, root.clone());
            },
            None => warn!(
                "Discord returned command {} ({id}) which is not in the local command tree, ignoring",
                command.name
            ),
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use twilight_model::guild::Permissions;

    use super::*;
    use crate::command::CommandArgument;
    use crate::resolver::resolve;
    use crate::test_util::{converters, FakeRemote};

    fn tree() -> Arc<CommandTree> {
        Arc::new(CommandTree::new(vec![
            Command::leaf("ping", "pong", vec![]).default_permissions(Permissions::SEND_MESSAGES),
            Command::group(
                "config",
                "configuration",
                vec![Command::leaf(
                    "set",
                    "set a key",
                    vec![
                        CommandArgument::required::<String>("key", "the key"),
                        CommandArgument::optional::<i64>("ttl", "expiry", 0),
                    ],
                )],
            ),
        ]))
    }

    #[test]
    fn describes_nested_options() {
        let described = describe_tree(&tree(), &converters()).unwrap();
        assert_eq!(described.len(), 2);

        let ping = &described[0];
        assert_eq!(ping.name, "ping");
        assert!(ping.options.is_empty());
        assert_eq!(ping.default_member_permissions, Some(Permissions::SEND_MESSAGES));

        let config = &described[1];
        let set = &config.options[0];
        assert_eq!(set.kind, CommandOptionType::SubCommand);

        let args = set.options.as_ref().unwrap();
        assert_eq!(args[0].name, "key");
        assert_eq!(args[0].kind, CommandOptionType::String);
        assert_eq!(args[0].required, Some(true));
        assert_eq!(args[1].kind, CommandOptionType::Integer);
        assert_eq!(args[1].required, Some(false));
    }

    #[test]
    fn nested_groups_become_subcommand_groups() {
        let tree = CommandTree::new(vec![Command::group(
            "tag",
            "tags",
            vec![Command::group("admin", "admin", vec![Command::leaf("purge", "purge", vec![])])],
        )]);

        let described = describe_tree(&tree, &converters()).unwrap();
        let admin = &described[0].options[0];
        assert_eq!(admin.kind, CommandOptionType::SubCommandGroup);
        assert_eq!(admin.options.as_ref().unwrap()[0].kind, CommandOptionType::SubCommand);
    }

    #[tokio::test]
    async fn missing_type_mapping_fails_before_request() {
        let tree = Arc::new(CommandTree::new(vec![Command::leaf(
            "flip",
            "flip a coin",
            vec![CommandArgument::required::<u8>("sides", "sides")],
        )]));
        let remote = Arc::new(FakeRemote::new(100));
        let registrar = CommandRegistrar::new(tree, Arc::new(converters()), remote.clone(), RegistrationScope::Global);

        let err = registrar.synchronize().await.unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::Configuration(ConfigurationError::MissingTypeMapping { .. })
        ));
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn synchronize_maps_ids_to_roots() {
        let remote = Arc::new(FakeRemote::new(10));
        let registrar = CommandRegistrar::new(tree(), Arc::new(converters()), remote, RegistrationScope::Global);

        assert_eq!(registrar.synchronize().await.unwrap(), 2);

        let map = registrar.commands().snapshot().await;
        for (name, id) in [("ping", 10), ("config", 11)] {
            let resolved = resolve(&map, Id::new(id), &[]).unwrap();
            assert_eq!(resolved.command.name, name);
        }
    }

    #[tokio::test]
    async fn synchronize_is_idempotent() {
        let remote = Arc::new(FakeRemote::new(10));
        let registrar = CommandRegistrar::new(tree(), Arc::new(converters()), remote.clone(), RegistrationScope::Global);

        registrar.synchronize().await.unwrap();
        let first = registrar.commands().snapshot().await;
        registrar.synchronize().await.unwrap();
        let second = registrar.commands().snapshot().await;

        assert_eq!(remote.calls(), 2);
        assert_eq!(first.len(), second.len());
        for (id, command) in first.iter() {
            assert!(Arc::ptr_eq(command, &second[id]));
        }
    }

    #[tokio::test]
    async fn removed_commands_drop_out_of_the_map() {
        let remote = Arc::new(FakeRemote::new(10));
        let registrar = CommandRegistrar::new(tree(), Arc::new(converters()), remote.clone(), RegistrationScope::Global);
        registrar.synchronize().await.unwrap();

        // discord forgets about "config", e.g. it was removed from the tree on another instance
        remote.forget("config");
        registrar.synchronize().await.unwrap();

        let map = registrar.commands().snapshot().await;
        assert!(resolve(&map, Id::new(10), &[]).is_ok());
        assert!(resolve(&map, Id::new(11), &[]).is_err());
    }

    #[tokio::test]
    async fn failed_request_keeps_previous_map() {
        let remote = Arc::new(FakeRemote::new(10));
        let registrar = CommandRegistrar::new(tree(), Arc::new(converters()), remote.clone(), RegistrationScope::Global);
        registrar.synchronize().await.unwrap();

        remote.fail_next();
        assert!(matches!(registrar.synchronize().await, Err(RegistrationError::Remote(_))));
        assert_eq!(registrar.commands().snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn scope_is_forwarded() {
        let remote = Arc::new(FakeRemote::new(10));
        let scope = RegistrationScope::Guild(Id::new(42));
        let registrar = CommandRegistrar::new(tree(), Arc::new(converters()), remote.clone(), scope);
        registrar.synchronize().await.unwrap();

        assert_eq!(remote.last_scope(), Some(scope));
    }
}
