use std::any::{type_name, Any, TypeId};
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use twilight_model::guild::Permissions;

/// A converted argument value. Converters can produce any type; executors get it back with
/// [`crate::context::Arguments::get`].
pub type ArgumentValue = Arc<dyn Any + Send + Sync>;

/// Identifies the Rust type an argument is converted into.
///
/// Equality and hashing only consider the [`TypeId`]; the name is kept around for logs and error
/// messages.
#[derive(Clone, Copy)]
pub struct DataType {
    id: TypeId,
    name: &'static str,
}
impl DataType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for DataType {}
impl Hash for DataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({})", self.name)
    }
}
impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A single declared argument of a leaf command.
#[derive(Clone)]
pub struct CommandArgument {
    pub name: String,
    pub description: String,
    pub data_type: DataType,
    /// Having a default is what makes an argument optional.
    pub default: Option<ArgumentValue>,
}
impl CommandArgument {
    pub fn required<T: Any>(name: impl Display, description: impl Display) -> Self {
        Self {
            name: format!("{name}"),
            description: format!("{description}"),
            data_type: DataType::of::<T>(),
            default: None,
        }
    }

    pub fn optional<T: Any + Send + Sync>(name: impl Display, description: impl Display, default: T) -> Self {
        Self {
            default: Some(Arc::new(default)),
            ..Self::required::<T>(name, description)
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}
impl Debug for CommandArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandArgument")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("required", &self.is_required())
            .finish_non_exhaustive()
    }
}

/// Metadata that is sent along with a root command but never checked here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandAttributes {
    pub default_member_permissions: Option<Permissions>,
    pub nsfw: bool,
}

/// A node in the command tree.
///
/// A command is either a leaf, which has arguments and can be executed, or a group, which only
/// routes to its subcommands. [`Command::leaf`] and [`Command::group`] are the only constructors,
/// so a node can never be both.
#[derive(Clone, Debug)]
pub struct Command {
    pub name: String,
    pub description: String,
    pub attributes: CommandAttributes,
    arguments: Vec<CommandArgument>,
    subcommands: Vec<Arc<Command>>,
}
impl Command {
    pub fn leaf(name: impl Display, description: impl Display, arguments: Vec<CommandArgument>) -> Self {
        Self {
            name: format!("{name}"),
            description: format!("{description}"),
            attributes: CommandAttributes::default(),
            arguments,
            subcommands: vec![],
        }
    }

    pub fn group(name: impl Display, description: impl Display, subcommands: Vec<Command>) -> Self {
        Self {
            name: format!("{name}"),
            description: format!("{description}"),
            attributes: CommandAttributes::default(),
            arguments: vec![],
            subcommands: subcommands.into_iter().map(Arc::new).collect(),
        }
    }

    #[must_use]
    pub fn nsfw(mut self, nsfw: bool) -> Self {
        self.attributes.nsfw = nsfw;
        self
    }

    #[must_use]
    pub fn default_permissions(mut self, permissions: Permissions) -> Self {
        self.attributes.default_member_permissions = Some(permissions);
        self
    }

    pub fn arguments(&self) -> &[CommandArgument] {
        &self.arguments
    }

    pub fn subcommands(&self) -> &[Arc<Command>] {
        &self.subcommands
    }

    pub fn is_group(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Finds a direct subcommand by its exact (case-sensitive) name.
    pub fn subcommand(&self, name: &str) -> Option<&Arc<Command>> {
        self.subcommands.iter().find(|x| x.name == name)
    }
}

/// The full set of root commands authored by the bot.
#[derive(Clone, Debug, Default)]
pub struct CommandTree {
    roots: Vec<Arc<Command>>,
}
impl CommandTree {
    pub fn new(roots: Vec<Command>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn roots(&self) -> &[Arc<Command>] {
        &self.roots
    }

    pub fn root_by_name(&self, name: &str) -> Option<&Arc<Command>> {
        self.roots.iter().find(|x| x.name == name)
    }

    /// Every command in the tree, depth first, paired with its space-separated full name.
    pub fn walk(&self) -> Vec<(String, &Command)> {
        fn visit<'a>(prefix: Option<&str>, command: &'a Command, out: &mut Vec<(String, &'a Command)>) {
            let name = match prefix {
                Some(prefix) => format!("{prefix} {}", command.name),
                None => command.name.clone(),
            };

            for sub in command.subcommands() {
                visit(Some(&name), sub, out);
            }

            out.push((name, command));
        }

        let mut out = Vec::new();
        for root in &self.roots {
            visit(None, root, &mut out);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_identity() {
        assert_eq!(DataType::of::<String>(), DataType::of::<String>());
        assert_ne!(DataType::of::<String>(), DataType::of::<i64>());
        assert_eq!(DataType::of::<i64>().name(), "i64");
    }

    #[test]
    fn default_makes_argument_optional() {
        assert!(CommandArgument::required::<String>("key", "the key").is_required());
        assert!(!CommandArgument::optional::<i64>("times", "repeat count", 1).is_required());
    }

    #[test]
    fn subcommand_lookup_is_case_sensitive() {
        let group = Command::group("config", "config", vec![Command::leaf("set", "set", vec![])]);

        assert!(group.is_group());
        assert!(group.subcommand("set").is_some());
        assert!(group.subcommand("Set").is_none());
    }

    #[test]
    fn walk_visits_nested_commands() {
        let tree = CommandTree::new(vec![
            Command::leaf("ping", "ping", vec![]),
            Command::group(
                "tag",
                "tags",
                vec![Command::group("admin", "admin", vec![Command::leaf("purge", "purge", vec![])])],
            ),
        ]);

        let names = tree.walk().into_iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, vec!["ping", "tag admin purge", "tag admin", "tag"]);
    }
}
