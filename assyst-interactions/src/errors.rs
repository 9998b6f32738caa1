use std::fmt::Display;

use twilight_http::response::DeserializeBodyError;
use twilight_model::application::command::CommandOptionType;
use twilight_model::id::marker::CommandMarker;
use twilight_model::id::Id;

use crate::command::DataType;

/// Problems with how the converters or the command tree were put together.
#[derive(Debug)]
pub enum ConfigurationError {
    /// An argument uses a data type that no converter handles.
    MissingTypeMapping {
        command: String,
        argument: String,
        data_type: DataType,
    },
    /// A second converter was registered for a data type without asking to replace the first.
    DuplicateConverter(DataType),
    /// None of a converter candidate's construction strategies worked. Logged and skipped.
    ConverterConstructionFailure {
        candidate: &'static str,
        cause: anyhow::Error,
    },
}
impl Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTypeMapping {
                command,
                argument,
                data_type,
            } => write!(
                f,
                "argument {argument} of command {command} has type {data_type}, which has no converter"
            ),
            Self::DuplicateConverter(data_type) => {
                write!(f, "a converter for {data_type} is already registered")
            },
            Self::ConverterConstructionFailure { candidate, cause } => {
                write!(f, "failed to construct converter {candidate}: {cause}")
            },
        }
    }
}
impl std::error::Error for ConfigurationError {}

#[derive(Debug)]
pub enum RegistrationError {
    Configuration(ConfigurationError),
    /// The bulk overwrite request itself failed.
    Remote(anyhow::Error),
}
impl Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "invalid command configuration: {err}"),
            Self::Remote(err) => write!(f, "failed to register commands with discord: {err}"),
        }
    }
}
impl std::error::Error for RegistrationError {}

impl From<ConfigurationError> for RegistrationError {
    fn from(v: ConfigurationError) -> Self {
        Self::Configuration(v)
    }
}

/// An interaction could not be traced back to a local command. This means the registered commands
/// are out of date, not that the user did something wrong.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolveError {
    UnknownCommandIdentifier(Id<CommandMarker>),
    UnknownSubcommandName { parent: String, name: String },
}
impl Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCommandIdentifier(id) => write!(f, "no command is registered with id {id}"),
            Self::UnknownSubcommandName { parent, name } => {
                write!(f, "command {parent} has no subcommand named {name}")
            },
        }
    }
}
impl std::error::Error for ResolveError {}

/// Raised by a converter. Aborts the rest of the invocation.
#[derive(Debug)]
pub enum ConversionError {
    MismatchedOptionType {
        expected: CommandOptionType,
        found: CommandOptionType,
    },
    MissingConverter(DataType),
    TwilightHttp(Box<twilight_http::Error>),
    TwilightDeserialize(Box<DeserializeBodyError>),
    Other(anyhow::Error),
}
impl Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MismatchedOptionType { expected, found } => {
                write!(f, "expected a {expected:?} option but got {found:?}")
            },
            Self::MissingConverter(data_type) => write!(f, "no converter is registered for {data_type}"),
            Self::TwilightHttp(_) => f.write_str("failed to send a request to discord"),
            Self::TwilightDeserialize(_) => f.write_str("failed to parse a response from discord"),
            Self::Other(err) => write!(f, "{err}"),
        }
    }
}
impl std::error::Error for ConversionError {}

impl From<twilight_http::Error> for ConversionError {
    fn from(v: twilight_http::Error) -> Self {
        Self::TwilightHttp(Box::new(v))
    }
}

impl From<DeserializeBodyError> for ConversionError {
    fn from(v: DeserializeBodyError) -> Self {
        Self::TwilightDeserialize(Box::new(v))
    }
}

impl From<anyhow::Error> for ConversionError {
    fn from(v: anyhow::Error) -> Self {
        Self::Other(v)
    }
}
