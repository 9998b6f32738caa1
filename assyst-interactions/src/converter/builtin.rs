//! Converters for the option types Discord natively supports.

use std::sync::Arc;

use async_trait::async_trait;
use twilight_http::Client as HttpClient;
use twilight_model::application::command::CommandOptionType;
use twilight_model::application::interaction::application_command::CommandOptionValue;
use twilight_model::id::marker::{AttachmentMarker, ChannelMarker, RoleMarker, UserMarker};
use twilight_model::id::Id;
use twilight_model::user::User;

use super::discovery::ConverterCandidate;
use super::{ArgumentConverter, TConverter};
use crate::command::{ArgumentValue, DataType};
use crate::context::ConversionCtxt;
use crate::errors::ConversionError;

fn mismatch(expected: CommandOptionType, found: &CommandOptionValue) -> ConversionError {
    ConversionError::MismatchedOptionType {
        expected,
        found: found.kind(),
    }
}

/// Generates a converter that copies a scalar option value straight out of the interaction.
macro_rules! scalar_converter {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $kind:ident, |$value:ident| $map:expr) => {
        $(#[$meta])*
        #[derive(Default)]
        pub struct $name;

        #[async_trait]
        impl ArgumentConverter for $name {
            fn data_type(&self) -> DataType {
                DataType::of::<$ty>()
            }

            fn option_type(&self) -> CommandOptionType {
                CommandOptionType::$kind
            }

            async fn convert(&self, ctxt: &ConversionCtxt<'_>) -> Result<Option<ArgumentValue>, ConversionError> {
                match ctxt.value() {
                    None => Ok(None),
                    Some(CommandOptionValue::$kind($value)) => {
                        let converted: $ty = $map;
                        let value: ArgumentValue = Arc::new(converted);
                        Ok(Some(value))
                    },
                    Some(other) => Err(mismatch(CommandOptionType::$kind, other)),
                }
            }
        }
    };
}

scalar_converter!(StringConverter, String, String, |value| value.clone());
scalar_converter!(IntegerConverter, i64, Integer, |value| *value);
scalar_converter!(
    /// Discord calls floating point options "numbers".
    NumberConverter,
    f64,
    Number,
    |value| *value
);
scalar_converter!(BooleanConverter, bool, Boolean, |value| *value);
scalar_converter!(UserIdConverter, Id<UserMarker>, User, |value| *value);
scalar_converter!(ChannelIdConverter, Id<ChannelMarker>, Channel, |value| *value);
scalar_converter!(RoleIdConverter, Id<RoleMarker>, Role, |value| *value);
scalar_converter!(AttachmentIdConverter, Id<AttachmentMarker>, Attachment, |value| *value);

/// Resolves a user option to the full user object over HTTP.
pub struct UserConverter {
    http: Arc<HttpClient>,
}
impl UserConverter {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ArgumentConverter for UserConverter {
    fn data_type(&self) -> DataType {
        DataType::of::<User>()
    }

    fn option_type(&self) -> CommandOptionType {
        CommandOptionType::User
    }

    async fn convert(&self, ctxt: &ConversionCtxt<'_>) -> Result<Option<ArgumentValue>, ConversionError> {
        let id = match ctxt.value() {
            None => return Ok(None),
            Some(CommandOptionValue::User(id)) => *id,
            Some(other) => return Err(mismatch(CommandOptionType::User, other)),
        };

        let user = self.http.user(id).await?.model().await?;
        let value: ArgumentValue = Arc::new(user);

        Ok(Some(value))
    }
}

fn construct_default<C: ArgumentConverter + Default + 'static>() -> anyhow::Result<TConverter> {
    let converter: TConverter = Arc::new(C::default());
    Ok(converter)
}

/// The built-in converters, ready to be passed to
/// [`ConverterRegistryBuilder::register_from_source`](super::ConverterRegistryBuilder::register_from_source).
///
/// [`UserConverter`] is only constructed when an `Arc<twilight_http::Client>` is available from the
/// services.
pub fn candidates() -> Vec<ConverterCandidate> {
    vec![
        ConverterCandidate::new("string").with_default(construct_default::<StringConverter>),
        ConverterCandidate::new("integer").with_default(construct_default::<IntegerConverter>),
        ConverterCandidate::new("number").with_default(construct_default::<NumberConverter>),
        ConverterCandidate::new("boolean").with_default(construct_default::<BooleanConverter>),
        ConverterCandidate::new("user id").with_default(construct_default::<UserIdConverter>),
        ConverterCandidate::new("channel id").with_default(construct_default::<ChannelIdConverter>),
        ConverterCandidate::new("role id").with_default(construct_default::<RoleIdConverter>),
        ConverterCandidate::new("attachment id").with_default(construct_default::<AttachmentIdConverter>),
        ConverterCandidate::new("user").with_injected(|services| {
            let converter: TConverter = Arc::new(UserConverter::new(services.require::<HttpClient>()?));
            Ok(converter)
        }),
    ]
}
