use std::fmt::Display;

use tracing::{debug, trace};
use twilight_model::application::interaction::application_command::CommandDataOption;

use crate::command::{ArgumentValue, Command};
use crate::context::ConversionCtxt;
use crate::converter::ConverterRegistry;
use crate::errors::ConversionError;
use crate::event::InvocationEvent;

/// A converter failed partway through an invocation.
#[derive(Debug)]
pub struct ConversionFailure {
    /// Values converted before the failing argument, in order.
    pub converted: Vec<ArgumentValue>,
    /// Index of the failing argument; equal to `converted.len()`.
    pub index: usize,
    pub argument: String,
    pub error: ConversionError,
}
impl Display for ConversionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to convert argument {} ({}): {}", self.argument, self.index, self.error)
    }
}
impl std::error::Error for ConversionFailure {}

/// Converts the leaf's options into argument values.
///
/// Arguments are taken in declaration order and paired with options in the order Discord sent
/// them. An option whose name does not match the argument in its slot is not handed to that
/// argument's converter. Stops early, without failing, at the first converter that produces no
/// value; everything after that is left unset.
pub async fn convert_arguments(
    converters: &ConverterRegistry,
    event: &InvocationEvent,
    command: &Command,
    options: &[CommandDataOption],
) -> Result<Vec<ArgumentValue>, ConversionFailure> {
    let mut converted = Vec::with_capacity(command.arguments().len());

    for (index, argument) in command.arguments().iter().enumerate() {
        let Some(converter) = converters.converter(&argument.data_type) else {
            return Err(ConversionFailure {
                converted,
                index,
                argument: argument.name.clone(),
                error: ConversionError::MissingConverter(argument.data_type),
            });
        };

        // an omitted optional argument shifts every later option up one slot
        let option = match options.get(index) {
            Some(option) if option.name != argument.name => {
                debug!(
                    "Option {} was supplied where {} was expected, treating {} as omitted",
                    option.name, argument.name, argument.name
                );
                None
            },
            option => option,
        };

        let ctxt = ConversionCtxt::new(event, command, argument, index, option);

        match converter.convert(&ctxt).await {
            Ok(Some(value)) => converted.push(value),
            Ok(None) => {
                trace!("{} produced no value for {}, stopping", argument.data_type, argument.name);
                break;
            },
            Err(error) => {
                return Err(ConversionFailure {
                    converted,
                    index,
                    argument: argument.name.clone(),
                    error,
                });
            },
        }
    }

    Ok(converted)
}
