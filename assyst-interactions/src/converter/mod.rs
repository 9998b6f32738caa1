//! Argument converters and the registry that maps data types to them.
//!
//! A converter is looked up by the [`DataType`] of the argument it is asked to convert, and also
//! tells the registrar which Discord option type to register that argument as.
//!
//! Converters are collected with a [`ConverterRegistryBuilder`], either one at a time or by
//! scanning a list of [`discovery::ConverterCandidate`]s, and then frozen into a
//! [`ConverterRegistry`] that is shared read-only for the rest of the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use twilight_model::application::command::CommandOptionType;

use self::discovery::{ConverterCandidate, Services};
use crate::command::{ArgumentValue, CommandTree, DataType};
use crate::context::ConversionCtxt;
use crate::errors::{ConfigurationError, ConversionError};

pub mod builtin;
pub mod discovery;

// Stored as trait objects keyed by data type, so this still needs #[async_trait].
#[async_trait]
pub trait ArgumentConverter: Send + Sync {
    /// The type this converter produces.
    fn data_type(&self) -> DataType;

    /// The Discord option type arguments of [`Self::data_type`] are registered as.
    fn option_type(&self) -> CommandOptionType;

    /// Converts the option in `ctxt`.
    ///
    /// `Ok(None)` means "nothing to convert" and stops conversion of the remaining arguments
    /// without failing the invocation; this is how omitted trailing optional arguments end up
    /// unset. `Err` aborts the invocation.
    async fn convert(&self, ctxt: &ConversionCtxt<'_>) -> Result<Option<ArgumentValue>, ConversionError>;
}

pub type TConverter = Arc<dyn ArgumentConverter>;

#[derive(Default)]
pub struct ConverterRegistryBuilder {
    converters: HashMap<DataType, TConverter>,
}
impl ConverterRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter for its data type. Fails if that data type already has one; the
    /// existing converter stays registered.
    pub fn register(&mut self, converter: TConverter) -> Result<(), ConfigurationError> {
        let data_type = converter.data_type();
        if self.converters.contains_key(&data_type) {
            return Err(ConfigurationError::DuplicateConverter(data_type));
        }

        self.converters.insert(data_type, converter);
        Ok(())
    }

    /// Registers a converter, replacing and returning any converter that was registered for the
    /// same data type.
    pub fn replace(&mut self, converter: TConverter) -> Option<TConverter> {
        self.converters.insert(converter.data_type(), converter)
    }

    /// Constructs and registers every usable candidate.
    ///
    /// Candidates without any construction strategy are skipped, as are candidates whose
    /// strategies all fail (with a warning). Returns how many converters were registered.
    pub fn register_from_source(
        &mut self,
        candidates: impl IntoIterator<Item = ConverterCandidate>,
        services: Option<&Services>,
    ) -> Result<usize, ConfigurationError> {
        let mut registered = 0;

        for candidate in candidates {
            if !candidate.is_constructible() {
                debug!("Skipping converter candidate {} with no construction strategy", candidate.name);
                continue;
            }

            let converter = match candidate.construct(services) {
                Ok(converter) => converter,
                Err(err) => {
                    warn!("{err}");
                    continue;
                },
            };

            debug!(
                "Registering converter {} for {} ({:?})",
                candidate.name,
                converter.data_type(),
                converter.option_type()
            );
            self.register(converter)?;
            registered += 1;
        }

        Ok(registered)
    }

    pub fn build(self) -> ConverterRegistry {
        let option_types = self
            .converters
            .iter()
            .map(|(data_type, converter)| (*data_type, converter.option_type()))
            .collect();

        ConverterRegistry {
            converters: self.converters,
            option_types,
        }
    }
}

/// The finished, read-only converter registry.
pub struct ConverterRegistry {
    converters: HashMap<DataType, TConverter>,
    option_types: HashMap<DataType, CommandOptionType>,
}
impl ConverterRegistry {
    pub fn builder() -> ConverterRegistryBuilder {
        ConverterRegistryBuilder::new()
    }

    pub fn converter(&self, data_type: &DataType) -> Option<&TConverter> {
        self.converters.get(data_type)
    }

    pub fn option_type(&self, data_type: &DataType) -> Option<CommandOptionType> {
        self.option_types.get(data_type).copied()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Checks that every argument in the tree has a converter.
    pub fn validate(&self, tree: &CommandTree) -> Result<(), ConfigurationError> {
        for (name, command) in tree.walk() {
            for argument in command.arguments() {
                if !self.option_types.contains_key(&argument.data_type) {
                    return Err(ConfigurationError::MissingTypeMapping {
                        command: name,
                        argument: argument.name.clone(),
                        data_type: argument.data_type,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use twilight_model::application::command::CommandOptionType;

    use super::builtin::{IntegerConverter, StringConverter};
    use super::discovery::{ConverterCandidate, Services};
    use super::{ConverterRegistry, TConverter};
    use crate::command::{Command, CommandArgument, CommandTree, DataType};
    use crate::errors::ConfigurationError;
    use crate::test_util::FailingStringConverter;

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut builder = ConverterRegistry::builder();
        let first: TConverter = Arc::new(StringConverter);
        builder.register(first.clone()).unwrap();

        let err = builder.register(Arc::new(FailingStringConverter)).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateConverter(t) if t == DataType::of::<String>()));

        let registry = builder.build();
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(registry.converter(&DataType::of::<String>()).unwrap(), &first));
    }

    #[test]
    fn explicit_replace() {
        let mut builder = ConverterRegistry::builder();
        builder.register(Arc::new(StringConverter)).unwrap();

        let replacement: TConverter = Arc::new(FailingStringConverter);
        assert!(builder.replace(replacement.clone()).is_some());

        let registry = builder.build();
        assert!(Arc::ptr_eq(
            registry.converter(&DataType::of::<String>()).unwrap(),
            &replacement
        ));
    }

    #[test]
    fn build_maps_option_types() {
        let mut builder = ConverterRegistry::builder();
        builder.register(Arc::new(StringConverter)).unwrap();
        builder.register(Arc::new(IntegerConverter)).unwrap();
        let registry = builder.build();

        assert_eq!(
            registry.option_type(&DataType::of::<String>()),
            Some(CommandOptionType::String)
        );
        assert_eq!(
            registry.option_type(&DataType::of::<i64>()),
            Some(CommandOptionType::Integer)
        );
        assert_eq!(registry.option_type(&DataType::of::<bool>()), None);
    }

    #[test]
    fn scan_skips_broken_and_abstract_candidates() {
        let candidates = vec![
            ConverterCandidate::new("abstract"),
            ConverterCandidate::new("broken").with_default(|| Err(anyhow::anyhow!("nope"))),
            ConverterCandidate::new("string").with_default(|| Ok(Arc::new(StringConverter) as TConverter)),
        ];

        let mut builder = ConverterRegistry::builder();
        let registered = builder.register_from_source(candidates, None).unwrap();
        assert_eq!(registered, 1);
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn scan_falls_back_to_injection() {
        let candidates = vec![ConverterCandidate::new("string")
            .with_default(|| Err(anyhow::anyhow!("needs services")))
            .with_injected(|services| {
                services.require::<u32>()?;
                Ok(Arc::new(StringConverter) as TConverter)
            })];

        let services = Services::new().with(Arc::new(7u32));

        let mut builder = ConverterRegistry::builder();
        assert_eq!(builder.register_from_source(candidates, Some(&services)).unwrap(), 1);
    }

    #[test]
    fn scan_rejects_duplicates() {
        let candidates = vec![
            ConverterCandidate::new("a").with_default(|| Ok(Arc::new(StringConverter) as TConverter)),
            ConverterCandidate::new("b").with_default(|| Ok(Arc::new(FailingStringConverter) as TConverter)),
        ];

        let mut builder = ConverterRegistry::builder();
        assert!(matches!(
            builder.register_from_source(candidates, None),
            Err(ConfigurationError::DuplicateConverter(_))
        ));
    }

    #[test]
    fn validate_reports_missing_mapping() {
        let mut builder = ConverterRegistry::builder();
        builder.register(Arc::new(StringConverter)).unwrap();
        let registry = builder.build();

        let tree = CommandTree::new(vec![Command::group(
            "config",
            "configuration",
            vec![Command::leaf(
                "limit",
                "set a limit",
                vec![CommandArgument::required::<i64>("value", "the limit")],
            )],
        )]);

        match registry.validate(&tree) {
            Err(ConfigurationError::MissingTypeMapping { command, argument, .. }) => {
                assert_eq!(command, "config limit");
                assert_eq!(argument, "value");
            },
            _ => panic!("expected a missing type mapping"),
        }
    }
}
