use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;

use super::TConverter;
use crate::errors::ConfigurationError;

pub type DefaultFactory = fn() -> anyhow::Result<TConverter>;
pub type InjectedFactory = fn(&Services) -> anyhow::Result<TConverter>;

/// One way of building a converter.
#[derive(Clone, Copy)]
pub enum ConstructionStrategy {
    /// Needs nothing from the outside.
    Default(DefaultFactory),
    /// Pulls its dependencies out of [`Services`]. Only tried after every `Default` strategy failed,
    /// and only if services were supplied at all.
    Injected(InjectedFactory),
}

/// A converter that might be registered, along with the ways it can be built.
#[derive(Clone)]
pub struct ConverterCandidate {
    pub name: &'static str,
    strategies: Vec<ConstructionStrategy>,
}
impl ConverterCandidate {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            strategies: vec![],
        }
    }

    #[must_use]
    pub fn with_default(mut self, factory: DefaultFactory) -> Self {
        self.strategies.push(ConstructionStrategy::Default(factory));
        self
    }

    #[must_use]
    pub fn with_injected(mut self, factory: InjectedFactory) -> Self {
        self.strategies.push(ConstructionStrategy::Injected(factory));
        self
    }

    /// A candidate with no strategies can never be built. These are filtered out during scanning.
    pub fn is_constructible(&self) -> bool {
        !self.strategies.is_empty()
    }

    pub fn construct(&self, services: Option<&Services>) -> Result<TConverter, ConfigurationError> {
        let defaults = self.strategies.iter().filter_map(|x| match x {
            ConstructionStrategy::Default(f) => Some(*f),
            ConstructionStrategy::Injected(_) => None,
        });
        let injected = self.strategies.iter().filter_map(|x| match x {
            ConstructionStrategy::Injected(f) => Some(*f),
            ConstructionStrategy::Default(_) => None,
        });

        let mut last_error = None;

        for factory in defaults {
            match factory() {
                Ok(converter) => return Ok(converter),
                Err(err) => last_error = Some(err),
            }
        }

        if let Some(services) = services {
            for factory in injected {
                match factory(services) {
                    Ok(converter) => return Ok(converter),
                    Err(err) => last_error = Some(err),
                }
            }
        }

        Err(ConfigurationError::ConverterConstructionFailure {
            candidate: self.name,
            cause: last_error.unwrap_or_else(|| anyhow!("no usable construction strategy")),
        })
    }
}

/// A minimal type-keyed service container, used to build converters that need shared clients.
#[derive(Clone, Default)]
pub struct Services {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}
impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, value: Arc<T>) {
        self.entries.insert(TypeId::of::<T>(), value);
    }

    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, value: Arc<T>) -> Self {
        self.insert(value);
        self
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|x| x.downcast::<T>().ok())
    }

    pub fn require<T: Any + Send + Sync>(&self) -> anyhow::Result<Arc<T>> {
        self.get::<T>()
            .ok_or_else(|| anyhow!("no service of type {} is available", type_name::<T>()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ConverterCandidate, Services};
    use crate::converter::builtin::StringConverter;
    use crate::converter::TConverter;
    use crate::errors::ConfigurationError;

    #[test]
    fn services_roundtrip_by_type() {
        let services = Services::new().with(Arc::new(String::from("client")));

        assert_eq!(services.get::<String>().as_deref().map(String::as_str), Some("client"));
        assert!(services.get::<u64>().is_none());
        assert!(services.require::<u64>().is_err());
    }

    #[test]
    fn injected_strategy_needs_services() {
        let candidate = ConverterCandidate::new("string").with_injected(|_| Ok(Arc::new(StringConverter) as TConverter));

        assert!(matches!(
            candidate.construct(None),
            Err(ConfigurationError::ConverterConstructionFailure { candidate: "string", .. })
        ));
        assert!(candidate.construct(Some(&Services::new())).is_ok());
    }

    #[test]
    fn default_is_tried_before_injected() {
        let candidate = ConverterCandidate::new("string")
            .with_injected(|_| Err(anyhow::anyhow!("should not run")))
            .with_default(|| Ok(Arc::new(StringConverter) as TConverter));

        assert!(candidate.construct(Some(&Services::new())).is_ok());
    }
}
