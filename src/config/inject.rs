//! Parameter resolution for typed command parameters
//!
//! Every buildable target declares its parameter names and defaults through
//! [`Injectable`]. The injector picks one value per parameter from layered
//! sources and then deserializes the resolved mapping into the target.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ConfigError, ConfigMap};

/// A parameter set that can be built from configuration
pub trait Injectable: DeserializeOwned {
    /// Name used in error messages
    const TARGET: &'static str;

    /// Declared parameter names
    const PARAMETERS: &'static [&'static str];

    /// Declared default values (parameters without one fall back to `null`)
    fn defaults() -> ConfigMap {
        ConfigMap::new()
    }
}

/// Resolves values for an [`Injectable`] target
///
/// Resolution order per parameter: explicit overrides, then the passed
/// configuration, then declared defaults, then `null`. The first source that
/// contains the key wins, even when its value is `null`.
pub struct ValueInjector<T> {
    defaults: ConfigMap,
    overrides: ConfigMap,
    target: PhantomData<fn() -> T>,
}

impl<T: Injectable> ValueInjector<T> {
    pub fn new() -> Self {
        Self {
            defaults: T::defaults(),
            overrides: ConfigMap::new(),
            target: PhantomData,
        }
    }

    /// Registers override values
    pub fn provide_values(&mut self, values: ConfigMap) -> &mut Self {
        self.overrides.extend(values);
        self
    }

    /// Registers a single override value
    pub fn provide_value(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Picks a value for every declared parameter; never fails
    pub fn resolve(&self, config: &ConfigMap) -> ConfigMap {
        T::PARAMETERS
            .iter()
            .map(|&name| {
                let value = self
                    .overrides
                    .get(name)
                    .or_else(|| config.get(name))
                    .or_else(|| self.defaults.get(name))
                    .cloned()
                    .unwrap_or(Value::Null);
                (name.to_string(), value)
            })
            .collect()
    }

    /// Resolves values and builds the target
    ///
    /// Parameters that are only read at execution are `Option` fields, so a
    /// missing key never fails here. A `null` reaching a non-optional field
    /// (a repository name, for instance) is a configuration error.
    pub fn build(&self, config: &ConfigMap) -> Result<T, ConfigError> {
        let resolved = self.resolve(config);

        serde_json::from_value(Value::Object(resolved)).map_err(|source| {
            ConfigError::InvalidParameters {
                target: T::TARGET,
                source,
            }
        })
    }

    /// Builds the target and passes it to a constructor
    pub fn build_into<R>(
        &self,
        config: &ConfigMap,
        construct: impl FnOnce(T) -> Result<R, ConfigError>,
    ) -> Result<R, ConfigError> {
        construct(self.build(config)?)
    }
}

impl<T: Injectable> Default for ValueInjector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ValueInjector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Overrides may carry secrets
        f.debug_struct("ValueInjector")
            .field("defaults", &self.defaults.keys().collect::<Vec<_>>())
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}
