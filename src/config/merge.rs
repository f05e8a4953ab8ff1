//! Merging of type sections with task entries

use std::rc::Rc;

use super::{ConfigError, ConfigMap, RootConfig};

/// Overlays a task entry on top of a named section of the root config
#[derive(Debug, Clone)]
pub struct TaskConfigMerger {
    config: Rc<RootConfig>,
}

impl TaskConfigMerger {
    pub fn new(config: Rc<RootConfig>) -> Self {
        Self { config }
    }

    /// Returns a new mapping: section values first, task values winning
    ///
    /// An absent section behaves like an empty one.
    pub fn merge_with_task_config(&self, section: &str, task_config: &ConfigMap) -> ConfigMap {
        let mut merged = self.config.section(section).cloned().unwrap_or_default();

        for (key, value) in task_config {
            merged.insert(key.clone(), value.clone());
        }

        merged
    }
}

type Build<T> = Box<dyn Fn(&ConfigMap) -> Result<T, ConfigError>>;
type Merge = Box<dyn Fn(&ConfigMap) -> Result<ConfigMap, ConfigError>>;

/// Builds items from task entries after running them through a merge step
pub struct MergingTaskFactory<T> {
    factory: Build<T>,
    merger: Merge,
}

impl<T> MergingTaskFactory<T> {
    pub fn new<F, M>(factory: F, merger: M) -> Self
    where
        F: Fn(&ConfigMap) -> Result<T, ConfigError> + 'static,
        M: Fn(&ConfigMap) -> Result<ConfigMap, ConfigError> + 'static,
    {
        Self {
            factory: Box::new(factory),
            merger: Box::new(merger),
        }
    }

    /// Merges the entry and hands the result to the backing factory
    pub fn create(&self, task_config: &ConfigMap) -> Result<T, ConfigError> {
        let merged = (self.merger)(task_config)?;
        (self.factory)(&merged)
    }
}
