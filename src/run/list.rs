//! Lazily constructed, filterable task sequence
//!
//! Nothing is cached: every iteration builds each task afresh from its
//! configuration entry, then applies the current filter.

use std::collections::BTreeSet;
use std::fmt;

use super::Tagged;
use crate::config::{ConfigError, ConfigMap};

type Build<T> = Box<dyn Fn(&ConfigMap) -> Result<T, ConfigError>>;
type Filter<T> = Box<dyn Fn(&T) -> bool>;

pub struct TaskList<T> {
    factory: Build<T>,
    configs: Vec<ConfigMap>,
    filter: Filter<T>,
}

impl<T> TaskList<T> {
    /// Creates a list accepting every task
    pub fn new<F>(factory: F, configs: Vec<ConfigMap>) -> Self
    where
        F: Fn(&ConfigMap) -> Result<T, ConfigError> + 'static,
    {
        Self {
            factory: Box::new(factory),
            configs,
            filter: Box::new(|_| true),
        }
    }

    /// Builds every task in order and yields those passing the filter
    ///
    /// Construction errors are always yielded.
    pub fn iter(&self) -> impl Iterator<Item = Result<T, ConfigError>> + '_ {
        self.configs
            .iter()
            .map(move |config| (self.factory)(config))
            .filter(move |task| match task {
                Ok(task) => (self.filter)(task),
                Err(_) => true,
            })
    }

    /// Builds every task once, ignoring the filter, and reports the first error
    pub fn validate(&self) -> Result<(), ConfigError> {
        for config in &self.configs {
            (self.factory)(config)?;
        }
        Ok(())
    }

    /// Number of configuration entries (before filtering)
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl<T: Tagged> TaskList<T> {
    /// Replaces the filter with "carries at least one of `tags`"
    pub fn filter_by_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        self.filter = Box::new(move |task| task.is_active(&tags));
    }
}

impl<T> fmt::Debug for TaskList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskList")
            .field("entries", &self.configs.len())
            .finish_non_exhaustive()
    }
}
