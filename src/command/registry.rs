//! Type key to command constructor dispatch
//!
//! The registry holds no merge logic: it receives an already merged task
//! configuration and hands it to the constructor registered for the key.

use std::collections::HashMap;
use std::fmt;

use super::{
    AlwaysFailCommand, ArchiveCheckCommand, ArchiveCheckParams, ArchiveCreateCommand,
    ArchiveCreateParams, ArchivePruneCommand, ArchivePruneParams, Command, CommandContext,
    NoParams, SyncCommand, SyncParams,
};
use crate::config::{ConfigError, ConfigMap, ValueInjector};

/// Builds a command from a merged task configuration
pub type CommandConstructor = Box<dyn Fn(&ConfigMap) -> Result<Box<dyn Command>, ConfigError>>;

/// The built-in task types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    TestFail,
    Rclone,
    Backup,
    Prune,
    Check,
}

impl CommandType {
    pub const ALL: [CommandType; 5] = [
        CommandType::TestFail,
        CommandType::Rclone,
        CommandType::Backup,
        CommandType::Prune,
        CommandType::Check,
    ];

    /// Value of `type` selecting this command
    pub fn key(&self) -> &'static str {
        match self {
            CommandType::TestFail => "testfail",
            CommandType::Rclone => "rclone",
            CommandType::Backup => "backup",
            CommandType::Prune => "prune",
            CommandType::Check => "check",
        }
    }

    /// Returns the constructor for this type bound to the run's collaborators
    pub fn constructor(&self, ctx: CommandContext) -> CommandConstructor {
        match self {
            CommandType::TestFail => Box::new(|config: &ConfigMap| {
                ValueInjector::<NoParams>::new().build(config)?;
                Ok(Box::new(AlwaysFailCommand) as Box<dyn Command>)
            }),
            CommandType::Rclone => Box::new(move |config: &ConfigMap| {
                ValueInjector::<SyncParams>::new().build_into(config, |params| {
                    Ok(Box::new(SyncCommand::new(params, ctx.runner.clone())) as Box<dyn Command>)
                })
            }),
            CommandType::Backup => Box::new(move |config: &ConfigMap| {
                ValueInjector::<ArchiveCreateParams>::new().build_into(config, |params| {
                    let command =
                        ArchiveCreateCommand::new(params, &ctx.repositories, ctx.runner.clone())?;
                    Ok(Box::new(command) as Box<dyn Command>)
                })
            }),
            CommandType::Prune => Box::new(move |config: &ConfigMap| {
                ValueInjector::<ArchivePruneParams>::new().build_into(config, |params| {
                    let command =
                        ArchivePruneCommand::new(params, &ctx.repositories, ctx.runner.clone())?;
                    Ok(Box::new(command) as Box<dyn Command>)
                })
            }),
            CommandType::Check => Box::new(move |config: &ConfigMap| {
                ValueInjector::<ArchiveCheckParams>::new().build_into(config, |params| {
                    let command = ArchiveCheckCommand::new(
                        params,
                        &ctx.repositories,
                        ctx.notify.clone(),
                        ctx.runner.clone(),
                    )?;
                    Ok(Box::new(command) as Box<dyn Command>)
                })
            }),
        }
    }
}

/// Registered command constructors
#[derive(Default)]
pub struct CommandRegistry {
    constructors: HashMap<String, CommandConstructor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every [`CommandType`] registered
    pub fn with_builtin_types(ctx: &CommandContext) -> Self {
        let mut registry = Self::new();
        registry.add_types(
            CommandType::ALL
                .iter()
                .map(|kind| (kind.key(), kind.constructor(ctx.clone()))),
        );
        registry
    }

    /// Registers a constructor, replacing any previous one for the key
    pub fn add_type<F>(&mut self, key: impl Into<String>, constructor: F)
    where
        F: Fn(&ConfigMap) -> Result<Box<dyn Command>, ConfigError> + 'static,
    {
        self.constructors.insert(key.into(), Box::new(constructor));
    }

    pub fn add_types<I, K>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, CommandConstructor)>,
        K: Into<String>,
    {
        for (key, constructor) in pairs {
            self.constructors.insert(key.into(), constructor);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Builds a command; an unregistered key is an error
    pub fn create(&self, key: &str, config: &ConfigMap) -> Result<Box<dyn Command>, ConfigError> {
        let constructor = self
            .constructors
            .get(key)
            .ok_or_else(|| ConfigError::UnknownTaskType(key.to_string()))?;

        constructor(config)
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.constructors.keys().collect();
        keys.sort();
        f.debug_struct("CommandRegistry").field("types", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandError;
    use crate::config::{Repositories, RepositoryConfig};
    use crate::testing::{recording_notifications, RecordingRunner};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    struct Marker(&'static str);

    impl Command for Marker {
        fn execute(&self) -> Result<(), CommandError> {
            Err(CommandError::Timestamp(self.0.to_string()))
        }
    }

    fn marker_of(command: Box<dyn Command>) -> String {
        match command.execute() {
            Err(CommandError::Timestamp(marker)) => marker,
            _ => panic!("not a marker command"),
        }
    }

    fn context() -> (CommandContext, Rc<RecordingRunner>) {
        let mut entries = HashMap::new();
        entries.insert(
            "test".to_string(),
            RepositoryConfig {
                url: "test".to_string(),
                password: "test".to_string(),
            },
        );
        let runner = RecordingRunner::new();
        let (notify, _sent) = recording_notifications();
        let ctx = CommandContext {
            repositories: Rc::new(Repositories::new(entries)),
            notify,
            runner: runner.clone(),
        };
        (ctx, runner)
    }

    #[test]
    fn can_create_added_type() {
        let mut registry = CommandRegistry::new();
        registry.add_type("test-type", |_: &ConfigMap| {
            Ok(Box::new(Marker("task-created")) as Box<dyn Command>)
        });

        let command = registry.create("test-type", &ConfigMap::new()).unwrap();
        assert_eq!(marker_of(command), "task-created");
    }

    #[test]
    fn add_multiple_types() {
        let mut registry = CommandRegistry::new();
        let first: CommandConstructor = Box::new(|_: &ConfigMap| {
            Ok(Box::new(Marker("task-created")) as Box<dyn Command>)
        });
        let second: CommandConstructor = Box::new(|_: &ConfigMap| {
            Ok(Box::new(Marker("another-task-created")) as Box<dyn Command>)
        });
        registry.add_types([("test-type", first), ("another-type", second)]);

        let config = ConfigMap::new();
        assert_eq!(
            marker_of(registry.create("test-type", &config).unwrap()),
            "task-created"
        );
        assert_eq!(
            marker_of(registry.create("another-type", &config).unwrap()),
            "another-task-created"
        );
    }

    #[test]
    fn config_passed_to_constructor_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = seen.clone();
        let mut registry = CommandRegistry::new();
        registry.add_type("test-type", move |config: &ConfigMap| {
            recorder.borrow_mut().push(config.clone());
            Ok(Box::new(Marker("x")) as Box<dyn Command>)
        });
        let config = json!({"task-key": "task-value"}).as_object().unwrap().clone();

        registry.create("test-type", &config).unwrap();

        assert_eq!(*seen.borrow(), vec![config]);
    }

    #[test]
    fn unregistered_key_is_a_lookup_error() {
        let registry = CommandRegistry::new();

        let result = registry.create("missing", &ConfigMap::new());
        assert!(matches!(result, Err(ConfigError::UnknownTaskType(key)) if key == "missing"));
    }

    #[test]
    fn builtin_types_are_registered() {
        let (ctx, _runner) = context();
        let registry = CommandRegistry::with_builtin_types(&ctx);

        for kind in CommandType::ALL {
            assert!(registry.contains(kind.key()), "missing {}", kind.key());
        }
    }

    #[test]
    fn builtin_types_build_from_merged_config() {
        let (ctx, runner) = context();
        let registry = CommandRegistry::with_builtin_types(&ctx);
        let config = json!({
            "name": "test-task",
            "tags": [],
            "type": "test-type",
            "repository": "test",
            "repositories": [],
            "source": "/src",
            "destination": "remote:dst",
            "configFile": "/rclone.conf",
        });
        let config = config.as_object().unwrap();

        for kind in CommandType::ALL {
            assert!(registry.create(kind.key(), config).is_ok(), "{}", kind.key());
        }

        registry.create("rclone", config).unwrap().execute().unwrap();
        assert_eq!(runner.last().program, "rclone");
        registry.create("prune", config).unwrap().execute().unwrap();
        assert_eq!(runner.last().argv().last(), Some(&"test"));
    }

    #[test]
    fn builtin_backup_requires_known_repository() {
        let (ctx, _runner) = context();
        let registry = CommandRegistry::with_builtin_types(&ctx);
        let config = json!({"source": "/src", "repository": "nope"});

        let result = registry.create("backup", config.as_object().unwrap());
        assert!(matches!(result, Err(ConfigError::UnknownRepository(_))));
    }
}
