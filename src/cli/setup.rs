//! Wiring of one run from a loaded configuration

use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::command::{CommandContext, CommandRegistry, ProcessRunner, SystemRunner};
use crate::config::{
    task_type, ConfigError, ConfigMap, MergingTaskFactory, RootConfig, TaskConfigMerger,
    ValueInjector,
};
use crate::notify::{NotificationFormat, Notifications, XmppParams, XmppSender, PASSWORD_ENV};
use crate::run::{execute_tasks, report_summary, RunSummary, Task, TaskList, TaskParams};

/// Section holding the notification account
pub const NOTIFICATION_KEY: &str = "XMPP";

/// Owns the collaborators shared by every task of a run
pub struct ProgramSetup {
    config: Rc<RootConfig>,
    notify: Rc<Notifications>,
    runner: Rc<dyn ProcessRunner>,
}

impl ProgramSetup {
    /// Production wiring: XMPP notifications and real processes
    pub fn new(config: RootConfig) -> Result<Self> {
        let password = std::env::var(PASSWORD_ENV).ok();
        let sender = Self::notification_sender(&config, password)?;
        let notify = Notifications::new(Box::new(sender), NotificationFormat::default());

        Ok(Self::with_collaborators(config, notify, Rc::new(SystemRunner)))
    }

    /// Wiring with caller-provided notifications and process runner
    pub fn with_collaborators(
        config: RootConfig,
        notify: Notifications,
        runner: Rc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            config: Rc::new(config),
            notify: Rc::new(notify),
            runner,
        }
    }

    /// Builds the XMPP sender from its section; `password` wins over the file
    pub fn notification_sender(config: &RootConfig, password: Option<String>) -> Result<XmppSender> {
        let section = config
            .section(NOTIFICATION_KEY)
            .cloned()
            .unwrap_or_default();

        let mut injector = ValueInjector::<XmppParams>::new();
        if let Some(password) = password {
            debug!("Using XMPP password from {}", PASSWORD_ENV);
            injector.provide_value("password", password);
        }

        let params = injector
            .build(&section)
            .with_context(|| format!("Invalid [{}] section", NOTIFICATION_KEY))?;

        XmppSender::new(params).context("Invalid notification account")
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    pub fn notify(&self) -> Rc<Notifications> {
        self.notify.clone()
    }

    /// Registry with all built-in task types
    pub fn command_registry(&self) -> Result<CommandRegistry, ConfigError> {
        let ctx = CommandContext {
            repositories: Rc::new(self.config.repositories()?),
            notify: self.notify.clone(),
            runner: self.runner.clone(),
        };

        Ok(CommandRegistry::with_builtin_types(&ctx))
    }

    /// Factory merging each entry with the section named by its `type`
    pub fn task_factory(&self) -> Result<MergingTaskFactory<Task>, ConfigError> {
        let registry = self.command_registry()?;
        let notify = self.notify.clone();

        let build = move |config: &ConfigMap| -> Result<Task, ConfigError> {
            let command = registry.create(task_type(config)?, config)?;
            let params = ValueInjector::<TaskParams>::new().build(config)?;
            Ok(Task::from_params(params, command, notify.clone()))
        };

        let merger = TaskConfigMerger::new(self.config.clone());
        let merge = move |config: &ConfigMap| -> Result<ConfigMap, ConfigError> {
            Ok(merger.merge_with_task_config(task_type(config)?, config))
        };

        Ok(MergingTaskFactory::new(build, merge))
    }

    /// Lazy list over the `tasks` entries
    pub fn task_list(&self) -> Result<TaskList<Task>, ConfigError> {
        let factory = self.task_factory()?;
        let entries = self.config.tasks()?;

        Ok(TaskList::new(move |config| factory.create(config), entries))
    }

    /// Validates every task, runs the selected ones and reports the outcome
    pub fn run(&self, tags: &[String]) -> Result<RunSummary> {
        let mut task_list = self.task_list()?;
        task_list.validate().context("Invalid task configuration")?;

        let summary = execute_tasks(&mut task_list, tags)?;
        report_summary(&self.notify, &summary).context("Failed to send summary notification")?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandType;
    use crate::run::SUCCESS_MESSAGE;
    use crate::testing::{RecordingRunner, RecordingSender};
    use serde_json::json;
    use std::cell::RefCell;

    fn config() -> ConfigMap {
        json!({
            "XMPP": {
                "account": "test-sender@example.net",
                "password": "test-password",
                "recipient": "test-recipient@example.net",
            },
            "repositories": {"test": {"url": "test-url", "password": "test"}},
            "backup": {"repository": "test"},
            "prune": {"repository": "test"},
            "check": {"repositories": []},
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn setup(config: ConfigMap) -> (ProgramSetup, Rc<RecordingRunner>, Rc<RefCell<Vec<String>>>) {
        let sender = RecordingSender::default();
        let sent = sender.sent.clone();
        let notify = Notifications::new(Box::new(sender), NotificationFormat::new(false));
        let runner = RecordingRunner::new();
        let setup =
            ProgramSetup::with_collaborators(RootConfig::from_map(config), notify, runner.clone());
        (setup, runner, sent)
    }

    fn with_tasks(tasks: serde_json::Value) -> ConfigMap {
        let mut config = config();
        config.insert("tasks".to_string(), tasks);
        config
    }

    #[test]
    fn create_notification_sender() {
        let root = RootConfig::from_map(config());

        let sender = ProgramSetup::notification_sender(&root, None).unwrap();
        assert_eq!(sender.account().to_string(), "test-sender@example.net");
    }

    #[test]
    fn notification_sender_requires_section() {
        let root = RootConfig::default();

        assert!(ProgramSetup::notification_sender(&root, None).is_err());
    }

    #[test]
    fn notification_password_can_come_from_override() {
        let mut config = config();
        config["XMPP"].as_object_mut().unwrap().remove("password");
        let root = RootConfig::from_map(config);

        assert!(ProgramSetup::notification_sender(&root, None).is_err());
        assert!(ProgramSetup::notification_sender(&root, Some("secret".to_string())).is_ok());
    }

    #[test]
    fn default_command_factories() {
        let (setup, _, _) = setup(config());
        let registry = setup.command_registry().unwrap();
        let task_config = json!({
            "name": "test-task",
            "tags": [],
            "type": "test-type",
            "repository": "test",
            "repositories": [],
            "configFile": "c",
            "source": "s",
            "destination": "d",
        });

        for kind in CommandType::ALL {
            assert!(registry
                .create(kind.key(), task_config.as_object().unwrap())
                .is_ok());
        }
    }

    #[test]
    fn task_factory_merges_type_section() {
        let (setup, runner, _) = setup(config());
        let factory = setup.task_factory().unwrap();
        let entry = json!({"name": "test-task", "tags": ["a"], "type": "prune", "daily": 7});

        let task = factory.create(entry.as_object().unwrap()).unwrap();
        assert_eq!(task.name(), "test-task");

        task.safe_execute().unwrap();
        assert_eq!(
            runner.last().argv(),
            vec!["borg", "--verbose", "prune", "--list", "--stats", "--keep-daily", "7", "test-url"]
        );
    }

    #[test]
    fn task_factory_rejects_unknown_type() {
        let (setup, _, _) = setup(config());
        let factory = setup.task_factory().unwrap();
        let entry = json!({"name": "t", "tags": [], "type": "nope"});

        let result = factory.create(entry.as_object().unwrap());
        assert!(matches!(result, Err(ConfigError::UnknownTaskType(_))));
    }

    #[test]
    fn create_task_list_without_task_section() {
        let (setup, _, _) = setup(config());

        assert_eq!(setup.task_list().unwrap().iter().count(), 0);
    }

    #[test]
    fn create_task_list_from_task_section() {
        let (setup, _, _) = setup(with_tasks(json!([
            {"name": "task1", "tags": [], "type": "testfail"},
            {"name": "task2", "tags": [], "type": "testfail"},
        ])));

        let names: Vec<String> = setup
            .task_list()
            .unwrap()
            .iter()
            .map(|t| t.unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["task1", "task2"]);
    }

    #[test]
    fn run_reports_failures_and_skips_summary() {
        let (setup, runner, sent) = setup(with_tasks(json!([
            {"name": "broken", "tags": ["daily"], "type": "testfail"},
            {"name": "sync", "tags": ["daily"], "type": "rclone",
             "configFile": "c", "source": "s", "destination": "d"},
        ])));

        let summary = setup.run(&[]).unwrap();

        assert_eq!(summary, RunSummary { executed: 2, failed: 1 });
        assert_eq!(runner.calls.borrow().len(), 1);
        assert_eq!(*sent.borrow(), vec!["Task failed: broken".to_string()]);
    }

    #[test]
    fn run_sends_summary_when_everything_succeeds() {
        let (setup, _, sent) = setup(with_tasks(json!([
            {"name": "broken", "tags": ["weekly"], "type": "testfail"},
            {"name": "sync", "tags": ["daily"], "type": "rclone",
             "configFile": "c", "source": "s", "destination": "d"},
        ])));

        let summary = setup.run(&["daily".to_string()]).unwrap();

        assert_eq!(summary, RunSummary { executed: 1, failed: 0 });
        assert_eq!(*sent.borrow(), vec![SUCCESS_MESSAGE.to_string()]);
    }

    #[test]
    fn half_configured_task_fails_at_execution_and_run_continues() {
        let (setup, runner, sent) = setup(with_tasks(json!([
            {"name": "incomplete", "tags": [], "type": "rclone",
             "configFile": "c", "source": "s"},
            {"name": "sync", "tags": [], "type": "rclone",
             "configFile": "c", "source": "s", "destination": "d"},
        ])));

        let summary = setup.run(&[]).unwrap();

        assert_eq!(summary, RunSummary { executed: 2, failed: 1 });
        assert_eq!(runner.calls.borrow().len(), 1);
        assert_eq!(runner.last().argv().last(), Some(&"d"));
        assert_eq!(*sent.borrow(), vec!["Task failed: incomplete".to_string()]);
    }

    #[test]
    fn run_aborts_before_executing_on_invalid_task() {
        let (setup, runner, sent) = setup(with_tasks(json!([
            {"name": "sync", "tags": [], "type": "rclone",
             "configFile": "c", "source": "s", "destination": "d"},
            {"name": "bad", "tags": [], "type": "backup", "source": "/", "repository": "missing"},
        ])));

        assert!(setup.run(&[]).is_err());
        assert!(runner.calls.borrow().is_empty());
        assert!(sent.borrow().is_empty());
    }
}
