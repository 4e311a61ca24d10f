mod registrar;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::dispose::BoxError;
use crate::service::Inject;

pub use registrar::CommandRegistrar;

/// The callback run when a command is issued. It receives the name the
/// command was issued under, which may be an alias, and the raw argument
/// string.
pub type CommandHandler = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// What the host stores for every command name.
#[derive(Clone)]
pub struct CommandInfo {
    handler: CommandHandler,
    help_message: String,
    show_in_help: bool,
}

impl CommandInfo {
    pub fn new(handler: CommandHandler) -> Self {
        Self {
            handler,
            help_message: String::new(),
            show_in_help: true,
        }
    }

    pub fn invoke(&self, command: &str, arguments: &str) {
        (self.handler)(command, arguments);
    }

    pub fn help_message(&self) -> &str {
        &self.help_message
    }

    pub fn show_in_help(&self) -> bool {
        self.show_in_help
    }
}

impl Debug for CommandInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CommandInfo")
            .field("help_message", &self.help_message)
            .field("show_in_help", &self.show_in_help)
            .finish_non_exhaustive()
    }
}

/// The command table of the host application.
#[cfg_attr(test, mockall::automock)]
pub trait CommandHost {
    /// Registers `info` under `name`. Returns `false` if the host refuses it,
    /// e.g. because the name is taken.
    fn add_handler(&mut self, name: &str, info: CommandInfo) -> bool;

    /// Unregisters `name`. Returns `false` if nothing was registered under it.
    fn remove_handler(&mut self, name: &str) -> bool;
}

/// A command exposed by a [`CommandModule`], registered under its name and
/// every alias.
pub struct Command {
    name: String,
    aliases: Vec<String>,
    info: CommandInfo,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            info: CommandInfo::new(Arc::new(handler)),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn help(mut self, help_message: impl Into<String>) -> Self {
        self.info.help_message = help_message.into();
        self
    }

    /// Keeps the command out of the host's help listing.
    pub fn hidden(mut self) -> Self {
        self.info.show_in_help = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name followed by the aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn info(&self) -> &CommandInfo {
        &self.info
    }
}

impl Debug for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("info", &self.info)
            .finish()
    }
}

/// A group of commands installed together by a [`CommandRegistrar`].
///
/// The registrar constructs the module through [`Default`], fills its
/// injectable slots and then asks it for its commands. Handlers usually
/// capture the [`Arc`] they are given to reach the module's state.
pub trait CommandModule: Inject + Default + Send + Sync + 'static {
    fn commands(self: Arc<Self>) -> Vec<Command>;

    /// Releases the resources held by the module. Called once when the
    /// registrar is torn down.
    ///
    /// # Errors
    ///
    /// Returns an error if some resource could not be released.
    fn dispose(&self) -> Result<(), BoxError> {
        Ok(())
    }
}
