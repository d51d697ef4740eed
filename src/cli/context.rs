use std::io;

use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::ai::AiState;
use crate::cli::commands::{all_definitions, CommandDefinition, CommandRegistry};
use crate::cli::output;
use crate::config::{Config, ConfigManager};
use crate::core::services::ServiceError;
use crate::core::LedgerManager;
use crate::errors::LedgerError;
use crate::storage::JsonStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Command failed: {0}")]
    Command(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Ledger(err) => CliError::Ledger(err),
            other => CliError::Command(other.to_string()),
        }
    }
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {usage}"))
    }
}

/// Everything a command handler can reach.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: LedgerManager,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub ai: AiState,
    pub running: bool,
}

impl ShellContext {
    /// Loads configuration from the application home and opens the ledger
    /// it points at.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let storage = JsonStorage::new(
            config.resolve_ledger_root(),
            Some(config.backup_retention),
        )?;
        let manager = LedgerManager::open(Box::new(storage), config.autosave)?;
        Ok(Self::with_parts(mode, manager, config_manager, config))
    }

    pub fn with_parts(
        mode: CliMode,
        manager: LedgerManager,
        config_manager: ConfigManager,
        config: Config,
    ) -> Self {
        if mode == CliMode::Script || std::env::var_os("NO_COLOR").is_some() {
            output::disable_color();
        }
        let ai = AiState::from_config(&config.ai);
        Self {
            mode,
            registry: CommandRegistry::new(all_definitions()),
            manager,
            config_manager,
            config,
            ai,
            running: true,
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub fn prompt(&self) -> String {
        let count = self.manager.handle().read(|ledger| ledger.item_count());
        format!("budgetai [{count}]> ")
    }

    pub fn money(&self, amount: f64) -> String {
        output::money(amount, &self.config.currency)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.get(command).map(|definition| definition.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use tempfile::TempDir;

    pub(crate) fn script_context() -> (ShellContext, TempDir) {
        let dir = TempDir::new().unwrap();
        let config_manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let manager = LedgerManager::open(Box::new(MemoryStorage::new()), true).unwrap();
        let context =
            ShellContext::with_parts(CliMode::Script, manager, config_manager, Config::default());
        (context, dir)
    }

    #[test]
    fn unknown_command_continues() {
        let (mut context, _dir) = script_context();
        let control = context.dispatch("sumary", "sumary", &[]).unwrap();
        assert_eq!(control, LoopControl::Continue);
    }

    #[test]
    fn exit_stops_the_loop() {
        let (mut context, _dir) = script_context();
        assert_eq!(context.dispatch("quit", "quit", &[]).unwrap(), LoopControl::Exit);
    }

    #[test]
    fn prompt_shows_item_count() {
        let (context, _dir) = script_context();
        assert_eq!(context.prompt(), "budgetai [0]> ");
    }
}
