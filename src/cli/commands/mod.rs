use std::collections::HashMap;

pub mod category;
pub mod config;
pub mod item;
pub mod summary;
pub mod system;

use crate::cli::context::{CommandResult, ShellContext};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(item::definitions());
    commands.extend(category::definitions());
    commands.extend(summary::definitions());
    commands.extend(config::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Splits `args` into positionals and `--flag value` pairs.
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    flags: HashMap<&'a str, &'a str>,
}

impl<'a> ParsedArgs<'a> {
    pub fn parse(args: &[&'a str], known: &[&str]) -> Result<Self, String> {
        let mut positional = Vec::new();
        let mut flags = HashMap::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if let Some(flag) = arg.strip_prefix("--") {
                if !known.contains(&flag) {
                    return Err(format!("unknown option `--{flag}`"));
                }
                let value = iter
                    .next()
                    .ok_or_else(|| format!("option `--{flag}` needs a value"))?;
                flags.insert(flag, *value);
            } else {
                positional.push(*arg);
            }
        }
        Ok(Self { positional, flags })
    }

    pub fn flag(&self, name: &str) -> Option<&'a str> {
        self.flags.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_preserves_declaration_order() {
        let registry = CommandRegistry::new(all_definitions());
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names.first(), Some(&"help"));
        assert!(registry.get("summary").is_some());
        assert_eq!(registry.iter().count(), names.len());
    }

    #[test]
    fn parsed_args_split_flags() {
        let args = ["Lunch", "12", "--desc", "with team", "Food"];
        let parsed = ParsedArgs::parse(&args, &["desc"]).unwrap();
        assert_eq!(parsed.positional, vec!["Lunch", "12", "Food"]);
        assert_eq!(parsed.flag("desc"), Some("with team"));

        assert!(ParsedArgs::parse(&["--nope", "x"], &["desc"]).is_err());
        assert!(ParsedArgs::parse(&["--desc"], &["desc"]).is_err());
    }
}
