use crate::cli::commands::CommandDefinition;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::ledger::CURRENT_SCHEMA_VERSION;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new("save", "Write the ledger to disk now", "save", cmd_save),
        CommandDefinition::new(
            "audit",
            "Recompute aggregates and report drift",
            "audit",
            cmd_audit,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
        CommandDefinition::new("quit", "Exit the shell", "quit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(definition) => {
                output::section(format!("Help: {}", definition.name));
                output::info(format!("  {}", definition.description));
                output::info(format!("  usage: {}", definition.usage));
            }
            None => context.suggest_command(name),
        }
        return Ok(());
    }

    output::section("Available commands");
    for definition in context.registry.iter() {
        output::info(format!("  {:<10} {}", definition.name, definition.description));
    }
    output::hint("Use `help <command>` for details.");
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("BudgetAI {}", meta.version));
    output::info(format!("  Schema ver : v{CURRENT_SCHEMA_VERSION}"));
    output::info(format!("  Build hash : {} ({})", meta.git_hash, meta.git_status));
    output::info(format!("  Built at   : {}", meta.timestamp));
    output::info(format!("  Target     : {}", meta.target));
    output::info(format!("  Profile    : {}", meta.profile));
    output::info(format!("  Rustc      : {}", meta.rustc));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.manager.save()?;
    output::success(format!("Ledger saved to {}", context.manager.storage().describe()));
    Ok(())
}

fn cmd_audit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let audit = context.manager.handle().audit();
    if audit.is_consistent() && audit.dangling_items.is_empty() {
        output::success("Aggregates match the recorded items.");
        return Ok(());
    }
    if !audit.totals_consistent() {
        output::warning(format!(
            "Totals drifted: recorded expenses {}, expected {}",
            context.money(audit.recorded.total_expenses),
            context.money(audit.expected.total_expenses)
        ));
    }
    for stale in &audit.stale_categories {
        output::warning(format!(
            "Category `{}` records {} but its items add up to {}",
            stale.name,
            context.money(stale.recorded),
            context.money(stale.expected)
        ));
    }
    if !audit.dangling_items.is_empty() {
        output::info(format!(
            "{} expense item(s) reference a category that does not exist",
            audit.dangling_items.len()
        ));
    }
    if !audit.stale_categories.is_empty() {
        output::hint("Reloading the ledger from disk replays items and clears category drift.");
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
