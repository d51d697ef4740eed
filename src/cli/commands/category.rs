use crate::cli::commands::CommandDefinition;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::services::{CategoryService, SummaryService};
use crate::ledger::{BudgetCategory, CategoryDraft};

const CATEGORY_USAGE: &str = "category <add|edit|delete> ...";
const ADD_USAGE: &str = "category add <name> <color> [limit]";
const EDIT_USAGE: &str = "category edit <name|id> <name> <color> [limit|none]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "categories",
            "List categories with spend and limits",
            "categories",
            cmd_categories,
        ),
        CommandDefinition::new("category", "Manage categories", CATEGORY_USAGE, cmd_category),
    ]
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let usage = SummaryService::category_usage(&context.manager.handle().view());
    if usage.is_empty() {
        output::info("No categories defined.");
        return Ok(());
    }
    output::section(format!("Categories ({})", usage.len()));
    for entry in usage {
        let limit = entry
            .limit
            .map(|limit| context.money(limit))
            .unwrap_or_else(|| "no limit".into());
        let line = format!(
            "  {:<18} {:<8} {:>14} / {:<14} {:>5.1}%",
            entry.name,
            entry.color,
            context.money(entry.spent),
            limit,
            entry.percent_used
        );
        if entry.over_limit {
            output::warning(line);
        } else {
            output::info(line);
        }
    }
    Ok(())
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(CommandError::usage(CATEGORY_USAGE));
    };
    match action.to_lowercase().as_str() {
        "add" => category_add(context, rest),
        "edit" => category_edit(context, rest),
        "delete" | "remove" => category_delete(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown category subcommand `{other}`"
        ))),
    }
}

fn category_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (name, color, limit) = match args {
        [name, color] => (*name, *color, None),
        [name, color, limit] => (*name, *color, Some(parse_limit(limit)?)),
        _ => return Err(CommandError::usage(ADD_USAGE)),
    };
    context
        .manager
        .add_category(CategoryDraft::new(name, color, limit))?;
    output::success(format!("Category `{name}` added"));
    Ok(())
}

fn category_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (reference, name, color, limit) = match args {
        [reference, name, color] => (*reference, *name, *color, None),
        [reference, name, color, limit] => (*reference, *name, *color, Some(*limit)),
        _ => return Err(CommandError::usage(EDIT_USAGE)),
    };
    let existing = find_category(context, reference)?;
    // An omitted limit keeps the current one; `none` clears it.
    let limit = match limit {
        None => existing.limit,
        Some(value) if value.eq_ignore_ascii_case("none") => None,
        Some(value) => Some(parse_limit(value)?),
    };
    let renamed = existing.name != name;
    let previous = existing.name.clone();
    context.manager.update_category(BudgetCategory {
        name: name.to_string(),
        color: color.to_string(),
        limit,
        ..existing
    })?;
    output::success(format!("Category `{name}` updated"));
    if renamed {
        output::hint(format!(
            "Items filed under `{previous}` keep that name and no longer count toward `{name}`."
        ));
    }
    Ok(())
}

fn category_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [reference] = args else {
        return Err(CommandError::usage("category delete <name|id>"));
    };
    let existing = find_category(context, reference)?;
    let removed = context.manager.delete_category(existing.id)?;
    output::success(format!("Category `{}` deleted", removed.name));
    Ok(())
}

fn find_category(context: &ShellContext, reference: &str) -> Result<BudgetCategory, CommandError> {
    context
        .manager
        .handle()
        .read(|ledger| CategoryService::find(ledger, reference).cloned())
        .map_err(CommandError::from)
}

fn parse_limit(value: &str) -> Result<f64, CommandError> {
    value
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{value}` is not a valid limit")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::context::tests::script_context;

    #[test]
    fn add_edit_delete_round() {
        let (mut context, _dir) = script_context();
        cmd_category(&mut context, &["add", "Pets", "#123456", "80"]).unwrap();
        assert!(cmd_category(&mut context, &["add", "pets", "#000000"]).is_err());

        cmd_category(&mut context, &["edit", "Pets", "Pet care", "#654321"]).unwrap();
        let category = context
            .manager
            .handle()
            .read(|ledger| ledger.category_by_name("Pet care").cloned())
            .unwrap();
        assert_eq!(category.color, "#654321");
        assert_eq!(category.limit, Some(80.0));

        cmd_category(&mut context, &["edit", "Pet care", "Pet care", "#654321", "none"]).unwrap();
        let limit = context
            .manager
            .handle()
            .read(|ledger| ledger.category_by_name("Pet care").and_then(|c| c.limit));
        assert_eq!(limit, None);

        cmd_category(&mut context, &["delete", "Pet care"]).unwrap();
        assert!(cmd_category(&mut context, &["delete", "Pet care"]).is_err());
    }

    #[test]
    fn unknown_action_is_invalid() {
        let (mut context, _dir) = script_context();
        assert!(matches!(
            cmd_category(&mut context, &["rename"]),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(cmd_categories(&mut context, &[]).is_ok());
    }
}
