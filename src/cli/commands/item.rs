use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::cli::commands::{CommandDefinition, ParsedArgs};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::services::TransactionService;
use crate::ledger::{BudgetItem, ItemDraft, ItemKind};
use crate::search::{SearchFilters, SearchIndex};

const ADD_USAGE: &str =
    "add <income|expense> <name> <amount> [category] [--desc text] [--tags a,b] [--date YYYY-MM-DD]";
const EDIT_USAGE: &str = "edit <id> [--name text] [--amount n] [--kind income|expense] \
[--category name] [--desc text] [--tags a,b] [--date YYYY-MM-DD]";
const SEARCH_USAGE: &str =
    "search <query> [--kind income|expense] [--category name] [--min n] [--max n]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("add", "Record an income or expense", ADD_USAGE, cmd_add),
        CommandDefinition::new("edit", "Change fields of an existing item", EDIT_USAGE, cmd_edit),
        CommandDefinition::new("delete", "Remove an item", "delete <id>", cmd_delete),
        CommandDefinition::new("list", "List items, newest first", "list", cmd_list),
        CommandDefinition::new("search", "Fuzzy search items", SEARCH_USAGE, cmd_search),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["desc", "tags", "date"])
        .map_err(CommandError::InvalidArguments)?;
    let [kind, name, amount, rest @ ..] = parsed.positional.as_slice() else {
        return Err(CommandError::usage(ADD_USAGE));
    };
    if rest.len() > 1 {
        return Err(CommandError::usage(ADD_USAGE));
    }

    let kind = parse_kind(kind)?;
    let amount = parse_amount(amount)?;
    let category = rest.first().copied().unwrap_or("");
    let date = match parsed.flag("date") {
        Some(value) => parse_date(value)?,
        None => Utc::now(),
    };

    let mut draft = ItemDraft::new(*name, amount, kind, category, date);
    if let Some(description) = parsed.flag("desc") {
        draft = draft.with_description(description);
    }
    if let Some(tags) = parsed.flag("tags") {
        draft = draft.with_tags(split_tags(tags));
    }

    let id = context.manager.add_item(draft)?;
    output::success(format!(
        "Added {kind} `{name}` ({}) [{}]",
        context.money(amount),
        short_id(&id.to_string())
    ));
    if kind == ItemKind::Expense && !category.is_empty() {
        let known = context
            .manager
            .handle()
            .read(|ledger| ledger.category_by_name(category).is_some());
        if !known {
            output::warning(format!(
                "No category named `{category}`; the expense counts toward totals only."
            ));
        }
    }
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["name", "amount", "kind", "category", "desc", "tags", "date"],
    )
    .map_err(CommandError::InvalidArguments)?;
    let [reference] = parsed.positional.as_slice() else {
        return Err(CommandError::usage(EDIT_USAGE));
    };

    let mut item = find_item(context, reference)?;
    if let Some(name) = parsed.flag("name") {
        item.name = name.to_string();
    }
    if let Some(amount) = parsed.flag("amount") {
        item.amount = parse_amount(amount)?;
    }
    if let Some(kind) = parsed.flag("kind") {
        item.kind = parse_kind(kind)?;
    }
    if let Some(category) = parsed.flag("category") {
        item.category = category.to_string();
    }
    if let Some(description) = parsed.flag("desc") {
        item.description = Some(description.to_string()).filter(|text| !text.is_empty());
    }
    if let Some(tags) = parsed.flag("tags") {
        item.tags = split_tags(tags);
    }
    if let Some(date) = parsed.flag("date") {
        item.date = parse_date(date)?;
    }

    let label = item.name.clone();
    context.manager.update_item(item)?;
    output::success(format!("Updated `{label}`"));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [reference] = args else {
        return Err(CommandError::usage("delete <id>"));
    };
    let item = find_item(context, reference)?;
    let removed = context.manager.delete_item(item.id)?;
    output::success(format!(
        "Deleted {} `{}` ({})",
        removed.kind,
        removed.name,
        context.money(removed.amount)
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let items: Vec<BudgetItem> = context
        .manager
        .handle()
        .read(|ledger| TransactionService::list(ledger).into_iter().cloned().collect());
    if items.is_empty() {
        output::info("No items recorded yet.");
        return Ok(());
    }
    output::section(format!("Items ({})", items.len()));
    for item in &items {
        output::info(format_row(context, item));
    }
    Ok(())
}

fn cmd_search(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["kind", "category", "min", "max"])
        .map_err(CommandError::InvalidArguments)?;
    let query = parsed.positional.join(" ");

    let min = parsed.flag("min").map(parse_amount).transpose()?;
    let max = parsed.flag("max").map(parse_amount).transpose()?;
    let filters = SearchFilters {
        kind: parsed.flag("kind").map(parse_kind).transpose()?,
        category: parsed.flag("category").map(str::to_string),
        date_range: None,
        amount_range: match (min, max) {
            (None, None) => None,
            (min, max) => Some(min.unwrap_or(0.0)..=max.unwrap_or(f64::INFINITY)),
        },
    };
    if query.trim().is_empty() && filters.is_empty() {
        return Err(CommandError::usage(SEARCH_USAGE));
    }

    let items = context.manager.handle().read(|ledger| ledger.items().to_vec());
    let index = SearchIndex::new(&items);
    let hits = index.advanced_search(&query, &filters);
    if hits.is_empty() {
        output::info(format!("No items match `{query}`."));
        let suggestions = index.suggestions(&query);
        if !suggestions.is_empty() && !query.trim().is_empty() {
            output::hint(format!("Try: {}", suggestions.join(", ")));
        }
        return Ok(());
    }
    output::section(format!("Matches ({})", hits.len()));
    for hit in hits {
        output::info(format_row(context, hit.item));
    }
    Ok(())
}

fn find_item(context: &ShellContext, reference: &str) -> Result<BudgetItem, CommandError> {
    context
        .manager
        .handle()
        .read(|ledger| TransactionService::find(ledger, reference).cloned())
        .map_err(CommandError::from)
}

fn format_row(context: &ShellContext, item: &BudgetItem) -> String {
    let category = if item.category.is_empty() {
        "-"
    } else {
        item.category.as_str()
    };
    format!(
        "  {}  {}  {:<7}  {:<24}  {:>14}  {}",
        short_id(&item.id.to_string()),
        item.date.format("%Y-%m-%d"),
        item.kind.as_str(),
        item.name,
        context.money(item.amount),
        category
    )
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn parse_kind(value: &str) -> Result<ItemKind, CommandError> {
    value.parse().map_err(CommandError::InvalidArguments)
}

fn parse_amount(value: &str) -> Result<f64, CommandError> {
    value
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{value}` is not a valid amount")))
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, CommandError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            CommandError::InvalidArguments(format!("`{value}` is not a date (YYYY-MM-DD)"))
        })
}

fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
