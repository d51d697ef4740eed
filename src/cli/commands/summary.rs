use crate::cli::commands::CommandDefinition;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::services::SummaryService;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "budget",
            "Show or set the monthly budget",
            "budget [amount]",
            cmd_budget,
        ),
        CommandDefinition::new(
            "summary",
            "Totals, budget use and category breakdown",
            "summary",
            cmd_summary,
        ),
    ]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            let budget = context.manager.handle().read(|ledger| ledger.monthly_budget());
            output::info(format!("Monthly budget: {}", context.money(budget)));
            Ok(())
        }
        [amount] => {
            let value = amount.parse::<f64>().map_err(|_| {
                CommandError::InvalidArguments(format!("`{amount}` is not a valid amount"))
            })?;
            context.manager.set_monthly_budget(value)?;
            output::success(format!("Monthly budget set to {}", context.money(value)));
            Ok(())
        }
        _ => Err(CommandError::usage("budget [amount]")),
    }
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let view = context.manager.handle().view();

    output::section("Summary");
    output::info(format!("  Income       : {}", context.money(view.total_income)));
    output::info(format!("  Expenses     : {}", context.money(view.total_expenses)));
    output::info(format!("  Balance      : {}", context.money(view.balance)));
    output::info(format!(
        "  Budget used  : {:.1}% of {}",
        SummaryService::budget_utilization(&view),
        context.money(view.monthly_budget)
    ));

    let breakdown = SummaryService::category_breakdown(&view);
    if !breakdown.is_empty() {
        output::section("Spending by category");
        for share in breakdown {
            output::info(format!(
                "  {:<18} {:>14}  {:>5.1}%",
                share.name,
                context.money(share.spent),
                share.share * 100.0
            ));
        }
    }

    for usage in SummaryService::category_usage(&view)
        .into_iter()
        .filter(|usage| usage.over_limit)
    {
        output::warning(format!(
            "`{}` is over its limit ({:.0}% used)",
            usage.name, usage.percent_used
        ));
    }

    let trend = SummaryService::monthly_trend(&view.items);
    if trend.len() > 1 {
        output::section("By month");
        for month in trend {
            output::info(format!(
                "  {}-{:02}  in {:>12}  out {:>12}  net {:>12}",
                month.year,
                month.month,
                context.money(month.income),
                context.money(month.expenses),
                context.money(month.net())
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::context::tests::script_context;

    #[test]
    fn budget_rejects_negative_and_accepts_positive() {
        let (mut context, _dir) = script_context();
        assert!(cmd_budget(&mut context, &["-10"]).is_err());
        cmd_budget(&mut context, &["1500"]).unwrap();
        let budget = context.manager.handle().read(|ledger| ledger.monthly_budget());
        assert_eq!(budget, 1500.0);
        assert!(cmd_budget(&mut context, &[]).is_ok());
    }

    #[test]
    fn summary_runs_on_empty_ledger() {
        let (mut context, _dir) = script_context();
        assert!(cmd_summary(&mut context, &[]).is_ok());
    }
}
