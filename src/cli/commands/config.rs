use crate::ai::AiSettingsPatch;
use crate::cli::commands::CommandDefinition;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;

const CONFIG_USAGE: &str = "config [show|set <key> <value>]";

const KEYS: &[&str] = &[
    "locale",
    "currency",
    "theme",
    "autosave",
    "backup_retention",
    "ai.enabled",
    "ai.model",
    "ai.api_key_env",
    "ai.auto_analysis",
    "ai.insight_frequency",
    "ai.content_generation",
    "ai.personalized_recommendations",
];

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "View and change preferences and AI settings",
        CONFIG_USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        show_config(context);
        return Ok(());
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    KEYS.join("|")
                )));
            }
            let value = args[2..].join(" ");
            set_config_value(context, args[1], value.trim())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{other}`"
        ))),
    }
}

fn show_config(context: &ShellContext) {
    let config = &context.config;
    let ai = &context.ai;
    output::section("Configuration");
    output::info(format!("  Locale       : {}", config.locale));
    output::info(format!("  Currency     : {}", config.currency));
    output::info(format!("  Theme        : {}", config.theme));
    output::info(format!("  Autosave     : {}", on_off(config.autosave)));
    output::info(format!("  Backups kept : {}", config.backup_retention));
    output::section("AI");
    output::info(format!("  Enabled      : {}", on_off(ai.enabled)));
    output::info(format!("  Model        : {}", ai.model));
    output::info(format!(
        "  API key      : {} ({})",
        config.ai.api_key_env,
        if ai.api_key.is_some() { "set" } else { "missing" }
    ));
    output::info(format!("  Auto analysis: {}", on_off(ai.settings.auto_analysis)));
    output::info(format!("  Frequency    : {}", ai.settings.insight_frequency));
    output::info(format!(
        "  Content gen  : {}",
        on_off(ai.settings.content_generation)
    ));
    output::info(format!(
        "  Personalized : {}",
        on_off(ai.settings.personalized_recommendations)
    ));
    output::hint(format!("Stored at {}", context.config_manager.path().display()));
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let key = key.to_ascii_lowercase();
    let mut patch = AiSettingsPatch::default();
    match key.as_str() {
        "locale" => context.config.locale = non_empty(value)?,
        "currency" => context.config.currency = non_empty(value)?.to_uppercase(),
        "theme" => context.config.theme = value.parse().map_err(CommandError::InvalidArguments)?,
        "autosave" => {
            let enabled = parse_flag(value)?;
            context.config.autosave = enabled;
            context.manager.set_autosave(enabled);
        }
        "backup_retention" => {
            let count = value
                .parse::<usize>()
                .ok()
                .filter(|count| *count >= 1)
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "`{value}` is not a valid backup count (at least 1)"
                    ))
                })?;
            context.config.backup_retention = count;
            output::hint("The new retention applies from the next start.");
        }
        "ai.enabled" => {
            let enabled = parse_flag(value)?;
            context.config.ai.enabled = enabled;
            context.ai.enabled = enabled;
        }
        "ai.model" => {
            let model = non_empty(value)?;
            context.config.ai.model = model.clone();
            context.ai.model = model;
        }
        "ai.api_key_env" => {
            context.config.ai.api_key_env = non_empty(value)?;
            context.ai.api_key = context.config.ai.api_key();
        }
        "ai.auto_analysis" => patch.auto_analysis = Some(parse_flag(value)?),
        "ai.insight_frequency" => {
            patch.insight_frequency =
                Some(value.parse().map_err(CommandError::InvalidArguments)?)
        }
        "ai.content_generation" => patch.content_generation = Some(parse_flag(value)?),
        "ai.personalized_recommendations" => {
            patch.personalized_recommendations = Some(parse_flag(value)?)
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown config key `{other}` (expected one of: {})",
                KEYS.join(", ")
            )))
        }
    }

    if patch != AiSettingsPatch::default() {
        context.ai.update_settings(patch);
        context.config.ai.settings = context.ai.settings.clone();
    }
    context.config_manager.save(&context.config)?;
    output::success(format!("`{key}` set to {value}"));
    Ok(())
}

fn parse_flag(value: &str) -> Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(CommandError::InvalidArguments(format!(
            "`{other}` is not on/off"
        ))),
    }
}

fn non_empty(value: &str) -> Result<String, CommandError> {
    if value.is_empty() {
        Err(CommandError::InvalidArguments("value must not be empty".into()))
    } else {
        Ok(value.to_string())
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
