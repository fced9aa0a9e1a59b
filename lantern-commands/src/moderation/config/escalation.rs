use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::guild_only_message;
use lantern_core::{Context, Error};
use lantern_database::impls::escalation::{
    add_escalation_threshold, clear_escalation_thresholds, get_escalation_config,
    set_escalation_enabled,
};
use lantern_database::model::config::{EscalationAction, EscalationThreshold};
use lantern_utils::duration::{format_duration_ms, parse_duration_ms};
use lantern_utils::embed::build_list_embed;
use lantern_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "escalation",
    desc: "Configure automatic escalation of repeated warns.",
    category: "moderation",
    usage: "!escalation <enable|disable|add|clear>",
};

/// View the guild's escalation config.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Moderation",
    subcommands("enable", "disable", "add", "clear")
)]
pub async fn escalation(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?
    {
        return Ok(());
    }

    let config = get_escalation_config(&ctx.data().db, guild_id.get()).await?;

    let status = if config.enabled { "Enabled" } else { "Disabled" };
    let mut lines = vec![format!("**Status :** {}", status)];

    if config.thresholds.is_empty() {
        lines.push("\nNo thresholds configured.".to_owned());
    } else {
        lines.push("\n**Thresholds** (checked in order, first match wins)".to_owned());
        for (index, threshold) in config.thresholds.iter().enumerate() {
            let action_label = match threshold.duration.as_deref() {
                Some(duration) => format!("{} ({})", threshold.action.as_str(), duration),
                None => threshold.action.as_str().to_owned(),
            };
            lines.push(format!(
                "{}. {} warns in {} day(s) -> {}",
                index + 1,
                threshold.warn_count,
                threshold.within_days,
                action_label
            ));
        }
    }

    let embed = build_list_embed(
        "Escalation Config",
        lines.join("\n"),
        Some("Subcommands: enable, disable, add, clear"),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Enable automatic escalation.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn enable(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?
    {
        return Ok(());
    }

    set_escalation_enabled(&ctx.data().db, guild_id.get(), true).await?;
    ctx.say("Automatic escalation has been **enabled**.")
        .await?;

    Ok(())
}

/// Disable automatic escalation. Thresholds are kept but ignored.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn disable(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?
    {
        return Ok(());
    }

    set_escalation_enabled(&ctx.data().db, guild_id.get(), false).await?;
    ctx.say("Automatic escalation has been **disabled**.")
        .await?;

    Ok(())
}

/// Append a threshold to the evaluation order.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Warns needed to trigger"] warns: Option<u32>,
    #[description = "Window in days the warns must fall in"] days: Option<u32>,
    #[description = "Action: timeout or ban"] action: Option<String>,
    #[description = "Timeout duration (e.g. 1h), required for timeout"] duration: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?
    {
        return Ok(());
    }

    let usage = "Usage: `!escalation add <warns> <days> <timeout|ban> [duration]`";

    let Some(warn_count) = warns.filter(|&count| (1..=100).contains(&count)) else {
        ctx.say(format!("{usage} (warns must be 1-100)")).await?;
        return Ok(());
    };

    let Some(within_days) = days.filter(|&days| (1..=365).contains(&days)) else {
        ctx.say(format!("{usage} (days must be 1-365)")).await?;
        return Ok(());
    };

    let parsed_action = action
        .as_deref()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .and_then(EscalationAction::parse);

    let Some(parsed_action) = parsed_action else {
        ctx.say(format!("{usage} (action must be `timeout` or `ban`)"))
            .await?;
        return Ok(());
    };

    let duration = match parsed_action {
        EscalationAction::Timeout => {
            let parsed = duration
                .as_deref()
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .and_then(parse_duration_ms)
                .filter(|&ms| ms > 0);

            let Some(ms) = parsed else {
                ctx.say(format!(
                    "{usage} (timeout thresholds need a duration like `1h` or `30m`)"
                ))
                .await?;
                return Ok(());
            };
            Some(format_duration_ms(ms))
        }
        EscalationAction::Ban => {
            if duration.as_deref().map(str::trim).is_some_and(|d| !d.is_empty()) {
                ctx.say("Ban thresholds don't take a duration.").await?;
                return Ok(());
            }
            None
        }
    };

    add_escalation_threshold(
        &ctx.data().db,
        guild_id.get(),
        &EscalationThreshold {
            warn_count,
            within_days,
            action: parsed_action,
            duration,
        },
    )
    .await?;

    let config = get_escalation_config(&ctx.data().db, guild_id.get()).await?;
    ctx.say(format!(
        "Threshold added at position {}: {} warns in {} day(s) -> {}.",
        config.thresholds.len(),
        warn_count,
        within_days,
        parsed_action.as_str()
    ))
    .await?;

    Ok(())
}

/// Remove every threshold.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn clear(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?
    {
        return Ok(());
    }

    clear_escalation_thresholds(&ctx.data().db, guild_id.get()).await?;
    ctx.say("All escalation thresholds removed.").await?;

    Ok(())
}
