use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::guild_only_message;
use lantern_core::{Context, Error};
use lantern_database::impls::modlog_config::{
    clear_default_modlog_channel, clear_modlog_route, get_modlog_config,
    set_default_modlog_channel, set_modlog_route,
};
use lantern_database::model::cases::CaseAction;
use lantern_utils::embed::build_list_embed;
use lantern_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "modlogchannel",
    desc: "Configure where moderation cases are logged.",
    category: "moderation",
    usage: "!modlogchannel [set|clear|route]",
};

/// View or change the guild's mod-log routing.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Moderation",
    subcommands("set", "clear", "route")
)]
pub async fn modlogchannel(ctx: Context<'_>) -> Result<(), Error> {
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

    let config = get_modlog_config(&ctx.data().db, guild_id.get()).await?;

    let mut lines = Vec::new();
    match config.default_channel_id {
        Some(channel_id) => lines.push(format!("**Default :** <#{}>", channel_id)),
        None => lines.push("**Default :** not set".to_owned()),
    }

    let mut route_lines = Vec::new();
    for action in CaseAction::ALL {
        if let Some(channel_id) = config.routes.get(action.as_str()) {
            route_lines.push(format!("**{} :** <#{}>", action.as_str(), channel_id));
        }
    }

    if route_lines.is_empty() {
        lines.push("\nNo per-action routes configured.".to_owned());
    } else {
        lines.push("\n**Per-action routes**".to_owned());
        lines.extend(route_lines);
    }

    let embed = build_list_embed(
        "Mod-Log Routing",
        lines.join("\n"),
        Some("Subcommands: set, clear, route"),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Set the default mod-log channel.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn set(
    ctx: Context<'_>,
    #[description = "Channel mention or id"]
    #[rest]
    input: Option<String>,
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

    let channel_id = input
        .as_deref()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .and_then(parse_channel_id);

    let Some(channel_id) = channel_id else {
        ctx.say("Usage: `!modlogchannel set <#channel|channel_id>`")
            .await?;
        return Ok(());
    };

    set_default_modlog_channel(&ctx.data().db, guild_id.get(), channel_id).await?;
    ctx.say(format!("Default mod-log channel set to <#{}>.", channel_id))
        .await?;

    Ok(())
}

/// Clear the default mod-log channel.
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

    clear_default_modlog_channel(&ctx.data().db, guild_id.get()).await?;
    ctx.say("Default mod-log channel cleared. Actions without a route are no longer logged.")
        .await?;

    Ok(())
}

/// Route one action's cases to their own channel, or clear that route.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn route(
    ctx: Context<'_>,
    #[description = "Action to route (ban, warn, etc.)"] action: Option<String>,
    #[description = "Channel mention/id, or 'clear'"]
    #[rest]
    input: Option<String>,
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

    let parsed_action = action
        .as_deref()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .and_then(CaseAction::parse);

    let Some(parsed_action) = parsed_action else {
        ctx.say("Usage: `!modlogchannel route <action> <#channel|channel_id|clear>`")
            .await?;
        return Ok(());
    };

    let Some(input) = input
        .as_deref()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
    else {
        ctx.say("Usage: `!modlogchannel route <action> <#channel|channel_id|clear>`")
            .await?;
        return Ok(());
    };

    if input.eq_ignore_ascii_case("clear") {
        clear_modlog_route(&ctx.data().db, guild_id.get(), parsed_action).await?;
        ctx.say(format!(
            "Route for `{}` cleared; those cases use the default channel again.",
            parsed_action.as_str()
        ))
        .await?;
        return Ok(());
    }

    let Some(channel_id) = parse_channel_id(input) else {
        ctx.say("Provide a valid channel mention/id, or `clear`.")
            .await?;
        return Ok(());
    };

    set_modlog_route(&ctx.data().db, guild_id.get(), parsed_action, channel_id).await?;
    ctx.say(format!(
        "Cases for `{}` now log to <#{}>.",
        parsed_action.as_str(),
        channel_id
    ))
    .await?;

    Ok(())
}

fn parse_channel_id(raw: &str) -> Option<u64> {
    if let Ok(id) = raw.parse::<u64>() {
        return Some(id);
    }

    if raw.starts_with("<#") && raw.ends_with('>') {
        return raw
            .trim_start_matches("<#")
            .trim_end_matches('>')
            .parse::<u64>()
            .ok();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::parse_channel_id;

    #[test]
    fn accepts_bare_ids_and_mentions() {
        assert_eq!(parse_channel_id("123456"), Some(123456));
        assert_eq!(parse_channel_id("<#987654>"), Some(987654));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_channel_id("general"), None);
        assert_eq!(parse_channel_id("<#abc>"), None);
        assert_eq!(parse_channel_id(""), None);
    }
}
