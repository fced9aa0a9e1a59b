use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::guild_only_message;
use lantern_core::{Context, Error};
use lantern_database::impls::dm_config::{get_dm_notify_config, set_dm_notify};
use lantern_database::model::cases::CaseAction;
use lantern_utils::embed::build_list_embed;
use lantern_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "dmnotify",
    desc: "Configure which actions DM the target before they land.",
    category: "moderation",
    usage: "!dmnotify [set <action> <on|off>]",
};

fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "enable" | "enabled" => Some(true),
        "off" | "false" | "disable" | "disabled" => Some(false),
        _ => None,
    }
}

/// View the guild's DM notification toggles.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Moderation",
    subcommands("set")
)]
pub async fn dmnotify(ctx: Context<'_>) -> Result<(), Error> {
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

    let config = get_dm_notify_config(&ctx.data().db, guild_id.get()).await?;

    let mut lines = Vec::new();
    for action in CaseAction::ALL {
        // Channel actions have nobody to DM; tempban and softban display
        // through the shared ban toggle.
        if action.targets_channel() || action.notify_toggle_key() != action.as_str() {
            continue;
        }

        let state = if config.should_notify(action) {
            "on"
        } else {
            "off"
        };
        lines.push(format!("**{} :** {}", action.as_str(), state));
    }

    let embed = build_list_embed(
        "DM Notifications",
        lines.join("\n"),
        Some("tempban and softban follow the ban toggle"),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Turn DM notification for one action on or off.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn set(
    ctx: Context<'_>,
    #[description = "Action (warn, ban, etc.)"] action: Option<String>,
    #[description = "on or off"] state: Option<String>,
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
        ctx.say("Usage: `!dmnotify set <action> <on|off>`").await?;
        return Ok(());
    };

    if parsed_action.targets_channel() {
        ctx.say(format!(
            "`{}` targets a channel; there is nobody to DM.",
            parsed_action.as_str()
        ))
        .await?;
        return Ok(());
    }

    let Some(enabled) = state.as_deref().and_then(parse_toggle) else {
        ctx.say("Usage: `!dmnotify set <action> <on|off>`").await?;
        return Ok(());
    };

    set_dm_notify(&ctx.data().db, guild_id.get(), parsed_action, enabled).await?;

    let state_label = if enabled { "on" } else { "off" };
    if parsed_action.notify_toggle_key() != parsed_action.as_str() {
        ctx.say(format!(
            "DM notification for `{}` is **{}** (shared `ban` toggle).",
            parsed_action.as_str(),
            state_label
        ))
        .await?;
    } else {
        ctx.say(format!(
            "DM notification for `{}` is **{}**.",
            parsed_action.as_str(),
            state_label
        ))
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_toggle;

    #[test]
    fn common_spellings_parse() {
        assert_eq!(parse_toggle("on"), Some(true));
        assert_eq!(parse_toggle("Enabled"), Some(true));
        assert_eq!(parse_toggle("off"), Some(false));
        assert_eq!(parse_toggle("FALSE"), Some(false));
        assert_eq!(parse_toggle("maybe"), None);
    }
}
