use anyhow::Context as _;
use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    guild_only_message, is_missing_permissions_error, moderation_action_embed,
    moderation_bot_target_message, moderation_self_action_message, notify_target_if_enabled,
    target_profile_from_user, usage_message,
};
use crate::moderation::logging::create_case_and_publish;
use lantern_core::{Context, Error};
use lantern_database::model::cases::{CaseAction, NewCase};
use lantern_utils::duration::{format_duration_ms, parse_duration_ms};
use lantern_utils::permissions::{has_user_permission, hierarchy_rejection};
use lantern_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "timeout",
    desc: "Timeout a user for a duration (default: 10m).",
    category: "moderation",
    usage: "!timeout <user> [duration] [reason]",
};

const DEFAULT_TIMEOUT_MS: u64 = 10 * 60 * 1_000;

/// Pull extra duration tokens (`1h 30m`) off the front of the reason.
///
/// A literal `--` stops collection so a reason may start with something
/// duration-shaped.
fn split_timeout_duration_and_reason(
    duration: Option<&str>,
    reason: Option<&str>,
) -> (Option<String>, Option<String>) {
    let mut duration_parts = Vec::new();
    if let Some(raw_duration) = duration.map(str::trim).filter(|value| !value.is_empty()) {
        duration_parts.push(raw_duration.to_owned());
    }

    let mut reason_tokens = Vec::new();
    if let Some(rest) = reason {
        let mut tokens = rest.split_whitespace();
        let collect_more_duration = !duration_parts.is_empty();

        while let Some(token) = tokens.next() {
            if token == "--" {
                reason_tokens.extend(tokens.map(str::to_owned));
                break;
            }

            if collect_more_duration && parse_duration_ms(token).is_some() {
                duration_parts.push(token.to_owned());
                continue;
            }

            reason_tokens.push(token.to_owned());
            reason_tokens.extend(tokens.map(str::to_owned));
            break;
        }
    }

    let parsed_duration_input = if duration_parts.is_empty() {
        None
    } else {
        Some(duration_parts.join(" "))
    };

    let parsed_reason = if reason_tokens.is_empty() {
        None
    } else {
        Some(reason_tokens.join(" "))
    };

    (parsed_duration_input, parsed_reason)
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "The user to timeout"] user: Option<serenity::User>,
    #[description = "Duration (e.g. 10m, 2h)"] duration: Option<String>,
    #[description = "Reason for the timeout"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MODERATE_MEMBERS,
    )
    .await?
    {
        return Ok(());
    }

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if user.bot {
        ctx.say(moderation_bot_target_message()).await?;
        return Ok(());
    }

    if user.id == ctx.author().id {
        ctx.say(moderation_self_action_message("timeout")).await?;
        return Ok(());
    }

    if let Some(rejection) =
        hierarchy_rejection(ctx.http(), guild_id, ctx.author().id, user.id).await?
    {
        ctx.say(rejection).await?;
        return Ok(());
    }

    let (duration_input, parsed_reason) =
        split_timeout_duration_and_reason(duration.as_deref(), reason.as_deref());

    let duration_ms = match duration_input.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let Some(ms) = parse_duration_ms(raw).filter(|&ms| ms > 0) else {
                ctx.say(format!(
                    "Invalid duration. Usage: `{}` (examples: 30s, 10m, 2h, 1d)",
                    META.usage
                ))
                .await?;
                return Ok(());
            };
            ms
        }
        _ => DEFAULT_TIMEOUT_MS,
    };
    let duration_label = format_duration_ms(duration_ms);

    let until_unix = i64::try_from(now_unix_secs().saturating_add(duration_ms / 1_000))
        .context("timeout expiry out of i64 range")?;
    let until = serenity::Timestamp::from_unix_timestamp(until_unix)?;

    let edit = serenity::EditMember::new().disable_communication_until_datetime(until);
    let timeout_result = guild_id.edit_member(ctx.http(), user.id, edit).await;

    if let Err(source) = timeout_result {
        if !is_missing_permissions_error(&source) {
            error!(?source, "timeout request failed");
        }
        ctx.say("I couldn't timeout that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    let reason = parsed_reason.as_deref();
    notify_target_if_enabled(
        ctx.http(),
        &ctx.data().db,
        guild_id,
        &user,
        CaseAction::Timeout,
        reason,
        Some(&duration_label),
    )
    .await;

    let target_tag = user.tag();
    let moderator_tag = ctx.author().tag();
    let case = create_case_and_publish(
        ctx.http(),
        &ctx.data().db,
        NewCase {
            guild_id: guild_id.get(),
            action: CaseAction::Timeout,
            target_id: user.id.get(),
            target_tag: &target_tag,
            moderator_id: ctx.author().id.get(),
            moderator_tag: &moderator_tag,
            reason,
            duration: Some(duration_label.clone()),
            expires_at: None,
        },
    )
    .await?;

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(
        &target_profile,
        user.id,
        "timed out",
        reason,
        Some(&duration_label),
    )
    .footer(serenity::CreateEmbedFooter::new(format!(
        "Case #{}",
        case.case_number
    )));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::split_timeout_duration_and_reason;

    #[test]
    fn collects_trailing_duration_tokens() {
        let (duration, reason) =
            split_timeout_duration_and_reason(Some("1h"), Some("30m spamming links"));
        assert_eq!(duration.as_deref(), Some("1h 30m"));
        assert_eq!(reason.as_deref(), Some("spamming links"));
    }

    #[test]
    fn double_dash_stops_duration_collection() {
        let (duration, reason) = split_timeout_duration_and_reason(Some("1h"), Some("-- 30m ago"));
        assert_eq!(duration.as_deref(), Some("1h"));
        assert_eq!(reason.as_deref(), Some("30m ago"));
    }

    #[test]
    fn no_duration_leaves_reason_untouched() {
        let (duration, reason) = split_timeout_duration_and_reason(None, Some("spamming"));
        assert_eq!(duration, None);
        assert_eq!(reason.as_deref(), Some("spamming"));
    }
}
