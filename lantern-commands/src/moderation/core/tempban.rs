use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    guild_only_message, moderation_action_embed, moderation_bot_target_message,
    moderation_self_action_message, notify_target_if_enabled, target_profile_from_user,
    usage_message,
};
use crate::moderation::logging::create_case_and_publish;
use lantern_core::{Context, Error};
use lantern_database::model::cases::{CaseAction, NO_REASON_FALLBACK, NewCase};
use lantern_utils::duration::{format_duration_ms, parse_duration_ms};
use lantern_utils::permissions::{has_user_permission, hierarchy_rejection};
use lantern_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "tempban",
    desc: "Ban a user for a duration; the unban is scheduled automatically.",
    category: "moderation",
    usage: "!tempban <user> <duration> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn tempban(
    ctx: Context<'_>,
    #[description = "The user to ban"] user: Option<serenity::User>,
    #[description = "Ban duration, e.g. 7d or 12h"] duration: Option<String>,
    #[description = "Reason for the ban"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::BAN_MEMBERS,
    )
    .await?
    {
        return Ok(());
    }

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let duration_ms = duration.as_deref().and_then(parse_duration_ms);
    let Some(duration_ms) = duration_ms.filter(|&ms| ms > 0) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if user.id == ctx.author().id {
        ctx.say(moderation_self_action_message("ban")).await?;
        return Ok(());
    }

    if user.bot {
        ctx.say(moderation_bot_target_message()).await?;
        return Ok(());
    }

    if let Some(rejection) =
        hierarchy_rejection(ctx.http(), guild_id, ctx.author().id, user.id).await?
    {
        ctx.say(rejection).await?;
        return Ok(());
    }

    let reason = reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
    let duration_label = format_duration_ms(duration_ms);
    let expires_at = now_unix_secs().saturating_add(duration_ms / 1_000);

    // DM first: a banned user can no longer be reached from this guild.
    notify_target_if_enabled(
        ctx.http(),
        &ctx.data().db,
        guild_id,
        &user,
        CaseAction::Tempban,
        reason,
        Some(&duration_label),
    )
    .await;

    let ban_result = guild_id
        .ban_with_reason(ctx.http(), user.id, 0, reason.unwrap_or(NO_REASON_FALLBACK))
        .await;

    if let Err(source) = ban_result {
        error!(?source, "tempban request failed");
        ctx.say("I couldn't ban that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    // The case and its pending unban land in one transaction.
    let target_tag = user.tag();
    let moderator_tag = ctx.author().tag();
    let case = create_case_and_publish(
        ctx.http(),
        &ctx.data().db,
        NewCase {
            guild_id: guild_id.get(),
            action: CaseAction::Tempban,
            target_id: user.id.get(),
            target_tag: &target_tag,
            moderator_id: ctx.author().id.get(),
            moderator_tag: &moderator_tag,
            reason,
            duration: Some(duration_label.clone()),
            expires_at: Some(expires_at),
        },
    )
    .await?;

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(
        &target_profile,
        user.id,
        "temporarily banned",
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
