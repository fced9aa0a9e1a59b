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
use lantern_utils::permissions::{has_user_permission, hierarchy_rejection};

pub const META: CommandMeta = CommandMeta {
    name: "softban",
    desc: "Ban and immediately unban a user to purge their recent messages.",
    category: "moderation",
    usage: "!softban <user> [reason]",
};

/// Days of messages the ban half of a softban deletes.
const SOFTBAN_PURGE_DAYS: u8 = 1;

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn softban(
    ctx: Context<'_>,
    #[description = "The user to softban"] user: Option<serenity::User>,
    #[description = "Reason for the softban"] #[rest] reason: Option<String>,
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

    if user.id == ctx.author().id {
        ctx.say(moderation_self_action_message("softban")).await?;
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

    // Softban notifications ride the shared ban toggle.
    notify_target_if_enabled(
        ctx.http(),
        &ctx.data().db,
        guild_id,
        &user,
        CaseAction::Softban,
        reason,
        None,
    )
    .await;

    let ban_result = guild_id
        .ban_with_reason(
            ctx.http(),
            user.id,
            SOFTBAN_PURGE_DAYS,
            reason.unwrap_or(NO_REASON_FALLBACK),
        )
        .await;

    if let Err(source) = ban_result {
        error!(?source, "softban ban request failed");
        ctx.say("I couldn't ban that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    let unban_failed = match guild_id.unban(ctx.http(), user.id).await {
        Ok(()) => false,
        Err(source) => {
            error!(?source, "softban unban request failed");
            true
        }
    };

    let target_tag = user.tag();
    let moderator_tag = ctx.author().tag();
    let case = create_case_and_publish(
        ctx.http(),
        &ctx.data().db,
        NewCase {
            guild_id: guild_id.get(),
            action: CaseAction::Softban,
            target_id: user.id.get(),
            target_tag: &target_tag,
            moderator_id: ctx.author().id.get(),
            moderator_tag: &moderator_tag,
            reason,
            duration: None,
            expires_at: None,
        },
    )
    .await?;

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(&target_profile, user.id, "softbanned", reason, None)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Case #{}",
            case.case_number
        )));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    if unban_failed {
        ctx.say(
            "The unban half of the softban failed, so the user is still banned. \
             Unban them manually once the issue is resolved.",
        )
        .await?;
    }

    Ok(())
}
