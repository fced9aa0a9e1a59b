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
    name: "kick",
    desc: "Kick a user from the server.",
    category: "moderation",
    usage: "!kick <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "The user to kick"] user: Option<serenity::User>,
    #[description = "Reason for the kick"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::KICK_MEMBERS,
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
        ctx.say(moderation_self_action_message("kick")).await?;
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

    // DM first: once the kick lands there is no shared guild to deliver
    // through.
    notify_target_if_enabled(
        ctx.http(),
        &ctx.data().db,
        guild_id,
        &user,
        CaseAction::Kick,
        reason,
        None,
    )
    .await;

    let kick_result = guild_id
        .kick_with_reason(ctx.http(), user.id, reason.unwrap_or(NO_REASON_FALLBACK))
        .await;

    if let Err(source) = kick_result {
        error!(?source, "kick request failed");
        ctx.say("I couldn't kick that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    let target_tag = user.tag();
    let moderator_tag = ctx.author().tag();
    let case = create_case_and_publish(
        ctx.http(),
        &ctx.data().db,
        NewCase {
            guild_id: guild_id.get(),
            action: CaseAction::Kick,
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
    let embed = moderation_action_embed(&target_profile, user.id, "kicked", reason, None).footer(
        serenity::CreateEmbedFooter::new(format!("Case #{}", case.case_number)),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
