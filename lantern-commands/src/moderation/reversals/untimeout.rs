use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    guild_only_message, moderation_action_embed, notify_target_if_enabled,
    target_profile_from_user, usage_message,
};
use crate::moderation::logging::create_case_and_publish;
use lantern_core::{Context, Error};
use lantern_database::model::cases::{CaseAction, NewCase};
use lantern_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "untimeout",
    desc: "Remove timeout from a user.",
    category: "moderation",
    usage: "!untimeout <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn untimeout(
    ctx: Context<'_>,
    #[description = "The user to untimeout"] user: Option<serenity::User>,
    #[description = "Reason for removing the timeout"] #[rest] reason: Option<String>,
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

    let edit = serenity::EditMember::new().enable_communication();
    let untimeout_result = guild_id.edit_member(ctx.http(), user.id, edit).await;

    if let Err(source) = untimeout_result {
        error!(?source, "untimeout request failed");
        ctx.say("I couldn't remove the timeout from that user. Check permissions.")
            .await?;
        return Ok(());
    }

    let reason = reason.as_deref().map(str::trim).filter(|r| !r.is_empty());

    notify_target_if_enabled(
        ctx.http(),
        &ctx.data().db,
        guild_id,
        &user,
        CaseAction::Untimeout,
        reason,
        None,
    )
    .await;

    let target_tag = user.tag();
    let moderator_tag = ctx.author().tag();
    let case = create_case_and_publish(
        ctx.http(),
        &ctx.data().db,
        NewCase {
            guild_id: guild_id.get(),
            action: CaseAction::Untimeout,
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
    let embed = moderation_action_embed(
        &target_profile,
        user.id,
        "released from timeout",
        reason,
        None,
    )
    .footer(serenity::CreateEmbedFooter::new(format!(
        "Case #{}",
        case.case_number
    )));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
