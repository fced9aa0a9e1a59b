use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    guild_only_message, moderation_action_embed, moderation_bot_target_message,
    moderation_self_action_message, notify_target_if_enabled, target_profile_from_user,
    usage_message,
};
use crate::moderation::escalation_check::evaluate_escalation;
use crate::moderation::logging::create_case_and_publish;
use lantern_core::{Context, Error};
use lantern_database::model::cases::{CaseAction, NewCase};
use lantern_utils::permissions::{has_user_permission, hierarchy_rejection};

pub const META: CommandMeta = CommandMeta {
    name: "warn",
    desc: "Issue a warning to a user.",
    category: "moderation",
    usage: "!warn <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "The user to warn"] user: Option<serenity::User>,
    #[description = "Reason for the warning"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_MESSAGES,
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
        ctx.say(moderation_self_action_message("warn")).await?;
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
    let target_tag = user.tag();
    let moderator_tag = ctx.author().tag();

    let case = create_case_and_publish(
        ctx.http(),
        &ctx.data().db,
        NewCase {
            guild_id: guild_id.get(),
            action: CaseAction::Warn,
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

    notify_target_if_enabled(
        ctx.http(),
        &ctx.data().db,
        guild_id,
        &user,
        CaseAction::Warn,
        reason,
        None,
    )
    .await;

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(&target_profile, user.id, "warned", reason, None)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Case #{}",
            case.case_number
        )));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    match evaluate_escalation(
        ctx.http(),
        &ctx.data().db,
        guild_id,
        &user,
        ctx.author().id.get(),
        &moderator_tag,
    )
    .await
    {
        Ok(Some(escalation_case)) => {
            ctx.say(format!(
                "Escalation threshold met: applied {} (case #{}).",
                escalation_case.action.display_name().to_lowercase(),
                escalation_case.case_number
            ))
            .await?;
        }
        Ok(None) => {}
        Err(source) => {
            error!(?source, "escalation failed after warn");
            ctx.say(
                "The warning was recorded, but the escalation action could not be applied. \
                 Check my permissions and the escalation config.",
            )
            .await?;
        }
    }

    Ok(())
}
