use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    channel_display_name, guild_only_message, is_missing_permissions_error,
};
use crate::moderation::logging::create_case_and_publish;
use lantern_core::{Context, Error};
use lantern_database::model::cases::{CaseAction, NewCase};
use lantern_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "unlock",
    desc: "Let @everyone send messages in this channel again.",
    category: "moderation",
    usage: "!unlock [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn unlock(
    ctx: Context<'_>,
    #[description = "Reason for the unlock"] #[rest] reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_CHANNELS,
    )
    .await?
    {
        return Ok(());
    }

    let channel_id = ctx.channel_id();

    let target = serenity::PermissionOverwriteType::Role(serenity::RoleId::new(guild_id.get()));
    if let Err(source) = channel_id.delete_permission(ctx.http(), target).await {
        if !is_missing_permissions_error(&source) {
            error!(?source, "unlock overwrite request failed");
        }
        ctx.say("I couldn't unlock this channel. I likely need the 'Manage Channels' permission.")
            .await?;
        return Ok(());
    }

    let reason = reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
    let channel_tag = channel_display_name(ctx.http(), channel_id).await;
    let moderator_tag = ctx.author().tag();
    let case = create_case_and_publish(
        ctx.http(),
        &ctx.data().db,
        NewCase {
            guild_id: guild_id.get(),
            action: CaseAction::Unlock,
            target_id: channel_id.get(),
            target_tag: &channel_tag,
            moderator_id: ctx.author().id.get(),
            moderator_tag: &moderator_tag,
            reason,
            duration: None,
            expires_at: None,
        },
    )
    .await?;

    ctx.say(format!(
        "Unlocked <#{}>. Case #{}.",
        channel_id.get(),
        case.case_number
    ))
    .await?;

    Ok(())
}
