use poise::serenity_prelude as serenity;
use tracing::error;

use crate::CommandMeta;
use crate::moderation::embeds::{guild_only_message, permission_denied_message, usage_message};
use crate::moderation::logging::{case_log_embed, refresh_case_log_message};
use lantern_core::{Context, Error};
use lantern_database::impls::cases::{delete_case, get_case, update_case_reason};
use lantern_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "case",
    desc: "View, re-reason, or delete a moderation case.",
    category: "moderation",
    usage: "!case <number> [reason|delete] [text]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn case(
    ctx: Context<'_>,
    #[description = "Case number"] case_number: Option<u64>,
    #[description = "Optional action: reason or delete"] action: Option<String>,
    #[description = "Text for the selected action"] #[rest] value: Option<String>,
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
        ctx.say(permission_denied_message()).await?;
        return Ok(());
    }

    let Some(case_number) = case_number else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if let Some(action) = action.as_deref().map(str::trim) {
        if action.eq_ignore_ascii_case("reason") {
            let Some(new_reason) = value.map(|entry| entry.trim().to_owned()) else {
                ctx.say("Usage: `!case <number> reason <new reason>`").await?;
                return Ok(());
            };

            if new_reason.is_empty() {
                ctx.say("Reason cannot be empty.").await?;
                return Ok(());
            }

            let updated =
                match update_case_reason(&ctx.data().db, guild_id.get(), case_number, &new_reason)
                    .await
                {
                    Ok(updated) => updated,
                    Err(source) => {
                        error!(?source, "case reason update failed");
                        ctx.say("Failed to update case reason.").await?;
                        return Ok(());
                    }
                };

            let Some(updated) = updated else {
                ctx.say(format!("Case #{} was not found.", case_number))
                    .await?;
                return Ok(());
            };

            refresh_case_log_message(ctx.http(), &ctx.data().db, &updated).await;

            ctx.say(format!("Updated reason for case #{}.", case_number))
                .await?;
            return Ok(());
        }

        if action.eq_ignore_ascii_case("delete") {
            // Deleting audit records is held to a stricter gate than the
            // rest of the case command.
            if !has_user_permission(
                ctx.http(),
                guild_id,
                ctx.author().id,
                serenity::Permissions::MANAGE_GUILD,
            )
            .await?
            {
                ctx.say(permission_denied_message()).await?;
                return Ok(());
            }

            let deleted = match delete_case(&ctx.data().db, guild_id.get(), case_number).await {
                Ok(deleted) => deleted,
                Err(source) => {
                    error!(?source, "case delete failed");
                    ctx.say("Failed to delete case.").await?;
                    return Ok(());
                }
            };

            if !deleted {
                ctx.say(format!("Case #{} was not found.", case_number))
                    .await?;
                return Ok(());
            }

            ctx.say(format!(
                "Deleted case #{}. Its number will not be reused.",
                case_number
            ))
            .await?;
            return Ok(());
        }

        ctx.say("Supported actions: `reason`, `delete`").await?;
        return Ok(());
    }

    let case = match get_case(&ctx.data().db, guild_id.get(), case_number).await {
        Ok(case) => case,
        Err(source) => {
            error!(?source, "case load failed");
            ctx.say("Failed to load case.").await?;
            return Ok(());
        }
    };

    let Some(case) = case else {
        ctx.say(format!("Case #{} was not found.", case_number))
            .await?;
        return Ok(());
    };

    ctx.send(poise::CreateReply::default().embed(case_log_embed(&case)))
        .await?;
    Ok(())
}
