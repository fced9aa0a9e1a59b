use poise::serenity_prelude as serenity;

use super::modlogs::truncated_reason;
use crate::CommandMeta;
use crate::moderation::embeds::{guild_only_message, usage_message};
use lantern_core::{Context, Error};
use lantern_database::impls::cases::case_history;
use lantern_utils::embed::build_list_embed;
use lantern_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "history",
    desc: "View a user's moderation history.",
    category: "moderation",
    usage: "!history <user>",
};

/// History lines stay short so the capped listing fits one embed.
const HISTORY_REASON_MAX: usize = 60;

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn history(
    ctx: Context<'_>,
    #[description = "The user to look up"] user: Option<serenity::User>,
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

    let rows = case_history(&ctx.data().db, guild_id.get(), user.id.get()).await?;

    if rows.is_empty() {
        ctx.say(format!("No moderation history for <@{}>.", user.id.get()))
            .await?;
        return Ok(());
    }

    let body = rows
        .iter()
        .map(|case| {
            format!(
                "`#{}` **{}** <t:{}:R> • {}",
                case.case_number,
                case.action.display_name(),
                case.created_at,
                truncated_reason(case, HISTORY_REASON_MAX),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let title = format!("History for {}", user.tag());
    let footer = format!("Showing the {} most recent case(s)", rows.len());
    let embed = build_list_embed(&title, body, Some(&footer));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
