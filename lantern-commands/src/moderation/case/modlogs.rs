use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::guild_only_message;
use lantern_core::{Context, Error};
use lantern_database::impls::cases::{CaseFilters, list_cases};
use lantern_database::model::cases::{CaseAction, ModCase};
use lantern_utils::embed::build_list_embed;
use lantern_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "modlogs",
    desc: "View recent moderation cases.",
    category: "moderation",
    usage: "!modlogs [target_user] [action] [limit]",
};

const DEFAULT_LIST_LIMIT: u32 = 10;

/// Longest reason shown in a listing before it is cut.
const LIST_REASON_MAX: usize = 120;

pub(crate) fn truncated_reason(case: &ModCase, max_chars: usize) -> String {
    let reason = case.reason_display().replace('@', "@\u{200B}");
    if reason.chars().count() <= max_chars {
        return reason;
    }

    let cut: String = reason.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

fn case_list_line(case: &ModCase) -> String {
    let target_display = if case.action.targets_channel() {
        format!("<#{}>", case.target_id)
    } else {
        format!("<@{}>", case.target_id)
    };

    let duration_note = case
        .duration
        .as_deref()
        .map(|duration| format!(" ({})", duration))
        .unwrap_or_default();

    format!(
        "**#{} {}{}** • <t:{}:R>\n{} • by <@{}> • {}",
        case.case_number,
        case.action.display_name(),
        duration_note,
        case.created_at,
        target_display,
        case.moderator_id,
        truncated_reason(case, LIST_REASON_MAX),
    )
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn modlogs(
    ctx: Context<'_>,
    #[description = "Filter by target user"] target_user: Option<serenity::User>,
    #[description = "Filter by action (ban, warn, etc.)"] action: Option<String>,
    #[description = "How many cases to show (max 10)"] limit: Option<u32>,
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

    let action_filter = match action.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => {
            let Some(parsed) = CaseAction::parse(raw) else {
                ctx.say(format!("Unknown action `{}`.", raw)).await?;
                return Ok(());
            };
            Some(parsed)
        }
        None => None,
    };

    let rows = list_cases(
        &ctx.data().db,
        guild_id.get(),
        CaseFilters {
            target_id: target_user.as_ref().map(|user| user.id.get()),
            action: action_filter,
            limit: limit
                .unwrap_or(DEFAULT_LIST_LIMIT)
                .clamp(1, DEFAULT_LIST_LIMIT),
        },
    )
    .await?;

    if rows.is_empty() {
        ctx.say("No matching moderation cases found.").await?;
        return Ok(());
    }

    let body = rows
        .iter()
        .map(case_list_line)
        .collect::<Vec<_>>()
        .join("\n\n");

    let footer = format!("Showing {} case(s), newest first", rows.len());
    let embed = build_list_embed("Moderation Logs", body, Some(&footer));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
