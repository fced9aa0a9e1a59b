use tracing::error;

use poise::serenity_prelude as serenity;

use lantern_database::Database;
use lantern_database::impls::cases::{create_case, set_case_log_message};
use lantern_database::impls::modlog_config::get_modlog_config;
use lantern_database::model::cases::{ModCase, NewCase};
use lantern_utils::embed::DEFAULT_EMBED_COLOR;

/// Orchestrator: create the moderation case, then publish it to the guild's
/// mod-log channel.
///
/// A store failure creating the case propagates; the moderator must know the
/// record does not exist. Publishing and recording the posted message id are
/// best-effort, failures there only lose the log mirror.
pub async fn create_case_and_publish(
    http: &serenity::Http,
    db: &Database,
    new_case: NewCase<'_>,
) -> anyhow::Result<ModCase> {
    let mut case = create_case(db, new_case).await?;

    match publish_case_to_modlog(http, db, &case).await {
        Ok(Some(message_id)) => {
            if let Err(source) = set_case_log_message(db, case.id, message_id.get()).await {
                error!(
                    ?source,
                    case_number = case.case_number,
                    "failed to record modlog message id"
                );
            } else {
                case.log_message_id = Some(message_id.get());
            }
        }
        Ok(None) => {}
        Err(source) => {
            error!(
                ?source,
                case_number = case.case_number,
                "failed to publish case to configured modlog channel"
            );
        }
    }

    Ok(case)
}

/// Re-render a case's posted log embed after an edit. Best-effort: cases
/// without a recorded message, or with an unreachable one, are left alone.
pub async fn refresh_case_log_message(http: &serenity::Http, db: &Database, case: &ModCase) {
    let Some(message_id) = case.log_message_id else {
        return;
    };

    let config = match get_modlog_config(db, case.guild_id).await {
        Ok(config) => config,
        Err(source) => {
            error!(?source, "failed to read modlog config");
            return;
        }
    };

    let Some(channel_id) = config.resolve_channel(case.action) else {
        return;
    };

    let edit = serenity::EditMessage::new().embed(case_log_embed(case));
    if let Err(source) = serenity::ChannelId::new(channel_id)
        .edit_message(http, serenity::MessageId::new(message_id), edit)
        .await
    {
        error!(
            ?source,
            case_number = case.case_number,
            "failed to edit modlog message"
        );
    }
}

async fn publish_case_to_modlog(
    http: &serenity::Http,
    db: &Database,
    case: &ModCase,
) -> Result<Option<serenity::MessageId>, serenity::Error> {
    let config = match get_modlog_config(db, case.guild_id).await {
        Ok(config) => config,
        Err(source) => {
            error!(?source, "failed to read modlog config");
            return Ok(None);
        }
    };

    let Some(channel_id) = config.resolve_channel(case.action) else {
        return Ok(None);
    };

    let message = serenity::ChannelId::new(channel_id)
        .send_message(
            http,
            serenity::CreateMessage::new().embed(case_log_embed(case)),
        )
        .await?;

    Ok(Some(message.id))
}

pub(crate) fn case_log_embed(case: &ModCase) -> serenity::CreateEmbed {
    let mut fields = Vec::new();
    fields.push(format!("**Action :** {}", case.action.display_name()));

    if case.action.targets_channel() {
        fields.push(format!("**Target :** <#{}>", case.target_id));
    } else {
        fields.push(format!("**Target :** <@{}>", case.target_id));
    }

    fields.push(format!(
        "**Reason :** {}",
        case.reason_display().replace('@', "@\u{200B}")
    ));

    if let Some(duration) = case.duration.as_deref() {
        fields.push(format!("**Duration :** {}", duration));
    }

    if let Some(expires_at) = case.expires_at {
        fields.push(format!("**Expires :** <t:{}:f>", expires_at));
    }

    fields.push(format!("**Moderator :** <@{}>", case.moderator_id));

    fields.push(format!(
        "**When :** <t:{}:R> • <t:{}:f>",
        case.created_at, case.created_at,
    ));

    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(format!("Case #{}", case.case_number))
        .description(fields.join("\n"))
}
