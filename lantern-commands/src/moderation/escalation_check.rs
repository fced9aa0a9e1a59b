//! Shared warn-escalation logic.
//!
//! Called after a warn case is recorded to apply the first configured
//! threshold the target now meets. Each step carries its own failure
//! policy: reads ahead of the decision degrade to a no-op, the DM is
//! best-effort, and everything from the action onward fails loudly so the
//! caller can tell the moderator escalation did not take effect.

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use lantern_database::Database;
use lantern_database::impls::escalation::{get_escalation_config, warn_case_times};
use lantern_database::model::cases::{ModCase, NewCase};
use lantern_database::model::config::{EscalationAction, select_threshold};
use lantern_utils::duration::{format_duration_ms, parse_duration_ms};
use lantern_utils::time::now_unix_secs;

use crate::moderation::embeds::{is_missing_permissions_error, notify_target_if_enabled};
use crate::moderation::logging::create_case_and_publish;

const SECS_PER_DAY: u64 = 86_400;

/// Evaluate escalation for a target after a warn.
///
/// Returns the escalation case when a threshold fired, `Ok(None)` when
/// escalation is disabled, no threshold matched, or the target already left
/// the guild. The escalation case is attributed to the moderator whose warn
/// tripped the threshold.
pub async fn evaluate_escalation(
    http: &serenity::Http,
    db: &Database,
    guild_id: serenity::GuildId,
    target_user: &serenity::User,
    moderator_id: u64,
    moderator_tag: &str,
) -> anyhow::Result<Option<ModCase>> {
    // 1. Load the escalation snapshot; disabled or unreadable means no-op.
    let config = match get_escalation_config(db, guild_id.get()).await {
        Ok(config) => config,
        Err(source) => {
            error!(?source, "failed to read escalation config");
            return Ok(None);
        }
    };

    if !config.enabled || config.thresholds.is_empty() {
        return Ok(None);
    }

    // 2. Collect warn times across the widest configured window.
    let now = now_unix_secs();
    let max_window_days = config
        .thresholds
        .iter()
        .map(|threshold| u64::from(threshold.within_days))
        .max()
        .unwrap_or(0);
    let since = now.saturating_sub(max_window_days * SECS_PER_DAY);

    let warn_times = match warn_case_times(db, guild_id.get(), target_user.id.get(), since).await
    {
        Ok(times) => times,
        Err(source) => {
            error!(?source, "failed to count warns for escalation");
            return Ok(None);
        }
    };

    // 3. First threshold met in config order wins.
    let Some(threshold) = select_threshold(&config.thresholds, &warn_times, now) else {
        return Ok(None);
    };

    let window_start = now.saturating_sub(u64::from(threshold.within_days) * SECS_PER_DAY);
    let warn_count = warn_times.iter().filter(|&&at| at >= window_start).count();
    let reason = format!(
        "Auto-escalation: {} warns in {} days",
        warn_count, threshold.within_days
    );

    let timeout_ms = match threshold.action {
        EscalationAction::Timeout => {
            let raw = threshold
                .duration
                .as_deref()
                .context("timeout threshold has no duration")?;
            let ms = parse_duration_ms(raw)
                .with_context(|| format!("unparseable threshold duration `{raw}`"))?;
            Some(ms)
        }
        EscalationAction::Ban => None,
    };
    let case_action = threshold.action.as_case_action();
    let duration_label = timeout_ms.map(format_duration_ms);

    // 4. A target who already left the guild is nothing to escalate.
    if guild_id.member(http, target_user.id).await.is_err() {
        warn!(
            user_id = %target_user.id,
            guild_id = %guild_id,
            "escalation target is no longer a guild member"
        );
        return Ok(None);
    }

    info!(
        user_id = %target_user.id,
        guild_id = %guild_id,
        warn_count,
        action = case_action.as_str(),
        "escalation threshold met"
    );

    // 5. DM before the action lands; a banned user is unreachable after.
    notify_target_if_enabled(
        http,
        db,
        guild_id,
        target_user,
        case_action,
        Some(&reason),
        duration_label.as_deref(),
    )
    .await;

    // 6. Apply the action. Failure propagates, and no case is recorded for
    //    an action that never happened.
    let apply_result = match timeout_ms {
        Some(ms) => {
            let until_unix = i64::try_from(now.saturating_add(ms / 1_000))
                .context("timeout expiry out of i64 range")?;
            let until = serenity::Timestamp::from_unix_timestamp(until_unix)?;
            let edit = serenity::EditMember::new().disable_communication_until_datetime(until);
            guild_id
                .edit_member(http, target_user.id, edit)
                .await
                .map(|_| ())
        }
        None => {
            guild_id
                .ban_with_reason(http, target_user.id, 0, &reason)
                .await
        }
    };

    if let Err(source) = &apply_result {
        if is_missing_permissions_error(source) {
            warn!(
                user_id = %target_user.id,
                "missing permissions to apply escalation action (check role hierarchy)"
            );
        }
    }
    apply_result.context("failed to apply escalation action")?;

    // 7. Record the case; the store failing here must also surface.
    let target_tag = target_user.tag();
    let case = create_case_and_publish(
        http,
        db,
        NewCase {
            guild_id: guild_id.get(),
            action: case_action,
            target_id: target_user.id.get(),
            target_tag: &target_tag,
            moderator_id,
            moderator_tag,
            reason: Some(&reason),
            duration: duration_label,
            expires_at: None,
        },
    )
    .await
    .context("failed to record escalation case")?;

    Ok(Some(case))
}
