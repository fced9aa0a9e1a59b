use anyhow::Context as _;

use crate::cache::{CONFIG_CACHE_TTL, escalation_config_key, invalidate_escalation_config};
use crate::database::Database;
use crate::model::config::{EscalationAction, EscalationConfig, EscalationThreshold};

#[derive(sqlx::FromRow)]
struct ThresholdRow {
    warn_count: i32,
    within_days: i32,
    action: String,
    duration: Option<String>,
}

/// Load the guild's escalation snapshot, via the config cache.
///
/// A guild with no stored config resolves to the disabled default.
pub async fn get_escalation_config(
    db: &Database,
    guild_id: u64,
) -> anyhow::Result<EscalationConfig> {
    let cache_key = escalation_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            load_escalation_config(db, guild_id).await
        })
        .await
}

async fn load_escalation_config(db: &Database, guild_id: u64) -> anyhow::Result<EscalationConfig> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let enabled: Option<bool> =
        sqlx::query_scalar("SELECT enabled FROM escalation_config WHERE guild_id = $1")
            .bind(guild_id_i64)
            .fetch_optional(db.pool())
            .await?;

    let rows: Vec<ThresholdRow> = sqlx::query_as(
        "SELECT warn_count, within_days, action, duration
         FROM escalation_thresholds
         WHERE guild_id = $1
         ORDER BY position ASC",
    )
    .bind(guild_id_i64)
    .fetch_all(db.pool())
    .await?;

    let mut thresholds = Vec::with_capacity(rows.len());
    for row in rows {
        let action = EscalationAction::parse(&row.action)
            .with_context(|| format!("unknown escalation action `{}`", row.action))?;

        thresholds.push(EscalationThreshold {
            warn_count: u32::try_from(row.warn_count).context("warn_count out of u32 range")?,
            within_days: u32::try_from(row.within_days).context("within_days out of u32 range")?,
            action,
            duration: row.duration,
        });
    }

    Ok(EscalationConfig {
        enabled: enabled.unwrap_or(false),
        thresholds,
    })
}

pub async fn set_escalation_enabled(
    db: &Database,
    guild_id: u64,
    enabled: bool,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO escalation_config (guild_id, enabled) VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET enabled = EXCLUDED.enabled",
    )
    .bind(guild_id_i64)
    .bind(enabled)
    .execute(db.pool())
    .await?;

    invalidate_escalation_config(db.cache(), guild_id).await?;

    Ok(())
}

/// Append a threshold at the end of the guild's evaluation order.
pub async fn add_escalation_threshold(
    db: &Database,
    guild_id: u64,
    threshold: &EscalationThreshold,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let warn_count_i32 =
        i32::try_from(threshold.warn_count).context("warn_count out of i32 range")?;
    let within_days_i32 =
        i32::try_from(threshold.within_days).context("within_days out of i32 range")?;

    sqlx::query(
        "INSERT INTO escalation_thresholds (guild_id, position, warn_count, within_days, action, duration)
         VALUES (
            $1,
            (SELECT COALESCE(MAX(position), 0) + 1 FROM escalation_thresholds WHERE guild_id = $1),
            $2, $3, $4, $5
         )",
    )
    .bind(guild_id_i64)
    .bind(warn_count_i32)
    .bind(within_days_i32)
    .bind(threshold.action.as_str())
    .bind(threshold.duration.as_deref())
    .execute(db.pool())
    .await?;

    invalidate_escalation_config(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn clear_escalation_thresholds(db: &Database, guild_id: u64) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query("DELETE FROM escalation_thresholds WHERE guild_id = $1")
        .bind(guild_id_i64)
        .execute(db.pool())
        .await?;

    invalidate_escalation_config(db.cache(), guild_id).await?;

    Ok(())
}

/// Creation times of warn cases against a target since the given timestamp.
pub async fn warn_case_times(
    db: &Database,
    guild_id: u64,
    target_id: u64,
    since: u64,
) -> anyhow::Result<Vec<u64>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let target_id_i64 = i64::try_from(target_id).context("target_id out of i64 range")?;
    let since_i64 = i64::try_from(since).context("since out of i64 range")?;

    let rows: Vec<i64> = sqlx::query_scalar(
        "SELECT created_at FROM mod_cases
         WHERE guild_id = $1 AND target_id = $2 AND action = 'warn' AND created_at >= $3
         ORDER BY created_at DESC",
    )
    .bind(guild_id_i64)
    .bind(target_id_i64)
    .bind(since_i64)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|at| u64::try_from(at).context("created_at row out of u64 range"))
        .collect()
}
