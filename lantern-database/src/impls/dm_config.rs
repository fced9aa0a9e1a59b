use anyhow::Context as _;

use crate::cache::{CONFIG_CACHE_TTL, dm_notify_config_key, invalidate_dm_notify_config};
use crate::database::Database;
use crate::model::cases::CaseAction;
use crate::model::config::DmNotifyConfig;

#[derive(sqlx::FromRow)]
struct ToggleRow {
    toggle_key: String,
    enabled: bool,
}

/// Load the guild's DM notification toggles, via the config cache.
pub async fn get_dm_notify_config(db: &Database, guild_id: u64) -> anyhow::Result<DmNotifyConfig> {
    let cache_key = dm_notify_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            load_dm_notify_config(db, guild_id).await
        })
        .await
}

async fn load_dm_notify_config(db: &Database, guild_id: u64) -> anyhow::Result<DmNotifyConfig> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let rows: Vec<ToggleRow> =
        sqlx::query_as("SELECT toggle_key, enabled FROM dm_notify_config WHERE guild_id = $1")
            .bind(guild_id_i64)
            .fetch_all(db.pool())
            .await?;

    let mut config = DmNotifyConfig::default();
    for row in rows {
        config.toggles.insert(row.toggle_key, row.enabled);
    }

    Ok(config)
}

/// Persist a DM toggle for an action.
///
/// The stored key is the action's toggle key, so setting tempban or softban
/// lands on the shared `ban` toggle.
pub async fn set_dm_notify(
    db: &Database,
    guild_id: u64,
    action: CaseAction,
    enabled: bool,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO dm_notify_config (guild_id, toggle_key, enabled)
         VALUES ($1, $2, $3)
         ON CONFLICT (guild_id, toggle_key) DO UPDATE SET enabled = EXCLUDED.enabled",
    )
    .bind(guild_id_i64)
    .bind(action.notify_toggle_key())
    .bind(enabled)
    .execute(db.pool())
    .await?;

    invalidate_dm_notify_config(db.cache(), guild_id).await?;

    Ok(())
}
