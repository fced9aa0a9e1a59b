use anyhow::Context as _;

use crate::cache::{CONFIG_CACHE_TTL, invalidate_modlog_config, modlog_config_key};
use crate::database::Database;
use crate::model::cases::CaseAction;
use crate::model::config::ModLogConfig;

#[derive(sqlx::FromRow)]
struct RouteRow {
    action: String,
    channel_id: i64,
}

/// Load the guild's mod-log routing snapshot, via the config cache.
pub async fn get_modlog_config(db: &Database, guild_id: u64) -> anyhow::Result<ModLogConfig> {
    let cache_key = modlog_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            load_modlog_config(db, guild_id).await
        })
        .await
}

async fn load_modlog_config(db: &Database, guild_id: u64) -> anyhow::Result<ModLogConfig> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let default_channel_id: Option<i64> =
        sqlx::query_scalar("SELECT modlog_channel_id FROM guild_mod_config WHERE guild_id = $1")
            .bind(guild_id_i64)
            .fetch_optional(db.pool())
            .await?
            .flatten();

    let routes: Vec<RouteRow> =
        sqlx::query_as("SELECT action, channel_id FROM modlog_channel_routes WHERE guild_id = $1")
            .bind(guild_id_i64)
            .fetch_all(db.pool())
            .await?;

    let mut config = ModLogConfig {
        default_channel_id: default_channel_id
            .map(u64::try_from)
            .transpose()
            .context("modlog_channel_id out of u64 range")?,
        ..ModLogConfig::default()
    };

    for route in routes {
        let channel_id =
            u64::try_from(route.channel_id).context("route channel_id out of u64 range")?;
        config.routes.insert(route.action, channel_id);
    }

    Ok(config)
}

pub async fn set_default_modlog_channel(
    db: &Database,
    guild_id: u64,
    channel_id: u64,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let channel_id_i64 = i64::try_from(channel_id).context("channel_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_mod_config (guild_id, modlog_channel_id)
         VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET modlog_channel_id = EXCLUDED.modlog_channel_id",
    )
    .bind(guild_id_i64)
    .bind(channel_id_i64)
    .execute(db.pool())
    .await?;

    invalidate_modlog_config(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn clear_default_modlog_channel(db: &Database, guild_id: u64) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query("DELETE FROM guild_mod_config WHERE guild_id = $1")
        .bind(guild_id_i64)
        .execute(db.pool())
        .await?;

    invalidate_modlog_config(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn set_modlog_route(
    db: &Database,
    guild_id: u64,
    action: CaseAction,
    channel_id: u64,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let channel_id_i64 = i64::try_from(channel_id).context("channel_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO modlog_channel_routes (guild_id, action, channel_id)
         VALUES ($1, $2, $3)
         ON CONFLICT (guild_id, action) DO UPDATE SET channel_id = EXCLUDED.channel_id",
    )
    .bind(guild_id_i64)
    .bind(action.as_str())
    .bind(channel_id_i64)
    .execute(db.pool())
    .await?;

    invalidate_modlog_config(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn clear_modlog_route(
    db: &Database,
    guild_id: u64,
    action: CaseAction,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query("DELETE FROM modlog_channel_routes WHERE guild_id = $1 AND action = $2")
        .bind(guild_id_i64)
        .bind(action.as_str())
        .execute(db.pool())
        .await?;

    invalidate_modlog_config(db.cache(), guild_id).await?;

    Ok(())
}
