use anyhow::Context as _;

use crate::{
    database::Database,
    impls::now_unix_secs,
    model::cases::{CaseAction, ModCase, NewCase},
};

/// Optional filters for case listings.
pub struct CaseFilters {
    pub target_id: Option<u64>,
    pub action: Option<CaseAction>,
    pub limit: u32,
}

/// Hard cap on per-target history lookups; older cases are silently cut.
const HISTORY_LIMIT: i64 = 25;

#[derive(sqlx::FromRow)]
struct ModCaseRow {
    id: i64,
    guild_id: i64,
    case_number: i64,
    action: String,
    target_id: i64,
    target_tag: String,
    moderator_id: i64,
    moderator_tag: String,
    reason: Option<String>,
    duration: Option<String>,
    expires_at: Option<i64>,
    log_message_id: Option<i64>,
    created_at: i64,
}

/// Create a case, allocating the guild's next case number race-safely.
///
/// Numbers come from a per-guild counter row: the upsert takes a row lock,
/// so concurrent creates serialize, and a deleted case never gives its
/// number back. A tempban with an expiry also inserts its pending unban row
/// inside the same transaction.
pub async fn create_case(db: &Database, new_case: NewCase<'_>) -> anyhow::Result<ModCase> {
    let guild_id_i64 = i64::try_from(new_case.guild_id).context("guild_id out of i64 range")?;
    let target_id_i64 = i64::try_from(new_case.target_id).context("target_id out of i64 range")?;
    let moderator_id_i64 =
        i64::try_from(new_case.moderator_id).context("moderator_id out of i64 range")?;
    let expires_at_i64 = new_case
        .expires_at
        .map(i64::try_from)
        .transpose()
        .context("expires_at out of i64 range")?;
    let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;

    let mut tx = db.pool().begin().await?;

    let next_case_number: i64 = sqlx::query_scalar(
        "INSERT INTO mod_case_counters (guild_id, last_case_number)
         VALUES ($1, 1)
         ON CONFLICT (guild_id)
         DO UPDATE SET last_case_number = mod_case_counters.last_case_number + 1
         RETURNING last_case_number",
    )
    .bind(guild_id_i64)
    .fetch_one(&mut *tx)
    .await?;

    let case_row: ModCaseRow = sqlx::query_as(
        "INSERT INTO mod_cases (
            guild_id,
            case_number,
            action,
            target_id,
            target_tag,
            moderator_id,
            moderator_tag,
            reason,
            duration,
            expires_at,
            created_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING id, guild_id, case_number, action, target_id, target_tag, moderator_id, moderator_tag, reason, duration, expires_at, log_message_id, created_at",
    )
    .bind(guild_id_i64)
    .bind(next_case_number)
    .bind(new_case.action.as_str())
    .bind(target_id_i64)
    .bind(new_case.target_tag)
    .bind(moderator_id_i64)
    .bind(new_case.moderator_tag)
    .bind(new_case.reason)
    .bind(new_case.duration.as_deref())
    .bind(expires_at_i64)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    if new_case.action == CaseAction::Tempban
        && let Some(execute_at) = expires_at_i64
    {
        sqlx::query(
            "INSERT INTO mod_scheduled_actions (
                guild_id,
                action,
                target_id,
                case_id,
                execute_at,
                executed,
                created_at
             ) VALUES ($1, 'unban', $2, $3, $4, FALSE, $5)",
        )
        .bind(guild_id_i64)
        .bind(target_id_i64)
        .bind(case_row.id)
        .bind(execute_at)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    to_mod_case(case_row)
}

pub async fn get_case(
    db: &Database,
    guild_id: u64,
    case_number: u64,
) -> anyhow::Result<Option<ModCase>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let case_number_i64 = i64::try_from(case_number).context("case_number out of i64 range")?;

    let row: Option<ModCaseRow> = sqlx::query_as(
        "SELECT id, guild_id, case_number, action, target_id, target_tag, moderator_id, moderator_tag, reason, duration, expires_at, log_message_id, created_at
         FROM mod_cases
         WHERE guild_id = $1 AND case_number = $2",
    )
    .bind(guild_id_i64)
    .bind(case_number_i64)
    .fetch_optional(db.pool())
    .await?;

    row.map(to_mod_case).transpose()
}

pub async fn list_cases(
    db: &Database,
    guild_id: u64,
    filters: CaseFilters,
) -> anyhow::Result<Vec<ModCase>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let target_id_i64 = filters
        .target_id
        .map(i64::try_from)
        .transpose()
        .context("target_id out of i64 range")?;
    let limit_i64 = i64::from(filters.limit.clamp(1, 100));

    let rows: Vec<ModCaseRow> = sqlx::query_as(
        "SELECT id, guild_id, case_number, action, target_id, target_tag, moderator_id, moderator_tag, reason, duration, expires_at, log_message_id, created_at
         FROM mod_cases
         WHERE guild_id = $1
           AND ($2::BIGINT IS NULL OR target_id = $2)
           AND ($3::TEXT IS NULL OR action = $3)
         ORDER BY case_number DESC
         LIMIT $4",
    )
    .bind(guild_id_i64)
    .bind(target_id_i64)
    .bind(filters.action.map(CaseAction::as_str))
    .bind(limit_i64)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_mod_case).collect()
}

/// Most recent cases against one target, newest first, capped at 25.
pub async fn case_history(
    db: &Database,
    guild_id: u64,
    target_id: u64,
) -> anyhow::Result<Vec<ModCase>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let target_id_i64 = i64::try_from(target_id).context("target_id out of i64 range")?;

    let rows: Vec<ModCaseRow> = sqlx::query_as(
        "SELECT id, guild_id, case_number, action, target_id, target_tag, moderator_id, moderator_tag, reason, duration, expires_at, log_message_id, created_at
         FROM mod_cases
         WHERE guild_id = $1 AND target_id = $2
         ORDER BY case_number DESC
         LIMIT $3",
    )
    .bind(guild_id_i64)
    .bind(target_id_i64)
    .bind(HISTORY_LIMIT)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_mod_case).collect()
}

pub async fn update_case_reason(
    db: &Database,
    guild_id: u64,
    case_number: u64,
    new_reason: &str,
) -> anyhow::Result<Option<ModCase>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let case_number_i64 = i64::try_from(case_number).context("case_number out of i64 range")?;

    let row: Option<ModCaseRow> = sqlx::query_as(
        "UPDATE mod_cases
         SET reason = $1
         WHERE guild_id = $2 AND case_number = $3
         RETURNING id, guild_id, case_number, action, target_id, target_tag, moderator_id, moderator_tag, reason, duration, expires_at, log_message_id, created_at",
    )
    .bind(new_reason)
    .bind(guild_id_i64)
    .bind(case_number_i64)
    .fetch_optional(db.pool())
    .await?;

    row.map(to_mod_case).transpose()
}

/// Hard-delete a case. The number stays retired: the counter row that
/// allocated it is untouched.
pub async fn delete_case(db: &Database, guild_id: u64, case_number: u64) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let case_number_i64 = i64::try_from(case_number).context("case_number out of i64 range")?;

    let result = sqlx::query("DELETE FROM mod_cases WHERE guild_id = $1 AND case_number = $2")
        .bind(guild_id_i64)
        .bind(case_number_i64)
        .execute(db.pool())
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Record the mod-log message posted for a case, for later edits.
pub async fn set_case_log_message(
    db: &Database,
    case_id: u64,
    message_id: u64,
) -> anyhow::Result<()> {
    let case_id_i64 = i64::try_from(case_id).context("case_id out of i64 range")?;
    let message_id_i64 = i64::try_from(message_id).context("message_id out of i64 range")?;

    sqlx::query("UPDATE mod_cases SET log_message_id = $1 WHERE id = $2")
        .bind(message_id_i64)
        .bind(case_id_i64)
        .execute(db.pool())
        .await?;

    Ok(())
}

fn to_mod_case(row: ModCaseRow) -> anyhow::Result<ModCase> {
    let action = CaseAction::parse(&row.action)
        .with_context(|| format!("unknown case action `{}`", row.action))?;

    Ok(ModCase {
        id: u64::try_from(row.id).context("id row out of u64 range")?,
        guild_id: u64::try_from(row.guild_id).context("guild_id row out of u64 range")?,
        case_number: u64::try_from(row.case_number).context("case_number row out of u64 range")?,
        action,
        target_id: u64::try_from(row.target_id).context("target_id row out of u64 range")?,
        target_tag: row.target_tag,
        moderator_id: u64::try_from(row.moderator_id)
            .context("moderator_id row out of u64 range")?,
        moderator_tag: row.moderator_tag,
        reason: row.reason,
        duration: row.duration,
        expires_at: row
            .expires_at
            .map(u64::try_from)
            .transpose()
            .context("expires_at row out of u64 range")?,
        log_message_id: row
            .log_message_id
            .map(u64::try_from)
            .transpose()
            .context("log_message_id row out of u64 range")?,
        created_at: u64::try_from(row.created_at).context("created_at row out of u64 range")?,
    })
}
