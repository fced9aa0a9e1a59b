use anyhow::Context as _;

use crate::{database::Database, model::scheduled_actions::DueUnban};

#[derive(sqlx::FromRow)]
struct DueUnbanRow {
    id: i64,
    guild_id: i64,
    target_id: i64,
    case_id: i64,
    execute_at: i64,
    case_number: Option<i64>,
    target_tag: Option<String>,
}

/// Fetch unban rows that are due at `now`, oldest first.
///
/// Rows already marked executed are never returned, so a reversal can not
/// run twice even if a previous poll was interrupted after the flip.
pub async fn due_unbans(db: &Database, now: u64, limit: u32) -> anyhow::Result<Vec<DueUnban>> {
    let now_i64 = i64::try_from(now).context("now out of i64 range")?;
    let limit_i64 = i64::from(limit.clamp(1, 100));

    let rows: Vec<DueUnbanRow> = sqlx::query_as(
        "SELECT sa.id, sa.guild_id, sa.target_id, sa.case_id, sa.execute_at, mc.case_number, mc.target_tag
         FROM mod_scheduled_actions sa
         LEFT JOIN mod_cases mc ON mc.id = sa.case_id
         WHERE sa.executed = FALSE AND sa.action = 'unban' AND sa.execute_at <= $1
         ORDER BY sa.execute_at ASC
         LIMIT $2",
    )
    .bind(now_i64)
    .bind(limit_i64)
    .fetch_all(db.pool())
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(DueUnban {
            id: u64::try_from(row.id).context("id row out of u64 range")?,
            guild_id: u64::try_from(row.guild_id).context("guild_id row out of u64 range")?,
            target_id: u64::try_from(row.target_id).context("target_id row out of u64 range")?,
            case_id: u64::try_from(row.case_id).context("case_id row out of u64 range")?,
            execute_at: u64::try_from(row.execute_at).context("execute_at row out of u64 range")?,
            source_case_number: row
                .case_number
                .map(u64::try_from)
                .transpose()
                .context("case_number row out of u64 range")?,
            source_target_tag: row.target_tag,
        });
    }

    Ok(out)
}

/// Claim a due row by flipping `executed` exactly once.
///
/// Returns false when another poll already claimed it; callers must not
/// record a reversal case for an unclaimed row.
pub async fn mark_unban_executed(db: &Database, id: u64) -> anyhow::Result<bool> {
    let id_i64 = i64::try_from(id).context("id out of i64 range")?;

    let result = sqlx::query(
        "UPDATE mod_scheduled_actions SET executed = TRUE WHERE id = $1 AND executed = FALSE",
    )
    .bind(id_i64)
    .execute(db.pool())
    .await?;

    Ok(result.rows_affected() > 0)
}
