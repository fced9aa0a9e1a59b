use poise::serenity_prelude as serenity;

/// Resolve a member's effective guild permissions from their roles.
///
/// The guild owner always resolves to the full permission set.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild_id.member(http, user_id).await?;
    let roles = guild_id.roles(http).await?;

    let mut resolved = serenity::Permissions::empty();
    let everyone_role_id = serenity::RoleId::new(guild_id.get());

    for role in roles.values() {
        if role.id == everyone_role_id || member.roles.contains(&role.id) {
            resolved |= role.permissions;
        }
    }

    Ok(resolved)
}

pub async fn has_user_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = resolve_user_permissions(http, guild_id, user_id).await?;

    Ok(perms.contains(serenity::Permissions::ADMINISTRATOR) || perms.contains(required))
}

/// Highest role position held by a member, for hierarchy comparisons.
///
/// The guild owner outranks every role holder.
pub fn member_role_rank(guild: &serenity::PartialGuild, member: &serenity::Member) -> u64 {
    if guild.owner_id == member.user.id {
        return u64::MAX;
    }

    member
        .roles
        .iter()
        .filter_map(|role_id| guild.roles.get(role_id))
        .map(|role| u64::from(role.position))
        .max()
        .unwrap_or(0)
}

/// Compare role ranks before a moderation action.
///
/// Returns a user-facing rejection when the target's rank is equal to or
/// higher than the actor's; `None` means the action may proceed.
pub fn check_hierarchy(actor_rank: u64, target_rank: u64) -> Option<&'static str> {
    if target_rank >= actor_rank {
        Some("You cannot moderate a member with an equal or higher role than yours.")
    } else {
        None
    }
}

/// Role-rank gate applied before acting on a member.
///
/// Targets that are not guild members pass; there is no rank to compare.
pub async fn hierarchy_rejection(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    actor_id: serenity::UserId,
    target_id: serenity::UserId,
) -> anyhow::Result<Option<&'static str>> {
    let Ok(target_member) = guild_id.member(http, target_id).await else {
        return Ok(None);
    };

    let guild = guild_id.to_partial_guild(http).await?;
    let actor_member = guild_id.member(http, actor_id).await?;

    let actor_rank = member_role_rank(&guild, &actor_member);
    let target_rank = member_role_rank(&guild, &target_member);

    Ok(check_hierarchy(actor_rank, target_rank))
}

#[cfg(test)]
mod tests {
    use super::check_hierarchy;

    #[test]
    fn lower_ranked_targets_are_allowed() {
        assert_eq!(check_hierarchy(5, 4), None);
        assert_eq!(check_hierarchy(1, 0), None);
        assert_eq!(check_hierarchy(u64::MAX, 200), None);
    }

    #[test]
    fn equal_rank_is_rejected() {
        assert!(check_hierarchy(5, 5).is_some());
        assert!(check_hierarchy(0, 0).is_some());
    }

    #[test]
    fn higher_ranked_targets_are_rejected() {
        assert!(check_hierarchy(4, 5).is_some());
        assert!(check_hierarchy(0, u64::MAX).is_some());
    }
}
