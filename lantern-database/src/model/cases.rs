/// Fallback reason shown whenever a case was recorded without one.
pub const NO_REASON_FALLBACK: &str = "No reason provided";

/// Moderation action recorded by a case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseAction {
    Warn,
    Kick,
    Timeout,
    Untimeout,
    Ban,
    Tempban,
    Unban,
    Softban,
    Purge,
    Lock,
    Unlock,
}

impl CaseAction {
    pub const ALL: [CaseAction; 11] = [
        CaseAction::Warn,
        CaseAction::Kick,
        CaseAction::Timeout,
        CaseAction::Untimeout,
        CaseAction::Ban,
        CaseAction::Tempban,
        CaseAction::Unban,
        CaseAction::Softban,
        CaseAction::Purge,
        CaseAction::Lock,
        CaseAction::Unlock,
    ];

    /// Stable identifier stored in the `action` column.
    pub fn as_str(self) -> &'static str {
        match self {
            CaseAction::Warn => "warn",
            CaseAction::Kick => "kick",
            CaseAction::Timeout => "timeout",
            CaseAction::Untimeout => "untimeout",
            CaseAction::Ban => "ban",
            CaseAction::Tempban => "tempban",
            CaseAction::Unban => "unban",
            CaseAction::Softban => "softban",
            CaseAction::Purge => "purge",
            CaseAction::Lock => "lock",
            CaseAction::Unlock => "unlock",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "warn" => Some(CaseAction::Warn),
            "kick" => Some(CaseAction::Kick),
            "timeout" => Some(CaseAction::Timeout),
            "untimeout" => Some(CaseAction::Untimeout),
            "ban" => Some(CaseAction::Ban),
            "tempban" => Some(CaseAction::Tempban),
            "unban" => Some(CaseAction::Unban),
            "softban" => Some(CaseAction::Softban),
            "purge" => Some(CaseAction::Purge),
            "lock" => Some(CaseAction::Lock),
            "unlock" => Some(CaseAction::Unlock),
            _ => None,
        }
    }

    /// User-facing action name for embeds and listings.
    pub fn display_name(self) -> &'static str {
        match self {
            CaseAction::Warn => "Warn",
            CaseAction::Kick => "Kick",
            CaseAction::Timeout => "Timeout",
            CaseAction::Untimeout => "Untimeout",
            CaseAction::Ban => "Ban",
            CaseAction::Tempban => "Tempban",
            CaseAction::Unban => "Unban",
            CaseAction::Softban => "Softban",
            CaseAction::Purge => "Purge",
            CaseAction::Lock => "Lock",
            CaseAction::Unlock => "Unlock",
        }
    }

    /// Past-tense phrasing used when notifying the target.
    pub fn past_tense(self) -> &'static str {
        match self {
            CaseAction::Warn => "warned",
            CaseAction::Kick => "kicked",
            CaseAction::Timeout => "timed out",
            CaseAction::Untimeout => "released from timeout",
            CaseAction::Ban => "banned",
            CaseAction::Tempban => "temporarily banned",
            CaseAction::Unban => "unbanned",
            CaseAction::Softban => "softbanned",
            CaseAction::Purge => "purged",
            CaseAction::Lock => "locked",
            CaseAction::Unlock => "unlocked",
        }
    }

    /// DM-notification toggle key for this action.
    ///
    /// Tempban and softban deliberately resolve through the shared `ban`
    /// toggle; they have no independent toggles of their own.
    pub fn notify_toggle_key(self) -> &'static str {
        match self {
            CaseAction::Tempban | CaseAction::Softban => CaseAction::Ban.as_str(),
            other => other.as_str(),
        }
    }

    /// Whether the case target is a channel rather than a user.
    pub fn targets_channel(self) -> bool {
        matches!(
            self,
            CaseAction::Purge | CaseAction::Lock | CaseAction::Unlock
        )
    }
}

impl std::fmt::Display for CaseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully populated moderation case.
#[derive(Clone, Debug)]
pub struct ModCase {
    pub id: u64,
    pub guild_id: u64,
    pub case_number: u64,
    pub action: CaseAction,
    pub target_id: u64,
    pub target_tag: String,
    pub moderator_id: u64,
    pub moderator_tag: String,
    pub reason: Option<String>,
    pub duration: Option<String>,
    pub expires_at: Option<u64>,
    pub log_message_id: Option<u64>,
    pub created_at: u64,
}

impl ModCase {
    /// Reason with the fixed fallback applied for display.
    pub fn reason_display(&self) -> &str {
        self.reason.as_deref().unwrap_or(NO_REASON_FALLBACK)
    }
}

/// Input for creating a case; the store assigns id, number, and timestamp.
pub struct NewCase<'a> {
    pub guild_id: u64,
    pub action: CaseAction,
    pub target_id: u64,
    pub target_tag: &'a str,
    pub moderator_id: u64,
    pub moderator_tag: &'a str,
    pub reason: Option<&'a str>,
    pub duration: Option<String>,
    pub expires_at: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::CaseAction;

    #[test]
    fn action_strings_round_trip() {
        for action in CaseAction::ALL {
            assert_eq!(CaseAction::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_trimmed() {
        assert_eq!(CaseAction::parse("WARN"), Some(CaseAction::Warn));
        assert_eq!(CaseAction::parse("  Tempban "), Some(CaseAction::Tempban));
        assert_eq!(CaseAction::parse("terminate"), None);
        assert_eq!(CaseAction::parse(""), None);
    }

    #[test]
    fn tempban_and_softban_share_the_ban_toggle() {
        assert_eq!(CaseAction::Tempban.notify_toggle_key(), "ban");
        assert_eq!(CaseAction::Softban.notify_toggle_key(), "ban");
        assert_eq!(CaseAction::Ban.notify_toggle_key(), "ban");
    }

    #[test]
    fn other_actions_use_their_own_toggle_key() {
        assert_eq!(CaseAction::Warn.notify_toggle_key(), "warn");
        assert_eq!(CaseAction::Kick.notify_toggle_key(), "kick");
        assert_eq!(CaseAction::Timeout.notify_toggle_key(), "timeout");
        assert_eq!(CaseAction::Unban.notify_toggle_key(), "unban");
    }

    #[test]
    fn channel_actions_are_flagged() {
        assert!(CaseAction::Purge.targets_channel());
        assert!(CaseAction::Lock.targets_channel());
        assert!(CaseAction::Unlock.targets_channel());
        assert!(!CaseAction::Ban.targets_channel());
        assert!(!CaseAction::Warn.targets_channel());
    }
}
