use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::cases::CaseAction;

/// Mod-log routing snapshot for one guild.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModLogConfig {
    pub default_channel_id: Option<u64>,
    /// Per-action channel overrides, keyed by the stored action string.
    pub routes: HashMap<String, u64>,
}

impl ModLogConfig {
    /// Destination channel for an action: action route, else default, else
    /// none. `None` means logging is simply not configured for this action.
    pub fn resolve_channel(&self, action: CaseAction) -> Option<u64> {
        self.routes
            .get(action.as_str())
            .copied()
            .or(self.default_channel_id)
    }
}

/// Per-action DM notification toggles for one guild.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DmNotifyConfig {
    pub toggles: HashMap<String, bool>,
}

impl DmNotifyConfig {
    /// Whether the target should be DMed before an action.
    ///
    /// Actions without an explicit toggle default to no DM.
    pub fn should_notify(&self, action: CaseAction) -> bool {
        self.toggles
            .get(action.notify_toggle_key())
            .copied()
            .unwrap_or(false)
    }
}

/// Follow-up action an escalation threshold applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationAction {
    Timeout,
    Ban,
}

impl EscalationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            EscalationAction::Timeout => "timeout",
            EscalationAction::Ban => "ban",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "timeout" => Some(EscalationAction::Timeout),
            "ban" => Some(EscalationAction::Ban),
            _ => None,
        }
    }

    pub fn as_case_action(self) -> CaseAction {
        match self {
            EscalationAction::Timeout => CaseAction::Timeout,
            EscalationAction::Ban => CaseAction::Ban,
        }
    }
}

/// One warn-count threshold.
///
/// `duration` is required when the action is a timeout; the config command
/// enforces that on write.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EscalationThreshold {
    pub warn_count: u32,
    pub within_days: u32,
    pub action: EscalationAction,
    pub duration: Option<String>,
}

/// Escalation snapshot for one guild; threshold order is evaluation order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EscalationConfig {
    pub enabled: bool,
    pub thresholds: Vec<EscalationThreshold>,
}

const SECS_PER_DAY: u64 = 86_400;

/// Pick the first threshold whose warn count is met within its window.
///
/// Thresholds are checked in config order; the first hit wins, so operators
/// control precedence by ordering them.
pub fn select_threshold<'a>(
    thresholds: &'a [EscalationThreshold],
    warn_times: &[u64],
    now: u64,
) -> Option<&'a EscalationThreshold> {
    for threshold in thresholds {
        let window_start = now.saturating_sub(u64::from(threshold.within_days) * SECS_PER_DAY);
        let recent = warn_times.iter().filter(|&&at| at >= window_start).count();

        if recent >= threshold.warn_count as usize {
            return Some(threshold);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{
        DmNotifyConfig, EscalationAction, EscalationThreshold, ModLogConfig, select_threshold,
    };
    use crate::model::cases::CaseAction;

    fn threshold(
        warn_count: u32,
        within_days: u32,
        action: EscalationAction,
    ) -> EscalationThreshold {
        EscalationThreshold {
            warn_count,
            within_days,
            action,
            duration: match action {
                EscalationAction::Timeout => Some("1h".to_owned()),
                EscalationAction::Ban => None,
            },
        }
    }

    #[test]
    fn action_route_wins_over_default() {
        let mut config = ModLogConfig {
            default_channel_id: Some(100),
            ..ModLogConfig::default()
        };
        config.routes.insert("ban".to_owned(), 200);

        assert_eq!(config.resolve_channel(CaseAction::Ban), Some(200));
        assert_eq!(config.resolve_channel(CaseAction::Warn), Some(100));
    }

    #[test]
    fn missing_config_resolves_to_none() {
        let config = ModLogConfig::default();
        assert_eq!(config.resolve_channel(CaseAction::Kick), None);
    }

    #[test]
    fn notify_defaults_to_off() {
        let config = DmNotifyConfig::default();
        assert!(!config.should_notify(CaseAction::Warn));
        assert!(!config.should_notify(CaseAction::Ban));
    }

    #[test]
    fn tempban_notification_follows_the_ban_toggle() {
        let mut config = DmNotifyConfig::default();
        config.toggles.insert("ban".to_owned(), true);

        assert!(config.should_notify(CaseAction::Ban));
        assert!(config.should_notify(CaseAction::Tempban));
        assert!(config.should_notify(CaseAction::Softban));
        assert!(!config.should_notify(CaseAction::Kick));
    }

    #[test]
    fn first_matching_threshold_wins() {
        let thresholds = [
            threshold(3, 7, EscalationAction::Timeout),
            threshold(5, 7, EscalationAction::Ban),
        ];
        let now = 1_000_000;
        let warn_times: Vec<u64> = (0..6).map(|i| now - i * 60).collect();

        let fired = select_threshold(&thresholds, &warn_times, now).unwrap();
        assert_eq!(fired.action, EscalationAction::Timeout);
    }

    #[test]
    fn warns_outside_the_window_do_not_count() {
        let thresholds = [threshold(3, 1, EscalationAction::Timeout)];
        let now = 10 * 86_400;
        let warn_times = [now - 10, now - 20, now - 2 * 86_400];

        assert!(select_threshold(&thresholds, &warn_times, now).is_none());

        let warn_times = [now - 10, now - 20, now - 30];
        assert!(select_threshold(&thresholds, &warn_times, now).is_some());
    }

    #[test]
    fn no_thresholds_never_fires() {
        assert!(select_threshold(&[], &[1, 2, 3], 10).is_none());
    }
}
