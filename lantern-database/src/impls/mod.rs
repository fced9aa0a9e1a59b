pub mod cases;
pub mod dm_config;
pub mod escalation;
pub mod modlog_config;
pub mod scheduled_actions;

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}
