#[path = "case/mod.rs"]
mod case_group;
#[path = "config/mod.rs"]
mod config_group;
#[path = "core/mod.rs"]
mod core_group;
#[path = "reversals/mod.rs"]
mod reversals_group;

pub use case_group::{case, history, modlogs};
pub use config_group::{dmnotify, escalation, modlogchannel};
pub use core_group::{ban, kick, lock, purge, softban, tempban, timeout, warn};
pub use reversals_group::{unban, unlock, untimeout};

pub(crate) mod embeds;
pub mod escalation_check;
mod logging;
pub mod scheduler;
