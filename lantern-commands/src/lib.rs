pub mod moderation;
pub mod utility;

use lantern_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    moderation::warn::META,
    moderation::kick::META,
    moderation::ban::META,
    moderation::tempban::META,
    moderation::softban::META,
    moderation::timeout::META,
    moderation::purge::META,
    moderation::lock::META,
    moderation::unban::META,
    moderation::untimeout::META,
    moderation::unlock::META,
    moderation::case::META,
    moderation::modlogs::META,
    moderation::history::META,
    moderation::modlogchannel::META,
    moderation::dmnotify::META,
    moderation::escalation::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        moderation::warn::warn(),
        moderation::kick::kick(),
        moderation::ban::ban(),
        moderation::tempban::tempban(),
        moderation::softban::softban(),
        moderation::timeout::timeout(),
        moderation::purge::purge(),
        moderation::lock::lock(),
        moderation::unban::unban(),
        moderation::untimeout::untimeout(),
        moderation::unlock::unlock(),
        moderation::case::case(),
        moderation::modlogs::modlogs(),
        moderation::history::history(),
        moderation::modlogchannel::modlogchannel(),
        moderation::dmnotify::dmnotify(),
        moderation::escalation::escalation(),
    ]
}
