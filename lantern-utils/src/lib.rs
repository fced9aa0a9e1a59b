/// Duration codec shared by commands and the scheduler.
pub mod duration;
/// Generic embed builders shared across commands.
pub mod embed;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Permission and role-hierarchy helper utilities.
pub mod permissions;
/// Shared time helpers.
pub mod time;
