pub mod dmnotify;
pub mod escalation;
pub mod modlogchannel;
