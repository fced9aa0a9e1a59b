pub mod cases;
pub mod config;
pub mod scheduled_actions;
