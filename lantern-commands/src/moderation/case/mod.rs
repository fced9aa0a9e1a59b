pub mod case;
pub mod history;
pub mod modlogs;
