pub mod ban;
pub mod kick;
pub mod lock;
pub mod purge;
pub mod softban;
pub mod tempban;
pub mod timeout;
pub mod warn;
